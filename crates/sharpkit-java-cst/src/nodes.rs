//! Category-tagged syntax tree.
//!
//! The grammar's productions collapse into a single closed set of node
//! categories; the transpiler dispatches on the category tag and uses the
//! per-category data for structural access. Nodes own no text: every
//! anchor is a token index into the stream the unit was parsed from, and
//! parent/child is the only structural relationship.

use sharpkit_core::TokenSpan;

/// Node category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    CompilationUnit,
    ClassDeclaration,
    ClassMemberDeclaration,
    MethodDeclaration,
    FieldDeclaration,
    TypeReference,
    Expression,
    SwitchCaseLabel,
    VariableDeclaratorId,
    Other,
}

/// A node in the concrete syntax tree.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Inclusive token-index range this node covers, anchored on
    /// default-channel tokens.
    pub span: TokenSpan,
    pub children: Vec<SyntaxNode>,
    pub data: NodeData,
}

/// Category-specific structural data.
#[derive(Debug, Clone)]
pub enum NodeData {
    None,
    Unit(UnitData),
    Class(ClassData),
    Member(MemberData),
    Method(MethodData),
    Type(TypeData),
    Expr(ExprData),
    Declarator(DeclaratorData),
}

/// Package and import structure of a compilation unit.
#[derive(Debug, Clone)]
pub struct UnitData {
    pub package: Option<PackageData>,
    /// Span from the first import's first token to the last import's
    /// semicolon, when any imports are present.
    pub imports: Option<TokenSpan>,
}

#[derive(Debug, Clone)]
pub struct PackageData {
    /// The whole declaration, `package` through `;`.
    pub span: TokenSpan,
    /// Just the dotted qualified name.
    pub name: TokenSpan,
}

#[derive(Debug, Clone)]
pub struct ClassData {
    /// Token index of the class name.
    pub name_tok: usize,
    /// Span of the `extends` keyword through the end of the base type,
    /// when the class declares one.
    pub extends: Option<TokenSpan>,
}

#[derive(Debug, Clone)]
pub struct MemberData {
    pub modifiers: Vec<Modifier>,
    /// Token index of the first token after the modifier list.
    pub member_start: usize,
}

impl MemberData {
    pub fn has(&self, kind: ModifierKind) -> bool {
        self.modifiers.iter().any(|m| m.kind == kind)
    }

    pub fn find(&self, kind: ModifierKind) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub span: TokenSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
    /// `@Name`, optionally with a parenthesized argument list.
    Annotation,
    /// Storage modifiers with no mapping (`native`, `volatile`, ...).
    Other,
}

#[derive(Debug, Clone)]
pub struct MethodData {
    /// Token index of the method name.
    pub name_tok: usize,
}

#[derive(Debug, Clone)]
pub struct TypeData {
    /// Span of the primitive keyword when the base type is primitive.
    pub primitive: Option<TokenSpan>,
}

/// Identifier tokens an expression node directly carries.
#[derive(Debug, Clone, Default)]
pub struct ExprData {
    /// Set when the expression is a standalone identifier.
    pub ident_tok: Option<usize>,
    /// Set when the expression is a dotted member access; this is the
    /// member-name token (the receiver is the first child).
    pub member_tok: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct DeclaratorData {
    /// Token index of the declared identifier.
    pub name_tok: usize,
    /// Span of trailing `[]` pairs, when the declarator carries any.
    pub brackets: Option<TokenSpan>,
    /// Last token index of the owning declaration's type reference. The
    /// tree has no parent links, so the parser records the anchor the
    /// bracket relocation needs.
    pub type_end: usize,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: TokenSpan) -> Self {
        SyntaxNode {
            kind,
            span,
            children: Vec::new(),
            data: NodeData::None,
        }
    }

    pub fn unit(&self) -> Option<&UnitData> {
        match &self.data {
            NodeData::Unit(data) => Some(data),
            _ => None,
        }
    }

    pub fn class(&self) -> Option<&ClassData> {
        match &self.data {
            NodeData::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn member(&self) -> Option<&MemberData> {
        match &self.data {
            NodeData::Member(data) => Some(data),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&MethodData> {
        match &self.data {
            NodeData::Method(data) => Some(data),
            _ => None,
        }
    }

    pub fn type_ref(&self) -> Option<&TypeData> {
        match &self.data {
            NodeData::Type(data) => Some(data),
            _ => None,
        }
    }

    pub fn expr(&self) -> Option<&ExprData> {
        match &self.data {
            NodeData::Expr(data) => Some(data),
            _ => None,
        }
    }

    pub fn declarator(&self) -> Option<&DeclaratorData> {
        match &self.data {
            NodeData::Declarator(data) => Some(data),
            _ => None,
        }
    }

    /// The constant expression of a case label, absent for `default:`.
    pub fn case_expression(&self) -> Option<&SyntaxNode> {
        self.children
            .iter()
            .find(|child| child.kind == NodeKind::Expression)
    }

    /// Pre-order iterator over every node strictly beneath this one.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// See [`SyntaxNode::descendants`].
pub struct Descendants<'n> {
    stack: Vec<&'n SyntaxNode>,
}

impl<'n> Iterator for Descendants<'n> {
    type Item = &'n SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descendants_walk_pre_order() {
        let mut root = SyntaxNode::new(NodeKind::Other, TokenSpan::new(0, 10));
        let mut left = SyntaxNode::new(NodeKind::Expression, TokenSpan::new(0, 4));
        left.children
            .push(SyntaxNode::new(NodeKind::TypeReference, TokenSpan::at(1)));
        root.children.push(left);
        root.children
            .push(SyntaxNode::new(NodeKind::VariableDeclaratorId, TokenSpan::at(6)));

        let kinds: Vec<_> = root.descendants().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Expression,
                NodeKind::TypeReference,
                NodeKind::VariableDeclaratorId,
            ]
        );
    }

    #[test]
    fn accessors_are_category_checked() {
        let node = SyntaxNode::new(NodeKind::Other, TokenSpan::at(0));
        assert!(node.unit().is_none());
        assert!(node.expr().is_none());
        assert!(node.declarator().is_none());
    }
}
