//! The tree-walking rewrite engine.
//!
//! One pre-order pass over the syntax tree. Each node category maps to a
//! handler; the handler records edits against the shared [`TokenRewriter`]
//! and decides whether the walk descends into the node's children.
//! Categories without a handler descend by default. An expression-level
//! substitution hit always skips its subtree -- that is what keeps nested
//! rules from piling conflicting replaces onto the same tokens.

use sharpkit_core::{rules, text_of, Token, TokenRewriter, TokenSpan};
use sharpkit_java_cst::{ModifierKind, NodeKind, SyntaxNode};
use tracing::debug;

use crate::color_class::ColorClassVisitor;
use crate::error::TranspileError;

/// C# source for the color value-wrapper type appended to every output
/// unit, verbatim.
pub const COLOR_WRAPPER: &str = include_str!("assets/ColorWrapper.cs");

/// Class name recognized as the generated color helper.
pub(crate) const COLOR_CLASS_MARKER: &str = "PaintCodeColor";

/// Per-node traversal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Descend,
    Skip,
}

/// The base visitor dispatcher.
///
/// Owns the edit buffer for one transpile call. [`run`](Self::run) walks
/// the tree and records edits; [`render`](Self::render) produces the
/// final text.
pub struct TranspileVisitor<'a> {
    pub(crate) tokens: &'a [Token<'a>],
    pub(crate) rewriter: TokenRewriter<'a>,
}

impl<'a> TranspileVisitor<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        TranspileVisitor {
            tokens,
            rewriter: TokenRewriter::new(tokens),
        }
    }

    /// Walk the tree rooted at `root`, recording edits.
    ///
    /// # Errors
    ///
    /// Propagates a [`TranspileError::Rewrite`] conflict; no partial
    /// output is rendered after a failure.
    pub fn run(&mut self, root: &SyntaxNode) -> Result<(), TranspileError> {
        self.walk(root)
    }

    /// Render the rewritten unit.
    pub fn render(&self) -> String {
        self.rewriter.render()
    }

    pub(crate) fn walk(&mut self, node: &SyntaxNode) -> Result<(), TranspileError> {
        match self.dispatch(node)? {
            Flow::Skip => Ok(()),
            Flow::Descend => {
                for child in &node.children {
                    self.walk(child)?;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn dispatch(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        match node.kind {
            NodeKind::CompilationUnit => self.visit_unit(node),
            NodeKind::ClassDeclaration => self.visit_class(node),
            NodeKind::ClassMemberDeclaration => self.visit_member(node),
            NodeKind::MethodDeclaration => self.visit_method(node),
            NodeKind::FieldDeclaration => self.visit_field(node),
            NodeKind::TypeReference => self.visit_type(node),
            NodeKind::Expression => self.visit_expression(node),
            NodeKind::SwitchCaseLabel => self.visit_switch_label(node),
            NodeKind::VariableDeclaratorId => self.visit_declarator(node),
            NodeKind::Other => Ok(Flow::Descend),
        }
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    fn visit_unit(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        if self.tokens.is_empty() {
            return Ok(Flow::Descend);
        }
        let Some(unit) = node.unit() else {
            return Ok(Flow::Descend);
        };
        if let Some(package) = &unit.package {
            let name = text_of(self.tokens, package.name);
            debug!(namespace = %name, "rewriting package declaration");
            self.rewriter
                .replace(package.span, format!("namespace {name} {{"))?;
        }
        if let Some(imports) = unit.imports {
            let usings = rules::USINGS
                .iter()
                .map(|using| format!("using {using};"))
                .collect::<Vec<_>>()
                .join("\n");
            self.rewriter.replace(imports, usings)?;
        }
        if unit.package.is_some() {
            self.rewriter.insert_after(node.span.end, "\n}");
        }
        self.rewriter
            .insert_after(node.span.end, format!("\n\n{COLOR_WRAPPER}"));
        Ok(Flow::Descend)
    }

    fn visit_class(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        let Some(class) = node.class() else {
            return Ok(Flow::Descend);
        };
        if self.tokens[class.name_tok].text == COLOR_CLASS_MARKER {
            debug!("handing the color helper class to the scoped visitor");
            let mut scoped = ColorClassVisitor::new(self);
            scoped.walk(node)?;
            return Ok(Flow::Skip);
        }
        Ok(Flow::Descend)
    }

    fn visit_member(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        let Some(member) = node.member() else {
            return Ok(Flow::Descend);
        };
        let flags = rules::ModifierFlags {
            has_public: member.has(ModifierKind::Public),
            has_private: member.has(ModifierKind::Private),
            has_static: member.has(ModifierKind::Static),
        };
        match rules::map_visibility(flags) {
            Some(rules::VisibilityEdit::InsertInternal) => {
                self.rewriter.insert_before(node.span.start, "internal ");
            }
            Some(rules::VisibilityEdit::PrivateToInternal) => {
                if let Some(private) = member.find(ModifierKind::Private) {
                    self.rewriter.replace(private.span, "internal")?;
                }
            }
            None => {}
        }
        let override_annotation = member
            .modifiers
            .iter()
            .find(|m| {
                m.kind == ModifierKind::Annotation && text_of(self.tokens, m.span) == "@Override"
            })
            .map(|m| m.span);
        if let Some(span) = override_annotation {
            self.rewriter.delete(span)?;
            self.rewriter.insert_before(member.member_start, "override ");
        }
        Ok(Flow::Descend)
    }

    fn visit_method(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        if let Some(method) = node.method() {
            self.rename_token(method.name_tok)?;
        }
        Ok(Flow::Descend)
    }

    fn visit_field(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        let declarators: Vec<usize> = node
            .descendants()
            .filter(|n| n.kind == NodeKind::VariableDeclaratorId)
            .filter_map(|n| n.declarator().map(|d| d.name_tok))
            .collect();
        for name_tok in declarators {
            self.rename_token(name_tok)?;
        }
        Ok(Flow::Descend)
    }

    fn visit_type(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        if let Some(ty) = node.type_ref() {
            if let Some(primitive) = ty.primitive {
                let text = text_of(self.tokens, primitive);
                if let Some(mapped) = rules::map_primitive(&text) {
                    self.rewriter.replace(primitive, mapped)?;
                }
            }
        }
        Ok(Flow::Descend)
    }

    pub(crate) fn visit_expression(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        let text = text_of(self.tokens, node.span);
        if let Some(replacement) = rules::substitute_expression(&text) {
            debug!(expr = %text, to = %replacement, "expression substitution");
            self.rewriter.replace(node.span, replacement)?;
            return Ok(Flow::Skip);
        }
        if let Some(replacement) = rules::map_constant_reference(&text) {
            debug!(expr = %text, to = %replacement, "qualified constant reference");
            self.rewriter.replace(node.span, replacement)?;
            return Ok(Flow::Skip);
        }
        if let Some(member_tok) = node.expr().and_then(|e| e.member_tok) {
            self.rename_token(member_tok)?;
        }
        if let Some(keyword) = instanceof_keyword(self.tokens, node) {
            self.rewriter.replace(TokenSpan::at(keyword), "is")?;
        }
        Ok(Flow::Descend)
    }

    fn visit_switch_label(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        if let Some(constant) = node.case_expression() {
            let text = text_of(self.tokens, constant.span);
            if let Some(mapped) = rules::map_enum_literal(&text) {
                debug!(label = %text, to = %mapped, "enum case label");
                self.rewriter.replace(constant.span, mapped)?;
            }
        }
        Ok(Flow::Descend)
    }

    fn visit_declarator(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        let Some(declarator) = node.declarator() else {
            return Ok(Flow::Descend);
        };
        if let Some(brackets) = declarator.brackets {
            let pairs = self.tokens[brackets.start..=brackets.end]
                .iter()
                .filter(|t| t.text == "[")
                .count();
            self.rewriter
                .insert_after(declarator.type_end, "[]".repeat(pairs));
            self.rewriter.delete(brackets)?;
        }
        Ok(Flow::Descend)
    }

    /// Pascalize the identifier at `index`, recording an edit only when
    /// the spelling actually changes.
    pub(crate) fn rename_token(&mut self, index: usize) -> Result<(), TranspileError> {
        let original = self.tokens[index].text;
        let renamed = rules::pascalize(original);
        if renamed != original {
            debug!(from = original, to = %renamed, "pascalizing identifier");
            self.rewriter.replace(TokenSpan::at(index), renamed)?;
        }
        Ok(())
    }
}

/// Token index of the `instanceof` keyword for a type-test shaped node:
/// exactly three children, the middle one a bare keyword node, the last a
/// type reference.
fn instanceof_keyword(tokens: &[Token<'_>], node: &SyntaxNode) -> Option<usize> {
    if node.children.len() != 3 {
        return None;
    }
    let middle = &node.children[1];
    if node.children[2].kind != NodeKind::TypeReference {
        return None;
    }
    if middle.kind != NodeKind::Other || middle.span.start != middle.span.end {
        return None;
    }
    let index = middle.span.start;
    (tokens[index].text == "instanceof").then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpkit_java_cst::parse_unit;

    fn rewrite(source: &str) -> String {
        let unit = parse_unit(source).expect("fixture parses");
        let mut visitor = TranspileVisitor::new(&unit.tokens);
        visitor.run(&unit.root).expect("fixture rewrites");
        visitor.render()
    }

    mod modifier_mapping {
        use super::*;

        #[test]
        fn bare_members_become_internal() {
            let output = rewrite("class K { static int counter = 0; }");
            assert!(output.contains("internal static int Counter = 0;"));
        }

        #[test]
        fn private_static_becomes_internal() {
            let output = rewrite("class K { private static int counter = 0; }");
            assert!(output.contains("internal static int Counter = 0;"));
        }

        #[test]
        fn plain_private_is_kept() {
            let output = rewrite("class K { private int counter = 0; }");
            assert!(output.contains("private int Counter = 0;"));
        }

        #[test]
        fn public_members_get_no_modifier_edit() {
            let output = rewrite("class K { public int counter = 0; }");
            assert!(output.contains("public int Counter = 0;"));
            assert!(!output.contains("internal"));
        }

        #[test]
        fn override_annotation_moves() {
            let output =
                rewrite("class K { @Override public boolean equals(Object o) { return true; } }");
            assert!(!output.contains("@Override"));
            assert!(output.contains("public override bool Equals(Object o)"));
        }
    }

    mod expressions {
        use super::*;

        #[test]
        fn setter_substitution_consumes_the_subtree() {
            let output = rewrite("class K { void f() { foo.setColor(bar); } }");
            assert!(output.contains("foo.Color = (ColorWrapper)(bar);"));
        }

        #[test]
        fn substituted_receivers_keep_their_casing() {
            // `setFlags` captures the receiver text; nothing inside the
            // replaced range is rewritten again.
            let output = rewrite("class K { void f() { myPaint.setFlags(Paint.ANTI_ALIAS_FLAG); } }");
            assert!(output.contains("myPaint.Flags = (PaintFlags.AntiAlias);"));
        }

        #[test]
        fn member_names_are_pascalized() {
            let output = rewrite("class K { void f() { canvas.drawRect(frame, paint); } }");
            assert!(output.contains("canvas.DrawRect(frame, paint);"));
        }

        #[test]
        fn receivers_and_locals_are_untouched() {
            let output = rewrite("class K { void f() { RectF frame = other.frame; frame.set(0f); } }");
            assert!(output.contains("RectF frame = other.Frame;"));
            assert!(output.contains("frame.Set(0f);"));
        }

        #[test]
        fn color_constants_qualify() {
            let output = rewrite("class K { void f() { p.setColor(Color.RED); } }");
            assert!(output.contains("p.Color = (ColorWrapper)(Color.Red);"));
        }

        #[test]
        fn instanceof_becomes_is() {
            let output =
                rewrite("class K { boolean f(Object o) { return o instanceof Color; } }");
            assert!(output.contains("return o is Color;"));
        }
    }

    mod declarations {
        use super::*;

        #[test]
        fn boolean_fields_map_to_bool() {
            let output = rewrite("class K { private boolean ready = false; }");
            assert!(output.contains("private bool Ready = false;"));
        }

        #[test]
        fn array_brackets_move_to_the_type() {
            let output = rewrite("class K { private float dashes[] = null; }");
            assert!(output.contains("private float[] Dashes = null;"));
        }

        #[test]
        fn local_array_brackets_move_too() {
            let output = rewrite("class K { void f() { float hsv[] = new float[3]; } }");
            assert!(output.contains("float[] hsv = new float[3];"));
        }

        #[test]
        fn switch_labels_qualify_enum_literals() {
            let output = rewrite(
                "class K { void f(ResizingBehavior r) { switch (r) { case AspectFit: break; default: break; } } }",
            );
            assert!(output.contains("case ResizingBehavior.AspectFit:"));
            assert!(output.contains("default:"));
        }
    }

    mod scoped_override {
        use super::*;

        #[test]
        fn marker_class_loses_its_base_clause() {
            let output = rewrite("class PaintCodeColor extends Color { }");
            assert!(!output.contains("extends"));
            assert!(output.contains("class PaintCodeColor"));
        }

        #[test]
        fn unrelated_base_clauses_survive() {
            let output = rewrite("class Special extends Color { }");
            assert!(output.contains("class Special extends Color"));
        }

        #[test]
        fn helper_members_keep_their_name() {
            let output = rewrite(
                "class PaintCodeColor extends Color { static int f(int c) { return colorByChangingAlpha(c, 255); } }",
            );
            assert!(output.contains("return ColorByChangingAlpha(c, 255);"));
        }

        #[test]
        fn bare_accessors_qualify_inside_the_helper() {
            let output = rewrite(
                "class PaintCodeColor extends Color { static int f(int c) { return argb(255, red(c), green(c), blue(c)); } }",
            );
            assert!(output.contains(
                "return Color.Argb(255, Color.GetRedComponent(c), Color.GetGreenComponent(c), Color.GetBlueComponent(c));"
            ));
        }

        #[test]
        fn bare_accessors_stay_plain_outside_the_helper() {
            let output = rewrite("class K { int f(int c) { return red(c); } }");
            assert!(output.contains("return red(c);"));
        }
    }
}
