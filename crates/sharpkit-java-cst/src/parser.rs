//! Bounded recursive-descent parser for PaintCode-generated Java.
//!
//! The parser produces the category-tagged tree the transpiler dispatches
//! on. It covers the dialect PaintCode emits -- classes with nested cache
//! classes, simple enums, fields, methods, constructors, the usual
//! statement forms, and the full expression precedence ladder including
//! casts, `new` and `instanceof`. It is not a general Java front end:
//! generics, lambdas, anonymous classes and try/catch are outside the
//! dialect and fail the parse. There is no error recovery; unsupported
//! input is a hard failure before any rewriting happens.

use sharpkit_core::{Token, TokenKind, TokenSpan};
use thiserror::Error;

use crate::nodes::{
    ClassData, DeclaratorData, ExprData, MemberData, MethodData, Modifier, ModifierKind, NodeData,
    NodeKind, PackageData, SyntaxNode, TypeData, UnitData,
};
use crate::tokenizer::{tokenize, ScanError};

/// Error type for parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("expected {expected}, found `{found}` at byte {offset}")]
    Unexpected {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: String },
}

impl ParserError {
    /// Byte offset the error points at, when one is known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParserError::Scan(scan) => Some(scan.offset()),
            ParserError::Unexpected { offset, .. } => Some(*offset),
            ParserError::UnexpectedEof { .. } => None,
        }
    }
}

/// A parsed compilation unit: the full-fidelity token stream plus the
/// category-tagged tree over it. Both are constructed per call and share
/// no state with any other unit.
#[derive(Debug)]
pub struct ParsedUnit<'a> {
    pub tokens: Vec<Token<'a>>,
    pub root: SyntaxNode,
}

/// Parse a compilation unit.
///
/// # Errors
///
/// Returns a [`ParserError`] when the source does not tokenize or does not
/// fit the supported dialect.
pub fn parse_unit(source: &str) -> Result<ParsedUnit<'_>, ParserError> {
    let tokens = tokenize(source)?;
    let significant: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.is_significant())
        .map(|(index, _)| index)
        .collect();
    let mut parser = Parser {
        tokens: &tokens,
        significant,
        pos: 0,
    };
    let root = parser.compilation_unit()?;
    Ok(ParsedUnit { tokens, root })
}

const PRIMITIVES: [&str; 9] = [
    "boolean", "byte", "short", "int", "long", "float", "double", "char", "void",
];

const ASSIGN_OPS: [&str; 12] = [
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", ">>>=",
];

fn is_primitive(text: &str) -> bool {
    PRIMITIVES.contains(&text)
}

fn binary_precedence(text: &str) -> Option<u8> {
    let precedence = match text {
        "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" => 6,
        "<" | ">" | "<=" | ">=" => 7,
        "<<" | ">>" | ">>>" => 8,
        "+" | "-" => 9,
        "*" | "/" | "%" => 10,
        _ => return None,
    };
    Some(precedence)
}

fn modifier_kind(text: &str) -> Option<ModifierKind> {
    let kind = match text {
        "public" => ModifierKind::Public,
        "private" => ModifierKind::Private,
        "protected" => ModifierKind::Protected,
        "static" => ModifierKind::Static,
        "final" => ModifierKind::Final,
        "abstract" => ModifierKind::Abstract,
        "native" | "synchronized" | "transient" | "volatile" | "strictfp" => ModifierKind::Other,
        _ => return None,
    };
    Some(kind)
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    /// Stream indices of default-channel tokens; the cursor walks these.
    significant: Vec<usize>,
    pos: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token<'a>> {
        self.significant.get(self.pos).map(|&index| &self.tokens[index])
    }

    fn nth(&self, lookahead: usize) -> Option<&Token<'a>> {
        self.significant
            .get(self.pos + lookahead)
            .map(|&index| &self.tokens[index])
    }

    /// Text of the current token. The returned slice borrows the source,
    /// not the parser, so match arms are free to advance the cursor.
    fn peek_text(&self) -> &'a str {
        self.peek().map_or("", |token| token.text)
    }

    fn nth_text(&self, lookahead: usize) -> &'a str {
        self.nth(lookahead).map_or("", |token| token.text)
    }

    fn nth_is_identifier(&self, lookahead: usize) -> bool {
        self.nth(lookahead)
            .is_some_and(|token| token.kind == TokenKind::Identifier)
    }

    fn at(&self, text: &str) -> bool {
        self.peek_text() == text
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.significant.len()
    }

    /// Advance past the current token and return its stream index. Only
    /// call after a successful peek.
    fn bump(&mut self) -> usize {
        let index = self.significant[self.pos];
        self.pos += 1;
        index
    }

    fn eat(&mut self, text: &str) -> Option<usize> {
        if self.at(text) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn expect(&mut self, text: &str) -> Result<usize, ParserError> {
        if self.at(text) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(format!("`{text}`")))
        }
    }

    fn expect_identifier(&mut self) -> Result<usize, ParserError> {
        if self.peek().is_some_and(|t| t.kind == TokenKind::Identifier) {
            Ok(self.bump())
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParserError {
        match self.peek() {
            Some(token) => ParserError::Unexpected {
                expected: expected.into(),
                found: token.text.to_string(),
                offset: token.offset,
            },
            None => ParserError::UnexpectedEof {
                expected: expected.into(),
            },
        }
    }

    /// Skip a balanced `open`...`close` region starting at the current
    /// token; returns the stream index of the closing token.
    fn skip_balanced(&mut self, open: &str, close: &str) -> Result<usize, ParserError> {
        let mut depth = 0usize;
        loop {
            if self.at_eof() {
                return Err(self.unexpected(format!("`{close}`")));
            }
            let index = self.bump();
            let text = self.tokens[index].text;
            if text == open {
                depth += 1;
            } else if text == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(index);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn compilation_unit(&mut self) -> Result<SyntaxNode, ParserError> {
        let unit_start = self.significant.first().copied().unwrap_or(0);
        let mut package = None;
        let mut imports: Option<TokenSpan> = None;
        let mut children = Vec::new();

        if self.at("package") {
            let start = self.bump();
            let name_start = self.expect_identifier()?;
            let mut name_end = name_start;
            while self.at(".") {
                self.bump();
                name_end = self.expect_identifier()?;
            }
            let semi = self.expect(";")?;
            package = Some(PackageData {
                span: TokenSpan::new(start, semi),
                name: TokenSpan::new(name_start, name_end),
            });
        }

        while self.at("import") {
            let start = self.bump();
            let semi = loop {
                if self.at_eof() {
                    return Err(self.unexpected("`;`"));
                }
                let index = self.bump();
                if self.tokens[index].text == ";" {
                    break index;
                }
            };
            imports = Some(match imports {
                None => TokenSpan::new(start, semi),
                Some(span) => TokenSpan::new(span.start, semi),
            });
        }

        while !self.at_eof() {
            children.push(self.type_declaration()?);
        }

        let unit_end = self
            .significant
            .last()
            .copied()
            .unwrap_or_else(|| self.tokens.len().saturating_sub(1));
        let span = TokenSpan::new(unit_start.min(unit_end), unit_end.max(unit_start));
        Ok(SyntaxNode {
            kind: NodeKind::CompilationUnit,
            span,
            children,
            data: NodeData::Unit(UnitData { package, imports }),
        })
    }

    fn type_declaration(&mut self) -> Result<SyntaxNode, ParserError> {
        // Top-level modifiers need no mapping; their tokens pass through.
        self.modifiers()?;
        if self.at("class") {
            self.class_declaration()
        } else if self.at("enum") {
            self.enum_declaration()
        } else {
            Err(self.unexpected("`class`"))
        }
    }

    fn class_declaration(&mut self) -> Result<SyntaxNode, ParserError> {
        let class_kw = self.expect("class")?;
        let name_tok = self.expect_identifier()?;
        let mut extends = None;
        let mut children = Vec::new();

        if self.at("extends") {
            let extends_kw = self.bump();
            let base = self.type_reference()?;
            extends = Some(TokenSpan::new(extends_kw, base.span.end));
            children.push(base);
        }
        if self.at("implements") {
            self.bump();
            loop {
                children.push(self.type_reference()?);
                if self.eat(",").is_none() {
                    break;
                }
            }
        }

        self.expect("{")?;
        while !self.at("}") {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            children.push(self.class_member()?);
        }
        let close = self.expect("}")?;

        Ok(SyntaxNode {
            kind: NodeKind::ClassDeclaration,
            span: TokenSpan::new(class_kw, close),
            children,
            data: NodeData::Class(ClassData { name_tok, extends }),
        })
    }

    fn enum_declaration(&mut self) -> Result<SyntaxNode, ParserError> {
        // Simple enumerations are already valid C#; keep the body opaque.
        let enum_kw = self.expect("enum")?;
        self.expect_identifier()?;
        if !self.at("{") {
            return Err(self.unexpected("`{`"));
        }
        let close = self.skip_balanced("{", "}")?;
        Ok(SyntaxNode::new(
            NodeKind::Other,
            TokenSpan::new(enum_kw, close),
        ))
    }

    fn class_member(&mut self) -> Result<SyntaxNode, ParserError> {
        let start = match self.peek() {
            Some(_) => self.significant[self.pos],
            None => return Err(self.unexpected("class member")),
        };
        let modifiers = self.modifiers()?;
        let member_start = match self.peek() {
            Some(_) => self.significant[self.pos],
            None => return Err(self.unexpected("member declaration")),
        };

        let declaration = if self.at("class") {
            self.class_declaration()?
        } else if self.at("enum") {
            self.enum_declaration()?
        } else if self.at(";") {
            let semi = self.bump();
            SyntaxNode::new(NodeKind::Other, TokenSpan::at(semi))
        } else {
            self.method_or_field()?
        };

        let span = TokenSpan::new(start, declaration.span.end);
        Ok(SyntaxNode {
            kind: NodeKind::ClassMemberDeclaration,
            span,
            children: vec![declaration],
            data: NodeData::Member(MemberData {
                modifiers,
                member_start,
            }),
        })
    }

    fn modifiers(&mut self) -> Result<Vec<Modifier>, ParserError> {
        let mut modifiers = Vec::new();
        loop {
            if self.at("@") {
                let at_tok = self.bump();
                let mut end = self.expect_identifier()?;
                if self.at("(") {
                    end = self.skip_balanced("(", ")")?;
                }
                modifiers.push(Modifier {
                    kind: ModifierKind::Annotation,
                    span: TokenSpan::new(at_tok, end),
                });
            } else if let Some(kind) = modifier_kind(self.peek_text()) {
                let index = self.bump();
                modifiers.push(Modifier {
                    kind,
                    span: TokenSpan::at(index),
                });
            } else {
                return Ok(modifiers);
            }
        }
    }

    fn method_or_field(&mut self) -> Result<SyntaxNode, ParserError> {
        // Constructor: the class name directly followed by a parameter list.
        if self.peek().is_some_and(|t| t.kind == TokenKind::Identifier) && self.nth_text(1) == "(" {
            return self.constructor();
        }
        let ty = self.type_reference()?;
        let name = self.expect_identifier()?;
        if self.at("(") {
            self.method_rest(ty, name)
        } else {
            self.declaration_with_declarators(ty, name, NodeKind::FieldDeclaration)
        }
    }

    fn constructor(&mut self) -> Result<SyntaxNode, ParserError> {
        let name = self.expect_identifier()?;
        let mut children = self.parameters()?;
        let body = self.block()?;
        let span = TokenSpan::new(name, body.span.end);
        children.push(body);
        let mut node = SyntaxNode::new(NodeKind::Other, span);
        node.children = children;
        Ok(node)
    }

    fn method_rest(&mut self, ty: SyntaxNode, name_tok: usize) -> Result<SyntaxNode, ParserError> {
        let start = ty.span.start;
        let mut children = vec![ty];
        children.extend(self.parameters()?);
        let end = if self.at(";") {
            self.bump()
        } else {
            let body = self.block()?;
            let end = body.span.end;
            children.push(body);
            end
        };
        Ok(SyntaxNode {
            kind: NodeKind::MethodDeclaration,
            span: TokenSpan::new(start, end),
            children,
            data: NodeData::Method(MethodData { name_tok }),
        })
    }

    fn parameters(&mut self) -> Result<Vec<SyntaxNode>, ParserError> {
        self.expect("(")?;
        let mut nodes = Vec::new();
        if !self.at(")") {
            loop {
                let ty = self.type_reference()?;
                let type_end = ty.span.end;
                let name = self.expect_identifier()?;
                nodes.push(ty);
                nodes.push(self.declarator_rest(name, type_end)?);
                if self.eat(",").is_none() {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(nodes)
    }

    /// Field or local declaration tail: the type and first declarator name
    /// are already parsed.
    fn declaration_with_declarators(
        &mut self,
        ty: SyntaxNode,
        first_name: usize,
        kind: NodeKind,
    ) -> Result<SyntaxNode, ParserError> {
        let start = ty.span.start;
        let type_end = ty.span.end;
        let mut children = vec![ty];
        children.push(self.declarator_rest(first_name, type_end)?);
        if self.eat("=").is_some() {
            children.push(self.variable_initializer()?);
        }
        while self.eat(",").is_some() {
            let name = self.expect_identifier()?;
            children.push(self.declarator_rest(name, type_end)?);
            if self.eat("=").is_some() {
                children.push(self.variable_initializer()?);
            }
        }
        let semi = self.expect(";")?;
        Ok(SyntaxNode {
            kind,
            span: TokenSpan::new(start, semi),
            children,
            data: NodeData::None,
        })
    }

    fn declarator_rest(
        &mut self,
        name_tok: usize,
        type_end: usize,
    ) -> Result<SyntaxNode, ParserError> {
        let mut end = name_tok;
        let mut brackets: Option<TokenSpan> = None;
        while self.at("[") && self.nth_text(1) == "]" {
            let open = self.bump();
            let close = self.expect("]")?;
            brackets = Some(match brackets {
                None => TokenSpan::new(open, close),
                Some(span) => TokenSpan::new(span.start, close),
            });
            end = close;
        }
        Ok(SyntaxNode {
            kind: NodeKind::VariableDeclaratorId,
            span: TokenSpan::new(name_tok, end),
            children: Vec::new(),
            data: NodeData::Declarator(DeclaratorData {
                name_tok,
                brackets,
                type_end,
            }),
        })
    }

    fn variable_initializer(&mut self) -> Result<SyntaxNode, ParserError> {
        if self.at("{") {
            self.array_initializer()
        } else {
            self.expression()
        }
    }

    fn array_initializer(&mut self) -> Result<SyntaxNode, ParserError> {
        let open = self.expect("{")?;
        let mut children = Vec::new();
        if !self.at("}") {
            loop {
                children.push(self.variable_initializer()?);
                if self.eat(",").is_none() || self.at("}") {
                    break;
                }
            }
        }
        let close = self.expect("}")?;
        let mut node = SyntaxNode::new(NodeKind::Expression, TokenSpan::new(open, close));
        node.children = children;
        node.data = NodeData::Expr(ExprData::default());
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Base type without array suffix: a primitive keyword or a dotted
    /// identifier chain.
    fn type_base(&mut self) -> Result<(TokenSpan, Option<TokenSpan>), ParserError> {
        if is_primitive(self.peek_text()) {
            let index = self.bump();
            return Ok((TokenSpan::at(index), Some(TokenSpan::at(index))));
        }
        let first = self.expect_identifier()?;
        let mut end = first;
        while self.at(".") && self.nth_is_identifier(1) {
            self.bump();
            end = self.expect_identifier()?;
        }
        Ok((TokenSpan::new(first, end), None))
    }

    fn type_reference(&mut self) -> Result<SyntaxNode, ParserError> {
        let (base, primitive) = self.type_base()?;
        let mut end = base.end;
        while self.at("[") && self.nth_text(1) == "]" {
            self.bump();
            end = self.expect("]")?;
        }
        Ok(SyntaxNode {
            kind: NodeKind::TypeReference,
            span: TokenSpan::new(base.start, end),
            children: Vec::new(),
            data: NodeData::Type(TypeData { primitive }),
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) -> Result<SyntaxNode, ParserError> {
        let open = self.expect("{")?;
        let mut children = Vec::new();
        while !self.at("}") {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            children.push(self.statement()?);
        }
        let close = self.expect("}")?;
        let mut node = SyntaxNode::new(NodeKind::Other, TokenSpan::new(open, close));
        node.children = children;
        Ok(node)
    }

    fn statement(&mut self) -> Result<SyntaxNode, ParserError> {
        match self.peek_text() {
            "{" => self.block(),
            "if" => self.if_statement(),
            "while" => self.while_statement(),
            "do" => self.do_statement(),
            "for" => self.for_statement(),
            "switch" => self.switch_statement(),
            "return" => {
                let kw = self.bump();
                let mut children = Vec::new();
                if !self.at(";") {
                    children.push(self.expression()?);
                }
                let semi = self.expect(";")?;
                let mut node = SyntaxNode::new(NodeKind::Other, TokenSpan::new(kw, semi));
                node.children = children;
                Ok(node)
            }
            "throw" => {
                let kw = self.bump();
                let value = self.expression()?;
                let semi = self.expect(";")?;
                let mut node = SyntaxNode::new(NodeKind::Other, TokenSpan::new(kw, semi));
                node.children = vec![value];
                Ok(node)
            }
            "break" | "continue" => {
                let kw = self.bump();
                let semi = self.expect(";")?;
                Ok(SyntaxNode::new(NodeKind::Other, TokenSpan::new(kw, semi)))
            }
            ";" => {
                let semi = self.bump();
                Ok(SyntaxNode::new(NodeKind::Other, TokenSpan::at(semi)))
            }
            _ => {
                if self.looks_like_local_declaration() {
                    let ty = self.type_reference()?;
                    let name = self.expect_identifier()?;
                    self.declaration_with_declarators(ty, name, NodeKind::Other)
                } else {
                    let expr = self.expression()?;
                    self.expect(";")?;
                    Ok(expr)
                }
            }
        }
    }

    /// Statement-start disambiguation: a type followed by an identifier is
    /// a local declaration, anything else is an expression statement.
    fn looks_like_local_declaration(&self) -> bool {
        if is_primitive(self.peek_text()) {
            return true;
        }
        if !self.peek().is_some_and(|t| t.kind == TokenKind::Identifier) {
            return false;
        }
        let mut lookahead = 1;
        while self.nth_text(lookahead) == "." && self.nth_is_identifier(lookahead + 1) {
            lookahead += 2;
        }
        while self.nth_text(lookahead) == "[" && self.nth_text(lookahead + 1) == "]" {
            lookahead += 2;
        }
        self.nth_is_identifier(lookahead)
    }

    fn if_statement(&mut self) -> Result<SyntaxNode, ParserError> {
        let kw = self.expect("if")?;
        self.expect("(")?;
        let condition = self.expression()?;
        self.expect(")")?;
        let then_branch = self.statement()?;
        let mut end = then_branch.span.end;
        let mut children = vec![condition, then_branch];
        if self.eat("else").is_some() {
            let else_branch = self.statement()?;
            end = else_branch.span.end;
            children.push(else_branch);
        }
        let mut node = SyntaxNode::new(NodeKind::Other, TokenSpan::new(kw, end));
        node.children = children;
        Ok(node)
    }

    fn while_statement(&mut self) -> Result<SyntaxNode, ParserError> {
        let kw = self.expect("while")?;
        self.expect("(")?;
        let condition = self.expression()?;
        self.expect(")")?;
        let body = self.statement()?;
        let mut node = SyntaxNode::new(NodeKind::Other, TokenSpan::new(kw, body.span.end));
        node.children = vec![condition, body];
        Ok(node)
    }

    fn do_statement(&mut self) -> Result<SyntaxNode, ParserError> {
        let kw = self.expect("do")?;
        let body = self.statement()?;
        self.expect("while")?;
        self.expect("(")?;
        let condition = self.expression()?;
        self.expect(")")?;
        let semi = self.expect(";")?;
        let mut node = SyntaxNode::new(NodeKind::Other, TokenSpan::new(kw, semi));
        node.children = vec![body, condition];
        Ok(node)
    }

    fn for_statement(&mut self) -> Result<SyntaxNode, ParserError> {
        let kw = self.expect("for")?;
        self.expect("(")?;
        let mut children = Vec::new();

        if self.at(";") {
            self.bump();
        } else if self.looks_like_local_declaration() {
            let ty = self.type_reference()?;
            let type_end = ty.span.end;
            let name = self.expect_identifier()?;
            if self.at(":") {
                // Enhanced for: `for (Type item : iterable) body`.
                let declarator = self.declarator_rest(name, type_end)?;
                self.bump();
                let iterable = self.expression()?;
                self.expect(")")?;
                let body = self.statement()?;
                let mut node = SyntaxNode::new(NodeKind::Other, TokenSpan::new(kw, body.span.end));
                node.children = vec![ty, declarator, iterable, body];
                return Ok(node);
            }
            children.push(self.declaration_with_declarators(ty, name, NodeKind::Other)?);
        } else {
            children.push(self.expression()?);
            while self.eat(",").is_some() {
                children.push(self.expression()?);
            }
            self.expect(";")?;
        }

        if !self.at(";") {
            children.push(self.expression()?);
        }
        self.expect(";")?;
        if !self.at(")") {
            children.push(self.expression()?);
            while self.eat(",").is_some() {
                children.push(self.expression()?);
            }
        }
        self.expect(")")?;
        let body = self.statement()?;
        let mut node = SyntaxNode::new(NodeKind::Other, TokenSpan::new(kw, body.span.end));
        children.push(body);
        node.children = children;
        Ok(node)
    }

    fn switch_statement(&mut self) -> Result<SyntaxNode, ParserError> {
        let kw = self.expect("switch")?;
        self.expect("(")?;
        let subject = self.expression()?;
        self.expect(")")?;
        self.expect("{")?;
        let mut children = vec![subject];
        while !self.at("}") {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            if self.at("case") {
                let case_kw = self.bump();
                let constant = self.case_constant()?;
                let colon = self.expect(":")?;
                let mut label = SyntaxNode::new(
                    NodeKind::SwitchCaseLabel,
                    TokenSpan::new(case_kw, colon),
                );
                label.children = vec![constant];
                children.push(label);
            } else if self.at("default") {
                let default_kw = self.bump();
                let colon = self.expect(":")?;
                children.push(SyntaxNode::new(
                    NodeKind::SwitchCaseLabel,
                    TokenSpan::new(default_kw, colon),
                ));
            } else {
                children.push(self.statement()?);
            }
        }
        let close = self.expect("}")?;
        let mut node = SyntaxNode::new(NodeKind::Other, TokenSpan::new(kw, close));
        node.children = children;
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expression(&mut self) -> Result<SyntaxNode, ParserError> {
        let target = self.ternary()?;
        if ASSIGN_OPS.contains(&self.peek_text()) {
            self.bump();
            let value = self.expression()?;
            let span = TokenSpan::new(target.span.start, value.span.end);
            return Ok(expr_node(span, vec![target, value], ExprData::default()));
        }
        Ok(target)
    }

    fn ternary(&mut self) -> Result<SyntaxNode, ParserError> {
        let condition = self.binary(1)?;
        if self.at("?") {
            self.bump();
            let then_value = self.expression()?;
            self.expect(":")?;
            let else_value = self.ternary()?;
            let span = TokenSpan::new(condition.span.start, else_value.span.end);
            return Ok(expr_node(
                span,
                vec![condition, then_value, else_value],
                ExprData::default(),
            ));
        }
        Ok(condition)
    }

    /// Case labels take a ternary-free constant expression so that the
    /// label's `:` is unambiguous.
    fn case_constant(&mut self) -> Result<SyntaxNode, ParserError> {
        self.binary(1)
    }

    fn binary(&mut self, min_precedence: u8) -> Result<SyntaxNode, ParserError> {
        let mut lhs = self.unary()?;
        loop {
            if self.at("instanceof") && 7 >= min_precedence {
                let kw = self.bump();
                let ty = self.type_reference()?;
                let span = TokenSpan::new(lhs.span.start, ty.span.end);
                let keyword = SyntaxNode::new(NodeKind::Other, TokenSpan::at(kw));
                lhs = expr_node(span, vec![lhs, keyword, ty], ExprData::default());
                continue;
            }
            let Some(precedence) = binary_precedence(self.peek_text()) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.bump();
            let rhs = self.binary(precedence + 1)?;
            let span = TokenSpan::new(lhs.span.start, rhs.span.end);
            lhs = expr_node(span, vec![lhs, rhs], ExprData::default());
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<SyntaxNode, ParserError> {
        match self.peek_text() {
            "+" | "-" | "!" | "~" | "++" | "--" => {
                let op = self.bump();
                let operand = self.unary()?;
                let span = TokenSpan::new(op, operand.span.end);
                Ok(expr_node(span, vec![operand], ExprData::default()))
            }
            "(" if self.is_cast() => {
                let open = self.bump();
                let ty = self.type_reference()?;
                self.expect(")")?;
                let operand = self.unary()?;
                let span = TokenSpan::new(open, operand.span.end);
                Ok(expr_node(span, vec![ty, operand], ExprData::default()))
            }
            _ => self.postfix(),
        }
    }

    /// Cast lookahead: `(` type `)` followed by something that can start
    /// an operand.
    fn is_cast(&self) -> bool {
        let mut lookahead = 1;
        let primitive = is_primitive(self.nth_text(lookahead));
        if primitive {
            lookahead += 1;
        } else if self.nth_is_identifier(lookahead) {
            lookahead += 1;
            while self.nth_text(lookahead) == "." && self.nth_is_identifier(lookahead + 1) {
                lookahead += 2;
            }
        } else {
            return false;
        }
        while self.nth_text(lookahead) == "[" && self.nth_text(lookahead + 1) == "]" {
            lookahead += 2;
        }
        if self.nth_text(lookahead) != ")" {
            return false;
        }
        if primitive {
            return true;
        }
        let Some(next) = self.nth(lookahead + 1) else {
            return false;
        };
        matches!(
            next.kind,
            TokenKind::Identifier | TokenKind::Number | TokenKind::Str | TokenKind::Char
        ) || matches!(next.text, "(" | "this" | "super" | "new" | "true" | "false" | "null")
    }

    fn postfix(&mut self) -> Result<SyntaxNode, ParserError> {
        let mut node = self.primary()?;
        loop {
            match self.peek_text() {
                "." => {
                    self.bump();
                    let member = self.expect_identifier()?;
                    let span = TokenSpan::new(node.span.start, member);
                    node = expr_node(
                        span,
                        vec![node],
                        ExprData {
                            ident_tok: None,
                            member_tok: Some(member),
                        },
                    );
                }
                "(" => {
                    self.bump();
                    let mut children = vec![node];
                    if !self.at(")") {
                        loop {
                            children.push(self.expression()?);
                            if self.eat(",").is_none() {
                                break;
                            }
                        }
                    }
                    let close = self.expect(")")?;
                    let span = TokenSpan::new(children[0].span.start, close);
                    node = expr_node(span, children, ExprData::default());
                }
                "[" => {
                    self.bump();
                    let index = self.expression()?;
                    let close = self.expect("]")?;
                    let span = TokenSpan::new(node.span.start, close);
                    node = expr_node(span, vec![node, index], ExprData::default());
                }
                "++" | "--" => {
                    let op = self.bump();
                    let span = TokenSpan::new(node.span.start, op);
                    node = expr_node(span, vec![node], ExprData::default());
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn primary(&mut self) -> Result<SyntaxNode, ParserError> {
        let Some(token) = self.peek().copied() else {
            return Err(self.unexpected("expression"));
        };
        match token.kind {
            TokenKind::Identifier => {
                let index = self.bump();
                Ok(expr_node(
                    TokenSpan::at(index),
                    Vec::new(),
                    ExprData {
                        ident_tok: Some(index),
                        member_tok: None,
                    },
                ))
            }
            TokenKind::Number | TokenKind::Str | TokenKind::Char => {
                let index = self.bump();
                Ok(expr_node(TokenSpan::at(index), Vec::new(), ExprData::default()))
            }
            _ => match token.text {
                "true" | "false" | "null" | "this" | "super" => {
                    let index = self.bump();
                    Ok(expr_node(TokenSpan::at(index), Vec::new(), ExprData::default()))
                }
                "(" => {
                    let open = self.bump();
                    let inner = self.expression()?;
                    let close = self.expect(")")?;
                    Ok(expr_node(
                        TokenSpan::new(open, close),
                        vec![inner],
                        ExprData::default(),
                    ))
                }
                "new" => self.new_expression(),
                _ => Err(self.unexpected("expression")),
            },
        }
    }

    fn new_expression(&mut self) -> Result<SyntaxNode, ParserError> {
        let new_kw = self.expect("new")?;
        let (base, primitive) = self.type_base()?;
        let ty = SyntaxNode {
            kind: NodeKind::TypeReference,
            span: base,
            children: Vec::new(),
            data: NodeData::Type(TypeData { primitive }),
        };
        let mut children = vec![ty];
        let end;

        if self.at("(") {
            self.bump();
            if !self.at(")") {
                loop {
                    children.push(self.expression()?);
                    if self.eat(",").is_none() {
                        break;
                    }
                }
            }
            end = self.expect(")")?;
        } else if self.at("[") {
            let mut close = 0;
            while self.at("[") {
                self.bump();
                if self.at("]") {
                    close = self.bump();
                } else {
                    children.push(self.expression()?);
                    close = self.expect("]")?;
                }
            }
            if self.at("{") {
                let initializer = self.array_initializer()?;
                close = initializer.span.end;
                children.push(initializer);
            }
            end = close;
        } else {
            return Err(self.unexpected("`(` or `[`"));
        }

        Ok(expr_node(
            TokenSpan::new(new_kw, end),
            children,
            ExprData::default(),
        ))
    }
}

fn expr_node(span: TokenSpan, children: Vec<SyntaxNode>, data: ExprData) -> SyntaxNode {
    SyntaxNode {
        kind: NodeKind::Expression,
        span,
        children,
        data: NodeData::Expr(data),
    }
}
