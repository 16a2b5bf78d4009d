//! Scoped rewrite rules for the generated color helper class.
//!
//! PaintCode emits a `PaintCodeColor` class that subclasses the platform
//! color class; in C# it stands alone. Inside its body, unqualified
//! references to color accessors and constants resolve against the base
//! class and must be qualified, while the helper's own members keep
//! their (cased) names. Everything else follows the base rules, through
//! the same edit buffer.

use sharpkit_core::{rules, text_of};
use sharpkit_java_cst::{NodeKind, SyntaxNode};
use tracing::debug;

use crate::error::TranspileError;
use crate::visitor::{Flow, TranspileVisitor, COLOR_CLASS_MARKER};

/// Dispatcher active for the subtree rooted at the recognized color
/// helper. Overrides two categories and falls back to the base handler
/// table for the rest; shares the parent's rewriter.
pub(crate) struct ColorClassVisitor<'v, 'a> {
    base: &'v mut TranspileVisitor<'a>,
}

impl<'v, 'a> ColorClassVisitor<'v, 'a> {
    pub(crate) fn new(base: &'v mut TranspileVisitor<'a>) -> Self {
        ColorClassVisitor { base }
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

    fn dispatch(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        match node.kind {
            NodeKind::ClassDeclaration => self.visit_class(node),
            NodeKind::Expression => self.visit_expression(node),
            _ => self.base.dispatch(node),
        }
    }

    /// The helper loses its inheritance clause in the output.
    fn visit_class(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        let Some(class) = node.class() else {
            return Ok(Flow::Descend);
        };
        if self.base.tokens[class.name_tok].text == COLOR_CLASS_MARKER {
            if let Some(extends) = class.extends {
                debug!("deleting the color helper's base-type clause");
                self.base.rewriter.delete(extends)?;
            }
        }
        Ok(Flow::Descend)
    }

    /// Two extra checks ahead of the inherited expression handling: the
    /// helper's own members rename in place, and unqualified accessor or
    /// constant names qualify before the prefixed branch would see them.
    fn visit_expression(&mut self, node: &SyntaxNode) -> Result<Flow, TranspileError> {
        if node.expr().is_some_and(|e| e.ident_tok.is_some()) {
            let text = text_of(self.base.tokens, node.span);
            if rules::COLOR_HELPER_MEMBERS.contains(&text.as_str()) {
                self.base
                    .rewriter
                    .replace(node.span, rules::pascalize(&text))?;
                return Ok(Flow::Skip);
            }
            if let Some(accessor) = rules::color_accessor(&text) {
                self.base
                    .rewriter
                    .replace(node.span, format!("Color.{accessor}"))?;
                return Ok(Flow::Skip);
            }
            if rules::is_constant_convention(&text) {
                self.base
                    .rewriter
                    .replace(node.span, format!("Color.{}", rules::pascalize_constant(&text)))?;
                return Ok(Flow::Skip);
            }
        }
        self.base.visit_expression(node)
    }
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

    #[test]
    fn bare_constants_qualify_inside_the_helper() {
        let output =
            rewrite("class PaintCodeColor extends Color { static int f() { return BLACK; } }");
        assert!(output.contains("return Color.Black;"));
    }

    #[test]
    fn prefixed_references_still_use_the_inherited_branch() {
        let output = rewrite(
            "class PaintCodeColor extends Color { static int f(int c) { return Color.alpha(c); } }",
        );
        assert!(output.contains("return Color.GetAlphaComponent(c);"));
    }

    #[test]
    fn base_rules_apply_inside_the_helper() {
        let output = rewrite(
            "class PaintCodeColor extends Color { private static boolean strict = true; }",
        );
        assert!(output.contains("internal static bool Strict = true;"));
    }
}
