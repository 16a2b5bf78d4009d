//! A Java tokenizer and Concrete Syntax Tree for PaintCode StyleKit sources.
//!
//! This crate is the language front end of sharpkit. It tokenizes Java
//! source with full trivia fidelity and parses the bounded dialect that
//! PaintCode's code generator emits into a category-tagged syntax tree
//! (see [`NodeKind`]). Nodes carry token-index spans into the stream, so
//! the tree composes with the rewrite buffer in `sharpkit-core` without
//! any text duplication.
//!
//! # Quick start
//!
//! ```
//! use sharpkit_java_cst::parse_unit;
//!
//! let unit = parse_unit("class StyleKit { }").expect("parse error");
//! assert!(!unit.tokens.is_empty());
//! ```
//!
//! Malformed or unsupported input is a hard error; there is no recovery
//! and no partial tree.

pub mod nodes;
pub mod parser;
pub mod tokenizer;

pub use nodes::{
    ClassData, DeclaratorData, Descendants, ExprData, MemberData, MethodData, Modifier,
    ModifierKind, NodeData, NodeKind, PackageData, SyntaxNode, TypeData, UnitData,
};
pub use parser::{parse_unit, ParsedUnit, ParserError};
pub use tokenizer::{tokenize, ScanError};

use annotate_snippets::{Level, Renderer, Snippet};

/// Format a parser error with a source snippet and caret.
///
/// # Example
///
/// ```
/// use sharpkit_java_cst::{parse_unit, prettify_error};
///
/// if let Err(err) = parse_unit("class {") {
///     let rendered = prettify_error("class {", &err, "Broken.java");
///     assert!(rendered.contains("Broken.java"));
/// }
/// ```
pub fn prettify_error(source: &str, err: &ParserError, label: &str) -> String {
    let offset = err.offset().unwrap_or(source.len()).min(source.len());
    let end = source[offset..]
        .chars()
        .next()
        .map_or(offset, |ch| offset + ch.len_utf8());
    let title = err.to_string();
    let rendered = Renderer::styled()
        .render(
            Level::Error.title(&title).snippet(
                Snippet::source(source)
                    .origin(label)
                    .fold(true)
                    .annotation(Level::Error.span(offset..end)),
            ),
        )
        .to_string();
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_points_at_the_offending_token() {
        let source = "class K { void f() { foo(; } }";
        let err = parse_unit(source).unwrap_err();
        assert!(matches!(err, ParserError::Unexpected { .. }));
        let rendered = prettify_error(source, &err, "K.java");
        assert!(rendered.contains("K.java"));
    }

    #[test]
    fn scan_errors_bridge_into_parser_errors() {
        let err = parse_unit("class K { § }").unwrap_err();
        assert!(matches!(err, ParserError::Scan(_)));
    }

    #[test]
    fn eof_errors_render_without_an_offset() {
        let source = "class K {";
        let err = parse_unit(source).unwrap_err();
        let rendered = prettify_error(source, &err, "K.java");
        assert!(rendered.contains("end of input"));
    }
}
