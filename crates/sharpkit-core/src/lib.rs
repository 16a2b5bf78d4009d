//! Core infrastructure for sharpkit.
//!
//! This crate provides the language-agnostic half of the transpiler:
//! - Token stream model with trivia preserved on its own channel
//! - Non-destructive token-level rewrite buffer, rendered on demand
//! - Rule tables: identifier casing, expression substitution, constant
//!   mapping, modifier/type/enum-literal mapping
//!
//! The Java front end (`sharpkit-java-cst`) produces token streams and
//! syntax trees over this model; the visitors in the root crate record
//! edits through [`TokenRewriter`] and consult [`rules`].

pub mod rewrite;
pub mod rules;
pub mod token;

pub use rewrite::{RewriteError, TokenRewriter};
pub use token::{text_of, Channel, Token, TokenKind, TokenSpan};
