//! Non-destructive token-level edit buffer.
//!
//! A [`TokenRewriter`] holds pending edits against an immutable token stream
//! and renders the final text on demand. Replaces are conflict-checked: at
//! most one replace may cover any token index, and two replace ranges that
//! overlap (containment included) are rejected. Inserts accumulate per
//! anchor and side and never conflict with anything.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::token::{Token, TokenSpan};

/// Error type for rewrite operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Two replace ranges overlap (containment included).
    #[error("replace ranges overlap: {existing} and {incoming}")]
    OverlappingReplace {
        existing: TokenSpan,
        incoming: TokenSpan,
    },

    /// An edit is anchored outside the token stream.
    #[error("span {span} is out of bounds for a stream of {token_count} tokens")]
    SpanOutOfBounds {
        span: TokenSpan,
        token_count: usize,
    },
}

#[derive(Debug, Clone)]
struct ReplaceOp {
    span: TokenSpan,
    text: String,
}

/// Pending edits over an immutable token stream.
///
/// Created empty per transpile call, filled during the tree walk, and
/// consumed by [`render`](TokenRewriter::render). Rendering with zero
/// recorded edits reproduces the input text exactly.
pub struct TokenRewriter<'a> {
    tokens: &'a [Token<'a>],
    /// Replace operations keyed by span start.
    replaces: BTreeMap<usize, ReplaceOp>,
    /// Insert fragments before an anchor token, in issue order.
    before: HashMap<usize, Vec<String>>,
    /// Insert fragments after an anchor token, in issue order.
    after: HashMap<usize, Vec<String>>,
}

impl<'a> TokenRewriter<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        TokenRewriter {
            tokens,
            replaces: BTreeMap::new(),
            before: HashMap::new(),
            after: HashMap::new(),
        }
    }

    /// Replace tokens `[span.start, span.end]` with literal text.
    ///
    /// # Errors
    ///
    /// `RewriteError::OverlappingReplace` if the span overlaps an already
    /// recorded replace; `RewriteError::SpanOutOfBounds` if the span lies
    /// outside the stream.
    pub fn replace(
        &mut self,
        span: TokenSpan,
        text: impl Into<String>,
    ) -> Result<(), RewriteError> {
        if span.end >= self.tokens.len() {
            return Err(RewriteError::SpanOutOfBounds {
                span,
                token_count: self.tokens.len(),
            });
        }
        for op in self.replaces.values() {
            if op.span.overlaps(&span) {
                return Err(RewriteError::OverlappingReplace {
                    existing: op.span,
                    incoming: span,
                });
            }
        }
        self.replaces.insert(
            span.start,
            ReplaceOp {
                span,
                text: text.into(),
            },
        );
        Ok(())
    }

    /// Delete tokens `[span.start, span.end]`.
    ///
    /// Sugar for replacing the span with the empty string; the same
    /// conflict rules apply.
    ///
    /// # Errors
    ///
    /// See [`replace`](TokenRewriter::replace).
    pub fn delete(&mut self, span: TokenSpan) -> Result<(), RewriteError> {
        self.replace(span, "")
    }

    /// Insert text immediately before token `index`'s original text.
    ///
    /// Multiple inserts at the same anchor and side accumulate in the
    /// order they were issued.
    pub fn insert_before(&mut self, index: usize, text: impl Into<String>) {
        debug_assert!(index < self.tokens.len());
        self.before.entry(index).or_default().push(text.into());
    }

    /// Insert text immediately after token `index`'s original text.
    pub fn insert_after(&mut self, index: usize, text: impl Into<String>) {
        debug_assert!(index < self.tokens.len());
        self.after.entry(index).or_default().push(text.into());
    }

    /// Render the edited stream.
    ///
    /// Walks token indices first to last. An index that starts a replace
    /// range emits its insert-before fragments, the replacement text once,
    /// and then any inserts anchored inside the skipped range at their own
    /// positions, before jumping past the range end. Any other index emits
    /// insert-before fragments, the token's original text, insert-after
    /// fragments. Idempotent for a given set of recorded edits.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut index = 0;
        while index < self.tokens.len() {
            if let Some(op) = self.replaces.get(&index) {
                self.emit_fragments(&mut out, &self.before, index);
                out.push_str(&op.text);
                self.emit_fragments(&mut out, &self.after, index);
                for inner in (index + 1)..=op.span.end {
                    self.emit_fragments(&mut out, &self.before, inner);
                    self.emit_fragments(&mut out, &self.after, inner);
                }
                index = op.span.end + 1;
            } else {
                self.emit_fragments(&mut out, &self.before, index);
                out.push_str(self.tokens[index].text);
                self.emit_fragments(&mut out, &self.after, index);
                index += 1;
            }
        }
        out
    }

    fn emit_fragments(&self, out: &mut String, side: &HashMap<usize, Vec<String>>, index: usize) {
        if let Some(fragments) = side.get(&index) {
            for fragment in fragments {
                out.push_str(fragment);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn stream(words: &[&'static str]) -> Vec<Token<'static>> {
        words
            .iter()
            .map(|w| Token::new(TokenKind::Identifier, w, 0))
            .collect()
    }

    mod identity {
        use super::*;

        #[test]
        fn zero_edits_round_trips() {
            let tokens = stream(&["a", " ", "b", " ", "c"]);
            let rewriter = TokenRewriter::new(&tokens);
            assert_eq!(rewriter.render(), "a b c");
        }

        #[test]
        fn render_is_idempotent() {
            let tokens = stream(&["a", "b", "c"]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.replace(TokenSpan::at(1), "B").unwrap();
            let first = rewriter.render();
            let second = rewriter.render();
            assert_eq!(first, second);
            assert_eq!(first, "aBc");
        }
    }

    mod conflicts {
        use super::*;

        #[test]
        fn overlapping_replaces_conflict() {
            let tokens = stream(&["t"; 16]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.replace(TokenSpan::new(5, 10), "x").unwrap();
            let err = rewriter.replace(TokenSpan::new(8, 12), "y").unwrap_err();
            assert_eq!(
                err,
                RewriteError::OverlappingReplace {
                    existing: TokenSpan::new(5, 10),
                    incoming: TokenSpan::new(8, 12),
                }
            );
        }

        #[test]
        fn contained_replace_conflicts() {
            let tokens = stream(&["t"; 16]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.replace(TokenSpan::new(5, 10), "x").unwrap();
            assert!(rewriter.replace(TokenSpan::new(6, 7), "y").is_err());
            assert!(rewriter.replace(TokenSpan::new(3, 12), "z").is_err());
        }

        #[test]
        fn adjacent_replaces_are_fine() {
            let tokens = stream(&["a", "b", "c", "d"]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.replace(TokenSpan::new(0, 1), "X").unwrap();
            rewriter.replace(TokenSpan::new(2, 3), "Y").unwrap();
            assert_eq!(rewriter.render(), "XY");
        }

        #[test]
        fn out_of_bounds_replace_rejected() {
            let tokens = stream(&["a", "b"]);
            let mut rewriter = TokenRewriter::new(&tokens);
            let err = rewriter.replace(TokenSpan::new(1, 5), "x").unwrap_err();
            assert!(matches!(err, RewriteError::SpanOutOfBounds { .. }));
        }
    }

    mod inserts {
        use super::*;

        #[test]
        fn same_anchor_inserts_accumulate_in_order() {
            let tokens = stream(&["x"]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.insert_before(0, "a ");
            rewriter.insert_before(0, "b ");
            assert_eq!(rewriter.render(), "a b x");
        }

        #[test]
        fn inserts_never_conflict_with_replaces() {
            let tokens = stream(&["a", "b", "c"]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.replace(TokenSpan::at(1), "B").unwrap();
            rewriter.insert_before(1, "<");
            rewriter.insert_after(1, ">");
            assert_eq!(rewriter.render(), "a<B>c");
        }

        #[test]
        fn inserts_inside_skipped_range_still_render() {
            let tokens = stream(&["a", "b", "c", "d"]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.replace(TokenSpan::new(1, 2), "X").unwrap();
            rewriter.insert_after(2, "!");
            assert_eq!(rewriter.render(), "aX!d");
        }

        #[test]
        fn insert_after_last_token_appends() {
            let tokens = stream(&["a", "b"]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.insert_after(1, "\n}");
            rewriter.insert_after(1, "\n\nextra");
            assert_eq!(rewriter.render(), "ab\n}\n\nextra");
        }
    }

    mod deletes {
        use super::*;

        #[test]
        fn delete_is_empty_replace() {
            let tokens = stream(&["a", " ", "b", " ", "c"]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.delete(TokenSpan::new(2, 3)).unwrap();
            assert_eq!(rewriter.render(), "a c");
        }

        #[test]
        fn delete_conflicts_like_replace() {
            let tokens = stream(&["a", "b", "c"]);
            let mut rewriter = TokenRewriter::new(&tokens);
            rewriter.delete(TokenSpan::new(0, 1)).unwrap();
            assert!(rewriter.replace(TokenSpan::at(1), "x").is_err());
        }
    }
}
