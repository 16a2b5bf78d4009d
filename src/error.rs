//! Unified error type for the transpiler.
//!
//! Domain errors from the front end and the rewrite buffer bridge into one
//! enum via `From`, so `?` flows through the visitors and the facade.

use sharpkit_core::RewriteError;
use sharpkit_java_cst::ParserError;
use thiserror::Error;

/// Error returned by [`transpile`](crate::transpile).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranspileError {
    /// The input is not valid, or not supported, Java. Surfaced before
    /// any edit is recorded.
    #[error("parse error: {0}")]
    Parse(#[from] ParserError),

    /// Two rules produced overlapping rewrites. Indicates a rule-table
    /// ambiguity; the whole call is aborted.
    #[error("rewrite conflict: {0}")]
    Rewrite(#[from] RewriteError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpkit_core::TokenSpan;

    #[test]
    fn parse_errors_bridge() {
        let err = TranspileError::from(ParserError::UnexpectedEof {
            expected: "`}`".to_string(),
        });
        assert!(err.to_string().starts_with("parse error:"));
    }

    #[test]
    fn rewrite_errors_bridge() {
        let err = TranspileError::from(RewriteError::OverlappingReplace {
            existing: TokenSpan::new(5, 10),
            incoming: TokenSpan::new(8, 12),
        });
        assert_eq!(
            err.to_string(),
            "rewrite conflict: replace ranges overlap: [5, 10] and [8, 12]"
        );
    }
}
