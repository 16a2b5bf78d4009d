//! The transpile facade.

use tracing::info;

use crate::error::TranspileError;
use crate::visitor::TranspileVisitor;

/// Convert one PaintCode-generated Java unit into C#.
///
/// Pure: parses the source, runs the rewrite pass over the tree, and
/// renders the edited token stream. The call either fully succeeds or
/// fails; partial output is never returned.
///
/// # Errors
///
/// [`TranspileError::Parse`] when the input is not valid (or not
/// supported) Java; [`TranspileError::Rewrite`] when two rules produce
/// overlapping edits.
pub fn transpile(source: &str) -> Result<String, TranspileError> {
    let unit = sharpkit_java_cst::parse_unit(source)?;
    info!(
        bytes = source.len(),
        tokens = unit.tokens.len(),
        "transpiling unit"
    );
    let mut visitor = TranspileVisitor::new(&unit.tokens);
    visitor.run(&unit.root)?;
    Ok(visitor.render())
}
