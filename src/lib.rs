//! sharpkit: PaintCode StyleKit Java to C# transpiler.
//!
//! PaintCode emits Android drawing code as a Java `StyleKit` class. This
//! crate rewrites that generated code into C# for Xamarin.Android: the
//! package becomes a namespace, imports become a fixed `using` list,
//! member names are Pascal-cased, Android graphics idioms are substituted
//! with their binding equivalents, and the generated `PaintCodeColor`
//! helper is rewritten under scoped rules.
//!
//! The transformation is token-level and non-destructive: a single
//! pre-order pass over the syntax tree records edits against the original
//! token stream, and everything not matched by a rule comes out
//! byte-identical. A conflicting pair of rewrites aborts the whole call;
//! partial output is never produced.
//!
//! ```
//! let java = "package com.acme;\n\nclass Kit { }\n";
//! let cs = sharpkit::transpile(java).expect("transpile error");
//! assert!(cs.starts_with("namespace com.acme {"));
//! ```

mod color_class;
pub mod error;
mod transpile;
mod visitor;

pub use error::TranspileError;
pub use transpile::transpile;
pub use visitor::{TranspileVisitor, COLOR_WRAPPER};
