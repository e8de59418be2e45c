//! Structured extraction from free-form engine output.
//!
//! | Function | Use Case |
//! |----------|----------|
//! | [`extract`] | Recover a JSON object/array embedded in prose or a fenced block |
//! | [`extract_as`] | Same, then deserialize into a typed payload |
//! | [`section`] / [`sections`] | Pull markdown `##` sections out of a long response |
//!
//! Nothing here panics or returns an untyped failure: callers always get a
//! [`ParseError`] carrying the raw text so they can apply a fallback.

pub mod parser;
pub mod sections;

pub use parser::{Expected, ParseError, ParsedPayload, PayloadKind, extract, extract_as};
pub use sections::{section, sections};
