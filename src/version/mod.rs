//! Version parsing and ordering
//!
//! - [`parser`]: permissive parser producing [`ParsedVersion`]
//! - [`compare`]: total order over parsed versions

pub mod compare;
pub mod parser;

pub use compare::{compare, is_newer};
pub use parser::{ParsedVersion, PrereleaseTag, parse};
