//! Documentation search index.
//!
//! Loads the `searchData` fragments written next to the generated API
//! documentation (`html/search/*.js`) into a [`SymbolTable`] that maps
//! normalized symbol names to their documentation links.

pub mod error;
mod parser;
mod table;
mod types;
mod validate;

pub use error::{IndexError, IndexResult};
pub use parser::{FragmentParser, parse_fragment};
pub use table::{Fragment, Member, SymbolTable};
pub use types::{
    DocTarget, LinkEntry, SearchRecord, TargetKind, decode_html_entities, decode_key,
};
pub use validate::{IssueKind, Severity, ValidationIssue, ValidationReport, validate};
