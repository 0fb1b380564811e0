/*!
# Rust Language Module

This Rust module holds the front half of the compiler: lexical analysis,
parsing, semantic analysis and the AST level optimizers. It also owns
[`Line`], the unit the shell stores in its listing.

*/

pub type LineNumber = u32;
pub type Column = std::ops::Range<usize>;

/// Largest line number accepted from the shell or a file.
pub const MAX_LINE_NUMBER: LineNumber = 65529;
/// Longest line the shell will store.
pub const MAX_LINE_LEN: usize = 1024;

#[macro_use]
mod error;
mod lex;
mod line;
mod optimize;
mod parse;
mod registry;
mod semantic;

pub mod ast;
pub mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use error::Kind;
pub use lex::{lex, lex_line, Lexed};
pub use line::Line;
pub use optimize::{fold, peephole};
pub use parse::parse;
pub use registry::{Registry, Signature, Type};
pub use semantic::analyze;

