//! The actual passes that compile / transform from one data structure
//! to the next.
//!
//! The compilation process goes in this order:
//!
//! 1. [lex]
//! 2. [parse]
//! 3. [generate]
//!
//! Each pass also has a struct ([Lexer], [Parser], [Generator]) that does
//! one run and is consumed by it, for when you need to configure the pass.
//! Every pass reports failure with its own error type.

mod codegen;
mod lexer;
mod parser;

pub use codegen::generate;
pub use codegen::{GenerateError, Generator, NameGenerator};
pub use lexer::lex;
pub use lexer::{LexError, Lexer};
pub use parser::parse;
pub use parser::{ParseError, Parser};
