// all roads lead to lib.rs

#[macro_use]
extern crate log;

mod intermediates;
mod passes;
mod span;

pub use intermediates::ast;
pub use intermediates::token::{Token, TokenType};
pub use passes::*;
pub use span::{Position, Span};

use thiserror::Error;

/// Whichever pass failed first. The message is the pass's own, untouched
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}
impl CompileError {
    /// Unimplemented features get reported differently from real mistakes
    pub fn is_unimplemented(&self) -> bool {
        match self {
            Self::Lex(_) => false,
            Self::Parse(err) => err.is_unimplemented(),
            Self::Generate(err) => err.is_unimplemented(),
        }
    }
}

/// Source text all the way to IR text
pub fn compile(text: &str) -> Result<String, CompileError> {
    let tokens = lex(text)?;
    let ast = parse(tokens)?;
    Ok(generate(&ast)?)
}
