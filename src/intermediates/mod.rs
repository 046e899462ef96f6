//! The data structures handed from one pass to the next

pub mod ast;
pub mod token;
