//! Language front end: source text → tokens → statement list.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

pub use ast::*;
pub use error::Error;
pub use token::{Token, TokenKind};
pub use value::Value;

use lexer::Lexer;
use parser::Parser;

/// Convert source text into a token sequence ending in [`TokenKind::Eof`].
pub fn scan(source: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(source).tokenize()
}

/// Lex and parse source text into a statement list.
pub fn parse(source: &str) -> Result<Vec<Stmt>, Error> {
    let tokens = scan(source)?;
    Parser::new(tokens).parse()
}
