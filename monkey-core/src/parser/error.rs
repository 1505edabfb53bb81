use thiserror::Error;

use crate::{lexer::prelude::Token, utils::prelude::SrcSpan};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorType {
    #[error("expected next token to be {expected}, got {} instead", got.kind())]
    UnexpectedToken {
        expected: &'static str,
        got: Token,
    },
    #[error("no prefix parse function for {} found", token.kind())]
    NoPrefixParseFn { token: Token },
    #[error("could not parse {literal} as integer")]
    InvalidInteger { literal: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{error}")]
pub struct ParseError {
    pub error: ParseErrorType,
    pub span: SrcSpan
}

impl ParseError {
    /// Short label for the source snippet plus extra notes.
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match &self.error {
            ParseErrorType::UnexpectedToken { expected, got } => {
                let found = match got {
                    Token::Int(_) => "an Int".to_string(),
                    Token::String(_) => "a String".to_string(),
                    Token::Ident(_) => "an Identifier".to_string(),
                    Token::Eof => "the end of input".to_string(),
                    _ if got.is_reserved_word() => format!("the keyword `{}`", got.as_literal()),
                    _ => format!("`{}`", got.as_literal())
                };

                ("Not expected this", vec![format!("Found {found}, expected `{expected}`")])
            },
            ParseErrorType::NoPrefixParseFn { token } => (
                "Cannot start an expression",
                vec![format!("`{}` cannot begin an expression", token.as_literal())]
            ),
            ParseErrorType::InvalidInteger { .. } => (
                "Integer literal out of range",
                vec![format!("Integers must fit in {} bits", i64::BITS)]
            ),
        }
    }
}
