use crate::{lexer::prelude::{Lexer, Spanned, Token}, utils::prelude::SrcSpan};
use super::error::{ParseError, ParseErrorType};
use super::ast::{
    ArrayLiteral, BooleanLiteral, Call, Expression, FunctionLiteral, HashLiteral, Identifier,
    If, Index, Infix, IntegerLiteral, MacroLiteral, Parsed, Prefix, Program, Statement,
    StringLiteral,
};

pub trait Parse<T: Iterator<Item = Spanned>>
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser<T>,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

pub trait InfixParse<T: Iterator<Item = Spanned>>
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

pub type PrefixParseFn<T> = fn(&mut Parser<T>) -> Result<Expression, ParseError>;
pub type InfixParseFn<T> = fn(&mut Parser<T>, Expression) -> Result<Expression, ParseError>;

pub struct Parser<T: Iterator<Item = Spanned>> {
    pub current_token: Spanned,
    pub next_token: Spanned,
    pub errors: Vec<ParseError>,

    tokens: T,
}

impl<T: Iterator<Item = Spanned>> Parser<T> {
    pub fn new(mut input: T) -> Self {
        let current_token = input.next().unwrap_or((0, Token::Eof, 0));
        let next_token = input.next().unwrap_or((current_token.2, Token::Eof, current_token.2));

        Self {
            current_token,
            next_token,
            errors: vec![],

            tokens: input,
        }
    }

    pub fn step(&mut self) {
        let _ = self.next_token();
    }

    /// Advances by one token and returns the one that was current.
    pub fn next_token(&mut self) -> Spanned {
        let end = self.next_token.2;
        let next = self.tokens.next().unwrap_or((end, Token::Eof, end));

        let next_token = std::mem::replace(&mut self.next_token, next);

        std::mem::replace(&mut self.current_token, next_token)
    }

    pub fn current_is(&self, token: &Token) -> bool {
        self.current_token.1 == *token
    }

    pub fn current_span(&self) -> SrcSpan {
        SrcSpan { start: self.current_token.0, end: self.current_token.2 }
    }

    pub fn current_precedence(&self) -> Precedence {
        Precedence::from(&self.current_token.1)
    }

    /// Parses statements up to EOF. Never stops at the first error: a broken
    /// statement is dropped, its error recorded, and parsing resumes after the
    /// next `;`.
    pub fn parse_program(&mut self) -> Parsed {
        let start = self.current_token.0;
        let mut statements = vec![];

        while !self.current_is(&Token::Eof) {
            match Statement::parse(self, None) {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        let program = Program {
            statements,
            location: SrcSpan { start, end: self.current_token.2 }
        };

        Parsed {
            program,
            errors: std::mem::take(&mut self.errors)
        }
    }

    fn synchronize(&mut self) {
        while !self.current_is(&Token::Semicolon) && !self.current_is(&Token::Eof) {
            self.step();
        }

        if self.current_is(&Token::Semicolon) {
            self.step();
        }
    }

    pub fn expect_one(&mut self, token: Token) -> Result<(u32, u32), ParseError> {
        if self.current_token.1 == token {
            let (start, _, end) = self.next_token();

            return Ok((start, end));
        }

        parse_error(
            ParseErrorType::UnexpectedToken {
                expected: token.kind(),
                got: self.current_token.1.clone(),
            },
            self.current_span()
        )
    }

    pub fn expect_ident(&mut self) -> Result<Identifier, ParseError> {
        match &self.current_token.1 {
            Token::Ident(_) => {
                let (start, token, end) = self.next_token();

                Ok(Identifier {
                    value: token.as_literal(),
                    location: SrcSpan { start, end }
                })
            },
            token => parse_error(
                ParseErrorType::UnexpectedToken {
                    expected: Token::Ident(String::new()).kind(),
                    got: token.clone(),
                },
                self.current_span()
            )
        }
    }

    /// Comma separated expressions up to `end`, which is consumed.
    /// Returns the list and the end offset of the terminator.
    pub fn parse_expression_list(&mut self, end: Token) -> Result<(Vec<Expression>, u32), ParseError> {
        let mut list = vec![];

        if self.current_is(&end) {
            let (_, end) = self.expect_one(end)?;
            return Ok((list, end));
        }

        list.push(Expression::parse(self, None)?);

        while self.current_is(&Token::Comma) {
            self.step();
            list.push(Expression::parse(self, None)?);
        }

        let (_, end) = self.expect_one(end)?;

        Ok((list, end))
    }

    /// `( ident {, ident} )`
    pub fn parse_parameters(&mut self) -> Result<Vec<Identifier>, ParseError> {
        let mut parameters = vec![];

        self.expect_one(Token::LParen)?;

        if self.current_is(&Token::RParen) {
            self.step();
            return Ok(parameters);
        }

        parameters.push(self.expect_ident()?);

        while self.current_is(&Token::Comma) {
            self.step();
            parameters.push(self.expect_ident()?);
        }

        self.expect_one(Token::RParen)?;

        Ok(parameters)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl From<&Token> for Precedence {
    fn from(value: &Token) -> Self {
        match value {
            Token::Equal | Token::NotEqual => Self::Equals,
            Token::LessThan | Token::GreaterThan => Self::LessGreater,
            Token::Plus | Token::Minus => Self::Sum,
            Token::Slash | Token::Asterisk => Self::Product,
            Token::LParen => Self::Call,
            Token::LBracket => Self::Index,
            _ => Self::Lowest,
        }
    }
}

/// Handler for a token that can begin an expression.
pub fn prefix_parse_fn<T: Iterator<Item = Spanned>>(token: &Token) -> Option<PrefixParseFn<T>> {
    let parse_fn = match token {
        Token::Ident(_) => parse_identifier::<T> as PrefixParseFn<T>,
        Token::Int(_) => parse_integer_literal::<T>,
        Token::String(_) => parse_string_literal::<T>,
        Token::True | Token::False => parse_boolean_literal::<T>,
        Token::Bang | Token::Minus => parse_prefix_expression::<T>,
        Token::LParen => parse_grouped_expression::<T>,
        Token::If => parse_if_expression::<T>,
        Token::Function => parse_function_literal::<T>,
        Token::Macro => parse_macro_literal::<T>,
        Token::LBracket => parse_array_literal::<T>,
        Token::LBrace => parse_hash_literal::<T>,
        _ => return None
    };

    Some(parse_fn)
}

/// Handler for a token that continues an expression.
pub fn infix_parse_fn<T: Iterator<Item = Spanned>>(token: &Token) -> Option<InfixParseFn<T>> {
    let parse_fn = match token {
        token if token.is_infix_operator() => parse_infix_expression::<T> as InfixParseFn<T>,
        Token::LParen => parse_call_expression::<T>,
        Token::LBracket => parse_index_expression::<T>,
        _ => return None
    };

    Some(parse_fn)
}

fn parse_identifier<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::Identifier(Identifier::parse(parser, None)?))
}

fn parse_integer_literal<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::Integer(IntegerLiteral::parse(parser, None)?))
}

fn parse_string_literal<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::String(StringLiteral::parse(parser, None)?))
}

fn parse_boolean_literal<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::Boolean(BooleanLiteral::parse(parser, None)?))
}

fn parse_prefix_expression<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::Prefix(Prefix::parse(parser, None)?))
}

fn parse_grouped_expression<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    parser.expect_one(Token::LParen)?;

    let expression = Expression::parse(parser, Some(Precedence::Lowest))?;

    parser.expect_one(Token::RParen)?;

    Ok(expression)
}

fn parse_if_expression<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::If(If::parse(parser, None)?))
}

fn parse_function_literal<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::Function(FunctionLiteral::parse(parser, None)?))
}

fn parse_macro_literal<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::Macro(MacroLiteral::parse(parser, None)?))
}

fn parse_array_literal<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::Array(ArrayLiteral::parse(parser, None)?))
}

fn parse_hash_literal<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>) -> Result<Expression, ParseError> {
    Ok(Expression::Hash(HashLiteral::parse(parser, None)?))
}

fn parse_infix_expression<T: Iterator<Item = Spanned>>(
    parser: &mut Parser<T>,
    left: Expression
) -> Result<Expression, ParseError> {
    Ok(Expression::Infix(Infix::parse(parser, left, None)?))
}

fn parse_call_expression<T: Iterator<Item = Spanned>>(
    parser: &mut Parser<T>,
    left: Expression
) -> Result<Expression, ParseError> {
    Ok(Expression::Call(Call::parse(parser, left, None)?))
}

fn parse_index_expression<T: Iterator<Item = Spanned>>(
    parser: &mut Parser<T>,
    left: Expression
) -> Result<Expression, ParseError> {
    Ok(Expression::Index(Index::parse(parser, left, None)?))
}

pub fn parse_program(src: &str) -> Parsed {
    let lexer = Lexer::new(src.char_indices().map(|(i, c)| (i as u32, c)));
    let mut parser = Parser::new(lexer);

    parser.parse_program()
}

pub fn parse_program_from_stream(stream: impl Iterator<Item = char>) -> Parsed {
    let lexer = Lexer::new(stream
        .scan(0, |pos, c| {
            *pos += c.len_utf8() as u32;
            Some((*pos - c.len_utf8() as u32, c))
        })
    );
    let mut parser = Parser::new(lexer);

    parser.parse_program()
}

pub fn parse_error<T>(error: ParseErrorType, span: SrcSpan) -> Result<T, ParseError> {
    Err(ParseError { error, span })
}
