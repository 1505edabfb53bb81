use std::fmt::Display;

use crate::{
    lexer::prelude::{Spanned, Token},
    parser::prelude::{
        infix_parse_fn, parse_error, prefix_parse_fn, InfixParse, Parse, ParseError,
        ParseErrorType, Parser, Precedence
    },
    utils::prelude::SrcSpan
};

#[derive(Debug)]
pub struct Parsed {
    pub program: Program,
    pub errors: Vec<ParseError>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Writes a statement sequence so that it parses back into the same
/// statements: an expression statement followed by another one gets a `;`.
fn write_statements(f: &mut std::fmt::Formatter<'_>, statements: &[Statement]) -> std::fmt::Result {
    for (idx, statement) in statements.iter().enumerate() {
        if idx > 0 {
            write!(f, " ")?;
        }

        write!(f, "{statement}")?;

        if matches!(statement, Statement::Expression(_)) && idx + 1 < statements.len() {
            write!(f, ";")?;
        }
    }

    Ok(())
}

fn join<T: Display>(items: &[T]) -> String {
    items.iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

// program -> { <statement> }
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub location: SrcSpan
}

impl Program {
    pub fn token_literal(&self) -> String {
        match self.statements.first() {
            Some(statement) => statement.token_literal(),
            None => "".to_string()
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_statements(f, &self.statements)
    }
}

// statement -> <let> | <return> | <expression_statement>
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
}

impl<T: Iterator<Item = Spanned>> Parse<T> for Statement {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let statement = match parser.current_token.1 {
            Token::Let => Self::Let(LetStatement::parse(parser, None)?),
            Token::Return => Self::Return(ReturnStatement::parse(parser, None)?),
            _ => Self::Expression(ExpressionStatement::parse(parser, None)?),
        };

        Ok(statement)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Let(statement) => write!(f, "{statement}"),
            Self::Return(statement) => write!(f, "{statement}"),
            Self::Expression(statement) => write!(f, "{statement}"),
        }
    }
}

impl Statement {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Let(statement) => statement.location,
            Self::Return(statement) => statement.location,
            Self::Expression(statement) => statement.location,
        }
    }

    pub fn token_literal(&self) -> String {
        match self {
            Self::Let(_) => Token::Let.as_literal(),
            Self::Return(_) => Token::Return.as_literal(),
            Self::Expression(statement) => statement.expression.token_literal(),
        }
    }
}

/// Consumes a trailing `;` if there is one and returns the statement end.
fn optional_semicolon<T: Iterator<Item = Spanned>>(parser: &mut Parser<T>, end: u32) -> u32 {
    if parser.current_is(&Token::Semicolon) {
        let (_, _, end) = parser.next_token();
        return end;
    }

    end
}

// let -> let <identifier> = <expression> [;]
#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub name: Identifier,
    pub value: Expression,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for LetStatement {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Let)?;

        let name = parser.expect_ident()?;

        parser.expect_one(Token::Assign)?;

        let value = Expression::parse(parser, None)?;
        let end = optional_semicolon(parser, value.location().end);

        Ok(Self {
            name,
            value,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for LetStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "let {} = {};", self.name, self.value)
    }
}

// return -> return <expression> [;]
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Expression,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for ReturnStatement {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Return)?;

        let value = Expression::parse(parser, None)?;
        let end = optional_semicolon(parser, value.location().end);

        Ok(Self {
            value,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for ReturnStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "return {};", self.value)
    }
}

// expression_statement -> <expression> [;]
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for ExpressionStatement {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let expression = Expression::parse(parser, None)?;

        let SrcSpan { start, end } = expression.location();
        let end = optional_semicolon(parser, end);

        Ok(Self {
            expression,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for ExpressionStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

// block -> { { <statement> } }
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for BlockStatement {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, mut end) = parser.expect_one(Token::LBrace)?;

        let mut statements = vec![];

        while !parser.current_is(&Token::RBrace) && !parser.current_is(&Token::Eof) {
            let statement = Statement::parse(parser, None)?;

            end = statement.location().end;
            statements.push(statement);
        }

        // an unclosed block simply ends at EOF
        if parser.current_is(&Token::RBrace) {
            let (_, _, rbrace_end) = parser.next_token();
            end = rbrace_end;
        }

        Ok(Self {
            statements,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.statements.is_empty() {
            return write!(f, "{{ }}");
        }

        write!(f, "{{ ")?;
        write_statements(f, &self.statements)?;
        write!(f, " }}")
    }
}

// expression -> <identifier> | <literal> | <prefix> | <infix> | <index> | <if>
//             | <function> | <macro> | <call> | <array> | <hash> | "(" <expression> ")"
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer(IntegerLiteral),
    String(StringLiteral),
    Boolean(BooleanLiteral),
    Prefix(Prefix),
    Infix(Infix),
    Index(Index),
    If(If),
    Function(FunctionLiteral),
    Macro(MacroLiteral),
    Call(Call),
    Array(ArrayLiteral),
    Hash(HashLiteral),
}

impl<T: Iterator<Item = Spanned>> Parse<T> for Expression {
    /// Pratt loop: run the prefix handler of the current token, then keep
    /// folding infix handlers while they bind tighter than `precedence`.
    fn parse(
        parser: &mut Parser<T>,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let precedence = precedence.unwrap_or(Precedence::Lowest);

        let prefix = match prefix_parse_fn::<T>(&parser.current_token.1) {
            Some(prefix) => prefix,
            None => return parse_error(
                ParseErrorType::NoPrefixParseFn {
                    token: parser.current_token.1.clone()
                },
                parser.current_span()
            )
        };

        let mut expr = prefix(parser)?;

        while !parser.current_is(&Token::Semicolon) && precedence < parser.current_precedence() {
            let infix = match infix_parse_fn::<T>(&parser.current_token.1) {
                Some(infix) => infix,
                None => break
            };

            expr = infix(parser, expr)?;
        }

        Ok(expr)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier(ident) => write!(f, "{ident}"),
            Self::Integer(literal) => write!(f, "{literal}"),
            Self::String(literal) => write!(f, "{literal}"),
            Self::Boolean(literal) => write!(f, "{literal}"),
            Self::Prefix(prefix) => write!(f, "{prefix}"),
            Self::Infix(infix) => write!(f, "{infix}"),
            Self::Index(index) => write!(f, "{index}"),
            Self::If(if_) => write!(f, "{if_}"),
            Self::Function(function) => write!(f, "{function}"),
            Self::Macro(macro_) => write!(f, "{macro_}"),
            Self::Call(call) => write!(f, "{call}"),
            Self::Array(array) => write!(f, "{array}"),
            Self::Hash(hash) => write!(f, "{hash}"),
        }
    }
}

impl Expression {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Identifier(ident) => ident.location,
            Self::Integer(literal) => literal.location,
            Self::String(literal) => literal.location,
            Self::Boolean(literal) => literal.location,
            Self::Prefix(prefix) => prefix.location,
            Self::Infix(infix) => infix.location,
            Self::Index(index) => index.location,
            Self::If(if_) => if_.location,
            Self::Function(function) => function.location,
            Self::Macro(macro_) => macro_.location,
            Self::Call(call) => call.location,
            Self::Array(array) => array.location,
            Self::Hash(hash) => hash.location,
        }
    }

    pub fn token_literal(&self) -> String {
        match self {
            Self::Identifier(ident) => ident.value.clone(),
            Self::Integer(literal) => literal.value.to_string(),
            Self::String(literal) => literal.value.clone(),
            Self::Boolean(literal) => literal.value.to_string(),
            Self::Prefix(prefix) => prefix.operator.as_literal(),
            Self::Infix(infix) => infix.operator.as_literal(),
            Self::Index(_) => Token::LBracket.as_literal(),
            Self::If(_) => Token::If.as_literal(),
            Self::Function(_) => Token::Function.as_literal(),
            Self::Macro(_) => Token::Macro.as_literal(),
            Self::Call(_) => Token::LParen.as_literal(),
            Self::Array(_) => Token::LBracket.as_literal(),
            Self::Hash(_) => Token::LBrace.as_literal(),
        }
    }
}

// identifier -> (<letter> | _) { <letter> | <digit> | _ }
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub value: String,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for Identifier {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.expect_ident()
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub value: i64,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for IntegerLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let span = parser.current_span();

        match parser.next_token() {
            (start, Token::Int(literal), end) => match literal.parse::<i64>() {
                Ok(value) => Ok(Self {
                    value,
                    location: SrcSpan { start, end }
                }),
                Err(_) => parse_error(ParseErrorType::InvalidInteger { literal }, span)
            },
            (_, token, _) => parse_error(
                ParseErrorType::UnexpectedToken {
                    expected: Token::Int(String::new()).kind(),
                    got: token
                },
                span
            )
        }
    }
}

impl Display for IntegerLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for StringLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let span = parser.current_span();

        match parser.next_token() {
            (start, Token::String(value), end) => Ok(Self {
                value,
                location: SrcSpan { start, end }
            }),
            (_, token, _) => parse_error(
                ParseErrorType::UnexpectedToken {
                    expected: Token::String(String::new()).kind(),
                    got: token
                },
                span
            )
        }
    }
}

impl Display for StringLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for BooleanLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let span = parser.current_span();

        let value = match parser.next_token().1 {
            Token::True => true,
            Token::False => false,
            token => return parse_error(
                ParseErrorType::UnexpectedToken {
                    expected: Token::True.kind(),
                    got: token
                },
                span
            )
        };

        Ok(Self { value, location: span })
    }
}

impl Display for BooleanLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

// prefix -> (! | -) <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub operator: Token,
    pub right: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for Prefix {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, operator, _) = parser.next_token();

        let right = Expression::parse(parser, Some(Precedence::Prefix))?;
        let end = right.location().end;

        Ok(Self {
            operator,
            right: Box::new(right),
            location: SrcSpan { start, end }
        })
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}{})", self.operator.as_literal(), self.right)
    }
}

// infix -> <expression> <operator> <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Infix {
    pub left: Box<Expression>,
    pub operator: Token,
    pub right: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> InfixParse<T> for Infix {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let precedence = parser.current_precedence();

        let (_, operator, _) = parser.next_token();

        let right = Expression::parse(parser, Some(precedence))?;
        let location = left.location().merge(right.location());

        Ok(Self {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            location
        })
    }
}

impl Display for Infix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator.as_literal(), self.right)
    }
}

// index -> <expression> [ <expression> ]
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub left: Box<Expression>,
    pub index: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> InfixParse<T> for Index {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.expect_one(Token::LBracket)?;

        let index = Expression::parse(parser, None)?;

        let (_, end) = parser.expect_one(Token::RBracket)?;
        let start = left.location().start;

        Ok(Self {
            left: Box::new(left),
            index: Box::new(index),
            location: SrcSpan { start, end }
        })
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

// if -> if <expression> <block> [else <block>]
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Box<Expression>,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for If {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::If)?;

        // `if (x)` is just a grouped condition
        let condition = Expression::parse(parser, None)?;

        let consequence = BlockStatement::parse(parser, None)?;
        let mut end = consequence.location.end;

        let alternative = if parser.current_is(&Token::Else) {
            parser.step();

            let alternative = BlockStatement::parse(parser, None)?;
            end = alternative.location.end;

            Some(alternative)
        } else {
            None
        };

        Ok(Self {
            condition: Box::new(condition),
            consequence,
            alternative,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for If {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if {} {}", self.condition, self.consequence)?;

        if let Some(alternative) = &self.alternative {
            write!(f, " else {alternative}")?;
        }

        Ok(())
    }
}

// function -> fn ( [<identifier> {, <identifier>}] ) <block>
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for FunctionLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Function)?;

        let parameters = parser.parse_parameters()?;
        let body = BlockStatement::parse(parser, None)?;
        let end = body.location.end;

        Ok(Self {
            parameters,
            body,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn({}) {}", join(&self.parameters), self.body)
    }
}

// macro -> macro ( [<identifier> {, <identifier>}] ) <block>
#[derive(Debug, Clone, PartialEq)]
pub struct MacroLiteral {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for MacroLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Macro)?;

        let parameters = parser.parse_parameters()?;
        let body = BlockStatement::parse(parser, None)?;
        let end = body.location.end;

        Ok(Self {
            parameters,
            body,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for MacroLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "macro({}) {}", join(&self.parameters), self.body)
    }
}

// call -> <expression> ( [<expression> {, <expression>}] )
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub location: SrcSpan
}

impl Call {
    /// Name of the callee when it is a plain identifier.
    pub fn callee_name(&self) -> Option<&str> {
        match self.function.as_ref() {
            Expression::Identifier(ident) => Some(&ident.value),
            _ => None
        }
    }
}

impl<T: Iterator<Item = Spanned>> InfixParse<T> for Call {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.expect_one(Token::LParen)?;

        let (arguments, end) = parser.parse_expression_list(Token::RParen)?;
        let start = left.location().start;

        Ok(Self {
            function: Box::new(left),
            arguments,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, join(&self.arguments))
    }
}

// array -> [ [<expression> {, <expression>}] ]
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for ArrayLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::LBracket)?;

        let (elements, end) = parser.parse_expression_list(Token::RBracket)?;

        Ok(Self {
            elements,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", join(&self.elements))
    }
}

// hash -> { [<expression> : <expression> {, <expression> : <expression>}] }
#[derive(Debug, Clone, PartialEq)]
pub struct HashLiteral {
    pub pairs: Vec<(Expression, Expression)>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = Spanned>> Parse<T> for HashLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::LBrace)?;

        let mut pairs = vec![];

        while !parser.current_is(&Token::RBrace) {
            let key = Expression::parse(parser, None)?;

            parser.expect_one(Token::Colon)?;

            let value = Expression::parse(parser, None)?;

            pairs.push((key, value));

            if !parser.current_is(&Token::RBrace) {
                parser.expect_one(Token::Comma)?;
            }
        }

        let (_, end) = parser.expect_one(Token::RBrace)?;

        Ok(Self {
            pairs,
            location: SrcSpan { start, end }
        })
    }
}

impl Display for HashLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs = self.pairs.iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<String>>();

        write!(f, "{{{}}}", pairs.join(", "))
    }
}
