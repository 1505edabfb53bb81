use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Illegal(char),
    Eof,

    // Идентификаторы и литералы
    Ident(String),
    Int(String),
    String(String),

    // Операторы
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    LessThan,
    GreaterThan,
    Equal,
    NotEqual,

    // Разделители
    Comma,
    Semicolon,
    Colon,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Ключевые слова
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
    Macro,
}

impl Token {
    pub fn is_reserved_word(&self) -> bool {
        matches!(
            self,
            Token::Function
            | Token::Let
            | Token::True
            | Token::False
            | Token::If
            | Token::Else
            | Token::Return
            | Token::Macro
        )
    }

    pub fn is_infix_operator(&self) -> bool {
        matches!(
            self,
            Token::Plus
            | Token::Minus
            | Token::Asterisk
            | Token::Slash
            | Token::LessThan
            | Token::GreaterThan
            | Token::Equal
            | Token::NotEqual
        )
    }

    /// Kind name used in parser diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Illegal(_) => "ILLEGAL",
            Token::Eof => "EOF",
            Token::Ident(_) => "IDENT",
            Token::Int(_) => "INT",
            Token::String(_) => "STRING",
            Token::Assign => "=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Bang => "!",
            Token::Asterisk => "*",
            Token::Slash => "/",
            Token::LessThan => "<",
            Token::GreaterThan => ">",
            Token::Equal => "==",
            Token::NotEqual => "!=",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Function => "FUNCTION",
            Token::Let => "LET",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::If => "IF",
            Token::Else => "ELSE",
            Token::Return => "RETURN",
            Token::Macro => "MACRO",
        }
    }

    pub fn as_literal(&self) -> String {
        match self {
            Token::Illegal(ch) => ch.to_string(),
            Token::Eof => "".to_string(),
            Token::Ident(value)
            | Token::Int(value)
            | Token::String(value) => value.clone(),
            Token::Function => "fn".to_string(),
            Token::Let => "let".to_string(),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::If => "if".to_string(),
            Token::Else => "else".to_string(),
            Token::Return => "return".to_string(),
            Token::Macro => "macro".to_string(),
            token => token.kind().to_string(),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_literal())
    }
}
