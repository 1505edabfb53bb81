use super::token::Token;
use std::fmt::Display;

pub type Spanned = (u32, Token, u32);

pub fn str_to_keyword(word: &str) -> Option<Token> {
	Some(match word {
		"fn" => Token::Function,
		"let" => Token::Let,
		"true" => Token::True,
		"false" => Token::False,
		"if" => Token::If,
		"else" => Token::Else,
		"return" => Token::Return,
		"macro" => Token::Macro,

		_ => return None
	})
}

fn is_ident_start(ch: char) -> bool {
	ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '_'
}

#[derive(Debug)]
pub struct Lexer<T: Iterator<Item = (u32, char)>> {
	position: u32,
	next_position: u32,
	ch: Option<char>,
	next_ch: Option<char>,
	input: T,
}

impl<T: Iterator<Item = (u32, char)>> Display for Lexer<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f,
			"Lexer {{\n\tposition: {},\n\tnext_position: {},\n\tch: {:?}, next_ch: {:?}\n}}",
			self.position, self.next_position, self.ch, self.next_ch
		)
	}
}

impl<T: Iterator<Item = (u32, char)>> Lexer<T> {
	pub fn new(input: T) -> Self {
        let mut lexer = Self {
            position: 0,
            next_position: 0,
            ch: None,
			next_ch: None,
            input,
        };

        lexer.next_char();
        lexer.next_char();

        lexer
    }

	/// Never fails: unknown characters come out as `Token::Illegal`
	/// and the end of input keeps producing `Token::Eof`.
    pub fn next_token(&mut self) -> Spanned {
		self.skip_whitespace();

		match self.ch {
			Some(ch) => match ch {
				'=' => match self.next_ch {
					Some('=') => self.eat_two_chars(Token::Equal),
					_ => self.eat_one_char(Token::Assign),
				},
				'!' => match self.next_ch {
					Some('=') => self.eat_two_chars(Token::NotEqual),
					_ => self.eat_one_char(Token::Bang),
				},
				'+' => self.eat_one_char(Token::Plus),
				'-' => self.eat_one_char(Token::Minus),
				'*' => self.eat_one_char(Token::Asterisk),
				'/' => self.eat_one_char(Token::Slash),
				'<' => self.eat_one_char(Token::LessThan),
				'>' => self.eat_one_char(Token::GreaterThan),
				',' => self.eat_one_char(Token::Comma),
				';' => self.eat_one_char(Token::Semicolon),
				':' => self.eat_one_char(Token::Colon),
				'(' => self.eat_one_char(Token::LParen),
				')' => self.eat_one_char(Token::RParen),
				'{' => self.eat_one_char(Token::LBrace),
				'}' => self.eat_one_char(Token::RBrace),
				'[' => self.eat_one_char(Token::LBracket),
				']' => self.eat_one_char(Token::RBracket),
				'"' => self.lex_string(),
				c if is_ident_start(c) => self.lex_ident(),
				c if c.is_ascii_digit() => self.lex_number(),
				c => self.eat_one_char(Token::Illegal(c)),
			},
			None => {
				let location = self.position;
				(location, Token::Eof, location)
			}
		}
    }

	fn next_char(&mut self) -> Option<char> {
		let ch = self.ch;

		let next = match self.input.next() {
			Some((pos, ch)) => {
				self.position = self.next_position;
				self.next_position = pos;

				Some(ch)
			},
			None => {
				self.position = self.next_position;
				self.next_position += 1;

				None
			}
		};

		self.ch = self.next_ch;
		self.next_ch = next;

		ch
	}

	fn skip_whitespace(&mut self) {
		while let Some(' ' | '\t' | '\n' | '\r' | '\x0C') = self.ch {
			self.next_char();
		}
	}

	fn eat_one_char(&mut self, token: Token) -> Spanned {
		let start_pos = self.position;
		self.next_char();
		let end_pos = self.position;

		(start_pos, token, end_pos)
	}

	fn eat_two_chars(&mut self, token: Token) -> Spanned {
		let start_pos = self.position;
		self.next_char();
		self.next_char();
		let end_pos = self.position;

		(start_pos, token, end_pos)
	}

	fn lex_ident(&mut self) -> Spanned {
        let start_pos = self.position;
		let mut ident = String::new();

		while let Some(ch) = self.ch {
			if !is_ident_continue(ch) {
				break;
			}

			ident.push(ch);
			self.next_char();
		}

        let end_pos = self.position;

        match str_to_keyword(&ident) {
			Some(keyword) => (start_pos, keyword, end_pos),
			None => (start_pos, Token::Ident(ident), end_pos)
		}
	}

	fn lex_number(&mut self) -> Spanned {
		let start_pos = self.position;
		let mut value = String::new();

		while let Some(ch) = self.ch {
			if !ch.is_ascii_digit() {
				break;
			}

			value.push(ch);
			self.next_char();
		}

		let end_pos = self.position;

		(start_pos, Token::Int(value), end_pos)
	}

	fn lex_string(&mut self) -> Spanned {
		let start_pos = self.position;
		let mut value = String::new();

		self.next_char(); // skip opening quote

		loop {
			match self.ch {
				Some('"') => {
					self.next_char();
					break;
				},
				Some(ch) => {
					value.push(ch);
					self.next_char();
				},
				// unterminated string runs to the end of input
				None => break
			}
		}

		let end_pos = self.position;

		(start_pos, Token::String(value), end_pos)
	}
}

impl<T: Iterator<Item = (u32, char)>> Iterator for Lexer<T> {
	type Item = Spanned;

	fn next(&mut self) -> Option<Self::Item> {
		Some(self.next_token())
	}
}

/// Lexes a whole string, stopping after the first `Eof`.
pub fn tokenize(src: &str) -> Vec<Spanned> {
	let mut lexer = Lexer::new(src.char_indices().map(|(i, c)| (i as u32, c)));
	let mut tokens = vec![];

	loop {
		let spanned = lexer.next_token();
		let is_eof = spanned.1 == Token::Eof;

		tokens.push(spanned);

		if is_eof {
			break;
		}
	}

	tokens
}
