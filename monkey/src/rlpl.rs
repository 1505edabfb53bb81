use monkey_core::lexer::prelude::{Lexer, Token};

use crate::cli::{handle_interrupt, read_line};

/// Read Lex Print Loop: prints every token of each line.
pub fn start() -> std::io::Result<()> {
	let stdin = std::io::stdin();

	handle_interrupt()?;

	while let Some(input) = read_line(&stdin)? {
		let lexer = Lexer::new(input.char_indices().map(|(i, c)| (i as u32, c)));

		for (start, token, end) in lexer {
			if token == Token::Eof {
				break;
			}

			println!("[{start}..{end}] {:<8} {:?}", token.kind(), token.as_literal());
		}
	}

	Ok(())
}
