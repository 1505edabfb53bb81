use monkey_core::parser::prelude::{parse_program, ParseError};

use crate::cli::{handle_interrupt, read_line};

/// Read Parse Print Loop: prints the canonical form of each parsed line.
pub fn start(print_ast: bool) -> std::io::Result<()> {
	let stdin = std::io::stdin();

	handle_interrupt()?;

	while let Some(input) = read_line(&stdin)? {
		let parsed = parse_program(&input);

		if parsed.has_errors() {
			print_parser_errors(&parsed.errors);
			continue;
		}

		if print_ast {
			println!("{:#?}", parsed.program);
		} else {
			println!("{}", parsed.program);
		}
	}

	Ok(())
}

pub fn print_parser_errors(errors: &[ParseError]) {
	println!("parser errors:");

	for error in errors {
		println!("\t{error}");
	}
}
