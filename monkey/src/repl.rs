use monkey_core::{
	environment::prelude::Object,
	interpreter::Interpreter,
	parser::prelude::parse_program
};

use crate::{
	cli::{handle_interrupt, read_line},
	rppl::print_parser_errors
};

const WELCOME: &str = "Welcome to the Monkey programming language!
Type some legal Monkey statements, `.exit` or Ctrl-C to leave.
An infinite loop runs forever, there is no way to interrupt it but Ctrl-C.";

/// Read Eval Print Loop. Bindings and macros persist from line to line.
pub fn start() -> std::io::Result<()> {
	let stdin = std::io::stdin();
	let interpreter = Interpreter::new();

	handle_interrupt()?;

	println!("{WELCOME}");

	while let Some(input) = read_line(&stdin)? {
		let parsed = parse_program(&input);

		if parsed.has_errors() {
			print_parser_errors(&parsed.errors);
			continue;
		}

		let program = match interpreter.expand(parsed.program) {
			Ok(program) => program,
			Err(err) => {
				println!("macro error: {err}");
				continue;
			}
		};

		match interpreter.eval(&program) {
			Object::Null => {},
			evaluated => println!("{}", evaluated.inspect())
		}
	}

	Ok(())
}
