mod cli;
mod repl;
mod rlpl;
mod rppl;

use std::{path::PathBuf, process::ExitCode, sync::Once};

use clap::Parser;
use cli::{print_expanding, print_finished, print_running};
use monkey_core::{
    environment::prelude::Object,
    interpreter::{read_from_stream, Interpreter},
    utils::prelude::Error
};
use tracing::debug;

#[derive(Parser)]
enum Command {
    /// Evaluates a source file and prints its result
    Run {
        /// Path of source file
        path: PathBuf,
        /// Print the program after macro expansion instead of evaluating it
        #[arg(long, default_value_t = false)]
        expand: bool,
        /// Print the ast after macro expansion instead of evaluating it
        #[arg(long, default_value_t = false)]
        print_ast: bool,
    },
    /// Runs Read Eval Print Loop
    Repl,
    /// Runs Read Parse Print Loop
    Rppl {
        /// Print ast instead of parsed source code
        #[arg(long, default_value_t = false)]
        print_ast: bool,
    },
    /// Runs Read Lex Print Loop
    Rlpl,
}

static TRACING_INIT: Once = Once::new();

/// Enabled with `RUST_LOG`, e.g. `RUST_LOG=monkey_core=debug`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

fn main() -> ExitCode {
    init_tracing();

    let result = match Command::parse() {
        Command::Run { path, expand, print_ast } => run(path, expand, print_ast),
        Command::Repl => repl::start().map_err(Error::from),
        Command::Rppl { print_ast } => rppl::start(print_ast).map_err(Error::from),
        Command::Rlpl => rlpl::start().map_err(Error::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let buf_writer = cli::stderr_buffer_writer();
            let mut buf = buf_writer.buffer();

            err.pretty(&mut buf);
            buf_writer
                .print(&buf)
                .expect("Writing error to stderr");

            ExitCode::FAILURE
        }
    }
}

fn run(path: PathBuf, expand: bool, print_ast: bool) -> Result<(), Error> {
    let interpreter = Interpreter::new();
    let show_expansion = expand || print_ast;

    if show_expansion {
        print_expanding(&path.display().to_string());
    } else {
        print_running(&path.display().to_string());
    }

    let start = std::time::Instant::now();

    let (src, parsed) = read_from_stream(&path)?;
    let program = interpreter.prepare(path, src, parsed)?;

    debug!(statements = program.statements.len(), "program prepared");

    if print_ast {
        println!("{program:#?}");
    } else if expand {
        println!("{program}");
    } else {
        match interpreter.eval(&program) {
            Object::Null => {},
            evaluated => println!("{}", evaluated.inspect())
        }
    }

    print_finished(start.elapsed());

    Ok(())
}
