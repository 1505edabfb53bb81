
use std::path::PathBuf;

use tracing::debug;
use utf8_chars::BufReadCharsExt;

use crate::{
    environment::prelude::{Env, Environment, Object},
    eval::prelude::{define_macros, eval_program, expand_macros, MacroError},
    parser::prelude::{parse_program_from_stream, Parsed, Program},
    utils::prelude::Error
};

/// Evaluation and macro environments that live across inputs, so that a
/// binding or macro defined by one input is visible to the next.
pub struct Interpreter {
    pub env: Env,
    pub macro_env: Env,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            macro_env: Environment::new(),
        }
    }

    /// Collects macro definitions out of `program`, then expands their calls.
    pub fn expand(&self, mut program: Program) -> Result<Program, MacroError> {
        define_macros(&mut program, &self.macro_env);

        expand_macros(program, &self.macro_env)
    }

    pub fn eval(&self, program: &Program) -> Object {
        eval_program(program, &self.env)
    }

    /// Parses and expands a whole source file. Any parse error stops here,
    /// evaluation is left to the caller.
    pub fn prepare(&self, path: PathBuf, src: String, parsed: Parsed) -> Result<Program, Error> {
        if parsed.has_errors() {
            return Err(Error::Parse { path, src, errors: parsed.errors });
        }

        debug!(statements = parsed.program.statements.len(), "expanding macros");

        self.expand(parsed.program)
            .map_err(|error| Error::Macro { path, src, error })
    }

    pub fn run(&self, path: PathBuf) -> Result<Object, Error> {
        let (src, parsed) = read_from_stream(&path)?;
        let program = self.prepare(path, src, parsed)?;

        Ok(self.eval(&program))
    }
}

/// Parses the file while reading it, keeping a copy of the text for
/// diagnostics.
pub fn read_from_stream(path: &PathBuf) -> Result<(String, Parsed), Error> {
    let file = std::fs::File::open(path)?;

    let file_size = file.metadata()?.len() as usize;

    let mut src = String::with_capacity(file_size);
    let mut io_error = None;
    let mut reader = std::io::BufReader::new(file);

    let stream = reader.chars()
        .map_while(|c| match c {
            Ok(c) => {
                src.push(c);
                Some(c)
            },
            Err(err) => {
                io_error = Some(err);
                None
            }
        });

    let parsed = parse_program_from_stream(stream);

    match io_error {
        Some(err) => Err(err.into()),
        None => Ok((src, parsed))
    }
}
