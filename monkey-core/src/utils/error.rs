use std::path::PathBuf;

use termcolor::Buffer;
use thiserror::Error;

use crate::{
    eval::prelude::MacroError,
    parser::prelude::ParseError
};
use super::diagnostic::{Diagnostic, Label, Level, Location};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("failed to parse source code")]
    Parse {
        path: PathBuf,
        src: String,
        errors: Vec<ParseError>
    },
    #[error("macro expansion failed")]
    Macro {
        path: PathBuf,
        src: String,
        error: MacroError
    },
    #[error("IO operation failed")]
    StdIo {
        err: std::io::ErrorKind
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::StdIo { err: value.kind() }
    }
}

impl Error {
    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();
        self.pretty(&mut nocolor);
        String::from_utf8_lossy(&nocolor.into_inner()).into_owned()
    }

    pub fn pretty(&self, buf: &mut Buffer) {
        for diagnostic in self.to_diagnostics() {
            diagnostic.write(buf);
        }
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::Parse { path, src, errors } => errors.iter()
                .map(|error| {
                    let (label, notes) = error.details();

                    Diagnostic {
                        title: format!("Syntax error: {error}"),
                        notes,
                        level: Level::Error,
                        location: Some(Location {
                            src,
                            path: path.clone(),
                            label: Label {
                                text: Some(label.to_string()),
                                span: error.span,
                            },
                            extra_labels: vec![],
                        }),
                    }
                })
                .collect(),
            Error::Macro { path, src, error } => {
                let label = match error {
                    MacroError::NotQuote { .. } => "This call expands to a non quote",
                    MacroError::Evaluation { .. } => "Evaluation of the macro body failed",
                    MacroError::ArgumentCount { .. } => "Wrong number of arguments",
                };

                vec![Diagnostic {
                    title: "Macro expansion error".into(),
                    notes: vec![error.to_string()],
                    level: Level::Error,
                    location: Some(Location {
                        src,
                        path: path.clone(),
                        label: Label {
                            text: Some(label.to_string()),
                            span: error.location(),
                        },
                        extra_labels: vec![],
                    }),
                }]
            },
            Error::StdIo { err } => {
                vec![Diagnostic {
                    title: "Standard IO error".into(),
                    notes: vec![format!("{err}")],
                    level: Level::Error,
                    location: None,
                }]
            }
        }
    }
}

