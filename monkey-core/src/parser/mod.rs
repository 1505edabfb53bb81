pub mod error;
pub mod parser;
pub mod ast;
pub mod modify;

pub mod prelude {
    pub use super::{
        error::*,
        parser::*,
        ast::*,
        modify::*
    };
}
