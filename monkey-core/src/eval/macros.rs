use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::{
    environment::prelude::{Env, Environment, Macro, Object, ObjectType},
    lexer::prelude::Token,
    parser::prelude::{
        ArrayLiteral, BooleanLiteral, Call, Expression, HashLiteral, Infix, IntegerLiteral,
        LetStatement, Modify, Prefix, Program, Statement, StringLiteral
    },
    utils::prelude::SrcSpan
};

use super::{eval_block, eval_expression, unwrap_return_value};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MacroError {
    #[error("macro `{name}` must return a quoted node, got {got}")]
    NotQuote {
        name: String,
        got: ObjectType,
        location: SrcSpan
    },
    #[error("{message}")]
    Evaluation {
        message: String,
        location: SrcSpan
    },
    #[error("wrong number of arguments to macro `{name}`. got={got}, want={want}")]
    ArgumentCount {
        name: String,
        got: usize,
        want: usize,
        location: SrcSpan
    },
}

impl MacroError {
    pub fn location(&self) -> SrcSpan {
        match self {
            MacroError::NotQuote { location, .. }
            | MacroError::Evaluation { location, .. }
            | MacroError::ArgumentCount { location, .. } => *location
        }
    }
}

/// Moves every top level `let <name> = macro(...) {...}` out of `program`
/// and into `env`. Other statements keep their order.
pub fn define_macros(program: &mut Program, env: &Env) {
    let statements = std::mem::take(&mut program.statements);

    program.statements = statements.into_iter()
        .filter_map(|statement| match statement {
            Statement::Let(LetStatement { name, value: Expression::Macro(literal), .. }) => {
                debug!(name = %name.value, "defining macro");

                let macro_ = Macro {
                    parameters: literal.parameters,
                    body: literal.body,
                    env: env.clone()
                };

                env.borrow_mut().set(name.value, Object::Macro(Rc::new(macro_)));

                None
            },
            statement => Some(statement)
        })
        .collect();
}

/// Replaces every call of a macro defined in `env` with the syntax the
/// macro body produces. Arguments are handed to the body unevaluated,
/// each wrapped in a quote.
pub fn expand_macros(program: Program, env: &Env) -> Result<Program, MacroError> {
    program.modify(&mut |expression: Expression| match expression {
        Expression::Call(call) => match lookup_macro(&call, env) {
            Some((name, macro_)) => expand_macro_call(name, &macro_, call),
            None => Ok(Expression::Call(call))
        },
        expression => Ok(expression)
    })
}

fn lookup_macro(call: &Call, env: &Env) -> Option<(String, Rc<Macro>)> {
    let name = call.callee_name()?;

    match env.borrow().get(name) {
        Some(Object::Macro(macro_)) => Some((name.to_string(), macro_)),
        _ => None
    }
}

fn expand_macro_call(name: String, macro_: &Macro, call: Call) -> Result<Expression, MacroError> {
    let location = call.location;

    if macro_.parameters.len() != call.arguments.len() {
        return Err(MacroError::ArgumentCount {
            name,
            got: call.arguments.len(),
            want: macro_.parameters.len(),
            location
        });
    }

    debug!(%name, %location, "expanding macro call");

    let eval_env = Environment::new_enclosed(macro_.env.clone());

    for (param, argument) in macro_.parameters.iter().zip(call.arguments) {
        eval_env.borrow_mut().set(param.value.clone(), Object::quote(argument));
    }

    match unwrap_return_value(eval_block(&macro_.body, &eval_env)) {
        Object::Quote { node } => Ok(Rc::try_unwrap(node).unwrap_or_else(|node| node.as_ref().clone())),
        Object::Error { message } => Err(MacroError::Evaluation { message, location }),
        evaluated => Err(MacroError::NotQuote { name, got: evaluated._type(), location })
    }
}

/// Captures `node` without evaluating it. Inside it, every `unquote(x)` is
/// replaced with the syntax of `x` evaluated in `env`.
pub fn quote(node: Expression, env: &Env) -> Object {
    let quoted = node.modify(&mut |expression: Expression| match expression {
        Expression::Call(call) if is_unquote_call(&call) => {
            object_to_expression(eval_expression(&call.arguments[0], env), call.location)
        },
        expression => Ok(expression)
    });

    match quoted {
        Ok(node) => Object::quote(node),
        Err(err) => err
    }
}

fn is_unquote_call(call: &Call) -> bool {
    call.callee_name() == Some("unquote") && call.arguments.len() == 1
}

/// Turns a value back into syntax that evaluates to an equal value.
fn object_to_expression(object: Object, location: SrcSpan) -> Result<Expression, Object> {
    let expression = match object {
        Object::Integer { value } => integer_to_expression(value, location),
        Object::Boolean { value } => Expression::Boolean(BooleanLiteral { value, location }),
        Object::String { value } => Expression::String(StringLiteral { value, location }),
        Object::Quote { node } => node.as_ref().clone(),
        Object::Array { elements } => {
            let elements = elements.iter()
                .map(|element| object_to_expression(element.clone(), location))
                .collect::<Result<Vec<_>, Object>>()?;

            Expression::Array(ArrayLiteral { elements, location })
        },
        Object::Hash { pairs } => {
            let pairs = pairs.values()
                .map(|pair| Ok((
                    object_to_expression(pair.key.clone(), location)?,
                    object_to_expression(pair.value.clone(), location)?
                )))
                .collect::<Result<Vec<_>, Object>>()?;

            Expression::Hash(HashLiteral { pairs, location })
        },
        Object::Error { .. } => return Err(object),
        object => return Err(Object::error(format!(
            "cannot unquote {}: it has no syntax", object._type()
        )))
    };

    Ok(expression)
}

/// Literals are never negative, so negative values become `-(n)`.
/// `i64::MIN` has no positive counterpart and is spelled `(-i64::MAX - 1)`.
fn integer_to_expression(value: i64, location: SrcSpan) -> Expression {
    let literal = |value: i64| Expression::Integer(IntegerLiteral { value, location });
    let negate = |right: Expression| Expression::Prefix(Prefix {
        operator: Token::Minus,
        right: Box::new(right),
        location
    });

    match value {
        i64::MIN => Expression::Infix(Infix {
            left: Box::new(negate(literal(i64::MAX))),
            operator: Token::Minus,
            right: Box::new(literal(1)),
            location
        }),
        value if value < 0 => negate(literal(-value)),
        value => literal(value)
    }
}
