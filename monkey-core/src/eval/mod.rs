#[cfg(test)]
mod tests;

pub mod builtins;
pub mod macros;

use std::rc::Rc;

use indexmap::IndexMap;

use tracing::trace;

use crate::{
    environment::prelude::{Env, Environment, Function, HashPair, Object, NULL},
    lexer::prelude::Token,
    parser::prelude::{BlockStatement, Call, Expression, HashLiteral, If, Program, Statement}
};

pub mod prelude {
    pub use super::{
        eval_program,
        eval_expression,
        builtins::*,
        macros::*
    };
}

/// Evaluates a whole program. A `return` at the top level stops evaluation
/// and yields the returned value itself.
pub fn eval_program(program: &Program, env: &Env) -> Object {
    let mut result = NULL;

    for statement in &program.statements {
        result = eval_statement(statement, env);

        match result {
            Object::ReturnValue { value } => return *value,
            Object::Error { .. } => return result,
            _ => {}
        }
    }

    result
}

/// Unlike [`eval_program`] the return wrapper is kept, so that a `return`
/// inside nested blocks reaches the enclosing function call.
pub(crate) fn eval_block(block: &BlockStatement, env: &Env) -> Object {
    let mut result = NULL;

    for statement in &block.statements {
        result = eval_statement(statement, env);

        if matches!(result, Object::ReturnValue { .. } | Object::Error { .. }) {
            return result;
        }
    }

    result
}

fn eval_statement(statement: &Statement, env: &Env) -> Object {
    match statement {
        Statement::Let(statement) => {
            let value = eval_expression(&statement.value, env);

            if value.is_error() {
                return value;
            }

            env.borrow_mut().set(statement.name.value.clone(), value);

            NULL
        },
        Statement::Return(statement) => {
            let value = eval_expression(&statement.value, env);

            if value.is_error() {
                return value;
            }

            Object::ReturnValue { value: Box::new(value) }
        },
        Statement::Expression(statement) => eval_expression(&statement.expression, env),
    }
}

pub fn eval_expression(expression: &Expression, env: &Env) -> Object {
    match expression {
        Expression::Integer(literal) => Object::Integer { value: literal.value },
        Expression::String(literal) => Object::string(literal.value.clone()),
        Expression::Boolean(literal) => Object::from_bool(literal.value),
        Expression::Identifier(ident) => eval_identifier(&ident.value, env),
        Expression::Prefix(prefix) => {
            let right = eval_expression(&prefix.right, env);

            if right.is_error() {
                return right;
            }

            eval_prefix_expression(&prefix.operator, right)
        },
        Expression::Infix(infix) => {
            let left = eval_expression(&infix.left, env);

            if left.is_error() {
                return left;
            }

            let right = eval_expression(&infix.right, env);

            if right.is_error() {
                return right;
            }

            eval_infix_expression(&infix.operator, left, right)
        },
        Expression::If(if_) => eval_if_expression(if_, env),
        Expression::Function(literal) => Object::Function(Rc::new(Function {
            parameters: literal.parameters.clone(),
            body: literal.body.clone(),
            env: env.clone()
        })),
        // macro literals only mean something to `define_macros`
        Expression::Macro(_) => NULL,
        Expression::Call(call) => eval_call_expression(call, env),
        Expression::Array(array) => match eval_expressions(&array.elements, env) {
            Ok(elements) => Object::array(elements),
            Err(err) => err
        },
        Expression::Index(index) => {
            let left = eval_expression(&index.left, env);

            if left.is_error() {
                return left;
            }

            let index = eval_expression(&index.index, env);

            if index.is_error() {
                return index;
            }

            eval_index_expression(left, index)
        },
        Expression::Hash(hash) => eval_hash_literal(hash, env),
    }
}

fn eval_identifier(name: &str, env: &Env) -> Object {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }

    match builtins::lookup(name) {
        Some(builtin) => builtin,
        None => Object::error(format!("identifier not found: {name}"))
    }
}

/// Evaluates left to right, stopping at the first error.
fn eval_expressions(expressions: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
    let mut result = Vec::with_capacity(expressions.len());

    for expression in expressions {
        let evaluated = eval_expression(expression, env);

        if evaluated.is_error() {
            return Err(evaluated);
        }

        result.push(evaluated);
    }

    Ok(result)
}

fn eval_prefix_expression(operator: &Token, right: Object) -> Object {
    match operator {
        Token::Bang => Object::from_bool(!right.is_truthy()),
        Token::Minus => match right {
            Object::Integer { value } => Object::Integer { value: value.wrapping_neg() },
            right => Object::error(format!("unknown operator: -{}", right._type()))
        },
        operator => Object::error(format!("unknown operator: {}{}", operator, right._type()))
    }
}

fn eval_infix_expression(operator: &Token, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer { value: l }, Object::Integer { value: r }) => {
            eval_integer_infix_expression(operator, *l, *r)
        },
        (Object::String { value: l }, Object::String { value: r }) => match operator {
            Token::Plus => Object::string(format!("{l}{r}")),
            _ => Object::error(format!("unknown operator: STRING {operator} STRING"))
        },
        _ => match operator {
            Token::Equal => Object::from_bool(left.is_identical(&right)),
            Token::NotEqual => Object::from_bool(!left.is_identical(&right)),
            _ if left._type() != right._type() => Object::error(format!(
                "type mismatch: {} {} {}", left._type(), operator, right._type()
            )),
            _ => Object::error(format!(
                "unknown operator: {} {} {}", left._type(), operator, right._type()
            ))
        }
    }
}

fn eval_integer_infix_expression(operator: &Token, left: i64, right: i64) -> Object {
    match operator {
        Token::Plus => Object::Integer { value: left.wrapping_add(right) },
        Token::Minus => Object::Integer { value: left.wrapping_sub(right) },
        Token::Asterisk => Object::Integer { value: left.wrapping_mul(right) },
        Token::Slash => match right {
            0 => Object::error("division by zero"),
            right => Object::Integer { value: left.wrapping_div(right) }
        },
        Token::LessThan => Object::from_bool(left < right),
        Token::GreaterThan => Object::from_bool(left > right),
        Token::Equal => Object::from_bool(left == right),
        Token::NotEqual => Object::from_bool(left != right),
        operator => Object::error(format!("unknown operator: INTEGER {operator} INTEGER"))
    }
}

fn eval_if_expression(if_: &If, env: &Env) -> Object {
    let condition = eval_expression(&if_.condition, env);

    if condition.is_error() {
        return condition;
    }

    if condition.is_truthy() {
        eval_block(&if_.consequence, env)
    } else if let Some(alternative) = &if_.alternative {
        eval_block(alternative, env)
    } else {
        NULL
    }
}

fn eval_call_expression(call: &Call, env: &Env) -> Object {
    if call.callee_name() == Some("quote") {
        return match call.arguments.as_slice() {
            [node] => macros::quote(node.clone(), env),
            arguments => Object::error(format!(
                "wrong number of arguments. got={}, want=1", arguments.len()
            ))
        };
    }

    let function = eval_expression(&call.function, env);

    if function.is_error() {
        return function;
    }

    match eval_expressions(&call.arguments, env) {
        Ok(arguments) => apply_function(function, arguments),
        Err(err) => err
    }
}

pub fn apply_function(function: Object, arguments: Vec<Object>) -> Object {
    match function {
        Object::Function(function) => {
            if function.parameters.len() != arguments.len() {
                return Object::error(format!(
                    "wrong number of arguments. got={}, want={}",
                    arguments.len(), function.parameters.len()
                ));
            }

            trace!(parameters = function.parameters.len(), "applying function");

            let env = Environment::new_enclosed(function.env.clone());

            for (param, argument) in function.parameters.iter().zip(arguments) {
                env.borrow_mut().set(param.value.clone(), argument);
            }

            unwrap_return_value(eval_block(&function.body, &env))
        },
        Object::Builtin { name, func } => {
            trace!(name, "applying builtin");

            func(arguments)
        },
        function => Object::error(format!("not a function: {}", function._type()))
    }
}

pub(crate) fn unwrap_return_value(object: Object) -> Object {
    match object {
        Object::ReturnValue { value } => *value,
        object => object
    }
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array { elements }, Object::Integer { value }) => {
            usize::try_from(*value).ok()
                .and_then(|idx| elements.get(idx))
                .cloned()
                .unwrap_or(NULL)
        },
        (Object::Hash { pairs }, _) => match index.hash_key() {
            Some(key) => pairs.get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or(NULL),
            None => Object::error(format!("unusable as hash key: {}", index._type()))
        },
        _ => Object::error(format!("index operator not supported: {}", left._type()))
    }
}

fn eval_hash_literal(hash: &HashLiteral, env: &Env) -> Object {
    let mut pairs = IndexMap::with_capacity(hash.pairs.len());

    for (key, value) in &hash.pairs {
        let key = eval_expression(key, env);

        if key.is_error() {
            return key;
        }

        let hash_key = match key.hash_key() {
            Some(hash_key) => hash_key,
            None => return Object::error(format!("unusable as hash key: {}", key._type()))
        };

        let value = eval_expression(value, env);

        if value.is_error() {
            return value;
        }

        pairs.insert(hash_key, HashPair { key, value });
    }

    Object::Hash { pairs: Rc::new(pairs) }
}
