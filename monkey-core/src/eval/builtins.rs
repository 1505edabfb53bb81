use std::rc::Rc;

use crate::environment::prelude::{BuiltinFunction, Object, NULL};

const BUILTINS: &[(&str, BuiltinFunction)] = &[
    ("len", len),
    ("first", first),
    ("last", last),
    ("rest", rest),
    ("push", push),
    ("puts", puts),
];

/// Native function bound to `name`, if any. Consulted only after the
/// environment lookup fails, so user bindings shadow builtins.
pub fn lookup(name: &str) -> Option<Object> {
    BUILTINS.iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|&(name, func)| Object::Builtin { name, func })
}

fn wrong_number_of_arguments(got: usize, want: usize) -> Object {
    Object::error(format!("wrong number of arguments. got={got}, want={want}"))
}

fn len(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_number_of_arguments(args.len(), 1);
    }

    match &args[0] {
        Object::String { value } => Object::Integer { value: value.chars().count() as i64 },
        Object::Array { elements } => Object::Integer { value: elements.len() as i64 },
        arg => Object::error(format!("argument to \"len\" not supported, got {}", arg._type()))
    }
}

/// Shared argument checks of the single array builtins.
fn array_argument<'a>(name: &str, args: &'a [Object]) -> Result<&'a Rc<Vec<Object>>, Object> {
    if args.len() != 1 {
        return Err(wrong_number_of_arguments(args.len(), 1));
    }

    match &args[0] {
        Object::Array { elements } => Ok(elements),
        arg => Err(Object::error(format!(
            "argument to \"{name}\" must be ARRAY, got {}", arg._type()
        )))
    }
}

fn first(args: Vec<Object>) -> Object {
    match array_argument("first", &args) {
        Ok(elements) => elements.first().cloned().unwrap_or(NULL),
        Err(err) => err
    }
}

fn last(args: Vec<Object>) -> Object {
    match array_argument("last", &args) {
        Ok(elements) => elements.last().cloned().unwrap_or(NULL),
        Err(err) => err
    }
}

fn rest(args: Vec<Object>) -> Object {
    match array_argument("rest", &args) {
        Ok(elements) if elements.is_empty() => NULL,
        Ok(elements) => Object::array(elements[1..].to_vec()),
        Err(err) => err
    }
}

fn push(args: Vec<Object>) -> Object {
    if args.len() != 2 {
        return wrong_number_of_arguments(args.len(), 2);
    }

    match (&args[0], &args[1]) {
        (Object::Array { elements }, value) => {
            let mut elements = elements.as_ref().clone();
            elements.push(value.clone());

            Object::array(elements)
        },
        (arg, _) => Object::error(format!(
            "argument to \"push\" must be ARRAY, got {}", arg._type()
        ))
    }
}

fn puts(args: Vec<Object>) -> Object {
    for arg in args {
        println!("{}", arg.inspect());
    }

    NULL
}
