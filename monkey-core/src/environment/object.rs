use std::{fmt::Display, rc::Rc};

use indexmap::IndexMap;

use crate::parser::prelude::{BlockStatement, Expression, Identifier};

use super::environment::Env;

pub const TRUE: Object = Object::Boolean { value: true };
pub const FALSE: Object = Object::Boolean { value: false };
pub const NULL: Object = Object::Null;

pub type BuiltinFunction = fn(Vec<Object>) -> Object;

#[derive(Debug, Clone)]
pub enum Object {
    Integer {
        value: i64
    },
    String {
        value: String
    },
    Boolean {
        value: bool
    },
    Null,
    Array {
        elements: Rc<Vec<Object>>
    },
    Hash {
        pairs: Rc<IndexMap<HashKey, HashPair>>
    },
    Function(Rc<Function>),
    Builtin {
        name: &'static str,
        func: BuiltinFunction
    },
    ReturnValue {
        value: Box<Object>
    },
    Error {
        message: String
    },
    Quote {
        node: Rc<Expression>
    },
    Macro(Rc<Macro>),
}

pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env
}

pub struct Macro {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env
}

// The captured environment may contain the closure itself.
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for Macro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Macro")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub object_type: ObjectType,
    pub value: u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    String,
    Boolean,
    Null,
    Array,
    Hash,
    Function,
    Builtin,
    ReturnValue,
    Error,
    Quote,
    Macro,
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::String => "STRING",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::Null => "NULL",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::ReturnValue => "RETURN_VALUE",
            ObjectType::Error => "ERROR",
            ObjectType::Quote => "QUOTE",
            ObjectType::Macro => "MACRO",
        };

        write!(f, "{name}")
    }
}

/// Equality of values as seen by tests and hosts: plain data compares by
/// content, closures and macros by identity so that environment cycles are
/// never walked. The language's own `==` is [`Object::is_identical`].
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer { value: l }, Object::Integer { value: r }) => l == r,
            (Object::String { value: l }, Object::String { value: r }) => l == r,
            (Object::Boolean { value: l }, Object::Boolean { value: r }) => l == r,
            (Object::Null, Object::Null) => true,
            (Object::Array { elements: l }, Object::Array { elements: r }) => l == r,
            (Object::Hash { pairs: l }, Object::Hash { pairs: r }) => l == r,
            (Object::Function(l), Object::Function(r)) => Rc::ptr_eq(l, r),
            (Object::Builtin { name: l, .. }, Object::Builtin { name: r, .. }) => l == r,
            (Object::ReturnValue { value: l }, Object::ReturnValue { value: r }) => l == r,
            (Object::Error { message: l }, Object::Error { message: r }) => l == r,
            (Object::Quote { node: l }, Object::Quote { node: r }) => l == r,
            (Object::Macro(l), Object::Macro(r)) => Rc::ptr_eq(l, r),
            _ => false
        }
    }
}

impl Object {
    pub fn _type(&self) -> ObjectType {
        match self {
            Self::Integer { .. } => ObjectType::Integer,
            Self::String { .. } => ObjectType::String,
            Self::Boolean { .. } => ObjectType::Boolean,
            Self::Null => ObjectType::Null,
            Self::Array { .. } => ObjectType::Array,
            Self::Hash { .. } => ObjectType::Hash,
            Self::Function(_) => ObjectType::Function,
            Self::Builtin { .. } => ObjectType::Builtin,
            Self::ReturnValue { .. } => ObjectType::ReturnValue,
            Self::Error { .. } => ObjectType::Error,
            Self::Quote { .. } => ObjectType::Quote,
            Self::Macro(_) => ObjectType::Macro,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }

    pub fn array(elements: Vec<Object>) -> Self {
        Self::Array { elements: Rc::new(elements) }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String { value: value.into() }
    }

    pub fn quote(node: Expression) -> Self {
        Self::Quote { node: Rc::new(node) }
    }

    pub fn from_bool(value: bool) -> Self {
        if value { TRUE } else { FALSE }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Everything except `false` and `null` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Boolean { value: false } | Self::Null)
    }

    /// Identity comparison behind the language's `==` for operands that are
    /// not both integers or both strings. Booleans and null are singletons,
    /// so comparing them by value is comparing by identity.
    pub fn is_identical(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Boolean { value: l }, Object::Boolean { value: r }) => l == r,
            (Object::Null, Object::Null) => true,
            (Object::Array { elements: l }, Object::Array { elements: r }) => Rc::ptr_eq(l, r),
            (Object::Hash { pairs: l }, Object::Hash { pairs: r }) => Rc::ptr_eq(l, r),
            (Object::Function(l), Object::Function(r)) => Rc::ptr_eq(l, r),
            (Object::Macro(l), Object::Macro(r)) => Rc::ptr_eq(l, r),
            (Object::Quote { node: l }, Object::Quote { node: r }) => Rc::ptr_eq(l, r),
            (Object::Builtin { name: l, .. }, Object::Builtin { name: r, .. }) => l == r,
            _ => false
        }
    }

    /// Map key for hashable objects: integers, strings and booleans.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Self::Integer { value } => *value as u64,
            Self::Boolean { value } => u64::from(*value),
            Self::String { value } => djb2(value),
            _ => return None
        };

        Some(HashKey { object_type: self._type(), value })
    }

    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

fn djb2(value: &str) -> u64 {
    value.chars().fold(5381u64, |hash, ch| {
        hash.wrapping_mul(33).wrapping_add(ch as u64)
    })
}

fn join_parameters(parameters: &[Identifier]) -> String {
    parameters.iter()
        .map(|param| param.value.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer { value } => write!(f, "{value}"),
            Object::String { value } => write!(f, "{value}"),
            Object::Boolean { value } => write!(f, "{value}"),
            Object::Null => write!(f, "null"),
            Object::Array { elements } => {
                let elements = elements.iter()
                    .map(|element| element.inspect())
                    .collect::<Vec<_>>();

                write!(f, "[{}]", elements.join(", "))
            },
            Object::Hash { pairs } => {
                let pairs = pairs.values()
                    .map(|pair| format!("{}: {}", pair.key.inspect(), pair.value.inspect()))
                    .collect::<Vec<_>>();

                write!(f, "{{{}}}", pairs.join(", "))
            },
            Object::Function(function) => {
                write!(f, "fn({}) {}", join_parameters(&function.parameters), function.body)
            },
            Object::Builtin { .. } => write!(f, "builtin function"),
            Object::ReturnValue { value } => write!(f, "{value}"),
            Object::Error { message } => write!(f, "ERROR: {message}"),
            Object::Quote { node } => write!(f, "QUOTE({node})"),
            Object::Macro(macro_) => {
                write!(f, "macro({}) {}", join_parameters(&macro_.parameters), macro_.body)
            },
        }
    }
}
