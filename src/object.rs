use core::fmt;
use std::{collections::HashMap, rc::Rc};

use itertools::Itertools;

use crate::{
    ast::{BlockStatement, Identifier},
    environment::EnvId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Null,
    Array,
    Hash,
    Error,
    Function,
    Builtin,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::String => "STRING",
            Self::Null => "NULL",
            Self::Array => "ARRAY",
            Self::Hash => "HASH",
            Self::Error => "ERROR",
            Self::Function => "FUNCTION",
            Self::Builtin => "BUILTIN",
        })
    }
}

/// The subset of values usable as hash keys. Equal values always produce
/// equal keys, so lookups go by value rather than identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

pub type BuiltinFunction = fn(Vec<Object>) -> Object;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub function: BuiltinFunction,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

// Builtin names are unique, so the name identifies the function
impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A closure: the literal's parameters and body plus the frame it was
/// evaluated in.
#[derive(Debug, PartialEq)]
pub struct Function {
    pub parameters: Rc<[Identifier]>,
    pub body: Rc<BlockStatement>,
    pub env: EnvId,
}

// Value produced by evaluation. Aggregates are reference counted so copying
// an object around is cheap; the language has no way to mutate them in place
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
    Null,
    Array(Rc<Vec<Object>>),
    Hash(Rc<HashMap<HashKey, HashPair>>),
    Error(String),
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl Object {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Integer(_) => ObjectType::Integer,
            Self::Boolean(_) => ObjectType::Boolean,
            Self::String(_) => ObjectType::String,
            Self::Null => ObjectType::Null,
            Self::Array(_) => ObjectType::Array,
            Self::Hash(_) => ObjectType::Hash,
            Self::Error(_) => ObjectType::Error,
            Self::Function(_) => ObjectType::Function,
            Self::Builtin(_) => ObjectType::Builtin,
        }
    }

    pub fn inspect(&self) -> String {
        self.to_string()
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Boolean(false) | Self::Null)
    }

    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Self::Integer(value) => Some(HashKey::Integer(*value)),
            Self::Boolean(value) => Some(HashKey::Boolean(*value)),
            Self::String(value) => Some(HashKey::String(value.clone())),
            _ => None,
        }
    }

    /// Identity comparison as seen by `==` on values other than integers and
    /// strings. Booleans and null compare by value, aggregates by the
    /// allocation they share.
    pub fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Hash(a), Self::Hash(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            _ => false,
        }
    }

    pub(crate) fn string(value: impl Into<Rc<str>>) -> Self {
        Self::String(value.into())
    }

    pub(crate) fn array(elements: Vec<Object>) -> Self {
        Self::Array(Rc::new(elements))
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::String(value) => f.write_str(value),
            Self::Null => f.write_str("NULL"),
            Self::Array(elements) => write!(f, "[{}]", elements.iter().join(", ")),
            Self::Hash(pairs) => {
                let pairs = pairs.iter()
                    .sorted_by(|(a, _), (b, _)| a.cmp(b))
                    .map(|(_, pair)| format!("{}: {}", pair.key, pair.value))
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
            Self::Error(message) => write!(f, "ERROR: {}", message),
            Self::Function(function) => write!(f, "fn({}) {}", function.parameters.iter().join(", "), function.body),
            Self::Builtin(_) => f.write_str("builtin function"),
        }
    }
}
