use itertools::Itertools;
use thiserror::Error;

use crate::{ast::InfixOperator, object::ObjectType};

/// Failure of a whole evaluation request. Runtime failures are not part of
/// this type: they are ordinary `Error` objects in the language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonkeyError {
    #[error("parser errors:\n\t{}", .0.iter().join("\n\t"))]
    Parse(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("unknown operator: -{0}")]
    UnknownPrefixOperator(ObjectType),

    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator { left: ObjectType, operator: InfixOperator, right: ObjectType },

    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch { left: ObjectType, operator: InfixOperator, right: ObjectType },

    #[error("division by zero")]
    DivisionByZero,

    #[error("not a function: {0}")]
    NotAFunction(ObjectType),

    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),

    #[error("unusable as hash key: {0}")]
    UnusableHashKey(ObjectType),

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),

    // Message of an error object produced by a builtin
    #[error("{0}")]
    Builtin(String),
}
