mod ast;
pub mod builtin;
mod context;
mod environment;
mod error;
mod interpreter;
mod lexer;
mod object;
mod parser;
mod stack;

#[cfg(test)]
mod test_utils;

pub use ast::{
    BlockStatement, CallExpression, Expression, ExpressionStatement, FunctionLiteral, HashLiteral, Identifier,
    IfExpression, IndexExpression, InfixExpression, InfixOperator, LetStatement, PrefixExpression, PrefixOperator,
    Program, ReturnStatement, Statement,
};
pub use context::{Config, EvaluationContext};
pub use environment::{EnvId, Environments};
pub use error::{MonkeyError, RuntimeError};
pub use interpreter::{evaluate_program, Runtime};
pub use lexer::{Lexer, Token, TokenKind};
pub use object::{Builtin, BuiltinFunction, Function, HashKey, HashPair, Object, ObjectType};
pub use parser::{parse, Parser};
