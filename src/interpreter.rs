use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{
        BlockStatement, CallExpression, Expression, FunctionLiteral, HashLiteral, IfExpression, IndexExpression,
        InfixExpression, InfixOperator, LetStatement, PrefixExpression, PrefixOperator, Program, ReturnStatement,
        Statement,
    },
    builtin,
    environment::{EnvId, Environments},
    error::RuntimeError,
    object::{Function, HashPair, Object},
    stack::ensure_sufficient_stack,
};

/// Anything that cuts evaluation short. A `return` travels up to the nearest
/// function call, an error all the way up to the program.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Signal {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Signal {
    fn from(error: RuntimeError) -> Self {
        Self::Error(error)
    }
}

pub(crate) type EvaluationResult = Result<Object, Signal>;

/// Mutable state shared by one evaluation: the environment arena and the
/// current call depth.
#[derive(Debug)]
pub struct Runtime {
    pub environments: Environments,
    depth: usize,
    max_call_depth: usize,
}

impl Runtime {
    pub fn new(max_call_depth: usize) -> Self {
        Self { environments: Environments::new(), depth: 0, max_call_depth }
    }
}

/// Evaluate every statement of `program` in `env`. The result is the value of
/// the last statement, the value of a top level `return`, or the `Error`
/// object of the first failure.
pub fn evaluate_program(program: &Program, env: EnvId, runtime: &mut Runtime) -> Object {
    let mut result = Object::Null;

    for statement in &program.statements {
        match evaluate_statement(statement, env, runtime) {
            Ok(value) => result = value,
            Err(Signal::Return(value)) => return value,
            Err(Signal::Error(error)) => {
                tracing::debug!(%error, "evaluation failed");
                return Object::Error(error.to_string());
            }
        }
    }

    result
}

fn evaluate_block(block: &BlockStatement, env: EnvId, runtime: &mut Runtime) -> EvaluationResult {
    let mut result = Object::Null;
    for statement in &block.statements {
        result = evaluate_statement(statement, env, runtime)?;
    }
    Ok(result)
}

fn evaluate_statement(statement: &Statement, env: EnvId, runtime: &mut Runtime) -> EvaluationResult {
    match statement {
        Statement::Let(LetStatement { name, value }) => {
            let value = evaluate_expression(value, env, runtime)?;
            runtime.environments.set(env, name.name.as_str(), value);
            Ok(Object::Null)
        }
        Statement::Return(ReturnStatement { value }) => Err(Signal::Return(evaluate_expression(value, env, runtime)?)),
        Statement::Expression(statement) => evaluate_expression(&statement.expression, env, runtime),
        Statement::Block(block) => evaluate_block(block, env, runtime),
    }
}

pub(crate) fn evaluate_expression(expression: &Expression, env: EnvId, runtime: &mut Runtime) -> EvaluationResult {
    ensure_sufficient_stack(|| match expression {
        Expression::Identifier(identifier) => evaluate_identifier(&identifier.name, env, runtime),
        Expression::Integer(value) => Ok(Object::Integer(*value)),
        Expression::String(value) => Ok(Object::string(value.as_str())),
        Expression::Boolean(value) => Ok(Object::Boolean(*value)),
        Expression::Prefix(PrefixExpression { operator, right }) => {
            let right = evaluate_expression(right, env, runtime)?;
            evaluate_prefix(*operator, right)
        }
        Expression::Infix(InfixExpression { left, operator, right }) => {
            let left = evaluate_expression(left, env, runtime)?;
            let right = evaluate_expression(right, env, runtime)?;
            evaluate_infix(*operator, left, right)
        }
        Expression::If(if_expression) => evaluate_if(if_expression, env, runtime),
        Expression::Function(FunctionLiteral { parameters, body }) => Ok(Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env,
        }))),
        Expression::Call(CallExpression { function, arguments }) => {
            let function = evaluate_expression(function, env, runtime)?;
            let arguments = evaluate_expressions(arguments, env, runtime)?;
            apply_function(function, arguments, runtime)
        }
        Expression::Array(elements) => Ok(Object::array(evaluate_expressions(elements, env, runtime)?)),
        Expression::Index(IndexExpression { left, index }) => {
            let left = evaluate_expression(left, env, runtime)?;
            let index = evaluate_expression(index, env, runtime)?;
            evaluate_index(left, index)
        }
        Expression::Hash(hash) => evaluate_hash_literal(hash, env, runtime),
    })
}

fn evaluate_expressions(expressions: &[Expression], env: EnvId, runtime: &mut Runtime) -> Result<Vec<Object>, Signal> {
    expressions.iter()
        .map(|expression| evaluate_expression(expression, env, runtime))
        .collect()
}

fn evaluate_identifier(name: &str, env: EnvId, runtime: &Runtime) -> EvaluationResult {
    runtime.environments.get(env, name)
        .or_else(|| builtin::lookup(name).map(Object::Builtin))
        .ok_or_else(|| RuntimeError::IdentifierNotFound(name.to_owned()).into())
}

fn evaluate_prefix(operator: PrefixOperator, right: Object) -> EvaluationResult {
    match (operator, right) {
        (PrefixOperator::Bang, right) => Ok(Object::Boolean(!right.is_truthy())),
        (PrefixOperator::Minus, Object::Integer(value)) => Ok(Object::Integer(value.wrapping_neg())),
        (PrefixOperator::Minus, right) => Err(RuntimeError::UnknownPrefixOperator(right.object_type()).into()),
    }
}

fn evaluate_infix(operator: InfixOperator, left: Object, right: Object) -> EvaluationResult {
    match (&left, &right) {
        (Object::Integer(left), Object::Integer(right)) => evaluate_integer_infix(operator, *left, *right),
        (Object::String(left), Object::String(right)) if operator == InfixOperator::Plus => {
            Ok(Object::string(format!("{}{}", left, right)))
        }
        _ if left.object_type() != right.object_type() => Err(RuntimeError::TypeMismatch {
            left: left.object_type(),
            operator,
            right: right.object_type(),
        }.into()),
        (Object::String(_), _) => Err(unknown_infix(operator, &left, &right)),
        _ => match operator {
            InfixOperator::Equal => Ok(Object::Boolean(left.is_identical(&right))),
            InfixOperator::NotEqual => Ok(Object::Boolean(!left.is_identical(&right))),
            _ => Err(unknown_infix(operator, &left, &right)),
        },
    }
}

fn unknown_infix(operator: InfixOperator, left: &Object, right: &Object) -> Signal {
    RuntimeError::UnknownInfixOperator { left: left.object_type(), operator, right: right.object_type() }.into()
}

fn evaluate_integer_infix(operator: InfixOperator, left: i64, right: i64) -> EvaluationResult {
    Ok(match operator {
        InfixOperator::Plus => Object::Integer(left.wrapping_add(right)),
        InfixOperator::Minus => Object::Integer(left.wrapping_sub(right)),
        InfixOperator::Multiply => Object::Integer(left.wrapping_mul(right)),
        InfixOperator::Divide => {
            if right == 0 { return Err(RuntimeError::DivisionByZero.into()); }
            Object::Integer(left.wrapping_div(right))
        }
        InfixOperator::LessThan => Object::Boolean(left < right),
        InfixOperator::GreaterThan => Object::Boolean(left > right),
        InfixOperator::Equal => Object::Boolean(left == right),
        InfixOperator::NotEqual => Object::Boolean(left != right),
    })
}

fn evaluate_if(if_expression: &IfExpression, env: EnvId, runtime: &mut Runtime) -> EvaluationResult {
    let IfExpression { condition, consequence, alternative } = if_expression;

    if evaluate_expression(condition, env, runtime)?.is_truthy() {
        evaluate_block(consequence, env, runtime)
    } else if let Some(alternative) = alternative {
        evaluate_block(alternative, env, runtime)
    } else {
        Ok(Object::Null)
    }
}

fn evaluate_index(left: Object, index: Object) -> EvaluationResult {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(index)) => Ok(usize::try_from(*index).ok()
            .and_then(|index| elements.get(index))
            .cloned()
            .unwrap_or(Object::Null)),
        (Object::Hash(pairs), _) => {
            let key = index.hash_key().ok_or_else(|| RuntimeError::UnusableHashKey(index.object_type()))?;
            Ok(pairs.get(&key).map(|pair| pair.value.clone()).unwrap_or(Object::Null))
        }
        _ => Err(RuntimeError::IndexNotSupported(left.object_type()).into()),
    }
}

fn evaluate_hash_literal(hash: &HashLiteral, env: EnvId, runtime: &mut Runtime) -> EvaluationResult {
    let mut pairs = HashMap::with_capacity(hash.pairs.len());

    for (key, value) in &hash.pairs {
        let key = evaluate_expression(key, env, runtime)?;
        let hash_key = key.hash_key().ok_or_else(|| RuntimeError::UnusableHashKey(key.object_type()))?;
        let value = evaluate_expression(value, env, runtime)?;
        pairs.insert(hash_key, HashPair { key, value });
    }

    Ok(Object::Hash(Rc::new(pairs)))
}

/// Call `function` with already evaluated arguments. Missing arguments are
/// bound to `null`, extra ones are dropped.
pub(crate) fn apply_function(function: Object, arguments: Vec<Object>, runtime: &mut Runtime) -> EvaluationResult {
    let function = match function {
        Object::Function(function) => function,
        Object::Builtin(builtin) => return match (builtin.function)(arguments) {
            Object::Error(message) => Err(RuntimeError::Builtin(message).into()),
            value => Ok(value),
        },
        other => return Err(RuntimeError::NotAFunction(other.object_type()).into()),
    };

    if runtime.depth >= runtime.max_call_depth {
        tracing::debug!(max = runtime.max_call_depth, "call depth exceeded");
        return Err(RuntimeError::CallDepthExceeded(runtime.max_call_depth).into());
    }

    let env = runtime.environments.new_enclosed(function.env);
    let mut arguments = arguments.into_iter();
    for parameter in function.parameters.iter() {
        let value = arguments.next().unwrap_or(Object::Null);
        runtime.environments.set(env, parameter.name.as_str(), value);
    }

    tracing::trace!(depth = runtime.depth, frames = runtime.environments.len(), "applying function");
    runtime.depth += 1;
    let result = evaluate_block(&function.body, env, runtime);
    runtime.depth -= 1;

    let value = match result {
        Ok(value) | Err(Signal::Return(value)) => value,
        Err(error) => {
            runtime.environments.release(env);
            return Err(error);
        }
    };

    // Frames of this call can only still be reached through closures in the
    // returned value
    if !references_frames_from(&value, env) {
        runtime.environments.release(env);
    }
    Ok(value)
}

fn references_frames_from(value: &Object, env: EnvId) -> bool {
    match value {
        Object::Function(function) => function.env >= env,
        Object::Array(elements) => elements.iter().any(|element| references_frames_from(element, env)),
        Object::Hash(pairs) => pairs.values()
            .any(|pair| references_frames_from(&pair.key, env) || references_frames_from(&pair.value, env)),
        _ => false,
    }
}
