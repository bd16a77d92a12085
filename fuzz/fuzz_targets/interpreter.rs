#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Builtins, literals and loads from variables
#[derive(Arbitrary, Debug)]
enum MonkeyAtom {
    Len, First, Last, Rest, Push,
    True, False,

    Identifier(u8),
    Integer(i64),
    String(u8),
}

const NAMES: &[&str] = &["a", "b", "f", "g", "xs"];

impl fmt::Display for MonkeyAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            MonkeyAtom::Len => "len",
            MonkeyAtom::First => "first",
            MonkeyAtom::Last => "last",
            MonkeyAtom::Rest => "rest",
            MonkeyAtom::Push => "push",
            MonkeyAtom::True => "true",
            MonkeyAtom::False => "false",
            MonkeyAtom::Identifier(index) => NAMES[*index as usize % NAMES.len()],
            MonkeyAtom::Integer(value) => return write!(f, "{}", value),
            MonkeyAtom::String(length) => return write!(f, "\"{}\"", "s".repeat(*length as usize % 8)),
        })
    }
}

#[derive(Arbitrary, Debug)]
enum MonkeyOperator {
    Plus, Minus, Asterisk, Slash, Lt, Gt, Eq, NotEq,
}

impl fmt::Display for MonkeyOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MonkeyOperator::Plus => "+",
            MonkeyOperator::Minus => "-",
            MonkeyOperator::Asterisk => "*",
            MonkeyOperator::Slash => "/",
            MonkeyOperator::Lt => "<",
            MonkeyOperator::Gt => ">",
            MonkeyOperator::Eq => "==",
            MonkeyOperator::NotEq => "!=",
        })
    }
}

#[derive(Arbitrary, Debug)]
enum MonkeyExpression {
    Negate(Box<MonkeyExpression>),
    Not(Box<MonkeyExpression>),
    Infix(Box<MonkeyExpression>, MonkeyOperator, Box<MonkeyExpression>),
    If(Box<MonkeyExpression>, Vec<MonkeyStatement>, Option<Vec<MonkeyStatement>>),
    Function(Vec<u8>, Vec<MonkeyStatement>),
    Call(Box<MonkeyExpression>, Vec<MonkeyExpression>),
    Array(Vec<MonkeyExpression>),
    Index(Box<MonkeyExpression>, Box<MonkeyExpression>),
    Hash(Vec<(MonkeyExpression, MonkeyExpression)>),

    Atom(MonkeyAtom),
}

#[derive(Arbitrary, Debug)]
enum MonkeyStatement {
    Let(u8, MonkeyExpression),
    Return(MonkeyExpression),
    Expression(MonkeyExpression),
}

fn stringify_list<T: fmt::Display>(values: &[T]) -> String {
    values.iter().map(T::to_string).join(", ")
}

fn stringify_block(statements: &[MonkeyStatement]) -> String {
    format!("{{ {} }}", statements.iter().map(MonkeyStatement::to_string).join(" "))
}

impl fmt::Display for MonkeyExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonkeyExpression::Negate(right) => write!(f, "(-{})", right),
            MonkeyExpression::Not(right) => write!(f, "(!{})", right),
            MonkeyExpression::Infix(left, operator, right) => write!(f, "({} {} {})", left, operator, right),
            MonkeyExpression::If(condition, consequence, alternative) => {
                write!(f, "if ({}) {}", condition, stringify_block(consequence))?;
                match alternative {
                    Some(alternative) => write!(f, " else {}", stringify_block(alternative)),
                    None => Ok(()),
                }
            }
            MonkeyExpression::Function(parameters, body) => {
                let parameters = parameters.iter().map(|index| NAMES[*index as usize % NAMES.len()]).join(", ");
                write!(f, "fn({}) {}", parameters, stringify_block(body))
            }
            MonkeyExpression::Call(function, arguments) => write!(f, "{}({})", function, stringify_list(arguments)),
            MonkeyExpression::Array(elements) => write!(f, "[{}]", stringify_list(elements)),
            MonkeyExpression::Index(left, index) => write!(f, "({}[{}])", left, index),
            MonkeyExpression::Hash(pairs) => {
                write!(f, "{{{}}}", pairs.iter().map(|(key, value)| format!("{}: {}", key, value)).join(", "))
            }
            MonkeyExpression::Atom(atom) => fmt::Display::fmt(atom, f),
        }
    }
}

impl fmt::Display for MonkeyStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonkeyStatement::Let(index, value) => write!(f, "let {} = {};", NAMES[*index as usize % NAMES.len()], value),
            MonkeyStatement::Return(value) => write!(f, "return {};", value),
            MonkeyStatement::Expression(expression) => write!(f, "{};", expression),
        }
    }
}

fuzz_target!(|statements: Vec<MonkeyStatement>| {
    {
        let mut context = monkey::EvaluationContext::with_config(monkey::Config { max_call_depth: 256 });

        for statement in statements {
            let statement = statement.to_string();
            let _ = context.evaluate_str(&statement);
        }
    }
});
