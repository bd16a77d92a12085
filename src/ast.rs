use core::fmt;
use std::rc::Rc;

use itertools::Itertools;

use crate::stack::ensure_sufficient_stack;

/// Parsed program. Rendering a program concatenates the rendering of its
/// statements without separators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
    Block(BlockStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub name: Identifier,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
}

// Expressions are the nodes that produce values
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer(i64),
    String(String),
    Boolean(bool),
    Prefix(PrefixExpression),
    Infix(InfixExpression),
    If(IfExpression),
    Function(FunctionLiteral),
    Call(CallExpression),
    Array(Vec<Expression>),
    Index(IndexExpression),
    Hash(HashLiteral),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub operator: PrefixOperator,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub left: Box<Expression>,
    pub operator: InfixOperator,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

/// Parameters and body sit behind [Rc] so that every function value created
/// from this literal shares them with the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Rc<[Identifier]>,
    pub body: Rc<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

/// Key/value pairs in source order. The order carries no meaning for
/// evaluation beyond later duplicates overwriting earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HashLiteral {
    pub pairs: Vec<(Expression, Expression)>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.statements.iter().try_for_each(|statement| fmt::Display::fmt(statement, f))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Let(LetStatement { name, value }) => write!(f, "let {} = {};", name, value),
            Self::Return(ReturnStatement { value }) => write!(f, "return {};", value),
            Self::Expression(ExpressionStatement { expression }) => fmt::Display::fmt(expression, f),
            Self::Block(block) => fmt::Display::fmt(block, f),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Expression statements get an explicit terminator, otherwise
        // `{ x (-y) }` would read back as a call
        let body = self.statements.iter()
            .map(|statement| match statement {
                Statement::Expression(_) => format!("{};", statement),
                _ => statement.to_string(),
            })
            .join(" ");

        if body.is_empty() { write!(f, "{{ }}") } else { write!(f, "{{ {} }}", body) }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bang => "!",
            Self::Minus => "-",
        })
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        })
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) {}", self.parameters.iter().join(", "), self.body)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Self::Identifier(identifier) => fmt::Display::fmt(identifier, f),
            Self::Integer(value) => write!(f, "{}", value),
            Self::String(value) => write!(f, "\"{}\"", value),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Prefix(PrefixExpression { operator, right }) => write!(f, "({}{})", operator, right),
            Self::Infix(InfixExpression { left, operator, right }) => write!(f, "({} {} {})", left, operator, right),
            Self::If(IfExpression { condition, consequence, alternative }) => {
                write!(f, "if ({}) {}", condition, consequence)?;
                match alternative {
                    Some(alternative) => write!(f, " else {}", alternative),
                    None => Ok(()),
                }
            }
            Self::Function(function) => fmt::Display::fmt(function, f),
            Self::Call(CallExpression { function, arguments }) => write!(f, "{}({})", function, arguments.iter().join(", ")),
            Self::Array(elements) => write!(f, "[{}]", elements.iter().join(", ")),
            Self::Index(IndexExpression { left, index }) => write!(f, "({}[{}])", left, index),
            Self::Hash(HashLiteral { pairs }) => {
                let pairs = pairs.iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
        })
    }
}

// Nesting depth is only bounded by the input, so trees are torn down with an
// explicit work list instead of recursive drops
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);

        while let Some(mut expression) = pending.pop() {
            expression.take_children(&mut pending);
        }
    }
}

impl Expression {
    // Move every direct subexpression into `pending`, leaving leaves behind
    fn take_children(&mut self, pending: &mut Vec<Expression>) {
        match self {
            Self::Identifier(_) | Self::Integer(_) | Self::String(_) | Self::Boolean(_) => {}
            Self::Prefix(PrefixExpression { right, .. }) => take_boxed(right, pending),
            Self::Infix(InfixExpression { left, right, .. }) | Self::Index(IndexExpression { left, index: right }) => {
                take_boxed(left, pending);
                take_boxed(right, pending);
            }
            Self::If(IfExpression { condition, consequence, alternative }) => {
                take_boxed(condition, pending);
                take_statements(&mut consequence.statements, pending);
                if let Some(alternative) = alternative {
                    take_statements(&mut alternative.statements, pending);
                }
            }
            // A shared body is still in use by a function value
            Self::Function(FunctionLiteral { body, .. }) => {
                if let Some(body) = Rc::get_mut(body) {
                    take_statements(&mut body.statements, pending);
                }
            }
            Self::Call(CallExpression { function, arguments }) => {
                take_boxed(function, pending);
                pending.append(arguments);
            }
            Self::Array(elements) => pending.append(elements),
            Self::Hash(HashLiteral { pairs }) => {
                for (key, value) in pairs.drain(..) {
                    pending.push(key);
                    pending.push(value);
                }
            }
        }
    }
}

fn take_boxed(expression: &mut Expression, pending: &mut Vec<Expression>) {
    pending.push(std::mem::replace(expression, Expression::Boolean(false)));
}

fn take_statements(statements: &mut Vec<Statement>, pending: &mut Vec<Expression>) {
    let mut statements = std::mem::take(statements);

    while let Some(statement) = statements.pop() {
        match statement {
            Statement::Let(LetStatement { value, .. }) | Statement::Return(ReturnStatement { value }) => pending.push(value),
            Statement::Expression(ExpressionStatement { expression }) => pending.push(expression),
            Statement::Block(block) => statements.extend(block.statements),
        }
    }
}
