use std::rc::Rc;

use crate::{
    ast::{
        BlockStatement, CallExpression, Expression, ExpressionStatement, FunctionLiteral, HashLiteral,
        Identifier, IfExpression, IndexExpression, InfixExpression, InfixOperator, LetStatement,
        PrefixExpression, PrefixOperator, Program, ReturnStatement, Statement,
    },
    lexer::{Lexer, Token, TokenKind},
    stack::ensure_sufficient_stack,
};

/// Binding power of an operator, lowest first. `(` and `[` are postfix
/// operators and bind tighter than anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::LeftParen | TokenKind::LeftBracket => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    Some(match kind {
        TokenKind::Plus => InfixOperator::Plus,
        TokenKind::Minus => InfixOperator::Minus,
        TokenKind::Asterisk => InfixOperator::Multiply,
        TokenKind::Slash => InfixOperator::Divide,
        TokenKind::Lt => InfixOperator::LessThan,
        TokenKind::Gt => InfixOperator::GreaterThan,
        TokenKind::Eq => InfixOperator::Equal,
        TokenKind::NotEq => InfixOperator::NotEqual,
        _ => return None,
    })
}

type PrefixRule<'a> = fn(&mut Parser<'a>) -> Option<Expression>;
type InfixRule<'a> = fn(&mut Parser<'a>, Expression) -> Option<Expression>;

/// Pratt parser over a [Lexer]. Parsing never stops at the first error: every
/// problem is recorded in [Parser::errors] and the parser resumes at the next
/// statement.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token<'a>,
    peek: Token<'a>,
    errors: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();

        Self { lexer, current, peek, errors: Vec::new() }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(statement) => program.statements.push(statement),
                None => self.synchronize(),
            }
            self.next_token();
        }

        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "program parsed with errors");
        }
        program
    }

    fn next_token(&mut self) {
        self.current = self.peek;
        self.peek = self.lexer.next_token();
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_is(kind) {
            self.next_token();
            return Some(());
        }

        self.errors.push(format!("expected next token to be {}, got {} instead", kind, self.peek.kind));
        None
    }

    // Skip the rest of a broken statement. Stops on its terminator, or just
    // before the `}` closing an enclosing block so the block still ends there
    fn synchronize(&mut self) {
        while !self.current_is(TokenKind::Semicolon)
            && !self.current_is(TokenKind::Eof)
            && !self.peek_is(TokenKind::RightBrace)
        {
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(self.current.literal);

        self.expect_peek(TokenKind::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Let(LetStatement { name, value }))
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Return(ReturnStatement { value }))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression(ExpressionStatement { expression }))
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();
        self.next_token();

        while !self.current_is(TokenKind::RightBrace) && !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(statement) => block.statements.push(statement),
                None => self.synchronize(),
            }
            self.next_token();
        }

        block
    }

    fn prefix_rule(kind: TokenKind) -> Option<PrefixRule<'a>> {
        let rule: PrefixRule<'a> = match kind {
            TokenKind::Ident => Self::parse_identifier,
            TokenKind::Int => Self::parse_integer_literal,
            TokenKind::String => Self::parse_string_literal,
            TokenKind::True | TokenKind::False => Self::parse_boolean_literal,
            TokenKind::Bang | TokenKind::Minus => Self::parse_prefix_expression,
            TokenKind::LeftParen => Self::parse_grouped_expression,
            TokenKind::If => Self::parse_if_expression,
            TokenKind::Function => Self::parse_function_literal,
            TokenKind::LeftBracket => Self::parse_array_literal,
            TokenKind::LeftBrace => Self::parse_hash_literal,
            _ => return None,
        };
        Some(rule)
    }

    fn infix_rule(kind: TokenKind) -> Option<InfixRule<'a>> {
        let rule: InfixRule<'a> = match kind {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Asterisk | TokenKind::Slash
            | TokenKind::Lt | TokenKind::Gt | TokenKind::Eq | TokenKind::NotEq => Self::parse_infix_expression,
            TokenKind::LeftParen => Self::parse_call_expression,
            TokenKind::LeftBracket => Self::parse_index_expression,
            _ => return None,
        };
        Some(rule)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        ensure_sufficient_stack(|| {
            let Some(prefix) = Self::prefix_rule(self.current.kind) else {
                self.errors.push(format!("no prefix parse function for {} found", self.current.kind));
                return None;
            };
            let mut left = prefix(self)?;

            while precedence < precedence_of(self.peek.kind) {
                let Some(infix) = Self::infix_rule(self.peek.kind) else {
                    return Some(left);
                };
                self.next_token();
                left = infix(self, left)?;
            }

            Some(left)
        })
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier::new(self.current.literal)))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.current.literal.parse() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                self.errors.push(format!("could not parse {:?} as integer", self.current.literal));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::String(self.current.literal.to_owned()))
    }

    fn parse_boolean_literal(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(self.current_is(TokenKind::True)))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = match self.current.kind {
            TokenKind::Bang => PrefixOperator::Bang,
            _ => PrefixOperator::Minus,
        };

        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix(PrefixExpression { operator, right: Box::new(right) }))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;
        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LeftParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LeftBrace)?;
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::If(IfExpression { condition: Box::new(condition), consequence, alternative }))
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LeftParen)?;
        let parameters = self.parse_list(TokenKind::RightParen, Self::parse_parameter)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement();

        Some(Expression::Function(FunctionLiteral { parameters: parameters.into(), body: Rc::new(body) }))
    }

    fn parse_parameter(&mut self) -> Option<Identifier> {
        if !self.current_is(TokenKind::Ident) {
            self.errors.push(format!("expected parameter to be {}, got {} instead", TokenKind::Ident, self.current.kind));
            return None;
        }
        Some(Identifier::new(self.current.literal))
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_list(TokenKind::RightBracket, |parser| parser.parse_expression(Precedence::Lowest))?;
        Some(Expression::Array(elements))
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = vec![];

        while !self.peek_is(TokenKind::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;

            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(TokenKind::RightBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }
        self.expect_peek(TokenKind::RightBrace)?;

        Some(Expression::Hash(HashLiteral { pairs }))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let kind = self.current.kind;
        let operator = infix_operator(kind)?;

        self.next_token();
        let right = self.parse_expression(precedence_of(kind))?;
        Some(Expression::Infix(InfixExpression { left: Box::new(left), operator, right: Box::new(right) }))
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_list(TokenKind::RightParen, |parser| parser.parse_expression(Precedence::Lowest))?;
        Some(Expression::Call(CallExpression { function: Box::new(function), arguments }))
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightBracket)?;

        Some(Expression::Index(IndexExpression { left: Box::new(left), index: Box::new(index) }))
    }

    // Zero or more comma separated items followed by `end`. Expects the
    // opening delimiter to be the current token
    fn parse_list<T>(&mut self, end: TokenKind, mut parse_item: impl FnMut(&mut Self) -> Option<T>) -> Option<Vec<T>> {
        let mut items = vec![];

        if self.peek_is(end) {
            self.next_token();
            return Some(items);
        }

        self.next_token();
        items.push(parse_item(self)?);

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            items.push(parse_item(self)?);
        }

        self.expect_peek(end)?;
        Some(items)
    }
}

/// Parse a complete source string, returning the program together with every
/// error found along the way.
pub fn parse(input: &str) -> (Program, Vec<String>) {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    (program, parser.into_errors())
}
