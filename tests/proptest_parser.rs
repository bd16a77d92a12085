//! Property-based tests for the parser and the evaluator.
//!
//! Expression trees are generated directly, rendered to source and parsed
//! back, so every node kind takes part in the round trip.

use std::rc::Rc;

use monkey::{
    parse, BlockStatement, CallExpression, Config, EvaluationContext, Expression, ExpressionStatement,
    FunctionLiteral, HashLiteral, Identifier, IfExpression, IndexExpression, InfixExpression, InfixOperator,
    LetStatement, Lexer, PrefixExpression, PrefixOperator, Program, ReturnStatement, Statement, TokenKind,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Identifiers can't contain digits and must not collide with keywords
fn arb_identifier() -> impl Strategy<Value = Identifier> {
    prop_oneof![Just("a"), Just("b"), Just("foo"), Just("bar"), Just("len"), Just("_tmp")]
        .prop_map(Identifier::new)
}

fn arb_prefix_operator() -> impl Strategy<Value = PrefixOperator> {
    prop_oneof![Just(PrefixOperator::Bang), Just(PrefixOperator::Minus)]
}

fn arb_infix_operator() -> impl Strategy<Value = InfixOperator> {
    prop_oneof![
        Just(InfixOperator::Plus),
        Just(InfixOperator::Minus),
        Just(InfixOperator::Multiply),
        Just(InfixOperator::Divide),
        Just(InfixOperator::LessThan),
        Just(InfixOperator::GreaterThan),
        Just(InfixOperator::Equal),
        Just(InfixOperator::NotEqual),
    ]
}

/// Literals. Integers stay non-negative: `-1` reads back as a prefix expression.
fn arb_leaf() -> impl Strategy<Value = Expression> {
    prop_oneof![
        arb_identifier().prop_map(Expression::Identifier),
        (0i64..1000).prop_map(Expression::Integer),
        "[a-z ]{0,8}".prop_map(Expression::String),
        any::<bool>().prop_map(Expression::Boolean),
    ]
}

fn arb_statement(expression: BoxedStrategy<Expression>) -> impl Strategy<Value = Statement> {
    prop_oneof![
        expression.clone().prop_map(|expression| Statement::Expression(ExpressionStatement { expression })),
        (arb_identifier(), expression.clone()).prop_map(|(name, value)| Statement::Let(LetStatement { name, value })),
        expression.prop_map(|value| Statement::Return(ReturnStatement { value })),
    ]
}

fn arb_block(expression: BoxedStrategy<Expression>) -> impl Strategy<Value = BlockStatement> {
    prop::collection::vec(arb_statement(expression), 0..3).prop_map(|statements| BlockStatement { statements })
}

fn arb_expression() -> impl Strategy<Value = Expression> {
    arb_leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            (arb_prefix_operator(), inner.clone()).prop_map(|(operator, right)| {
                Expression::Prefix(PrefixExpression { operator, right: Box::new(right) })
            }),
            (inner.clone(), arb_infix_operator(), inner.clone()).prop_map(|(left, operator, right)| {
                Expression::Infix(InfixExpression { left: Box::new(left), operator, right: Box::new(right) })
            }),
            (inner.clone(), arb_block(inner.clone()), prop::option::of(arb_block(inner.clone())))
                .prop_map(|(condition, consequence, alternative)| {
                    Expression::If(IfExpression { condition: Box::new(condition), consequence, alternative })
                }),
            (prop::collection::vec(arb_identifier(), 0..3), arb_block(inner.clone()))
                .prop_map(|(parameters, body)| {
                    Expression::Function(FunctionLiteral { parameters: parameters.into(), body: Rc::new(body) })
                }),
            (inner.clone(), prop::collection::vec(inner.clone(), 0..3)).prop_map(|(function, arguments)| {
                Expression::Call(CallExpression { function: Box::new(function), arguments })
            }),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Expression::Array),
            (inner.clone(), inner.clone()).prop_map(|(left, index)| {
                Expression::Index(IndexExpression { left: Box::new(left), index: Box::new(index) })
            }),
            prop::collection::vec((inner.clone(), inner), 0..3)
                .prop_map(|pairs| Expression::Hash(HashLiteral { pairs })),
        ]
    })
}

fn program_of(expression: Expression) -> Program {
    Program { statements: vec![Statement::Expression(ExpressionStatement { expression })] }
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// The lexer always terminates with `EOF` and keeps returning it
    #[test]
    fn lexer_no_panic(input in ".{0,100}") {
        let mut lexer = Lexer::new(&input);
        let mut steps = 0;
        while lexer.next_token().kind != TokenKind::Eof {
            steps += 1;
            prop_assert!(steps <= input.len(), "more tokens than bytes in {:?}", input);
        }
        prop_assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    /// Parser should never panic on any input (even invalid)
    #[test]
    fn parser_no_panic(input in ".{0,100}") {
        let _ = parse(&input);
    }

    /// Rendering a tree and parsing it back yields the same tree
    #[test]
    fn rendering_round_trips(expression in arb_expression()) {
        let program = program_of(expression);
        let source = program.to_string();

        let (parsed, errors) = parse(&source);
        prop_assert!(errors.is_empty(), "errors {:?} for {}", errors, source);
        prop_assert_eq!(&parsed, &program, "source: {}", source);
        prop_assert_eq!(parsed.to_string(), source);
    }

    /// Evaluation of any well formed program terminates without panicking
    #[test]
    fn evaluation_no_panic(expression in arb_expression()) {
        let mut context = EvaluationContext::with_config(Config { max_call_depth: 64 });
        let _ = context.evaluate_program(&program_of(expression));
    }
}
