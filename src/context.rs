use crate::{
    ast::Program,
    environment::EnvId,
    error::MonkeyError,
    interpreter::{evaluate_program, Runtime},
    object::Object,
    parser::parse,
};

const MAX_CALL_DEPTH_VAR: &str = "MONKEY_MAX_CALL_DEPTH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of nested function calls after which evaluation fails with an
    /// error instead of recursing further.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_call_depth: 2048 }
    }
}

impl Config {
    /// Default configuration, with `MONKEY_MAX_CALL_DEPTH` taking precedence
    /// when it is set to a number.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(MAX_CALL_DEPTH_VAR) {
            match value.trim().parse() {
                Ok(depth) => config.max_call_depth = depth,
                Err(error) => tracing::warn!(%value, %error, "ignoring invalid {}", MAX_CALL_DEPTH_VAR),
            }
        }

        config
    }
}

/// An evaluation session. Top level bindings made by one call are visible to
/// every later call, which is what the REPL builds on.
///
/// Parsed programs are not retained: function objects share their body with
/// the syntax tree through reference counting.
#[derive(Debug)]
pub struct EvaluationContext {
    runtime: Runtime,
    env: EnvId,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let runtime = Runtime::new(config.max_call_depth);
        let env = runtime.environments.global();
        Self { runtime, env }
    }

    /// Parse and evaluate `input`. Parse errors prevent evaluation entirely;
    /// runtime failures come back as `Ok(Object::Error(..))`.
    pub fn evaluate_str(&mut self, input: &str) -> Result<Object, MonkeyError> {
        let (program, errors) = parse(input);
        if !errors.is_empty() {
            return Err(MonkeyError::Parse(errors));
        }

        Ok(self.evaluate_program(&program))
    }

    pub fn evaluate_program(&mut self, program: &Program) -> Object {
        evaluate_program(program, self.env, &mut self.runtime)
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bindings_persist_between_inputs() {
        let mut context = EvaluationContext::new();

        assert_eq!(context.evaluate_str("let x = 5;").unwrap(), Object::Null);
        assert_eq!(context.evaluate_str("let double = fn(n) { n * 2 };").unwrap(), Object::Null);
        assert_eq!(context.evaluate_str("double(x)").unwrap(), Object::Integer(10));
    }

    #[test]
    fn sessions_are_independent() {
        let mut first = EvaluationContext::new();
        let mut second = EvaluationContext::new();

        first.evaluate_str("let x = 1;").unwrap();
        assert_eq!(second.evaluate_str("x").unwrap(), Object::Error("identifier not found: x".into()));
    }

    #[test]
    fn parse_errors_are_reported_together() {
        let mut context = EvaluationContext::new();
        let error = context.evaluate_str("let = 1; let y 2;").unwrap_err();

        assert_eq!(error, MonkeyError::Parse(vec![
            "expected next token to be IDENT, got = instead".to_owned(),
            "expected next token to be =, got INT instead".to_owned(),
        ]));
        assert_eq!(
            error.to_string(),
            "parser errors:\n\texpected next token to be IDENT, got = instead\n\texpected next token to be =, got INT instead",
        );
    }

    #[test]
    fn evaluates_parsed_programs() {
        let (program, errors) = parse("let a = [1, 2]; len(a)");
        assert!(errors.is_empty());

        let mut context = EvaluationContext::new();
        assert_eq!(context.evaluate_program(&program), Object::Integer(2));
    }

    #[test]
    fn default_config() {
        assert_eq!(Config::default().max_call_depth, 2048);
        assert_eq!(EvaluationContext::default().runtime().environments.len(), 1);
    }
}
