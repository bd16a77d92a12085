use std::process::ExitCode;

use anyhow::Context;
use monkey::{Config, EvaluationContext, MonkeyError};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tracing_subscriber::{prelude::*, EnvFilter};

const PROMPT: &str = ">> ";

/// Install a stderr subscriber, but only when `RUST_LOG` asks for output.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_err() {
        return;
    }

    let filter = EnvFilter::from_default_env();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// Every message gets its own header line
fn format_parser_errors(errors: &[String]) -> String {
    errors.iter()
        .map(|error| format!("parser error:\n\t{}\n", error))
        .collect()
}

fn print_parser_errors(errors: &[String]) {
    print!("{}", format_parser_errors(errors));
}

async fn query(stdout: &mut io::Stdout, lines: &mut io::Lines<io::BufReader<io::Stdin>>) -> io::Result<Option<String>> {
    stdout.write_all(PROMPT.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await
}

async fn repl(mut context: EvaluationContext) -> anyhow::Result<ExitCode> {
    let mut lines = io::BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = query(&mut stdout, &mut lines).await? {
        match context.evaluate_str(&line) {
            Ok(value) => println!("{}", value.inspect()),
            Err(MonkeyError::Parse(errors)) => print_parser_errors(&errors),
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_file(mut context: EvaluationContext, path: &str) -> anyhow::Result<ExitCode> {
    let source = tokio::fs::read_to_string(path).await
        .with_context(|| format!("failed to read {}", path))?;

    match context.evaluate_str(&source) {
        Ok(value) => {
            println!("{}", value.inspect());
            Ok(ExitCode::SUCCESS)
        }
        Err(MonkeyError::Parse(errors)) => {
            print_parser_errors(&errors);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let config = Config::from_env();
    tracing::debug!(?config, "starting");
    let context = EvaluationContext::with_config(config);

    let arguments = std::env::args().skip(1).collect::<Vec<_>>();
    match arguments.as_slice() {
        [] => repl(context).await,
        [path] => run_file(context, path).await,
        _ => anyhow::bail!("usage: monkey [FILE]"),
    }
}
