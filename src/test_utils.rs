use std::{io::BufRead, path::{Path, PathBuf}};

use anyhow::bail;
use itertools::Itertools;
use serde::{de::{Error, Visitor}, Deserialize};

use crate::error::MonkeyError;

/// Expected value of one REPL input: its type tag and inspect form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutput {
    pub type_tag: String,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct EvaluationResult(Result<TestOutput, MonkeyError>);

impl From<EvaluationResult> for Result<TestOutput, MonkeyError> {
    fn from(value: EvaluationResult) -> Self {
        value.0
    }
}

struct EvaluationResultVisitor {}

impl<'de> Deserialize<'de> for EvaluationResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de> {

        deserializer.deserialize_map(EvaluationResultVisitor {})
    }
}

fn expect_key<'de, A: serde::de::MapAccess<'de>>(map: &mut A, expected: &str) -> Result<(), A::Error> {
    match map.next_key::<String>()? {
        Some(key) if key == expected => Ok(()),
        Some(key) => Err(A::Error::custom(format!("Expected key '{}', found '{}'", expected, key))),
        None => Err(A::Error::custom(format!("Missing key '{}'", expected))),
    }
}

impl<'de> Visitor<'de> for EvaluationResultVisitor {
    type Value = EvaluationResult;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "A structure starting with the boolean key 'ok'. If it's okay, followed by 'type' and 'output', otherwise by 'errors'")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>, {

        expect_key(&mut map, "ok")?;
        let ok: bool = map.next_value()?;

        let result = if ok {
            expect_key(&mut map, "type")?;
            let type_tag: String = map.next_value()?;
            expect_key(&mut map, "output")?;
            let output: String = map.next_value()?;
            EvaluationResult(Ok(TestOutput { type_tag, output }))
        } else {
            expect_key(&mut map, "errors")?;
            let errors: Vec<String> = map.next_value()?;
            EvaluationResult(Err(MonkeyError::Parse(errors)))
        };

        if map.next_key::<String>()?.is_some() {
            return Err(A::Error::custom("Unexpected trailing key"));
        }

        Ok(result)
    }
}

fn load_input_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let source = std::fs::read(path)?;
    Ok(source.lines().collect::<Result<Vec<String>, _>>()?)
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<EvaluationResult>> {
    let source = std::fs::read(path)?;
    let result: Vec<EvaluationResult> = serde_json::from_slice(&source)?;
    Ok(result)
}

const TESTCASES: usize = 8;

/// Every line of `test_inputs/<n>.monkey` paired with the matching entry of
/// `test_outputs/<n>.json`.
pub fn load_test_pair(testcase: usize) -> anyhow::Result<Vec<(String, EvaluationResult)>> {
    if !(1..=TESTCASES).contains(&testcase) { bail!("Testcase out of bounds"); }

    let base_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let input = load_input_file(base_path.join("test_inputs").join(format!("{}.monkey", testcase)))?;
    let output = load_output_file(base_path.join("test_outputs").join(format!("{}.json", testcase)))?;

    if input.len() != output.len() { bail!("Input and output of testcase {} does not match", testcase); }
    Ok(input.into_iter().zip(output).collect_vec())
}

pub fn all_testcases() -> impl Iterator<Item = usize> {
    1..=TESTCASES
}
