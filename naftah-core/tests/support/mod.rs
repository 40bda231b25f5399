#![allow(dead_code)]

use naftah_core::concurrency::run_to_completion;
use naftah_core::config::RuntimeConfig;
use naftah_core::eval::Interpreter;
use naftah_core::host::HostClassDirectory;
use naftah_core::parser::Parser;
use naftah_core::{Error, Result, Value};

/// Parses and runs a whole program, returning the last statement's value, the way
/// the REPL / CLI driver does.
pub fn run(src: &str) -> Result<Value> {
    let program = Parser::new(src)?.parse_program()?;
    run_to_completion(async {
        let mut interp = Interpreter::new(RuntimeConfig::default(), HostClassDirectory::new());
        interp.run_program(&program).await
    })
}

pub fn expect_err(src: &str) -> Error {
    run(src).expect_err("expected program to raise an error")
}

pub fn as_number_string(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => panic!("expected a number, got {other:?}"),
    }
}
