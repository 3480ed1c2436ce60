//! Basic arithmetic with a recorded history.
//!
//! # Design
//! `add`, `multiply` and `divide` are free functions; only `divide` can fail.
//! `Calculator` wraps them and appends one formatted line per successful
//! calculation to a history that only grows.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

pub fn divide(a: f64, b: f64) -> Result<f64, CalcError> {
    if b == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    Ok(a / b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Multiply,
    Divide,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    pub fn apply(&self, a: f64, b: f64) -> Result<f64, CalcError> {
        match self {
            Operation::Add => Ok(add(a, b)),
            Operation::Multiply => Ok(multiply(a, b)),
            Operation::Divide => divide(a, b),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Operation::Add),
            "multiply" => Ok(Operation::Multiply),
            "divide" => Ok(Operation::Divide),
            other => Err(CalcError::UnknownOperation(other.to_string())),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Calculator {
    history: Vec<String>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `operation` on `a` and `b` and record it as `op(a, b) = result`.
    /// Nothing is recorded when the operation is unknown or fails.
    pub fn calculate(&mut self, operation: &str, a: f64, b: f64) -> Result<f64, CalcError> {
        let op: Operation = operation.parse()?;
        let result = op.apply(a, b)?;
        let entry = format!("{op}({a}, {b}) = {result}");
        tracing::debug!(%entry, "calculated");
        self.history.push(entry);
        Ok(result)
    }

    /// Entries in the order they were calculated.
    pub fn history(&self) -> &[String] {
        &self.history
    }
}
