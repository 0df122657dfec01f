// ABOUTME: Error types for the parser and interpreter

use crate::token::Token;
use thiserror::Error;

/// Sentinel raised by the parser to unwind to the nearest statement boundary.
/// Carries no payload: the diagnostic has already been reported to the sink
/// at the point this is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError;

#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    #[error("Operand must be a number")]
    OperandMustBeNumber { line: usize },

    #[error("Operands must be numbers")]
    OperandsMustBeNumbers { line: usize },

    #[error("Operands must be two numbers or two strings.")]
    OperandsMustMatch { line: usize },

    #[error("Division by Zero")]
    DivisionByZero { line: usize },

    #[error("Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize },

    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget { line: usize },

    #[error("Can only call functions and classes")]
    NotCallable { line: usize },

    #[error("Expected {expected} args but got {actual}.")]
    ArityMismatch {
        expected: usize,
        actual: usize,
        line: usize,
    },
}

impl RuntimeError {
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::OperandMustBeNumber { line }
            | RuntimeError::OperandsMustBeNumbers { line }
            | RuntimeError::OperandsMustMatch { line }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::InvalidAssignmentTarget { line }
            | RuntimeError::NotCallable { line }
            | RuntimeError::ArityMismatch { line, .. } => *line,
        }
    }

    pub fn undefined_variable(token: &Token) -> Self {
        RuntimeError::UndefinedVariable {
            name: token.lexeme.clone(),
            line: token.line,
        }
    }
}
