//! Runtime errors for the interpreter and the expression evaluator

use crate::util::format_suggestion_hint;
use std::fmt;

/// Runtime error during execution or evaluation
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Call-language name absent from the environment
    UndefinedName,
    /// Expression name absent from the evaluator's variables
    UnknownVariable,
    /// `set`/`def` target is not an identifier
    InvalidAssignmentTarget,
    /// Expression node kind outside the evaluator allow-list
    UnsafeExpression,
    /// Invoked value is not a function
    NotCallable,
    /// Argument count mismatch
    ArityMismatch,
    /// Operand or argument of the wrong kind
    TypeError,
    /// Division by zero
    DivisionByZero,
    /// Index out of bounds
    IndexOutOfBounds,
    /// Mapping has no such key
    KeyNotFound,
    /// Block nesting exceeded the session limit
    StackOverflow,
    /// A repeated sequence would exceed the evaluator's size limit
    SequenceTooLarge,
    /// A context-wanting function was called where no executor is available
    MissingContext,
    /// A definition outlived the environment it was created in
    DetachedDefinition,
    /// Malformed expression text evaluated from inside a running program
    ExpressionSyntax,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError { kind, message }
    }

    pub fn undefined_name(name: &str, suggestion: Option<&str>) -> Self {
        Self::new(
            ErrorKind::UndefinedName,
            format!("undefined name: {name}{}", format_suggestion_hint(suggestion)),
        )
    }

    pub fn unknown_variable(name: &str) -> Self {
        Self::new(ErrorKind::UnknownVariable, format!("unknown variable: {name}"))
    }

    pub fn invalid_assignment_target(kind: &str) -> Self {
        Self::new(
            ErrorKind::InvalidAssignmentTarget,
            format!("invalid assignment target: expected var, got {kind}"),
        )
    }

    pub fn unsafe_expression(what: &str) -> Self {
        Self::new(
            ErrorKind::UnsafeExpression,
            format!("unsafe expression: {what} is not allowed"),
        )
    }

    pub fn not_callable(name: &str, type_name: &str) -> Self {
        Self::new(
            ErrorKind::NotCallable,
            format!("{name} is not callable ({type_name})"),
        )
    }

    pub fn arity_mismatch(name: &str, expected: &str, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("function {name} expects {expected} argument(s), got {got}"),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message.into())
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero".to_string())
    }

    pub fn index_out_of_bounds(index: i64, len: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("index {index} out of bounds for length {len}"),
        )
    }

    pub fn key_not_found(key: &str) -> Self {
        Self::new(ErrorKind::KeyNotFound, format!("key not found: {key}"))
    }

    pub fn stack_overflow(limit: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("stack overflow: block nesting exceeded {limit}"),
        )
    }

    pub fn sequence_too_large(limit: usize) -> Self {
        Self::new(
            ErrorKind::SequenceTooLarge,
            format!("repeated sequence would exceed {limit} items"),
        )
    }

    pub fn missing_context(name: &str) -> Self {
        Self::new(
            ErrorKind::MissingContext,
            format!("function {name} needs an executor but none is available"),
        )
    }

    pub fn detached_definition(name: &str) -> Self {
        Self::new(
            ErrorKind::DetachedDefinition,
            format!("definition {name} outlived its environment"),
        )
    }

    pub fn expression_syntax(message: &str) -> Self {
        Self::new(ErrorKind::ExpressionSyntax, format!("invalid expression: {message}"))
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
