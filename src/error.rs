use std::sync::atomic::{AtomicBool, Ordering};

use crate::object::Object;
use crate::token::{Token, Type};

// Process-wide error flags. Any reported static error or runtime error sets
// one of these; the pipeline checks them between stages and the driver maps
// them to exit codes. The prompt resets them between lines.
static HAD_ERROR: AtomicBool = AtomicBool::new(false);
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Checks if an error occurred during scanning, parsing, resolving or
/// interpreting.
pub fn did_error() -> bool {
    HAD_ERROR.load(Ordering::Relaxed) || HAD_RUNTIME_ERROR.load(Ordering::Relaxed)
}

/// Checks if an error occurred during runtime.
pub fn did_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.load(Ordering::Relaxed)
}

/// Resets the error flags.
/// This is used to recover the interpreter after an error when running prompts.
pub fn reset_error() {
    HAD_ERROR.store(false, Ordering::Relaxed);
    HAD_RUNTIME_ERROR.store(false, Ordering::Relaxed);
}

/// Every reportable error type implements this trait.
pub trait Throw {
    /// Prints the error message to stderr and sets the matching error flag.
    fn throw(&self);
}

/// Represents an error that occurs during scanning.
#[derive(Debug)]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl Throw for ScanError {
    fn throw(&self) {
        eprintln!("[line {line}] Error: {message}", line = self.line, message = self.message);
        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during parsing.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Throw for ParseError {
    fn throw(&self) {
        if self.token.r#type == Type::EOF {
            eprintln!(
                "[line {line}] Error at end: {message}",
                line = self.token.line,
                message = self.message
            );
        } else {
            eprintln!(
                "[line {line}] Error at '{lexeme}': {message}",
                line = self.token.line,
                lexeme = self.token.lexeme,
                message = self.message
            );
        }

        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during resolution.
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Throw for ResolveError {
    fn throw(&self) {
        eprintln!(
            "[line {line}] Error at '{lexeme}': {message}",
            line = self.token.line,
            lexeme = self.token.lexeme,
            message = self.message
        );

        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during runtime.
#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Throw for RuntimeError {
    fn throw(&self) {
        eprintln!("{message}\n[line {line}]", message = self.message, line = self.token.line);
        HAD_RUNTIME_ERROR.store(true, Ordering::Relaxed);
    }
}

/// A non-local transfer of control unwinding out of the evaluator.
///
/// Both variants travel the error channel of the evaluator's `Result`s so
/// that `?` carries them out of nested blocks. `Return` is intercepted at the
/// nearest enclosing call frame; `Error` propagates to the top of `interpret`
/// where it is reported.
#[derive(Debug)]
pub enum Unwind {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}
