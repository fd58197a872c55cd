use std::fmt::{self, Display};

use thiserror::Error;

use crate::object::Object;
use crate::token::Token;

/// Represents an error that occurs during scanning.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("scan error on line {line}: {message}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

/// Represents an error that occurs during parsing.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("parse error on line {}: {message}", .token.line)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

/// Represents an error that occurs during resolution.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("resolve error on line {}: {message}", .token.line)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

/// Represents an error that occurs during runtime.
/// Carries the token the error was raised at for line reporting.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("runtime error on line {}: {message}", .token.line)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn undefined_variable(token: &Token) -> Self {
        RuntimeError {
            token: token.clone(),
            message: format!("Variable [{}] is not defined", token.lexeme),
        }
    }

    pub fn redeclaring_variable(token: &Token) -> Self {
        RuntimeError {
            token: token.clone(),
            message: format!("Variable [{}] is already defined", token.lexeme),
        }
    }

    pub fn uninitialized_variable(token: &Token) -> Self {
        RuntimeError {
            token: token.clone(),
            message: format!("Variable [{}] is not initialized", token.lexeme),
        }
    }

    /// A unary operand of the wrong type.
    pub fn invalid_operand(token: &Token, expected: &[&str], given: &str) -> Self {
        RuntimeError {
            token: token.clone(),
            message: format!(
                "Operand of ({}) must be of type {}, {} given",
                token.lexeme,
                expected.join(" or "),
                given,
            ),
        }
    }

    /// Two operands of the same type, but a type the operator does not accept.
    pub fn invalid_operands(token: &Token, expected: &[&str], given: &str) -> Self {
        RuntimeError {
            token: token.clone(),
            message: format!(
                "Operands of ({}) must be of type {}, {} given",
                token.lexeme,
                expected.join(" or "),
                given,
            ),
        }
    }

    /// Two operands of differing types.
    pub fn operand_mismatch(token: &Token, left: &str, right: &str) -> Self {
        RuntimeError {
            token: token.clone(),
            message: format!(
                "Operands of ({}) must be of the same type. {} and {} given",
                token.lexeme, left, right,
            ),
        }
    }
}

macro_rules! aggregate {
    ($name:ident wraps $error:ident) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(pub Vec<$error>);

        impl $name {
            /// The bare human-readable messages, one per reported error.
            pub fn messages(&self) -> Vec<String> {
                self.0.iter().map(|error| error.message.clone()).collect()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let lines = self.0.iter()
                    .map(|error| error.to_string())
                    .collect::<Vec<String>>();
                write!(f, "{}", lines.join("\n"))
            }
        }

        impl std::error::Error for $name {}
    };
}

aggregate!(ScanErrors wraps ScanError);
aggregate!(ParseErrors wraps ParseError);
aggregate!(CompileErrors wraps ResolveError);

/// The union of everything that can go wrong between source text and
/// program completion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanErrors),
    #[error(transparent)]
    Parse(#[from] ParseErrors),
    #[error(transparent)]
    Compile(#[from] CompileErrors),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn messages(&self) -> Vec<String> {
        match self {
            Error::Scan(errors) => errors.messages(),
            Error::Parse(errors) => errors.messages(),
            Error::Compile(errors) => errors.messages(),
            Error::Runtime(error) => vec![error.message.clone()],
        }
    }
}

/// Represents a non-local exit travelling up the interpreter stack.
///
/// A return statement unwinds as `Unwind::Return` until the nearest active
/// function call catches it and turns it into the call result. Runtime
/// errors travel the same channel but are never caught by user code.
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
