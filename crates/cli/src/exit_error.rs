// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

/// Exit codes by error kind.
pub const EXIT_USER: i32 = 2;
pub const EXIT_STORE: i32 = 3;
pub const EXIT_EXTERNAL: i32 = 4;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Bad user input: unknown id, malformed argument.
    pub fn user(message: impl Into<String>) -> Self {
        Self::new(EXIT_USER, message)
    }

    /// Storage-layer failure.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::new(EXIT_STORE, message.to_string())
    }

    /// External collaborator failure.
    pub fn external(message: impl fmt::Display) -> Self {
        Self::new(EXIT_EXTERNAL, message.to_string())
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<cm_storage::StoreError> for ExitError {
    fn from(e: cm_storage::StoreError) -> Self {
        Self::store(e)
    }
}

impl From<cm_storage::LockError> for ExitError {
    fn from(e: cm_storage::LockError) -> Self {
        Self::store(e)
    }
}
