// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// Rejected user input. Recoverable: the edit is dropped and the UI keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid state {0:?}; expected one of open, in_progress, closed, cancelled")]
    InvalidState(String),
}
