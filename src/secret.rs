// src/secret.rs

//! Credential handling.
//!
//! The API key is read from the environment once at startup and from then
//! on only ever leaves this type through [`ApiKey::expose`], which is
//! called exactly once: to place the value into the fetch program's
//! environment. The key never appears in argv, in log output, or on disk.

use std::fmt;

use crate::errors::{Result, RunError};

/// An opaque API credential for the fetch program.
///
/// `Debug` is redacted and `Display` is intentionally not implemented, so
/// the value cannot end up in a log line by accident.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Read the credential from the named environment variable.
    ///
    /// A missing or empty variable is an environment-setup failure: the run
    /// must abort before the fetch program is ever started.
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(Self(value)),
            Ok(_) => Err(RunError::Setup(format!(
                "credential variable {var} is set but empty"
            ))),
            Err(_) => Err(RunError::Setup(format!(
                "credential variable {var} is not set"
            ))),
        }
    }

    /// Construct from a known value (used by tests and embedding callers).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value. Callers must only pass it into a child
    /// process environment, never into argv or a log field.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
