//! Deferred references for attribute values resolved at apply time.
//!
//! A token yields a value only when asked. It may be backed by a constant,
//! by another resource's status, or by an external lookup, so a spec can
//! reference an attribute (such as a load balancer ARN) before the
//! producing resource exists.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::TokenError;

/// A deferred string value.
///
/// Resolution may be invoked more than once within a pass and returns a
/// consistent value absent external changes. A resolution failure is never
/// cached: the next call re-attempts.
#[async_trait]
pub trait StringToken: fmt::Debug + Send + Sync {
    /// Resolves the token to its value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be produced yet.
    async fn resolve(&self) -> Result<String, TokenError>;
}

/// A token backed by a constant value.
#[derive(Debug, Clone)]
pub struct LiteralToken {
    value: String,
}

impl LiteralToken {
    /// Creates a new literal token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Wraps the value in a shareable token handle.
    #[must_use]
    pub fn shared(value: impl Into<String>) -> Arc<dyn StringToken> {
        Arc::new(Self::new(value))
    }
}

#[async_trait]
impl StringToken for LiteralToken {
    async fn resolve(&self) -> Result<String, TokenError> {
        Ok(self.value.clone())
    }
}

/// Resolves every token in order, aborting on the first failure.
///
/// Callers use this before constructing a mutating request: if any token
/// fails to resolve, no partial request is ever built.
///
/// # Errors
///
/// Returns the first resolution error encountered.
pub async fn resolve_all(tokens: &[Arc<dyn StringToken>]) -> Result<Vec<String>, TokenError> {
    let mut values = Vec::with_capacity(tokens.len());
    for token in tokens {
        values.push(token.resolve().await?);
    }
    Ok(values)
}
