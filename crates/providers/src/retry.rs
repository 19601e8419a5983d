// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Retry with exponential backoff and per-call timeouts.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{ProviderError, ProviderResult};

/// Retry policy for transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the initial attempt.
    pub retries: u32,

    /// Delay before the first retry.
    pub initial_backoff: Duration,

    /// Backoff multiplier between retries.
    pub multiplier: u32,

    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // 100 ms -> 400 ms -> 1.6 s between the four attempts.
        Self {
            retries: 3,
            initial_backoff: Duration::from_millis(100),
            multiplier: 4,
            timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default backoff schedule and a custom
    /// per-attempt timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Total number of attempts this policy allows.
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Backoff before retry number `retry` (1-based).
    fn backoff(&self, retry: u32) -> Duration {
        self.initial_backoff * self.multiplier.pow(retry.saturating_sub(1))
    }
}

/// Run `operation` under the retry policy.
///
/// Each attempt is bounded by the policy timeout. Transient failures are
/// retried with exponential backoff; permanent failures are returned
/// immediately. Spent retries surface as [`ProviderError::Exhausted`]
/// naming the failing subject.
pub async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    subject: &str,
    mut call: F,
) -> ProviderResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    let mut last_error: Option<ProviderError> = None;

    for attempt in 0..policy.attempts() {
        if attempt > 0 {
            let backoff = policy.backoff(attempt);
            warn!(operation, subject, attempt, ?backoff, "retrying provider call");
            tokio::time::sleep(backoff).await;
        }

        let result = match tokio::time::timeout(policy.timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(policy.timeout)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() => last_error = Some(error),
            Err(error) => return Err(error),
        }
    }

    Err(ProviderError::Exhausted {
        operation: operation.to_string(),
        subject: subject.to_string(),
        attempts: policy.attempts(),
        source: Box::new(last_error.unwrap_or(ProviderError::Timeout(policy.timeout))),
    })
}
