//! Bounded retry loop and retry message formatting.
//!
//! Every failed attempt is retried immediately, whatever the cause: transport
//! failures, non-success statuses and undecodable bodies are all treated as
//! transient. Once the attempt budget is spent the last failure is surfaced
//! as [`FetcherError::SeriesFetchFailed`].

use std::future::Future;
use tracing::{debug, info, warn};

use crate::fetcher::{FetcherError, FetcherResult};

/// Default number of attempts per series request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Classification of attempt failures for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// Transport failure (connection, timeout, TLS)
    Network,
    /// HTTP 429
    RateLimit,
    /// HTTP 5xx
    ServerError(u16),
    /// Other non-success status
    ClientError(u16),
    /// Body did not decode
    Decode,
}

impl RetryErrorType {
    /// Classify a fetcher error.
    pub fn classify(error: &FetcherError) -> Self {
        match error {
            FetcherError::StatusError { status: 429, .. } => Self::RateLimit,
            FetcherError::StatusError { status, .. } if *status >= 500 => Self::ServerError(*status),
            FetcherError::StatusError { status, .. } => Self::ClientError(*status),
            FetcherError::ParseError(_) => Self::Decode,
            _ => Self::Network,
        }
    }

    /// User-friendly description used inside retry log messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::RateLimit => "rate limit exceeded",
            Self::ServerError(code) => match code {
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
            Self::ClientError(code) => match code {
                400 => "invalid request",
                401 | 403 => "access denied",
                404 => "resource not found",
                _ => "client error",
            },
            Self::Decode => "malformed response",
        }
    }

    /// Suggested remediation shown once all attempts failed.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Network => "Check network connectivity and try again",
            Self::RateLimit => "Enable --throttle or raise --pause-ms",
            Self::ServerError(_) => "The API may be experiencing issues, try again later",
            Self::ClientError(_) => "Check the asset and metric identifiers, or the API root",
            Self::Decode => "Verify --api-root points at a compatible API version",
        }
    }
}

/// Context for formatting retry messages.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Current attempt number (1-based)
    pub attempt: u32,
    /// Maximum number of attempts configured
    pub max_attempts: u32,
    /// Type of error that triggered the retry
    pub error_type: RetryErrorType,
    /// What is being fetched (usually the asset identifier)
    pub target: String,
    /// Original error message
    pub error_message: String,
}

impl RetryContext {
    /// Build the context for a failed attempt.
    pub fn new(attempt: u32, max_attempts: u32, target: impl Into<String>, error: &FetcherError) -> Self {
        Self {
            attempt,
            max_attempts,
            error_type: RetryErrorType::classify(error),
            target: target.into(),
            error_message: error.to_string(),
        }
    }

    /// Warning emitted before the next attempt.
    pub fn format_retry(&self) -> String {
        format!(
            "Fetch attempt {}/{} failed ({}) for {}. Retrying...",
            self.attempt,
            self.max_attempts,
            self.error_type.description(),
            self.target
        )
    }

    /// Message emitted when an attempt succeeds after earlier failures.
    pub fn format_success(attempt: u32, max_attempts: u32, target: &str) -> String {
        format!("Fetch attempt {attempt}/{max_attempts} succeeded for {target}")
    }

    /// Summary emitted when every attempt failed.
    pub fn format_failure(&self) -> String {
        [
            format!("[FAILED] Fetch failed after {} attempts", self.max_attempts),
            format!("  Target: {}", self.target),
            format!("  Last error: {}", self.error_message),
            format!("  Suggestion: {}", self.error_type.suggestion()),
        ]
        .join("\n")
    }
}

/// Run `attempt_fn` until it succeeds or `max_attempts` attempts have failed.
///
/// The closure receives the 1-based attempt number. There is no delay between
/// attempts. A budget of zero is treated as one attempt.
///
/// # Errors
/// Returns [`FetcherError::SeriesFetchFailed`] carrying the attempt count, the
/// last HTTP status (if any) and the last error message.
pub async fn retry_attempts<T, F, Fut>(target: &str, max_attempts: u32, mut attempt_fn: F) -> FetcherResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = FetcherResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_failure: Option<(RetryContext, Option<u16>)> = None;

    for attempt in 1..=max_attempts {
        match attempt_fn(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    info!("{}", RetryContext::format_success(attempt, max_attempts, target));
                } else {
                    debug!("Request for {} succeeded on first attempt", target);
                }
                return Ok(value);
            }
            Err(e) => {
                let ctx = RetryContext::new(attempt, max_attempts, target, &e);
                if attempt < max_attempts {
                    warn!("{}", ctx.format_retry());
                }
                last_failure = Some((ctx, e.status()));
            }
        }
    }

    // loop ran at least once, so a failure was recorded
    let (ctx, last_status) = match last_failure {
        Some(failure) => failure,
        None => {
            return Err(FetcherError::SeriesFetchFailed {
                attempts: max_attempts,
                last_status: None,
                message: "no attempt was made".to_string(),
            })
        }
    };
    warn!("{}", ctx.format_failure());

    Err(FetcherError::SeriesFetchFailed {
        attempts: max_attempts,
        last_status,
        message: ctx.error_message,
    })
}
