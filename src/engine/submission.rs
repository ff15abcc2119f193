//! Submission plumbing: caller-supplied handlers, the in-flight gate and
//! the receipt produced by a successful submit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::FormValues;

// ============================================================================
// Handlers
// ============================================================================

/// Error returned by a submit/save handler
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Receiver refused the values
    #[error("Submission rejected: {0}")]
    Rejected(String),

    /// Receiver could not be reached
    #[error("Submission target unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        HandlerError::Unavailable(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Rejected(format!("Serialization error: {}", err))
    }
}

/// Receives a snapshot of the form values on submit or save
#[async_trait]
pub trait ValuesHandler: Send + Sync {
    async fn handle(&self, values: FormValues) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F, Fut> ValuesHandler for F
where
    F: Fn(FormValues) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, values: FormValues) -> Result<(), HandlerError> {
        (self)(values).await
    }
}

// ============================================================================
// In-flight Gate
// ============================================================================

/// Shared flag set while a submit or save is awaiting its handler
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Claim the gate; `None` if another submission holds it
    pub fn try_acquire(&self) -> Option<InFlightGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlightGuard(self.0.clone()))
    }
}

/// Releases the in-flight flag when dropped, whatever the outcome
#[derive(Debug)]
pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// Tickets and Outcomes
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Submit,
    Save,
}

/// A started submission: the value snapshot plus the in-flight claim.
///
/// Dropping a ticket without completing it releases the gate and leaves the
/// engine untouched.
#[derive(Debug)]
pub struct SubmissionTicket {
    kind: SubmissionKind,
    values: FormValues,
    started_at: DateTime<Utc>,
    _guard: InFlightGuard,
}

impl SubmissionTicket {
    pub(crate) fn new(kind: SubmissionKind, values: FormValues, guard: InFlightGuard) -> Self {
        Self {
            kind,
            values,
            started_at: Utc::now(),
            _guard: guard,
        }
    }

    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Confirmation of an accepted submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub reference_id: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Handler accepted the values; the form is now in the success state
    Submitted(SubmissionReceipt),
    /// Validation failed; errors are in the error state
    Invalid { error_count: usize },
    /// Submit is only reachable from the last step
    NotOnFinalStep,
    /// Another submit or save is in flight
    Busy,
    /// The form has already been submitted
    AlreadySubmitted,
    /// Handler failed; the user stays on the current step
    Failed { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved { saved_at: DateTime<Utc> },
    /// Schema does not allow save-and-continue
    Disabled,
    Busy,
    Failed { message: String },
}

/// Timestamp-derived reference: "REF-" and the epoch milliseconds in base 36
pub fn generate_reference_id(at: DateTime<Utc>) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut millis = at.timestamp_millis().unsigned_abs();
    let mut encoded = Vec::new();
    loop {
        encoded.push(DIGITS[(millis % 36) as usize]);
        millis /= 36;
        if millis == 0 {
            break;
        }
    }
    encoded.reverse();
    format!("REF-{}", String::from_utf8_lossy(&encoded))
}
