//! Time-bounded waits on the note store for the close path.
//!
//! Closing a tab or window must finish before the widget goes away, but the
//! store only offers asynchronous calls. The request runs as its own task
//! and the caller awaits it with a deadline while still holding the
//! coordinator exclusively, so nothing else mutates coordinator state in
//! the meantime. On timeout the task is detached: it may still complete in
//! the store, but its result is ignored.
//!
//! Only save-before-close and expunge-before-close use this.

use crate::store::StoreError;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadlineOutcome<T> {
    Completed(T),
    Failed(StoreError),
    TimedOut,
}

impl<T> DeadlineOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, DeadlineOutcome::Completed(_))
    }
}

pub async fn wait_with_deadline<T, F>(deadline: Duration, request: F) -> DeadlineOutcome<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, StoreError>> + Send + 'static,
{
    let handle = tokio::spawn(request);
    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(Ok(value))) => DeadlineOutcome::Completed(value),
        Ok(Ok(Err(e))) => DeadlineOutcome::Failed(e),
        Ok(Err(join_err)) => DeadlineOutcome::Failed(StoreError::Unavailable(format!(
            "store request aborted: {join_err}"
        ))),
        Err(_) => DeadlineOutcome::TimedOut,
    }
}
