//! Best-effort execution of advisory side effects.
//!
//! Deletion cleanup steps must never veto the operation that triggered them.
//! Fatal steps (archival, the row write itself) are awaited with `?` at the
//! call site instead and never go through here.

use std::fmt::Display;
use std::future::Future;

/// Awaits an advisory side effect, logging failure and moving on.
///
/// The returned unit makes the contract explicit: callers cannot branch on
/// the outcome of a best-effort step.
pub async fn best_effort<T, E, F>(label: &str, camera_id: i64, fut: F)
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match fut.await {
        Ok(_) => {
            tracing::debug!(camera_id = %camera_id, step = %label, "Cleanup step completed");
        }
        Err(err) => {
            tracing::warn!(
                camera_id = %camera_id,
                step = %label,
                error = %err,
                "Cleanup step failed, continuing"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_best_effort_swallows_errors() {
        let failing = async { Err::<(), String>("boom".to_string()) };
        best_effort("test_step", 1, failing).await;

        let passing = async { Ok::<u32, String>(7) };
        best_effort("test_step", 1, passing).await;
    }
}
