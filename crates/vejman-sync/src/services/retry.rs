//! Bounded retry around a fresh remote session

use std::future::Future;

use tracing::{info, warn};

use crate::error::{SyncError, SyncResult};

/// Attempts used by the bulk purge unless configured otherwise
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Run `op` against a newly connected session, up to `max_attempts` times
///
/// Every attempt starts with `connect`; a session is never carried over from a
/// failed attempt. A failed connect counts as a failed attempt. When the budget
/// is spent the last error is returned unchanged.
pub async fn retry_with_fresh_session<S, T, C, CFut, O, OFut>(
    max_attempts: u32,
    mut connect: C,
    mut op: O,
) -> SyncResult<T>
where
    C: FnMut() -> CFut,
    CFut: Future<Output = SyncResult<S>>,
    O: FnMut(S) -> OFut,
    OFut: Future<Output = SyncResult<T>>,
{
    if max_attempts == 0 {
        return Err(SyncError::Configuration(
            "max_attempts must be at least 1".to_string(),
        ));
    }

    let mut attempt = 1;
    loop {
        let outcome = match connect().await {
            Ok(session) => op(session).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt >= max_attempts => {
                warn!(attempt, max_attempts, error = %err, "Giving up");
                return Err(err);
            }
            Err(err) => {
                warn!(max_attempts, "Attempt {} failed: {}", attempt, err);
                attempt += 1;
            }
        }
    }
}
