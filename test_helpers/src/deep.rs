//! Helpers for tests that recurse close to the engine's depth ceiling.
//!
//! Debug builds use generous stack frames, so walking a thousand nested maps
//! can exhaust the default test thread stack before the engine gets a chance
//! to report its own depth error. [`with_large_stack`] runs such checks on a
//! dedicated thread with room to spare.
//!
//! # Examples
//!
//! ```
//! use strata_test_helpers::deep;
//!
//! let leaf = deep::with_large_stack(|| {
//!     let value = deep::nested(3, serde_json::json!(true));
//!     value.pointer("/k/k/k").cloned()
//! })?;
//! assert_eq!(leaf, Some(serde_json::json!(true)));
//! # Ok::<_, anyhow::Error>(())
//! ```

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};

const STACK_SIZE: usize = 256 * 1024 * 1024;

/// Runs `f` on a thread with a large stack and returns its result.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned or `f` panics.
pub fn with_large_stack<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    std::thread::Builder::new()
        .name("deep-recursion".to_owned())
        .stack_size(STACK_SIZE)
        .spawn(f)
        .context("spawn deep recursion thread")?
        .join()
        .map_err(|_| anyhow!("deep recursion thread panicked"))
}

/// Wraps `leaf` in `depth` single-key maps: `{"k": {"k": ... leaf}}`.
#[must_use]
pub fn nested(depth: usize, leaf: Value) -> Value {
    (0..depth).fold(leaf, |inner, _| json!({ "k": inner }))
}
