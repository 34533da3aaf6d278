//! Integration test common infrastructure.
//!
//! The client under test connects through an in-memory pipe; the test body
//! plays the server on the other end and asserts on the byte-level flow.

pub mod pipe;
pub mod server;

#[allow(unused_imports)]
pub use pipe::{FailingConnector, PipeConnector};
#[allow(unused_imports)]
pub use server::ServerEnd;

use std::time::Duration;

/// Default timeout for any single await in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Await a future, panicking if it takes longer than [`TEST_TIMEOUT`].
#[allow(dead_code)]
pub async fn within_deadline<F: std::future::Future>(fut: F) -> F::Output {
    tokio::time::timeout(TEST_TIMEOUT, fut)
        .await
        .expect("test step timed out")
}

/// Poll a condition until it holds, panicking after [`TEST_TIMEOUT`].
///
/// For effects that happen on a spawned task with no event to await.
#[allow(dead_code)]
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + TEST_TIMEOUT;
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("condition not reached before deadline");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
