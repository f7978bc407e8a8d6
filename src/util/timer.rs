//! Timer helper for retry delays and input debouncing.
//!
//! Browser builds wait on a real `setTimeout`; other builds have no event
//! loop timer to wait on, so the delay resolves immediately.

use std::time::Duration;

pub async fn sleep(duration: Duration) {
    #[cfg(feature = "hydrate")]
    {
        gloo_timers::future::sleep(duration).await;
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = duration;
    }
}
