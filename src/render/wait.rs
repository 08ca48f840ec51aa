//! Bounded wait-all over image loads.

use std::time::Duration;

use futures::future::{BoxFuture, join_all};

/// How one image load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed(String),
}

/// A pending image load owned by a surface.
pub type ImageLoad = BoxFuture<'static, LoadOutcome>;

/// Tally of a [`wait_for_images`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitSummary {
    pub loaded: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl WaitSummary {
    pub fn total(&self) -> usize {
        self.loaded + self.failed + self.timed_out
    }
}

/// Wait for every load, each capped at `per_image`.
///
/// Never fails: an error or a timeout settles that image and the wait moves
/// on, so one bad image cannot hold up or abort the export.
pub async fn wait_for_images(loads: Vec<ImageLoad>, per_image: Duration) -> WaitSummary {
    if loads.is_empty() {
        return WaitSummary::default();
    }

    let bounded = loads
        .into_iter()
        .map(|load| async move { tokio::time::timeout(per_image, load).await });

    let mut summary = WaitSummary::default();
    for result in join_all(bounded).await {
        match result {
            Ok(LoadOutcome::Loaded) => summary.loaded += 1,
            Ok(LoadOutcome::Failed(reason)) => {
                log::warn!("image failed to load: {reason}");
                summary.failed += 1;
            }
            Err(_) => summary.timed_out += 1,
        }
    }

    if summary.timed_out > 0 {
        log::warn!(
            "{} image(s) did not load within {:?}",
            summary.timed_out,
            per_image
        );
    }
    log::debug!(
        "image wait settled: {} loaded, {} failed, {} timed out",
        summary.loaded,
        summary.failed,
        summary.timed_out
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[tokio::test]
    async fn test_failures_and_timeouts_resolve() {
        let loads: Vec<ImageLoad> = vec![
            async { LoadOutcome::Loaded }.boxed(),
            async { LoadOutcome::Failed("corrupt".into()) }.boxed(),
            futures::future::pending().boxed(),
        ];
        let summary = wait_for_images(loads, Duration::from_millis(20)).await;
        assert_eq!(
            summary,
            WaitSummary {
                loaded: 1,
                failed: 1,
                timed_out: 1
            }
        );
        assert_eq!(summary.total(), 3);
    }

    #[tokio::test]
    async fn test_empty_wait() {
        let summary = wait_for_images(Vec::new(), Duration::from_millis(1)).await;
        assert_eq!(summary.total(), 0);
    }
}
