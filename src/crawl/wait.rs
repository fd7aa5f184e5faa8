use crate::browser::{Browser, ElementLocator, Lookup};
use std::time::Duration;
use tokio::time::Instant;

/// Stand-in deadline for timeouts too large to add to the clock
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// The instant `timeout` from now, saturating for huge timeouts
pub(crate) fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or(now + FAR_FUTURE)
}

/// Polls the rendered page until expected elements show up
#[derive(Debug, Clone, Copy)]
pub struct WaitStrategy {
    poll_interval: Duration,
}

impl WaitStrategy {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Wait until at least one element matches `locator`, or `timeout` elapses.
    ///
    /// Returns the matching elements, or [`Lookup::TimedOut`]. A failed
    /// presence check counts as "not rendered yet".
    pub async fn wait_for<B: Browser>(
        &self,
        browser: &mut B,
        locator: &ElementLocator,
        timeout: Duration,
    ) -> Lookup<Vec<B::Element>> {
        let deadline = deadline_after(timeout);

        loop {
            match browser.find_all(locator).await {
                Ok(elements) if !elements.is_empty() => {
                    ::log::trace!("Found {} elements for {}", elements.len(), locator);
                    return Lookup::Found(elements);
                }
                Ok(_) => {}
                Err(e) => ::log::debug!("Presence check for {} failed: {}", locator, e),
            }

            let now = Instant::now();
            if now >= deadline {
                ::log::debug!("Timed out after {:?} waiting for {}", timeout, locator);
                return Lookup::TimedOut;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrowserError;

    /// Renders `count` elements once `ready_after` checks have been made
    struct SlowPage {
        checks: usize,
        ready_after: usize,
        count: usize,
    }

    impl Browser for SlowPage {
        type Element = usize;

        async fn goto(&mut self, _url: &str) -> Result<(), BrowserError> {
            Ok(())
        }

        async fn find_all(&mut self, _locator: &ElementLocator) -> Result<Vec<usize>, BrowserError> {
            self.checks += 1;
            if self.checks > self.ready_after {
                Ok((0..self.count).collect())
            } else if self.checks % 2 == 0 {
                Err(BrowserError::Detached("re-rendering".to_string()))
            } else {
                Ok(Vec::new())
            }
        }

        async fn find_within(
            &mut self,
            _parent: &usize,
            _locator: &ElementLocator,
        ) -> Result<Option<usize>, BrowserError> {
            Ok(None)
        }

        async fn text(&mut self, _element: &usize) -> Result<String, BrowserError> {
            Ok(String::new())
        }

        async fn click(&mut self, _element: &usize) -> Result<(), BrowserError> {
            Ok(())
        }
    }

    fn locator() -> ElementLocator {
        ElementLocator::class("card")
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_elements_once_rendered() {
        let mut page = SlowPage {
            checks: 0,
            ready_after: 3,
            count: 2,
        };
        let wait = WaitStrategy::new(Duration::from_millis(250));

        let start = Instant::now();
        let result = wait
            .wait_for(&mut page, &locator(), Duration::from_secs(10))
            .await;

        assert_eq!(result, Lookup::Found(vec![0, 1]));
        assert_eq!(page.checks, 4);
        assert!(start.elapsed() >= Duration::from_millis(750));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_deadline() {
        let mut page = SlowPage {
            checks: 0,
            ready_after: usize::MAX,
            count: 1,
        };
        let wait = WaitStrategy::new(Duration::from_millis(300));

        let start = Instant::now();
        let result = wait
            .wait_for(&mut page, &locator(), Duration::from_secs(1))
            .await;

        assert_eq!(result, Lookup::TimedOut);
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_millis(1300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_still_waits() {
        let mut page = SlowPage {
            checks: 0,
            ready_after: 2,
            count: 1,
        };
        let wait = WaitStrategy::new(Duration::from_millis(100));
        let result = wait
            .wait_for(&mut page, &locator(), Duration::from_secs(u64::MAX))
            .await;
        assert_eq!(result, Lookup::Found(vec![0]));
        assert_eq!(page.checks, 3);
    }

    #[test]
    fn test_deadline_saturates() {
        let deadline = deadline_after(Duration::MAX);
        assert!(deadline > Instant::now() + Duration::from_secs(86400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_checks_once() {
        let mut page = SlowPage {
            checks: 0,
            ready_after: 0,
            count: 1,
        };
        let wait = WaitStrategy::new(Duration::from_millis(100));
        let result = wait.wait_for(&mut page, &locator(), Duration::ZERO).await;
        assert_eq!(result, Lookup::Found(vec![0]));
        assert_eq!(page.checks, 1);
    }
}
