//! Debounced search controller.
//!
//! Drives [`Debouncer`] on the tokio clock. Keystrokes go in through
//! [`SearchController::input`]; after [`SEARCH_DEBOUNCE`] of quiet the last
//! term is turned into a rewritten URL and handed to a [`Navigator`], which
//! replaces the current location.

use std::time::Duration;

use invoicedash_core::{Debouncer, SEARCH_DEBOUNCE, search_query};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Replaces the current navigation entry.
pub trait Navigator: Send + Sync + 'static {
    /// Replace the current URL with `url` (`pathname?query`).
    fn replace(&self, url: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn replace(&self, url: &str) {
        self(url);
    }
}

/// Current location of the page hosting the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub query: String,
}

impl Location {
    #[must_use]
    pub fn new(pathname: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            query: query.into(),
        }
    }
}

/// Handle to a running search controller task.
#[derive(Debug)]
pub struct SearchController {
    input: mpsc::UnboundedSender<String>,
    task: JoinHandle<Location>,
}

impl SearchController {
    /// Spawn a controller with the standard debounce delay.
    #[must_use]
    pub fn spawn(location: Location, navigator: impl Navigator) -> Self {
        Self::with_delay(location, navigator, SEARCH_DEBOUNCE)
    }

    /// Spawn a controller with a custom debounce delay.
    #[must_use]
    pub fn with_delay(location: Location, navigator: impl Navigator, delay: Duration) -> Self {
        let (input, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(location, navigator, Debouncer::new(delay), rx));
        Self { input, task }
    }

    /// Record a keystroke: the search box now contains `term`.
    pub fn input(&self, term: impl Into<String>) {
        // The task only exits once every sender is gone.
        let _ = self.input.send(term.into());
    }

    /// Stop the controller, discarding any pending update. Returns the final
    /// location.
    ///
    /// # Errors
    ///
    /// Returns the join error if the controller task panicked.
    pub async fn shutdown(self) -> Result<Location, tokio::task::JoinError> {
        drop(self.input);
        self.task.await
    }
}

async fn run(
    mut location: Location,
    navigator: impl Navigator,
    mut debouncer: Debouncer<String, Instant>,
    mut rx: mpsc::UnboundedReceiver<String>,
) -> Location {
    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            term = rx.recv() => {
                let Some(term) = term else { break };
                debouncer.push(Instant::now(), term);
            }
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(term) = debouncer.fire(Instant::now()) {
                    location.query = search_query(&location.query, &term);
                    let url = format!("{}?{}", location.pathname, location.query);
                    debug!(%url, "Search navigation");
                    navigator.replace(&url);
                }
            }
        }
    }
    debouncer.cancel();
    location
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::time::sleep;

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Navigator) {
        let urls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&urls);
        (urls, move |url: &str| sink.lock().unwrap().push(url.to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_produces_one_navigation_with_last_term() {
        let (urls, navigator) = recorder();
        let controller =
            SearchController::spawn(Location::new("/dashboard/invoices", ""), navigator);

        controller.input("l");
        sleep(Duration::from_millis(100)).await;
        controller.input("lee");
        sleep(Duration::from_millis(450)).await;
        assert!(urls.lock().unwrap().is_empty());

        sleep(Duration::from_millis(100)).await;
        assert_eq!(
            *urls.lock().unwrap(),
            vec!["/dashboard/invoices?page=1&query=lee".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_the_box_removes_query() {
        let (urls, navigator) = recorder();
        let controller = SearchController::spawn(
            Location::new("/dashboard/invoices", "query=lee&page=3"),
            navigator,
        );

        controller.input("");
        sleep(Duration::from_millis(600)).await;

        let location = controller.shutdown().await.unwrap();
        assert_eq!(
            *urls.lock().unwrap(),
            vec!["/dashboard/invoices?page=1".to_string()]
        );
        assert_eq!(location.query, "page=1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_navigate_from_updated_location() {
        let (urls, navigator) = recorder();
        let controller =
            SearchController::spawn(Location::new("/dashboard/invoices", "page=4"), navigator);

        controller.input("paid");
        sleep(Duration::from_secs(1)).await;
        controller.input("pending");
        sleep(Duration::from_secs(1)).await;

        assert_eq!(
            *urls.lock().unwrap(),
            vec![
                "/dashboard/invoices?page=1&query=paid".to_string(),
                "/dashboard/invoices?page=1&query=pending".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_pending_term() {
        let (urls, navigator) = recorder();
        let controller =
            SearchController::spawn(Location::new("/dashboard/invoices", ""), navigator);

        controller.input("lee");
        sleep(Duration::from_millis(100)).await;
        let location = controller.shutdown().await.unwrap();

        assert!(urls.lock().unwrap().is_empty());
        assert_eq!(location.query, "");
    }
}
