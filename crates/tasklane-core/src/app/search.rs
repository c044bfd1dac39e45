//! SearchBox - debounced search input.
//!
//! `raw` follows every keystroke; `settled` only changes once the input has been
//! quiet for the debounce window. Cache keys are built from `settled`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct SearchBox {
    raw: String,
    debounce: Duration,
    settled: Arc<watch::Sender<String>>,
    timer: Option<JoinHandle<()>>,
}

impl SearchBox {
    pub fn new(debounce: Duration) -> Self {
        let (settled, _) = watch::channel(String::new());
        Self {
            raw: String::new(),
            debounce,
            settled: Arc::new(settled),
            timer: None,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn settled(&self) -> String {
        self.settled.borrow().clone()
    }

    /// Receiver notified whenever the settled term changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.settled.subscribe()
    }

    /// Record a keystroke and restart the debounce window.
    ///
    /// Must be called from within a tokio runtime.
    pub fn update(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
        self.cancel_timer();

        let settled = self.settled.clone();
        let value = self.raw.clone();
        let debounce = self.debounce;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            publish(&settled, value);
        }));
    }

    /// Settle the current raw value now, skipping the window.
    pub fn flush(&mut self) {
        self.cancel_timer();
        publish(&self.settled, self.raw.clone());
    }

    pub fn is_settling(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SearchBox {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn publish(settled: &watch::Sender<String>, value: String) {
    let changed = settled.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value.clone();
        true
    });
    if changed {
        debug!(search = %value, "search term settled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(400);

    #[tokio::test(start_paused = true)]
    async fn settles_only_after_quiet_window() {
        let mut search = SearchBox::new(WINDOW);
        search.update("auth");
        assert_eq!(search.raw(), "auth");

        tokio::time::sleep(Duration::from_millis(399)).await;
        assert_eq!(search.settled(), "");
        assert!(search.is_settling());

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(search.settled(), "auth");
    }

    #[tokio::test(start_paused = true)]
    async fn newer_keystroke_cancels_pending_timer() {
        let mut search = SearchBox::new(WINDOW);
        let mut changes = search.subscribe();

        search.update("au");
        tokio::time::sleep(Duration::from_millis(300)).await;
        search.update("auth");
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(search.settled(), "");

        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        assert_eq!(search.settled(), "auth");

        // Only one settled value was ever published.
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), "auth");
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_settles_immediately() {
        let mut search = SearchBox::new(WINDOW);
        search.update("bug");
        search.flush();
        assert_eq!(search.settled(), "bug");
        assert!(!search.is_settling());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_box_cancels_the_timer() {
        let mut search = SearchBox::new(WINDOW);
        let changes = search.subscribe();
        search.update("never");
        drop(search);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*changes.borrow(), "");
    }
}
