//! Shared crawl frontier: pending queue, visited set, and page budget.
//!
//! The frontier is the one piece of crawl state that demands explicit
//! synchronization. All mutations happen under a single mutex so that
//! admission (the budget check plus the first-time visited insert) is
//! one atomic step. An in-flight counter, updated under the same lock as
//! dequeue, makes quiescence detection explicit: [`Frontier::next`]
//! returns `None` only once the queue is empty AND no worker is mid-flight.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use tokio::sync::Notify;
use tracing::trace;
use url::Url;

/// Shared mutable crawl state, guarded by one mutex.
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
}

struct FrontierState {
    pending: VecDeque<Url>,
    visited: HashSet<String>,
    budget: usize,
    in_flight: usize,
    closed: bool,
}

impl Frontier {
    /// Create an empty frontier with a hard admission ceiling.
    pub fn new(budget: usize) -> Self {
        Self {
            state: Mutex::new(FrontierState {
                pending: VecDeque::new(),
                visited: HashSet::new(),
                budget,
                in_flight: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Atomically admit a URL: checks the budget ceiling and first-time
    /// visit under one lock, then inserts into both `visited` and the
    /// pending queue. Returns `false` (and drops the URL) when the budget
    /// is exhausted, the URL was already admitted, or the frontier is
    /// closed. The budget caps *admitted* URLs; a later fetch failure
    /// still consumes its admission.
    pub fn try_enqueue(&self, url: &Url) -> bool {
        let key = normalize_url(url);
        {
            let mut state = self.state.lock().unwrap();
            if state.closed || state.visited.len() >= state.budget || state.visited.contains(&key)
            {
                return false;
            }
            state.visited.insert(key);
            state.pending.push_back(url.clone());
        }
        trace!(%url, "admitted");
        self.notify.notify_waiters();
        true
    }

    /// Take the next pending URL, waiting while siblings are still
    /// mid-flight (they may yet enqueue more work). Returns `None` only on
    /// quiescence (empty queue with zero in-flight fetches) or after
    /// [`Frontier::close`]. Every `Some` must be balanced by one
    /// [`Frontier::complete`] call.
    pub async fn next(&self) -> Option<Url> {
        loop {
            // Register interest before inspecting state so a wakeup
            // between the check and the await is not lost.
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().unwrap();
                if state.closed {
                    return None;
                }
                if let Some(url) = state.pending.pop_front() {
                    state.in_flight += 1;
                    return Some(url);
                }
                if state.in_flight == 0 {
                    drop(state);
                    // Wake siblings parked on the same condition.
                    self.notify.notify_waiters();
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Mark one dequeued URL as fully processed (successfully or not).
    pub fn complete(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    /// Close the frontier to further dequeues. In-flight work drains;
    /// parked workers wake and observe the closed state.
    pub fn close(&self) {
        self.state.lock().unwrap().closed = true;
        self.notify.notify_waiters();
    }

    /// Number of URLs ever admitted.
    pub fn admitted(&self) -> usize {
        self.state.lock().unwrap().visited.len()
    }

    /// Number of URLs waiting to be dequeued.
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }
}

/// Normalize a URL to its admission key: fragment stripped, trailing slash
/// removed on non-root paths.
pub fn normalize_url(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    let mut s = normalized.to_string();
    if s.ends_with('/') && s.matches('/').count() > 3 {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn admits_each_url_once() {
        let frontier = Frontier::new(10);
        assert!(frontier.try_enqueue(&url("https://example.com/a")));
        assert!(!frontier.try_enqueue(&url("https://example.com/a")));
        // Fragment and trailing-slash variants collapse to the same key.
        assert!(!frontier.try_enqueue(&url("https://example.com/a#section")));
        assert!(!frontier.try_enqueue(&url("https://example.com/a/")));
        assert_eq!(frontier.admitted(), 1);
        assert_eq!(frontier.pending(), 1);
    }

    #[test]
    fn budget_is_a_hard_ceiling_on_admission() {
        let frontier = Frontier::new(2);
        assert!(frontier.try_enqueue(&url("https://example.com/a")));
        assert!(frontier.try_enqueue(&url("https://example.com/b")));
        assert!(!frontier.try_enqueue(&url("https://example.com/c")));
        assert_eq!(frontier.admitted(), 2);
    }

    #[tokio::test]
    async fn concurrent_enqueue_of_same_url_admits_exactly_one() {
        let frontier = Arc::new(Frontier::new(100));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let frontier = Arc::clone(&frontier);
            handles.push(tokio::spawn(async move {
                frontier.try_enqueue(&url("https://example.com/contended"))
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(frontier.admitted(), 1);
    }

    #[tokio::test]
    async fn next_returns_none_on_quiescence() {
        let frontier = Frontier::new(10);
        frontier.try_enqueue(&url("https://example.com/only"));

        let first = frontier.next().await;
        assert!(first.is_some());
        frontier.complete();

        // Queue empty, nothing in flight: quiescent.
        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn idle_worker_waits_for_in_flight_sibling() {
        let frontier = Arc::new(Frontier::new(10));
        frontier.try_enqueue(&url("https://example.com/a"));

        // Worker 1 takes the only URL and is now mid-flight.
        let taken = frontier.next().await.unwrap();
        assert_eq!(taken.path(), "/a");

        // Worker 2 must not observe termination while worker 1 might still
        // enqueue more links.
        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.next().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        // Worker 1 discovers a link, then finishes.
        frontier.try_enqueue(&url("https://example.com/b"));
        frontier.complete();

        // Worker 2 wakes with the new URL.
        let second = waiter.await.unwrap();
        assert_eq!(second.unwrap().path(), "/b");
    }

    #[tokio::test]
    async fn close_drains_parked_workers() {
        let frontier = Arc::new(Frontier::new(10));
        frontier.try_enqueue(&url("https://example.com/a"));
        let _held = frontier.next().await.unwrap();

        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.next().await })
        };
        tokio::task::yield_now().await;

        frontier.close();
        assert!(waiter.await.unwrap().is_none());

        // Closed frontier rejects new admissions.
        assert!(!frontier.try_enqueue(&url("https://example.com/late")));
    }

    #[test]
    fn normalize_strips_fragment_and_trailing_slash() {
        assert_eq!(
            normalize_url(&url("https://example.com/guide/intro#part-1")),
            "https://example.com/guide/intro"
        );
        assert_eq!(
            normalize_url(&url("https://example.com/guide/")),
            "https://example.com/guide"
        );
        // Root path keeps its slash.
        assert_eq!(normalize_url(&url("https://example.com/")), "https://example.com/");
    }
}
