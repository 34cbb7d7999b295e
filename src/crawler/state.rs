//! Shared crawl state
//!
//! Every worker task consults the same [`CrawlState`]: a liveness flag and
//! the global visit counter. The two live under one mutex because the
//! interesting operation is compound: increment the counter and, in the same
//! critical section, flip the flag when the budget is reached. Guarding them
//! separately would let two concurrent increments both observe the pre-flip
//! value and overshoot the budget.

use std::sync::Mutex;

#[derive(Debug)]
struct StateInner {
    continue_crawling: bool,
    visit_count: u64,
}

/// Liveness flag and visit counter shared across all workers for one crawl
#[derive(Debug)]
pub struct CrawlState {
    inner: Mutex<StateInner>,
    total_pages: i64,
}

impl CrawlState {
    /// Creates state for a crawl with the given page budget (-1 = unbounded)
    pub fn new(total_pages: i64) -> Self {
        Self {
            inner: Mutex::new(StateInner {
                continue_crawling: true,
                visit_count: 0,
            }),
            total_pages,
        }
    }

    /// Whether tasks should keep processing entries
    ///
    /// Once false (budget reached or crawl stopped), never true again for
    /// the remainder of this crawl.
    pub fn should_continue(&self) -> bool {
        self.inner.lock().unwrap().continue_crawling
    }

    /// Attempts to take one slot of the page budget
    ///
    /// Returns true if the caller may fetch. The increment and the flip are
    /// one atomic step: the acquisition that reaches the budget still fetches
    /// (it won the final slot) and flips the flag; every later attempt is
    /// refused.
    pub fn try_acquire_visit(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();

        if !inner.continue_crawling {
            return false;
        }

        inner.visit_count += 1;

        if self.total_pages != -1 && inner.visit_count as i64 >= self.total_pages {
            inner.continue_crawling = false;
        }

        true
    }

    /// Stops the crawl cooperatively; tasks exit at their next liveness gate
    pub fn halt(&self) {
        self.inner.lock().unwrap().continue_crawling = false;
    }

    /// Number of fetches granted so far (visits and checks both count)
    pub fn visit_count(&self) -> u64 {
        self.inner.lock().unwrap().visit_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_unbounded_never_flips() {
        let state = CrawlState::new(-1);
        for _ in 0..10_000 {
            assert!(state.try_acquire_visit());
        }
        assert!(state.should_continue());
        assert_eq!(state.visit_count(), 10_000);
    }

    #[test]
    fn test_budget_grants_exactly_total_pages() {
        let state = CrawlState::new(3);

        assert!(state.try_acquire_visit());
        assert!(state.try_acquire_visit());
        // Final slot is granted and flips the flag
        assert!(state.try_acquire_visit());
        assert!(!state.should_continue());
        assert!(!state.try_acquire_visit());

        assert_eq!(state.visit_count(), 3);
    }

    #[test]
    fn test_halt_is_permanent() {
        let state = CrawlState::new(-1);
        state.halt();
        assert!(!state.should_continue());
        assert!(!state.try_acquire_visit());
        assert_eq!(state.visit_count(), 0);
    }

    #[test]
    fn test_budget_of_one_with_racing_acquirers() {
        let state = CrawlState::new(1);
        assert!(state.try_acquire_visit());
        assert!(!state.try_acquire_visit());
        assert_eq!(state.visit_count(), 1);
    }

    #[test]
    fn test_no_overshoot_under_concurrency() {
        let state = Arc::new(CrawlState::new(50));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    let mut granted = 0u64;
                    while state.try_acquire_visit() {
                        granted += 1;
                    }
                    granted
                })
            })
            .collect();

        let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(total, 50);
        assert_eq!(state.visit_count(), 50);
        assert!(!state.should_continue());
    }
}
