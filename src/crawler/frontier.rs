//! The crawl frontier
//!
//! Pending URLs live in a FIFO queue next to the visited set. Both sit behind
//! one lock so membership check and insertion are a single step. The frontier
//! also counts claims held by workers: a dequeue waits while the queue is
//! empty but some worker may still produce links, and reports exhaustion once
//! the queue is empty and no claim is outstanding.

use crate::url::NormalizedUrl;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// A URL scheduled for crawling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: NormalizedUrl,

    /// Link hops from the seed (the seed is 0)
    pub depth: u32,

    /// Order in which the URL was accepted; the report is sorted by it
    pub seq: u64,
}

/// What happened to an enqueue request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Accepted,
    AlreadyVisited,
    TooDeep,
    PageLimitReached,
    OutOfScope,
    DisallowedByRobots,
    Stopped,
}

impl EnqueueOutcome {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    pending: VecDeque<FrontierEntry>,
    visited: HashSet<NormalizedUrl>,
    discovered: HashSet<NormalizedUrl>,
    next_seq: u64,
    in_flight: usize,
    stopped: bool,
}

impl FrontierState {
    fn is_exhausted(&self) -> bool {
        self.stopped || (self.pending.is_empty() && self.in_flight == 0)
    }
}

/// Thread-safe queue of pending URLs plus the run's visited set
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
    max_pages: usize,
    max_depth: u32,
}

impl Frontier {
    pub fn new(max_pages: usize, max_depth: u32) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            changed: Notify::new(),
            max_pages,
            max_depth,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offers a URL for crawling
    ///
    /// The URL always counts as discovered. It is accepted only if it was never
    /// accepted before, `depth` is within the depth budget and fewer than
    /// `max_pages` URLs have been accepted so far.
    pub fn enqueue(&self, url: NormalizedUrl, depth: u32) -> EnqueueOutcome {
        let outcome = {
            let mut state = self.lock();
            state.discovered.insert(url.clone());

            if state.stopped {
                EnqueueOutcome::Stopped
            } else if state.visited.contains(&url) {
                EnqueueOutcome::AlreadyVisited
            } else if depth > self.max_depth {
                EnqueueOutcome::TooDeep
            } else if state.visited.len() >= self.max_pages {
                EnqueueOutcome::PageLimitReached
            } else {
                let seq = state.next_seq;
                state.next_seq += 1;
                state.visited.insert(url.clone());
                state.pending.push_back(FrontierEntry { url, depth, seq });
                EnqueueOutcome::Accepted
            }
        };

        if outcome.is_accepted() {
            self.changed.notify_waiters();
        }
        outcome
    }

    /// Records a URL that was seen but will never be offered
    pub fn mark_discovered(&self, url: &NormalizedUrl) {
        self.lock().discovered.insert(url.clone());
    }

    /// Takes the next entry, waiting while other workers may still add some
    ///
    /// Returns `None` once the frontier is stopped, or the queue is empty and
    /// no claim is outstanding. The returned [`Claim`] keeps this worker
    /// counted as busy until it is dropped.
    pub async fn dequeue(&self) -> Option<Claim<'_>> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            // Register before inspecting state so a wake-up in between is kept
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.stopped {
                    return None;
                }
                if let Some(entry) = state.pending.pop_front() {
                    state.in_flight += 1;
                    return Some(Claim {
                        frontier: self,
                        entry,
                    });
                }
                if state.in_flight == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    fn complete(&self) {
        let exhausted = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.is_exhausted()
        };

        if exhausted {
            self.changed.notify_waiters();
        }
    }

    /// Stops servicing dequeues; pending entries are abandoned
    pub fn stop(&self) {
        self.lock().stopped = true;
        self.changed.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Number of URLs ever accepted
    pub fn accepted_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Number of distinct URLs ever offered, accepted or not
    pub fn discovered_count(&self) -> usize {
        self.lock().discovered.len()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn has_visited(&self, url: &NormalizedUrl) -> bool {
        self.lock().visited.contains(url)
    }
}

/// A dequeued entry plus the obligation to report completion
///
/// Dropping the claim marks the worker idle. Workers must enqueue every
/// link found on the page before dropping it.
#[derive(Debug)]
pub struct Claim<'a> {
    frontier: &'a Frontier,
    entry: FrontierEntry,
}

impl Claim<'_> {
    pub fn entry(&self) -> &FrontierEntry {
        &self.entry
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}
