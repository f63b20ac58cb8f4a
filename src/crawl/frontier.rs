// src/crawl/frontier.rs
// =============================================================================
// The crawl queue (frontier) and the set of URLs we already claimed.
//
// How it works:
// 1. The seed goes in at depth 0
// 2. The controller claims a wave of entries off the front of the queue
// 3. Claiming a URL puts it in the visited set; a URL that's already in
//    there is thrown away instead (it was queued twice before we noticed)
// 4. Links found in the wave are pushed to the back at depth + 1
//
// The visited set is the ONLY dedup gate: a URL enters it when it's claimed,
// before any request is sent, and it's never removed. So no URL is fetched
// twice, no matter how many pages link to it.
//
// Rust concepts:
// - HashSet: To track visited URLs (O(1) lookup)
// - VecDeque: Double-ended queue for breadth-first crawling
// =============================================================================

use std::collections::{HashSet, VecDeque};

use crate::links::CanonicalUrl;

/// A page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: CanonicalUrl,
    /// How many link hops from the seed (seed = 0)
    pub depth: usize,
}

impl FrontierEntry {
    pub fn new(url: CanonicalUrl, depth: usize) -> Self {
        Self { url, depth }
    }
}

/// URLs that have been claimed for fetching
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<CanonicalUrl>,
}

impl VisitedSet {
    // Marks `url` as claimed. Returns false if it already was.
    pub fn claim(&mut self, url: &CanonicalUrl) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.clone())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// One batch of claimed entries
#[derive(Debug, Default)]
pub struct Wave {
    pub entries: Vec<FrontierEntry>,
    /// Queued entries thrown away because they were already visited
    pub stale: usize,
}

/// Breadth-first queue of pages to fetch, plus the visited set
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: VisitedSet,
    max_depth: usize,
}

impl Frontier {
    // Creates a frontier holding only the seed at depth 0
    pub fn new(seed: CanonicalUrl, max_depth: usize) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            visited: VisitedSet::default(),
            max_depth,
        };
        frontier.push(FrontierEntry::new(seed, 0));
        frontier
    }

    // Queues an entry unless it's already visited or too deep
    //
    // Returns true if the entry was queued.
    pub fn push(&mut self, entry: FrontierEntry) -> bool {
        if entry.depth >= self.max_depth || self.visited.contains(entry.url.as_str()) {
            return false;
        }
        self.queue.push_back(entry);
        true
    }

    // Claims up to `limit` unvisited entries from the front of the queue
    //
    // `on_claim(visited_count, queue_length)` is called after every claim.
    pub fn claim_wave<F>(&mut self, limit: usize, mut on_claim: F) -> Wave
    where
        F: FnMut(usize, usize),
    {
        let mut wave = Wave::default();

        while wave.entries.len() < limit {
            let Some(entry) = self.queue.pop_front() else {
                break;
            };

            if self.visited.claim(&entry.url) {
                on_claim(self.visited.len(), self.queue.len());
                wave.entries.push(entry);
            } else {
                wave.stale += 1;
            }
        }

        wave
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why claim instead of "check, then insert later"?
//    - If we only checked visited and inserted after the fetch, two pages in
//      the same wave could both queue /about, and both copies would be
//      fetched before either was marked visited
//    - Inserting at claim time closes that gap: the second copy is stale
//
// 2. Why does push() also check visited?
//    - It keeps the queue short. It's not what guarantees correctness;
//      claim_wave() is.
//
// 3. What is let ... else?
//    - let Some(x) = expr else { ... }; binds x or runs the else block,
//      which must leave the current scope (break, return, continue)
// -----------------------------------------------------------------------------
