//! Offset-based page accumulation for a single collection.
//!
//! Loads are tagged with a generation. A reload (offset 0) starts a new
//! generation; continuations join the current one. Responses carrying an
//! older generation are dropped instead of merged, so a slow reload can no
//! longer wipe a list that a newer reload already filled.

use xbvr_model::{Page, ResourceCounts};

/// Identifies one in-flight load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The page was merged into the item list
    Applied {
        received: usize,
        len: usize,
        total: u64,
    },
    /// A newer generation started while this load was in flight
    Superseded,
}

#[derive(Debug, Clone)]
pub struct PageAccumulator<T> {
    items: Vec<T>,
    offset: u64,
    total: u64,
    limit: u64,
    counts: ResourceCounts,
    generation: u64,
    in_flight: usize,
    loaded: bool,
}

impl<T> PageAccumulator<T> {
    pub fn new(limit: u64) -> Self {
        Self {
            items: Vec::new(),
            offset: 0,
            total: 0,
            limit: limit.max(1),
            counts: ResourceCounts::default(),
            generation: 0,
            in_flight: 0,
            loaded: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Cursor for the next continuation: requested offset plus limit of the
    /// last merged page
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn counts(&self) -> &ResourceCounts {
        &self.counts
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// At least one page has been merged
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Register a load starting at `offset`.
    pub fn begin(&mut self, offset: u64) -> LoadTicket {
        if offset == 0 || self.generation == 0 {
            self.generation += 1;
            self.in_flight = 0;
        }
        self.in_flight += 1;
        LoadTicket {
            generation: self.generation,
            offset,
            limit: self.limit,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Merge a successful response.
    ///
    /// Offset 0 replaces the list, anything else appends in received order
    /// without de-duplication. The cursor always advances by the requested
    /// limit, even when the page came back short.
    pub fn commit(&mut self, ticket: LoadTicket, page: Page<T>) -> MergeOutcome {
        if !self.is_current(&ticket) {
            return MergeOutcome::Superseded;
        }
        self.finish_one();

        if ticket.offset == 0 {
            self.items.clear();
        }
        let received = page.items.len();
        self.items.extend(page.items);
        self.offset = ticket.offset + ticket.limit;
        self.total = page.total;
        self.counts = page.counts;
        self.loaded = true;

        MergeOutcome::Applied {
            received,
            len: self.items.len(),
            total: self.total,
        }
    }

    /// Record a failed or cancelled load. The item list is left untouched.
    pub fn fail(&mut self, ticket: LoadTicket) {
        if self.is_current(&ticket) {
            self.finish_one();
        }
    }

    /// Start over for a new query: in-flight loads are dropped and the next
    /// continuation restarts at offset 0. Items stay visible until that
    /// reload replaces them.
    pub fn reset_cursor(&mut self) {
        self.generation += 1;
        self.in_flight = 0;
        self.offset = 0;
        self.loaded = false;
    }

    fn finish_one(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: &[u32], offset: u64, total: u64) -> Page<u32> {
        Page::new(items.to_vec(), offset, total, 2)
    }

    #[test]
    fn sequential_loads_accumulate_up_to_total() {
        let backing = [1, 2, 3, 4, 5];
        let mut acc = PageAccumulator::new(2);
        let mut lens = Vec::new();

        for offset in [0u64, 2, 4] {
            let ticket = acc.begin(offset);
            let start = offset as usize;
            let end = (start + 2).min(backing.len());
            acc.commit(ticket, page(&backing[start..end], offset, 5));
            lens.push(acc.items().len());
            assert_eq!(acc.total(), 5);
        }

        assert_eq!(lens, vec![2, 4, 5]);
        assert_eq!(acc.items(), &backing);
        // short final page still advances by the limit
        assert_eq!(acc.offset(), 6);
        assert!(!acc.is_loading());
    }

    #[test]
    fn offset_zero_replaces() {
        let mut acc = PageAccumulator::new(2);
        let t = acc.begin(0);
        acc.commit(t, page(&[1, 2], 0, 4));
        let t = acc.begin(2);
        acc.commit(t, page(&[3, 4], 2, 4));

        let t = acc.begin(0);
        acc.commit(t, page(&[9], 0, 1));
        assert_eq!(acc.items(), &[9]);
        assert_eq!(acc.offset(), 2);
        assert_eq!(acc.total(), 1);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut acc = PageAccumulator::new(2);
        let t = acc.begin(0);
        acc.commit(t, page(&[1, 2], 0, 4));
        let t = acc.begin(2);
        acc.commit(t, page(&[2, 3], 2, 4));
        assert_eq!(acc.items(), &[1, 2, 2, 3]);
    }

    #[test]
    fn stale_reload_cannot_wipe_newer_results() {
        let mut acc = PageAccumulator::new(2);
        let slow = acc.begin(0);
        let fast = acc.begin(0);

        assert!(matches!(
            acc.commit(fast, page(&[7, 8], 0, 2)),
            MergeOutcome::Applied { len: 2, .. }
        ));
        assert_eq!(acc.commit(slow, page(&[1, 2], 0, 9)), MergeOutcome::Superseded);
        assert_eq!(acc.items(), &[7, 8]);
        assert_eq!(acc.total(), 2);
        assert!(!acc.is_loading());
    }

    #[test]
    fn failure_leaves_items_and_clears_loading() {
        let mut acc = PageAccumulator::new(2);
        let t = acc.begin(0);
        acc.commit(t, page(&[1, 2], 0, 4));

        let t = acc.begin(2);
        assert!(acc.is_loading());
        acc.fail(t);
        assert!(!acc.is_loading());
        assert_eq!(acc.items(), &[1, 2]);
        assert_eq!(acc.offset(), 2);
    }

    #[test]
    fn loading_stays_set_while_current_generation_has_work() {
        let mut acc = PageAccumulator::<u32>::new(2);
        let stale = acc.begin(0);
        let current = acc.begin(0);

        acc.fail(stale);
        assert!(acc.is_loading());
        acc.fail(current);
        assert!(!acc.is_loading());
    }

    #[test]
    fn reset_cursor_drops_in_flight_loads() {
        let mut acc = PageAccumulator::new(2);
        let t = acc.begin(0);
        let before = acc.generation();
        acc.reset_cursor();
        assert!(acc.generation() > before);
        assert!(!acc.is_loading());
        assert_eq!(acc.commit(t, page(&[1], 0, 1)), MergeOutcome::Superseded);
        assert!(acc.items().is_empty());
    }

    #[test]
    fn reset_cursor_restarts_from_zero_after_loads() {
        let mut acc = PageAccumulator::new(2);
        let t = acc.begin(0);
        acc.commit(t, page(&[1, 2], 0, 6));
        assert_eq!(acc.offset(), 2);

        acc.reset_cursor();
        assert_eq!(acc.offset(), 0);
        assert!(!acc.is_loaded());
        assert_eq!(acc.items(), &[1, 2]);

        let t = acc.begin(0);
        acc.commit(t, page(&[5, 6], 0, 6));
        assert_eq!(acc.items(), &[5, 6]);
        assert_eq!(acc.offset(), 2);
    }
}
