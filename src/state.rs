//! Per-hotel aggregation state and the merge algebra that combines it.
//!
//! `merge` is associative and commutative, which is what makes both the
//! chunked historical reduction and the incremental streaming updates produce
//! the same result as one giant fold over every record.

use serde::Serialize;

use crate::classify::StayCategory;

/// Per-category stay counts for one hotel.
///
/// `Error` stays have no bucket by construction: error records are filtered
/// out before counting and can never reach this struct.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub short: u64,
    pub standard: u64,
    pub extended: u64,
    pub long: u64,
}

impl CategoryCounts {
    /// Increments the bucket for `category`. Error stays are ignored.
    pub fn bump(&mut self, category: StayCategory) {
        match category {
            StayCategory::Short => self.short += 1,
            StayCategory::Standard => self.standard += 1,
            StayCategory::Extended => self.extended += 1,
            StayCategory::Long => self.long += 1,
            StayCategory::Error => {}
        }
    }

    pub fn get(&self, category: StayCategory) -> u64 {
        match category {
            StayCategory::Short => self.short,
            StayCategory::Standard => self.standard,
            StayCategory::Extended => self.extended,
            StayCategory::Long => self.long,
            StayCategory::Error => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.short + self.standard + self.extended + self.long
    }

    /// The category with the highest count, or `None` if every bucket is zero.
    ///
    /// Ties break on a fixed priority order, `Short > Standard > Extended >
    /// Long`, so the result is stable across runs regardless of how the
    /// counts were accumulated.
    pub fn most_popular(&self) -> Option<StayCategory> {
        if self.total() == 0 {
            return None;
        }
        let mut best = StayCategory::Short;
        for cat in StayCategory::COUNTED {
            if self.get(cat) > self.get(best) {
                best = cat;
            }
        }
        Some(best)
    }
}

/// The running aggregation state for one hotel.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct HotelState {
    pub counts: CategoryCounts,
    /// Always recomputed from `counts` after every merge, never carried over.
    pub most_popular: Option<StayCategory>,
    /// True once any contributing record brought children. Never reset.
    pub with_kids: bool,
}

impl HotelState {
    pub fn from_counts(counts: CategoryCounts, with_kids: bool) -> Self {
        HotelState {
            counts,
            most_popular: counts.most_popular(),
            with_kids,
        }
    }

    /// Combines two states for the same hotel.
    ///
    /// Counts are summed per category, `with_kids` is a monotonic OR, and
    /// `most_popular` is recomputed from the merged totals.
    pub fn merge(a: &HotelState, b: &HotelState) -> HotelState {
        let counts = CategoryCounts {
            short: a.counts.short + b.counts.short,
            standard: a.counts.standard + b.counts.standard,
            extended: a.counts.extended + b.counts.extended,
            long: a.counts.long + b.counts.long,
        };
        HotelState::from_counts(counts, a.with_kids || b.with_kids)
    }

    /// Folds `other` into `self` in place.
    pub fn merge_in(&mut self, other: &HotelState) {
        *self = HotelState::merge(self, other);
    }
}
