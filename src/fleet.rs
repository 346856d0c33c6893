use std::collections::VecDeque;
use std::fmt::Debug;

use itertools::Itertools;

use crate::primitives::Autonomy;

/// The vehicles parked at one station, as a multiset of ranges.
///
/// New vehicles are prepended, so iteration order is the reverse of insertion order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Fleet {
    ranges: VecDeque<Autonomy>,
}

impl Debug for Fleet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("[{}]", self.ranges.iter().join(" ")))
    }
}

impl Fleet {
    pub fn new() -> Self {
        Self {
            ranges: VecDeque::new(),
        }
    }

    /// Builds a fleet by inserting the given ranges one after another.
    pub fn from_ranges(ranges: impl IntoIterator<Item = Autonomy>) -> Self {
        let mut fleet = Self::new();
        for range in ranges {
            fleet.insert(range);
        }
        fleet
    }

    pub fn insert(&mut self, range: Autonomy) {
        self.ranges.push_front(range);
    }

    /// Removes the first vehicle with the given range.
    /// Returns true if a vehicle was removed.
    pub fn remove(&mut self, range: Autonomy) -> bool {
        match self.ranges.iter().position(|&it| it == range) {
            Some(idx) => {
                self.ranges.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, range: Autonomy) -> bool {
        self.ranges.contains(&range)
    }

    /// The best range available at the station, 0 if no vehicle is parked there.
    pub fn max_range(&self) -> Autonomy {
        self.ranges.iter().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Autonomy> + '_ {
        self.ranges.iter().copied()
    }
}
