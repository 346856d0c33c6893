use std::fmt::Display;

use itertools::Itertools;
use log::{debug, trace};

use crate::highway::Highway;
use crate::primitives::{Autonomy, Position, Slot};

const UNREACHED: u32 = u32::MAX;

/// The stations of a trip, from start to end inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route(Box<[Position]>);

impl Route {
    pub fn stations(&self) -> &[Position] {
        &self.0
    }

    /// Number of stops after the start station.
    pub fn hops(&self) -> usize {
        self.0.len() - 1
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.iter().join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Towards increasing positions.
    Forward,
    /// Towards decreasing positions.
    Reverse,
}

impl Direction {
    fn of(start: Position, end: Position) -> Self {
        if end > start {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Whether a vehicle with the given range leaving `from` gets to `to`.
    fn within_range(self, from: Position, range: Autonomy, to: Position) -> bool {
        match self {
            Direction::Forward => to <= from.saturating_add(range),
            Direction::Reverse => to.saturating_add(range) >= from,
        }
    }

    /// Whether a candidate distance replaces the current one.
    ///
    /// Going forward the first relaxation is kept on ties, going in reverse the last one wins.
    fn improves(self, candidate: u32, current: u32) -> bool {
        match self {
            Direction::Forward => current > candidate,
            Direction::Reverse => current >= candidate,
        }
    }
}

/// Stations with a position between `start` and `end` (inclusive), ordered in travel direction.
fn stations_between(
    highway: &Highway,
    start: Position,
    end: Position,
    direction: Direction,
) -> Vec<(Position, Slot)> {
    let bounds = start.min(end)..=start.max(end);
    let mut stations = highway
        .stations()
        .filter(|(position, _)| bounds.contains(position))
        .sorted_unstable_by_key(|&(position, _)| position)
        .collect_vec();
    if direction == Direction::Reverse {
        stations.reverse();
    }
    stations
}

/// Finds a trip from `start` to `end` with the fewest stops.
///
/// Only stations between the two take part. From every station the trip may continue to any
/// station within the best range of its fleet. Returns `None` if either station does not exist
/// or `end` cannot be reached.
pub fn plan_trip(highway: &Highway, start: Position, end: Position) -> Option<Route> {
    let (Some(start_slot), Some(end_slot)) = (highway.slot_of(start), highway.slot_of(end)) else {
        debug!("No trip {} -> {}: unknown station", start, end);
        return None;
    };
    if start == end {
        return Some(Route(Box::new([start])));
    }

    let direction = Direction::of(start, end);
    let stations = stations_between(highway, start, end, direction);
    debug_assert_eq!(stations.first(), Some(&(start, start_slot)));
    debug_assert_eq!(stations.last(), Some(&(end, end_slot)));
    trace!(
        "Planning {} -> {} ({:?}) over {} stations",
        start,
        end,
        direction,
        stations.len()
    );

    let num_slots = highway.len();
    let mut max_range: Vec<Autonomy> = vec![0; num_slots];
    for &(_, slot) in &stations {
        max_range[slot.idx()] = highway.fleet_at(slot).max_range();
    }

    let mut distance: Vec<u32> = vec![UNREACHED; num_slots];
    let mut predecessor: Vec<Option<Slot>> = vec![None; num_slots];
    distance[start_slot.idx()] = 0;

    for (i, &(position, slot)) in stations.iter().enumerate() {
        if position == end {
            break;
        }
        let current = distance[slot.idx()];
        if current == UNREACHED {
            break;
        }
        let range = max_range[slot.idx()];
        for &(next_position, next_slot) in &stations[i + 1..] {
            if !direction.within_range(position, range, next_position) {
                break;
            }
            if direction.improves(current + 1, distance[next_slot.idx()]) {
                distance[next_slot.idx()] = current + 1;
                predecessor[next_slot.idx()] = Some(slot);
            }
        }
    }

    if predecessor[end_slot.idx()].is_none() {
        debug!("No trip {} -> {}: out of range", start, end);
        return None;
    }

    let mut path = vec![end];
    let mut slot = end_slot;
    while let Some(previous) = predecessor[slot.idx()] {
        path.push(highway.station_at(previous));
        slot = previous;
    }
    path.reverse();
    debug_assert_eq!(path.first(), Some(&start));
    debug_assert_eq!(path.len() as u32, distance[end_slot.idx()] + 1);

    Some(Route(path.into_boxed_slice()))
}
