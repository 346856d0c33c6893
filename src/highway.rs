use std::fmt::{Display, Write};

use log::debug;

use crate::col::{set_with_capacity, HashSet};
use crate::config::HighwayConfig;
use crate::fleet::Fleet;
use crate::index::PositionIndex;
use crate::primitives::{Autonomy, Position, Slot};

/// Why an operation on the highway was not applied. The highway is unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declined {
    DuplicateStation(Position),
    UnknownStation(Position),
    UnknownVehicle(Position, Autonomy),
}

impl Display for Declined {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Declined::DuplicateStation(position) => {
                write!(f, "station {} already exists", position)
            }
            Declined::UnknownStation(position) => write!(f, "no station at {}", position),
            Declined::UnknownVehicle(position, range) => {
                write!(f, "station {} has no vehicle with range {}", position, range)
            }
        }
    }
}

/// All live stations, stored densely by slot.
///
/// `stations[slot]` is the position of the station occupying `slot` and `fleets[slot]` its
/// vehicles. Slots are always `0..len()`; removing a station moves the last one into the
/// freed slot. `index` maps every live position to its current slot and is only ever
/// mutated here.
pub struct Highway {
    stations: Vec<Position>,
    fleets: Vec<Fleet>,
    index: PositionIndex<Slot>,
}

impl Default for Highway {
    fn default() -> Self {
        Self::new(HighwayConfig::default())
    }
}

impl Highway {
    pub fn new(config: HighwayConfig) -> Self {
        Self {
            stations: Vec::with_capacity(config.station_capacity),
            fleets: Vec::with_capacity(config.station_capacity),
            index: PositionIndex::with_expected(config.station_capacity, config.index),
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn index(&self) -> &PositionIndex<Slot> {
        &self.index
    }

    pub fn slot_of(&self, position: Position) -> Option<Slot> {
        self.index.search(position)
    }

    pub fn station_at(&self, slot: Slot) -> Position {
        self.stations[slot.idx()]
    }

    pub fn fleet_at(&self, slot: Slot) -> &Fleet {
        &self.fleets[slot.idx()]
    }

    pub fn fleet(&self, position: Position) -> Option<&Fleet> {
        self.slot_of(position).map(|slot| self.fleet_at(slot))
    }

    /// Iterates all live stations as (position, slot), in slot order.
    pub fn stations(&self) -> impl Iterator<Item = (Position, Slot)> + '_ {
        self.stations
            .iter()
            .enumerate()
            .map(|(idx, &position)| (position, Slot(idx as u32)))
    }

    /// Adds a station whose fleet is built by inserting `ranges` in order.
    pub fn add_station(
        &mut self,
        position: Position,
        ranges: impl IntoIterator<Item = Autonomy>,
    ) -> Result<Slot, Declined> {
        let slot = Slot(self.stations.len() as u32);
        if !self.index.insert(position, slot) {
            debug!("Not adding station {}: already exists", position);
            return Err(Declined::DuplicateStation(position));
        }

        self.stations.push(position);
        self.fleets.push(Fleet::from_ranges(ranges));

        let len = self.stations.len();
        if len == self.stations.capacity() {
            self.stations.reserve_exact(len);
            self.fleets.reserve_exact(len);
        }
        Ok(slot)
    }

    /// Removes a station and its fleet. The last station moves into the freed slot.
    pub fn remove_station(&mut self, position: Position) -> Result<Fleet, Declined> {
        let Some(slot) = self.index.remove(position) else {
            debug!("Not removing station {}: unknown", position);
            return Err(Declined::UnknownStation(position));
        };

        let fleet = self.fleets.swap_remove(slot.idx());
        let removed = self.stations.swap_remove(slot.idx());
        assert_eq!(
            removed, position,
            "position index maps {} to {:?}, which holds station {}",
            position, slot, removed
        );

        if let Some(&moved) = self.stations.get(slot.idx()) {
            let updated = self.index.update(moved, slot);
            assert!(
                updated,
                "station {} was relocated to {:?} but is missing from the position index",
                moved, slot
            );
        }
        Ok(fleet)
    }

    pub fn add_vehicle(&mut self, position: Position, range: Autonomy) -> Result<(), Declined> {
        let Some(slot) = self.index.search(position) else {
            debug!("Not adding vehicle {} to station {}: unknown station", range, position);
            return Err(Declined::UnknownStation(position));
        };
        self.fleets[slot.idx()].insert(range);
        Ok(())
    }

    pub fn remove_vehicle(&mut self, position: Position, range: Autonomy) -> Result<(), Declined> {
        let Some(slot) = self.index.search(position) else {
            debug!("Not removing vehicle {} from station {}: unknown station", range, position);
            return Err(Declined::UnknownStation(position));
        };
        if !self.fleets[slot.idx()].remove(range) {
            debug!("Not removing vehicle {} from station {}: no such vehicle", range, position);
            return Err(Declined::UnknownVehicle(position, range));
        }
        Ok(())
    }

    /// Panics if the position index and the slot arrays disagree.
    pub fn assert_invariants(&self) {
        assert_eq!(self.stations.len(), self.fleets.len());
        assert_eq!(
            self.index.len(),
            self.stations.len(),
            "position index holds {} entries for {} stations",
            self.index.len(),
            self.stations.len()
        );

        let mut seen: HashSet<Position> = set_with_capacity(self.stations.len());
        for (position, slot) in self.stations() {
            assert!(seen.insert(position), "station {} occupies two slots", position);
            assert_eq!(
                self.index.search(position),
                Some(slot),
                "station {} is stored at {:?}",
                position,
                slot
            );
        }
        for entry in self.index.iter() {
            assert!(
                seen.contains(&entry.key),
                "stale index entry {} -> {:?}",
                entry.key,
                entry.value
            );
        }

        let index_config = self.index.config();
        assert!(self.index.capacity() >= index_config.min_capacity);
        assert!(self.index.len() <= index_config.grow_threshold(self.index.capacity()));
    }

    /// Dumps the position index followed by the fleet of every slot.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        writeln!(out, "---- Position index ----").unwrap();
        out.push_str(&self.index.describe());
        writeln!(out, "------------------------").unwrap();
        for (position, slot) in self.stations() {
            writeln!(out, "{:?} {}: {:?}", slot, position, self.fleet_at(slot)).unwrap();
        }
        out
    }
}
