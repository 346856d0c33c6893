use std::fmt::Debug;

/// Position of a station along the highway.
pub type Position = u32;

/// Range of a single vehicle, in units of position.
pub type Autonomy = u32;

/// Index of a live station inside the dense registry arrays.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(pub u32);

impl Slot {
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("slot#{}", self.0))
    }
}
