use std::fmt::Display;

/// Sizing parameters of the position index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Number of buckets the table starts with. The table never shrinks below it.
    pub min_capacity: usize,

    /// The capacity is shifted by this many bits on every resize.
    pub resize_bits: u32,

    /// Maximum number of entries per 100 buckets before the table grows.
    pub load_factor_percent: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            min_capacity: 8,
            resize_bits: 2,
            load_factor_percent: 75,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.resize_bits == 0 || self.resize_bits >= 16 {
            return Err(ConfigError::InvalidResizeBits(self.resize_bits));
        }
        if !(1..=100).contains(&self.load_factor_percent) {
            return Err(ConfigError::InvalidLoadFactor(self.load_factor_percent));
        }
        Ok(())
    }

    /// The largest entry count a table of the given capacity may hold.
    pub fn grow_threshold(&self, capacity: usize) -> usize {
        capacity * self.load_factor_percent as usize / 100
    }

    /// Below this entry count a table of the given capacity is shrunk.
    pub fn shrink_threshold(&self, capacity: usize) -> usize {
        self.grow_threshold(capacity) / ((1 << self.resize_bits) + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighwayConfig {
    pub index: IndexConfig,

    /// Initial length of the slot arrays. They double whenever they fill up.
    pub station_capacity: usize,
}

impl Default for HighwayConfig {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            station_capacity: 8,
        }
    }
}

impl HighwayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.station_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.index.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroCapacity,
    InvalidResizeBits(u32),
    InvalidLoadFactor(u32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroCapacity => write!(f, "capacities must be positive"),
            ConfigError::InvalidResizeBits(bits) => {
                write!(f, "resize bits must be in 1..16, got {}", bits)
            }
            ConfigError::InvalidLoadFactor(percent) => {
                write!(f, "load factor must be in 1..=100 percent, got {}", percent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HighwayConfig::default();
        assert_eq!(config.station_capacity, 8);
        assert_eq!(config.index.min_capacity, 8);
        assert_eq!(config.index.resize_bits, 2);
        assert_eq!(config.index.load_factor_percent, 75);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_thresholds() {
        let config = IndexConfig::default();
        assert_eq!(config.grow_threshold(8), 6);
        assert_eq!(config.shrink_threshold(8), 1);
        assert_eq!(config.grow_threshold(32), 24);
        assert_eq!(config.shrink_threshold(32), 4);
        assert_eq!(config.grow_threshold(128), 96);
        assert_eq!(config.shrink_threshold(128), 19);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = IndexConfig::default();
        assert_eq!(
            IndexConfig {
                min_capacity: 0,
                ..base
            }
            .validate(),
            Err(ConfigError::ZeroCapacity)
        );
        assert_eq!(
            IndexConfig {
                resize_bits: 0,
                ..base
            }
            .validate(),
            Err(ConfigError::InvalidResizeBits(0))
        );
        assert_eq!(
            IndexConfig {
                load_factor_percent: 101,
                ..base
            }
            .validate(),
            Err(ConfigError::InvalidLoadFactor(101))
        );
        assert_eq!(
            HighwayConfig {
                index: base,
                station_capacity: 0
            }
            .validate(),
            Err(ConfigError::ZeroCapacity)
        );
    }
}
