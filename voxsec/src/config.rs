//! Tunable thresholds and pool sizes, loadable from TOML.

use crate::position::VOLUME;
use serde::Deserialize;
use thiserror::Error;

/// Largest idle count any pool may be configured to retain.
pub const MAX_POOL_LIMIT: usize = 1 << 20;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("malformed configuration: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("invalid value for `{field}`: {reason}")]
	Invalid {
		field: &'static str,
		reason: String
	}
}

/// Representation selection heuristics used at finalize.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
	/// Largest solid count stored as a sparse list.
	pub sparse_max: usize,
	/// Smallest sparse solid count that also gets occupancy and face masks.
	pub sparse_mask_min: usize,
	/// Largest palette, air included, considered for multi-id packing.
	pub multi_packed_max_palette: usize
}

impl Default for Thresholds {
	fn default() -> Self {
		Thresholds {
			sparse_max: 128,
			sparse_mask_min: 33,
			multi_packed_max_palette: 64
		}
	}
}

/// Maximum number of idle buffers each pool retains.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolLimits {
	pub scratch: usize,
	pub dense: usize,
	pub occupancy: usize,
	pub escalated: usize
}

impl Default for PoolLimits {
	fn default() -> Self {
		PoolLimits {
			scratch: 64,
			dense: 64,
			occupancy: 256,
			escalated: 4096
		}
	}
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
	pub thresholds: Thresholds,
	pub pools: PoolLimits
}

impl Config {
	/// Parses and validates a configuration. Missing fields keep their defaults.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(text)?;
		config.validate()?;

		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		let thresholds = &self.thresholds;

		if thresholds.sparse_max >= VOLUME {
			return Err(invalid("thresholds.sparse_max", format!("{} must be below {}", thresholds.sparse_max, VOLUME)));
		}

		if thresholds.multi_packed_max_palette < 2 || thresholds.multi_packed_max_palette > VOLUME {
			return Err(invalid(
				"thresholds.multi_packed_max_palette",
				format!("{} must be within 2..={}", thresholds.multi_packed_max_palette, VOLUME)
			));
		}

		let pools = [
			("pools.scratch", self.pools.scratch),
			("pools.dense", self.pools.dense),
			("pools.occupancy", self.pools.occupancy),
			("pools.escalated", self.pools.escalated)
		];

		for &(field, limit) in &pools {
			if limit > MAX_POOL_LIMIT {
				return Err(invalid(field, format!("{} exceeds the maximum of {}", limit, MAX_POOL_LIMIT)));
			}
		}

		if thresholds.sparse_mask_min > thresholds.sparse_max {
			log::warn!(
				"sparse_mask_min ({}) is above sparse_max ({}), sparse sections will never carry masks",
				thresholds.sparse_mask_min,
				thresholds.sparse_max
			);
		}

		Ok(())
	}
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
	ConfigError::Invalid { field, reason }
}
