//! Adjacency counting and the internal exposure estimate derived from it.
//!
//! Exposure is the number of solid voxel faces not shared with another solid voxel of the
//! same section: `6 * non_air - 2 * (adjacent pairs along X, Y, and Z)`.

use crate::mask::SectionMask;
use crate::section::Bounds;

/// Counts of solid voxel pairs sharing a face, per axis.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Adjacency {
	pub x: u32,
	pub y: u32,
	pub z: u32
}

impl Adjacency {
	pub fn total(&self) -> u32 {
		self.x + self.y + self.z
	}
}

pub fn internal_exposure(non_air: u32, adjacency: Adjacency) -> u32 {
	(6 * non_air).saturating_sub(2 * adjacency.total())
}

/// Exposure of a solid cube with sides of `edge` voxels, in closed form.
pub fn full_cube(edge: u32) -> u32 {
	let face = edge * edge;

	6 * face * edge - 2 * (3 * edge.saturating_sub(1) * face)
}

/// Solid count, adjacency, and bounds of an occupancy set, computed a row at a time.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Metrics {
	pub non_air: u32,
	pub adjacency: Adjacency,
	pub bounds: Option<Bounds>
}

impl Metrics {
	pub fn from_occupancy(occupancy: &SectionMask) -> Self {
		let mut metrics = Metrics::default();

		for y in 0..16u8 {
			for z in 0..16u8 {
				let row = occupancy.row(y, z);

				if row == 0 {
					continue;
				}

				metrics.non_air += row.count_ones();
				metrics.adjacency.x += (row & (row >> 1)).count_ones();

				if z < 15 {
					metrics.adjacency.z += (row & occupancy.row(y, z + 1)).count_ones();
				}

				if y < 15 {
					metrics.adjacency.y += (row & occupancy.row(y + 1, z)).count_ones();
				}

				let min_x = row.trailing_zeros() as u8;
				let max_x = 15 - row.leading_zeros() as u8;

				Bounds::include(&mut metrics.bounds, Bounds { min_x, max_x, min_y: y, max_y: y, min_z: z, max_z: z });
			}
		}

		metrics
	}

	pub fn exposure(&self) -> u32 {
		internal_exposure(self.non_air, self.adjacency)
	}
}
