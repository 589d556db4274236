//! Finalized section storage and its mutation entry points.
//!
//! A section is either built, holding one `Representation` plus derived metadata, or being
//! built, holding a `BuildScratch` that column writes go to until the next finalize.

mod representation;
mod access;
mod reopen;
mod replace;

pub use self::representation::{Kind, Representation};

use crate::column::Run;
use crate::context::Context;
use crate::mask::{FaceMasks, SectionMask};
use crate::pool::Recycler;
use crate::scratch::{BuildScratch, ColumnSet};
use crate::{BlockId, AIR};

/// Inclusive bounds of the solid voxels in a section.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Bounds {
	pub min_x: u8,
	pub max_x: u8,
	pub min_y: u8,
	pub max_y: u8,
	pub min_z: u8,
	pub max_z: u8
}

impl Bounds {
	pub fn full() -> Self {
		Bounds { min_x: 0, max_x: 15, min_y: 0, max_y: 15, min_z: 0, max_z: 15 }
	}

	pub fn point(x: u8, y: u8, z: u8) -> Self {
		Bounds { min_x: x, max_x: x, min_y: y, max_y: y, min_z: z, max_z: z }
	}

	/// Bounds of the set bits of a column mask at (x, z), if any are set.
	pub fn column(x: u8, z: u8, mask: u16) -> Option<Self> {
		if mask == 0 {
			return None;
		}

		let min_y = mask.trailing_zeros() as u8;
		let max_y = 15 - mask.leading_zeros() as u8;

		Some(Bounds { min_x: x, max_x: x, min_y, max_y, min_z: z, max_z: z })
	}

	pub fn union(self, other: Bounds) -> Self {
		Bounds {
			min_x: self.min_x.min(other.min_x),
			max_x: self.max_x.max(other.max_x),
			min_y: self.min_y.min(other.min_y),
			max_y: self.max_y.max(other.max_y),
			min_z: self.min_z.min(other.min_z),
			max_z: self.max_z.max(other.max_z)
		}
	}

	/// Grows `bounds` to cover `other`.
	pub fn include(bounds: &mut Option<Bounds>, other: Bounds) {
		*bounds = Some(match *bounds {
			Some(existing) => existing.union(other),
			None => other
		});
	}

	pub fn contains(&self, x: u8, y: u8, z: u8) -> bool {
		x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y && z >= self.min_z && z <= self.max_z
	}
}

/// Which parts of a finalized section are stale.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Dirty {
	/// Solidity changed; occupancy, bounds, and exposure need recomputing.
	pub structural: bool,
	/// Ids changed in place without changing shape.
	pub id_map: bool,
	/// Derived metadata has been computed at least once.
	pub metadata_built: bool
}

#[derive(Debug)]
pub struct Section {
	pub(crate) representation: Representation,
	pub(crate) scratch: Option<Box<BuildScratch>>,
	pub(crate) non_air: u16,
	pub(crate) bounds: Option<Bounds>,
	pub(crate) exposure: u32,
	pub(crate) occupancy: Option<SectionMask>,
	pub(crate) faces: Option<FaceMasks>,
	pub(crate) dirty: Dirty
}

impl Section {
	pub fn new() -> Self {
		Section {
			representation: Representation::Empty,
			scratch: None,
			non_air: 0,
			bounds: None,
			exposure: 0,
			occupancy: None,
			faces: None,
			dirty: Dirty { structural: false, id_map: false, metadata_built: true }
		}
	}

	/// Generation fast path: writes `id` over `y_start..=y_end` of column (x, z). Runs for a
	/// column are expected in ascending Y order; anything else still works but may escalate.
	/// Out of range coordinates, inverted ranges, and air are ignored.
	pub fn write_column(&mut self, ctx: &Context, x: u8, z: u8, y_start: u8, y_end: u8, id: BlockId) {
		if x > 15 || z > 15 || id == AIR {
			return;
		}

		let run = Run::new(y_start, y_end, id);

		if !run.is_valid() {
			return;
		}

		self.ensure_scratch(ctx).push_run(column_index(x, z), run, &ctx.pools().escalated);
	}

	/// General path: applies each run in order, overlapping or not. Invalid and air runs are
	/// skipped.
	pub fn write_column_runs(&mut self, ctx: &Context, x: u8, z: u8, runs: &[Run]) {
		if x > 15 || z > 15 {
			return;
		}

		let zx = column_index(x, z);

		for &run in runs {
			if !run.is_valid() || run.id == AIR {
				continue;
			}

			self.ensure_scratch(ctx).add_run(zx, run, &ctx.pools().escalated);
		}
	}

	pub fn kind(&self) -> Kind {
		self.representation.kind()
	}

	pub fn representation(&self) -> &Representation {
		&self.representation
	}

	/// True while column writes are pending a finalize.
	pub fn is_building(&self) -> bool {
		self.scratch.is_some()
	}

	pub fn scratch(&self) -> Option<&BuildScratch> {
		self.scratch.as_deref()
	}

	/// Columns holding `id` while the section is being built, for callers that only want to
	/// visit those. `None` if the section is not being built or tracks too many ids.
	pub fn columns_containing(&mut self, id: BlockId) -> Option<ColumnSet> {
		self.scratch.as_mut().and_then(|scratch| scratch.columns_containing(id))
	}

	/// Number of solid voxels. Exact after every `set_block`; after `replace_id` with air on
	/// a packed payload it is exact once finalized.
	pub fn non_air_count(&self) -> u16 {
		self.non_air
	}

	pub fn bounds(&self) -> Option<Bounds> {
		self.bounds
	}

	pub fn internal_exposure(&self) -> u32 {
		self.exposure
	}

	pub fn occupancy(&self) -> Option<&SectionMask> {
		self.occupancy.as_ref()
	}

	pub fn faces(&self) -> Option<&FaceMasks> {
		self.faces.as_ref()
	}

	pub fn dirty(&self) -> Dirty {
		self.dirty
	}

	/// Hands every pooled buffer back to the context and leaves the section empty.
	pub fn release(&mut self, ctx: &Context) {
		if let Some(mut scratch) = self.scratch.take() {
			scratch.release(ctx.pools());
			ctx.pools().scratch.destroy(scratch);
		}

		self.clear_payload(ctx);
		self.dirty = Dirty { structural: false, id_map: false, metadata_built: true };
	}

	/// Rents a scratch, reopening the current representation into it if needed.
	pub(crate) fn ensure_scratch(&mut self, ctx: &Context) -> &mut BuildScratch {
		if self.scratch.is_none() {
			self.reopen(ctx);
		}

		self.scratch.get_or_insert_with(|| ctx.pools().scratch.create())
	}

	/// Drops the representation and derived metadata, returning pooled buffers.
	pub(crate) fn clear_payload(&mut self, ctx: &Context) {
		let representation = std::mem::replace(&mut self.representation, Representation::Empty);
		representation.release(ctx.pools());

		if let Some(occupancy) = self.occupancy.take() {
			ctx.pools().occupancy.destroy(occupancy);
		}

		self.faces = None;
		self.non_air = 0;
		self.bounds = None;
		self.exposure = 0;
	}
}

impl Default for Section {
	fn default() -> Self {
		Section::new()
	}
}

pub(crate) fn column_index(x: u8, z: u8) -> u8 {
	((z & 15) << 4) | (x & 15)
}
