//! Turns a section's pending writes or stale metadata into a compact, queryable form.
//!
//! A section being built is consumed into one of the six representations:
//! * nothing solid was written: `Empty`
//! * some column escalated: a dense expansion, always `DenseExpanded`
//! * every solid column is one full height run of one id: the analytic shortcut
//! * otherwise: one fused traversal over the columns, then selection by cost
//!
//! A finalized section is refreshed in place instead, keeping its kind.

mod exposure;
mod shortcut;
mod fused;
mod dense;
mod refresh;

pub use self::exposure::{full_cube, internal_exposure, Adjacency, Metrics};

use crate::context::Context;
use crate::mask::{FaceMasks, SectionMask};
use crate::pool::Recycler;
use crate::position::VOLUME;
use crate::scratch::BuildScratch;
use crate::section::{Bounds, Dirty, Representation, Section};

/// A freshly selected representation with its derived metadata.
pub(crate) struct Built {
	representation: Representation,
	non_air: u32,
	exposure: u32,
	bounds: Option<Bounds>,
	occupancy: Option<SectionMask>,
	faces: Option<FaceMasks>
}

impl Built {
	fn empty() -> Self {
		Built {
			representation: Representation::Empty,
			non_air: 0,
			exposure: 0,
			bounds: None,
			occupancy: None,
			faces: None
		}
	}

	fn uniform(id: u16) -> Self {
		Built {
			representation: Representation::Uniform(id),
			non_air: VOLUME as u32,
			exposure: full_cube(16),
			bounds: Some(Bounds::full()),
			occupancy: None,
			faces: Some(FaceMasks::filled())
		}
	}
}

impl Section {
	/// Selects a representation for pending writes, or brings stale metadata up to date.
	/// Does nothing if the section is finalized and clean.
	///
	/// Finalizing a section that is being built consumes its scratch, which goes back to the
	/// context's pool.
	pub fn finalize(&mut self, ctx: &Context) {
		if let Some(mut scratch) = self.scratch.take() {
			let built = build(&scratch, ctx);

			scratch.release(ctx.pools());
			ctx.pools().scratch.destroy(scratch);

			self.install(ctx, built);
			return;
		}

		if self.dirty.structural || !self.dirty.metadata_built {
			self.refresh(ctx);
		} else if self.dirty.id_map {
			self.patch_ids(ctx);
		}
	}

	fn install(&mut self, ctx: &Context, built: Built) {
		self.clear_payload(ctx);

		log::debug!("finalized {} solid voxels as {}", built.non_air, built.representation.kind());

		self.representation = built.representation;
		self.non_air = built.non_air as u16;
		self.exposure = built.exposure;
		self.bounds = built.bounds;
		self.occupancy = built.occupancy;
		self.faces = built.faces;
		self.dirty = Dirty { structural: false, id_map: false, metadata_built: true };
	}

	/// Resolves id only changes: the palette lookup is rebuilt and a completely filled single
	/// id section becomes uniform.
	fn patch_ids(&mut self, ctx: &Context) {
		if let Representation::MultiPacked { ref mut palette, .. } = self.representation {
			palette.rebuild_lookup();
		}

		self.promote_full_packed(ctx);
		self.dirty.id_map = false;
	}

	fn promote_full_packed(&mut self, ctx: &Context) {
		let id = match self.representation {
			Representation::Packed { id, .. } if self.non_air as usize == VOLUME => id,
			_ => return
		};

		log::debug!("packed section is completely filled, promoting to uniform");

		self.install(ctx, Built::uniform(id));
	}
}

fn build(scratch: &BuildScratch, ctx: &Context) -> Built {
	if !scratch.any_non_air() {
		return Built::empty();
	}

	if scratch.any_escalated() {
		return dense::expand(scratch, ctx);
	}

	if let Some(built) = shortcut::single_id(scratch, ctx) {
		return built;
	}

	fused::traverse(scratch, ctx)
}
