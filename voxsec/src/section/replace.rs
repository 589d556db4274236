use crate::context::Context;
use crate::section::{Representation, Section};
use crate::{BlockId, AIR};

impl Section {
	/// Replaces every voxel holding `from` with `to`, which may be air. Returns true if any
	/// voxel changed.
	///
	/// While building, only the columns listed for `from` in the distinct table are visited.
	/// A finalized section is patched in place: id only changes mark the id map dirty, and
	/// replacement with air marks the structure dirty, to be resolved by the next finalize.
	pub fn replace_id(&mut self, ctx: &Context, from: BlockId, to: BlockId) -> bool {
		if from == AIR || from == to {
			return false;
		}

		if let Some(ref mut scratch) = self.scratch {
			return scratch.replace_id(from, to);
		}

		let changed = match self.representation {
			Representation::Empty => false,
			Representation::Uniform(ref mut id) | Representation::Packed { ref mut id, .. } => {
				if *id != from {
					false
				} else if to == AIR {
					self.non_air = 0;
					true
				} else {
					*id = to;
					true
				}
			},
			Representation::Sparse { ref mut indices, ref mut ids } => {
				if to == AIR {
					let before = ids.len();
					let mut kept = 0;

					for position in 0..before {
						if ids[position] != from {
							indices[kept] = indices[position];
							ids[kept] = ids[position];
							kept += 1;
						}
					}

					indices.truncate(kept);
					ids.truncate(kept);
					self.non_air = kept as u16;

					kept != before
				} else {
					let mut changed = false;

					for id in ids.iter_mut().filter(|id| **id == from) {
						*id = to;
						changed = true;
					}

					changed
				}
			},
			Representation::MultiPacked { ref mut palette, ref words } => {
				if to == AIR {
					let counts = words.counts(palette.len());
					let removed: u32 = palette.entries().iter()
						.zip(counts.iter())
						.skip(1)
						.filter(|&(&id, _)| id == from)
						.map(|(_, &count)| count)
						.sum();

					self.non_air -= removed as u16;
				}

				palette.replace_id(from, to)
			},
			Representation::DenseExpanded(ref mut ids) => {
				let mut removed = 0;
				let mut changed = false;

				for id in ids.iter_mut().filter(|id| **id == from) {
					*id = to;
					changed = true;
					removed += 1;
				}

				if to == AIR {
					self.non_air -= removed;
				}

				changed
			}
		};

		if changed {
			if to == AIR {
				self.dirty.structural = true;
			} else {
				self.dirty.id_map = true;
			}
		}

		if changed && self.non_air == 0 {
			self.clear_payload(ctx);
		}

		changed
	}
}
