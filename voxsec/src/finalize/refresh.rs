use crate::context::Context;
use crate::finalize::{full_cube, Metrics};
use crate::mask::{self, FaceMasks, Mask, SectionMask};
use crate::packed::{self, PackedWords};
use crate::palette::Palette;
use crate::pool::Recycler;
use crate::position::{SectionPosition, VOLUME};
use crate::section::{Bounds, Dirty, Representation, Section};
use crate::AIR;
use bit_vec::BitVec;

impl Section {
	/// Recomputes occupancy, faces, bounds, solid count, and exposure from the current payload.
	/// The kind is kept, except that a section left without solid voxels becomes `Empty` and a
	/// completely filled `Packed` section becomes `Uniform`.
	pub(crate) fn refresh(&mut self, ctx: &Context) {
		let pools = ctx.pools();

		match self.representation {
			Representation::Empty => {
				self.clear_payload(ctx);
			},
			Representation::Uniform(_) => {
				if let Some(occupancy) = self.occupancy.take() {
					pools.occupancy.destroy(occupancy);
				}

				self.non_air = VOLUME as u16;
				self.bounds = Some(Bounds::full());
				self.exposure = full_cube(16);
				self.faces = Some(FaceMasks::filled());
			},
			_ => {
				if let Representation::MultiPacked { ref mut palette, ref mut words } = self.representation {
					compact_palette(palette, words);
				}

				let mut occupancy = match self.occupancy.take() {
					Some(mut occupancy) => {
						occupancy.fill(false);
						occupancy
					},
					None => pools.occupancy.create()
				};

				fill_occupancy(&self.representation, &mut occupancy);

				let metrics = Metrics::from_occupancy(&occupancy);

				if metrics.non_air == 0 {
					pools.occupancy.destroy(occupancy);
					self.clear_payload(ctx);
				} else {
					let keep_masks = match self.representation {
						Representation::Sparse { .. } => metrics.non_air as usize >= ctx.thresholds().sparse_mask_min,
						_ => true
					};

					if keep_masks {
						self.faces = Some(mask::faces_from_occupancy(&occupancy));
						self.occupancy = Some(occupancy);
					} else {
						self.faces = None;
						pools.occupancy.destroy(occupancy);
					}

					self.non_air = metrics.non_air as u16;
					self.bounds = metrics.bounds;
					self.exposure = metrics.exposure();
				}
			}
		}

		log::debug!("refreshed {} section metadata, {} solid voxels", self.representation.kind(), self.non_air);

		self.dirty = Dirty { structural: false, id_map: false, metadata_built: true };
		self.promote_full_packed(ctx);
	}
}

fn fill_occupancy(representation: &Representation, occupancy: &mut SectionMask) {
	match *representation {
		Representation::Sparse { ref indices, .. } => {
			for &index in indices {
				occupancy.set_true(SectionPosition::from_yzx(index));
			}
		},
		Representation::Packed { ref words, .. } => occupancy.blocks_mut().copy_from_slice(words.raw()),
		Representation::MultiPacked { ref palette, ref words } => {
			let solid: Vec<bool> = palette.entries().iter().map(|&id| id != AIR).collect();

			for index in 0..VOLUME {
				if solid.get(words.get(index) as usize).cloned().unwrap_or(false) {
					occupancy.set_true(SectionPosition::from_yzx(index as u16));
				}
			}
		},
		Representation::DenseExpanded(ref ids) => {
			for (index, &id) in ids.iter().enumerate() {
				if id != AIR {
					occupancy.set_true(SectionPosition::from_yzx(index as u16));
				}
			}
		},
		Representation::Empty => (),
		Representation::Uniform(_) => occupancy.fill(true)
	}
}

/// Drops palette entries no voxel refers to, or that were replaced with air, and folds entries
/// holding the same id together. Indices are re-encoded, at a narrower width if possible.
fn compact_palette(palette: &mut Palette, words: &mut PackedWords) {
	let mut used = BitVec::from_elem(palette.len(), false);

	for index in 0..VOLUME {
		let value = words.get(index) as usize;

		if value < used.len() {
			used.set(value, true);
		}
	}

	let (compacted, table) = palette.compact(&used);

	if compacted.len() == palette.len() {
		palette.rebuild_lookup();
		return;
	}

	let bits = packed::bits_for(compacted.len());

	log::trace!("compacting palette from {} to {} entries, {} bits per voxel", palette.len(), compacted.len(), bits);

	*words = words.remap(&table, bits);
	*palette = compacted;
}

#[cfg(test)]
mod test {
	use crate::context::Context;
	use crate::mask::Mask;
	use crate::position::SectionPosition;
	use crate::section::{Bounds, Kind, Section};
	use crate::AIR;

	fn terrain(ctx: &Context) -> Section {
		let mut section = Section::new();

		for x in 0..16u8 {
			for z in 0..16u8 {
				section.write_column(ctx, x, z, 0, 2 + (x + z) % 5, 1);
				section.write_column(ctx, x, z, 3 + (x + z) % 5, 4 + (x + z) % 5, 2 + (x % 3) as u16);
			}
		}

		section.finalize(ctx);
		section
	}

	#[test]
	fn test_refresh_matches_fresh_build() {
		let ctx = Context::default();
		let mut section = terrain(&ctx);
		let exposure = section.internal_exposure();
		let bounds = section.bounds();
		let occupancy = section.occupancy().cloned();

		section.dirty.structural = true;
		section.finalize(&ctx);

		assert_eq!(section.internal_exposure(), exposure);
		assert_eq!(section.bounds(), bounds);
		assert_eq!(section.occupancy().cloned(), occupancy);
		assert!(!section.dirty().structural);
	}

	#[test]
	fn test_palette_compaction() {
		let ctx = Context::default();
		let mut section = terrain(&ctx);

		assert_eq!(section.representation().palette().unwrap().len(), 5);

		// Remove every voxel of id 3 and 4 point by point.
		for position in SectionPosition::enumerate() {
			let id = section.get(position);

			if id == 3 || id == 4 {
				section.set_block(&ctx, position.x(), position.y(), position.z(), 2);
			}
		}

		// Id swaps alone leave the palette as is; a shape change triggers the full refresh.
		section.set_block(&ctx, 0, 15, 0, 2);
		section.finalize(&ctx);

		let palette = section.representation().palette().unwrap();

		assert_eq!(palette.entries(), &[AIR, 1, 2]);
		assert_eq!(section.representation().words().unwrap().bits(), 2);
		assert_eq!(section.get_block(1, 4, 0), 2);
		assert_eq!(section.get_block(0, 15, 0), 2);
	}

	#[test]
	fn test_refresh_after_edits() {
		let ctx = Context::default();
		let mut section = terrain(&ctx);

		section.set_block(&ctx, 0, 15, 0, 9);
		section.set_block(&ctx, 15, 0, 15, AIR);
		section.finalize(&ctx);

		let occupancy = section.occupancy().unwrap();

		assert_eq!(occupancy.count_ones(), section.non_air_count() as u32);
		assert_eq!(section.bounds().map(|bounds| bounds.max_y), Some(15));
		assert!(section.faces().unwrap().get(crate::mask::Face::PosY).get(0));
		assert!(!section.faces().unwrap().get(crate::mask::Face::NegY).get(255));
	}

	#[test]
	fn test_refresh_uniform_and_empty() {
		let ctx = Context::default();
		let mut section = Section::new();

		section.dirty.metadata_built = false;
		section.finalize(&ctx);

		assert_eq!(section.kind(), Kind::Empty);
		assert_eq!(section.bounds(), None);
		assert!(section.dirty().metadata_built);

		for x in 0..16 {
			for z in 0..16 {
				section.write_column(&ctx, x, z, 0, 15, 1);
			}
		}

		section.finalize(&ctx);
		section.dirty.structural = true;
		section.finalize(&ctx);

		assert_eq!(section.bounds(), Some(Bounds::full()));
		assert_eq!(section.internal_exposure(), 1536);
	}
}
