use crate::column::Run;
use crate::context::Context;
use crate::mask::Mask;
use crate::packed::PackedWords;
use crate::palette::Palette;
use crate::pool::Recycler;
use crate::position::{LayerPosition, SectionPosition, COLUMNS, VOLUME};
use crate::section::{column_index, Representation, Section};
use crate::{BlockId, AIR};

impl Section {
	/// Returns the id at (x, y, z), answering from the scratch while building.
	/// Out of range coordinates read as air.
	pub fn get_block(&self, x: u8, y: u8, z: u8) -> BlockId {
		if x > 15 || y > 15 || z > 15 {
			return AIR;
		}

		match self.scratch {
			Some(ref scratch) => scratch.get(x, y, z),
			None => self.representation.get(SectionPosition::new(x, y, z).yzx() as usize)
		}
	}

	pub fn get(&self, position: SectionPosition) -> BlockId {
		self.get_block(position.x(), position.y(), position.z())
	}

	/// Writes a single voxel. Air is allowed. While building, this is a one cell run on the
	/// general column path. Otherwise the payload is edited in place, switching kind only when
	/// the current one cannot hold the new content.
	pub fn set_block(&mut self, ctx: &Context, x: u8, y: u8, z: u8, id: BlockId) {
		if x > 15 || y > 15 || z > 15 {
			return;
		}

		if let Some(ref mut scratch) = self.scratch {
			scratch.add_run(column_index(x, z), Run::new(y, y, id), &ctx.pools().escalated);
			return;
		}

		let position = SectionPosition::new(x, y, z);
		let index = position.yzx() as usize;
		let old = self.representation.get(index);

		if old == id {
			return;
		}

		self.store(ctx, index, id);

		let solid = id != AIR;

		if (old != AIR) == solid {
			self.dirty.id_map = true;
			return;
		}

		if solid {
			self.non_air += 1;
		} else {
			self.non_air -= 1;
		}

		if let Some(ref mut occupancy) = self.occupancy {
			occupancy.set(position, solid);
		}

		if let Some(ref mut faces) = self.faces {
			faces.update(position, solid);
		}

		self.dirty.structural = true;

		if self.non_air == 0 {
			log::debug!("last solid voxel removed, collapsing to empty");
			self.clear_payload(ctx);
		}
	}

	/// Calls `f` with the position and id of every solid voxel. Order depends on the kind.
	pub fn for_each_solid<F>(&self, mut f: F) where F: FnMut(SectionPosition, BlockId) {
		if let Some(ref scratch) = self.scratch {
			for zx in 0..COLUMNS {
				let column = scratch.column(zx as u8);

				if column.is_empty() {
					continue;
				}

				let layer = LayerPosition::from_zx(zx as u8);

				for (y, &id) in column.cells(scratch.arena()).iter().enumerate() {
					if id != AIR {
						f(SectionPosition::from_layer(y as u8, layer), id);
					}
				}
			}

			return;
		}

		match self.representation {
			Representation::Empty => (),
			Representation::Uniform(id) => {
				for position in SectionPosition::enumerate() {
					f(position, id);
				}
			},
			Representation::Sparse { ref indices, ref ids } => {
				for (&index, &id) in indices.iter().zip(ids.iter()) {
					f(SectionPosition::from_yzx(index), id);
				}
			},
			Representation::Packed { id, ref words } => {
				for (word_index, &word) in words.raw().iter().enumerate() {
					let mut remaining = word;

					while remaining != 0 {
						let bit = remaining.trailing_zeros() as u16;
						remaining &= remaining - 1;

						f(SectionPosition::from_yzx((word_index as u16) * 64 + bit), id);
					}
				}
			},
			ref representation => {
				for index in 0..VOLUME {
					let id = representation.get(index);

					if id != AIR {
						f(SectionPosition::from_yzx(index as u16), id);
					}
				}
			}
		}
	}

	/// Edits the payload at `index`, which must currently hold something other than `id`.
	fn store(&mut self, ctx: &Context, index: usize, id: BlockId) {
		// Uniform carries no occupancy, but the packed kinds it turns into do.
		if let Representation::Uniform(_) = self.representation {
			if self.occupancy.is_none() {
				let mut occupancy = ctx.pools().occupancy.create();
				occupancy.fill(true);

				self.occupancy = Some(occupancy);
			}
		}

		let replacement = match self.representation {
			Representation::Empty => Some(Representation::Sparse { indices: vec![index as u16], ids: vec![id] }),
			Representation::Uniform(existing) => {
				if id == AIR {
					let mut words = PackedWords::new(1);
					words.fill(1);
					words.set(index, 0);

					Some(Representation::Packed { id: existing, words })
				} else {
					let mut words = PackedWords::new(2);
					words.fill(1);
					words.set(index, 2);

					Some(Representation::MultiPacked { palette: Palette::from_ids(vec![existing, id]), words })
				}
			},
			Representation::Sparse { ref mut indices, ref mut ids } => {
				match indices.binary_search(&(index as u16)) {
					Ok(position) if id == AIR => {
						indices.remove(position);
						ids.remove(position);
					},
					Ok(position) => ids[position] = id,
					Err(position) => {
						indices.insert(position, index as u16);
						ids.insert(position, id);
					}
				}

				None
			},
			Representation::Packed { id: existing, ref mut words } => {
				if id == AIR {
					words.set(index, 0);
					None
				} else if id == existing {
					words.set(index, 1);
					None
				} else {
					let mut words = std::mem::replace(words, PackedWords::new(1));
					words.grow_bits(2);
					words.set(index, 2);

					Some(Representation::MultiPacked { palette: Palette::from_ids(vec![existing, id]), words })
				}
			},
			Representation::MultiPacked { ref mut palette, ref mut words } => {
				if id == AIR {
					words.set(index, 0);
				} else {
					let value = palette.acquire(id);

					words.ensure_fits(value);
					words.set(index, value);
				}

				None
			},
			Representation::DenseExpanded(ref mut ids) => {
				ids[index] = id;
				None
			}
		};

		if let Some(representation) = replacement {
			log::debug!("set_block moves a {} section to {}", self.representation.kind(), representation.kind());

			let previous = std::mem::replace(&mut self.representation, representation);
			previous.release(ctx.pools());
		}

		let overflow = match self.representation {
			Representation::Sparse { ref indices, .. } => indices.len() > ctx.thresholds().sparse_max,
			_ => false
		};

		if overflow {
			let mut dense = ctx.pools().dense.create();
			self.representation.decode_into(&mut dense);

			log::debug!("sparse section passed {} solid voxels, expanding", ctx.thresholds().sparse_max);

			self.representation = Representation::DenseExpanded(dense);
		}
	}
}

#[cfg(test)]
mod test {
	use crate::context::Context;
	use crate::mask::{Face, Mask};
	use crate::position::SectionPosition;
	use crate::section::{Kind, Section};
	use crate::AIR;

	fn uniform(ctx: &Context, id: u16) -> Section {
		let mut section = Section::new();

		for x in 0..16 {
			for z in 0..16 {
				section.write_column(ctx, x, z, 0, 15, id);
			}
		}

		section.finalize(ctx);
		section
	}

	#[test]
	fn test_uniform_to_packed() {
		let ctx = Context::default();
		let mut section = uniform(&ctx, 4);

		section.set_block(&ctx, 0, 0, 0, AIR);

		assert_eq!(section.kind(), Kind::Packed);
		assert_eq!(section.non_air_count(), 4095);
		assert_eq!(section.get_block(0, 0, 0), AIR);
		assert_eq!(section.get_block(1, 0, 0), 4);
		assert!(!section.faces().unwrap().get(Face::NegX).get(0));
	}

	#[test]
	fn test_uniform_to_multi_packed() {
		let ctx = Context::default();
		let mut section = uniform(&ctx, 4);

		section.set_block(&ctx, 5, 6, 7, 9);

		assert_eq!(section.kind(), Kind::MultiPacked);
		assert_eq!(section.non_air_count(), 4096);
		assert_eq!(section.get_block(5, 6, 7), 9);
		assert_eq!(section.get_block(5, 6, 8), 4);
		assert!(section.dirty().id_map);
	}

	#[test]
	fn test_packed_promotes_to_multi() {
		let ctx = Context::default();
		let mut section = uniform(&ctx, 4);

		section.set_block(&ctx, 0, 0, 0, AIR);
		section.set_block(&ctx, 1, 0, 0, 8);

		assert_eq!(section.kind(), Kind::MultiPacked);
		assert_eq!(section.get_block(0, 0, 0), AIR);
		assert_eq!(section.get_block(1, 0, 0), 8);
		assert_eq!(section.get_block(2, 0, 0), 4);
		assert_eq!(section.non_air_count(), 4095);
	}

	#[test]
	fn test_sparse_edits_and_collapse() {
		let ctx = Context::default();
		let mut section = Section::new();

		section.set_block(&ctx, 1, 2, 3, 5);
		section.set_block(&ctx, 0, 0, 0, 6);
		section.set_block(&ctx, 1, 2, 3, 7);

		assert_eq!(section.kind(), Kind::Sparse);
		assert_eq!(section.non_air_count(), 2);
		assert_eq!(section.representation().sparse().unwrap().0, &[0, SectionPosition::new(1, 2, 3).yzx()]);
		assert_eq!(section.get_block(1, 2, 3), 7);

		section.set_block(&ctx, 1, 2, 3, AIR);
		section.set_block(&ctx, 0, 0, 0, AIR);

		assert_eq!(section.kind(), Kind::Empty);
		assert_eq!(section.non_air_count(), 0);
	}

	#[test]
	fn test_sparse_overflow() {
		let ctx = Context::default();
		let mut section = Section::new();
		let limit = ctx.thresholds().sparse_max;

		for index in 0..=limit {
			let position = SectionPosition::from_yzx(index as u16 * 3);
			section.set_block(&ctx, position.x(), position.y(), position.z(), 1 + (index % 5) as u16);
		}

		assert_eq!(section.kind(), Kind::DenseExpanded);
		assert_eq!(section.non_air_count() as usize, limit + 1);

		for index in 0..=limit {
			let position = SectionPosition::from_yzx(index as u16 * 3);
			assert_eq!(section.get(position), 1 + (index % 5) as u16);
		}
	}

	#[test]
	fn test_uniform_edit_keeps_occupancy() {
		let ctx = Context::default();
		let mut section = uniform(&ctx, 4);

		section.set_block(&ctx, 5, 6, 7, 9);
		section.finalize(&ctx);

		assert_eq!(section.kind(), Kind::MultiPacked);
		assert_eq!(section.occupancy().map(|occupancy| occupancy.count_ones()), Some(section.non_air_count() as u32));

		section.set_block(&ctx, 5, 6, 7, AIR);
		section.set_block(&ctx, 0, 15, 0, AIR);
		section.finalize(&ctx);

		let occupancy = section.occupancy().unwrap();

		assert_eq!(occupancy.count_ones(), 4094);
		assert!(!occupancy.get(SectionPosition::new(5, 6, 7)));
		assert!(!occupancy.get(SectionPosition::new(0, 15, 0)));
		assert_eq!(section.non_air_count(), 4094);
	}

	#[test]
	fn test_many_ids_grow_width() {
		let ctx = Context::default();
		let mut section = uniform(&ctx, 1);

		// 256 further ids forces the width up to 9 bits.
		for index in 0..256u16 {
			let position = SectionPosition::from_yzx(index * 16);
			section.set_block(&ctx, position.x(), position.y(), position.z(), 1000 + index);
		}

		assert_eq!(section.representation().words().unwrap().bits(), 9);

		for index in 0..256u16 {
			assert_eq!(section.get(SectionPosition::from_yzx(index * 16)), 1000 + index);
			assert_eq!(section.get(SectionPosition::from_yzx(index * 16 + 1)), 1);
		}
	}

	#[test]
	fn test_scratch_set_block() {
		let ctx = Context::default();
		let mut section = Section::new();

		section.write_column(&ctx, 3, 3, 0, 15, 2);
		section.set_block(&ctx, 3, 8, 3, AIR);
		section.set_block(&ctx, 3, 9, 3, 6);

		assert!(section.is_building());
		assert_eq!(section.get_block(3, 8, 3), AIR);
		assert_eq!(section.get_block(3, 9, 3), 6);
		assert_eq!(section.get_block(3, 10, 3), 2);
	}

	#[test]
	fn test_occupancy_tracks_edits() {
		let ctx = Context::default();
		let mut section = Section::new();

		for x in 0..16 {
			for z in 0..16 {
				section.write_column(&ctx, x, z, 0, 7, 3);
			}
		}

		section.finalize(&ctx);
		assert_eq!(section.kind(), Kind::Packed);

		section.set_block(&ctx, 4, 12, 4, 3);
		section.set_block(&ctx, 4, 0, 4, AIR);

		let occupancy = section.occupancy().unwrap();

		assert!(occupancy.get(SectionPosition::new(4, 12, 4)));
		assert!(!occupancy.get(SectionPosition::new(4, 0, 4)));
		assert_eq!(occupancy.count_ones(), section.non_air_count() as u32);
	}

	#[test]
	fn test_for_each_solid() {
		let ctx = Context::default();
		let mut section = Section::new();

		section.write_column(&ctx, 0, 0, 0, 2, 1);
		section.write_column(&ctx, 15, 15, 14, 15, 2);

		let mut building = Vec::new();
		section.for_each_solid(|position, id| building.push((position, id)));
		building.sort();

		section.finalize(&ctx);

		let mut finalized = Vec::new();
		section.for_each_solid(|position, id| finalized.push((position, id)));
		finalized.sort();

		assert_eq!(building.len(), 5);
		assert_eq!(building, finalized);
	}
}
