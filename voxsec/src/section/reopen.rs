use crate::context::Context;
use crate::pool::Recycler;
use crate::position::COLUMNS;
use crate::section::{Dirty, Representation, Section};
use crate::AIR;

impl Section {
	/// Converts a finalized section of any kind back into build form with identical contents,
	/// so that column writes can continue. Does nothing while already building.
	pub fn reopen(&mut self, ctx: &Context) {
		if self.scratch.is_some() {
			return;
		}

		let pools = ctx.pools();
		let mut scratch = pools.scratch.create();

		log::debug!("reopening {} section with {} solid voxels", self.representation.kind(), self.non_air);

		match self.representation {
			Representation::Empty => (),
			Representation::Uniform(id) => scratch.fill_uniform(id),
			ref representation => {
				let mut dense = pools.dense.create();
				representation.decode_into(&mut dense);

				for zx in 0..COLUMNS {
					let mut cells = [AIR; 16];

					for (y, cell) in cells.iter_mut().enumerate() {
						*cell = dense[(y << 8) | zx];
					}

					if cells.iter().any(|&id| id != AIR) {
						scratch.load_column(zx as u8, &cells, &pools.escalated);
					}
				}

				pools.dense.destroy(dense);
			}
		}

		self.clear_payload(ctx);
		self.scratch = Some(scratch);
		self.dirty = Dirty::default();
	}

	/// Reopens a `Uniform` section for further column writes. Returns false, leaving the
	/// section untouched, for every other kind or if it is already being built.
	pub fn convert_uniform_to_scratch(&mut self, ctx: &Context) -> bool {
		match self.representation {
			Representation::Uniform(_) if self.scratch.is_none() => {
				self.reopen(ctx);
				true
			},
			_ => false
		}
	}
}

#[cfg(test)]
mod test {
	use crate::context::Context;
	use crate::section::{Kind, Section};

	fn stacked(ctx: &Context) -> Section {
		let mut section = Section::new();

		for x in 0..16 {
			for z in 0..16 {
				section.write_column(ctx, x, z, 0, 15, 7);
			}
		}

		section.finalize(ctx);
		section
	}

	#[test]
	fn test_convert_uniform() {
		let ctx = Context::default();
		let mut section = stacked(&ctx);

		assert_eq!(section.kind(), Kind::Uniform);
		assert!(section.convert_uniform_to_scratch(&ctx));
		assert!(section.is_building());
		assert_eq!(section.get_block(4, 9, 2), 7);
		assert!(!section.convert_uniform_to_scratch(&ctx));

		section.write_column(&ctx, 0, 0, 0, 15, 3);
		section.finalize(&ctx);

		assert_eq!(section.kind(), Kind::MultiPacked);
		assert_eq!(section.get_block(0, 0, 0), 3);
		assert_eq!(section.get_block(1, 0, 0), 7);
	}

	#[test]
	fn test_convert_rejects_other_kinds() {
		let ctx = Context::default();
		let mut section = Section::new();

		section.write_column(&ctx, 1, 1, 0, 3, 2);
		section.finalize(&ctx);

		assert_eq!(section.kind(), Kind::Sparse);
		assert!(!section.convert_uniform_to_scratch(&ctx));
		assert!(!section.is_building());
	}

	#[test]
	fn test_reopen_preserves_contents() {
		let ctx = Context::default();
		let mut section = Section::new();

		for x in 0..16u8 {
			for z in 0..16u8 {
				section.write_column(&ctx, x, z, 0, 4, 1);
				section.write_column(&ctx, x, z, 5, 5 + (x % 4), 2 + (z % 3) as u16);
			}
		}

		section.finalize(&ctx);
		assert_eq!(section.kind(), Kind::MultiPacked);

		let before: Vec<_> = (0..4096u16).map(|index| section.representation().get(index as usize)).collect();

		section.reopen(&ctx);
		assert!(section.is_building());
		section.finalize(&ctx);

		let after: Vec<_> = (0..4096u16).map(|index| section.representation().get(index as usize)).collect();
		assert_eq!(before, after);
	}
}
