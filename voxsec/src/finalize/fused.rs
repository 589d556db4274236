use crate::config::Thresholds;
use crate::context::Context;
use crate::finalize::{internal_exposure, Adjacency, Built};
use crate::mask::{self, FaceMasks};
use crate::packed::{self, PackedWords};
use crate::palette::Palette;
use crate::pool::Recycler;
use crate::position::{COLUMNS, VOLUME};
use crate::scratch::BuildScratch;
use crate::section::{Bounds, Representation};
use crate::{BlockId, AIR};

/// Bytes of a dense array, the baseline every packed candidate must beat.
const DENSE_BYTES: usize = VOLUME * 2;

/// General finalize of run-only columns. A single pass over the columns gathers the solid
/// count, adjacency on all three axes, and bounds; the representation is then chosen by size.
pub(crate) fn traverse(scratch: &BuildScratch, ctx: &Context) -> Built {
	let columns = scratch.columns();

	let mut masks = [0u16; COLUMNS];
	let mut non_air = 0u32;
	let mut adjacency = Adjacency::default();
	let mut bounds = None;

	let mut uniform = columns[0].full_run();
	let mut uniform_columns = 0;

	for (zx, column) in columns.iter().enumerate() {
		let mask = column.mask();
		masks[zx] = mask;

		if mask == 0 {
			uniform = None;
			continue;
		}

		if uniform.is_some() && column.full_run() == uniform {
			uniform_columns += 1;

			if uniform_columns == COLUMNS {
				if let Some(id) = uniform {
					return Built::uniform(id);
				}
			}
		} else {
			uniform = None;
		}

		let (x, z) = ((zx & 15) as u8, (zx >> 4) as u8);

		non_air += column.non_air() as u32;
		adjacency.y += column.vertical_adjacency() as u32;

		if x < 15 {
			adjacency.x += (mask & columns[zx + 1].mask()).count_ones();
		}

		if z < 15 {
			adjacency.z += (mask & columns[zx + 16].mask()).count_ones();
		}

		if let Some(column_bounds) = Bounds::column(x, z, mask) {
			Bounds::include(&mut bounds, column_bounds);
		}
	}

	if non_air == 0 {
		return Built::empty();
	}

	let palette = gather_palette(scratch);
	let exposure = internal_exposure(non_air, adjacency);
	let thresholds = ctx.thresholds();

	let mut representation = select(scratch, &masks, non_air, palette, thresholds, ctx);

	let with_masks = match representation {
		Representation::Sparse { .. } => non_air as usize >= thresholds.sparse_mask_min,
		_ => true
	};

	let (occupancy, faces) = if with_masks {
		let mut occupancy = ctx.pools().occupancy.create();
		let mut faces = FaceMasks::default();
		mask::build_from_columns(&masks, &mut occupancy, &mut faces);

		(Some(occupancy), Some(faces))
	} else {
		(None, None)
	};

	if let (Representation::Packed { words, .. }, Some(occupancy)) = (&mut representation, occupancy.as_ref()) {
		*words = PackedWords::from_occupancy(occupancy);
	}

	Built { representation, non_air, exposure, bounds, occupancy, faces }
}

/// Palette of every solid id present. Comes straight from the distinct table when the table is
/// trusted, and from the runs otherwise.
fn gather_palette(scratch: &BuildScratch) -> Palette {
	if !scratch.is_distinct_dirty() && !scratch.distinct_overflowed() {
		return Palette::from_ids(scratch.distinct().iter().map(|entry| entry.id));
	}

	let mut palette = Palette::new();

	for column in scratch.columns().iter() {
		column.for_each_id(scratch.arena(), |id| {
			palette.acquire(id);
		});
	}

	palette
}

fn select(scratch: &BuildScratch, masks: &[u16; COLUMNS], non_air: u32, mut palette: Palette, thresholds: &Thresholds, ctx: &Context) -> Representation {
	let solid_ids = palette.len() - 1;

	if non_air as usize <= thresholds.sparse_max {
		let mut entries = Vec::with_capacity(non_air as usize);

		visit(scratch, masks, |index, id| entries.push((index as u16, id)));
		entries.sort_unstable_by_key(|&(index, _)| index);

		let (indices, ids) = entries.into_iter().unzip();

		return Representation::Sparse { indices, ids };
	}

	if solid_ids == 1 {
		// Words are taken from the occupancy set once it is built.
		return Representation::Packed { id: palette.get(1), words: PackedWords::new(1) };
	}

	let bits = packed::bits_for(palette.len());
	let packed_bytes = bits as usize * VOLUME / 8 + palette.len() * 2;

	if palette.len() <= thresholds.multi_packed_max_palette && packed_bytes < DENSE_BYTES {
		let mut words = PackedWords::new(bits);

		visit(scratch, masks, |index, id| {
			let value = palette.acquire(id);
			words.set(index, value);
		});

		return Representation::MultiPacked { palette, words };
	}

	let mut dense = ctx.pools().dense.create();
	visit(scratch, masks, |index, id| dense[index] = id);

	Representation::DenseExpanded(dense)
}

/// Calls `f` with the `yzx` index and id of every solid voxel, a column at a time.
fn visit<F>(scratch: &BuildScratch, masks: &[u16; COLUMNS], mut f: F) where F: FnMut(usize, BlockId) {
	for (zx, column) in scratch.columns().iter().enumerate() {
		if masks[zx] == 0 {
			continue;
		}

		for (y, &id) in column.cells(scratch.arena()).iter().enumerate() {
			if id != AIR {
				f((y << 8) | zx, id);
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::traverse;
	use crate::column::Run;
	use crate::context::Context;
	use crate::finalize::Metrics;
	use crate::pool::Recycler;
	use crate::section::Kind;

	fn check_metrics(built: &super::Built) {
		let occupancy = built.occupancy.as_ref().unwrap();
		let metrics = Metrics::from_occupancy(occupancy);

		assert_eq!(built.non_air, metrics.non_air);
		assert_eq!(built.exposure, metrics.exposure());
		assert_eq!(built.bounds, metrics.bounds);
	}

	#[test]
	fn test_terrain_multi_packed() {
		let ctx = Context::default();
		let mut scratch = ctx.pools().scratch.create();

		for zx in 0..=255u8 {
			let height = 3 + (zx % 7);
			scratch.push_run(zx, Run::new(0, height, 1), &ctx.pools().escalated);
			scratch.push_run(zx, Run::new(height + 1, height + 2, 2 + (zx % 3) as u16), &ctx.pools().escalated);
		}

		let built = traverse(&scratch, &ctx);

		assert_eq!(built.representation.kind(), Kind::MultiPacked);
		assert_eq!(built.representation.palette().unwrap().len(), 5);
		check_metrics(&built);

		for zx in 0..=255u8 {
			let height = 3 + (zx % 7) as usize;

			assert_eq!(built.representation.get(zx as usize), 1);
			assert_eq!(built.representation.get(((height + 1) << 8) | zx as usize), 2 + (zx % 3) as u16);
			assert_eq!(built.representation.get(((height + 3) << 8) | zx as usize), 0);
		}
	}

	#[test]
	fn test_single_id_packed() {
		let ctx = Context::default();
		let mut scratch = ctx.pools().scratch.create();

		for zx in 0..=255u8 {
			scratch.push_run(zx, Run::new(0, zx % 16, 4), &ctx.pools().escalated);
		}

		let built = traverse(&scratch, &ctx);

		assert_eq!(built.representation.kind(), Kind::Packed);
		check_metrics(&built);
		assert_eq!(built.representation.get((15 << 8) | 15), 4);
		assert_eq!(built.representation.get((15 << 8) | 14), 0);
	}

	#[test]
	fn test_sparse_mask_threshold() {
		let ctx = Context::default();
		let mut scratch = ctx.pools().scratch.create();

		for zx in 0..8u8 {
			scratch.push_run(zx, Run::new(0, 3, 1 + zx as u16), &ctx.pools().escalated);
		}

		let built = traverse(&scratch, &ctx);
		assert_eq!(built.representation.kind(), Kind::Sparse);
		assert!(built.occupancy.is_none());
		assert_eq!(built.non_air, 32);

		scratch.push_run(8, Run::new(0, 0, 1), &ctx.pools().escalated);

		let built = traverse(&scratch, &ctx);
		assert_eq!(built.representation.kind(), Kind::Sparse);
		check_metrics(&built);

		let (indices, _) = built.representation.sparse().unwrap();
		assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
	}

	#[test]
	fn test_dense_when_palette_large() {
		let ctx = Context::default();
		let mut scratch = ctx.pools().scratch.create();

		for zx in 0..=255u8 {
			scratch.push_run(zx, Run::new(0, 7, 1 + zx as u16), &ctx.pools().escalated);
		}

		let built = traverse(&scratch, &ctx);

		assert!(scratch.distinct_overflowed());
		assert_eq!(built.representation.kind(), Kind::DenseExpanded);
		check_metrics(&built);
		assert_eq!(built.representation.get((7 << 8) | 200), 201);
	}
}
