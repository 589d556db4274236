use crate::context::Context;
use crate::finalize::{internal_exposure, Adjacency, Built};
use crate::mask::{self, FaceMasks};
use crate::packed::PackedWords;
use crate::pool::Recycler;
use crate::position::COLUMNS;
use crate::scratch::BuildScratch;
use crate::section::{Bounds, Representation};

/// Handles the case where every solid column is one run spanning Y 0..=15, all with the same
/// id. Counts come from 16 row masks of filled columns (bit `x` of `rows[z]`) without visiting
/// voxels. Returns `None` if the columns do not have that shape.
pub(crate) fn single_id(scratch: &BuildScratch, ctx: &Context) -> Option<Built> {
	let mut id = None;
	let mut rows = [0u16; 16];

	for (zx, column) in scratch.columns().iter().enumerate() {
		if column.is_empty() {
			continue;
		}

		let run_id = column.full_run()?;

		match id {
			Some(existing) if existing != run_id => return None,
			_ => id = Some(run_id)
		}

		rows[zx >> 4] |= 1 << (zx & 15);
	}

	let id = id?;
	let filled: u32 = rows.iter().map(|row| row.count_ones()).sum();

	if filled as usize == COLUMNS {
		return Some(Built::uniform(id));
	}

	let mut adjacency = Adjacency { x: 0, y: 15 * filled, z: 0 };
	let mut bounds = None;

	for z in 0..16 {
		let row = rows[z];

		if row == 0 {
			continue;
		}

		adjacency.x += 16 * (row & (row >> 1)).count_ones();

		if z < 15 {
			adjacency.z += 16 * (row & rows[z + 1]).count_ones();
		}

		let (min_x, max_x) = (row.trailing_zeros() as u8, 15 - row.leading_zeros() as u8);
		Bounds::include(&mut bounds, Bounds { min_x, max_x, min_y: 0, max_y: 15, min_z: z as u8, max_z: z as u8 });
	}

	let mut columns = [0u16; COLUMNS];

	for (zx, column) in columns.iter_mut().enumerate() {
		if (rows[zx >> 4] >> (zx & 15)) & 1 == 1 {
			*column = 0xFFFF;
		}
	}

	let mut occupancy = ctx.pools().occupancy.create();
	let mut faces = FaceMasks::default();
	mask::build_from_columns(&columns, &mut occupancy, &mut faces);

	let non_air = 16 * filled;

	Some(Built {
		representation: Representation::Packed { id, words: PackedWords::from_occupancy(&occupancy) },
		non_air,
		exposure: internal_exposure(non_air, adjacency),
		bounds,
		occupancy: Some(occupancy),
		faces: Some(faces)
	})
}

#[cfg(test)]
mod test {
	use super::single_id;
	use crate::context::Context;
	use crate::finalize::Metrics;
	use crate::pool::Recycler;
	use crate::section::{Bounds, Kind};

	#[test]
	fn test_matches_row_metrics() {
		let ctx = Context::default();
		let mut scratch = ctx.pools().scratch.create();

		// A plus shape of pillars plus a separate one.
		for &(x, z) in &[(5u8, 5u8), (4, 5), (6, 5), (5, 4), (5, 6), (12, 1)] {
			let zx = (z << 4) | x;
			scratch.push_run(zx, crate::column::Run::new(0, 15, 8), &ctx.pools().escalated);
		}

		let built = single_id(&scratch, &ctx).unwrap();
		let occupancy = built.occupancy.as_ref().unwrap();
		let metrics = Metrics::from_occupancy(occupancy);

		assert_eq!(built.representation.kind(), Kind::Packed);
		assert_eq!(built.non_air, 6 * 16);
		assert_eq!(built.non_air, metrics.non_air);
		assert_eq!(built.exposure, metrics.exposure());
		assert_eq!(built.bounds, metrics.bounds);
		assert_eq!(built.bounds, Some(Bounds { min_x: 4, max_x: 12, min_y: 0, max_y: 15, min_z: 1, max_z: 6 }));
		assert_eq!(built.representation.get(5 << 4 | 5), 8);
	}

	#[test]
	fn test_rejects_mixed() {
		let ctx = Context::default();
		let mut scratch = ctx.pools().scratch.create();

		scratch.push_run(0, crate::column::Run::new(0, 15, 1), &ctx.pools().escalated);
		scratch.push_run(1, crate::column::Run::new(0, 15, 2), &ctx.pools().escalated);
		assert!(single_id(&scratch, &ctx).is_none());

		let mut scratch = ctx.pools().scratch.create();
		scratch.push_run(0, crate::column::Run::new(0, 14, 1), &ctx.pools().escalated);
		assert!(single_id(&scratch, &ctx).is_none());
	}
}
