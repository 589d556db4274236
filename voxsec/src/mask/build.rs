use crate::mask::{Face, FaceMasks, Mask, SectionMask};
use crate::position::{COLUMNS, VOLUME};
use crate::{BlockId, AIR};

/// Fills `occupancy` and `faces` from per-column solidity masks, indexed by column `zx`, bit `y`.
/// Both outputs must start cleared. Work is proportional to the number of solid voxels.
pub fn build_from_columns(columns: &[u16; COLUMNS], occupancy: &mut SectionMask, faces: &mut FaceMasks) {
	for (zx, &column) in columns.iter().enumerate() {
		if column == 0 {
			continue;
		}

		let (x, z) = ((zx & 15) as u8, (zx >> 4) as u8);

		// Only the bottom and top cells can reach the Y planes.
		if column & 1 != 0 {
			faces.get_mut(Face::NegY).set_true(zx as u8);
		}

		if column & 0x8000 != 0 {
			faces.get_mut(Face::PosY).set_true(zx as u8);
		}

		let mut remaining = column;

		while remaining != 0 {
			let y = remaining.trailing_zeros() as u8;
			remaining &= remaining - 1;

			occupancy.or_row(y, z, 1 << x);

			if x == 0 {
				faces.get_mut(Face::NegX).set_true((y << 4) | z);
			} else if x == 15 {
				faces.get_mut(Face::PosX).set_true((y << 4) | z);
			}

			if z == 0 {
				faces.get_mut(Face::NegZ).set_true((y << 4) | x);
			} else if z == 15 {
				faces.get_mut(Face::PosZ).set_true((y << 4) | x);
			}
		}
	}
}

/// Fills `occupancy` and `faces` from an explicit id array. Both outputs must start cleared.
/// Returns the number of solid voxels.
pub fn build_from_dense(ids: &[BlockId; VOLUME], occupancy: &mut SectionMask, faces: &mut FaceMasks) -> u32 {
	let mut non_air = 0;

	for (row_index, row_ids) in ids.chunks_exact(16).enumerate() {
		let (y, z) = ((row_index >> 4) as u8, (row_index & 15) as u8);

		let mut row = 0u16;

		for (x, &id) in row_ids.iter().enumerate() {
			row |= ((id != AIR) as u16) << x;
		}

		if row == 0 {
			continue;
		}

		non_air += row.count_ones();
		occupancy.or_row(y, z, row);
		faces_from_row(faces, y, z, row);
	}

	non_air
}

/// Derives all six planes from an occupancy set.
pub fn faces_from_occupancy(occupancy: &SectionMask) -> FaceMasks {
	let mut faces = FaceMasks::default();

	for y in 0..16 {
		for z in 0..16 {
			let row = occupancy.row(y, z);

			if row != 0 {
				faces_from_row(&mut faces, y, z, row);
			}
		}
	}

	faces
}

fn faces_from_row(faces: &mut FaceMasks, y: u8, z: u8, row: u16) {
	if row & 1 != 0 {
		faces.get_mut(Face::NegX).set_true((y << 4) | z);
	}

	if row & 0x8000 != 0 {
		faces.get_mut(Face::PosX).set_true((y << 4) | z);
	}

	if z == 0 {
		faces.get_mut(Face::NegZ).or_row(y, row);
	} else if z == 15 {
		faces.get_mut(Face::PosZ).or_row(y, row);
	}

	if y == 0 {
		faces.get_mut(Face::NegY).or_row(z, row);
	} else if y == 15 {
		faces.get_mut(Face::PosY).or_row(z, row);
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::position::SectionPosition;

	fn id_at(position: SectionPosition) -> BlockId {
		if ((position.yzx() as u64) * 7919) % 11 < 4 { 1 + (position.yzx() % 3) } else { AIR }
	}

	fn expected_faces(solid: impl Fn(SectionPosition) -> bool) -> FaceMasks {
		let mut faces = FaceMasks::default();

		for position in SectionPosition::enumerate() {
			if solid(position) {
				faces.update(position, true);
			}
		}

		faces
	}

	#[test]
	fn test_dense_matches_per_voxel() {
		let mut ids = Box::new([AIR; VOLUME]);

		for position in SectionPosition::enumerate() {
			ids[position.yzx() as usize] = id_at(position);
		}

		let mut occupancy = SectionMask::default();
		let mut faces = FaceMasks::default();
		let non_air = build_from_dense(&ids, &mut occupancy, &mut faces);

		for position in SectionPosition::enumerate() {
			assert_eq!(occupancy[position], id_at(position) != AIR);
		}

		assert_eq!(non_air, occupancy.count_ones());
		assert_eq!(faces, expected_faces(|position| id_at(position) != AIR));
		assert_eq!(faces_from_occupancy(&occupancy), faces);
	}

	#[test]
	fn test_columns_match_dense() {
		let mut columns = [0u16; COLUMNS];

		for (zx, column) in columns.iter_mut().enumerate() {
			*column = ((zx as u32 * 40503) & 0xFFFF) as u16;
		}

		let mut occupancy = SectionMask::default();
		let mut faces = FaceMasks::default();
		build_from_columns(&columns, &mut occupancy, &mut faces);

		let solid = |position: SectionPosition| (columns[position.zx() as usize] >> position.y()) & 1 == 1;

		for position in SectionPosition::enumerate() {
			assert_eq!(occupancy[position], solid(position), "{:?}", position);
		}

		assert_eq!(faces, expected_faces(solid));
	}
}
