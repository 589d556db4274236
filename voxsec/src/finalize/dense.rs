use crate::context::Context;
use crate::finalize::{internal_exposure, Adjacency, Built};
use crate::mask::{self, FaceMasks};
use crate::pool::Recycler;
use crate::position::VOLUME;
use crate::scratch::BuildScratch;
use crate::section::{Bounds, Representation};
use crate::AIR;

/// Finalize used once any column escalated. Escalated cells have no run structure to count
/// from, so every column is decoded into a full id array and adjacency is found by comparing
/// each solid voxel with its +X, +Y, and +Z neighbours.
pub(crate) fn expand(scratch: &BuildScratch, ctx: &Context) -> Built {
	let pools = ctx.pools();
	let mut ids = pools.dense.create();

	for (zx, column) in scratch.columns().iter().enumerate() {
		if column.is_empty() {
			continue;
		}

		for (y, &id) in column.cells(scratch.arena()).iter().enumerate() {
			ids[(y << 8) | zx] = id;
		}
	}

	let mut occupancy = pools.occupancy.create();
	let mut faces = FaceMasks::default();
	let non_air = mask::build_from_dense(&ids, &mut occupancy, &mut faces);

	if non_air == 0 {
		pools.dense.destroy(ids);
		pools.occupancy.destroy(occupancy);

		return Built::empty();
	}

	let mut adjacency = Adjacency::default();
	let mut bounds = None;

	for index in 0..VOLUME {
		if ids[index] == AIR {
			continue;
		}

		let (x, z, y) = (index & 15, (index >> 4) & 15, index >> 8);

		if x < 15 && ids[index + 1] != AIR {
			adjacency.x += 1;
		}

		if z < 15 && ids[index + 16] != AIR {
			adjacency.z += 1;
		}

		if y < 15 && ids[index + 256] != AIR {
			adjacency.y += 1;
		}

		Bounds::include(&mut bounds, Bounds::point(x as u8, y as u8, z as u8));
	}

	Built {
		representation: Representation::DenseExpanded(ids),
		non_air,
		exposure: internal_exposure(non_air, adjacency),
		bounds,
		occupancy: Some(occupancy),
		faces: Some(faces)
	}
}
