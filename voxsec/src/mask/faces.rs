use crate::mask::{FacePlane, Mask};
use crate::position::SectionPosition;

/// One of the six boundary planes of a section.
///
/// Plane cells are addressed as follows:
///  * `NegX` / `PosX`: `(Y<<4) | Z`
///  * `NegY` / `PosY`: `(Z<<4) | X`
///  * `NegZ` / `PosZ`: `(Y<<4) | X`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Face {
	NegX = 0,
	PosX = 1,
	NegY = 2,
	PosY = 3,
	NegZ = 4,
	PosZ = 5
}

impl Face {
	pub const ALL: [Face; 6] = [Face::NegX, Face::PosX, Face::NegY, Face::PosY, Face::NegZ, Face::PosZ];

	pub fn index(self) -> usize {
		self as usize
	}

	/// Returns true if the position lies on this boundary plane.
	pub fn contains(self, position: SectionPosition) -> bool {
		match self {
			Face::NegX => position.x() == 0,
			Face::PosX => position.x() == 15,
			Face::NegY => position.y() == 0,
			Face::PosY => position.y() == 15,
			Face::NegZ => position.z() == 0,
			Face::PosZ => position.z() == 15
		}
	}

	/// Returns the plane cell index of the position, ignoring whether it lies on the plane.
	pub fn plane_index(self, position: SectionPosition) -> u8 {
		match self {
			Face::NegX | Face::PosX => position.yz(),
			Face::NegY | Face::PosY => position.zx(),
			Face::NegZ | Face::PosZ => position.yx()
		}
	}
}

/// The six boundary planes of a section. A cell is set iff the boundary voxel behind it is solid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FaceMasks {
	planes: [FacePlane; 6]
}

impl FaceMasks {
	pub fn filled() -> Self {
		let mut full = FacePlane::default();
		full.fill(true);

		FaceMasks { planes: [full; 6] }
	}

	pub fn get(&self, face: Face) -> &FacePlane {
		&self.planes[face.index()]
	}

	pub fn get_mut(&mut self, face: Face) -> &mut FacePlane {
		&mut self.planes[face.index()]
	}

	/// Records the solidity of a single voxel on every plane it lies on.
	pub fn update(&mut self, position: SectionPosition, solid: bool) {
		for &face in Face::ALL.iter() {
			if face.contains(position) {
				self.planes[face.index()].set(face.plane_index(position), solid);
			}
		}
	}

	/// True if every boundary cell on every face is solid.
	pub fn is_sealed(&self) -> bool {
		self.planes.iter().all(|plane| plane.is_filled(true))
	}
}
