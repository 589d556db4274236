//! Bit masks over a section and over its six boundary planes.
//!
//! `SectionMask` holds one bit per voxel in YZX order. Each 16 bit slice of it is one
//! X row at a fixed (y, z), which lets adjacency and face derivation work a row at a time.
//! `FacePlane` holds one bit per cell of a 16x16 boundary plane.

mod section;
mod plane;
mod faces;
mod build;

pub use self::section::SectionMask;
pub use self::plane::FacePlane;
pub use self::faces::{Face, FaceMasks};
pub use self::build::{build_from_columns, build_from_dense, faces_from_occupancy};

// `Index` must hand out a reference, and single bits have no address to borrow.
const FALSE_REF: &bool = &false;
const TRUE_REF:  &bool = &true;

pub trait Mask<P> {
	fn get(&self, index: P) -> bool;
	fn set_true(&mut self, index: P);
	fn set_false(&mut self, index: P);

	fn set(&mut self, index: P, value: bool) {
		if value {
			self.set_true(index)
		} else {
			self.set_false(index)
		}
	}

	fn count_ones(&self) -> u32;
	fn count_zeros(&self) -> u32;
}
