use crate::position::LayerPosition;
use std::fmt::{Debug, Display, Formatter, Result};

/// A voxel position inside a 16x16x16 section, stored as a `(Y<<8) | (Z<<4) | X` index.
#[derive(Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct SectionPosition(u16);

impl SectionPosition {
	/// Creates a new SectionPosition from the X, Y, and Z components.
	/// ### Out of bounds behavior
	/// If the arguments are out of bounds, then they are truncated.
	pub fn new(x: u8, y: u8, z: u8) -> Self {
		SectionPosition (
			(((y&0xF) as u16) << 8) |
			(((z&0xF) as u16) << 4) |
			 ((x&0xF) as u16)
		)
	}

	/// Creates a new SectionPosition from the Y component and LayerPosition containing the X and Z components.
	/// Out of bounds is not possible with this function.
	pub fn from_layer(y: u8, layer: LayerPosition) -> Self {
		SectionPosition(
			(((y&0xF) as u16) << 8) | (layer.zx() as u16)
		)
	}

	/// Creates a new SectionPosition from a YZX index.
	/// ### Out of bounds behavior
	/// If the index is out of bounds, it is truncated.
	pub fn from_yzx(yzx: u16) -> Self {
		SectionPosition(yzx & 4095)
	}

	/// Iterates every position in YZX order.
	pub fn enumerate() -> impl Iterator<Item=SectionPosition> {
		(0..4096u16).map(SectionPosition)
	}

	/// Returns the X component.
	pub fn x(&self) -> u8 {
		 (self.0 & 0x00F) as u8
	}

	/// Returns the Z component.
	pub fn z(&self) -> u8 {
		((self.0 & 0x0F0) >> 4) as u8
	}

	/// Returns the Y component.
	pub fn y(&self) -> u8 {
		((self.0 & 0xF00) >> 8) as u8
	}

	/// Returns the Y and Z components, represented as `(Y<<4) | Z`.
	pub fn yz(&self) -> u8 {
		(self.0 >> 4) as u8
	}

	/// Returns the index represented as `(Z<<4) | X`.
	pub fn zx(&self) -> u8 {
		(self.0 & 255) as u8
	}

	/// Returns the Y and X components, represented as `(Y<<4) | X`.
	pub fn yx(&self) -> u8 {
		(self.y() << 4) | (self.x())
	}

	/// Returns the column this position lies in.
	pub fn layer(&self) -> LayerPosition {
		LayerPosition::from_zx(self.zx())
	}

	/// Returns the index represented as `(Y<<8) | (Z<<4) | X`.
	pub fn yzx(&self) -> u16 {
		self.0
	}
}

impl Display for SectionPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "({}, {}, {})", self.x(), self.y(), self.z())
	}
}

impl Debug for SectionPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "SectionPosition {{ x: {}, y: {}, z: {} }}", self.x(), self.y(), self.z())
	}
}
