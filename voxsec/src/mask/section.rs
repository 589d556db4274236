use crate::mask::{Mask, FALSE_REF, TRUE_REF};
use crate::position::SectionPosition;
use std::fmt::{self, Debug};
use std::ops::Index;

/// One bit per voxel of a section, indexed by `SectionPosition::yzx`.
#[derive(Clone, PartialEq, Eq)]
pub struct SectionMask(Box<[u64; 64]>);

impl SectionMask {
	pub fn blocks(&self) -> &[u64; 64] {
		&self.0
	}

	pub fn blocks_mut(&mut self) -> &mut [u64; 64] {
		&mut self.0
	}

	/// Returns the X row at (y, z) as a 16 bit mask, bit `x` set if that voxel is set.
	#[inline]
	pub fn row(&self, y: u8, z: u8) -> u16 {
		let row = ((y as usize & 15) << 4) | (z as usize & 15);

		(self.0[row >> 2] >> ((row & 3) * 16)) as u16
	}

	/// Sets the bits of `bits` in the X row at (y, z).
	#[inline]
	pub fn or_row(&mut self, y: u8, z: u8, bits: u16) {
		let row = ((y as usize & 15) << 4) | (z as usize & 15);

		self.0[row >> 2] |= (bits as u64) << ((row & 3) * 16);
	}

	pub fn fill(&mut self, value: bool) {
		let term = if value { u64::max_value() } else { 0 };

		for block in self.0.iter_mut() {
			*block = term;
		}
	}

	pub fn is_empty(&self) -> bool {
		self.0.iter().all(|&block| block == 0)
	}

	pub fn is_filled(&self) -> bool {
		self.0.iter().all(|&block| block == u64::max_value())
	}
}

impl Mask<SectionPosition> for SectionMask {
	fn get(&self, position: SectionPosition) -> bool {
		self[position]
	}

	fn set_true(&mut self, position: SectionPosition) {
		let index = position.yzx() as usize;

		self.0[index / 64] |= 1 << (index % 64);
	}

	fn set_false(&mut self, position: SectionPosition) {
		let index = position.yzx() as usize;

		self.0[index / 64] &= !(1 << (index % 64));
	}

	fn count_ones(&self) -> u32 {
		self.0.iter().fold(0, |state, value| state + value.count_ones())
	}

	fn count_zeros(&self) -> u32 {
		self.0.iter().fold(0, |state, value| state + value.count_zeros())
	}
}

impl Index<SectionPosition> for SectionMask {
	type Output = bool;

	fn index(&self, position: SectionPosition) -> &bool {
		let index = position.yzx() as usize;

		if (self.0[index / 64] >> (index % 64))&1 == 1 { TRUE_REF } else { FALSE_REF }
	}
}

impl Default for SectionMask {
	fn default() -> Self {
		SectionMask(Box::new([0; 64]))
	}
}

impl Debug for SectionMask {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "SectionMask {{ ones: {} }}", self.count_ones())
	}
}
