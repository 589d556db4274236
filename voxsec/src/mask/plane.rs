use crate::mask::{Mask, FALSE_REF, TRUE_REF};
use std::ops::Index;

/// One bit per cell of a 16x16 plane, indexed by an 8 bit `(A<<4) | B` index whose meaning
/// depends on the face the plane belongs to.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct FacePlane([u64; 4]);

impl FacePlane {
	pub fn blocks(&self) -> &[u64; 4] {
		&self.0
	}

	pub fn blocks_mut(&mut self) -> &mut [u64; 4] {
		&mut self.0
	}

	/// Returns the 16 bit row `a`, bit `b` set for cell `(a<<4) | b`.
	pub fn row(&self, a: u8) -> u16 {
		let a = a as usize & 15;

		(self.0[a >> 2] >> ((a & 3) * 16)) as u16
	}

	pub fn or_row(&mut self, a: u8, bits: u16) {
		let a = a as usize & 15;

		self.0[a >> 2] |= (bits as u64) << ((a & 3) * 16);
	}

	pub fn is_filled(&self, value: bool) -> bool {
		let term = if value { u64::max_value() } else { 0 };

		self.0 == [term, term, term, term]
	}

	pub fn fill(&mut self, value: bool) {
		let term = if value { u64::max_value() } else { 0 };

		self.0 = [term, term, term, term];
	}
}

impl Mask<u8> for FacePlane {
	fn get(&self, index: u8) -> bool {
		self[index]
	}

	fn set_true(&mut self, index: u8) {
		let index = index as usize;

		self.0[index / 64] |= 1 << (index % 64);
	}

	fn set_false(&mut self, index: u8) {
		let index = index as usize;

		self.0[index / 64] &= !(1 << (index % 64));
	}

	fn count_ones(&self) -> u32 {
		self.0[0].count_ones() + self.0[1].count_ones() + self.0[2].count_ones() + self.0[3].count_ones()
	}

	fn count_zeros(&self) -> u32 {
		self.0[0].count_zeros() + self.0[1].count_zeros() + self.0[2].count_zeros() + self.0[3].count_zeros()
	}
}

impl Index<u8> for FacePlane {
	type Output = bool;

	fn index(&self, index: u8) -> &bool {
		let index = index as usize;

		if (self.0[index / 64] >> (index % 64))&1 == 1 { TRUE_REF } else { FALSE_REF }
	}
}
