use crate::mask::SectionMask;
use crate::packed::{self, MAX_BITS};
use crate::position::VOLUME;

/// Packed palette indices for a whole section together with their width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedWords {
	words: Vec<u64>,
	bits: u8
}

impl PackedWords {
	pub fn new(bits: u8) -> Self {
		let bits = bits.max(1).min(MAX_BITS);

		PackedWords {
			words: vec![0; packed::words_for(bits)],
			bits
		}
	}

	/// Reinterprets an occupancy set as 1 bit indices, solid voxels holding index 1.
	/// Both layouts place voxel `i` at bit `i`.
	pub fn from_occupancy(occupancy: &SectionMask) -> Self {
		PackedWords { words: occupancy.blocks().to_vec(), bits: 1 }
	}

	pub fn bits(&self) -> u8 {
		self.bits
	}

	pub fn raw(&self) -> &[u64] {
		&self.words
	}

	pub fn get(&self, index: usize) -> u32 {
		packed::read(&self.words, self.bits, index)
	}

	pub fn set(&mut self, index: usize, value: u32) {
		packed::write(&mut self.words, self.bits, index, value)
	}

	/// Sets every voxel to `value`.
	pub fn fill(&mut self, value: u32) {
		if value == 0 {
			for word in self.words.iter_mut() {
				*word = 0;
			}

			return;
		}

		for index in 0..VOLUME {
			self.set(index, value);
		}
	}

	/// Makes sure `value` can be stored, widening and re-encoding if it cannot.
	/// Returns true if the width changed.
	pub fn ensure_fits(&mut self, value: u32) -> bool {
		let needed = packed::bits_for(value as usize + 1);

		if needed <= self.bits {
			return false;
		}

		self.grow_bits(needed);
		true
	}

	/// Widens the storage to `new_bits`, re-encoding every voxel. Narrower targets are ignored.
	pub fn grow_bits(&mut self, new_bits: u8) {
		let new_bits = new_bits.min(MAX_BITS);

		if new_bits <= self.bits {
			return;
		}

		log::trace!("growing packed indices from {} to {} bits", self.bits, new_bits);

		self.words = packed::reencode(&self.words, self.bits, new_bits);
		self.bits = new_bits;
	}

	/// Rewrites every index through `table` at `new_bits`. Every translated value must fit.
	pub fn remap(&self, table: &[u32], new_bits: u8) -> PackedWords {
		let mut remapped = PackedWords::new(new_bits);

		for index in 0..VOLUME {
			let translated = table[self.get(index) as usize];

			if translated != 0 {
				remapped.set(index, translated);
			}
		}

		remapped
	}

	/// Counts how many voxels hold each index. Indices beyond `entries` are ignored.
	pub fn counts(&self, entries: usize) -> Vec<u32> {
		let mut counts = vec![0u32; entries];

		for index in 0..VOLUME {
			if let Some(count) = counts.get_mut(self.get(index) as usize) {
				*count += 1;
			}
		}

		counts
	}
}

#[cfg(test)]
mod test {
	use super::PackedWords;
	use crate::mask::{Mask, SectionMask};
	use crate::position::{SectionPosition, VOLUME};

	#[test]
	fn test_ensure_fits_preserves() {
		let mut words = PackedWords::new(1);

		for index in 0..VOLUME {
			words.set(index, (index % 2) as u32);
		}

		assert!(!words.ensure_fits(1));
		assert!(words.ensure_fits(2));
		assert_eq!(words.bits(), 2);
		assert!(words.ensure_fits(300));
		assert_eq!(words.bits(), 9);

		for index in 0..VOLUME {
			assert_eq!(words.get(index), (index % 2) as u32);
		}
	}

	#[test]
	fn test_remap() {
		let mut words = PackedWords::new(3);

		for index in 0..VOLUME {
			words.set(index, (index % 5) as u32);
		}

		// Drop index 2, shift 3 and 4 down.
		let remapped = words.remap(&[0, 1, 0, 2, 3], 2);

		for index in 0..VOLUME {
			let expected = [0, 1, 0, 2, 3][index % 5];
			assert_eq!(remapped.get(index), expected);
		}
	}

	#[test]
	fn test_fill_and_counts() {
		let mut words = PackedWords::new(2);
		words.fill(3);

		assert_eq!(words.counts(4), vec![0, 0, 0, VOLUME as u32]);

		words.fill(0);
		assert_eq!(words.counts(4), vec![VOLUME as u32, 0, 0, 0]);
	}

	#[test]
	fn test_from_occupancy() {
		let mut occupancy = SectionMask::default();
		occupancy.set_true(SectionPosition::new(3, 7, 11));

		let words = PackedWords::from_occupancy(&occupancy);

		assert_eq!(words.bits(), 1);
		assert_eq!(words.get(SectionPosition::new(3, 7, 11).yzx() as usize), 1);
		assert_eq!(words.counts(2), vec![VOLUME as u32 - 1, 1]);
	}
}
