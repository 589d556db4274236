//! Variable width bit packing of palette indices over a section.
//!
//! Index `i` occupies bits `i*bits .. (i+1)*bits` of a flat `u64` array. A value may straddle
//! two words; the low part lives at the top of the first word and the remainder at the bottom
//! of the next one.

mod words;

pub use self::words::PackedWords;

use crate::position::VOLUME;

/// Largest supported width. Block ids are 16 bit, so no palette can need more.
pub const MAX_BITS: u8 = 16;

struct Indices {
	start: usize,
	end: usize
}

fn indices(index: usize, bits: u8) -> (Indices, u8) {
	let bits = bits as usize;

	let bit_index = index * bits;
	// Calculate the indices to the u64 array.
	let start = bit_index / 64;
	let end = ((bit_index + bits) - 1) / 64;
	let sub_index = (bit_index % 64) as u8;

	(Indices { start, end }, sub_index)
}

fn bitmask(bits: u8) -> u64 {
	(1u64 << bits) - 1
}

/// Number of words needed to store every voxel of a section at the given width.
pub fn words_for(bits: u8) -> usize {
	(VOLUME * bits as usize + 63) / 64
}

/// Width needed to address a palette of `entries` entries, with a minimum of 1.
pub fn bits_for(entries: usize) -> u8 {
	if entries <= 2 {
		1
	} else {
		(usize::BITS - (entries - 1).leading_zeros()) as u8
	}
}

/// Reads the packed value for `index`.
pub fn read(words: &[u64], bits: u8, index: usize) -> u32 {
	if bits == 0 {
		return 0;
	}

	let (indices, sub_index) = indices(index, bits);

	let mut raw = words[indices.start] >> sub_index;

	if indices.start != indices.end {
		raw |= words[indices.end] << (64 - sub_index);
	}

	(raw & bitmask(bits)) as u32
}

/// Writes the packed value for `index`. The value must fit in `bits`; callers grow the width
/// beforehand through the palette acquisition path.
pub fn write(words: &mut [u64], bits: u8, index: usize, value: u32) {
	if bits == 0 {
		return;
	}

	debug_assert!((value as u64) <= bitmask(bits), "packed value {} does not fit in {} bits", value, bits);

	let bitmask = bitmask(bits);
	let value = value as u64 & bitmask;

	let (indices, sub_index) = indices(index, bits);

	words[indices.start] = words[indices.start] & !(bitmask << sub_index) | value << sub_index;

	if indices.start != indices.end {
		let end_sub_index = 64 - sub_index;
		words[indices.end] = words[indices.end] >> end_sub_index << end_sub_index | value >> end_sub_index;
	}
}

/// Re-encodes every voxel from `old_bits` to `new_bits` in one linear pass.
/// Values are preserved; only the encoding width changes.
pub fn reencode(words: &[u64], old_bits: u8, new_bits: u8) -> Vec<u64> {
	let mut grown = vec![0; words_for(new_bits)];

	if old_bits == 1 {
		// Every set bit is index 1; skip the zero words entirely.
		for (word_index, &word) in words.iter().enumerate() {
			let mut remaining = word;

			while remaining != 0 {
				let bit = remaining.trailing_zeros() as usize;
				remaining &= remaining - 1;

				write(&mut grown, new_bits, word_index * 64 + bit, 1);
			}
		}

		return grown;
	}

	for index in 0..VOLUME {
		let value = read(words, old_bits, index);

		if value != 0 {
			write(&mut grown, new_bits, index, value);
		}
	}

	grown
}
