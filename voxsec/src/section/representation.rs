use crate::packed::PackedWords;
use crate::palette::Palette;
use crate::pool::{DenseIds, Recycler, SectionPools};
use crate::position::VOLUME;
use crate::{BlockId, AIR};
use std::fmt::{self, Debug, Display};

/// Stable numbering of the representation kinds, as written by serializers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
	Empty = 0,
	Uniform = 1,
	Sparse = 2,
	Packed = 3,
	MultiPacked = 4,
	DenseExpanded = 5
}

impl Kind {
	pub fn from_u8(value: u8) -> Option<Kind> {
		Some(match value {
			0 => Kind::Empty,
			1 => Kind::Uniform,
			2 => Kind::Sparse,
			3 => Kind::Packed,
			4 => Kind::MultiPacked,
			5 => Kind::DenseExpanded,
			_ => return None
		})
	}
}

impl Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		Debug::fmt(self, f)
	}
}

/// The permanent storage of a finalized section.
#[derive(Debug, Clone)]
pub enum Representation {
	/// Every voxel is air.
	Empty,
	/// Every voxel holds the same solid id.
	Uniform(BlockId),
	/// Solid voxels listed explicitly. `indices` is strictly ascending and parallel to `ids`.
	Sparse { indices: Vec<u16>, ids: Vec<BlockId> },
	/// One solid id at 1 bit per voxel; index 1 is `id`.
	Packed { id: BlockId, words: PackedWords },
	/// Palette indices at the width the palette needs.
	MultiPacked { palette: Palette, words: PackedWords },
	/// One explicit id per voxel.
	DenseExpanded(DenseIds)
}

impl Representation {
	pub fn kind(&self) -> Kind {
		match *self {
			Representation::Empty => Kind::Empty,
			Representation::Uniform(_) => Kind::Uniform,
			Representation::Sparse { .. } => Kind::Sparse,
			Representation::Packed { .. } => Kind::Packed,
			Representation::MultiPacked { .. } => Kind::MultiPacked,
			Representation::DenseExpanded(_) => Kind::DenseExpanded
		}
	}

	/// Returns the id at the linear `yzx` index.
	pub fn get(&self, index: usize) -> BlockId {
		match *self {
			Representation::Empty => AIR,
			Representation::Uniform(id) => id,
			Representation::Sparse { ref indices, ref ids } => {
				match indices.binary_search(&(index as u16)) {
					Ok(position) => ids[position],
					Err(_) => AIR
				}
			},
			Representation::Packed { id, ref words } => if words.get(index) != 0 { id } else { AIR },
			Representation::MultiPacked { ref palette, ref words } => palette.get(words.get(index)),
			Representation::DenseExpanded(ref ids) => ids[index]
		}
	}

	/// Writes every voxel's id into `out`, indexed by `yzx`.
	pub fn decode_into(&self, out: &mut [BlockId; VOLUME]) {
		match *self {
			Representation::Empty => *out = [AIR; VOLUME],
			Representation::Uniform(id) => *out = [id; VOLUME],
			Representation::Sparse { ref indices, ref ids } => {
				*out = [AIR; VOLUME];

				for (&index, &id) in indices.iter().zip(ids.iter()) {
					out[index as usize] = id;
				}
			},
			Representation::DenseExpanded(ref ids) => out.copy_from_slice(&ids[..]),
			_ => {
				for (index, slot) in out.iter_mut().enumerate() {
					*slot = self.get(index);
				}
			}
		}
	}

	/// The sparse index and id arrays, if this is a sparse representation.
	pub fn sparse(&self) -> Option<(&[u16], &[BlockId])> {
		match *self {
			Representation::Sparse { ref indices, ref ids } => Some((&indices[..], &ids[..])),
			_ => None
		}
	}

	/// The packed words of a `Packed` or `MultiPacked` representation.
	pub fn words(&self) -> Option<&PackedWords> {
		match *self {
			Representation::Packed { ref words, .. } | Representation::MultiPacked { ref words, .. } => Some(words),
			_ => None
		}
	}

	pub fn palette(&self) -> Option<&Palette> {
		match *self {
			Representation::MultiPacked { ref palette, .. } => Some(palette),
			_ => None
		}
	}

	pub fn dense(&self) -> Option<&[BlockId; VOLUME]> {
		match *self {
			Representation::DenseExpanded(ref ids) => Some(&**ids),
			_ => None
		}
	}

	/// Hands any pooled payload back. The representation is consumed.
	pub(crate) fn release(self, pools: &SectionPools) {
		if let Representation::DenseExpanded(ids) = self {
			pools.dense.destroy(ids);
		}
	}
}

impl Default for Representation {
	fn default() -> Self {
		Representation::Empty
	}
}
