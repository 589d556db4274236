use crate::{BlockId, AIR};
use bit_vec::BitVec;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

/// An ordered list of block ids backing a packed representation. Index 0 is always air.
///
/// The reverse lookup maps an id to one of the indices holding it. After in-place id
/// replacement several indices may hold the same id; the lookup then names one of them
/// until `rebuild_lookup` is called.
#[derive(Debug, Clone)]
pub struct Palette {
	entries: Vec<BlockId>,
	reverse: FxHashMap<BlockId, u32>
}

impl Palette {
	pub fn new() -> Self {
		let mut reverse = FxHashMap::default();
		reverse.insert(AIR, 0);

		Palette { entries: vec![AIR], reverse }
	}

	/// Builds a palette from air followed by `ids`, skipping air and repeats.
	pub fn from_ids<I>(ids: I) -> Self where I: IntoIterator<Item=BlockId> {
		let mut palette = Palette::new();

		for id in ids {
			palette.acquire(id);
		}

		palette
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn entries(&self) -> &[BlockId] {
		&self.entries
	}

	/// Returns the id stored at `index`, or air for indices past the end.
	pub fn get(&self, index: u32) -> BlockId {
		self.entries.get(index as usize).cloned().unwrap_or(AIR)
	}

	pub fn index_of(&self, id: BlockId) -> Option<u32> {
		self.reverse.get(&id).cloned()
	}

	/// Returns the index of `id`, appending it if it is not present yet.
	pub fn acquire(&mut self, id: BlockId) -> u32 {
		match self.reverse.entry(id) {
			Entry::Occupied(occupied) => *occupied.get(),
			Entry::Vacant(vacant) => {
				let index = self.entries.len() as u32;

				self.entries.push(id);
				vacant.insert(index);

				index
			}
		}
	}

	/// Replaces every entry holding `from` with `to`. The lookup is left stale for `to`
	/// if it was already present; call `rebuild_lookup` before trusting it.
	/// Returns true if any entry changed.
	pub fn replace_id(&mut self, from: BlockId, to: BlockId) -> bool {
		if from == AIR || from == to {
			return false;
		}

		let mut first = None;

		for (index, entry) in self.entries.iter_mut().enumerate().skip(1) {
			if *entry == from {
				*entry = to;
				first = first.or(Some(index as u32));
			}
		}

		match first {
			Some(index) => {
				self.reverse.remove(&from);
				self.reverse.entry(to).or_insert(index);

				true
			},
			None => false
		}
	}

	/// Recomputes the reverse lookup from the entries. The first index holding an id wins.
	pub fn rebuild_lookup(&mut self) {
		self.reverse.clear();

		for (index, &id) in self.entries.iter().enumerate() {
			self.reverse.entry(id).or_insert(index as u32);
		}
	}

	/// Builds a palette containing only the entries marked in `used` (air is always kept),
	/// with duplicate ids folded together. Returns the new palette and a table translating
	/// old indices to new ones.
	pub fn compact(&self, used: &BitVec) -> (Palette, Vec<u32>) {
		let mut compacted = Palette::new();
		let mut table = vec![0u32; self.entries.len()];

		for (index, &id) in self.entries.iter().enumerate().skip(1) {
			if used.get(index).unwrap_or(false) && id != AIR {
				table[index] = compacted.acquire(id);
			}
		}

		(compacted, table)
	}
}

impl Default for Palette {
	fn default() -> Self {
		Palette::new()
	}
}
