//! Transient build state of one section: 256 columns plus cross-column bookkeeping.

use crate::column::{Column, ColumnCells, EscalationArena, Outcome, Run};
use crate::pool::{AllocCache, SectionPools};
use crate::position::COLUMNS;
use crate::{BlockId, AIR};

/// Number of distinct ids tracked with column membership before the table gives up.
pub const DISTINCT_CAPACITY: usize = 8;

/// One bit per column of a section, indexed by `LayerPosition::zx`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ColumnSet([u64; 4]);

impl ColumnSet {
	pub fn new() -> Self {
		ColumnSet([0; 4])
	}

	pub fn all() -> Self {
		ColumnSet([u64::max_value(); 4])
	}

	pub fn insert(&mut self, zx: u8) {
		self.0[zx as usize >> 6] |= 1 << (zx & 63);
	}

	pub fn contains(&self, zx: u8) -> bool {
		(self.0[zx as usize >> 6] >> (zx & 63)) & 1 == 1
	}

	pub fn count(&self) -> u32 {
		self.0.iter().map(|word| word.count_ones()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.0.iter().all(|&word| word == 0)
	}

	/// Iterates the set columns in ascending `zx` order.
	pub fn iter(&self) -> ColumnSetIter {
		ColumnSetIter { words: self.0, word: 0 }
	}
}

pub struct ColumnSetIter {
	words: [u64; 4],
	word: usize
}

impl Iterator for ColumnSetIter {
	type Item = u8;

	fn next(&mut self) -> Option<u8> {
		while self.word < 4 {
			let bits = self.words[self.word];

			if bits != 0 {
				self.words[self.word] = bits & (bits - 1);

				return Some(((self.word << 6) | bits.trailing_zeros() as usize) as u8);
			}

			self.word += 1;
		}

		None
	}
}

/// A solid id seen during the build, with the columns it was written to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DistinctEntry {
	pub id: BlockId,
	pub columns: ColumnSet
}

#[derive(Debug)]
pub struct BuildScratch {
	columns: [Column; COLUMNS],
	arena: EscalationArena,
	distinct: Vec<DistinctEntry>,
	/// More than `DISTINCT_CAPACITY` ids were seen; membership is unknown.
	overflow: bool,
	/// An id may have been removed from a column since the table was last built.
	distinct_dirty: bool,
	any_non_air: bool,
	any_escalated: bool
}

impl BuildScratch {
	pub fn new() -> Self {
		BuildScratch {
			columns: [Column::EMPTY; COLUMNS],
			arena: EscalationArena::default(),
			distinct: Vec::with_capacity(DISTINCT_CAPACITY),
			overflow: false,
			distinct_dirty: false,
			any_non_air: false,
			any_escalated: false
		}
	}

	/// Returns the scratch to its untouched state. Escalated cells still held are dropped
	/// rather than pooled; call `release` first to keep them.
	pub fn clear(&mut self) {
		self.columns = [Column::EMPTY; COLUMNS];
		self.arena = EscalationArena::default();
		self.distinct.clear();
		self.overflow = false;
		self.distinct_dirty = false;
		self.any_non_air = false;
		self.any_escalated = false;
	}

	pub fn columns(&self) -> &[Column; COLUMNS] {
		&self.columns
	}

	pub fn column(&self, zx: u8) -> &Column {
		&self.columns[zx as usize]
	}

	pub fn arena(&self) -> &EscalationArena {
		&self.arena
	}

	pub fn any_non_air(&self) -> bool {
		self.any_non_air
	}

	pub fn any_escalated(&self) -> bool {
		self.any_escalated
	}

	pub fn is_distinct_dirty(&self) -> bool {
		self.distinct_dirty
	}

	pub fn distinct_overflowed(&self) -> bool {
		self.overflow
	}

	/// The distinct id table. Only complete if it is neither dirty nor overflowed.
	pub fn distinct(&self) -> &[DistinctEntry] {
		&self.distinct
	}

	pub fn get(&self, x: u8, y: u8, z: u8) -> BlockId {
		self.columns[zx(x, z)].get(y & 15, &self.arena)
	}

	/// Generation fast path write of a solid run.
	pub fn push_run(&mut self, zx: u8, run: Run, pool: &AllocCache<ColumnCells>) -> Outcome {
		let outcome = self.columns[zx as usize].push_run(run, &mut self.arena, pool);
		self.note(zx, run.id, outcome);

		outcome
	}

	/// General path write, accepting any run including air.
	pub fn add_run(&mut self, zx: u8, run: Run, pool: &AllocCache<ColumnCells>) -> Outcome {
		let outcome = self.columns[zx as usize].add_run(run, &mut self.arena, pool);
		self.note(zx, run.id, outcome);

		outcome
	}

	/// Sets every voxel to `id`, as a reopened uniform section would hold.
	pub fn fill_uniform(&mut self, id: BlockId) {
		if id == AIR {
			return;
		}

		for column in self.columns.iter_mut() {
			column.fill(id, &mut self.arena);
		}

		self.distinct.clear();
		self.distinct.push(DistinctEntry { id, columns: ColumnSet::all() });
		self.overflow = false;
		self.distinct_dirty = false;
		self.any_non_air = true;
	}

	/// Replaces the column at `zx` with explicit cells, keeping it as runs when possible.
	/// Returns true if the column had to escalate.
	pub fn load_column(&mut self, zx: u8, cells: &[BlockId; 16], pool: &AllocCache<ColumnCells>) -> bool {
		let (column, escalated) = Column::from_cells(cells, &mut self.arena, pool);

		if !self.columns[zx as usize].is_empty() {
			self.distinct_dirty = true;
		}

		self.columns[zx as usize] = column;
		self.any_escalated |= escalated;

		if !column.is_empty() {
			self.any_non_air = true;

			let (distinct, overflow, dirty) = (&mut self.distinct, &mut self.overflow, self.distinct_dirty);

			if !dirty {
				column.for_each_id(&self.arena, |id| record(distinct, overflow, id, zx));
			}
		}

		escalated
	}

	/// Replaces every voxel holding `from` with `to`. While the distinct table is trusted,
	/// only the columns it lists for `from` are visited. Marks the table dirty on change.
	pub fn replace_id(&mut self, from: BlockId, to: BlockId) -> bool {
		if from == AIR || from == to {
			return false;
		}

		let candidates = if self.distinct_dirty || self.overflow {
			ColumnSet::all()
		} else {
			match self.distinct.iter().find(|entry| entry.id == from) {
				Some(entry) => entry.columns,
				None => return false
			}
		};

		let mut changed = false;

		for zx in candidates.iter() {
			changed |= self.columns[zx as usize].replace_id(from, to, &mut self.arena);
		}

		if changed {
			self.distinct_dirty = true;
		}

		changed
	}

	/// Returns the columns holding `id`, rebuilding the table first if it is dirty.
	/// Returns `None` if more ids exist than the table can track.
	pub fn columns_containing(&mut self, id: BlockId) -> Option<ColumnSet> {
		if self.distinct_dirty {
			self.rebuild_distinct();
		}

		if self.overflow {
			return None;
		}

		Some(self.distinct.iter()
			.find(|entry| entry.id == id)
			.map(|entry| entry.columns)
			.unwrap_or_default())
	}

	/// Recomputes the distinct table by visiting the runs or cells of every column.
	pub fn rebuild_distinct(&mut self) {
		self.distinct.clear();
		self.overflow = false;

		let (distinct, overflow) = (&mut self.distinct, &mut self.overflow);

		for (zx, column) in self.columns.iter().enumerate() {
			column.for_each_id(&self.arena, |id| record(distinct, overflow, id, zx as u8));
		}

		self.distinct_dirty = false;
	}

	/// Hands escalated cells back to the pools. Columns referring to them become invalid,
	/// so this is only called once the scratch is done.
	pub fn release(&mut self, pools: &SectionPools) {
		self.arena.release(&pools.escalated);
	}

	fn note(&mut self, zx: u8, id: BlockId, outcome: Outcome) {
		self.any_escalated |= outcome.escalated;

		if outcome.displaced {
			self.distinct_dirty = true;
		}

		if id != AIR {
			self.any_non_air = true;

			if !self.distinct_dirty {
				record(&mut self.distinct, &mut self.overflow, id, zx);
			}
		}
	}
}

impl Default for BuildScratch {
	fn default() -> Self {
		BuildScratch::new()
	}
}

fn record(distinct: &mut Vec<DistinctEntry>, overflow: &mut bool, id: BlockId, zx: u8) {
	if *overflow {
		return;
	}

	if let Some(entry) = distinct.iter_mut().find(|entry| entry.id == id) {
		entry.columns.insert(zx);
	} else if distinct.len() < DISTINCT_CAPACITY {
		let mut columns = ColumnSet::new();
		columns.insert(zx);

		distinct.push(DistinctEntry { id, columns });
	} else {
		*overflow = true;
	}
}

fn zx(x: u8, z: u8) -> usize {
	((z as usize & 15) << 4) | (x as usize & 15)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::pool::SectionPools;

	fn zx_of(x: u8, z: u8) -> u8 {
		super::zx(x, z) as u8
	}

	#[test]
	fn test_column_set() {
		let mut set = ColumnSet::new();

		for &zx in &[0u8, 63, 64, 200, 255] {
			set.insert(zx);
		}

		assert_eq!(set.count(), 5);
		assert!(set.contains(200));
		assert!(!set.contains(199));
		assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 63, 64, 200, 255]);
		assert_eq!(ColumnSet::all().iter().count(), 256);
	}

	#[test]
	fn test_distinct_membership() {
		let pools = SectionPools::default();
		let mut scratch = BuildScratch::new();

		scratch.push_run(zx_of(1, 2), Run::new(0, 5, 1), &pools.escalated);
		scratch.push_run(zx_of(1, 2), Run::new(6, 8, 2), &pools.escalated);
		scratch.push_run(zx_of(9, 9), Run::new(0, 15, 1), &pools.escalated);

		assert!(!scratch.is_distinct_dirty());
		assert_eq!(scratch.distinct().len(), 2);

		let columns = scratch.columns_containing(1).unwrap();
		assert_eq!(columns.iter().collect::<Vec<_>>(), vec![zx_of(1, 2), zx_of(9, 9)]);
		assert_eq!(scratch.columns_containing(5), Some(ColumnSet::new()));
	}

	#[test]
	fn test_overflow() {
		let pools = SectionPools::default();
		let mut scratch = BuildScratch::new();

		for id in 1..=(DISTINCT_CAPACITY as BlockId + 1) {
			scratch.push_run(id as u8, Run::new(0, 0, id), &pools.escalated);
		}

		assert!(scratch.distinct_overflowed());
		assert_eq!(scratch.columns_containing(1), None);

		// Replacement falls back to visiting every column.
		assert!(scratch.replace_id(9, 4));
		assert_eq!(scratch.get(9, 0, 0), 4);
	}

	#[test]
	fn test_displacement_dirties() {
		let pools = SectionPools::default();
		let mut scratch = BuildScratch::new();

		scratch.add_run(0, Run::new(0, 3, 1), &pools.escalated);
		scratch.add_run(0, Run::new(0, 3, 2), &pools.escalated);

		assert!(scratch.is_distinct_dirty());

		let columns = scratch.columns_containing(1).unwrap();
		assert!(columns.is_empty());
		assert!(!scratch.is_distinct_dirty());
		assert_eq!(scratch.distinct().len(), 1);
	}

	#[test]
	fn test_replace_restricted() {
		let pools = SectionPools::default();
		let mut scratch = BuildScratch::new();

		scratch.push_run(3, Run::new(0, 7, 5), &pools.escalated);
		scratch.push_run(4, Run::new(0, 7, 6), &pools.escalated);

		assert!(scratch.replace_id(5, 6));
		assert!(scratch.is_distinct_dirty());
		assert_eq!(scratch.get(3, 4, 0), 6);
		assert!(!scratch.replace_id(5, 6));

		let columns = scratch.columns_containing(6).unwrap();
		assert_eq!(columns.count(), 2);
	}

	#[test]
	fn test_fill_and_release() {
		let pools = SectionPools::default();
		let mut scratch = BuildScratch::new();

		scratch.fill_uniform(12);
		assert_eq!(scratch.get(15, 15, 15), 12);
		assert_eq!(scratch.columns_containing(12).map(|set| set.count()), Some(256));

		let mut cells = [AIR; 16];
		cells[0] = 1;
		cells[2] = 2;
		cells[4] = 3;

		assert!(scratch.load_column(7, &cells, &pools.escalated));
		assert!(scratch.any_escalated());
		assert_eq!(scratch.get(7, 4, 0), 3);

		scratch.release(&pools);
		scratch.clear();

		assert_eq!(pools.escalated.idle(), 1);
		assert!(!scratch.any_non_air());
		assert!(scratch.arena().is_empty());
	}
}
