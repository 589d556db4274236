//! Run-length encoding of a single 16 cell vertical column.
//!
//! A column holds at most two disjoint, ascending runs. Writes that cannot be expressed that
//! way escalate the column to an explicit 16 cell array held in an `EscalationArena`. The
//! solidity mask, solid count, and vertical adjacency count are cached and updated with bit
//! operations on every write.

mod arena;
mod write;

pub use self::arena::{CellsHandle, ColumnCells, EscalationArena};
pub use self::write::Outcome;

use crate::{BlockId, AIR};

const fn range_masks() -> [[u16; 16]; 16] {
	let mut table = [[0u16; 16]; 16];
	let mut start = 0;

	while start < 16 {
		let mut end = start;

		while end < 16 {
			table[start][end] = ((0xFFFFu32 >> ((15 - (end - start)) as u32)) << (start as u32)) as u16;
			end += 1;
		}

		start += 1;
	}

	table
}

/// `RANGE_MASKS[start][end]` has bits `start..=end` set. Entries with `end < start` are zero.
pub static RANGE_MASKS: [[u16; 16]; 16] = range_masks();

/// A contiguous, inclusive Y range within a column holding one id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Run {
	pub id: BlockId,
	pub start: u8,
	pub end: u8
}

impl Run {
	pub fn new(start: u8, end: u8, id: BlockId) -> Self {
		Run { id, start, end }
	}

	pub fn is_valid(&self) -> bool {
		self.start <= self.end && self.end < 16
	}

	pub fn is_full(&self) -> bool {
		self.start == 0 && self.end == 15
	}

	pub fn mask(&self) -> u16 {
		RANGE_MASKS[self.start as usize & 15][self.end as usize & 15]
	}

	pub fn len(&self) -> u8 {
		self.end - self.start + 1
	}

	pub fn contains(&self, y: u8) -> bool {
		y >= self.start && y <= self.end
	}
}

/// Storage of a column's ids.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Runs {
	Empty,
	One(Run),
	/// Two disjoint runs, the first strictly below the second.
	Two(Run, Run),
	Escalated(CellsHandle)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Column {
	runs: Runs,
	mask: u16,
	non_air: u8,
	vertical: u8
}

impl Column {
	pub const EMPTY: Column = Column { runs: Runs::Empty, mask: 0, non_air: 0, vertical: 0 };

	pub fn runs(&self) -> &Runs {
		&self.runs
	}

	/// Bit `y` is set if cell `y` is solid.
	pub fn mask(&self) -> u16 {
		self.mask
	}

	pub fn non_air(&self) -> u8 {
		self.non_air
	}

	/// Number of vertically adjacent solid pairs within the column.
	pub fn vertical_adjacency(&self) -> u8 {
		self.vertical
	}

	pub fn is_empty(&self) -> bool {
		self.mask == 0
	}

	pub fn is_escalated(&self) -> bool {
		match self.runs {
			Runs::Escalated(_) => true,
			_ => false
		}
	}

	/// Returns the id if the column is exactly one run spanning every cell.
	pub fn full_run(&self) -> Option<BlockId> {
		match self.runs {
			Runs::One(run) if run.is_full() => Some(run.id),
			_ => None
		}
	}

	/// Returns the run storage as a fixed pair and its length. Escalated columns report no runs.
	pub fn run_pair(&self) -> ([Run; 2], usize) {
		let none = Run::new(0, 0, AIR);

		match self.runs {
			Runs::Empty | Runs::Escalated(_) => ([none, none], 0),
			Runs::One(run) => ([run, none], 1),
			Runs::Two(first, second) => ([first, second], 2)
		}
	}

	pub fn get(&self, y: u8, arena: &EscalationArena) -> BlockId {
		match self.runs {
			Runs::Empty => AIR,
			Runs::One(run) => if run.contains(y) { run.id } else { AIR },
			Runs::Two(first, second) => {
				if first.contains(y) {
					first.id
				} else if second.contains(y) {
					second.id
				} else {
					AIR
				}
			},
			Runs::Escalated(handle) => arena.get(handle)[y as usize & 15]
		}
	}

	/// Decodes the column into 16 explicit cells.
	pub fn cells(&self, arena: &EscalationArena) -> [BlockId; 16] {
		let mut cells = [AIR; 16];

		match self.runs {
			Runs::Escalated(handle) => cells.copy_from_slice(&arena.get(handle)[..]),
			_ => {
				let (pair, len) = self.run_pair();

				for run in &pair[..len] {
					paint(&mut cells, run);
				}
			}
		}

		cells
	}

	/// Calls `f` with every id stored in the column. Ids may repeat.
	pub fn for_each_id<F>(&self, arena: &EscalationArena, mut f: F) where F: FnMut(BlockId) {
		match self.runs {
			Runs::Empty => (),
			Runs::One(run) => f(run.id),
			Runs::Two(first, second) => {
				f(first.id);

				if second.id != first.id {
					f(second.id);
				}
			},
			Runs::Escalated(handle) => {
				let mut last = AIR;

				for &id in arena.get(handle).iter() {
					if id != AIR && id != last {
						f(id);
					}

					last = id;
				}
			}
		}
	}

	fn set_mask(&mut self, mask: u16) {
		self.mask = mask;
		self.non_air = mask.count_ones() as u8;
		self.vertical = (mask & (mask >> 1)).count_ones() as u8;
	}
}

impl Default for Column {
	fn default() -> Self {
		Column::EMPTY
	}
}

/// Writes the run's id over its range of cells.
pub(crate) fn paint(cells: &mut [BlockId; 16], run: &Run) {
	for cell in &mut cells[run.start as usize..=run.end as usize] {
		*cell = run.id;
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_range_masks() {
		assert_eq!(RANGE_MASKS[0][15], 0xFFFF);
		assert_eq!(RANGE_MASKS[2][4], 0b11100);
		assert_eq!(RANGE_MASKS[15][15], 0x8000);
		assert_eq!(RANGE_MASKS[5][4], 0);

		for start in 0..16u8 {
			for end in start..16u8 {
				let run = Run::new(start, end, 1);

				assert_eq!(run.mask().count_ones() as u8, run.len());
				assert_eq!(run.mask().trailing_zeros() as u8, start);
				assert_eq!(15 - run.mask().leading_zeros() as u8, end);
			}
		}
	}

	#[test]
	fn test_run_validity() {
		assert!(Run::new(0, 15, 1).is_valid());
		assert!(Run::new(3, 3, 1).is_valid());
		assert!(!Run::new(4, 3, 1).is_valid());
		assert!(!Run::new(4, 16, 1).is_valid());
	}
}
