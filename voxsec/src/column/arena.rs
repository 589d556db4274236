use crate::pool::{AllocCache, Recycler};
use crate::BlockId;

/// An explicit id array for one escalated column.
pub type ColumnCells = Box<[BlockId; 16]>;

/// Index of an escalated column's cells inside an `EscalationArena`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CellsHandle(u16);

/// Owns the cell arrays of every escalated column of one scratch. Columns refer to their
/// array by handle. Arrays are rented from a pool and only handed back all at once, which
/// keeps handles stable for the lifetime of a build.
#[derive(Debug, Default)]
pub struct EscalationArena {
	cells: Vec<ColumnCells>
}

impl EscalationArena {
	pub fn alloc(&mut self, pool: &AllocCache<ColumnCells>) -> CellsHandle {
		let handle = CellsHandle(self.cells.len() as u16);

		self.cells.push(pool.create());

		handle
	}

	pub fn get(&self, handle: CellsHandle) -> &[BlockId; 16] {
		&self.cells[handle.0 as usize]
	}

	pub fn get_mut(&mut self, handle: CellsHandle) -> &mut [BlockId; 16] {
		&mut self.cells[handle.0 as usize]
	}

	pub fn len(&self) -> usize {
		self.cells.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cells.is_empty()
	}

	/// Hands every array back to the pool. All handles become invalid.
	pub fn release(&mut self, pool: &AllocCache<ColumnCells>) {
		for cells in self.cells.drain(..) {
			pool.destroy(cells);
		}
	}
}
