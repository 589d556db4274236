use crate::column::{paint, CellsHandle, Column, ColumnCells, EscalationArena, Run, Runs};
use crate::pool::AllocCache;
use crate::{BlockId, AIR};

/// What a column write did beyond storing the new cells.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Outcome {
	/// The write escalated the column to explicit cells.
	pub escalated: bool,
	/// The write covered previously solid cells, so an id may have left the column.
	pub displaced: bool
}

/// Up to five runs: each of two existing runs cut into at most two pieces, plus the new run.
struct Pieces {
	runs: [Run; 5],
	len: usize
}

impl Pieces {
	fn new() -> Self {
		Pieces { runs: [Run::new(0, 0, AIR); 5], len: 0 }
	}

	fn push(&mut self, run: Run) {
		self.runs[self.len] = run;
		self.len += 1;
	}

	/// Pushes the parts of `existing` not covered by `cut`.
	fn push_outside(&mut self, existing: Run, cut: &Run) {
		if existing.end < cut.start || existing.start > cut.end {
			self.push(existing);
			return;
		}

		if existing.start < cut.start {
			self.push(Run::new(existing.start, cut.start - 1, existing.id));
		}

		if existing.end > cut.end {
			self.push(Run::new(cut.end + 1, existing.end, existing.id));
		}
	}

	/// Sorts by start and folds touching runs of the same id together.
	fn normalize(&mut self) {
		let runs = &mut self.runs[..self.len];

		for index in 1..runs.len() {
			let mut cursor = index;

			while cursor > 0 && runs[cursor - 1].start > runs[cursor].start {
				runs.swap(cursor - 1, cursor);
				cursor -= 1;
			}
		}

		let mut kept = 0;

		for index in 0..self.len {
			let run = self.runs[index];

			if kept > 0 {
				let last = &mut self.runs[kept - 1];

				if last.id == run.id && last.end + 1 == run.start {
					last.end = run.end;
					continue;
				}
			}

			self.runs[kept] = run;
			kept += 1;
		}

		self.len = kept;
	}
}

impl Column {
	/// Generation fast path. Expects runs in ascending, non-overlapping Y order, and handles
	/// run creation and same-id extension without touching other state. Anything else is
	/// handed to `add_run`. `run` must be valid and solid.
	pub fn push_run(&mut self, run: Run, arena: &mut EscalationArena, pool: &AllocCache<ColumnCells>) -> Outcome {
		debug_assert!(run.is_valid() && run.id != AIR);

		if run.is_full() {
			return self.fill(run.id, arena);
		}

		match self.runs {
			Runs::Empty => {
				self.runs = Runs::One(run);
				self.apply_solid(run.mask());

				Outcome::default()
			},
			Runs::One(mut first) => {
				if first.id == run.id && run.start >= first.start && run.start <= first.end + 1 {
					first.end = first.end.max(run.end);
					self.runs = Runs::One(first);
					self.apply_solid(run.mask());

					Outcome::default()
				} else if run.start > first.end {
					self.runs = Runs::Two(first, run);
					self.apply_solid(run.mask());

					Outcome::default()
				} else {
					self.add_run(run, arena, pool)
				}
			},
			Runs::Two(first, mut second) => {
				if second.id == run.id && run.start >= second.start && run.start <= second.end + 1 {
					second.end = second.end.max(run.end);
					self.runs = Runs::Two(first, second);
					self.apply_solid(run.mask());

					Outcome::default()
				} else {
					self.add_run(run, arena, pool)
				}
			},
			Runs::Escalated(handle) => self.paint_escalated(handle, run, arena)
		}
	}

	/// General path. Accepts overlapping and out of order runs, including air runs that clear
	/// cells. Merges into at most two runs where possible and escalates otherwise. Escalation
	/// copies the existing runs into the cell array once, then applies the write.
	pub fn add_run(&mut self, run: Run, arena: &mut EscalationArena, pool: &AllocCache<ColumnCells>) -> Outcome {
		debug_assert!(run.is_valid());

		if let Runs::Escalated(handle) = self.runs {
			return self.paint_escalated(handle, run, arena);
		}

		let displaced = self.mask & run.mask() != 0;
		let (existing, existing_len) = self.run_pair();

		let mut pieces = Pieces::new();

		for &old in &existing[..existing_len] {
			pieces.push_outside(old, &run);
		}

		if run.id != AIR {
			pieces.push(run);
		}

		pieces.normalize();

		let mut escalated = false;

		self.runs = match pieces.len {
			0 => Runs::Empty,
			1 => Runs::One(pieces.runs[0]),
			2 => Runs::Two(pieces.runs[0], pieces.runs[1]),
			_ => {
				let handle = arena.alloc(pool);
				let cells = arena.get_mut(handle);

				for old in &existing[..existing_len] {
					paint(cells, old);
				}

				paint(cells, &run);
				escalated = true;

				log::trace!("escalating column after writing {:?} over {:?}", run, &existing[..existing_len]);

				Runs::Escalated(handle)
			}
		};

		self.apply(&run);

		Outcome { escalated, displaced }
	}

	/// Sets every cell to `id` in constant time, whatever the column held before.
	/// Escalated columns stay escalated and have their array filled instead.
	pub fn fill(&mut self, id: BlockId, arena: &mut EscalationArena) -> Outcome {
		let displaced = match self.runs {
			Runs::Empty => false,
			Runs::One(run) => run.id != id,
			_ => true
		};

		match self.runs {
			Runs::Escalated(handle) => *arena.get_mut(handle) = [id; 16],
			_ => self.runs = Runs::One(Run::new(0, 15, id))
		}

		self.mask = 0xFFFF;
		self.non_air = 16;
		self.vertical = 15;

		Outcome { escalated: false, displaced }
	}

	/// Rebuilds a column from explicit cells, as runs if at most two runs describe them and
	/// as an escalated array otherwise.
	pub fn from_cells(cells: &[BlockId; 16], arena: &mut EscalationArena, pool: &AllocCache<ColumnCells>) -> (Column, bool) {
		let mut pieces = Pieces::new();
		let mut mask = 0u16;
		let mut fits = true;
		let mut y = 0;

		while y < 16 {
			let id = cells[y];

			if id == AIR {
				y += 1;
				continue;
			}

			let start = y;

			while y < 16 && cells[y] == id {
				y += 1;
			}

			let run = Run::new(start as u8, (y - 1) as u8, id);
			mask |= run.mask();

			if pieces.len == 2 {
				fits = false;
			} else {
				pieces.push(run);
			}
		}

		let runs = if !fits {
			let handle = arena.alloc(pool);
			*arena.get_mut(handle) = *cells;

			Runs::Escalated(handle)
		} else {
			match pieces.len {
				0 => Runs::Empty,
				1 => Runs::One(pieces.runs[0]),
				_ => Runs::Two(pieces.runs[0], pieces.runs[1])
			}
		};

		let mut column = Column { runs, mask: 0, non_air: 0, vertical: 0 };
		column.set_mask(mask);

		(column, !fits)
	}

	/// Replaces every cell holding `from` with `to`, which may be air. Returns true if any
	/// cell changed.
	pub fn replace_id(&mut self, from: BlockId, to: BlockId, arena: &mut EscalationArena) -> bool {
		if from == AIR || from == to {
			return false;
		}

		match self.runs {
			Runs::Empty => false,
			Runs::Escalated(handle) => {
				let cells = arena.get_mut(handle);
				let mut changed = false;
				let mut mask = 0u16;

				for (y, cell) in cells.iter_mut().enumerate() {
					if *cell == from {
						*cell = to;
						changed = true;
					}

					mask |= ((*cell != AIR) as u16) << y;
				}

				self.set_mask(mask);

				changed
			},
			_ => {
				let (existing, existing_len) = self.run_pair();

				if !existing[..existing_len].iter().any(|run| run.id == from) {
					return false;
				}

				let mut pieces = Pieces::new();

				for &old in &existing[..existing_len] {
					if old.id != from {
						pieces.push(old);
					} else if to != AIR {
						pieces.push(Run::new(old.start, old.end, to));
					}
				}

				pieces.normalize();

				let mask = pieces.runs[..pieces.len].iter().fold(0, |mask, run| mask | run.mask());

				self.runs = match pieces.len {
					0 => Runs::Empty,
					1 => Runs::One(pieces.runs[0]),
					_ => Runs::Two(pieces.runs[0], pieces.runs[1])
				};

				self.set_mask(mask);

				true
			}
		}
	}

	fn paint_escalated(&mut self, handle: CellsHandle, run: Run, arena: &mut EscalationArena) -> Outcome {
		let displaced = self.mask & run.mask() != 0;

		paint(arena.get_mut(handle), &run);
		self.apply(&run);

		Outcome { escalated: false, displaced }
	}

	fn apply(&mut self, run: &Run) {
		if run.id == AIR {
			let mask = self.mask & !run.mask();
			self.set_mask(mask);
		} else {
			self.apply_solid(run.mask());
		}
	}

	/// Marks `bits` solid. The solid count grows by the newly set bits only.
	fn apply_solid(&mut self, bits: u16) {
		let fresh = bits & !self.mask;

		self.non_air += fresh.count_ones() as u8;
		self.mask |= bits;
		self.vertical = (self.mask & (self.mask >> 1)).count_ones() as u8;
	}
}
