//! Thread-safe recycling of the large buffers used while building and finalizing sections.

use crate::column::ColumnCells;
use crate::config::PoolLimits;
use crate::mask::SectionMask;
use crate::position::VOLUME;
use crate::scratch::BuildScratch;
use crate::{BlockId, AIR};
use spin::Mutex;

/// An explicit id per voxel, indexed by `SectionPosition::yzx`.
pub type DenseIds = Box<[BlockId; VOLUME]>;

/// A buffer that can be created from nothing and wiped back to that state.
pub trait Recycle {
	fn fresh() -> Self;
	fn reset(&mut self);
}

pub trait Recycler<T> {
	fn create(&self) -> T;
	fn destroy(&self, value: T);
}

/// Retains a maximum number of elements at a time. Values are reset when they are handed
/// back, so `create` always returns a cleared buffer.
#[derive(Debug)]
pub struct AllocCache<T> where T: Recycle {
	available: Mutex<Vec<T>>,
	max: usize
}

impl<T> AllocCache<T> where T: Recycle {
	pub fn new(max: usize) -> Self {
		AllocCache {
			available: Mutex::new(Vec::new()),
			max
		}
	}

	/// Number of buffers currently waiting to be reused.
	pub fn idle(&self) -> usize {
		self.available.lock().len()
	}

	pub fn max(&self) -> usize {
		self.max
	}
}

impl<T> Recycler<T> for AllocCache<T> where T: Recycle {
	fn create(&self) -> T {
		if let Some(value) = self.available.lock().pop() {
			return value;
		}

		log::trace!("pool miss, allocating a fresh {}", std::any::type_name::<T>());

		T::fresh()
	}

	fn destroy(&self, mut value: T) {
		if self.max == 0 {
			return;
		}

		value.reset();

		let mut available = self.available.lock();

		if available.len() < self.max {
			available.push(value);
		}
	}
}

impl Recycle for SectionMask {
	fn fresh() -> Self {
		SectionMask::default()
	}

	fn reset(&mut self) {
		self.fill(false)
	}
}

impl Recycle for DenseIds {
	fn fresh() -> Self {
		Box::new([AIR; VOLUME])
	}

	fn reset(&mut self) {
		for id in self.iter_mut() {
			*id = AIR;
		}
	}
}

impl Recycle for ColumnCells {
	fn fresh() -> Self {
		Box::new([AIR; 16])
	}

	fn reset(&mut self) {
		**self = [AIR; 16];
	}
}

impl Recycle for Box<BuildScratch> {
	fn fresh() -> Self {
		Box::new(BuildScratch::new())
	}

	fn reset(&mut self) {
		self.clear()
	}
}

/// The pools shared by every section operating under one context.
#[derive(Debug)]
pub struct SectionPools {
	pub occupancy: AllocCache<SectionMask>,
	pub dense: AllocCache<DenseIds>,
	pub escalated: AllocCache<ColumnCells>,
	pub scratch: AllocCache<Box<BuildScratch>>
}

impl SectionPools {
	pub fn new(limits: &PoolLimits) -> Self {
		SectionPools {
			occupancy: AllocCache::new(limits.occupancy),
			dense: AllocCache::new(limits.dense),
			escalated: AllocCache::new(limits.escalated),
			scratch: AllocCache::new(limits.scratch)
		}
	}
}

impl Default for SectionPools {
	fn default() -> Self {
		SectionPools::new(&PoolLimits::default())
	}
}
