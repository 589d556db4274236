#![forbid(unsafe_code)]

//! # `voxsec`: Voxel Sections
//!
//! Adaptive storage for 16x16x16 sections of block ids during world generation.
//!
//! Most sections are mostly air, mostly one material, or made of a few vertical layers, so
//! storing 4096 explicit ids per section wastes memory at world scale. `voxsec` lets terrain
//! generation write cheap column runs into a scratch structure, then finalizes each section
//! into the smallest representation that still answers queries exactly:
//!
//!  * `Empty` and `Uniform` for trivial sections
//!  * `Sparse` for a handful of solid voxels
//!  * `Packed` and `MultiPacked` for palette indices packed at 1 to 16 bits per voxel
//!  * `DenseExpanded` when nothing else is smaller
//!
//! Finalizing also derives what meshing and culling need: an occupancy bitset, six boundary
//! face planes, a bounding box, and an internal exposure estimate.
//!
//! # Threading
//!
//! A `Section` and its scratch belong to one thread at a time. The `Context` holding the
//! buffer pools is shared between every worker.
//!
//! ```
//! use voxsec::{Context, Kind, Section};
//!
//! let ctx = Context::default();
//! let mut section = Section::new();
//!
//! section.write_column(&ctx, 3, 4, 0, 3, 7);
//! section.finalize(&ctx);
//!
//! assert_eq!(section.kind(), Kind::Sparse);
//! assert_eq!(section.get_block(3, 2, 4), 7);
//! ```

/// Block identifier. Air is always 0.
pub type BlockId = u16;

pub const AIR: BlockId = 0;

pub mod position;

pub mod mask;

pub mod packed;

pub mod palette;

pub mod column;

pub mod scratch;
pub mod section;
pub mod finalize;
pub mod pool;
pub mod config;
pub mod context;

pub use crate::config::{Config, ConfigError, PoolLimits, Thresholds};
pub use crate::context::Context;
pub use crate::section::{Bounds, Kind, Representation, Section};
