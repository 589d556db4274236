mod section;
mod layer;

pub use self::section::SectionPosition;
pub use self::layer::LayerPosition;

/// Edge length of a section along every axis.
pub const EDGE: usize = 16;

/// Number of voxels in a section.
pub const VOLUME: usize = EDGE * EDGE * EDGE;

/// Number of (x, z) columns in a section.
pub const COLUMNS: usize = EDGE * EDGE;
