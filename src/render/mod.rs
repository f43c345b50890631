//! GPU-facing render support: the cell instance bridge and the glyph
//! atlas packer. No pixels are drawn here; the renderer consumes the
//! instance buffer and atlas pages.

pub mod atlas;
pub mod bridge;

pub use atlas::{AtlasEntry, AtlasPacker};
pub use bridge::{CellBridge, CellInstance, GLYPH_NONE};
