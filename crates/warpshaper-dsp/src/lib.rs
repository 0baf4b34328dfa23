#![forbid(unsafe_code)]

//! Frequency-warped all-pole lattice noise shaping.

pub mod analysis;
pub mod config;
pub mod delay;
pub mod dither;
pub mod gain;
pub mod lattice;
pub mod quantize;
pub mod shaper;

pub use config::{ConfigError, ShaperConfig};
pub use dither::{Dither, DitherKind};
pub use gain::DerivedGains;
pub use quantize::ShapedQuantizer;
pub use shaper::WarpedLatticeShaper;

/// Maximum number of lattice stages a shaper can hold.
pub const MAX_ORDER: usize = 32;
