//! Game-specific masking schemes.
//!
//! Neither scheme is real cryptography: both are XOR masks driven by small
//! 16-bit key schedules. They live apart from the container parsers so
//! that [`crate::formats`] only ever sees plain bytes.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`text`]   | Multi-string text blocks: header and per-string key schedules |
//! | [`sprite`] | LCG mask over sprite pixel words, per-title constants |

pub mod sprite;
pub mod text;

pub use sprite::{CipherParams, SeedOrigin, Title};
pub use text::Unmapped;
