//! Indexed-color graphics shared by the sprite, banner and texture decoders.
//!
//! Decoders produce a [`PixelGrid`] of palette indices and, separately, a
//! [`Palette`] of RGB555 colors. [`render`] pairs the two into an
//! [`IndexedImage`]; encoding that into an actual image file is left to the
//! caller.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`pixels`]  | Grids, tiled and linear 4-bit unpacking |
//! | [`palette`] | RGB555 words, channel depth |
//! | [`render`]  | Grid + palette → indexed image, grayscale fallback |
//! | [`mosaic`]  | Grid layout and composition of many textures |

pub mod mosaic;
pub mod palette;
pub mod pixels;
pub mod render;

pub use palette::{ChannelDepth, Palette, Rgb555};
pub use pixels::{Layout, PixelGrid, Size};
pub use render::{GrayRamp, IndexedImage, RenderOptions, render};
