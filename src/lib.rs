//! **ndskit** - a Rust library for reading Nintendo DS ROM images and the
//! asset formats packed inside them.
//!
//! # Supported formats
//! | Module | Format |
//! |--------|--------|
//! | [`formats::nds`]    | NDS - ROM image: header, banner, file catalog |
//! | [`formats::narc`]   | NARC - Nitro ARChive |
//! | [`formats::nclr`]   | NCLR - 16-color palette |
//! | [`formats::ncgr`]   | NCGR - sprite pixels, standard and masked |
//! | [`formats::btx0`]   | BTX0/BMD0 - texture container |
//! | [`crypto::text`]    | Masked multi-string text blocks |
//! | [`crypto::sprite`]  | LCG-masked sprite pixel words |
//!
//! Decoded pixels come out as [`graphics::PixelGrid`]s of palette indices;
//! [`graphics::render`] pairs them with a palette. [`output`] ties the
//! pieces together for callers that just want "this chunk, in that format".

pub mod charmap;
pub mod crypto;
pub mod error;
pub mod formats;
pub mod graphics;
pub mod output;
mod utils;

pub use error::{Error, ErrorKind, Result};
