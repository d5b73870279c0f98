//! Parsers for Nintendo DS binary formats.
//!
//! Each submodule targets one format family. All parsers follow the same
//! conventions:
//!
//! * **The ROM image is streamed** - [`nds::Catalog::parse`] is generic over
//!   [`std::io::Read`] + [`std::io::Seek`] and reads metadata only. File
//!   data is fetched on demand, through [`nds::CatalogReader`] or by handing
//!   [`nds::Catalog::fetch`] a reader explicitly.
//! * **Assets are buffers** - files inside the image are small, so the
//!   asset parsers take a `&[u8]` and borrow from it.
//! * **Masking is separate** - parsers hand out masked bytes as stored;
//!   [`crate::crypto`] removes the masks.
//!
//! ## Format overview
//!
//! | Module       | Format    | Description |
//! |--------------|-----------|-------------|
//! | [`nds`]      | NDS       | ROM image; header, allocation table and name table become a flat catalog |
//! | [`fnt`]      | FNT       | Directory tree flattened into a table; shared by ROM images and NARCs |
//! | [`banner`]   | Banner    | System menu icon and localized titles |
//! | [`envelope`] | Nitro     | Magic + BOM header and tagged records common to the asset formats |
//! | [`narc`]     | NARC      | Archive of many small files behind one ROM entry |
//! | [`nclr`]     | NCLR      | Palette (`RLCN`) |
//! | [`ncgr`]     | NCGR      | Sprite pixels (`RGCN`), tiled or masked linear |
//! | [`btx0`]     | BTX0/BMD0 | Texture container with named textures and palettes |

pub mod banner;
pub mod btx0;
pub mod envelope;
pub mod fnt;
pub mod narc;
pub mod ncgr;
pub mod nclr;
pub mod nds;
