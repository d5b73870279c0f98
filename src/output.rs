//! Turning fetched chunks into something readable.
//!
//! A chunk is any byte buffer: a whole ROM file, or one member of a NARC
//! archive. [`ChunkKind::detect`] classifies a chunk by its magic, and
//! [`decode_chunks`] applies one [`OutputFormat`] to a list of chunks.
//!
//! | Format                  | Result per chunk                              |
//! |-------------------------|-----------------------------------------------|
//! | `raw`                   | The bytes, unchanged                          |
//! | `hex`                   | Lowercase hex, two digits per byte            |
//! | `text`                  | Decrypted strings (needs a character table)   |
//! | `sprite-part`           | Palette, standard sprite, or unrecognized     |
//! | `encrypted-sprite-part` | Palette, encrypted sprite, or unrecognized    |
//! | `encrypted-sprite`      | Every sprite rendered with every palette      |
//! | `texture`               | Texture container rendered as one mosaic      |

use std::fmt;
use std::str::FromStr;

use crate::charmap::CharacterTable;
use crate::crypto::sprite::{CipherParams, SeedOrigin, Title};
use crate::crypto::text::{self, Unmapped};
use crate::formats::btx0::{self, Btx0};
use crate::formats::narc;
use crate::formats::ncgr::{self, ENCRYPTED_SIZE, STANDARD_SIZE};
use crate::formats::nclr::Nclr;
use crate::graphics::{
    ChannelDepth, GrayRamp, IndexedImage, Palette, PixelGrid, RenderOptions, Size, render,
};
use crate::{Error, Result};

/// Container type of a chunk, by magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChunkKind {
    Narc,
    Palette,
    Sprite,
    Texture,
    Unknown,
}

impl ChunkKind {
    /// Classify `bytes` by their first four bytes. Never fails.
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes.get(..4) {
            Some(b"NARC") => ChunkKind::Narc,
            Some(b"RLCN") => ChunkKind::Palette,
            Some(b"RGCN") => ChunkKind::Sprite,
            Some(m) if btx0::is_texture_container(m) => ChunkKind::Texture,
            _ => ChunkKind::Unknown,
        }
    }
}

/// Whether fetched files are split into archive members before decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitMode {
    /// Split only files that parse as NARC archives.
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for SplitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SplitMode::Auto),
            "always" => Ok(SplitMode::Always),
            "never" => Ok(SplitMode::Never),
            _ => Err(Error::Parse("unknown split mode")),
        }
    }
}

/// The chunks of a fetched file under `mode`.
///
/// [`SplitMode::Always`] fails on files that are not archives.
pub fn chunks(data: &[u8], mode: SplitMode) -> Result<Vec<&[u8]>> {
    match mode {
        SplitMode::Always => narc::split(data),
        SplitMode::Never => Ok(vec![data]),
        SplitMode::Auto if narc::is_narc(data) => narc::split(data),
        SplitMode::Auto => Ok(vec![data]),
    }
}

/// Output formats understood by [`decode_chunks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputFormat {
    Raw,
    Hex,
    Text,
    SpritePart,
    EncryptedSpritePart,
    EncryptedSprite,
    Texture,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Raw,
        OutputFormat::Hex,
        OutputFormat::Text,
        OutputFormat::SpritePart,
        OutputFormat::EncryptedSpritePart,
        OutputFormat::EncryptedSprite,
        OutputFormat::Texture,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Raw => "raw",
            OutputFormat::Hex => "hex",
            OutputFormat::Text => "text",
            OutputFormat::SpritePart => "sprite-part",
            OutputFormat::EncryptedSpritePart => "encrypted-sprite-part",
            OutputFormat::EncryptedSprite => "encrypted-sprite",
            OutputFormat::Texture => "texture",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or(Error::Parse("unknown output format"))
    }
}

/// Decoder configuration.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions<'t> {
    /// Generator constants, required by the encrypted sprite formats.
    pub cipher: Option<CipherParams>,
    pub seed: SeedOrigin,
    /// Channel depth of rendered colors.
    pub depth: ChannelDepth,
    /// Treatment of text code units with no table entry.
    pub unmapped: Unmapped,
    pub sprite_size: Size,
    pub encrypted_sprite_size: Size,
    /// Render sprite palette index 0 as transparent.
    pub transparent_zero: bool,
    /// Required by [`OutputFormat::Text`].
    pub charmap: Option<&'t CharacterTable>,
}

impl Default for DecodeOptions<'_> {
    fn default() -> Self {
        Self {
            cipher: None,
            seed: SeedOrigin::default(),
            depth: ChannelDepth::default(),
            unmapped: Unmapped::default(),
            sprite_size: STANDARD_SIZE,
            encrypted_sprite_size: ENCRYPTED_SIZE,
            transparent_zero: false,
            charmap: None,
        }
    }
}

impl<'t> DecodeOptions<'t> {
    /// Defaults with the cipher of `title`.
    pub fn for_title(title: Title) -> Self {
        Self {
            cipher: Some(title.params()),
            ..Default::default()
        }
    }

    pub fn with_cipher(mut self, cipher: CipherParams) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn with_charmap(mut self, charmap: &'t CharacterTable) -> Self {
        self.charmap = Some(charmap);
        self
    }

    fn sprite_options(&self) -> RenderOptions {
        RenderOptions {
            depth: self.depth,
            transparent_zero: self.transparent_zero,
            ramp: GrayRamp::Ascending,
        }
    }
}

/// Result of decoding one chunk (or, for paired sprites, one combination).
#[derive(Debug, Clone)]
pub enum Decoded {
    Raw(Vec<u8>),
    Hex(String),
    Text(Vec<String>),
    Palette(Palette),
    Sprite(PixelGrid),
    Image(IndexedImage),
    /// The chunk is not of a kind the format handles.
    Unrecognized,
}

/// Lowercase hex encoding of `bytes`.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Apply `format` to every chunk.
///
/// Part formats yield one [`Decoded`] per chunk, in order.
/// [`OutputFormat::EncryptedSprite`] yields one image per sprite/palette
/// combination instead.
pub fn decode_chunks(
    chunks: &[&[u8]],
    format: OutputFormat,
    options: &DecodeOptions<'_>,
) -> Result<Vec<Decoded>> {
    match format {
        OutputFormat::Raw => Ok(chunks.iter().map(|c| Decoded::Raw(c.to_vec())).collect()),
        OutputFormat::Hex => Ok(chunks.iter().map(|c| Decoded::Hex(hex(c))).collect()),
        OutputFormat::Text => {
            let table = options
                .charmap
                .ok_or(Error::MissingResource("character table"))?;
            chunks
                .iter()
                .map(|c| Ok(Decoded::Text(text::decode(c, table, options.unmapped)?)))
                .collect()
        }
        OutputFormat::SpritePart => chunks.iter().map(|c| standard_part(c, options)).collect(),
        OutputFormat::EncryptedSpritePart => {
            chunks.iter().map(|c| encrypted_part(c, options)).collect()
        }
        OutputFormat::EncryptedSprite => encrypted_sprites(chunks, options),
        OutputFormat::Texture => chunks.iter().map(|c| texture(c, options)).collect(),
    }
}

fn standard_part(chunk: &[u8], options: &DecodeOptions<'_>) -> Result<Decoded> {
    Ok(match ChunkKind::detect(chunk) {
        ChunkKind::Palette => Decoded::Palette(Nclr::parse(chunk)?.palette),
        ChunkKind::Sprite => match ncgr::decode_standard(chunk, options.sprite_size) {
            Ok(grid) => Decoded::Sprite(grid),
            Err(e) => {
                tracing::warn!(error = %e, "sprite not decodable as a standard sprite");
                Decoded::Unrecognized
            }
        },
        _ => Decoded::Unrecognized,
    })
}

fn encrypted_part(chunk: &[u8], options: &DecodeOptions<'_>) -> Result<Decoded> {
    Ok(match ChunkKind::detect(chunk) {
        ChunkKind::Palette => Decoded::Palette(Nclr::parse(chunk)?.palette),
        ChunkKind::Sprite => {
            let cipher = options
                .cipher
                .ok_or(Error::MissingResource("sprite cipher parameters"))?;
            Decoded::Sprite(ncgr::decode_encrypted(
                chunk,
                options.encrypted_sprite_size,
                cipher,
                options.seed,
            )?)
        }
        _ => Decoded::Unrecognized,
    })
}

/// Pair every run of sprites with the run of palettes that follows it.
fn encrypted_sprites(chunks: &[&[u8]], options: &DecodeOptions<'_>) -> Result<Vec<Decoded>> {
    let mut out = Vec::new();
    let mut sprites: Vec<PixelGrid> = Vec::new();
    let mut palettes: Vec<Palette> = Vec::new();

    let mut flush = |sprites: &[PixelGrid], palettes: &[Palette]| {
        for sprite in sprites {
            for palette in palettes {
                out.push(Decoded::Image(render(
                    sprite,
                    Some(palette),
                    options.sprite_options(),
                )));
            }
        }
    };

    for chunk in chunks {
        match encrypted_part(chunk, options)? {
            Decoded::Palette(p) => palettes.push(p),
            Decoded::Sprite(s) if palettes.is_empty() => sprites.push(s),
            Decoded::Sprite(s) => {
                flush(&sprites, &palettes);
                sprites = vec![s];
                palettes.clear();
            }
            _ => {}
        }
    }
    flush(&sprites, &palettes);

    tracing::debug!(images = out.len(), "paired sprites with palettes");
    Ok(out)
}

fn texture(chunk: &[u8], options: &DecodeOptions<'_>) -> Result<Decoded> {
    if ChunkKind::detect(chunk) != ChunkKind::Texture {
        return Ok(Decoded::Unrecognized);
    }
    let container = Btx0::parse(chunk)?;
    let mosaic = container.tex0()?.mosaic(None)?;
    Ok(Decoded::Image(mosaic.render(options.depth)))
}
