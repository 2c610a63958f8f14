//! Asset codecs: PPM/PGM bitmaps, GBR brush stamps, and an `image` bridge
//!
//! PPM/PGM and GBR are parsed by hand because their byte layout is part of
//! the engine contract (the PPM writer must round-trip the reader exactly).
//! Anything else is handed to the `image` crate.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::Raster;
use crate::error::LoadError;

/// Magic number of the binary brush stamp header ("GIMP").
const GBR_MAGIC: u32 = 0x4749_4D50;
/// Fixed portion of the brush header: 7 big-endian u32 fields.
const GBR_FIXED_HEADER: usize = 28;

/// Result of a lenient decode.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The asset decoded cleanly.
    Loaded(Raster),
    /// The asset was undecodable; a black placeholder is substituted so the
    /// pipeline keeps running.
    Degraded(Raster, LoadError),
}

impl LoadOutcome {
    /// The raster, whether decoded or substituted.
    pub fn into_raster(self) -> Raster {
        match self {
            Self::Loaded(r) | Self::Degraded(r, _) => r,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(..))
    }
}

/// Decode an asset, dispatching on its magic bytes: raw PPM/PGM, the binary
/// brush stamp format, or any format the `image` crate recognizes.
pub fn decode(bytes: &[u8]) -> Result<Raster, LoadError> {
    if bytes.starts_with(b"P6") || bytes.starts_with(b"P5") {
        return decode_pnm(bytes);
    }
    if bytes.len() >= GBR_FIXED_HEADER && &bytes[20..24] == b"GIMP" {
        return decode_gbr(bytes);
    }
    let img = image::load_from_memory(bytes)?;
    Ok(Raster::from_dynamic(&img))
}

/// Lenient decode: never fails, degrading to a 10x10 black placeholder with
/// the reason attached. The strict path is `decode`.
pub fn decode_lenient(bytes: &[u8]) -> LoadOutcome {
    match decode(bytes) {
        Ok(r) => LoadOutcome::Loaded(r),
        Err(e) => {
            tracing::warn!("asset decode failed, substituting placeholder: {e}");
            LoadOutcome::Degraded(Raster::placeholder(), e)
        }
    }
}

struct Tokens<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Next whitespace-delimited token, skipping `#` comment lines.
    fn next(&mut self) -> Result<&'a str, LoadError> {
        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= self.bytes.len() {
                return Err(LoadError::InvalidHeader("unexpected end of header".into()));
            }
            if self.bytes[self.pos] == b'#' {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            let start = self.pos;
            while self.pos < self.bytes.len() && !self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            return std::str::from_utf8(&self.bytes[start..self.pos])
                .map_err(|_| LoadError::InvalidHeader("non-ASCII header token".into()));
        }
    }

    fn next_usize(&mut self) -> Result<usize, LoadError> {
        let tok = self.next()?;
        tok.parse::<usize>()
            .map_err(|_| LoadError::InvalidHeader(format!("expected number, got {tok:?}")))
    }
}

fn decode_pnm(bytes: &[u8]) -> Result<Raster, LoadError> {
    let mut toks = Tokens::new(bytes);
    let magic = toks.next()?;
    let channels = match magic {
        "P6" => 3,
        "P5" => 1,
        other => return Err(LoadError::UnsupportedFormat(format!("magic {other:?}"))),
    };
    let width = toks.next_usize()?;
    let height = toks.next_usize()?;
    let maxval = toks.next_usize()?;
    if width == 0 || height == 0 {
        return Err(LoadError::InvalidHeader(format!(
            "degenerate dimensions {width}x{height}"
        )));
    }
    if maxval != 255 {
        return Err(LoadError::UnsupportedFormat(format!("maxval {maxval}")));
    }
    // A single whitespace byte separates the header from the payload.
    let start = toks.pos + 1;
    let expected = width * height * channels;
    let avail = bytes.len().saturating_sub(start);
    if avail < expected {
        return Err(LoadError::Truncated {
            expected,
            actual: avail,
        });
    }
    let payload = &bytes[start..start + expected];
    let data = if channels == 3 {
        payload.to_vec()
    } else {
        // Grayscale expands by channel replication.
        let mut rgb = Vec::with_capacity(expected * 3);
        for &v in payload {
            rgb.extend_from_slice(&[v, v, v]);
        }
        rgb
    };
    Raster::from_rgb_bytes(width, height, data)
        .ok_or_else(|| LoadError::InvalidHeader("inconsistent dimensions".into()))
}

fn decode_gbr(bytes: &[u8]) -> Result<Raster, LoadError> {
    let mut cur = Cursor::new(bytes);
    let header_size = cur.read_u32::<BigEndian>()? as usize;
    let _version = cur.read_u32::<BigEndian>()?;
    let width = cur.read_u32::<BigEndian>()? as usize;
    let height = cur.read_u32::<BigEndian>()? as usize;
    let bytes_per_pixel = cur.read_u32::<BigEndian>()?;
    let magic = cur.read_u32::<BigEndian>()?;
    let _spacing = cur.read_u32::<BigEndian>()?;

    if magic != GBR_MAGIC {
        return Err(LoadError::InvalidHeader(format!(
            "bad brush magic 0x{magic:08x}"
        )));
    }
    if bytes_per_pixel != 1 {
        return Err(LoadError::UnsupportedFormat(format!(
            "{bytes_per_pixel} bytes per pixel"
        )));
    }
    if header_size < GBR_FIXED_HEADER || header_size > bytes.len() {
        return Err(LoadError::InvalidHeader(format!(
            "header size {header_size}"
        )));
    }
    if width == 0 || height == 0 {
        return Err(LoadError::InvalidHeader(format!(
            "degenerate dimensions {width}x{height}"
        )));
    }
    let expected = width * height;
    let avail = bytes.len() - header_size;
    if avail < expected {
        return Err(LoadError::Truncated {
            expected,
            actual: avail,
        });
    }
    let mask = &bytes[header_size..header_size + expected];
    let mut rgb = Vec::with_capacity(expected * 3);
    for &v in mask {
        rgb.extend_from_slice(&[v, v, v]);
    }
    tracing::debug!("brush stamp decoded: {width}x{height}, header {header_size} bytes");
    Raster::from_rgb_bytes(width, height, rgb)
        .ok_or_else(|| LoadError::InvalidHeader("inconsistent dimensions".into()))
}

impl Raster {
    /// Serialize as a raw PPM: `P6`, dimensions, maxval 255, payload. The
    /// reader round-trips this byte-exactly.
    pub fn to_ppm_bytes(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width(), self.height());
        let mut out = Vec::with_capacity(header.len() + self.data().len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(self.data());
        out
    }

    /// Convert any `image` crate image into an RGB raster.
    pub fn from_dynamic(img: &image::DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        Self::from_rgb_bytes(w, h, rgb.into_raw()).unwrap_or_else(Raster::placeholder)
    }

    /// View as an `image` crate buffer (copies).
    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_raw(self.width() as u32, self.height() as u32, self.data().to_vec())
            .unwrap_or_else(|| image::RgbImage::new(1, 1))
    }
}
