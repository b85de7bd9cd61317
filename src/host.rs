//! Host-side image contract: image handles, tiles, in-memory images and the
//! plugin trait formats implement.

use crate::config::SaveOptions;
use crate::error::{Error, Result};
use crate::types::{ColorMode, ImageMode};
use imgref::{ImgRef, ImgVec};
use rgb::{RGB8, RGBA8};
use std::borrow::Cow;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use whereat::*;

/// Decoder name for tiles that are plain packed pixel rows.
pub const RAW_DECODER: &str = "raw";

/// Placement of pixel data within an opened image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Name of the tile decoder (`"raw"` for packed rows).
    pub decoder: &'static str,
    /// Region covered, as `(x0, y0, x1, y1)` with exclusive end.
    pub extent: (u32, u32, u32, u32),
    /// Byte offset of the first row in the image's pixel source.
    pub offset: u64,
    /// Layout of the bytes in the pixel source.
    pub mode: ImageMode,
}

impl Tile {
    /// A raw tile covering a whole `width` x `height` image at offset 0.
    #[must_use]
    pub fn raw(width: u32, height: u32, mode: ImageMode) -> Self {
        Self {
            decoder: RAW_DECODER,
            extent: (0, 0, width, height),
            offset: 0,
            mode,
        }
    }

    /// Width and height of the region.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        let (x0, y0, x1, y1) = self.extent;
        (x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// An opened image: header information plus tiles describing where the
/// pixels come from.
///
/// The pixel source is an in-memory reader over the decoded buffer; no
/// filesystem is involved.
#[derive(Debug)]
pub struct ImageFile {
    format: &'static str,
    description: &'static str,
    mode: ColorMode,
    size: (u32, u32),
    tiles: Vec<Tile>,
    fp: Cursor<Vec<u8>>,
}

impl ImageFile {
    /// Wrap a decoded, packed buffer as a single raw tile.
    pub(crate) fn from_decoded(
        format: &'static str,
        description: &'static str,
        mode: ColorMode,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Self {
        Self {
            format,
            description,
            mode,
            size: (width, height),
            tiles: vec![Tile::raw(width, height, mode.image_mode())],
            fp: Cursor::new(pixels),
        }
    }

    /// Format tag of the plugin that opened this image.
    #[must_use]
    pub fn format(&self) -> &'static str {
        self.format
    }

    /// Human-readable format description.
    #[must_use]
    pub fn format_description(&self) -> &'static str {
        self.description
    }

    /// Host pixel mode.
    #[must_use]
    pub fn mode(&self) -> ImageMode {
        self.mode.image_mode()
    }

    /// Pixel layout of the decoded data.
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.mode
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Tile descriptors.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// The pixel source tiles refer to.
    pub fn reader(&mut self) -> &mut (impl Read + Seek) {
        &mut self.fp
    }

    /// Read every tile into an in-memory [`Image`].
    pub fn load(mut self) -> Result<Image> {
        let (width, height) = self.size;
        let mode = self.mode();
        let bpp = mode.bytes_per_pixel();
        let stride = width as usize * bpp;
        let mut data = vec![0u8; stride * height as usize];

        for tile in &self.tiles {
            if tile.decoder != RAW_DECODER {
                return Err(at!(Error::InvalidInput(format!(
                    "unknown tile decoder {:?}",
                    tile.decoder
                ))));
            }
            let (x0, y0, x1, y1) = tile.extent;
            if x1 > width || y1 > height || x0 > x1 || y0 > y1 {
                return Err(at!(Error::InvalidInput(format!(
                    "tile {:?} outside {}x{} image",
                    tile.extent, width, height
                ))));
            }

            let row_len = (x1 - x0) as usize * bpp;
            self.fp
                .seek(SeekFrom::Start(tile.offset))
                .map_err(|e| at!(Error::from(e)))?;
            for y in y0..y1 {
                let start = y as usize * stride + x0 as usize * bpp;
                self.fp
                    .read_exact(&mut data[start..start + row_len])
                    .map_err(|e| at!(Error::from(e)))?;
            }
        }

        log::trace!(
            "loaded {} tile(s) into {}x{} {} image",
            self.tiles.len(),
            width,
            height,
            mode
        );
        Image::new(mode, width, height, data)
    }
}

/// An in-memory image as the host holds it.
///
/// Rows are `stride` bytes apart; bytes past `width * bytes_per_pixel` in a
/// row are padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    mode: ImageMode,
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl Image {
    /// Create an image from packed rows.
    pub fn new(mode: ImageMode, width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let stride = checked_row_bytes(mode, width)?;
        Self::with_stride(mode, width, height, stride, data)
    }

    /// Create an image whose rows are `stride` bytes apart.
    pub fn with_stride(
        mode: ImageMode,
        width: u32,
        height: u32,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        let row = checked_row_bytes(mode, width)?;
        if stride < row {
            return Err(at!(Error::InvalidInput(format!(
                "stride too small: got {}, minimum {}",
                stride, row
            ))));
        }
        let required = match height as usize {
            0 => 0,
            h => stride
                .checked_mul(h - 1)
                .and_then(|n| n.checked_add(row))
                .ok_or_else(|| {
                    at!(Error::InvalidInput(format!(
                        "stride {} overflows for {} rows",
                        stride, height
                    )))
                })?,
        };
        if data.len() < required {
            return Err(at!(Error::InvalidInput(format!(
                "buffer too small: got {}, need {} ({} rows, stride {})",
                data.len(),
                required,
                height,
                stride
            ))));
        }
        Ok(Self {
            mode,
            width,
            height,
            stride,
            data,
        })
    }

    /// Copy an RGB image.
    #[must_use]
    pub fn from_rgb(img: ImgRef<'_, RGB8>) -> Self {
        let mut data = Vec::with_capacity(img.width() * img.height() * 3);
        for row in img.rows() {
            data.extend(row.iter().flat_map(|p| [p.r, p.g, p.b]));
        }
        Self {
            mode: ImageMode::Rgb,
            width: img.width() as u32,
            height: img.height() as u32,
            stride: img.width() * 3,
            data,
        }
    }

    /// Copy an RGBA image.
    #[must_use]
    pub fn from_rgba(img: ImgRef<'_, RGBA8>) -> Self {
        let mut data = Vec::with_capacity(img.width() * img.height() * 4);
        for row in img.rows() {
            data.extend(row.iter().flat_map(|p| [p.r, p.g, p.b, p.a]));
        }
        Self {
            mode: ImageMode::Rgba,
            width: img.width() as u32,
            height: img.height() as u32,
            stride: img.width() * 4,
            data,
        }
    }

    /// Pixel mode.
    #[must_use]
    pub fn mode(&self) -> ImageMode {
        self.mode
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes between the starts of consecutive rows.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw storage, padding included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn row_bytes(&self) -> usize {
        self.width as usize * self.mode.bytes_per_pixel()
    }

    /// Rows without padding, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let row = self.row_bytes();
        (0..self.height as usize).map(move |y| {
            let start = y * self.stride;
            &self.data[start..start + row]
        })
    }

    /// Pixels as one contiguous run of rows.
    ///
    /// Borrows when the rows are already packed.
    #[must_use]
    pub fn to_packed(&self) -> Cow<'_, [u8]> {
        let row = self.row_bytes();
        let packed_len = row * self.height as usize;
        if self.stride == row || self.height <= 1 {
            return Cow::Borrowed(&self.data[..packed_len]);
        }
        let mut out = Vec::with_capacity(packed_len);
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        Cow::Owned(out)
    }

    /// Copy out as RGB pixels; `None` unless the mode is RGB.
    #[must_use]
    pub fn to_rgb_img(&self) -> Option<ImgVec<RGB8>> {
        if self.mode != ImageMode::Rgb {
            return None;
        }
        let pixels: Vec<RGB8> = self
            .to_packed()
            .chunks_exact(3)
            .map(|c| RGB8::new(c[0], c[1], c[2]))
            .collect();
        Some(ImgVec::new(pixels, self.width as usize, self.height as usize))
    }

    /// Copy out as RGBA pixels; `None` unless the mode is RGBA.
    #[must_use]
    pub fn to_rgba_img(&self) -> Option<ImgVec<RGBA8>> {
        if self.mode != ImageMode::Rgba {
            return None;
        }
        let pixels: Vec<RGBA8> = self
            .to_packed()
            .chunks_exact(4)
            .map(|c| RGBA8::new(c[0], c[1], c[2], c[3]))
            .collect();
        Some(ImgVec::new(pixels, self.width as usize, self.height as usize))
    }
}

/// A file format the host can open and save.
pub trait FormatPlugin: Send + Sync {
    /// Format tag, e.g. `"WEBP"`.
    fn format(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Canonical extension including the dot.
    fn extension(&self) -> &'static str;

    /// MIME type.
    fn mime(&self) -> &'static str;

    /// Whether `prefix` (the first bytes of a file) looks like this format.
    fn accept(&self, prefix: &[u8]) -> bool;

    /// Read an image from `reader`.
    fn open(&self, reader: &mut dyn Read) -> Result<ImageFile>;

    /// Write `image` to `writer`.
    fn save(&self, image: &Image, options: &SaveOptions, writer: &mut dyn Write) -> Result<()>;
}

fn checked_row_bytes(mode: ImageMode, width: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(mode.bytes_per_pixel())
        .ok_or_else(|| at!(Error::InvalidInput(format!("width {} overflows a row", width))))
}
