//! Engine-independent raster and point types
//!
//! Every generator works on `PixelBuffer`, a plain RGBA8 row-major buffer. Conversion
//! to and from encoded images happens only at the I/O edge.

use crate::io::error::{Result, invalid_parameter};

/// Channels stored per pixel (RGBA)
pub const CHANNELS: usize = 4;

/// A single RGBA pixel
pub type Rgba = [u8; 4];

/// Fully transparent black, returned for out-of-range reads
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Owned RGBA8 raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a transparent buffer
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * CHANNELS],
        }
    }

    /// Create a buffer with every pixel set to `color`
    pub fn filled(width: usize, height: usize, color: Rgba) -> Self {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap existing RGBA8 data
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not hold exactly `width * height * 4` bytes
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * CHANNELS;
        if data.len() != expected {
            return Err(invalid_parameter(
                "data",
                &data.len(),
                &format!("expected {expected} bytes for a {width}x{height} RGBA buffer"),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Channels per pixel
    pub const fn channels(&self) -> usize {
        CHANNELS
    }

    /// Raw RGBA8 bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the raw bytes
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// True when the buffer has no pixels
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the byte length agrees with the dimensions
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.width * self.height * CHANNELS
    }

    /// Read a pixel, `None` when out of bounds
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * CHANNELS;
        let px = self.data.get(offset..offset + CHANNELS)?;
        Rgba::try_from(px).ok()
    }

    /// Read a pixel with toroidal wrap-around
    pub fn pixel_wrapped(&self, x: i64, y: i64) -> Rgba {
        if self.is_empty() {
            return TRANSPARENT;
        }
        let wx = x.rem_euclid(self.width as i64) as usize;
        let wy = y.rem_euclid(self.height as i64) as usize;
        self.pixel(wx, wy).unwrap_or(TRANSPARENT)
    }

    /// Write a pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y * self.width + x) * CHANNELS;
        if let Some(px) = self.data.get_mut(offset..offset + CHANNELS) {
            px.copy_from_slice(&color);
        }
    }

    /// Iterate pixels in row-major order as `(x, y, rgba)`
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, Rgba)> + '_ {
        let width = self.width.max(1);
        self.data
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(move |(i, px)| {
                let rgba = Rgba::try_from(px).unwrap_or(TRANSPARENT);
                (i % width, i / width, rgba)
            })
    }

    /// Copy `source` into this buffer with its top-left corner at `(x0, y0)`
    pub fn blit(&mut self, source: &Self, x0: usize, y0: usize) {
        for y in 0..source.height {
            let ty = y0 + y;
            if ty >= self.height {
                break;
            }
            let copy_width = source.width.min(self.width.saturating_sub(x0));
            if copy_width == 0 {
                return;
            }
            let src_start = y * source.width * CHANNELS;
            let dst_start = (ty * self.width + x0) * CHANNELS;
            let bytes = copy_width * CHANNELS;
            if let (Some(src), Some(dst)) = (
                source.data.get(src_start..src_start + bytes),
                self.data.get_mut(dst_start..dst_start + bytes),
            ) {
                dst.copy_from_slice(src);
            }
        }
    }

    /// Nearest-neighbour resample
    pub fn resize_nearest(&self, width: usize, height: usize) -> Self {
        let mut out = Self::new(width, height);
        if self.is_empty() {
            return out;
        }
        for y in 0..height {
            let sy = y * self.height / height.max(1);
            for x in 0..width {
                let sx = x * self.width / width.max(1);
                out.set_pixel(x, y, self.pixel(sx, sy).unwrap_or(TRANSPARENT));
            }
        }
        out
    }

    /// Box-filtered downsample (falls back to nearest when upscaling)
    pub fn downsample_box(&self, width: usize, height: usize) -> Self {
        if self.is_empty() || width == 0 || height == 0 {
            return Self::new(width, height);
        }
        if width > self.width || height > self.height {
            return self.resize_nearest(width, height);
        }
        let mut out = Self::new(width, height);
        for y in 0..height {
            let sy0 = y * self.height / height;
            let sy1 = ((y + 1) * self.height / height).max(sy0 + 1);
            for x in 0..width {
                let sx0 = x * self.width / width;
                let sx1 = ((x + 1) * self.width / width).max(sx0 + 1);
                let mut sums = [0u64; CHANNELS];
                let mut count = 0u64;
                for sy in sy0..sy1 {
                    for sx in sx0..sx1 {
                        if let Some(px) = self.pixel(sx, sy) {
                            for (sum, value) in sums.iter_mut().zip(px) {
                                *sum += u64::from(value);
                            }
                            count += 1;
                        }
                    }
                }
                let count = count.max(1);
                out.set_pixel(x, y, sums.map(|sum| (sum / count) as u8));
            }
        }
        out
    }

    /// Rotate contents by `(dx, dy)` pixels with wrap-around
    pub fn offset_wrapped(&self, dx: i64, dy: i64) -> Self {
        let mut out = Self::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set_pixel(x, y, self.pixel_wrapped(x as i64 - dx, y as i64 - dy));
            }
        }
        out
    }
}

/// A 2D point in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return this point shifted by `(dx, dy)`
    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
