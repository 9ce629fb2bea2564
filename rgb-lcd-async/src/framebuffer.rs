//! Panel frame buffer.
//!
//! Holds one frame of raw RGB565 words in scan-out order. The GUI flush
//! copies rendered areas in with [`FrameBuffer::draw_bitmap`]; the scan-out
//! side packs the whole frame into its DMA buffer with
//! [`FrameBuffer::write_le_bytes`].

use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};

/// Errors reported by [`FrameBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBufferError {
    /// The backing slice does not hold exactly `width * height` pixels.
    SizeMismatch {
        /// `width * height`.
        expected: usize,
        /// Length of the slice that was given.
        actual: usize,
    },
    /// The area lies partly or fully outside the panel.
    OutOfBounds,
    /// The source slice or its stride cannot cover the area.
    SourceTooShort,
    /// The destination byte buffer is smaller than the frame.
    DestinationTooShort,
}

/// A frame of RGB565 pixels backed by a borrowed slice.
pub struct FrameBuffer<'a> {
    pixels: &'a mut [u16],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    /// Wraps `pixels` as a `width` x `height` frame.
    pub fn new(pixels: &'a mut [u16], width: u32, height: u32) -> Result<Self, FrameBufferError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(FrameBufferError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// The raw pixel words, row by row.
    pub fn pixels(&self) -> &[u16] {
        self.pixels
    }

    /// Copies a rendered area into the frame.
    ///
    /// `src` starts at the area's top-left pixel; consecutive rows are
    /// `src_stride` elements apart. `to_raw` converts the GUI's pixel type
    /// into an RGB565 word. An empty area is a no-op.
    pub fn draw_bitmap<P: Copy>(
        &mut self,
        area: &Rectangle,
        src: &[P],
        src_stride: usize,
        to_raw: impl Fn(P) -> u16,
    ) -> Result<(), FrameBufferError> {
        if area.is_zero_sized() {
            return Ok(());
        }
        let (x, y, w, h) = self.checked_area(area)?;
        let needed = (h - 1)
            .checked_mul(src_stride)
            .and_then(|rows| rows.checked_add(w));
        match needed {
            Some(needed) if src_stride >= w && src.len() >= needed => {}
            _ => return Err(FrameBufferError::SourceTooShort),
        }

        let width = self.width as usize;
        for (row, src_row) in src.chunks(src_stride).take(h).enumerate() {
            let start = (y + row) * width + x;
            for (dst, px) in self.pixels[start..start + w].iter_mut().zip(&src_row[..w]) {
                *dst = to_raw(*px);
            }
        }
        Ok(())
    }

    /// Copies `area` out of a full-frame render buffer.
    ///
    /// Pixel `(x, y)` of the GUI frame sits at `render[y * render_stride + x]`,
    /// so the area is taken from the same place it lands on the panel.
    pub fn draw_from_render_buffer<P: Copy>(
        &mut self,
        area: &Rectangle,
        render: &[P],
        render_stride: usize,
        to_raw: impl Fn(P) -> u16,
    ) -> Result<(), FrameBufferError> {
        if area.is_zero_sized() {
            return Ok(());
        }
        let (x, y, _, _) = self.checked_area(area)?;
        let src = y
            .checked_mul(render_stride)
            .and_then(|row| row.checked_add(x))
            .and_then(|offset| render.get(offset..))
            .ok_or(FrameBufferError::SourceTooShort)?;
        self.draw_bitmap(area, src, render_stride, to_raw)
    }

    /// Packs the frame into `dst` as little-endian RGB565, the byte order
    /// the LCD peripheral shifts out in 16-bit mode.
    pub fn write_le_bytes(&self, dst: &mut [u8]) -> Result<(), FrameBufferError> {
        if dst.len() < self.pixels.len() * 2 {
            return Err(FrameBufferError::DestinationTooShort);
        }
        for (bytes, px) in dst.chunks_exact_mut(2).zip(self.pixels.iter()) {
            bytes.copy_from_slice(&px.to_le_bytes());
        }
        Ok(())
    }

    fn checked_area(&self, area: &Rectangle) -> Result<(usize, usize, usize, usize), FrameBufferError> {
        let Point { x, y } = area.top_left;
        let Size { width, height } = area.size;
        if x < 0
            || y < 0
            || (x as u32).saturating_add(width) > self.width
            || (y as u32).saturating_add(height) > self.height
        {
            return Err(FrameBufferError::OutOfBounds);
        }
        Ok((x as usize, y as usize, width as usize, height as usize))
    }
}

impl DrawTarget for FrameBuffer<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let width = self.width as usize;
        for Pixel(coord, color) in pixels.into_iter() {
            if let Ok((x, y)) = <(u32, u32)>::try_from(coord) {
                if x < self.width && y < self.height {
                    self.pixels[y as usize * width + x as usize] = RawU16::from(color).into_inner();
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.is_zero_sized() {
            return Ok(());
        }
        let raw = RawU16::from(color).into_inner();
        let width = self.width as usize;
        let x = area.top_left.x as usize;
        let w = area.size.width as usize;
        for y in area.rows() {
            let start = y as usize * width + x;
            self.pixels[start..start + w].fill(raw);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(RawU16::from(color).into_inner());
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer<'_> {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
