//! Pixel surface the renderer draws on

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use qrgen_core::{CodeError, CodeResult};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A drawable RGBA pixel buffer.
///
/// A freshly created or cleared surface has every byte set to zero, which is
/// what the blank-check looks for.
pub trait RenderSurface: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Reset every pixel to zero without changing the size
    fn clear(&mut self);

    /// Change the size. Contents are discarded and the surface is left blank.
    fn resize(&mut self, width: u32, height: u32);

    /// Paint a rectangle, clipped to the surface bounds
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>);

    /// Raw RGBA bytes, row-major
    fn pixels(&self) -> &[u8];

    /// PNG encoding of the current contents
    fn to_encoded_image(&self) -> CodeResult<Vec<u8>>;
}

/// Whether nothing has been drawn: every byte of the buffer is zero.
pub fn is_blank(surface: &dyn RenderSurface) -> bool {
    surface.pixels().iter().all(|&b| b == 0)
}

/// [`RenderSurface`] backed by an in-memory [`RgbaImage`]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

impl RenderSurface for RasterSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn clear(&mut self) {
        for byte in self.image.iter_mut() {
            *byte = 0;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
        let x_end = x.saturating_add(width).min(self.image.width());
        let y_end = y.saturating_add(height).min(self.image.height());
        for py in y..y_end {
            for px in x..x_end {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    fn to_encoded_image(&self) -> CodeResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| CodeError::Internal(format!("PNG encoding failed: {}", e)))?;
        Ok(buffer.into_inner())
    }
}
