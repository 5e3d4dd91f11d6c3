//! Graphics support via embedded-graphics
//!
//! [`Bitmap`] implements [`DrawTarget`], so the pixel buffer of a
//! [`FlipDot`](crate::FlipDot) can be drawn on with any embedded-graphics
//! primitive. [`MonoRasterizer`] turns strings into bitmaps with a
//! [`MonoFont`] for the scroll engine.
//!
//! ## Example
//!
//! ```
//! use embedded_graphics::{
//!     mono_font::{ascii::FONT_5X8, MonoTextStyle},
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//!     text::{Baseline, Text},
//! };
//! use flipdot::{Bitmap, Dot};
//!
//! let mut buffer = Bitmap::new(84, 16);
//!
//! Rectangle::new(Point::new(0, 0), Size::new(84, 16))
//!     .into_styled(PrimitiveStyle::with_stroke(Dot::Set, 1))
//!     .draw(&mut buffer)?;
//!
//! let style = MonoTextStyle::new(&FONT_5X8, Dot::Set);
//! Text::with_baseline("Hi", Point::new(4, 4), style, Baseline::Top).draw(&mut buffer)?;
//! assert_eq!(buffer.get(0, 0), Ok(Dot::Set));
//! # Ok::<(), core::convert::Infallible>(())
//! ```

use core::convert::Infallible;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics_core::Drawable;
use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{OriginDimensions, Point, Size};
use embedded_graphics_core::Pixel;

use crate::buffer::Bitmap;
use crate::dot::Dot;
use crate::text::Rasterizer;

impl DrawTarget for Bitmap {
    type Color = Dot;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = (self.width(), self.height());

        for Pixel(Point { x, y }, dot) in pixels {
            if x < 0 || y < 0 {
                continue;
            }

            let (col, row) = (x as usize, y as usize);
            if col >= width || row >= height {
                continue;
            }

            self.put(row, col, dot);
        }

        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        Bitmap::clear(self, color);
        Ok(())
    }
}

impl OriginDimensions for Bitmap {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

/// Renders text with an embedded-graphics monospaced font
///
/// The bitmap is exactly as wide as the rendered string and as tall as the
/// font's character cell. Characters the font lacks are drawn with its
/// replacement glyph.
#[derive(Clone, Copy)]
pub struct MonoRasterizer<'a> {
    font: &'a MonoFont<'a>,
}

impl<'a> MonoRasterizer<'a> {
    /// Rasterize with `font`
    pub fn new(font: &'a MonoFont<'a>) -> Self {
        Self { font }
    }

    /// The font in use
    pub fn font(&self) -> &'a MonoFont<'a> {
        self.font
    }
}

impl Rasterizer for MonoRasterizer<'_> {
    fn rasterize(&self, text: &str) -> Bitmap {
        let style = MonoTextStyle::new(self.font, Dot::Set);
        let metrics = style.measure_string(text, Point::zero(), Baseline::Top);
        let width = metrics.bounding_box.size.width as usize;
        let height = self.font.character_size.height as usize;

        let mut bitmap = Bitmap::new(width, height);
        let Ok(_) = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut bitmap);
        bitmap
    }
}
