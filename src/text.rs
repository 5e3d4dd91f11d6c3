//! Text rendering and horizontal scrolling
//!
//! Strings become bitmaps through a [`Rasterizer`]. The [`ScrollEngine`]
//! moves such a bitmap across a band of rows one column per
//! [`tick`](ScrollEngine::tick), without sleeping, so the caller decides the
//! frame rate and can run other work between frames.
//!
//! The text's left edge is drawn at `viewport_width - offset`. A session
//! starts with the text just beyond the right edge and ends once it has left
//! on the left, which takes `bitmap_width + viewport_width` ticks.
//!
//! ## Example
//!
//! ```
//! use flipdot::{Bitmap, Rasterizer, ScrollEngine, ScrollState};
//!
//! /// Draws every character as a solid 2x3 block
//! struct Blocks;
//!
//! impl Rasterizer for Blocks {
//!     fn rasterize(&self, text: &str) -> Bitmap {
//!         let mut bitmap = Bitmap::new(2 * text.chars().count(), 3);
//!         bitmap.clear(flipdot::Dot::Set);
//!         bitmap
//!     }
//! }
//!
//! let mut buffer = Bitmap::new(10, 3);
//! let mut scroll = ScrollEngine::new(Blocks, buffer.width());
//! scroll.start("hi", 0, 3);
//!
//! let mut frames = 0;
//! while scroll.is_running() {
//!     scroll.tick(&mut buffer);
//!     frames += 1;
//! }
//! assert_eq!(frames, 4 + 10);
//! assert_eq!(scroll.state(), ScrollState::Idle);
//! ```

use crate::buffer::Bitmap;
use crate::dot::Dot;

/// Turns a string into a monochrome bitmap
///
/// The bitmap is sized to the rendered string. Characters the font cannot
/// show must come out as a placeholder glyph rather than an error.
pub trait Rasterizer {
    /// Render `text`
    fn rasterize(&self, text: &str) -> Bitmap;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    fn rasterize(&self, text: &str) -> Bitmap {
        (**self).rasterize(text)
    }
}

/// Scroll engine state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollState {
    /// No text is moving
    #[default]
    Idle,
    /// A session is in progress
    Scrolling,
}

/// One scrolling text animation
#[derive(Clone, Debug)]
struct ScrollSession {
    bitmap: Bitmap,
    /// Columns scrolled so far
    offset: usize,
    row: usize,
    /// Viewport-sized frame the text is drawn into
    window: Bitmap,
}

impl ScrollSession {
    fn end(&self, viewport_width: usize) -> usize {
        self.bitmap.width() + viewport_width
    }
}

/// Non-blocking horizontal text scroller
pub struct ScrollEngine<R> {
    rasterizer: R,
    viewport_width: usize,
    session: Option<ScrollSession>,
}

impl<R: Rasterizer> ScrollEngine<R> {
    /// Create an idle engine scrolling across `viewport_width` columns
    pub fn new(rasterizer: R, viewport_width: usize) -> Self {
        Self {
            rasterizer,
            viewport_width,
            session: None,
        }
    }

    /// Begin scrolling `text` through rows `viewport_row..viewport_row + viewport_height`
    ///
    /// Any session in progress is dropped. Rendered rows beyond
    /// `viewport_height` are cut off.
    pub fn start(&mut self, text: &str, viewport_row: usize, viewport_height: usize) {
        let mut bitmap = self.rasterizer.rasterize(text);
        bitmap.truncate_rows(viewport_height);

        if self.session.is_some() {
            log::debug!("scroll restarted");
        }
        log::debug!(
            "scrolling {} column(s) of text over {} tick(s)",
            bitmap.width(),
            bitmap.width() + self.viewport_width
        );

        self.session = Some(ScrollSession {
            bitmap,
            offset: 0,
            row: viewport_row,
            window: Bitmap::new(self.viewport_width, viewport_height),
        });
    }

    /// Advance one column and redraw the viewport into `buffer`
    ///
    /// Only columns `0..viewport_width` of the viewport rows are written.
    /// Does nothing when idle. Returns the state after the step.
    pub fn tick(&mut self, buffer: &mut Bitmap) -> ScrollState {
        let Some(session) = self.session.as_mut() else {
            return ScrollState::Idle;
        };

        session.offset += 1;

        let left = to_i32(self.viewport_width).saturating_sub(to_i32(session.offset));
        session.window.clear(Dot::Unset);
        session.window.blit(&session.bitmap, 0, left);
        buffer.blit(&session.window, to_i32(session.row), 0);

        if session.offset >= session.end(self.viewport_width) {
            log::debug!("scroll finished");
            self.session = None;
            return ScrollState::Idle;
        }
        ScrollState::Scrolling
    }

    /// Whether a session is in progress
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Current state
    pub fn state(&self) -> ScrollState {
        if self.is_running() {
            ScrollState::Scrolling
        } else {
            ScrollState::Idle
        }
    }

    /// Columns scrolled in the current session
    pub fn offset(&self) -> Option<usize> {
        self.session.as_ref().map(|session| session.offset)
    }

    /// Width of the band the text moves through
    pub fn viewport_width(&self) -> usize {
        self.viewport_width
    }

    /// The rasterizer used by [`start`](Self::start)
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }
}

/// Draw `text` horizontally centered with its top at `row`
///
/// Text wider than the buffer is clipped evenly on both sides.
pub fn draw_centered<R: Rasterizer + ?Sized>(
    buffer: &mut Bitmap,
    rasterizer: &R,
    row: usize,
    text: &str,
) {
    let bitmap = rasterizer.rasterize(text);
    let left = (to_i32(buffer.width()) - to_i32(bitmap.width())) / 2;
    buffer.blit(&bitmap, to_i32(row), left);
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renders each character as a `width`-wide column pattern; 'x' is a
    /// full block, anything else a single dot in the top-left corner.
    struct FixedRasterizer {
        width: usize,
        height: usize,
    }

    impl Rasterizer for FixedRasterizer {
        fn rasterize(&self, text: &str) -> Bitmap {
            let mut bitmap = Bitmap::new(self.width * text.chars().count(), self.height);
            for (i, ch) in text.chars().enumerate() {
                let left = i * self.width;
                if ch == 'x' {
                    for row in 0..self.height {
                        for col in left..left + self.width {
                            bitmap.set(row, col, Dot::Set).unwrap();
                        }
                    }
                } else {
                    bitmap.set(0, left, Dot::Set).unwrap();
                }
            }
            bitmap
        }
    }

    fn engine(viewport_width: usize) -> ScrollEngine<FixedRasterizer> {
        ScrollEngine::new(
            FixedRasterizer {
                width: 2,
                height: 3,
            },
            viewport_width,
        )
    }

    #[test]
    fn test_lifecycle_takes_width_plus_viewport_ticks() {
        let mut scroll = engine(5);
        let mut buffer = Bitmap::new(5, 3);
        scroll.start("xxx", 0, 3);

        let mut ticks = 0;
        while scroll.is_running() {
            assert_eq!(scroll.state(), ScrollState::Scrolling);
            scroll.tick(&mut buffer);
            ticks += 1;
            assert!(ticks <= 11, "scroll never finished");
        }
        assert_eq!(ticks, 6 + 5);
        assert_eq!(scroll.state(), ScrollState::Idle);
    }

    #[test]
    fn test_text_enters_from_the_right() {
        let mut scroll = engine(5);
        let mut buffer = Bitmap::new(5, 3);
        scroll.start("x", 0, 3);

        assert_eq!(scroll.tick(&mut buffer), ScrollState::Scrolling);
        assert_eq!(scroll.offset(), Some(1));
        assert_eq!(buffer.get(0, 4), Ok(Dot::Set));
        assert_eq!(buffer.get(0, 3), Ok(Dot::Unset));
        assert_eq!(buffer.count_set(), 3);

        scroll.tick(&mut buffer);
        assert_eq!(buffer.get(1, 3), Ok(Dot::Set));
        assert_eq!(buffer.count_set(), 6);
    }

    #[test]
    fn test_last_frame_leaves_viewport_blank() {
        let mut scroll = engine(4);
        let mut buffer = Bitmap::new(4, 3);
        scroll.start("x", 0, 3);

        let mut last = ScrollState::Scrolling;
        for _ in 0..6 {
            last = scroll.tick(&mut buffer);
        }
        assert_eq!(last, ScrollState::Idle);
        assert_eq!(buffer.count_set(), 0);
    }

    #[test]
    fn test_tick_when_idle_is_noop() {
        let mut scroll = engine(4);
        let mut buffer = Bitmap::new(4, 3);
        buffer.set(1, 1, Dot::Set).unwrap();

        assert_eq!(scroll.tick(&mut buffer), ScrollState::Idle);
        assert_eq!(buffer.get(1, 1), Ok(Dot::Set));
        assert_eq!(scroll.offset(), None);
    }

    #[test]
    fn test_viewport_rows_only() {
        let mut scroll = engine(4);
        let mut buffer = Bitmap::new(4, 6);
        buffer.clear(Dot::Set);
        scroll.start("ab", 2, 2);
        scroll.tick(&mut buffer);

        // Rows outside the band keep their content
        for row in [0, 1, 4, 5] {
            assert!((0..4).all(|col| buffer.get(row, col) == Ok(Dot::Set)));
        }
        // Inside the band only the glyph's corner dot is set
        assert_eq!(buffer.get(2, 3), Ok(Dot::Set));
        assert_eq!(buffer.get(2, 2), Ok(Dot::Unset));
        assert_eq!(buffer.get(3, 3), Ok(Dot::Unset));
    }

    #[test]
    fn test_viewport_narrower_than_buffer() {
        let mut scroll = engine(4);
        let mut buffer = Bitmap::new(10, 3);
        buffer.set(0, 7, Dot::Set).unwrap();
        scroll.start("xxxx", 0, 3);

        // Columns right of the viewport keep their own content
        let untouched = |buffer: &Bitmap| {
            (0..3).all(|row| {
                (4..10).all(|col| buffer.get(row, col) == Ok(Dot::from(row == 0 && col == 7)))
            })
        };

        scroll.tick(&mut buffer);
        assert!((0..3).all(|row| buffer.get(row, 3) == Ok(Dot::Set)));
        assert!(untouched(&buffer));

        let mut ticks = 1;
        while scroll.is_running() {
            scroll.tick(&mut buffer);
            ticks += 1;
            assert!(untouched(&buffer));
        }
        assert_eq!(ticks, 8 + 4);
        assert_eq!(buffer.count_set(), 1);
    }

    #[test]
    fn test_bitmap_cropped_to_viewport_height() {
        let mut scroll = engine(2);
        let mut buffer = Bitmap::new(2, 4);
        scroll.start("x", 0, 1);
        scroll.tick(&mut buffer);
        scroll.tick(&mut buffer);

        assert_eq!(buffer.count_set(), 2);
        assert!((0..2).all(|col| buffer.get(0, col) == Ok(Dot::Set)));
    }

    #[test]
    fn test_start_discards_running_session() {
        let mut scroll = engine(4);
        let mut buffer = Bitmap::new(4, 3);
        scroll.start("xxxx", 0, 3);
        for _ in 0..5 {
            scroll.tick(&mut buffer);
        }

        scroll.start("x", 0, 3);
        assert_eq!(scroll.offset(), Some(0));

        let mut ticks = 0;
        while scroll.is_running() {
            scroll.tick(&mut buffer);
            ticks += 1;
        }
        assert_eq!(ticks, 2 + 4);
    }

    #[test]
    fn test_empty_text_scrolls_for_viewport_width() {
        let mut scroll = engine(3);
        let mut buffer = Bitmap::new(3, 3);
        scroll.start("", 0, 3);

        let mut ticks = 0;
        while scroll.is_running() {
            scroll.tick(&mut buffer);
            ticks += 1;
        }
        assert_eq!(ticks, 3);
    }

    #[test]
    fn test_draw_centered() {
        let rasterizer = FixedRasterizer {
            width: 2,
            height: 3,
        };
        let mut buffer = Bitmap::new(8, 4);
        draw_centered(&mut buffer, &rasterizer, 1, "xx");

        assert_eq!(buffer.count_set(), 12);
        assert_eq!(buffer.get(1, 1), Ok(Dot::Unset));
        assert_eq!(buffer.get(1, 2), Ok(Dot::Set));
        assert_eq!(buffer.get(3, 5), Ok(Dot::Set));
        assert_eq!(buffer.get(1, 6), Ok(Dot::Unset));
        assert_eq!(buffer.get(0, 2), Ok(Dot::Unset));
    }

    #[test]
    fn test_draw_centered_clips_wide_text() {
        let rasterizer = FixedRasterizer {
            width: 2,
            height: 1,
        };
        let mut buffer = Bitmap::new(4, 1);
        draw_centered(&mut buffer, &rasterizer, 0, "xxxx");
        assert_eq!(buffer.count_set(), 4);
    }
}
