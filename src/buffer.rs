//! Bit-packed dot buffers
//!
//! [`Bitmap`] stores a width×height grid of [`Dot`]s, one bit per dot, rows
//! packed most-significant bit first. It serves both as the display's pixel
//! buffer ([`PixelBuffer`]) and as the output of text rasterization.
//!
//! ## Example
//!
//! ```
//! use flipdot::{Bitmap, Dot};
//!
//! let mut buffer = Bitmap::new(4, 2);
//! buffer.set(1, 3, Dot::Set)?;
//! assert_eq!(buffer.get(1, 3)?, Dot::Set);
//! assert!(buffer.get(2, 0).is_err());
//!
//! // Blitting clips content that falls off the edge
//! let mut glyph = Bitmap::new(3, 1);
//! glyph.clear(Dot::Set);
//! buffer.blit(&glyph, 0, -2);
//! assert_eq!(buffer.get(0, 0)?, Dot::Set);
//! assert_eq!(buffer.get(0, 1)?, Dot::Unset);
//! # Ok::<(), flipdot::IndexError>(())
//! ```

use alloc::vec;
use alloc::vec::Vec;

use crate::dot::Dot;
use crate::error::IndexError;

/// The display's pixel buffer
pub type PixelBuffer = Bitmap;

/// Monochrome bitmap
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    /// Bytes per row
    stride: usize,
    bits: Vec<u8>,
}

impl Bitmap {
    /// Create a bitmap with every dot unset
    pub fn new(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(8);
        Self {
            width,
            height,
            stride,
            bits: vec![0; stride * height],
        }
    }

    /// Width in dots
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in dots
    pub fn height(&self) -> usize {
        self.height
    }

    /// State of the dot at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Result<Dot, IndexError> {
        self.check(row, col)?;
        Ok(self.dot(row, col))
    }

    /// Set the dot at `(row, col)`
    pub fn set(&mut self, row: usize, col: usize, dot: Dot) -> Result<(), IndexError> {
        self.check(row, col)?;
        self.put(row, col, dot);
        Ok(())
    }

    /// Set every dot to `dot`
    pub fn clear(&mut self, dot: Dot) {
        let fill = if dot.is_set() { 0xFF } else { 0x00 };
        self.bits.fill(fill);
    }

    /// Copy `src` so its top-left dot lands on `(row, col)`
    ///
    /// Both set and unset dots are copied. Whatever falls outside this bitmap
    /// is dropped.
    pub fn blit(&mut self, src: &Bitmap, row: i32, col: i32) {
        for src_row in 0..src.height {
            let Some(dst_row) = self.offset(row, src_row, self.height) else {
                continue;
            };
            for src_col in 0..src.width {
                if let Some(dst_col) = self.offset(col, src_col, self.width) {
                    self.put(dst_row, dst_col, src.dot(src_row, src_col));
                }
            }
        }
    }

    /// Keep only the first `height` rows
    pub fn truncate_rows(&mut self, height: usize) {
        if height < self.height {
            self.height = height;
            self.bits.truncate(self.stride * height);
        }
    }

    /// Number of set dots
    pub fn count_set(&self) -> usize {
        (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| (row, col)))
            .filter(|&(row, col)| self.dot(row, col).is_set())
            .count()
    }

    /// Unchecked read; callers guarantee bounds
    pub(crate) fn dot(&self, row: usize, col: usize) -> Dot {
        let (index, bit) = self.locate(row, col);
        Dot::from(self.bits[index] & bit != 0)
    }

    /// Unchecked write; callers guarantee bounds
    pub(crate) fn put(&mut self, row: usize, col: usize, dot: Dot) {
        let (index, bit) = self.locate(row, col);
        if dot.is_set() {
            self.bits[index] |= bit;
        } else {
            self.bits[index] &= !bit;
        }
    }

    /// Byte index and bit mask, MSB first within each row
    fn locate(&self, row: usize, col: usize) -> (usize, u8) {
        (row * self.stride + col / 8, 0x80 >> (col % 8))
    }

    fn offset(&self, origin: i32, delta: usize, limit: usize) -> Option<usize> {
        let pos = i64::from(origin) + delta as i64;
        if pos < 0 || pos >= limit as i64 {
            None
        } else {
            Some(pos as usize)
        }
    }

    fn check(&self, row: usize, col: usize) -> Result<(), IndexError> {
        if row >= self.height || col >= self.width {
            return Err(IndexError {
                row,
                col,
                rows: self.height,
                cols: self.width,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize) -> Bitmap {
        let mut bitmap = Bitmap::new(width, height);
        bitmap.clear(Dot::Set);
        bitmap
    }

    #[test]
    fn test_new_is_all_unset() {
        let bitmap = Bitmap::new(84, 16);
        assert_eq!(bitmap.count_set(), 0);
        assert_eq!(bitmap.width(), 84);
        assert_eq!(bitmap.height(), 16);
    }

    #[test]
    fn test_set_and_get_across_byte_boundary() {
        let mut bitmap = Bitmap::new(12, 2);
        bitmap.set(0, 7, Dot::Set).unwrap();
        bitmap.set(0, 8, Dot::Set).unwrap();
        bitmap.set(1, 11, Dot::Set).unwrap();
        assert_eq!(bitmap.get(0, 7), Ok(Dot::Set));
        assert_eq!(bitmap.get(0, 8), Ok(Dot::Set));
        assert_eq!(bitmap.get(0, 9), Ok(Dot::Unset));
        assert_eq!(bitmap.get(1, 11), Ok(Dot::Set));
        assert_eq!(bitmap.count_set(), 3);

        bitmap.set(0, 8, Dot::Unset).unwrap();
        assert_eq!(bitmap.get(0, 8), Ok(Dot::Unset));
    }

    #[test]
    fn test_out_of_range_coordinates_fail() {
        let mut bitmap = Bitmap::new(4, 2);
        assert_eq!(
            bitmap.get(2, 0),
            Err(IndexError {
                row: 2,
                col: 0,
                rows: 2,
                cols: 4
            })
        );
        assert!(bitmap.set(0, 4, Dot::Set).is_err());
    }

    #[test]
    fn test_clear_fills_every_dot() {
        let bitmap = solid(10, 3);
        assert_eq!(bitmap.count_set(), 30);
    }

    #[test]
    fn test_blit_clips_all_edges() {
        let mut bitmap = Bitmap::new(4, 4);
        bitmap.blit(&solid(3, 3), -1, 2);
        // Rows 0..2, columns 2..4 survive
        assert_eq!(bitmap.count_set(), 4);
        assert_eq!(bitmap.get(0, 2), Ok(Dot::Set));
        assert_eq!(bitmap.get(1, 3), Ok(Dot::Set));
        assert_eq!(bitmap.get(2, 2), Ok(Dot::Unset));
    }

    #[test]
    fn test_blit_fully_off_screen_is_noop() {
        let mut bitmap = Bitmap::new(4, 4);
        bitmap.blit(&solid(3, 3), 0, 4);
        bitmap.blit(&solid(3, 3), 0, -3);
        assert_eq!(bitmap.count_set(), 0);
    }

    #[test]
    fn test_blit_copies_unset_dots() {
        let mut bitmap = solid(4, 1);
        bitmap.blit(&Bitmap::new(2, 1), 0, 1);
        assert_eq!(bitmap.get(0, 0), Ok(Dot::Set));
        assert_eq!(bitmap.get(0, 1), Ok(Dot::Unset));
        assert_eq!(bitmap.get(0, 2), Ok(Dot::Unset));
        assert_eq!(bitmap.get(0, 3), Ok(Dot::Set));
    }

    #[test]
    fn test_truncate_rows() {
        let mut bitmap = solid(5, 4);
        bitmap.truncate_rows(2);
        assert_eq!(bitmap.height(), 2);
        assert_eq!(bitmap.count_set(), 10);
        assert!(bitmap.get(2, 0).is_err());
    }
}
