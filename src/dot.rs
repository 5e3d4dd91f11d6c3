//! Dot state for bistable flip-dot panels
//!
//! Every dot on a flip-dot module is a small magnetised disc that shows either
//! its coloured face ([`Dot::Set`]) or its dark face ([`Dot::Unset`]). The disc
//! holds its position without power; only a flip pulse changes it.
//!
//! ## Example
//!
//! ```
//! use flipdot::Dot;
//!
//! assert_eq!(Dot::from(true), Dot::Set);
//! assert_eq!(Dot::Set.inverted(), Dot::Unset);
//! assert!(bool::from(Dot::Set));
//! ```

/// State of a single dot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dot {
    /// Dark face showing
    #[default]
    Unset,
    /// Coloured face showing
    Set,
}

impl Dot {
    /// Whether the dot shows its coloured face
    pub fn is_set(self) -> bool {
        self == Self::Set
    }

    /// The opposite state
    pub fn inverted(self) -> Self {
        match self {
            Self::Unset => Self::Set,
            Self::Set => Self::Unset,
        }
    }
}

impl From<bool> for Dot {
    fn from(value: bool) -> Self {
        if value { Self::Set } else { Self::Unset }
    }
}

impl From<Dot> for bool {
    fn from(dot: Dot) -> Self {
        dot.is_set()
    }
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::prelude::PixelColor for Dot {
    type Raw = embedded_graphics_core::pixelcolor::raw::RawU1;
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::BinaryColor> for Dot {
    fn from(color: embedded_graphics_core::pixelcolor::BinaryColor) -> Self {
        Self::from(color.is_on())
    }
}
