//! Downscale policy for oversized clips.

use std::fmt;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn fits_within(&self, max_width: u32, max_height: u32) -> bool {
        self.width <= max_width && self.height <= max_height
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Returns `source` unchanged when it fits inside `max_width` x `max_height`,
/// otherwise scales both sides by `min(max_width / width, max_height / height)`.
///
/// Scaled sides are rounded down to even values, since 4:2:0 H.264 needs
/// even dimensions, and never go below 2. A side never exceeds its bound,
/// even when the bound itself is below 2.
#[must_use]
pub fn fit_within(source: Dimensions, max_width: u32, max_height: u32) -> Dimensions {
    if source.fits_within(max_width, max_height) || source.width == 0 || source.height == 0 {
        return source;
    }

    let ratio = (f64::from(max_width) / f64::from(source.width))
        .min(f64::from(max_height) / f64::from(source.height));

    let scale_side = |side: u32, bound: u32| -> u32 {
        let scaled = (f64::from(side) * ratio).floor() as u32;
        (scaled & !1).max(2).min(bound)
    };

    Dimensions::new(
        scale_side(source.width, max_width),
        scale_side(source.height, max_height),
    )
}
