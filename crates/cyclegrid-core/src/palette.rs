#![forbid(unsafe_code)]

//! Series color assignment.
//!
//! Two interchangeable policies produce a total `SeriesId -> Rgb` function:
//!
//! - [`PalettePolicy::Cyclic`]: a fixed 12-color categorical table, indexed by
//!   `series mod 12`.
//! - [`PalettePolicy::Rainbow`]: series `i` of `n` samples a cubehelix
//!   rainbow at `t = i / n`.
//!
//! Assignment is a pure function of `(policy, series_count)`, so toggling the
//! selection and rebuilding never shifts a series' color.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::SeriesId;

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    #[inline]
    pub const fn from_u32(packed: u32) -> Self {
        Self::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }

    /// Relative luminance in `[0, 1]` (sRGB, WCAG definition).
    pub fn relative_luminance(self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }

    /// Black or white, whichever reads better on top of `self`.
    pub fn best_text(self) -> Self {
        if self.relative_luminance() > 0.179 {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The fixed categorical table used by [`PalettePolicy::Cyclic`].
pub const CATEGORY12: [Rgb; 12] = [
    Rgb::from_u32(0x1f77b4),
    Rgb::from_u32(0xff7f0e),
    Rgb::from_u32(0x2ca02c),
    Rgb::from_u32(0xd62728),
    Rgb::from_u32(0x9467bd),
    Rgb::from_u32(0x8c564b),
    Rgb::from_u32(0xe377c2),
    Rgb::from_u32(0x7f7f7f),
    Rgb::from_u32(0xbcbd22),
    Rgb::from_u32(0x17becf),
    Rgb::from_u32(0x393b79),
    Rgb::from_u32(0x637939),
];

/// Length of the repeating ramp when no series count is known.
const DEFAULT_RAMP_LEN: usize = CATEGORY12.len();

/// Which coloring rule to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PalettePolicy {
    /// Fixed categorical table, repeating every 12 series.
    #[default]
    Cyclic,
    /// Continuous cubehelix rainbow spread over all series.
    Rainbow,
}

impl PalettePolicy {
    /// The other policy.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Cyclic => Self::Rainbow,
            Self::Rainbow => Self::Cyclic,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cyclic => "cyclic",
            Self::Rainbow => "rainbow",
        }
    }
}

/// Sample the cubehelix rainbow at `t`; `t` wraps into `[0, 1)`.
pub fn rainbow(t: f64) -> Rgb {
    let t = if (0.0..=1.0).contains(&t) { t } else { t - t.floor() };
    let ts = (t - 0.5).abs();
    cubehelix(360.0 * t - 100.0, 1.5 - 1.5 * ts, 0.8 - 0.9 * ts)
}

/// Cubehelix (hue in degrees, saturation, lightness) to sRGB.
fn cubehelix(h: f64, s: f64, l: f64) -> Rgb {
    const A: f64 = -0.14861;
    const B: f64 = 1.78277;
    const C: f64 = -0.29227;
    const D: f64 = -0.90649;
    const E: f64 = 1.97294;

    let h = (h + 120.0).to_radians();
    let a = s * l * (1.0 - l);
    let (sin_h, cos_h) = h.sin_cos();
    let to_u8 = |v: f64| (255.0 * v).round().clamp(0.0, 255.0) as u8;
    Rgb::new(
        to_u8(l + a * (A * cos_h + B * sin_h)),
        to_u8(l + a * (C * cos_h + D * sin_h)),
        to_u8(l + a * (E * cos_h)),
    )
}

/// A resolved color assignment for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    policy: PalettePolicy,
    colors: Vec<Rgb>,
}

impl Palette {
    /// Assign colors for `series_count` series.
    ///
    /// With `None` (or a zero count) the policy's fixed repeating table is
    /// used instead.
    pub fn assign(policy: PalettePolicy, series_count: Option<usize>) -> Self {
        let colors = match (policy, series_count) {
            (PalettePolicy::Cyclic, Some(n)) if n > 0 => {
                (0..n).map(|i| CATEGORY12[i % CATEGORY12.len()]).collect()
            }
            (PalettePolicy::Cyclic, _) => CATEGORY12.to_vec(),
            (PalettePolicy::Rainbow, Some(n)) if n > 0 => ramp(n),
            (PalettePolicy::Rainbow, _) => ramp(DEFAULT_RAMP_LEN),
        };
        Self { policy, colors }
    }

    #[inline]
    pub fn policy(&self) -> PalettePolicy {
        self.policy
    }

    /// The assigned colors, one per series (or the repeating table).
    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Color for a series. Ids past the assigned length wrap around.
    #[inline]
    pub fn color(&self, id: SeriesId) -> Rgb {
        self.colors[id.index() % self.colors.len()]
    }
}

fn ramp(n: usize) -> Vec<Rgb> {
    (0..n).map(|i| rainbow(i as f64 / n as f64)).collect()
}
