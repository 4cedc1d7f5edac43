//! Release-year coloring for the info side of a card.

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f32) -> Self {
        Self::new(level, level, level)
    }

    fn lerp(self, to: RgbColor, t: f32) -> RgbColor {
        RgbColor::new(
            self.r + (to.r - self.r) * t,
            self.g + (to.g - self.g) * t,
            self.b + (to.b - self.b) * t,
        )
    }
}

pub const FIRST_YEAR: i32 = 1900;
pub const LAST_YEAR: i32 = 2025;

const DARK_BLUE: RgbColor = RgbColor::new(0.2, 0.0, 0.5);
const PURPLE: RgbColor = RgbColor::new(0.6, 0.1, 0.7);
const DARK_RED: RgbColor = RgbColor::new(0.9, 0.0, 0.2);

/// Map a year label onto the dark blue → purple → dark red gradient.
///
/// Years are clamped to [`FIRST_YEAR`]..=[`LAST_YEAR`]. Anything that does not
/// parse as an integer (including `"Unknown"` and `None`) is black.
pub fn color_for_year(year: Option<&str>) -> RgbColor {
    let Some(year) = year.and_then(|y| y.trim().parse::<i32>().ok()) else {
        return RgbColor::BLACK;
    };
    let year = year.clamp(FIRST_YEAR, LAST_YEAR);
    let normalized = (year - FIRST_YEAR) as f32 / (LAST_YEAR - FIRST_YEAR) as f32;
    if normalized < 0.5 {
        DARK_BLUE.lerp(PURPLE, normalized * 2.0)
    } else {
        PURPLE.lerp(DARK_RED, (normalized - 0.5) * 2.0)
    }
}
