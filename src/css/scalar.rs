//! Length values: cells, percentages, fractions, viewport units and `auto`.

use std::fmt;

use crate::geometry::Size;

/// A length as written in a stylesheet.
///
/// Only `Cells`, `Percent` and the viewport units resolve on their own.
/// `Fraction` needs the sibling weight total (see
/// [`distribute`](crate::layout::box_model::distribute)) and `Auto` needs a
/// content measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Cells(f32),
    Percent(f32),
    Fraction(f32),
    Auto,
    ViewportWidth(f32),
    ViewportHeight(f32),
}

impl Scalar {
    #[inline]
    pub fn is_auto(self) -> bool {
        matches!(self, Scalar::Auto)
    }

    #[inline]
    pub fn is_fraction(self) -> bool {
        matches!(self, Scalar::Fraction(_))
    }

    /// The weight of a fraction, or zero for anything else. Negative
    /// weights count as zero.
    #[inline]
    pub fn fraction_weight(self) -> f64 {
        match self {
            Scalar::Fraction(weight) if weight > 0.0 => f64::from(weight),
            _ => 0.0,
        }
    }

    /// Resolve to a cell count against `reference` (the container dimension
    /// along the same axis).
    ///
    /// Returns `None` for `Fraction` and `Auto`. A zero or negative
    /// reference collapses cells and percentages to zero, and the result is
    /// never negative.
    pub fn resolve(self, reference: i32, viewport: Size) -> Option<i32> {
        let cells = match self {
            Scalar::Fraction(_) | Scalar::Auto => return None,
            Scalar::Cells(_) | Scalar::Percent(_) if reference <= 0 => 0.0,
            Scalar::Cells(value) => f64::from(value),
            Scalar::Percent(value) => f64::from(reference) * f64::from(value) / 100.0,
            Scalar::ViewportWidth(value) => {
                f64::from(viewport.width.max(0)) * f64::from(value) / 100.0
            }
            Scalar::ViewportHeight(value) => {
                f64::from(viewport.height.max(0)) * f64::from(value) / 100.0
            }
        };
        Some((cells.floor() as i32).max(0))
    }

    /// Resolve a signed value (offsets). Fractions and `auto` are zero.
    pub fn resolve_signed(self, reference: i32, viewport: Size) -> i32 {
        let cells = match self {
            Scalar::Fraction(_) | Scalar::Auto => 0.0,
            Scalar::Cells(value) => f64::from(value),
            Scalar::Percent(value) => f64::from(reference) * f64::from(value) / 100.0,
            Scalar::ViewportWidth(value) => f64::from(viewport.width) * f64::from(value) / 100.0,
            Scalar::ViewportHeight(value) => {
                f64::from(viewport.height) * f64::from(value) / 100.0
            }
        };
        cells.floor() as i32
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, value: f32, suffix: &str) -> fmt::Result {
    if value.fract() == 0.0 {
        write!(f, "{}{suffix}", value as i64)
    } else {
        write!(f, "{value}{suffix}")
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Scalar::Auto => f.write_str("auto"),
            Scalar::Cells(value) => write_number(f, value, ""),
            Scalar::Percent(value) => write_number(f, value, "%"),
            Scalar::Fraction(value) => write_number(f, value, "fr"),
            Scalar::ViewportWidth(value) => write_number(f, value, "vw"),
            Scalar::ViewportHeight(value) => write_number(f, value, "vh"),
        }
    }
}
