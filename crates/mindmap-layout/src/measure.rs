//! Label width measurement.
//!
//! Layout needs the along-axis extent of a parent to decide where its
//! children start. The host supplies a [`LabelMeasure`]; anything that cannot
//! produce a usable number degrades to the configured default width.

use unicode_width::UnicodeWidthStr;

/// Capability to measure how wide a label renders.
pub trait LabelMeasure {
    /// Rendered width in canvas pixels, or `None` when unavailable.
    fn measure_width(&self, label: &str) -> Option<f64>;
}

impl<F> LabelMeasure for F
where
    F: Fn(&str) -> Option<f64>,
{
    fn measure_width(&self, label: &str) -> Option<f64> {
        self(label)
    }
}

/// Every label has the same width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidth(pub f64);

impl LabelMeasure for FixedWidth {
    fn measure_width(&self, _label: &str) -> Option<f64> {
        Some(self.0)
    }
}

/// No measurement available; layout always uses its default width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unmeasured;

impl LabelMeasure for Unmeasured {
    fn measure_width(&self, _label: &str) -> Option<f64> {
        None
    }
}

/// Font-metrics approximation from terminal-style display columns.
///
/// Width is `columns * px_per_column + padding` over the widest line,
/// clamped to `[min_width, max_width]`. East Asian wide glyphs count as two
/// columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphWidthTable {
    pub px_per_column: f64,
    pub padding: f64,
    pub min_width: f64,
    pub max_width: f64,
}

impl Default for GlyphWidthTable {
    fn default() -> Self {
        Self {
            px_per_column: 8.0,
            padding: 32.0,
            min_width: 80.0,
            max_width: 400.0,
        }
    }
}

impl LabelMeasure for GlyphWidthTable {
    fn measure_width(&self, label: &str) -> Option<f64> {
        let columns = label.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
        let raw = columns as f64 * self.px_per_column + self.padding;
        Some(raw.clamp(self.min_width, self.max_width.max(self.min_width)))
    }
}

/// Measure `label`, degrading to `None` for non-finite or non-positive results.
#[must_use]
pub fn measure_or_none(measure: &dyn LabelMeasure, label: &str) -> Option<f64> {
    measure
        .measure_width(label)
        .filter(|width| width.is_finite() && *width > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_table_uses_widest_line() {
        let table = GlyphWidthTable {
            px_per_column: 10.0,
            padding: 0.0,
            min_width: 0.0,
            max_width: 1_000.0,
        };
        assert_eq!(table.measure_width("abc\nabcdef"), Some(60.0));
    }

    #[test]
    fn glyph_table_counts_wide_glyphs_twice() {
        let table = GlyphWidthTable {
            px_per_column: 10.0,
            padding: 0.0,
            min_width: 0.0,
            max_width: 1_000.0,
        };
        assert_eq!(table.measure_width("日本"), Some(40.0));
    }

    #[test]
    fn glyph_table_clamps() {
        let table = GlyphWidthTable::default();
        assert_eq!(table.measure_width(""), Some(80.0));
        assert_eq!(table.measure_width(&"x".repeat(500)), Some(400.0));
    }

    #[test]
    fn closures_measure() {
        let measure = |label: &str| Some(label.len() as f64);
        assert_eq!(measure_or_none(&measure, "four"), Some(4.0));
    }

    #[test]
    fn unusable_measurements_degrade() {
        assert_eq!(measure_or_none(&Unmeasured, "x"), None);
        assert_eq!(measure_or_none(&FixedWidth(f64::NAN), "x"), None);
        assert_eq!(measure_or_none(&FixedWidth(0.0), "x"), None);
        assert_eq!(measure_or_none(&FixedWidth(120.0), "x"), Some(120.0));
    }
}
