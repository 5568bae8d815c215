//! Layout tuning constants.

use mindmap_core::{Axis, Direction};
use serde::{Deserialize, Serialize};

/// Spacing and fallback sizes for [`TreeLayout`](crate::TreeLayout).
///
/// All values are in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Cross-axis slot size per leaf when depth grows horizontally (LR/RL).
    pub row_spacing: f64,
    /// Cross-axis slot size per leaf when depth grows vertically (TB/BT).
    pub column_spacing: f64,
    /// Minimum along-axis distance between a parent and its children.
    pub level_spacing: f64,
    /// Gap kept between a parent's far edge and its children.
    pub level_gap: f64,
    /// Width used for nodes that were never measured.
    pub default_node_width: f64,
    /// Node height; the parent extent for vertical directions.
    pub node_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_spacing: 60.0,
            column_spacing: 180.0,
            level_spacing: 220.0,
            level_gap: 60.0,
            default_node_width: 150.0,
            node_height: 40.0,
        }
    }
}

impl LayoutConfig {
    /// Cross-axis slot size for one leaf in `direction`.
    #[must_use]
    pub fn cross_unit(&self, direction: Direction) -> f64 {
        match direction.along_axis() {
            Axis::Horizontal => self.row_spacing,
            Axis::Vertical => self.column_spacing,
        }
    }

    /// Along-axis extent of a node with measured `width`.
    #[must_use]
    pub fn along_extent(&self, direction: Direction, width: Option<f64>) -> f64 {
        match direction.along_axis() {
            Axis::Horizontal => self.resolve_width(width),
            Axis::Vertical => self.node_height,
        }
    }

    /// Measured width, or the default when absent or unusable.
    #[must_use]
    pub fn resolve_width(&self, width: Option<f64>) -> f64 {
        width
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(self.default_node_width)
    }

    /// Validate spacing values. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let positive = [
            ("row_spacing", self.row_spacing),
            ("column_spacing", self.column_spacing),
            ("level_spacing", self.level_spacing),
            ("default_node_width", self.default_node_width),
            ("node_height", self.node_height),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("layout.{field} must be > 0, got {value}"));
            }
        }
        if !self.level_gap.is_finite() || self.level_gap < 0.0 {
            errors.push(format!(
                "layout.level_gap must be >= 0, got {}",
                self.level_gap
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(LayoutConfig::default().validate().is_empty());
    }

    #[test]
    fn validate_reports_each_bad_field() {
        let config = LayoutConfig {
            row_spacing: 0.0,
            level_gap: -1.0,
            node_height: f64::NAN,
            ..LayoutConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("row_spacing")));
        assert!(errors.iter().any(|e| e.contains("level_gap")));
    }

    #[test]
    fn extent_depends_on_axis() {
        let config = LayoutConfig::default();
        assert_eq!(config.along_extent(Direction::LeftRight, Some(320.0)), 320.0);
        assert_eq!(config.along_extent(Direction::RightLeft, None), 150.0);
        assert_eq!(config.along_extent(Direction::TopBottom, Some(320.0)), 40.0);
        assert_eq!(config.cross_unit(Direction::BottomTop), 180.0);
        assert_eq!(config.cross_unit(Direction::LeftRight), 60.0);
    }

    #[test]
    fn unusable_widths_fall_back() {
        let config = LayoutConfig::default();
        assert_eq!(config.resolve_width(Some(-5.0)), 150.0);
        assert_eq!(config.resolve_width(Some(f64::INFINITY)), 150.0);
        assert_eq!(config.resolve_width(Some(0.0)), 150.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: LayoutConfig = serde_json::from_str(r#"{"row_spacing": 80.0}"#).unwrap();
        assert_eq!(config.row_spacing, 80.0);
        assert_eq!(config.level_spacing, 220.0);
    }
}
