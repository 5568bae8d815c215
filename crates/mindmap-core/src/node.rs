//! Working node/edge representation and layout direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::id::NodeId;

/// Layout direction of the whole map.
///
/// The along axis is the axis depth grows on; the cross axis is the one
/// siblings are spread over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Root on the left, depth grows rightward.
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    /// Root on the right, depth grows leftward.
    #[serde(rename = "RL")]
    RightLeft,
    /// Root on top, depth grows downward.
    #[serde(rename = "TB")]
    TopBottom,
    /// Root at the bottom, depth grows upward.
    #[serde(rename = "BT")]
    BottomTop,
}

/// Screen axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The other axis.
    #[must_use]
    pub const fn orthogonal(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Component of `point` on this axis.
    #[must_use]
    pub const fn component(self, point: Point) -> f64 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }
}

impl Direction {
    /// All directions in declaration order.
    pub const ALL: [Self; 4] = [
        Self::LeftRight,
        Self::RightLeft,
        Self::TopBottom,
        Self::BottomTop,
    ];

    /// Short persisted tag (`LR`, `RL`, `TB`, `BT`).
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::LeftRight => "LR",
            Self::RightLeft => "RL",
            Self::TopBottom => "TB",
            Self::BottomTop => "BT",
        }
    }

    /// Axis along which depth grows.
    #[must_use]
    pub const fn along_axis(self) -> Axis {
        match self {
            Self::LeftRight | Self::RightLeft => Axis::Horizontal,
            Self::TopBottom | Self::BottomTop => Axis::Vertical,
        }
    }

    /// Axis along which siblings are spread.
    #[must_use]
    pub const fn cross_axis(self) -> Axis {
        self.along_axis().orthogonal()
    }

    /// Sign of depth progression on the along axis.
    #[must_use]
    pub const fn along_sign(self) -> f64 {
        match self {
            Self::LeftRight | Self::TopBottom => 1.0,
            Self::RightLeft | Self::BottomTop => -1.0,
        }
    }

    /// Build a screen point from along/cross coordinates.
    #[must_use]
    pub fn compose(self, along: f64, cross: f64) -> Point {
        let along = along * self.along_sign();
        match self.along_axis() {
            Axis::Horizontal => Point::new(along, cross),
            Axis::Vertical => Point::new(cross, along),
        }
    }

    /// Connector handle pair `(source, target)` for parent → child edges.
    #[must_use]
    pub const fn handles(self) -> (Handle, Handle) {
        match self {
            Self::LeftRight => (Handle::Right, Handle::Left),
            Self::RightLeft => (Handle::Left, Handle::Right),
            Self::TopBottom => (Handle::Bottom, Handle::Top),
            Self::BottomTop => (Handle::Top, Handle::Bottom),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Error for unknown direction tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDirection(pub String);

impl fmt::Display for UnknownDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown layout direction {:?}", self.0)
    }
}

impl std::error::Error for UnknownDirection {}

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.as_tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDirection(s.to_string()))
    }
}

/// Side of a node an edge connector attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    Top,
    Right,
    Bottom,
    Left,
}

/// Payload fields the engine carries but never interprets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<serde_json::Value>>,
}

/// One mind-map entry in the working representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// Derived: distance from the root.
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub collapsed: bool,
    /// Derived: whether any node names this one as parent.
    #[serde(default)]
    pub has_children: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_style: Option<String>,
    /// Last computed layout position.
    #[serde(default)]
    pub position: Point,
    /// Measured label width; `None` falls back to the layout default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(flatten)]
    pub payload: NodePayload,
}

impl GraphNode {
    /// Construct a root node.
    #[must_use]
    pub fn root(id: NodeId, label: impl Into<String>) -> Self {
        Self::new(id, label, None, 0)
    }

    /// Construct a child of `parent` at `depth`.
    #[must_use]
    pub fn child(id: NodeId, label: impl Into<String>, parent: NodeId, depth: u32) -> Self {
        Self::new(id, label, Some(parent), depth)
    }

    fn new(id: NodeId, label: impl Into<String>, parent_id: Option<NodeId>, depth: u32) -> Self {
        Self {
            id,
            label: label.into(),
            parent_id,
            depth,
            collapsed: false,
            has_children: false,
            custom_style: None,
            position: Point::ZERO,
            width: None,
            payload: NodePayload::default(),
        }
    }

    /// Whether this node is the root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Derived parent → child connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: Handle,
    pub target_handle: Handle,
    /// Target sits behind a collapsed ancestor.
    #[serde(default)]
    pub hidden: bool,
}

impl Edge {
    /// Canonical edge id for a parent/child pair.
    #[must_use]
    pub fn id_for(source: &NodeId, target: &NodeId) -> String {
        format!("e-{source}-{target}")
    }
}
