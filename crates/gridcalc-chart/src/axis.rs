//! Axis types

/// Axis titles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisTitle {
    /// Horizontal axis title
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub x: Option<String>,
    /// Vertical axis title
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub y: Option<String>,
}

impl AxisTitle {
    /// Create axis titles
    pub fn new<X: Into<String>, Y: Into<String>>(x: X, y: Y) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y.into()),
        }
    }
}
