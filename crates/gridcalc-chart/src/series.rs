//! Extracted chart data

/// A scatter point
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Values of one dataset
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum SeriesData {
    /// One value per label
    Values(Vec<f64>),
    /// Indexed points (scatter charts)
    Points(Vec<Point>),
}

impl SeriesData {
    /// Number of data points
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Values(v) => v.len(),
            SeriesData::Points(p) => p.len(),
        }
    }

    /// Check if there are no data points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A color, or one color per data point
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum ColorSpec {
    Single(String),
    Palette(Vec<String>),
}

impl From<&str> for ColorSpec {
    fn from(color: &str) -> Self {
        ColorSpec::Single(color.to_string())
    }
}

/// One labelled series
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Dataset {
    pub label: String,
    pub data: SeriesData,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub background_color: Option<ColorSpec>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub border_color: Option<ColorSpec>,
}

/// Labels plus datasets, ready for a charting front end
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// Check if there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
