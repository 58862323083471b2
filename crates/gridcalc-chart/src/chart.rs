//! Chart configuration types

use crate::axis::AxisTitle;
use std::fmt;
use std::str::FromStr;

/// Chart types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ChartType {
    Line,
    #[default]
    Bar,
    Pie,
    Scatter,
}

impl ChartType {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            "pie" => Ok(ChartType::Pie),
            "scatter" => Ok(ChartType::Scatter),
            other => Err(format!(
                "unknown chart type '{}' (expected line, bar, pie or scatter)",
                other
            )),
        }
    }
}

/// Display options of a chart
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ChartOptions {
    #[cfg_attr(feature = "serde", serde(default))]
    pub axis_title: AxisTitle,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub show_legend: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub show_grid: bool,
    /// Colors cycled across datasets
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub colors: Option<Vec<String>>,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            axis_title: AxisTitle::default(),
            show_legend: true,
            show_grid: true,
            colors: None,
        }
    }
}

/// Chart definition
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ChartConfig {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub chart_type: ChartType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    /// Source rectangle, e.g. "A1:B5"
    pub data_range: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: ChartOptions,
}

impl ChartConfig {
    /// Create a chart over a data range with default options
    pub fn new<I: Into<String>, R: Into<String>>(id: I, chart_type: ChartType, data_range: R) -> Self {
        Self {
            id: id.into(),
            chart_type,
            title: String::new(),
            data_range: data_range.into(),
            options: ChartOptions::default(),
        }
    }

    /// Set chart title
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    /// Set the colors cycled across datasets
    pub fn with_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }
}
