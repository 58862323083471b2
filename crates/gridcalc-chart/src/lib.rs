//! # gridcalc-chart
//!
//! Turns a rectangle of cells into labelled chart series.
//!
//! ```rust
//! use gridcalc_chart::{generate_chart_data, ChartConfig, ChartType, SeriesData};
//! use gridcalc_core::CellTable;
//!
//! let cells = CellTable::from_inputs([
//!     ("A1", "Q1"), ("B1", "10"),
//!     ("A2", "Q2"), ("B2", "20"),
//! ]).unwrap();
//!
//! let config = ChartConfig::new("c1", ChartType::Bar, "A1:B2");
//! let data = generate_chart_data(&cells, &config);
//! assert_eq!(data.labels, vec!["Q1", "Q2"]);
//! assert_eq!(data.datasets[1].data, SeriesData::Values(vec![10.0, 20.0]));
//! ```

mod axis;
mod chart;
mod extract;
mod series;

pub use axis::AxisTitle;
pub use chart::{ChartConfig, ChartOptions, ChartType};
pub use extract::generate_chart_data;
pub use series::{ChartData, ColorSpec, Dataset, Point, SeriesData};
