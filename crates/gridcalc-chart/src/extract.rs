//! Series extraction from a cell table

use crate::chart::{ChartConfig, ChartType};
use crate::series::{ChartData, ColorSpec, Dataset, Point, SeriesData};
use gridcalc_core::{CellAddress, CellRange, CellTable};
use gridcalc_formula::functions::parse_number;

const LINE_BORDER: &str = "rgba(75, 192, 192, 1)";
const LINE_FILL: &str = "rgba(75, 192, 192, 0.2)";
const BAR_FILL: &str = "rgba(54, 162, 235, 0.6)";
const SCATTER_FILL: &str = "rgba(255, 99, 132, 1)";
const PIE_PALETTE: [&str; 6] = [
    "rgba(255, 99, 132, 0.6)",
    "rgba(54, 162, 235, 0.6)",
    "rgba(255, 206, 86, 0.6)",
    "rgba(75, 192, 192, 0.6)",
    "rgba(153, 102, 255, 0.6)",
    "rgba(255, 159, 64, 0.6)",
];

/// Build chart series from the cells in `config.data_range`
///
/// - several columns: one dataset per column, labels from the first column
/// - one column, several rows: one dataset labelled by the cell above,
///   labels from the column to the left
/// - one cell: one dataset with a single value
///
/// Labels fall back to the row number when the label cell is empty. Values
/// are the cells' displayed values read as numbers, 0 when not numeric. An
/// empty or invalid range yields no data.
pub fn generate_chart_data(cells: &CellTable, config: &ChartConfig) -> ChartData {
    let range = match CellRange::parse(&config.data_range) {
        Ok(range) => range,
        Err(e) => {
            log::debug!("chart {:?} has no usable data range: {}", config.id, e);
            return ChartData::default();
        }
    };

    let colors = config.options.colors.as_deref().unwrap_or(&[]);
    let color_at = |i: usize| -> Option<ColorSpec> {
        if colors.is_empty() {
            None
        } else {
            Some(ColorSpec::Single(colors[i % colors.len()].clone()))
        }
    };

    let mut data = if range.col_count() > 1 {
        by_column(cells, &range, color_at)
    } else if range.row_count() > 1 {
        single_column(cells, &range, color_at(0))
    } else {
        single_cell(cells, &range.start, color_at(0))
    };

    apply_style(&mut data, config);
    data
}

fn number_at(cells: &CellTable, addr: &CellAddress) -> f64 {
    parse_number(cells.value_at(addr)).unwrap_or(0.0)
}

fn label_or_row(cells: &CellTable, addr: &CellAddress) -> String {
    match cells.value_at(addr) {
        "" => addr.row.to_string(),
        label => label.to_string(),
    }
}

fn dataset(label: String, values: Vec<f64>, color: Option<ColorSpec>) -> Dataset {
    Dataset {
        label,
        data: SeriesData::Values(values),
        background_color: color.clone(),
        border_color: color,
    }
}

fn by_column<F>(cells: &CellTable, range: &CellRange, color_at: F) -> ChartData
where
    F: Fn(usize) -> Option<ColorSpec>,
{
    let first = range.start.column;
    let columns = range.col_count() as usize;
    let mut values = vec![Vec::with_capacity(range.row_count() as usize); columns];
    let mut labels = Vec::with_capacity(range.row_count() as usize);

    for addr in range.cells() {
        if addr.column == first {
            labels.push(label_or_row(cells, &addr));
        }
        values[(addr.column - first) as usize].push(number_at(cells, &addr));
    }

    let datasets = values
        .into_iter()
        .enumerate()
        .map(|(i, values)| {
            let letters = CellAddress::number_to_column(first + i as u32);
            dataset(letters, values, color_at(i))
        })
        .collect();

    ChartData { labels, datasets }
}

fn single_column(cells: &CellTable, range: &CellRange, color: Option<ColorSpec>) -> ChartData {
    let column = range.start.column;
    let letters = CellAddress::number_to_column(column);

    let label = match range.start.row.checked_sub(1).filter(|&row| row > 0) {
        Some(row) => match cells.value_at(&CellAddress::new(column, row)) {
            "" => letters,
            above => above.to_string(),
        },
        None => letters,
    };

    let mut labels = Vec::with_capacity(range.row_count() as usize);
    let mut values = Vec::with_capacity(range.row_count() as usize);
    for addr in range.cells() {
        values.push(number_at(cells, &addr));
        labels.push(if column > 1 {
            label_or_row(cells, &CellAddress::new(column - 1, addr.row))
        } else {
            addr.row.to_string()
        });
    }

    ChartData {
        labels,
        datasets: vec![dataset(label, values, color)],
    }
}

fn single_cell(cells: &CellTable, addr: &CellAddress, color: Option<ColorSpec>) -> ChartData {
    let reference = addr.to_a1_string();
    ChartData {
        labels: vec![reference.clone()],
        datasets: vec![dataset(reference, vec![number_at(cells, addr)], color)],
    }
}

fn apply_style(data: &mut ChartData, config: &ChartConfig) {
    match config.chart_type {
        ChartType::Line => {
            for ds in &mut data.datasets {
                ds.border_color.get_or_insert_with(|| LINE_BORDER.into());
                ds.background_color = Some(LINE_FILL.into());
            }
        }
        ChartType::Bar => {
            for ds in &mut data.datasets {
                ds.background_color.get_or_insert_with(|| BAR_FILL.into());
            }
        }
        ChartType::Pie => {
            if let Some(first) = data.datasets.first_mut() {
                let palette = match &config.options.colors {
                    Some(colors) => colors.clone(),
                    None => PIE_PALETTE.iter().map(|c| c.to_string()).collect(),
                };
                first.background_color = Some(ColorSpec::Palette(palette));
            }
        }
        ChartType::Scatter => {
            for ds in &mut data.datasets {
                if let SeriesData::Values(values) = &ds.data {
                    let points = values
                        .iter()
                        .enumerate()
                        .map(|(i, &y)| Point { x: i as f64, y })
                        .collect();
                    ds.data = SeriesData::Points(points);
                }
                ds.background_color.get_or_insert_with(|| SCATTER_FILL.into());
            }
        }
    }
}
