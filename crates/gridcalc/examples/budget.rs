//! Example: Build a small budget, recalculate it and save it as JSON

use gridcalc::prelude::*;
use gridcalc::{generate_chart_data, CalculationMode};

fn main() -> Result<()> {
    let mut workbook = Workbook::new();
    workbook.set_name("Budget");
    let sheet = workbook
        .active_sheet_mut()
        .ok_or_else(|| Error::other("workbook has no sheets"))?;

    // Header row
    sheet.set_cell_input("A1", "Item")?;
    sheet.set_cell_input("B1", "Cost")?;
    sheet.set_cell_input("C1", "With tax")?;
    sheet.format_range("A1", "C1", &CellFormat::new().bold(true))?;

    // Data rows
    sheet.set_cell_input("A2", "Rent")?;
    sheet.set_cell_input("B2", "1200")?;
    sheet.set_cell_input("C2", "=B2*1.2")?;

    sheet.set_cell_input("A3", "Food")?;
    sheet.set_cell_input("B3", "450")?;
    sheet.set_cell_input("C3", "=B3*1.2")?;

    // Totals read the rows above, so insertion order is enough
    sheet.set_cell_input("A4", "Total")?;
    sheet.set_cell_input("B4", "=SUM(B2:B3)")?;
    sheet.set_cell_input("C4", "=SUM(C2:C3)")?;

    let stats = sheet.calculate_with_options(&CalculationOptions::with_mode(
        CalculationMode::DependencyOrder,
    ));
    println!(
        "Calculated {} formulas ({} errors)",
        stats.cells_calculated, stats.errors
    );

    for (reference, cell) in sheet.cells() {
        println!("{:>4} {:<12} {}", reference, cell.raw_input(), cell.display_value());
    }

    let chart = ChartConfig::new("costs", ChartType::Bar, "B2:C3").with_title("Costs");
    let data = generate_chart_data(sheet.cells(), &chart);
    println!("Chart labels: {:?}", data.labels);

    let path = std::env::temp_dir().join("budget.json");
    workbook.save(&path)?;
    println!("Saved {}", path.display());

    Ok(())
}
