//! Tests for sheet recalculation and JSON persistence

use gridcalc::prelude::*;
use gridcalc::{
    recalculate, recalculate_in_place, recalculate_with_options, CIRCULAR_SENTINEL,
    DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT, ERROR_SENTINEL,
};
use pretty_assertions::assert_eq;

fn cells(inputs: &[(&str, &str)]) -> CellTable {
    CellTable::from_inputs(inputs.iter().copied()).unwrap()
}

fn shown<'a>(table: &'a CellTable, reference: &str) -> &'a str {
    table.get(reference).unwrap().display_value()
}

#[test]
fn test_recalculate_sums_a_range() {
    let input = cells(&[("A1", "10"), ("A2", "20"), ("A3", "=SUM(A1:A2)")]);
    let output = recalculate(&input);

    assert_eq!(shown(&output, "A3"), "30");
    assert_eq!(output.get("A3").unwrap().raw_input(), "=SUM(A1:A2)");

    // The input table is untouched
    assert_eq!(input.get("A3").unwrap().calculated_value(), None);
}

#[test]
fn test_non_formula_cells_are_untouched() {
    let input = cells(&[("A1", "hello"), ("A2", "12abc"), ("B1", "")]);
    let output = recalculate(&input);
    assert_eq!(output, input);
}

#[test]
fn test_formatting_survives_recalculation() {
    let mut input = cells(&[("A1", "2"), ("A2", "=A1*2")]);
    input.get_mut("A2").unwrap().format = CellFormat::new().bold(true).align(TextAlign::Right);

    let output = recalculate(&input);
    assert_eq!(shown(&output, "A2"), "4");
    assert_eq!(output.get("A2").unwrap().format, input.get("A2").unwrap().format);
}

#[test]
fn test_errors_do_not_affect_siblings() {
    let input = cells(&[
        ("A1", "5"),
        ("A2", "=A1+*2"),
        ("A3", "=UNKNOWN(A1)"),
        ("A4", "=A1*2"),
    ]);
    let (output, stats) = recalculate_with_options(&input, &CalculationOptions::default());

    assert_eq!(shown(&output, "A2"), ERROR_SENTINEL);
    assert_eq!(shown(&output, "A3"), ERROR_SENTINEL);
    assert_eq!(shown(&output, "A4"), "10");
    assert_eq!(stats.errors, 2);
    assert_eq!(stats.cells_calculated, 3);
}

#[test]
fn test_circular_reference_terminates() {
    let mut table = cells(&[("A1", "=B1+1"), ("B1", "=A1+1")]);
    let stats = recalculate_in_place(&mut table, &CalculationOptions::default());

    // Each formula is evaluated once in insertion order
    assert_eq!(stats.cells_calculated, 2);
    assert_eq!(shown(&table, "A1"), "1");
    assert_eq!(shown(&table, "B1"), "2");

    // A second pass sees the first pass's results
    recalculate_in_place(&mut table, &CalculationOptions::default());
    assert_eq!(shown(&table, "A1"), "3");
    assert_eq!(shown(&table, "B1"), "4");
}

#[test]
fn test_recalculation_is_idempotent_without_forward_references() {
    let input = cells(&[
        ("A1", "10"),
        ("A2", "=A1*2"),
        ("A3", "=SUM(A1:A2)"),
        ("B1", "=A3/A2+A1"),
        ("B2", "=1/0"),
    ]);
    let once = recalculate(&input);
    assert_eq!(shown(&once, "B1"), "11.5");
    assert_eq!(recalculate(&once), once);
}

#[test]
fn test_forward_references_need_another_pass() {
    // A1 reads A2, which is a formula later in the order
    let input = cells(&[("A1", "=A2+1"), ("A2", "=B1*2"), ("B1", "3")]);
    let once = recalculate(&input);
    assert_eq!(shown(&once, "A1"), "1");
    assert_eq!(shown(&once, "A2"), "6");

    let twice = recalculate(&once);
    assert_eq!(shown(&twice, "A1"), "7");
    assert_ne!(twice, once);
    assert_eq!(recalculate(&twice), twice);
}

#[test]
fn test_deeply_nested_formula_is_cell_local() {
    let nested = |n: usize| format!("={}1{}", "(".repeat(n), ")".repeat(n));
    let deep = nested(2_000);
    let negations = format!("={}1", "-".repeat(200_000));
    let chain = format!("=1{}", "+1".repeat(200_000));
    let input = cells(&[
        ("A1", deep.as_str()),
        ("A2", "=1+1"),
        ("A3", negations.as_str()),
        ("A4", chain.as_str()),
        ("A5", nested(50).as_str()),
    ]);

    for mode in [CalculationMode::SinglePass, CalculationMode::DependencyOrder] {
        let (output, stats) =
            recalculate_with_options(&input, &CalculationOptions::with_mode(mode));
        assert_eq!(shown(&output, "A1"), ERROR_SENTINEL);
        assert_eq!(shown(&output, "A2"), "2");
        assert_eq!(shown(&output, "A3"), ERROR_SENTINEL);
        assert_eq!(shown(&output, "A4"), ERROR_SENTINEL);
        assert_eq!(shown(&output, "A5"), "1");
        assert_eq!(stats.errors, 3);
    }
}

#[test]
fn test_whole_sheet_ranges() {
    let input = cells(&[
        ("A1", "5"),
        ("A2", "7"),
        ("B1", "=COUNT(A1:A1048576)"),
        ("B2", "=SUM(A1:A1048576)+MAX(C1:XFD1048576)"),
        ("C1", "=MIN(A1:A1048576)"),
    ]);

    for mode in [CalculationMode::SinglePass, CalculationMode::DependencyOrder] {
        let (output, stats) =
            recalculate_with_options(&input, &CalculationOptions::with_mode(mode));
        assert_eq!(shown(&output, "B1"), "2");
        assert_eq!(shown(&output, "C1"), "5");
        assert_eq!(stats.errors, 0);
    }

    // Only dependency order sees C1's result from B2, which comes first
    let (ordered, _) = recalculate_with_options(
        &input,
        &CalculationOptions::with_mode(CalculationMode::DependencyOrder),
    );
    assert_eq!(shown(&ordered, "B2"), "17");
}

#[test]
fn test_dependency_order_mode() {
    let mut table = cells(&[
        ("A1", "=B1*2"),
        ("B1", "=C1+1"),
        ("C1", "4"),
        ("D1", "=D2"),
        ("D2", "=D1"),
    ]);
    let options = CalculationOptions::with_mode(CalculationMode::DependencyOrder);
    let stats = recalculate_in_place(&mut table, &options);

    assert_eq!(shown(&table, "A1"), "10");
    assert_eq!(shown(&table, "B1"), "5");
    assert_eq!(shown(&table, "D1"), CIRCULAR_SENTINEL);
    assert_eq!(shown(&table, "D2"), CIRCULAR_SENTINEL);
    assert_eq!(stats.circular_references, 2);
}

#[test]
fn test_workbook_update_cell() {
    let mut workbook = Workbook::new();
    let id = workbook.active_sheet_id().to_string();

    workbook.update_cell(&id, "A1", "7").unwrap();
    workbook.update_cell(&id, "A2", "=A1*6").unwrap();
    assert_eq!(shown(workbook.sheet(&id).unwrap().cells(), "A2"), "42");

    workbook.update_cell(&id, "A1", "1").unwrap();
    assert_eq!(shown(workbook.sheet(&id).unwrap().cells(), "A2"), "6");

    assert!(workbook.update_cell("missing", "A1", "1").is_err());
    assert!(workbook.update_cell(&id, "not a ref", "1").is_err());
}

#[test]
fn test_structural_edits() {
    let mut sheet = Sheet::new("s", "Sheet");
    sheet.update_cell("A1", "3").unwrap();
    sheet.update_cell("A2", "=A1*A1").unwrap();

    let rows = sheet.row_count();
    let stats = sheet.insert_row();
    assert_eq!(sheet.row_count(), rows + 1);
    assert_eq!(stats.cells_calculated, 1);

    sheet.remove_column();
    assert_eq!(sheet.column_count(), DEFAULT_COLUMN_COUNT - 1);

    sheet.clear_cell_and_recalculate("A1").unwrap();
    assert_eq!(shown(sheet.cells(), "A2"), "0");
}

#[test]
fn test_json_round_trip_through_file() {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.active_sheet_mut().unwrap();
        sheet.update_cell("A1", "10").unwrap();
        sheet.update_cell("A2", "=A1/4").unwrap();
        sheet
            .format_range("A1", "A2", &CellFormat::new().italic(true))
            .unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    workbook.save(&path).unwrap();

    let loaded = Workbook::open(&path).unwrap();
    assert_eq!(loaded, workbook);
    assert_eq!(shown(loaded.active_sheet().unwrap().cells(), "A2"), "2.5");
}

#[test]
fn test_loading_recalculates_stored_values() {
    let json = r#"{
        "id": "doc-1",
        "name": "Stale",
        "activeSheetId": "s1",
        "sheets": [{
            "id": "s1",
            "name": "Sheet1",
            "isActive": true,
            "cells": {
                "A1": { "value": "4", "formula": "" },
                "A2": { "value": "=A1*2", "formula": "=A1*2", "calculatedValue": "999" }
            }
        }]
    }"#;

    let workbook = Workbook::from_json(json).unwrap();
    let sheet = workbook.sheet("s1").unwrap();
    assert_eq!(shown(sheet.cells(), "A2"), "8");
    assert_eq!(sheet.row_count(), DEFAULT_ROW_COUNT);
    assert_eq!(workbook.name(), "Stale");
}

#[test]
fn test_loading_ignores_stored_values_for_forward_references() {
    // A1 reads A2, a formula later in the order, whose stored value is stale
    let json = r#"{
        "sheets": [{
            "id": "s1",
            "name": "Sheet1",
            "cells": {
                "A1": { "value": "=A2*2", "formula": "=A2*2", "calculatedValue": "999" },
                "A2": { "value": "=B1+1", "formula": "=B1+1", "calculatedValue": "50" },
                "B1": { "value": "4", "formula": "" }
            }
        }]
    }"#;

    let workbook = Workbook::from_json(json).unwrap();
    let sheet = workbook.sheet("s1").unwrap();
    assert_eq!(shown(sheet.cells(), "A1"), "0");
    assert_eq!(shown(sheet.cells(), "A2"), "5");
}

#[test]
fn test_loading_normalizes_cell_keys() {
    let json = r#"{
        "sheets": [{
            "id": "s1",
            "name": "Sheet1",
            "cells": {
                "a1": { "value": "6" },
                "b1": { "value": "=A1*7" }
            }
        }]
    }"#;

    let workbook = Workbook::from_json(json).unwrap();
    let sheet = workbook.sheet("s1").unwrap();
    assert_eq!(shown(sheet.cells(), "B1"), "42");
    assert!(sheet.cells().iter().all(|(key, _)| key == "A1" || key == "B1"));
}

#[test]
fn test_invalid_json_is_an_error() {
    assert!(Workbook::from_json("not json").is_err());
    assert!(Workbook::from_json(r#"{"sheets": []}"#).is_err());

    let dir = tempfile::tempdir().unwrap();
    assert!(Workbook::open(dir.path().join("missing.json")).is_err());
}
