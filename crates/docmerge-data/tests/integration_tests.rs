//! Integration tests for docmerge-data

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use docmerge_data::{CellRef, CellValue, ExcelWorkbook, SheetAccess};

/// Write a two-sheet workbook: a mapping sheet and a data sheet
fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("paciente.xlsx");
    let mut workbook = Workbook::new();

    let mapping = workbook.add_worksheet();
    mapping.set_name("mapeo").unwrap();
    mapping.write_string(0, 0, "Nombre").unwrap();
    mapping.write_string(0, 1, "Hoja1!B2").unwrap();
    mapping.write_string(1, 0, "Fecha Nac").unwrap();
    mapping.write_string(1, 1, "Hoja1!B3").unwrap();

    let data = workbook.add_worksheet();
    data.set_name("Hoja1").unwrap();
    data.write_string(1, 1, "Ana").unwrap();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let date = ExcelDateTime::from_ymd(2024, 1, 5).unwrap();
    data.write_datetime_with_format(2, 1, &date, &date_format)
        .unwrap();
    data.write_number(3, 1, 72.5).unwrap();
    data.write_number(4, 1, 3).unwrap();
    data.write_formula(5, 1, "=TODAY()").unwrap();

    workbook.save(&path).unwrap();
    path
}

/// Copy a saved workbook, switching it to the 1904 date system
fn mark_1904(source: &Path, target: &Path) {
    let mut archive = ZipArchive::new(File::open(source).unwrap()).unwrap();
    let mut writer = ZipWriter::new(File::create(target).unwrap());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();

        if name == "xl/workbook.xml" {
            let xml = String::from_utf8(bytes).unwrap();
            assert!(xml.contains("<workbookPr"));
            bytes = xml
                .replacen("<workbookPr", r#"<workbookPr date1904="1""#, 1)
                .into_bytes();
        }

        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(&bytes).unwrap();
    }
    writer.finish().unwrap();
}

fn at(workbook: &ExcelWorkbook, sheet: &str, cell: &str) -> CellValue {
    let pos = CellRef::parse(cell).unwrap();
    workbook.cell_value(sheet, pos.row, pos.col)
}

#[test]
fn test_sheet_names_in_declared_order() {
    let dir = TempDir::new().unwrap();
    let workbook = ExcelWorkbook::open(write_fixture(dir.path())).expect("open workbook");

    assert_eq!(workbook.sheet_names(), vec!["mapeo", "Hoja1"]);
    assert!(workbook.has_sheet("Hoja1"));
    assert!(!workbook.has_sheet("hoja1"));
}

#[test]
fn test_read_text_and_numbers() {
    let dir = TempDir::new().unwrap();
    let workbook = ExcelWorkbook::open(write_fixture(dir.path())).expect("open workbook");

    assert_eq!(at(&workbook, "Hoja1", "B2"), CellValue::from("Ana"));
    assert_eq!(at(&workbook, "Hoja1", "B4").to_string(), "72.5");
    assert_eq!(at(&workbook, "Hoja1", "B5").to_string(), "3");
    assert_eq!(at(&workbook, "Hoja1", "Z99"), CellValue::Empty);
    assert_eq!(at(&workbook, "NoSuchSheet", "A1"), CellValue::Empty);
}

#[test]
fn test_read_date_cell() {
    let dir = TempDir::new().unwrap();
    let workbook = ExcelWorkbook::open(write_fixture(dir.path())).expect("open workbook");

    let value = at(&workbook, "Hoja1", "B3");
    let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(value, CellValue::DateTime(expected));
    assert_eq!(value.to_string(), "05/01/2024");
}

#[test]
fn test_formula_text_is_exposed() {
    let dir = TempDir::new().unwrap();
    let workbook = ExcelWorkbook::open(write_fixture(dir.path())).expect("open workbook");

    assert_eq!(workbook.cell_formula("Hoja1", 5, 1).as_deref(), Some("=TODAY()"));
    assert_eq!(workbook.cell_formula("Hoja1", 1, 1), None);
}

#[test]
fn test_last_row() {
    let dir = TempDir::new().unwrap();
    let workbook = ExcelWorkbook::open(write_fixture(dir.path())).expect("open workbook");

    assert_eq!(workbook.last_row("mapeo"), Some(1));
    assert_eq!(workbook.last_row("Hoja1"), Some(5));
    assert_eq!(workbook.last_row("NoSuchSheet"), None);
}

#[test]
fn test_read_date_cell_1904_system() {
    let dir = TempDir::new().unwrap();
    let plain = dir.path().join("mac-plain.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Hoja1").unwrap();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    // 2024-01-05 counted from the 1904-01-01 epoch
    sheet.write_number_with_format(0, 0, 43834, &date_format).unwrap();
    workbook.save(&plain).unwrap();

    let path = dir.path().join("mac.xlsx");
    mark_1904(&plain, &path);

    let workbook = ExcelWorkbook::open(&path).expect("open workbook");
    assert_eq!(at(&workbook, "Hoja1", "A1").to_string(), "05/01/2024");
}
