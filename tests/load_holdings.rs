// tests/load_holdings.rs

use gpfg_holdings::data_provider::HoldingsProvider;
use rust_xlsxwriter::Workbook;
use std::error::Error;
use std::path::{Path, PathBuf};

const HEADER: [&str; 5] = ["Region", "Country", "Name", "Ownership", "Market Value(USD)"];

fn temp_data_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gpfg_holdings_load_{}_{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_year(dir: &Path, year: i32, rows: &[(&str, f64, f64)]) -> Result<(), Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, title) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }
    for (i, (name, ownership, value)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, "Asia")?;
        sheet.write_string(row, 1, "China")?;
        sheet.write_string(row, 2, *name)?;
        sheet.write_number(row, 3, *ownership)?;
        sheet.write_number(row, 4, *value)?;
    }

    workbook.save(dir.join(format!("eq_{}1231.xlsx", year)))?;
    Ok(())
}

#[test]
fn test_yearly_files_concatenate_in_file_then_row_order() -> Result<(), Box<dyn Error>> {
    let dir = temp_data_dir("concat");
    write_year(&dir, 2019, &[("Tencent Holdings Ltd", 0.5, 2000.0), ("Meituan", 0.8, 1200.0)])?;
    write_year(&dir, 2020, &[("Tencent Holdings Ltd", 0.55, 2500.0)])?;
    write_year(&dir, 2021, &[("Meituan", 0.9, 1500.0), ("Tencent Holdings Ltd", 0.6, 3000.0)])?;

    let provider = HoldingsProvider::load_from_dir(dir.to_str().unwrap(), &[2019, 2020, 2021])?;
    let rows = provider.get_all_holdings();

    assert_eq!(rows.len(), 5);
    assert_eq!(rows.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2019, 2019, 2020, 2021, 2021]);
    assert_eq!(
        rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        vec!["Tencent Holdings Ltd", "Meituan", "Tencent Holdings Ltd", "Meituan", "Tencent Holdings Ltd"]
    );
    assert_eq!(rows[1].ownership, 0.8);
    assert_eq!(rows[4].market_value_usd, 3000.0);
    assert_eq!(rows[0].extra.get("Country").map(String::as_str), Some("China"));

    let tencent = provider.get_holdings_by_name("Tencent Holdings Ltd");
    assert_eq!(tencent.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2019, 2020, 2021]);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[test]
fn test_only_requested_years_are_loaded() -> Result<(), Box<dyn Error>> {
    let dir = temp_data_dir("subset");
    write_year(&dir, 2019, &[("Meituan", 0.8, 1200.0)])?;
    write_year(&dir, 2020, &[("Meituan", 0.85, 1300.0)])?;

    let provider = HoldingsProvider::load_from_dir(dir.to_str().unwrap(), &[2020])?;
    assert_eq!(provider.years(), vec![2020]);
    assert_eq!(provider.get_all_holdings().len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[test]
fn test_missing_year_file_is_fatal() -> Result<(), Box<dyn Error>> {
    let dir = temp_data_dir("missing");
    write_year(&dir, 2019, &[("Meituan", 0.8, 1200.0)])?;

    let result = HoldingsProvider::load_from_dir(dir.to_str().unwrap(), &[2019, 2020]);
    assert!(result.is_err());

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
