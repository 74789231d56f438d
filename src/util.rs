use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::BTreeMap;
use crate::models::price::{PriceObservation, YearlyPrice};
use crate::errors::{Result, HoldingsError};

/// 行情接口使用的 YYYYMMDD 格式
pub fn naive_date_to_compact(date: &NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 持仓文件名 `eq_<YYYYMMDD>.xlsx`
pub fn holdings_file_name(year: i32) -> String {
    format!("eq_{}1231.xlsx", year)
}

/// Reduce observations to one close per calendar year, keeping the latest
/// observation of each year. Output is sorted by year.
pub fn resample_yearly_last(observations: &[PriceObservation]) -> Vec<YearlyPrice> {
    let mut latest: BTreeMap<i32, &PriceObservation> = BTreeMap::new();

    for obs in observations {
        let entry = latest.entry(obs.date.year()).or_insert(obs);
        if obs.date >= entry.date {
            *entry = obs;
        }
    }

    debug!("Resampled {} observations into {} yearly closes", observations.len(), latest.len());

    latest
        .into_iter()
        .map(|(year, obs)| YearlyPrice { year, close: obs.close })
        .collect()
}

/// 生成可用作文件名的公司标识
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

// Excel 解析工具
pub mod excel_utils {
    use super::*;
    use calamine::{open_workbook_auto, DataType, Range, Reader};
    use crate::models::holding::HoldingRecord;
    use std::path::Path;

    pub const NAME_COLUMN: &str = "Name";
    pub const OWNERSHIP_COLUMN: &str = "Ownership";
    pub const MARKET_VALUE_COLUMN: &str = "Market Value(USD)";

    static EMPTY_CELL: DataType = DataType::Empty;

    // 单元格转为文本，空单元格为空字符串；数据单元格原样保留
    pub fn cell_to_text(cell: &DataType) -> String {
        match cell {
            DataType::Empty => String::new(),
            DataType::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    // 表头去掉首尾空白后再匹配列名
    fn header_text(cell: &DataType) -> String {
        cell_to_text(cell).trim().to_string()
    }

    // 单元格转为数值，空单元格视为 NaN
    pub fn cell_to_f64(cell: &DataType) -> Option<f64> {
        match cell {
            DataType::Float(f) => Some(*f),
            DataType::Int(i) => Some(*i as f64),
            DataType::Empty => Some(f64::NAN),
            DataType::String(s) => {
                let cleaned = s.trim().replace(',', "");
                if cleaned.is_empty() {
                    Some(f64::NAN)
                } else {
                    cleaned.parse::<f64>().ok()
                }
            }
            _ => None,
        }
    }

    fn find_column(header: &[String], column: &str, source: &str) -> Result<usize> {
        header
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| HoldingsError::MissingColumn {
                file: source.to_string(),
                column: column.to_string(),
            })
    }

    /// 解析一个工作表：首行为表头，其余每行一条持仓记录
    pub fn parse_holdings_sheet(range: &Range<DataType>, year: i32, source: &str) -> Result<Vec<HoldingRecord>> {
        let mut rows = range.rows();

        let header: Vec<String> = match rows.next() {
            Some(row) => row.iter().map(header_text).collect(),
            None => return Err(HoldingsError::DataError(format!("{}: worksheet is empty", source))),
        };

        let name_idx = find_column(&header, NAME_COLUMN, source)?;
        let ownership_idx = find_column(&header, OWNERSHIP_COLUMN, source)?;
        let value_idx = find_column(&header, MARKET_VALUE_COLUMN, source)?;

        let mut records = Vec::new();

        // 表头之后的行号从 2 开始（与表格软件一致）
        for (offset, row) in rows.enumerate() {
            let row_number = offset + 2;

            let name = match row.get(name_idx) {
                Some(cell) => cell_to_text(cell),
                None => continue,
            };
            if name.is_empty() {
                continue;
            }

            let numeric = |idx: usize, column: &str| -> Result<f64> {
                let cell = row.get(idx).unwrap_or(&EMPTY_CELL);
                cell_to_f64(cell).ok_or_else(|| HoldingsError::DataError(format!(
                    "{}: row {} column '{}' is not numeric: {}", source, row_number, column, cell
                )))
            };

            let ownership = numeric(ownership_idx, OWNERSHIP_COLUMN)?;
            let market_value_usd = numeric(value_idx, MARKET_VALUE_COLUMN)?;

            let extra = header
                .iter()
                .enumerate()
                .filter(|(i, h)| *i != name_idx && *i != ownership_idx && *i != value_idx && !h.is_empty())
                .map(|(i, h)| (h.clone(), row.get(i).map(cell_to_text).unwrap_or_default()))
                .collect();

            records.push(HoldingRecord {
                year,
                name,
                ownership,
                market_value_usd,
                extra,
            });
        }

        Ok(records)
    }

    /// 读取单个年度持仓文件的第一个工作表
    pub fn read_holdings_file(path: &Path, year: i32) -> Result<Vec<HoldingRecord>> {
        let source = path.display().to_string();
        let mut workbook = open_workbook_auto(path)?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| HoldingsError::DataError(format!("{}: workbook has no worksheet", source)))??;

        parse_holdings_sheet(&range, year, &source)
    }
}
