use log::{info, warn};

use crate::models::holding::HoldingRecord;
use crate::errors::{Result, HoldingsError};
use crate::util::{self, excel_utils};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// 持仓数据提供者：加载后只读，按公司名索引
pub struct HoldingsProvider {
    data: Vec<HoldingRecord>,
    // 索引用于快速查找
    name_index: HashMap<String, Vec<usize>>,
}

impl HoldingsProvider {
    /// 使用提供的数据创建新的数据提供者实例
    pub fn new_with_data(data: Vec<HoldingRecord>) -> Self {
        let mut provider = Self {
            data,
            name_index: HashMap::new(),
        };

        provider.rebuild_indices();

        provider
    }

    /// 从数据目录加载指定年份的持仓文件，任一文件失败即返回错误
    pub fn load_from_dir(data_dir: &str, years: &[i32]) -> Result<Self> {
        let dir = Path::new(data_dir);
        if !dir.is_dir() {
            return Err(HoldingsError::DataError(format!(
                "Data directory not found: {}", dir.display()
            )));
        }

        let mut data = Vec::new();

        for &year in years {
            let file_name = util::holdings_file_name(year);
            let path = dir.join(&file_name);

            let records = excel_utils::read_holdings_file(&path, year)?;
            if records.is_empty() {
                warn!("{} contains no holding rows", path.display());
            }
            info!("Loaded {} holdings for {} from {}", records.len(), year, path.display());
            data.extend(records);
        }

        info!("Loaded {} holding records across {} years", data.len(), years.len());
        Ok(Self::new_with_data(data))
    }

    /// 获取所有持仓记录
    pub fn get_all_holdings(&self) -> &[HoldingRecord] {
        &self.data
    }

    /// 按公司名精确匹配（区分大小写和空白），结果按年份升序
    pub fn get_holdings_by_name(&self, name: &str) -> Vec<&HoldingRecord> {
        let mut records: Vec<&HoldingRecord> = self.name_index.get(name)
            .map(|indices| indices.iter().map(|&idx| &self.data[idx]).collect())
            .unwrap_or_default();
        records.sort_by_key(|r| r.year);
        records
    }

    /// 所有公司名（去重、排序）
    pub fn company_names(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self.data.iter().map(|r| r.name.as_str()).collect();
        names.into_iter().collect()
    }

    /// 名称中包含给定片段的公司（不区分大小写），用于查找精确名称
    pub fn search_companies(&self, fragment: &str) -> Vec<&str> {
        let needle = fragment.to_lowercase();
        self.company_names()
            .into_iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect()
    }

    /// 数据中出现的年份
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.data.iter().map(|r| r.year).collect();
        years.into_iter().collect()
    }

    /// 重建索引
    fn rebuild_indices(&mut self) {
        self.name_index.clear();

        for (i, record) in self.data.iter().enumerate() {
            self.name_index
                .entry(record.name.clone())
                .or_insert_with(Vec::new)
                .push(i);
        }
    }
}
