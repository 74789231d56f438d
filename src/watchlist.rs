use crate::errors::{HoldingsError, Result};
use crate::models::holding::WatchEntry;
use log::info;
use std::path::Path;

// 重点公司及港股代码；None 表示没有港股上市（A股或美股）
const FULL_WATCHLIST: &[(&str, Option<&str>)] = &[
    ("Tencent Holdings Ltd", Some("00700")),                              // 腾讯控股
    ("Alibaba Group Holding Ltd", Some("09988")),                         // 阿里巴巴
    ("PDD Holdings Inc", None),                                           // 拼多多（美股）
    ("Ping An Insurance Group Co of China Ltd", Some("02318")),           // 平安保险
    ("Xiaomi Corp", Some("01810")),                                       // 小米集团
    ("China Construction Bank Corp", Some("00939")),                      // 建设银行
    ("Meituan", Some("03690")),                                           // 美团
    ("Contemporary Amperex Technology Co Ltd", None),                     // 宁德时代（A股）
    ("Industrial & Commercial Bank of China Ltd", Some("01398")),         // 工商银行
    ("Trip.com Group Ltd", Some("09961")),                                // 携程
    ("NAURA Technology Group Co Ltd", None),                              // 北方华创（A股）
    ("Pop Mart International Group Ltd", Some("09992")),                  // 泡泡玛特
    ("NetEase Inc", Some("09999")),                                       // 网易
    ("Luxshare Precision Industry Co Ltd", None),                         // 立讯精密（A股）
    ("BYD Co Ltd", Some("01211")),                                        // 比亚迪
    ("China Merchants Bank Co Ltd", Some("03968")),                       // 招商银行
    ("New Oriental Education & Technology Group Inc", Some("09901")),     // 新东方
    ("Baidu Inc", Some("09888")),                                         // 百度
    ("Bank of China Ltd", Some("03988")),                                 // 中国银行
    ("Full Truck Alliance Co Ltd", Some("02777")),                        // 满帮
    ("Bilibili Inc", Some("09626")),                                      // 哔哩哔哩
    ("Giant Network Group Co Ltd", None),                                 // 巨人网络（A股）
    ("JD.com Inc", Some("09618")),                                        // 京东
    ("BeOne Medicines Ltd", None),
    ("China Pacific Insurance Group Co Ltd", Some("02601")),              // 中国太保
    ("Midea Group Co Ltd", None),                                         // 美的集团（A股）
    ("Ningbo Deye Technology Co Ltd", None),                              // 德业股份（A股）
    ("China Life Insurance Co Ltd", Some("02628")),                       // 中国人寿
    ("Yum China Holdings Inc", None),                                     // 百胜中国（美股）
];

/// 默认只分析腾讯
pub fn default_watchlist() -> Vec<WatchEntry> {
    vec![WatchEntry::new("Tencent Holdings Ltd", Some("00700"))]
}

/// 全部重点公司
pub fn full_watchlist() -> Vec<WatchEntry> {
    FULL_WATCHLIST
        .iter()
        .map(|(name, ticker)| WatchEntry::new(name, *ticker))
        .collect()
}

/// Parse a JSON watchlist: `[{"name": "...", "ticker": "00700"}, ...]`.
/// Blank tickers are treated as absent.
pub fn parse_watchlist(json: &str) -> Result<Vec<WatchEntry>> {
    let entries: Vec<WatchEntry> = serde_json::from_str(json)?;

    entries
        .into_iter()
        .map(|mut entry| {
            if entry.name.is_empty() {
                return Err(HoldingsError::DataError("Watchlist entry with empty name".to_string()));
            }
            entry.ticker = entry.ticker.filter(|t| !t.trim().is_empty());
            Ok(entry)
        })
        .collect()
}

pub fn load_watchlist(path: &Path) -> Result<Vec<WatchEntry>> {
    let text = std::fs::read_to_string(path)?;
    let entries = parse_watchlist(&text)?;
    info!("Loaded {} watchlist entries from {}", entries.len(), path.display());
    Ok(entries)
}
