use crate::analysis::{self, CompanyAnalysis};
use crate::config::Config;
use crate::data_provider::HoldingsProvider;
use crate::errors::Result;
use crate::models::holding::{HoldingRecord, WatchEntry};
use crate::models::price::PriceFetch;
use crate::render::{chart, report};
use crate::services::price_service::PriceService;
use crate::util;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// 单个公司的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// 已输出，含股价和隐含持股数量
    WithPrices,
    /// 已输出，仅持股比例和市值
    WithoutPrices,
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct EntryReport {
    pub entry: WatchEntry,
    pub outcome: EntryOutcome,
    pub chart_path: Option<PathBuf>,
    /// 已打印的报表文本，未找到公司时为 None
    pub report: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub reports: Vec<EntryReport>,
}

impl BatchSummary {
    pub fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// 分析服务：对列表中的每个公司依次取数、合并、输出
pub struct AnalysisService {
    config: Config,
    price_service: PriceService,
}

impl AnalysisService {
    pub fn new(config: Config, price_service: PriceService) -> Self {
        Self { config, price_service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 筛选公司持仓并（如有代码）合并年末股价；公司不存在时返回 None
    pub async fn analyze_company(
        &self,
        provider: &HoldingsProvider,
        entry: &WatchEntry,
        window: &(NaiveDate, NaiveDate),
    ) -> Option<CompanyAnalysis> {
        let holdings: Vec<HoldingRecord> = provider
            .get_holdings_by_name(&entry.name)
            .into_iter()
            .cloned()
            .collect();

        if holdings.is_empty() {
            return None;
        }

        let fetch = match entry.ticker.as_deref() {
            Some(ticker) => Some(self.price_service.fetch_yearly_prices(ticker, &window.0, &window.1).await),
            None => None,
        };

        let prices = fetch.as_ref().and_then(PriceFetch::prices);
        if let Some(PriceFetch::Unavailable { attempts }) = &fetch {
            warn!("{}: no price data after {} attempts, showing ownership only", entry.name, attempts);
        }

        Some(analysis::build_analysis(&entry.name, entry.ticker.as_deref(), holdings, prices))
    }

    /// 处理单个公司：分析、写图表、打印报表
    pub async fn process_entry(
        &self,
        provider: &HoldingsProvider,
        entry: &WatchEntry,
        window: &(NaiveDate, NaiveDate),
    ) -> EntryReport {
        info!("Processing company: {} ({})", entry.name, entry.ticker.as_deref().unwrap_or("no ticker"));

        let analysis = match self.analyze_company(provider, entry, window).await {
            Some(analysis) => analysis,
            None => {
                println!("未找到公司: {}", entry.name);
                warn!("Company not found in holdings: {}", entry.name);
                return EntryReport {
                    entry: entry.clone(),
                    outcome: EntryOutcome::NotFound,
                    chart_path: None,
                    report: None,
                };
            }
        };

        let mut outcome = if analysis.has_prices() {
            EntryOutcome::WithPrices
        } else {
            EntryOutcome::WithoutPrices
        };

        let mut chart_path = None;
        if self.config.write_charts {
            let svg = chart::render_chart(&analysis);
            match chart::write_chart(Path::new(&self.config.output_dir), &util::slugify(&entry.name), &svg) {
                Ok(path) => chart_path = Some(path),
                Err(e) => {
                    error!("Failed to write chart for {}: {}", entry.name, e);
                    outcome = EntryOutcome::Failed(e.to_string());
                }
            }
        }

        // 图表写入失败时报表照常输出
        let table = report::render_report(&analysis);
        print!("{}", table);

        EntryReport { entry: entry.clone(), outcome, chart_path, report: Some(table) }
    }

    /// Run every entry in order. One entry's skip or failure never stops the
    /// ones after it.
    pub async fn run_batch(&self, provider: &HoldingsProvider, entries: &[WatchEntry]) -> Result<BatchSummary> {
        let window = self.config.price_window()?;
        info!("Analyzing {} companies, price window {} - {}", entries.len(), window.0, window.1);

        let mut summary = BatchSummary::default();
        for entry in entries {
            let report = self.process_entry(provider, entry, &window).await;
            summary.reports.push(report);
        }

        info!(
            "Batch finished: {} with prices, {} ownership only, {} not found, {} failed",
            summary.count(|o| *o == EntryOutcome::WithPrices),
            summary.count(|o| *o == EntryOutcome::WithoutPrices),
            summary.count(|o| *o == EntryOutcome::NotFound),
            summary.count(|o| matches!(o, EntryOutcome::Failed(_))),
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use crate::services::price_service::test_support::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn record(year: i32, name: &str, value: f64) -> HoldingRecord {
        HoldingRecord {
            year,
            name: name.to_string(),
            ownership: 0.5,
            market_value_usd: value,
            extra: BTreeMap::new(),
        }
    }

    fn provider() -> HoldingsProvider {
        HoldingsProvider::new_with_data(vec![
            record(2021, "Tencent Holdings Ltd", 300.0),
            record(2019, "Tencent Holdings Ltd", 500.0),
            record(2020, "Meituan", 100.0),
        ])
    }

    fn temp_output(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gpfg_holdings_{}_{}", tag, std::process::id()))
    }

    fn service(source: Arc<ScriptedSource>, output: &Path, write_charts: bool) -> AnalysisService {
        let config = Config::new()
            .with_output_dir(output.to_str().unwrap())
            .with_write_charts(write_charts);
        let price_service = PriceService::new(source, Arc::new(RecordingSleeper::default()), RetryPolicy::new(3));
        AnalysisService::new(config, price_service)
    }

    #[tokio::test]
    async fn missing_company_does_not_stop_the_batch() {
        let output = temp_output("batch");
        let source = Arc::new(ScriptedSource::default().with("00700", vec![
            Scripted::Prices(vec![(2019, 12, 31, 50.0), (2020, 12, 31, 60.0), (2021, 12, 31, 30.0)]),
        ]));
        let svc = service(source.clone(), &output, true);

        let entries = vec![
            WatchEntry::new("No Such Company Ltd", Some("99999")),
            WatchEntry::new("Tencent Holdings Ltd", Some("00700")),
        ];
        let summary = svc.run_batch(&provider(), &entries).await.unwrap();

        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.reports[0].outcome, EntryOutcome::NotFound);
        assert_eq!(summary.reports[1].entry.name, "Tencent Holdings Ltd");
        assert_eq!(summary.reports[1].outcome, EntryOutcome::WithPrices);

        // 未找到的公司不会触发行情请求
        assert_eq!(*source.calls.lock().unwrap(), vec!["00700".to_string()]);

        let path = summary.reports[1].chart_path.clone().unwrap();
        assert!(path.ends_with("tencent_holdings_ltd.svg"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("Shares held"));
        let _ = std::fs::remove_dir_all(&output);
    }

    #[tokio::test]
    async fn chart_write_failure_still_prints_report() {
        // 输出目录位置被普通文件占用，图表无法写入
        let blocker = temp_output("blocked");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let source = Arc::new(ScriptedSource::default());
        let svc = service(source, &blocker, true);

        let entries = vec![
            WatchEntry::new("Meituan", None),
            WatchEntry::new("Tencent Holdings Ltd", None),
        ];
        let summary = svc.run_batch(&provider(), &entries).await.unwrap();

        assert_eq!(summary.reports.len(), 2);
        for report in &summary.reports {
            assert!(matches!(report.outcome, EntryOutcome::Failed(_)));
            assert!(report.chart_path.is_none());
        }
        let table = summary.reports[0].report.as_deref().unwrap();
        assert!(table.contains("GPFG holding in Meituan"));
        assert!(summary.reports[1].report.as_deref().unwrap().contains("Tencent Holdings Ltd"));
        let _ = std::fs::remove_file(&blocker);
    }

    #[tokio::test]
    async fn missing_company_has_no_report() {
        let svc = service(Arc::new(ScriptedSource::default()), &temp_output("missing"), false);
        let window = svc.config().price_window().unwrap();

        let report = svc.process_entry(&provider(), &WatchEntry::new("meituan", None), &window).await;
        assert_eq!(report.outcome, EntryOutcome::NotFound);
        assert!(report.report.is_none());
    }

    #[tokio::test]
    async fn analysis_joins_and_derives_share_count() {
        let source = Arc::new(ScriptedSource::default().with("00700", vec![
            Scripted::Prices(vec![(2019, 12, 31, 50.0), (2020, 12, 31, 60.0), (2021, 12, 31, 30.0)]),
        ]));
        let svc = service(source, &temp_output("unused"), false);
        let window = svc.config().price_window().unwrap();

        let analysis = svc
            .analyze_company(&provider(), &WatchEntry::new("Tencent Holdings Ltd", Some("00700")), &window)
            .await
            .unwrap();

        let merged = analysis.merged.unwrap();
        assert_eq!(merged.iter().map(|m| m.year).collect::<Vec<_>>(), vec![2019, 2021]);
        assert_eq!(merged[0].implied_shares, Some(10.0));
        assert_eq!(merged[1].implied_shares, Some(10.0));
    }

    #[tokio::test]
    async fn unavailable_prices_degrade_to_ownership_only() {
        let source = Arc::new(ScriptedSource::default());
        let svc = service(source.clone(), &temp_output("degrade"), false);

        let entries = vec![WatchEntry::new("Meituan", Some("03690"))];
        let summary = svc.run_batch(&provider(), &entries).await.unwrap();

        assert_eq!(summary.reports[0].outcome, EntryOutcome::WithoutPrices);
        assert_eq!(source.call_count(), 3);
        assert!(summary.reports[0].chart_path.is_none());
    }

    #[tokio::test]
    async fn entry_without_ticker_skips_price_fetch() {
        let source = Arc::new(ScriptedSource::default());
        let svc = service(source.clone(), &temp_output("noticker"), false);

        let entries = vec![WatchEntry::new("Meituan", None)];
        let summary = svc.run_batch(&provider(), &entries).await.unwrap();

        assert_eq!(summary.reports[0].outcome, EntryOutcome::WithoutPrices);
        assert_eq!(source.call_count(), 0);
    }
}
