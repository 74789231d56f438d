use crate::analysis::CompanyAnalysis;
use std::fmt::Write;

const RULE_WIDTH: usize = 100;

/// 生成定宽文本报表：有股价时五列，否则三列
pub fn render_report(analysis: &CompanyAnalysis) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);

    // 写入 String 不会失败
    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "GPFG holding in {} - yearly detail", analysis.company);
    let _ = writeln!(out, "{}", rule);

    match &analysis.merged {
        Some(merged) => {
            let _ = writeln!(out, "{:<8} {:<15} {:<18} {:<15} {:<15}",
                "Year", "Ownership(%)", "Value(USD M)", "Close(HKD)", "Shares(M)");
            let _ = writeln!(out, "{}", thin);
            for row in merged {
                let shares = match row.implied_shares {
                    Some(s) => format!("{:.2}", s),
                    None => "-".to_string(),
                };
                let _ = writeln!(out, "{:<8} {:<15.4} {:<18.0} {:<15.2} {:<15}",
                    row.year, row.ownership, row.market_value_usd, row.close, shares);
            }
        }
        None => {
            let _ = writeln!(out, "{:<8} {:<15} {:<18}", "Year", "Ownership(%)", "Value(USD M)");
            let _ = writeln!(out, "{}", thin);
            for row in &analysis.holdings {
                let _ = writeln!(out, "{:<8} {:<15.4} {:<18.0}", row.year, row.ownership, row.market_value_usd);
            }
        }
    }

    let _ = writeln!(out, "{}", rule);
    out
}
