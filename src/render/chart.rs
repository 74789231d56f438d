use crate::analysis::CompanyAnalysis;
use crate::errors::Result;
use log::info;
use std::path::{Path, PathBuf};

const WIDTH: f64 = 1152.0;
const TITLE_HEIGHT: f64 = 56.0;
const TOP_PANEL_HEIGHT: f64 = 432.0;
const BOTTOM_PANEL_HEIGHT: f64 = 288.0;
const PANEL_GAP: f64 = 36.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 90.0;
const AXIS_LABEL_SPACE: f64 = 40.0;
const Y_TICKS: usize = 5;

const OWNERSHIP_COLOR: &str = "#1f77b4";
const VALUE_COLOR: &str = "#ff7f0e";
const PRICE_COLOR: &str = "#d62728";
const SHARES_COLOR: &str = "#2ca02c";

#[derive(Clone, Copy)]
enum Marker {
    Circle,
    Square,
    Diamond,
    Triangle,
}

struct Series {
    label: &'static str,
    axis_title: &'static str,
    color: &'static str,
    marker: Marker,
    points: Vec<(i32, f64)>,
    format: fn(f64) -> String,
    // 数值标注相对数据点的纵向偏移
    label_dy: f64,
}

/// 一个面板：左右两个Y轴，共享X轴（年份）
struct Panel {
    top: f64,
    height: f64,
    left: Series,
    right: Series,
    // 本面板实际有数据的年份，用于竖向网格线和年份标注
    years: Vec<i32>,
    show_year_labels: bool,
}

/// 横轴年份范围，两个面板共用以保证上下对齐
struct YearAxis {
    first: i32,
    last: i32,
}

impl YearAxis {
    fn x(&self, year: i32) -> f64 {
        let inner = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        if self.first == self.last {
            return MARGIN_LEFT + inner / 2.0;
        }
        MARGIN_LEFT + inner * (year - self.first) as f64 / (self.last - self.first) as f64
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn fmt_percent(v: f64) -> String {
    format!("{:.3}%", v)
}

fn fmt_usd_millions(v: f64) -> String {
    format!("${:.0}M", v)
}

fn fmt_price(v: f64) -> String {
    format!("{:.2}", v)
}

fn fmt_millions(v: f64) -> String {
    format!("{:.1}M", v)
}

fn fmt_tick(v: f64) -> String {
    if v.abs() >= 100.0 {
        format!("{:.0}", v)
    } else if v.abs() >= 1.0 {
        format!("{:.1}", v)
    } else {
        format!("{:.3}", v)
    }
}

fn extent(points: &[(i32, f64)]) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;

    for (_, v) in points {
        if v.is_finite() {
            min_v = min_v.min(*v);
            max_v = max_v.max(*v);
        }
    }

    if !min_v.is_finite() || !max_v.is_finite() {
        return None;
    }

    if min_v == max_v {
        let adjust = if min_v == 0.0 { 1.0 } else { min_v.abs() * 0.1 }; // widen flat ranges
        min_v -= adjust;
        max_v += adjust;
    }

    // 上下留白，给数值标注腾出空间
    let pad = (max_v - min_v) * 0.15;
    Some((min_v - pad, max_v + pad))
}

fn scale(value: f64, (min_v, max_v): (f64, f64), top: f64, height: f64) -> f64 {
    let norm = (value - min_v) / (max_v - min_v);
    top + (1.0 - norm) * height
}

fn draw_marker(svg: &mut String, marker: Marker, x: f64, y: f64, color: &str) {
    let r = 5.0;
    let shape = match marker {
        Marker::Circle => format!(r#"<circle cx="{x:.2}" cy="{y:.2}" r="{r}" fill="{color}" />"#),
        Marker::Square => format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{w}" height="{w}" fill="{color}" />"#,
            x - r, y - r, w = 2.0 * r
        ),
        Marker::Diamond => format!(
            r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{color}" />"#,
            x, y - r - 1.0, x + r, y, x, y + r + 1.0, x - r, y
        ),
        Marker::Triangle => format!(
            r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{color}" />"#,
            x, y - r - 1.0, x + r, y + r, x - r, y + r
        ),
    };
    svg.push_str(&shape);
}

fn draw_series(svg: &mut String, series: &Series, axis: &YearAxis, ext: (f64, f64), panel: &Panel) {
    let coords: Vec<(f64, f64, f64)> = series
        .points
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(year, v)| (axis.x(*year), scale(*v, ext, panel.top, panel.height), *v))
        .collect();

    if coords.is_empty() {
        return;
    }

    let points_attr = coords
        .iter()
        .map(|(x, y, _)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ");
    svg.push_str(&format!(
        r#"<polyline fill="none" stroke="{color}" stroke-width="2.5" points="{points}" />"#,
        color = series.color,
        points = points_attr
    ));

    for (x, y, v) in &coords {
        draw_marker(svg, series.marker, *x, *y, series.color);
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="10" font-weight="bold" fill="{color}">{label}</text>"#,
            x = x,
            y = y + series.label_dy,
            color = series.color,
            label = escape(&(series.format)(*v))
        ));
    }
}

fn draw_y_axis(svg: &mut String, series: &Series, ext: (f64, f64), panel: &Panel, right_side: bool) {
    let x = if right_side { WIDTH - MARGIN_RIGHT } else { MARGIN_LEFT };
    let (anchor, tick_dx, title_x) = if right_side {
        ("start", 8.0, WIDTH - 24.0)
    } else {
        ("end", -8.0, 24.0)
    };

    svg.push_str(&format!(
        r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{color}" stroke-width="1" />"#,
        y1 = panel.top,
        y2 = panel.top + panel.height,
        color = series.color
    ));

    for i in 0..=Y_TICKS {
        let value = ext.0 + (ext.1 - ext.0) * i as f64 / Y_TICKS as f64;
        let y = scale(value, ext, panel.top, panel.height);
        svg.push_str(&format!(
            r#"<text x="{tx:.2}" y="{ty:.2}" text-anchor="{anchor}" fill="{color}">{label}</text>"#,
            tx = x + tick_dx,
            ty = y + 3.0,
            color = series.color,
            label = fmt_tick(value)
        ));
    }

    let mid = panel.top + panel.height / 2.0;
    let rotation = if right_side { 90 } else { -90 };
    svg.push_str(&format!(
        r#"<text x="{title_x:.2}" y="{mid:.2}" text-anchor="middle" font-size="12" font-weight="bold" fill="{color}" transform="rotate({rotation} {title_x:.2} {mid:.2})">{title}</text>"#,
        color = series.color,
        title = series.axis_title
    ));
}

fn draw_grid(svg: &mut String, axis: &YearAxis, panel: &Panel) {
    for i in 0..=Y_TICKS {
        let y = panel.top + panel.height * i as f64 / Y_TICKS as f64;
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#dddddd" stroke-width="0.5" />"##,
            x1 = MARGIN_LEFT,
            x2 = WIDTH - MARGIN_RIGHT
        ));
    }
    for year in &panel.years {
        let x = axis.x(*year);
        svg.push_str(&format!(
            r##"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="#dddddd" stroke-width="0.5" />"##,
            y1 = panel.top,
            y2 = panel.top + panel.height
        ));
    }
}

fn draw_year_labels(svg: &mut String, axis: &YearAxis, panel: &Panel) {
    let y = panel.top + panel.height + 18.0;
    for year in &panel.years {
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="11">{year}</text>"#,
            x = axis.x(*year)
        ));
    }
    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="12" font-weight="bold">Year</text>"#,
        x = WIDTH / 2.0,
        y = y + 20.0
    ));
}

fn draw_legend(svg: &mut String, panel: &Panel) {
    let x = MARGIN_LEFT + 10.0;
    let mut y = panel.top + 16.0;
    svg.push_str(&format!(
        r##"<rect x="{bx:.2}" y="{by:.2}" width="150" height="42" fill="#ffffff" fill-opacity="0.9" stroke="#cccccc" />"##,
        bx = x - 6.0,
        by = y - 12.0
    ));
    for series in [&panel.left, &panel.right] {
        svg.push_str(&format!(
            r#"<line x1="{x:.2}" y1="{ly:.2}" x2="{x2:.2}" y2="{ly:.2}" stroke="{color}" stroke-width="2.5" />"#,
            x2 = x + 24.0,
            ly = y - 4.0,
            color = series.color
        ));
        draw_marker(svg, series.marker, x + 12.0, y - 4.0, series.color);
        svg.push_str(&format!(
            r##"<text x="{tx:.2}" y="{y:.2}" text-anchor="start" fill="#333">{label}</text>"##,
            tx = x + 32.0,
            label = series.label
        ));
        y += 18.0;
    }
}

fn draw_panel(svg: &mut String, panel: &Panel, axis: &YearAxis) {
    draw_grid(svg, axis, panel);

    if let Some(ext) = extent(&panel.left.points) {
        draw_y_axis(svg, &panel.left, ext, panel, false);
        draw_series(svg, &panel.left, axis, ext, panel);
    }
    if let Some(ext) = extent(&panel.right.points) {
        draw_y_axis(svg, &panel.right, ext, panel, true);
        draw_series(svg, &panel.right, axis, ext, panel);
    }

    // 横轴
    svg.push_str(&format!(
        r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#000" stroke-width="1" />"##,
        x1 = MARGIN_LEFT,
        x2 = WIDTH - MARGIN_RIGHT,
        y = panel.top + panel.height
    ));
    if panel.show_year_labels {
        draw_year_labels(svg, axis, panel);
    }

    draw_legend(svg, panel);
}

/// Render the analysis as an SVG document: ownership and market value on
/// top, closing price and implied share count below when prices exist.
pub fn render_chart(analysis: &CompanyAnalysis) -> String {
    let (first, last) = match analysis.year_span() {
        Some(span) => span,
        None => return String::new(),
    };
    let axis = YearAxis { first, last };

    let top_panel = Panel {
        top: TITLE_HEIGHT,
        height: TOP_PANEL_HEIGHT,
        left: Series {
            label: "Ownership",
            axis_title: "Ownership (%)",
            color: OWNERSHIP_COLOR,
            marker: Marker::Circle,
            points: analysis.holdings.iter().map(|h| (h.year, h.ownership)).collect(),
            format: fmt_percent,
            label_dy: -10.0,
        },
        right: Series {
            label: "Market value",
            axis_title: "Market value (USD M)",
            color: VALUE_COLOR,
            marker: Marker::Square,
            points: analysis.holdings.iter().map(|h| (h.year, h.market_value_usd)).collect(),
            format: fmt_usd_millions,
            label_dy: 20.0,
        },
        years: analysis.holdings.iter().map(|h| h.year).collect(),
        show_year_labels: analysis.merged.is_none(),
    };

    let bottom_panel = analysis.merged.as_ref().map(|merged| Panel {
        top: TITLE_HEIGHT + TOP_PANEL_HEIGHT + PANEL_GAP,
        height: BOTTOM_PANEL_HEIGHT,
        left: Series {
            label: "Close price",
            axis_title: "Close price (HKD)",
            color: PRICE_COLOR,
            marker: Marker::Diamond,
            points: merged.iter().map(|m| (m.year, m.close)).collect(),
            format: fmt_price,
            label_dy: -10.0,
        },
        right: Series {
            label: "Shares held",
            axis_title: "Shares held (M)",
            color: SHARES_COLOR,
            marker: Marker::Triangle,
            points: merged
                .iter()
                .filter_map(|m| m.implied_shares.map(|s| (m.year, s)))
                .collect(),
            format: fmt_millions,
            label_dy: 20.0,
        },
        years: merged.iter().map(|m| m.year).collect(),
        show_year_labels: true,
    });

    let height = match &bottom_panel {
        Some(p) => p.top + p.height + AXIS_LABEL_SPACE + 12.0,
        None => top_panel.top + top_panel.height + AXIS_LABEL_SPACE + 12.0,
    };

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style>"#,
        w = WIDTH,
        h = height
    ));
    svg.push_str(&format!(
        r##"<rect x="0" y="0" width="{w}" height="{h}" fill="#ffffff" />"##,
        w = WIDTH,
        h = height
    ));
    svg.push_str(&format!(
        r##"<text x="{x:.2}" y="34" text-anchor="middle" font-size="20" font-weight="bold" fill="#222">GPFG holding in {company} ({first}-{last})</text>"##,
        x = WIDTH / 2.0,
        company = escape(&analysis.company)
    ));

    draw_panel(&mut svg, &top_panel, &axis);
    if let Some(panel) = &bottom_panel {
        draw_panel(&mut svg, panel, &axis);
    }

    svg.push_str("</svg>");
    svg
}

/// 将图表写入 `<output_dir>/<slug>.svg`，返回文件路径
pub fn write_chart(output_dir: &Path, slug: &str, svg: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.svg", slug));
    std::fs::write(&path, svg)?;
    info!("Chart written to {}", path.display());
    Ok(path)
}
