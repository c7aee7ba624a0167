//! SVG charts sharing one [`ChartTheme`]. Each renderer returns the SVG
//! document as a string; persisting it is the caller's job.

use plotters::{
    coord::Shift,
    drawing::DrawingArea,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use crate::{
    BenchError,
    aggregate::ResultTable,
    stats,
    summary::{LongCell, Ratio, SummaryPivot},
};

pub const AVERAGE_TIME_CHART: &str = "average_execution_time.svg";
pub const DISTRIBUTION_CHART: &str = "execution_time_distribution.svg";
pub const RATIO_HEATMAP: &str = "speed_ratio.svg";
pub const STABILITY_CHART: &str = "execution_time_stability.svg";

const GROUP_WIDTH: f64 = 0.8;

#[derive(Clone, Debug)]
pub struct ChartTheme {
    pub width: u32,
    pub height: u32,
    pub font_family: &'static str,
    pub caption_size: u32,
    pub label_size: u32,
    pub background: RGBColor,
    pub text: RGBColor,
    pub undefined: RGBColor,
    pub palette: Vec<RGBColor>,
    pub cold: RGBColor,
    pub neutral: RGBColor,
    pub warm: RGBColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            width: 960,
            height: 600,
            font_family: "sans-serif",
            caption_size: 24,
            label_size: 14,
            background: RGBColor(255, 255, 255),
            text: RGBColor(38, 38, 38),
            undefined: RGBColor(200, 200, 200),
            palette: vec![
                RGBColor(76, 114, 176),
                RGBColor(221, 132, 82),
                RGBColor(85, 168, 104),
                RGBColor(196, 78, 82),
                RGBColor(129, 114, 179),
                RGBColor(147, 120, 96),
            ],
            cold: RGBColor(59, 76, 192),
            neutral: RGBColor(221, 221, 221),
            warm: RGBColor(180, 4, 38),
        }
    }
}

impl ChartTheme {
    pub fn series_color(&self, idx: usize) -> RGBColor {
        self.palette
            .get(idx % self.palette.len().max(1))
            .copied()
            .unwrap_or(self.text)
    }

    fn caption_font(&self) -> FontDesc<'static> {
        (self.font_family, self.caption_size).into_font()
    }

    fn label_font(&self) -> FontDesc<'static> {
        (self.font_family, self.label_size).into_font()
    }

    /// Diverging colour for `t` in `[0, 1]`: cold, neutral, warm.
    fn diverging(&self, t: f64) -> RGBColor {
        let t = t.clamp(0.0, 1.0);
        if t < 0.5 {
            lerp(self.cold, self.neutral, t * 2.0)
        } else {
            lerp(self.neutral, self.warm, (t - 0.5) * 2.0)
        }
    }
}

/// Grouped bars of mean time per function.
pub fn average_time_chart(pivot: &SummaryPivot, theme: &ChartTheme) -> Result<String, BenchError> {
    grouped_bars(
        "Average Execution Time per Function",
        "Time (seconds)",
        pivot.functions(),
        pivot.implementations(),
        &pivot.long_means(),
        theme,
    )
}

/// Grouped bars of standard deviation per function.
pub fn stability_chart(pivot: &SummaryPivot, theme: &ChartTheme) -> Result<String, BenchError> {
    grouped_bars(
        "Execution Time Stability (Standard Deviation)",
        "StdDev (seconds)",
        pivot.functions(),
        pivot.implementations(),
        &pivot.long_std_devs(),
        theme,
    )
}

/// Grouped box plots of raw `time_seconds` per function.
pub fn distribution_chart(table: &ResultTable, theme: &ChartTheme) -> Result<String, BenchError> {
    let functions = table.functions();
    let implementations = table.implementations();
    let y_max = axis_max(table.rows().iter().map(|r| Some(r.time_seconds)));
    let slot = GROUP_WIDTH / implementations.len().max(1) as f64;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (theme.width, theme.height)).into_drawing_area();
        root.fill(&theme.background).map_err(render_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption("Distribution of Execution Times per Function", theme.caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(0f64..functions.len().max(1) as f64, 0f64..y_max)
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_: &f64| String::new())
            .y_label_formatter(&|v: &f64| format_seconds(*v))
            .y_desc("Time (seconds)")
            .label_style(theme.label_font())
            .draw()
            .map_err(render_err)?;

        for (j, implementation) in implementations.iter().enumerate() {
            let color = theme.series_color(j);
            let boxes: Vec<(f64, BoxSummary)> = functions
                .iter()
                .enumerate()
                .filter_map(|(i, function)| {
                    let x = i as f64 + (1.0 - GROUP_WIDTH) / 2.0 + j as f64 * slot;
                    BoxSummary::from_samples(&table.times_for(implementation, function))
                        .map(|summary| (x, summary))
                })
                .collect();
            chart
                .draw_series(boxes.iter().map(|(x, b)| {
                    Rectangle::new([(*x, b.q1), (*x + slot * 0.9, b.q3)], color.mix(0.7).filled())
                }))
                .map_err(render_err)?
                .label(implementation.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            chart
                .draw_series(boxes.iter().flat_map(|(x, b)| {
                    let center = *x + slot * 0.45;
                    let right = *x + slot * 0.9;
                    [
                        PathElement::new(vec![(*x, b.median), (right, b.median)], theme.text.stroke_width(2)),
                        PathElement::new(vec![(center, b.q1), (center, b.low)], theme.text.stroke_width(1)),
                        PathElement::new(vec![(center, b.q3), (center, b.high)], theme.text.stroke_width(1)),
                    ]
                }))
                .map_err(render_err)?;
            chart
                .draw_series(boxes.iter().flat_map(|(x, b)| {
                    let center = *x + slot * 0.45;
                    b.outliers
                        .iter()
                        .map(move |v| Circle::new((center, *v), 3, color.filled()))
                        .collect::<Vec<_>>()
                }))
                .map_err(render_err)?;
        }
        chart
            .configure_series_labels()
            .background_style(&theme.background.mix(0.8))
            .border_style(&theme.text)
            .label_font(theme.label_font())
            .draw()
            .map_err(render_err)?;
        let anchors = function_anchors(functions.len(), |x| chart.backend_coord(&(x, 0.0)));
        draw_function_labels(&root, &functions, &anchors, theme)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Single-row heat map of the ratio column, annotated with each value.
/// Undefined cells are drawn in the neutral grey and labelled `n/a`.
pub fn ratio_heatmap(pivot: &SummaryPivot, theme: &ChartTheme) -> Result<String, BenchError> {
    let functions = pivot.functions();
    let ratios: Vec<Ratio> = pivot.ratios().map(|(_, ratio)| ratio).collect();
    let defined: Vec<f64> = ratios.iter().filter_map(Ratio::value).collect();
    let low = defined.iter().copied().fold(f64::INFINITY, f64::min);
    let high = defined.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let shade = |value: f64| {
        if high > low {
            theme.diverging((value - low) / (high - low))
        } else {
            theme.diverging(0.5)
        }
    };
    let title = format!("{}-to-{} Speed Ratio", pivot.spec().baseline, pivot.spec().comparison);
    let annotation = TextStyle::from(theme.label_font()).pos(Pos::new(HPos::Center, VPos::Center));

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (theme.width, theme.height / 2)).into_drawing_area();
        root.fill(&theme.background).map_err(render_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title.as_str(), theme.caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(40)
            .build_cartesian_2d(0f64..functions.len().max(1) as f64, 0f64..1f64)
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_label_formatter(&|_: &f64| String::new())
            .y_label_formatter(&|_: &f64| String::new())
            .y_desc(pivot.spec().column_name())
            .label_style(theme.label_font())
            .draw()
            .map_err(render_err)?;
        chart
            .draw_series(ratios.iter().enumerate().map(|(i, ratio)| {
                let fill = ratio.value().map(shade).unwrap_or(theme.undefined);
                Rectangle::new([(i as f64, 0.0), (i as f64 + 1.0, 1.0)], fill.filled())
            }))
            .map_err(render_err)?;
        chart
            .draw_series(ratios.iter().enumerate().map(|(i, ratio)| {
                let label = ratio
                    .value()
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "n/a".to_string());
                Text::new(label, (i as f64 + 0.5, 0.5), annotation.clone())
            }))
            .map_err(render_err)?;
        let anchors = function_anchors(functions.len(), |x| chart.backend_coord(&(x, 0.0)));
        draw_function_labels(&root, functions, &anchors, theme)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

fn grouped_bars(
    title: &str,
    y_label: &str,
    functions: &[String],
    implementations: &[String],
    cells: &[LongCell],
    theme: &ChartTheme,
) -> Result<String, BenchError> {
    let y_max = axis_max(cells.iter().map(|c| c.value));
    let slot = GROUP_WIDTH / implementations.len().max(1) as f64;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (theme.width, theme.height)).into_drawing_area();
        root.fill(&theme.background).map_err(render_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, theme.caption_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(0f64..functions.len().max(1) as f64, 0f64..y_max)
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_: &f64| String::new())
            .y_label_formatter(&|v: &f64| format_seconds(*v))
            .y_desc(y_label)
            .label_style(theme.label_font())
            .draw()
            .map_err(render_err)?;

        for (j, implementation) in implementations.iter().enumerate() {
            let color = theme.series_color(j);
            let bars = functions.iter().enumerate().filter_map(|(i, function)| {
                let value = cells
                    .iter()
                    .find(|c| &c.function == function && &c.implementation == implementation)
                    .and_then(|c| c.value)?;
                let x0 = i as f64 + (1.0 - GROUP_WIDTH) / 2.0 + j as f64 * slot;
                Some(Rectangle::new([(x0, 0.0), (x0 + slot * 0.95, value)], color.filled()))
            });
            chart
                .draw_series(bars)
                .map_err(render_err)?
                .label(implementation.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }
        chart
            .configure_series_labels()
            .background_style(&theme.background.mix(0.8))
            .border_style(&theme.text)
            .label_font(theme.label_font())
            .draw()
            .map_err(render_err)?;
        let anchors = function_anchors(functions.len(), |x| chart.backend_coord(&(x, 0.0)));
        draw_function_labels(&root, functions, &anchors, theme)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

#[derive(Clone, Debug, PartialEq)]
struct BoxSummary {
    q1: f64,
    median: f64,
    q3: f64,
    low: f64,
    high: f64,
    outliers: Vec<f64>,
}

impl BoxSummary {
    /// Whiskers reach the furthest samples within 1.5 IQR of the box.
    fn from_samples(samples: &[f64]) -> Option<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let q1 = stats::quantile(&sorted, 0.25)?;
        let median = stats::quantile(&sorted, 0.5)?;
        let q3 = stats::quantile(&sorted, 0.75)?;
        let reach = 1.5 * (q3 - q1);
        let inside = |v: &&f64| **v >= q1 - reach && **v <= q3 + reach;
        let low = sorted.iter().find(inside).copied().unwrap_or(q1);
        let high = sorted.iter().rev().find(inside).copied().unwrap_or(q3);
        let outliers = sorted.iter().filter(|v| !inside(v)).copied().collect();
        Some(Self {
            q1,
            median,
            q3,
            low,
            high,
            outliers,
        })
    }
}

fn function_anchors<F>(count: usize, to_backend: F) -> Vec<(i32, i32)>
where
    F: Fn(f64) -> (i32, i32),
{
    (0..count).map(|i| to_backend(i as f64 + 0.5)).collect()
}

fn draw_function_labels(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    functions: &[String],
    anchors: &[(i32, i32)],
    theme: &ChartTheme,
) -> Result<(), BenchError> {
    let style = TextStyle::from(theme.label_font()).pos(Pos::new(HPos::Center, VPos::Top));
    for (function, (x, y)) in functions.iter().zip(anchors) {
        root.draw(&Text::new(function.as_str(), (*x, *y + 8), style.clone()))
            .map_err(render_err)?;
    }
    Ok(())
}

/// Upper bound of the value axis; never empty even when every value is
/// missing or zero.
fn axis_max(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let max = values
        .flatten()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

fn format_seconds(value: f64) -> String {
    if value == 0.0 || value >= 0.01 {
        format!("{value:.3}")
    } else {
        format!("{value:.1e}")
    }
}

fn lerp(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

fn render_err<E: std::fmt::Display>(err: E) -> BenchError {
    BenchError::render(err.to_string())
}
