//! Bar chart rendering

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::{debug, info};

use super::{ChartError, ChartOptions, Metric};
use crate::models::BenchmarkResult;
use crate::utils::Timer;

/// Values of one metric across all results, in input order
struct Panel {
    metric: Metric,
    values: Vec<f64>,
}

impl Panel {
    fn collect(metric: Metric, results: &[BenchmarkResult]) -> Result<Self, ChartError> {
        let values = results
            .iter()
            .map(|result| {
                metric.value(result).ok_or_else(|| ChartError::MissingMetric {
                    label: result.label.clone(),
                    metric,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { metric, values })
    }

    fn y_max(&self) -> f64 {
        let max = self.values.iter().copied().fold(0.0, f64::max);
        if max > 0.0 {
            max * 1.15
        } else {
            1.0
        }
    }
}

fn draw_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> ChartError {
    ChartError::Drawing(err.to_string())
}

/// Panel grid (rows, columns) for a number of panels
fn grid_shape(panels: usize) -> (usize, usize) {
    match panels {
        0 | 1 => (1, 1),
        2 => (1, 2),
        _ => (2, 2),
    }
}

/// Render a comparison bar chart to `path`, overwriting any existing file
pub fn render_comparison(
    results: &[BenchmarkResult],
    path: &Path,
    options: &ChartOptions,
) -> Result<(), ChartError> {
    if results.is_empty() {
        return Err(ChartError::NoResults);
    }
    options.validate()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(ChartError::MissingDirectory(parent.to_path_buf()));
        }
    }

    let panels = options
        .metrics
        .metrics()
        .into_iter()
        .map(|metric| Panel::collect(metric, results))
        .collect::<Result<Vec<_>, _>>()?;
    let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();

    let timer = Timer::start("render chart");
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let root = root
        .titled(&options.title, ("sans-serif", 28))
        .map_err(draw_err)?;

    let areas = root.split_evenly(grid_shape(panels.len()));
    for (area, panel) in areas.iter().zip(&panels) {
        draw_panel(area, panel, &labels)?;
    }

    root.present().map_err(draw_err)?;
    debug!(panels = panels.len(), "Chart drawn");
    info!(
        path = %path.display(),
        results = results.len(),
        elapsed_ms = timer.elapsed_ms(),
        "Wrote comparison chart"
    );
    timer.stop();
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    panel: &Panel,
    labels: &[&str],
) -> Result<(), ChartError> {
    let count = panel.values.len();

    let mut chart = ChartBuilder::on(area)
        .caption(panel.metric.title(), ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0..count).into_segmented(), 0f64..panel.y_max())
        .map_err(draw_err)?;

    let x_formatter = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(idx) => labels.get(*idx).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    };
    let y_formatter = |value: &f64| format!("{value:.1}");

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .y_desc(panel.metric.axis_label())
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(panel.values.iter().enumerate().map(|(idx, value)| {
            let style = Palette99::pick(idx).mix(0.85).filled();
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(idx), 0.0), (SegmentValue::Exact(idx + 1), *value)],
                style,
            );
            bar.set_margin(0, 0, 10, 10);
            bar
        }))
        .map_err(draw_err)?;

    let value_style = TextStyle::from(("sans-serif", 14).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(panel.values.iter().enumerate().map(|(idx, value)| {
            Text::new(
                panel.metric.format_value(*value),
                (SegmentValue::CenterOf(idx), *value),
                value_style.clone(),
            )
        }))
        .map_err(draw_err)?;

    Ok(())
}
