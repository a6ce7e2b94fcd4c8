//! Terminal visualization using braille graphics
//!
//! Reliability and hazard curves, the Weibull probability plot and cost
//! curves are drawn on a drawille canvas; histograms use block bars.

use drawille::Canvas;

use crate::core::fit::WeibullFitResult;
use crate::core::maintenance::CostPoint;
use crate::core::simulation::HistogramBin;
use crate::core::weibull::CurvePoint;

/// Default canvas size for curve charts (in braille dots)
pub const CHART_WIDTH: u32 = 120;
pub const CHART_HEIGHT: u32 = 48;

/// Longest histogram bar in characters
const BAR_MAX_WIDTH: usize = 50;

/// Axis ranges of a chart
#[derive(Debug, Clone, Copy)]
struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Bounds {
    fn of(points: &[(f64, f64)]) -> Option<Self> {
        let finite: Vec<&(f64, f64)> = points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if finite.is_empty() {
            return None;
        }

        let mut b = Bounds {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for &&(x, y) in &finite {
            b.x_min = b.x_min.min(x);
            b.x_max = b.x_max.max(x);
            b.y_min = b.y_min.min(y);
            b.y_max = b.y_max.max(y);
        }

        // Flat series still need a visible extent
        if b.x_max - b.x_min <= 0.0 {
            b.x_max = b.x_min + 1.0;
        }
        if b.y_max - b.y_min <= 0.0 {
            b.y_max = b.y_min + 1.0;
        }
        Some(b)
    }

    fn to_canvas(&self, x: f64, y: f64, width: u32, height: u32) -> (u32, u32) {
        let fx = (x - self.x_min) / (self.x_max - self.x_min);
        let fy = (y - self.y_min) / (self.y_max - self.y_min);
        let px = (fx.clamp(0.0, 1.0) * (width - 1) as f64).round() as u32;
        // Y inverted
        let py = ((1.0 - fy.clamp(0.0, 1.0)) * (height - 1) as f64).round() as u32;
        (px, py)
    }
}

/// Draw a polyline through `points`, with axes along the bottom and left edges
fn draw_series(canvas: &mut Canvas, points: &[(f64, f64)], bounds: &Bounds, width: u32, height: u32) {
    for i in 0..width {
        canvas.set(i, height - 1);
    }
    for i in 0..height {
        canvas.set(0, i);
    }

    let mapped: Vec<(u32, u32)> = points
        .iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|&(x, y)| bounds.to_canvas(x, y, width, height))
        .collect();

    for pair in mapped.windows(2) {
        let (x0, y0) = (pair[0].0 as f64, pair[0].1 as f64);
        let (x1, y1) = (pair[1].0 as f64, pair[1].1 as f64);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1.0) as u32;
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            canvas.set(
                (x0 + (x1 - x0) * t).round() as u32,
                (y0 + (y1 - y0) * t).round() as u32,
            );
        }
    }
    if let [(x, y)] = mapped.as_slice() {
        canvas.set(*x, *y);
    }
}

fn chart(
    title: &str,
    points: &[(f64, f64)],
    x_label: &str,
    width: u32,
    height: u32,
    markers_only: bool,
) -> String {
    let Some(bounds) = Bounds::of(points) else {
        return format!("{}:\n  (no finite points)", title);
    };

    let mut canvas = Canvas::new(width, height);
    if markers_only {
        for i in 0..width {
            canvas.set(i, height - 1);
        }
        for i in 0..height {
            canvas.set(0, i);
        }
        for &(x, y) in points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
            let (px, py) = bounds.to_canvas(x, y, width, height);
            canvas.set(px, py);
            canvas.set(px.saturating_add(1).min(width - 1), py);
            canvas.set(px, py.saturating_add(1).min(height - 1));
        }
    } else {
        draw_series(&mut canvas, points, &bounds, width, height);
    }

    let mut output = String::new();
    output.push_str(&format!("{}:\n", title));
    output.push_str(&format!("  max {}\n", format_axis(bounds.y_max)));
    output.push_str(&canvas.frame());
    output.push_str(&format!("\n  min {}\n", format_axis(bounds.y_min)));
    output.push_str(&format!(
        "  {}: {} .. {}",
        x_label,
        format_axis(bounds.x_min),
        format_axis(bounds.x_max)
    ));
    output
}

fn format_axis(value: f64) -> String {
    if value.abs() >= 1e6 || (value != 0.0 && value.abs() < 1e-3) {
        format!("{:.3e}", value)
    } else {
        format!("{:.3}", value)
    }
}

/// Render a curve (R(t), h(t) or F(t)) against time
pub fn render_curve(title: &str, curve: &[CurvePoint], unit: &str) -> String {
    let points: Vec<(f64, f64)> = curve.iter().map(|p| (p.time, p.value)).collect();
    chart(
        title,
        &points,
        &format!("t [{}]", unit),
        CHART_WIDTH,
        CHART_HEIGHT,
        false,
    )
}

/// Render cost per unit time against the PM interval
pub fn render_cost_curve(curve: &[CostPoint], unit: &str) -> String {
    let points: Vec<(f64, f64)> = curve.iter().map(|p| (p.interval, p.cost)).collect();
    chart(
        "Cost rate vs. PM interval",
        &points,
        &format!("T [{}]", unit),
        CHART_WIDTH,
        CHART_HEIGHT,
        false,
    )
}

/// Weibull probability plot: ln(t) against ln(-ln(1 - F)) for every ranked
/// point, overlaid with the fitted line.
pub fn render_probability_plot(fit: &WeibullFitResult) -> String {
    let mut points: Vec<(f64, f64)> = fit
        .data_points
        .iter()
        .map(|p| (p.time.ln(), (-(1.0 - p.median_rank).ln()).ln()))
        .collect();

    // Fitted line y = beta * (x - ln eta), sampled across the data range
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        let steps = 40;
        for i in 0..=steps {
            let x = first.0 + (last.0 - first.0) * i as f64 / steps as f64;
            points.push((x, fit.beta * (x - fit.eta.ln())));
        }
    }

    chart(
        "Weibull probability plot",
        &points,
        "ln(t)",
        CHART_WIDTH,
        CHART_HEIGHT,
        true,
    )
}

/// Render histogram bins as horizontal bars
pub fn render_histogram(bins: &[HistogramBin], title: &str) -> String {
    let total: u64 = bins.iter().map(|b| b.count).sum();
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);

    let mut lines = vec![format!("{} ({} events, {} bins):", title, total, bins.len())];
    if max_count == 0 {
        lines.push("  (no events)".to_string());
        return lines.join("\n");
    }

    for bin in bins {
        let bar_width = (bin.count as f64 / max_count as f64 * BAR_MAX_WIDTH as f64) as usize;
        let bar = if bar_width == 0 && bin.count > 0 {
            "░".to_string()
        } else {
            "█".repeat(bar_width)
        };
        lines.push(format!(
            "  {:>10} - {:<10} │{} {}",
            format_axis(bin.start),
            format_axis(bin.end),
            bar,
            bin.count
        ));
    }
    lines.join("\n")
}
