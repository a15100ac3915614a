use crate::view::{Page, RenderError};
use egui::Color32;
use log::warn;

pub const CURVE_TENSION: f64 = 0.3;
const SAMPLES_PER_SEGMENT: usize = 8;

pub const QUANTITY_COLOR: Color32 = Color32::from_rgb(54, 162, 235);
pub const REVENUE_COLOR: Color32 = Color32::from_rgb(255, 159, 64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPosition {
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub position: AxisPosition,
    pub begin_at_zero: bool,
    pub show_grid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub label: &'static str,
    pub axis_id: &'static str,
    pub data: Vec<f64>,
    pub color: Color32,
    pub fill: bool,
    pub tension: f64,
}

/// Declarative description of one dual-axis line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub canvas_id: String,
    pub labels: Vec<String>,
    pub x: AxisSpec,
    pub y: AxisSpec,
    pub y1: AxisSpec,
    pub quantity: SeriesSpec,
    pub revenue: SeriesSpec,
}

/// Builds the chart for `canvas_id` and binds it to that canvas.
///
/// The canvas must already exist in `page`; series are taken as given,
/// mismatched lengths included.
pub fn build_chart(
    page: &mut Page,
    canvas_id: &str,
    dates: &[String],
    quantities: &[f64],
    revenues: &[f64],
) -> Result<(), RenderError> {
    let card = page
        .canvas_mut(canvas_id)
        .ok_or_else(|| RenderError::MissingCanvas(canvas_id.to_string()))?;

    let chart = ChartSpec {
        canvas_id: canvas_id.to_string(),
        labels: dates.to_vec(),
        x: AxisSpec {
            id: "x",
            title: "Date",
            position: AxisPosition::Bottom,
            begin_at_zero: false,
            show_grid: true,
        },
        y: AxisSpec {
            id: "y",
            title: "Quantity",
            position: AxisPosition::Left,
            begin_at_zero: true,
            show_grid: true,
        },
        y1: AxisSpec {
            id: "y1",
            title: "Revenue",
            position: AxisPosition::Right,
            begin_at_zero: true,
            show_grid: false,
        },
        quantity: SeriesSpec {
            label: "Quantity",
            axis_id: "y",
            data: quantities.to_vec(),
            color: QUANTITY_COLOR,
            fill: true,
            tension: CURVE_TENSION,
        },
        revenue: SeriesSpec {
            label: "Revenue",
            axis_id: "y1",
            data: revenues.to_vec(),
            color: REVENUE_COLOR,
            fill: true,
            tension: CURVE_TENSION,
        },
    };

    if !chart.is_aligned() {
        warn!(
            "{canvas_id}: {} dates, {} quantities, {} revenues",
            dates.len(),
            quantities.len(),
            revenues.len()
        );
    }

    card.chart = Some(chart);
    Ok(())
}

impl ChartSpec {
    /// Factor mapping revenue values onto the quantity scale.
    ///
    /// The plot has one y scale, so the right axis is drawn by scaling revenue
    /// down (or up) to the quantity range and labelling it back.
    pub fn revenue_scale(&self) -> f64 {
        let max_q = max_value(&self.quantity.data);
        let max_r = max_value(&self.revenue.data);
        if max_q > 0.0 && max_r > 0.0 {
            max_q / max_r
        } else {
            1.0
        }
    }

    /// Points of a series in plot space: x is the date index.
    /// Only indices present in both the labels and the series are kept.
    pub fn points(&self, series: &SeriesSpec) -> Vec<[f64; 2]> {
        let scale = if series.axis_id == self.y1.id {
            self.revenue_scale()
        } else {
            1.0
        };
        self.labels
            .iter()
            .zip(&series.data)
            .enumerate()
            .map(|(i, (_, &v))| [i as f64, v * scale])
            .collect()
    }

    pub fn label_at(&self, x: f64) -> Option<&str> {
        let rounded = x.round();
        if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
            return None;
        }
        self.labels.get(rounded as usize).map(String::as_str)
    }

    pub fn is_aligned(&self) -> bool {
        self.labels.len() == self.quantity.data.len() && self.labels.len() == self.revenue.data.len()
    }
}

/// Decimals needed to tell ticks `step` apart, at most 6.
pub fn tick_decimals(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 || step >= 1.0 {
        return 0;
    }
    (-step.log10()).ceil().clamp(0.0, 6.0) as usize
}

fn max_value(data: &[f64]) -> f64 {
    data.iter().copied().fold(0.0, f64::max)
}

/// Smooths a polyline with cubic Bézier segments.
///
/// Control points sit `tension / 2` of the neighbour-to-neighbour span away
/// from each point, so a tension of zero gives back straight segments.
pub fn smooth(points: &[[f64; 2]], tension: f64) -> Vec<[f64; 2]> {
    if points.len() < 3 || tension <= 0.0 {
        return points.to_vec();
    }

    let k = tension / 2.0;
    let mut out = Vec::with_capacity((points.len() - 1) * SAMPLES_PER_SEGMENT + 1);
    out.push(points[0]);

    for i in 0..points.len() - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(points.len() - 1)];

        let c1 = [p1[0] + k * (p2[0] - p0[0]), p1[1] + k * (p2[1] - p0[1])];
        let c2 = [p2[0] - k * (p3[0] - p1[0]), p2[1] - k * (p3[1] - p1[1])];

        for s in 1..=SAMPLES_PER_SEGMENT {
            let t = s as f64 / SAMPLES_PER_SEGMENT as f64;
            out.push(bezier(p1, c1, c2, p2, t));
        }
    }

    out
}

fn bezier(p0: [f64; 2], c1: [f64; 2], c2: [f64; 2], p1: [f64; 2], t: f64) -> [f64; 2] {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    [
        a * p0[0] + b * c1[0] + c * c2[0] + d * p1[0],
        a * p0[1] + b * c1[1] + c * c2[1] + d * p1[1],
    ]
}
