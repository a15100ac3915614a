use crate::chart::{smooth, tick_decimals, AxisPosition, AxisSpec, ChartSpec};
use crate::loader::{FetchError, LogDiagnostics};
use crate::model::{Season, TrendResponse};
use crate::view::{load_page, ChartCard, Page, SummaryCard};
use chrono::Datelike;
use eframe::egui;
use egui::{
    Color32, Context, FontFamily, FontId, Margin, RichText, Visuals, Stroke
};
use egui_plot::{AxisHints, GridInput, GridMark, HPlacement, Legend, Line, Plot, PlotPoints};
use log::{error, info};
use std::ops::RangeInclusive;
use tokio::sync::oneshot::{error::TryRecvError, Receiver};

const ACCENT: Color32 = Color32::from_rgb(120, 200, 170);
const MUTED: Color32 = Color32::from_rgb(160, 170, 180);
const CARD_FILL: Color32 = Color32::from_rgb(30, 36, 44);
const CARD_STROKE: Color32 = Color32::from_rgb(60, 72, 86);

pub fn set_custom_style(ctx: &Context) {
    let mut visuals = Visuals::dark();

    visuals.panel_fill = Color32::from_rgb(18, 22, 28);
    visuals.window_fill = Color32::from_rgb(24, 29, 36);
    visuals.extreme_bg_color = Color32::from_rgb(22, 27, 34);
    visuals.faint_bg_color = Color32::from_rgb(28, 34, 42);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(38, 46, 56);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, CARD_STROKE);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.5, ACCENT);

    visuals.selection.bg_fill = Color32::from_rgb(50, 90, 80);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = Margin::same(12);

    style.text_styles.insert(
        egui::TextStyle::Body,
        FontId::new(15.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Heading,
        FontId::new(22.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Small,
        FontId::new(12.0, FontFamily::Proportional),
    );

    ctx.set_style(style);
}

type FetchOutcome = Result<TrendResponse, FetchError>;

pub struct TrendApp {
    page: Page,
    pending: Option<Receiver<FetchOutcome>>,
    current_season: Option<Season>,
}

impl TrendApp {
    /// `page` must already hold the season containers.
    pub fn new(page: Page, pending: Receiver<FetchOutcome>) -> Self {
        Self {
            page,
            pending: Some(pending),
            current_season: Season::of_month(chrono::Local::now().month()),
        }
    }

    fn poll_fetch(&mut self) {
        let Some(rx) = &mut self.pending else { return };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(FetchError::Disconnected),
        };
        self.pending = None;

        if let Err(e) = load_page(&mut self.page, outcome, &mut LogDiagnostics) {
            error!("rendering stopped: {e}");
        } else {
            info!("category trends rendered");
        }
    }

    fn season_section(&self, ui: &mut egui::Ui, season: Season) {
        let mut title = RichText::new(season.title()).color(ACCENT).strong();
        if self.current_season == Some(season) {
            title = title.underline();
        }
        ui.heading(title);
        ui.add_space(6.0);

        let summary_id = season.summary_container();
        ui.horizontal_wrapped(|ui| {
            for (i, card) in self.page.summaries(&summary_id).enumerate() {
                summary_card(ui, (&summary_id, i), card);
            }
        });

        ui.add_space(10.0);

        for card in self.page.charts(&season.charts_container()) {
            chart_card(ui, card);
            ui.add_space(8.0);
        }
    }
}

impl eframe::App for TrendApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_fetch();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading(RichText::new("📈 Seasonal Category Trends")
                    .color(ACCENT)
                    .strong()
                    .size(24.0)
                );
                if let Some(season) = self.current_season {
                    ui.separator();
                    ui.label(RichText::new(format!("Now: {}", season.title())).color(MUTED));
                }
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.pending.is_some() {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(100.0);
                        ui.spinner();
                        ui.label(RichText::new("Fetching category trends…").color(MUTED));
                    });
                });
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                for season in Season::ALL {
                    self.season_section(ui, season);
                    ui.add_space(12.0);
                    ui.separator();
                }
            });
        });
    }
}

fn trend_color(label: &str) -> Color32 {
    match label.to_lowercase().as_str() {
        "increasing" => Color32::from_rgb(100, 220, 120),
        "decreasing" => Color32::from_rgb(240, 110, 110),
        _ => Color32::LIGHT_GRAY,
    }
}

fn summary_card(ui: &mut egui::Ui, grid_id: (&str, usize), card: &SummaryCard) {
    egui::Frame::new()
        .fill(CARD_FILL)
        .stroke(Stroke::new(1.0, CARD_STROKE))
        .inner_margin(Margin::same(12))
        .corner_radius(egui::CornerRadius::same(6))
        .show(ui, |ui| {
            ui.set_width(250.0);
            ui.label(RichText::new(&card.category).strong().size(17.0));
            ui.separator();

            egui::Grid::new(grid_id)
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    let rows = [
                        ("Forecast qty", &card.forecast_quantity),
                        ("Historical qty", &card.historical_quantity),
                        ("Forecast revenue", &card.forecast_revenue),
                        ("Historical revenue", &card.historical_revenue),
                    ];
                    for (name, value) in rows {
                        ui.label(RichText::new(name).color(MUTED));
                        ui.label(RichText::new(value.as_str()).monospace());
                        ui.end_row();
                    }

                    ui.label(RichText::new("Trend").color(MUTED));
                    ui.label(RichText::new(&card.trend).color(trend_color(&card.trend)).strong());
                    ui.end_row();
                });
        });
}

fn chart_card(ui: &mut egui::Ui, card: &ChartCard) {
    egui::Frame::new()
        .fill(CARD_FILL)
        .stroke(Stroke::new(1.0, CARD_STROKE))
        .inner_margin(Margin::same(12))
        .corner_radius(egui::CornerRadius::same(6))
        .show(ui, |ui| {
            ui.label(RichText::new(&card.category).strong().size(17.0));
            match &card.chart {
                Some(chart) => draw_chart(ui, chart),
                None => {
                    ui.label(RichText::new("No chart").color(MUTED).small());
                }
            }
        });
}

fn draw_chart(ui: &mut egui::Ui, chart: &ChartSpec) {
    let scale = chart.revenue_scale();
    let tick_count = chart.labels.len();
    let ticks = chart.clone();

    let quantity_axis = AxisHints::new_y()
        .label(chart.y.title)
        .placement(placement(&chart.y));
    let revenue_axis = AxisHints::new_y()
        .label(chart.y1.title)
        .placement(placement(&chart.y1))
        .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            format!("{:.*}", tick_decimals(mark.step_size / scale), mark.value / scale)
        });

    let mut plot = Plot::new(&chart.canvas_id)
        .height(260.0)
        .legend(Legend::default())
        .allow_scroll(false)
        // Horizontal grid lines follow the quantity axis only
        .show_grid([chart.x.show_grid, chart.y.show_grid])
        .x_axis_label(chart.x.title)
        .custom_y_axes(vec![quantity_axis, revenue_axis])
        .x_grid_spacer(move |input: GridInput| {
            (0..tick_count)
                .map(|i| GridMark { value: i as f64, step_size: 1.0 })
                .filter(|m| m.value >= input.bounds.0 && m.value <= input.bounds.1)
                .collect()
        })
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            ticks.label_at(mark.value).unwrap_or_default().to_string()
        });

    if chart.y.begin_at_zero || chart.y1.begin_at_zero {
        plot = plot.include_y(0.0);
    }

    plot.show(ui, |plot_ui| {
        for series in [&chart.quantity, &chart.revenue] {
            let points = smooth(&chart.points(series), series.tension);
            let mut line = Line::new(series.label, PlotPoints::from(points))
                .color(series.color)
                .width(2.0);
            if series.fill {
                line = line.fill(0.0);
            }
            plot_ui.line(line);
        }
    });
}

fn placement(axis: &AxisSpec) -> HPlacement {
    match axis.position {
        AxisPosition::Right => HPlacement::Right,
        AxisPosition::Left | AxisPosition::Bottom => HPlacement::Left,
    }
}
