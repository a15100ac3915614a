use crate::chart::{build_chart, ChartSpec};
use crate::loader::{Diagnostics, FetchError};
use crate::model::{CategoryTrend, Season, TrendResponse};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no container with id `{0}`")]
    MissingContainer(String),
    #[error("no canvas with id `{0}`")]
    MissingCanvas(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub category: String,
    pub forecast_quantity: String,
    pub historical_quantity: String,
    pub forecast_revenue: String,
    pub historical_revenue: String,
    pub trend: String,
}

impl SummaryCard {
    pub fn from_trend(t: &CategoryTrend) -> Self {
        SummaryCard {
            category: t.category.clone(),
            forecast_quantity: fixed(t.forecast_quantity, 0),
            historical_quantity: fixed(t.historical_quantity, 0),
            forecast_revenue: format_php(t.forecast_total_php),
            historical_revenue: format_php(t.historical_total_php),
            trend: t.trend.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartCard {
    pub category: String,
    pub canvas_id: String,
    /// Filled in by the chart builder once the card is on the page.
    pub chart: Option<ChartSpec>,
}

impl ChartCard {
    pub fn new(category: &str, canvas_id: &str) -> Self {
        ChartCard {
            category: category.to_string(),
            canvas_id: canvas_id.to_string(),
            chart: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Summary(SummaryCard),
    Chart(ChartCard),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    pub children: Vec<Card>,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Container { id: id.into(), children: Vec::new() }
    }

    pub fn append(&mut self, card: Card) {
        self.children.push(card);
    }
}

/// In-memory stand-in for the page's element tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    containers: Vec<Container>,
}

impl Page {
    pub fn new(containers: Vec<Container>) -> Self {
        Page { containers }
    }

    /// `dry-summary`, `dry-charts`, `rainy-summary`, `rainy-charts`.
    pub fn with_season_containers() -> Self {
        let containers = Season::ALL
            .iter()
            .flat_map(|s| [Container::new(s.summary_container()), Container::new(s.charts_container())])
            .collect();
        Page::new(containers)
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn container_mut(&mut self, id: &str) -> Result<&mut Container, RenderError> {
        self.containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RenderError::MissingContainer(id.to_string()))
    }

    /// Latest chart card carrying `id`; re-rendering reuses ids.
    pub fn canvas(&self, id: &str) -> Option<&ChartCard> {
        self.containers
            .iter()
            .flat_map(|c| c.children.iter())
            .filter_map(|card| match card {
                Card::Chart(chart) if chart.canvas_id == id => Some(chart),
                _ => None,
            })
            .last()
    }

    pub fn canvas_mut(&mut self, id: &str) -> Option<&mut ChartCard> {
        self.containers
            .iter_mut()
            .flat_map(|c| c.children.iter_mut())
            .filter_map(|card| match card {
                Card::Chart(chart) if chart.canvas_id == id => Some(chart),
                _ => None,
            })
            .last()
    }

    pub fn summaries(&self, container_id: &str) -> impl Iterator<Item = &SummaryCard> {
        self.children_of(container_id).filter_map(|card| match card {
            Card::Summary(s) => Some(s),
            _ => None,
        })
    }

    pub fn charts(&self, container_id: &str) -> impl Iterator<Item = &ChartCard> {
        self.children_of(container_id).filter_map(|card| match card {
            Card::Chart(c) => Some(c),
            _ => None,
        })
    }

    fn children_of(&self, container_id: &str) -> impl Iterator<Item = &Card> {
        self.container(container_id)
            .into_iter()
            .flat_map(|c| c.children.iter())
    }
}

pub fn canvas_id(prefix: &str, index: usize) -> String {
    format!("{prefix}-chart-{index}")
}

/// Appends a summary card and a chart card per trend, then builds its chart.
///
/// Appending is not idempotent. The first failure stops the loop and is
/// returned as-is; cards appended before it stay on the page.
pub fn render_season(page: &mut Page, trends: &[CategoryTrend], prefix: &str) -> Result<(), RenderError> {
    let summary_id = format!("{prefix}-summary");
    let charts_id = format!("{prefix}-charts");

    for (i, t) in trends.iter().enumerate() {
        page.container_mut(&summary_id)?
            .append(Card::Summary(SummaryCard::from_trend(t)));

        let id = canvas_id(prefix, i);
        page.container_mut(&charts_id)?
            .append(Card::Chart(ChartCard::new(&t.category, &id)));

        build_chart(page, &id, &t.dates, &t.quantities, &t.revenues)?;
    }

    Ok(())
}

/// Applies one fetch outcome to the page.
///
/// Fetch failures are reported once and leave every container untouched.
/// Render failures are not caught here.
pub fn load_page(
    page: &mut Page,
    outcome: Result<TrendResponse, FetchError>,
    diagnostics: &mut impl Diagnostics,
) -> Result<(), RenderError> {
    let response = match outcome {
        Ok(r) => r,
        Err(e) => {
            diagnostics.report(&e);
            return Ok(());
        }
    };

    for season in Season::ALL {
        render_season(page, response.trends_for(season), season.prefix())?;
    }
    Ok(())
}

// Enough fractional digits to print any finite f64 exactly
const EXACT_DIGITS: usize = 1100;

/// Fixed-point text of the exact binary value, exact ties rounded away from zero.
pub fn fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() || decimals >= EXACT_DIGITS {
        return format!("{:.*}", decimals, value);
    }

    let exact = format!("{:.*}", EXACT_DIGITS, value);
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let rest = &frac[decimals..];
    let is_tie = rest.starts_with('5') && rest[1..].bytes().all(|b| b == b'0');
    if !is_tie {
        // std formatting rounds the exact value; only ties go half-to-even
        return format!("{:.*}", decimals, value);
    }

    let mut digits = format!("{int_part}{}", &frac[..decimals]).into_bytes();
    increment_magnitude(&mut digits);
    if decimals > 0 {
        digits.insert(digits.len() - decimals, b'.');
    }
    String::from_utf8(digits).unwrap_or_default()
}

/// Adds one to the last digit of an optionally signed digit string.
fn increment_magnitude(digits: &mut Vec<u8>) {
    let start = usize::from(digits.first() == Some(&b'-'));
    for i in (start..digits.len()).rev() {
        if digits[i] == b'9' {
            digits[i] = b'0';
        } else {
            digits[i] += 1;
            return;
        }
    }
    digits.insert(start, b'1');
}

pub fn format_php(value: f64) -> String {
    format!("₱{}", fixed(value, 2))
}
