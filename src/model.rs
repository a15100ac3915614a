use serde::{Serialize, Deserialize};

/// Payload served by the forecasting backend at `/category-trends`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResponse {
    pub dry_season_trends: Vec<CategoryTrend>,
    pub rainy_season_trends: Vec<CategoryTrend>,
}

impl TrendResponse {
    pub fn trends_for(&self, season: Season) -> &[CategoryTrend] {
        match season {
            Season::Dry => &self.dry_season_trends,
            Season::Rainy => &self.rainy_season_trends,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub category: String,

    pub forecast_quantity: f64,
    pub historical_quantity: f64,

    pub forecast_total_php: f64,
    pub historical_total_php: f64,

    // Free-form label from the forecaster, shown as-is
    pub trend: String,

    pub dates: Vec<String>,
    pub quantities: Vec<f64>,
    pub revenues: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Dry,
    Rainy,
}

impl Season {
    pub const ALL: [Season; 2] = [Season::Dry, Season::Rainy];

    /// Prefix used to namespace container and canvas ids.
    pub fn prefix(self) -> &'static str {
        match self {
            Season::Dry => "dry",
            Season::Rainy => "rainy",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Season::Dry => "🌞 Dry Season (Dec–May)",
            Season::Rainy => "🌧 Rainy Season (Jun–Nov)",
        }
    }

    /// Dry season runs December through May, everything else is rainy.
    pub fn of_month(month: u32) -> Option<Season> {
        match month {
            12 | 1..=5 => Some(Season::Dry),
            6..=11 => Some(Season::Rainy),
            _ => None,
        }
    }

    pub fn summary_container(self) -> String {
        format!("{}-summary", self.prefix())
    }

    pub fn charts_container(self) -> String {
        format!("{}-charts", self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trend_json() -> serde_json::Value {
        json!({
            "category": "Beverages",
            "forecast_quantity": 120.4,
            "historical_quantity": 98.0,
            "forecast_total_php": 15234.5,
            "historical_total_php": 12000.0,
            "trend": "increasing",
            "dates": ["2024-01", "2024-02"],
            "quantities": [10, 20],
            "revenues": [100.5, 200.25]
        })
    }

    #[test]
    fn decodes_complete_payload() {
        let payload = json!({
            "dry_season_trends": [trend_json()],
            "rainy_season_trends": []
        });
        let response: TrendResponse = serde_json::from_value(payload).unwrap();

        assert_eq!(response.dry_season_trends.len(), 1);
        assert!(response.rainy_season_trends.is_empty());

        let t = &response.dry_season_trends[0];
        assert_eq!(t.category, "Beverages");
        assert_eq!(t.quantities, vec![10.0, 20.0]);
        assert_eq!(t.revenues, vec![100.5, 200.25]);
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut trend = trend_json();
        trend.as_object_mut().unwrap().remove("revenues");
        let payload = json!({
            "dry_season_trends": [trend],
            "rainy_season_trends": []
        });

        let err = serde_json::from_value::<TrendResponse>(payload).unwrap_err();
        assert!(err.to_string().contains("revenues"));
    }

    #[test]
    fn missing_season_is_rejected() {
        let payload = json!({ "dry_season_trends": [] });
        assert!(serde_json::from_value::<TrendResponse>(payload).is_err());
    }

    #[test]
    fn trend_label_is_kept_verbatim() {
        let mut trend = trend_json();
        trend["trend"] = json!("Sideways, maybe");
        let t: CategoryTrend = serde_json::from_value(trend).unwrap();
        assert_eq!(t.trend, "Sideways, maybe");
    }

    #[test]
    fn months_map_to_seasons() {
        for m in [12, 1, 2, 3, 4, 5] {
            assert_eq!(Season::of_month(m), Some(Season::Dry));
        }
        for m in 6..=11 {
            assert_eq!(Season::of_month(m), Some(Season::Rainy));
        }
        assert_eq!(Season::of_month(0), None);
        assert_eq!(Season::of_month(13), None);
    }

    #[test]
    fn container_ids_use_prefix() {
        assert_eq!(Season::Dry.summary_container(), "dry-summary");
        assert_eq!(Season::Rainy.charts_container(), "rainy-charts");
    }
}
