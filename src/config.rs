use clap::Parser;

/// Desktop dashboard for seasonal category forecasts.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Base URL of the forecasting service
    #[arg(long, env = "TRENDS_BASE_URL", default_value = "http://127.0.0.1:5000")]
    pub base_url: String,

    /// Trend endpoint, relative to the base URL or absolute
    #[arg(long, env = "TRENDS_ENDPOINT", default_value = "/category-trends")]
    pub endpoint: String,

    #[arg(long, default_value_t = 1400.0)]
    pub width: f32,

    #[arg(long, default_value_t = 900.0)]
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_service() {
        let config = Config::try_parse_from(["season_trends"]).unwrap();
        assert_eq!(config.endpoint, "/category-trends");
        assert_eq!(config.width, 1400.0);
        assert_eq!(config.height, 900.0);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "season_trends",
            "--base-url",
            "https://forecast.example.org",
            "--endpoint",
            "/v2/category-trends",
            "--width",
            "1600",
        ])
        .unwrap();
        assert_eq!(config.base_url, "https://forecast.example.org");
        assert_eq!(config.endpoint, "/v2/category-trends");
        assert_eq!(config.width, 1600.0);
    }
}
