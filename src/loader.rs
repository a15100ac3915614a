use crate::model::TrendResponse;
use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use tokio::sync::oneshot;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("fetch thread stopped before delivering a result")]
    Disconnected,
}

/// Anything that can produce the trend payload.
#[async_trait]
pub trait TrendSource: Send + Sync + 'static {
    async fn fetch_trends(&self) -> Result<TrendResponse, FetchError>;
}

pub struct HttpTrendSource {
    client: Client,
    url: Url,
}

impl HttpTrendSource {
    pub fn new(base_url: &str, endpoint: &str) -> Result<Self, FetchError> {
        Ok(HttpTrendSource {
            client: Client::new(),
            url: resolve_endpoint(base_url, endpoint)?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl TrendSource for HttpTrendSource {
    async fn fetch_trends(&self) -> Result<TrendResponse, FetchError> {
        info!("fetching category trends: {}", self.url);
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        decode_trends(&body)
    }
}

/// Relative endpoints are joined onto the base, absolute ones replace it.
pub fn resolve_endpoint(base_url: &str, endpoint: &str) -> Result<Url, FetchError> {
    Ok(Url::parse(base_url)?.join(endpoint)?)
}

pub fn decode_trends(body: &[u8]) -> Result<TrendResponse, FetchError> {
    Ok(serde_json::from_slice(body)?)
}

/// Where fetch failures end up. Nothing is shown in the window.
pub trait Diagnostics {
    fn report(&mut self, err: &FetchError);
}

pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, err: &FetchError) {
        error!("failed to load category trends: {err}");
    }
}

/// Runs one fetch on its own thread and hands the outcome back over a channel.
/// `on_done` is called after the send so the UI can schedule a repaint.
pub fn spawn_fetch<S, F>(source: S, on_done: F) -> oneshot::Receiver<Result<TrendResponse, FetchError>>
where
    S: TrendSource,
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    std::thread::spawn(move || {
        let outcome = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(source.fetch_trends()),
            Err(e) => {
                error!("could not start fetch runtime: {e}");
                Err(FetchError::Disconnected)
            }
        };
        // The receiver is gone only if the window already closed
        let _ = tx.send(outcome);
        on_done();
    });

    rx
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn relative_endpoint_joins_base() {
        let url = resolve_endpoint("http://127.0.0.1:5000", "/category-trends").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/category-trends");
    }

    #[test]
    fn absolute_endpoint_replaces_base() {
        let url = resolve_endpoint("http://127.0.0.1:5000", "https://example.org/trends").unwrap();
        assert_eq!(url.as_str(), "https://example.org/trends");
    }

    #[test]
    fn bad_base_url_is_an_error() {
        let err = HttpTrendSource::new("not a url", "/category-trends").err().unwrap();
        assert!(matches!(err, FetchError::UrlParseError(_)));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = decode_trends(b"{\"dry_season_trends\": [").unwrap_err();
        assert!(matches!(err, FetchError::JsonError(_)));
    }

    #[test]
    fn decodes_body_bytes() {
        let body = br#"{"dry_season_trends": [], "rainy_season_trends": []}"#;
        let response = decode_trends(body).unwrap();
        assert!(response.dry_season_trends.is_empty());
        assert!(response.rainy_season_trends.is_empty());
    }

    #[tokio::test]
    async fn static_source_yields_payload() {
        let payload = TrendResponse {
            dry_season_trends: vec![trend("Rice", 3)],
            rainy_season_trends: vec![],
        };
        let got = StaticSource(payload.clone()).fetch_trends().await.unwrap();
        assert_eq!(got, payload);
    }

    #[test]
    fn spawned_fetch_delivers_payload() {
        let payload = TrendResponse {
            dry_season_trends: vec![trend("Rice", 2)],
            rainy_season_trends: vec![trend("Umbrellas", 2)],
        };
        let (done_tx, done_rx) = oneshot::channel();
        let rx = spawn_fetch(StaticSource(payload.clone()), move || {
            done_tx.send(()).unwrap();
        });

        let got = rx.blocking_recv().unwrap().unwrap();
        assert_eq!(got, payload);
        done_rx.blocking_recv().unwrap();
    }

    #[test]
    fn spawned_fetch_forwards_failure() {
        let rx = spawn_fetch(FailingSource, || {});
        let outcome = rx.blocking_recv().unwrap();
        assert!(matches!(outcome, Err(FetchError::JsonError(_))));
    }

    #[tokio::test]
    async fn refused_connection_is_an_http_error() {
        let source = HttpTrendSource::new(&refused_base_url(), "/category-trends").unwrap();
        let err = source.fetch_trends().await.unwrap_err();
        assert!(matches!(err, FetchError::HttpError(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn error_status_is_an_http_error() {
        let base = serve_once(http_response("503 Service Unavailable", "")).await;
        let source = HttpTrendSource::new(&base, "/category-trends").unwrap();

        let err = source.fetch_trends().await.unwrap_err();
        match err {
            FetchError::HttpError(e) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE))
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_source_decodes_payload() {
        let body = r#"{"dry_season_trends": [], "rainy_season_trends": []}"#;
        let base = serve_once(http_response("200 OK", body)).await;
        let source = HttpTrendSource::new(&base, "/category-trends").unwrap();

        let response = source.fetch_trends().await.unwrap();
        assert!(response.dry_season_trends.is_empty());
        assert!(response.rainy_season_trends.is_empty());
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let base = serve_once(http_response("200 OK", "<html>bad gateway</html>")).await;
        let source = HttpTrendSource::new(&base, "/category-trends").unwrap();

        let err = source.fetch_trends().await.unwrap_err();
        assert!(matches!(err, FetchError::JsonError(_)), "got {err:?}");
    }
}
