//! Data sources the gateway reads from.
//! `HttpSource` talks to the flag web service, `FileSource` reads a local copy
//! of its `static/data` documents.

use crate::gateway::GatewayError;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const USER_AGENT: &str = concat!("flagday/", env!("CARGO_PKG_VERSION"));

/// Read access to named JSON documents
pub trait Source: Send + Sync {
    /// Returns the raw body of `resource` (e.g., `static/data/flag.json`)
    fn read(&self, resource: &str) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// The write side of the flag service
pub trait FlagCommand: Send + Sync {
    /// Asks the service to show `country` and returns its confirmation text
    fn submit(
        &self,
        resource: &str,
        country: &str,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// Builds the shared HTTP client used by every remote call
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Flag web service reachable under `base_url`
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    fn url(&self, resource: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            resource.trim_start_matches('/')
        )
    }
}

/// Milliseconds since the epoch, used to defeat intermediate caches
fn cache_buster() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis()
        .to_string()
}

impl Source for HttpSource {
    async fn read(&self, resource: &str) -> Result<String, GatewayError> {
        let url = self.url(resource);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("_", cache_buster())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                resource: resource.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

impl FlagCommand for HttpSource {
    async fn submit(&self, resource: &str, country: &str) -> Result<String, GatewayError> {
        let url = self.url(resource);
        tracing::debug!("POST {} ({})", url, country);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "country": country }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Rejected(body));
        }
        Ok(body)
    }
}

/// Documents stored under a local directory
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Source for FileSource {
    async fn read(&self, resource: &str) -> Result<String, GatewayError> {
        let path = self.root.join(resource.trim_start_matches('/'));
        tracing::debug!("Reading {:?}", path);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| GatewayError::Io { path, source })
    }
}

impl FlagCommand for FileSource {
    async fn submit(&self, _resource: &str, _country: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Unsupported("changing the flag of a local data directory"))
    }
}

/// Source chosen at runtime from configuration
#[derive(Debug, Clone)]
pub enum AnySource {
    Http(HttpSource),
    Local(FileSource),
}

impl Source for AnySource {
    async fn read(&self, resource: &str) -> Result<String, GatewayError> {
        match self {
            AnySource::Http(source) => source.read(resource).await,
            AnySource::Local(source) => source.read(resource).await,
        }
    }
}

impl FlagCommand for AnySource {
    async fn submit(&self, resource: &str, country: &str) -> Result<String, GatewayError> {
        match self {
            AnySource::Http(source) => source.submit(resource, country).await,
            AnySource::Local(source) => source.submit(resource, country).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves exactly one canned HTTP response and returns the raw request
    pub(crate) async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    #[tokio::test]
    async fn test_http_read_adds_cache_buster() {
        let (base, server) = serve_once("200 OK", r#"{"country":"Peru"}"#).await;
        let source = HttpSource::new(format!("{}/", base), Duration::from_secs(5)).unwrap();

        let body = source.read("/static/data/flag.json").await.unwrap();
        assert_eq!(body, r#"{"country":"Peru"}"#);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /static/data/flag.json?_="), "{}", request);
    }

    #[tokio::test]
    async fn test_http_read_status_error() {
        let (base, server) = serve_once("404 Not Found", "missing").await;
        let source = HttpSource::new(base, Duration::from_secs(5)).unwrap();

        let err = source.read("static/data/flag.json").await.unwrap_err();
        assert!(matches!(err, GatewayError::Status { status: 404, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_submit_posts_country() {
        let (base, server) = serve_once("200 OK", "Flag changed to Chile").await;
        let source = HttpSource::new(base, Duration::from_secs(5)).unwrap();

        let reply = source.submit("change-flag", "Chile").await.unwrap();
        assert_eq!(reply, "Flag changed to Chile");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /change-flag"));
        assert!(request.ends_with(r#"{"country":"Chile"}"#), "{}", request);
    }

    #[tokio::test]
    async fn test_http_submit_rejected() {
        let (base, server) = serve_once("400 Bad Request", "Country not provided").await;
        let source = HttpSource::new(base, Duration::from_secs(5)).unwrap();

        let err = source.submit("change-flag", "Chile").await.unwrap_err();
        match err {
            GatewayError::Rejected(message) => assert_eq!(message, "Country not provided"),
            other => panic!("unexpected error: {other}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("static/data")).unwrap();
        std::fs::write(dir.path().join("static/data/flag.json"), "{}").unwrap();

        let source = AnySource::Local(FileSource::new(dir.path()));
        assert_eq!(source.read("static/data/flag.json").await.unwrap(), "{}");

        let err = source.read("static/data/countries.json").await.unwrap_err();
        assert!(matches!(err, GatewayError::Io { .. }));

        let err = source.submit("change-flag", "Chile").await.unwrap_err();
        assert!(matches!(err, GatewayError::Unsupported(_)));
    }
}
