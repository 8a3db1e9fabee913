//! Review API adapter (reqwest).
//!
//! Implements the `hwb-core` ReviewApi port over the homework statuses endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};

use hwb_core::{config::Config, domain::Cursor, errors::Error, ports::ReviewApi, Result};

#[derive(Clone)]
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl PracticumClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.endpoint.clone(),
            cfg.credentials.practicum_token.clone(),
            cfg.request_timeout,
        )
    }

    fn request(&self, from_date: Cursor) -> reqwest::RequestBuilder {
        self.http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date.0)])
    }
}

/// Anything but 200 is a transport failure.
fn check_status(status: StatusCode) -> Result<()> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(Error::HttpStatus {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl ReviewApi for PracticumClient {
    async fn fetch(&self, from_date: Option<Cursor>) -> Result<serde_json::Value> {
        let from_date = from_date.unwrap_or_else(Cursor::now);
        tracing::debug!(endpoint = %self.endpoint, %from_date, "requesting homework statuses");

        let resp = self
            .request(from_date)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("review API request error: {e}")))?;

        let status = resp.status();
        if let Err(e) = check_status(status) {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %body.chars().take(200).collect::<String>(),
                "review API returned an unexpected status"
            );
            return Err(e);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Transport(format!("review API read error: {e}")))?;
        let v: serde_json::Value = serde_json::from_str(&body)?;

        tracing::debug!(%from_date, "homework statuses received");
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on a random local port and return its URL.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut req = Vec::new();
            let mut buf = [0u8; 1024];
            while !req.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                req.extend_from_slice(&buf[..n]);
            }
            let resp = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(resp.as_bytes()).unwrap();
        });
        format!("http://{addr}/homework_statuses/")
    }

    fn local_client(endpoint: String) -> PracticumClient {
        PracticumClient::new(endpoint, "secret", Duration::from_secs(5)).unwrap()
    }

    fn client() -> PracticumClient {
        PracticumClient::new(
            "https://practicum.example/api/user_api/homework_statuses/",
            "secret",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn request_carries_oauth_header_and_from_date() {
        let req = client().request(Cursor(1_655_919_707)).build().unwrap();

        assert_eq!(req.method(), reqwest::Method::GET);
        assert_eq!(
            req.url().as_str(),
            "https://practicum.example/api/user_api/homework_statuses/?from_date=1655919707"
        );
        assert_eq!(
            req.headers().get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "OAuth secret"
        );
    }

    #[test]
    fn only_200_is_success() {
        assert!(check_status(StatusCode::OK).is_ok());
        for code in [
            StatusCode::NO_CONTENT,
            StatusCode::UNAUTHORIZED,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = check_status(code).unwrap_err();
            assert!(matches!(err, Error::HttpStatus { status } if status == code.as_u16()));
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let client = PracticumClient::new(
            "http://127.0.0.1:9/homework_statuses/",
            "secret",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.fetch(Some(Cursor(0))).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn fetch_decodes_json_body() {
        let url = serve_once("200 OK", r#"{"homeworks": [], "current_date": 1700000000}"#);

        let v = local_client(url).fetch(Some(Cursor(0))).await.unwrap();

        assert_eq!(v["current_date"], 1_700_000_000);
        assert!(v["homeworks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_maps_503_to_http_status() {
        let url = serve_once("503 Service Unavailable", "");

        let err = local_client(url).fetch(None).await.unwrap_err();

        assert!(matches!(err, Error::HttpStatus { status: 503 }));
    }

    #[tokio::test]
    async fn fetch_maps_malformed_body_to_decode_error() {
        let url = serve_once("200 OK", "<html>nope");

        let err = local_client(url).fetch(Some(Cursor(0))).await.unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }
}
