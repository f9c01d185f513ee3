use std::time::Duration;

use isahc::{error::ErrorKind, prelude::AsyncReadResponseExt};

use crate::{Error, error::FetchError};

/// Every provider request is cut off after this long.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct HttpClient {
    inner: isahc::HttpClient,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let inner = isahc::HttpClient::builder()
            .default_header("user-agent", format!("myip/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { inner, timeout })
    }

    /// GET `url` and return the trimmed body.
    ///
    /// The request future lives inside its own timeout scope; when the bound
    /// elapses the scope drops it and curl aborts the transfer. Nothing is
    /// retried.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let request = async {
            let mut response = self.inner.get_async(url).await.map_err(classify)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status));
            }
            let body = response.text().await.map_err(FetchError::Body)?;
            Ok(body.trim().to_string())
        };

        let result = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_elapsed) => Err(FetchError::Timeout),
        };
        if let Err(err) = &result {
            warn!("Error fetching {}: {}", url, err);
        }
        result
    }
}

/// Transport failures are reported as blocked: an extension, a firewall or a
/// missing route all look the same from here. A server that answered with
/// something unusable is an error instead.
fn classify(err: isahc::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout;
    }
    if is_request_fault(err.kind()) {
        FetchError::Request(err)
    } else {
        FetchError::Blocked(err)
    }
}

fn is_request_fault(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::InvalidRequest
            | ErrorKind::ClientInitialization
            | ErrorKind::ProtocolViolation
            | ErrorKind::TooManyRedirects
            | ErrorKind::InvalidContentEncoding
    )
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn trims_successful_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  198.51.100.7\n"))
            .mount(&server)
            .await;

        let client = HttpClient::new(PROVIDER_TIMEOUT).unwrap();
        let body = client.fetch(&format!("{}/ip", server.uri())).await.unwrap();
        assert_eq!(body, "198.51.100.7");
    }

    #[tokio::test]
    async fn error_status_is_not_a_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("198.51.100.7"))
            .mount(&server)
            .await;

        let client = HttpClient::new(PROVIDER_TIMEOUT).unwrap();
        let err = client.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(status) if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("198.51.100.7")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new(Duration::from_millis(200)).unwrap();
        let err = client.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }

    #[tokio::test]
    async fn refused_connection_is_blocked() {
        let client = HttpClient::new(PROVIDER_TIMEOUT).unwrap();
        let err = client.fetch("http://127.0.0.1:1/ip").await.unwrap_err();
        assert!(matches!(err, FetchError::Blocked(_)));
    }

    #[test]
    fn answered_but_unusable_is_an_error() {
        for kind in [
            ErrorKind::ProtocolViolation,
            ErrorKind::TooManyRedirects,
            ErrorKind::InvalidContentEncoding,
            ErrorKind::InvalidRequest,
        ] {
            let err = classify(isahc::Error::from(kind.clone()));
            assert!(matches!(err, FetchError::Request(_)), "{kind:?}");
        }
        for kind in [
            ErrorKind::ConnectionFailed,
            ErrorKind::NameResolution,
            ErrorKind::TlsEngine,
        ] {
            let err = classify(isahc::Error::from(kind.clone()));
            assert!(matches!(err, FetchError::Blocked(_)), "{kind:?}");
        }
        assert!(matches!(
            classify(isahc::Error::from(ErrorKind::Timeout)),
            FetchError::Timeout
        ));
    }
}
