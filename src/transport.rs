//! HTTP transport adapter.
//!
//! The thinnest layer: issue one request, hand back status and body text.
//! Status-code policy (what counts as absent, what counts as failure)
//! belongs to the orchestrator in [`crate::client`], not here. No retry,
//! timeout or cancellation is provided at this layer.

use std::io;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

use crate::error::{Error, Result};

type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP transport over a shared hyper client.
///
/// Supports both `http://` and `https://` endpoints; TLS uses standard
/// CA verification against the webpki root set. Cloning shares the
/// underlying connection pool.
#[derive(Clone, Debug)]
pub(crate) struct HttpTransport {
    http_client: HttpClient<HttpsConnector, Full<Bytes>>,
}

impl HttpTransport {
    pub(crate) fn new() -> Self {
        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();

        let http_client = HttpClient::builder(TokioExecutor::new()).build(https_connector);

        Self { http_client }
    }

    /// Idempotent retrieval; used for get and list.
    pub(crate) async fn fetch_text(&self, url: &str) -> Result<(StatusCode, String)> {
        self.request(url, Method::GET, None).await
    }

    /// URL-form-encoded write; used for set. Returns status only.
    pub(crate) async fn post_form(&self, url: &str, body: String) -> Result<StatusCode> {
        let (status, _) = self.request(url, Method::POST, Some(body)).await?;
        Ok(status)
    }

    /// Resource removal; used for delete. Returns status only.
    pub(crate) async fn delete_resource(&self, url: &str) -> Result<StatusCode> {
        let (status, _) = self.request(url, Method::DELETE, None).await?;
        Ok(status)
    }

    async fn request(
        &self,
        url: &str,
        method: Method,
        form_body: Option<String>,
    ) -> Result<(StatusCode, String)> {
        let uri: Uri = url
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

        let builder = Request::builder().method(method.clone()).uri(uri);

        let req = match form_body {
            Some(body) => builder
                .header(hyper::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(Full::new(Bytes::from(body))),
            None => builder.body(Full::new(Bytes::new())),
        }
        .map_err(|e| Error::Internal(format!("failed to build request: {}", e)))?;

        debug!("sending {} {}", method, url);

        let response = self
            .http_client
            .request(req)
            .await
            .map_err(|e| Error::Connection(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = Self::read_body_to_text(response.into_body()).await?;

        debug!("{} {} -> {}", method, url, status);

        Ok((status, body))
    }

    async fn read_body_to_text(body: Incoming) -> Result<String> {
        let collected = body
            .collect()
            .await
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        String::from_utf8(collected.to_bytes().to_vec())
            .map_err(|e| Error::InvalidResponse(format!("response body is not valid UTF-8: {}", e)))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}
