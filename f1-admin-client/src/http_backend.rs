use core::time::Duration;

use bytes::Bytes;
use f1_admin_config::Config;
use f1_admin_model::{
    Document, Driver, DriverId, DriverUpdate, Envelope, GrandPrix, NewDriver, NewGrandPrix,
    NewParticipation, Participation,
};
use http::header::{ACCEPT, CONTENT_TYPE, HOST};
use http::uri::{Authority, Scheme};
use http::{Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt as _, Full};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::backend::{Backend, ListMethod};
use crate::error::{ApiError, Result};

const APPLICATION_JSON: &str = "application/json";

/// Status and body of a finished exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Status {
                status: self.status,
                body: String::from_utf8_lossy(&self.body).into_owned(),
            })
        }
    }
}

/// [`Backend`] talking HTTP/1.1 to the REST api. Every exchange opens its own
/// connection and is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    authority: Authority,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        let uri: Uri = base_url.parse()?;
        if uri.scheme() != Some(&Scheme::HTTP) {
            return Err(ApiError::UnsupportedUrl(base_url.to_owned()));
        }
        let Some(authority) = uri.authority().cloned() else {
            return Err(ApiError::UnsupportedUrl(base_url.to_owned()));
        };
        Ok(Self {
            base_url: base_url.to_owned(),
            authority,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request and returns whatever the server answered, including
    /// non-success statuses.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<RawResponse> {
        let started = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.exchange(&method, path, body))
            .await
            .map_err(|_| ApiError::Timeout(self.timeout))?;
        match &response {
            Ok(response) => debug!(
                %method,
                path,
                status = response.status.as_u16(),
                elapsed = ?started.elapsed(),
                "request finished"
            ),
            Err(error) => warn!(%method, path, %error, "request failed"),
        }
        response
    }

    async fn exchange(
        &self,
        method: &Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<RawResponse> {
        let port = self.authority.port_u16().unwrap_or(80);
        let addr = format!("{}:{port}", self.authority.host());

        let stream = TcpStream::connect(addr).await?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;
        tokio::task::spawn(async move {
            if let Err(error) = conn.await {
                debug!(%error, "connection closed with error");
            }
        });

        let mut request = Request::builder()
            .method(method.clone())
            .uri(format!("{}{path}", self.base_url))
            .header(HOST, self.authority.as_str())
            .header(ACCEPT, APPLICATION_JSON);
        if body.is_some() {
            request = request.header(CONTENT_TYPE, APPLICATION_JSON);
        }
        let request = request.body(Full::new(body.unwrap_or_default()))?;

        let response = sender.send_request(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();

        Ok(RawResponse { status, body })
    }

    async fn send_json<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<RawResponse> {
        let body = serde_json::to_vec(body).map_err(ApiError::Encode)?;
        self.send(method, path, Some(Bytes::from(body))).await
    }
}

impl Backend for HttpBackend {
    #[instrument(skip(self))]
    async fn list_drivers(&self) -> Result<Envelope<Driver>> {
        let response = self
            .send(Method::GET, "/drivers", None)
            .await?
            .error_for_status()?;
        Ok(Envelope::from_slice(&response.body)?)
    }

    #[instrument(skip(self))]
    async fn get_driver(&self, id: DriverId) -> Result<Document<Driver>> {
        let response = self
            .send(Method::GET, &format!("/drivers/{id}"), None)
            .await?
            .error_for_status()?;
        Ok(Document::from_slice(&response.body)?)
    }

    #[instrument(skip(self, driver), fields(number = driver.driver_number))]
    async fn create_driver(&self, driver: &NewDriver) -> Result<Driver> {
        let response = self
            .send_json(Method::POST, "/drivers", driver)
            .await?
            .error_for_status()?;
        Ok(Document::from_slice(&response.body)?.value)
    }

    #[instrument(skip(self, update), fields(id = %update.id))]
    async fn update_driver(&self, update: &DriverUpdate) -> Result<Option<Driver>> {
        let response = self
            .send_json(Method::PUT, &format!("/drivers/{}", update.id), update)
            .await?
            .error_for_status()?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(Document::from_slice(&response.body)?.value))
    }

    #[instrument(skip(self))]
    async fn delete_driver(&self, id: DriverId) -> Result<()> {
        self.send(Method::DELETE, &format!("/drivers/{id}"), None)
            .await?
            .error_for_status()?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_grand_prix(&self) -> Result<Envelope<GrandPrix>> {
        let response = self
            .send(Method::GET, "/grandprix", None)
            .await?
            .error_for_status()?;
        Ok(Envelope::from_slice(&response.body)?)
    }

    #[instrument(skip(self, grand_prix), fields(name = %grand_prix.name))]
    async fn create_grand_prix(&self, grand_prix: &NewGrandPrix) -> Result<GrandPrix> {
        let response = self
            .send_json(Method::POST, "/grandprix", grand_prix)
            .await?
            .error_for_status()?;
        Ok(Document::from_slice(&response.body)?.value)
    }

    #[instrument(skip(self))]
    async fn list_participations(&self, method: ListMethod) -> Result<Envelope<Participation>> {
        let response = match method {
            ListMethod::Get => self.send(Method::GET, "/participation", None).await?,
            ListMethod::PostFallback => {
                self.send(Method::POST, "/participation", Some(Bytes::from_static(b"{}")))
                    .await?
            }
        };
        Ok(Envelope::from_slice(&response.error_for_status()?.body)?)
    }

    #[instrument(skip(self))]
    async fn create_participation(
        &self,
        participation: NewParticipation,
    ) -> Result<Document<Participation>> {
        let response = self
            .send_json(Method::POST, "/participation", &participation)
            .await?
            .error_for_status()?;
        Ok(Document::from_slice(&response.body)?)
    }
}
