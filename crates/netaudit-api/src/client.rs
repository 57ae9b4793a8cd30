// Audit service HTTP client
//
// Wraps `reqwest::Client` with URL construction relative to the service
// base, uniform success/failure classification, and body parsing with a
// preview on deserialization failure.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    ActionKind, DeviceActionRequest, DeviceActionResponse, MessageResponse, NetworkStatusResponse,
};
use crate::transport::TransportConfig;

const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for the audit service.
///
/// Cheap to clone (the inner `reqwest::Client` is reference counted).
/// Every method maps any non-2xx status or transport failure to an
/// [`Error`]; callers never see a partially parsed response.
#[derive(Clone)]
pub struct AuditClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AuditClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the service root that the endpoint paths hang off,
    /// e.g. `http://127.0.0.1:5000/api`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /network_status`: the current device snapshot.
    pub async fn network_status(&self) -> Result<NetworkStatusResponse, Error> {
        let url = self.url("network_status")?;
        self.get(url).await
    }

    /// `POST /reset`: clear all server-side state. The body is ignored.
    pub async fn reset(&self) -> Result<(), Error> {
        let url = self.url("reset")?;
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(http_error(status, &body));
        }

        // A body is optional, but an explicit `success: false` is still a failure.
        if let Ok(ack) = serde_json::from_str::<MessageResponse>(&body) {
            check_ack(ack.success, ack.message.or(ack.error))?;
        }
        Ok(())
    }

    /// `POST /device_action` with `{ ip, action, limit? }`.
    pub async fn device_action(
        &self,
        request: &DeviceActionRequest,
    ) -> Result<DeviceActionResponse, Error> {
        let url = self.url("device_action")?;
        let ack: DeviceActionResponse = self.post(url, Some(request)).await?;
        check_ack(ack.success, ack.message.clone())?;
        Ok(ack)
    }

    /// `POST /device/{ip}/{action}`: the older per-device command style.
    ///
    /// Only `block` and `unblock` exist on this surface.
    pub async fn device_command(&self, ip: &str, action: ActionKind) -> Result<MessageResponse, Error> {
        let url = self.url(&format!("device/{ip}/{}", action.as_str()))?;
        let ack: MessageResponse = self.post(url, None::<&()>).await?;
        check_ack(ack.success, ack.message.clone().or_else(|| ack.error.clone()))?;
        Ok(ack)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an endpoint path: `{base}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        parse_json(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let builder = self.http.post(url);
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };
        let resp = builder.send().await?;
        parse_json(resp).await
    }
}

/// Classify the status, then decode the body as JSON.
async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(http_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

fn http_error(status: reqwest::StatusCode, body: &str) -> Error {
    // Prefer the service's own `{ "message" | "error": ... }` over the raw body.
    let message = serde_json::from_str::<MessageResponse>(body)
        .ok()
        .and_then(|m| m.message.or(m.error))
        .unwrap_or_else(|| preview(body).to_owned());
    Error::Http {
        status: status.as_u16(),
        message,
    }
}

fn check_ack(success: Option<bool>, message: Option<String>) -> Result<(), Error> {
    if success == Some(false) {
        return Err(Error::Rejected {
            message: message.unwrap_or_else(|| "no reason given".into()),
        });
    }
    Ok(())
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(BODY_PREVIEW_LEN);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
