use async_trait::async_trait;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Multipart;
use bytes::Bytes;
use reqwest::{multipart, Client};
use serde_json::{json, Value};

use crate::config::{Endpoint, WebhookUrls};
use crate::errors::{AppError, Result};
use crate::models::app_data::{normalize_list, AppData};
use crate::models::fixture::Fixture;
use crate::models::match_event::{events_from_values, MatchEvent};
use crate::services::live::EventSource;

/// Multipart field carrying the shared secret.
pub const TOKEN_FIELD: &str = "authToken";

/// Successful upstream reply, passed back to the caller as-is.
#[derive(Debug, Clone)]
pub struct Relayed {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let content_type = self
            .content_type
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        response
    }
}

/// An incoming multipart body rebuilt for forwarding.
pub struct ForwardForm {
    pub form: multipart::Form,
    pub token: Option<String>,
    pub field_count: usize,
}

/// Read every field of `multipart`, keeping names, file names and content types.
pub async fn forward_form(mut multipart: Multipart) -> Result<ForwardForm> {
    let mut form = multipart::Form::new();
    let mut token = None;
    let mut field_count = 0;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        field_count += 1;

        if name == TOKEN_FIELD {
            token = Some(String::from_utf8_lossy(&data).into_owned());
        }

        let part = match file_name {
            Some(file_name) => {
                let content_type =
                    content_type.unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
                multipart::Part::bytes(data.to_vec())
                    .file_name(file_name)
                    .mime_str(&content_type)
                    .map_err(|e| AppError::Multipart(e.to_string()))?
            }
            None => {
                let part = multipart::Part::bytes(data.to_vec());
                match content_type {
                    Some(ct) => part
                        .mime_str(&ct)
                        .map_err(|e| AppError::Multipart(e.to_string()))?,
                    None => part,
                }
            }
        };
        form = form.part(name, part);
    }

    Ok(ForwardForm {
        form,
        token,
        field_count,
    })
}

#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    urls: WebhookUrls,
}

impl WebhookClient {
    pub fn new(client: Client, urls: WebhookUrls) -> Self {
        Self { client, urls }
    }

    pub fn urls(&self) -> &WebhookUrls {
        &self.urls
    }

    pub async fn forward_json(&self, endpoint: Endpoint, body: &Value) -> Result<Relayed> {
        let url = self.urls.require(endpoint)?;
        tracing::info!("Forwarding JSON to {:?}", endpoint);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::external_api(format!("{:?} webhook unreachable: {}", endpoint, e)))?;

        Self::relay(endpoint, response).await
    }

    pub async fn forward_multipart(
        &self,
        endpoint: Endpoint,
        form: multipart::Form,
    ) -> Result<Relayed> {
        let url = self.urls.require(endpoint)?;
        tracing::info!("Forwarding multipart form to {:?}", endpoint);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::external_api(format!("{:?} webhook unreachable: {}", endpoint, e)))?;

        Self::relay(endpoint, response).await
    }

    async fn relay(endpoint: Endpoint, response: reqwest::Response) -> Result<Relayed> {
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| HeaderValue::from_bytes(v.as_bytes()).ok());

        let body = response.bytes().await.map_err(|e| {
            AppError::external_api(format!("{:?} webhook body unreadable: {}", endpoint, e))
        })?;

        if !status.is_success() {
            tracing::error!(
                "{:?} webhook answered {}: {}",
                endpoint,
                status,
                String::from_utf8_lossy(&body)
            );
            return Err(AppError::upstream(status));
        }

        tracing::info!("✅ {:?} webhook answered {}", endpoint, status);
        Ok(Relayed {
            status,
            content_type,
            body,
        })
    }

    /// POST `payload` and read the reply as a list, tolerating any reply shape.
    async fn fetch_list(&self, endpoint: Endpoint, payload: Value) -> Result<Vec<Value>> {
        let relayed = self.forward_json(endpoint, &payload).await?;
        match serde_json::from_slice::<Value>(&relayed.body) {
            Ok(value) => Ok(normalize_list(value)),
            Err(e) => {
                tracing::warn!("{:?} webhook returned non-JSON body: {}", endpoint, e);
                Ok(Vec::new())
            }
        }
    }

    pub async fn fetch_app_data(&self) -> Result<AppData> {
        let records = self
            .fetch_list(Endpoint::AppData, json!({ "action": "get_app_data" }))
            .await?;
        Ok(AppData::from_records(records))
    }
}

#[async_trait]
impl EventSource for WebhookClient {
    async fn fetch_events(&self, match_id: &str) -> Result<Vec<MatchEvent>> {
        let records = self
            .fetch_list(
                Endpoint::LiveEvents,
                json!({ "action": "get_match_events", "matchId": match_id }),
            )
            .await?;
        Ok(events_from_values(records))
    }

    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>> {
        let records = self
            .fetch_list(Endpoint::Fixtures, json!({ "action": "get_matches" }))
            .await?;

        Ok(records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Fixture>(record) {
                Ok(fixture) => Some(fixture),
                Err(e) => {
                    tracing::warn!("Skipping malformed fixture: {}", e);
                    None
                }
            })
            .collect())
    }
}
