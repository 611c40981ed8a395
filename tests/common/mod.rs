#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response, StatusCode},
    Router,
};
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use mockito::{Server, ServerGuard};
use serde_json::Value;
use tower::ServiceExt;

use matchday_hub::config::{AppConfig, Endpoint};
use matchday_hub::services::live::{FixedClock, LivePoller};
use matchday_hub::services::webhook::WebhookClient;
use matchday_hub::state::AppState;

pub const SECRET: &str = "test-shared-secret";
pub const BOUNDARY: &str = "matchday-test-boundary";

pub fn path_for(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Matchday => "/matchday",
        Endpoint::Squad => "/squad",
        Endpoint::Result => "/result",
        Endpoint::UpNext => "/upnext",
        Endpoint::Custom => "/custom",
        Endpoint::Assets => "/assets",
        Endpoint::Fixtures => "/fixtures",
        Endpoint::LiveEvents => "/live-events",
        Endpoint::Scheduler => "/scheduler",
        Endpoint::AppData => "/app-data",
    }
}

pub struct TestApp {
    pub server: ServerGuard,
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<FixedClock>,
    pub poller: LivePoller<FixedOffset>,
}

pub struct TestAppBuilder {
    secret: Option<String>,
    missing: Vec<Endpoint>,
    urls: Vec<(Endpoint, String)>,
    now: DateTime<Utc>,
    tz: FixedOffset,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        TestAppBuilder {
            secret: Some(SECRET.to_string()),
            missing: Vec::new(),
            urls: Vec::new(),
            now: Utc.with_ymd_and_hms(2025, 5, 14, 12, 0, 0).unwrap(),
            tz: Utc.fix(),
        }
    }

    pub fn without_secret(mut self) -> Self {
        self.secret = None;
        self
    }

    pub fn without_url(mut self, endpoint: Endpoint) -> Self {
        self.missing.push(endpoint);
        self
    }

    /// Point `endpoint` somewhere other than the mock server.
    pub fn with_url(mut self, endpoint: Endpoint, url: &str) -> Self {
        self.urls.push((endpoint, url.to_string()));
        self
    }

    pub fn in_tz(mut self, tz: FixedOffset) -> Self {
        self.tz = tz;
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub async fn build(self) -> TestApp {
        let server = Server::new_async().await;

        let mut config = AppConfig::default();
        config.auth_secret = self.secret;
        config.club_tz = self.tz;
        for endpoint in Endpoint::ALL {
            if !self.missing.contains(&endpoint) {
                config
                    .webhooks
                    .set(endpoint, format!("{}{}", server.url(), path_for(endpoint)));
            }
        }
        for (endpoint, url) in self.urls {
            config.webhooks.set(endpoint, url);
        }

        let webhooks = WebhookClient::new(reqwest::Client::new(), config.webhooks.clone());
        let clock = Arc::new(FixedClock::new(self.now));
        let (poller, live) = LivePoller::new(Arc::new(webhooks.clone()), clock.clone(), self.tz);
        let state = AppState::new(config, webhooks, live, clock.clone());
        let router = matchday_hub::build_router(state.clone());

        TestApp {
            server,
            router,
            state,
            clock,
            poller,
        }
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub enum FormPart<'a> {
    Text(&'a str, &'a str),
    Typed {
        name: &'a str,
        content_type: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_request(uri: &str, bearer: Option<&str>, parts: &[FormPart]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value)
                        .as_bytes(),
                );
            }
            FormPart::Typed {
                name,
                content_type,
                value,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\nContent-Type: {}\r\n\r\n{}\r\n",
                        name, content_type, value
                    )
                    .as_bytes(),
                );
            }
            FormPart::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
