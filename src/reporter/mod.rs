use axum::{
    Router,
    extract::{Query, rejection::QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::{
    AppState, Error,
    location::{ClientLocation, Envelope, UNKNOWN},
};

mod facts;

pub use facts::HostFacts;

const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";
const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

pub fn routes() -> Router<AppState> {
    let headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static("0"),
        ));
    Router::new().route("/ip", get(report).layer(headers))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Json,
    Text,
}

impl Format {
    /// The first `type` pair decides; anything other than `json` is text.
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        match pairs.iter().find(|(key, _)| key == "type") {
            Some((_, kind)) if kind == "json" => Format::Json,
            _ => Format::Text,
        }
    }
}

async fn report(
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    facts: HostFacts,
) -> Response {
    let format = match query {
        Ok(Query(pairs)) => Format::from_pairs(&pairs),
        Err(rejection) => {
            debug!("Unreadable query, answering as text: {}", rejection);
            Format::Text
        }
    };
    let timestamp = now_millis();
    match render(format, &facts, timestamp) {
        Ok(response) => response,
        Err(err) => {
            error!("Error processing IP request: {}", err);
            failure(format, timestamp)
        }
    }
}

fn render(format: Format, facts: &HostFacts, timestamp: i64) -> Result<Response, Error> {
    match format {
        Format::Json => {
            let envelope: Envelope<ClientLocation> = Envelope::success(facts.location(timestamp));
            let body = serde_json::to_string_pretty(&envelope)?;
            Ok(([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response())
        }
        Format::Text => Ok(([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], facts.ip()).into_response()),
    }
}

fn failure(format: Format, timestamp: i64) -> Response {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    match format {
        Format::Json => {
            let envelope: Envelope<()> =
                Envelope::error(status.as_u16(), "Internal Server Error", timestamp);
            let body = serde_json::to_string(&envelope)
                .unwrap_or_else(|_| String::from(r#"{"status":"error","code":500}"#));
            (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
        }
        Format::Text => (status, [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], UNKNOWN).into_response(),
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
