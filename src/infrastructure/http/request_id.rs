use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

const MAX_INBOUND_ID_LEN: usize = 128;

/// Id that ties a webhook call to its log lines
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Keep a sane id sent by the caller, otherwise mint a fresh one
    fn from_request(request: &Request) -> Self {
        let inbound = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty() && value.len() <= MAX_INBOUND_ID_LEN);

        match inbound {
            Some(value) => RequestId(value.to_string()),
            None => RequestId(Uuid::new_v4().to_string()),
        }
    }
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_request(&request);
    let span = tracing::info_span!("request", request_id = %request_id.0);

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.0) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    response
}
