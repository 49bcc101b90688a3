use axum::http::{HeaderMap, HeaderValue};
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Give every request an id and echo it on the response, so a server log
/// line can be matched to the client's copy of the id.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = propagated_request_id(req.headers()).unwrap_or_else(fresh_request_id);

    req.headers_mut()
        .insert(REQUEST_ID_HEADER, request_id.clone());

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);

    response
}

/// Reuse a client-supplied id only when it looks like a correlation id.
/// Anything oversized or outside `[A-Za-z0-9-]` is replaced, so a hostile
/// header cannot smuggle arbitrary bytes into log output.
fn propagated_request_id(headers: &HeaderMap) -> Option<HeaderValue> {
    let value = headers.get(REQUEST_ID_HEADER)?;
    let id = value.to_str().ok()?;

    let plausible = !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    plausible.then(|| value.clone())
}

fn fresh_request_id() -> HeaderValue {
    // A hyphenated UUID is always a valid header value.
    HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}
