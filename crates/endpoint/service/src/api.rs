//! The proxy endpoint.

use chaingate::Resolver;
use poem::{
    handler,
    http::{Method, StatusCode},
    web::Data,
    Body, Request, Response,
};
use serde_json::json;

use crate::forward::{self, Forwarder};

/// Endpoint selector answered locally, without resolution or upstream
/// contact.
pub const PING_ENDPOINT: &str = "ping_proxy";

/// Relays one inbound exchange to the resolved upstream target.
///
/// The `e` query parameter names the endpoint path; the remaining query
/// pairs, the method, the filtered header set, and the body are forwarded
/// verbatim. Resolution or upstream failure surfaces as a single bad gateway
/// response.
#[handler]
pub async fn proxy(
    req: &Request,
    body: Body,
    resolver: Data<&Resolver>,
    forwarder: Data<&Forwarder>,
) -> Response {
    let query = req.uri().query().unwrap_or_default();
    let (endpoint, rest) = forward::split_endpoint(query);

    let endpoint = match endpoint {
        Some(endpoint) => endpoint,
        None => {
            return Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .content_type("text/plain; charset=utf-8")
                .body("Missing endpoint")
        }
    };

    if endpoint == PING_ENDPOINT {
        return Response::builder()
            .content_type("text/plain")
            .body("pong");
    }

    let client = forward::client_ip(req);
    let headers = forward::forward_headers(req.headers(), client.as_deref());

    let body = match req.method() {
        &Method::GET | &Method::HEAD => None,
        _ => match body.into_vec().await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!("failed to read the inbound body: {e}");

                None
            }
        },
    };

    let exchange = async {
        let target = resolver.resolve().await?;

        forwarder
            .forward(&target, &endpoint, req.method().clone(), headers, &rest, body)
            .await
    };

    match exchange.await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("proxy failed for endpoint `{endpoint}`: {e}");

            Response::builder()
                .status(StatusCode::BAD_GATEWAY)
                .content_type("application/json")
                .body(
                    json!({
                        "error": "Bad gateway",
                        "details": e.to_string(),
                    })
                    .to_string(),
                )
        }
    }
}
