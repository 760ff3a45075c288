//! Cross-origin layer applied to every response, errors included.

use poem::{
    http::{HeaderValue, Method, StatusCode},
    Endpoint, IntoResponse, Request, Response,
};

const CORS_HEADERS: [(&str, &str); 4] = [
    ("access-control-allow-origin", "*"),
    (
        "access-control-allow-methods",
        "GET,HEAD,POST,OPTIONS,PUT,PATCH,DELETE",
    ),
    ("access-control-allow-headers", "*"),
    ("access-control-max-age", "3600"),
];

/// Answers pre-flight requests directly and stamps permissive cross-origin
/// headers on every response.
pub async fn cors<E: Endpoint>(next: E, req: Request) -> poem::Result<Response> {
    if req.method() == &Method::OPTIONS {
        return Ok(stamp(StatusCode::NO_CONTENT.into_response()));
    }

    let response = match next.call(req).await {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    };

    Ok(stamp(response))
}

fn stamp(mut response: Response) -> Response {
    for (name, value) in CORS_HEADERS {
        response
            .headers_mut()
            .insert(name, HeaderValue::from_static(value));
    }

    response
}
