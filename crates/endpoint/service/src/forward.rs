//! Transparent forwarding of a single HTTP exchange.

use std::time::Duration;

use poem::{
    http::{header, HeaderMap, HeaderValue, Method},
    Request, Response,
};

/// Headers meaningful only for a single transport connection; never relayed
/// across the proxy boundary in either direction.
pub const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "host",
];

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Returns whether the header name is hop-by-hop, case-insensitively.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Derives the client origin address.
///
/// Priority: the trusted edge header, then the first forwarded-for entry,
/// then the transport peer address.
pub fn client_ip(req: &Request) -> Option<String> {
    if let Some(ip) = req.header("cf-connecting-ip") {
        return Some(ip.trim().to_string());
    }

    if let Some(first) = req
        .header(X_FORWARDED_FOR)
        .and_then(|forwarded| forwarded.split(',').next())
    {
        let first = first.trim();

        if !first.is_empty() {
            return Some(first.to_string());
        }
    }

    req.remote_addr()
        .as_socket_addr()
        .map(|s| s.ip().to_string())
}

/// Splits the endpoint selector `e` out of a raw query string.
///
/// Returns the percent-decoded endpoint path and the remaining pairs,
/// preserved verbatim for the upstream call. The first non-empty selector
/// wins.
pub fn split_endpoint(query: &str) -> (Option<String>, String) {
    let mut endpoint = None;
    let mut rest = String::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));

        if name == "e" {
            if endpoint.is_none() && !value.is_empty() {
                let decoded = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());

                endpoint.replace(decoded);
            }
        } else {
            if !rest.is_empty() {
                rest.push('&');
            }

            rest.push_str(pair);
        }
    }

    (endpoint, rest)
}

/// Copies inbound headers for the upstream call, dropping hop-by-hop names
/// and prepending the client address to the forwarded-for chain.
pub fn forward_headers(inbound: &HeaderMap, client: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in inbound {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }

        headers.append(name, value.clone());
    }

    if let Some(client) = client {
        let chain = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{client}, {existing}"),
            None => client.to_string(),
        };

        if let Ok(value) = HeaderValue::from_str(&chain) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    headers
}

/// Joins the resolved target and the endpoint path with a single separator.
pub fn join_target(target: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        target.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Performs the single outbound call of a proxied exchange.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new()
    }
}

impl Forwarder {
    /// Upper bound for the upstream call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

    /// Creates a forwarder with the default timeout.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the upstream timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Forwards one request to the resolved target, relaying the upstream
    /// status, headers, and raw body, minus hop-by-hop headers.
    pub async fn forward(
        &self,
        target: &str,
        endpoint: &str,
        method: Method,
        mut headers: HeaderMap,
        query: &str,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<Response> {
        if body.is_none() {
            // a copied length with no body would stall the upstream read
            headers.remove(header::CONTENT_LENGTH);
        }

        let mut url = join_target(target, endpoint);

        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }

        let mut request = self
            .client
            .request(method, &url)
            .timeout(self.timeout)
            .headers(headers);

        if let Some(body) = body {
            request = request.body(body);
        }

        let upstream = request.send().await?;

        let mut response = Response::builder().status(upstream.status());

        for (name, value) in upstream.headers() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }

            response = response.header(name.clone(), value.clone());
        }

        Ok(response.body(upstream.bytes().await?))
    }
}
