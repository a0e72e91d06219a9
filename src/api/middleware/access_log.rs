//! Access log middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::{net::SocketAddr, time::Instant};

use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Writes one combined-log-format line per request.
///
/// The client address is the peer socket address, or the forwarding headers
/// when the service runs behind a trusted proxy. Without `ConnectInfo`
/// (e.g. in tests) and without usable headers it is logged as `-`.
///
/// # Example Logs
///
/// ```text
/// INFO 10.0.0.7 - bob "POST /urls/ HTTP/1.1" 201 - "-" "curl/8.5.0" 9ms
/// ```
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(req.headers(), peer, st.behind_proxy)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "-".to_string());

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let version = format!("{:?}", req.version());

    let ua = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let referer = req
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(req).await;

    let user = response
        .extensions()
        .get::<AccessUser>()
        .map(|u| u.0.as_str())
        .unwrap_or("-");
    let status = response.status().as_u16();
    let ms = start.elapsed().as_millis();

    tracing::info!(
        r#"{ip} - {user} "{method} {path} {version}" {status} - "{referer}" "{ua}" {ms}ms"#,
    );

    response
}

/// Name of the authenticated token, attached to responses for the access log.
#[derive(Debug, Clone)]
pub struct AccessUser(pub String);
