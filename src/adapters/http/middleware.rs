use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{adapters::http::app_state::AppState, app_error::AppError};

/// Cookie the web front end sets once the user has an address on file.
const EMAIL_COOKIE: &str = "user_email";

pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    cookies: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(request.headers(), peer.ip(), app_state.config.trust_proxy);
    let email = cookies
        .get(EMAIL_COOKIE)
        .map(|c| c.value().trim().to_owned())
        .filter(|v| !v.is_empty());

    tracing::debug!(peer = %peer.ip(), client_ip = %ip, email = ?email, "Rate limiting request");

    app_state
        .rate_limiter
        .check(&ip.to_string(), email.as_deref())
        .await?;

    // Preserve cookie jar for downstream extractors.
    request.extensions_mut().insert(cookies);

    Ok(next.run(request).await)
}

/// The peer address, unless `trust_proxy` is on and the proxy supplied a
/// parseable address in X-Forwarded-For (first hop) or X-Real-IP.
fn client_ip(headers: &HeaderMap, peer: IpAddr, trust_proxy: bool) -> IpAddr {
    if !trust_proxy {
        return peer;
    }
    let header_ip = |name: &str| {
        headers
            .get(name)?
            .to_str()
            .ok()?
            .split(',')
            .next()?
            .trim()
            .parse::<IpAddr>()
            .ok()
    };
    header_ip("x-forwarded-for")
        .or_else(|| header_ip("x-real-ip"))
        .unwrap_or(peer)
}
