use std::time::Duration;

use reqwest::Client;

/// Budget for one email API call.
pub const EMAIL_API_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const EMAIL_API_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for outbound API calls. Built once while wiring `AppState`;
/// panics only on a broken TLS backend.
pub fn build_client() -> Client {
    Client::builder()
        .connect_timeout(EMAIL_API_CONNECT_TIMEOUT)
        .timeout(EMAIL_API_REQUEST_TIMEOUT)
        .user_agent(concat!("tourney-verify/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client")
}
