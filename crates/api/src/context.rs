use rolodex_auth::User;

/// Authenticated account for the request, loaded by the auth middleware.
/// Present on every protected route.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Client address used as the rate-limit key component: the first
/// `X-Forwarded-For` entry when present, otherwise the socket peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
