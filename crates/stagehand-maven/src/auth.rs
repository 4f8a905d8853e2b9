//! Request authentication for both protocol generations.
//!
//! Nexus staging endpoints take HTTP basic auth. The Central Portal takes a
//! token derived from the same username/password pair,
//! `base64(username:password)`, presented either as `Bearer <token>` or as
//! `UserToken <token>` depending on the configured [`AuthScheme`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;
use stagehand_core::config::AuthScheme;
use stagehand_core::credentials::Credentials;

/// Apply HTTP basic authentication (legacy Nexus API).
pub fn apply_basic(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    request.basic_auth(&credentials.username, Some(&credentials.password))
}

/// The portal token for a credentials pair.
pub fn portal_token(credentials: &Credentials) -> String {
    STANDARD.encode(format!("{}:{}", credentials.username, credentials.password))
}

/// Apply portal token authentication using the given header scheme.
pub fn apply_portal(
    request: RequestBuilder,
    credentials: &Credentials,
    scheme: AuthScheme,
) -> RequestBuilder {
    let token = portal_token(credentials);
    match scheme {
        AuthScheme::Bearer => request.bearer_auth(token),
        AuthScheme::UserToken => request.header(AUTHORIZATION, format!("UserToken {token}")),
    }
}
