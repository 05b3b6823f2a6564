//! # Ceremony RP
//!
//! A client for the four HTTP endpoints a WebAuthn relying party exposes to
//! drive its side of the ceremonies: `attestation/options` and
//! `attestation/result` for registration, `assertion/options` and
//! `assertion/result` for authentication.
//!
//! The [`RelyingParty`] trait is the seam the ceremony client works
//! against; [`HttpRelyingParty`] implements it over HTTP with JSON bodies.
//! Replies carry a `status` field beside their payload, and anything other
//! than `"ok"` is reported as [`RpError::Rejected`] with the body preserved
//! verbatim, even when the HTTP status was a 2xx.

mod http;
mod models;

use ceremony_types::webauthn::{
    AuthenticatedPublicKeyCredential, AuthenticationOptions, CreatedPublicKeyCredential,
    RegistrationOptions,
};

pub use self::{
    http::{HttpRelyingParty, HttpRelyingPartyBuilder},
    models::{AuthenticationChallenge, RegistrationChallenge, ServerOutcome},
};
/// Re-export of the HTTP status type carried by [`RpError::Rejected`].
pub use reqwest::StatusCode;

/// Failures arising when talking to a relying party.
#[derive(Debug, thiserror::Error)]
pub enum RpError {
    /// The request never produced a usable response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The relying party answered and rejected the request. The reply body
    /// is preserved verbatim for display and logs.
    #[error("the relying party rejected the request with HTTP {status}")]
    Rejected {
        /// HTTP status code of the reply.
        status: StatusCode,
        /// The reply body as received.
        body: String,
    },

    /// An endpoint path could not be joined onto the base URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl RpError {
    /// A human readable rendering of the failure for logs and error
    /// screens: the HTTP status code followed by the server's error body,
    /// pretty printed when the body is JSON.
    pub fn detail(&self) -> String {
        match self {
            RpError::Rejected { status, body } => {
                let body = serde_json::from_str::<serde_json::Value>(body)
                    .and_then(|value| serde_json::to_string_pretty(&value))
                    .unwrap_or_else(|_| body.clone());
                format!("HTTP code: {}\nError Body: {body}", status.as_u16())
            }
            other => other.to_string(),
        }
    }
}

/// A relying party driving its side of the WebAuthn ceremonies.
///
/// Both ceremonies are two round trips: fetch server generated options
/// carrying a challenge, then submit the authenticator's response over that
/// challenge for verification. Keeping the two calls separate lets the
/// server bind each challenge to exactly one verification, so a stale
/// response cannot be replayed.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait RelyingParty {
    /// The relying party identifier credentials are scoped to.
    fn rp_id(&self) -> &str;

    /// Ask the relying party for registration options.
    async fn get_registration_challenge(
        &self,
        options: &RegistrationOptions,
    ) -> Result<RegistrationChallenge, RpError>;

    /// Submit an authenticator's attestation for verification.
    async fn verify_registration(
        &self,
        credential: &CreatedPublicKeyCredential,
    ) -> Result<ServerOutcome, RpError>;

    /// Ask the relying party for authentication options.
    async fn get_authentication_challenge(
        &self,
        options: &AuthenticationOptions,
    ) -> Result<AuthenticationChallenge, RpError>;

    /// Submit an authenticator's assertion for verification.
    async fn verify_authentication(
        &self,
        credential: &AuthenticatedPublicKeyCredential,
    ) -> Result<ServerOutcome, RpError>;
}
