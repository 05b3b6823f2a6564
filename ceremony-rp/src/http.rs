use std::time::Duration;

use ceremony_types::webauthn::{
    AuthenticatedPublicKeyCredential, AuthenticationOptions, CreatedPublicKeyCredential,
    RegistrationOptions,
};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use super::{
    models::{decode_reply, AuthenticationChallenge, RegistrationChallenge, ServerOutcome},
    RelyingParty, RpError,
};

const ATTESTATION_OPTIONS: &str = "attestation/options";
const ATTESTATION_RESULT: &str = "attestation/result";
const ASSERTION_OPTIONS: &str = "assertion/options";
const ASSERTION_RESULT: &str = "assertion/result";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`RelyingParty`] over HTTP with JSON bodies.
///
/// Endpoint paths are joined onto the base URL, so the base should end with
/// a trailing slash when it carries a path of its own. Cookies are kept
/// across requests since many servers bind their challenge to a session
/// cookie rather than an explicit session id.
///
/// ```no_run
/// # fn connect() -> Result<(), ceremony_rp::RpError> {
/// use ceremony_rp::HttpRelyingParty;
/// use url::Url;
///
/// let base: Url = "https://rp.example.com/fido2/".parse().expect("static url");
/// let rp = HttpRelyingParty::new(base)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpRelyingParty {
    client: reqwest::Client,
    base_url: Url,
    rp_id: String,
}

impl HttpRelyingParty {
    /// A relying party client with the default request timeout and the
    /// relying party id taken from the base URL's host.
    pub fn new(base_url: Url) -> Result<Self, RpError> {
        Self::builder(base_url).build()
    }

    /// Start building a relying party client.
    pub fn builder(base_url: Url) -> HttpRelyingPartyBuilder {
        HttpRelyingPartyBuilder {
            base_url,
            rp_id: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, RpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        log::debug!("POST {url}");

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::warn!("{path} rejected with HTTP {status}");
            return Err(RpError::Rejected { status, body });
        }
        decode_reply(status, body)
    }
}

/// Builder for [`HttpRelyingParty`].
#[derive(Debug)]
pub struct HttpRelyingPartyBuilder {
    base_url: Url,
    rp_id: Option<String>,
    timeout: Duration,
}

impl HttpRelyingPartyBuilder {
    /// Scope credentials to an explicit relying party id instead of the base
    /// URL's host.
    pub fn rp_id(mut self, rp_id: impl Into<String>) -> Self {
        self.rp_id = Some(rp_id.into());
        self
    }

    /// Override the whole-request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    ///
    /// Fails when no relying party id was given and the base URL has no host
    /// to derive one from.
    pub fn build(self) -> Result<HttpRelyingParty, RpError> {
        let rp_id = match self.rp_id {
            Some(rp_id) => rp_id,
            None => self
                .base_url
                .host_str()
                .ok_or(url::ParseError::EmptyHost)?
                .to_owned(),
        };
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .cookie_store(true)
            .build()?;
        Ok(HttpRelyingParty {
            client,
            base_url: self.base_url,
            rp_id,
        })
    }
}

#[async_trait::async_trait]
impl RelyingParty for HttpRelyingParty {
    fn rp_id(&self) -> &str {
        &self.rp_id
    }

    async fn get_registration_challenge(
        &self,
        options: &RegistrationOptions,
    ) -> Result<RegistrationChallenge, RpError> {
        self.post(ATTESTATION_OPTIONS, options).await
    }

    async fn verify_registration(
        &self,
        credential: &CreatedPublicKeyCredential,
    ) -> Result<ServerOutcome, RpError> {
        self.post(ATTESTATION_RESULT, credential).await
    }

    async fn get_authentication_challenge(
        &self,
        options: &AuthenticationOptions,
    ) -> Result<AuthenticationChallenge, RpError> {
        self.post(ASSERTION_OPTIONS, options).await
    }

    async fn verify_authentication(
        &self,
        credential: &AuthenticatedPublicKeyCredential,
    ) -> Result<ServerOutcome, RpError> {
        self.post(ASSERTION_RESULT, credential).await
    }
}
