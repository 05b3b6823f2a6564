//! The seam between ceremonies and the platform authenticator.

use ceremony_types::{
    webauthn::{
        AuthenticatedPublicKeyCredential, CreatedPublicKeyCredential,
        PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
    },
    Aaguid,
};
use strum::{Display, EnumString};

/// The kinds of user verification an [`Authenticator`] can be built around.
///
/// A concrete authenticator commits to one kind when it is constructed;
/// ceremonies do not pick between them at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AuthenticatorKind {
    /// Fingerprint, face or iris verification.
    Biometric,
    /// The device PIN, pattern or password.
    DeviceCredential,
}

/// Errors a platform authenticator can report.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticatorError {
    /// The user dismissed the verification prompt.
    #[error("the user cancelled the ceremony")]
    Cancelled,
    /// The requested verification method is not set up on this device.
    #[error("no {0} authenticator is available")]
    Unavailable(AuthenticatorKind),
    /// The authenticator failed for a reason of its own.
    #[error("the authenticator failed: {0}")]
    Failed(String),
}

/// A device-local authenticator that mints credentials and signs assertions.
///
/// Implementations wrap whatever the platform offers for the
/// [kind](Self::kind) of verification they were built with, prompt the user,
/// and answer with the credential structures a relying party consumes. Under
/// the `testable` feature, the `ceremony_types::mock` module builds
/// structurally valid answers for implementations under test.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait Authenticator {
    /// The kind of user verification this authenticator performs.
    fn kind(&self) -> AuthenticatorKind;

    /// The AAGUID this authenticator stamps into attested credential data.
    fn aaguid(&self) -> Aaguid;

    /// Verify the user and mint a new credential for the given options.
    async fn create(
        &self,
        options: &PublicKeyCredentialCreationOptions,
    ) -> Result<CreatedPublicKeyCredential, AuthenticatorError>;

    /// Verify the user and sign an assertion for the given options.
    async fn get(
        &self,
        options: &PublicKeyCredentialRequestOptions,
    ) -> Result<AuthenticatedPublicKeyCredential, AuthenticatorError>;
}

#[cfg(any(test, feature = "testable"))]
impl MockAuthenticator {
    /// Sets up the mock to approve every ceremony with canned responses.
    ///
    /// Creation answers carry a random credential id; assertion answers
    /// reuse the first allowed credential and report a signature counter
    /// of one.
    pub fn approving(kind: AuthenticatorKind, aaguid: Aaguid) -> Self {
        use ceremony_types::mock;

        let mut authenticator = MockAuthenticator::new();
        authenticator.expect_kind().return_const(kind);
        authenticator.expect_aaguid().return_const(aaguid);
        authenticator.expect_create().returning(move |options| {
            let origin = origin_of(options.rp.id.as_deref());
            Ok(mock::created_credential(options, &origin, aaguid))
        });
        authenticator.expect_get().returning(|options| {
            let credential_id = options
                .allow_credentials
                .iter()
                .flatten()
                .next()
                .map(|descriptor| descriptor.id.clone())
                .unwrap_or_else(|| ceremony_types::rand::random_vec(16).into());
            let origin = origin_of(options.rp_id.as_deref());
            Ok(mock::asserted_credential(
                options,
                &origin,
                credential_id,
                None,
                1,
            ))
        });
        authenticator
    }
}

#[cfg(any(test, feature = "testable"))]
fn origin_of(rp_id: Option<&str>) -> String {
    format!("https://{}", rp_id.unwrap_or("example.com"))
}
