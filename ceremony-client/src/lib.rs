//! # Ceremony Client
//!
//! The orchestrator for WebAuthn registration and authentication
//! ceremonies. A [`Client`] is built from three injected parts: a
//! [`CredentialSourceStore`] keeping the credentials this device has
//! minted, an [`Authenticator`] performing user verification, and a
//! [`RelyingParty`] driving the server side of the ceremony.
//!
//! Both ceremonies follow the same two round trip shape. [Registration]
//! fetches creation options from the relying party, has the authenticator
//! mint a credential over the challenge, submits the attestation for
//! verification, and records the accepted credential in the store.
//! [Authentication] fetches request options, has the authenticator sign an
//! assertion, submits it, and advances the stored signature counter once
//! the relying party has accepted.
//!
//! Progress is published through a watch channel: call
//! [`Client::updates`] for a receiver of [`CeremonyUpdate`] values and hand
//! it to whatever renders status, without giving that code access to the
//! client itself.
//!
//! [Registration]: Client::register
//! [Authentication]: Client::authenticate

mod authenticator;
mod updates;

use ceremony_rp::{RelyingParty, RpError, ServerOutcome};
use ceremony_store::{CredentialSourceStore, StoreError};
use ceremony_types::{
    credential::CredentialSource,
    encoding,
    webauthn::{AuthenticationOptions, RegistrationOptions},
};
use tokio::sync::watch;

use self::updates::UpdateCell;
pub use self::{
    authenticator::{Authenticator, AuthenticatorError, AuthenticatorKind},
    updates::CeremonyUpdate,
};

#[cfg(feature = "testable")]
pub use self::authenticator::MockAuthenticator;

#[cfg(test)]
mod tests;

/// Failures arising from a ceremony.
#[derive(Debug, thiserror::Error)]
pub enum CeremonyError {
    /// The relying party could not be reached or rejected the ceremony.
    #[error(transparent)]
    Rp(#[from] RpError),

    /// The credential source store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The authenticator failed or the user declined.
    #[error(transparent)]
    Authenticator(#[from] AuthenticatorError),
}

impl CeremonyError {
    /// A human readable rendering of the failure for logs and error
    /// screens, with relying party rejections rendered by
    /// [`RpError::detail`].
    pub fn detail(&self) -> String {
        match self {
            CeremonyError::Rp(err) => err.detail(),
            other => other.to_string(),
        }
    }
}

/// Drives WebAuthn ceremonies end to end against one relying party.
///
/// Ceremonies take `&mut self`: a client runs one ceremony at a time, which
/// is also the order guarantee the signature counter relies on. To share
/// the underlying store with other parts of an application, construct the
/// client over a locked store such as `Arc<tokio::sync::Mutex<S>>`.
pub struct Client<S, A, R>
where
    S: CredentialSourceStore,
    A: Authenticator,
    R: RelyingParty,
{
    store: S,
    authenticator: A,
    rp: R,
    updates: UpdateCell,
}

impl<S, A, R> Client<S, A, R>
where
    S: CredentialSourceStore,
    A: Authenticator,
    R: RelyingParty,
{
    /// Create a client over the given store, authenticator and relying
    /// party.
    pub fn new(store: S, authenticator: A, rp: R) -> Self {
        Self {
            store,
            authenticator,
            rp,
            updates: UpdateCell::new(),
        }
    }

    /// Subscribe to ceremony progress.
    ///
    /// The receiver always holds the most recent [`CeremonyUpdate`];
    /// subscribers that poll between transitions observe only the latest
    /// one.
    pub fn updates(&self) -> watch::Receiver<CeremonyUpdate> {
        self.updates.subscribe()
    }

    /// Run a registration ceremony and store the resulting credential.
    ///
    /// On success the relying party has verified the attestation and the
    /// new [`CredentialSource`] is persisted with its signature counter at
    /// zero. On failure nothing is stored.
    pub async fn register(
        &mut self,
        options: RegistrationOptions,
    ) -> Result<CredentialSource, CeremonyError> {
        let username = options.username.clone();
        self.updates.publish(CeremonyUpdate::Registering {
            username: username.clone(),
        });

        match self.try_register(&options).await {
            Ok(source) => {
                self.updates.publish(CeremonyUpdate::Registered {
                    username,
                    credential_id: encoding::base64url(&source.id),
                });
                Ok(source)
            }
            Err(err) => Err(self.failed(err)),
        }
    }

    async fn try_register(
        &mut self,
        options: &RegistrationOptions,
    ) -> Result<CredentialSource, CeremonyError> {
        let challenge = self.rp.get_registration_challenge(options).await?;
        let credential = self.authenticator.create(&challenge.options).await?;
        self.rp.verify_registration(&credential).await?;

        let rp_id = challenge
            .options
            .rp
            .id
            .clone()
            .unwrap_or_else(|| self.rp.rp_id().to_owned());
        let source = CredentialSource::new(
            credential.raw_id.clone(),
            rp_id,
            Some(challenge.options.user.id.clone()),
            self.authenticator.aaguid(),
        );
        // a duplicate credential id here is fatal to the registration, not
        // something to paper over
        self.store.store(source.clone()).await?;
        Ok(source)
    }

    /// Run an authentication ceremony.
    ///
    /// On success the relying party has verified the assertion and the
    /// stored signature counter has been advanced by one. The counter moves
    /// only after acceptance, so a rejected assertion leaves the store
    /// unchanged.
    pub async fn authenticate(
        &mut self,
        options: AuthenticationOptions,
    ) -> Result<ServerOutcome, CeremonyError> {
        let username = options.username.clone();
        self.updates.publish(CeremonyUpdate::Authenticating {
            username: username.clone(),
        });

        match self.try_authenticate(&options).await {
            Ok(outcome) => {
                self.updates
                    .publish(CeremonyUpdate::Authenticated { username });
                Ok(outcome)
            }
            Err(err) => Err(self.failed(err)),
        }
    }

    async fn try_authenticate(
        &mut self,
        options: &AuthenticationOptions,
    ) -> Result<ServerOutcome, CeremonyError> {
        let challenge = self.rp.get_authentication_challenge(options).await?;
        let credential = self.authenticator.get(&challenge.options).await?;
        let outcome = self.rp.verify_authentication(&credential).await?;

        // the assertion was accepted, so move our copy of the counter
        self.store
            .increase_signature_counter(&credential.raw_id)
            .await?;
        Ok(outcome)
    }

    /// Every credential this client's store holds.
    ///
    /// Publishes [`CeremonyUpdate::CredentialsListed`] with the size of the
    /// listing.
    pub async fn credentials(&self) -> Result<Vec<CredentialSource>, CeremonyError> {
        match self.store.load_all().await {
            Ok(sources) => {
                self.updates.publish(CeremonyUpdate::CredentialsListed {
                    count: sources.len(),
                });
                Ok(sources)
            }
            Err(err) => Err(self.failed(err)),
        }
    }

    /// Remove one credential from the store. Removing an id that is not
    /// stored is not an error.
    pub async fn delete_credential(&mut self, credential_id: &[u8]) -> Result<(), CeremonyError> {
        match self.store.delete(credential_id).await {
            Ok(()) => {
                self.updates.publish(CeremonyUpdate::CredentialsCleared);
                Ok(())
            }
            Err(err) => Err(self.failed(err)),
        }
    }

    /// Remove every credential from the store.
    pub async fn delete_all_credentials(&mut self) -> Result<(), CeremonyError> {
        match self.store.delete_all().await {
            Ok(()) => {
                self.updates.publish(CeremonyUpdate::CredentialsCleared);
                Ok(())
            }
            Err(err) => Err(self.failed(err)),
        }
    }

    /// Publish the failure in the update channel and hand the error back to
    /// the caller.
    fn failed(&self, err: impl Into<CeremonyError>) -> CeremonyError {
        let err = err.into();
        self.updates.publish(CeremonyUpdate::Failed {
            detail: err.detail(),
        });
        err
    }
}
