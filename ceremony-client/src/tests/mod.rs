use std::collections::HashMap;

use ceremony_rp::{
    AuthenticationChallenge, MockRelyingParty, RegistrationChallenge, RelyingParty, RpError,
    ServerOutcome, StatusCode,
};
use ceremony_store::{CredentialSourceStore, MemoryStore, StoreError};
use ceremony_types::{
    credential::CredentialSource,
    crypto, encoding, mock, rand,
    webauthn::{
        default_algorithms, AuthenticatedPublicKeyCredential, AuthenticationOptions,
        ClientDataType, CollectedClientData, CreatedPublicKeyCredential,
        PublicKeyCredentialCreationOptions, PublicKeyCredentialDescriptor,
        PublicKeyCredentialRequestOptions, PublicKeyCredentialRpEntity, PublicKeyCredentialType,
        PublicKeyCredentialUserEntity, RegistrationOptions, UserVerificationRequirement,
    },
    Aaguid, Bytes,
};
use tokio::sync::Mutex;

use super::*;
use crate::authenticator::MockAuthenticator;

const RP_ID: &str = "example.com";
const ORIGIN: &str = "https://example.com";

fn aaguid() -> Aaguid {
    Aaguid::from([0xab; 16])
}

fn descriptor(id: Bytes) -> PublicKeyCredentialDescriptor {
    PublicKeyCredentialDescriptor {
        ty: PublicKeyCredentialType::PublicKey,
        id,
        transports: None,
    }
}

fn registration_challenge(challenge: Bytes) -> RegistrationChallenge {
    RegistrationChallenge {
        options: PublicKeyCredentialCreationOptions {
            rp: PublicKeyCredentialRpEntity {
                id: Some(RP_ID.into()),
                name: "Example".into(),
                icon: None,
            },
            user: PublicKeyCredentialUserEntity {
                id: b"gildong".as_slice().into(),
                name: "gildong".into(),
                display_name: "Gildong Hong".into(),
                icon: None,
            },
            challenge,
            pub_key_cred_params: default_algorithms(),
            timeout: Some(1_800_000),
            exclude_credentials: None,
            authenticator_selection: None,
            attestation: Default::default(),
            extensions: None,
        },
        session_id: Some("fake-session".into()),
    }
}

fn authentication_challenge(
    challenge: Bytes,
    allow_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,
) -> AuthenticationChallenge {
    AuthenticationChallenge {
        options: PublicKeyCredentialRequestOptions {
            challenge,
            timeout: Some(1_800_000),
            rp_id: Some(RP_ID.into()),
            allow_credentials,
            user_verification: UserVerificationRequirement::Required,
            extensions: None,
        },
        session_id: Some("fake-session".into()),
    }
}

/// An authenticator that tracks its own signature counters, enough to look
/// like a real platform authenticator to [`FakeRelyingParty`].
struct FakeAuthenticator {
    aaguid: Aaguid,
    counters: Mutex<HashMap<Vec<u8>, u32>>,
}

impl FakeAuthenticator {
    fn new() -> Self {
        Self {
            aaguid: aaguid(),
            counters: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl Authenticator for FakeAuthenticator {
    fn kind(&self) -> AuthenticatorKind {
        AuthenticatorKind::Biometric
    }

    fn aaguid(&self) -> Aaguid {
        self.aaguid
    }

    async fn create(
        &self,
        options: &PublicKeyCredentialCreationOptions,
    ) -> Result<CreatedPublicKeyCredential, AuthenticatorError> {
        let credential = mock::created_credential(options, ORIGIN, self.aaguid);
        self.counters
            .lock()
            .await
            .insert(credential.raw_id.to_vec(), 0);
        Ok(credential)
    }

    async fn get(
        &self,
        options: &PublicKeyCredentialRequestOptions,
    ) -> Result<AuthenticatedPublicKeyCredential, AuthenticatorError> {
        let mut counters = self.counters.lock().await;
        let credential_id = options
            .allow_credentials
            .iter()
            .flatten()
            .find(|descriptor| counters.contains_key(descriptor.id.as_slice()))
            .map(|descriptor| descriptor.id.clone())
            .ok_or_else(|| AuthenticatorError::Failed("no matching credential".into()))?;
        let counter = counters
            .get_mut(credential_id.as_slice())
            .ok_or_else(|| AuthenticatorError::Failed("no matching credential".into()))?;
        *counter += 1;
        Ok(mock::asserted_credential(
            options,
            ORIGIN,
            credential_id,
            None,
            *counter,
        ))
    }
}

/// An authenticator whose signature counter is stuck, the way a cloned
/// authenticator's would be.
struct ReplayingAuthenticator {
    aaguid: Aaguid,
}

#[async_trait::async_trait]
impl Authenticator for ReplayingAuthenticator {
    fn kind(&self) -> AuthenticatorKind {
        AuthenticatorKind::Biometric
    }

    fn aaguid(&self) -> Aaguid {
        self.aaguid
    }

    async fn create(
        &self,
        options: &PublicKeyCredentialCreationOptions,
    ) -> Result<CreatedPublicKeyCredential, AuthenticatorError> {
        Ok(mock::created_credential(options, ORIGIN, self.aaguid))
    }

    async fn get(
        &self,
        options: &PublicKeyCredentialRequestOptions,
    ) -> Result<AuthenticatedPublicKeyCredential, AuthenticatorError> {
        let credential_id = options
            .allow_credentials
            .iter()
            .flatten()
            .next()
            .map(|descriptor| descriptor.id.clone())
            .ok_or_else(|| AuthenticatorError::Failed("no allowed credential".into()))?;
        Ok(mock::asserted_credential(
            options, ORIGIN, credential_id, None, 1,
        ))
    }
}

/// An in-process relying party that issues challenges and verifies
/// responses the way a conformance server does, without any HTTP.
struct FakeRelyingParty {
    rp_id: String,
    state: Mutex<FakeRpState>,
}

#[derive(Default)]
struct FakeRpState {
    registration_challenge: Option<Bytes>,
    authentication_challenge: Option<Bytes>,
    /// Credential id to the highest signature counter seen.
    counters: HashMap<Vec<u8>, u32>,
}

impl FakeRelyingParty {
    fn new(rp_id: &str) -> Self {
        Self {
            rp_id: rp_id.into(),
            state: Mutex::new(FakeRpState::default()),
        }
    }

    fn rejection(message: &str) -> RpError {
        RpError::Rejected {
            status: StatusCode::OK,
            body: format!(r#"{{"status":"failed","errorMessage":"{message}"}}"#),
        }
    }
}

fn attested_auth_data(attestation_object: &[u8]) -> Result<Vec<u8>, RpError> {
    let value: ciborium::Value = ciborium::de::from_reader(attestation_object)
        .map_err(|_| FakeRelyingParty::rejection("unreadable attestation object"))?;
    value
        .into_map()
        .ok()
        .and_then(|map| {
            map.into_iter().find_map(|(key, value)| {
                (key.as_text() == Some("authData"))
                    .then(|| value.into_bytes().ok())
                    .flatten()
            })
        })
        .ok_or_else(|| FakeRelyingParty::rejection("attestation object without authData"))
}

#[async_trait::async_trait]
impl RelyingParty for FakeRelyingParty {
    fn rp_id(&self) -> &str {
        &self.rp_id
    }

    async fn get_registration_challenge(
        &self,
        options: &RegistrationOptions,
    ) -> Result<RegistrationChallenge, RpError> {
        let challenge: Bytes = rand::random_vec(32).into();
        self.state.lock().await.registration_challenge = Some(challenge.clone());

        Ok(RegistrationChallenge {
            options: PublicKeyCredentialCreationOptions {
                rp: PublicKeyCredentialRpEntity {
                    id: Some(self.rp_id.clone()),
                    name: self.rp_id.clone(),
                    icon: None,
                },
                user: PublicKeyCredentialUserEntity {
                    id: options.username.as_bytes().into(),
                    name: options.username.clone(),
                    display_name: options.display_name.clone(),
                    icon: None,
                },
                challenge,
                pub_key_cred_params: default_algorithms(),
                timeout: Some(1_800_000),
                exclude_credentials: None,
                authenticator_selection: options.authenticator_selection.clone(),
                attestation: options.attestation,
                extensions: None,
            },
            session_id: Some("fake-session".into()),
        })
    }

    async fn verify_registration(
        &self,
        credential: &CreatedPublicKeyCredential,
    ) -> Result<ServerOutcome, RpError> {
        let mut state = self.state.lock().await;

        let client_data: CollectedClientData =
            serde_json::from_slice(&credential.response.client_data_json)
                .map_err(|_| Self::rejection("unreadable client data"))?;
        if client_data.ty != ClientDataType::Create {
            return Err(Self::rejection("wrong client data type"));
        }
        let expected = state
            .registration_challenge
            .take()
            .ok_or_else(|| Self::rejection("no registration challenge outstanding"))?;
        if client_data.challenge != encoding::base64url(&expected) {
            return Err(Self::rejection("challenge mismatch"));
        }

        let auth_data = attested_auth_data(&credential.response.attestation_object)?;
        if auth_data.len() < 55 {
            return Err(Self::rejection("authenticator data too short"));
        }
        if auth_data[..32] != crypto::sha256(self.rp_id.as_bytes()) {
            return Err(Self::rejection("relying party id hash mismatch"));
        }
        let id_length = usize::from(u16::from_be_bytes([auth_data[53], auth_data[54]]));
        let credential_id = auth_data[55..55 + id_length].to_vec();
        if credential_id.as_slice() != credential.raw_id.as_slice() {
            return Err(Self::rejection("attested id does not match the raw id"));
        }
        let counter = u32::from_be_bytes([
            auth_data[33],
            auth_data[34],
            auth_data[35],
            auth_data[36],
        ]);
        state.counters.insert(credential_id.clone(), counter);

        Ok(ServerOutcome {
            credential_id: Some(encoding::base64url(&credential_id)),
            session_id: Some("fake-session".into()),
        })
    }

    async fn get_authentication_challenge(
        &self,
        options: &AuthenticationOptions,
    ) -> Result<AuthenticationChallenge, RpError> {
        let challenge: Bytes = rand::random_vec(32).into();
        let mut state = self.state.lock().await;
        if state.counters.is_empty() {
            return Err(Self::rejection("no credentials registered"));
        }
        state.authentication_challenge = Some(challenge.clone());

        let allow_credentials = state
            .counters
            .keys()
            .map(|id| descriptor(id.as_slice().into()))
            .collect();
        Ok(AuthenticationChallenge {
            options: PublicKeyCredentialRequestOptions {
                challenge,
                timeout: Some(1_800_000),
                rp_id: Some(self.rp_id.clone()),
                allow_credentials: Some(allow_credentials),
                user_verification: options.user_verification,
                extensions: None,
            },
            session_id: Some("fake-session".into()),
        })
    }

    async fn verify_authentication(
        &self,
        credential: &AuthenticatedPublicKeyCredential,
    ) -> Result<ServerOutcome, RpError> {
        let mut state = self.state.lock().await;

        let client_data: CollectedClientData =
            serde_json::from_slice(&credential.response.client_data_json)
                .map_err(|_| Self::rejection("unreadable client data"))?;
        if client_data.ty != ClientDataType::Get {
            return Err(Self::rejection("wrong client data type"));
        }
        let expected = state
            .authentication_challenge
            .take()
            .ok_or_else(|| Self::rejection("no authentication challenge outstanding"))?;
        if client_data.challenge != encoding::base64url(&expected) {
            return Err(Self::rejection("challenge mismatch"));
        }

        let auth_data = &credential.response.authenticator_data;
        if auth_data.len() < 37 {
            return Err(Self::rejection("authenticator data too short"));
        }
        if auth_data[..32] != crypto::sha256(self.rp_id.as_bytes()) {
            return Err(Self::rejection("relying party id hash mismatch"));
        }
        let counter = u32::from_be_bytes([
            auth_data[33],
            auth_data[34],
            auth_data[35],
            auth_data[36],
        ]);

        let last = state
            .counters
            .get_mut(credential.raw_id.as_slice())
            .ok_or_else(|| Self::rejection("unknown credential"))?;
        // clone detection: the counter must strictly increase
        if counter <= *last {
            return Err(Self::rejection("signature counter did not increase"));
        }
        *last = counter;

        Ok(ServerOutcome {
            credential_id: Some(credential.id.clone()),
            session_id: Some("fake-session".into()),
        })
    }
}

#[tokio::test]
async fn register_then_authenticate_against_a_fake_relying_party() {
    let mut client = Client::new(
        MemoryStore::new(),
        FakeAuthenticator::new(),
        FakeRelyingParty::new(RP_ID),
    );

    let source = client
        .register(RegistrationOptions::new("alice@example.com", "Alice"))
        .await
        .expect("failed to register");
    assert_eq!(source.rp_id, RP_ID);
    assert_eq!(source.signature_counter, 0);
    assert_eq!(
        source.user_handle,
        Some(b"alice@example.com".as_slice().into())
    );
    assert_eq!(source.aaguid, aaguid());

    let outcome = client
        .authenticate(AuthenticationOptions::new("alice@example.com"))
        .await
        .expect("failed to authenticate");
    assert_eq!(outcome.session_id.as_deref(), Some("fake-session"));

    client
        .authenticate(AuthenticationOptions::new("alice@example.com"))
        .await
        .expect("failed to authenticate a second time");

    let credentials = client
        .credentials()
        .await
        .expect("failed to list credentials");
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].signature_counter, 2);
}

#[tokio::test]
async fn updates_follow_the_ceremonies() {
    let mut client = Client::new(
        MemoryStore::new(),
        FakeAuthenticator::new(),
        FakeRelyingParty::new(RP_ID),
    );
    let updates = client.updates();
    assert_eq!(*updates.borrow(), CeremonyUpdate::Idle);

    let source = client
        .register(RegistrationOptions::new("alice@example.com", "Alice"))
        .await
        .expect("failed to register");
    assert_eq!(
        *updates.borrow(),
        CeremonyUpdate::Registered {
            username: "alice@example.com".into(),
            credential_id: encoding::base64url(&source.id),
        }
    );

    client
        .authenticate(AuthenticationOptions::new("alice@example.com"))
        .await
        .expect("failed to authenticate");
    assert_eq!(
        *updates.borrow(),
        CeremonyUpdate::Authenticated {
            username: "alice@example.com".into(),
        }
    );

    client
        .credentials()
        .await
        .expect("failed to list credentials");
    assert_eq!(
        *updates.borrow(),
        CeremonyUpdate::CredentialsListed { count: 1 }
    );

    client
        .delete_all_credentials()
        .await
        .expect("failed to delete all");
    assert_eq!(*updates.borrow(), CeremonyUpdate::CredentialsCleared);
}

#[tokio::test]
async fn stuck_counters_are_rejected_as_clones() {
    let mut client = Client::new(
        MemoryStore::new(),
        ReplayingAuthenticator { aaguid: aaguid() },
        FakeRelyingParty::new(RP_ID),
    );

    client
        .register(RegistrationOptions::new("alice@example.com", "Alice"))
        .await
        .expect("failed to register");
    client
        .authenticate(AuthenticationOptions::new("alice@example.com"))
        .await
        .expect("the first assertion should pass");

    let err = client
        .authenticate(AuthenticationOptions::new("alice@example.com"))
        .await
        .expect_err("a replayed counter should be rejected");
    match err {
        CeremonyError::Rp(RpError::Rejected { body, .. }) => {
            assert!(body.contains("signature counter did not increase"));
        }
        other => panic!("expected a rejection, got: {other}"),
    }

    // the rejected assertion must not advance the stored counter
    let credentials = client
        .credentials()
        .await
        .expect("failed to list credentials");
    assert_eq!(credentials[0].signature_counter, 1);
}

#[tokio::test]
async fn deleting_credentials_is_quiet_and_complete() {
    let mut client = Client::new(
        MemoryStore::new(),
        FakeAuthenticator::new(),
        FakeRelyingParty::new(RP_ID),
    );

    let first = client
        .register(RegistrationOptions::new("alice@example.com", "Alice"))
        .await
        .expect("failed to register alice");
    let second = client
        .register(RegistrationOptions::new("bob@example.com", "Bob"))
        .await
        .expect("failed to register bob");

    client
        .delete_credential(&first.id)
        .await
        .expect("failed to delete");
    client
        .delete_credential(&first.id)
        .await
        .expect("deleting a missing credential should be quiet");
    assert_eq!(
        client
            .credentials()
            .await
            .expect("failed to list credentials"),
        vec![second]
    );

    client
        .delete_all_credentials()
        .await
        .expect("failed to delete all");
    assert!(client
        .credentials()
        .await
        .expect("failed to list credentials")
        .is_empty());
}

#[tokio::test]
async fn registration_stores_the_server_issued_user_handle() {
    let mut rp = MockRelyingParty::new();
    let issued = registration_challenge(rand::random_vec(32).into());
    rp.expect_get_registration_challenge()
        .returning(move |_| Ok(issued.clone()));
    rp.expect_verify_registration()
        .returning(|_| Ok(ServerOutcome::default()));

    let mut client = Client::new(
        MemoryStore::new(),
        MockAuthenticator::approving(AuthenticatorKind::DeviceCredential, aaguid()),
        rp,
    );

    let source = client
        .register(RegistrationOptions::new("gildong", "Gildong Hong"))
        .await
        .expect("failed to register");
    assert_eq!(source.user_handle, Some(b"gildong".as_slice().into()));
    assert_eq!(source.aaguid, aaguid());
    assert_eq!(source.rp_id, RP_ID);

    let stored = client
        .credentials()
        .await
        .expect("failed to list credentials");
    assert_eq!(stored, vec![source]);
}

#[tokio::test]
async fn rejected_attestations_store_nothing() {
    let mut rp = MockRelyingParty::new();
    let issued = registration_challenge(rand::random_vec(32).into());
    rp.expect_get_registration_challenge()
        .returning(move |_| Ok(issued.clone()));
    rp.expect_verify_registration().returning(|_| {
        Err(RpError::Rejected {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"status":"failed","errorMessage":"no attestation allowed"}"#.into(),
        })
    });

    let mut client = Client::new(
        MemoryStore::new(),
        MockAuthenticator::approving(AuthenticatorKind::Biometric, aaguid()),
        rp,
    );
    let updates = client.updates();

    let err = client
        .register(RegistrationOptions::new("gildong", "Gildong Hong"))
        .await
        .expect_err("the attestation should have been rejected");
    assert!(matches!(
        &err,
        CeremonyError::Rp(RpError::Rejected { status, .. }) if *status == StatusCode::BAD_REQUEST
    ));
    match updates.borrow().clone() {
        CeremonyUpdate::Failed { detail } => {
            assert!(detail.starts_with("HTTP code: 400\nError Body:"));
            assert!(detail.contains("no attestation allowed"));
        }
        other => panic!("expected a failure update, got: {other}"),
    }

    assert!(client
        .credentials()
        .await
        .expect("failed to list credentials")
        .is_empty());
}

#[tokio::test]
async fn duplicate_credential_ids_abort_the_registration() {
    let credential_id: Bytes = vec![7; 16].into();

    let mut store = MemoryStore::new();
    store
        .store(CredentialSource::new(
            credential_id.clone(),
            RP_ID,
            None,
            aaguid(),
        ))
        .await
        .expect("failed to seed the store");

    let mut rp = MockRelyingParty::new();
    let issued = registration_challenge(rand::random_vec(32).into());
    rp.expect_get_registration_challenge()
        .returning(move |_| Ok(issued.clone()));
    rp.expect_verify_registration()
        .returning(|_| Ok(ServerOutcome::default()));

    let mut authenticator = MockAuthenticator::new();
    authenticator.expect_aaguid().return_const(aaguid());
    let minted_id = credential_id.clone();
    authenticator.expect_create().returning(move |options| {
        Ok(mock::created_credential_with_id(
            options,
            ORIGIN,
            aaguid(),
            minted_id.clone(),
        ))
    });

    let mut client = Client::new(store, authenticator, rp);
    let err = client
        .register(RegistrationOptions::new("gildong", "Gildong Hong"))
        .await
        .expect_err("the duplicate id should have been refused");
    assert!(matches!(err, CeremonyError::Store(StoreError::DuplicateId)));

    // the record stored first is untouched
    let stored = client
        .credentials()
        .await
        .expect("failed to list credentials");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_handle, None);
}

#[tokio::test]
async fn rejected_assertions_leave_the_stored_counter_alone() {
    let credential_id: Bytes = vec![7; 16].into();

    let mut store = MemoryStore::new();
    store
        .store(CredentialSource::new(
            credential_id.clone(),
            RP_ID,
            None,
            aaguid(),
        ))
        .await
        .expect("failed to seed the store");

    let mut rp = MockRelyingParty::new();
    let issued = authentication_challenge(
        rand::random_vec(32).into(),
        Some(vec![descriptor(credential_id.clone())]),
    );
    rp.expect_get_authentication_challenge()
        .returning(move |_| Ok(issued.clone()));
    rp.expect_verify_authentication()
        .returning(|_| Err(FakeRelyingParty::rejection("Can not validate response signature!")));

    let mut client = Client::new(
        store,
        MockAuthenticator::approving(AuthenticatorKind::Biometric, aaguid()),
        rp,
    );

    let err = client
        .authenticate(AuthenticationOptions::new("gildong"))
        .await
        .expect_err("the assertion should have been rejected");
    assert_eq!(err.detail().lines().next(), Some("HTTP code: 200"));

    let stored = client
        .credentials()
        .await
        .expect("failed to list credentials");
    assert_eq!(stored[0].signature_counter, 0);
}

#[tokio::test]
async fn a_cancelled_prompt_surfaces_as_an_authenticator_error() {
    let mut rp = MockRelyingParty::new();
    let issued = registration_challenge(rand::random_vec(32).into());
    rp.expect_get_registration_challenge()
        .returning(move |_| Ok(issued.clone()));

    let mut authenticator = MockAuthenticator::new();
    authenticator
        .expect_create()
        .returning(|_| Err(AuthenticatorError::Cancelled));

    let mut client = Client::new(MemoryStore::new(), authenticator, rp);
    let err = client
        .register(RegistrationOptions::new("gildong", "Gildong Hong"))
        .await
        .expect_err("the cancelled prompt should fail the ceremony");
    assert!(matches!(
        err,
        CeremonyError::Authenticator(AuthenticatorError::Cancelled)
    ));
    assert_eq!(err.detail(), "the user cancelled the ceremony");
}
