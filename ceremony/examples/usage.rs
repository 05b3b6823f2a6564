//! Sample app running both WebAuthn ceremonies offline.
use ceremony::{
    client::{Authenticator, AuthenticatorError, AuthenticatorKind, CeremonyError, Client},
    rp::{AuthenticationChallenge, RegistrationChallenge, RelyingParty, RpError, ServerOutcome},
    store::MemoryStore,
    types::{
        encoding, mock,
        rand::random_vec,
        webauthn::{
            default_algorithms, AuthenticatedPublicKeyCredential, AuthenticationOptions,
            CreatedPublicKeyCredential, PublicKeyCredentialCreationOptions,
            PublicKeyCredentialDescriptor, PublicKeyCredentialRequestOptions,
            PublicKeyCredentialRpEntity, PublicKeyCredentialType, PublicKeyCredentialUserEntity,
            RegistrationOptions,
        },
        Aaguid, Bytes,
    },
};
use tokio::sync::Mutex;

const RP_ID: &str = "future.1password.com";
const ORIGIN: &str = "https://future.1password.com";

// DemoAuthenticator stands in for the platform's verification prompt,
// approving every request with canned responses.
struct DemoAuthenticator {
    aaguid: Aaguid,
}

#[async_trait::async_trait]
impl Authenticator for DemoAuthenticator {
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
        println!(
            "[authenticator] verifying the user to mint a credential for {}",
            options.user.name
        );
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
        println!("[authenticator] verifying the user to sign an assertion");
        Ok(mock::asserted_credential(
            options,
            ORIGIN,
            credential_id,
            None,
            1,
        ))
    }
}

// DemoRelyingParty issues challenges and accepts every response. A real
// application would construct an `rp::HttpRelyingParty` pointed at its
// server instead.
#[derive(Default)]
struct DemoRelyingParty {
    registered: Mutex<Vec<Bytes>>,
}

#[async_trait::async_trait]
impl RelyingParty for DemoRelyingParty {
    fn rp_id(&self) -> &str {
        RP_ID
    }

    async fn get_registration_challenge(
        &self,
        options: &RegistrationOptions,
    ) -> Result<RegistrationChallenge, RpError> {
        println!(
            "[relying party] issuing a registration challenge for {}",
            options.username
        );
        Ok(RegistrationChallenge {
            options: PublicKeyCredentialCreationOptions {
                rp: PublicKeyCredentialRpEntity {
                    id: Some(RP_ID.into()),
                    name: "Future".into(),
                    icon: None,
                },
                user: PublicKeyCredentialUserEntity {
                    id: options.username.as_bytes().into(),
                    name: options.username.clone(),
                    display_name: options.display_name.clone(),
                    icon: None,
                },
                challenge: random_vec(32).into(),
                pub_key_cred_params: default_algorithms(),
                timeout: Some(1_800_000),
                exclude_credentials: None,
                authenticator_selection: options.authenticator_selection.clone(),
                attestation: options.attestation,
                extensions: None,
            },
            session_id: None,
        })
    }

    async fn verify_registration(
        &self,
        credential: &CreatedPublicKeyCredential,
    ) -> Result<ServerOutcome, RpError> {
        println!("[relying party] attestation accepted");
        self.registered
            .lock()
            .await
            .push(credential.raw_id.clone());
        Ok(ServerOutcome {
            credential_id: Some(credential.id.clone()),
            session_id: None,
        })
    }

    async fn get_authentication_challenge(
        &self,
        options: &AuthenticationOptions,
    ) -> Result<AuthenticationChallenge, RpError> {
        println!(
            "[relying party] issuing an authentication challenge for {}",
            options.username
        );
        let allow_credentials = self
            .registered
            .lock()
            .await
            .iter()
            .map(|id| PublicKeyCredentialDescriptor {
                ty: PublicKeyCredentialType::PublicKey,
                id: id.clone(),
                transports: None,
            })
            .collect();
        Ok(AuthenticationChallenge {
            options: PublicKeyCredentialRequestOptions {
                challenge: random_vec(32).into(),
                timeout: Some(1_800_000),
                rp_id: Some(RP_ID.into()),
                allow_credentials: Some(allow_credentials),
                user_verification: options.user_verification,
                extensions: None,
            },
            session_id: None,
        })
    }

    async fn verify_authentication(
        &self,
        credential: &AuthenticatedPublicKeyCredential,
    ) -> Result<ServerOutcome, RpError> {
        println!("[relying party] assertion accepted");
        Ok(ServerOutcome {
            credential_id: Some(credential.id.clone()),
            session_id: None,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), CeremonyError> {
    let mut client = Client::new(
        MemoryStore::new(),
        DemoAuthenticator {
            aaguid: Aaguid::new_empty(),
        },
        DemoRelyingParty::default(),
    );
    let updates = client.updates();

    let registered = client
        .register(RegistrationOptions::new(
            "jpasskey@example.org",
            "Johnny Passkey",
        ))
        .await?;
    println!("[update] {}", *updates.borrow());
    println!("\nWebauthn credential created:\n\n{:?}\n", registered);

    let outcome = client
        .authenticate(AuthenticationOptions::new("jpasskey@example.org"))
        .await?;
    println!("[update] {}", *updates.borrow());
    println!("\nWebauthn credential auth'ed:\n\n{:?}\n", outcome);

    for credential in client.credentials().await? {
        println!(
            "stored credential {} with counter {}",
            encoding::base64url(&credential.id),
            credential.signature_counter
        );
    }

    client.delete_all_credentials().await?;
    println!("credentials wiped");

    Ok(())
}
