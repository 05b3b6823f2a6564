//! Types for the registration ceremony, where a new credential is created
//! and attested.
//!
//! <https://w3c.github.io/webauthn/#sctn-registering-a-new-credential>

use coset::iana;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use super::{
    AuthenticatorAttachment, AuthenticatorTransport, PublicKeyCredential,
    PublicKeyCredentialDescriptor, PublicKeyCredentialType, UserVerificationRequirement,
};
use crate::{
    utils::serde::{
        i64_to_iana, ignore_unknown, ignore_unknown_opt_vec, ignore_unknown_vec,
        maybe_stringified,
    },
    Bytes,
};

/// A credential as returned by a successful registration ceremony.
pub type CreatedPublicKeyCredential = PublicKeyCredential<AuthenticatorAttestationResponse>;

/// Caller supplied inputs for a registration ceremony. Serializes as the
/// request body for the relying party's `attestation/options` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct RegistrationOptions {
    /// The account identifier presented to the relying party.
    pub username: String,

    /// Human palatable name for the account, shown in account pickers.
    pub display_name: String,

    /// How much attestation data the caller wants conveyed back.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub attestation: AttestationConveyancePreference,

    /// Requirements on the authenticator taking part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelectionCriteria>,

    /// The credential protection policy to request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_protect: Option<CredentialProtection>,
}

impl RegistrationOptions {
    /// Registration inputs with the defaults for a device bound credential:
    /// no attestation, platform attachment and required user verification.
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            attestation: AttestationConveyancePreference::None,
            authenticator_selection: Some(AuthenticatorSelectionCriteria {
                authenticator_attachment: Some(AuthenticatorAttachment::Platform),
                resident_key: None,
                require_resident_key: false,
                user_verification: UserVerificationRequirement::Required,
            }),
            cred_protect: None,
        }
    }
}

/// The options a relying party hands back from its `attestation/options`
/// endpoint, governing the credential about to be created.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialcreationoptions>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialCreationOptions {
    /// The relying party's identity.
    pub rp: PublicKeyCredentialRpEntity,

    /// The user account the new credential will belong to.
    pub user: PublicKeyCredentialUserEntity,

    /// The challenge the attestation signature must cover.
    pub challenge: Bytes,

    /// Signature schemes the relying party accepts, most preferred first.
    /// Entries with unrecognized types or algorithms are dropped.
    #[serde(deserialize_with = "ignore_unknown_vec")]
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,

    /// Ceremony timeout in milliseconds.
    #[serde(
        default,
        deserialize_with = "maybe_stringified",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<u32>,

    /// Credentials the relying party already holds for this account. The
    /// ceremony must not create a second credential for any of them.
    #[serde(
        default,
        deserialize_with = "ignore_unknown_opt_vec",
        skip_serializing_if = "Option::is_none"
    )]
    pub exclude_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// Requirements on the authenticator taking part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelectionCriteria>,

    /// The attestation conveyance the relying party prefers.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub attestation: AttestationConveyancePreference,

    /// Extension inputs, forwarded verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// The relying party's identity.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialrpentity>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialRpEntity {
    /// The relying party identifier. When absent the caller's effective
    /// domain applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human palatable name of the relying party.
    pub name: String,

    /// URL of an icon for the relying party. Dropped from current WebAuthn
    /// levels but still emitted by some servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// The user account a registration is performed for.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialuserentity>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialUserEntity {
    /// The user handle: an opaque identifier the relying party maps
    /// credentials to accounts with. At most 64 bytes and never shown to the
    /// user.
    pub id: Bytes,

    /// Human palatable account identifier, such as a username or email
    /// address.
    pub name: String,

    /// Human palatable display name for the account.
    pub display_name: String,

    /// URL of an icon for the account. Legacy, see
    /// [`PublicKeyCredentialRpEntity::icon`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A credential type and signature algorithm pair the relying party accepts.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialparameters>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialParameters {
    /// The credential type.
    #[serde(rename = "type")]
    pub ty: PublicKeyCredentialType,

    /// The COSE algorithm identifier.
    #[typeshare(serialized_as = "I64")]
    #[serde(with = "i64_to_iana")]
    pub alg: iana::Algorithm,
}

/// The algorithms a relying party should accept for broad authenticator
/// support: ES256 and RS256.
pub fn default_algorithms() -> Vec<PublicKeyCredentialParameters> {
    vec![
        PublicKeyCredentialParameters {
            ty: PublicKeyCredentialType::PublicKey,
            alg: iana::Algorithm::ES256,
        },
        PublicKeyCredentialParameters {
            ty: PublicKeyCredentialType::PublicKey,
            alg: iana::Algorithm::RS256,
        },
    ]
}

/// Requirements on which authenticator may take part in a registration.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticatorselectioncriteria>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorSelectionCriteria {
    /// Restrict eligible authenticators by attachment modality.
    #[serde(
        default,
        deserialize_with = "ignore_unknown",
        skip_serializing_if = "Option::is_none"
    )]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,

    /// The relying party's preference for a discoverable credential.
    #[serde(
        default,
        deserialize_with = "ignore_unknown",
        skip_serializing_if = "Option::is_none"
    )]
    pub resident_key: Option<ResidentKeyRequirement>,

    /// WebAuthn Level 1 form of [`Self::resident_key`], kept for older
    /// relying parties.
    #[serde(default)]
    pub require_resident_key: bool,

    /// Whether the authenticator must verify the user.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub user_verification: UserVerificationRequirement,
}

/// A relying party's preference for a client side discoverable credential.
///
/// <https://w3c.github.io/webauthn/#enumdef-residentkeyrequirement>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[typeshare]
pub enum ResidentKeyRequirement {
    /// A server side credential is preferred.
    Discouraged,

    /// A discoverable credential is preferred but not required.
    Preferred,

    /// The ceremony must fail if a discoverable credential cannot be
    /// created.
    Required,
}

/// How much attestation data the relying party wants conveyed.
///
/// <https://w3c.github.io/webauthn/#enumdef-attestationconveyancepreference>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[typeshare]
pub enum AttestationConveyancePreference {
    /// The relying party is not interested in attestation.
    #[default]
    None,

    /// The client may substitute an anonymized attestation.
    Indirect,

    /// The relying party wants the attestation statement as the
    /// authenticator generated it.
    Direct,

    /// The relying party wants an attestation statement possibly containing
    /// uniquely identifying information, for controlled deployments.
    Enterprise,
}

/// Credential protection policies from the CTAP2 `credProtect` extension.
///
/// <https://fidoalliance.org/specs/fido-v2.1-ps-20210615/fido-client-to-authenticator-protocol-v2.1-ps-errata-20220621.html#sctn-credProtect-extension>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub enum CredentialProtection {
    /// The credential may be used without user verification.
    UserVerificationOptional,

    /// User verification is optional when the credential is named in an
    /// allow list.
    UserVerificationOptionalWithCredentialIdList,

    /// The credential may never be used without user verification.
    UserVerificationRequired,
}

/// The authenticator's output from a registration ceremony.
///
/// <https://w3c.github.io/webauthn/#authenticatorattestationresponse>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorAttestationResponse {
    /// JSON serialization of the
    /// [`CollectedClientData`](super::CollectedClientData) the attestation
    /// signature covers.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Bytes,

    /// CBOR encoded attestation object: the authenticator data together with
    /// an attestation statement.
    pub attestation_object: Bytes,

    /// Transports the new credential's authenticator is believed to support.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<AuthenticatorTransport>>,
}
