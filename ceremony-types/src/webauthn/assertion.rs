//! Types for the authentication ceremony, where an existing credential
//! proves possession of its private key.
//!
//! <https://w3c.github.io/webauthn/#sctn-verifying-assertion>

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use super::{PublicKeyCredential, PublicKeyCredentialDescriptor, UserVerificationRequirement};
use crate::{
    utils::serde::{ignore_unknown, ignore_unknown_opt_vec, maybe_stringified},
    Bytes,
};

/// A credential as returned by a successful authentication ceremony.
pub type AuthenticatedPublicKeyCredential = PublicKeyCredential<AuthenticatorAssertionResponse>;

/// Caller supplied inputs for an authentication ceremony. Serializes as the
/// request body for the relying party's `assertion/options` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticationOptions {
    /// The account identifier presented to the relying party.
    pub username: String,

    /// The user verification requirement to ask for.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub user_verification: UserVerificationRequirement,
}

impl AuthenticationOptions {
    /// Authentication inputs with the platform default of required user
    /// verification.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            user_verification: UserVerificationRequirement::Required,
        }
    }
}

/// The options a relying party hands back from its `assertion/options`
/// endpoint, governing the assertion about to be produced.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialrequestoptions>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialRequestOptions {
    /// The challenge the assertion signature must cover.
    pub challenge: Bytes,

    /// Ceremony timeout in milliseconds.
    #[serde(
        default,
        deserialize_with = "maybe_stringified",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<u32>,

    /// The relying party identifier the credential must be scoped to. When
    /// absent the caller's effective domain applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,

    /// Credentials eligible for this assertion, most preferred first. Empty
    /// or absent means any discoverable credential for this relying party.
    #[serde(
        default,
        deserialize_with = "ignore_unknown_opt_vec",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// Whether the authenticator must verify the user.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub user_verification: UserVerificationRequirement,

    /// Extension inputs, forwarded verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// The authenticator's output from an authentication ceremony.
///
/// <https://w3c.github.io/webauthn/#authenticatorassertionresponse>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorAssertionResponse {
    /// JSON serialization of the
    /// [`CollectedClientData`](super::CollectedClientData) the assertion
    /// signature covers.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Bytes,

    /// The authenticator data for this assertion: the relying party id hash,
    /// ceremony flags and the signature counter.
    pub authenticator_data: Bytes,

    /// The signature over the authenticator data and the client data hash.
    pub signature: Bytes,

    /// The user handle the credential is mapped to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<Bytes>,
}
