//! The types exchanged with a relying party during the WebAuthn
//! [registration] and [authentication] ceremonies.
//!
//! [registration]: https://w3c.github.io/webauthn/#sctn-registering-a-new-credential
//! [authentication]: https://w3c.github.io/webauthn/#sctn-verifying-assertion

mod assertion;
mod attestation;
mod common;

pub use self::{assertion::*, attestation::*, common::*};

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{utils::encoding, Bytes};

mod sealed {
    use super::{AuthenticatorAssertionResponse, AuthenticatorAttestationResponse};

    pub trait Sealed {}

    impl Sealed for AuthenticatorAttestationResponse {}
    impl Sealed for AuthenticatorAssertionResponse {}
}

/// Marker for the response member of a [`PublicKeyCredential`].
///
/// This trait is sealed with exactly two implementations:
/// [`AuthenticatorAttestationResponse`] for registration and
/// [`AuthenticatorAssertionResponse`] for authentication.
pub trait AuthenticatorResponse: sealed::Sealed {}

impl AuthenticatorResponse for AuthenticatorAttestationResponse {}
impl AuthenticatorResponse for AuthenticatorAssertionResponse {}

/// A public key credential as produced by an authenticator operation, sent
/// to the relying party to finish a ceremony.
///
/// <https://w3c.github.io/webauthn/#iface-pkcredential>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredential<R: AuthenticatorResponse> {
    /// Base64url encoding of [`Self::raw_id`].
    pub id: String,

    /// The credential id chosen by the authenticator.
    pub raw_id: Bytes,

    /// The credential type. Always
    /// [`PublicKey`](PublicKeyCredentialType::PublicKey) today.
    #[serde(rename = "type")]
    pub ty: PublicKeyCredentialType,

    /// The ceremony output produced by the authenticator.
    pub response: R,

    /// Client extension outputs, forwarded verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl<R: AuthenticatorResponse> PublicKeyCredential<R> {
    /// Bundle an authenticator's ceremony output with its credential id,
    /// deriving the string form of the id from the raw bytes.
    pub fn new(raw_id: Bytes, response: R) -> Self {
        Self {
            id: encoding::base64url(&raw_id),
            raw_id,
            ty: PublicKeyCredentialType::PublicKey,
            response,
            extensions: None,
        }
    }
}
