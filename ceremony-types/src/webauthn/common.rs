//! Vocabulary shared by both ceremonies.

use serde::{Deserialize, Serialize, Serializer};
use typeshare::typeshare;

use crate::{
    utils::serde::{ignore_unknown, ignore_unknown_opt_vec},
    Bytes,
};

/// The type of credential taking part in a ceremony.
///
/// <https://w3c.github.io/webauthn/#enumdef-publickeycredentialtype>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[typeshare]
pub enum PublicKeyCredentialType {
    /// A public key credential, the only type WebAuthn defines today.
    PublicKey,

    /// A type this library does not know about. Values carrying it should be
    /// ignored.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A relying party's requirement for verifying the user is who they claim to
/// be, beyond being present.
///
/// <https://w3c.github.io/webauthn/#enumdef-userverificationrequirement>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[typeshare]
pub enum UserVerificationRequirement {
    /// The ceremony must fail without user verification.
    Required,

    /// User verification is preferred but its absence is accepted.
    #[default]
    Preferred,

    /// User verification should not be employed.
    Discouraged,
}

/// How a client may communicate with an authenticator.
///
/// <https://w3c.github.io/webauthn/#enumdef-authenticatortransport>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[typeshare]
pub enum AuthenticatorTransport {
    /// Removable USB.
    Usb,

    /// Near Field Communication.
    Nfc,

    /// Bluetooth Low Energy.
    Ble,

    /// A combination of transports negotiated over a proximity channel,
    /// formerly known as `cable`.
    #[serde(alias = "cable")]
    Hybrid,

    /// Bound to the client device itself, not removable.
    Internal,
}

/// The attachment modality of an authenticator.
///
/// <https://w3c.github.io/webauthn/#enumdef-authenticatorattachment>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[typeshare]
pub enum AuthenticatorAttachment {
    /// Attached to and inseparable from the client device.
    Platform,

    /// Roams between devices, for example a security key.
    CrossPlatform,
}

/// A reference to one credential, used in exclude and allow lists.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialdescriptor>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialDescriptor {
    /// The type of the referenced credential. Falls back to
    /// [`Unknown`](PublicKeyCredentialType::Unknown) for unrecognized
    /// values, in which case the whole descriptor should be ignored.
    #[serde(rename = "type", deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// The credential id.
    pub id: Bytes,

    /// Hints on how to reach the authenticator holding this credential.
    /// Unrecognized transports are dropped.
    #[serde(
        default,
        deserialize_with = "ignore_unknown_opt_vec",
        skip_serializing_if = "Option::is_none"
    )]
    pub transports: Option<Vec<AuthenticatorTransport>>,
}

impl PublicKeyCredentialDescriptor {
    /// Whether the descriptor's type was recognized during deserialization.
    pub fn is_known(&self) -> bool {
        self.ty != PublicKeyCredentialType::Unknown
    }
}

/// The contextual bindings a client collects for the relying party. Its JSON
/// serialization travels as the `clientDataJSON` member of an authenticator
/// response and is covered by the attestation or assertion signature.
///
/// <https://w3c.github.io/webauthn/#dictdef-collectedclientdata>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct CollectedClientData {
    /// The ceremony this data was collected for.
    #[serde(rename = "type")]
    pub ty: ClientDataType,

    /// Base64url encoding of the challenge the relying party provided.
    pub challenge: String,

    /// The fully qualified origin of the requester.
    pub origin: String,

    /// Whether the ceremony ran inside a cross-origin iframe. Always
    /// serialized so the signed bytes stay unambiguous.
    #[serde(default, serialize_with = "truthiness")]
    pub cross_origin: Option<bool>,
}

fn truthiness<S>(cross_origin: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_bool(cross_origin.filter(|b| *b).is_some())
}

/// The ceremony a [`CollectedClientData`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub enum ClientDataType {
    /// A registration ceremony.
    #[serde(rename = "webauthn.create")]
    Create,

    /// An authentication ceremony.
    #[serde(rename = "webauthn.get")]
    Get,
}
