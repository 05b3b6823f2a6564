//! The locally kept record of a registered credential.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{webauthn::PublicKeyCredentialType, Bytes};

/// An Authenticator Attestation Globally Unique Identifier: a 128 bit value
/// identifying the make and model of an authenticator.
///
/// Formats, parses, serializes and persists as the hyphenated UUID string
/// form, e.g. `b93fd961-f2e6-462f-b122-82002247de78`.
///
/// <https://w3c.github.io/webauthn/#aaguid>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aaguid(pub [u8; Self::LEN]);

impl Aaguid {
    const LEN: usize = 16;

    /// The all-zero AAGUID, used when the authenticator model should not be
    /// disclosed.
    pub const fn new_empty() -> Self {
        Self([0; Self::LEN])
    }
}

impl Default for Aaguid {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl From<[u8; Aaguid::LEN]> for Aaguid {
    fn from(bytes: [u8; Aaguid::LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Aaguid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, byte) in self.0.iter().enumerate() {
            if matches!(index, 4 | 6 | 8 | 10) {
                write!(f, "-")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// The string was not a 128 bit UUID.
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidAaguid;

impl FromStr for Aaguid {
    type Err = InvalidAaguid;

    /// Parses the hyphenated UUID form. Hyphen placement is not checked, so
    /// the plain 32 hex digit form parses as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut digits = s.chars().filter(|c| *c != '-');
        let mut bytes = [0; Self::LEN];
        for byte in &mut bytes {
            let high = digits.next().and_then(|c| c.to_digit(16)).ok_or(InvalidAaguid)?;
            let low = digits.next().and_then(|c| c.to_digit(16)).ok_or(InvalidAaguid)?;
            *byte = u8::try_from(high * 16 + low).map_err(|_| InvalidAaguid)?;
        }
        if digits.next().is_some() {
            return Err(InvalidAaguid);
        }
        Ok(Self(bytes))
    }
}

impl Serialize for Aaguid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Aaguid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct AaguidVisitor;

        impl serde::de::Visitor<'_> for AaguidVisitor {
            type Value = Aaguid;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a hyphenated UUID string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse()
                    .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(AaguidVisitor)
    }
}

/// One registered credential: the binding between an authenticator held key
/// pair and a user account at one relying party.
///
/// A record is created when a registration ceremony completes, listed when
/// the user reviews their accounts, and consulted on every authentication to
/// keep the signature counter moving forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSource {
    /// The credential type. Always
    /// [`PublicKey`](PublicKeyCredentialType::PublicKey) for records written
    /// by this crate.
    #[serde(rename = "type")]
    pub ty: PublicKeyCredentialType,

    /// The credential id chosen by the authenticator. Opaque, and unique
    /// across every record in a store.
    pub id: Bytes,

    /// The relying party this credential is scoped to.
    pub rp_id: String,

    /// The user handle the relying party issued during registration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<Bytes>,

    /// Make and model identifier of the authenticator holding the key.
    pub aaguid: Aaguid,

    /// How many assertions this credential has produced. Starts at zero and
    /// only ever moves forward, letting relying parties spot cloned
    /// authenticators.
    pub signature_counter: u32,
}

impl CredentialSource {
    /// Record a freshly created credential. The signature counter starts at
    /// zero.
    pub fn new(
        id: Bytes,
        rp_id: impl Into<String>,
        user_handle: Option<Bytes>,
        aaguid: Aaguid,
    ) -> Self {
        Self {
            ty: PublicKeyCredentialType::PublicKey,
            id,
            rp_id: rp_id.into(),
            user_handle,
            aaguid,
            signature_counter: 0,
        }
    }
}
