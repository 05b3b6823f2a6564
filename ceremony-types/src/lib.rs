//! # Ceremony Types
//!
//! Shared type definitions for the `ceremony` crates.
//!
//! This crate contains the [WebAuthn] data model exchanged with a relying
//! party over the two ceremonies, registration and authentication, along
//! with the [`CredentialSource`] record an application keeps for every
//! credential it registers.
//!
//! Where the WebAuthn IDL says a value "SHOULD be a member of" an
//! enumeration, deserialization here is tolerant: unknown enumeration values
//! fall back to a default or drop the surrounding entry instead of failing
//! the ceremony.
//!
//! [WebAuthn]: https://w3c.github.io/webauthn/

mod utils;

pub mod credential;
pub mod webauthn;

#[cfg(any(feature = "testable", test))]
pub mod mock;

pub use self::{
    credential::{Aaguid, CredentialSource, InvalidAaguid},
    utils::{
        bytes::{Bytes, NotBase64Encoded},
        crypto, encoding, rand,
    },
};
