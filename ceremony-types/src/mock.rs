//! Canned authenticator replies for exercising ceremony flows without a
//! platform authenticator.
//!
//! The builders here produce structurally valid responses: the client data
//! is the JSON a relying party expects, the authenticator data carries the
//! right relying party id hash and signature counter, and the attestation
//! object is CBOR with a `none` statement. Keys and signatures are random
//! bytes, so any peer checking real cryptography will reject them.
//!
//! Only available with the `testable` feature or in tests.

use ciborium::{cbor, value::Value};

use crate::{
    credential::Aaguid,
    utils::{crypto, encoding, rand},
    webauthn::{
        AuthenticatedPublicKeyCredential, AuthenticatorAssertionResponse,
        AuthenticatorAttestationResponse, AuthenticatorTransport, ClientDataType,
        CollectedClientData, CreatedPublicKeyCredential, PublicKeyCredential,
        PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
    },
    Bytes,
};

const UP: u8 = 1;
const UV: u8 = 1 << 2;
const AT: u8 = 1 << 6;

/// Build the response an authenticator would return for the given creation
/// options, with a random 16 byte credential id.
pub fn created_credential(
    options: &PublicKeyCredentialCreationOptions,
    origin: &str,
    aaguid: Aaguid,
) -> CreatedPublicKeyCredential {
    created_credential_with_id(options, origin, aaguid, rand::random_vec(16).into())
}

/// [`created_credential`] with a caller chosen credential id.
pub fn created_credential_with_id(
    options: &PublicKeyCredentialCreationOptions,
    origin: &str,
    aaguid: Aaguid,
    credential_id: Bytes,
) -> CreatedPublicKeyCredential {
    let rp_id = options.rp.id.as_deref().unwrap_or(origin);

    // authenticator data with attested credential data: aaguid, id length,
    // id, COSE key
    let mut auth_data = authenticator_data(rp_id, UP | UV | AT, 0);
    auth_data.extend_from_slice(&aaguid.0);
    let id_length = u16::try_from(credential_id.len()).expect("credential id fits in a u16");
    auth_data.extend_from_slice(&id_length.to_be_bytes());
    auth_data.extend_from_slice(&credential_id);
    auth_data.extend_from_slice(&random_cose_key());

    let response = AuthenticatorAttestationResponse {
        client_data_json: client_data(ClientDataType::Create, &options.challenge, origin),
        attestation_object: attestation_object(auth_data).into(),
        transports: Some(vec![AuthenticatorTransport::Internal]),
    };

    PublicKeyCredential::new(credential_id, response)
}

/// Build the response an authenticator would return for the given request
/// options.
///
/// `counter` is the signature counter value after the authenticator has
/// incremented it for this assertion.
pub fn asserted_credential(
    options: &PublicKeyCredentialRequestOptions,
    origin: &str,
    credential_id: Bytes,
    user_handle: Option<Bytes>,
    counter: u32,
) -> AuthenticatedPublicKeyCredential {
    let rp_id = options.rp_id.as_deref().unwrap_or(origin);

    let response = AuthenticatorAssertionResponse {
        client_data_json: client_data(ClientDataType::Get, &options.challenge, origin),
        authenticator_data: authenticator_data(rp_id, UP | UV, counter).into(),
        signature: rand::random_vec(64).into(),
        user_handle,
    };

    PublicKeyCredential::new(credential_id, response)
}

fn client_data(ty: ClientDataType, challenge: &Bytes, origin: &str) -> Bytes {
    let data = CollectedClientData {
        ty,
        challenge: encoding::base64url(challenge),
        origin: origin.into(),
        cross_origin: Some(false),
    };
    // SAFETY: serializing a struct of plain strings cannot fail
    serde_json::to_vec(&data).unwrap().into()
}

fn authenticator_data(rp_id: &str, flags: u8, counter: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(37);
    data.extend_from_slice(&crypto::sha256(rp_id.as_bytes()));
    data.push(flags);
    data.extend_from_slice(&counter.to_be_bytes());
    data
}

fn attestation_object(auth_data: Vec<u8>) -> Vec<u8> {
    // SAFETY: the unwraps cover serializing literal structure into
    // `ciborium::Value` and then into bytes, neither of which can fail here
    let value = cbor!({
        "fmt" => "none",
        "attStmt" => {},
        "authData" => Value::Bytes(auth_data),
    })
    .unwrap();
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&value, &mut bytes).unwrap();
    bytes
}

/// An EC2 P-256 COSE key with random coordinates, enough shape for parsers.
fn random_cose_key() -> Vec<u8> {
    // SAFETY: same as in `attestation_object`
    let value = cbor!({
        1 => 2,   // kty: EC2
        3 => -7,  // alg: ES256
        -1 => 1,  // crv: P-256
        -2 => Value::Bytes(rand::random_vec(32)),
        -3 => Value::Bytes(rand::random_vec(32)),
    })
    .unwrap();
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&value, &mut bytes).unwrap();
    bytes
}
