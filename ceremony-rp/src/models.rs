use ceremony_types::webauthn::{
    PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};

use super::RpError;

/// A relying party's answer to `attestation/options`: the creation options
/// together with the session the challenge is bound to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationChallenge {
    /// The creation options. On the wire these sit flattened beside the
    /// reply envelope.
    #[serde(flatten)]
    pub options: PublicKeyCredentialCreationOptions,

    /// Session identifier binding this challenge to one verification call,
    /// for servers that do not use cookies.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// A relying party's answer to `assertion/options`: the request options
/// together with the session the challenge is bound to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationChallenge {
    /// The request options. On the wire these sit flattened beside the
    /// reply envelope.
    #[serde(flatten)]
    pub options: PublicKeyCredentialRequestOptions,

    /// Session identifier binding this challenge to one verification call,
    /// for servers that do not use cookies.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// A relying party's verdict from a `*/result` endpoint, once the reply
/// envelope has been checked.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerOutcome {
    /// The credential id the verdict applies to, when the server echoes it.
    #[serde(default)]
    pub credential_id: Option<String>,

    /// The session the verification was bound to.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Decode a 2xx reply body, treating a `status` other than `"ok"` or an
/// undecodable payload as a rejection that keeps the body verbatim.
pub(crate) fn decode_reply<T>(status: StatusCode, body: String) -> Result<T, RpError>
where
    T: DeserializeOwned,
{
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) else {
        return Err(RpError::Rejected { status, body });
    };

    // servers report verification failures in the envelope, not the HTTP
    // status, so a 200 can still be a rejection
    let failed = value
        .get("status")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|reply_status| reply_status != "ok");
    if failed {
        return Err(RpError::Rejected { status, body });
    }

    serde_json::from_value(value).map_err(|_| RpError::Rejected { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_challenges_sit_beside_the_envelope() {
        let body = r#"{
            "status": "ok",
            "errorMessage": "",
            "sessionId": "8c9cf374",
            "rp": { "id": "example.com", "name": "Example" },
            "user": { "id": "Z2lsZG9uZw", "name": "gildong", "displayName": "Gildong Hong" },
            "challenge": "dGVzdC1jaGFsbGVuZ2U",
            "pubKeyCredParams": [ { "type": "public-key", "alg": -7 } ],
            "timeout": "1800000",
            "excludeCredentials": [],
            "attestation": "none"
        }"#;

        let challenge: RegistrationChallenge =
            decode_reply(StatusCode::OK, body.into()).unwrap();
        assert_eq!(challenge.session_id.as_deref(), Some("8c9cf374"));
        assert_eq!(challenge.options.rp.id.as_deref(), Some("example.com"));
        assert_eq!(challenge.options.user.display_name, "Gildong Hong");
        assert_eq!(challenge.options.timeout, Some(1_800_000));
        assert_eq!(*challenge.options.challenge, b"test-challenge".to_vec());
    }

    #[test]
    fn authentication_challenges_sit_beside_the_envelope() {
        let body = r#"{
            "status": "ok",
            "errorMessage": "",
            "challenge": "YXNzZXJ0LW1l",
            "rpId": "example.com",
            "allowCredentials": [ { "type": "public-key", "id": "AQID" } ],
            "userVerification": "required"
        }"#;

        let challenge: AuthenticationChallenge =
            decode_reply(StatusCode::OK, body.into()).unwrap();
        assert_eq!(challenge.session_id, None);
        assert_eq!(challenge.options.rp_id.as_deref(), Some("example.com"));
        assert_eq!(
            challenge.options.allow_credentials.as_ref().map(Vec::len),
            Some(1)
        );
        assert_eq!(*challenge.options.challenge, b"assert-me".to_vec());
    }

    #[test]
    fn failed_envelopes_are_rejections_even_on_http_200() {
        let body = r#"{"status": "failed", "errorMessage": "Can not validate response signature!"}"#;

        let err = decode_reply::<ServerOutcome>(StatusCode::OK, body.into()).unwrap_err();
        match err {
            RpError::Rejected { status, body } => {
                assert_eq!(status, StatusCode::OK);
                assert!(body.contains("Can not validate response signature!"));
            }
            other => panic!("expected a rejection, got: {other}"),
        }
    }

    #[test]
    fn ok_outcomes_keep_the_server_fields() {
        let body = r#"{"status": "ok", "errorMessage": "", "credentialId": "AQIDBA", "sessionId": "s-1"}"#;

        let outcome: ServerOutcome = decode_reply(StatusCode::OK, body.into()).unwrap();
        assert_eq!(outcome.credential_id.as_deref(), Some("AQIDBA"));
        assert_eq!(outcome.session_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn undecodable_bodies_are_rejections_that_keep_the_body() {
        let err =
            decode_reply::<ServerOutcome>(StatusCode::OK, "<html>proxy</html>".into()).unwrap_err();
        match err {
            RpError::Rejected { body, .. } => assert_eq!(body, "<html>proxy</html>"),
            other => panic!("expected a rejection, got: {other}"),
        }
    }
}
