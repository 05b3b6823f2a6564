//! # Ceremony-RS by 1Password
//!
//! [![github]](https://github.com/1Password/ceremony-rs/tree/main/ceremony/)
//! [![version]](https://crates.io/crates/ceremony/)
//! [![documentation]](https://docs.rs/ceremony/)
//!
//! The `ceremony-rs` library is a collection of Rust libraries for running the two
//! [WebAuthn Level 3][webauthn-3] ceremonies, registration and authentication, from a device that
//! holds its own credentials, against a relying party speaking the [FIDO2 server API][fido-server].
//! It is comprised of four sub-libraries:
//!
//! - `ceremony-client` - a library, usable as [`client`], which orchestrates the ceremonies over
//!   an injected store, authenticator and relying party.
//! - `ceremony-rp` - a library, usable as [`rp`], which implements the relying party side of the
//!   conversation over HTTP.
//! - `ceremony-store` - a library, usable as [`store`], which persists the credentials this
//!   device has minted.
//! - `ceremony-types` - type definitions, usable as [`types`], shared by the other libraries.
//!
//! In understanding how to use this library, developers should read the
//! [WebAuthn Level 3][webauthn-3] standard. Much of the type naming in these libraries refers
//! directly to the terms used in the standard and being familiar with its terminology will
//! greatly aid your understanding of how to use these libraries.
//!
//! ## Basic Concepts
//!
//! Both ceremonies are two round trips with the relying party: fetch options carrying a
//! challenge, answer the challenge with an authenticator, and submit the answer for
//! verification. Registration mints a new credential and records it; authentication proves
//! possession of a recorded one and advances its signature counter.
//!
//! You can think of these libraries as a chain that interacts with a relying party in the
//! following way:
//!
//! RelyingParty <-> [`Client`](client::Client) <-> [`Authenticator`](client::Authenticator) +
//! [`CredentialSourceStore`](store::CredentialSourceStore)
//!
//! The [`Client`](client::Client) type drives a whole ceremony per call:
//!
//! - [`register()`](client::Client::register()) - run a registration ceremony and store the new
//!   credential.
//! - [`authenticate()`](client::Client::authenticate()) - run an authentication ceremony and
//!   advance the stored signature counter.
//! - [`credentials()`](client::Client::credentials()),
//!   [`delete_credential()`](client::Client::delete_credential()) and
//!   [`delete_all_credentials()`](client::Client::delete_all_credentials()) - manage the records
//!   the store holds.
//! - [`updates()`](client::Client::updates()) - subscribe to coarse
//!   [`CeremonyUpdate`](client::CeremonyUpdate) progress values, for whatever renders status.
//!
//! The [`Client`](client::Client) does not talk HTTP or prompt the user itself. The
//! [`RelyingParty`](rp::RelyingParty) trait covers the server conversation, implemented over
//! HTTP by [`HttpRelyingParty`](rp::HttpRelyingParty):
//!
//! - [`get_registration_challenge()`](rp::RelyingParty::get_registration_challenge()) and
//!   [`verify_registration()`](rp::RelyingParty::verify_registration()) - the `attestation/options`
//!   and `attestation/result` endpoints.
//! - [`get_authentication_challenge()`](rp::RelyingParty::get_authentication_challenge()) and
//!   [`verify_authentication()`](rp::RelyingParty::verify_authentication()) - the
//!   `assertion/options` and `assertion/result` endpoints.
//!
//! The [`Authenticator`](client::Authenticator) trait covers minting credentials and signing
//! assertions behind the platform's user verification, committed to one
//! [`AuthenticatorKind`](client::AuthenticatorKind) at construction. Accepted credentials are
//! recorded through the [`CredentialSourceStore`](store::CredentialSourceStore) trait:
//!
//! - [`store()`](store::CredentialSourceStore::store()) - record a newly minted credential,
//!   refusing duplicate ids.
//! - [`load_all()`](store::CredentialSourceStore::load_all()) - list every stored credential.
//! - [`increase_signature_counter()`](store::CredentialSourceStore::increase_signature_counter()) -
//!   advance a counter after the relying party accepts an assertion.
//!
//! The [`store`] library provides an in-memory [`MemoryStore`](store::MemoryStore) and a SQLite
//! backed [`SqliteStore`](store::SqliteStore), but users of the library can provide their own.
//!
//! A runnable demonstration binary is provided in `ceremony/examples/usage.rs`.
//!
//! [github]: https://img.shields.io/badge/GitHub-1Password%2Fceremony--rs%2Fceremony-informational?logo=github&style=flat
//! [version]: https://img.shields.io/crates/v/ceremony?logo=rust&style=flat
//! [documentation]: https://img.shields.io/docsrs/ceremony/latest?logo=docs.rs&style=flat
//! [webauthn-3]: https://www.w3.org/TR/webauthn-3/
//! [fido-server]: https://fidoalliance.org/specs/fido-v2.0-rd-20180702/fido-server-v2.0-rd-20180702.html
//!
//! ### Example: Running both ceremonies with a `Client`
//!
//! The highest-level type in these libraries is the `ceremony-client::Client`. This is the type
//! you will primarily use to run WebAuthn ceremonies from your application.
//!
//! The following example demonstrates how to create a `Client` and run a registration followed
//! by an authentication. A real application would construct an
//! [`HttpRelyingParty`](rp::HttpRelyingParty) pointed at its server and an
//! [`Authenticator`](client::Authenticator) wrapping the platform's verification prompt; here
//! mocks stand in for both so the example runs offline.
//! ```
//! use ceremony::{
//!     client::{AuthenticatorKind, Client, MockAuthenticator},
//!     rp::{AuthenticationChallenge, MockRelyingParty, RegistrationChallenge, ServerOutcome},
//!     store::MemoryStore,
//!     types::{
//!         rand::random_vec,
//!         webauthn::{
//!             default_algorithms, AuthenticationOptions, PublicKeyCredentialCreationOptions,
//!             PublicKeyCredentialRequestOptions, PublicKeyCredentialRpEntity,
//!             PublicKeyCredentialUserEntity, RegistrationOptions, UserVerificationRequirement,
//!         },
//!         Aaguid,
//!     },
//! };
//!
//! # tokio_test::block_on(async {
//! // The relying party answers the way a FIDO2 server would.
//! let mut relying_party = MockRelyingParty::new();
//! relying_party
//!     .expect_get_registration_challenge()
//!     .returning(|options| {
//!         Ok(RegistrationChallenge {
//!             options: PublicKeyCredentialCreationOptions {
//!                 rp: PublicKeyCredentialRpEntity {
//!                     id: Some("future.1password.com".into()),
//!                     name: "Future".into(),
//!                     icon: None,
//!                 },
//!                 user: PublicKeyCredentialUserEntity {
//!                     id: random_vec(32).into(),
//!                     name: options.username.clone(),
//!                     display_name: options.display_name.clone(),
//!                     icon: None,
//!                 },
//!                 challenge: random_vec(32).into(),
//!                 pub_key_cred_params: default_algorithms(),
//!                 timeout: None,
//!                 exclude_credentials: None,
//!                 authenticator_selection: options.authenticator_selection.clone(),
//!                 attestation: options.attestation,
//!                 extensions: None,
//!             },
//!             session_id: None,
//!         })
//!     });
//! relying_party
//!     .expect_verify_registration()
//!     .returning(|_| Ok(ServerOutcome::default()));
//! relying_party
//!     .expect_get_authentication_challenge()
//!     .returning(|_| {
//!         Ok(AuthenticationChallenge {
//!             options: PublicKeyCredentialRequestOptions {
//!                 challenge: random_vec(32).into(),
//!                 timeout: None,
//!                 rp_id: Some("future.1password.com".into()),
//!                 allow_credentials: None,
//!                 user_verification: UserVerificationRequirement::default(),
//!                 extensions: None,
//!             },
//!             session_id: None,
//!         })
//!     });
//! relying_party
//!     .expect_verify_authentication()
//!     .returning(|_| Ok(ServerOutcome::default()));
//!
//! // The authenticator would normally wrap the platform's biometric or
//! // device credential prompt.
//! let authenticator =
//!     MockAuthenticator::approving(AuthenticatorKind::Biometric, Aaguid::new_empty());
//!
//! let mut client = Client::new(MemoryStore::new(), authenticator, relying_party);
//! let updates = client.updates();
//!
//! let source = client
//!     .register(RegistrationOptions::new(
//!         "jpasskey@example.org",
//!         "Johnny Passkey",
//!     ))
//!     .await
//!     .unwrap();
//! assert_eq!(source.rp_id, "future.1password.com");
//! assert_eq!(source.signature_counter, 0);
//!
//! client
//!     .authenticate(AuthenticationOptions::new("jpasskey@example.org"))
//!     .await
//!     .unwrap();
//! println!("{}", *updates.borrow());
//! # })
//! ```
//!
//! ### Example: Working with the credential store directly
//!
//! The following code provides a basic example of how to use a store by itself to record a
//! credential and move its signature counter, the way the client does after a verified
//! assertion.
//!
//! ```
//! use ceremony::{
//!     store::{CredentialSourceStore, SqliteStore},
//!     types::{rand::random_vec, Aaguid, CredentialSource},
//! };
//!
//! # tokio_test::block_on(async {
//! let mut store = SqliteStore::in_memory().await.unwrap();
//!
//! let credential = CredentialSource::new(
//!     random_vec(16).into(),
//!     "future.1password.com",
//!     None,
//!     Aaguid::new_empty(),
//! );
//! store.store(credential.clone()).await.unwrap();
//!
//! // the relying party accepted an assertion, move the counter
//! store
//!     .increase_signature_counter(&credential.id)
//!     .await
//!     .unwrap();
//! assert_eq!(
//!     store.get_signature_counter(&credential.id).await.unwrap(),
//!     1
//! );
//! # })
//! ```

pub use ceremony_client as client;
pub use ceremony_rp as rp;
pub use ceremony_store as store;
pub use ceremony_types as types;
