//! # Ceremony Store
//!
//! Persistence for [`CredentialSource`] records: the
//! [`CredentialSourceStore`] trait, an in-memory [`MemoryStore`] for tests
//! and a SQLite backed [`SqliteStore`] for applications.
//!
//! Reads take `&self` and writes take `&mut self`, so sharing a store
//! between tasks means putting it behind a lock. The trait is implemented
//! for stores wrapped in [`tokio::sync::Mutex`] and [`tokio::sync::RwLock`],
//! with or without an [`Arc`], which keeps the single writer discipline in
//! the type system instead of in documentation.

mod memory;
mod sqlite;

use std::sync::Arc;

use ceremony_types::credential::CredentialSource;

pub use self::{memory::MemoryStore, sqlite::SqliteStore};

/// Failures arising from a credential source store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A credential with the same id is already stored. The existing record
    /// is left untouched.
    #[error("a credential with this id is already stored")]
    DuplicateId,

    /// No credential with this id is stored.
    #[error("no credential with this id is stored")]
    NotFound,

    /// A stored record could not be decoded back into a
    /// [`CredentialSource`].
    #[error("stored credential is corrupt: {0}")]
    Corrupt(String),

    /// The backing database failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Storage of [`CredentialSource`] records, keyed by credential id.
///
/// Credential ids are opaque bytes chosen by the authenticator and are
/// unique across the whole store, not per relying party.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialSourceStore {
    /// Persist a newly registered credential.
    ///
    /// Fails with [`StoreError::DuplicateId`] when a record with the same id
    /// already exists, leaving the stored record untouched.
    async fn store(&mut self, credential: CredentialSource) -> Result<(), StoreError>;

    /// Fetch the credential with the given id.
    async fn load(&self, credential_id: &[u8]) -> Result<Option<CredentialSource>, StoreError>;

    /// Fetch every stored credential.
    async fn load_all(&self) -> Result<Vec<CredentialSource>, StoreError>;

    /// Remove the credential with the given id. Removing an id that is not
    /// stored is not an error.
    async fn delete(&mut self, credential_id: &[u8]) -> Result<(), StoreError>;

    /// Remove every stored credential.
    async fn delete_all(&mut self) -> Result<(), StoreError>;

    /// Add one to the signature counter of the given credential, atomically
    /// with respect to other calls through the same store. Unknown ids are
    /// ignored.
    async fn increase_signature_counter(&mut self, credential_id: &[u8])
        -> Result<(), StoreError>;

    /// Read the current signature counter of the given credential.
    ///
    /// Fails with [`StoreError::NotFound`] when the id is not stored.
    async fn get_signature_counter(&self, credential_id: &[u8]) -> Result<u32, StoreError>;
}

#[async_trait::async_trait]
impl<S: CredentialSourceStore + Send + Sync> CredentialSourceStore
    for Arc<tokio::sync::Mutex<S>>
{
    async fn store(&mut self, credential: CredentialSource) -> Result<(), StoreError> {
        self.lock().await.store(credential).await
    }

    async fn load(&self, credential_id: &[u8]) -> Result<Option<CredentialSource>, StoreError> {
        self.lock().await.load(credential_id).await
    }

    async fn load_all(&self) -> Result<Vec<CredentialSource>, StoreError> {
        self.lock().await.load_all().await
    }

    async fn delete(&mut self, credential_id: &[u8]) -> Result<(), StoreError> {
        self.lock().await.delete(credential_id).await
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        self.lock().await.delete_all().await
    }

    async fn increase_signature_counter(
        &mut self,
        credential_id: &[u8],
    ) -> Result<(), StoreError> {
        self.lock()
            .await
            .increase_signature_counter(credential_id)
            .await
    }

    async fn get_signature_counter(&self, credential_id: &[u8]) -> Result<u32, StoreError> {
        self.lock().await.get_signature_counter(credential_id).await
    }
}

#[async_trait::async_trait]
impl<S: CredentialSourceStore + Send + Sync> CredentialSourceStore
    for Arc<tokio::sync::RwLock<S>>
{
    async fn store(&mut self, credential: CredentialSource) -> Result<(), StoreError> {
        self.write().await.store(credential).await
    }

    async fn load(&self, credential_id: &[u8]) -> Result<Option<CredentialSource>, StoreError> {
        self.read().await.load(credential_id).await
    }

    async fn load_all(&self) -> Result<Vec<CredentialSource>, StoreError> {
        self.read().await.load_all().await
    }

    async fn delete(&mut self, credential_id: &[u8]) -> Result<(), StoreError> {
        self.write().await.delete(credential_id).await
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        self.write().await.delete_all().await
    }

    async fn increase_signature_counter(
        &mut self,
        credential_id: &[u8],
    ) -> Result<(), StoreError> {
        self.write()
            .await
            .increase_signature_counter(credential_id)
            .await
    }

    async fn get_signature_counter(&self, credential_id: &[u8]) -> Result<u32, StoreError> {
        self.read().await.get_signature_counter(credential_id).await
    }
}

#[async_trait::async_trait]
impl<S: CredentialSourceStore + Send + Sync> CredentialSourceStore for tokio::sync::Mutex<S> {
    async fn store(&mut self, credential: CredentialSource) -> Result<(), StoreError> {
        self.get_mut().store(credential).await
    }

    async fn load(&self, credential_id: &[u8]) -> Result<Option<CredentialSource>, StoreError> {
        self.lock().await.load(credential_id).await
    }

    async fn load_all(&self) -> Result<Vec<CredentialSource>, StoreError> {
        self.lock().await.load_all().await
    }

    async fn delete(&mut self, credential_id: &[u8]) -> Result<(), StoreError> {
        self.get_mut().delete(credential_id).await
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        self.get_mut().delete_all().await
    }

    async fn increase_signature_counter(
        &mut self,
        credential_id: &[u8],
    ) -> Result<(), StoreError> {
        self.get_mut().increase_signature_counter(credential_id).await
    }

    async fn get_signature_counter(&self, credential_id: &[u8]) -> Result<u32, StoreError> {
        self.lock().await.get_signature_counter(credential_id).await
    }
}

#[async_trait::async_trait]
impl<S: CredentialSourceStore + Send + Sync> CredentialSourceStore for tokio::sync::RwLock<S> {
    async fn store(&mut self, credential: CredentialSource) -> Result<(), StoreError> {
        self.get_mut().store(credential).await
    }

    async fn load(&self, credential_id: &[u8]) -> Result<Option<CredentialSource>, StoreError> {
        self.read().await.load(credential_id).await
    }

    async fn load_all(&self) -> Result<Vec<CredentialSource>, StoreError> {
        self.read().await.load_all().await
    }

    async fn delete(&mut self, credential_id: &[u8]) -> Result<(), StoreError> {
        self.get_mut().delete(credential_id).await
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        self.get_mut().delete_all().await
    }

    async fn increase_signature_counter(
        &mut self,
        credential_id: &[u8],
    ) -> Result<(), StoreError> {
        self.get_mut().increase_signature_counter(credential_id).await
    }

    async fn get_signature_counter(&self, credential_id: &[u8]) -> Result<u32, StoreError> {
        self.read().await.get_signature_counter(credential_id).await
    }
}
