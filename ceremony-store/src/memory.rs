use std::collections::{hash_map::Entry, HashMap};

use ceremony_types::credential::CredentialSource;

use super::{CredentialSourceStore, StoreError};

/// In-memory store of credential sources, keyed by credential id.
///
/// Useful for tests.
pub type MemoryStore = HashMap<Vec<u8>, CredentialSource>;

#[async_trait::async_trait]
impl CredentialSourceStore for MemoryStore {
    async fn store(&mut self, credential: CredentialSource) -> Result<(), StoreError> {
        match self.entry(credential.id.to_vec()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId),
            Entry::Vacant(slot) => {
                slot.insert(credential);
                Ok(())
            }
        }
    }

    async fn load(&self, credential_id: &[u8]) -> Result<Option<CredentialSource>, StoreError> {
        Ok(self.get(credential_id).cloned())
    }

    async fn load_all(&self) -> Result<Vec<CredentialSource>, StoreError> {
        Ok(self.values().cloned().collect())
    }

    async fn delete(&mut self, credential_id: &[u8]) -> Result<(), StoreError> {
        self.remove(credential_id);
        Ok(())
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        self.clear();
        Ok(())
    }

    async fn increase_signature_counter(
        &mut self,
        credential_id: &[u8],
    ) -> Result<(), StoreError> {
        if let Some(credential) = self.get_mut(credential_id) {
            credential.signature_counter = credential.signature_counter.saturating_add(1);
        }
        Ok(())
    }

    async fn get_signature_counter(&self, credential_id: &[u8]) -> Result<u32, StoreError> {
        self.get(credential_id)
            .map(|credential| credential.signature_counter)
            .ok_or(StoreError::NotFound)
    }
}
