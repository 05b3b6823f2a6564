use ceremony_types::{
    credential::{Aaguid, CredentialSource},
    encoding,
    webauthn::PublicKeyCredentialType,
    Bytes,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::{CredentialSourceStore, StoreError};

/// A [`CredentialSourceStore`] backed by a SQLite database.
///
/// Binary columns are stored in base64url form and the AAGUID as its UUID
/// string, which keeps the table directly readable with the `sqlite3` shell.
///
/// ```no_run
/// # async fn open() -> Result<(), ceremony_store::StoreError> {
/// use ceremony_store::SqliteStore;
///
/// let store = SqliteStore::connect("sqlite://credentials.db?mode=rwc").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

const CREATE_TABLE: &str = "\
    CREATE TABLE IF NOT EXISTS credential_sources (\
        id TEXT PRIMARY KEY NOT NULL,\
        type TEXT NOT NULL,\
        rp_id TEXT NOT NULL,\
        user_handle TEXT,\
        aaguid TEXT NOT NULL,\
        signature_counter INTEGER NOT NULL\
    )";

impl SqliteStore {
    /// Open the database at the given SQLite URL and create the credential
    /// table if it does not exist yet.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        Self::from_pool(SqlitePool::connect(url).await?).await
    }

    /// Use an already configured connection pool, creating the credential
    /// table if it does not exist yet.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        log::debug!("credential source table ready");
        Ok(Self { pool })
    }

    /// A store backed by an in-memory database, dropped when the store goes
    /// away.
    ///
    /// Useful for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        // a single connection, since every connection to `:memory:` gets its
        // own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }
}

#[derive(sqlx::FromRow)]
struct CredentialSourceRow {
    id: String,
    #[sqlx(rename = "type")]
    ty: String,
    rp_id: String,
    user_handle: Option<String>,
    aaguid: String,
    signature_counter: i64,
}

impl TryFrom<CredentialSourceRow> for CredentialSource {
    type Error = StoreError;

    fn try_from(row: CredentialSourceRow) -> Result<Self, Self::Error> {
        let id = decode_id(&row.id)?;
        let user_handle = row.user_handle.as_deref().map(decode_id).transpose()?;
        let aaguid: Aaguid = row
            .aaguid
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("bad aaguid {:?}", row.aaguid)))?;
        let signature_counter = u32::try_from(row.signature_counter).map_err(|_| {
            StoreError::Corrupt(format!(
                "signature counter {} out of range",
                row.signature_counter
            ))
        })?;

        Ok(CredentialSource {
            ty: match row.ty.as_str() {
                "public-key" => PublicKeyCredentialType::PublicKey,
                _ => PublicKeyCredentialType::Unknown,
            },
            id,
            rp_id: row.rp_id,
            user_handle,
            aaguid,
            signature_counter,
        })
    }
}

fn decode_id(encoded: &str) -> Result<Bytes, StoreError> {
    Bytes::try_from(encoded)
        .map_err(|_| StoreError::Corrupt(format!("bad base64url column {encoded:?}")))
}

fn type_tag(ty: PublicKeyCredentialType) -> &'static str {
    match ty {
        PublicKeyCredentialType::PublicKey => "public-key",
        PublicKeyCredentialType::Unknown => "unknown",
    }
}

#[async_trait::async_trait]
impl CredentialSourceStore for SqliteStore {
    async fn store(&mut self, credential: CredentialSource) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO credential_sources \
             (id, type, rp_id, user_handle, aaguid, signature_counter) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(encoding::base64url(&credential.id))
        .bind(type_tag(credential.ty))
        .bind(&credential.rp_id)
        .bind(
            credential
                .user_handle
                .as_ref()
                .map(|handle| encoding::base64url(handle)),
        )
        .bind(credential.aaguid.to_string())
        .bind(i64::from(credential.signature_counter))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(StoreError::DuplicateId)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn load(&self, credential_id: &[u8]) -> Result<Option<CredentialSource>, StoreError> {
        let row: Option<CredentialSourceRow> = sqlx::query_as(
            "SELECT id, type, rp_id, user_handle, aaguid, signature_counter \
             FROM credential_sources WHERE id = ?",
        )
        .bind(encoding::base64url(credential_id))
        .fetch_optional(&self.pool)
        .await?;

        row.map(CredentialSource::try_from).transpose()
    }

    async fn load_all(&self) -> Result<Vec<CredentialSource>, StoreError> {
        let rows: Vec<CredentialSourceRow> = sqlx::query_as(
            "SELECT id, type, rp_id, user_handle, aaguid, signature_counter \
             FROM credential_sources",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CredentialSource::try_from).collect()
    }

    async fn delete(&mut self, credential_id: &[u8]) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM credential_sources WHERE id = ?")
            .bind(encoding::base64url(credential_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM credential_sources")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increase_signature_counter(
        &mut self,
        credential_id: &[u8],
    ) -> Result<(), StoreError> {
        // the increment happens inside the database, so concurrent callers
        // cannot lose updates
        let result = sqlx::query(
            "UPDATE credential_sources \
             SET signature_counter = signature_counter + 1 WHERE id = ?",
        )
        .bind(encoding::base64url(credential_id))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            log::warn!("signature counter increase for an id that is not stored");
        }
        Ok(())
    }

    async fn get_signature_counter(&self, credential_id: &[u8]) -> Result<u32, StoreError> {
        let counter: Option<i64> =
            sqlx::query_scalar("SELECT signature_counter FROM credential_sources WHERE id = ?")
                .bind(encoding::base64url(credential_id))
                .fetch_optional(&self.pool)
                .await?;

        let counter = counter.ok_or(StoreError::NotFound)?;
        u32::try_from(counter)
            .map_err(|_| StoreError::Corrupt(format!("signature counter {counter} out of range")))
    }
}
