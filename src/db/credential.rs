use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use twilight_model::id::{marker::UserMarker, Id};
use uuid::Uuid;

/// A user token held on behalf of the identity that owns it.
///
/// `key` is the opaque handle handed back to the caller; the token itself
/// never leaves the server.
#[derive(Clone)]
pub(crate) struct Credential {
    pub(crate) key: String,
    pub(crate) user_id: Id<UserMarker>,
    pub(crate) username: String,
    pub(crate) token: String,
    pub(crate) updated: DateTime<Utc>,
}

impl Credential {
    pub(crate) fn new(user_id: Id<UserMarker>, username: String, token: String) -> Self {
        Self {
            key: Uuid::new_v4().to_string(),
            user_id,
            username,
            token,
            updated: chrono::offset::Utc::now(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &self.key)
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("updated", &self.updated)
            .finish()
    }
}

#[async_trait]
pub(crate) trait CredentialStore: Send + Sync {
    /// Stores `credential`, replacing any credential previously saved for the same user.
    async fn save(&self, credential: &Credential) -> Result<(), sqlx::Error>;

    async fn get(&self, key: &str) -> Result<Option<Credential>, sqlx::Error>;

    /// Returns whether a credential was removed.
    async fn remove(&self, key: &str) -> Result<bool, sqlx::Error>;
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    key: String,
    user_id: String,
    username: String,
    token: String,
    updated: DateTime<Utc>,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = sqlx::Error;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let user_id = row
            .user_id
            .parse::<u64>()
            .ok()
            .and_then(Id::new_checked)
            .ok_or_else(|| {
                sqlx::Error::Decode(format!("invalid user id {:?}", row.user_id).into())
            })?;
        Ok(Self {
            key: row.key,
            user_id,
            username: row.username,
            token: row.token,
            updated: row.updated,
        })
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SqliteCredentialStore {
    pool: sqlx::SqlitePool,
}

impl SqliteCredentialStore {
    pub(crate) fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn save(&self, credential: &Credential) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM credentials WHERE user_id = $1")
            .bind(credential.user_id.to_string())
            .execute(&mut *tx)
            .await?;
        let query = "INSERT OR REPLACE INTO credentials (key, user_id, username, token, updated) VALUES ($1, $2, $3, $4, $5)";
        sqlx::query(query)
            .bind(&credential.key)
            .bind(credential.user_id.to_string())
            .bind(&credential.username)
            .bind(&credential.token)
            .bind(credential.updated)
            .execute(&mut *tx)
            .await?;
        tx.commit().await
    }

    async fn get(&self, key: &str) -> Result<Option<Credential>, sqlx::Error> {
        let query =
            "SELECT key, user_id, username, token, updated FROM credentials WHERE key = $1";
        sqlx::query_as::<_, CredentialRow>(query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .map(Credential::try_from)
            .transpose()
    }

    async fn remove(&self, key: &str) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM credentials WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryCredentialStore {
    credentials: dashmap::DashMap<String, Credential>,
}

#[cfg(test)]
#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(&self, credential: &Credential) -> Result<(), sqlx::Error> {
        self.credentials
            .retain(|_, stored| stored.user_id != credential.user_id);
        self.credentials
            .insert(credential.key.clone(), credential.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Credential>, sqlx::Error> {
        Ok(self.credentials.get(key).map(|entry| entry.value().clone()))
    }

    async fn remove(&self, key: &str) -> Result<bool, sqlx::Error> {
        Ok(self.credentials.remove(key).is_some())
    }
}
