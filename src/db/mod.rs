mod credential;
pub(crate) use credential::{Credential, CredentialStore, SqliteCredentialStore};

#[cfg(test)]
pub(crate) use credential::MemoryCredentialStore;
