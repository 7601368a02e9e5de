use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::crypto::{CipherError, SecretCipher};
use crate::database::{DatabaseError, ProjectStore};
use crate::types::UserId;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),
    #[error("User not found: {0}")]
    UserNotFound(UserId),
}

/// Cloud-storage credentials with the secret decrypted
#[derive(Debug, Clone, Serialize)]
pub struct CloudCredentials {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    /// `None` when no secret is stored. `Some("")` is ambiguous: an empty secret or an
    /// envelope that no longer parses.
    pub api_secret: Option<String>,
}

/// Reads and writes the encrypted cloud credentials on a user row
pub struct CredentialService {
    store: Arc<dyn ProjectStore>,
    cipher: SecretCipher,
}

impl CredentialService {
    pub fn new(store: Arc<dyn ProjectStore>, cipher: SecretCipher) -> Self {
        Self { store, cipher }
    }

    /// Encrypt the secret and store all three fields, creating the user if needed
    pub async fn set(
        &self,
        user_id: UserId,
        cloud_name: &str,
        api_key: &str,
        api_secret: &str,
    ) -> Result<(), CredentialError> {
        let envelope = self.cipher.encrypt(api_secret);
        self.store
            .set_cloud_credentials(user_id, cloud_name, api_key, &envelope)
            .await?;
        tracing::info!("Stored cloud credentials for user {}", user_id);
        Ok(())
    }

    pub async fn get(&self, user_id: UserId) -> Result<CloudCredentials, CredentialError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(CredentialError::UserNotFound(user_id))?;

        let api_secret = match user.cloud_api_secret_encrypted.as_deref() {
            Some(envelope) => Some(self.cipher.decrypt(envelope)?),
            None => None,
        };

        Ok(CloudCredentials {
            cloud_name: user.cloud_name,
            api_key: user.cloud_api_key,
            api_secret,
        })
    }
}
