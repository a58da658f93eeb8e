//! The plaintext secrets record and its encryption helpers.
//!
//! `SecretsPayload` only ever exists in memory.  `seal_payload` serializes it
//! to JSON, encrypts the bytes and zeroizes the plaintext buffer;
//! `open_payload` reverses that.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{decrypt, encrypt, DerivedKey, SealedBox};
use crate::errors::{Result, VaultError};

/// Current payload format version.
pub const PAYLOAD_VERSION: u32 = 1;

/// Object-storage credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// OAuth client credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Every credential group the vault protects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsPayload {
    pub version: u32,
    #[serde(default)]
    pub storage: StorageCredentials,
    #[serde(default)]
    pub oauth: OAuthCredentials,
    /// Deployment tokens keyed by target name.
    #[serde(default)]
    pub deploy_tokens: BTreeMap<String, String>,
}

impl Default for SecretsPayload {
    fn default() -> Self {
        Self {
            version: PAYLOAD_VERSION,
            storage: StorageCredentials::default(),
            oauth: OAuthCredentials::default(),
            deploy_tokens: BTreeMap::new(),
        }
    }
}

/// Fixed field names, in display order.
const FIXED_FIELDS: [&str; 7] = [
    "storage.access_key_id",
    "storage.secret_access_key",
    "storage.bucket",
    "storage.region",
    "storage.endpoint",
    "oauth.client_id",
    "oauth.client_secret",
];

/// Prefix addressing one deployment token: `deploy.<name>`.
const DEPLOY_PREFIX: &str = "deploy.";

impl SecretsPayload {
    /// Set a field by its dotted name.  An empty `value` clears the field
    /// (or removes the deploy token).
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let new_value = (!value.is_empty()).then(|| value.to_string());

        if let Some(name) = field.strip_prefix(DEPLOY_PREFIX) {
            if name.is_empty() {
                return Err(VaultError::UnknownField(field.to_string()));
            }
            match new_value {
                Some(token) => {
                    self.deploy_tokens.insert(name.to_string(), token);
                }
                None => {
                    self.deploy_tokens.remove(name);
                }
            }
            return Ok(());
        }

        *self.slot_mut(field)? = new_value;
        Ok(())
    }

    /// Read a field by its dotted name.
    pub fn get(&self, field: &str) -> Result<Option<&str>> {
        if let Some(name) = field.strip_prefix(DEPLOY_PREFIX) {
            return Ok(self.deploy_tokens.get(name).map(String::as_str));
        }
        let value = match field {
            "storage.access_key_id" => &self.storage.access_key_id,
            "storage.secret_access_key" => &self.storage.secret_access_key,
            "storage.bucket" => &self.storage.bucket,
            "storage.region" => &self.storage.region,
            "storage.endpoint" => &self.storage.endpoint,
            "oauth.client_id" => &self.oauth.client_id,
            "oauth.client_secret" => &self.oauth.client_secret,
            _ => return Err(VaultError::UnknownField(field.to_string())),
        };
        Ok(value.as_deref())
    }

    /// All populated fields as `(name, value)` pairs, fixed fields first.
    pub fn entries(&self) -> Vec<(String, &str)> {
        let mut out: Vec<(String, &str)> = FIXED_FIELDS
            .iter()
            .filter_map(|name| {
                self.get(name)
                    .ok()
                    .flatten()
                    .map(|v| ((*name).to_string(), v))
            })
            .collect();
        out.extend(
            self.deploy_tokens
                .iter()
                .map(|(name, token)| (format!("{DEPLOY_PREFIX}{name}"), token.as_str())),
        );
        out
    }

    fn slot_mut(&mut self, field: &str) -> Result<&mut Option<String>> {
        Ok(match field {
            "storage.access_key_id" => &mut self.storage.access_key_id,
            "storage.secret_access_key" => &mut self.storage.secret_access_key,
            "storage.bucket" => &mut self.storage.bucket,
            "storage.region" => &mut self.storage.region,
            "storage.endpoint" => &mut self.storage.endpoint,
            "oauth.client_id" => &mut self.oauth.client_id,
            "oauth.client_secret" => &mut self.oauth.client_secret,
            _ => return Err(VaultError::UnknownField(field.to_string())),
        })
    }
}

/// Serialize and encrypt a payload under `key`.
pub fn seal_payload(payload: &SecretsPayload, key: &DerivedKey) -> Result<SealedBox> {
    let plaintext = Zeroizing::new(
        serde_json::to_vec(payload)
            .map_err(|e| VaultError::SerializationError(format!("payload: {e}")))?,
    );
    encrypt(key.as_bytes(), &plaintext)
}

/// Decrypt and deserialize a payload.
///
/// A payload that decrypts but does not parse is reported as
/// `DecryptionFailed` as well, so callers see one failure mode.
pub fn open_payload(sealed: &SealedBox, key: &DerivedKey) -> Result<SecretsPayload> {
    let plaintext = Zeroizing::new(decrypt(key.as_bytes(), sealed)?);
    serde_json::from_slice(&plaintext).map_err(|_| VaultError::DecryptionFailed)
}
