use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

use crate::config::ConfigError;

// Participants with hashed access codes. The plain codes are never stored here.
const BUILTIN: &[(&str, &str)] = &[(
    "Felipe",
    "e0bebd22819993425814866b62701e2919ea26f1370499c1037b53b9d49c2c8a",
)];

/// Hex-encoded SHA-256 of `value`.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value);
    format!("{:x}", hasher.finalize())
}

/// 256 random bits from the thread-local CSPRNG, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_digest(value: &str) -> bool {
    value.len() == 64
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Name to code-hash table, fixed for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: HashMap<String, String>,
}

impl CredentialStore {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(name, hash)| (name.to_string(), hash.to_string()))
                .collect(),
        }
    }

    pub fn from_entries<I, N, H>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (N, H)>,
        N: Into<String>,
        H: Into<String>,
    {
        let mut store = Self::default();
        store.extend(entries)?;
        Ok(store)
    }

    /// Built-in table, overlaid with the JSON object in `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut store = Self::builtin();
        let Some(path) = path else {
            return Ok(store);
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CredentialsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let extra: HashMap<String, String> =
            serde_json::from_str(&raw).map_err(|source| ConfigError::CredentialsParse {
                path: path.to_path_buf(),
                source,
            })?;

        store.extend(extra)?;
        tracing::info!(path = %path.display(), total = store.len(), "loaded credentials file");
        Ok(store)
    }

    fn extend<I, N, H>(&mut self, entries: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (N, H)>,
        N: Into<String>,
        H: Into<String>,
    {
        for (name, hash) in entries {
            let name = name.into();
            let hash = hash.into();
            if !is_digest(&hash) {
                return Err(ConfigError::InvalidDigest { name });
            }
            self.entries.insert(name, hash);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True only when `name` exists (exact, case-sensitive) and `code` hashes to its digest.
    pub fn verify(&self, name: &str, code: &str) -> bool {
        match self.entries.get(name) {
            Some(stored) => *stored == sha256_hex(code),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("palpite-secreto")
    const SECRET_HASH: &str = "bb6b45001db7b9780a74b72674916fa6bb4cd073763f6415b73c2199c1e0f1bc";

    #[test]
    fn hashes_to_lowercase_hex() {
        assert_eq!(sha256_hex("palpite-secreto"), SECRET_HASH);
        assert_eq!(
            sha256_hex("Felipe"),
            "ea14b35aa297b61e95e0692c4ba04b71d38ed6dcfb49de4e37fb4ae39ffa2bbf"
        );
    }

    #[test]
    fn builtin_table_holds_felipe() {
        let store = CredentialStore::builtin();
        assert_eq!(store.len(), 1);
        assert!(!store.verify("Felipe", "definitely-not-the-code"));
    }

    #[test]
    fn verifies_exact_name_and_code() {
        let store = CredentialStore::from_entries([("Ana", SECRET_HASH)]).unwrap();

        assert!(store.verify("Ana", "palpite-secreto"));
        assert!(!store.verify("ana", "palpite-secreto"));
        assert!(!store.verify("Ana ", "palpite-secreto"));
        assert!(!store.verify("Ana", "palpite-secreto "));
        assert!(!store.verify("Bruno", "palpite-secreto"));
    }

    #[test]
    fn rejects_malformed_digest() {
        let err = CredentialStore::from_entries([("Ana", "ABC")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDigest { name } if name == "Ana"));

        let upper = SECRET_HASH.to_uppercase();
        assert!(CredentialStore::from_entries([("Ana", upper)]).is_err());
    }

    #[test]
    fn load_overlays_file_on_builtin() {
        let path = std::env::temp_dir().join(format!("bolao-creds-{}.json", std::process::id()));
        std::fs::write(&path, format!(r#"{{"Ana": "{SECRET_HASH}"}}"#)).unwrap();

        let store = CredentialStore::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(store.len(), 2);
        assert!(store.verify("Ana", "palpite-secreto"));
    }

    #[test]
    fn load_without_file_is_builtin() {
        assert_eq!(CredentialStore::load(None).unwrap().len(), 1);
    }

    #[test]
    fn tokens_are_64_hex_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
