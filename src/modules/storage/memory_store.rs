//! In-memory storage backend
//!
//! Keeps objects in a process-local map. Used for local development
//! (`STORAGE_BACKEND=memory`) and as the backend under test. Signed URLs use
//! an HMAC-SHA256 signature over bucket, key and expiry so their validity and
//! expiry can be checked without a network.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::error::AppError;
use crate::modules::storage::object_store::{ListPage, ObjectStore, SignedUrl};

type HmacSha256 = Hmac<Sha256>;

pub struct InMemoryObjectStore {
    bucket: String,
    bucket_exists: bool,
    signing_key: Vec<u8>,
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new(bucket: impl Into<String>, signing_key: impl Into<Vec<u8>>) -> Self {
        Self {
            bucket: bucket.into(),
            bucket_exists: true,
            signing_key: signing_key.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// A store whose bucket was never created: listings are empty and
    /// writes fail.
    #[cfg(test)]
    pub fn without_bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket_exists: false,
            ..Self::new(bucket, b"unused".to_vec())
        }
    }

    fn ensure_bucket(&self) -> Result<(), AppError> {
        if self.bucket_exists {
            Ok(())
        } else {
            Err(AppError::Storage(format!(
                "Bucket '{}' does not exist",
                self.bucket
            )))
        }
    }

    fn signature(&self, key: &str, expires: i64) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| AppError::Signing(format!("HMAC key error: {}", e)))?;
        mac.update(format!("{}\n{}\n{}", self.bucket, key, expires).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Dereference a signed URL as the backend would at instant `now`
    #[cfg(test)]
    pub async fn fetch_signed(
        &self,
        signed_url: &str,
        now: chrono::DateTime<Utc>,
    ) -> Result<Vec<u8>, AppError> {
        let url = url::Url::parse(signed_url)
            .map_err(|e| AppError::InvalidInput(format!("Invalid signed URL: {}", e)))?;

        if url.host_str() != Some(self.bucket.as_str()) {
            return Err(AppError::NotFound("Bucket mismatch".to_string()));
        }

        let key = urlencoding::decode(url.path().trim_start_matches('/'))
            .map_err(|e| AppError::InvalidInput(format!("Invalid object key: {}", e)))?
            .into_owned();

        let mut expires = None;
        let mut signature = None;
        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "expires" => expires = value.parse::<i64>().ok(),
                "signature" => signature = Some(value.into_owned()),
                _ => {}
            }
        }

        let (expires, signature) = expires
            .zip(signature)
            .ok_or_else(|| AppError::Signing("Missing signature parameters".to_string()))?;

        if now.timestamp() > expires {
            return Err(AppError::Signing("Signed URL has expired".to_string()));
        }

        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| AppError::Signing(format!("HMAC key error: {}", e)))?;
        mac.update(format!("{}\n{}\n{}", self.bucket, key, expires).as_bytes());
        let provided = hex::decode(&signature)
            .map_err(|_| AppError::Signing("Malformed signature".to_string()))?;
        if mac.verify_slice(&provided).is_err() {
            return Err(AppError::Signing("Signature does not match".to_string()));
        }

        self.get(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Object '{}' not found", key)))
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn bucket_name(&self) -> String {
        self.bucket.clone()
    }

    async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<(), AppError> {
        self.ensure_bucket()?;
        self.objects
            .write()
            .await
            .insert(key.to_string(), data.to_vec());
        debug!("Stored object '{}' in memory bucket '{}'", key, self.bucket);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn list_page(
        &self,
        prefix: &str,
        page_token: Option<String>,
        max_keys: usize,
    ) -> Result<ListPage, AppError> {
        if !self.bucket_exists {
            return Ok(ListPage::default());
        }

        // The continuation token is the last key of the previous page
        let lower = match page_token {
            Some(token) => Bound::Excluded(token),
            None => Bound::Unbounded,
        };

        let objects = self.objects.read().await;
        let mut matching = objects
            .range::<String, _>((lower, Bound::Unbounded))
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(prefix));

        let keys: Vec<String> = matching.by_ref().take(max_keys).cloned().collect();
        let next_token = if matching.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ListPage { keys, next_token })
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<SignedUrl, AppError> {
        let expires_at = Utc::now() + Duration::seconds(i64::from(expiry_secs));
        let expires = expires_at.timestamp();
        let signature = self.signature(key, expires)?;

        Ok(SignedUrl {
            url: format!(
                "memory://{}/{}?expires={}&signature={}",
                self.bucket,
                urlencoding::encode(key),
                expires,
                signature
            ),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryObjectStore {
        InMemoryObjectStore::new("pdf-bucket", b"test-signing-key".to_vec())
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = store();
        store.put("a.pdf", b"%PDF", "application/pdf").await.unwrap();

        assert!(store.exists("a.pdf").await.unwrap());
        assert_eq!(store.get("a.pdf").await.unwrap(), Some(b"%PDF".to_vec()));

        store.delete("a.pdf").await.unwrap();
        assert!(!store.exists("a.pdf").await.unwrap());
        assert_eq!(store.get("a.pdf").await.unwrap(), None);

        // Removing a missing key is fine
        store.delete("a.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_page_walks_with_tokens() {
        let store = store();
        for name in ["a.pdf", "b.pdf", "c.pdf", "d.txt", "e.pdf"] {
            store.put(name, b"x", "application/pdf").await.unwrap();
        }

        let first = store.list_page("", None, 2).await.unwrap();
        assert_eq!(first.keys, vec!["a.pdf", "b.pdf"]);
        assert_eq!(first.next_token.as_deref(), Some("b.pdf"));

        let second = store.list_page("", first.next_token, 2).await.unwrap();
        assert_eq!(second.keys, vec!["c.pdf", "d.txt"]);

        let third = store.list_page("", second.next_token, 2).await.unwrap();
        assert_eq!(third.keys, vec!["e.pdf"]);
        assert_eq!(third.next_token, None);
    }

    #[tokio::test]
    async fn test_list_page_applies_prefix() {
        let store = store();
        for name in ["invoices/1.pdf", "invoices/2.pdf", "reports/1.pdf"] {
            store.put(name, b"x", "application/pdf").await.unwrap();
        }

        let page = store.list_page("invoices/", None, 10).await.unwrap();
        assert_eq!(page.keys, vec!["invoices/1.pdf", "invoices/2.pdf"]);
        assert_eq!(page.next_token, None);
    }

    #[tokio::test]
    async fn test_missing_bucket() {
        let store = InMemoryObjectStore::without_bucket("ghost");

        let page = store.list_page("", None, 10).await.unwrap();
        assert!(page.keys.is_empty());
        assert!(page.next_token.is_none());

        let err = store.put("a.pdf", b"x", "application/pdf").await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[tokio::test]
    async fn test_signed_url_valid_until_expiry() {
        let store = store();
        store.put("dir/a b.pdf", b"%PDF-1.7", "application/pdf").await.unwrap();

        let signed = store.presign_get("dir/a b.pdf", 3600).await.unwrap();
        assert!(signed.url.starts_with("memory://pdf-bucket/dir%2Fa%20b.pdf?"));

        let body = store.fetch_signed(&signed.url, Utc::now()).await.unwrap();
        assert_eq!(body, b"%PDF-1.7".to_vec());

        let later = signed.expires_at + Duration::seconds(1);
        let err = store.fetch_signed(&signed.url, later).await.unwrap_err();
        assert!(matches!(err, AppError::Signing(_)));
    }

    #[tokio::test]
    async fn test_signed_url_rejects_tampering() {
        let store = store();
        store.put("a.pdf", b"a", "application/pdf").await.unwrap();
        store.put("b.pdf", b"b", "application/pdf").await.unwrap();

        let signed = store.presign_get("a.pdf", 3600).await.unwrap();
        let tampered = signed.url.replace("/a.pdf?", "/b.pdf?");

        let err = store.fetch_signed(&tampered, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::Signing(_)));
    }
}
