//! Object storage for product images.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use crate::client::{Auth, BackendClient};
use crate::error::BackendError;

impl BackendClient {
    /// Upload `bytes` to `bucket/path`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns an error when storage rejects the upload.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        auth: Auth<'_>,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let url = self.endpoint(&format!("storage/v1/object/{bucket}/{path}"));
        let request = self
            .request(Method::POST, &url, auth)?
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .header("Cache-Control", "max-age=3600")
            .body(bytes);
        self.send(request).await?;
        Ok(self.public_url(bucket, path))
    }

    /// Public URL of an object in a public bucket.
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(&format!("storage/v1/object/public/{bucket}/{path}"))
    }

    /// Object path inside `bucket` for a URL produced by [`Self::public_url`].
    #[must_use]
    pub fn object_path<'u>(&self, bucket: &str, public_url: &'u str) -> Option<&'u str> {
        let prefix = self.public_url(bucket, "");
        public_url
            .strip_prefix(prefix.as_str())
            .filter(|path| !path.is_empty())
    }

    /// Delete objects from `bucket`.
    ///
    /// # Errors
    ///
    /// Returns an error when storage rejects the request.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        auth: Auth<'_>,
        bucket: &str,
        paths: &[&str],
    ) -> Result<(), BackendError> {
        if paths.is_empty() {
            return Ok(());
        }
        let url = self.endpoint(&format!("storage/v1/object/{bucket}"));
        let request = self
            .request(Method::DELETE, &url, auth)?
            .json(&json!({ "prefixes": paths }));
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use crate::BackendConfig;

    use super::*;

    fn client() -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: "https://project.backend.test".to_string(),
            anon_key: SecretString::from("anon"),
            service_role_key: None,
        })
        .unwrap()
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            client().public_url("product-images", "products/1/a.webp"),
            "https://project.backend.test/storage/v1/object/public/product-images/products/1/a.webp"
        );
    }

    #[test]
    fn test_object_path_roundtrip() {
        let client = client();
        let url = client.public_url("product-images", "products/1/a.webp");
        assert_eq!(
            client.object_path("product-images", &url),
            Some("products/1/a.webp")
        );
        assert_eq!(
            client.object_path("product-images", "https://cdn.example.com/a.webp"),
            None
        );
        assert_eq!(client.object_path("other-bucket", &url), None);
    }
}
