//! File-object storage: upload, list, remove, public URLs.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::StoreClient;
use crate::error::StoreResult;

/// Metadata for one stored object, as returned by a bucket listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectInfo {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Handle for one storage bucket.
pub struct BucketHandle<'a> {
    client: &'a StoreClient,
    bucket: String,
}

impl<'a> BucketHandle<'a> {
    pub(crate) fn new(client: &'a StoreClient, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    /// Store a binary object under `path`. With `upsert` an existing object
    /// at the same path is replaced instead of rejected.
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> StoreResult<()> {
        let url = format!(
            "{}/storage/v1/object/{}/{path}",
            self.client.base_url(),
            self.bucket
        );
        debug!(bucket = %self.bucket, path, "uploading object");

        let mut request = self
            .client
            .authed(self.client.http().post(url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        if upsert {
            request = request.header("x-upsert", "true");
        }

        self.client.send_checked(request).await?;
        Ok(())
    }

    /// Remove the objects at the given paths.
    pub async fn remove(&self, paths: &[String]) -> StoreResult<()> {
        let url = format!(
            "{}/storage/v1/object/{}",
            self.client.base_url(),
            self.bucket
        );

        let request = self
            .client
            .authed(self.client.http().delete(url))
            .json(&json!({ "prefixes": paths }));

        self.client.send_checked(request).await?;
        Ok(())
    }

    /// List the objects under a prefix (the bucket root for `""`).
    pub async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectInfo>> {
        let url = format!(
            "{}/storage/v1/object/list/{}",
            self.client.base_url(),
            self.bucket
        );

        let request = self
            .client
            .authed(self.client.http().post(url))
            .json(&json!({ "prefix": prefix }));

        let response = self.client.send_checked(request).await?;
        Ok(response.json::<Vec<ObjectInfo>>().await?)
    }

    /// The public URL an uploaded object is served from.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.client.base_url(),
            self.bucket
        )
    }
}
