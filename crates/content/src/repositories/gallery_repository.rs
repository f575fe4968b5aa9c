//! Repository for gallery rows and the backing image objects.

use serde_json::json;
use uuid::Uuid;

use ayf_store::{Filter, Order, StoreClient};

use crate::entities::{GalleryItem, ImageUpload};
use crate::types::GalleryResult;

const TABLE: &str = "gallery";

pub struct GalleryRepository {
    client: StoreClient,
    image_bucket: String,
}

impl GalleryRepository {
    pub fn new(client: StoreClient, image_bucket: &str) -> Self {
        Self {
            client,
            image_bucket: image_bucket.to_string(),
        }
    }

    pub async fn list(&self, category: Option<&str>) -> GalleryResult<Vec<GalleryItem>> {
        let mut query = self
            .client
            .table(TABLE)
            .select()
            .order("created_at", Order::Descending);

        if let Some(category) = category {
            query = query.filter(Filter::eq("category", category));
        }

        Ok(query.fetch().await?)
    }

    pub async fn insert(
        &self,
        image_url: &str,
        upload: &ImageUpload,
        uploaded_by: Uuid,
    ) -> GalleryResult<GalleryItem> {
        let row = json!({
            "image_url": image_url,
            "category": upload.category,
            "description": upload.description,
            "uploaded_by": uploaded_by,
        });

        Ok(self.client.table(TABLE).insert(&row).await?)
    }

    pub async fn delete(&self, id: i64) -> GalleryResult<()> {
        Ok(self
            .client
            .table(TABLE)
            .delete(vec![Filter::eq("id", id)])
            .await?)
    }

    /// Store the image bytes and return the public URL they are served
    /// from.
    pub async fn store_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> GalleryResult<String> {
        let bucket = self.client.bucket(&self.image_bucket);
        bucket.upload(path, bytes, content_type, false).await?;
        Ok(bucket.public_url(path))
    }

    pub async fn remove_object(&self, path: &str) -> GalleryResult<()> {
        Ok(self
            .client
            .bucket(&self.image_bucket)
            .remove(&[path.to_string()])
            .await?)
    }
}
