//! Gallery manager: listings plus the two-step image upload protocol.

use std::sync::Arc;

use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use tracing::{info, warn};

use ayf_auth::Identity;
use ayf_store::StoreClient;

use crate::entities::{GalleryItem, ImageUpload};
use crate::repositories::GalleryRepository;
use crate::types::{GalleryError, GalleryResult};

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// Data access for gallery rows and the backing objects.
pub trait GalleryRepo {
    async fn list(&self, category: Option<&str>) -> GalleryResult<Vec<GalleryItem>>;
    async fn insert(
        &self,
        image_url: &str,
        upload: &ImageUpload,
        uploaded_by: uuid::Uuid,
    ) -> GalleryResult<GalleryItem>;
    async fn delete(&self, id: i64) -> GalleryResult<()>;
    async fn store_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> GalleryResult<String>;
    async fn remove_object(&self, path: &str) -> GalleryResult<()>;
}

impl GalleryRepo for GalleryRepository {
    async fn list(&self, category: Option<&str>) -> GalleryResult<Vec<GalleryItem>> {
        self.list(category).await
    }

    async fn insert(
        &self,
        image_url: &str,
        upload: &ImageUpload,
        uploaded_by: uuid::Uuid,
    ) -> GalleryResult<GalleryItem> {
        self.insert(image_url, upload, uploaded_by).await
    }

    async fn delete(&self, id: i64) -> GalleryResult<()> {
        self.delete(id).await
    }

    async fn store_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> GalleryResult<String> {
        self.store_object(path, bytes, content_type).await
    }

    async fn remove_object(&self, path: &str) -> GalleryResult<()> {
        self.remove_object(path).await
    }
}

/// Service for managing gallery operations.
pub struct GalleryService<R, I> {
    repository: R,
    identity: Arc<I>,
}

impl<I: Identity> GalleryService<GalleryRepository, I> {
    pub fn new(client: StoreClient, image_bucket: &str, identity: Arc<I>) -> Self {
        Self {
            repository: GalleryRepository::new(client, image_bucket),
            identity,
        }
    }
}

impl<R, I> GalleryService<R, I>
where
    R: GalleryRepo,
    I: Identity,
{
    pub fn with_repository(repository: R, identity: Arc<I>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// Gallery items newest first, optionally narrowed to one category.
    pub async fn gallery_items(
        &self,
        category: Option<&str>,
    ) -> GalleryResult<Vec<GalleryItem>> {
        self.repository.list(category).await
    }

    /// Upload an image and record it. The binary is stored first; if that
    /// fails no row is written. A row-insert failure after a successful
    /// upload leaves an orphaned object behind, which is accepted.
    pub async fn upload_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upload: ImageUpload,
    ) -> GalleryResult<GalleryItem> {
        let user = self.require_user()?;
        let extension = file_extension(filename)
            .ok_or_else(|| GalleryError::Validation(format!("no file extension: {filename}")))?;

        let path = format!("gallery/{}.{extension}", CUID.create_id());
        let image_url = self
            .repository
            .store_object(&path, bytes, content_type)
            .await?;

        let item = self.repository.insert(&image_url, &upload, user.id).await?;
        info!(item_id = item.id, path, "uploaded gallery image");
        Ok(item)
    }

    /// Delete a gallery item and its stored image. A storage removal
    /// failure is logged and the row is deleted anyway.
    pub async fn delete_item(&self, id: i64, image_url: &str) -> GalleryResult<()> {
        self.require_user()?;

        match object_path_from_url(image_url) {
            Some(path) => {
                if let Err(error) = self.repository.remove_object(&path).await {
                    warn!(item_id = id, %error, "failed to remove stored image, deleting row anyway");
                }
            }
            None => {
                warn!(item_id = id, image_url, "could not derive object path from image url");
            }
        }

        self.repository.delete(id).await?;
        info!(item_id = id, "deleted gallery item");
        Ok(())
    }

    fn require_user(&self) -> GalleryResult<ayf_store::AuthUser> {
        self.identity
            .current_user()
            .ok_or(GalleryError::AuthenticationRequired)
    }
}

fn file_extension(filename: &str) -> Option<&str> {
    let (_, extension) = filename.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension)
    }
}

/// Recover the bucket-relative path from a public URL; gallery objects all
/// live under the `gallery/` prefix.
fn object_path_from_url(image_url: &str) -> Option<String> {
    image_url
        .find("gallery/")
        .map(|index| image_url[index..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_taken_after_the_last_dot() {
        assert_eq!(file_extension("photo.final.JPG"), Some("JPG"));
        assert_eq!(file_extension("photo"), None);
        assert_eq!(file_extension("photo."), None);
    }

    #[test]
    fn object_path_is_recovered_from_public_url() {
        let url = "http://localhost:54321/storage/v1/object/public/images/gallery/abc123.jpg";
        assert_eq!(
            object_path_from_url(url).as_deref(),
            Some("gallery/abc123.jpg")
        );
        assert_eq!(object_path_from_url("http://example.com/other.jpg"), None);
    }
}
