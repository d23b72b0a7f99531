//! Google Cloud Storage blob store

use async_trait::async_trait;

use google_cloud_storage::client::{Client as GcsClient, ClientConfig};
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};

use super::blob_store::{object_name, BlobStore};
use crate::error::{Error, Result};

const GCS_SCHEME: &str = "gs://";

/// Blob store backed by a GCS bucket; URLs are `gs://<bucket>/<object>`
pub struct GcsBlobStore {
    client: GcsClient,
    bucket: String,
    prefix: String,
}

impl GcsBlobStore {
    /// Create a store using application default credentials
    ///
    /// # Arguments
    /// * `bucket` - GCS bucket name
    /// * `prefix` - Object prefix (e.g., "pdf_files/")
    pub async fn new(bucket: String, prefix: String) -> Result<Self> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| Error::Config(format!("Failed to create GCS client: {}", e)))?;

        Ok(Self {
            client: GcsClient::new(config),
            bucket,
            prefix,
        })
    }

    /// Split a `gs://` URL into bucket and object, refusing other buckets
    fn parse_url<'a>(&self, url: &'a str) -> Result<&'a str> {
        let rest = url
            .strip_prefix(GCS_SCHEME)
            .ok_or_else(|| Error::persistence(format!("Not a GCS URL: {}", url)))?;

        match rest.split_once('/') {
            Some((bucket, object)) if bucket == self.bucket && !object.is_empty() => Ok(object),
            _ => Err(Error::persistence(format!(
                "Blob URL outside bucket {}: {}",
                self.bucket, url
            ))),
        }
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn upload(&self, data: &[u8], filename: &str) -> Result<String> {
        let object = format!("{}{}", self.prefix, object_name(filename));

        let mut media = Media::new(object.clone());
        media.content_type = mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string()
            .into();

        self.client
            .upload_object(
                &UploadObjectRequest {
                    bucket: self.bucket.clone(),
                    ..Default::default()
                },
                data.to_vec(),
                &UploadType::Simple(media),
            )
            .await
            .map_err(|e| Error::persistence(format!("Failed to upload to GCS: {}", e)))?;

        tracing::debug!("Uploaded {} bytes to gs://{}/{}", data.len(), self.bucket, object);
        Ok(format!("{}{}/{}", GCS_SCHEME, self.bucket, object))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let object = self.parse_url(url)?;

        self.client
            .download_object(
                &GetObjectRequest {
                    bucket: self.bucket.clone(),
                    object: object.to_string(),
                    ..Default::default()
                },
                &Range::default(),
            )
            .await
            .map_err(|e| Error::persistence(format!("Failed to download from GCS: {}", e)))
    }

    fn name(&self) -> &str {
        "gcs"
    }
}
