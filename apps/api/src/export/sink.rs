//! Destinations for finished PDFs.

use std::path::PathBuf;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;

use crate::export::{ExportError, ExportSink};

const EXPORT_PREFIX: &str = "exports";

/// Uploads to `s3://{bucket}/exports/{filename}` (S3 or MinIO).
pub struct S3ExportSink {
    client: S3Client,
    bucket: String,
}

impl S3ExportSink {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ExportSink for S3ExportSink {
    async fn save(&self, pdf: Bytes, filename: &str) -> Result<String, ExportError> {
        let key = format!("{EXPORT_PREFIX}/{filename}");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(pdf))
            .content_type("application/pdf")
            .content_disposition(format!("attachment; filename=\"{filename}\""))
            .send()
            .await
            .map_err(|e| ExportError::Sink(format!("S3 upload failed: {e}")))?;

        let location = format!("s3://{}/{}", self.bucket, key);
        info!("Uploaded export to {location}");
        Ok(location)
    }
}

/// Writes into a local directory. The file appears under its final name only
/// once fully written.
pub struct FsExportSink {
    dir: PathBuf,
}

impl FsExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ExportSink for FsExportSink {
    async fn save(&self, pdf: Bytes, filename: &str) -> Result<String, ExportError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let target = self.dir.join(filename);
        let partial = self.dir.join(format!(".{filename}.part"));

        if let Err(e) = tokio::fs::write(&partial, &pdf).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        let location = target.display().to_string();
        info!("Wrote export to {location}");
        Ok(location)
    }
}
