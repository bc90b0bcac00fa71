/// S3-backed image bucket
use crate::store::{BlobError, ImageStore};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;

pub struct S3ImageStore {
    client: Arc<Client>,
    bucket: String,
}

impl S3ImageStore {
    pub fn new(client: Arc<Client>, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let service = err.into_service_error();
                return Err(if service.is_no_such_key() {
                    BlobError::NotFound(key.to_string())
                } else {
                    BlobError::Service(service.to_string())
                });
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| BlobError::Service(err.to_string()))?;

        Ok(body.into_bytes().to_vec())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("image/jpeg")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| BlobError::Service(err.to_string()))?;

        Ok(())
    }
}
