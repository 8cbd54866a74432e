use async_trait::async_trait;
use aws_config::{Region, SdkConfig};
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

use crate::core::client::storage::{StorageClient, StorageError};
use crate::types::params::storage::S3Config;

#[derive(Clone, Debug)]
pub struct AWSS3 {
    client: Arc<Client>,
    bucket_name: String,
    endpoint_url: Option<String>,
}

impl AWSS3 {
    /// Creates a new instance of AWSS3 with the provided AWS configuration and bucket parameters.
    /// # Arguments
    /// * `aws_config` - The AWS configuration.
    /// * `s3_config` - Bucket name and an optional custom endpoint (MinIO, localstack).
    ///
    /// # Returns
    /// * `Self` - The new instance of AWSS3.
    pub fn new(aws_config: &SdkConfig, s3_config: &S3Config) -> Result<Self, StorageError> {
        if s3_config.bucket_name.trim().is_empty() {
            return Err(StorageError::InvalidBucketName("Bucket name is empty".to_string()));
        }

        let mut s3_config_builder =
            aws_sdk_s3::config::Builder::from(aws_config).region(Region::new(s3_config.region.clone()));

        // Custom endpoints are S3-compatible stores, which only serve path style requests
        if let Some(endpoint_url) = &s3_config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url.as_str()).force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        Ok(Self {
            client: Arc::new(client),
            bucket_name: s3_config.bucket_name.clone(),
            endpoint_url: s3_config.endpoint_url.as_ref().map(|url| url.as_str().trim_end_matches('/').to_string()),
        })
    }

    /// Loads the shared AWS configuration for the given region and builds the client
    pub async fn create(s3_config: &S3Config) -> Result<Self, StorageError> {
        let aws_config = aws_config::from_env().region(Region::new(s3_config.region.clone())).load().await;
        Self::new(&aws_config, s3_config)
    }

    /// Location reported for an object stored under `key`
    pub fn location(&self, key: &str) -> String {
        match &self.endpoint_url {
            Some(endpoint) => format!("{}/{}/{}", endpoint, self.bucket_name, key),
            None => format!("s3://{}/{}", self.bucket_name, key),
        }
    }

    /// Checks that the bucket exists and is reachable with the loaded credentials
    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.client.head_bucket().bucket(&self.bucket_name).send().await?;
        Ok(())
    }
}

#[async_trait]
impl StorageClient for AWSS3 {
    /// Put the data into the bucket with the specified key.
    ///
    /// # Arguments
    /// * `data` - The data to put into the bucket.
    /// * `key` - The key of the object to put.
    /// # Returns
    /// * `Result<String, StorageError>` - The location of the stored object.
    async fn put_data(&self, data: Bytes, key: &str) -> Result<String, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("Object key is empty".to_string()));
        }

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type("text/plain")
            .body(data.into())
            .send()
            .await?;

        debug!(bucket = %self.bucket_name, key = %key, "Object stored");
        Ok(self.location(key))
    }
}
