use clap::Args;
use url::Url;

use crate::types::constant::DEFAULT_STORAGE_NAMESPACE;

/// Parameters used to config AWS S3. Without a bucket name uploads are skipped.
#[derive(Debug, Clone, Args)]
pub struct AWSS3CliArgs {
    /// The name of the S3 bucket documents are stored in.
    #[arg(env = "DOWNLOADER_AWS_S3_BUCKET_NAME", long)]
    pub aws_s3_bucket_name: Option<String>,

    /// Custom endpoint of an S3 compatible store.
    #[arg(env = "DOWNLOADER_AWS_S3_ENDPOINT_URL", long)]
    pub aws_s3_endpoint_url: Option<Url>,

    /// The region.
    #[arg(env = "AWS_REGION", long, default_value = "us-east-1")]
    pub aws_region: String,

    /// Prefix of every object key.
    #[arg(env = "DOWNLOADER_STORAGE_NAMESPACE", long, default_value = DEFAULT_STORAGE_NAMESPACE)]
    pub storage_namespace: String,
}
