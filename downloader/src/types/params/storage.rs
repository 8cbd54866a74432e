use url::Url;

use crate::cli::storage::aws_s3::AWSS3CliArgs;

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket_name: String,
    pub endpoint_url: Option<Url>,
    pub region: String,
}

impl S3Config {
    /// `None` when no bucket is configured: the worker then runs without an object store
    pub fn from_cli_args(args: &AWSS3CliArgs) -> Option<Self> {
        let bucket_name = args.aws_s3_bucket_name.as_deref().map(str::trim).filter(|name| !name.is_empty())?;
        Some(Self {
            bucket_name: bucket_name.to_string(),
            endpoint_url: args.aws_s3_endpoint_url.clone(),
            region: args.aws_region.clone(),
        })
    }
}
