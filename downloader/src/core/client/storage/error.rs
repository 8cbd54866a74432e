use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to put object : {0}")]
    UnableToPutObject(#[from] SdkError<PutObjectError>),
    #[error("Bucket is not reachable : {0}")]
    HeadBucketError(#[from] SdkError<HeadBucketError>),
    #[error("Invalid Bucket Name is given: {0}")]
    InvalidBucketName(String),
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
}
