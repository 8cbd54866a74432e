use mongodb::bson;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Mongo error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("Failed to serialize document: {0}")]
    BsonSerializeError(#[from] bson::ser::Error),

    #[error("Failed to deserialize document: {0}")]
    BsonDeserializeError(#[from] bson::de::Error),

    #[error("Failed to serialize document: {0}")]
    FailedToSerializeDocument(String),

    #[error("Item already exists: {0}")]
    ItemAlreadyExists(String),

    #[error("No update found: {0}")]
    NoUpdateFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),
}
