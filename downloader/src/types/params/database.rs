use crate::cli::database::mongodb::MongoDBCliArgs;
use crate::WorkerError;

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub connection_url: String,
    pub database_name: String,
}

impl TryFrom<MongoDBCliArgs> for MongoConfig {
    type Error = WorkerError;
    fn try_from(args: MongoDBCliArgs) -> Result<Self, Self::Error> {
        let connection_url = args
            .mongodb_connection_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| WorkerError::ConfigError("MongoDB connection url is required".to_string()))?;

        if args.mongodb_database_name.trim().is_empty() {
            return Err(WorkerError::ConfigError("MongoDB database name is empty".to_string()));
        }

        Ok(Self { connection_url, database_name: args.mongodb_database_name })
    }
}
