use clap::Args;

/// Parameters used to config MongoDB.
#[derive(Debug, Clone, Args)]
pub struct MongoDBCliArgs {
    /// The connection string to the MongoDB server.
    #[arg(env = "DOWNLOADER_MONGODB_CONNECTION_URL", long)]
    pub mongodb_connection_url: Option<String>,

    /// The name of the database.
    #[arg(env = "DOWNLOADER_MONGODB_DATABASE_NAME", long, default_value = "filesure")]
    pub mongodb_database_name: String,
}
