use crate::config::MongoDbConfig;
use anyhow::{anyhow, Result};
use log::{error, info};
use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database as MongoDatabase, IndexModel,
};
use std::sync::Arc;

pub const DEPLOYMENT_STATE_COLLECTION: &str = "deployment_state";

/// MongoDB client wrapper for managing database connections and operations
#[derive(Debug, Clone)]
pub struct MongoDbClient {
    _client: Client,
    database: MongoDatabase,
}

impl MongoDbClient {
    /// Connect, ping and make sure the indexes exist
    pub async fn init(config: &MongoDbConfig) -> Result<Arc<Self>> {
        info!("Connecting to MongoDB database {}", config.database);

        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| anyhow!("Failed to parse MongoDB connection string: {}", e))?;

        // Atlas clusters require a pinned server API
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);

        let client = Client::with_options(client_options)
            .map_err(|e| anyhow!("Failed to create MongoDB client: {}", e))?;
        let database = client.database(&config.database);

        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => info!(
                "Successfully connected to MongoDB database: {}",
                config.database
            ),
            Err(e) => {
                error!("Failed to connect to MongoDB: {}", e);
                return Err(anyhow!("Failed to connect to MongoDB: {}", e));
            }
        }

        let db_client = Arc::new(Self {
            _client: client,
            database,
        });

        db_client.create_indexes().await?;

        Ok(db_client)
    }

    /// Get a collection with the given name
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    pub fn database(&self) -> MongoDatabase {
        self.database.clone()
    }

    pub async fn create_indexes(&self) -> Result<()> {
        info!("Creating MongoDB indexes...");
        self.create_deployment_state_indexes().await?;
        info!("MongoDB indexes created successfully");
        Ok(())
    }

    async fn create_deployment_state_indexes(&self) -> Result<()> {
        let collection = self
            .database
            .collection::<mongodb::bson::Document>(DEPLOYMENT_STATE_COLLECTION);

        let indexes = [
            (doc! { "last_processed_tx": 1 }, IndexOptions::default()),
            (doc! { "recent_tokens.txHash": 1 }, IndexOptions::default()),
            (doc! { "pending.txHash": 1 }, IndexOptions::default()),
            (doc! { "updated_at": -1 }, IndexOptions::default()),
        ];

        for (keys, options) in indexes {
            let index = IndexModel::builder().keys(keys).options(options).build();
            collection
                .create_index(index)
                .await
                .map_err(|e| anyhow!("Failed to create deployment state index: {}", e))?;
        }

        Ok(())
    }
}
