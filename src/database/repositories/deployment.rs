use crate::database::models::DeploymentStateDoc;
use crate::database::mongodb::{MongoDbClient, DEPLOYMENT_STATE_COLLECTION};
use crate::deployment::state::{DeploymentState, DeploymentStore};
use anyhow::Result;
use async_trait::async_trait;
use bson::doc;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

/// Deployment state repository.
/// The state is a singleton, there is only ever one document in the collection.
#[derive(Debug, Clone)]
pub struct DeploymentRepository {
    client: Arc<MongoDbClient>,
}

impl DeploymentRepository {
    pub fn new(client: Arc<MongoDbClient>) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<Option<DeploymentStateDoc>> {
        let collection = self
            .client
            .collection::<DeploymentStateDoc>(DEPLOYMENT_STATE_COLLECTION);
        Ok(collection.find_one(doc! {}).await?)
    }

    /// Replace history and marker in one write, creating the document on first use
    pub async fn upsert(&self, state: &DeploymentState) -> Result<()> {
        let collection = self
            .client
            .collection::<DeploymentStateDoc>(DEPLOYMENT_STATE_COLLECTION);
        let now = Utc::now().timestamp() as i64;

        let update = doc! {
            "$set": {
                "recent_tokens": bson::to_bson(&state.recent_tokens)?,
                "last_processed_tx": state.last_processed_tx.clone(),
                "pending": bson::to_bson(&state.pending)?,
                "updated_at": now,
            },
            "$setOnInsert": { "created_at": now },
        };

        let result = collection.update_one(doc! {}, update).upsert(true).await?;
        if result.upserted_id.is_some() {
            info!("Created deployment state document");
        } else {
            debug!(
                "Updated deployment state, last processed {:?}",
                state.last_processed_tx
            );
        }

        Ok(())
    }
}

#[async_trait]
impl DeploymentStore for DeploymentRepository {
    async fn load(&self) -> Result<DeploymentState> {
        Ok(self.get().await?.map(DeploymentState::from).unwrap_or_default())
    }

    async fn save(&self, state: &DeploymentState) -> Result<()> {
        self.upsert(state).await
    }
}
