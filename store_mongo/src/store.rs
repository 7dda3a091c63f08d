//! Lazily-connected MongoDB participant store.

use std::time::Duration;

use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use proshow_store::{ParticipantFilter, ParticipantStore, StoreError};
use proshow_types::Participant;

use crate::codec::{decode_candidates, filter_document, sort_document};
use crate::{MongoConfig, MongoStoreError};

/// Participant store backed by a MongoDB collection.
///
/// Construction never touches the network. The driver client is built on the
/// first query behind a [`OnceCell`], so concurrent first requests share one
/// initialization; if it fails, the next call tries again.
pub struct MongoParticipantStore {
    config: MongoConfig,
    /// Server-side bound on each query.
    query_max_time: Duration,
    client: OnceCell<Client>,
}

impl MongoParticipantStore {
    pub fn new(config: MongoConfig, query_max_time: Duration) -> Self {
        Self {
            config,
            query_max_time,
            client: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    /// Whether the client has been initialized yet.
    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    async fn client(&self) -> Result<&Client, MongoStoreError> {
        self.client
            .get_or_try_init(|| async {
                let mut options = ClientOptions::parse(&self.config.uri).await?;
                options.app_name = Some("proshow-verify".to_string());
                options.connect_timeout = Some(self.config.connect_timeout());
                options.server_selection_timeout = Some(self.config.connect_timeout());
                let client = Client::with_options(options)?;
                info!(
                    database = %self.config.database,
                    collection = %self.config.collection,
                    "MongoDB client initialized"
                );
                Ok::<_, MongoStoreError>(client)
            })
            .await
    }

    async fn collection(&self) -> Result<Collection<Document>, MongoStoreError> {
        let client = self.client().await?;
        Ok(client
            .database(&self.config.database)
            .collection(&self.config.collection))
    }

    /// Create the unique index on `email`. Idempotent.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            )
            .build();
        let collection = self.collection().await?;
        collection
            .create_index(index)
            .await
            .map_err(MongoStoreError::from)?;
        info!(collection = %self.config.collection, "unique email index ensured");
        Ok(())
    }

    async fn query(
        &self,
        filter: &ParticipantFilter,
        limit: usize,
    ) -> Result<Vec<Participant>, MongoStoreError> {
        let collection = self.collection().await?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let cursor = collection
            .find(filter_document(filter))
            .sort(sort_document())
            .limit(limit)
            .max_time(self.query_max_time)
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        debug!(matches = docs.len(), "participant query finished");
        decode_candidates(&docs)
    }
}

impl ParticipantStore for MongoParticipantStore {
    async fn find_matching(
        &self,
        filter: &ParticipantFilter,
        limit: usize,
    ) -> Result<Vec<Participant>, StoreError> {
        self.query(filter, limit).await.map_err(|e| {
            warn!(error = %e, "participant query failed");
            StoreError::from(e)
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.client().await?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(MongoStoreError::from)?;
        Ok(())
    }
}
