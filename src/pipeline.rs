use tracing::{error, info, instrument, warn};

use crate::clean;
use crate::common::constants::{
    CARDS_ENTITY, DATE_EVENTS_ENTITY, DIM_CARD_DETAILS, DIM_DATE_TIMES, DIM_PRODUCTS,
    DIM_STORE_DETAILS, DIM_USERS, ORDERS_ENTITY, ORDERS_TABLE, PRODUCTS_ENTITY, STORES_ENTITY,
    USERS_ENTITY,
};
use crate::common::error::{EtlError, Result};
use crate::common::table::RecordSet;
use crate::config::Config;
use crate::extract::store_api::HttpStoreApi;
use crate::extract::DataExtractor;
use crate::load::Loader;

/// The entities this pipeline knows how to centralise, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Users,
    Cards,
    Stores,
    Products,
    Orders,
    DateEvents,
}

impl Entity {
    pub const ALL: [Entity; 6] = [
        Entity::Users,
        Entity::Cards,
        Entity::Stores,
        Entity::Products,
        Entity::Orders,
        Entity::DateEvents,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Entity::Users => USERS_ENTITY,
            Entity::Cards => CARDS_ENTITY,
            Entity::Stores => STORES_ENTITY,
            Entity::Products => PRODUCTS_ENTITY,
            Entity::Orders => ORDERS_ENTITY,
            Entity::DateEvents => DATE_EVENTS_ENTITY,
        }
    }

    pub fn from_name(name: &str) -> Option<Entity> {
        Entity::ALL.into_iter().find(|e| e.name() == name)
    }
}

/// Outcome of one entity's extract-clean-load pass.
#[derive(Debug)]
pub struct EntityReport {
    pub entity: &'static str,
    pub destination: &'static str,
    pub rows_extracted: usize,
    pub rows_loaded: usize,
    /// Failed indices from the paginated store fetch, empty elsewhere.
    pub failed_indices: Vec<u64>,
}

pub struct Pipeline {
    extractor: DataExtractor,
    loader: Loader,
    config: Config,
}

impl Pipeline {
    pub async fn new(config: Config) -> Result<Self> {
        let extractor = DataExtractor::connect(&config).await?;
        let loader = Loader::connect(&config).await?;
        Ok(Self {
            extractor,
            loader,
            config,
        })
    }

    /// Run the selected entity pipelines sequentially. Each entity runs in
    /// isolation: a failure is logged and reported, never propagated into
    /// the next entity's pass.
    pub async fn run(&self, entities: &[Entity]) -> Vec<(Entity, Result<EntityReport>)> {
        let mut outcomes = Vec::with_capacity(entities.len());
        for &entity in entities {
            let span = tracing::info_span!("entity_etl", entity = entity.name());
            let _enter = span.enter();

            let outcome = match entity {
                Entity::Users => self.run_users().await,
                Entity::Cards => self.run_cards().await,
                Entity::Stores => self.run_stores().await,
                Entity::Products => self.run_products().await,
                Entity::Orders => self.run_orders().await,
                Entity::DateEvents => self.run_date_events().await,
            };
            match &outcome {
                Ok(report) => info!(
                    rows_extracted = report.rows_extracted,
                    rows_loaded = report.rows_loaded,
                    destination = report.destination,
                    "entity pipeline finished"
                ),
                Err(EtlError::EmptyResult(_)) => {
                    warn!("no rows survived extraction, load skipped")
                }
                Err(e) => error!(error = %e, "entity pipeline failed"),
            }
            outcomes.push((entity, outcome));
        }
        outcomes
    }

    pub async fn list_tables(&self) -> Result<Vec<String>> {
        self.extractor.list_tables().await
    }

    #[instrument(skip(self))]
    async fn run_users(&self) -> Result<EntityReport> {
        let raw = self
            .extractor
            .fetch_table(&self.config.sources.users_table)
            .await?;
        self.finish(USERS_ENTITY, DIM_USERS, raw, clean::users::clean_users)
            .await
    }

    #[instrument(skip(self))]
    async fn run_cards(&self) -> Result<EntityReport> {
        let raw = self
            .extractor
            .fetch_remote_document(&self.config.sources.card_document_url)
            .await?;
        self.finish(CARDS_ENTITY, DIM_CARD_DETAILS, raw, clean::cards::clean_cards)
            .await
    }

    #[instrument(skip(self))]
    async fn run_stores(&self) -> Result<EntityReport> {
        let api = HttpStoreApi::new(self.extractor.client().clone(), &self.config.store_api)?;
        let fetch = self
            .extractor
            .fetch_stores(&api, self.config.store_api.index_base)
            .await?;
        let mut report = self
            .finish(
                STORES_ENTITY,
                DIM_STORE_DETAILS,
                fetch.records,
                clean::stores::clean_stores,
            )
            .await?;
        report.failed_indices = fetch.failed;
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn run_products(&self) -> Result<EntityReport> {
        let raw = self
            .extractor
            .fetch_object_store_csv(
                &self.config.sources.products_csv_address,
                &self.config.sources.s3_region,
            )
            .await?;
        self.finish(
            PRODUCTS_ENTITY,
            DIM_PRODUCTS,
            raw,
            clean::products::clean_products,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn run_orders(&self) -> Result<EntityReport> {
        let raw = self
            .extractor
            .fetch_table(&self.config.sources.orders_table)
            .await?;
        self.finish(ORDERS_ENTITY, ORDERS_TABLE, raw, clean::orders::clean_orders)
            .await
    }

    #[instrument(skip(self))]
    async fn run_date_events(&self) -> Result<EntityReport> {
        let raw = self
            .extractor
            .fetch_json(&self.config.sources.date_events_url)
            .await?;
        self.finish(
            DATE_EVENTS_ENTITY,
            DIM_DATE_TIMES,
            raw,
            clean::date_events::clean_date_events,
        )
        .await
    }

    /// Shared clean-and-load tail of every entity pass.
    async fn finish(
        &self,
        entity: &'static str,
        destination: &'static str,
        raw: RecordSet,
        cleaner: fn(RecordSet) -> Result<RecordSet>,
    ) -> Result<EntityReport> {
        let rows_extracted = raw.len();
        let cleaned = cleaner(raw)?;
        self.loader.load(&cleaned, destination).await?;
        Ok(EntityReport {
            entity,
            destination,
            rows_extracted,
            rows_loaded: cleaned.len(),
            failed_indices: Vec::new(),
        })
    }
}
