use std::sync::Arc;

use anyhow::Context;

use microcommerce_infra::{
    AppConfig, CatalogService, InMemoryProductRepository, PostgresProductRepository,
    ProductRepository, StorageBackend,
};

/// Catalog service over whichever repository the config selected.
pub type Catalog = CatalogService<Arc<dyn ProductRepository>>;

/// Shared state handed to every handler.
pub struct AppServices {
    pub catalog: Catalog,
    pub backend: StorageBackend,
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        let repository: Arc<dyn ProductRepository> = Arc::new(InMemoryProductRepository::new());
        Self {
            catalog: CatalogService::new(repository),
            backend: StorageBackend::Memory,
        }
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!("using in-memory product repository");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => {
                let repo = PostgresProductRepository::connect(
                    &config.database.url,
                    config.database.max_connections,
                )
                .await
                .context("failed to connect to postgres")?;
                repo.ensure_schema()
                    .await
                    .context("failed to prepare products table")?;
                tracing::info!("using postgres product repository");

                let repository: Arc<dyn ProductRepository> = Arc::new(repo);
                Ok(Self {
                    catalog: CatalogService::new(repository),
                    backend: StorageBackend::Postgres,
                })
            }
        }
    }
}
