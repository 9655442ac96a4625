//! Postgres-backed product repository.
//!
//! ## Schema
//!
//! A single `products` table keyed by an identity column. [`PostgresProductRepository::ensure_schema`]
//! creates it when missing; there is no migration history beyond that.
//!
//! ## Error Mapping
//!
//! | SQLx Error | RepositoryError |
//! |------------|-----------------|
//! | `Database` | `Database` (carries the server message) |
//! | `PoolClosed` / `PoolTimedOut` / `Io` | `Unavailable` |
//! | `ColumnDecode` / `ColumnNotFound` | `Decode` |
//! | anything else | `Database` |

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use microcommerce_core::ProductId;
use microcommerce_products::{Product, ProductDraft};

use super::{ProductRepository, RepositoryError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    name TEXT NOT NULL,
    price BIGINT NOT NULL,
    purchase_price BIGINT NOT NULL DEFAULT 0
)
"#;

/// Move the identity sequence forward to the highest stored id. Never moves it
/// backwards, so ids freed by deletes are not handed out again.
const ADVANCE_SEQUENCE: &str = r#"
SELECT setval(seq.name::regclass, ids.max_id)
FROM (SELECT pg_get_serial_sequence('products', 'id') AS name) AS seq,
     (SELECT MAX(id) AS max_id FROM products) AS ids
WHERE ids.max_id > COALESCE(pg_sequence_last_value(seq.name::regclass), 0)
"#;

/// Postgres-backed product store.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Wrap an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn fetch_products(
        &self,
        operation: &'static str,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter().map(|row| product_from_row(operation, row)).collect()
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_products(
            "find_all",
            sqlx::query(
                r#"
                SELECT id, name, price, purchase_price
                FROM products
                ORDER BY id ASC
                "#,
            ),
        )
        .await
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, purchase_price
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(|r| product_from_row("find_by_id", &r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_price_greater_than(
        &self,
        threshold: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_products(
            "find_by_price_greater_than",
            sqlx::query(
                r#"
                SELECT id, name, price, purchase_price
                FROM products
                WHERE price > $1
                ORDER BY id ASC
                "#,
            )
            .bind(threshold),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_by_name_containing(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_products(
            "find_by_name_containing",
            sqlx::query(
                r#"
                SELECT id, name, price, purchase_price
                FROM products
                WHERE name ILIKE $1 ESCAPE '\'
                ORDER BY id ASC
                "#,
            )
            .bind(contains_pattern(term)),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_all_ordered_by_name(&self) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_products(
            "find_all_ordered_by_name",
            sqlx::query(
                r#"
                SELECT id, name, price, purchase_price
                FROM products
                ORDER BY lower(name) COLLATE "C" ASC, name COLLATE "C" ASC, id ASC
                "#,
            ),
        )
        .await
    }

    #[instrument(skip(self, draft), fields(product_id = ?draft.id), err)]
    async fn save(&self, draft: ProductDraft) -> Result<Option<Product>, RepositoryError> {
        let Some(id) = draft.id else {
            let row = sqlx::query(
                r#"
                INSERT INTO products (name, price, purchase_price)
                VALUES ($1, $2, $3)
                RETURNING id, name, price, purchase_price
                "#,
            )
            .bind(&draft.name)
            .bind(draft.price)
            .bind(draft.purchase_price)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("save", e))?;

            return row.map(|r| product_from_row("save", &r)).transpose();
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("save", e))?;

        let row = sqlx::query(
            r#"
            INSERT INTO products (id, name, price, purchase_price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                price = EXCLUDED.price,
                purchase_price = EXCLUDED.purchase_price
            RETURNING id, name, price, purchase_price
            "#,
        )
        .bind(id.get())
        .bind(&draft.name)
        .bind(draft.price)
        .bind(draft.purchase_price)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("save", e))?;

        // Explicit ids bypass the identity sequence.
        sqlx::query(ADVANCE_SEQUENCE)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("save", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("save", e))?;

        row.map(|r| product_from_row("save", &r)).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(())
    }
}

fn product_from_row(operation: &'static str, row: &PgRow) -> Result<Product, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::Decode {
        operation,
        message: e.to_string(),
    };

    let id: i64 = row.try_get("id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let price: i64 = row.try_get("price").map_err(decode)?;
    let purchase_price: i64 = row.try_get("purchase_price").map_err(decode)?;

    Ok(Product::new(ProductId::new(id), name, price, purchase_price))
}

/// `%term%` with `\`, `%` and `_` escaped so the term matches literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => RepositoryError::Database {
            operation,
            message: db_err.message().to_string(),
        },
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            RepositoryError::Unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => RepositoryError::Unavailable(format!("io error in {operation}: {e}")),
        e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_)) => {
            RepositoryError::Decode {
                operation,
                message: e.to_string(),
            }
        }
        other => RepositoryError::Database {
            operation,
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_wraps_plain_terms() {
        assert_eq!(contains_pattern("bike"), "%bike%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("100%"), r"%100\%%");
        assert_eq!(contains_pattern("a_b"), r"%a\_b%");
        assert_eq!(contains_pattern(r"c:\d"), r"%c:\\d%");
    }

    #[test]
    fn pool_errors_map_to_unavailable() {
        match map_sqlx_error("find_all", sqlx::Error::PoolTimedOut) {
            RepositoryError::Unavailable(msg) => assert!(msg.contains("find_all")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn row_not_found_maps_to_database_error() {
        match map_sqlx_error("save", sqlx::Error::RowNotFound) {
            RepositoryError::Database { operation, .. } => assert_eq!(operation, "save"),
            other => panic!("expected Database, got {other:?}"),
        }
    }

    /// Fresh repository over an emptied `products` table.
    async fn repository() -> PostgresProductRepository {
        let url = std::env::var("MICROCOMMERCE_TEST_DATABASE_URL")
            .expect("MICROCOMMERCE_TEST_DATABASE_URL must point at a scratch database");
        let repo = PostgresProductRepository::connect(&url, 2).await.unwrap();
        repo.ensure_schema().await.unwrap();
        sqlx::query("TRUNCATE products RESTART IDENTITY")
            .execute(&repo.pool)
            .await
            .unwrap();
        repo
    }

    async fn insert(repo: &PostgresProductRepository, name: &str) -> ProductId {
        use microcommerce_core::Entity;
        repo.save(ProductDraft::new(name, 10, 1))
            .await
            .unwrap()
            .unwrap()
            .id()
    }

    #[tokio::test]
    #[ignore] // requires a Postgres database
    async fn explicit_id_save_never_moves_sequence_backwards() {
        let repo = repository().await;
        insert(&repo, "A").await;
        let b = insert(&repo, "B").await;
        let c = insert(&repo, "C").await;
        repo.delete(c).await.unwrap();

        repo.save(ProductDraft::new("B2", 20, 5).with_id(b)).await.unwrap();
        let d = insert(&repo, "D").await;
        assert!(d > c, "id {d} reused after delete of {c}");
    }

    #[tokio::test]
    #[ignore] // requires a Postgres database
    async fn explicit_id_save_moves_sequence_past_it() {
        let repo = repository().await;
        repo.save(ProductDraft::new("Kayak", 900, 600).with_id(ProductId::new(10)))
            .await
            .unwrap();
        assert_eq!(insert(&repo, "Paddle").await, ProductId::new(11));
    }

    #[tokio::test]
    #[ignore] // requires a Postgres database
    async fn ordered_by_name_ignores_case() {
        let repo = repository().await;
        for name in ["Zeta", "alpha", "Mu", "apple", "Apple"] {
            insert(&repo, name).await;
        }
        let names: Vec<_> = repo
            .find_all_ordered_by_name()
            .await
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "Apple", "apple", "Mu", "Zeta"]);
    }
}
