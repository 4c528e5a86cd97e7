//! Card store — the keyed record collection behind the catalog.
//!
//! `AppState` holds an `Arc<dyn CardStore>`. Production uses `PgCardStore`;
//! tests use `memory::MemoryCardStore`.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::card::{CardRow, NewCard};

#[async_trait]
pub trait CardStore: Send + Sync {
    async fn is_empty(&self) -> Result<bool>;

    /// Inserts all cards in one batch. Ids are assigned in slice order.
    async fn insert_batch(&self, cards: &[NewCard]) -> Result<u64>;

    /// Every card, in random order.
    async fn list_shuffled(&self) -> Result<Vec<CardRow>>;

    /// Cards whose id is in `ids`, in no particular order. Unknown ids are ignored.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<CardRow>>;
}

pub struct PgCardStore {
    pool: PgPool,
}

impl PgCardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CardStore for PgCardStore {
    async fn is_empty(&self) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM cards)")
            .fetch_one(&self.pool)
            .await?;
        Ok(!exists)
    }

    async fn insert_batch(&self, cards: &[NewCard]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        for card in cards {
            sqlx::query("INSERT INTO cards (name, image_path) VALUES ($1, $2)")
                .bind(&card.name)
                .bind(&card.image_path)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(cards.len() as u64)
    }

    async fn list_shuffled(&self) -> Result<Vec<CardRow>> {
        Ok(
            sqlx::query_as::<_, CardRow>("SELECT id, name, image_path FROM cards ORDER BY random()")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<CardRow>> {
        Ok(sqlx::query_as::<_, CardRow>(
            "SELECT id, name, image_path FROM cards WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?)
    }
}
