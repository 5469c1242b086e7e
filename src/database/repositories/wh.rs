use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tokio::sync::RwLock;

use crate::database::models::wh::WhRow;
use crate::database::{StoreError, StoreResult};
use crate::id::{UserId, WhId};
use crate::ownership::{Owner, OwnerFilter};
use crate::wh::{GenerationProps, Wh, WhKind};

#[async_trait]
pub trait WhRepository: Send + Sync {
    async fn insert(&self, wh: Wh) -> StoreResult<Wh>;

    async fn find(&self, kind: WhKind, id: &WhId) -> StoreResult<Option<Wh>>;

    /// Every object of `kind` admitted by `filter`, optionally restricted to `ids`.
    async fn find_visible(
        &self,
        kind: WhKind,
        filter: &OwnerFilter,
        ids: Option<&[WhId]>,
    ) -> StoreResult<Vec<Wh>>;

    /// Replaces payload and owner of an existing object.
    async fn update(&self, wh: Wh) -> StoreResult<Wh>;

    async fn delete(&self, kind: WhKind, id: &WhId) -> StoreResult<()>;

    async fn generation_props(&self) -> StoreResult<Option<GenerationProps>>;

    /// Stores the generation tables, replacing any previous version.
    async fn store_generation_props(&self, props: GenerationProps) -> StoreResult<()>;
}

#[derive(Default)]
pub struct MemoryWhRepository {
    tables: RwLock<HashMap<WhKind, HashMap<WhId, Wh>>>,
    generation: RwLock<Option<GenerationProps>>,
}

impl MemoryWhRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WhRepository for MemoryWhRepository {
    async fn insert(&self, wh: Wh) -> StoreResult<Wh> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(wh.kind()).or_default();
        if table.contains_key(&wh.id) {
            return Err(StoreError::AlreadyExists);
        }
        table.insert(wh.id.clone(), wh.clone());
        Ok(wh)
    }

    async fn find(&self, kind: WhKind, id: &WhId) -> StoreResult<Option<Wh>> {
        let tables = self.tables.read().await;
        Ok(tables.get(&kind).and_then(|t| t.get(id)).cloned())
    }

    async fn find_visible(
        &self,
        kind: WhKind,
        filter: &OwnerFilter,
        ids: Option<&[WhId]>,
    ) -> StoreResult<Vec<Wh>> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(&kind) else {
            return Ok(Vec::new());
        };
        let mut found: Vec<Wh> = table
            .values()
            .filter(|wh| ids.is_none_or(|ids| ids.contains(&wh.id)))
            .filter(|wh| filter.admits(&wh.owner, wh.shared()))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn update(&self, wh: Wh) -> StoreResult<Wh> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .get_mut(&wh.kind())
            .and_then(|t| t.get_mut(&wh.id))
            .ok_or(StoreError::NotFound)?;
        *slot = wh.clone();
        Ok(wh)
    }

    async fn delete(&self, kind: WhKind, id: &WhId) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .get_mut(&kind)
            .and_then(|t| t.remove(id))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn generation_props(&self) -> StoreResult<Option<GenerationProps>> {
        Ok(self.generation.read().await.clone())
    }

    async fn store_generation_props(&self, props: GenerationProps) -> StoreResult<()> {
        *self.generation.write().await = Some(props);
        Ok(())
    }
}

pub struct PgWhRepository {
    pool: PgPool,
}

impl PgWhRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const GENERATION_ROW: &str = "generationProps";

fn owner_strings(ids: &[UserId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_string()).collect()
}

fn payload_json(wh: &Wh) -> StoreResult<Json<serde_json::Value>> {
    serde_json::to_value(&wh.payload)
        .map(Json)
        .map_err(|e| StoreError::Internal(e.to_string()))
}

#[async_trait]
impl WhRepository for PgWhRepository {
    async fn insert(&self, wh: Wh) -> StoreResult<Wh> {
        sqlx::query(
            "INSERT INTO wh (id, kind, owner_id, shared, payload) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(wh.id.as_str())
        .bind(wh.kind().as_str())
        .bind(wh.owner.as_str())
        .bind(wh.shared())
        .bind(payload_json(&wh)?)
        .execute(&self.pool)
        .await?;
        Ok(wh)
    }

    async fn find(&self, kind: WhKind, id: &WhId) -> StoreResult<Option<Wh>> {
        let row = sqlx::query_as::<_, WhRow>(
            "SELECT id, kind, owner_id, payload FROM wh WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Wh::try_from).transpose()
    }

    async fn find_visible(
        &self,
        kind: WhKind,
        filter: &OwnerFilter,
        ids: Option<&[WhId]>,
    ) -> StoreResult<Vec<Wh>> {
        let (all, mut owners, shared_owners) = match filter {
            OwnerFilter::All => (true, Vec::new(), Vec::new()),
            OwnerFilter::Scoped {
                owners,
                shared_owners,
            } => (false, owner_strings(owners), owner_strings(shared_owners)),
        };
        owners.push(Owner::Canonical.as_str().to_string());
        let ids: Option<Vec<String>> =
            ids.map(|ids| ids.iter().map(|id| id.as_str().to_string()).collect());

        let rows = sqlx::query_as::<_, WhRow>(
            r#"
            SELECT id, kind, owner_id, payload FROM wh
            WHERE kind = $1
              AND ($2 OR owner_id = ANY($3) OR (shared AND owner_id = ANY($4)))
              AND ($5::TEXT[] IS NULL OR id = ANY($5))
            ORDER BY id
            "#,
        )
        .bind(kind.as_str())
        .bind(all)
        .bind(owners)
        .bind(shared_owners)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Wh::try_from).collect()
    }

    async fn update(&self, wh: Wh) -> StoreResult<Wh> {
        let result = sqlx::query(
            "UPDATE wh SET owner_id = $3, shared = $4, payload = $5 WHERE kind = $1 AND id = $2",
        )
        .bind(wh.kind().as_str())
        .bind(wh.id.as_str())
        .bind(wh.owner.as_str())
        .bind(wh.shared())
        .bind(payload_json(&wh)?)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(wh)
    }

    async fn delete(&self, kind: WhKind, id: &WhId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM wh WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn generation_props(&self) -> StoreResult<Option<GenerationProps>> {
        let payload: Option<Json<GenerationProps>> = sqlx::query_scalar(
            "SELECT payload FROM wh_generation WHERE name = $1",
        )
        .bind(GENERATION_ROW)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payload.map(|Json(props)| props))
    }

    async fn store_generation_props(&self, props: GenerationProps) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO wh_generation (name, payload) VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET payload = EXCLUDED.payload
            "#,
        )
        .bind(GENERATION_ROW)
        .bind(Json(props))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::Claims;
    use crate::wh::{WhPayload, WhSpell};

    fn spell(id: &str, owner: Owner, shared: bool) -> Wh {
        Wh {
            id: WhId::from(id),
            owner,
            payload: WhPayload::Spell(WhSpell {
                name: id.to_string(),
                shared,
                ..Default::default()
            }),
        }
    }

    fn user(id: &str) -> Owner {
        Owner::User(UserId::from(id))
    }

    #[tokio::test]
    async fn find_visible_applies_owner_filter() {
        let repo = MemoryWhRepository::new();
        repo.insert(spell("canon", Owner::Canonical, false)).await.unwrap();
        repo.insert(spell("mine", user("me"), false)).await.unwrap();
        repo.insert(spell("friend-open", user("friend"), true)).await.unwrap();
        repo.insert(spell("friend-private", user("friend"), false)).await.unwrap();
        repo.insert(spell("stranger", user("stranger"), true)).await.unwrap();

        let claims = Claims::user(UserId::from("me"), false, vec![UserId::from("friend")]);
        let filter = OwnerFilter::for_claims(&claims);
        let visible = repo.find_visible(WhKind::Spell, &filter, None).await.unwrap();
        let ids: Vec<&str> = visible.iter().map(|wh| wh.id.as_str()).collect();
        assert_eq!(ids, ["canon", "friend-open", "mine"]);

        let subset = [WhId::from("mine"), WhId::from("stranger")];
        let visible = repo
            .find_visible(WhKind::Spell, &filter, Some(&subset))
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
    }

    #[tokio::test]
    async fn kinds_are_separate_tables() {
        let repo = MemoryWhRepository::new();
        repo.insert(spell("s1", Owner::Canonical, false)).await.unwrap();
        assert!(repo
            .find(WhKind::Mutation, &WhId::from("s1"))
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            repo.delete(WhKind::Mutation, &WhId::from("s1")).await,
            Err(StoreError::NotFound)
        ));
        repo.delete(WhKind::Spell, &WhId::from("s1")).await.unwrap();
    }

    #[tokio::test]
    async fn generation_props_are_replaced_on_store() {
        let repo = MemoryWhRepository::new();
        assert!(repo.generation_props().await.unwrap().is_none());

        for name in ["first", "second"] {
            repo.store_generation_props(GenerationProps {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        }
        assert_eq!(repo.generation_props().await.unwrap().unwrap().name, "second");
    }
}
