use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::try_join;
use tracing::info;

use crate::claims::Claims;
use crate::database::WhRepository;
use crate::error::{ServiceError, ServiceResult};
use crate::id::WhId;
use crate::ownership::{self, OwnerFilter};
use crate::validation::Validator;
use crate::wh::{GenerationProps, ItemFullView, Wh, WhKind, WhPayload, WhView};

/// CRUD over every Wh kind. Authorization goes through [`ownership`] only.
pub struct WhService {
    repo: Arc<dyn WhRepository>,
    validator: Arc<Validator>,
}

impl WhService {
    pub fn new(repo: Arc<dyn WhRepository>, validator: Arc<Validator>) -> Self {
        Self { repo, validator }
    }

    pub async fn create(&self, claims: &Claims, payload: WhPayload) -> ServiceResult<WhView> {
        let owner = ownership::owner_for_new(claims)?;
        self.validator.validate_payload(&payload)?;

        let stored = self
            .repo
            .insert(Wh {
                id: WhId::generate(),
                owner,
                payload,
            })
            .await?;
        info!(kind = %stored.kind(), id = %stored.id, owner = %stored.owner, "wh created");
        Ok(WhView::for_claims(stored, claims))
    }

    /// Hidden objects are reported exactly like missing ones.
    pub async fn get(&self, claims: &Claims, kind: WhKind, id: &WhId) -> ServiceResult<WhView> {
        let wh = self.fetch_visible(claims, kind, id).await?;
        Ok(WhView::for_claims(wh, claims))
    }

    pub async fn list(&self, claims: &Claims, kind: WhKind) -> ServiceResult<Vec<WhView>> {
        self.find_visible(claims, kind, None).await
    }

    pub async fn list_by_ids(
        &self,
        claims: &Claims,
        kind: WhKind,
        ids: &[WhId],
    ) -> ServiceResult<Vec<WhView>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_visible(claims, kind, Some(ids)).await
    }

    pub async fn update(
        &self,
        claims: &Claims,
        kind: WhKind,
        id: &WhId,
        payload: WhPayload,
    ) -> ServiceResult<WhView> {
        if payload.kind() != kind {
            return Err(ServiceError::invalid(format!(
                "expected a {kind} payload, got {}",
                payload.kind()
            )));
        }
        let current = self.fetch_editable(claims, kind, id).await?;
        self.validator.validate_payload(&payload)?;

        let updated = self
            .repo
            .update(Wh {
                id: current.id,
                owner: current.owner,
                payload,
            })
            .await?;
        info!(%kind, %id, "wh updated");
        Ok(WhView::for_claims(updated, claims))
    }

    pub async fn delete(&self, claims: &Claims, kind: WhKind, id: &WhId) -> ServiceResult<()> {
        self.fetch_editable(claims, kind, id).await?;
        self.repo.delete(kind, id).await?;
        info!(%kind, %id, "wh deleted");
        Ok(())
    }

    pub async fn get_full_item(&self, claims: &Claims, id: &WhId) -> ServiceResult<ItemFullView> {
        let item = self.get(claims, WhKind::Item, id).await?;
        let mut full = self.resolve_items(claims, vec![item]).await?;
        full.pop().ok_or(ServiceError::NotFound)
    }

    pub async fn list_full_items(&self, claims: &Claims) -> ServiceResult<Vec<ItemFullView>> {
        let items = self.list(claims, WhKind::Item).await?;
        self.resolve_items(claims, items).await
    }

    /// Inserts fixed development records as they are, owner included.
    /// Records whose id is already taken are left untouched.
    pub async fn seed(&self, records: Vec<Wh>) -> ServiceResult<usize> {
        let mut count = 0;
        for wh in records {
            self.validator.validate_payload(&wh.payload)?;
            if self.repo.find(wh.kind(), &wh.id).await?.is_some() {
                continue;
            }
            self.repo.insert(wh).await?;
            count += 1;
        }
        Ok(count)
    }

    /// Character generation tables. Readable by anyone, including anonymous callers.
    pub async fn generation_props(&self) -> ServiceResult<GenerationProps> {
        self.repo
            .generation_props()
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Stores the generation tables unless a version is already present.
    pub async fn seed_generation_props(&self, props: GenerationProps) -> ServiceResult<bool> {
        self.validator.validate_generation(&props)?;
        if self.repo.generation_props().await?.is_some() {
            return Ok(false);
        }
        self.repo.store_generation_props(props).await?;
        info!("generation props seeded");
        Ok(true)
    }

    async fn find_visible(
        &self,
        claims: &Claims,
        kind: WhKind,
        ids: Option<&[WhId]>,
    ) -> ServiceResult<Vec<WhView>> {
        let filter = OwnerFilter::for_claims(claims);
        let found = self.repo.find_visible(kind, &filter, ids).await?;
        Ok(found
            .into_iter()
            .map(|wh| WhView::for_claims(wh, claims))
            .collect())
    }

    async fn fetch_visible(&self, claims: &Claims, kind: WhKind, id: &WhId) -> ServiceResult<Wh> {
        self.repo
            .find(kind, id)
            .await?
            .filter(|wh| ownership::is_visible(claims, &wh.owner, wh.shared()))
            .ok_or(ServiceError::NotFound)
    }

    /// Precondition shared by update and delete. An object the caller can
    /// neither see nor edit is `NotFound`; one it can see but not edit is
    /// `Unauthorized`.
    async fn fetch_editable(&self, claims: &Claims, kind: WhKind, id: &WhId) -> ServiceResult<Wh> {
        claims.ensure_authenticated()?;
        let wh = self
            .repo
            .find(kind, id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if ownership::can_edit(claims, &wh.owner) {
            return Ok(wh);
        }
        if ownership::is_visible(claims, &wh.owner, wh.shared()) {
            Err(ServiceError::Unauthorized)
        } else {
            Err(ServiceError::NotFound)
        }
    }

    async fn resolve_items(
        &self,
        claims: &Claims,
        items: Vec<WhView>,
    ) -> ServiceResult<Vec<ItemFullView>> {
        let mut property_ids: Vec<WhId> = Vec::new();
        let mut spell_ids: Vec<WhId> = Vec::new();
        for view in &items {
            if let WhPayload::Item(item) = &view.object {
                property_ids.extend(item.properties.iter().cloned());
                spell_ids.extend(item.spell_ids().iter().cloned());
            }
        }
        property_ids.sort();
        property_ids.dedup();
        spell_ids.sort();
        spell_ids.dedup();

        let (properties, spells) = try_join(
            self.list_by_ids(claims, WhKind::Property, &property_ids),
            self.list_by_ids(claims, WhKind::Spell, &spell_ids),
        )
        .await?;
        let properties: HashMap<WhId, WhView> =
            properties.into_iter().map(|v| (v.id.clone(), v)).collect();
        let spells: HashMap<WhId, WhView> = spells.into_iter().map(|v| (v.id.clone(), v)).collect();

        Ok(items
            .into_iter()
            .filter_map(|view| {
                let WhPayload::Item(item) = view.object else {
                    return None;
                };
                let resolved_properties = item
                    .properties
                    .iter()
                    .filter_map(|id| properties.get(id).cloned())
                    .collect();
                let resolved_spells = item
                    .spell_ids()
                    .iter()
                    .filter_map(|id| spells.get(id).cloned())
                    .collect();
                Some(ItemFullView::assemble(
                    view.id,
                    view.owner_id,
                    view.can_edit,
                    item,
                    resolved_properties,
                    resolved_spells,
                ))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::UserId;
    use crate::ownership::Owner;
    use crate::testing::TestContext;
    use crate::wh::{Grimoire, RandomTalent, WhItem, WhMutation, WhProperty, WhSpell};

    fn spell(name: &str, shared: bool) -> WhPayload {
        WhPayload::Spell(WhSpell {
            name: name.to_string(),
            cn: 3,
            shared,
            ..Default::default()
        })
    }

    fn mutation(name: &str) -> WhPayload {
        WhPayload::Mutation(WhMutation {
            name: name.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn non_admin_creates_owned_editable_object() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;

        let created = ctx.wh.create(&alice, spell("Dart", false)).await.unwrap();
        assert_eq!(created.owner_id, Owner::User(alice.user_id().unwrap().clone()));
        assert!(created.can_edit);

        let fetched = ctx.wh.get(&alice, WhKind::Spell, &created.id).await.unwrap();
        assert_eq!(fetched.object, spell("Dart", false));
        assert!(fetched.can_edit);
    }

    #[tokio::test]
    async fn anonymous_cannot_mutate() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let created = ctx.wh.create(&alice, spell("Dart", true)).await.unwrap();
        let anon = Claims::anonymous();

        assert!(matches!(
            ctx.wh.create(&anon, spell("Bolt", false)).await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            ctx.wh
                .update(&anon, WhKind::Spell, &created.id, spell("Bolt", false))
                .await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            ctx.wh.delete(&anon, WhKind::Spell, &created.id).await,
            Err(ServiceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let bad = WhPayload::Spell(WhSpell {
            cn: 500,
            ..Default::default()
        });
        assert!(matches!(
            ctx.wh.create(&alice, bad).await,
            Err(ServiceError::InvalidArguments(_))
        ));
        assert!(ctx.wh.list(&alice, WhKind::Spell).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn hidden_and_missing_are_indistinguishable() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let bob = ctx.user("bob@example.com").await;
        let private = ctx.wh.create(&alice, spell("Secret", false)).await.unwrap();

        let hidden = ctx.wh.get(&bob, WhKind::Spell, &private.id).await.unwrap_err();
        let missing = ctx
            .wh
            .get(&bob, WhKind::Spell, &WhId::from("nope"))
            .await
            .unwrap_err();
        assert!(matches!(hidden, ServiceError::NotFound));
        assert!(matches!(missing, ServiceError::NotFound));

        assert!(matches!(
            ctx.wh
                .update(&bob, WhKind::Spell, &private.id, spell("Mine now", false))
                .await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn sharing_grants_read_but_not_write() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let bob = ctx.user_sharing_with("bob@example.com", &["alice@example.com"]).await;

        let s1 = ctx.wh.create(&alice, spell("S1", false)).await.unwrap();
        assert!(matches!(
            ctx.wh.get(&bob, WhKind::Spell, &s1.id).await,
            Err(ServiceError::NotFound)
        ));

        ctx.wh
            .update(&alice, WhKind::Spell, &s1.id, spell("S1", true))
            .await
            .unwrap();
        let seen = ctx.wh.get(&bob, WhKind::Spell, &s1.id).await.unwrap();
        assert!(!seen.can_edit);

        assert!(matches!(
            ctx.wh
                .update(&bob, WhKind::Spell, &s1.id, spell("Defaced", true))
                .await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            ctx.wh.delete(&bob, WhKind::Spell, &s1.id).await,
            Err(ServiceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn admin_content_is_canonical_and_visible_to_all() {
        let ctx = TestContext::new();
        let admin = ctx.admin("admin@example.com").await;
        let user = ctx.user("user@example.com").await;

        let m1 = ctx.wh.create(&admin, mutation("M1")).await.unwrap();
        assert_eq!(m1.owner_id, Owner::Canonical);

        let as_user = ctx.wh.list(&user, WhKind::Mutation).await.unwrap();
        assert_eq!(as_user.len(), 1);
        assert!(!as_user[0].can_edit);

        let as_admin = ctx.wh.list(&admin, WhKind::Mutation).await.unwrap();
        assert_eq!(as_admin.len(), 1);
        assert!(as_admin[0].can_edit);

        let as_anon = ctx.wh.list(&Claims::anonymous(), WhKind::Mutation).await.unwrap();
        assert_eq!(as_anon.len(), 1);
        assert!(!as_anon[0].can_edit);
    }

    #[tokio::test]
    async fn update_keeps_owner_and_delete_removes() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let admin = ctx.admin("admin@example.com").await;
        let created = ctx.wh.create(&alice, mutation("Tail")).await.unwrap();

        let updated = ctx
            .wh
            .update(&admin, WhKind::Mutation, &created.id, mutation("Long Tail"))
            .await
            .unwrap();
        assert_eq!(updated.owner_id, created.owner_id);
        assert!(updated.can_edit);

        let wrong_kind = ctx
            .wh
            .update(&alice, WhKind::Mutation, &created.id, spell("x", false))
            .await
            .unwrap_err();
        assert!(matches!(wrong_kind, ServiceError::InvalidArguments(_)));

        ctx.wh
            .delete(&alice, WhKind::Mutation, &created.id)
            .await
            .unwrap();
        assert!(matches!(
            ctx.wh.get(&alice, WhKind::Mutation, &created.id).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn full_items_resolve_only_visible_references() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let bob = ctx.user("bob@example.com").await;

        let fast = ctx
            .wh
            .create(
                &alice,
                WhPayload::Property(WhProperty {
                    name: "Fast".into(),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();
        let hidden = ctx
            .wh
            .create(
                &bob,
                WhPayload::Property(WhProperty {
                    name: "Bob's".into(),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();
        let dart = ctx.wh.create(&alice, spell("Dart", false)).await.unwrap();

        let item = ctx
            .wh
            .create(
                &alice,
                WhPayload::Item(WhItem {
                    name: "Grimoire of Darts".into(),
                    item_type: 6,
                    properties: vec![fast.id.clone(), hidden.id.clone(), WhId::from("gone")],
                    grimoire: Some(Grimoire {
                        spells: vec![dart.id.clone()],
                    }),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();

        let full = ctx.wh.get_full_item(&alice, &item.id).await.unwrap();
        assert_eq!(full.properties.len(), 1);
        assert_eq!(full.properties[0].id, fast.id);
        assert_eq!(full.grimoire.as_ref().unwrap().spells.len(), 1);

        let all = ctx.wh.list_full_items(&alice).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(ctx.wh.list_full_items(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seed_keeps_owner_and_skips_existing() {
        let ctx = TestContext::new();
        let fixed = |id: &str, owner: Owner| Wh {
            id: WhId::from(id),
            owner,
            payload: mutation(id),
        };
        let records = vec![
            fixed("m1", Owner::Canonical),
            fixed("m2", Owner::User(UserId::from("u1"))),
        ];
        assert_eq!(ctx.wh.seed(records.clone()).await.unwrap(), 2);
        assert_eq!(ctx.wh.seed(records).await.unwrap(), 0);

        let listed = ctx.wh.list(&Claims::anonymous(), WhKind::Mutation).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_id, Owner::Canonical);
    }

    #[tokio::test]
    async fn generation_props_are_seeded_once() {
        let ctx = TestContext::new();
        assert!(matches!(
            ctx.wh.generation_props().await,
            Err(ServiceError::NotFound)
        ));

        let props = |name: &str| GenerationProps {
            name: name.to_string(),
            ..Default::default()
        };
        assert!(ctx.wh.seed_generation_props(props("first")).await.unwrap());
        assert!(!ctx.wh.seed_generation_props(props("second")).await.unwrap());
        assert_eq!(ctx.wh.generation_props().await.unwrap().name, "first");

        let mut invalid = props("third");
        invalid.random_talents.push(RandomTalent {
            id: WhId::from("t1"),
            min_roll: 90,
            max_roll: 10,
        });
        assert!(matches!(
            ctx.wh.seed_generation_props(invalid).await,
            Err(ServiceError::InvalidArguments(_))
        ));
    }
}
