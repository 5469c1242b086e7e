//! Fixed development data, loaded at startup when `SEED_MOCK_DATA` is set.

use tracing::info;

use crate::error::ServiceResult;
use crate::id::{UserId, WhId};
use crate::ownership::Owner;
use crate::services::{SeedUser, UserService, WhService};
use crate::wh::{
    Attributes, ClassItems, GenerationProps, Grimoire, IdNumber, Melee, Modifiers, RandomTalent,
    Source, Wh, WhItem, WhMutation, WhPayload, WhProperty, WhSpell,
};

pub const ADMIN_ID: &str = "000000000000000000000000";
pub const USER2_ID: &str = "000000000000000000000001";
pub const USER3_ID: &str = "000000000000000000000002";

pub fn users() -> Vec<SeedUser> {
    let seed = |id: &str, username: &str, password: &str, admin: bool, shared: &[&str]| SeedUser {
        id: UserId::from(id),
        username: username.to_string(),
        password: password.to_string(),
        admin,
        shared_accounts: shared.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        seed(ADMIN_ID, "user1@test.com", "123456", true, &[]),
        seed(USER2_ID, "user2@test.com", "789123", false, &["user1@test.com"]),
        seed(
            USER3_ID,
            "user3@test.com",
            "111111",
            false,
            &["user1@test.com", "user2@test.com"],
        ),
    ]
}

fn record(id: &str, owner: Owner, payload: WhPayload) -> Wh {
    Wh {
        id: WhId::from(id),
        owner,
        payload,
    }
}

fn user(id: &str) -> Owner {
    Owner::User(UserId::from(id))
}

fn source(entries: &[(&str, &str)]) -> Source {
    entries
        .iter()
        .map(|(code, page)| (code.to_string(), page.to_string()))
        .collect()
}

fn mutations() -> Vec<Wh> {
    vec![
        record(
            "100000000000000000000000",
            user(ADMIN_ID),
            WhPayload::Mutation(WhMutation {
                name: "mutation 1".into(),
                description: "owned by user1".into(),
                mutation_type: 0,
                modifiers: Modifiers {
                    size: 1,
                    movement: 1,
                    attributes: Attributes {
                        ws: 1,
                        bs: 2,
                        s: 3,
                        t: 4,
                        i: 5,
                        ag: 6,
                        dex: 7,
                        int: 8,
                        wp: 9,
                        fel: 10,
                    },
                },
                shared: true,
                ..Default::default()
            }),
        ),
        record(
            "100000000000000000000001",
            user(USER2_ID),
            WhPayload::Mutation(WhMutation {
                name: "mutation 2".into(),
                description: "owned by user2".into(),
                mutation_type: 1,
                ..Default::default()
            }),
        ),
    ]
}

fn spells() -> Vec<Wh> {
    vec![
        record(
            "200000000000000000000000",
            Owner::Canonical,
            WhPayload::Spell(WhSpell {
                name: "spell 0".into(),
                description: "owned by admin".into(),
                cn: 1,
                range: "10".into(),
                target: "2".into(),
                duration: "5".into(),
                ..Default::default()
            }),
        ),
        record(
            "200000000000000000000001",
            Owner::Canonical,
            WhPayload::Spell(WhSpell {
                name: "spell 1".into(),
                description: "owned by admin shared".into(),
                shared: true,
                ..Default::default()
            }),
        ),
        record(
            "200000000000000000000002",
            user(ADMIN_ID),
            WhPayload::Spell(WhSpell {
                name: "spell 2".into(),
                description: "owned by user1@test.com".into(),
                ..Default::default()
            }),
        ),
    ]
}

fn properties() -> Vec<Wh> {
    vec![
        record(
            "300000000000000000000000",
            Owner::Canonical,
            WhPayload::Property(WhProperty {
                name: "property 0".into(),
                description: "owned by admin".into(),
                property_type: 0,
                applicable_to: vec![0, 1],
                shared: true,
                ..Default::default()
            }),
        ),
        record(
            "300000000000000000000001",
            user(ADMIN_ID),
            WhPayload::Property(WhProperty {
                name: "property 1".into(),
                description: "owned by user1@test.com".into(),
                property_type: 1,
                applicable_to: vec![0],
                source: source(&[("1", "p. 296")]),
                ..Default::default()
            }),
        ),
    ]
}

fn items() -> Vec<Wh> {
    vec![
        record(
            "400000000000000000000000",
            user(ADMIN_ID),
            WhPayload::Item(WhItem {
                name: "melee item".into(),
                description: "owned by user1@test.com".into(),
                price: 2.31,
                enc: 1.5,
                properties: vec![
                    WhId::from("300000000000000000000000"),
                    WhId::from("300000000000000000000001"),
                ],
                item_type: 0,
                melee: Some(Melee {
                    hands: 1,
                    dmg: 5,
                    dmg_sb_mult: 1.0,
                    reach: 3,
                    group: 0,
                }),
                shared: true,
                source: source(&[("2", "g"), ("3", "f")]),
                ..Default::default()
            }),
        ),
        record(
            "400000000000000000000001",
            Owner::Canonical,
            WhPayload::Item(WhItem {
                name: "grimoire".into(),
                description: "owned by admin".into(),
                price: 10.0,
                enc: 0.5,
                item_type: 6,
                grimoire: Some(Grimoire {
                    spells: vec![
                        WhId::from("200000000000000000000000"),
                        WhId::from("200000000000000000000002"),
                    ],
                }),
                ..Default::default()
            }),
        ),
    ]
}

pub fn wh_records() -> Vec<Wh> {
    [mutations(), spells(), properties(), items()].concat()
}

fn item(id: &str, number: i32) -> IdNumber {
    IdNumber {
        id: WhId::from(id),
        number,
    }
}

fn ids(values: &[&str]) -> Vec<WhId> {
    values.iter().map(|id| WhId::from(*id)).collect()
}

pub fn generation_props() -> GenerationProps {
    let mut props = GenerationProps {
        name: "generationProps".into(),
        ..Default::default()
    };
    props.class_items.insert(
        "0".into(),
        ClassItems {
            equipped: vec![item("400000000000000000000000", 1)],
            carried: vec![item("400000000000000000000001", 1)],
        },
    );
    props.class_items.insert(
        "7".into(),
        ClassItems {
            equipped: vec![item("400000000000000000000000", 2)],
            carried: vec![],
        },
    );
    props.random_talents = vec![
        RandomTalent {
            id: WhId::from("500000000000000000000000"),
            min_roll: 1,
            max_roll: 50,
        },
        RandomTalent {
            id: WhId::from("500000000000000000000001"),
            min_roll: 51,
            max_roll: 100,
        },
    ];
    props.species_talents.insert(
        "0000".into(),
        vec![
            ids(&["500000000000000000000000", "500000000000000000000001"]),
            ids(&["500000000000000000000002"]),
        ],
    );
    props.species_skills.insert(
        "0000".into(),
        ids(&["600000000000000000000000", "600000000000000000000001"]),
    );
    props
}

/// Loads the fixed accounts, objects and generation tables. Safe to run on every start.
pub async fn load(users: &UserService, wh: &WhService) -> ServiceResult<()> {
    let user_count = users.seed(self::users()).await?;
    let wh_count = wh.seed(wh_records()).await?;
    let generation = wh.seed_generation_props(generation_props()).await?;
    info!(users = user_count, wh = wh_count, generation, "mock data seeded");
    Ok(())
}
