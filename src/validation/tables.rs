//! Per-kind rule tables.

use std::collections::BTreeMap;

use super::predicates::{Check, Violation, each, id, one_of, range};
use super::{FieldRule, Validator};
use crate::wh::{
    AMMUNITION_GROUPS, ARMOUR_GROUPS, ARMOUR_LOCATIONS, Attributes, CLASSES, GenerationProps,
    ITEM_HANDS, ITEM_TYPES, IdNumber, MELEE_GROUPS, MELEE_REACH, MUTATION_TYPES, PROPERTY_TYPES,
    RANGED_GROUPS, SPECIES, STATUS_TIERS, WhCharacter, WhItem, WhMutation, WhProperty, WhSpell,
};
use crate::id::WhId;

fn attributes(attrs: &Attributes, min: i32, max: i32) -> Check {
    each(&attrs.values(), |value| range(*value, min, max))
}

fn ids(values: &[WhId]) -> Check {
    each(values, |value| id(value.as_str()))
}

fn id_numbers(values: &[IdNumber]) -> Check {
    each(values, |entry| {
        id(entry.id.as_str())?;
        range(entry.number, 1, 1000)
    })
}

/// Every key must be one of `allowed`; values are checked with `check`.
fn keyed<T>(map: &BTreeMap<String, T>, allowed: &[&str], check: impl Fn(&T) -> Check) -> Check {
    for (key, value) in map {
        one_of(&key.as_str(), allowed)?;
        check(value).map_err(|v| Violation(format!("{key}: {}", v.0)))?;
    }
    Ok(())
}

fn optional<T>(value: &Option<T>, check: impl Fn(&T) -> Check) -> Check {
    value.as_ref().map_or(Ok(()), check)
}

pub(super) const MUTATION: &[FieldRule<WhMutation>] = &[
    FieldRule { field: "name", check: |m, v| v.name(&m.name) },
    FieldRule { field: "description", check: |m, v| v.description(&m.description) },
    FieldRule { field: "type", check: |m, _| one_of(&m.mutation_type, MUTATION_TYPES) },
    FieldRule { field: "modifiers.size", check: |m, _| range(m.modifiers.size, -3, 3) },
    FieldRule { field: "modifiers.movement", check: |m, _| range(m.modifiers.movement, -3, 3) },
    FieldRule {
        field: "modifiers.attributes",
        check: |m, _| attributes(&m.modifiers.attributes, -99, 99),
    },
    FieldRule { field: "source", check: |m, v| v.source(&m.source) },
];

pub(super) const SPELL: &[FieldRule<WhSpell>] = &[
    FieldRule { field: "name", check: |s, v| v.name(&s.name) },
    FieldRule { field: "description", check: |s, v| v.description(&s.description) },
    FieldRule { field: "cn", check: |s, _| range(s.cn, -1, 99) },
    FieldRule { field: "range", check: |s, v| v.medium_text(&s.range) },
    FieldRule { field: "target", check: |s, v| v.medium_text(&s.target) },
    FieldRule { field: "duration", check: |s, v| v.medium_text(&s.duration) },
    FieldRule { field: "source", check: |s, v| v.source(&s.source) },
];

pub(super) const PROPERTY: &[FieldRule<WhProperty>] = &[
    FieldRule { field: "name", check: |p, v| v.name(&p.name) },
    FieldRule { field: "description", check: |p, v| v.description(&p.description) },
    FieldRule { field: "type", check: |p, _| one_of(&p.property_type, PROPERTY_TYPES) },
    FieldRule {
        field: "applicableTo",
        check: |p, _| each(&p.applicable_to, |t| one_of(t, ITEM_TYPES)),
    },
    FieldRule { field: "source", check: |p, v| v.source(&p.source) },
];

pub(super) const ITEM: &[FieldRule<WhItem>] = &[
    FieldRule { field: "name", check: |i, v| v.name(&i.name) },
    FieldRule { field: "description", check: |i, v| v.description(&i.description) },
    FieldRule { field: "price", check: |i, _| range(i.price, 0.0, 1_000_000_000.0) },
    FieldRule { field: "enc", check: |i, _| range(i.enc, 0.0, 1000.0) },
    FieldRule { field: "properties", check: |i, _| ids(&i.properties) },
    FieldRule { field: "type", check: |i, _| one_of(&i.item_type, ITEM_TYPES) },
    FieldRule {
        field: "melee",
        check: |i, _| {
            optional(&i.melee, |m| {
                one_of(&m.hands, ITEM_HANDS)?;
                range(m.dmg, -100, 100)?;
                range(m.dmg_sb_mult, 0.0, 10.0)?;
                one_of(&m.reach, MELEE_REACH)?;
                one_of(&m.group, MELEE_GROUPS)
            })
        },
    },
    FieldRule {
        field: "ranged",
        check: |i, _| {
            optional(&i.ranged, |r| {
                one_of(&r.hands, ITEM_HANDS)?;
                range(r.dmg, -100, 100)?;
                range(r.dmg_sb_mult, 0.0, 10.0)?;
                range(r.rng, 0, 10_000)?;
                range(r.rng_sb_mult, 0.0, 10.0)?;
                one_of(&r.group, RANGED_GROUPS)
            })
        },
    },
    FieldRule {
        field: "ammunition",
        check: |i, _| {
            optional(&i.ammunition, |a| {
                range(a.dmg, -100, 100)?;
                range(a.rng, -10_000, 10_000)?;
                range(a.rng_mult, 0.0, 10.0)?;
                one_of(&a.group, AMMUNITION_GROUPS)
            })
        },
    },
    FieldRule {
        field: "armour",
        check: |i, _| {
            optional(&i.armour, |a| {
                range(a.points, 0, 100)?;
                each(&a.location, |l| one_of(l, ARMOUR_LOCATIONS))?;
                one_of(&a.group, ARMOUR_GROUPS)
            })
        },
    },
    FieldRule {
        field: "container",
        check: |i, _| optional(&i.container, |c| range(c.capacity, 0, 1000)),
    },
    FieldRule { field: "grimoire.spells", check: |i, _| ids(i.spell_ids()) },
    FieldRule { field: "source", check: |i, v| v.source(&i.source) },
];

pub(super) const CHARACTER: &[FieldRule<WhCharacter>] = &[
    FieldRule { field: "name", check: |c, v| v.name(&c.name) },
    FieldRule { field: "description", check: |c, v| v.description(&c.description) },
    FieldRule { field: "notes", check: |c, v| v.description(&c.notes) },
    FieldRule { field: "equippedItems", check: |c, _| id_numbers(&c.equipped_items) },
    FieldRule { field: "carriedItems", check: |c, _| id_numbers(&c.carried_items) },
    FieldRule { field: "storedItems", check: |c, _| id_numbers(&c.stored_items) },
    FieldRule { field: "skills", check: |c, _| id_numbers(&c.skills) },
    FieldRule { field: "talents", check: |c, _| id_numbers(&c.talents) },
    FieldRule { field: "species", check: |c, _| one_of(&c.species.as_str(), SPECIES) },
    FieldRule { field: "baseAttributes", check: |c, _| attributes(&c.base_attributes, 0, 99) },
    FieldRule {
        field: "attributeAdvances",
        check: |c, _| attributes(&c.attribute_advances, 0, 99),
    },
    FieldRule { field: "careerPath", check: |c, _| ids(&c.career_path) },
    FieldRule { field: "career", check: |c, _| optional(&c.career, |w| id(w.as_str())) },
    FieldRule { field: "fate", check: |c, _| range(c.fate, 0, 1000) },
    FieldRule { field: "fortune", check: |c, _| range(c.fortune, 0, 1000) },
    FieldRule { field: "resilience", check: |c, _| range(c.resilience, 0, 1000) },
    FieldRule { field: "resolve", check: |c, _| range(c.resolve, 0, 1000) },
    FieldRule { field: "currentExp", check: |c, _| range(c.current_exp, 0, 10_000_000) },
    FieldRule { field: "spentExp", check: |c, _| range(c.spent_exp, 0, 10_000_000) },
    FieldRule { field: "status", check: |c, _| one_of(&c.status, STATUS_TIERS) },
    FieldRule { field: "standing", check: |c, _| range(c.standing, 0, 7) },
    FieldRule { field: "brass", check: |c, _| range(c.brass, 0, 1_000_000) },
    FieldRule { field: "silver", check: |c, _| range(c.silver, 0, 1_000_000) },
    FieldRule { field: "gold", check: |c, _| range(c.gold, 0, 1_000_000) },
    FieldRule { field: "spells", check: |c, _| ids(&c.spells) },
    FieldRule { field: "sin", check: |c, _| range(c.sin, 0, 1000) },
    FieldRule { field: "corruption", check: |c, _| range(c.corruption, 0, 1000) },
    FieldRule { field: "mutations", check: |c, _| ids(&c.mutations) },
];

pub(super) const GENERATION: &[FieldRule<GenerationProps>] = &[
    FieldRule { field: "name", check: |g, v| v.name(&g.name) },
    FieldRule {
        field: "classItems",
        check: |g, _| {
            keyed(&g.class_items, CLASSES, |items| {
                id_numbers(&items.equipped)?;
                id_numbers(&items.carried)
            })
        },
    },
    FieldRule {
        field: "randomTalents",
        check: |g, _| {
            each(&g.random_talents, |talent| {
                id(talent.id.as_str())?;
                range(talent.min_roll, 1, 100)?;
                range(talent.max_roll, talent.min_roll, 100)
            })
        },
    },
    FieldRule {
        field: "speciesTalents",
        check: |g, _| keyed(&g.species_talents, SPECIES, |groups| each(groups, |group| ids(group))),
    },
    FieldRule {
        field: "speciesSkills",
        check: |g, _| keyed(&g.species_skills, SPECIES, |skills| ids(skills)),
    },
];
