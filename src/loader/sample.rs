//! Built-in sample catalog and element-themed starter decks

use crate::core::{Ability, AbilityTarget, CardDefinition, Element, ProblemCategory, ProblemHints};
use crate::loader::CardCatalog;
use crate::Result;

type AbilityRow = (&'static str, u8, u8, AbilityTarget);

/// key, name, cost, power, defense, difficulty, ability
type CardRow = (&'static str, &'static str, u8, u8, u8, u8, Option<AbilityRow>);

const FIRE: &[CardRow] = &[
    ("cinder-imp", "Cinder Imp", 1, 2, 1, 1, None),
    ("flame-juggler", "Flame Juggler", 2, 3, 2, 2, None),
    ("phoenix-hatchling", "Phoenix Hatchling", 3, 3, 3, 3, Some(("Rebirth Glow", 2, 2, AbilityTarget::SelfHeal))),
    ("blaze-sorcerer", "Blaze Sorcerer", 3, 2, 3, 4, Some(("Fireball", 2, 3, AbilityTarget::EnemyHero))),
    ("ember-drake", "Ember Drake", 4, 5, 3, 4, None),
    ("lava-golem", "Lava Golem", 5, 4, 7, 5, None),
    ("magma-titan", "Magma Titan", 7, 8, 7, 7, None),
    ("inferno-wyrm", "Inferno Wyrm", 9, 9, 8, 9, Some(("Firestorm", 4, 2, AbilityTarget::AllEnemies))),
];

const WATER: &[CardRow] = &[
    ("tide-sprite", "Tide Sprite", 1, 1, 2, 1, None),
    ("river-otter", "River Otter", 2, 2, 2, 2, None),
    ("coral-guard", "Coral Guard", 2, 1, 4, 2, None),
    ("mist-oracle", "Mist Oracle", 3, 2, 3, 3, None),
    ("healing-spring", "Healing Spring", 3, 1, 5, 3, Some(("Mend", 2, 4, AbilityTarget::SelfHeal))),
    ("frost-naga", "Frost Naga", 4, 4, 4, 5, Some(("Ice Lance", 2, 3, AbilityTarget::EnemyCreature))),
    ("kraken-spawn", "Kraken Spawn", 6, 6, 6, 6, None),
    ("tsunami-serpent", "Tsunami Serpent", 8, 8, 7, 8, None),
];

const EARTH: &[CardRow] = &[
    ("pebble-golem", "Pebble Golem", 1, 1, 3, 1, None),
    ("stone-ram", "Stone Ram", 2, 3, 2, 2, None),
    ("moss-troll", "Moss Troll", 3, 2, 5, 3, None),
    ("root-shaman", "Root Shaman", 3, 2, 4, 3, Some(("Regrowth", 2, 3, AbilityTarget::SelfHeal))),
    ("crystal-sage", "Crystal Sage", 4, 3, 4, 5, Some(("Quake", 3, 1, AbilityTarget::AllEnemies))),
    ("boulder-hurler", "Boulder Hurler", 5, 5, 4, 5, Some(("Rockslide", 2, 2, AbilityTarget::EnemyCreature))),
    ("ironbark-ent", "Ironbark Ent", 6, 5, 8, 6, None),
    ("canyon-behemoth", "Canyon Behemoth", 8, 7, 9, 8, None),
];

const AIR: &[CardRow] = &[
    ("zephyr-wisp", "Zephyr Wisp", 1, 2, 1, 1, None),
    ("breeze-scout", "Breeze Scout", 2, 1, 3, 2, None),
    ("gale-dancer", "Gale Dancer", 2, 2, 2, 2, None),
    ("sky-monk", "Sky Monk", 3, 2, 3, 3, None),
    ("storm-hawk", "Storm Hawk", 3, 4, 2, 4, None),
    ("thunder-roc", "Thunder Roc", 5, 6, 3, 6, Some(("Lightning", 2, 2, AbilityTarget::EnemyHero))),
    ("cloud-giant", "Cloud Giant", 6, 6, 6, 6, None),
    ("tempest-djinn", "Tempest Djinn", 8, 8, 6, 8, Some(("Cyclone", 4, 2, AbilityTarget::AllEnemies))),
];

/// Copies of each card in a starter deck, in catalog order
const DECK_COUNTS: [usize; 8] = [3, 3, 3, 3, 2, 2, 2, 2];

fn rows(element: Element) -> (&'static [CardRow], ProblemCategory) {
    match element {
        Element::Fire => (FIRE, ProblemCategory::Math),
        Element::Water => (WATER, ProblemCategory::Logic),
        Element::Earth => (EARTH, ProblemCategory::Science),
        Element::Air => (AIR, ProblemCategory::Logic),
    }
}

fn definition(row: &CardRow, element: Element, category: ProblemCategory) -> CardDefinition {
    let (key, name, cost, power, defense, difficulty, ability) = *row;
    CardDefinition {
        key: key.to_string(),
        name: name.to_string(),
        cost,
        power,
        defense,
        element,
        problem_category: category,
        problem_hints: ProblemHints {
            keywords: vec![element.to_string()],
            difficulty,
            subcategory: None,
        },
        ability: ability.map(|(name, mana_cost, damage, target)| Ability {
            name: name.to_string(),
            mana_cost,
            damage,
            target,
        }),
    }
}

/// Every sample card definition
pub fn sample_definitions() -> Vec<CardDefinition> {
    Element::ALL
        .into_iter()
        .flat_map(|element| {
            let (cards, category) = rows(element);
            cards.iter().map(move |row| definition(row, element, category))
        })
        .collect()
}

pub fn sample_catalog() -> Result<CardCatalog> {
    CardCatalog::from_definitions(sample_definitions())
}

/// A 20-card starter deck for an element
pub fn sample_deck(element: Element) -> Vec<CardDefinition> {
    let (cards, category) = rows(element);
    cards
        .iter()
        .zip(DECK_COUNTS)
        .flat_map(|(row, count)| std::iter::repeat(definition(row, element, category)).take(count))
        .collect()
}
