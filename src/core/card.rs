//! Card definitions and per-match card instances

use crate::core::CardId;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest value a card stat may take
pub const MIN_STAT: u8 = 1;
/// Highest value a card stat may take
pub const MAX_STAT: u8 = 10;

/// Elemental affinity of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
}

impl Element {
    pub const ALL: [Element; 4] = [Element::Fire, Element::Water, Element::Earth, Element::Air];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Earth => "earth",
            Element::Air => "air",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of problem a card's combat is gated by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemCategory {
    Math,
    Logic,
    Science,
}

impl fmt::Display for ProblemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProblemCategory::Math => "math",
            ProblemCategory::Logic => "logic",
            ProblemCategory::Science => "science",
        })
    }
}

/// Hints used to request a problem themed to the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemHints {
    #[serde(default)]
    pub keywords: Vec<String>,

    /// 1 (easy) to 10 (hard)
    pub difficulty: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

impl Default for ProblemHints {
    fn default() -> Self {
        ProblemHints {
            keywords: Vec::new(),
            difficulty: 3,
            subcategory: None,
        }
    }
}

/// What a creature ability hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityTarget {
    /// Direct damage to the enemy side's health
    EnemyHero,
    /// Restore the controller's health
    SelfHeal,
    /// Reduce the defense of every enemy creature
    AllEnemies,
    /// Reduce the defense of one chosen enemy creature
    EnemyCreature,
}

/// Mana-gated creature ability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub mana_cost: u8,
    /// Damage dealt, health restored, or defense removed depending on target
    pub damage: u8,
    pub target: AbilityTarget,
}

/// Immutable catalog entry for a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Catalog key (e.g. "ember-drake")
    pub key: String,
    pub name: String,
    pub cost: u8,
    pub power: u8,
    pub defense: u8,
    pub element: Element,
    pub problem_category: ProblemCategory,
    #[serde(default)]
    pub problem_hints: ProblemHints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<Ability>,
}

impl CardDefinition {
    /// Check stat bounds and ability sanity
    pub fn validate(&self) -> Result<()> {
        let in_bounds = |v: u8| (MIN_STAT..=MAX_STAT).contains(&v);

        if self.key.trim().is_empty() {
            return Err(DuelError::InvalidCard(format!("card '{}' has an empty key", self.name)));
        }
        for (stat, value) in [("cost", self.cost), ("power", self.power), ("defense", self.defense)] {
            if !in_bounds(value) {
                return Err(DuelError::InvalidCard(format!(
                    "{}: {stat} {value} is outside {MIN_STAT}-{MAX_STAT}",
                    self.key
                )));
            }
        }
        if !in_bounds(self.problem_hints.difficulty) {
            return Err(DuelError::InvalidCard(format!(
                "{}: difficulty {} is outside {MIN_STAT}-{MAX_STAT}",
                self.key, self.problem_hints.difficulty
            )));
        }
        if let Some(ability) = &self.ability {
            if !in_bounds(ability.mana_cost) {
                return Err(DuelError::InvalidCard(format!(
                    "{}: ability cost {} is outside {MIN_STAT}-{MAX_STAT}",
                    self.key, ability.mana_cost
                )));
            }
            if ability.damage == 0 {
                return Err(DuelError::InvalidCard(format!(
                    "{}: ability '{}' has no effect",
                    self.key, ability.name
                )));
            }
        }
        Ok(())
    }
}

/// A card instance within one match
///
/// Copies the catalog stats and overlays the runtime flags. Defense can be
/// worn down by abilities, so it is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub key: String,
    pub name: String,
    pub cost: u8,
    pub power: i32,
    pub defense: i32,
    pub element: Element,
    pub problem_category: ProblemCategory,
    pub problem_hints: ProblemHints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<Ability>,

    /// False on the turn the creature enters play
    pub can_attack: bool,

    /// Exhausted for the rest of the turn
    pub is_tapped: bool,

    pub ability_used_this_turn: bool,
}

impl Card {
    pub fn from_definition(id: CardId, def: &CardDefinition) -> Self {
        Card {
            id,
            key: def.key.clone(),
            name: def.name.clone(),
            cost: def.cost,
            power: i32::from(def.power),
            defense: i32::from(def.defense),
            element: def.element,
            problem_category: def.problem_category,
            problem_hints: def.problem_hints.clone(),
            ability: def.ability.clone(),
            can_attack: false,
            is_tapped: false,
            ability_used_this_turn: false,
        }
    }

    /// Reset runtime flags as the card enters the board
    pub fn enter_play(&mut self) {
        self.can_attack = false;
        self.is_tapped = false;
        self.ability_used_this_turn = false;
    }

    pub fn tap(&mut self) {
        self.is_tapped = true;
    }

    pub fn untap(&mut self) {
        self.is_tapped = false;
    }

    /// Can this creature be declared as an attacker right now?
    pub fn ready_to_attack(&self) -> bool {
        self.can_attack && !self.is_tapped
    }

    pub fn has_usable_ability(&self) -> bool {
        self.ability.is_some() && !self.ability_used_this_turn
    }
}
