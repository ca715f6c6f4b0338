//! Core game types and entities

pub mod card;
pub mod deck;
pub mod entity;
pub mod mana;
pub mod player;
pub mod problem;

pub use card::{Ability, AbilityTarget, Card, CardDefinition, Element, ProblemCategory, ProblemHints};
pub use deck::{DeckEngine, DeckState, DrawOutcome};
pub use entity::{CardId, Side};
pub use mana::ManaPool;
pub use player::SideState;
pub use problem::{ArithmeticContentService, CardStats, ContentService, Problem, ProblemRequest};
