//! Game rule and opponent configuration
//!
//! Defaults reproduce the standard ruleset. A config can be loaded from a
//! JSON file and then adjusted with the `with_*` builder methods (the CLI
//! applies its flags this way).

use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Rule-based opponent tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Guard against runaway play loops in a single main phase
    pub max_plays_per_turn: usize,

    /// Artificial pause between opponent actions (UX pacing only)
    pub think_delay_ms: u64,

    /// Upper bound on actions taken in one uninterrupted opponent walk
    pub max_actions_per_drive: usize,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        OpponentConfig {
            max_plays_per_turn: 5,
            think_delay_ms: 0,
            max_actions_per_drive: 200,
        }
    }
}

impl OpponentConfig {
    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }
}

/// Match configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Health each side starts the match with
    pub starting_health: i32,

    /// Heals never raise health above this
    pub heal_cap: i32,

    /// Maximum mana a side can grow to
    pub mana_cap: u8,

    /// Cards drawn into each hand when the match is created
    pub starting_hand_size: usize,

    /// Maximum creatures on one side's board
    pub board_limit: usize,

    /// Smallest legal deck
    pub deck_min: usize,

    /// Largest legal deck
    pub deck_max: usize,

    pub opponent: OpponentConfig,
}

impl Default for DuelConfig {
    fn default() -> Self {
        DuelConfig {
            starting_health: 20,
            heal_cap: 100,
            mana_cap: 10,
            starting_hand_size: 5,
            board_limit: 7,
            deck_min: 20,
            deck_max: 30,
            opponent: OpponentConfig::default(),
        }
    }
}

impl DuelConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: DuelConfig = serde_json::from_str(&json)
            .map_err(|e| DuelError::InvalidConfig(format!("{}: {e}", path.as_ref().display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_starting_health(mut self, health: i32) -> Self {
        self.starting_health = health;
        self
    }

    pub fn with_board_limit(mut self, limit: usize) -> Self {
        self.board_limit = limit;
        self
    }

    pub fn with_think_delay_ms(mut self, delay_ms: u64) -> Self {
        self.opponent.think_delay_ms = delay_ms;
        self
    }

    pub fn with_max_plays_per_turn(mut self, plays: usize) -> Self {
        self.opponent.max_plays_per_turn = plays;
        self
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.starting_health <= 0 {
            return Err(DuelError::InvalidConfig(
                "starting_health must be positive".to_string(),
            ));
        }
        if self.heal_cap < self.starting_health {
            return Err(DuelError::InvalidConfig(format!(
                "heal_cap ({}) is below starting_health ({})",
                self.heal_cap, self.starting_health
            )));
        }
        if self.mana_cap == 0 {
            return Err(DuelError::InvalidConfig("mana_cap must be at least 1".to_string()));
        }
        if self.board_limit == 0 {
            return Err(DuelError::InvalidConfig("board_limit must be at least 1".to_string()));
        }
        if self.deck_min > self.deck_max {
            return Err(DuelError::InvalidConfig(format!(
                "deck_min ({}) exceeds deck_max ({})",
                self.deck_min, self.deck_max
            )));
        }
        if self.starting_hand_size > self.deck_min {
            return Err(DuelError::InvalidConfig(format!(
                "starting_hand_size ({}) exceeds deck_min ({})",
                self.starting_hand_size, self.deck_min
            )));
        }
        if self.opponent.max_actions_per_drive == 0 {
            return Err(DuelError::InvalidConfig(
                "opponent.max_actions_per_drive must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
