//! Complete match state
//!
//! `ExtendedGameState` is a plain value: the orchestrator clones it,
//! mutates the clone and hands it back. Everything a match needs to resume
//! is serialized with it, including the shuffle RNG.

use crate::config::DuelConfig;
use crate::core::{CardDefinition, CardId, DeckEngine, DeckState, Side, SideState};
use crate::game::{CombatState, GameAction, Phase};
use crate::{DuelError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a combat is in progress
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "combat", rename_all = "snake_case")]
pub enum CombatPhase {
    #[default]
    NoCombat,
    Active(CombatState),
}

/// How a finished match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The player side won
    Player,
    /// The opponent side won
    Opponent,
    /// Both sides reached zero health together
    Draw,
}

impl Outcome {
    pub fn winner(side: Side) -> Self {
        match side {
            Side::Player => Outcome::Player,
            Side::Opponent => Outcome::Opponent,
        }
    }

    /// The winning side, or None for a draw
    pub fn winning_side(&self) -> Option<Side> {
        match self {
            Outcome::Player => Some(Side::Player),
            Outcome::Opponent => Some(Side::Opponent),
            Outcome::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Player => "player",
            Outcome::Opponent => "opponent",
            Outcome::Draw => "draw",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedGameState {
    /// Starts at 1 and increments at every turn start
    pub turn_number: u32,

    pub active_player: Side,

    pub current_phase: Phase,

    pub player: SideState,

    pub opponent: SideState,

    pub combat: CombatPhase,

    /// Actions taken during the current turn
    pub action_log: Vec<GameAction>,

    /// Set once, when the match ends
    pub winner: Option<Outcome>,

    /// Match RNG, serialized so resumed matches continue the same stream
    pub rng: ChaCha12Rng,

    /// Next card instance id
    next_card_id: u32,
}

impl ExtendedGameState {
    /// Empty match: no decks, no turn started yet
    pub fn new(seed: u64, starting_health: i32) -> Self {
        ExtendedGameState {
            turn_number: 0,
            active_player: Side::Player,
            current_phase: Phase::Untap,
            player: SideState::new(Side::Player, starting_health, DeckState::default()),
            opponent: SideState::new(Side::Opponent, starting_health, DeckState::default()),
            combat: CombatPhase::NoCombat,
            action_log: Vec::new(),
            winner: None,
            rng: ChaCha12Rng::seed_from_u64(seed),
            next_card_id: 1,
        }
    }

    /// Instantiate a deck list for a side and shuffle it with the match RNG
    pub fn install_deck(&mut self, side: Side, definitions: &[CardDefinition]) {
        let cards = DeckEngine::instantiate(definitions, self.next_card_id);
        self.next_card_id += cards.len() as u32;
        let deck = DeckEngine::initialize_deck(cards, &mut self.rng);
        self.side_mut(side).deck = deck;
    }

    pub fn side(&self, side: Side) -> &SideState {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    pub fn defending_player(&self) -> Side {
        self.active_player.other()
    }

    pub fn combat(&self) -> Option<&CombatState> {
        match &self.combat {
            CombatPhase::Active(combat) => Some(combat),
            CombatPhase::NoCombat => None,
        }
    }

    pub fn combat_mut(&mut self) -> Option<&mut CombatState> {
        match &mut self.combat {
            CombatPhase::Active(combat) => Some(combat),
            CombatPhase::NoCombat => None,
        }
    }

    /// Which side must act next
    ///
    /// The defender chooses blocks. During combat damage the attacker answers
    /// first, then the defender answers for its blockers.
    pub fn deciding_side(&self) -> Side {
        match self.current_phase {
            Phase::DeclareBlockers => self.defending_player(),
            Phase::CombatDamage => match self.combat() {
                Some(c) if !c.has_unanswered_attackers() && c.has_unanswered_blockers() => {
                    self.defending_player()
                }
                _ => self.active_player,
            },
            _ => self.active_player,
        }
    }

    /// Outcome implied by current health, whether or not it was recorded
    pub fn is_game_over(&self) -> Option<Outcome> {
        if let Some(outcome) = self.winner {
            return Some(outcome);
        }
        match (self.player.is_defeated(), self.opponent.is_defeated()) {
            (true, true) => Some(Outcome::Draw),
            (true, false) => Some(Outcome::Opponent),
            (false, true) => Some(Outcome::Player),
            (false, false) => None,
        }
    }

    /// Lower a side's health, clamped at zero
    pub fn apply_damage(&mut self, side: Side, amount: i32) {
        self.side_mut(side).take_damage(amount);
    }

    /// Actions of a given side logged this turn
    pub fn actions_this_turn(&self, side: Side) -> impl Iterator<Item = &GameAction> {
        self.action_log.iter().filter(move |a| a.player == side)
    }

    /// Check structural invariants of a loaded or freshly mutated state
    pub fn check_invariants(&self, config: &DuelConfig) -> Result<()> {
        let corrupt = |msg: String| Err(DuelError::StateCorruption(msg));

        if self.turn_number == 0 {
            return corrupt("match has not started".to_string());
        }
        if self.current_phase.is_automatic() {
            return corrupt(format!("state rests in automatic phase {}", self.current_phase));
        }

        for side in [Side::Player, Side::Opponent] {
            let s = self.side(side);
            if s.side != side {
                return corrupt(format!("{side} slot holds {} state", s.side));
            }
            if s.health < 0 {
                return corrupt(format!("{side} health is negative"));
            }
            if s.mana.current > s.mana.max || s.mana.max > config.mana_cap {
                return corrupt(format!(
                    "{side} mana {}/{} exceeds cap {}",
                    s.mana.current, s.mana.max, config.mana_cap
                ));
            }
            if s.board.len() > config.board_limit {
                return corrupt(format!("{side} board holds {} creatures", s.board.len()));
            }
        }

        let mut seen = FxHashSet::default();
        for side in [&self.player, &self.opponent] {
            let ids = side
                .hand
                .iter()
                .chain(side.board.iter())
                .chain(side.deck.cards.iter())
                .map(|c| c.id);
            for id in ids {
                if !seen.insert(id) {
                    return corrupt(format!("card {id} appears in more than one zone"));
                }
            }
        }

        match (&self.combat, self.current_phase.is_combat()) {
            (CombatPhase::Active(_), false) => {
                return corrupt(format!("combat is active during {}", self.current_phase));
            }
            (CombatPhase::NoCombat, true) => {
                return corrupt(format!("no combat state during {}", self.current_phase));
            }
            _ => {}
        }

        if let Some(combat) = self.combat() {
            let attackers = self.side(self.active_player);
            let defenders = self.side(self.defending_player());
            let mut blocked: FxHashSet<CardId> = FxHashSet::default();
            for decl in &combat.attackers {
                if attackers.board_card(decl.attacker_id).is_none() {
                    return corrupt(format!("attacker {} is not on the board", decl.attacker_id));
                }
            }
            for decl in &combat.blockers {
                if !combat.is_attacking(decl.attacker_id) {
                    return corrupt(format!(
                        "blocker {} references {}, which is not attacking",
                        decl.blocker_id, decl.attacker_id
                    ));
                }
                if defenders.board_card(decl.blocker_id).is_none() {
                    return corrupt(format!("blocker {} is not on the board", decl.blocker_id));
                }
                if !blocked.insert(decl.attacker_id) {
                    return corrupt(format!("attacker {} is blocked twice", decl.attacker_id));
                }
            }
        }

        Ok(())
    }
}
