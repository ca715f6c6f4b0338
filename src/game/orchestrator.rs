//! Turn orchestration
//!
//! `TurnOrchestrator` owns no match state. Each operation takes a state,
//! works on a clone and returns the new state together with the events it
//! produced. A rejected action returns an error and nothing else, so the
//! caller's state is untouched by construction.

use crate::config::DuelConfig;
use crate::core::{
    Card, CardDefinition, CardId, ContentService, DeckEngine, DrawOutcome, Problem, ProblemRequest, Side,
};
use crate::game::validator::ActionValidator;
use crate::game::{
    AbilityEngine, ActionKind, AttackerDeclaration, BlockerDeclaration, CombatPhase, CombatResolver,
    CombatState, ExtendedGameState, GameAction, GameEvent, GameLogger, Outcome, Phase, PhaseSequencer,
    VerbosityLevel,
};
use crate::{DuelError, Result};

/// Narration compiled out unless the `verbose-logging` feature is on
macro_rules! log_if_verbose {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self;
        }
    };
}

/// New state plus the events that produced it
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub state: ExtendedGameState,
    pub events: Vec<GameEvent>,
}

impl ActionOutcome {
    /// The winner, if this outcome ended the match
    pub fn game_ended(&self) -> Option<Outcome> {
        self.events.iter().find_map(|e| match e {
            GameEvent::GameEnded { winner } => Some(*winner),
            _ => None,
        })
    }
}

pub struct TurnOrchestrator<'a> {
    config: &'a DuelConfig,
    content: &'a dyn ContentService,
    logger: GameLogger,
}

impl<'a> TurnOrchestrator<'a> {
    /// Orchestrator with a silent logger
    pub fn new(config: &'a DuelConfig, content: &'a dyn ContentService) -> Self {
        TurnOrchestrator {
            config,
            content,
            logger: GameLogger::with_verbosity(VerbosityLevel::Silent),
        }
    }

    pub fn with_logger(mut self, logger: GameLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn config(&self) -> &DuelConfig {
        self.config
    }

    /// Create a match: validate both decks, shuffle them with the seeded
    /// match RNG, deal starting hands and start the player's first turn
    pub fn new_match(
        &self,
        player_deck: &[CardDefinition],
        opponent_deck: &[CardDefinition],
        seed: u64,
    ) -> Result<ActionOutcome> {
        self.config.validate()?;
        DeckEngine::validate_deck(player_deck, self.config.deck_min, self.config.deck_max)?;
        DeckEngine::validate_deck(opponent_deck, self.config.deck_min, self.config.deck_max)?;

        let mut state = ExtendedGameState::new(seed, self.config.starting_health);
        state.install_deck(Side::Player, player_deck);
        state.install_deck(Side::Opponent, opponent_deck);

        let mut events = Vec::new();
        for side in [Side::Player, Side::Opponent] {
            for _ in 0..self.config.starting_hand_size {
                self.draw(&mut state, side, &mut events);
            }
        }

        self.logger.normal(&format!(
            "Match created (seed {seed}): {} vs {} cards",
            player_deck.len(),
            opponent_deck.len()
        ));
        self.begin_turn(&mut state, &mut events);
        Ok(ActionOutcome { state, events })
    }

    /// Start a turn for the current active side
    pub fn start_turn(&self, state: &ExtendedGameState) -> ActionOutcome {
        let mut state = state.clone();
        let mut events = Vec::new();
        self.begin_turn(&mut state, &mut events);
        ActionOutcome { state, events }
    }

    /// Move to the next interactive phase, handing the turn over on wrap
    pub fn advance_phase(&self, state: &ExtendedGameState) -> ActionOutcome {
        let mut state = state.clone();
        let mut events = Vec::new();
        self.step_phase(&mut state, &mut events);
        ActionOutcome { state, events }
    }

    /// Apply direct damage to a side, ending the match if it was lethal
    pub fn apply_damage(&self, state: &ExtendedGameState, side: Side, amount: i32) -> ActionOutcome {
        let mut state = state.clone();
        let mut events = Vec::new();
        state.apply_damage(side, amount);
        self.finish_if_over(&mut state, &mut events);
        ActionOutcome { state, events }
    }

    pub fn is_game_over(&self, state: &ExtendedGameState) -> Option<Outcome> {
        state.is_game_over()
    }

    /// Validate and apply one action
    pub fn execute_action(&self, state: &ExtendedGameState, action: &GameAction) -> Result<ActionOutcome> {
        if let Err(e) = ActionValidator::new(self.config).validate(state, action) {
            log_if_verbose!(self, "Rejected {} from {}: {}", action.action_type(), action.player, e);
            return Err(e.into());
        }

        let mut next = state.clone();
        let mut events = Vec::new();
        next.action_log.push(action.clone());
        self.apply(&mut next, action, &mut events)?;
        self.finish_if_over(&mut next, &mut events);

        Ok(ActionOutcome {
            state: next,
            events,
        })
    }

    fn apply(&self, state: &mut ExtendedGameState, action: &GameAction, events: &mut Vec<GameEvent>) -> Result<()> {
        let side = action.player;
        match &action.action {
            ActionKind::PlayCard { card_id } => {
                let s = state.side_mut(side);
                let pos = s
                    .hand
                    .iter()
                    .position(|c| c.id == *card_id)
                    .ok_or_else(|| DuelError::StateCorruption(format!("validated card {card_id} vanished from hand")))?;
                let mut card = s.hand.remove(pos);
                s.mana.spend(card.cost);
                card.enter_play();
                self.logger.normal(&format!("{side} plays {} ({card_id})", card.name));
                events.push(GameEvent::CardPlayed {
                    side,
                    card_id: *card_id,
                    cost: card.cost,
                });
                s.board.push(card);
            }

            ActionKind::Attack {
                attacker_id,
                target,
                is_correct,
            } => {
                if let Some(card) = state.side_mut(side).board_card_mut(*attacker_id) {
                    card.tap();
                }
                state.side_mut(side).record_answer(*is_correct);
                events.push(GameEvent::AttackerDeclared {
                    side,
                    card_id: *attacker_id,
                    target: *target,
                });
                events.extend(CombatResolver::resolve_direct_attack(state, *attacker_id, *target, *is_correct));
            }

            ActionKind::DeclareAttacker { card_id, target } => {
                let card = self.board_card(state, side, *card_id)?;
                // Problem first: a failed request must leave the creature untapped
                let problem = self.request_problem(&card)?;
                if let Some(card) = state.side_mut(side).board_card_mut(*card_id) {
                    card.tap();
                }
                self.combat_mut(state)?
                    .declare_attacker(AttackerDeclaration::new(*card_id, *target, Some(problem)));
                log_if_verbose!(self, "{side} declares {} as attacker", card.name);
                events.push(GameEvent::AttackerDeclared {
                    side,
                    card_id: *card_id,
                    target: *target,
                });
            }

            ActionKind::ConfirmAttackers => {
                let no_attackers = state.combat().map_or(true, |c| c.attackers.is_empty());
                if no_attackers {
                    while state.current_phase != Phase::PostCombatMain {
                        self.step_phase(state, events);
                    }
                } else {
                    self.step_phase(state, events);
                }
            }

            ActionKind::DeclareBlocker {
                attacker_id,
                blocker_id,
            } => {
                let card = self.board_card(state, side, *blocker_id)?;
                let problem = self.request_problem(&card)?;
                self.combat_mut(state)?
                    .declare_blocker(BlockerDeclaration::new(*blocker_id, *attacker_id, Some(problem)));
                log_if_verbose!(self, "{side} blocks {attacker_id} with {}", card.name);
                events.push(GameEvent::BlockerDeclared {
                    side,
                    blocker_id: *blocker_id,
                    attacker_id: *attacker_id,
                });
            }

            ActionKind::SkipBlockers => self.step_phase(state, events),

            ActionKind::SubmitCombatAnswer {
                card_id,
                is_attacker,
                is_correct,
                response_time_ms,
            } => {
                self.combat_mut(state)?
                    .record_answer(*card_id, *is_attacker, *is_correct, *response_time_ms)?;
                state.side_mut(side).record_answer(*is_correct);
                events.push(GameEvent::CombatAnswered {
                    side,
                    card_id: *card_id,
                    is_correct: *is_correct,
                    response_time_ms: *response_time_ms,
                });

                if state.combat().is_some_and(CombatState::all_answered) {
                    let resolved = CombatResolver::resolve(state);
                    self.narrate_combat(&resolved);
                    events.extend(resolved);
                    // Combat closes even when the match just ended
                    self.step_phase(state, events);
                }
            }

            ActionKind::UseAbility { card_id, target_id } => {
                let used = AbilityEngine::activate(state, side, *card_id, *target_id, self.config.heal_cap);
                if let Some(GameEvent::AbilityUsed { target, amount, .. }) = used.first() {
                    self.logger.normal(&format!("{side} uses ability of {card_id} ({target:?}, {amount})"));
                }
                events.extend(used);
            }

            ActionKind::EndPhase => self.step_phase(state, events),

            ActionKind::PassTurn => {
                let passing = state.active_player;
                // A full turn never takes more than one lap of the phase cycle
                for _ in 0..Phase::ALL.len() {
                    self.step_phase(state, events);
                    if state.active_player != passing || state.winner.is_some() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// One transition of the phase cycle, running through automatic phases
    fn step_phase(&self, state: &mut ExtendedGameState, events: &mut Vec<GameEvent>) {
        loop {
            let from = state.current_phase;
            let to = PhaseSequencer::next_phase(from);

            if to == Phase::Untap {
                self.end_turn(state, events);
                self.begin_turn(state, events);
                return;
            }

            state.current_phase = to;
            match to {
                Phase::BeginCombat => state.combat = CombatPhase::Active(CombatState::new()),
                Phase::EndCombat => state.combat = CombatPhase::NoCombat,
                _ => {}
            }
            log_if_verbose!(self, "--- {} ---", to);
            events.push(GameEvent::PhaseChanged { from, to });

            if !to.is_automatic() {
                return;
            }
        }
    }

    /// Untap, upkeep and draw for the active side, collapsed into one step
    fn begin_turn(&self, state: &mut ExtendedGameState, events: &mut Vec<GameEvent>) {
        state.turn_number += 1;
        let side = state.active_player;
        let mana_cap = self.config.mana_cap;

        let s = state.side_mut(side);
        s.mana.grow_and_refill(mana_cap);
        for creature in s.board.iter_mut() {
            creature.untap();
            creature.can_attack = true;
            creature.ability_used_this_turn = false;
        }
        let mana = s.mana.max;

        self.logger
            .normal(&format!("Turn {} begins for {side} ({mana} mana)", state.turn_number));
        events.push(GameEvent::TurnStarted {
            turn_number: state.turn_number,
            side,
        });
        events.push(GameEvent::ManaRefilled { side, mana });

        self.draw(state, side, events);

        state.current_phase = Phase::PreCombatMain;
        state.combat = CombatPhase::NoCombat;
        state.action_log.clear();
        self.finish_if_over(state, events);
    }

    /// Cleanup on both boards, then hand the turn to the other side
    fn end_turn(&self, state: &mut ExtendedGameState, events: &mut Vec<GameEvent>) {
        for side in [Side::Player, Side::Opponent] {
            for creature in state.side_mut(side).board.iter_mut() {
                creature.untap();
                creature.can_attack = true;
                creature.ability_used_this_turn = false;
            }
        }
        state.combat = CombatPhase::NoCombat;
        events.push(GameEvent::TurnEnded {
            side: state.active_player,
        });
        state.active_player = state.active_player.other();
    }

    fn draw(&self, state: &mut ExtendedGameState, side: Side, events: &mut Vec<GameEvent>) {
        let s = state.side_mut(side);
        match DeckEngine::draw_card(&mut s.deck) {
            DrawOutcome::Drawn(card) => {
                log_if_verbose!(self, "{side} draws {} ({})", card.name, card.id);
                events.push(GameEvent::CardDrawn { side, card_id: card.id });
                s.hand.push(card);
            }
            DrawOutcome::Fatigue { damage } => {
                s.take_damage(damage as i32);
                self.logger
                    .normal(&format!("{side} takes {damage} fatigue damage ({} health left)", s.health));
                events.push(GameEvent::FatigueDamage { side, damage });
            }
        }
    }

    /// Record the outcome and emit `GameEnded` the first time the match ends
    fn finish_if_over(&self, state: &mut ExtendedGameState, events: &mut Vec<GameEvent>) {
        if state.winner.is_some() {
            return;
        }
        if let Some(outcome) = state.is_game_over() {
            state.winner = Some(outcome);
            self.logger.minimal(&format!("Game over: {outcome}"));
            events.push(GameEvent::GameEnded { winner: outcome });
        }
    }

    fn request_problem(&self, card: &Card) -> Result<Problem> {
        let request = ProblemRequest::for_card(card);
        let problem = self.content.generate_problem(&request).map_err(|e| match e {
            DuelError::ExternalService(msg) => DuelError::ExternalService(msg),
            other => DuelError::ExternalService(other.to_string()),
        })?;
        problem.check_well_formed()?;
        Ok(problem)
    }

    fn board_card(&self, state: &ExtendedGameState, side: Side, card_id: CardId) -> Result<Card> {
        state
            .side(side)
            .board_card(card_id)
            .cloned()
            .ok_or_else(|| DuelError::StateCorruption(format!("validated creature {card_id} is not on the board")))
    }

    fn combat_mut<'s>(&self, state: &'s mut ExtendedGameState) -> Result<&'s mut CombatState> {
        let phase = state.current_phase;
        state
            .combat_mut()
            .ok_or_else(|| DuelError::StateCorruption(format!("no combat state during {phase}")))
    }

    fn narrate_combat(&self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::FaceDamage {
                    attacker_id,
                    side,
                    amount,
                } => self.logger.normal(&format!("{attacker_id} hits {side} for {amount}")),
                GameEvent::Clash {
                    attacker_id,
                    defender_id,
                    attacker_strike,
                    defender_strike,
                } => self.logger.normal(&format!(
                    "{attacker_id} ({attacker_strike}) clashes with {defender_id} ({defender_strike})"
                )),
                GameEvent::CreatureDestroyed { side, card_id } => {
                    self.logger.normal(&format!("{side}'s {card_id} is destroyed"))
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ArithmeticContentService, Element, ProblemCategory, ProblemHints};
    use crate::error::ValidationError;
    use crate::game::AttackTarget;

    fn deck(cost: u8, power: u8) -> Vec<CardDefinition> {
        (0..20)
            .map(|i| CardDefinition {
                key: format!("c{i}"),
                name: format!("Creature {i}"),
                cost,
                power,
                defense: 3,
                element: Element::Fire,
                problem_category: ProblemCategory::Math,
                problem_hints: ProblemHints::default(),
                ability: None,
            })
            .collect()
    }

    #[test]
    fn test_new_match_deals_hands_and_starts_turn_one() {
        let config = DuelConfig::default();
        let content = ArithmeticContentService;
        let orch = TurnOrchestrator::new(&config, &content);
        let outcome = orch.new_match(&deck(1, 2), &deck(1, 2), 42).unwrap();
        let state = outcome.state;

        assert_eq!(state.turn_number, 1);
        assert_eq!(state.active_player, Side::Player);
        assert_eq!(state.current_phase, Phase::PreCombatMain);
        assert_eq!(state.player.hand.len(), 6);
        assert_eq!(state.opponent.hand.len(), 5);
        assert_eq!(state.player.deck.len(), 14);
        assert_eq!(state.player.mana.max, 1);
        assert_eq!(state.opponent.mana.max, 0);
        assert!(state.check_invariants(&config).is_ok());
    }

    #[test]
    fn test_rejected_action_leaves_no_trace() {
        let config = DuelConfig::default();
        let content = ArithmeticContentService;
        let orch = TurnOrchestrator::new(&config, &content);
        let state = orch.new_match(&deck(1, 2), &deck(1, 2), 1).unwrap().state;

        let action = GameAction::new(Side::Opponent, ActionKind::EndPhase);
        let err = orch.execute_action(&state, &action).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::NotYourDecision { .. })
        ));
    }

    #[test]
    fn test_attack_in_wrong_phase_rejected() {
        let config = DuelConfig::default();
        let content = ArithmeticContentService;
        let orch = TurnOrchestrator::new(&config, &content);
        let state = orch.new_match(&deck(1, 2), &deck(1, 2), 1).unwrap().state;

        let action = GameAction::new(
            Side::Player,
            ActionKind::DeclareAttacker {
                card_id: CardId::new(1),
                target: AttackTarget::Face,
            },
        );
        let err = orch.execute_action(&state, &action).unwrap_err();
        assert_eq!(err.kind(), "action_not_allowed");
    }

    #[test]
    fn test_pass_turn_hands_over() {
        let config = DuelConfig::default();
        let content = ArithmeticContentService;
        let orch = TurnOrchestrator::new(&config, &content);
        let state = orch.new_match(&deck(1, 2), &deck(1, 2), 3).unwrap().state;

        let outcome = orch
            .execute_action(&state, &GameAction::new(Side::Player, ActionKind::PassTurn))
            .unwrap();
        assert_eq!(outcome.state.active_player, Side::Opponent);
        assert_eq!(outcome.state.turn_number, 2);
        assert_eq!(outcome.state.current_phase, Phase::PreCombatMain);
        assert_eq!(outcome.state.opponent.mana.max, 1);
        assert!(outcome.state.action_log.is_empty());
        assert!(outcome
            .events
            .contains(&GameEvent::TurnEnded { side: Side::Player }));
    }

    #[test]
    fn test_lethal_damage_ends_match_once() {
        let config = DuelConfig::default();
        let content = ArithmeticContentService;
        let orch = TurnOrchestrator::new(&config, &content).with_logger(GameLogger::capturing());
        let state = orch.new_match(&deck(1, 2), &deck(1, 2), 3).unwrap().state;

        let outcome = orch.apply_damage(&state, Side::Opponent, 30);
        assert_eq!(outcome.game_ended(), Some(Outcome::Player));
        assert_eq!(
            orch.logger()
                .logs()
                .iter()
                .filter(|e| e.level == VerbosityLevel::Minimal)
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>(),
            vec!["Game over: player"]
        );
        assert_eq!(orch.is_game_over(&outcome.state), Some(Outcome::Player));

        let again = orch.apply_damage(&outcome.state, Side::Opponent, 5);
        assert_eq!(again.game_ended(), None);

        let err = orch
            .execute_action(&outcome.state, &GameAction::new(Side::Player, ActionKind::EndPhase))
            .unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::GameOver));
    }
}
