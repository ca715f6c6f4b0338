//! Rule-based opponent
//!
//! Picks one action at a time from the same vocabulary a human submits and
//! hands it to the orchestrator. Decisions are pure functions of the state
//! and the opponent's seed: the simulated problem answers draw from an RNG
//! keyed on the state position, so replaying a match replays the opponent.

use crate::config::DuelConfig;
use crate::core::{AbilityTarget, Card, CardId, Side};
use crate::game::combat::strike;
use crate::game::{
    ActionKind, ActionOutcome, ActionType, AttackTarget, ExtendedGameState, GameAction, Phase, TurnOrchestrator,
};
use crate::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Chance of answering a problem of the given difficulty correctly
pub fn answer_accuracy(difficulty: u8) -> f64 {
    (1.0 - f64::from(difficulty) / 15.0).max(0.3)
}

pub struct RuleBasedOpponent {
    side: Side,
    seed: u64,
    config: DuelConfig,
}

impl RuleBasedOpponent {
    pub fn new(side: Side, seed: u64, config: &DuelConfig) -> Self {
        RuleBasedOpponent {
            side,
            seed,
            config: config.clone(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Creature value, after the creature evaluator the heuristic AI uses:
    /// a flat base, then power, defense and cost weighted 15/10/5
    pub fn evaluate_card(card: &Card) -> i32 {
        let mut value = 100;
        value += card.power * 15;
        value += card.defense * 10;
        value += i32::from(card.cost) * 5;
        if let Some(ability) = &card.ability {
            value += i32::from(ability.damage) * 8;
        }
        value
    }

    /// The next action this side would take, or None when it owns no decision
    pub fn choose_action(&self, state: &ExtendedGameState) -> Option<GameAction> {
        if state.winner.is_some() || state.deciding_side() != self.side {
            return None;
        }

        let action = match state.current_phase {
            Phase::PreCombatMain => self
                .choose_main_phase_action(state)
                .unwrap_or_else(|| {
                    if self.ready_attackers(state).next().is_some() {
                        ActionKind::EndPhase
                    } else {
                        ActionKind::PassTurn
                    }
                }),
            Phase::PostCombatMain => self
                .choose_main_phase_action(state)
                .unwrap_or(ActionKind::PassTurn),
            Phase::Upkeep | Phase::EndStep => ActionKind::PassTurn,
            Phase::BeginCombat => ActionKind::EndPhase,
            Phase::DeclareAttackers => self.choose_attack(state),
            Phase::DeclareBlockers => self.choose_block(state),
            Phase::CombatDamage => self.choose_answer(state)?,
            Phase::Untap | Phase::Draw | Phase::EndCombat | Phase::Cleanup => return None,
        };
        Some(GameAction::new(self.side, action))
    }

    /// Choose and execute one action; `None` when this side owns no decision
    pub fn step(&self, orchestrator: &TurnOrchestrator<'_>, state: &ExtendedGameState) -> Result<Option<ActionOutcome>> {
        let Some(action) = self.choose_action(state) else {
            return Ok(None);
        };
        orchestrator
            .logger()
            .opponent_choice(&format!("{} chose {:?}", self.side, action.action));
        orchestrator.execute_action(state, &action).map(Some)
    }

    /// Take every decision this side owns until control passes back
    pub fn drive(&self, orchestrator: &TurnOrchestrator<'_>, state: &ExtendedGameState) -> Result<ActionOutcome> {
        let mut outcome = ActionOutcome {
            state: state.clone(),
            events: Vec::new(),
        };

        for _ in 0..self.config.opponent.max_actions_per_drive {
            let Some(step) = self.step(orchestrator, &outcome.state)? else {
                break;
            };
            outcome.state = step.state;
            outcome.events.extend(step.events);
        }
        Ok(outcome)
    }

    fn ready_attackers<'s>(&self, state: &'s ExtendedGameState) -> impl Iterator<Item = &'s Card> {
        state.side(self.side).board.iter().filter(|c| c.ready_to_attack())
    }

    fn choose_main_phase_action(&self, state: &ExtendedGameState) -> Option<ActionKind> {
        self.choose_card_to_play(state)
            .map(|card_id| ActionKind::PlayCard { card_id })
            .or_else(|| self.choose_ability(state))
    }

    /// Highest-value affordable card, within the per-turn play guard
    fn choose_card_to_play(&self, state: &ExtendedGameState) -> Option<CardId> {
        let plays = state
            .actions_this_turn(self.side)
            .filter(|a| a.action_type() == ActionType::PlayCard)
            .count();
        let me = state.side(self.side);
        if plays >= self.config.opponent.max_plays_per_turn || me.board.len() >= self.config.board_limit {
            return None;
        }

        me.hand
            .iter()
            .filter(|c| me.mana.can_afford(c.cost))
            .max_by_key(|c| (Self::evaluate_card(c), std::cmp::Reverse(c.id)))
            .map(|c| c.id)
    }

    fn choose_ability(&self, state: &ExtendedGameState) -> Option<ActionKind> {
        let me = state.side(self.side);
        let enemy = state.side(self.side.other());

        for card in me.board.iter().filter(|c| c.has_usable_ability()) {
            let Some(ability) = &card.ability else { continue };
            if !me.mana.can_afford(ability.mana_cost) {
                continue;
            }
            let target_id = match ability.target {
                AbilityTarget::EnemyHero => None,
                AbilityTarget::SelfHeal if me.health < self.config.starting_health => None,
                AbilityTarget::SelfHeal => continue,
                AbilityTarget::AllEnemies if !enemy.board.is_empty() => None,
                AbilityTarget::AllEnemies => continue,
                AbilityTarget::EnemyCreature => {
                    match enemy.board.iter().max_by_key(|c| (Self::evaluate_card(c), std::cmp::Reverse(c.id))) {
                        Some(target) => Some(target.id),
                        None => continue,
                    }
                }
            };
            return Some(ActionKind::UseAbility {
                card_id: card.id,
                target_id,
            });
        }
        None
    }

    /// Declare the next worthwhile attacker, or confirm
    fn choose_attack(&self, state: &ExtendedGameState) -> ActionKind {
        let enemy = state.side(self.side.other());
        let declared = |id: CardId| state.combat().is_some_and(|c| c.is_attacking(id));

        let potential_damage: i32 = self
            .ready_attackers(state)
            .map(|c| strike(c.power, true))
            .sum();
        let going_for_lethal = potential_damage >= enemy.health;

        for attacker in self.ready_attackers(state).filter(|c| !declared(c.id)) {
            if !going_for_lethal && !self.should_attack(attacker, &enemy.board) {
                continue;
            }
            let target = if going_for_lethal {
                AttackTarget::Face
            } else {
                self.choose_attack_target(attacker, &enemy.board)
            };
            return ActionKind::DeclareAttacker {
                card_id: attacker.id,
                target,
            };
        }
        ActionKind::ConfirmAttackers
    }

    /// Stay home if some untapped enemy would kill this attacker and survive
    /// even when the attacker's problem is answered correctly
    fn should_attack(&self, attacker: &Card, enemy_board: &[Card]) -> bool {
        let best_strike = strike(attacker.power, true);
        !enemy_board
            .iter()
            .filter(|b| !b.is_tapped)
            .any(|b| strike(b.power, true) >= attacker.defense && b.defense > best_strike)
    }

    /// Face unless a more valuable enemy creature can be killed without losing
    /// the attacker to its counterstrike
    fn choose_attack_target(&self, attacker: &Card, enemy_board: &[Card]) -> AttackTarget {
        let expected = strike(attacker.power, true);
        let attacker_value = Self::evaluate_card(attacker);
        enemy_board
            .iter()
            .filter(|t| t.defense <= expected && t.power < attacker.defense)
            .filter(|t| Self::evaluate_card(t) >= attacker_value)
            .max_by_key(|t| (Self::evaluate_card(t), std::cmp::Reverse(t.id)))
            .map_or(AttackTarget::Face, |t| AttackTarget::Creature(t.id))
    }

    /// Block favorably, or chump when the incoming damage is lethal
    fn choose_block(&self, state: &ExtendedGameState) -> ActionKind {
        let Some(combat) = state.combat() else {
            return ActionKind::SkipBlockers;
        };
        let me = state.side(self.side);
        let attackers = state.side(self.side.other());

        let incoming: i32 = combat
            .attackers
            .iter()
            .filter(|a| combat.blocker_for(a.attacker_id).is_none() && a.target == AttackTarget::Face)
            .filter_map(|a| attackers.board_card(a.attacker_id))
            .map(|c| strike(c.power, true))
            .sum();
        let lethal = incoming >= me.health;

        let available = move || {
            me.board
                .iter()
                .filter(move |b| !b.is_tapped && !combat.is_blocking(b.id))
        };

        for decl in combat.attackers.iter().filter(|a| combat.blocker_for(a.attacker_id).is_none()) {
            let Some(attacker) = attackers.board_card(decl.attacker_id) else {
                continue;
            };
            let attacker_strike = strike(attacker.power, true);
            let attacker_value = Self::evaluate_card(attacker);

            let favorable = available()
                .filter(|b| {
                    let survives = b.defense > attacker_strike;
                    let kills = strike(b.power, true) >= attacker.defense;
                    survives || (kills && Self::evaluate_card(b) <= attacker_value)
                })
                .max_by_key(|b| (b.defense, std::cmp::Reverse(b.id)));

            let chosen = favorable.or_else(|| {
                if lethal && decl.target == AttackTarget::Face {
                    available().min_by_key(|b| (Self::evaluate_card(b), b.id))
                } else {
                    None
                }
            });

            if let Some(blocker) = chosen {
                return ActionKind::DeclareBlocker {
                    attacker_id: decl.attacker_id,
                    blocker_id: blocker.id,
                };
            }
        }
        ActionKind::SkipBlockers
    }

    /// Simulated answer for the next unanswered declaration this side owns
    fn choose_answer(&self, state: &ExtendedGameState) -> Option<ActionKind> {
        let combat = state.combat()?;
        let pending = if state.active_player == self.side {
            combat
                .attackers
                .iter()
                .find(|a| !a.answered)
                .map(|a| (a.attacker_id, true, a.problem.as_ref().map(|p| p.difficulty)))
        } else {
            combat
                .blockers
                .iter()
                .find(|b| !b.answered)
                .map(|b| (b.blocker_id, false, b.problem.as_ref().map(|p| p.difficulty)))
        };
        let (card_id, is_attacker, difficulty) = pending?;

        let difficulty = difficulty
            .or_else(|| {
                state
                    .side(self.side)
                    .board_card(card_id)
                    .map(|c| c.problem_hints.difficulty)
            })
            .unwrap_or(5);

        let mut rng = self.answer_rng(state, card_id);
        let is_correct = rng.gen_bool(answer_accuracy(difficulty));
        let response_time_ms = rng.gen_range(1_500..8_000);

        Some(ActionKind::SubmitCombatAnswer {
            card_id,
            is_attacker,
            is_correct,
            response_time_ms,
        })
    }

    fn answer_rng(&self, state: &ExtendedGameState, card_id: CardId) -> ChaCha12Rng {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        state.turn_number.hash(&mut hasher);
        state.action_log.len().hash(&mut hasher);
        card_id.hash(&mut hasher);
        ChaCha12Rng::seed_from_u64(hasher.finish())
    }
}
