//! Combat declarations and damage resolution
//!
//! Attackers and blockers are declared one by one, each paired with a
//! problem generated for that creature. Once every declaration has an
//! answer, `CombatResolver::resolve` applies damage in declaration order.

use crate::core::{Card, CardId, Problem, Side};
use crate::error::ValidationError;
use crate::game::{AttackTarget, ExtendedGameState, GameEvent};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A creature committed to attack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerDeclaration {
    pub attacker_id: CardId,
    pub target: AttackTarget,
    pub problem: Option<Problem>,
    pub answered: bool,
    pub is_correct: bool,
    #[serde(default)]
    pub response_time_ms: u64,
}

impl AttackerDeclaration {
    pub fn new(attacker_id: CardId, target: AttackTarget, problem: Option<Problem>) -> Self {
        AttackerDeclaration {
            attacker_id,
            target,
            problem,
            answered: false,
            is_correct: false,
            response_time_ms: 0,
        }
    }
}

/// A creature assigned to block one attacker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerDeclaration {
    pub blocker_id: CardId,
    pub attacker_id: CardId,
    pub problem: Option<Problem>,
    pub answered: bool,
    pub is_correct: bool,
    #[serde(default)]
    pub response_time_ms: u64,
}

impl BlockerDeclaration {
    pub fn new(blocker_id: CardId, attacker_id: CardId, problem: Option<Problem>) -> Self {
        BlockerDeclaration {
            blocker_id,
            attacker_id,
            problem,
            answered: false,
            is_correct: false,
            response_time_ms: 0,
        }
    }
}

/// Declarations for the combat in progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub attackers: Vec<AttackerDeclaration>,
    pub blockers: Vec<BlockerDeclaration>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attacking(&self, card_id: CardId) -> bool {
        self.attackers.iter().any(|a| a.attacker_id == card_id)
    }

    pub fn is_blocking(&self, card_id: CardId) -> bool {
        self.blockers.iter().any(|b| b.blocker_id == card_id)
    }

    pub fn attacker(&self, attacker_id: CardId) -> Option<&AttackerDeclaration> {
        self.attackers.iter().find(|a| a.attacker_id == attacker_id)
    }

    /// The blocker assigned to an attacker, if any
    pub fn blocker_for(&self, attacker_id: CardId) -> Option<&BlockerDeclaration> {
        self.blockers.iter().find(|b| b.attacker_id == attacker_id)
    }

    pub fn declare_attacker(&mut self, declaration: AttackerDeclaration) {
        self.attackers.push(declaration);
    }

    /// Record a block. The attacker now fights the blocker instead of
    /// its original target.
    pub fn declare_blocker(&mut self, declaration: BlockerDeclaration) {
        if let Some(attacker) = self
            .attackers
            .iter_mut()
            .find(|a| a.attacker_id == declaration.attacker_id)
        {
            attacker.target = AttackTarget::Creature(declaration.blocker_id);
        }
        self.blockers.push(declaration);
    }

    pub fn has_unanswered_attackers(&self) -> bool {
        self.attackers.iter().any(|a| !a.answered)
    }

    pub fn has_unanswered_blockers(&self) -> bool {
        self.blockers.iter().any(|b| !b.answered)
    }

    pub fn all_answered(&self) -> bool {
        !self.has_unanswered_attackers() && !self.has_unanswered_blockers()
    }

    /// Mark a declaration as answered
    pub fn record_answer(
        &mut self,
        card_id: CardId,
        is_attacker: bool,
        is_correct: bool,
        response_time_ms: u64,
    ) -> Result<(), ValidationError> {
        let (answered, correct, time) = if is_attacker {
            let decl = self
                .attackers
                .iter_mut()
                .find(|a| a.attacker_id == card_id)
                .ok_or(ValidationError::DeclarationNotFound(card_id))?;
            (&mut decl.answered, &mut decl.is_correct, &mut decl.response_time_ms)
        } else {
            let decl = self
                .blockers
                .iter_mut()
                .find(|b| b.blocker_id == card_id)
                .ok_or(ValidationError::DeclarationNotFound(card_id))?;
            (&mut decl.answered, &mut decl.is_correct, &mut decl.response_time_ms)
        };

        if *answered {
            return Err(ValidationError::AlreadyAnswered(card_id));
        }
        *answered = true;
        *correct = is_correct;
        *time = response_time_ms;
        Ok(())
    }
}

/// Damage a creature deals for a given answer: 1.5x power rounded up when
/// correct, 0.5x rounded up when not
pub fn strike(power: i32, is_correct: bool) -> i32 {
    let power = power.max(0);
    if is_correct {
        (power * 3 + 1) / 2
    } else {
        (power + 1) / 2
    }
}

/// Applies combat outcomes to the match state
pub struct CombatResolver;

impl CombatResolver {
    /// Resolve the active combat in attacker declaration order
    ///
    /// Blocked attackers clash with their blocker and deal no face damage.
    /// Unblocked attackers aimed at a creature clash with it, the target
    /// striking back with its printed power. Everything else hits the
    /// defending side. Creatures that died earlier in the sequence deal no
    /// damage.
    pub fn resolve(state: &mut ExtendedGameState) -> Vec<GameEvent> {
        let combat = match state.combat() {
            Some(combat) => combat.clone(),
            None => return Vec::new(),
        };

        let mut events = Vec::new();
        for decl in &combat.attackers {
            let blocker = combat
                .blocker_for(decl.attacker_id)
                .map(|b| (b.blocker_id, b.is_correct));
            events.extend(Self::resolve_one(
                state,
                decl.attacker_id,
                decl.target,
                decl.is_correct,
                blocker,
            ));
        }
        events
    }

    /// Resolve a single immediate attack (the legacy `attack` action)
    pub fn resolve_direct_attack(
        state: &mut ExtendedGameState,
        attacker_id: CardId,
        target: AttackTarget,
        is_correct: bool,
    ) -> Vec<GameEvent> {
        Self::resolve_one(state, attacker_id, target, is_correct, None)
    }

    fn resolve_one(
        state: &mut ExtendedGameState,
        attacker_id: CardId,
        target: AttackTarget,
        is_correct: bool,
        blocker: Option<(CardId, bool)>,
    ) -> Vec<GameEvent> {
        let attacking = state.active_player;
        let defending = attacking.other();

        let Some(attacker) = state.side(attacking).board_card(attacker_id).cloned() else {
            return Vec::new();
        };
        let attacker_strike = strike(attacker.power, is_correct);

        if let Some((blocker_id, blocker_correct)) = blocker {
            // A blocked attacker stays blocked even if its blocker is gone
            let Some(blocker) = state.side(defending).board_card(blocker_id).cloned() else {
                return Vec::new();
            };
            let blocker_strike = strike(blocker.power, blocker_correct);
            return Self::clash(state, attacking, &attacker, attacker_strike, &blocker, blocker_strike);
        }

        if let AttackTarget::Creature(target_id) = target {
            if let Some(defender) = state.side(defending).board_card(target_id).cloned() {
                let counter = defender.power.max(0);
                return Self::clash(state, attacking, &attacker, attacker_strike, &defender, counter);
            }
        }

        state.side_mut(defending).take_damage(attacker_strike);
        vec![GameEvent::FaceDamage {
            attacker_id,
            side: defending,
            amount: attacker_strike,
        }]
    }

    fn clash(
        state: &mut ExtendedGameState,
        attacking: Side,
        attacker: &Card,
        attacker_strike: i32,
        defender: &Card,
        defender_strike: i32,
    ) -> Vec<GameEvent> {
        let defending = attacking.other();
        let mut events = vec![GameEvent::Clash {
            attacker_id: attacker.id,
            defender_id: defender.id,
            attacker_strike,
            defender_strike,
        }];

        let mut destroyed: SmallVec<[(Side, CardId); 2]> = SmallVec::new();
        if defender.defense <= attacker_strike {
            destroyed.push((defending, defender.id));
        }
        if attacker.defense <= defender_strike {
            destroyed.push((attacking, attacker.id));
        }

        for (side, card_id) in destroyed {
            if state.side_mut(side).remove_from_board(card_id).is_some() {
                events.push(GameEvent::CreatureDestroyed { side, card_id });
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strike_rounds_up() {
        assert_eq!(strike(8, true), 12);
        assert_eq!(strike(8, false), 4);
        assert_eq!(strike(5, true), 8);
        assert_eq!(strike(5, false), 3);
        assert_eq!(strike(1, true), 2);
        assert_eq!(strike(1, false), 1);
        assert_eq!(strike(0, true), 0);
    }

    #[test]
    fn test_block_retargets_attacker() {
        let mut combat = CombatState::new();
        combat.declare_attacker(AttackerDeclaration::new(CardId::new(1), AttackTarget::Face, None));
        combat.declare_blocker(BlockerDeclaration::new(CardId::new(30), CardId::new(1), None));

        assert_eq!(
            combat.attacker(CardId::new(1)).map(|a| a.target),
            Some(AttackTarget::Creature(CardId::new(30)))
        );
        assert!(combat.is_blocking(CardId::new(30)));
        assert_eq!(
            combat.blocker_for(CardId::new(1)).map(|b| b.blocker_id),
            Some(CardId::new(30))
        );
    }

    #[test]
    fn test_record_answer() {
        let mut combat = CombatState::new();
        combat.declare_attacker(AttackerDeclaration::new(CardId::new(1), AttackTarget::Face, None));
        combat.declare_blocker(BlockerDeclaration::new(CardId::new(30), CardId::new(1), None));
        assert!(!combat.all_answered());

        combat.record_answer(CardId::new(1), true, true, 1200).unwrap();
        assert!(!combat.has_unanswered_attackers());
        assert!(combat.has_unanswered_blockers());

        assert_eq!(
            combat.record_answer(CardId::new(1), true, false, 0),
            Err(ValidationError::AlreadyAnswered(CardId::new(1)))
        );
        assert_eq!(
            combat.record_answer(CardId::new(1), false, false, 0),
            Err(ValidationError::DeclarationNotFound(CardId::new(1)))
        );

        combat.record_answer(CardId::new(30), false, false, 800).unwrap();
        assert!(combat.all_answered());
        let attacker = combat.attacker(CardId::new(1)).unwrap();
        assert!(attacker.is_correct);
        assert_eq!(attacker.response_time_ms, 1200);
    }
}
