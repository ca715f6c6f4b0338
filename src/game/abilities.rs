//! Creature ability activation

use crate::core::{AbilityTarget, CardId, Side};
use crate::game::{ExtendedGameState, GameEvent};
use smallvec::SmallVec;

pub struct AbilityEngine;

impl AbilityEngine {
    /// Pay for and apply a creature's ability
    ///
    /// Assumes the activation was validated. Defense reductions destroy
    /// creatures brought to zero or below.
    pub fn activate(
        state: &mut ExtendedGameState,
        side: Side,
        card_id: CardId,
        target_id: Option<CardId>,
        heal_cap: i32,
    ) -> Vec<GameEvent> {
        let Some(card) = state.side_mut(side).board_card_mut(card_id) else {
            return Vec::new();
        };
        let Some(ability) = card.ability.clone() else {
            return Vec::new();
        };
        card.ability_used_this_turn = true;
        state.side_mut(side).mana.spend(ability.mana_cost);

        let amount = i32::from(ability.damage);
        let enemy = side.other();
        let mut events = Vec::new();

        let applied = match ability.target {
            AbilityTarget::EnemyHero => {
                state.apply_damage(enemy, amount);
                amount
            }
            AbilityTarget::SelfHeal => {
                let restored = state.side_mut(side).heal(amount, heal_cap);
                events.push(GameEvent::Healed {
                    side,
                    amount: restored,
                });
                restored
            }
            AbilityTarget::AllEnemies => {
                for creature in state.side_mut(enemy).board.iter_mut() {
                    creature.defense -= amount;
                }
                amount
            }
            AbilityTarget::EnemyCreature => {
                let enemy_board = &mut state.side_mut(enemy).board;
                if let Some(creature) = enemy_board.iter_mut().find(|c| Some(c.id) == target_id) {
                    creature.defense -= amount;
                }
                amount
            }
        };

        events.insert(
            0,
            GameEvent::AbilityUsed {
                side,
                card_id,
                target: ability.target,
                amount: applied,
            },
        );

        let dead: SmallVec<[CardId; 4]> = state
            .side(enemy)
            .board
            .iter()
            .filter(|c| c.defense <= 0)
            .map(|c| c.id)
            .collect();
        for id in dead {
            if state.side_mut(enemy).remove_from_board(id).is_some() {
                events.push(GameEvent::CreatureDestroyed {
                    side: enemy,
                    card_id: id,
                });
            }
        }

        events
    }
}
