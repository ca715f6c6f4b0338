//! Projected state summaries for API replies
//!
//! A summary is built from one side's perspective: that side sees its own
//! hand, the other side's hand is reduced to a count, and problem answers
//! are never included.

use crate::core::{Ability, Card, CardId, Element, Problem, ProblemCategory, Side};
use crate::game::{ActionType, AttackTarget, ExtendedGameState, Outcome, Phase, PhaseSequencer};
use serde::{Deserialize, Serialize};

/// A card as shown to a viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: CardId,
    pub name: String,
    pub cost: u8,
    pub power: i32,
    pub defense: i32,
    pub element: Element,
    pub problem_category: ProblemCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<Ability>,
    pub can_attack: bool,
    pub is_tapped: bool,
    pub ability_used_this_turn: bool,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        CardView {
            id: card.id,
            name: card.name.clone(),
            cost: card.cost,
            power: card.power,
            defense: card.defense,
            element: card.element,
            problem_category: card.problem_category,
            ability: card.ability.clone(),
            can_attack: card.can_attack,
            is_tapped: card.is_tapped,
            ability_used_this_turn: card.ability_used_this_turn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideView {
    pub health: i32,
    pub mana: u8,
    pub max_mana: u8,
    pub hand_size: usize,
    /// Only present for the viewing side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<CardView>>,
    pub board: Vec<CardView>,
    pub deck_size: usize,
    pub fatigue_counter: u32,
    pub streak: u32,
}

/// A pending question, without its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub question: String,
    pub difficulty: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerView {
    pub attacker_id: CardId,
    pub target: AttackTarget,
    pub blocked_by: Option<CardId>,
    pub answered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerView {
    pub blocker_id: CardId,
    pub attacker_id: CardId,
    pub answered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatView {
    pub attackers: Vec<AttackerView>,
    pub blockers: Vec<BlockerView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSummary {
    pub viewer: Side,
    pub turn_number: u32,
    pub active_player: Side,
    pub current_phase: Phase,
    /// Whose decision the match is waiting on
    pub deciding_side: Side,
    pub allowed_actions: Vec<ActionType>,
    pub player: SideView,
    pub opponent: SideView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat: Option<CombatView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Outcome>,
}

impl StateSummary {
    pub fn project(state: &ExtendedGameState, viewer: Side) -> Self {
        let side_view = |side: Side| {
            let s = state.side(side);
            SideView {
                health: s.health,
                mana: s.mana.current,
                max_mana: s.mana.max,
                hand_size: s.hand.len(),
                hand: (side == viewer).then(|| s.hand.iter().map(CardView::from).collect()),
                board: s.board.iter().map(CardView::from).collect(),
                deck_size: s.deck.len(),
                fatigue_counter: s.fatigue_counter(),
                streak: s.streak,
            }
        };

        let question = |p: &Problem| QuestionView {
            question: p.question.clone(),
            difficulty: p.difficulty,
            options: p.options.clone(),
        };

        let combat = state.combat().map(|c| CombatView {
            attackers: c
                .attackers
                .iter()
                .map(|a| AttackerView {
                    attacker_id: a.attacker_id,
                    target: a.target,
                    blocked_by: c.blocker_for(a.attacker_id).map(|b| b.blocker_id),
                    answered: a.answered,
                    question: a.problem.as_ref().map(question),
                })
                .collect(),
            blockers: c
                .blockers
                .iter()
                .map(|b| BlockerView {
                    blocker_id: b.blocker_id,
                    attacker_id: b.attacker_id,
                    answered: b.answered,
                    question: b.problem.as_ref().map(question),
                })
                .collect(),
        });

        let allowed_actions = if state.winner.is_some() {
            Vec::new()
        } else {
            PhaseSequencer::allowed_actions(state.current_phase).to_vec()
        };

        StateSummary {
            viewer,
            turn_number: state.turn_number,
            active_player: state.active_player,
            current_phase: state.current_phase,
            deciding_side: state.deciding_side(),
            allowed_actions,
            player: side_view(Side::Player),
            opponent: side_view(Side::Opponent),
            combat,
            winner: state.winner,
        }
    }
}
