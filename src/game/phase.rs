//! Turn phases and the per-phase legal action table

use serde::{Deserialize, Serialize};
use std::fmt;

/// The twelve ordered steps of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    // Beginning
    Untap,
    Upkeep,
    Draw,

    PreCombatMain,

    // Combat
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,

    PostCombatMain,

    // Ending
    EndStep,
    Cleanup,
}

impl Phase {
    /// Every phase in turn order
    pub const ALL: [Phase; 12] = [
        Phase::Untap,
        Phase::Upkeep,
        Phase::Draw,
        Phase::PreCombatMain,
        Phase::BeginCombat,
        Phase::DeclareAttackers,
        Phase::DeclareBlockers,
        Phase::CombatDamage,
        Phase::EndCombat,
        Phase::PostCombatMain,
        Phase::EndStep,
        Phase::Cleanup,
    ];

    /// Position in turn order (0-11)
    pub fn index(&self) -> usize {
        match self {
            Phase::Untap => 0,
            Phase::Upkeep => 1,
            Phase::Draw => 2,
            Phase::PreCombatMain => 3,
            Phase::BeginCombat => 4,
            Phase::DeclareAttackers => 5,
            Phase::DeclareBlockers => 6,
            Phase::CombatDamage => 7,
            Phase::EndCombat => 8,
            Phase::PostCombatMain => 9,
            Phase::EndStep => 10,
            Phase::Cleanup => 11,
        }
    }

    /// Next phase; `Cleanup` wraps around to `Untap`
    pub fn next(&self) -> Phase {
        Phase::ALL[(self.index() + 1) % Phase::ALL.len()]
    }

    /// Processed by the orchestrator without any player action
    pub fn is_automatic(&self) -> bool {
        PhaseSequencer::allowed_actions(*self).is_empty()
    }

    /// Part of the nested combat state machine
    pub fn is_combat(&self) -> bool {
        matches!(
            self,
            Phase::BeginCombat
                | Phase::DeclareAttackers
                | Phase::DeclareBlockers
                | Phase::CombatDamage
                | Phase::EndCombat
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Untap => "untap",
            Phase::Upkeep => "upkeep",
            Phase::Draw => "draw",
            Phase::PreCombatMain => "pre_combat_main",
            Phase::BeginCombat => "begin_combat",
            Phase::DeclareAttackers => "declare_attackers",
            Phase::DeclareBlockers => "declare_blockers",
            Phase::CombatDamage => "combat_damage",
            Phase::EndCombat => "end_combat",
            Phase::PostCombatMain => "post_combat_main",
            Phase::EndStep => "end_step",
            Phase::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of player-submitted actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    PlayCard,
    Attack,
    DeclareAttacker,
    DeclareBlocker,
    ConfirmAttackers,
    SkipBlockers,
    SubmitCombatAnswer,
    UseAbility,
    EndPhase,
    PassTurn,
}

impl ActionType {
    pub const ALL: [ActionType; 10] = [
        ActionType::PlayCard,
        ActionType::Attack,
        ActionType::DeclareAttacker,
        ActionType::DeclareBlocker,
        ActionType::ConfirmAttackers,
        ActionType::SkipBlockers,
        ActionType::SubmitCombatAnswer,
        ActionType::UseAbility,
        ActionType::EndPhase,
        ActionType::PassTurn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::PlayCard => "play_card",
            ActionType::Attack => "attack",
            ActionType::DeclareAttacker => "declare_attacker",
            ActionType::DeclareBlocker => "declare_blocker",
            ActionType::ConfirmAttackers => "confirm_attackers",
            ActionType::SkipBlockers => "skip_blockers",
            ActionType::SubmitCombatAnswer => "submit_combat_answer",
            ActionType::UseAbility => "use_ability",
            ActionType::EndPhase => "end_phase",
            ActionType::PassTurn => "pass_turn",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single authority on which actions each phase admits
pub struct PhaseSequencer;

impl PhaseSequencer {
    pub fn next_phase(current: Phase) -> Phase {
        current.next()
    }

    pub fn allowed_actions(phase: Phase) -> &'static [ActionType] {
        use ActionType::*;
        match phase {
            Phase::Untap | Phase::Draw | Phase::EndCombat | Phase::Cleanup => &[],
            Phase::Upkeep => &[EndPhase, PassTurn],
            Phase::PreCombatMain | Phase::PostCombatMain => &[PlayCard, UseAbility, EndPhase, PassTurn],
            Phase::BeginCombat => &[EndPhase, PassTurn],
            Phase::DeclareAttackers => &[DeclareAttacker, Attack, ConfirmAttackers],
            Phase::DeclareBlockers => &[DeclareBlocker, SkipBlockers],
            Phase::CombatDamage => &[SubmitCombatAnswer],
            Phase::EndStep => &[EndPhase, PassTurn],
        }
    }

    pub fn is_allowed(phase: Phase, action: ActionType) -> bool {
        Self::allowed_actions(phase).contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_order() {
        assert_eq!(Phase::Untap.next(), Phase::Upkeep);
        assert_eq!(Phase::PreCombatMain.next(), Phase::BeginCombat);
        assert_eq!(Phase::EndCombat.next(), Phase::PostCombatMain);
        assert_eq!(Phase::Cleanup.next(), Phase::Untap);
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn test_twelve_steps_return_home() {
        for start in Phase::ALL {
            let mut phase = start;
            for _ in 0..12 {
                phase = PhaseSequencer::next_phase(phase);
            }
            assert_eq!(phase, start);
        }
    }

    #[test]
    fn test_automatic_phases() {
        let automatic: Vec<Phase> = Phase::ALL.into_iter().filter(Phase::is_automatic).collect();
        assert_eq!(
            automatic,
            vec![Phase::Untap, Phase::Draw, Phase::EndCombat, Phase::Cleanup]
        );
    }

    #[test]
    fn test_interactive_phases_have_an_exit() {
        for phase in Phase::ALL.into_iter().filter(|p| !p.is_automatic()) {
            let allowed = PhaseSequencer::allowed_actions(phase);
            let has_exit = [
                ActionType::EndPhase,
                ActionType::ConfirmAttackers,
                ActionType::SkipBlockers,
                ActionType::SubmitCombatAnswer,
            ]
            .iter()
            .any(|a| allowed.contains(a));
            assert!(has_exit, "{phase} has no way forward");
        }
    }

    #[test]
    fn test_legality_table() {
        assert!(PhaseSequencer::is_allowed(Phase::PreCombatMain, ActionType::PlayCard));
        assert!(!PhaseSequencer::is_allowed(Phase::DeclareAttackers, ActionType::PlayCard));
        assert!(!PhaseSequencer::is_allowed(Phase::DeclareAttackers, ActionType::EndPhase));
        assert!(PhaseSequencer::is_allowed(Phase::DeclareBlockers, ActionType::SkipBlockers));
        assert!(!PhaseSequencer::is_allowed(Phase::Cleanup, ActionType::EndPhase));
    }

    #[test]
    fn test_phase_serde_names() {
        assert_eq!(
            serde_json::to_string(&Phase::PreCombatMain).unwrap(),
            "\"pre_combat_main\""
        );
        assert_eq!(
            serde_json::to_string(&ActionType::SubmitCombatAnswer).unwrap(),
            "\"submit_combat_answer\""
        );
    }
}
