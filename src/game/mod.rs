//! Match state, turn structure and the engine that drives them

pub mod abilities;
pub mod actions;
pub mod combat;
pub mod events;
pub mod logger;
pub mod opponent;
pub mod orchestrator;
pub mod phase;
pub mod state;
pub mod state_hash;
pub mod validator;
pub mod view;

pub use abilities::AbilityEngine;
pub use actions::{ActionKind, AttackTarget, GameAction};
pub use combat::{strike, AttackerDeclaration, BlockerDeclaration, CombatResolver, CombatState};
pub use events::GameEvent;
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use opponent::{answer_accuracy, RuleBasedOpponent};
pub use orchestrator::{ActionOutcome, TurnOrchestrator};
pub use phase::{ActionType, Phase, PhaseSequencer};
pub use state::{CombatPhase, ExtendedGameState, Outcome};
pub use state_hash::{compute_state_hash, format_hash};
pub use validator::ActionValidator;
pub use view::StateSummary;
