//! Action API
//!
//! Every call follows the same cycle under a per-match lock: load the
//! document, check it, run the engine, save with the loaded version. A
//! rejected action saves nothing.

use crate::config::DuelConfig;
use crate::core::{CardDefinition, ContentService, Side};
use crate::game::{
    ActionKind, ExtendedGameState, GameAction, GameEvent, GameLogger, RuleBasedOpponent, StateSummary,
    TurnOrchestrator, VerbosityLevel,
};
use crate::session::store::{GameStore, StoredGame};
use crate::{DuelError, Result};
use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::Mutex;

/// `{game_id, action: {type, data}}`
///
/// Requests always act for the human side. The opponent acts only through
/// `GameService::run_opponent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub game_id: String,
    pub action: ActionKind,
}

/// Reply to one API call: a projected state on success, a reason on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<GameEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl ApiReply {
    pub fn ok(stored: &StoredGame, viewer: Side, events: Vec<GameEvent>) -> Self {
        ApiReply {
            success: true,
            error: None,
            error_kind: None,
            state: Some(StateSummary::project(&stored.state, viewer)),
            events,
            version: Some(stored.version),
        }
    }

    pub fn failure(err: &DuelError) -> Self {
        ApiReply {
            success: false,
            error: Some(err.to_string()),
            error_kind: Some(err.kind().to_string()),
            state: None,
            events: Vec::new(),
            version: None,
        }
    }
}

pub struct GameService<S: GameStore> {
    store: S,
    config: DuelConfig,
    content: Arc<dyn ContentService>,
    verbosity: VerbosityLevel,
    locks: Mutex<FxHashMap<String, Arc<Mutex<()>>>>,
}

impl<S: GameStore> GameService<S> {
    pub fn new(store: S, config: DuelConfig, content: Arc<dyn ContentService>) -> Self {
        GameService {
            store,
            config,
            content,
            verbosity: VerbosityLevel::Silent,
            locks: Mutex::new(FxHashMap::default()),
        }
    }

    /// Print engine narration at this level
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    fn orchestrator(&self) -> TurnOrchestrator<'_> {
        TurnOrchestrator::new(&self.config, self.content.as_ref())
            .with_logger(GameLogger::with_verbosity(self.verbosity))
    }

    async fn lock_for(&self, game_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(game_id.to_string()).or_default())
    }

    /// Drop the per-match lock entry once no other call holds or awaits it
    async fn release(&self, game_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference in the map, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(game_id);
        }
    }

    /// Load a document and refuse to work on a state that breaks invariants
    async fn load_checked(&self, game_id: &str) -> Result<StoredGame> {
        let stored = self.store.load(game_id).await?;
        stored
            .state
            .check_invariants(&self.config)
            .map_err(|e| DuelError::StateCorruption(format!("game {game_id}: {e}")))?;
        Ok(stored)
    }

    pub async fn create_match(
        &self,
        game_id: &str,
        player_deck: &[CardDefinition],
        opponent_deck: &[CardDefinition],
        seed: u64,
    ) -> Result<ApiReply> {
        let lock = self.lock_for(game_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.create_locked(game_id, player_deck, opponent_deck, seed).await
        };
        self.release(game_id, lock).await;
        result
    }

    async fn create_locked(
        &self,
        game_id: &str,
        player_deck: &[CardDefinition],
        opponent_deck: &[CardDefinition],
        seed: u64,
    ) -> Result<ApiReply> {
        let outcome = self.orchestrator().new_match(player_deck, opponent_deck, seed)?;
        let stored = self.store.create(game_id, &outcome.state).await?;
        Ok(ApiReply::ok(&stored, Side::Player, outcome.events))
    }

    /// Submit one action; every failure becomes a failed reply
    pub async fn submit(&self, request: &ActionRequest) -> ApiReply {
        match self.try_submit(request).await {
            Ok(reply) => reply,
            Err(e) => ApiReply::failure(&e),
        }
    }

    pub async fn try_submit(&self, request: &ActionRequest) -> Result<ApiReply> {
        let lock = self.lock_for(&request.game_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.submit_locked(request).await
        };
        self.release(&request.game_id, lock).await;
        result
    }

    async fn submit_locked(&self, request: &ActionRequest) -> Result<ApiReply> {
        let stored = self.load_checked(&request.game_id).await?;
        let action = GameAction::new(Side::Player, request.action.clone());
        let outcome = self.orchestrator().execute_action(&stored.state, &action)?;
        let saved = self
            .store
            .save(&request.game_id, stored.version, &outcome.state)
            .await?;
        Ok(ApiReply::ok(&saved, Side::Player, outcome.events))
    }

    /// Let the rule-based opponent take every decision it owns, saving
    /// after each action
    pub async fn run_opponent(&self, game_id: &str) -> Result<ApiReply> {
        let lock = self.lock_for(game_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.run_opponent_locked(game_id).await
        };
        self.release(game_id, lock).await;
        result
    }

    async fn run_opponent_locked(&self, game_id: &str) -> Result<ApiReply> {
        let mut stored = self.load_checked(game_id).await?;
        let bot = RuleBasedOpponent::new(Side::Opponent, opponent_seed(game_id), &self.config);
        let orchestrator = self.orchestrator();
        let mut events = Vec::new();

        for taken in 0..self.config.opponent.max_actions_per_drive {
            if taken > 0 && self.config.opponent.think_delay_ms > 0 {
                tokio::time::sleep(self.config.opponent.think_delay()).await;
            }
            let Some(outcome) = bot.step(&orchestrator, &stored.state)? else {
                break;
            };
            stored = self.store.save(game_id, stored.version, &outcome.state).await?;
            events.extend(outcome.events);
        }

        Ok(ApiReply::ok(&stored, Side::Player, events))
    }

    pub async fn summary(&self, game_id: &str, viewer: Side) -> Result<ApiReply> {
        let stored = self.load_checked(game_id).await?;
        Ok(ApiReply::ok(&stored, viewer, Vec::new()))
    }

    /// Full state, for debugging and tests
    pub async fn state(&self, game_id: &str) -> Result<ExtendedGameState> {
        Ok(self.load_checked(game_id).await?.state)
    }
}

/// Stable per-match seed for the opponent's simulated answers
fn opponent_seed(game_id: &str) -> u64 {
    let mut hasher = FxHasher::default();
    game_id.hash(&mut hasher);
    hasher.finish()
}
