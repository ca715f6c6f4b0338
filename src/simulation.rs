//! Simulation mode: bot-vs-bot matches run in parallel for balance testing
//!
//! Both sides are driven by `RuleBasedOpponent`. Each match is seeded from
//! the master seed and its index, so a whole run is reproducible no matter
//! how rayon schedules it.

use crate::config::DuelConfig;
use crate::core::{ArithmeticContentService, CardDefinition, Side};
use crate::game::{ExtendedGameState, Outcome, RuleBasedOpponent, TurnOrchestrator};
use crate::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Result of a single simulated match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub seed: u64,
    /// `None` when the turn limit was reached first
    pub winner: Option<Outcome>,
    pub turns: u32,
    pub actions: usize,
}

/// Aggregated statistics for a simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub matches: usize,
    pub player_wins: usize,
    pub opponent_wins: usize,
    pub draws: usize,
    /// Matches stopped by the turn limit
    pub unfinished: usize,
    pub average_turns: f64,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SimulationReport {
    fn from_results(results: &[MatchResult], elapsed: Duration) -> Self {
        let mut report = SimulationReport {
            matches: results.len(),
            elapsed,
            ..Default::default()
        };
        for result in results {
            match result.winner {
                Some(Outcome::Player) => report.player_wins += 1,
                Some(Outcome::Opponent) => report.opponent_wins += 1,
                Some(Outcome::Draw) => report.draws += 1,
                None => report.unfinished += 1,
            }
        }
        if !results.is_empty() {
            let total: u64 = results.iter().map(|r| r.turns as u64).sum();
            report.average_turns = total as f64 / results.len() as f64;
        }
        report
    }

    fn pct(&self, count: usize) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.matches as f64
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Results ===")?;
        writeln!(f, "Matches:       {}", self.matches)?;
        writeln!(f, "Player wins:   {} ({:.1}%)", self.player_wins, self.pct(self.player_wins))?;
        writeln!(f, "Opponent wins: {} ({:.1}%)", self.opponent_wins, self.pct(self.opponent_wins))?;
        writeln!(f, "Draws:         {} ({:.1}%)", self.draws, self.pct(self.draws))?;
        writeln!(f, "Unfinished:    {}", self.unfinished)?;
        writeln!(f, "Average turns: {:.1}", self.average_turns)?;
        if !self.elapsed.is_zero() {
            let secs = self.elapsed.as_secs_f64();
            write!(f, "Elapsed:       {secs:.2}s ({:.1} matches/sec)", self.matches as f64 / secs)?;
        }
        Ok(())
    }
}

/// Settings for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub matches: usize,
    pub seed: u64,
    /// A match still running after this many turns is counted unfinished
    pub max_turns: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            matches: 100,
            seed: 42,
            max_turns: 60,
        }
    }
}

/// Seed for match `index` of a run
pub fn match_seed(master: u64, index: usize) -> u64 {
    master.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Play one bot-vs-bot match to completion or to the turn limit
pub fn play_match(
    config: &DuelConfig,
    player_deck: &[CardDefinition],
    opponent_deck: &[CardDefinition],
    seed: u64,
    max_turns: u32,
) -> Result<MatchResult> {
    let (state, actions) = play_out(config, player_deck, opponent_deck, seed, max_turns)?;
    Ok(MatchResult {
        seed,
        winner: state.winner,
        turns: state.turn_number,
        actions,
    })
}

/// Final state of a single match, for inspection
pub fn replay_match(
    config: &DuelConfig,
    player_deck: &[CardDefinition],
    opponent_deck: &[CardDefinition],
    seed: u64,
    max_turns: u32,
) -> Result<ExtendedGameState> {
    play_out(config, player_deck, opponent_deck, seed, max_turns).map(|(state, _)| state)
}

fn play_out(
    config: &DuelConfig,
    player_deck: &[CardDefinition],
    opponent_deck: &[CardDefinition],
    seed: u64,
    max_turns: u32,
) -> Result<(ExtendedGameState, usize)> {
    let content = ArithmeticContentService;
    let orchestrator = TurnOrchestrator::new(config, &content);
    let player_bot = RuleBasedOpponent::new(Side::Player, seed.wrapping_add(0x1234_5678_9ABC_DEF0), config);
    let opponent_bot = RuleBasedOpponent::new(Side::Opponent, seed.wrapping_add(0xFEDC_BA98_7654_3210), config);

    let mut state = orchestrator.new_match(player_deck, opponent_deck, seed)?.state;
    let mut actions = 0;

    while state.winner.is_none() && state.turn_number <= max_turns {
        let bot = match state.deciding_side() {
            Side::Player => &player_bot,
            Side::Opponent => &opponent_bot,
        };
        let Some(step) = bot.step(&orchestrator, &state)? else {
            break;
        };
        state = step.state;
        actions += 1;
    }
    Ok((state, actions))
}

/// Play `options.matches` matches in parallel and aggregate the results
pub fn run_simulation(
    config: &DuelConfig,
    player_deck: &[CardDefinition],
    opponent_deck: &[CardDefinition],
    options: &SimulationOptions,
) -> Result<SimulationReport> {
    let start = Instant::now();
    let results = (0..options.matches)
        .into_par_iter()
        .map(|idx| {
            play_match(
                config,
                player_deck,
                opponent_deck,
                match_seed(options.seed, idx),
                options.max_turns,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SimulationReport::from_results(&results, start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Element;
    use crate::loader::sample_deck;

    #[test]
    fn test_match_seed_spreads() {
        assert_eq!(match_seed(7, 0), 7);
        assert_ne!(match_seed(7, 1), match_seed(7, 2));
    }

    #[test]
    fn test_report_counts() {
        let results = [
            MatchResult { seed: 1, winner: Some(Outcome::Player), turns: 10, actions: 50 },
            MatchResult { seed: 2, winner: Some(Outcome::Opponent), turns: 14, actions: 70 },
            MatchResult { seed: 3, winner: None, turns: 60, actions: 300 },
        ];
        let report = SimulationReport::from_results(&results, Duration::ZERO);
        assert_eq!(report.matches, 3);
        assert_eq!(report.player_wins, 1);
        assert_eq!(report.opponent_wins, 1);
        assert_eq!(report.unfinished, 1);
        assert!((report.average_turns - 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_run_is_reproducible() {
        let config = DuelConfig::default();
        let fire = sample_deck(Element::Fire);
        let water = sample_deck(Element::Water);
        let options = SimulationOptions {
            matches: 4,
            seed: 9,
            max_turns: 40,
        };

        let a = run_simulation(&config, &fire, &water, &options).unwrap();
        let b = run_simulation(&config, &fire, &water, &options).unwrap();
        assert_eq!(a.matches, 4);
        assert_eq!(
            (a.player_wins, a.opponent_wins, a.draws, a.unfinished),
            (b.player_wins, b.opponent_wins, b.draws, b.unfinished)
        );
        assert_eq!(a.average_turns, b.average_turns);
    }
}
