//! Mindspark Duel - command line front end
//!
//! Matches live as JSON documents in a store directory; every subcommand
//! is one call against the Action API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mindspark_duel::{
    core::{ArithmeticContentService, CardDefinition, DeckEngine, Element, Side},
    game::{ActionKind, VerbosityLevel},
    loader::{sample_catalog, sample_deck, CardCatalog, DeckLoader},
    session::{ActionRequest, ApiReply, FileGameStore, GameService, GameStore},
    simulation::{run_simulation, SimulationOptions},
    DuelConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ElementArg {
    Fire,
    Water,
    Earth,
    Air,
}

impl From<ElementArg> for Element {
    fn from(arg: ElementArg) -> Self {
        match arg {
            ElementArg::Fire => Element::Fire,
            ElementArg::Water => Element::Water,
            ElementArg::Earth => Element::Earth,
            ElementArg::Air => Element::Air,
        }
    }
}

/// Verbosity level for engine narration (names or numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Mindspark Duel - educational card battle engine", long_about = None)]
struct Cli {
    /// Rule configuration (JSON); defaults apply to missing fields
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Directory holding one JSON document per match
    #[arg(long, global = true, default_value = "matches")]
    dir: PathBuf,

    /// Verbosity level for engine output (0=silent, 1=minimal, 2=normal, 3=verbose)
    #[arg(long, short = 'v', global = true, default_value = "silent")]
    verbosity: VerbosityArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a match and start the player's first turn
    New {
        /// Match id (letters, digits, '-' and '_')
        game_id: String,

        /// Sample deck for the player
        #[arg(long, value_enum, default_value = "fire")]
        player: ElementArg,

        /// Sample deck for the opponent
        #[arg(long, value_enum, default_value = "water")]
        opponent: ElementArg,

        /// Deck list file for the player, overriding --player
        #[arg(long, value_name = "DECK_FILE")]
        player_deck: Option<PathBuf>,

        /// Deck list file for the opponent, overriding --opponent
        #[arg(long, value_name = "DECK_FILE")]
        opponent_deck: Option<PathBuf>,

        /// Card catalog (JSON) the deck files refer to; the sample catalog otherwise
        #[arg(long, value_name = "CATALOG_FILE")]
        catalog: Option<PathBuf>,

        /// Match RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Submit one player action, e.g. '{"type": "play_card", "data": {"card_id": 3}}'
    Act {
        game_id: String,

        /// Action as JSON
        action: String,
    },

    /// Let the rule-based opponent take every decision it owns
    Opponent { game_id: String },

    /// Show a match as the player sees it
    Show { game_id: String },

    /// List stored matches
    List,

    /// Check a deck list against a catalog and the deck size rules
    ValidateDeck {
        deck: PathBuf,

        #[arg(long, value_name = "CATALOG_FILE")]
        catalog: Option<PathBuf>,
    },

    /// Play bot-vs-bot matches in parallel and report win rates
    Simulate {
        #[arg(long, value_enum, default_value = "fire")]
        player: ElementArg,

        #[arg(long, value_enum, default_value = "water")]
        opponent: ElementArg,

        /// Number of matches
        #[arg(long, default_value = "100")]
        matches: usize,

        /// Master seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Turn limit per match
        #[arg(long, default_value = "60")]
        max_turns: u32,
    },
}

fn load_catalog(path: Option<&Path>) -> Result<CardCatalog> {
    match path {
        Some(path) => CardCatalog::load_from_file(path)
            .with_context(|| format!("loading catalog {}", path.display())),
        None => Ok(sample_catalog()?),
    }
}

fn load_deck(path: &Path, catalog: &CardCatalog) -> Result<Vec<CardDefinition>> {
    let list = DeckLoader::load_from_file(path).with_context(|| format!("loading deck {}", path.display()))?;
    Ok(list
        .resolve(catalog)
        .with_context(|| format!("resolving deck {}", path.display()))?)
}

fn print_reply(reply: &ApiReply) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(reply)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DuelConfig::load_from_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => DuelConfig::default(),
    };

    let service = GameService::new(
        FileGameStore::new(&cli.dir),
        config.clone(),
        Arc::new(ArithmeticContentService),
    )
    .with_verbosity(cli.verbosity.0);

    match cli.command {
        Commands::New {
            game_id,
            player,
            opponent,
            player_deck,
            opponent_deck,
            catalog,
            seed,
        } => {
            let catalog = if player_deck.is_some() || opponent_deck.is_some() {
                Some(load_catalog(catalog.as_deref())?)
            } else {
                None
            };
            let deck_for = |file: Option<PathBuf>, element: ElementArg| -> Result<Vec<CardDefinition>> {
                match (file, &catalog) {
                    (Some(path), Some(catalog)) => load_deck(&path, catalog),
                    _ => Ok(sample_deck(element.into())),
                }
            };
            let player_cards = deck_for(player_deck, player)?;
            let opponent_cards = deck_for(opponent_deck, opponent)?;

            let reply = service
                .create_match(&game_id, &player_cards, &opponent_cards, seed)
                .await
                .with_context(|| format!("creating match {game_id}"))?;
            print_reply(&reply)?;
        }

        Commands::Act { game_id, action } => {
            let action: ActionKind = serde_json::from_str(&action).context("parsing action JSON")?;
            let reply = service.submit(&ActionRequest { game_id, action }).await;
            print_reply(&reply)?;
            if !reply.success {
                std::process::exit(1);
            }
        }

        Commands::Opponent { game_id } => {
            let reply = service
                .run_opponent(&game_id)
                .await
                .with_context(|| format!("running opponent for {game_id}"))?;
            print_reply(&reply)?;
        }

        Commands::Show { game_id } => {
            let reply = service
                .summary(&game_id, Side::Player)
                .await
                .with_context(|| format!("loading match {game_id}"))?;
            print_reply(&reply)?;
        }

        Commands::List => {
            for id in service.store().list().await? {
                println!("{id}");
            }
        }

        Commands::ValidateDeck { deck, catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let cards = load_deck(&deck, &catalog)?;
            DeckEngine::validate_deck(&cards, config.deck_min, config.deck_max)
                .with_context(|| format!("validating deck {}", deck.display()))?;
            println!("{}: {} cards, OK", deck.display(), cards.len());
        }

        Commands::Simulate {
            player,
            opponent,
            matches,
            seed,
            max_turns,
        } => {
            let options = SimulationOptions {
                matches,
                seed,
                max_turns,
            };
            println!("Simulating {matches} matches: {:?} vs {:?} (seed {seed})\n", player, opponent);
            let report = run_simulation(
                &config,
                &sample_deck(player.into()),
                &sample_deck(opponent.into()),
                &options,
            )?;
            println!("{report}");
        }
    }

    Ok(())
}
