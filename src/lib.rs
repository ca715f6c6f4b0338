//! Mindspark Duel - educational trading-card game engine
//!
//! A deterministic turn/phase/combat engine where creature strength in
//! combat is gated by answering generated problems. The engine consumes
//! card definitions and problems from external services and exposes a
//! one-action-per-call API over persisted match state.

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod session;
pub mod simulation;

pub use config::{DuelConfig, OpponentConfig};
pub use error::{DuelError, Result, ValidationError};
