//! Card catalogs and deck lists

pub mod catalog;
pub mod deck;
pub mod sample;

pub use catalog::CardCatalog;
pub use deck::{DeckEntry, DeckList, DeckLoader};
pub use sample::{sample_catalog, sample_deck, sample_definitions};
