//! Deck Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("The model didn't generate any flashcards")]
    Empty,

    #[error("Card index {index} out of range (deck has {len} cards)")]
    IndexOutOfRange { index: usize, len: usize },
}
