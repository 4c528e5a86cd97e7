//! Card names from artwork filenames.
//!
//! Two conventions are understood:
//! - `NN-The_High_Priestess` → "The High Priestess" (text after the first hyphen)
//! - `Cups01`, `Wands13` → "Ace of Cups", "Queen of Wands" (suit key + rank code)
//!
//! Any other stem is used verbatim.

use thiserror::Error;

/// Checked in this order; first prefix match wins.
const SUITS: [&str; 4] = ["Cups", "Swords", "Pentacles", "Wands"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardNameError {
    #[error("invalid rank code {rank:?} for suit {suit} in {stem:?}")]
    InvalidRank {
        stem: String,
        suit: &'static str,
        rank: String,
    },

    #[error("no card name after the hyphen in {0:?}")]
    Empty(String),
}

/// Decodes a filename stem (extension already stripped) into a display name.
pub fn card_display_name(stem: &str) -> Result<String, CardNameError> {
    if let Some((_, rest)) = stem.split_once('-') {
        let name = rest.replace('_', " ").trim().to_string();
        if name.is_empty() {
            return Err(CardNameError::Empty(stem.to_string()));
        }
        return Ok(name);
    }

    for suit in SUITS {
        if let Some(rank) = stem.strip_prefix(suit) {
            let rank_name = match rank {
                "01" => "Ace".to_string(),
                "11" => "Page".to_string(),
                "12" => "Knight".to_string(),
                "13" => "Queen".to_string(),
                "14" => "King".to_string(),
                other => other
                    .parse::<u32>()
                    .map_err(|_| CardNameError::InvalidRank {
                        stem: stem.to_string(),
                        suit,
                        rank: other.to_string(),
                    })?
                    .to_string(),
            };
            return Ok(format!("{rank_name} of {suit}"));
        }
    }

    Ok(stem.to_string())
}
