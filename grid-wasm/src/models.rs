use grid_core::PlacedItem;
use serde::{Deserialize, Serialize};

/// Theme shown on the active board: title banner plus axis captions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Theme {
    pub title: String,
    #[serde(default)]
    pub axis_top: String,
    #[serde(default)]
    pub axis_bottom: String,
    #[serde(default)]
    pub axis_left: String,
    #[serde(default)]
    pub axis_right: String,
}

/// A card from the theme's catalog. Lives in the dock until dropped;
/// joined to a placement by id once on the board.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardInfo {
    pub id: String,
    pub title: String,
    pub year: Option<u32>,
    pub image_url: Option<String>,
}

/// The whole editable document: theme, card catalog and placements.
/// Saved/loaded as-is; a fetched theme file is simply a board with an
/// empty layout.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BoardDoc {
    pub theme: Theme,
    #[serde(default)]
    pub cards: Vec<CardInfo>,
    #[serde(default)]
    pub layout: Vec<PlacedItem>,
}

impl BoardDoc {
    /// Stable palette index for a card id: its position in the catalog.
    pub fn card_index(&self, id: &str) -> usize {
        self.cards.iter().position(|c| c.id == id).unwrap_or(0)
    }

    pub fn card_title(&self, id: &str) -> &str {
        self.cards
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.title.as_str())
            .unwrap_or("")
    }

    pub fn is_placed(&self, id: &str) -> bool {
        self.layout.iter().any(|l| l.id == id)
    }

    /// Catalog cards not currently on the board, in catalog order.
    pub fn dock_cards(&self) -> Vec<&CardInfo> {
        self.cards.iter().filter(|c| !self.is_placed(&c.id)).collect()
    }
}
