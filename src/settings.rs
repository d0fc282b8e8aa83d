//! Board tuning: dimensions, wave delays, spawn probabilities and the gem
//! catalog.
//!
//! The defaults mirror the shipped tuning of the game this core drives.
//! `Settings::instant` zeroes every delay, which keeps the cascade order
//! intact while letting tests resolve a full board in microseconds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{GemData, GemKind, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board_width: i32,
    pub board_height: i32,

    /// Percent chance (0..=100) that a refill spawn becomes the plain bomb.
    pub bomb_chance: u32,
    /// Rows above the target cell at which spawned views drop in.
    pub drop_height: i32,
    /// Minimum cluster size that earns a bomb at the cluster's anchor.
    pub min_match_for_bomb: usize,

    /// Spawnable color gems.
    pub gems: Vec<GemData>,
    /// The plain bomb spawned by `bomb_chance`.
    pub bomb: GemData,
    /// Color-bomb variants created from oversized clusters, one per color.
    pub color_bombs: Vec<GemData>,

    /// Delay before destroying pieces caught in a bomb's blast area.
    pub bomb_neighbor_delay: f32,
    /// Delay before a marked bomb detonates itself.
    pub bomb_self_delay: f32,
    /// Settle time after bomb self-destruction.
    pub bomb_post_self_delay: f32,
    /// Delay before gravity starts collapsing rows.
    pub row_collapse_delay: f32,
    /// Delay between single-row fall steps within a column.
    pub row_step_delay: f32,
    /// Stagger between column gravity task starts; 0 starts all at once.
    pub column_stagger_delay: f32,
    /// Delay before the post-gravity full-board rescan.
    pub rescan_delay: f32,
    /// Delay before a chained destroy cycle begins.
    pub destroy_wave_delay: f32,
    /// Delay before handing control back to the player.
    pub idle_delay: f32,
}

impl Default for Settings {
    fn default() -> Self {
        let gems = GemKind::COLORS
            .iter()
            .map(|&kind| GemData::normal(kind, 10))
            .collect();
        let color_bombs = GemKind::COLORS
            .iter()
            .map(|&kind| GemData::color_bomb(kind, 2, 50))
            .collect();

        Self {
            board_width: DEFAULT_BOARD_WIDTH,
            board_height: DEFAULT_BOARD_HEIGHT,
            bomb_chance: 3,
            drop_height: 1,
            min_match_for_bomb: 4,
            gems,
            bomb: GemData::plain_bomb(2, 100),
            color_bombs,
            bomb_neighbor_delay: 0.3,
            bomb_self_delay: 0.2,
            bomb_post_self_delay: 0.1,
            row_collapse_delay: 0.2,
            row_step_delay: 0.05,
            column_stagger_delay: 0.03,
            rescan_delay: 0.2,
            destroy_wave_delay: 0.1,
            idle_delay: 0.0,
        }
    }
}

impl Settings {
    /// Default tuning with every delay zeroed. Wave ordering is unchanged;
    /// only the real-time pacing disappears.
    pub fn instant() -> Self {
        Self {
            bomb_neighbor_delay: 0.0,
            bomb_self_delay: 0.0,
            bomb_post_self_delay: 0.0,
            row_collapse_delay: 0.0,
            row_step_delay: 0.0,
            column_stagger_delay: 0.0,
            rescan_delay: 0.0,
            destroy_wave_delay: 0.0,
            idle_delay: 0.0,
            ..Self::default()
        }
    }

    /// Load settings from a JSON document; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The color-bomb catalog entry for `kind`, if one is configured.
    pub fn color_bomb_for(&self, kind: GemKind) -> Option<GemData> {
        if kind == GemKind::Bomb {
            return Some(self.bomb);
        }
        self.color_bombs.iter().copied().find(|b| b.kind == kind)
    }

    pub(crate) fn duration(seconds: f32) -> Duration {
        Duration::from_secs_f32(seconds.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_covers_all_colors() {
        let settings = Settings::default();
        assert_eq!(settings.gems.len(), GemKind::COLORS.len());
        for kind in GemKind::COLORS {
            let bomb = settings.color_bomb_for(kind).unwrap();
            assert_eq!(bomb.kind, kind);
            assert!(bomb.is_color_bomb);
        }
    }

    #[test]
    fn test_bomb_kind_maps_to_plain_bomb() {
        let settings = Settings::default();
        let bomb = settings.color_bomb_for(GemKind::Bomb).unwrap();
        assert_eq!(bomb.kind, GemKind::Bomb);
        assert!(!bomb.is_color_bomb);
    }

    #[test]
    fn test_from_json_partial_overrides() {
        let settings =
            Settings::from_json_str(r#"{"board_width": 9, "min_match_for_bomb": 5}"#).unwrap();
        assert_eq!(settings.board_width, 9);
        assert_eq!(settings.min_match_for_bomb, 5);
        // Untouched fields keep the defaults.
        assert_eq!(settings.board_height, DEFAULT_BOARD_HEIGHT);
        assert_eq!(settings.bomb_chance, 3);
    }

    #[test]
    fn test_instant_zeroes_every_delay() {
        let settings = Settings::instant();
        assert_eq!(settings.bomb_neighbor_delay, 0.0);
        assert_eq!(settings.row_step_delay, 0.0);
        assert_eq!(settings.rescan_delay, 0.0);
    }
}
