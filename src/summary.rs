//! End-of-match summary and leaderboard
//!
//! The leaderboard is kept in memory and serialises to JSON; storing it is
//! the host's business.

use serde::{Deserialize, Serialize};

use crate::sim::Side;

/// Maximum number of leaderboard entries to keep
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

/// Read-only projection of a finished match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Whole seconds of presentation time
    pub duration_secs: u64,
    pub turns: u32,
    pub winner: Side,
    pub prism_count: u8,
    pub block_count: u8,
    /// Winning-shot score, 0 unless the Player won
    pub score: u64,
}

impl MatchSummary {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn player_won(&self) -> bool {
        self.winner == Side::Player
    }
}

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player: String,
    pub score: u64,
    /// Turns the match took
    pub turns: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Top scores, sorted descending
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies, returning the rank achieved
    ///
    /// Ties keep the earlier entry ahead.
    pub fn add(
        &mut self,
        player: impl Into<String>,
        score: u64,
        turns: u32,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = LeaderboardEntry {
            player: player.into(),
            score,
            turns,
            timestamp,
        };

        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);

        log::info!("Leaderboard: score {score} placed at rank {rank}");
        Some(rank)
    }

    /// Record a finished match; only Player wins carry a score
    pub fn record(
        &mut self,
        player: impl Into<String>,
        summary: &MatchSummary,
        timestamp: f64,
    ) -> Option<usize> {
        if !summary.player_won() {
            return None;
        }
        self.add(player, summary.score, summary.turns, timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut board: Self = serde_json::from_str(json)?;
        board.entries.sort_by(|a, b| b.score.cmp(&a.score));
        board.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        Ok(board)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(winner: Side, score: u64) -> MatchSummary {
        MatchSummary {
            duration_secs: 95,
            turns: 6,
            winner,
            prism_count: 2,
            block_count: 1,
            score,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let board = Leaderboard::new();
        assert!(!board.qualifies(0));
        assert!(board.qualifies(50));
        assert_eq!(board.potential_rank(50), Some(1));
    }

    #[test]
    fn test_sorted_insert_and_ranks() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add("ana", 200, 4, 1.0), Some(1));
        assert_eq!(board.add("bo", 600, 9, 2.0), Some(1));
        assert_eq!(board.add("cy", 200, 3, 3.0), Some(3));
        assert_eq!(board.potential_rank(100), Some(4));

        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![600, 200, 200]);
        assert_eq!(board.entries[1].player, "ana");
        assert_eq!(board.top_score(), Some(600));
    }

    #[test]
    fn test_full_board_truncates() {
        let mut board = Leaderboard::new();
        for i in 1..=MAX_LEADERBOARD_ENTRIES as u64 {
            board.add("p", i * 100, 1, 0.0);
        }
        assert!(!board.qualifies(100));
        assert_eq!(board.potential_rank(50), None);
        assert_eq!(board.add("late", 150, 1, 0.0), Some(10));
        assert_eq!(board.entries.len(), MAX_LEADERBOARD_ENTRIES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(150));
    }

    #[test]
    fn test_record_ignores_losses() {
        let mut board = Leaderboard::new();
        assert_eq!(board.record("me", &summary(Side::Opponent, 0), 0.0), None);
        assert_eq!(board.record("me", &summary(Side::Player, 600), 0.0), Some(1));
        assert_eq!(board.entries[0].turns, 6);
    }

    #[test]
    fn test_json_restores_order() {
        let json = r#"{"entries":[
            {"player":"a","score":50,"turns":2,"timestamp":0.0},
            {"player":"b","score":400,"turns":5,"timestamp":0.0}
        ]}"#;
        let board = Leaderboard::from_json(json).unwrap();
        assert_eq!(board.top_score(), Some(400));

        let again = Leaderboard::from_json(&board.to_json().unwrap()).unwrap();
        assert_eq!(again.entries, board.entries);
    }

    #[test]
    fn test_summary_json_fields() {
        let json = summary(Side::Player, 600).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["score"], 600);
        assert_eq!(value["winner"], "Player");
        assert_eq!(value["duration_secs"], 95);
    }
}
