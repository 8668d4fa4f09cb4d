//! Opponent commentary
//!
//! Flavor text is produced by an optional [`TextGenerator`] (typically a
//! remote language model owned by the host). The rules core never calls it;
//! hosts feed drained [`GameEvent`]s to [`Commentator::react`]. Any failure
//! falls back to canned lines so the game never stalls on text.

use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::sim::{GameEvent, Side};

const OFFLINE_TAUNTS: &[&str] = &[
    "Firing solution computed. Your generator is already lost.",
    "Prism lattice realigned. Nothing you move will matter.",
    "Another inefficient move. I have logged it.",
    "Every path on this board ends at your core.",
    "Beam output nominal. Brace yourself.",
    "Your plan has been modelled and discarded.",
    "Angles corrected. The next shot is yours to fear.",
];

const OFFLINE_TIPS: &[&str] = &[
    "REFLECTION: a beam striking a flat leg of a prism turns 90 degrees.",
    "REFRACTION: a beam entering the slanted face leaves on a diagonal, one cell later it is gone.",
    "DEFENSE: blocks soak up fire. Two hits and they shatter.",
    "SCORING: every prism the winning beam touches multiplies your score.",
    "MOVEMENT: a roll of 2 moves one piece two cells, or two pieces one cell each.",
    "EMITTER: slide your emitter along your baseline before firing for a fresh angle.",
];

#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("text generator unavailable: {0}")]
    Unavailable(String),
    #[error("text generator returned no text")]
    Empty,
}

/// Source of generated flavor text
pub trait TextGenerator {
    /// One-line taunt reacting to `action`
    fn taunt(&mut self, action: &str) -> Result<String, CommentaryError>;

    /// Short explanation of reflection vs refraction
    fn tactical_tip(&mut self) -> Result<String, CommentaryError>;
}

/// Wraps an optional generator with offline fallbacks
pub struct Commentator {
    generator: Option<Box<dyn TextGenerator>>,
    rng: Pcg32,
}

impl Commentator {
    /// Canned lines only
    pub fn offline(seed: u64) -> Self {
        Self {
            generator: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn with_generator(generator: Box<dyn TextGenerator>, seed: u64) -> Self {
        Self {
            generator: Some(generator),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn taunt(&mut self, action: &str) -> String {
        let generated = self.generator.as_mut().map(|g| g.taunt(action));
        self.or_fallback(generated, OFFLINE_TAUNTS, "taunt")
    }

    pub fn tactical_tip(&mut self) -> String {
        let generated = self.generator.as_mut().map(|g| g.tactical_tip());
        self.or_fallback(generated, OFFLINE_TIPS, "tip")
    }

    /// Taunt for an opponent action or the end of the match, `None` otherwise
    pub fn react(&mut self, event: &GameEvent) -> Option<String> {
        let action = describe(event)?;
        Some(self.taunt(&action))
    }

    fn or_fallback(
        &mut self,
        generated: Option<Result<String, CommentaryError>>,
        lines: &[&str],
        what: &str,
    ) -> String {
        match generated {
            Some(Ok(text)) if !text.trim().is_empty() => return text,
            Some(Ok(_)) => log::warn!("Commentary {what} failed: {}", CommentaryError::Empty),
            Some(Err(err)) => log::warn!("Commentary {what} failed: {err}"),
            None => {}
        }
        lines.choose(&mut self.rng).copied().unwrap_or_default().to_string()
    }
}

/// Plain description of an opponent action, as handed to the generator
fn describe(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::PieceMoved {
            side: Side::Opponent,
            from,
            to,
            ..
        } => Some(format!("moved a piece from ({}, {}) to ({}, {})", from.x, from.y, to.x, to.y)),
        GameEvent::PieceRotated {
            side: Side::Opponent,
            pos,
            orientation,
        } => Some(format!(
            "rotated the prism at ({}, {}) to {} degrees",
            pos.x,
            pos.y,
            orientation.degrees()
        )),
        GameEvent::BeamFired {
            side: Side::Opponent,
            trace,
        } => Some(format!("fired a laser that bent {} times", trace.deflections)),
        GameEvent::MatchEnded {
            winner: Side::Opponent,
            ..
        } => Some("destroyed the enemy generator".to_string()),
        GameEvent::MatchEnded {
            winner: Side::Player,
            ..
        } => Some("lost its own generator to the enemy beam".to_string()),
        _ => None,
    }
}
