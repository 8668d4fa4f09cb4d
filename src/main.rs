//! Prism Duel headless entry point
//!
//! Plays a seeded match between two scripted sides and prints the board,
//! the opponent's commentary and the JSON summary.
//!
//! Usage: `prism-duel [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use prism_duel::commentary::Commentator;
    use prism_duel::sim::{MatchState, ScriptedOpponent, Side};
    use prism_duel::{Leaderboard, MatchConfig};

    /// Presentation seconds credited per half-turn
    const SECONDS_PER_TURN: f64 = 4.0;
    /// Scripted sides can shuffle forever; cap the demo
    const MAX_TURNS: u32 = 200;

    env_logger::init();
    log::info!("Prism Duel (native) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => MatchConfig::load_or_default(path),
        None => MatchConfig::default(),
    };
    let seed = config.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    let mut state = MatchState::new(config, seed);
    let mut player = ScriptedOpponent::new(Side::Player, seed.wrapping_add(1));
    let mut opponent = ScriptedOpponent::new(Side::Opponent, seed.wrapping_add(2));
    let mut commentator = Commentator::offline(seed);

    println!("seed {seed}\n{}", state.board());
    println!("tip: {}", commentator.tactical_tip());

    while !state.is_over() {
        if state.turn().turns >= MAX_TURNS {
            log::info!("Turn limit reached, player concedes");
            if let Err(err) = state.surrender(Side::Player) {
                log::error!("Surrender refused: {err}");
                return;
            }
            break;
        }

        let side = state.turn().active;
        let script = match side {
            Side::Player => &mut player,
            Side::Opponent => &mut opponent,
        };
        if let Err(err) = script.take_turn(&mut state) {
            log::error!("{side} turn failed: {err}");
            return;
        }
        state.advance_clock(SECONDS_PER_TURN);

        for event in state.drain_events() {
            if let Some(line) = commentator.react(&event) {
                println!("AI: {line}");
            }
        }
    }

    println!("{}", state.board());
    let Some(summary) = state.summary() else {
        return;
    };
    match summary.to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Summary export failed: {err}"),
    }

    let mut leaderboard = Leaderboard::new();
    if let Some(rank) = leaderboard.record("scripted", &summary, 0.0) {
        println!("leaderboard rank {rank}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser host; the library is the product on wasm
}
