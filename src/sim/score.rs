//! Winning-shot scoring

/// Score for a winning Player shot with `deflections` prism interactions
pub fn calculate_score(deflections: u32) -> u64 {
    match deflections {
        0 => 50,
        1 => 100,
        2 => 200,
        h => u64::from(h) * 100 * 2,
    }
}
