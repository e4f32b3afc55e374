//! Weighted selection from (id, weight) tables

use rand::Rng;
use rand::seq::IndexedRandom;

/// Draw one candidate from `table`.
///
/// Builds a flat pool with each candidate repeated `rolls` times and draws
/// uniformly from it, so candidate `i` comes up with probability
/// `rolls_i / sum(rolls)`. Every candidate needs `rolls >= 1`. Returns `None`
/// only for an empty pool.
pub fn roll<'a, T, R: Rng + ?Sized>(table: &'a [(T, u32)], rng: &mut R) -> Option<&'a T> {
    debug_assert!(
        table.iter().all(|(_, rolls)| *rolls >= 1),
        "every candidate needs at least one roll"
    );
    let pool: Vec<&T> = table
        .iter()
        .flat_map(|(id, rolls)| std::iter::repeat_n(id, *rolls as usize))
        .collect();
    pool.choose(rng).copied()
}

/// Total pool size for a table
pub fn pool_size<T>(table: &[(T, u32)]) -> u32 {
    table.iter().map(|(_, rolls)| rolls).sum()
}
