//! Plain text rendering of report rows.

use std::fmt::{Display, Write};

use super::models::{GenreCombinationScore, TopN};

/// One `"<rank>: <row>"` line per row, ranks starting at 1.
pub fn format_ranked<T: Display>(rows: &[T]) -> String {
    let mut out = String::new();
    for (index, row) in rows.iter().enumerate() {
        // writing to a String cannot fail
        let _ = writeln!(out, "{}: {}", index + 1, row);
    }
    out
}

/// Groups combinations by size `1..=max_size`, keeping the best `top_n` of
/// each size. `scores` must already be sorted best first.
pub fn format_genre_combinations(
    scores: &[GenreCombinationScore],
    top_n: TopN,
    max_size: usize,
) -> String {
    let mut out = String::new();
    for size in 1..=max_size {
        let _ = writeln!(
            out,
            "###### Top {} {}-genre combinations ######",
            top_n.get(),
            size
        );
        let group: Vec<&GenreCombinationScore> = scores
            .iter()
            .filter(|s| s.genres.len() == size)
            .take(top_n.get())
            .collect();
        out.push_str(&format_ranked(&group));
        out.push('\n');
    }
    out
}
