use super::models::TitleTypeFilter;

pub const DEFAULT_MIN_VOTES_PRIOR: u32 = 5;
pub const DEFAULT_MAX_COMBINATION_SIZE: usize = 4;
pub const DEFAULT_TOP_N: i64 = 10;

/// Tuning knobs for the aggregate reports.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// Weight `m` of the prior mean in the weighted score.
    pub min_votes_prior: u32,
    /// Largest genre combination size shown in reports.
    pub max_combination_size: usize,
    pub top_n: i64,
    /// Limits genre combinations to movies or series. All titles when absent.
    pub combination_title_type: Option<TitleTypeFilter>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            min_votes_prior: DEFAULT_MIN_VOTES_PRIOR,
            max_combination_size: DEFAULT_MAX_COMBINATION_SIZE,
            top_n: DEFAULT_TOP_N,
            combination_title_type: None,
        }
    }
}

/// Bayesian average of `mean` over `votes` samples, pulled towards
/// `prior_mean` with the weight of `min_votes` samples:
///
/// `(v / (v + m)) * R + (m / (v + m)) * C`
pub fn weighted_score(votes: usize, mean: f64, prior_mean: f64, min_votes: u32) -> f64 {
    if votes == 0 {
        return prior_mean;
    }
    let v = votes as f64;
    let m = min_votes as f64;
    (v / (v + m)) * mean + (m / (v + m)) * prior_mean
}
