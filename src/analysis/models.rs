//! Rows returned by the analyser. Each prints as a tuple, the way reports
//! render them.

use std::fmt;

use super::error::POSITIVE_INT_ERR_MESSAGE;
use super::AnalysisError;

/// A validated, strictly positive result count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopN(usize);

impl TopN {
    pub fn new(n: i64) -> Result<Self, AnalysisError> {
        if n < 1 {
            return Err(AnalysisError::InvalidArgument(format!(
                "{}, got {}",
                POSITIVE_INT_ERR_MESSAGE, n
            )));
        }
        Ok(Self(n as usize))
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub(crate) fn as_sql(self) -> i64 {
        self.0 as i64
    }
}

impl TryFrom<i64> for TopN {
    type Error = AnalysisError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        TopN::new(n)
    }
}

fn fmt_opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

fn fmt_opt_f64(value: &Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "None".to_string(),
    }
}

/// A title with its personal score.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleScore {
    pub title: Option<String>,
    pub personal_rating: Option<i64>,
}

impl fmt::Display for TitleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})",
            fmt_opt(&self.title),
            fmt_opt(&self.personal_rating)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeanEntry {
    pub name: String,
    pub mean: f64,
}

impl fmt::Display for MeanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {:.2})", self.name, self.mean)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyEntry {
    pub name: String,
    pub count: usize,
    /// Absent when none of the titles carries a personal score.
    pub mean: Option<f64>,
}

impl fmt::Display for FrequencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.name, self.count, fmt_opt_f64(&self.mean))
    }
}

/// Personal score minus external score, signed.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingGap {
    pub title: Option<String>,
    pub gap: Option<f64>,
}

impl fmt::Display for RatingGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", fmt_opt(&self.title), fmt_opt_f64(&self.gap))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleRatings {
    pub title: Option<String>,
    pub personal_rating: Option<i64>,
    pub external_rating: Option<f64>,
}

impl fmt::Display for TitleRatings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            fmt_opt(&self.title),
            fmt_opt(&self.personal_rating),
            fmt_opt(&self.external_rating)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingBucket {
    pub personal_rating: i64,
    pub titles: usize,
}

impl fmt::Display for RatingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.personal_rating, self.titles)
    }
}

/// Score of one distinct genre set. `genres` is sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreCombinationScore {
    pub genres: Vec<String>,
    pub titles: usize,
    pub mean: f64,
    pub weighted: f64,
}

impl fmt::Display for GenreCombinationScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) - {:.2}", self.genres.join(", "), self.weighted)
    }
}

/// Restricts a report to movies or to series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleTypeFilter {
    /// Titles whose type is exactly "movie".
    Movies,
    /// TV series and mini-series.
    Series,
}

impl TitleTypeFilter {
    pub(crate) fn sql_condition(self) -> &'static str {
        match self {
            TitleTypeFilter::Movies => "r.title_type = 'movie'",
            TitleTypeFilter::Series => "r.title_type IN ('tvSeries', 'tvMiniSeries')",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RuntimeUnit {
    Hours,
    Days,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_n_rejects_non_positive() {
        for n in [0, -1, i64::MIN] {
            let err = TopN::new(n).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidArgument(_)));
            assert!(err.to_string().contains(POSITIVE_INT_ERR_MESSAGE));
        }
        assert_eq!(TopN::new(3).unwrap().get(), 3);
        assert_eq!(TopN::try_from(1).unwrap().get(), 1);
    }

    #[test]
    fn test_row_display() {
        let score = TitleScore {
            title: Some("Heat".to_string()),
            personal_rating: Some(9),
        };
        assert_eq!(score.to_string(), "(Heat, 9)");

        let gap = RatingGap {
            title: Some("Heat".to_string()),
            gap: None,
        };
        assert_eq!(gap.to_string(), "(Heat, None)");

        let frequency = FrequencyEntry {
            name: "Al Pacino".to_string(),
            count: 3,
            mean: Some(8.0 / 3.0),
        };
        assert_eq!(frequency.to_string(), "(Al Pacino, 3, 2.67)");

        let combination = GenreCombinationScore {
            genres: vec!["Comedy".to_string(), "Drama".to_string()],
            titles: 2,
            mean: 7.5,
            weighted: 7.0,
        };
        assert_eq!(combination.to_string(), "(Comedy, Drama) - 7.00");
    }
}
