use crate::category::Category;

/// A rating as it is written to the ratings table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRating {
    pub title_key: String,
    pub personal_rating: Option<i64>,
    pub date_rated: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub title_type: Option<String>,
    pub external_rating: Option<f64>,
    pub runtime_mins: Option<i64>,
    pub year: Option<i64>,
    pub num_votes: Option<i64>,
    pub release_date: Option<String>,
}

/// Names to attach to a rating for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNames {
    pub category: Category,
    pub names: Vec<String>,
}

impl CategoryNames {
    pub fn new(category: Category, names: Vec<String>) -> Self {
        Self { category, names }
    }
}

/// A stored rating whose contributor metadata is incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteTitle {
    pub movie_id: i64,
    pub title_key: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub ratings: usize,
    pub actors: usize,
    pub directors: usize,
    pub musicians: usize,
    pub genres: usize,
    pub incomplete: usize,
}

/// Trims names, drops empty ones and removes duplicates keeping the first
/// occurrence.
pub fn normalize_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for name in names {
        let trimmed = name.as_ref().trim();
        if !trimmed.is_empty() && !normalized.iter().any(|n| n == trimmed) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}
