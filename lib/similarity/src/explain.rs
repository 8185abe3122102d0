//! Explainability for search results
//!
//! Scores each result against the query embedding and lists the query terms
//! that also appear in the record, so a result list can show why each item
//! matched. The prose explanation is produced elsewhere, by the generation
//! service, from these structures.

use reelx_core::{cosine_similarity_or_zero, Embedded, NormalizedRecord, Vector};
use serde::Serialize;

/// Query words this short or shorter are ignored for keyword matching
pub const MIN_TERM_LEN: usize = 2;

/// Coarse bucket for a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrength {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl MatchStrength {
    pub fn from_score(score: f32) -> Self {
        if score > 0.8 {
            MatchStrength::Excellent
        } else if score > 0.6 {
            MatchStrength::Good
        } else if score > 0.4 {
            MatchStrength::Fair
        } else {
            MatchStrength::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchStrength::Excellent => "Excellent Match",
            MatchStrength::Good => "Good Match",
            MatchStrength::Fair => "Fair Match",
            MatchStrength::Weak => "Weak Match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceFactors {
    pub semantic_similarity: f32,
    pub keyword_matches: usize,
    /// Whether any genre contains a query term
    pub genre_alignment: bool,
}

/// Why a single record matched a query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchExplanation {
    pub record_id: String,
    pub title: String,
    pub similarity_score: f32,
    pub matching_keywords: Vec<String>,
    pub relevance_factors: RelevanceFactors,
    pub match_strength: MatchStrength,
}

impl SearchExplanation {
    /// Explain one record given the already-tokenized query
    pub fn from_record(
        terms: &[String],
        query_embedding: Option<&Vector>,
        record: &NormalizedRecord,
    ) -> Self {
        let similarity_score = match (query_embedding.and_then(Embedded::embedding), record.embedding()) {
            (Some(q), Some(e)) => cosine_similarity_or_zero(q.as_slice(), e.as_slice()),
            _ => 0.0,
        };

        let text = format!(
            "{} {} {}",
            record.title,
            record.description,
            record.genres.join(" ")
        )
        .to_lowercase();

        let matching_keywords: Vec<String> = terms
            .iter()
            .filter(|term| text.contains(term.as_str()))
            .cloned()
            .collect();

        let genre_alignment = record.genres.iter().any(|genre| {
            let genre = genre.to_lowercase();
            terms.iter().any(|term| genre.contains(term.as_str()))
        });

        Self {
            record_id: record.id.clone(),
            title: record.title.clone(),
            similarity_score,
            relevance_factors: RelevanceFactors {
                semantic_similarity: similarity_score,
                keyword_matches: matching_keywords.len(),
                genre_alignment,
            },
            matching_keywords,
            match_strength: MatchStrength::from_score(similarity_score),
        }
    }
}

/// Lowercased query words longer than [`MIN_TERM_LEN`] characters
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_TERM_LEN)
        .map(str::to_string)
        .collect()
}

/// Explain every record in `records` against `query`, keeping their order
pub fn explain_results(
    query: &str,
    query_embedding: Option<&Vector>,
    records: &[NormalizedRecord],
) -> Vec<SearchExplanation> {
    let terms = query_terms(query);
    records
        .iter()
        .map(|record| SearchExplanation::from_record(&terms, query_embedding, record))
        .collect()
}

/// Response body for an explained search
#[derive(Debug, Clone, Serialize)]
pub struct ExplainResponse {
    pub query: String,
    pub explanations: Vec<SearchExplanation>,
    pub summary: ExplanationSummary,
}

impl ExplainResponse {
    pub fn new(query: &str, query_embedding: Option<&Vector>, records: &[NormalizedRecord]) -> Self {
        let explanations = explain_results(query, query_embedding, records);
        let summary = ExplanationSummary::compute(&explanations);
        Self {
            query: query.to_string(),
            explanations,
            summary,
        }
    }
}

/// Summary statistics over a set of explanations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationSummary {
    pub results_count: usize,
    pub avg_score: f32,
    pub best_score: f32,
    /// Id of the highest-scoring record
    pub best_match: Option<String>,
}

impl ExplanationSummary {
    pub fn compute(explanations: &[SearchExplanation]) -> Self {
        if explanations.is_empty() {
            return Self {
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                best_match: None,
            };
        }

        let total: f32 = explanations.iter().map(|e| e.similarity_score).sum();
        let best = explanations
            .iter()
            .max_by(|a, b| {
                a.similarity_score
                    .partial_cmp(&b.similarity_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        Self {
            results_count: explanations.len(),
            avg_score: total / explanations.len() as f32,
            best_score: best.map(|e| e.similarity_score).unwrap_or(0.0),
            best_match: best.map(|e| e.record_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str, description: &str, genres: &[&str], embedding: Vec<f32>) -> NormalizedRecord {
        NormalizedRecord::new(id, title, description, 2000, Vector::new(embedding))
            .with_genres(genres.iter().copied())
    }

    #[test]
    fn test_query_terms_drop_short_words() {
        assert_eq!(query_terms("An epic of space war"), vec!["epic", "space", "war"]);
    }

    #[test]
    fn test_match_strength_thresholds() {
        assert_eq!(MatchStrength::from_score(0.95), MatchStrength::Excellent);
        assert_eq!(MatchStrength::from_score(0.8), MatchStrength::Good);
        assert_eq!(MatchStrength::from_score(0.5), MatchStrength::Fair);
        assert_eq!(MatchStrength::from_score(0.4), MatchStrength::Weak);
        assert_eq!(MatchStrength::Weak.label(), "Weak Match");
    }

    #[test]
    fn test_explain_keywords_and_genres() {
        let records = vec![record(
            "1",
            "Starship Troopers",
            "Soldiers fight bugs in space",
            &["Action", "Sci-Fi"],
            vec![1.0, 0.0],
        )];
        let query = Vector::new(vec![1.0, 0.0]);
        let explanations = explain_results("space action movie", Some(&query), &records);

        let e = &explanations[0];
        assert_eq!(e.record_id, "1");
        assert_eq!(e.matching_keywords, vec!["space", "action"]);
        assert_eq!(e.relevance_factors.keyword_matches, 2);
        assert!(e.relevance_factors.genre_alignment);
        assert!((e.similarity_score - 1.0).abs() < 1e-6);
        assert_eq!(e.match_strength, MatchStrength::Excellent);
    }

    #[test]
    fn test_explain_without_query_embedding() {
        let records = vec![record("1", "Heat", "Heist", &[], vec![1.0, 0.0])];
        let explanations = explain_results("heist", None, &records);
        assert_eq!(explanations[0].similarity_score, 0.0);
        assert_eq!(explanations[0].match_strength, MatchStrength::Weak);
    }

    #[test]
    fn test_summary() {
        let records = vec![
            record("1", "a", "", &[], vec![1.0, 0.0]),
            record("2", "b", "", &[], vec![0.0, 1.0]),
        ];
        let query = Vector::new(vec![0.0, 1.0]);
        let response = ExplainResponse::new("anything", Some(&query), &records);

        assert_eq!(response.summary.results_count, 2);
        assert_eq!(response.summary.best_match.as_deref(), Some("2"));
        assert!((response.summary.avg_score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ExplanationSummary::compute(&[]);
        assert_eq!(summary.results_count, 0);
        assert!(summary.best_match.is_none());
    }

    #[test]
    fn test_serialization_keys() {
        let records = vec![record("1", "a", "", &[], vec![1.0])];
        let json = serde_json::to_string(&explain_results("a", None, &records)).unwrap();
        assert!(json.contains("\"recordId\""));
        assert!(json.contains("\"relevanceFactors\""));
        assert!(json.contains("\"matchStrength\":\"weak\""));
    }
}
