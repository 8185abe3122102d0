//! Built-in dataset configurations

use crate::config::AdapterConfig;
use crate::mapping::FieldMapping;
use crate::processor::Processor;
use reelx_core::RecordField;

pub const MOVIES: &str = "movies";
pub const CLIMATE: &str = "climate";
pub const SOCIAL: &str = "social";

/// Movie documents, the default dataset
pub fn movies() -> AdapterConfig {
    AdapterConfig::new(MOVIES, "Movie Database")
        .map(RecordField::Id, "_id")
        .map(RecordField::Title, "title")
        .map(
            RecordField::Description,
            FieldMapping::fallback(["overview", "plot", "fullplot", "description"]),
        )
        .map(RecordField::Year, "year")
        .map(RecordField::Embedding, FieldMapping::fallback(["embedding", "plot_embedding"]))
        .map(RecordField::Rating, FieldMapping::fallback(["imdb.rating", "imdb_rating"]))
        .map(RecordField::Genres, "genres")
        .map(RecordField::Director, FieldMapping::fallback(["director", "directors"]))
        .map(RecordField::Cast, "cast")
        .map(RecordField::PosterUrl, FieldMapping::fallback(["poster_url", "poster"]))
        .map(RecordField::Runtime, "runtime")
        .process(RecordField::Rating, Processor::Float)
        .process(RecordField::Year, Processor::Integer)
        .process(RecordField::Genres, Processor::List)
        .process(RecordField::Cast, Processor::List)
        .process(RecordField::Runtime, Processor::Integer)
}

/// Climate research studies; impact scores arrive on a 0-100 scale
pub fn climate() -> AdapterConfig {
    AdapterConfig::new(CLIMATE, "Climate Research Data")
        .map(RecordField::Id, "_id")
        .map(RecordField::Title, "study_title")
        .map(RecordField::Description, "abstract")
        .map(RecordField::Year, "publication_year")
        .map(RecordField::Embedding, "embedding")
        .map(RecordField::Rating, "impact_score")
        .map(RecordField::Genres, "research_areas")
        .map(RecordField::Director, "lead_researcher")
        .map(RecordField::Cast, "research_team")
        .map(RecordField::PosterUrl, "visualization_url")
        .process(RecordField::Rating, Processor::Rescale { max: 100.0 })
        .process(RecordField::Year, Processor::Integer)
        .process(RecordField::Genres, Processor::CommaList)
        .process(RecordField::Cast, Processor::CommaList)
}

/// Social issue reports
pub fn social() -> AdapterConfig {
    AdapterConfig::new(SOCIAL, "Social Issues Research")
        .map(RecordField::Id, "_id")
        .map(RecordField::Title, "issue_title")
        .map(RecordField::Description, "issue_description")
        .map(RecordField::Year, "reported_year")
        .map(RecordField::Embedding, "embedding")
        .map(RecordField::Rating, "urgency_score")
        .map(RecordField::Genres, "issue_categories")
        .map(RecordField::Director, "organization")
        .map(RecordField::Cast, "affected_communities")
        .map(RecordField::PosterUrl, "info_graphic_url")
        .process(RecordField::Rating, Processor::Float)
        .process(RecordField::Year, Processor::Integer)
        .process(RecordField::Genres, Processor::List)
        .process(RecordField::Cast, Processor::List)
}

/// Every built-in configuration
pub fn all() -> Vec<AdapterConfig> {
    vec![movies(), climate(), social()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::DatasetAdapter;
    use serde_json::json;

    #[test]
    fn test_templates_are_valid() {
        for config in all() {
            let name = config.dataset_type.clone();
            assert!(config.validate().is_ok(), "template {} failed validation", name);
        }
    }

    #[test]
    fn test_climate_rescales_and_splits() {
        let raw = json!({
            "_id": "c1",
            "study_title": "Arctic melt",
            "abstract": "Sea ice decline",
            "publication_year": "2019",
            "embedding": [0.2, 0.8],
            "impact_score": "85",
            "research_areas": "Oceans, Ice",
            "research_team": "A. Smith, B. Jones"
        });
        let record = DatasetAdapter::new(climate()).normalize(&raw).unwrap();
        assert_eq!(record.year, 2019);
        assert_eq!(record.rating, Some(8.5));
        assert_eq!(record.genres, vec!["Oceans", "Ice"]);
        assert_eq!(record.cast, vec!["A. Smith", "B. Jones"]);
        assert_eq!(record.dataset_type(), Some(CLIMATE));
    }

    #[test]
    fn test_social_wraps_scalars() {
        let raw = json!({
            "_id": "s1",
            "issue_title": "Housing",
            "issue_description": "Rent burden",
            "reported_year": 2022,
            "embedding": [1.0, 0.0],
            "urgency_score": "9.1",
            "issue_categories": "Economy",
            "organization": "City Council"
        });
        let record = DatasetAdapter::new(social()).normalize(&raw).unwrap();
        assert_eq!(record.genres, vec!["Economy"]);
        assert_eq!(record.director.as_deref(), Some("City Council"));
        assert_eq!(record.rating, Some(9.1));
    }
}
