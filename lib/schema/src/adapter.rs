//! Dataset adapters
//!
//! An adapter turns one raw source record into the normalized shape in two
//! steps. [`DatasetAdapter::transform`] resolves mappings and runs processors;
//! it never fails and may produce an incomplete [`TransformedRecord`].
//! [`DatasetAdapter::validate`] then reports what is missing or mistyped, and
//! [`DatasetAdapter::into_normalized`] converts valid records.

use crate::config::AdapterConfig;
use reelx_core::{NormalizedRecord, RecordField, Vector, DATASET_TYPE_KEY, ORIGINAL_DATA_KEY};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One problem with a transformed record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    Missing(RecordField),

    #[error("Field '{field}' must be {expected}")]
    WrongType {
        field: RecordField,
        expected: &'static str,
    },

    #[error("Field 'embedding' has {actual} dimensions, expected {expected}")]
    EmbeddingDimension { expected: usize, actual: usize },
}

/// Outcome of validating one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub errors: Vec<ValidationError>,
}

impl Validation {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            f.write_str("valid")
        } else {
            f.write_str(&self.messages().join("; "))
        }
    }
}

impl Serialize for Validation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Validation", 2)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", &self.messages())?;
        state.end()
    }
}

/// A record after mapping and coercion, before validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedRecord {
    fields: BTreeMap<RecordField, Value>,
    metadata: Map<String, Value>,
}

impl TransformedRecord {
    /// Mapped value of `field`, if the mapping resolved
    pub fn get(&self, field: RecordField) -> Option<&Value> {
        self.fields.get(&field)
    }

    /// Present and not null
    pub fn is_present(&self, field: RecordField) -> bool {
        self.get(field).map(|v| !v.is_null()).unwrap_or(false)
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn dataset_type(&self) -> Option<&str> {
        self.metadata.get(DATASET_TYPE_KEY).and_then(Value::as_str)
    }

    /// The record id if it can be read, for diagnostics
    pub fn id(&self) -> Option<String> {
        self.get(RecordField::Id).and_then(read_id)
    }
}

/// Transforms and validates records of one dataset
///
/// Holds nothing but its configuration, so one adapter can serve any number
/// of concurrent calls.
#[derive(Debug, Clone)]
pub struct DatasetAdapter {
    config: AdapterConfig,
}

impl DatasetAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn dataset_type(&self) -> &str {
        &self.config.dataset_type
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Map `raw` into the normalized field layout
    ///
    /// Required fields are kept even when their source holds null so that
    /// processors and validation see them; optional fields that do not
    /// resolve, or resolve to null, are left out. The raw record and the
    /// dataset type are always stored in the metadata.
    pub fn transform(&self, raw: &Value) -> TransformedRecord {
        let mut fields = BTreeMap::new();
        let mut metadata = Map::new();

        for field in RecordField::all() {
            let Some(mapping) = self.config.mapping(field) else {
                continue;
            };
            let Some(value) = mapping.resolve(raw) else {
                continue;
            };

            if field == RecordField::Metadata {
                if let Value::Object(extra) = value {
                    metadata = extra;
                }
                continue;
            }
            if value.is_null() && !field.is_required() {
                continue;
            }
            fields.insert(field, value);
        }

        for (field, processor) in &self.config.processors {
            if let Some(value) = fields.get_mut(field) {
                *value = processor.apply(value, raw);
            }
        }

        metadata.insert(ORIGINAL_DATA_KEY.to_string(), raw.clone());
        metadata.insert(
            DATASET_TYPE_KEY.to_string(),
            Value::String(self.config.dataset_type.clone()),
        );

        TransformedRecord { fields, metadata }
    }

    /// Check required fields for presence and type
    pub fn validate(&self, record: &TransformedRecord) -> Validation {
        let mut errors = Vec::new();

        for field in RecordField::REQUIRED {
            if !record.is_present(field) {
                errors.push(ValidationError::Missing(field));
                continue;
            }
            let value = &record.fields[&field];
            let expected = match field {
                RecordField::Id => read_id(value).is_none().then_some("a string or number"),
                RecordField::Title | RecordField::Description => {
                    value.as_str().is_none().then_some("a string")
                }
                RecordField::Year => read_year(value).is_none().then_some("an integer year"),
                RecordField::Embedding => {
                    read_embedding(value).is_none().then_some("a non-empty array of numbers")
                }
                _ => None,
            };
            if let Some(expected) = expected {
                errors.push(ValidationError::WrongType { field, expected });
            }
        }

        if let (Some(expected), Some(embedding)) = (
            self.config.embedding_dim,
            record.get(RecordField::Embedding).and_then(read_embedding),
        ) {
            if embedding.dim() != expected {
                errors.push(ValidationError::EmbeddingDimension {
                    expected,
                    actual: embedding.dim(),
                });
            }
        }

        Validation { errors }
    }

    /// Convert a transformed record, failing with its validation result
    pub fn into_normalized(&self, record: TransformedRecord) -> Result<NormalizedRecord, Validation> {
        let validation = self.validate(&record);
        if !validation.is_valid() {
            return Err(validation);
        }

        let TransformedRecord { fields, metadata } = record;
        let field = |f: RecordField| fields.get(&f);

        let (Some(id), Some(title), Some(description), Some(year), Some(embedding)) = (
            field(RecordField::Id).and_then(read_id),
            field(RecordField::Title).and_then(Value::as_str),
            field(RecordField::Description).and_then(Value::as_str),
            field(RecordField::Year).and_then(read_year),
            field(RecordField::Embedding).and_then(read_embedding),
        ) else {
            return Err(validation);
        };

        let mut normalized = NormalizedRecord::new(id, title, description, year, embedding);
        normalized.rating = field(RecordField::Rating).and_then(read_rating);
        normalized.genres = field(RecordField::Genres).map(read_strings).unwrap_or_default();
        normalized.director = field(RecordField::Director).and_then(read_director);
        normalized.cast = field(RecordField::Cast).map(read_strings).unwrap_or_default();
        normalized.poster_url = field(RecordField::PosterUrl)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        normalized.runtime = field(RecordField::Runtime).and_then(read_runtime);
        normalized.metadata = metadata;

        Ok(normalized)
    }

    /// Transform and convert in one step
    pub fn normalize(&self, raw: &Value) -> Result<NormalizedRecord, Validation> {
        self.into_normalized(self.transform(raw))
    }
}

/// Strings, numbers, and extended-JSON object ids (`{"$oid": "..."}`)
fn read_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn read_year(value: &Value) -> Option<i32> {
    let Value::Number(n) = value else {
        return None;
    };
    let year = match n.as_i64() {
        Some(i) => i,
        None => {
            let f = n.as_f64()?;
            if f.fract() != 0.0 {
                return None;
            }
            f as i64
        }
    };
    i32::try_from(year).ok()
}

fn read_embedding(value: &Value) -> Option<Vector> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect::<Option<Vec<f32>>>()
        .map(Vector::new)
}

fn read_rating(value: &Value) -> Option<f32> {
    let rating = value.as_f64()?;
    if !rating.is_finite() {
        return None;
    }
    Some(rating.clamp(0.0, f64::from(reelx_core::filter::MAX_RATING)) as f32)
}

fn read_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn read_director(value: &Value) -> Option<String> {
    let name = read_strings(value).join(", ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn read_runtime(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|m| u32::try_from(m).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldMapping;
    use crate::processor::Processor;
    use crate::templates;
    use serde_json::json;

    fn movies() -> DatasetAdapter {
        DatasetAdapter::new(templates::movies())
    }

    #[test]
    fn test_movie_end_to_end() {
        let raw = json!({
            "_id": "1",
            "title": "X",
            "plot": "great action",
            "year": "1999",
            "genres": "Action",
            "embedding": [1, 0]
        });
        let adapter = movies();
        let transformed = adapter.transform(&raw);
        assert!(adapter.validate(&transformed).is_valid());

        let record = adapter.into_normalized(transformed).unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(record.title, "X");
        assert_eq!(record.description, "great action");
        assert_eq!(record.year, 1999);
        assert_eq!(record.genres, vec!["Action"]);
        assert_eq!(record.embedding.as_slice(), &[1.0, 0.0]);
        assert!(record.rating.is_none());
        assert!(record.cast.is_empty());
        assert_eq!(record.dataset_type(), Some("movies"));
        assert_eq!(record.original_data(), Some(&raw));
    }

    #[test]
    fn test_missing_required_field_flagged() {
        let raw = json!({"_id": "2", "plot": "no title", "year": 2001, "embedding": [0.1]});
        let adapter = movies();
        let validation = adapter.validate(&adapter.transform(&raw));

        assert!(!validation.is_valid());
        assert_eq!(validation.errors, vec![ValidationError::Missing(RecordField::Title)]);
        assert_eq!(validation.messages(), vec!["Missing required field: title"]);
    }

    #[test]
    fn test_one_error_per_missing_field() {
        let adapter = movies();
        let validation = adapter.validate(&adapter.transform(&json!({})));
        // nothing resolves, so every required field is reported
        assert_eq!(validation.errors.len(), 5);
    }

    #[test]
    fn test_null_year_coerced_to_zero() {
        let raw = json!({"_id": "3", "title": "T", "overview": "o", "year": null, "embedding": [1.0]});
        let record = movies().normalize(&raw).unwrap();
        assert_eq!(record.year, 0);
    }

    #[test]
    fn test_wrong_types_reported() {
        let raw = json!({"_id": true, "title": 5, "overview": "o", "year": 1999.5, "embedding": ["a"]});
        let adapter = DatasetAdapter::new(
            AdapterConfig::new("raw", "Raw")
                .map(RecordField::Id, "_id")
                .map(RecordField::Title, "title")
                .map(RecordField::Description, "overview")
                .map(RecordField::Year, "year")
                .map(RecordField::Embedding, "embedding"),
        );
        let validation = adapter.validate(&adapter.transform(&raw));
        assert_eq!(validation.errors.len(), 4);
        assert!(validation.errors.iter().all(|e| matches!(e, ValidationError::WrongType { .. })));
    }

    #[test]
    fn test_optional_null_omitted() {
        let raw = json!({"_id": "1", "title": "T", "overview": "o", "year": 2000,
            "embedding": [1.0], "director": null});
        let transformed = movies().transform(&raw);
        assert!(transformed.get(RecordField::Director).is_none());
    }

    #[test]
    fn test_embedding_dimension_enforced() {
        let adapter = DatasetAdapter::new(templates::movies().with_embedding_dim(3));
        let raw = json!({"_id": "1", "title": "T", "overview": "o", "year": 2000, "embedding": [1.0, 0.0]});
        let validation = adapter.validate(&adapter.transform(&raw));
        assert_eq!(
            validation.errors,
            vec![ValidationError::EmbeddingDimension { expected: 3, actual: 2 }]
        );
    }

    #[test]
    fn test_nested_rating_and_object_id() {
        let raw = json!({
            "_id": {"$oid": "573a1390f29313caabcd42e8"},
            "title": "The Great Train Robbery",
            "fullplot": "Among the earliest existing films",
            "year": 1903,
            "imdb": {"rating": 7.4},
            "directors": ["Edwin S. Porter"],
            "plot_embedding": [0.5, 0.5],
            "runtime": 11
        });
        let record = movies().normalize(&raw).unwrap();
        assert_eq!(record.id, "573a1390f29313caabcd42e8");
        assert_eq!(record.rating, Some(7.4));
        assert_eq!(record.director.as_deref(), Some("Edwin S. Porter"));
        assert_eq!(record.runtime, Some(11));
        assert_eq!(record.description, "Among the earliest existing films");
    }

    #[test]
    fn test_metadata_mapping_merged() {
        let config = templates::movies().map(RecordField::Metadata, "extra");
        let raw = json!({"_id": "1", "title": "T", "overview": "o", "year": 2000,
            "embedding": [1.0], "extra": {"source": "import"}});
        let record = DatasetAdapter::new(config).normalize(&raw).unwrap();
        assert_eq!(record.metadata.get("source"), Some(&json!("import")));
        assert_eq!(record.dataset_type(), Some("movies"));
    }

    #[test]
    fn test_derived_mapping_and_custom_processor() {
        let config = AdapterConfig::new("songs", "Songs")
            .map(RecordField::Id, "key")
            .map(RecordField::Title, "name")
            .map(
                RecordField::Description,
                FieldMapping::derived(|raw| {
                    let artist = raw.get("artist")?.as_str()?;
                    Some(json!(format!("by {}", artist)))
                }),
            )
            .map(RecordField::Year, "released")
            .map(RecordField::Embedding, "vec")
            .map(RecordField::Rating, "stars")
            .process(
                RecordField::Rating,
                Processor::custom(|value, _| json!(value.as_f64().unwrap_or(0.0) * 2.0)),
            );
        let raw = json!({"key": 7, "name": "Song", "artist": "Band", "released": 1970,
            "vec": [1.0], "stars": 4});
        let record = DatasetAdapter::new(config).normalize(&raw).unwrap();
        assert_eq!(record.id, "7");
        assert_eq!(record.description, "by Band");
        assert_eq!(record.rating, Some(8.0));
    }

    #[test]
    fn test_rating_clamped() {
        let raw = json!({"_id": "1", "title": "T", "overview": "o", "year": 2000,
            "embedding": [1.0], "imdb_rating": "11.2"});
        let record = movies().normalize(&raw).unwrap();
        assert_eq!(record.rating, Some(10.0));
    }

    #[test]
    fn test_validation_serializes_as_messages() {
        let validation = Validation {
            errors: vec![ValidationError::Missing(RecordField::Year)],
        };
        assert_eq!(
            serde_json::to_value(&validation).unwrap(),
            json!({"valid": false, "errors": ["Missing required field: year"]})
        );
    }
}
