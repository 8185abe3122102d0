use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Metadata key holding the raw source record
pub const ORIGINAL_DATA_KEY: &str = "originalData";

/// Metadata key holding the type of the dataset the record came from
pub const DATASET_TYPE_KEY: &str = "datasetType";

/// Field names of the normalized record shape
///
/// The snake_case names are what adapter configurations use as mapping keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Id,
    Title,
    Description,
    Year,
    Embedding,
    Rating,
    Genres,
    Director,
    Cast,
    #[serde(alias = "posterUrl")]
    PosterUrl,
    Runtime,
    Metadata,
}

impl RecordField {
    /// Fields every valid record must carry
    pub const REQUIRED: [RecordField; 5] = [
        RecordField::Id,
        RecordField::Title,
        RecordField::Description,
        RecordField::Year,
        RecordField::Embedding,
    ];

    pub const OPTIONAL: [RecordField; 7] = [
        RecordField::Rating,
        RecordField::Genres,
        RecordField::Director,
        RecordField::Cast,
        RecordField::PosterUrl,
        RecordField::Runtime,
        RecordField::Metadata,
    ];

    #[inline]
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordField::Id => "id",
            RecordField::Title => "title",
            RecordField::Description => "description",
            RecordField::Year => "year",
            RecordField::Embedding => "embedding",
            RecordField::Rating => "rating",
            RecordField::Genres => "genres",
            RecordField::Director => "director",
            RecordField::Cast => "cast",
            RecordField::PosterUrl => "poster_url",
            RecordField::Runtime => "runtime",
            RecordField::Metadata => "metadata",
        }
    }

    /// All fields, required first
    pub fn all() -> impl Iterator<Item = RecordField> {
        Self::REQUIRED.into_iter().chain(Self::OPTIONAL)
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical record shape every dataset adapter produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub embedding: Vector,
    /// Score in [0, 10]; missing ratings count as 0 for filtering and sorting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cast: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    /// Running time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl NormalizedRecord {
    /// Create a record with only the required fields set
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        year: i32,
        embedding: Vector,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            year,
            embedding,
            rating: None,
            genres: Vec::new(),
            director: None,
            cast: Vec::new(),
            poster_url: None,
            runtime: None,
            metadata: Map::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_runtime(mut self, minutes: u32) -> Self {
        self.runtime = Some(minutes);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_director(mut self, director: impl Into<String>) -> Self {
        self.director = Some(director.into());
        self
    }

    #[inline]
    pub fn rating_or_default(&self) -> f32 {
        self.rating.unwrap_or(0.0)
    }

    #[inline]
    pub fn runtime_or_default(&self) -> u32 {
        self.runtime.unwrap_or(0)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    /// Type of the dataset this record was normalized from, if recorded
    pub fn dataset_type(&self) -> Option<&str> {
        self.metadata.get(DATASET_TYPE_KEY).and_then(Value::as_str)
    }

    /// The raw source record, if recorded
    pub fn original_data(&self) -> Option<&Value> {
        self.metadata.get(ORIGINAL_DATA_KEY)
    }
}

/// Anything that may carry an embedding
pub trait Embedded {
    fn embedding(&self) -> Option<&Vector>;
}

impl Embedded for NormalizedRecord {
    fn embedding(&self) -> Option<&Vector> {
        if self.embedding.is_empty() {
            None
        } else {
            Some(&self.embedding)
        }
    }
}

impl Embedded for Vector {
    fn embedding(&self) -> Option<&Vector> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl<T: Embedded> Embedded for Option<T> {
    fn embedding(&self) -> Option<&Vector> {
        self.as_ref().and_then(Embedded::embedding)
    }
}

impl<T: Embedded + ?Sized> Embedded for &T {
    fn embedding(&self) -> Option<&Vector> {
        (**self).embedding()
    }
}
