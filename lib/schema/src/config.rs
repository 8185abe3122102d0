//! Adapter configuration
//!
//! Describes one dataset's shape: which source fields feed each normalized
//! field and how their values are coerced. Configurations are built in code
//! (see [`crate::templates`]) or loaded from JSON, which is how user-defined
//! datasets arrive.

use crate::mapping::FieldMapping;
use crate::processor::Processor;
use reelx_core::{Error, RecordField, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Unique key of the dataset
    #[serde(rename = "type")]
    pub dataset_type: String,

    /// Display label
    pub name: String,

    #[serde(default)]
    pub field_mappings: HashMap<RecordField, FieldMapping>,

    #[serde(default)]
    pub processors: HashMap<RecordField, Processor>,

    /// When set, embeddings of any other length fail validation
    #[serde(default)]
    pub embedding_dim: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(AdapterConfig),
    Many(Vec<AdapterConfig>),
}

impl AdapterConfig {
    /// Create an empty configuration
    pub fn new(dataset_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dataset_type: dataset_type.into(),
            name: name.into(),
            field_mappings: HashMap::new(),
            processors: HashMap::new(),
            embedding_dim: None,
        }
    }

    #[must_use]
    pub fn map(mut self, field: RecordField, mapping: impl Into<FieldMapping>) -> Self {
        self.field_mappings.insert(field, mapping.into());
        self
    }

    #[must_use]
    pub fn process(mut self, field: RecordField, processor: Processor) -> Self {
        self.processors.insert(field, processor);
        self
    }

    #[must_use]
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = Some(dim);
        self
    }

    /// A user-defined dataset with one source field per normalized field
    ///
    /// Blank entries are ignored. The standard coercions for user datasets
    /// are attached: rating as float, year as integer, genres and cast as
    /// lists.
    pub fn custom<I, S>(dataset_type: &str, name: &str, mappings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (RecordField, S)>,
        S: Into<String>,
    {
        let mut config = Self::new(dataset_type, name)
            .process(RecordField::Rating, Processor::Float)
            .process(RecordField::Year, Processor::Integer)
            .process(RecordField::Genres, Processor::List)
            .process(RecordField::Cast, Processor::List);
        for (field, source) in mappings {
            config = config.map(field, FieldMapping::Direct(source.into()));
        }
        config.validate()
    }

    /// Check the configuration and drop blank mappings
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] when the type or name is blank, a required
    /// field has no mapping, or the embedding dimension is zero.
    pub fn validate(mut self) -> Result<Self> {
        if self.dataset_type.trim().is_empty() {
            return Err(Error::InvalidConfig("dataset type cannot be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "dataset '{}' has no name",
                self.dataset_type
            )));
        }

        self.field_mappings.retain(|_, mapping| !mapping.is_blank());

        let missing: Vec<&str> = RecordField::REQUIRED
            .iter()
            .filter(|field| !self.field_mappings.contains_key(*field))
            .map(|field| field.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "dataset '{}' has no mapping for required fields: {}",
                self.dataset_type,
                missing.join(", ")
            )));
        }

        if self.embedding_dim == Some(0) {
            return Err(Error::InvalidConfig(format!(
                "dataset '{}' declares a zero embedding dimension",
                self.dataset_type
            )));
        }

        Ok(self)
    }

    pub fn mapping(&self, field: RecordField) -> Option<&FieldMapping> {
        self.field_mappings.get(&field)
    }

    pub fn processor(&self, field: RecordField) -> Option<&Processor> {
        self.processors.get(&field)
    }

    /// Parse and validate a single configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AdapterConfig = serde_json::from_str(json)?;
        config.validate()
    }

    /// Load one configuration or an array of them from a JSON file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let configs = match serde_json::from_str::<OneOrMany>(&content)? {
            OneOrMany::One(config) => vec![config],
            OneOrMany::Many(configs) => configs,
        };
        configs.into_iter().map(AdapterConfig::validate).collect()
    }
}
