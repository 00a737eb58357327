//! Generation metadata fields and records
//!
//! Embedded PNG text keys use capitalised names (`Prompt`, `CFG_Scale`,
//! ...). Each recognised key maps 1:1 to a [`MetadataField`]; any other
//! key is ignored.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One recognised generation-metadata field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataField {
    Prompt,
    Model,
    Seed,
    CfgScale,
    Steps,
    Sampler,
    Generated,
    CreatedDate,
}

impl MetadataField {
    pub const COUNT: usize = 8;

    pub const ALL: [MetadataField; Self::COUNT] = [
        MetadataField::Prompt,
        MetadataField::Model,
        MetadataField::Seed,
        MetadataField::CfgScale,
        MetadataField::Steps,
        MetadataField::Sampler,
        MetadataField::Generated,
        MetadataField::CreatedDate,
    ];

    /// Internal lowercase field name
    pub fn name(&self) -> &'static str {
        match self {
            MetadataField::Prompt => "prompt",
            MetadataField::Model => "model",
            MetadataField::Seed => "seed",
            MetadataField::CfgScale => "cfg_scale",
            MetadataField::Steps => "steps",
            MetadataField::Sampler => "sampler",
            MetadataField::Generated => "generated",
            MetadataField::CreatedDate => "created_date",
        }
    }

    /// Key used inside the image file's text chunks
    pub fn source_key(&self) -> &'static str {
        match self {
            MetadataField::Prompt => "Prompt",
            MetadataField::Model => "Model",
            MetadataField::Seed => "Seed",
            MetadataField::CfgScale => "CFG_Scale",
            MetadataField::Steps => "Steps",
            MetadataField::Sampler => "Sampler",
            MetadataField::Generated => "Generated",
            MetadataField::CreatedDate => "Created_Date",
        }
    }

    pub fn from_source_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.source_key() == key)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown metadata field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for MetadataField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Metadata held for one identifier
///
/// Every field starts absent. A reload replaces the whole field set at
/// once through [`MetadataRecord::replace`]; there is no per-field setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    file_path: String,
    values: [Option<String>; MetadataField::COUNT],
    width: Option<u32>,
    height: Option<u32>,
}

impl MetadataRecord {
    pub fn new(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            values: Default::default(),
            width: None,
            height: None,
        }
    }

    /// Root-relative path of the backing file
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Point the record at a new backing file; fields are left as they are
    pub fn set_file_path(&mut self, file_path: &str) {
        self.file_path = file_path.to_string();
    }

    pub fn get(&self, field: MetadataField) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    pub fn dimensions(&self) -> (Option<u32>, Option<u32>) {
        (self.width, self.height)
    }

    /// True when no metadata field and no dimension is present
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(Option::is_none) && self.width.is_none() && self.height.is_none()
    }

    /// Replace every field from source-keyed text plus dimensions
    ///
    /// Recognised keys missing from `text` become absent. Unrecognised keys
    /// are ignored.
    pub fn replace(&mut self, text: &HashMap<String, String>, dimensions: Option<(u32, u32)>) {
        let mut values: [Option<String>; MetadataField::COUNT] = Default::default();
        for (key, value) in text {
            if let Some(field) = MetadataField::from_source_key(key) {
                values[field.index()] = Some(value.clone());
            }
        }

        self.values = values;
        self.width = dimensions.map(|(w, _)| w);
        self.height = dimensions.map(|(_, h)| h);
    }

    /// Reset every field and dimension to absent, keeping the path
    pub fn clear(&mut self) {
        self.values = Default::default();
        self.width = None;
        self.height = None;
    }
}
