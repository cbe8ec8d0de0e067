use medsearch_common::{MedSearchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Flat string-to-string metadata stored next to each vector
pub type Metadata = BTreeMap<String, String>;

/// One catalog row
///
/// Values are kept as strings, in file order, against headers shared by the
/// whole catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicineRecord {
    /// Upsert key, trimmed
    pub id: String,

    /// Medicine name, the only embedded field; may be empty
    pub name: String,

    headers: Arc<[String]>,
    values: Vec<String>,
}

impl MedicineRecord {
    /// Build a record from the catalog headers and a data row
    ///
    /// Only a blank `id` is refused, since nothing could be upserted under it.
    pub fn from_row(headers: &Arc<[String]>, row: &csv::StringRecord) -> Result<Self> {
        let values: Vec<String> = row.iter().map(str::to_string).collect();

        let lookup = |key: &str| {
            headers
                .iter()
                .position(|h| h == key)
                .and_then(|i| values.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let id = lookup("id");
        let name = lookup("name");

        if id.is_empty() {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            return Err(MedSearchError::invalid_input(format!("row at line {} has no id", line)));
        }

        Ok(Self {
            id,
            name,
            headers: Arc::clone(headers),
            values,
        })
    }

    /// Metadata map stored with the vector: every column as a string
    ///
    /// `id` and `name` carry the trimmed values used for the upsert.
    pub fn metadata(&self) -> Metadata {
        self.headers
            .iter()
            .enumerate()
            .filter_map(|(i, header)| Some((header.clone(), self.value_at(i)?.to_string())))
            .collect()
    }

    /// Value of a column, if present
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.value_at(index)
    }

    fn value_at(&self, index: usize) -> Option<&str> {
        match self.headers.get(index).map(String::as_str) {
            Some("id") => Some(self.id.as_str()),
            Some("name") => Some(self.name.as_str()),
            Some(_) => self.values.get(index).map(String::as_str),
            None => None,
        }
    }
}

/// Vector persisted in the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorStoreEntry {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Metadata,
}

/// One ranked query hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// Stored id
    pub id: String,

    /// Similarity score, higher is closer
    pub score: f64,

    /// Stored metadata
    pub metadata: Metadata,
}
