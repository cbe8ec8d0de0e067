use medsearch_common::{MedSearchError, Result};
use medsearch_embedding::{catalog_text, Embedder};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::normalize::ProbeBounds;
use crate::store::VectorStore;
use crate::types::{MedicineRecord, VectorStoreEntry};

/// Rows sent per upsert call
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Parsed medicine CSV
#[derive(Debug, Clone)]
pub struct Catalog {
    pub headers: Arc<[String]>,
    pub records: Vec<MedicineRecord>,

    /// Rows dropped for having no id
    pub skipped: usize,
}

impl Catalog {
    /// Parse CSV with a header row containing at least `id` and `name`
    ///
    /// Rows without an id are skipped with a warning; every other row is kept,
    /// including rows with a blank name.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Arc<[String]> = csv_reader.headers()?.iter().map(str::to_string).collect();
        for required in ["id", "name"] {
            if !headers.iter().any(|h| h == required) {
                return Err(MedSearchError::invalid_input(format!(
                    "CSV is missing the '{}' column",
                    required
                )));
            }
        }

        let mut records = Vec::new();
        let mut skipped = 0;
        for row in csv_reader.records() {
            match MedicineRecord::from_row(&headers, &row?) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Skipping row: {}", e);
                    skipped += 1;
                }
            }
        }

        Ok(Self {
            headers,
            records,
            skipped,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            MedSearchError::invalid_input(format!("Cannot open {}: {}", path.display(), e))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Indexed-column bounds present in this file
    pub fn probe_bounds(&self) -> ProbeBounds {
        ProbeBounds::from_headers(self.headers.iter())
    }
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows embedded and submitted
    pub records: usize,

    /// Upsert calls issued
    pub batches: usize,

    /// Vectors the store reported as written
    pub upserted: usize,
}

/// Embeds catalog rows and upserts them in fixed-size batches
pub struct BulkLoader {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl BulkLoader {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            batch_size: UPSERT_BATCH_SIZE,
        }
    }

    /// Load a CSV file into the store
    pub async fn load_csv(&self, path: &Path) -> Result<LoadReport> {
        let catalog = Catalog::from_path(path)?;
        info!(
            "Read {} medicines from {} ({} rows skipped)",
            catalog.records.len(),
            path.display(),
            catalog.skipped
        );

        let file_bounds = catalog.probe_bounds();
        if !ProbeBounds::DEFAULT.covers(&file_bounds) {
            warn!(
                "CSV has more indexed columns than lookups read ({:?} vs {:?}); extra columns are stored but not returned",
                file_bounds,
                ProbeBounds::DEFAULT
            );
        }

        self.upsert_batch(&catalog.records).await
    }

    /// Embed and upsert `records`, one store call per batch
    ///
    /// Stops at the first failing batch; batches already written stay written.
    pub async fn upsert_batch(&self, records: &[MedicineRecord]) -> Result<LoadReport> {
        let total_batches = records.len().div_ceil(self.batch_size);
        let mut report = LoadReport {
            records: 0,
            batches: 0,
            upserted: 0,
        };

        for (batch_no, chunk) in records.chunks(self.batch_size).enumerate() {
            let mut entries = Vec::with_capacity(chunk.len());

            for record in chunk {
                let embedding = self
                    .embedder
                    .embed(&catalog_text(&record.name))
                    .await
                    .map_err(|e| {
                        MedSearchError::embedding(format!(
                            "batch {}/{}: record '{}': {}",
                            batch_no + 1,
                            total_batches,
                            record.id,
                            e
                        ))
                    })?;

                entries.push(VectorStoreEntry {
                    id: record.id.clone(),
                    values: embedding.into_inner(),
                    metadata: record.metadata(),
                });
            }

            let upserted = self.store.upsert(entries).await.map_err(|e| {
                MedSearchError::vector_store(format!(
                    "batch {}/{} failed: {}",
                    batch_no + 1,
                    total_batches,
                    e
                ))
            })?;

            report.records += chunk.len();
            report.batches += 1;
            report.upserted += upserted;
            debug!("Batch {}/{} upserted ({} vectors)", batch_no + 1, total_batches, upserted);
        }

        info!(
            "Uploaded {} medicines in {} batches",
            report.records, report.batches
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::types::ScoredMatch;
    use async_trait::async_trait;
    use medsearch_embedding::{Embedding, EmbeddingFailure};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DIM: usize = 4;

    struct ConstEmbedder;

    #[async_trait]
    impl Embedder for ConstEmbedder {
        async fn embed(&self, text: &str) -> std::result::Result<Embedding, EmbeddingFailure> {
            Embedding::new(vec![text.len() as f32, 1.0, 0.5, 0.25], DIM)
        }

        fn dimension(&self) -> usize {
            DIM
        }

        fn model_name(&self) -> &str {
            "const"
        }
    }

    /// Records upsert batch sizes, optionally failing on one call
    struct RecordingStore {
        calls: AtomicUsize,
        sizes: std::sync::Mutex<Vec<usize>>,
        fail_on: Option<usize>,
    }

    impl RecordingStore {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                sizes: std::sync::Mutex::new(Vec::new()),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn upsert(&self, entries: Vec<VectorStoreEntry>) -> Result<usize> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(call) {
                return Err(MedSearchError::vector_store("payload too large"));
            }
            self.sizes.lock().unwrap().push(entries.len());
            Ok(entries.len())
        }

        async fn query(&self, _vector: &Embedding, _top_k: usize) -> Result<Vec<ScoredMatch>> {
            Ok(Vec::new())
        }
    }

    fn records(n: usize) -> Vec<MedicineRecord> {
        let headers: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        (0..n)
            .map(|i| {
                let row = csv::StringRecord::from(vec![i.to_string(), format!("Medicine {}", i)]);
                MedicineRecord::from_row(&headers, &row).unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_batch_count() {
        for (n, expected) in [(0, 0), (1, 1), (100, 1), (101, 2), (250, 3)] {
            let store = Arc::new(RecordingStore::new(None));
            let loader = BulkLoader::new(Arc::new(ConstEmbedder), store.clone());

            let report = loader.upsert_batch(&records(n)).await.unwrap();
            assert_eq!(report.batches, expected, "n={}", n);
            assert_eq!(report.records, n);
            assert_eq!(store.calls.load(Ordering::SeqCst), expected);
        }
    }

    #[tokio::test]
    async fn test_batches_are_bounded() {
        let store = Arc::new(RecordingStore::new(None));
        let loader = BulkLoader::new(Arc::new(ConstEmbedder), store.clone());
        loader.upsert_batch(&records(250)).await.unwrap();

        assert_eq!(*store.sizes.lock().unwrap(), vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_failed_batch_stops_load() {
        let store = Arc::new(RecordingStore::new(Some(1)));
        let loader = BulkLoader::new(Arc::new(ConstEmbedder), store.clone());

        let err = loader.upsert_batch(&records(300)).await.unwrap_err();
        assert!(err.to_string().contains("batch 2/3"));
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reload_overwrites() {
        let store = InMemoryStore::new(DIM);
        let loader = BulkLoader::new(Arc::new(ConstEmbedder), Arc::new(store.clone()));

        loader.upsert_batch(&records(3)).await.unwrap();
        loader.upsert_batch(&records(3)).await.unwrap();
        assert_eq!(store.count().await, 3);
    }

    #[test]
    fn test_catalog_from_reader() {
        let csv = "id,name,substitute0,substitute1,sideEffect0,use0,Chemical Class,Habit Forming,Therapeutic Class,Action Class\n\
                   1,augmentin 625 duo tablet,Penciclav 500 mg/125 mg Tablet,,Vomiting,Treatment of Bacterial infections,,No,ANTI INFECTIVES,\n\
                   2,azithral 500 tablet,Zithrocare 500mg Tablet,Azax 500 Tablet,Vomiting,Treatment of Bacterial infections,Macrolides,No,ANTI INFECTIVES,Macrolides\n";

        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.records.len(), 2);
        assert_eq!(catalog.records[0].name, "augmentin 625 duo tablet");
        assert_eq!(catalog.records[1].get("substitute1"), Some("Azax 500 Tablet"));
        assert_eq!(catalog.records[0].metadata()["Chemical Class"], "");

        let bounds = catalog.probe_bounds();
        assert_eq!(bounds.substitutes, 2);
        assert_eq!(bounds.side_effects, 1);
    }

    #[test]
    fn test_catalog_requires_columns() {
        let err = Catalog::from_reader("id,title\n1,Crocin\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MedSearchError::InvalidInput(_)));
    }

    #[test]
    fn test_catalog_keeps_blank_names_and_skips_blank_ids() {
        let csv = "id,name,substitute0\nX1,Paracetamol,Crocin\nX2,,Brufen\n,Aspirin,Disprin\nX3,Ibuprofen,Brufen\n";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();

        let ids: Vec<&str> = catalog.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["X1", "X2", "X3"]);
        assert_eq!(catalog.records[1].name, "");
        assert_eq!(catalog.skipped, 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_embedded_and_upserted() {
        let csv = "id,name\nX1,Paracetamol\nX2,\n";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();

        let store = InMemoryStore::new(DIM);
        let loader = BulkLoader::new(Arc::new(ConstEmbedder), Arc::new(store.clone()));
        let report = loader.upsert_batch(&catalog.records).await.unwrap();

        assert_eq!(report.records, 2);
        let entry = store.get("X2").await.unwrap();
        // "Medicine: " has length 10
        assert_eq!(entry.values[0], 10.0);
        assert_eq!(entry.metadata["name"], "");
    }

    #[tokio::test]
    async fn test_load_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name,substitute0").unwrap();
        writeln!(file, " X1 ,Paracetamol,Crocin").unwrap();
        writeln!(file, "X2,Ibuprofen,Brufen").unwrap();

        let store = InMemoryStore::new(DIM);
        let loader = BulkLoader::new(Arc::new(ConstEmbedder), Arc::new(store.clone()));
        let report = loader.load_csv(file.path()).await.unwrap();

        assert_eq!(report.records, 2);
        assert_eq!(report.batches, 1);
        let entry = store.get("X1").await.unwrap();
        assert_eq!(entry.metadata["substitute0"], "Crocin");
        assert_eq!(entry.metadata["id"], "X1");
    }
}
