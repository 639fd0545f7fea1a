//! Tests for the vector index module

use super::*;
use crate::embeddings::{Embedder, EmbeddingError, EmbeddingResult, HashingEmbedder};
use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

/// Embedder that maps each text to a caller-chosen vector by its first word
struct FixedEmbedder {
    model: &'static str,
    dimension: usize,
}

#[async_trait]
impl Embedder for FixedEmbedder {
    fn model_id(&self) -> &str {
        self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0; self.dimension];
                let axis = text.len() % self.dimension;
                v[axis] = 1.0;
                v
            })
            .collect())
    }
}

/// Embedder whose vectors are shorter than it claims
struct ShortEmbedder;

#[async_trait]
impl Embedder for ShortEmbedder {
    fn model_id(&self) -> &str {
        "short"
    }

    fn dimension(&self) -> usize {
        8
    }

    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0; 4]).collect())
    }
}

fn hashing(dimension: usize) -> Arc<dyn Embedder> {
    Arc::new(HashingEmbedder::new(dimension).unwrap())
}

fn create_test_index(dimension: usize) -> (VectorIndex, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let index = VectorIndex::new(temp_dir.path().join("vector_index"), hashing(dimension));
    (index, temp_dir)
}

fn trust() -> TrustAcknowledgement {
    TrustAcknowledgement::accept_deserialization_risk()
}

fn corpus() -> Vec<String> {
    vec![
        "Die Grünen fordern mehr Klimaschutz und erneuerbare Energien".to_string(),
        "Die FDP setzt auf Steuersenkungen und Digitalisierung".to_string(),
        "Die SPD will den Mindestlohn erhöhen und die Rente sichern".to_string(),
        "Die CDU betont innere Sicherheit und solide Finanzen".to_string(),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[tokio::test]
async fn test_build_returns_queryable_handle() {
    let (index, _temp_dir) = create_test_index(256);
    let handle = index.build(&corpus()).await.unwrap();

    assert_eq!(handle.len(), 4);
    assert!(!handle.is_empty());
    assert_eq!(handle.dimension(), 256);
    assert_eq!(handle.model_id(), "hashing-256");

    let results = index.search(&handle, "Mindestlohn Rente", 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].text.contains("Mindestlohn"));
    assert_eq!(results[0].position, 2);
}

#[tokio::test]
async fn test_build_persists_directory() {
    let (index, _temp_dir) = create_test_index(64);
    let handle = index.build(&corpus()).await.unwrap();

    assert!(index.path().join("index.bin").exists());
    assert!(index.path().join("manifest.json").exists());

    let manifest: IndexManifest = serde_json::from_slice(
        &std::fs::read(index.path().join("manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest.index_id, handle.index_id());
    assert_eq!(manifest.chunk_count, 4);
    assert_eq!(manifest.model_id, "hashing-64");
}

#[tokio::test]
async fn test_load_roundtrip() {
    let (index, _temp_dir) = create_test_index(64);
    let built = index.build(&corpus()).await.unwrap();

    let loaded = index.load(trust()).await.unwrap();
    assert_eq!(loaded.index_id(), built.index_id());
    assert_eq!(
        loaded.chunks().collect::<Vec<_>>(),
        built.chunks().collect::<Vec<_>>()
    );

    let a = index.search(&built, "Klimaschutz", 2).await.unwrap();
    let b = index.search(&loaded, "Klimaschutz", 2).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_load_missing_path() {
    let (index, _temp_dir) = create_test_index(64);

    let result = index.load(trust()).await;
    assert!(matches!(result, Err(VectorError::IndexNotFound { .. })));
}

#[tokio::test]
async fn test_load_missing_manifest() {
    let (index, _temp_dir) = create_test_index(64);
    index.build(&corpus()).await.unwrap();
    std::fs::remove_file(index.path().join("manifest.json")).unwrap();

    let result = index.load(trust()).await;
    assert!(matches!(result, Err(VectorError::IndexNotFound { .. })));
}

#[tokio::test]
async fn test_load_corrupt_index() {
    let (index, _temp_dir) = create_test_index(64);
    index.build(&corpus()).await.unwrap();
    std::fs::write(index.path().join("index.bin"), b"not an index").unwrap();

    let result = index.load(trust()).await;
    assert!(matches!(result, Err(VectorError::IndexNotFound { .. })));
}

#[tokio::test]
async fn test_load_waits_for_manifest_of_concurrent_build() {
    let (index, _temp_dir) = create_test_index(64);
    index.build(&corpus()).await.unwrap();

    // A second writer at another path stands in for a build in another process
    let other_dir = TempDir::new().unwrap();
    let other = VectorIndex::new(other_dir.path().join("vector_index"), hashing(64));
    let rebuilt = other.build(&corpus()[..2]).await.unwrap();

    // index.bin already replaced, manifest still the old one
    std::fs::copy(
        other.path().join("index.bin"),
        index.path().join("index.bin"),
    )
    .unwrap();

    let staged = index.path().join("manifest.json.staged");
    std::fs::copy(other.path().join("manifest.json"), &staged).unwrap();
    let target = index.path().join("manifest.json");
    let writer = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        std::fs::rename(staged, target).unwrap();
    });

    let loaded = index.load(trust()).await.unwrap();
    writer.await.unwrap();

    assert_eq!(loaded.index_id(), rebuilt.index_id());
    assert_eq!(loaded.len(), 2);
}

#[tokio::test]
async fn test_load_garbled_manifest() {
    let (index, _temp_dir) = create_test_index(64);
    index.build(&corpus()).await.unwrap();
    std::fs::write(index.path().join("manifest.json"), b"{").unwrap();

    let result = index.load(trust()).await;
    assert!(matches!(result, Err(VectorError::IndexNotFound { .. })));
}

#[tokio::test]
async fn test_load_with_other_model_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("idx");

    VectorIndex::new(&path, hashing(32))
        .build(&corpus())
        .await
        .unwrap();

    let result = VectorIndex::new(&path, hashing(64)).load(trust()).await;
    assert!(matches!(
        result,
        Err(VectorError::Embedding(EmbeddingError::ModelMismatch { .. }))
    ));
}

#[tokio::test]
async fn test_load_with_other_dimension_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("idx");

    let small: Arc<dyn Embedder> = Arc::new(FixedEmbedder {
        model: "fixed",
        dimension: 4,
    });
    let large: Arc<dyn Embedder> = Arc::new(FixedEmbedder {
        model: "fixed",
        dimension: 8,
    });

    VectorIndex::new(&path, small).build(&corpus()).await.unwrap();

    let result = VectorIndex::new(&path, large).load(trust()).await;
    assert!(matches!(
        result,
        Err(VectorError::Embedding(EmbeddingError::DimensionMismatch {
            expected: 8,
            actual: 4
        }))
    ));
}

#[tokio::test]
async fn test_build_rejects_wrong_dimension() {
    let temp_dir = TempDir::new().unwrap();
    let index = VectorIndex::new(temp_dir.path().join("idx"), Arc::new(ShortEmbedder));

    let result = index.build(&corpus()).await;
    assert!(matches!(
        result,
        Err(VectorError::Embedding(EmbeddingError::DimensionMismatch { .. }))
    ));
    assert!(!index.path().join("index.bin").exists());
}

#[tokio::test]
async fn test_build_rejects_empty_corpus() {
    let (index, _temp_dir) = create_test_index(64);
    assert!(matches!(index.build(&[]).await, Err(VectorError::EmptyIndex)));
}

#[tokio::test]
async fn test_rebuild_overwrites() {
    let (index, _temp_dir) = create_test_index(64);
    index.build(&corpus()).await.unwrap();
    let second = index
        .build(&["Nur ein einziger Abschnitt".to_string()])
        .await
        .unwrap();

    let loaded = index.load(trust()).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.index_id(), second.index_id());
}

#[tokio::test]
async fn test_search_zero_k_rejected() {
    let (index, _temp_dir) = create_test_index(64);
    let handle = index.build(&corpus()).await.unwrap();

    let result = index.search(&handle, "Rente", 0).await;
    assert!(matches!(result, Err(VectorError::InvalidK { k: 0 })));
}

#[tokio::test]
async fn test_search_k_larger_than_index_returns_all() {
    let (index, _temp_dir) = create_test_index(64);
    let handle = index.build(&corpus()).await.unwrap();

    let results = index.search(&handle, "Rente", 10).await.unwrap();
    assert_eq!(results.len(), 4);
}

#[tokio::test]
async fn test_search_ties_keep_insertion_order() {
    let (index, _temp_dir) = create_test_index(64);
    let chunks = vec![
        "gleich".to_string(),
        "gleich".to_string(),
        "gleich".to_string(),
    ];
    let handle = index.build(&chunks).await.unwrap();

    let results = index.search(&handle, "gleich", 3).await.unwrap();
    let positions: Vec<usize> = results.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_search_vector_checks_dimension() {
    let (index, _temp_dir) = create_test_index(16);
    let handle = index.build(&corpus()).await.unwrap();

    let result = handle.search_vector(&[1.0; 8], 1);
    assert!(matches!(
        result,
        Err(VectorError::Embedding(EmbeddingError::DimensionMismatch {
            expected: 16,
            actual: 8
        }))
    ));
}

#[test]
fn test_default_config() {
    let config = VectorIndexConfig::default();
    assert_eq!(config.retrieval_k, 3);
    assert!(!config.allow_dangerous_deserialization);
    assert!(config.validate().is_ok());
    assert!(config.with_retrieval_k(0).validate().is_err());
}

// ============================================================================
// Property Tests
// ============================================================================

fn chunk_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{2,8}( [a-z]{2,8}){0,6}", 1..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Search returns at most k results, best first, all drawn from the corpus
    #[test]
    fn prop_search_bounded_ordered_members(
        chunks in chunk_strategy(),
        query in "[a-z]{2,8}( [a-z]{2,8}){0,3}",
        k in 1usize..10,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (index, _temp_dir) = create_test_index(32);
            let handle = index.build(&chunks).await.unwrap();
            let results = index.search(&handle, &query, k).await.unwrap();

            prop_assert!(results.len() <= k);
            prop_assert_eq!(results.len(), k.min(chunks.len()));
            for pair in results.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
            for result in &results {
                prop_assert!(chunks.contains(&result.text));
                prop_assert_eq!(&chunks[result.position], &result.text);
            }
            Ok(())
        })?;
    }
}
