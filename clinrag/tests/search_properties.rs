//! Property tests for in-memory index search ordering and threshold gating.

use chrono::NaiveDate;
use clinrag::document::{DocumentMetadata, FragmentPayload};
use clinrag::index::VectorIndex;
use clinrag::inmemory::InMemoryIndex;
use proptest::prelude::*;
use uuid::Uuid;

/// Generate a non-zero L2-normalized vector of the given dimension.
fn arb_normalized_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero vector",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a fragment payload with an arbitrary document name.
fn arb_payload() -> impl Strategy<Value = FragmentPayload> {
    ("[a-z]{3,8}\\.pdf", "[a-z ]{5,30}", 0usize..50).prop_map(|(name, text, sequence)| {
        FragmentPayload {
            text,
            sequence,
            metadata: DocumentMetadata {
                document_id: Uuid::new_v4(),
                document_name: name,
                document_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                title: None,
                author: None,
                description: None,
                tags: Vec::new(),
            },
        }
    })
}

/// For any set of stored vectors, search returns results ordered by
/// descending cosine similarity, bounded by `top_k`, with every score
/// strictly above the hit threshold.
mod prop_search_ordering_and_gating {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_descend_bound_by_top_k_and_exceed_threshold(
            vectors in proptest::collection::vec(arb_normalized_vector(DIM), 1..20),
            payloads in proptest::collection::vec(arb_payload(), 20),
            query in arb_normalized_vector(DIM),
            top_k in 1usize..25,
            hit_threshold in -1.0f32..1.0f32,
        ) {
            let stored = vectors.len();
            let payloads = payloads[..stored].to_vec();

            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let index = InMemoryIndex::new(hit_threshold);
                index.create_collection("test", DIM).await.unwrap();
                index.insert("test", vectors, payloads).await.unwrap();
                index.search("test", &query, top_k).await.unwrap()
            });

            prop_assert!(results.len() <= top_k);
            prop_assert!(results.len() <= stored);

            for hit in &results {
                prop_assert!(
                    hit.score > hit_threshold,
                    "hit score {} not above threshold {}",
                    hit.score,
                    hit_threshold,
                );
            }

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}

/// Reconstructed document text is the in-sequence concatenation of every
/// fragment stored under the document's name.
mod prop_document_reconstruction {
    use super::*;

    const DIM: usize = 4;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn concatenation_follows_sequence_order(
            texts in proptest::collection::vec("[a-z ]{1,20}", 1..10),
            vector in arb_normalized_vector(DIM),
        ) {
            let expected: String = texts.concat();

            let rt = tokio::runtime::Runtime::new().unwrap();
            let reconstructed = rt.block_on(async {
                let index = InMemoryIndex::new(-1.0);
                index.create_collection("test", DIM).await.unwrap();

                let metadata = DocumentMetadata {
                    document_id: Uuid::new_v4(),
                    document_name: "doc.pdf".to_string(),
                    document_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                    title: None,
                    author: None,
                    description: None,
                    tags: Vec::new(),
                };
                // Insert fragments in reverse so reconstruction cannot rely
                // on insertion order.
                let mut vectors = Vec::new();
                let mut payloads = Vec::new();
                for (sequence, text) in texts.iter().enumerate().rev() {
                    vectors.push(vector.clone());
                    payloads.push(FragmentPayload {
                        text: text.clone(),
                        sequence,
                        metadata: metadata.clone(),
                    });
                }
                index.insert("test", vectors, payloads).await.unwrap();
                index.document_text("test", "doc.pdf").await.unwrap()
            });

            prop_assert_eq!(reconstructed.as_deref(), Some(expected.as_str()));
        }
    }
}
