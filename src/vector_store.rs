//! In-memory ranked-retrieval index over ingested chunks.
//!
//! Chunks are stored append-only; after every addition the TF-IDF model
//! is refit over the entire accumulated corpus so that rarity weights
//! stay globally consistent. Queries are scored by the unnormalized dot
//! product between the query vector and each corpus vector, which keeps
//! ranking faithful to raw term-frequency/rarity weights (no length
//! normalization; longer chunks can score higher).

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use serde::Serialize;

use crate::chunker::{Chunk, ChunkMetadata};

/// Default vocabulary cap: only the most frequent terms are kept.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Default number of results returned by retrieval.
pub const DEFAULT_TOP_K: usize = 5;

/// Common English words excluded from the vocabulary.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before",
    "being", "below", "between", "both", "but", "by", "can", "cannot",
    "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "i", "if",
    "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most",
    "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "you", "your", "yours",
    "yourself", "yourselves",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// A retrieval result: chunk text plus its provenance metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieved {
    /// The retrieved chunk text.
    pub text: String,
    /// Provenance carried over from the indexed chunk.
    pub metadata: ChunkMetadata,
}

/// Fitted TF-IDF state over the current corpus.
#[derive(Debug)]
struct TfidfModel {
    /// Term -> column index.
    vocabulary: HashMap<String, usize>,
    /// Per-column inverse document frequency.
    idf: Vec<f32>,
    /// Per-document sparse vectors, entries sorted by column index.
    vectors: Vec<Vec<(usize, f32)>>,
}

/// Append-only corpus with a derived sparse-vector representation.
pub struct VectorStore {
    texts: Vec<String>,
    metadata: Vec<ChunkMetadata>,
    max_features: usize,
    model: Option<TfidfModel>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::with_max_features(DEFAULT_MAX_FEATURES)
    }

    /// Create a store with a custom vocabulary cap.
    pub fn with_max_features(max_features: usize) -> Self {
        Self {
            texts: Vec::new(),
            metadata: Vec::new(),
            max_features,
            model: None,
        }
    }

    /// Number of chunks in the corpus.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Append chunks to the corpus and refit the term model over the
    /// entire accumulated corpus.
    ///
    /// The refit is a full rebuild: rarity weights must reflect every
    /// ingested chunk, not just the newest batch. The new model is
    /// built completely before it replaces the old one, so the previous
    /// state stays intact if the rebuild does not finish.
    pub fn add_chunks(&mut self, chunks: Vec<Chunk>) {
        for chunk in chunks {
            self.texts.push(chunk.text);
            self.metadata.push(chunk.metadata);
        }

        self.model = if self.texts.is_empty() {
            None
        } else {
            Some(fit(&self.texts, self.max_features))
        };

        tracing::debug!(
            corpus = self.texts.len(),
            vocabulary = self
                .model
                .as_ref()
                .map(|m| m.vocabulary.len())
                .unwrap_or(0),
            "refit vector store"
        );
    }

    /// Return up to `k` chunks ranked by descending similarity to the
    /// query.
    ///
    /// Query terms unseen in the corpus contribute zero weight. Ties
    /// are broken by corpus insertion order. An empty corpus yields an
    /// empty result rather than an error.
    pub fn retrieve(&self, query: &str, k: usize) -> Vec<Retrieved> {
        let Some(model) = &self.model else {
            return Vec::new();
        };

        let mut query_vector: Vec<(usize, f32)> = term_counts(query)
            .into_iter()
            .filter_map(|(term, count)| {
                model
                    .vocabulary
                    .get(&term)
                    .map(|&idx| (idx, count as f32 * model.idf[idx]))
            })
            .collect();
        query_vector.sort_by_key(|&(idx, _)| idx);

        let mut scored: Vec<(f32, usize)> = model
            .vectors
            .iter()
            .enumerate()
            .map(|(doc, vector)| (sparse_dot(vector, &query_vector), doc))
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal)
        });

        scored
            .into_iter()
            .take(k)
            .map(|(_, doc)| Retrieved {
                text: self.texts[doc].clone(),
                metadata: self.metadata[doc].clone(),
            })
            .collect()
    }
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Fit a TF-IDF model over the full corpus.
fn fit(texts: &[String], max_features: usize) -> TfidfModel {
    let doc_counts: Vec<HashMap<String, u32>> =
        texts.iter().map(|t| term_counts(t)).collect();

    // Total corpus count and document frequency per term.
    let mut stats: HashMap<&str, (u64, u32)> = HashMap::new();
    for counts in &doc_counts {
        for (term, count) in counts {
            let entry = stats.entry(term).or_insert((0, 0));
            entry.0 += u64::from(*count);
            entry.1 += 1;
        }
    }

    // Cap the vocabulary to the highest-count terms; ties go to the
    // alphabetically earlier term for determinism.
    let mut ranked: Vec<(&str, u64, u32)> = stats
        .into_iter()
        .map(|(term, (total, df))| (term, total, df))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_features);
    // Alphabetical column order keeps vector layouts reproducible
    // across refits.
    ranked.sort_by(|a, b| a.0.cmp(b.0));

    let n = texts.len() as f32;
    let mut vocabulary = HashMap::with_capacity(ranked.len());
    let mut idf = Vec::with_capacity(ranked.len());
    for (idx, (term, _, df)) in ranked.iter().enumerate() {
        vocabulary.insert((*term).to_string(), idx);
        idf.push(((1.0 + n) / (1.0 + *df as f32)).ln() + 1.0);
    }

    let vectors = doc_counts
        .iter()
        .map(|counts| {
            let mut vector: Vec<(usize, f32)> = counts
                .iter()
                .filter_map(|(term, count)| {
                    vocabulary
                        .get(term)
                        .map(|&idx| (idx, *count as f32 * idf[idx]))
                })
                .collect();
            vector.sort_by_key(|&(idx, _)| idx);
            vector
        })
        .collect();

    TfidfModel {
        vocabulary,
        idf,
        vectors,
    }
}

/// Tokenize text into lowercased terms and count occurrences.
///
/// Terms are runs of word characters at least two chars long, with
/// English stop words removed.
fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.chars().count() >= 2)
    {
        let term = token.to_lowercase();
        if STOP_WORD_SET.contains(term.as_str()) {
            continue;
        }
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// Dot product of two sparse vectors sorted by column index.
fn sparse_dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let mut sum = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            metadata: ChunkMetadata {
                page_number: Some(1),
                section_name: None,
            },
        }
    }

    #[test]
    fn retrieve_on_fresh_store_is_empty() {
        let store = VectorStore::new();
        assert!(store.retrieve("anything", 5).is_empty());
    }

    #[test]
    fn empty_add_is_a_noop_rebuild() {
        let mut store = VectorStore::new();
        store.add_chunks(Vec::new());
        assert!(store.is_empty());
        assert!(store.retrieve("anything", 5).is_empty());
    }

    #[test]
    fn top_k_ranks_by_term_frequency_and_rarity() {
        let mut store = VectorStore::new();
        store.add_chunks(vec![
            chunk("apple banana"),
            chunk("banana cherry"),
            chunk("apple apple apple"),
        ]);

        let results = store.retrieve("apple", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "apple apple apple");
        assert_eq!(results[1].text, "apple banana");
    }

    #[test]
    fn chunks_without_query_terms_never_outrank_matches() {
        let mut store = VectorStore::new();
        store.add_chunks(vec![
            chunk("banana cherry"),
            chunk("apple banana"),
        ]);

        let results = store.retrieve("apple", 2);
        assert_eq!(results[0].text, "apple banana");
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut store = VectorStore::new();
        store.add_chunks(vec![
            chunk("orange grape"),
            chunk("orange melon"),
            chunk("orange kiwi"),
        ]);

        // All three contain "orange" exactly once; insertion order wins.
        let results = store.retrieve("orange", 3);
        assert_eq!(results[0].text, "orange grape");
        assert_eq!(results[1].text, "orange melon");
        assert_eq!(results[2].text, "orange kiwi");
    }

    #[test]
    fn corpus_grows_across_adds_without_losing_chunks() {
        let mut store = VectorStore::new();
        store.add_chunks(vec![chunk("alpha request"), chunk("beta request")]);
        store.add_chunks(vec![chunk("gamma request")]);

        assert_eq!(store.len(), 3);

        let results = store.retrieve("gamma", 5);
        assert_eq!(results[0].text, "gamma request");

        let results = store.retrieve("alpha", 5);
        assert_eq!(results[0].text, "alpha request");
    }

    #[test]
    fn unseen_query_terms_contribute_nothing() {
        let mut store = VectorStore::new();
        store.add_chunks(vec![chunk("apple banana"), chunk("cherry date")]);

        // Entirely unseen vocabulary: every score is zero, so results
        // come back in insertion order.
        let results = store.retrieve("zebra quokka", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "apple banana");
    }

    #[test]
    fn stop_words_are_not_indexed() {
        let mut store = VectorStore::new();
        store.add_chunks(vec![
            chunk("the of and with"),
            chunk("token endpoint"),
        ]);

        let results = store.retrieve("the token", 2);
        assert_eq!(results[0].text, "token endpoint");
    }

    #[test]
    fn vocabulary_cap_keeps_most_frequent_terms() {
        let mut store = VectorStore::with_max_features(1);
        store.add_chunks(vec![
            chunk("common common common rare"),
            chunk("common other"),
        ]);

        // Only "common" survives the cap, so "rare" scores nothing.
        let results = store.retrieve("rare", 2);
        assert_eq!(results[0].text, "common common common rare");
        let results = store.retrieve("common", 2);
        assert_eq!(results[0].text, "common common common rare");
    }

    #[test]
    fn k_larger_than_corpus_returns_everything() {
        let mut store = VectorStore::new();
        store.add_chunks(vec![chunk("solo entry")]);
        assert_eq!(store.retrieve("solo", 10).len(), 1);
    }
}
