//! Inverted Index (C5) — owns the postings map and histogram store,
//! exposes insertion and rule installation.
//!
//! ```
//! use termlayer::{Histogram, Index};
//!
//! let mut index = Index::new();
//! let mut doc = Histogram::new();
//! doc.insert("red".to_string(), 0.4);
//! index.add_document(1, doc).unwrap();
//! ```

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{IndexError, Result};
use crate::rules::RuleTables;
use crate::value::{validate_weight, DocId, Histogram, HistogramStore, Postings, Term};

/// The inverted index: postings, histogram store, and the rule
/// resolver's installed state, bound together for the lifetime of the
/// index (spec §3 lifecycle).
pub struct Index {
    pub(crate) postings: Postings,
    pub(crate) histograms: HistogramStore,
    pub(crate) rules: RuleTables,
    pub(crate) config: Config,
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Index {
    /// Creates an empty index with default configuration.
    pub fn new() -> Self {
        Index::with_config(Config::default())
    }

    /// Creates an empty index bound to an explicit configuration
    /// (retrieval defaults, worker count, logging).
    pub fn with_config(config: Config) -> Self {
        Index {
            postings: Postings::new(),
            histograms: HashMap::new(),
            rules: RuleTables::default(),
            config,
        }
    }

    /// The configuration this index was constructed with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Inserts or overwrites the histogram for `id`, indexing every
    /// term it contains. Overwriting an existing id updates the
    /// histogram but does **not** remove the previous document's stale
    /// postings entries — clients should only insert fresh ids (spec
    /// §4.5, §9).
    ///
    /// Rejects the document if any weight is negative, NaN, or
    /// infinite (`InvalidWeight`), validated before any mutation so a
    /// rejected document leaves the index untouched.
    #[instrument(skip(self, hist), fields(doc_id = id, terms = hist.len()))]
    pub fn add_document(&mut self, id: DocId, hist: Histogram) -> Result<()> {
        for (_, weight) in hist.iter() {
            validate_weight(*weight)?;
        }
        for term in hist.terms() {
            self.postings.insert(term.clone(), id);
        }
        self.histograms.insert(id, hist);
        debug!(doc_id = id, "document indexed");
        Ok(())
    }

    /// Inserts or overwrites a batch of documents, equivalent to
    /// iterating `add_document`. Stops at the first invalid weight,
    /// leaving documents processed before the failure already
    /// committed (matches the source's eager, non-transactional
    /// `addDocuments` loop).
    pub fn add_documents(&mut self, docs: Vec<(DocId, Histogram)>) -> Result<()> {
        for (id, hist) in docs {
            self.add_document(id, hist)?;
        }
        Ok(())
    }

    /// The histogram stored for `id`, if any.
    pub fn histogram(&self, id: DocId) -> Option<&Histogram> {
        self.histograms.get(&id)
    }

    /// Installs one-dimensional rules, switching the evaluator to
    /// one-dimensional mode and clearing any multi-dimensional state
    /// (spec §3: rule mode is exclusive).
    #[instrument(skip(self, rules), fields(rule_count = rules.len()))]
    pub fn install_onedim_rules(&mut self, rules: HashMap<Term, HashSet<Term>>) {
        self.rules.install_onedim(rules);
        debug!("installed one-dimensional rules");
    }

    /// Installs multi-dimensional rules, switching the evaluator to
    /// multi-dimensional mode and clearing any one-dimensional state.
    #[instrument(skip(self, rules), fields(dimensions = rules.len()))]
    pub fn install_multidim_rules(&mut self, rules: Vec<HashMap<Term, HashSet<Term>>>) {
        self.rules.install_multidim(rules);
        debug!("installed multi-dimensional rules");
    }

    /// Number of distinct documents indexed.
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    /// Whether the index has no documents.
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }
}

/// Ensures a weight vector supplied to a probe histogram is valid
/// before it is used to drive retrieval (spec: `InvalidWeight` is
/// "reject at the ingress" — probes are ingress too, not just stored
/// documents).
pub fn validate_probe(probe: &Histogram) -> Result<()> {
    for (_, weight) in probe.iter() {
        validate_weight(*weight)?;
    }
    Ok(())
}
