//! Core data model: terms, weights, histograms, and postings.
//!
//! ```
//! use termlayer::value::{Histogram, Term};
//!
//! let mut hist = Histogram::new();
//! hist.insert(Term::from("red"), 0.4);
//! hist.insert(Term::from("blue"), 0.6);
//! assert_eq!(hist.total_weight(), 1.0);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::error::{IndexError, Result};

/// A non-empty opaque term. Equality by value, ordering lexicographic.
pub type Term = String;

/// A client-chosen document identifier. Collisions are the client's
/// responsibility; the engine treats re-insertion as overwrite.
pub type DocId = i64;

/// A finite, non-negative real weight. Absent term is equivalent to 0.
pub type Weight = f64;

/// Rejects weights that cannot appear in a histogram: negative, NaN, or
/// infinite.
pub fn validate_weight(w: Weight) -> Result<()> {
    if !w.is_finite() || w < 0.0 {
        return Err(IndexError::InvalidWeight(w));
    }
    Ok(())
}

/// Mapping Term -> Weight. Backed by a `BTreeMap` so that total-weight
/// summation and union tie-breaking have a reproducible, documented
/// iteration order (ascending term).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram(BTreeMap<Term, Weight>);

impl Histogram {
    /// An empty histogram.
    pub fn new() -> Self {
        Histogram(BTreeMap::new())
    }

    /// Builds a histogram from an iterator of (term, weight) pairs,
    /// rejecting any invalid weight.
    pub fn try_from_pairs<I: IntoIterator<Item = (Term, Weight)>>(pairs: I) -> Result<Self> {
        let mut map = BTreeMap::new();
        for (t, w) in pairs {
            validate_weight(w)?;
            map.insert(t, w);
        }
        Ok(Histogram(map))
    }

    /// Inserts or overwrites a single term's weight without validation;
    /// callers constructing test fixtures may use this directly, but
    /// `Index::add_document` validates on ingress.
    pub fn insert(&mut self, term: Term, weight: Weight) {
        self.0.insert(term, weight);
    }

    /// Weight of `term`, or 0.0 if absent.
    pub fn get(&self, term: &str) -> Weight {
        self.0.get(term).copied().unwrap_or(0.0)
    }

    /// Whether `term` is present (with any weight, including 0.0).
    pub fn contains(&self, term: &str) -> bool {
        self.0.contains_key(term)
    }

    /// Number of terms in the histogram.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the histogram has no terms.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all weights, summed in ascending-term order (documented
    /// per spec: ordinary floating-point summation, no Kahan
    /// compensation, order is by term so that it is reproducible).
    pub fn total_weight(&self) -> Weight {
        self.0.values().sum()
    }

    /// Ascending-term iteration over (term, weight) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Weight)> {
        self.0.iter()
    }

    /// Terms present in the histogram.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.0.keys()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (t, w)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{t}: {w}")?;
        }
        write!(f, "}}")
    }
}

impl IntoIterator for Histogram {
    type Item = (Term, Weight);
    type IntoIter = std::collections::btree_map::IntoIter<Term, Weight>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(Term, Weight)> for Histogram {
    fn from_iter<I: IntoIterator<Item = (Term, Weight)>>(iter: I) -> Self {
        Histogram(iter.into_iter().collect())
    }
}

/// Mapping Term -> set of document ids containing that term. Uses
/// `BTreeSet` for the doc-id sets so candidate enumeration order is
/// deterministic, which in turn makes the final stable doc-id tie-break
/// in the retrieval pipeline reproducible independent of hashing.
#[derive(Debug, Clone, Default)]
pub struct Postings(HashMap<Term, BTreeSet<DocId>>);

impl Postings {
    /// An empty postings map.
    pub fn new() -> Self {
        Postings(HashMap::new())
    }

    /// Doc-ids indexed under `term`, or the empty set if the term is
    /// unknown to the index. A missing term is never an error (spec
    /// §4.4: "posting lookup on a term not present in P ... contribute
    /// ∅, never fatal").
    pub fn doc_ids(&self, term: &str) -> BTreeSet<DocId> {
        self.0.get(term).cloned().unwrap_or_default()
    }

    /// Records that `doc` contains `term`.
    pub fn insert(&mut self, term: Term, doc: DocId) {
        self.0.entry(term).or_default().insert(doc);
    }
}

/// Mapping Doc-id -> Histogram.
pub type HistogramStore = HashMap<DocId, Histogram>;
