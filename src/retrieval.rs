//! Retrieval Pipeline (C6) — orchestrates the expression evaluator over
//! both algebras, applies the score threshold, orders, and truncates
//! results; drives a worker pool for per-document rescoring.
//!
//! All four retrieval methods share an output shape: doc-ids paired
//! with a score, filtered by `threshold` (standardized on `>=` across
//! every path, spec §9 Open Question 4), sorted by score, truncated to
//! `count`, with a stable ascending-doc-id tie-break (spec §9 Open
//! Question 5) so results are reproducible regardless of worker
//! scheduling.

use std::collections::BTreeSet;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::expression::{eval_expression_histogram, eval_expression_postings, Token};
use crate::index::{validate_probe, Index};
use crate::value::{DocId, Histogram};

impl Index {
    /// Evaluates `expr` under the postings algebra and fans the
    /// resulting candidate set across a worker pool, rescoring each
    /// candidate under the histogram algebra. See module docs for the
    /// shared threshold/sort/truncate contract.
    #[instrument(skip(self, expr))]
    pub fn retrieve_by_query(
        &self,
        expr: &[Token],
        count: usize,
        from_end: bool,
        threshold: f64,
    ) -> Result<Vec<(DocId, f64)>> {
        let candidates = self.query_candidates(expr)?;
        let pool = self.build_pool();
        let scored: Vec<(DocId, f64)> = pool.install(|| -> Result<Vec<(DocId, f64)>> {
            let errors: Mutex<Option<crate::error::IndexError>> = Mutex::new(None);
            let accumulator: Mutex<Vec<(DocId, f64)>> = Mutex::new(Vec::new());
            candidates.par_iter().for_each(|&id| {
                match self.score_by_query(id, expr, threshold) {
                    Ok(Some(pair)) => accumulator.lock().push(pair),
                    Ok(None) => {}
                    Err(e) => {
                        let mut slot = errors.lock();
                        if slot.is_none() {
                            *slot = Some(e);
                        }
                    }
                }
            });
            if let Some(e) = errors.into_inner() {
                return Err(e);
            }
            Ok(accumulator.into_inner())
        })?;
        Ok(sort_and_truncate(scored, from_end, count))
    }

    /// Single-threaded counterpart to [`Index::retrieve_by_query`].
    /// Must return the same multiset of `(doc-id, score)` pairs.
    #[instrument(skip(self, expr))]
    pub fn retrieve_by_query_single(
        &self,
        expr: &[Token],
        count: usize,
        from_end: bool,
        threshold: f64,
    ) -> Result<Vec<(DocId, f64)>> {
        let candidates = self.query_candidates(expr)?;
        let mut scored = Vec::with_capacity(candidates.len());
        for id in candidates {
            if let Some(pair) = self.score_by_query(id, expr, threshold)? {
                scored.push(pair);
            }
        }
        Ok(sort_and_truncate(scored, from_end, count))
    }

    /// Finds documents by histogram similarity (coincidence) to
    /// `probe`, fanned across a worker pool.
    #[instrument(skip(self, probe))]
    pub fn retrieve_by_histogram(
        &self,
        probe: &Histogram,
        count: usize,
        from_end: bool,
        threshold: f64,
    ) -> Result<Vec<(DocId, f64)>> {
        validate_probe(probe)?;
        let candidates = self.histogram_candidates(probe);
        let pool = self.build_pool();
        let scored: Vec<(DocId, f64)> = pool.install(|| {
            let accumulator: Mutex<Vec<(DocId, f64)>> = Mutex::new(Vec::new());
            candidates.par_iter().for_each(|&id| {
                if let Some(pair) = self.score_by_histogram(id, probe, threshold) {
                    accumulator.lock().push(pair);
                }
            });
            accumulator.into_inner()
        });
        Ok(sort_and_truncate(scored, from_end, count))
    }

    /// Single-threaded counterpart to [`Index::retrieve_by_histogram`].
    #[instrument(skip(self, probe))]
    pub fn retrieve_by_histogram_single(
        &self,
        probe: &Histogram,
        count: usize,
        from_end: bool,
        threshold: f64,
    ) -> Result<Vec<(DocId, f64)>> {
        validate_probe(probe)?;
        let candidates = self.histogram_candidates(probe);
        let mut scored = Vec::with_capacity(candidates.len());
        for id in candidates {
            if let Some(pair) = self.score_by_histogram(id, probe, threshold) {
                scored.push(pair);
            }
        }
        Ok(sort_and_truncate(scored, from_end, count))
    }

    /// Evaluates `expr` under the postings algebra and returns the raw
    /// `(doc-ids, terms)` pair — the Rust realization of
    /// `evaluator_eval_expression` (spec §6).
    pub fn eval_expression(&self, expr: &[Token]) -> Result<(BTreeSet<DocId>, BTreeSet<String>)> {
        let operand = eval_expression_postings(expr, &self.postings, &self.rules)?;
        Ok((operand.doc_ids, operand.terms))
    }

    /// Evaluates `expr` under the histogram algebra against `doc` — the
    /// Rust realization of `evaluator_eval_histogram` (spec §6).
    pub fn eval_histogram(&self, expr: &[Token], doc: &Histogram) -> Result<Histogram> {
        eval_expression_histogram(expr, doc, &self.rules)
    }

    fn query_candidates(&self, expr: &[Token]) -> Result<Vec<DocId>> {
        let operand = eval_expression_postings(expr, &self.postings, &self.rules)?;
        Ok(operand.doc_ids.into_iter().collect())
    }

    fn histogram_candidates(&self, probe: &Histogram) -> Vec<DocId> {
        let mut ids = BTreeSet::new();
        for term in probe.terms() {
            ids.extend(self.postings.doc_ids(term));
        }
        ids.into_iter().collect()
    }

    fn score_by_query(
        &self,
        id: DocId,
        expr: &[Token],
        threshold: f64,
    ) -> Result<Option<(DocId, f64)>> {
        let Some(hist) = self.histograms.get(&id) else {
            warn!(doc_id = id, "candidate doc-id missing from histogram store");
            return Ok(None);
        };
        let result_hist = eval_expression_histogram(expr, hist, &self.rules)?;
        let score = result_hist.total_weight();
        Ok(if score >= threshold {
            Some((id, score))
        } else {
            None
        })
    }

    fn score_by_histogram(&self, id: DocId, probe: &Histogram, threshold: f64) -> Option<(DocId, f64)> {
        let hist = self.histograms.get(&id)?;
        let score = coincidence(probe, hist);
        if score >= threshold {
            Some((id, score))
        } else {
            None
        }
    }

    fn build_pool(&self) -> rayon::ThreadPool {
        let num_threads = self.config.performance.num_threads;
        let mut builder = rayon::ThreadPoolBuilder::new();
        if num_threads > 0 {
            builder = builder.num_threads(num_threads);
        }
        builder
            .build()
            .expect("failed to build retrieval worker pool")
    }
}

/// `coincidence(A, B) = sum over shared terms of min(A[t], B[t])`.
/// Iterates the smaller histogram for a small constant-factor win, per
/// spec §4.6.2 (this mirrors the original C++'s
/// `documentsCoincidence`, which picks `doc_1`/`doc_2` by `size()`).
fn coincidence(a: &Histogram, b: &Histogram) -> f64 {
    let (smaller, larger) = if a.len() > b.len() { (b, a) } else { (a, b) };
    smaller
        .iter()
        .filter(|(t, _)| larger.contains(t))
        .map(|(t, w)| w.min(larger.get(t)))
        .sum()
}

/// Sorts by score (direction per `from_end`), breaking ties by
/// ascending doc-id for reproducibility (spec §9 Open Question 5), then
/// clamps truncation to the available length rather than panicking on
/// out-of-range slicing (spec §9: the original's unguarded
/// `begin + count` slice).
fn sort_and_truncate(mut scored: Vec<(DocId, f64)>, from_end: bool, count: usize) -> Vec<(DocId, f64)> {
    scored.sort_by(|a, b| {
        let score_order = if from_end {
            a.1.partial_cmp(&b.1)
        } else {
            b.1.partial_cmp(&a.1)
        };
        score_order
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(count.min(scored.len()));
    scored
}
