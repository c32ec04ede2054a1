//! Histogram Algebra (C3) — binary operators over weighted term maps,
//! used for per-document rescoring.
//!
//! Intersection and subtraction operate on `(term, weight)` *pairs*, not
//! keys: a term whose weight differs between the two operands is
//! dropped. This is the defining quirk of the algebra (spec §4.3) and
//! is load-bearing — clients use it to gate rescoring on exact weight
//! equality.

use crate::postings::Operator;
use crate::value::Histogram;

impl Operator {
    /// Applies this operator to the histogram algebra. Shares the
    /// operator enum with the postings algebra (spec §9 design note);
    /// the two algebras are dispatched from the same tagged variant but
    /// give each glyph a distinct, weight-aware meaning here.
    pub fn apply_histogram(self, a: &Histogram, b: &Histogram) -> Histogram {
        match self {
            Operator::Union | Operator::Or => union(a, b),
            Operator::Intersection => intersection(a, b),
            Operator::Subtraction => subtraction(a, b),
            Operator::And => and(a, b),
            Operator::Xor => xor(a, b),
            Operator::XSubtraction => xsubtraction(a, b),
        }
    }
}

/// Key-wise union; on a key collision, keep the **larger** of the two
/// weights, regardless of which operand it came from. `setUnion` builds
/// `std::set<std::pair<string,double>>` from each histogram and runs
/// `std::set_union`, then rebuilds the map by overwriting `result[key]`
/// while iterating the merged set in `(key, weight)` order — since
/// `std::pair` compares weight second, colliding keys leave both pairs
/// in the merged set sorted ascending by weight, so the last overwrite
/// (and thus the final value) is always the larger weight.
fn union(a: &Histogram, b: &Histogram) -> Histogram {
    let mut result = a.clone();
    for (term, weight) in b.iter() {
        if !result.contains(term) || *weight > result.get(term) {
            result.insert(term.clone(), *weight);
        }
    }
    result
}

/// Entries `(t, w)` present identically in both histograms.
fn intersection(a: &Histogram, b: &Histogram) -> Histogram {
    a.iter()
        .filter(|(t, w)| b.contains(t) && b.get(t) == **w)
        .map(|(t, w)| (t.clone(), *w))
        .collect()
}

/// Entries of `a` whose `(t, w)` pair is not present in `b`.
fn subtraction(a: &Histogram, b: &Histogram) -> Histogram {
    a.iter()
        .filter(|(t, w)| !(b.contains(t) && b.get(t) == **w))
        .map(|(t, w)| (t.clone(), *w))
        .collect()
}

/// Returns the argument with the smaller total weight; ties return `a`.
fn and(a: &Histogram, b: &Histogram) -> Histogram {
    if a.total_weight() > b.total_weight() {
        b.clone()
    } else {
        a.clone()
    }
}

/// Returns the argument with the larger total weight; ties return `b`.
fn xor(a: &Histogram, b: &Histogram) -> Histogram {
    if a.total_weight() > b.total_weight() {
        a.clone()
    } else {
        b.clone()
    }
}

/// If `b`'s total weight is positive, the empty histogram; else `a`.
fn xsubtraction(a: &Histogram, b: &Histogram) -> Histogram {
    if b.total_weight() > 0.0 {
        Histogram::new()
    } else {
        a.clone()
    }
}
