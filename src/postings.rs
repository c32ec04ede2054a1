//! Postings Algebra (C2) — binary operators over `(doc-id set, term
//! set)` pairs, used for candidate pruning. These operators never look
//! at weights; `terms` is carried through so downstream rescoring can
//! inspect which terms justified a candidate set.

use std::collections::BTreeSet;

use crate::value::{DocId, Term};

/// One operand of the postings algebra: the doc-ids a (sub)expression
/// selects, and the terms that contributed to that selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingsOperand {
    /// Document ids selected by this (sub)expression.
    pub doc_ids: BTreeSet<DocId>,
    /// Terms that contributed to the selection.
    pub terms: BTreeSet<Term>,
}

impl PostingsOperand {
    /// A leaf operand: every doc-id that contains any of `terms`.
    pub fn leaf(terms: BTreeSet<Term>, doc_ids: BTreeSet<DocId>) -> Self {
        PostingsOperand { doc_ids, terms }
    }
}

/// The seven postings-algebra operators, shared by glyph with the
/// histogram algebra (spec §9: "reify the operator set as a tagged
/// variant used by both interpreters").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `+` — union of doc-ids and terms.
    Union,
    /// `*` — intersection of doc-ids, gated on term overlap.
    Intersection,
    /// `/` — left-hand doc-ids unchanged, term difference.
    Subtraction,
    /// `&` — intersection of doc-ids, union of terms.
    And,
    /// `|` — identical to `Union` by contract.
    Or,
    /// `#|` — symmetric difference of doc-ids, union of terms.
    Xor,
    /// `#/` — set difference of doc-ids and terms.
    XSubtraction,
}

impl Operator {
    /// Parses an operator glyph; returns `None` for anything else
    /// (callers treat non-operator tokens as leaves, per spec §4.4).
    pub fn parse(glyph: &str) -> Option<Operator> {
        match glyph {
            "+" => Some(Operator::Union),
            "*" => Some(Operator::Intersection),
            "/" => Some(Operator::Subtraction),
            "&" => Some(Operator::And),
            "|" => Some(Operator::Or),
            "#|" => Some(Operator::Xor),
            "#/" => Some(Operator::XSubtraction),
            _ => None,
        }
    }

    /// Applies this operator to the postings algebra.
    pub fn apply_postings(self, a: &PostingsOperand, b: &PostingsOperand) -> PostingsOperand {
        match self {
            Operator::Union | Operator::Or => PostingsOperand {
                doc_ids: a.doc_ids.union(&b.doc_ids).cloned().collect(),
                terms: a.terms.union(&b.terms).cloned().collect(),
            },
            Operator::Intersection => {
                let terms: BTreeSet<Term> = a.terms.intersection(&b.terms).cloned().collect();
                let doc_ids = if terms.is_empty() {
                    BTreeSet::new()
                } else {
                    a.doc_ids.intersection(&b.doc_ids).cloned().collect()
                };
                PostingsOperand { doc_ids, terms }
            }
            Operator::Subtraction => PostingsOperand {
                doc_ids: a.doc_ids.clone(),
                terms: a.terms.difference(&b.terms).cloned().collect(),
            },
            Operator::And => PostingsOperand {
                doc_ids: a.doc_ids.intersection(&b.doc_ids).cloned().collect(),
                terms: a.terms.union(&b.terms).cloned().collect(),
            },
            Operator::Xor => PostingsOperand {
                doc_ids: a.doc_ids.symmetric_difference(&b.doc_ids).cloned().collect(),
                terms: a.terms.union(&b.terms).cloned().collect(),
            },
            Operator::XSubtraction => PostingsOperand {
                doc_ids: a.doc_ids.difference(&b.doc_ids).cloned().collect(),
                terms: a.terms.difference(&b.terms).cloned().collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(items: &[DocId]) -> BTreeSet<DocId> {
        items.iter().copied().collect()
    }
    fn terms(items: &[&str]) -> BTreeSet<Term> {
        items.iter().map(|s| s.to_string()).collect()
    }
    fn operand(d: &[DocId], t: &[&str]) -> PostingsOperand {
        PostingsOperand {
            doc_ids: docs(d),
            terms: terms(t),
        }
    }

    #[test]
    fn union_and_or_are_identical() {
        let a = operand(&[1, 2], &["x"]);
        let b = operand(&[2, 3], &["y"]);
        assert_eq!(
            Operator::Union.apply_postings(&a, &b),
            Operator::Or.apply_postings(&a, &b)
        );
    }

    #[test]
    fn union_is_commutative_and_idempotent() {
        let a = operand(&[1, 2], &["x"]);
        let b = operand(&[2, 3], &["y"]);
        assert_eq!(
            Operator::Union.apply_postings(&a, &b),
            Operator::Union.apply_postings(&b, &a)
        );
        assert_eq!(Operator::Union.apply_postings(&a, &a), a);
    }

    #[test]
    fn intersection_gated_on_term_overlap() {
        let a = operand(&[1, 2], &["x"]);
        let b = operand(&[2, 3], &["y"]);
        let result = Operator::Intersection.apply_postings(&a, &b);
        assert!(result.doc_ids.is_empty());
        assert!(result.terms.is_empty());
    }

    #[test]
    fn intersection_with_overlap_keeps_doc_ids() {
        let a = operand(&[1, 2], &["x", "y"]);
        let b = operand(&[2, 3], &["y"]);
        let result = Operator::Intersection.apply_postings(&a, &b);
        assert_eq!(result.doc_ids, docs(&[2]));
        assert_eq!(result.terms, terms(&["y"]));
    }

    #[test]
    fn subtraction_keeps_doc_ids_unchanged() {
        let a = operand(&[1, 2], &["x", "y"]);
        let self_sub = Operator::Subtraction.apply_postings(&a, &a);
        assert_eq!(self_sub.doc_ids, a.doc_ids); // D1 unchanged even though K empties
        assert!(self_sub.terms.is_empty());

        let empty = PostingsOperand::default();
        let sub_empty = Operator::Subtraction.apply_postings(&a, &empty);
        assert_eq!(sub_empty, a);
    }

    #[test]
    fn xsubtraction_self_is_empty() {
        let a = operand(&[1, 2], &["x"]);
        let result = Operator::XSubtraction.apply_postings(&a, &a);
        assert_eq!(result, PostingsOperand::default());
    }

    #[test]
    fn xor_equals_union_minus_intersection_on_doc_ids() {
        let a = operand(&[1, 2, 3], &["x"]);
        let b = operand(&[2, 3, 4], &["y"]);
        let xor = Operator::Xor.apply_postings(&a, &b);
        let union = Operator::Union.apply_postings(&a, &b);
        let intersection_doc_ids: BTreeSet<DocId> =
            a.doc_ids.intersection(&b.doc_ids).cloned().collect();
        let expected: BTreeSet<DocId> = union
            .doc_ids
            .difference(&intersection_doc_ids)
            .cloned()
            .collect();
        assert_eq!(xor.doc_ids, expected);
    }
}
