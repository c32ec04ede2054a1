//! Expression Evaluator (C4) — interprets a postfix token stream,
//! dispatching tokens to the rule resolver (C1) for leaves and to the
//! postings (C2) or histogram (C3) algebra for operators.
//!
//! The two interpreters are intentionally asymmetric (spec §4.4): the
//! postings pass descends recursively over an immutable slice + cursor
//! (spec §9's recommendation in place of the original C++'s
//! mutable-vector-popping, "this also makes it trivial to reuse the
//! same expression across many documents"); the histogram pass is a
//! straightforward left-to-right postfix evaluation with an explicit
//! stack, since it only ever touches one already-selected document.

use crate::error::{IndexError, Result};
use crate::postings::{Operator, PostingsOperand};
use crate::rules::RuleTables;
use crate::value::{Histogram, Postings};

/// A single token of a postfix expression: one of the seven operator
/// glyphs, or a leaf (HLE symbol, tuple symbol, or literal term).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// One of `{+, *, /, &, |, #|, #/}`.
    Op(Operator),
    /// Anything else: an HLE symbol, a tuple symbol, or a literal term.
    Leaf(String),
}

impl Token {
    /// Classifies a raw string token: an operator glyph becomes `Op`,
    /// anything else is a `Leaf` (spec §6: "everything else is a leaf").
    pub fn parse(raw: &str) -> Token {
        match Operator::parse(raw) {
            Some(op) => Token::Op(op),
            None => Token::Leaf(raw.to_string()),
        }
    }

    /// Classifies a whole sequence of raw string tokens.
    pub fn parse_sequence<I, S>(raw: I) -> Vec<Token>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter().map(|s| Token::parse(s.as_ref())).collect()
    }
}

/// Evaluates `tokens` under the postings algebra against `postings`,
/// expanding leaves through `rules`. Recursive right-to-left descent
/// over an index into the slice, per spec §4.4.
pub fn eval_expression_postings(
    tokens: &[Token],
    postings: &Postings,
    rules: &RuleTables,
) -> Result<PostingsOperand> {
    let mut pos = tokens.len();
    let result = eval_postings_rec(tokens, &mut pos, postings, rules)?;
    if pos != 0 {
        return Err(IndexError::MalformedExpression(format!(
            "{pos} unconsumed leading token(s); expression did not reduce to one operand"
        )));
    }
    Ok(result)
}

fn eval_postings_rec(
    tokens: &[Token],
    pos: &mut usize,
    postings: &Postings,
    rules: &RuleTables,
) -> Result<PostingsOperand> {
    if *pos == 0 {
        return Err(IndexError::MalformedExpression(
            "operator popped an empty operand stack".to_string(),
        ));
    }
    *pos -= 1;
    match &tokens[*pos] {
        Token::Op(op) => {
            let arg2 = eval_postings_rec(tokens, pos, postings, rules)?;
            let arg1 = eval_postings_rec(tokens, pos, postings, rules)?;
            Ok(op.apply_postings(&arg1, &arg2))
        }
        Token::Leaf(raw) => {
            let terms = rules.expand_leaf(raw)?;
            let doc_ids = terms
                .iter()
                .fold(std::collections::BTreeSet::new(), |mut acc, t| {
                    acc.extend(postings.doc_ids(t));
                    acc
                });
            Ok(PostingsOperand::leaf(terms.into_iter().collect(), doc_ids))
        }
    }
}

/// Evaluates `tokens` under the histogram algebra against `doc`,
/// expanding leaves through `rules`. Standard left-to-right postfix
/// with an explicit operand stack.
pub fn eval_expression_histogram(
    tokens: &[Token],
    doc: &Histogram,
    rules: &RuleTables,
) -> Result<Histogram> {
    let mut stack: Vec<Histogram> = Vec::new();
    for token in tokens {
        match token {
            Token::Op(op) => {
                let b = stack.pop().ok_or_else(|| {
                    IndexError::MalformedExpression(
                        "operator popped an empty operand stack".to_string(),
                    )
                })?;
                let a = stack.pop().ok_or_else(|| {
                    IndexError::MalformedExpression(
                        "operator popped an empty operand stack".to_string(),
                    )
                })?;
                stack.push(op.apply_histogram(&a, &b));
            }
            Token::Leaf(raw) => {
                let terms = rules.expand_leaf(raw)?;
                let leaf: Histogram = terms
                    .into_iter()
                    .filter(|t| doc.contains(t))
                    .map(|t| {
                        let w = doc.get(&t);
                        (t, w)
                    })
                    .collect();
                stack.push(leaf);
            }
        }
    }
    if stack.len() != 1 {
        return Err(IndexError::MalformedExpression(format!(
            "expression reduced to {} operands, expected 1",
            stack.len()
        )));
    }
    Ok(stack.pop().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DocId;

    fn tokens(raw: &[&str]) -> Vec<Token> {
        Token::parse_sequence(raw.iter().copied())
    }

    fn build_postings(docs: &[(DocId, &[&str])]) -> Postings {
        let mut postings = Postings::new();
        for (id, terms) in docs {
            for t in *terms {
                postings.insert((*t).to_string(), *id);
            }
        }
        postings
    }

    #[test]
    fn simple_union_query() {
        let postings = build_postings(&[(1, &["a"]), (2, &["b"]), (3, &["a", "b"])]);
        let expr = tokens(&["a", "b", "+"]);
        let rules = RuleTables::default();
        let result = eval_expression_postings(&expr, &postings, &rules).unwrap();
        assert_eq!(
            result.doc_ids,
            [1, 2, 3].into_iter().collect::<std::collections::BTreeSet<_>>()
        );
    }

    #[test]
    fn intersection_pruning_yields_single_doc() {
        let postings = build_postings(&[(1, &["a"]), (2, &["b"]), (3, &["a", "b"])]);
        let expr = tokens(&["a", "b", "*"]);
        let rules = RuleTables::default();
        let result = eval_expression_postings(&expr, &postings, &rules).unwrap();
        assert_eq!(result.doc_ids, [3].into_iter().collect());
    }

    #[test]
    fn unknown_term_contributes_empty_set() {
        let postings = Postings::new();
        let expr = tokens(&["ghost"]);
        let rules = RuleTables::default();
        let result = eval_expression_postings(&expr, &postings, &rules).unwrap();
        assert!(result.doc_ids.is_empty());
    }

    #[test]
    fn malformed_expression_too_few_operands() {
        let postings = Postings::new();
        let expr = tokens(&["a", "+"]); // operator needs two operands
        let rules = RuleTables::default();
        assert!(eval_expression_postings(&expr, &postings, &rules).is_err());
    }

    #[test]
    fn malformed_expression_too_many_operands() {
        let postings = Postings::new();
        let expr = tokens(&["a", "b"]); // never combined: 2 operands left
        let rules = RuleTables::default();
        assert!(eval_expression_postings(&expr, &postings, &rules).is_err());
    }

    #[test]
    fn histogram_eval_intersection_of_disjoint_leaves_is_empty() {
        let mut doc = Histogram::new();
        doc.insert("a".to_string(), 0.5);
        doc.insert("b".to_string(), 0.5);
        let expr = tokens(&["a", "b", "*"]);
        let rules = RuleTables::default();
        let result = eval_expression_histogram(&expr, &doc, &rules).unwrap();
        // "a" and "b" are distinct leaves; {a:0.5} and {b:0.5} share no
        // term, so their intersection is empty.
        assert!(result.is_empty());
    }

    #[test]
    fn histogram_one_dim_rule_expansion() {
        let mut rules = RuleTables::default();
        let mut table = std::collections::HashMap::new();
        table.insert(
            "color".to_string(),
            ["red", "blue"].into_iter().map(String::from).collect(),
        );
        rules.install_onedim(table);

        let mut doc = Histogram::new();
        doc.insert("red".to_string(), 0.4);
        let expr = tokens(&["color"]);
        let result = eval_expression_histogram(&expr, &doc, &rules).unwrap();
        assert!((result.total_weight() - 0.4).abs() < f64::EPSILON);
    }
}
