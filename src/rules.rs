//! Rule Resolver (C1) — expands a high-level element (HLE) symbol to a
//! concrete term set, either one-dimensionally or via a Cartesian
//! product across dimensional rule tables.
//!
//! Rule mode is exclusive: installing one-dimensional rules clears
//! multi-dimensional rules and vice versa, matching the source
//! `Evaluator::addOneDimensionalRules` / `addMultidimensionalRules`
//! (each sets `is_multidimensional_hle` unconditionally).

use std::collections::{HashMap, HashSet};

use crate::error::{IndexError, Result};
use crate::value::Term;

/// The evaluator's installed rule state. Exactly one of the two rule
/// variants is active at a time; `None` before any rules are installed.
#[derive(Debug, Clone, Default)]
pub enum RuleTables {
    /// No rules installed; every leaf is a literal term.
    #[default]
    None,
    /// One-dimensional HLE table: symbol -> term set.
    OneDim(HashMap<Term, HashSet<Term>>),
    /// Ordered dimensional tables; the i-th table governs position i of
    /// a tuple symbol.
    MultiDim(Vec<HashMap<Term, HashSet<Term>>>),
}

impl RuleTables {
    /// Installs one-dimensional rules, replacing any multi-dimensional
    /// state (rule-mode exclusivity, spec §3).
    pub fn install_onedim(&mut self, rules: HashMap<Term, HashSet<Term>>) {
        *self = RuleTables::OneDim(rules);
    }

    /// Installs multi-dimensional rules, replacing any one-dimensional
    /// state.
    pub fn install_multidim(&mut self, rules: Vec<HashMap<Term, HashSet<Term>>>) {
        *self = RuleTables::MultiDim(rules);
    }

    /// Expands `token` to the set of concrete terms it denotes.
    ///
    /// One-dimensional mode: table hit returns its term set; miss
    /// returns the literal singleton `{token}`.
    ///
    /// Multi-dimensional mode: `token` must be a tuple symbol
    /// `"(s1, s2, ..., sN)"` with `N` equal to the number of installed
    /// dimensional tables, else `ArityMismatch`. Each component is
    /// looked up in its dimension's table (miss = literal pass-through)
    /// and the Cartesian product of per-dimension expansions is
    /// rendered with each tuple joined by `", "`.
    pub fn expand_leaf(&self, token: &str) -> Result<HashSet<Term>> {
        match self {
            RuleTables::None => Ok(std::iter::once(token.to_string()).collect()),
            RuleTables::OneDim(table) => Ok(match table.get(token) {
                Some(terms) => terms.clone(),
                None => std::iter::once(token.to_string()).collect(),
            }),
            RuleTables::MultiDim(tables) => expand_tuple(token, tables),
        }
    }
}

/// Parses a tuple leaf `"(s1, s2, ...)"` into its components: strip the
/// outer parens, remove all ASCII whitespace, split on `,`.
fn parse_tuple_components(token: &str) -> Result<Vec<String>> {
    let trimmed = token.trim();
    if !trimmed.starts_with('(') || !trimmed.ends_with(')') || trimmed.len() < 2 {
        return Err(IndexError::MalformedExpression(format!(
            "tuple leaf must be parenthesized: {token}"
        )));
    }
    let inner = &trimmed[1..trimmed.len() - 1];
    let no_ws: String = inner.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(no_ws.split(',').map(|s| s.to_string()).collect())
}

fn expand_tuple(token: &str, tables: &[HashMap<Term, HashSet<Term>>]) -> Result<HashSet<Term>> {
    let components = parse_tuple_components(token)?;
    if components.len() != tables.len() {
        return Err(IndexError::ArityMismatch {
            expected: tables.len(),
            found: components.len(),
        });
    }

    // Cartesian product, dimension by dimension: each partial tuple in
    // `product` is extended by every value the current dimension
    // expands its component to (or the literal component on miss).
    let mut product: Vec<Vec<String>> = vec![Vec::new()];
    for (component, table) in components.iter().zip(tables.iter()) {
        let mut next = Vec::new();
        match table.get(component) {
            Some(values) => {
                for value in values {
                    for partial in &product {
                        let mut extended = partial.clone();
                        extended.push(value.clone());
                        next.push(extended);
                    }
                }
            }
            None => {
                for partial in &product {
                    let mut extended = partial.clone();
                    extended.push(component.clone());
                    next.push(extended);
                }
            }
        }
        product = next;
    }

    Ok(product.into_iter().map(|tuple| tuple.join(", ")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<Term> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn literal_pass_through_with_no_rules() {
        let rules = RuleTables::default();
        assert_eq!(rules.expand_leaf("a").unwrap(), set(&["a"]));
    }

    #[test]
    fn onedim_table_hit_expands() {
        let mut rules = RuleTables::default();
        let mut table = HashMap::new();
        table.insert("color".to_string(), set(&["red", "blue"]));
        rules.install_onedim(table);
        assert_eq!(rules.expand_leaf("color").unwrap(), set(&["red", "blue"]));
    }

    #[test]
    fn onedim_table_miss_is_literal() {
        let mut rules = RuleTables::default();
        rules.install_onedim(HashMap::new());
        assert_eq!(rules.expand_leaf("unmapped").unwrap(), set(&["unmapped"]));
    }

    #[test]
    fn multidim_tuple_cartesian_product() {
        let mut size = HashMap::new();
        size.insert("size".to_string(), set(&["small", "large"]));
        let mut color = HashMap::new();
        color.insert("color".to_string(), set(&["red", "blue"]));

        let mut rules = RuleTables::default();
        rules.install_multidim(vec![size, color]);

        let expanded = rules.expand_leaf("(size, color)").unwrap();
        assert_eq!(
            expanded,
            set(&["small, red", "small, blue", "large, red", "large, blue"])
        );
    }

    #[test]
    fn multidim_literal_component_pass_through() {
        let mut size = HashMap::new();
        size.insert("size".to_string(), set(&["small", "large"]));
        let color = HashMap::new(); // "green" has no entry: literal

        let mut rules = RuleTables::default();
        rules.install_multidim(vec![size, color]);

        let expanded = rules.expand_leaf("(size, green)").unwrap();
        assert_eq!(expanded, set(&["small, green", "large, green"]));
    }

    #[test]
    fn multidim_arity_mismatch_errors() {
        let mut rules = RuleTables::default();
        rules.install_multidim(vec![HashMap::new(), HashMap::new()]);
        let err = rules.expand_leaf("(only_one)").unwrap_err();
        assert_eq!(
            err,
            IndexError::ArityMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn installing_onedim_clears_multidim() {
        let mut rules = RuleTables::default();
        rules.install_multidim(vec![HashMap::new()]);
        rules.install_onedim(HashMap::new());
        // A tuple leaf is no longer recognized as multi-dim; it's a
        // literal one-dim lookup instead.
        assert_eq!(rules.expand_leaf("(a)").unwrap(), set(&["(a)"]));
    }
}
