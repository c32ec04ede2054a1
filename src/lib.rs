//! # termlayer
//!
//! An in-memory inverted index and expression-based retrieval engine
//! over weighted-term documents.
//!
//! ## Pipeline Architecture
//!
//! ```text
//! postfix token stream
//!     |
//! [Rule Resolver   (rules)]      term -> expanded term set (HLE expansion)
//!     |
//! [Expression Evaluator (expression)]
//!     |              \
//! [Postings Algebra   [Histogram Algebra
//!  (postings)]          (histogram)]
//!     |                     |
//!     +----> [Inverted Index (index)] <----+
//!                    |
//!           [Retrieval Pipeline (retrieval)]
//!                    |
//!               ranked results
//! ```
//!
//! A query is a shared postfix token stream. The postings pass prunes
//! candidate documents by set algebra over doc-id/term-set pairs; the
//! retrieval pipeline then rescores each surviving candidate by
//! replaying the same tokens through the histogram algebra against that
//! document's weighted terms, in parallel across a worker pool.
//!
//! ## Usage
//!
//! ```
//! use termlayer::{Histogram, Index, Token};
//!
//! let mut index = Index::new();
//!
//! let mut doc1 = Histogram::new();
//! doc1.insert("rust".to_string(), 0.8);
//! doc1.insert("systems".to_string(), 0.6);
//! index.add_document(1, doc1).unwrap();
//!
//! let mut doc2 = Histogram::new();
//! doc2.insert("python".to_string(), 0.9);
//! index.add_document(2, doc2).unwrap();
//!
//! let query = Token::parse_sequence(["rust", "python", "+"]);
//! let results = index.retrieve_by_query_single(&query, 10, false, 0.0).unwrap();
//! assert_eq!(results.len(), 2);
//! ```
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `rules` | High-level-element rule resolution (one-dim and multi-dim/Cartesian) |
//! | `postings` | Postings algebra: 7 binary operators over doc-id/term-set pairs |
//! | `histogram` | Histogram algebra: 7 binary operators over weighted term maps |
//! | `expression` | Shared postfix evaluator driving both algebras |
//! | `index` | Owns postings and histogram state; document ingestion |
//! | `retrieval` | Threshold/sort/truncate pipeline, parallel rescoring |
//! | `config` | Hierarchical configuration (TOML + env overrides) |
//! | `error` | Error types |
//! | `value` | Core data model: terms, weights, histograms, postings |

pub mod config;
pub mod error;
pub mod expression;
pub mod histogram;
pub mod index;
pub mod postings;
pub mod retrieval;
pub mod rules;
pub mod value;

pub use config::Config;
pub use error::{IndexError, Result};
pub use expression::Token;
pub use index::Index;
pub use postings::{Operator, PostingsOperand};
pub use rules::RuleTables;
pub use value::{DocId, Histogram, Postings, Term, Weight};
