//! Filename tagger for anime releases.
//!
//! Splits a filename or folder name into tokens and classifies them into
//! [`Elements`]: title, episode and season numbers, release metadata, and the
//! order in which each element appeared.

pub mod elements;
pub mod keyword;
pub mod options;
pub mod parser;
pub mod tokenizer;

pub use elements::{ElementKind, Elements, Multi};
pub use options::{Exclude, ParseOptions};
pub use parser::{parse, parse_with};
