//! # Rarity Common Library
//!
//! Shared code for the rarity generator including:
//! - NFT metadata record types
//! - Trait tally construction
//! - Rarity scoring and ranking
//! - Record schema checks and validation error reporting
//! - Configuration loading
//! - IPFS link resolution

pub mod config;
pub mod error;
pub mod links;
pub mod metadata;
pub mod schema;
pub mod scorer;
pub mod tally;
pub mod validation;

pub use error::{Error, Result};
pub use metadata::{MetadataRecord, NftDocument, TraitEntry};
pub use scorer::{rank, round_to_hundredth, score_all, score_record, RankedItem, ScoredRecord};
pub use tally::{build_tally, build_tally_parallel, Tally};
pub use validation::{ValidationFailure, ValidationReporter};
