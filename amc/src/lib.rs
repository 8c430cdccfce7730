//! Topic modelling with knowledge mined from many domains (AMC).
//!
//! Topics of other domains vote on which word pairs belong together
//! (must-links, mined with MS-Apriori) and which ones should be kept apart
//! (cannot-links). Both steer a collapsed Gibbs sampler on the target
//! domain.

pub mod common;
pub mod common_io;

/// Documents, vocabularies and document frequencies
pub mod corpus;
pub mod params;
pub mod topics;

pub mod cannot_links;
pub mod must_links;
pub mod word_pair;

/// Mining must-links and cannot-links from prior topics
pub mod knowledge_extraction;
pub mod must_link_graph;
pub mod topic_overlap;

/// The knowledge-augmented Gibbs sampler
pub mod gibbs;
pub mod occurrences;
pub mod sampling;
pub mod sufficient_stats;
pub mod urn_log;

pub mod run_amc;
