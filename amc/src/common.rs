pub use log::{debug, info, warn};

pub type Mat = nalgebra::DMatrix<f64>;

/// Dense word id within one corpus' vocabulary
pub type WordId = usize;
/// Topic index in `0..n_topics`
pub type TopicId = usize;
/// Document index within one corpus
pub type DocId = usize;
