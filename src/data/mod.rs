//! Dataset containers and loaders

pub mod batched;
pub mod csv;

pub use self::batched::BatchedDataset;
pub use self::csv::{load_dataset, read_matrix, read_matrix_file};
