pub mod file_sink;

pub use file_sink::{load_draft, remove_draft, FileSink, StoredValues};
