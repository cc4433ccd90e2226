//! Tabular records — batches, sources, and column summaries.

pub mod batch;
pub mod source;
pub mod summary;

pub use batch::RecordBatch;
pub use source::{CsvSource, DataSource, JsonSource};
pub use summary::{ColumnSummary, ColumnType, summarize};
