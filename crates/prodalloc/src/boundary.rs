//! Collaborators that supply and receive flat records.
//!
//! Spreadsheet readers, database adapters and the like live outside this
//! crate; they plug in by implementing [`RecordSource`] and [`RecordSink`].

use std::convert::Infallible;

use prodalloc_core::Record;

/// Supplies the input records of one run.
pub trait RecordSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load_records(&mut self) -> Result<Vec<Record>, Self::Error>;
}

/// Receives the updated records of one run.
pub trait RecordSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn persist_records(&mut self, records: &[Record]) -> Result<(), Self::Error>;
}

/// A source backed by a vector.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<Record>,
}

impl InMemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordSource for InMemorySource {
    type Error = Infallible;

    fn load_records(&mut self) -> Result<Vec<Record>, Self::Error> {
        Ok(self.records.clone())
    }
}

/// A sink that keeps every persisted batch.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    batches: Vec<Vec<Record>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `persist_records` calls so far.
    pub fn persist_count(&self) -> usize {
        self.batches.len()
    }

    /// The most recently persisted records.
    pub fn last(&self) -> Option<&[Record]> {
        self.batches.last().map(Vec::as_slice)
    }
}

impl RecordSink for InMemorySink {
    type Error = Infallible;

    fn persist_records(&mut self, records: &[Record]) -> Result<(), Self::Error> {
        self.batches.push(records.to_vec());
        Ok(())
    }
}
