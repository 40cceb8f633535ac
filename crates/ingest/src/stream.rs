use crate::context::Context;
use crate::creator::{Ingested, RecordCreator};
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use radiotv_extract::xml::Document;
use radiotv_repository::ClientHandle;
use std::collections::VecDeque;
use std::sync::Arc;

/// A program record waiting to be ingested.
#[derive(Debug, Clone)]
pub struct Record {
    /// Used for logging and audit comments only.
    pub filename: String,
    pub metadata: Document,
}
impl Record {
    pub fn new(filename: impl Into<String>, metadata: Document) -> Self {
        Self {
            filename: filename.into(),
            metadata,
        }
    }

    /// Parses raw XML into a record.
    pub fn parse(filename: impl Into<String>, xml: impl AsRef<[u8]>) -> Result<Self> {
        let metadata = Document::parse(xml).or_raise(|| ErrorKind::Metadata)?;
        Ok(Self::new(filename, metadata))
    }
}

/// Progress events emitted by [`ingest`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once, with the number of records.
/// 2. [`Ingested`](Self::Ingested), zero or more times, one per successful
///    record, in order of completion.
/// 3. [`Complete`](Self::Complete), exactly once, signalling the stream is
///    finished.
#[derive(Debug)]
pub enum IngestEvent {
    Started(usize),
    /// A record (named by its filename) has been ingested.
    Ingested(String, Ingested),
    Complete,
}

/// Streams [`IngestEvent`]s while ingesting every record.
///
/// Each record gets its own [`RecordCreator`]; up to `context.concurrency`
/// records are in flight at once, with the next record promoted as each one
/// completes. A failed record is surfaced as an `Err` item without
/// terminating the stream.
pub fn ingest<'a>(
    client: &'a ClientHandle,
    context: &'a Arc<Context>,
    records: Vec<Record>,
) -> impl Stream<Item = Result<IngestEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(IngestEvent::Started(records.len()));

        let mut pending: VecDeque<_> =
            records.into_iter().map(|record| ingest_record(client, context, record)).collect();
        let mut processing = FuturesUnordered::new();
        processing.extend(pending.drain(..context.concurrency.max(1).min(pending.len())));
        while let Some(result) = processing.next().await {
            yield result.map(|(filename, ingested)| IngestEvent::Ingested(filename, ingested));
            // FIFO, so records start in the order given.
            if let Some(next) = pending.pop_front() {
                processing.push(next);
            }
        }

        yield Ok(IngestEvent::Complete);
    })
}

async fn ingest_record(client: &ClientHandle, context: &Arc<Context>, record: Record) -> Result<(String, Ingested)> {
    let creator = RecordCreator::new(Arc::clone(client), Arc::clone(context));
    match creator.ingest_program(&record.metadata, &record.filename).await {
        Ok(ingested) => Ok((record.filename, ingested)),
        Err(e) => {
            tracing::error!(filename = %record.filename, error = ?e, "Failed to ingest program record");
            Err(e)
        },
    }
}
