//! Source adapters and the aggregation pipeline.
//!
//! Four public legislative data origins, four protocols: a paginated REST
//! API, a per-year bulk search, a legacy webservice, and a zip+XML bulk
//! archive. Each is wrapped in a [`SourceAdapter`] that hides the protocol
//! behind a uniform record stream; the [`Aggregator`] drains the enabled
//! adapters in order and produces one deduplicated, relevance-filtered
//! result set.

pub mod adapter;
pub mod aggregator;
pub mod alesp;
pub mod camara;
pub mod error;
pub mod municipal;
pub mod senado;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{ProgressSink, RadarEvent, RecordStream, SourceAdapter};
pub use aggregator::{Aggregator, CollectRequest, Collection, SourceWarning};
pub use alesp::AlespAdapter;
pub use camara::CamaraAdapter;
pub use error::SourceError;
pub use municipal::MunicipalSpAdapter;
pub use senado::SenadoAdapter;
pub use transport::{HttpTransport, Transport};
