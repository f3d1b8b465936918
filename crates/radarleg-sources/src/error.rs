use thiserror::Error;

/// Failures raised while fetching or decoding one source.
///
/// Adapters absorb transient per-page and per-year failures internally;
/// only source-fatal conditions (a corrupt archive, an unparsable top-level
/// document, or the single bulk download failing) travel down the record
/// stream as `Err` items.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Server { status: u16, url: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive unreadable: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("markup document parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unexpected payload shape: {0}")]
    Payload(String),
}
