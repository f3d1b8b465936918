//! State assembly adapter: bulk zip archive of every proposal on record.
//!
//! The assembly publishes no query API, only a daily-refreshed zip (around
//! 16 MB) holding one XML document. The archive is downloaded fresh on every
//! invocation so results are never stale, decompressed in memory, and parsed
//! in a single pass. Failure here is atomic: if the download, the archive, or
//! the top-level document is broken there is nothing partial worth keeping,
//! so the whole source fails.

use std::io::{Cursor, Read};

use async_stream::stream;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use radarleg_core::record::or_unknown;
use radarleg_core::{BillRecord, SourceName, YearRange, UNKNOWN};

use crate::adapter::{ProgressSink, RadarEvent, RecordStream, SourceAdapter};
use crate::error::SourceError;
use crate::transport::Transport;

pub const DEFAULT_ARCHIVE_URL: &str =
    "https://www.al.sp.gov.br/repositorioDados/processo_legislativo/proposituras.zip";

pub struct AlespAdapter<T> {
    transport: T,
    archive_url: String,
}

impl<T: Transport> AlespAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_archive_url(transport, DEFAULT_ARCHIVE_URL)
    }

    pub fn with_archive_url(transport: T, archive_url: impl Into<String>) -> Self {
        Self {
            transport,
            archive_url: archive_url.into(),
        }
    }
}

impl<T: Transport> SourceAdapter for AlespAdapter<T> {
    fn name(&self) -> SourceName {
        SourceName::Alesp
    }

    fn fetch<'a>(
        &'a self,
        range: YearRange,
        _per_year_limit: usize,
        progress: &'a ProgressSink,
    ) -> RecordStream<'a> {
        Box::pin(stream! {
            let bytes = match self.transport.get_bytes(&self.archive_url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "archive download failed");
                    progress.emit(RadarEvent::SourceFailed {
                        source: SourceName::Alesp,
                        message: e.to_string(),
                    });
                    yield Err(e);
                    return;
                }
            };
            debug!(bytes = bytes.len(), "archive downloaded");
            progress.emit(RadarEvent::ArchiveDownloaded {
                source: SourceName::Alesp,
                bytes: bytes.len(),
            });

            let outcome = extract_document(bytes).and_then(|xml| parse_document(&xml, range));
            match outcome {
                Ok(records) => {
                    for record in records {
                        yield Ok(record);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "archive unusable");
                    progress.emit(RadarEvent::SourceFailed {
                        source: SourceName::Alesp,
                        message: e.to_string(),
                    });
                    yield Err(e);
                }
            }
        })
    }
}

/// Pull the first XML entry out of the archive as text.
fn extract_document(bytes: Vec<u8>) -> Result<String, SourceError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut index = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.name().to_ascii_lowercase().ends_with(".xml") {
            index = Some(i);
            break;
        }
    }
    let Some(i) = index else {
        return Err(SourceError::Payload(
            "no xml document inside the archive".to_string(),
        ));
    };
    let mut entry = archive.by_index(i)?;
    let mut raw = Vec::new();
    entry
        .read_to_end(&mut raw)
        .map_err(|e| SourceError::Payload(format!("archive entry unreadable: {e}")))?;
    // Upstream encoding wobbles between UTF-8 and Latin-1; decode lossily.
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

#[derive(Clone, Copy)]
enum Field {
    Ano,
    Tipo,
    Numero,
    Ementa,
    Autor,
    DataEntrada,
    IdDocumento,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"ano" => Some(Self::Ano),
            b"tipo" => Some(Self::Tipo),
            b"numero" => Some(Self::Numero),
            b"ementa" => Some(Self::Ementa),
            b"autor" => Some(Self::Autor),
            b"dataEntrada" => Some(Self::DataEntrada),
            b"idDocumento" => Some(Self::IdDocumento),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Entry {
    ano: Option<String>,
    tipo: Option<String>,
    numero: Option<String>,
    ementa: Option<String>,
    autor: Option<String>,
    data_entrada: Option<String>,
    id_documento: Option<String>,
}

impl Entry {
    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Ano => &mut self.ano,
            Field::Tipo => &mut self.tipo,
            Field::Numero => &mut self.numero,
            Field::Ementa => &mut self.ementa,
            Field::Autor => &mut self.autor,
            Field::DataEntrada => &mut self.data_entrada,
            Field::IdDocumento => &mut self.id_documento,
        };
        *slot = Some(value);
    }

    /// Entries without a parseable year or a summary carry no signal and
    /// are dropped.
    fn into_record(self) -> Option<BillRecord> {
        let year: i32 = self.ano.as_deref()?.trim().parse().ok()?;
        let summary = self.ementa?;
        if summary.trim().is_empty() {
            return None;
        }
        let numero = self.numero?;
        let tipo = self.tipo.unwrap_or_else(|| "PL".to_string());
        let link = self
            .id_documento
            .map(|id| format!("https://www.al.sp.gov.br/propositura/?id={id}"))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Some(BillRecord {
            identifier: format!("{tipo} {numero}/{year}"),
            year,
            chamber: SourceName::Alesp.chamber(),
            summary,
            authors: or_unknown(self.autor),
            presented_date: or_unknown(self.data_entrada),
            status_text: UNKNOWN.to_string(),
            source_link: link,
            source_name: SourceName::Alesp,
        })
    }
}

/// Single-pass scan over the document, keeping only entries inside the
/// requested year range.
fn parse_document(xml: &str, range: YearRange) -> Result<Vec<BillRecord>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut entry: Option<Entry> = None;
    let mut field: Option<Field> = None;
    loop {
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"propositura" => entry = Some(Entry::default()),
                tag => {
                    if entry.is_some() {
                        field = Field::from_tag(tag);
                    }
                }
            },
            Event::Text(t) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    let text = t.unescape().map_err(quick_xml::Error::from)?.into_owned();
                    current.set(f, text);
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"propositura" {
                    if let Some(done) = entry.take()
                        && let Some(record) = done.into_record()
                        && range.contains(record.year)
                    {
                        records.push(record);
                    }
                } else {
                    field = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(records)
}
