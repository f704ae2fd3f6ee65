mod config;
mod date;
mod error;
mod paths;
mod query;

mod filters;
mod progress;
mod record;
mod csv_io;
mod util;

mod dataset;
mod fetcher;
mod transport;

pub use crate::config::{FetchOptions, DEFAULT_BASE_URL, DEFAULT_DATA_DIR, ENV_BASE_URL, ENV_DATA_DIR};
pub use crate::date::{
    format_iso_date, iter_days, parse_iso_date, LocalZone, PLATFORM_FLOOR,
};
pub use crate::error::RcError;
pub use crate::query::{SampleCriteria, SelectBy, DEFAULT_SEED};
pub use crate::record::{RawComment, Record, SearchResponse, CSV_HEADER, PERMALINK_BASE, URL_NOT_AVAILABLE};

// Acquisition: validated query, day-by-day driver, and the transport seam.
pub use crate::fetcher::{FetchNotice, FetchQuery, FetchReport, Fetcher};
pub use crate::transport::{HttpTransport, Transport};

// Sampling over a loaded file.
pub use crate::dataset::Dataset;
pub use crate::filters::{matches_terms, tokenize};

// CSV persistence shared by both halves.
pub use crate::csv_io::{read_records, read_records_from, write_records, write_records_to, CsvRecordWriter};

pub use crate::paths::default_filename;
pub use crate::util::init_tracing_once;
