//! Cogmind score sheet parsing and progression chart library.
//!
//! Runs are read from legacy text score sheets ([`record`]) or archived
//! protobuf records ([`archive`]), grouped per player ([`scores`]), viewed as
//! a date-sorted table ([`data`]) and turned into drawing-backend agnostic
//! chart plans ([`charts`]).

use std::path::PathBuf;

use thiserror::Error;

pub mod archive;
pub mod charts;
pub mod data;
pub mod record;
pub mod scores;
pub mod stats;

pub use archive::parse_archive;
pub use charts::{Chart, ChartKind};
pub use data::{Data, Field, XAxis};
pub use record::{parse_file_name, parse_sheet, Extended, Outcome, Run, SheetName};
pub use scores::{collect_archives, collect_sheets, ScanOptions, Scores};

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("unrecognized score sheet file name: {0}")]
    InvalidFileName(String),
    #[error("invalid date in file name: {0}")]
    InvalidDate(String),
    #[error("failed to decode archived score sheet: {0}")]
    ArchiveDecode(String),
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown x axis: {0}")]
    UnknownXAxis(String),
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
