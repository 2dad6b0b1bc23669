use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems while loading the bookings file. Any of these means the
/// dashboard has nothing to show.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is missing required columns: {}", .path.display(), .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("{} contains no completed trips", .path.display())]
    NoCompletedTrips { path: PathBuf },
}
