use crate::error::LoadError;
use crate::filter::FilterSelection;
use crate::loader;
use crate::pipeline;
use crate::types::{AggregateResults, FilterOptions, TripTable};
use once_cell::unsync::OnceCell;
use std::path::{Path, PathBuf};

/// One dashboard session: owns the source path and the table loaded from it.
///
/// The table is read on first use and then kept for the life of the session.
/// Every filter change is a call to [`Dashboard::refresh`]; nothing from a
/// previous refresh is remembered.
pub struct Dashboard {
    source: PathBuf,
    table: OnceCell<TripTable>,
}

impl Dashboard {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            table: OnceCell::new(),
        }
    }

    /// A session over an already-built table; no file is read.
    pub fn with_table(source: impl Into<PathBuf>, table: TripTable) -> Self {
        Self {
            source: source.into(),
            table: OnceCell::from(table),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn table(&self) -> Result<&TripTable, LoadError> {
        self.table.get_or_try_init(|| loader::load(&self.source))
    }

    pub fn default_selection(&self) -> Result<FilterSelection, LoadError> {
        Ok(FilterSelection::for_table(self.table()?))
    }

    pub fn filter_options(&self) -> Result<FilterOptions, LoadError> {
        Ok(self.table()?.filter_options())
    }

    pub fn refresh(&self, selection: &FilterSelection) -> Result<AggregateResults, LoadError> {
        Ok(pipeline::aggregate(self.table()?, selection))
    }
}
