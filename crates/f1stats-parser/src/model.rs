use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::errors::ParserError;
use crate::reader::read_table;
use crate::schema::TableKind;

/// The six f1db relations, loaded once and never mutated.
#[derive(Debug, Clone)]
pub struct F1Dataset {
    pub lap_times: DataFrame,
    pub results: DataFrame,
    pub driver_standings: DataFrame,
    pub drivers: DataFrame,
    pub races: DataFrame,
    pub qualifying: DataFrame,
}

impl F1Dataset {
    pub fn table(&self, kind: TableKind) -> &DataFrame {
        match kind {
            TableKind::LapTimes => &self.lap_times,
            TableKind::Results => &self.results,
            TableKind::DriverStandings => &self.driver_standings,
            TableKind::Drivers => &self.drivers,
            TableKind::Races => &self.races,
            TableKind::Qualifying => &self.qualifying,
        }
    }
}

/// Loads every table from `dir`. The first unreadable or malformed file aborts the load.
pub fn load_dataset(dir: &Path) -> Result<F1Dataset, ParserError> {
    info!(data_dir = %dir.display(), "loading f1db tables");

    let dataset = F1Dataset {
        lap_times: read_table(TableKind::LapTimes, dir)?,
        results: read_table(TableKind::Results, dir)?,
        driver_standings: read_table(TableKind::DriverStandings, dir)?,
        drivers: read_table(TableKind::Drivers, dir)?,
        races: read_table(TableKind::Races, dir)?,
        qualifying: read_table(TableKind::Qualifying, dir)?,
    };

    for kind in TableKind::ALL {
        info!(table = kind.name(), rows = dataset.table(kind).height(), "loaded table");
    }

    Ok(dataset)
}
