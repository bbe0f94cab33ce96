use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Text,
    /// ISO `YYYY-MM-DD`, validated but stored as text.
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

const fn required(name: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec {
        name,
        kind,
        nullable: false,
    }
}

const fn nullable(name: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec {
        name,
        kind,
        nullable: true,
    }
}

const LAP_TIME_COLUMNS: &[ColumnSpec] = &[
    required("raceId", ColumnKind::Int),
    required("driverId", ColumnKind::Int),
    required("lap", ColumnKind::Int),
    required("milliseconds", ColumnKind::Int),
];

const RESULT_COLUMNS: &[ColumnSpec] = &[
    required("raceId", ColumnKind::Int),
    required("driverId", ColumnKind::Int),
    nullable("grid", ColumnKind::Int),
    required("positionOrder", ColumnKind::Int),
];

const DRIVER_STANDING_COLUMNS: &[ColumnSpec] = &[
    required("raceId", ColumnKind::Int),
    required("driverId", ColumnKind::Int),
    nullable("position", ColumnKind::Int),
];

const DRIVER_COLUMNS: &[ColumnSpec] = &[
    required("driverId", ColumnKind::Int),
    nullable("surname", ColumnKind::Text),
];

const RACE_COLUMNS: &[ColumnSpec] = &[
    required("raceId", ColumnKind::Int),
    required("name", ColumnKind::Text),
    required("date", ColumnKind::Date),
    required("circuitId", ColumnKind::Int),
];

const QUALIFYING_COLUMNS: &[ColumnSpec] = &[
    required("raceId", ColumnKind::Int),
    required("driverId", ColumnKind::Int),
    nullable("position", ColumnKind::Int),
];

/// The six relations of the f1db CSV export used by the analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    LapTimes,
    Results,
    DriverStandings,
    Drivers,
    Races,
    Qualifying,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        TableKind::LapTimes,
        TableKind::Results,
        TableKind::DriverStandings,
        TableKind::Drivers,
        TableKind::Races,
        TableKind::Qualifying,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableKind::LapTimes => "lap_times",
            TableKind::Results => "results",
            TableKind::DriverStandings => "driver_standings",
            TableKind::Drivers => "drivers",
            TableKind::Races => "races",
            TableKind::Qualifying => "qualifying",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            TableKind::LapTimes => "lap_times.csv",
            TableKind::Results => "results.csv",
            TableKind::DriverStandings => "driver_standings.csv",
            TableKind::Drivers => "drivers.csv",
            TableKind::Races => "races.csv",
            TableKind::Qualifying => "qualifying.csv",
        }
    }

    /// Columns kept from the file, in output frame order.
    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            TableKind::LapTimes => LAP_TIME_COLUMNS,
            TableKind::Results => RESULT_COLUMNS,
            TableKind::DriverStandings => DRIVER_STANDING_COLUMNS,
            TableKind::Drivers => DRIVER_COLUMNS,
            TableKind::Races => RACE_COLUMNS,
            TableKind::Qualifying => QUALIFYING_COLUMNS,
        }
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|spec| spec.name).collect()
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
