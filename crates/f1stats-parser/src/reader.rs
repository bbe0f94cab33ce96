use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use polars::prelude::*;
use tracing::debug;

use crate::errors::ParserError;
use crate::schema::{ColumnKind, ColumnSpec, TableKind};

/// f1db writes SQL NULLs as a literal `\N`.
const NULL_MARKER: &str = "\\N";

enum ColumnValues {
    Int(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

struct ColumnBuilder {
    spec: ColumnSpec,
    index: usize,
    values: ColumnValues,
}

impl ColumnBuilder {
    fn new(spec: ColumnSpec, index: usize) -> Self {
        let values = match spec.kind {
            ColumnKind::Int => ColumnValues::Int(Vec::new()),
            ColumnKind::Text | ColumnKind::Date => ColumnValues::Text(Vec::new()),
        };
        Self {
            spec,
            index,
            values,
        }
    }

    fn push(&mut self, table: &'static str, raw: &str, line_index: usize) -> Result<(), ParserError> {
        let spec = self.spec;
        let value = if is_null(raw) { None } else { Some(raw.trim()) };

        if value.is_none() && !spec.nullable {
            return Err(ParserError::DataRow {
                table,
                line_index,
                message: format!("column '{}' must not be null", spec.name),
            });
        }

        match (&mut self.values, value) {
            (ColumnValues::Int(values), Some(raw)) => {
                values.push(Some(parse_required_i64(table, raw, line_index, spec.name)?));
            }
            (ColumnValues::Int(values), None) => values.push(None),
            (ColumnValues::Text(values), Some(raw)) => {
                if spec.kind == ColumnKind::Date {
                    parse_date(table, raw, line_index, spec.name)?;
                }
                values.push(Some(raw.to_string()));
            }
            (ColumnValues::Text(values), None) => values.push(None),
        }

        Ok(())
    }

    fn finish(self) -> Column {
        let name = self.spec.name;
        match self.values {
            ColumnValues::Int(values) => Series::new(name.into(), values).into(),
            ColumnValues::Text(values) => {
                let utf8: Vec<Option<&str>> = values.iter().map(|v| v.as_deref()).collect();
                Series::new(name.into(), utf8).into()
            }
        }
    }
}

fn is_null(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == NULL_MARKER
}

pub(crate) fn parse_required_i64(
    table: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<i64, ParserError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|err| ParserError::DataRow {
            table,
            line_index,
            message: format!("failed to parse column '{column}' as integer: {err}"),
        })
}

pub(crate) fn parse_date(
    table: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<NaiveDate, ParserError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| ParserError::DataRow {
        table,
        line_index,
        message: format!("failed to parse column '{column}' as date: {err}"),
    })
}

fn resolve_columns(
    kind: TableKind,
    headers: &StringRecord,
) -> Result<Vec<ColumnBuilder>, ParserError> {
    kind.columns()
        .iter()
        .map(|spec| {
            headers
                .iter()
                .position(|header| header.trim() == spec.name)
                .map(|index| ColumnBuilder::new(*spec, index))
                .ok_or(ParserError::MissingColumn {
                    table: kind.name(),
                    column: spec.name,
                })
        })
        .collect()
}

/// Parses CSV text for `kind` into a frame holding exactly the schema columns, in schema order.
pub fn parse_table(kind: TableKind, content: &str) -> Result<DataFrame, ParserError> {
    let table = kind.name();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| ParserError::Csv { table, source })?
        .clone();
    let mut builders = resolve_columns(kind, &headers)?;

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| ParserError::Csv { table, source })?;
        let line_index = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(row_idx + 2);

        for builder in builders.iter_mut() {
            let raw = record.get(builder.index).unwrap_or("");
            builder.push(table, raw, line_index)?;
        }
    }

    let columns: Vec<Column> = builders.into_iter().map(ColumnBuilder::finish).collect();
    DataFrame::new(columns).map_err(|err| ParserError::Frame {
        table,
        message: err.to_string(),
    })
}

/// Reads `<dir>/<file_name>` for `kind`.
pub fn read_table(kind: TableKind, dir: &Path) -> Result<DataFrame, ParserError> {
    let path = dir.join(kind.file_name());
    let content = fs::read_to_string(&path).map_err(|source| ParserError::MissingInput {
        table: kind.name(),
        path: path.clone(),
        source,
    })?;

    let df = parse_table(kind, &content)?;
    debug!(table = kind.name(), path = %path.display(), rows = df.height(), "parsed table");
    Ok(df)
}
