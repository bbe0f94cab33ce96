pub mod errors;
pub mod model;
mod reader;
pub mod schema;

pub use errors::ParserError;
pub use model::{load_dataset, F1Dataset};
pub use reader::{parse_table, read_table};
pub use schema::{ColumnKind, ColumnSpec, TableKind};
