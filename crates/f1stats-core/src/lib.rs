pub mod analysis;
pub mod config;
pub mod enrich;
pub mod error;
pub mod report;
pub mod stats;

pub use analysis::{run_all, Question};
pub use config::AnalysisConfig;
pub use enrich::{enrich, load_enriched, EnrichedData};
pub use error::{AnalysisError, Result};
pub use report::{AnalysisReport, ChartSeries};
