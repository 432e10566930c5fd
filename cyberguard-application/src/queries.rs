pub mod analysis_queries;
pub mod entity_queries;

pub use analysis_queries::*;
pub use entity_queries::*;
