// Domain entities
pub mod analysis_request;
pub mod entity;
pub mod risk_analysis;
pub mod runtime_config;

pub use analysis_request::*;
pub use entity::*;
pub use risk_analysis::*;
pub use runtime_config::*;
