pub mod remote_scoring_model;
pub mod rule_scoring_model;

pub use remote_scoring_model::*;
pub use rule_scoring_model::*;
