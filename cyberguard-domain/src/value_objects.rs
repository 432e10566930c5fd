// Domain value objects
pub mod identifiers;
pub mod risk_level;
pub mod risk_score;
pub mod trend;

pub use identifiers::*;
pub use risk_level::*;
pub use risk_score::*;
pub use trend::*;
