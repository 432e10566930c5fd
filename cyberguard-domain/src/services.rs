// Domain services
pub mod analysis_session;
pub mod bulk_assessment;
pub mod registry;
pub mod stats;

pub use analysis_session::*;
pub use bulk_assessment::*;
pub use registry::*;
pub use stats::*;
