pub mod analysis_stream_hub;
pub mod dashboard;

pub use analysis_stream_hub::*;
pub use dashboard::*;
