pub mod analysis_commands;
pub mod entity_commands;

pub use analysis_commands::*;
pub use entity_commands::*;
