pub mod analysis_handlers;
pub mod entity_handlers;
pub mod ops_handlers;

pub use analysis_handlers::*;
pub use entity_handlers::*;
pub use ops_handlers::*;

#[cfg(test)]
pub(crate) mod test_support;
