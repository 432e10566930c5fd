pub mod seed_files;

pub use seed_files::*;
