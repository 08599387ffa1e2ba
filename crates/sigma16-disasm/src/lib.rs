pub mod model;

// Re-export commonly used types/functions for the CLIs
pub use model::{load_image, load_symbols, parse_u16, Image};
