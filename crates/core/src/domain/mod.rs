pub mod attachment;
pub mod record;
pub mod search;
pub mod sheets;

// Re-export commonly used types
pub use attachment::*;
pub use record::*;
