pub mod error;
pub mod insight;
pub mod llm_config;
pub mod preview;
pub mod table;
pub mod visualization;
