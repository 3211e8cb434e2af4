//! Annotation extraction and source file parsing

pub mod config;
pub mod extractor;
pub mod languages;
pub mod parser;
pub mod recovery;
pub mod scope;


pub use config::{ConfigError, IndexerConfig, CONFIG_FILE_NAME};
pub use extractor::{extract_metadata, extract_metadata_for_tag, ExtractedBlock};
pub use languages::{CommentGrammar, Language, StringQuote, METADATA_TAG};
pub use parser::MetadataParser;
