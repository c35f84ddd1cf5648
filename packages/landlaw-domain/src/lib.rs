pub mod document;
pub mod filters;
pub mod history;
pub mod message;
pub mod reconcile;
pub mod scoring;
pub mod strategy;

pub use document::{ContentSignature, Document, format_doc, format_docs};
pub use filters::MetadataFilters;
pub use message::{Message, Role};
