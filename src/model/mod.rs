pub mod document;
pub mod line_format;
pub mod merge;
pub mod selection;
pub mod types;
