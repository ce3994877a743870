pub mod export;
pub mod merge;
pub mod records;

pub use export::build_export;
pub use merge::{merge_translation_json, merge_translations, parse_translation, MergeOutcome};
