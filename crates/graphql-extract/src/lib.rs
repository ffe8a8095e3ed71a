mod cache;
mod error;
mod extractor;
mod indent;
mod language;
mod line_index;
mod selector;
mod source_location;

pub use cache::{CacheStats, SourceCache, DEFAULT_CACHE_CAPACITY};
pub use error::{ExtractError, Result};
pub use extractor::{
    extract_from_file, extract_from_source, ExtractConfig, Extractor, SourceFragment,
    UNKNOWN_MODULE,
};
pub use indent::restore_indentation;
pub use language::Language;
pub use line_index::LineIndex;
pub use selector::select_at;
pub use source_location::{Position, Range, SourceLocation};
