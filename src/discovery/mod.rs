mod file_finder;

pub use file_finder::{sidecar_path, FileFinder, FileType, SourceFile};
