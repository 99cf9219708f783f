pub mod editing;
pub mod io;
pub mod models;
pub mod patterns;

// Re-export key types for easier usage
pub use editing::{
    Document, EditError, Editor, EditorState, EngineOptions, InputOutcome, TextChange,
    apply_edit_step, handle_raw_input_char,
};
pub use io::{RawContent, RawContentError};
pub use models::*;
