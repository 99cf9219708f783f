/*!
 * # Editing Core
 *
 * Live markdown-as-you-type editing over an immutable document value.
 *
 * ## Pipeline
 *
 * Every input event becomes one **edit step**:
 *
 * 1. **Auto-pair** (`autopair`): a typed opener inserts its closer, a typed
 *    closer steps over an existing one. A handled char skips straight to
 *    rendering as a `TextChange::Committed` step.
 * 2. **Commit** (`step`): the raw change (insert, backspace, delete, return,
 *    tab, caret move) is applied to the `Document`.
 * 3. **Derender** (`derender`): a styled run or link the caret moved strictly
 *    inside goes back to raw syntax.
 * 4. **Render** (`render`): completed raw syntax in the caret's block becomes
 *    a block type, an inline style, a link entity or an atomic media block.
 *
 * Offsets move through each rewrite with the maps in `offsets`, so the caret
 * keeps its place in the human-readable text.
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` and its pure write primitives
 * - **`offsets`**: selection arithmetic for wrapping and unwrapping syntax
 * - **`autopair`**: bracket and quote pairing
 * - **`derender`** / **`render`**: the two halves of the rewrite engine
 * - **`step`**: `apply_edit_step`, `TextChange`, `EngineOptions`
 * - **`session`**: `Editor`, a stateful adapter for hosts
 *
 * ## Usage Pattern
 *
 * ```rust
 * use livemark_engine::editing::Editor;
 *
 * let mut editor = Editor::default();
 * editor.type_text("# Notes\nsee [site](http://x.com)");
 *
 * let doc = &editor.state().document;
 * assert_eq!(doc.plain_text(), "Notes\nsee site");
 * ```
 */

pub mod autopair;
pub mod derender;
pub mod document;
pub mod error;
pub mod offsets;
pub mod render;
pub mod session;
pub mod step;

pub use autopair::{InputOutcome, handle_raw_input_char};
pub use document::Document;
pub use error::EditError;
pub use session::Editor;
pub use step::{EditorState, EngineOptions, TextChange, apply_edit_step};
