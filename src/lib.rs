//! Cascading "double dropdown" select widget.
//!
//! A [`CascadingSelector`] binds a primary `<select>` to a secondary one: every
//! change of the primary selection replaces the secondary option set with the
//! group of an [`OptionTable`] that sits at the selected index.
//!
//! The widget runs against [`Document`], a deterministic in-memory document
//! with `<select>`/`<option>` semantics and change-event dispatch. The
//! repopulation step itself is written against [`SelectionControlHandle`], so
//! any control implementing that trait can be driven by [`repopulate`].
//!
//! ```
//! use double_drop::{CascadingSelector, Document, OptionTable};
//!
//! let html = r#"
//!     <select id='make'>
//!       <option>German</option>
//!       <option>Japanese</option>
//!     </select>
//!     <select id='model'></select>
//! "#;
//! let mut doc = Document::from_html(html)?;
//! let table = OptionTable::new(vec![vec!["Ford", "BMW"], vec!["Toyota"]]);
//! let mut cascade = CascadingSelector::new(&doc, "make", "model", table)?;
//! cascade.start(&mut doc)?;
//!
//! doc.select_index("#make", 1)?;
//! doc.assert_options("#model", &["Toyota"])?;
//! # Ok::<(), double_drop::Error>(())
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};
use unicode_normalization::UnicodeNormalization;

mod cascade;
mod config;
mod control;
mod document;
mod dom;
mod field;
mod html;
mod option_table;
mod runtime_state;
mod selector;

pub use cascade::CascadingSelector;
pub use config::{DEFAULT_PLACEHOLDER, DEFAULT_SEPARATOR, WidgetConfig};
pub use control::{
    OptionList, Repopulated, SelectControl, SelectOption, SelectionControlHandle, repopulate,
};
pub use document::Document;
pub use field::{DoubleDropField, compress, decompress};
pub use option_table::{Choices, OptionTable};
pub use runtime_state::{ChangeEvent, ListenerId};

use dom::{Dom, NodeId, NodeType};
use runtime_state::ListenerStore;
use selector::ElementRef;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("dom error: {0}")]
    Dom(String),
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    #[error("element not found: {0}")]
    ElementNotFound(String),
    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(
        "option table has {groups} groups but primary control {selector} has {choices} options"
    )]
    OptionTableMismatch {
        selector: String,
        groups: usize,
        choices: usize,
    },
    #[error("invalid choice: {0}")]
    InvalidChoice(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}
