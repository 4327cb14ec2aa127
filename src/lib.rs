//! sourcedeco - decorates source text with markup from highlighting ranges
//!
//! ```
//! use sourcedeco::{LineDecorator, RangeStore};
//!
//! let store = RangeStore::parse("0,7,k;").unwrap();
//! let lines = LineDecorator::html()
//!     .decorate_all("package org.sonar.core.source;", &store)
//!     .unwrap();
//! assert_eq!(lines, vec!["<span class=\"k\">package</span> org.sonar.core.source;"]);
//! ```

pub mod config;
pub mod decoration;
pub mod error;
pub mod markup;

pub use config::Config;
pub use decoration::{HighlightRange, LineDecorator, LineWindow, RangeStore};
pub use error::{DecorationError, Result};
pub use markup::{AnsiMarkup, HtmlMarkup, Markup};
