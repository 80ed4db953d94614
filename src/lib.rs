//! Two-locale (`en` / `hi`) presenter for a small static site: resolves the
//! visitor's language, writes the matching strings into the page and keeps
//! same-site links carrying `?lang=`.

pub mod config;
pub mod document;
pub mod links;
pub mod locale;
pub mod presenter;
pub mod store;
pub mod translations;

pub use config::Config;
pub use document::{Document, StaticPage};
pub use locale::Locale;
pub use presenter::{LocalePresenter, LocaleSource};
pub use store::{FileStore, MemoryStore, PreferenceStore};
