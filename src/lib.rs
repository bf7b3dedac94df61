//! sentiero — localized URL path management for hierarchical content trees.
//!
//! Per-locale slugs with default-locale fallback, lazily cached
//! materialized paths with transitive invalidation, segment routing, and
//! batch repair. The host CMS owns persistence and write locking; this
//! crate augments its page tree with locale-aware slug and path
//! semantics.

pub mod config;
pub mod error;
pub mod locale;
pub mod path;
pub mod repair;
pub mod router;
pub mod site;
pub mod slug;
pub mod snapshot;
pub mod tree;

pub use error::{SiteError, SiteResult};
pub use locale::{Locale, LocaleRegistry};
pub use site::Site;
pub use snapshot::SiteSnapshot;
