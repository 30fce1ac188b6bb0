//! Admin scaffold: metadata-driven CRUD screens over a paged REST backend.
//!
//! Entities are described once as configuration (fields, columns, copy rules). From that
//! schema the crate builds a paged CRUD client, a form session with validation and async
//! option loading, and a list view with debounced search and server pagination.
//! Everything is headless: a UI shell drives [`EntityListPage`] and draws what it exposes.

pub mod config;
pub mod error;
pub mod form;
pub mod format;
pub mod list;
pub mod notify;
pub mod page;
pub mod record;
pub mod response;
pub mod sanitize;
pub mod service;
pub mod settings;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::{builtin_catalog, load_from_path, load_from_str, resolve, EntityCatalog, EntitySchema, FieldSpec};
pub use error::{ConfigError, ErrorKind, FieldErrors, ScaffoldError};
pub use form::{FieldValue, FormMode, FormPhase, FormSession, SubmitOutcome};
pub use list::{ListQueryState, ListRender};
pub use notify::{Notification, Severity};
pub use page::EntityListPage;
pub use record::{Record, RecordId};
pub use response::PagedResult;
pub use service::{CrudClient, LookupClient, SelectOption};
pub use settings::ClientSettings;
pub use transport::{HttpTransport, Transport};
