//! Backend-facing services: the generic CRUD client, select option lookups and field validation.

mod crud;
mod options;
mod validation;
pub use crud::{CrudClient, CODE_GENERATE_PATH, DEFAULT_CODE_SEED};
pub use options::{parse_options, LookupClient, SelectOption};
pub use validation::FieldValidator;
