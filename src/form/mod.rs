//! Schema-driven form: typed values, session state machine and background hydration.

mod hydration;
mod session;
mod value;
pub use hydration::{FormEvent, Hydration};
pub use session::{FormMode, FormPhase, FormSession, HydrationPlan, SubmitOutcome};
pub use value::FieldValue;
