//! Background work started when a form opens: option lists and the generated code.
//! Results come back as [`FormEvent`]s tagged with the session they were started for.

use crate::form::session::HydrationPlan;
use crate::service::{CrudClient, LookupClient, SelectOption};
use tokio::task::JoinSet;
use uuid::Uuid;

#[derive(Debug)]
pub enum FormEvent {
    /// Loaded options for a select field; empty after a failed load.
    Options {
        session: Uuid,
        field: String,
        options: Vec<SelectOption>,
    },
    /// Generated code; `None` after a failed request.
    Code {
        session: Uuid,
        field: String,
        code: Option<String>,
    },
}

impl FormEvent {
    pub fn session(&self) -> Uuid {
        match self {
            FormEvent::Options { session, .. } | FormEvent::Code { session, .. } => *session,
        }
    }
}

/// Running hydration tasks for one form session. Dropping it aborts what is still in flight.
pub struct Hydration {
    tasks: JoinSet<FormEvent>,
}

impl Hydration {
    pub fn start(plan: HydrationPlan, lookups: &LookupClient, crud: &CrudClient) -> Self {
        let mut tasks = JoinSet::new();
        let session = plan.session;
        for (field, source) in plan.option_fields {
            let lookups = lookups.clone();
            tasks.spawn(async move {
                let options = match lookups.fetch_options(&source).await {
                    Ok(options) => options,
                    Err(e) => {
                        tracing::warn!(field = %field, url = %source.url, error = %e, "option load failed");
                        Vec::new()
                    }
                };
                FormEvent::Options {
                    session,
                    field,
                    options,
                }
            });
        }
        if let Some(field) = plan.code_field {
            let crud = crud.clone();
            tasks.spawn(async move {
                let code = match crud.generate_code(None).await {
                    Ok(code) => Some(code),
                    Err(e) => {
                        tracing::warn!(field = %field, error = %e, "code generation failed");
                        None
                    }
                };
                FormEvent::Code {
                    session,
                    field,
                    code,
                }
            });
        }
        Hydration { tasks }
    }

    /// Next finished event, in completion order. `None` once everything has reported.
    pub async fn next(&mut self) -> Option<FormEvent> {
        loop {
            match self.tasks.join_next().await? {
                Ok(event) => return Some(event),
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    tracing::error!(error = %e, "hydration task panicked");
                    continue;
                }
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn abort(&mut self) {
        self.tasks.abort_all();
    }
}
