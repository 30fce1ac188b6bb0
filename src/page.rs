//! One entity screen: wires the CRUD client, list view and form session together.

use crate::config::EntitySchema;
use crate::error::ScaffoldError;
use crate::form::{FormMode, FormSession, Hydration, SubmitOutcome};
use crate::list::{
    copy_record, render, ActionSet, Debouncer, DeleteConfirmation, ListInput, ListQueryState, ListRender,
    SortDirection, SortState,
};
use crate::notify::Notification;
use crate::record::{Record, RecordId};
use crate::response::PagedResult;
use crate::service::{CrudClient, LookupClient};
use crate::settings::ClientSettings;
use crate::transport::Transport;
use std::sync::Arc;

pub const LOAD_FAILED_MESSAGE: &str = "Records could not be loaded.";
pub const DELETED_MESSAGE: &str = "Record deleted.";
pub const DELETE_FAILED_MESSAGE: &str = "Deleting the record failed.";

/// Snapshot of the query a fetch was issued for. Only the newest ticket may update the rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub search: String,
}

impl FetchTicket {
    pub async fn execute(&self, crud: &CrudClient) -> Result<PagedResult, ScaffoldError> {
        crud.list_paged(self.page, self.page_size, &self.search).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum HighlightTarget {
    Id(RecordId),
    LastRow,
}

pub struct EntityListPage {
    schema: Arc<EntitySchema>,
    crud: CrudClient,
    lookups: LookupClient,
    query: ListQueryState,
    debounce: Debouncer,
    rows: Vec<Record>,
    row_count: u64,
    loading: bool,
    latest_seq: u64,
    sort: Option<SortState>,
    actions: ActionSet,
    form: FormSession,
    hydration: Option<Hydration>,
    confirm: DeleteConfirmation,
    pending_highlight: Option<HighlightTarget>,
    highlight: Option<RecordId>,
    notifications: Vec<Notification>,
}

impl EntityListPage {
    pub fn new(schema: Arc<EntitySchema>, transport: Arc<dyn Transport>, settings: &ClientSettings) -> Self {
        EntityListPage {
            crud: CrudClient::for_entity(transport.clone(), &schema),
            lookups: LookupClient::new(transport),
            query: ListQueryState::new(settings.page_size),
            debounce: Debouncer::new(settings.search_debounce),
            rows: Vec::new(),
            row_count: 0,
            loading: false,
            latest_seq: 0,
            sort: None,
            actions: ActionSet::all(),
            form: FormSession::new(schema.clone()),
            hydration: None,
            confirm: DeleteConfirmation::default(),
            pending_highlight: None,
            highlight: None,
            notifications: Vec::new(),
            schema,
        }
    }

    pub fn with_actions(mut self, actions: ActionSet) -> Self {
        self.actions = actions;
        self
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn client(&self) -> &CrudClient {
        &self.crud
    }

    pub fn query(&self) -> &ListQueryState {
        &self.query
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn highlighted(&self) -> Option<&RecordId> {
        self.highlight.as_ref()
    }

    pub async fn mount(&mut self) {
        self.refresh().await;
    }

    /// Issue a ticket for the current query; any older ticket still in flight becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_seq += 1;
        self.loading = true;
        FetchTicket {
            seq: self.latest_seq,
            page: self.query.server_page(),
            page_size: self.query.page_size(),
            search: self.query.search().to_string(),
        }
    }

    /// Apply a fetch result. Returns `false` when a newer fetch has been issued since.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, result: Result<PagedResult, ScaffoldError>) -> bool {
        if ticket.seq != self.latest_seq {
            tracing::debug!(
                entity = %self.schema.id,
                seq = ticket.seq,
                latest = self.latest_seq,
                "discarding superseded list response"
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.rows = page.items;
                self.row_count = page.total_count;
                if let Some(target) = self.pending_highlight.take() {
                    self.highlight = match target {
                        HighlightTarget::Id(id) => self.rows.iter().find_map(|r| r.id().filter(|rid| *rid == id)),
                        HighlightTarget::LastRow => self.rows.last().and_then(Record::id),
                    };
                }
            }
            Err(e) => {
                tracing::warn!(entity = %self.schema.id, error = %e, "list fetch failed");
                self.pending_highlight = None;
                self.notifications.push(Notification::error(LOAD_FAILED_MESSAGE));
            }
        }
        true
    }

    /// Fetch the current query now, dropping any pending debounced search.
    /// A page left past the end by a shrinking result set moves back to the last page.
    pub async fn refresh(&mut self) {
        self.debounce.cancel();
        self.fetch_current().await;
        if let Some(last) = self.clamped_page() {
            tracing::debug!(entity = %self.schema.id, from = self.query.page(), to = last, "page past end of results");
            self.query.set_page(last);
            self.fetch_current().await;
        }
    }

    async fn fetch_current(&mut self) {
        let ticket = self.begin_fetch();
        tracing::debug!(entity = %self.schema.id, page = ticket.page, page_size = ticket.page_size, search = %ticket.search, "fetching list");
        let result = ticket.execute(&self.crud).await;
        self.complete_fetch(&ticket, result);
    }

    fn clamped_page(&self) -> Option<u32> {
        if !self.rows.is_empty() || self.row_count == 0 {
            return None;
        }
        let last = self.query.page_count(self.row_count) - 1;
        (self.query.page() > last).then_some(last)
    }

    /// Search edits are debounced; call [`settle`](Self::settle) to let the timer run.
    pub fn set_search(&mut self, search: &str) {
        if self.query.set_search(search) {
            self.highlight = None;
            self.debounce.arm();
        }
    }

    /// Wait out a pending search debounce and fetch. Returns whether a fetch happened.
    pub async fn settle(&mut self) -> bool {
        if self.debounce.wait().await {
            self.refresh().await;
            true
        } else {
            false
        }
    }

    pub fn search_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub async fn set_page(&mut self, page: u32) {
        self.query.set_page(page);
        self.highlight = None;
        self.refresh().await;
    }

    pub async fn next_page(&mut self) {
        if self.query.has_next(self.row_count) {
            let next = self.query.page() + 1;
            self.set_page(next).await;
        }
    }

    pub async fn previous_page(&mut self) {
        if let Some(prev) = self.query.page().checked_sub(1) {
            self.set_page(prev).await;
        }
    }

    pub async fn set_page_size(&mut self, page_size: u32) {
        self.query.set_page_size(page_size);
        self.highlight = None;
        self.refresh().await;
    }

    /// Click on a header: ascending, then descending, then back to server order.
    pub fn toggle_sort(&mut self, field: &str) {
        let sortable = self.schema.columns.iter().any(|c| c.field == field && c.sortable);
        if !sortable {
            return;
        }
        self.sort = match self.sort.take() {
            Some(s) if s.field == field && s.direction == SortDirection::Ascending => Some(SortState {
                field: s.field,
                direction: SortDirection::Descending,
            }),
            Some(s) if s.field == field => None,
            _ => Some(SortState {
                field: field.to_string(),
                direction: SortDirection::Ascending,
            }),
        };
    }

    pub fn view(&self) -> ListRender {
        render(ListInput {
            schema: &self.schema,
            rows: &self.rows,
            row_count: self.row_count,
            loading: self.loading,
            actions: self.actions,
            sort: self.sort.as_ref(),
            highlight: self.highlight.as_ref(),
        })
    }

    pub fn form(&self) -> &FormSession {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormSession {
        &mut self.form
    }

    /// Open an empty create form. `false` when a form is already open.
    pub fn open_create(&mut self) -> bool {
        self.open_form(None)
    }

    /// Edit a row of the current page, or fetch the record when it is not on screen.
    pub async fn open_edit(&mut self, id: &RecordId) -> Result<bool, ScaffoldError> {
        if self.form.is_open() {
            return Ok(false);
        }
        let record = match self.row(id) {
            Some(r) => r.clone(),
            None => self.crud.get_by_id(id).await?,
        };
        Ok(self.open_form(Some(&record)))
    }

    /// Create form prefilled from a row, with copy rules applied and no id.
    pub fn open_copy(&mut self, id: &RecordId) -> bool {
        let Some(source) = self.row(id) else {
            return false;
        };
        let prefill = copy_record(&self.schema, source);
        self.open_form(Some(&prefill))
    }

    fn open_form(&mut self, initial: Option<&Record>) -> bool {
        if self.form.is_open() {
            return false;
        }
        let plan = self.form.open(initial);
        self.hydration = Some(Hydration::start(plan, &self.lookups, &self.crud));
        true
    }

    fn row(&self, id: &RecordId) -> Option<&Record> {
        self.rows.iter().find(|r| r.id().as_ref() == Some(id))
    }

    /// Apply the next finished option/code load. `false` once nothing is left.
    pub async fn hydrate_step(&mut self) -> bool {
        let Some(hydration) = self.hydration.as_mut() else {
            return false;
        };
        match hydration.next().await {
            Some(event) => {
                self.form.apply(event);
                true
            }
            None => {
                self.hydration = None;
                false
            }
        }
    }

    /// Apply every option/code load for the open form.
    pub async fn hydrate_form(&mut self) {
        while self.hydrate_step().await {}
    }

    /// Validate and persist the open form; create or update by its mode.
    pub async fn submit_form(&mut self) -> SubmitOutcome {
        let crud = self.crud.clone();
        let outcome = match self.form.mode().clone() {
            FormMode::Create => self.form.submit(|r| async move { crud.create(&r).await }).await,
            FormMode::Edit(id) => self.form.submit(|r| async move { crud.update(&id, &r).await }).await,
        };
        match &outcome {
            SubmitOutcome::Saved {
                record,
                mode,
                notification,
            } => {
                self.stop_hydration();
                self.notifications.push(notification.clone());
                self.highlight = None;
                if *mode == FormMode::Create {
                    self.query.set_page(0);
                    self.pending_highlight = Some(match record.id() {
                        Some(id) => HighlightTarget::Id(id),
                        None => HighlightTarget::LastRow,
                    });
                }
                self.refresh().await;
            }
            SubmitOutcome::Failed { notification, .. } => {
                self.notifications.push(notification.clone());
            }
            SubmitOutcome::Invalid(_) | SubmitOutcome::Ignored => {}
        }
        outcome
    }

    pub fn close_form(&mut self) {
        self.stop_hydration();
        self.form.close();
    }

    fn stop_hydration(&mut self) {
        if let Some(mut hydration) = self.hydration.take() {
            hydration.abort();
        }
    }

    /// First step of a delete: nothing is sent until [`confirm_delete`](Self::confirm_delete).
    pub fn request_delete(&mut self, id: RecordId) {
        self.confirm.request(id);
    }

    pub fn cancel_delete(&mut self) {
        self.confirm.cancel();
    }

    pub fn delete_pending(&self) -> Option<&RecordId> {
        self.confirm.pending()
    }

    /// Delete the confirmed record and refresh. `false` when nothing was confirmed or the delete failed.
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.confirm.confirm() else {
            return false;
        };
        match self.crud.remove(&id).await {
            Ok(()) => {
                self.notifications.push(Notification::success(DELETED_MESSAGE));
                if self.highlight.as_ref() == Some(&id) {
                    self.highlight = None;
                }
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::warn!(entity = %self.schema.id, id = %id, error = %e, "delete failed");
                self.notifications.push(Notification::error(DELETE_FAILED_MESSAGE));
                false
            }
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
