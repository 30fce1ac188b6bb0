//! What the list shows for one fetched page: headers, formatted rows, row actions,
//! empty state. Pure functions of the schema and the current rows.

use crate::config::{ColumnSpec, CopyTransform, EntitySchema};
use crate::format::{cell_value, format_cell};
use crate::record::{Record, RecordId, ID_FIELD};
use serde_json::Value;
use std::cmp::Ordering;

pub const ACTIONS_HEADER: &str = "Actions";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Copy,
    Delete,
}

/// Which handlers the page wired up; unwired actions are not shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSet {
    pub create: bool,
    pub edit: bool,
    pub copy: bool,
    pub delete: bool,
}

impl ActionSet {
    pub fn all() -> Self {
        ActionSet {
            create: true,
            edit: true,
            copy: true,
            delete: true,
        }
    }

    pub fn row_actions(&self) -> Vec<RowAction> {
        let mut out = Vec::new();
        if self.edit {
            out.push(RowAction::Edit);
        }
        if self.copy {
            out.push(RowAction::Copy);
        }
        if self.delete {
            out.push(RowAction::Delete);
        }
        out
    }
}

impl Default for ActionSet {
    fn default() -> Self {
        ActionSet::all()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortState {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderCell {
    pub label: String,
    pub flex: f32,
    pub sortable: bool,
    pub sorted: Option<SortDirection>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    pub id: Option<RecordId>,
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
    pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableView {
    /// Schema columns, then the actions column when any row action is wired.
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RowView>,
    /// Server-side match count for the current search.
    pub row_count: u64,
    pub loading: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListRender {
    /// Nothing on this page and nothing loading: offer to create the first record.
    Empty { create_label: Option<String> },
    Table(TableView),
}

pub struct ListInput<'a> {
    pub schema: &'a EntitySchema,
    pub rows: &'a [Record],
    pub row_count: u64,
    pub loading: bool,
    pub actions: ActionSet,
    pub sort: Option<&'a SortState>,
    pub highlight: Option<&'a RecordId>,
}

pub fn render(input: ListInput<'_>) -> ListRender {
    if input.rows.is_empty() && !input.loading {
        return ListRender::Empty {
            create_label: input
                .actions
                .create
                .then(|| format!("Add new {}", input.schema.title)),
        };
    }

    let row_actions = input.actions.row_actions();
    let mut headers: Vec<HeaderCell> = input
        .schema
        .columns
        .iter()
        .map(|c| HeaderCell {
            label: c.header.clone(),
            flex: c.flex,
            sortable: c.sortable,
            sorted: input
                .sort
                .filter(|s| c.sortable && s.field == c.field)
                .map(|s| s.direction),
        })
        .collect();
    if !row_actions.is_empty() {
        headers.push(HeaderCell {
            label: ACTIONS_HEADER.to_string(),
            flex: 1.0,
            sortable: false,
            sorted: None,
        });
    }

    let mut ordered: Vec<&Record> = input.rows.iter().collect();
    if let Some(sort) = input.sort {
        if let Some(column) = input.schema.columns.iter().find(|c| c.field == sort.field && c.sortable) {
            sort_page(&mut ordered, column, sort.direction);
        }
    }

    let rows = ordered
        .into_iter()
        .map(|record| {
            let id = record.id();
            RowView {
                highlighted: input.highlight.is_some() && id.as_ref() == input.highlight,
                cells: input.schema.columns.iter().map(|c| format_cell(c, record)).collect(),
                actions: row_actions.clone(),
                id,
            }
        })
        .collect();

    ListRender::Table(TableView {
        headers,
        rows,
        row_count: input.row_count,
        loading: input.loading,
    })
}

/// Stable sort of the rows already on screen; other pages are not consulted.
pub fn sort_page(rows: &mut [&Record], column: &ColumnSpec, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = compare_values(cell_value(a, &column.field), cell_value(b, &column.field));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::String(x)), Some(Value::String(y))) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Prefill for "copy": the source without `id`, copy rules applied to string fields.
pub fn copy_record(schema: &EntitySchema, source: &Record) -> Record {
    let mut copy = source.clone();
    copy.remove(ID_FIELD);
    for rule in &schema.copy_rules {
        let current = copy.str(&rule.field).unwrap_or_default().to_string();
        let next = match &rule.transform {
            CopyTransform::Suffix(s) if !current.is_empty() => format!("{}{}", current, s),
            CopyTransform::Prefix(p) if !current.is_empty() => format!("{}{}", p, current),
            CopyTransform::Clear => String::new(),
            _ => continue,
        };
        copy.set(rule.field.clone(), Value::String(next));
    }
    copy
}
