//! Serializable view of the application state
//!
//! Snapshots are what the render layer (the headless NDJSON emitter) sees.
//! They are rebuilt after every processed message and published on a
//! `watch` channel; subscribers only wake when the snapshot changed.

use std::collections::BTreeMap;

use serde::Serialize;

use taskdeck_core::{EntityId, EntityKind};

use crate::form::FieldView;
use crate::resource::ResourceView;
use crate::screens::{FormMode, FormPhase};
use crate::state::AppState;

/// One resource cell, flattened for output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContentSnapshot {
    Idle,
    Loading,
    Ready {
        data: serde_json::Value,
        refreshing: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        message: String,
    },
}

impl ContentSnapshot {
    pub fn from_view<T: Serialize>(view: ResourceView<'_, T>) -> Self {
        match view {
            ResourceView::Idle => ContentSnapshot::Idle,
            ResourceView::Spinner => ContentSnapshot::Loading,
            ResourceView::Content {
                value,
                refreshing,
                banner,
            } => ContentSnapshot::Ready {
                data: serde_json::to_value(value).unwrap_or_default(),
                refreshing,
                error: banner.map(str::to_string),
            },
            ResourceView::Error { message } => ContentSnapshot::Error {
                message: message.to_string(),
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            ContentSnapshot::Loading
                | ContentSnapshot::Ready {
                    refreshing: true,
                    ..
                }
        )
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        match self {
            ContentSnapshot::Ready { data, .. } => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSnapshot {
    pub kind: EntityKind,
    pub content: ContentSnapshot,
    pub deleting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSnapshot {
    pub kind: EntityKind,
    pub id: EntityId,
    pub content: ContentSnapshot,
    pub deleting: bool,
    /// Whether the entity has an edit form
    pub editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub kind: EntityKind,
    #[serde(flatten)]
    pub mode: FormMode,
    pub phase: FormPhase,
    pub page_title: String,
    pub submit_label: String,
    pub fields: Vec<FieldView>,
    pub valid: bool,
    pub submitting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch: Option<ContentSnapshot>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<&'static str, ContentSnapshot>,
}

impl FormSnapshot {
    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenSnapshot {
    List(ListSnapshot),
    Detail(DetailSnapshot),
    Form(FormSnapshot),
}

/// Everything an observer needs to render the console
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppSnapshot {
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenSnapshot>,
    /// Last rejected command or routing problem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub can_go_back: bool,
}

impl AppSnapshot {
    pub fn capture(state: &AppState) -> Self {
        Self {
            route: state.navigator.current().map(|r| r.to_string()),
            screen: state.screen().map(|s| s.controller().snapshot()),
            notice: state.notice.clone(),
            can_go_back: state.navigator.can_go_back(),
        }
    }

    pub fn list(&self) -> Option<&ListSnapshot> {
        match &self.screen {
            Some(ScreenSnapshot::List(list)) => Some(list),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&DetailSnapshot> {
        match &self.screen {
            Some(ScreenSnapshot::Detail(detail)) => Some(detail),
            _ => None,
        }
    }

    pub fn form(&self) -> Option<&FormSnapshot> {
        match &self.screen {
            Some(ScreenSnapshot::Form(form)) => Some(form),
            _ => None,
        }
    }
}
