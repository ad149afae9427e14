//! Routes and navigation history

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use taskdeck_core::{EntityId, EntityKind};

/// A logical screen plus its parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    List(EntityKind),
    Detail(EntityKind, EntityId),
    New(EntityKind),
    Edit(EntityKind, EntityId),
}

impl Route {
    pub fn kind(&self) -> EntityKind {
        match self {
            Route::List(kind)
            | Route::Detail(kind, _)
            | Route::New(kind)
            | Route::Edit(kind, _) => *kind,
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        match self {
            Route::Detail(_, id) | Route::Edit(_, id) => Some(*id),
            Route::List(_) | Route::New(_) => None,
        }
    }

    /// Whether a form exists for this kind. Developers are read-only.
    pub fn has_form(kind: EntityKind) -> bool {
        !matches!(kind, EntityKind::Developer)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::List(kind) => write!(f, "/{}", kind.segment()),
            Route::Detail(kind, id) => write!(f, "/{}/{}", kind.segment(), id),
            Route::New(kind) => write!(f, "/{}/new", kind.segment()),
            Route::Edit(kind, id) => write!(f, "/{}/{}/edit", kind.segment(), id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteParseError {
    #[error("route is empty")]
    Empty,

    #[error("unknown section: {0}")]
    UnknownSection(String),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("no such screen: {0}")]
    Unsupported(String),
}

impl FromStr for Route {
    type Err = RouteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s
            .trim()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let Some((section, rest)) = segments.split_first() else {
            return Err(RouteParseError::Empty);
        };
        let kind = EntityKind::from_segment(section)
            .ok_or_else(|| RouteParseError::UnknownSection(section.to_string()))?;
        let parse_id = |raw: &str| {
            raw.parse::<EntityId>()
                .map_err(|_| RouteParseError::InvalidId(raw.to_string()))
        };

        let route = match rest {
            [] => Route::List(kind),
            ["new"] => Route::New(kind),
            [id] => Route::Detail(kind, parse_id(id)?),
            [id, "edit"] => Route::Edit(kind, parse_id(id)?),
            _ => return Err(RouteParseError::Unsupported(s.trim().to_string())),
        };

        match route {
            Route::New(kind) | Route::Edit(kind, _) if !Route::has_form(kind) => {
                Err(RouteParseError::Unsupported(s.trim().to_string()))
            }
            route => Ok(route),
        }
    }
}

/// Parameters of the current route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteParams {
    pub kind: EntityKind,
    pub id: Option<EntityId>,
}

/// Current route plus a back stack
#[derive(Debug, Default)]
pub struct Navigator {
    current: Option<Route>,
    history: Vec<Route>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `route`, pushing the current route onto the back stack
    pub fn navigate(&mut self, route: Route) {
        info!("Navigating to {}", route);
        if let Some(previous) = self.current.replace(route) {
            if previous != route {
                self.history.push(previous);
            }
        }
    }

    /// Return to the previous route, if any
    pub fn back(&mut self) -> Option<Route> {
        let previous = self.history.pop()?;
        info!("Navigating back to {}", previous);
        self.current = Some(previous);
        Some(previous)
    }

    pub fn current(&self) -> Option<Route> {
        self.current
    }

    pub fn current_params(&self) -> Option<RouteParams> {
        self.current.map(|route| RouteParams {
            kind: route.kind(),
            id: route.id(),
        })
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }
}
