//! Resource scopes and scope resolvers
//!
//! A role's reach is expressed as allow-lists over the four resource fields
//! of a project (channel, platform, editor, client) plus a *visibility basis*
//! naming which of those fields decides whether a project is visible at all.
//!
//! [`ScopeResolver`] turns a scope into a predicate over projects. There is
//! one resolver per basis plus [`Unrestricted`] for administrator-equivalent
//! identities.

use crate::error::ScopeViolation;
use cutboard_model::Project;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Values a scope admits for one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowList {
    /// Every value
    #[default]
    Any,
    /// Only the listed values (exact match)
    Only(BTreeSet<String>),
}

impl AllowList {
    /// Allow-list of explicit values
    #[must_use]
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(values.into_iter().map(Into::into).collect())
    }

    /// Whether `value` is admitted
    #[must_use]
    pub fn permits(&self, value: &str) -> bool {
        match self {
            AllowList::Any => true,
            AllowList::Only(values) => values.contains(value),
        }
    }

    /// Whether `value` is admitted, ignoring ASCII case
    #[must_use]
    pub fn permits_ignore_case(&self, value: &str) -> bool {
        match self {
            AllowList::Any => true,
            AllowList::Only(values) => values.iter().any(|v| v.eq_ignore_ascii_case(value)),
        }
    }

    /// Values admitted by both lists
    #[must_use]
    pub fn intersect(&self, other: &AllowList) -> AllowList {
        match (self, other) {
            (AllowList::Any, other) => other.clone(),
            (this, AllowList::Any) => this.clone(),
            (AllowList::Only(a), AllowList::Only(b)) => {
                AllowList::Only(a.intersection(b).cloned().collect())
            }
        }
    }

    /// Whether the list admits nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, AllowList::Only(values) if values.is_empty())
    }

    /// Explicit values, or `None` for [`AllowList::Any`]
    #[must_use]
    pub fn values(&self) -> Option<&BTreeSet<String>> {
        match self {
            AllowList::Any => None,
            AllowList::Only(values) => Some(values),
        }
    }
}

impl std::fmt::Display for AllowList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllowList::Any => f.write_str("any"),
            AllowList::Only(values) => {
                let values: Vec<_> = values.iter().map(String::as_str).collect();
                f.write_str(&values.join(", "))
            }
        }
    }
}

/// Project field that gates visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeBasis {
    /// Visible when the project's channel is allowed
    #[default]
    Channel,
    /// Visible when the project's editor is allowed (self-assigned work)
    Editor,
    /// Visible when the project's client is allowed
    Client,
}

/// Resource reach of a role or identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceScope {
    /// Field deciding visibility
    pub basis: ScopeBasis,
    /// Allowed channels
    pub channels: AllowList,
    /// Allowed platforms
    pub platforms: AllowList,
    /// Allowed editors
    pub editors: AllowList,
    /// Allowed clients
    pub clients: AllowList,
}

impl ResourceScope {
    /// Scope admitting everything
    #[inline]
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Channel-based scope over the given channels
    #[must_use]
    pub fn channels<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: AllowList::only(channels),
            ..Self::default()
        }
    }

    /// With allowed platforms
    #[must_use]
    pub fn with_platforms(mut self, platforms: AllowList) -> Self {
        self.platforms = platforms;
        self
    }

    /// With allowed editors
    #[must_use]
    pub fn with_editors(mut self, editors: AllowList) -> Self {
        self.editors = editors;
        self
    }

    /// With allowed clients
    #[must_use]
    pub fn with_clients(mut self, clients: AllowList) -> Self {
        self.clients = clients;
        self
    }

    /// With a visibility basis
    #[must_use]
    pub fn with_basis(mut self, basis: ScopeBasis) -> Self {
        self.basis = basis;
        self
    }

    /// Apply a per-user narrowing
    ///
    /// Each allow-list is intersected with the narrowing's; the narrowing's
    /// basis, if any, replaces the role's.
    #[must_use]
    pub fn narrowed(&self, narrowing: &ScopeNarrowing) -> Self {
        Self {
            basis: narrowing.basis.unwrap_or(self.basis),
            channels: self.channels.intersect(&narrowing.scope.channels),
            platforms: self.platforms.intersect(&narrowing.scope.platforms),
            editors: self.editors.intersect(&narrowing.scope.editors),
            clients: self.clients.intersect(&narrowing.scope.clients),
        }
    }

    /// Resolver for this scope
    #[must_use]
    pub fn resolver(&self) -> Box<dyn ScopeResolver> {
        match self.basis {
            ScopeBasis::Channel => Box::new(ChannelScope {
                allowed: self.channels.clone(),
            }),
            ScopeBasis::Editor => Box::new(EditorScope {
                allowed: self.editors.clone(),
            }),
            ScopeBasis::Client => Box::new(ClientScope {
                allowed: self.clients.clone(),
            }),
        }
    }

    /// Check values about to be written to a project
    ///
    /// Empty values are always accepted.
    ///
    /// # Errors
    /// Returns the first field whose value falls outside the scope.
    pub fn check_assignment(
        &self,
        channel: &str,
        platform: &str,
        editor: &str,
    ) -> Result<(), ScopeViolation> {
        let checks = [
            ("channel", channel, &self.channels),
            ("platform", platform, &self.platforms),
            ("editor", editor, &self.editors),
        ];
        for (field, value, allowed) in checks {
            if !value.is_empty() && !allowed.permits(value) {
                return Err(ScopeViolation::new(field, value));
            }
        }
        Ok(())
    }
}

/// Per-user narrowing of a role's scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeNarrowing {
    /// Replacement visibility basis
    pub basis: Option<ScopeBasis>,
    /// Allow-lists intersected with the role's
    pub scope: ResourceScope,
}

impl ScopeNarrowing {
    /// Narrow to a single client, made the visibility basis
    #[must_use]
    pub fn client(name: impl Into<String>) -> Self {
        Self {
            basis: Some(ScopeBasis::Client),
            scope: ResourceScope::unrestricted().with_clients(AllowList::only([name.into()])),
        }
    }

    /// Narrow to a subset of editors, made the visibility basis
    #[must_use]
    pub fn editors<I, S>(editors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            basis: Some(ScopeBasis::Editor),
            scope: ResourceScope::unrestricted().with_editors(AllowList::only(editors)),
        }
    }
}

/// Predicate over projects derived from an identity's scope
pub trait ScopeResolver: Send + Sync + std::fmt::Debug {
    /// Whether the project lies within scope
    fn admits(&self, project: &Project) -> bool;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Admits every project
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl ScopeResolver for Unrestricted {
    fn admits(&self, _project: &Project) -> bool {
        true
    }

    fn describe(&self) -> String {
        "all projects".to_string()
    }
}

/// Admits projects on allowed channels; projects without a channel are out
#[derive(Debug, Clone)]
pub struct ChannelScope {
    allowed: AllowList,
}

impl ScopeResolver for ChannelScope {
    fn admits(&self, project: &Project) -> bool {
        !project.channel.is_empty() && self.allowed.permits(&project.channel)
    }

    fn describe(&self) -> String {
        format!("channels: {}", self.allowed)
    }
}

/// Admits projects assigned to allowed editors
#[derive(Debug, Clone)]
pub struct EditorScope {
    allowed: AllowList,
}

impl ScopeResolver for EditorScope {
    fn admits(&self, project: &Project) -> bool {
        !project.editor.is_empty() && self.allowed.permits(&project.editor)
    }

    fn describe(&self) -> String {
        format!("editors: {}", self.allowed)
    }
}

/// Admits projects for allowed clients, ignoring case
#[derive(Debug, Clone)]
pub struct ClientScope {
    allowed: AllowList,
}

impl ScopeResolver for ClientScope {
    fn admits(&self, project: &Project) -> bool {
        !project.client.is_empty() && self.allowed.permits_ignore_case(&project.client)
    }

    fn describe(&self) -> String {
        format!("clients: {}", self.allowed)
    }
}
