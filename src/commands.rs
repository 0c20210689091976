//! The three user-facing commands: pick a target, open it, and add the
//! current selection to it.
//!
//! Handlers are plain functions over a [`Host`], the [`SessionState`] and the
//! [`Config`]. Conditions that make a command inapplicable (no target, the
//! source is the target, nothing selected) are reported as
//! [`CommandOutcome`] variants rather than errors.

use anyhow::Result as AnyhowResult;
use serde::Serialize;

use crate::config::Config;
use crate::model::document::{AppliedEdit, TextDocument};
use crate::model::line_format::is_line_format;
use crate::model::merge::MergePlanner;
use crate::model::selection::{extract, ExtractMode, SelectionRange};
use crate::model::types::InsertionPlan;
use crate::services::host::Host;
use crate::session::SessionState;

/// Identifies a command for dispatch and enablement checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    UseAsTarget,
    OpenTarget,
    AddSelection,
}

impl CommandId {
    /// Get all commands
    pub fn all() -> &'static [Self] {
        &[
            CommandId::UseAsTarget,
            CommandId::OpenTarget,
            CommandId::AddSelection,
        ]
    }

    /// Stable command name, as registered with a host
    pub fn name(self) -> &'static str {
        match self {
            CommandId::UseAsTarget => "AddToSearch.use",
            CommandId::OpenTarget => "AddToSearch.open",
            CommandId::AddSelection => "AddToSearch.add",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CommandId::UseAsTarget => "Use the active search results as the target",
            CommandId::OpenTarget => "Open the target search results",
            CommandId::AddSelection => "Add the selected lines to the target search results",
        }
    }

    /// Whether the command applies in the current state.
    pub fn is_enabled(
        self,
        session: &SessionState,
        config: &Config,
        active: Option<&ActiveDocument<'_>>,
    ) -> bool {
        match self {
            CommandId::UseAsTarget => {
                active.is_some_and(|doc| is_line_format(doc.id, None, &config.extension))
            }
            CommandId::OpenTarget => session.target().is_some(),
            CommandId::AddSelection => {
                let Some(doc) = active else {
                    return false;
                };
                let Some(target) = session.target() else {
                    return false;
                };
                (doc.is_line_format(config) || !doc.id.is_empty()) && doc.id != target
            }
        }
    }
}

/// The document a command is invoked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDocument<'a> {
    /// Path-like identifier; also the file name written into headers
    pub id: &'a str,
    /// Host language id, if the host assigns one
    pub language_id: Option<&'a str>,
}

impl<'a> ActiveDocument<'a> {
    pub fn new(id: &'a str) -> Self {
        Self {
            id,
            language_id: None,
        }
    }

    pub fn with_language_id(mut self, language_id: &'a str) -> Self {
        self.language_id = Some(language_id);
        self
    }

    /// Whether this document is itself in the search-results format
    pub fn is_line_format(&self, config: &Config) -> bool {
        is_line_format(self.id, self.language_id, &config.extension)
    }
}

/// Parameters of an add-selection invocation
#[derive(Debug, Clone)]
pub struct AddRequest<'a> {
    pub source: ActiveDocument<'a>,
    pub selections: Vec<SelectionRange>,
    /// Force a mode instead of detecting it from the source
    pub mode: Option<ExtractMode>,
    /// Plan only, do not edit the target
    pub dry_run: bool,
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The current target was replaced
    TargetSet { target: String },
    /// The active document is not a search-results document
    NotLineFormat,
    /// No target is set
    NoTarget,
    /// The active document has no identifier and is not a search-results document
    NoSource,
    /// The active document is the target itself
    SourceIsTarget,
    /// The selection produced nothing to add
    NothingSelected,
    /// The target was opened
    Opened {
        target: String,
        #[serde(skip)]
        document: TextDocument,
    },
    /// Dry run: the plan that would have been applied
    Planned { target: String, plan: InsertionPlan },
    /// The plan was applied to the target
    Merged {
        target: String,
        inserted: usize,
        selection: Vec<usize>,
    },
}

/// Record the active document as the current target if it is a
/// search-results document.
pub fn use_as_target(
    session: &mut SessionState,
    config: &Config,
    active: &ActiveDocument<'_>,
) -> CommandOutcome {
    if !CommandId::UseAsTarget.is_enabled(session, config, Some(active)) {
        tracing::debug!("{} is not a search-results document", active.id);
        return CommandOutcome::NotLineFormat;
    }
    session.set_target(active.id);
    tracing::info!("Target set to {}", active.id);
    CommandOutcome::TargetSet {
        target: active.id.to_string(),
    }
}

/// Open the current target, if one is set.
pub fn open_target(host: &mut dyn Host, session: &SessionState) -> AnyhowResult<CommandOutcome> {
    let Some(target) = session.target() else {
        return Ok(CommandOutcome::NoTarget);
    };
    Ok(match host.open_document(target)? {
        Some(document) => CommandOutcome::Opened {
            target: target.to_string(),
            document,
        },
        None => CommandOutcome::NoTarget,
    })
}

/// Merge the selected lines of the source into the current target.
pub fn add_selection(
    host: &mut dyn Host,
    session: &SessionState,
    config: &Config,
    request: &AddRequest<'_>,
) -> AnyhowResult<CommandOutcome> {
    let source = &request.source;
    let Some(target) = session.target() else {
        return Ok(CommandOutcome::NoTarget);
    };
    if source.id == target {
        return Ok(CommandOutcome::SourceIsTarget);
    }
    if !CommandId::AddSelection.is_enabled(session, config, Some(source)) {
        return Ok(CommandOutcome::NoSource);
    }

    let mode = request.mode.unwrap_or(if source.is_line_format(config) {
        ExtractMode::Structured
    } else {
        ExtractMode::Flat
    });
    let source_doc = host.read_document(source.id)?;
    let aggregates = extract(source.id, source_doc.lines(), &request.selections, mode);
    if aggregates.is_empty() {
        tracing::debug!("Nothing selected in {}", source.id);
        return Ok(CommandOutcome::NothingSelected);
    }
    tracing::debug!(
        "Extracted {} aggregate(s) from {} in {:?} mode",
        aggregates.len(),
        source.id,
        mode
    );

    let Some(target_doc) = host.open_document(target)? else {
        return Ok(CommandOutcome::NoTarget);
    };
    let plan = MergePlanner::new(config.entry_format()).plan_all(target_doc.lines(), aggregates);

    if request.dry_run {
        return Ok(CommandOutcome::Planned {
            target: target.to_string(),
            plan,
        });
    }

    let AppliedEdit {
        inserted,
        selection,
    } = host.apply_insertions(target, &plan)?;
    if config.select_inserted && !selection.is_empty() {
        host.set_selection(target, &selection);
    }

    Ok(CommandOutcome::Merged {
        target: target.to_string(),
        inserted,
        selection,
    })
}
