//! 订单状态机定义
//!
//! The graph is plain data: a set of status ids (places) and named
//! transitions, each with a source set, a target and an ordered handler
//! list. It loads from JSON or falls back to the built-in graph below.
//!
//! ```text
//!            pay           packing
//!   NEW ──────────▶ PAID ──────────▶ IN_PROGRESS
//!    │  ╲            │                  │
//!    │   ╲ ship      │ ship             │ ship
//!    │    ╲          ▼                  ▼
//!    │     ╰──▶  DELIVERED ◀──────────────
//!    │            │    ▲
//!    │     return │    │ cancel_return
//!    │            ▼    │
//!    │          RETURNED
//!    │
//!    ╰── cancel (NEW | PAID | IN_PROGRESS) ──▶ CANCEL ── back_to_in_progress ──▶ IN_PROGRESS
//! ```

use serde::{Deserialize, Serialize};
use shared::models::OrderStatus;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Side effect bound to a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    UpdatePaymentDate,
    CommitStock,
    RollbackStock,
    CommitUsePoint,
    RollbackUsePoint,
    CommitAddPoint,
    RollbackAddPoint,
}

impl HandlerKind {
    pub fn name(&self) -> &'static str {
        match self {
            HandlerKind::UpdatePaymentDate => "update_payment_date",
            HandlerKind::CommitStock => "commit_stock",
            HandlerKind::RollbackStock => "rollback_stock",
            HandlerKind::CommitUsePoint => "commit_use_point",
            HandlerKind::RollbackUsePoint => "rollback_use_point",
            HandlerKind::CommitAddPoint => "commit_add_point",
            HandlerKind::RollbackAddPoint => "rollback_add_point",
        }
    }
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub name: String,
    pub from: BTreeSet<i64>,
    pub to: i64,
    /// Run in declaration order
    #[serde(default)]
    pub handlers: Vec<HandlerKind>,
}

impl Transition {
    pub fn new(
        name: impl Into<String>,
        from: impl IntoIterator<Item = i64>,
        to: i64,
        handlers: impl IntoIterator<Item = HandlerKind>,
    ) -> Self {
        Self {
            name: name.into(),
            from: from.into_iter().collect(),
            to,
            handlers: handlers.into_iter().collect(),
        }
    }

    pub fn is_enabled_from(&self, status_id: i64) -> bool {
        self.from.contains(&status_id)
    }
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Failed to read workflow definition {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid workflow definition JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate transition name: {0}")]
    DuplicateName(String),

    #[error("Transition {transition} references unknown status {status}")]
    UnknownPlace { transition: String, status: i64 },

    #[error("Transition {0} has no source status")]
    EmptySource(String),

    #[error("Transitions {first} and {second} both lead from status {from} to {to}")]
    Ambiguous {
        first: String,
        second: String,
        from: i64,
        to: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub places: BTreeSet<i64>,
    pub transitions: Vec<Transition>,
}

impl Default for WorkflowDefinition {
    fn default() -> Self {
        use HandlerKind::*;

        let places = OrderStatus::defaults().into_iter().map(|s| s.id).collect();
        let transitions = vec![
            Transition::new(
                "pay",
                [OrderStatus::NEW],
                OrderStatus::PAID,
                [UpdatePaymentDate],
            ),
            Transition::new(
                "packing",
                [OrderStatus::NEW, OrderStatus::PAID],
                OrderStatus::IN_PROGRESS,
                [],
            ),
            Transition::new(
                "cancel",
                [OrderStatus::NEW, OrderStatus::IN_PROGRESS, OrderStatus::PAID],
                OrderStatus::CANCEL,
                [RollbackStock, RollbackUsePoint],
            ),
            Transition::new(
                "back_to_in_progress",
                [OrderStatus::CANCEL],
                OrderStatus::IN_PROGRESS,
                [CommitStock, CommitUsePoint],
            ),
            Transition::new(
                "ship",
                [OrderStatus::NEW, OrderStatus::PAID, OrderStatus::IN_PROGRESS],
                OrderStatus::DELIVERED,
                [CommitAddPoint],
            ),
            Transition::new(
                "return",
                [OrderStatus::DELIVERED],
                OrderStatus::RETURNED,
                [RollbackUsePoint, RollbackAddPoint],
            ),
            Transition::new(
                "cancel_return",
                [OrderStatus::RETURNED],
                OrderStatus::DELIVERED,
                [CommitUsePoint, CommitAddPoint],
            ),
        ];

        Self {
            places,
            transitions,
        }
    }
}

impl WorkflowDefinition {
    /// Read and validate a JSON definition file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let definition = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            transitions = definition.transitions.len(),
            "Workflow definition loaded"
        );
        Ok(definition)
    }

    pub fn from_json(content: &str) -> Result<Self, DefinitionError> {
        let definition: Self = serde_json::from_str(content)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn validate(&self) -> Result<(), DefinitionError> {
        let mut names = HashSet::new();
        // (from, to) -> transition name
        let mut edges: HashMap<(i64, i64), &str> = HashMap::new();

        for transition in &self.transitions {
            if !names.insert(transition.name.as_str()) {
                return Err(DefinitionError::DuplicateName(transition.name.clone()));
            }
            if transition.from.is_empty() {
                return Err(DefinitionError::EmptySource(transition.name.clone()));
            }

            for status in transition.from.iter().chain(std::iter::once(&transition.to)) {
                if !self.places.contains(status) {
                    return Err(DefinitionError::UnknownPlace {
                        transition: transition.name.clone(),
                        status: *status,
                    });
                }
            }

            for from in &transition.from {
                if let Some(first) = edges.insert((*from, transition.to), &transition.name) {
                    return Err(DefinitionError::Ambiguous {
                        first: first.to_string(),
                        second: transition.name.clone(),
                        from: *from,
                        to: transition.to,
                    });
                }
            }
        }
        Ok(())
    }

    /// Transitions whose source set contains `status_id`
    pub fn transitions_from(&self, status_id: i64) -> impl Iterator<Item = &Transition> {
        self.transitions
            .iter()
            .filter(move |t| t.is_enabled_from(status_id))
    }

    pub fn transition(&self, name: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_graph_is_valid() {
        let definition = WorkflowDefinition::default();
        definition.validate().unwrap();
        assert_eq!(definition.transitions.len(), 7);

        let cancel = definition.transition("cancel").unwrap();
        assert_eq!(
            cancel.handlers,
            vec![HandlerKind::RollbackStock, HandlerKind::RollbackUsePoint]
        );
        assert!(definition.transition("packing").unwrap().handlers.is_empty());
    }

    #[test]
    fn test_transitions_from_paid() {
        let definition = WorkflowDefinition::default();
        let mut names: Vec<_> = definition
            .transitions_from(OrderStatus::PAID)
            .map(|t| t.name.as_str())
            .collect();
        names.sort();
        assert_eq!(names, vec!["cancel", "packing", "ship"]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "places": [1, 6],
            "transitions": [
                {"name": "pay", "from": [1], "to": 6, "handlers": ["update_payment_date"]}
            ]
        }"#;
        let definition = WorkflowDefinition::from_json(json).unwrap();
        assert_eq!(
            definition.transitions[0].handlers,
            vec![HandlerKind::UpdatePaymentDate]
        );
    }

    #[test]
    fn test_unknown_handler_name_rejected() {
        let json = r#"{
            "places": [1, 6],
            "transitions": [{"name": "pay", "from": [1], "to": 6, "handlers": ["send_mail"]}]
        }"#;
        assert!(matches!(
            WorkflowDefinition::from_json(json),
            Err(DefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut definition = WorkflowDefinition::default();
        definition
            .transitions
            .push(Transition::new("pay", [OrderStatus::PENDING], OrderStatus::PAID, []));
        assert!(matches!(
            definition.validate(),
            Err(DefinitionError::DuplicateName(name)) if name == "pay"
        ));
    }

    #[test]
    fn test_unknown_place_rejected() {
        let mut definition = WorkflowDefinition::default();
        definition
            .transitions
            .push(Transition::new("archive", [OrderStatus::DELIVERED], 42, []));
        assert!(matches!(
            definition.validate(),
            Err(DefinitionError::UnknownPlace { status: 42, .. })
        ));
    }

    #[test]
    fn test_empty_source_rejected() {
        let mut definition = WorkflowDefinition::default();
        definition
            .transitions
            .push(Transition::new("hold", [], OrderStatus::PENDING, []));
        assert!(matches!(
            definition.validate(),
            Err(DefinitionError::EmptySource(_))
        ));
    }

    #[test]
    fn test_ambiguous_edge_rejected() {
        let mut definition = WorkflowDefinition::default();
        definition.transitions.push(Transition::new(
            "express_ship",
            [OrderStatus::PAID],
            OrderStatus::DELIVERED,
            [],
        ));
        assert!(matches!(
            definition.validate(),
            Err(DefinitionError::Ambiguous { from: 6, to: 5, .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&WorkflowDefinition::default()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = WorkflowDefinition::load(file.path()).unwrap();
        assert_eq!(loaded, WorkflowDefinition::default());

        assert!(matches!(
            WorkflowDefinition::load("/nonexistent/workflow.json"),
            Err(DefinitionError::Io { .. })
        ));
    }
}
