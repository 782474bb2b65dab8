//! Plan modifiers
//!
//! Plan modifiers run per attribute during planning. They can rewrite the
//! planned value and mark the attribute as forcing replacement. The field
//! plan-behavior of every resource (replace-on-change, write-once
//! computed) is expressed entirely through these.

use crate::types::{Diagnostic, Dynamic};

#[derive(Debug, Clone)]
pub struct PlanModifyRequest {
    pub state: Dynamic,
    pub config: Dynamic,
    pub plan: Dynamic,
    pub attribute_path: String,
}

#[derive(Debug, Clone)]
pub struct PlanModifyResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanModifyResponse {
    fn passthrough(plan_value: Dynamic) -> Self {
        Self {
            plan_value,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

pub trait PlanModifier: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;

    fn modify(&self, request: PlanModifyRequest) -> PlanModifyResponse;
}

/// Forces destroy-and-recreate when the attribute's value changes.
///
/// No replacement is signalled while either side is unknown, or when the
/// resource does not exist yet (null prior state).
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "value change forces resource replacement".to_string()
    }

    fn modify(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let requires_replace = !matches!(
            (&request.state, &request.plan),
            (Dynamic::Null, _) | (Dynamic::Unknown, _) | (_, Dynamic::Unknown)
        ) && !values_equal(&request.state, &request.plan);

        PlanModifyResponse {
            plan_value: request.plan,
            requires_replace,
            diagnostics: Vec::new(),
        }
    }
}

/// Carries the prior state value forward when the planned value is
/// unknown. Used for server-computed write-once fields (key secrets,
/// creation timestamps) that never change after create.
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "unknown planned value is taken from state".to_string()
    }

    fn modify(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let plan_value = match &request.plan {
            Dynamic::Unknown => match &request.state {
                Dynamic::Null | Dynamic::Unknown => request.plan,
                known => known.clone(),
            },
            _ => request.plan,
        };

        PlanModifyResponse::passthrough(plan_value)
    }
}

/// Deep equality over [`Dynamic`] values. List order is significant and
/// two unknowns compare equal.
pub fn values_equal(a: &Dynamic, b: &Dynamic) -> bool {
    match (a, b) {
        (Dynamic::Null, Dynamic::Null) => true,
        (Dynamic::Unknown, Dynamic::Unknown) => true,
        (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
        (Dynamic::Number(a), Dynamic::Number(b)) => (a - b).abs() < f64::EPSILON,
        (Dynamic::String(a), Dynamic::String(b)) => a == b,
        (Dynamic::List(a), Dynamic::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Dynamic::Map(a), Dynamic::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|v2| values_equal(v, v2)))
        }
        _ => false,
    }
}
