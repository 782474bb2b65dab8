//! Plan computation
//!
//! The host computes plans from schema-declared behavior; providers only
//! declare it. [`plan_resource_change`] reproduces that computation so a
//! resource's replace-vs-update contract can be exercised directly:
//! computed attributes become unknown, validators run against the
//! configuration, and each attribute's plan modifiers decide whether the
//! change forces replacement.

use crate::plan_modifier::{values_equal, PlanModifyRequest};
use crate::schema::Schema;
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// What the host would do with a resource given its prior state and the
/// declared configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanAction {
    NoOp,
    Create,
    Update,
    /// Destroy then create: at least one replace-on-change attribute
    /// differs between state and plan.
    Replace,
    Delete,
}

#[derive(Debug)]
pub struct PlannedChange {
    pub action: PlanAction,
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Computes the planned state for one resource.
///
/// `prior_state` is null for a resource that does not exist yet; a null
/// `config` plans a delete. Every attribute declared in the schema gets an
/// explicit entry in the planned state: absent optionals stay null rather
/// than empty, and computed attributes without a configured value carry
/// their prior value, or are marked unknown on create.
pub fn plan_resource_change(
    schema: &Schema,
    prior_state: &DynamicValue,
    config: &DynamicValue,
) -> PlannedChange {
    if config.is_null() {
        return PlannedChange {
            action: if prior_state.is_null() {
                PlanAction::NoOp
            } else {
                PlanAction::Delete
            },
            planned_state: DynamicValue::null(),
            requires_replace: Vec::new(),
            diagnostics: Vec::new(),
        };
    }

    let creating = prior_state.is_null();
    let mut planned_state = DynamicValue::empty_object();
    let mut requires_replace = Vec::new();
    let mut diagnostics = Vec::new();

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let config_value = config.get(&path);
        let state_value = prior_state.get(&path);

        for validator in &attr.validators {
            validator.validate(&config_value, &path, &mut diagnostics);
        }

        // Proposed value: configuration wins. A computed attribute with no
        // configured value carries its prior value, or stays unknown until
        // the server fills it in on create.
        let mut plan_value = match &config_value {
            Dynamic::Null if attr.computed => match &state_value {
                Dynamic::Null | Dynamic::Unknown => Dynamic::Unknown,
                known => known.clone(),
            },
            other => other.clone(),
        };

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifyRequest {
                state: state_value.clone(),
                config: config_value.clone(),
                plan: plan_value.clone(),
                attribute_path: attr.name.clone(),
            });

            plan_value = response.plan_value;
            if response.requires_replace {
                requires_replace.push(path.clone());
            }
            diagnostics.extend(response.diagnostics);
        }

        // set_value is infallible for single-step paths on an object root
        let _ = planned_state.set_value(&path, plan_value);
    }

    let action = if creating {
        PlanAction::Create
    } else if !requires_replace.is_empty() {
        PlanAction::Replace
    } else if values_equal(&planned_state.value, &prior_state.value) {
        PlanAction::NoOp
    } else {
        PlanAction::Update
    };

    PlannedChange {
        action,
        planned_state,
        requires_replace,
        diagnostics,
    }
}
