//! Plan modifiers and resource change planning
//!
//! `plan_resource_change` is what the gRPC layer runs for every
//! PlanResourceChange call before handing the plan to Terraform. When the
//! proposed state differs from the prior state, every computed attribute the
//! configuration leaves null becomes unknown, then attribute plan modifiers
//! get a chance to adjust the planned value.

use crate::schema::{Attribute, ObjectNestingMode, Schema};
use crate::types::{AttributePath, Diagnostic, Dynamic};

#[derive(Debug, Clone)]
pub struct PlanModifyRequest {
    pub state: Dynamic,
    pub plan: Dynamic,
    pub config: Dynamic,
    pub attribute_path: AttributePath,
}

#[derive(Debug, Clone)]
pub struct PlanModifyResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Trait for modifying terraform plan behavior
///
/// Plan modifiers run after the framework has generated a plan and can:
/// - Modify the planned value
/// - Mark an attribute as requiring replacement
/// - Add warnings or errors to the plan
pub trait PlanModifier: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Modify the plan for an attribute
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse;
}

/// Marks an attribute as requiring replacement when it changes
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "Changing this value forces a new resource".to_string()
    }

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        // Creation never replaces; unknowns are decided at apply time
        let requires_replace = !matches!(
            (&request.state, &request.plan),
            (Dynamic::Null, _) | (Dynamic::Unknown, _) | (_, Dynamic::Unknown)
        ) && !values_equal(&request.state, &request.plan);

        PlanModifyResponse {
            plan_value: request.plan,
            requires_replace,
            diagnostics: vec![],
        }
    }
}

/// A plan modifier that uses the current state value when the planned value is unknown
///
/// Use it for computed attributes that never change after creation, such as
/// server-assigned identifiers.
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "Once set, the value of this attribute in state will not change".to_string()
    }

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let plan_value = match (&request.plan, &request.state) {
            (Dynamic::Unknown, Dynamic::Null) | (Dynamic::Unknown, Dynamic::Unknown) => request.plan,
            (Dynamic::Unknown, state) => state.clone(),
            _ => request.plan,
        };

        PlanModifyResponse {
            plan_value,
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}

/// Outcome of planning a single resource change
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub planned_state: Dynamic,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compute the planned state for a resource from Terraform's proposal
pub fn plan_resource_change(
    schema: &Schema,
    prior_state: &Dynamic,
    proposed_new_state: &Dynamic,
    config: &Dynamic,
) -> PlannedChange {
    let mut planned_state = proposed_new_state.clone();
    let mut requires_replace = Vec::new();
    let mut diagnostics = Vec::new();

    // Destroy plans and no-op plans pass through untouched
    if proposed_new_state.is_null() || values_equal(prior_state, proposed_new_state) {
        return PlannedChange {
            planned_state,
            requires_replace,
            diagnostics,
        };
    }

    mark_computed_nulls_unknown(&schema.block.attributes, &mut planned_state, config);

    if let Dynamic::Map(planned) = &mut planned_state {
        for attr in &schema.block.attributes {
            if attr.plan_modifiers.is_empty() {
                continue;
            }

            let path = AttributePath::new(&attr.name);
            let state = object_field(prior_state, &attr.name).clone();
            let config_value = object_field(config, &attr.name).clone();
            let mut plan = planned.get(&attr.name).cloned().unwrap_or(Dynamic::Null);

            for modifier in &attr.plan_modifiers {
                let response = modifier.modify_plan(PlanModifyRequest {
                    state: state.clone(),
                    plan,
                    config: config_value.clone(),
                    attribute_path: path.clone(),
                });
                plan = response.plan_value;
                diagnostics.extend(response.diagnostics);
                if response.requires_replace && !requires_replace.contains(&path) {
                    requires_replace.push(path.clone());
                }
            }

            planned.insert(attr.name.clone(), plan);
        }
    }

    PlannedChange {
        planned_state,
        requires_replace,
        diagnostics,
    }
}

/// Mark every computed attribute that the configuration leaves null as
/// unknown, descending into nested attributes
pub fn mark_computed_nulls_unknown(attributes: &[Attribute], planned: &mut Dynamic, config: &Dynamic) {
    let Dynamic::Map(object) = planned else {
        return;
    };

    for attr in attributes {
        let config_value = object_field(config, &attr.name);

        if attr.computed && config_value.is_null() {
            object.insert(attr.name.clone(), Dynamic::Unknown);
            continue;
        }

        let (Some(nested), Some(value)) = (&attr.nested_type, object.get_mut(&attr.name)) else {
            continue;
        };

        match (nested.nesting, value) {
            (ObjectNestingMode::Single, value) => {
                mark_computed_nulls_unknown(&nested.attributes, value, config_value)
            }
            (ObjectNestingMode::List | ObjectNestingMode::Set, Dynamic::List(elements)) => {
                for (idx, element) in elements.iter_mut().enumerate() {
                    let element_config = match config_value {
                        Dynamic::List(configs) => configs.get(idx).unwrap_or(&Dynamic::Null),
                        _ => &Dynamic::Null,
                    };
                    mark_computed_nulls_unknown(&nested.attributes, element, element_config);
                }
            }
            (ObjectNestingMode::Map, Dynamic::Map(elements)) => {
                for (key, element) in elements.iter_mut() {
                    mark_computed_nulls_unknown(
                        &nested.attributes,
                        element,
                        object_field(config_value, key),
                    );
                }
            }
            _ => {}
        }
    }
}

fn object_field<'a>(value: &'a Dynamic, name: &str) -> &'a Dynamic {
    match value {
        Dynamic::Map(m) => m.get(name).unwrap_or(&Dynamic::Null),
        _ => &Dynamic::Null,
    }
}

/// Helper function to compare two Dynamic values for equality
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
