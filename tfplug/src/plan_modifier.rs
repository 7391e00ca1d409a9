//! Built-in plan modifiers
//!
//! Plan modifiers run after Terraform has proposed a new state and can:
//! - Replace the planned value
//! - Mark an attribute as requiring replacement
//! - Add warnings or errors to the plan

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::types::Dynamic;

/// Marks an attribute as requiring replacement when it changes (ForceNew)
pub struct RequiresReplace;

impl RequiresReplace {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self)
    }
}

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "changing this value forces a new resource".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let state = &request.state_value.value;
        let plan = &request.plan_value.value;

        // Creation, destroy, and not-yet-known plans never force replacement.
        let requires_replace = !state.is_null()
            && plan.is_wholly_known()
            && state.is_wholly_known()
            && !values_equal(state, plan);

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: vec![],
        }
    }
}

/// Uses the prior state value when the planned value is unknown
///
/// Useful for computed attributes such as `arn` or `created_date` that never
/// change after creation.
pub struct UseStateForUnknown;

impl UseStateForUnknown {
    pub fn create() -> Box<dyn PlanModifier> {
        Box::new(Self)
    }
}

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "once set, the value of this attribute in state will not change".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let plan_value = if request.plan_value.is_unknown() && !request.state_value.is_null() {
            request.state_value
        } else {
            request.plan_value
        };

        PlanModifierResponse {
            plan_value,
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}

/// Structural equality that tolerates float noise in numbers
pub fn values_equal(a: &Dynamic, b: &Dynamic) -> bool {
    match (a, b) {
        (Dynamic::Null, Dynamic::Null) => true,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributePath, DynamicValue};

    fn request(state: Dynamic, plan: Dynamic) -> PlanModifierRequest {
        PlanModifierRequest {
            config_value: DynamicValue::new(plan.clone()),
            state_value: DynamicValue::new(state),
            plan_value: DynamicValue::new(plan),
            path: AttributePath::new("mesh_name"),
        }
    }

    fn string(s: &str) -> Dynamic {
        Dynamic::String(s.to_string())
    }

    #[test]
    fn requires_replace_does_not_trigger_on_same_value() {
        let response = RequiresReplace.modify(request(string("mesh"), string("mesh")));
        assert!(!response.requires_replace);
    }

    #[test]
    fn requires_replace_triggers_on_rename() {
        let response = RequiresReplace.modify(request(string("mesh-a"), string("mesh-b")));
        assert!(response.requires_replace);
        assert!(response.diagnostics.is_empty());
    }

    #[test]
    fn requires_replace_ignores_create_and_unknown() {
        assert!(
            !RequiresReplace
                .modify(request(Dynamic::Null, string("mesh")))
                .requires_replace
        );
        assert!(
            !RequiresReplace
                .modify(request(string("mesh"), Dynamic::Unknown))
                .requires_replace
        );
    }

    #[test]
    fn use_state_for_unknown_keeps_prior_value() {
        let arn = string("arn:aws:appmesh:us-west-2:123456789012:mesh/demo");
        let response = UseStateForUnknown.modify(request(arn.clone(), Dynamic::Unknown));
        assert_eq!(response.plan_value.value, arn);
    }

    #[test]
    fn use_state_for_unknown_leaves_unknown_on_create() {
        let response = UseStateForUnknown.modify(request(Dynamic::Null, Dynamic::Unknown));
        assert!(response.plan_value.is_unknown());
    }

    #[test]
    fn values_equal_compares_nested_maps() {
        let a = Dynamic::Map([("k".to_string(), Dynamic::Number(1.0))].into());
        let b = Dynamic::Map([("k".to_string(), Dynamic::Number(1.0))].into());
        let c = Dynamic::Map([("k".to_string(), Dynamic::Number(2.0))].into());
        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &c));
    }
}
