use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::model::{Diagnostics, TestCategory};

use super::{
    Check, CheckContext, CheckError, CheckSchema, CheckVerdict, ParamSpec, Resolution, Result,
    get_string_list, reject_unknown_params,
};

/// Verifies that a set of named capabilities resolves in the registry the
/// suite is running against.
#[derive(Debug, Clone, Copy)]
pub struct WiringCheck;

impl Check for WiringCheck {
    fn name(&self) -> &'static str {
        "integration.wiring"
    }

    fn schema(&self) -> CheckSchema {
        CheckSchema {
            name: self.name().to_string(),
            description: "Resolve required capabilities by name, honoring fallbacks.".to_string(),
            category: TestCategory::Integration,
            params: vec![
                ParamSpec::optional(
                    "required",
                    "string[]",
                    "Capability names to resolve (default: every registered check).",
                ),
                ParamSpec::optional(
                    "fallbacks",
                    "object",
                    "Map from a required name to alternative names tried in order.",
                ),
            ],
        }
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckVerdict> {
        reject_unknown_params(ctx.params, &["required", "fallbacks"])?;
        let required = match get_string_list(ctx.params, "required")? {
            Some(names) => names,
            None => ctx
                .registry
                .names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        };
        let fallbacks = parse_fallbacks(ctx.params.get("fallbacks"))?;

        let mut resolved = Vec::new();
        let mut via_fallback = BTreeMap::new();
        let mut missing = Vec::new();
        for name in &required {
            let alternatives = fallbacks.get(name).map(Vec::as_slice).unwrap_or(&[]);
            match ctx.registry.resolve_with_fallback(name, alternatives) {
                Resolution::Found {
                    requested,
                    resolved: actual,
                    ..
                } => {
                    if requested != actual {
                        via_fallback.insert(requested.clone(), actual.to_string());
                    }
                    resolved.push(requested);
                }
                Resolution::Missing { .. } => missing.push(name.clone()),
            }
        }

        let mut diagnostics = Diagnostics::new();
        diagnostics.insert(
            "analysis".to_string(),
            json!({
                "resolved": resolved,
                "via_fallback": via_fallback,
                "missing": missing,
            }),
        );

        if missing.is_empty() {
            Ok(CheckVerdict::Passed(diagnostics))
        } else {
            Err(CheckError::FailedWithDiagnostics {
                message: format!("unresolved capabilities: {}", missing.join(", ")),
                diagnostics,
            })
        }
    }
}

fn parse_fallbacks(value: Option<&Value>) -> Result<BTreeMap<String, Vec<String>>> {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return Ok(BTreeMap::new());
    };
    let map = value.as_object().ok_or_else(|| {
        CheckError::InvalidParams("parameter `fallbacks` must be an object".to_string())
    })?;
    map.iter()
        .map(|(name, alternatives)| {
            let invalid = || {
                CheckError::InvalidParams(format!(
                    "fallbacks for `{name}` must be an array of strings"
                ))
            };
            let list = alternatives
                .as_array()
                .ok_or_else(invalid)?
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()?;
            Ok((name.clone(), list))
        })
        .collect()
}
