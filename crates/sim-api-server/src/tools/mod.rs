//! Numeric utility tools exposed to simulations.

pub mod ab_test;
pub mod kpi;
pub mod portfolio;

use serde::Serialize;
use serde_json::{json, Value};

pub use ab_test::AbSimulator;
pub use kpi::KpiCalculator;
pub use portfolio::PortfolioPack;

use crate::utils::error::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Name-addressed tool execution over JSON arguments.
pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list() -> Vec<ToolInfo> {
        vec![
            ToolInfo {
                name: "kpi_calculator",
                description: "Compute business KPIs (revenue_growth, profit_margin, market_share, cac, ltv)",
            },
            ToolInfo {
                name: "ab_simulator",
                description: "Simulate an A/B test between two variants with conversion rates",
            },
            ToolInfo {
                name: "portfolio_pack",
                description: "Analyze a portfolio of assets: weighted return, risk, concentration",
            },
        ]
    }

    pub fn execute(tool_name: &str, arguments: &Value) -> Result<Value, ApiError> {
        match tool_name {
            "kpi_calculator" => {
                let kpi_name = arguments
                    .get("kpi_name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ApiError::InvalidTurn("kpi_calculator requires 'kpi_name'".to_string())
                    })?;
                let data = arguments.get("data").cloned().unwrap_or_else(|| json!({}));
                Ok(KpiCalculator::calculate(kpi_name, &data))
            }
            "ab_simulator" => {
                let variant_a = arguments.get("variant_a").cloned().unwrap_or_else(|| json!({}));
                let variant_b = arguments.get("variant_b").cloned().unwrap_or_else(|| json!({}));
                let sample_size = arguments
                    .get("sample_size")
                    .and_then(Value::as_u64)
                    .unwrap_or(1000) as usize;
                Ok(AbSimulator::simulate(&variant_a, &variant_b, sample_size))
            }
            "portfolio_pack" => {
                let portfolio = arguments
                    .get("portfolio")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                Ok(PortfolioPack::analyze(&portfolio))
            }
            other => Ok(json!({
                "error": format!("Unknown tool: {other}"),
                "available": Self::list().iter().map(|t| t.name).collect::<Vec<_>>(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_three_tools() {
        assert_eq!(ToolRegistry::list().len(), 3);
    }

    #[test]
    fn test_execute_kpi_tool() {
        let result = ToolRegistry::execute(
            "kpi_calculator",
            &json!({ "kpi_name": "profit_margin", "data": { "revenue": 100.0, "costs": 60.0 } }),
        )
        .unwrap();
        assert_eq!(result["value"], 40.0);
    }

    #[test]
    fn test_unknown_tool_reports_available_tools() {
        let result = ToolRegistry::execute("time_machine", &json!({})).unwrap();
        assert!(result["error"].as_str().unwrap().contains("time_machine"));
        assert_eq!(result["available"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_kpi_tool_requires_name() {
        let result = ToolRegistry::execute("kpi_calculator", &json!({}));
        assert!(matches!(result, Err(ApiError::InvalidTurn(_))));
    }
}
