use serde_json::{json, Value};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn number(data: &Value, key: &str) -> f64 {
    data.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Business KPI calculator.
pub struct KpiCalculator;

impl KpiCalculator {
    pub const SUPPORTED: &'static [&'static str] =
        &["revenue_growth", "profit_margin", "market_share", "cac", "ltv"];

    pub fn calculate(kpi_name: &str, data: &Value) -> Value {
        match kpi_name {
            "revenue_growth" => Self::revenue_growth(data),
            "profit_margin" => Self::profit_margin(data),
            "market_share" => Self::market_share(data),
            "cac" => Self::customer_acquisition_cost(data),
            "ltv" => Self::customer_lifetime_value(data),
            other => json!({
                "error": format!("Unknown KPI: {other}"),
                "available": Self::SUPPORTED,
            }),
        }
    }

    fn revenue_growth(data: &Value) -> Value {
        let current = number(data, "current_revenue");
        let previous = number(data, "previous_revenue");
        if previous == 0.0 {
            return json!({ "kpi": "revenue_growth", "value": null, "error": "Previous revenue is zero" });
        }
        let growth = ((current - previous) / previous) * 100.0;
        json!({ "kpi": "revenue_growth", "value": round2(growth), "unit": "%" })
    }

    fn profit_margin(data: &Value) -> Value {
        let revenue = number(data, "revenue");
        let costs = number(data, "costs");
        if revenue == 0.0 {
            return json!({ "kpi": "profit_margin", "value": null, "error": "Revenue is zero" });
        }
        let margin = ((revenue - costs) / revenue) * 100.0;
        json!({ "kpi": "profit_margin", "value": round2(margin), "unit": "%" })
    }

    fn market_share(data: &Value) -> Value {
        let company_revenue = number(data, "company_revenue");
        let total_market = number(data, "total_market");
        if total_market == 0.0 {
            return json!({ "kpi": "market_share", "value": null, "error": "Total market is zero" });
        }
        let share = (company_revenue / total_market) * 100.0;
        json!({ "kpi": "market_share", "value": round2(share), "unit": "%" })
    }

    fn customer_acquisition_cost(data: &Value) -> Value {
        let spend = number(data, "marketing_spend");
        let new_customers = number(data, "new_customers");
        if new_customers == 0.0 {
            return json!({ "kpi": "cac", "value": null, "error": "No new customers" });
        }
        json!({ "kpi": "cac", "value": round2(spend / new_customers), "unit": "currency" })
    }

    fn customer_lifetime_value(data: &Value) -> Value {
        let avg_purchase = number(data, "avg_purchase_value");
        let frequency = number(data, "purchase_frequency");
        let lifespan = number(data, "customer_lifespan_years");
        let ltv = avg_purchase * frequency * lifespan;
        json!({ "kpi": "ltv", "value": round2(ltv), "unit": "currency" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revenue_growth() {
        let result = KpiCalculator::calculate(
            "revenue_growth",
            &json!({ "current_revenue": 120.0, "previous_revenue": 100.0 }),
        );
        assert_eq!(result["value"], 20.0);
        assert_eq!(result["unit"], "%");
    }

    #[test]
    fn test_revenue_growth_zero_baseline() {
        let result =
            KpiCalculator::calculate("revenue_growth", &json!({ "current_revenue": 120.0 }));
        assert!(result["value"].is_null());
        assert!(result["error"].as_str().unwrap().contains("zero"));
    }

    #[test]
    fn test_profit_margin() {
        let result =
            KpiCalculator::calculate("profit_margin", &json!({ "revenue": 200.0, "costs": 150.0 }));
        assert_eq!(result["value"], 25.0);
    }

    #[test]
    fn test_ltv() {
        let result = KpiCalculator::calculate(
            "ltv",
            &json!({ "avg_purchase_value": 50.0, "purchase_frequency": 4.0, "customer_lifespan_years": 3.0 }),
        );
        assert_eq!(result["value"], 600.0);
    }

    #[test]
    fn test_unknown_kpi_lists_available() {
        let result = KpiCalculator::calculate("velocity", &json!({}));
        assert!(result["error"].as_str().unwrap().contains("velocity"));
        assert_eq!(result["available"].as_array().unwrap().len(), 5);
    }
}
