use serde_json::{json, Value};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn number(asset: &Value, key: &str) -> f64 {
    asset.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Portfolio analysis for finance-flavored simulations: weighted return,
/// weighted risk, and HHI concentration.
pub struct PortfolioPack;

impl PortfolioPack {
    pub fn analyze(portfolio: &[Value]) -> Value {
        if portfolio.is_empty() {
            return json!({ "error": "Empty portfolio" });
        }

        let total_value: f64 = portfolio.iter().map(|a| number(a, "value")).sum();
        if total_value == 0.0 {
            return json!({ "error": "Portfolio has zero value" });
        }

        // Weights are recomputed from actual values; any caller-provided
        // weight field is ignored.
        let weights: Vec<f64> = portfolio
            .iter()
            .map(|a| number(a, "value") / total_value)
            .collect();

        let weighted_return: f64 = portfolio
            .iter()
            .zip(&weights)
            .map(|(a, w)| w * number(a, "return_rate"))
            .sum();
        let weighted_risk: f64 = portfolio
            .iter()
            .zip(&weights)
            .map(|(a, w)| w * number(a, "risk"))
            .sum();

        let hhi: f64 = weights.iter().map(|w| w * w).sum();
        let diversification = if hhi < 0.2 {
            "well_diversified"
        } else if hhi < 0.5 {
            "moderately_concentrated"
        } else {
            "highly_concentrated"
        };

        let assets: Vec<Value> = portfolio
            .iter()
            .zip(&weights)
            .map(|(a, w)| {
                json!({
                    "name": a.get("name").and_then(Value::as_str).unwrap_or(""),
                    "value": number(a, "value"),
                    "weight": round1(w * 100.0),
                    "return": round2(number(a, "return_rate") * 100.0),
                })
            })
            .collect();

        json!({
            "total_value": round2(total_value),
            "asset_count": portfolio.len(),
            "weighted_return": round2(weighted_return * 100.0),
            "weighted_risk": round4(weighted_risk),
            "hhi_index": round4(hhi),
            "diversification": diversification,
            "assets": assets,
        })
    }
}
