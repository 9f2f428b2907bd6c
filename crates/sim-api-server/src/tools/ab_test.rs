use rand::Rng;
use serde_json::{json, Value};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Monte-carlo A/B test simulator for use during business simulations.
pub struct AbSimulator;

impl AbSimulator {
    pub fn simulate(variant_a: &Value, variant_b: &Value, sample_size: usize) -> Value {
        let rate_a = variant_a.get("conversion_rate").and_then(Value::as_f64).unwrap_or(0.1);
        let rate_b = variant_b.get("conversion_rate").and_then(Value::as_f64).unwrap_or(0.1);
        let name_a = variant_a
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Variant A")
            .to_string();
        let name_b = variant_b
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Variant B")
            .to_string();

        let mut rng = rand::rng();
        let conversions_a = (0..sample_size).filter(|_| rng.random::<f64>() < rate_a).count();
        let conversions_b = (0..sample_size).filter(|_| rng.random::<f64>() < rate_b).count();

        let observed_rate_a = if sample_size > 0 {
            conversions_a as f64 / sample_size as f64
        } else {
            0.0
        };
        let observed_rate_b = if sample_size > 0 {
            conversions_b as f64 / sample_size as f64
        } else {
            0.0
        };

        let lift = if observed_rate_a > 0.0 {
            ((observed_rate_b - observed_rate_a) / observed_rate_a) * 100.0
        } else {
            0.0
        };

        let winner = if observed_rate_a > observed_rate_b {
            name_a.clone()
        } else {
            name_b.clone()
        };
        let significant = lift.abs() > 5.0;

        let recommendation = if significant {
            format!("{winner} is the winner with {:.1}% lift.", lift.abs())
        } else {
            "No statistically significant difference detected. Consider running longer.".to_string()
        };

        json!({
            "variant_a": {
                "name": name_a,
                "sample_size": sample_size,
                "conversions": conversions_a,
                "observed_rate": round4(observed_rate_a),
            },
            "variant_b": {
                "name": name_b,
                "sample_size": sample_size,
                "conversions": conversions_b,
                "observed_rate": round4(observed_rate_b),
            },
            "lift_percent": round2(lift),
            "is_significant": significant,
            "winner": winner,
            "recommendation": recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_winner_is_detected() {
        let result = AbSimulator::simulate(
            &json!({ "name": "Control", "conversion_rate": 0.05 }),
            &json!({ "name": "Treatment", "conversion_rate": 0.5 }),
            2000,
        );

        assert_eq!(result["winner"], "Treatment");
        assert_eq!(result["is_significant"], true);
        assert!(result["lift_percent"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_zero_sample_size() {
        let result = AbSimulator::simulate(
            &json!({ "conversion_rate": 0.1 }),
            &json!({ "conversion_rate": 0.1 }),
            0,
        );

        assert_eq!(result["variant_a"]["conversions"], 0);
        assert_eq!(result["lift_percent"], 0.0);
    }

    #[test]
    fn test_conversions_are_bounded_by_sample() {
        let result = AbSimulator::simulate(
            &json!({ "conversion_rate": 1.0 }),
            &json!({ "conversion_rate": 0.0 }),
            100,
        );

        assert_eq!(result["variant_a"]["conversions"], 100);
        assert_eq!(result["variant_b"]["conversions"], 0);
        assert_eq!(result["winner"], "Variant A");
    }
}
