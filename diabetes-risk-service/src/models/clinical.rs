//! Derived clinical values: body-mass index, its category, and the coarse
//! risk label attached to a predicted probability.

use serde::Serialize;

/// Probability at or above which risk is labelled [`RiskLevel::Alta`].
pub const RISK_THRESHOLD: f64 = 0.5;

/// Rounds to two decimal places, ties to the even digit (12.625 -> 12.62).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// BMI from weight in kilograms and height in centimetres, rounded to two
/// decimals. The rounded value is both the model input and the displayed
/// value.
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    round2(weight_kg / (height_m * height_m))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    #[serde(rename = "Bajo peso")]
    Underweight,
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Sobrepeso")]
    Overweight,
    #[serde(rename = "Obesidad")]
    Obese,
}

impl BmiCategory {
    /// Lower bounds are inclusive: 18.5 is `Normal`, 25 is `Overweight`,
    /// 30 is `Obese`.
    pub fn from_bmi(bmi: f64) -> Self {
        match bmi {
            b if b < 18.5 => BmiCategory::Underweight,
            b if b < 25.0 => BmiCategory::Normal,
            b if b < 30.0 => BmiCategory::Overweight,
            _ => BmiCategory::Obese,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Bajo peso",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Sobrepeso",
            BmiCategory::Obese => "Obesidad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Alta,
    Baja,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= RISK_THRESHOLD {
            RiskLevel::Alta
        } else {
            RiskLevel::Baja
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Alta => "Alta",
            RiskLevel::Baja => "Baja",
        }
    }
}
