use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const BASE_COLUMNS: [&str; 15] = [
    "GenHlth",
    "MentHlth",
    "HighBP",
    "DiffWalk",
    "BMI",
    "HighChol",
    "Age",
    "HeartDiseaseorAttack",
    "PhysHlth",
    "Stroke",
    "PhysActivity",
    "HvyAlcoholConsump",
    "CholCheck",
    "Income",
    "Smoker",
];

const EXTENDED_COLUMNS: [&str; 16] = [
    "GenHlth",
    "MentHlth",
    "HighBP",
    "DiffWalk",
    "BMI",
    "HighChol",
    "Age",
    "HeartDiseaseorAttack",
    "PhysHlth",
    "Stroke",
    "PhysActivity",
    "HvyAlcoholConsump",
    "CholCheck",
    "Education",
    "Income",
    "Smoker",
];

/// Request/response shape served on `/predict`.
///
/// - `V1`: BMI supplied directly; responds with `prediction` and `score`.
/// - `V2`: weight and height supplied, BMI derived; adds `imc`,
///   `categoria_imc` and `riesgo_diabetes`.
/// - `V3`: like `V2` with `Education` and wider `Age`/`Income` ranges; no
///   `categoria_imc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaRevision {
    V1,
    V2,
    V3,
}

impl SchemaRevision {
    /// Columns the model for this revision must consume, no more, no less.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            SchemaRevision::V1 | SchemaRevision::V2 => &BASE_COLUMNS,
            SchemaRevision::V3 => &EXTENDED_COLUMNS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaRevision::V1 => "v1",
            SchemaRevision::V2 => "v2",
            SchemaRevision::V3 => "v3",
        }
    }
}

impl fmt::Display for SchemaRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaRevision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" => Ok(SchemaRevision::V1),
            "v2" | "2" => Ok(SchemaRevision::V2),
            "v3" | "3" => Ok(SchemaRevision::V3),
            _ => Err(format!("Invalid schema revision: {}", s)),
        }
    }
}
