//! Row-level rules behind the derived columns.

use std::fmt;

use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::error::{Result, VizError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub const ALL: [BmiCategory; 4] = [
        BmiCategory::Underweight,
        BmiCategory::Normal,
        BmiCategory::Overweight,
        BmiCategory::Obese,
    ];

    /// Half-open buckets; the lower bound belongs to the bucket.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeGroup {
    Under30,
    From30To50,
    From50To70,
    Over70,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Under30,
        AgeGroup::From30To50,
        AgeGroup::From50To70,
        AgeGroup::Over70,
    ];

    pub fn from_age(age: f64) -> Self {
        if age < 30.0 {
            AgeGroup::Under30
        } else if age < 50.0 {
            AgeGroup::From30To50
        } else if age < 70.0 {
            AgeGroup::From50To70
        } else {
            AgeGroup::Over70
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Under30 => "<30",
            AgeGroup::From30To50 => "30-50",
            AgeGroup::From50To70 => "50-70",
            AgeGroup::Over70 => "70+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of risk factors present, bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High];

    pub const OBESE_BMI: f64 = 30.0;
    pub const HYPERTENSIVE_SYSTOLIC: i32 = 140;

    pub fn from_factors(smoker: bool, diabetic: bool, bmi: f64, systolic: i32) -> Self {
        let count = [
            smoker,
            diabetic,
            bmi >= Self::OBESE_BMI,
            systolic >= Self::HYPERTENSIVE_SYSTOLIC,
        ]
        .iter()
        .filter(|present| **present)
        .count();
        match count {
            0 => RiskLevel::Low,
            1 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Splits a `"120/80"` reading into (systolic, diastolic).
pub fn parse_blood_pressure(row: usize, value: &str) -> Result<(i32, i32)> {
    let parse_error = |reason: String| VizError::Parse {
        row,
        value: value.to_string(),
        reason,
    };

    let (systolic, diastolic) = value
        .split_once('/')
        .ok_or_else(|| parse_error("missing '/' separator".to_string()))?;
    let systolic = systolic
        .trim()
        .parse::<i32>()
        .map_err(|e| parse_error(format!("systolic part: {}", e)))?;
    let diastolic = diastolic
        .trim()
        .parse::<i32>()
        .map_err(|e| parse_error(format!("diastolic part: {}", e)))?;
    Ok((systolic, diastolic))
}

/// Min-max scales a column into [0, 1].
pub fn min_max_scale(column: &str, values: &Array1<f64>) -> Result<Array1<f64>> {
    let min = *values
        .min()
        .map_err(|_| VizError::EmptyColumn(column.to_string()))?;
    let max = *values
        .max()
        .map_err(|_| VizError::EmptyColumn(column.to_string()))?;
    let range = max - min;
    if range == 0.0 {
        return Err(VizError::DegenerateRange(column.to_string()));
    }
    Ok(values.mapv(|x| (x - min) / range))
}
