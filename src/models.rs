use serde::{Deserialize, Serialize};

/// Columns the dataset file must carry, in source order.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    "ID",
    "Age",
    "Gender",
    "BMI",
    "Heart_Rate",
    "Blood_Pressure",
    "Hours_of_Sleep",
    "Exercise_Hours_per_Week",
    "Daily_Steps",
    "Alcohol_Consumption_per_Week",
    "Smoker",
    "Diabetic",
    "Calories_Intake",
    "Weight_kg",
];

/// One individual in the health dataset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthRecord {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: f64,
    // "systolic/diastolic", split on demand by the dataset
    #[serde(rename = "Blood_Pressure")]
    pub blood_pressure: String,
    #[serde(rename = "Hours_of_Sleep")]
    pub hours_of_sleep: f64,
    #[serde(rename = "Exercise_Hours_per_Week")]
    pub exercise_hours_per_week: f64,
    #[serde(rename = "Daily_Steps")]
    pub daily_steps: f64,
    #[serde(rename = "Alcohol_Consumption_per_Week")]
    pub alcohol_consumption_per_week: f64,
    #[serde(rename = "Smoker")]
    pub smoker: String,
    #[serde(rename = "Diabetic")]
    pub diabetic: String,
    #[serde(rename = "Calories_Intake")]
    pub calories_intake: f64,
    #[serde(rename = "Weight_kg")]
    pub weight_kg: f64,
}

impl HealthRecord {
    pub fn is_smoker(&self) -> bool {
        is_affirmative(&self.smoker)
    }

    pub fn is_diabetic(&self) -> bool {
        is_affirmative(&self.diabetic)
    }
}

fn is_affirmative(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("true") || value == "1"
}

/// Numeric columns, including the two derived from `Blood_Pressure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Age,
    Bmi,
    HeartRate,
    HoursOfSleep,
    ExerciseHoursPerWeek,
    DailySteps,
    AlcoholConsumptionPerWeek,
    CaloriesIntake,
    WeightKg,
    Systolic,
    Diastolic,
}

impl NumericField {
    pub const COUNT: usize = 11;

    /// Numeric columns present in the source file.
    pub const SOURCE: [NumericField; 9] = [
        NumericField::Age,
        NumericField::Bmi,
        NumericField::HeartRate,
        NumericField::HoursOfSleep,
        NumericField::ExerciseHoursPerWeek,
        NumericField::DailySteps,
        NumericField::AlcoholConsumptionPerWeek,
        NumericField::CaloriesIntake,
        NumericField::WeightKg,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::Age => "Age",
            NumericField::Bmi => "BMI",
            NumericField::HeartRate => "Heart_Rate",
            NumericField::HoursOfSleep => "Hours_of_Sleep",
            NumericField::ExerciseHoursPerWeek => "Exercise_Hours_per_Week",
            NumericField::DailySteps => "Daily_Steps",
            NumericField::AlcoholConsumptionPerWeek => "Alcohol_Consumption_per_Week",
            NumericField::CaloriesIntake => "Calories_Intake",
            NumericField::WeightKg => "Weight_kg",
            NumericField::Systolic => "Systolic",
            NumericField::Diastolic => "Diastolic",
        }
    }

    /// Axis-friendly label.
    pub fn label(self) -> &'static str {
        match self {
            NumericField::Age => "Age",
            NumericField::Bmi => "BMI",
            NumericField::HeartRate => "Heart Rate",
            NumericField::HoursOfSleep => "Hours of Sleep",
            NumericField::ExerciseHoursPerWeek => "Exercise (h/week)",
            NumericField::DailySteps => "Daily Steps",
            NumericField::AlcoholConsumptionPerWeek => "Alcohol (per Week)",
            NumericField::CaloriesIntake => "Calories Intake",
            NumericField::WeightKg => "Weight (kg)",
            NumericField::Systolic => "Systolic",
            NumericField::Diastolic => "Diastolic",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn source_value(self, record: &HealthRecord) -> Option<f64> {
        match self {
            NumericField::Age => Some(record.age),
            NumericField::Bmi => Some(record.bmi),
            NumericField::HeartRate => Some(record.heart_rate),
            NumericField::HoursOfSleep => Some(record.hours_of_sleep),
            NumericField::ExerciseHoursPerWeek => Some(record.exercise_hours_per_week),
            NumericField::DailySteps => Some(record.daily_steps),
            NumericField::AlcoholConsumptionPerWeek => Some(record.alcohol_consumption_per_week),
            NumericField::CaloriesIntake => Some(record.calories_intake),
            NumericField::WeightKg => Some(record.weight_kg),
            NumericField::Systolic | NumericField::Diastolic => None,
        }
    }
}

/// Categorical columns, raw or derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Gender,
    Smoker,
    Diabetic,
    BmiCategory,
    AgeGroup,
    RiskLevel,
}

impl CategoricalField {
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Gender => "Gender",
            CategoricalField::Smoker => "Smoker",
            CategoricalField::Diabetic => "Diabetic",
            CategoricalField::BmiCategory => "BMI_Category",
            CategoricalField::AgeGroup => "Age_Group",
            CategoricalField::RiskLevel => "Risk_Level",
        }
    }
}
