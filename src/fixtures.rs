use crate::dataset::Dataset;
use crate::models::HealthRecord;

pub(crate) const CSV_HEADER: &str = "ID,Age,Gender,BMI,Heart_Rate,Blood_Pressure,Hours_of_Sleep,\
Exercise_Hours_per_Week,Daily_Steps,Alcohol_Consumption_per_Week,Smoker,Diabetic,Calories_Intake,Weight_kg";

/// Deterministic row whose fields all vary with `id`.
pub(crate) fn record(id: u32) -> HealthRecord {
    let i = id as usize;
    HealthRecord {
        id,
        age: 22.0 + ((i * 7) % 60) as f64,
        gender: if i % 2 == 0 { "Male" } else { "Female" }.to_string(),
        bmi: 17.0 + ((i * 37) % 180) as f64 / 10.0,
        heart_rate: 60.0 + ((i * 7) % 35) as f64,
        blood_pressure: format!("{}/{}", 110 + (i * 9) % 45, 70 + (i * 5) % 25),
        hours_of_sleep: 5.0 + (i % 5) as f64 * 0.8,
        exercise_hours_per_week: ((i * 2) % 9) as f64,
        daily_steps: 3000.0 + ((i * 1370) % 9000) as f64,
        alcohol_consumption_per_week: (i % 4) as f64,
        smoker: if i % 3 == 0 { "Yes" } else { "No" }.to_string(),
        diabetic: if i % 4 == 1 { "Yes" } else { "No" }.to_string(),
        calories_intake: 1800.0 + ((i * 130) % 900) as f64,
        weight_kg: 55.0 + ((i * 43) % 400) as f64 / 10.0,
    }
}

pub(crate) fn sample_dataset(rows: usize) -> Dataset {
    Dataset::from_records((0..rows as u32).map(record).collect())
}
