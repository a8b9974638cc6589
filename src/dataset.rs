//! The in-memory health table and its lazily derived columns.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use csv::{ReaderBuilder, StringRecord, Trim};
use itertools::Itertools;
use ndarray::Array1;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::derived::{self, AgeGroup, BmiCategory, RiskLevel};
use crate::error::{Result, VizError};
use crate::models::{CategoricalField, HealthRecord, NumericField, REQUIRED_COLUMNS};

static DATASET: OnceCell<Dataset> = OnceCell::new();

/// Loads the process-wide dataset. Later calls return the table loaded first.
pub fn init_dataset<P: AsRef<Path>>(path: P) -> Result<&'static Dataset> {
    DATASET.get_or_try_init(|| Dataset::load(path))
}

/// The process-wide dataset installed by [`init_dataset`].
pub fn get_dataset() -> Result<&'static Dataset> {
    DATASET.get().ok_or(VizError::NotLoaded)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BloodPressure {
    pub systolic: Vec<i32>,
    pub diastolic: Vec<i32>,
}

#[derive(Debug)]
pub struct Dataset {
    records: Vec<HealthRecord>,
    blood_pressure: OnceCell<BloodPressure>,
    bmi_category: OnceCell<Vec<BmiCategory>>,
    age_group: OnceCell<Vec<AgeGroup>>,
    risk_level: OnceCell<Vec<RiskLevel>>,
    standardized: [OnceCell<Array1<f64>>; NumericField::COUNT],
    blood_pressure_parses: AtomicUsize,
}

impl Dataset {
    pub fn from_records(records: Vec<HealthRecord>) -> Self {
        Self {
            records,
            blood_pressure: OnceCell::new(),
            bmi_category: OnceCell::new(),
            age_group: OnceCell::new(),
            risk_level: OnceCell::new(),
            standardized: std::array::from_fn(|_| OnceCell::new()),
            blood_pressure_parses: AtomicUsize::new(0),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let dataset = Self::from_reader(File::open(path)?)?;
        info!(
            "Loaded {} rows from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        check_required_columns(&headers)?;

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: HealthRecord = result?;
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[HealthRecord] {
        &self.records
    }

    pub fn row(&self, index: usize) -> Result<&HealthRecord> {
        self.records.get(index).ok_or(VizError::RowIndexOutOfRange {
            index,
            rows: self.records.len(),
        })
    }

    /// Splits `Blood_Pressure` into Systolic/Diastolic. Parses once.
    pub fn ensure_blood_pressure_split(&self) -> Result<&BloodPressure> {
        self.blood_pressure.get_or_try_init(|| {
            self.blood_pressure_parses.fetch_add(1, Ordering::SeqCst);
            let mut systolic = Vec::with_capacity(self.records.len());
            let mut diastolic = Vec::with_capacity(self.records.len());
            for (row, record) in self.records.iter().enumerate() {
                let (s, d) = derived::parse_blood_pressure(row, &record.blood_pressure)?;
                systolic.push(s);
                diastolic.push(d);
            }
            debug!("Derived Systolic/Diastolic for {} rows", self.records.len());
            Ok(BloodPressure {
                systolic,
                diastolic,
            })
        })
    }

    /// How many times the blood pressure column has been parsed.
    pub fn blood_pressure_parse_count(&self) -> usize {
        self.blood_pressure_parses.load(Ordering::SeqCst)
    }

    pub fn ensure_bmi_category(&self) -> &[BmiCategory] {
        self.bmi_category.get_or_init(|| {
            debug!("Derived BMI_Category");
            self.records
                .iter()
                .map(|r| BmiCategory::from_bmi(r.bmi))
                .collect()
        })
    }

    pub fn ensure_age_group(&self) -> &[AgeGroup] {
        self.age_group.get_or_init(|| {
            debug!("Derived Age_Group");
            self.records
                .iter()
                .map(|r| AgeGroup::from_age(r.age))
                .collect()
        })
    }

    pub fn ensure_risk_level(&self) -> Result<&[RiskLevel]> {
        self.risk_level
            .get_or_try_init(|| {
                let pressure = self.ensure_blood_pressure_split()?;
                debug!("Derived Risk_Level");
                Ok(self
                    .records
                    .iter()
                    .zip(pressure.systolic.iter())
                    .map(|(r, &systolic)| {
                        RiskLevel::from_factors(r.is_smoker(), r.is_diabetic(), r.bmi, systolic)
                    })
                    .collect())
            })
            .map(Vec::as_slice)
    }

    /// Min-max scales each column over the whole table, caching per column.
    pub fn ensure_standardized(&self, columns: &[NumericField]) -> Result<Vec<&Array1<f64>>> {
        columns
            .iter()
            .map(|&field| {
                self.standardized[field.index()].get_or_try_init(|| {
                    let values = self.numeric(field)?;
                    debug!("Standardized {}", field.name());
                    derived::min_max_scale(field.name(), &values)
                })
            })
            .collect()
    }

    pub fn numeric(&self, field: NumericField) -> Result<Array1<f64>> {
        match field {
            NumericField::Systolic => {
                let pressure = self.ensure_blood_pressure_split()?;
                Ok(pressure.systolic.iter().map(|&v| f64::from(v)).collect())
            }
            NumericField::Diastolic => {
                let pressure = self.ensure_blood_pressure_split()?;
                Ok(pressure.diastolic.iter().map(|&v| f64::from(v)).collect())
            }
            _ => Ok(self
                .records
                .iter()
                .filter_map(|r| field.source_value(r))
                .collect()),
        }
    }

    pub fn categorical(&self, field: CategoricalField) -> Result<Vec<String>> {
        let values = match field {
            CategoricalField::Gender => self.records.iter().map(|r| r.gender.clone()).collect(),
            CategoricalField::Smoker => self.records.iter().map(|r| r.smoker.clone()).collect(),
            CategoricalField::Diabetic => {
                self.records.iter().map(|r| r.diabetic.clone()).collect()
            }
            CategoricalField::BmiCategory => self
                .ensure_bmi_category()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            CategoricalField::AgeGroup => self
                .ensure_age_group()
                .iter()
                .map(|g| g.to_string())
                .collect(),
            CategoricalField::RiskLevel => self
                .ensure_risk_level()?
                .iter()
                .map(|r| r.to_string())
                .collect(),
        };
        Ok(values)
    }

    /// Distinct values of a categorical column in presentation order.
    pub fn levels(&self, field: CategoricalField) -> Result<Vec<String>> {
        let present = self.categorical(field)?;
        let ordered: Vec<String> = match field {
            CategoricalField::BmiCategory => BmiCategory::ALL.iter().map(|c| c.to_string()).collect(),
            CategoricalField::AgeGroup => AgeGroup::ALL.iter().map(|g| g.to_string()).collect(),
            CategoricalField::RiskLevel => RiskLevel::ALL.iter().map(|r| r.to_string()).collect(),
            _ => return Ok(present.into_iter().unique().sorted().collect()),
        };
        Ok(ordered
            .into_iter()
            .filter(|level| present.contains(level))
            .collect())
    }
}

fn check_required_columns(headers: &StringRecord) -> Result<()> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(VizError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}
