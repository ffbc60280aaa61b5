//! Input forms and feature extraction for the built-in diagnostic models.
//!
//! Each model's form lists its input fields in the exact order the trained
//! classifier expects them. Extraction maps named user inputs onto that order,
//! filling defaults and enforcing each field's range.

use crate::error::ServiceError;
use crate::types::FeatureVector;
use std::collections::HashMap;

/// One numeric input field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Feature name as used by the model
    pub name: &'static str,
    /// Human-readable label
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Counts and coded categories accept whole numbers only
    pub integer: bool,
}

const fn real(name: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        min,
        max,
        default,
        integer: false,
    }
}

const fn whole(name: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        min,
        max,
        default,
        integer: true,
    }
}

const DIABETES_FIELDS: &[FieldSpec] = &[
    whole("Pregnancies", "Number of Pregnancies", 0.0, 20.0, 0.0),
    real("Glucose", "Glucose Level", 0.0, 200.0, 80.0),
    real("BloodPressure", "Blood Pressure value", 0.0, 150.0, 80.0),
    real("SkinThickness", "Skin Thickness value", 0.0, 100.0, 20.0),
    real("Insulin", "Insulin Level", 0.0, 850.0, 80.0),
    real("BMI", "BMI value", 0.0, 70.0, 25.0),
    real("DiabetesPedigreeFunction", "Diabetes Pedigree Function value", 0.0, 3.0, 0.5),
    whole("Age", "Age of the Person", 0.0, 120.0, 25.0),
];

const HEART_DISEASE_FIELDS: &[FieldSpec] = &[
    whole("age", "Age", 0.0, 120.0, 50.0),
    whole("sex", "Sex (1 = male, 0 = female)", 0.0, 1.0, 0.0),
    whole("cp", "Chest Pain type (0-3)", 0.0, 3.0, 0.0),
    whole("trestbps", "Resting Blood Pressure", 0.0, 200.0, 120.0),
    whole("chol", "Serum Cholestoral in mg/dl", 0.0, 600.0, 200.0),
    whole("fbs", "Fasting Blood Sugar > 120 mg/dl", 0.0, 1.0, 0.0),
    whole("restecg", "Resting Electrocardiographic results (0-2)", 0.0, 2.0, 0.0),
    whole("thalach", "Maximum Heart Rate achieved", 0.0, 250.0, 150.0),
    whole("exang", "Exercise Induced Angina", 0.0, 1.0, 0.0),
    real("oldpeak", "ST depression induced by exercise", 0.0, 10.0, 1.0),
    whole("slope", "Slope of the peak exercise ST segment (0-2)", 0.0, 2.0, 0.0),
    whole("ca", "Major vessels colored by flourosopy", 0.0, 3.0, 0.0),
    whole("thal", "Thalassemia (0-2)", 0.0, 2.0, 0.0),
];

const PARKINSONS_FIELDS: &[FieldSpec] = &[
    real("MDVP:Fo(Hz)", "Average vocal fundamental frequency", 80.0, 260.0, 145.0),
    real("MDVP:Fhi(Hz)", "Maximum vocal fundamental frequency", 100.0, 600.0, 200.0),
    real("MDVP:Flo(Hz)", "Minimum vocal fundamental frequency", 60.0, 250.0, 150.0),
    real("MDVP:Jitter(%)", "Jitter (%)", 0.0, 0.1, 0.005),
    real("MDVP:Jitter(Abs)", "Jitter (absolute)", 0.0, 1.0, 0.0003),
    real("MDVP:RAP", "Relative amplitude perturbation", 0.0, 0.1, 0.003),
    real("MDVP:PPQ", "Five-point period perturbation quotient", 0.0, 0.1, 0.003),
    real("Jitter:DDP", "Jitter DDP", 0.0, 0.1, 0.01),
    real("MDVP:Shimmer", "Shimmer", 0.0, 0.2, 0.02),
    real("MDVP:Shimmer(dB)", "Shimmer (dB)", 0.0, 5.0, 0.2),
    real("Shimmer:APQ3", "Three-point amplitude perturbation quotient", 0.0, 0.2, 0.01),
    real("Shimmer:APQ5", "Five-point amplitude perturbation quotient", 0.0, 0.2, 0.01),
    real("MDVP:APQ", "Amplitude perturbation quotient", 0.0, 0.2, 0.01),
    real("Shimmer:DDA", "Shimmer DDA", 0.0, 0.2, 0.01),
    real("NHR", "Noise-to-harmonics ratio", 0.0, 1.0, 0.01),
    real("HNR", "Harmonics-to-noise ratio", 0.0, 40.0, 20.0),
    real("RPDE", "Recurrence period density entropy", 0.0, 1.0, 0.5),
    real("DFA", "Detrended fluctuation analysis", 0.0, 1.0, 0.7),
    real("spread1", "Fundamental frequency variation (spread1)", -10.0, 0.0, -5.0),
    real("spread2", "Fundamental frequency variation (spread2)", 0.0, 1.0, 0.2),
    real("D2", "Correlation dimension", 0.0, 10.0, 2.0),
    real("PPE", "Pitch period entropy", 0.0, 1.0, 0.2),
];

/// Ordered input form for one model
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    pub model: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    /// Built-in form for a known model name
    pub fn builtin(model: &str) -> Option<Self> {
        let (model, fields) = match model {
            "diabetes" => ("diabetes", DIABETES_FIELDS),
            "heart_disease" => ("heart_disease", HEART_DISEASE_FIELDS),
            "parkinsons" => ("parkinsons", PARKINSONS_FIELDS),
            _ => return None,
        };
        Some(Self { model, fields })
    }

    /// Feature names in model order
    pub fn feature_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.to_string()).collect()
    }

    pub fn feature_count(&self) -> usize {
        self.fields.len()
    }

    /// Default value of every field, in model order
    pub fn defaults(&self) -> Vec<f64> {
        self.fields.iter().map(|f| f.default).collect()
    }
}

/// Feature extractor that turns named form inputs into a model's feature vector.
pub struct FeatureExtractor {
    schema: FormSchema,
    /// Reject absent fields instead of falling back to defaults
    strict: bool,
}

impl FeatureExtractor {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            strict: false,
        }
    }

    /// Extractor for a built-in model
    pub fn for_model(model: &str) -> Option<Self> {
        FormSchema::builtin(model).map(Self::new)
    }

    /// Require every field to be supplied
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Extract features from named inputs.
    ///
    /// Returns the values in the form's field order.
    pub fn extract(&self, inputs: &HashMap<String, f64>) -> Result<FeatureVector, ServiceError> {
        if let Some(unknown) = inputs
            .keys()
            .find(|name| !self.schema.fields.iter().any(|f| f.name == name.as_str()))
        {
            return Err(ServiceError::UnknownField {
                model: self.schema.model.to_string(),
                field: unknown.clone(),
            });
        }

        let mut features = Vec::with_capacity(self.schema.feature_count());
        for (index, field) in self.schema.fields.iter().enumerate() {
            let value = match inputs.get(field.name) {
                Some(&value) => value,
                None if self.strict => {
                    return Err(ServiceError::MissingField {
                        model: self.schema.model.to_string(),
                        field: field.name.to_string(),
                    })
                }
                None => field.default,
            };

            if !value.is_finite() {
                return Err(ServiceError::NonFiniteFeature { index, value });
            }
            if value < field.min || value > field.max {
                return Err(ServiceError::InputOutOfRange {
                    field: field.name.to_string(),
                    value,
                    min: field.min,
                    max: field.max,
                });
            }
            if field.integer && value.fract() != 0.0 {
                return Err(ServiceError::NotAnInteger {
                    field: field.name.to_string(),
                    value,
                });
            }
            features.push(value);
        }

        FeatureVector::new(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_feature_counts() {
        assert_eq!(FormSchema::builtin("diabetes").unwrap().feature_count(), 8);
        assert_eq!(FormSchema::builtin("heart_disease").unwrap().feature_count(), 13);
        assert_eq!(FormSchema::builtin("parkinsons").unwrap().feature_count(), 22);
        assert!(FormSchema::builtin("kidney").is_none());
    }

    #[test]
    fn test_defaults_fill_diabetes_form() {
        let extractor = FeatureExtractor::for_model("diabetes").unwrap();
        let features = extractor.extract(&HashMap::new()).unwrap();
        assert_eq!(features.values(), &[0.0, 80.0, 80.0, 20.0, 80.0, 25.0, 0.5, 25.0]);
    }

    #[test]
    fn test_inputs_land_in_schema_order() {
        let extractor = FeatureExtractor::for_model("diabetes").unwrap();
        let features = extractor
            .extract(&inputs(&[("Age", 61.0), ("Glucose", 148.0), ("BMI", 33.6)]))
            .unwrap();
        assert_eq!(features.values()[1], 148.0);
        assert_eq!(features.values()[5], 33.6);
        assert_eq!(features.values()[7], 61.0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let extractor = FeatureExtractor::for_model("heart_disease").unwrap();
        let err = extractor.extract(&inputs(&[("cholesterol", 200.0)])).unwrap_err();
        assert_eq!(err.kind(), "unknown_field");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let extractor = FeatureExtractor::for_model("parkinsons").unwrap();
        let err = extractor.extract(&inputs(&[("spread1", 1.5)])).unwrap_err();
        match err {
            ServiceError::InputOutOfRange { field, min, max, .. } => {
                assert_eq!(field, "spread1");
                assert_eq!((min, max), (-10.0, 0.0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_integer_fields_reject_fractions() {
        let extractor = FeatureExtractor::for_model("heart_disease").unwrap();
        let err = extractor.extract(&inputs(&[("cp", 1.5)])).unwrap_err();
        assert_eq!(err.kind(), "not_an_integer");
    }

    #[test]
    fn test_nan_input_rejected() {
        let extractor = FeatureExtractor::for_model("diabetes").unwrap();
        let err = extractor.extract(&inputs(&[("Insulin", f64::NAN)])).unwrap_err();
        match err {
            ServiceError::NonFiniteFeature { index, .. } => assert_eq!(index, 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strict_mode_requires_all_fields() {
        let extractor = FeatureExtractor::for_model("diabetes").unwrap().strict();
        let err = extractor.extract(&inputs(&[("Glucose", 100.0)])).unwrap_err();
        match err {
            ServiceError::MissingField { field, .. } => assert_eq!(field, "Pregnancies"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
