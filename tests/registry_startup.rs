use health_assistant::{
    AppConfig, FeatureVector, ModelLoader, ModelRegistry, PredictionService, RequestHandler,
    Response, ServiceError,
};
use std::path::Path;

fn write(dir: &Path, file: &str, body: &str) {
    std::fs::write(dir.join(file), body).expect("write artifact");
}

fn coefficients(n: usize, value: f64) -> String {
    vec![value.to_string(); n].join(",")
}

/// Config whose three models are JSON linear artifacts inside `dir`
fn json_config(dir: &Path) -> AppConfig {
    write(
        dir,
        "diabetes.json",
        &format!(
            r#"{{"kind":"logistic_regression","coefficients":[{}],"intercept":-10.0}}"#,
            coefficients(8, 0.02)
        ),
    );
    write(
        dir,
        "heart_disease.json",
        &format!(
            r#"{{"kind":"linear_svc","coefficients":[{}],"intercept":-1.0}}"#,
            coefficients(13, 0.01)
        ),
    );
    write(
        dir,
        "parkinsons.json",
        &format!(
            r#"{{"kind":"logistic_regression","coefficients":[{}],"intercept":0.0}}"#,
            coefficients(22, 0.0)
        ),
    );

    let mut config = AppConfig::default();
    config.models.models_dir = dir.display().to_string();
    for (name, entry) in config.models.entries.iter_mut() {
        entry.file = format!("{}.json", name);
    }
    config
}

#[test]
fn loads_all_models_and_serves_predictions() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let config = json_config(tmp.path());

    let registry = ModelRegistry::from_config(&config, &ModelLoader::default()).expect("load");
    assert_eq!(registry.names(), vec!["diabetes", "heart_disease", "parkinsons"]);

    let diabetes = registry.get("diabetes").unwrap();
    assert_eq!(diabetes.expected_feature_count(), 8);
    assert_eq!(diabetes.feature_order()[1], "Glucose");
    assert!(diabetes.classifier().supports_probability());
    assert!(!registry.get("heart_disease").unwrap().classifier().supports_probability());

    // z = 0.02 * 310.5 - 10 < 0
    let vector = FeatureVector::new(vec![0.0, 80.0, 80.0, 20.0, 80.0, 25.0, 0.5, 25.0]).unwrap();
    let verdict = PredictionService::new().predict(diabetes, &vector).unwrap();
    assert!(!verdict.positive);
    let p = verdict.probability_of_positive.expect("logistic regression scores");
    assert!((0.0..=1.0).contains(&p));

    let short = FeatureVector::new(vec![0.0, 80.0, 80.0, 20.0, 80.0, 25.0, 0.5]).unwrap();
    assert!(matches!(
        PredictionService::new().predict(diabetes, &short),
        Err(ServiceError::FeatureVectorMismatch { expected: 8, actual: 7, .. })
    ));
}

#[test]
fn handler_renders_each_model() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let config = json_config(tmp.path());
    let registry = ModelRegistry::from_config(&config, &ModelLoader::default()).expect("load");
    let handler = RequestHandler::new(&config, &registry, PredictionService::new());

    match handler.handle_line(r#"{"model":"heart_disease","inputs":{"age":70,"chol":300,"thalach":180}}"#) {
        Response::Diagnosis(d) => {
            assert!(d.positive);
            assert_eq!(d.probability_of_positive, None);
            assert_eq!(d.probability_text, "Probability scores not available for this model");
        }
        Response::Error { error, .. } => panic!("unexpected error: {error}"),
    }

    // all-zero coefficients put every row on the decision boundary, which is negative
    match handler.handle_line(r#"{"model":"parkinsons"}"#) {
        Response::Diagnosis(d) => {
            assert!(!d.positive);
            assert_eq!(
                d.probability_text,
                "Probability of having Parkinson's disease: 50.00%"
            );
        }
        Response::Error { error, .. } => panic!("unexpected error: {error}"),
    }
}

#[test]
fn missing_artifact_aborts_startup() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let config = json_config(tmp.path());
    std::fs::remove_file(tmp.path().join("parkinsons.json")).unwrap();

    let err = ModelRegistry::from_config(&config, &ModelLoader::default()).unwrap_err();
    assert!(matches!(err, ServiceError::ArtifactMissing { ref model, .. } if model == "parkinsons"));
    assert!(err.is_startup_fatal());
}

#[test]
fn corrupt_artifact_aborts_startup() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let config = json_config(tmp.path());
    write(tmp.path(), "heart_disease.json", "{\"kind\":\"linear_svc\",");

    let err = ModelRegistry::from_config(&config, &ModelLoader::default()).unwrap_err();
    assert!(matches!(err, ServiceError::ArtifactCorrupt { ref model, .. } if model == "heart_disease"));
}

#[test]
fn declared_feature_order_must_match_configuration() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write(
        tmp.path(),
        "custom.json",
        r#"{"kind":"linear_svc","feature_names":["BMI","Glucose"],"coefficients":[0.1,0.2]}"#,
    );
    let loader = ModelLoader::default();
    let mut registry = ModelRegistry::new();

    let schema = vec!["Glucose".to_string(), "BMI".to_string()];
    let err = registry
        .load(&loader, "custom", tmp.path().join("custom.json"), &schema)
        .unwrap_err();
    assert_eq!(err.kind(), "artifact_corrupt");
    assert!(registry.is_empty());

    let handle = registry
        .load(&loader, "custom", tmp.path().join("custom.json"), &[])
        .unwrap();
    assert_eq!(handle.feature_order(), &["BMI".to_string(), "Glucose".to_string()]);
}
