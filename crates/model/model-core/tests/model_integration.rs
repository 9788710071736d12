//! Integration tests for model-core

use model_api::{ForestConfig, KnnConfig, SplitConfig};
use model_core::{
    metrics::{accuracy, mse, r2},
    train_test_split, KnnClassifier, LabelEncoder, LinearRegression, OneHotEncoder,
    RandomForest, StandardScaler,
};
use model_spi::{Classifier, Regressor, Transformer};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_scaled_knn_pipeline() {
    // Second feature is on a much larger scale and carries no signal
    let raw: Vec<Vec<f64>> = (0..40)
        .map(|i| vec![if i < 20 { 0.0 } else { 1.0 }, ((i * 37) % 11) as f64 * 100.0])
        .collect();
    let labels: Vec<&str> = (0..40).map(|i| if i < 20 { "Minor" } else { "Major" }).collect();

    let mut target = LabelEncoder::new("severity");
    let y = target.fit_transform(&labels).unwrap();

    let (train, test) = train_test_split(&y, &SplitConfig::default()).unwrap();
    let x_train: Vec<Vec<f64>> = train.iter().map(|&i| raw[i].clone()).collect();
    let y_train: Vec<usize> = train.iter().map(|&i| y[i]).collect();

    let mut scaler = StandardScaler::new();
    scaler.fit_matrix(&x_train).unwrap();
    let mut knn = KnnClassifier::from_config(&KnnConfig::default()).unwrap();
    knn.fit(&scaler.transform_matrix(&x_train).unwrap(), &y_train)
        .unwrap();

    let predicted: Vec<usize> = test
        .iter()
        .map(|&i| knn.predict(&scaler.transform(&raw[i]).unwrap()).unwrap())
        .collect();
    let actual: Vec<usize> = test.iter().map(|&i| y[i]).collect();
    assert!(accuracy(&actual, &predicted) >= 0.75);
}

#[test]
fn test_forest_on_one_hot_and_numeric_features() {
    let carriers = ["AA", "DL", "UA", "WN"];
    let mut categorical = Vec::new();
    let mut numeric = Vec::new();
    let mut y = Vec::new();
    for i in 0..80 {
        let carrier = carriers[i % 4];
        let risky = carrier == "UA" || carrier == "WN";
        categorical.push(strings(&[carrier]));
        numeric.push(vec![(i % 7) as f64]);
        y.push(usize::from(risky));
    }

    let mut one_hot = OneHotEncoder::new();
    one_hot.fit_rows(&categorical).unwrap();
    let x: Vec<Vec<f64>> = categorical
        .iter()
        .zip(numeric.iter())
        .map(|(c, n)| {
            let mut row = n.clone();
            row.extend(one_hot.transform(c).unwrap());
            row
        })
        .collect();

    let mut forest = RandomForest::new(ForestConfig::new(40, Some(6))).unwrap();
    forest.fit(&x, &y).unwrap();

    let mut probe = vec![3.0];
    probe.extend(one_hot.transform(&strings(&["UA"])).unwrap());
    let proba = forest.predict_proba(&probe).unwrap();
    assert!(proba.get(1) > 0.5);

    let mut unknown = vec![3.0];
    unknown.extend(one_hot.transform(&strings(&["ZZ"])).unwrap());
    assert!(forest.predict_proba(&unknown).is_ok());
}

#[test]
fn test_linear_regression_metrics() {
    let x = vec![
        vec![1500.0, 3.0],
        vec![1200.0, 2.0],
        vec![1800.0, 4.0],
        vec![2000.0, 5.0],
        vec![1400.0, 2.0],
        vec![1600.0, 3.0],
    ];
    let y = vec![300000.0, 250000.0, 400000.0, 500000.0, 270000.0, 320000.0];

    let mut model = LinearRegression::new();
    model.fit(&x, &y).unwrap();
    let fitted: Vec<f64> = x.iter().map(|r| model.predict(r).unwrap()).collect();

    assert!(r2(&y, &fitted) > 0.9);
    assert!(mse(&y, &fitted) < 1e9);
}
