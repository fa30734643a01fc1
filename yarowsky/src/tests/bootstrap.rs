//! ブートストラップ学習の結合テスト
//!
//! シードラベリングから決定リストの適用、OSPDによる事後修正までの
//! 一連の流れを検証します。

use crate::dataset::FeatureSetTable;
use crate::instance::Sense;
use crate::model::Model;
use crate::ospd::OspdConfig;
use crate::seed::SeedRuleTable;
use crate::trainer::Trainer;

const FEATURE_DATA: &str = "\
bank\t0\t0\t2\tLEFT1=river WINDOW=fish WINDOW=muddy
bank\t0\t1\t0\tWINDOW=fish WINDOW=boat
bank\t0\t2\t1\tWINDOW=boat
bank\t1\t0\t3\tRIGHT1=loan WINDOW=money
bank\t1\t1\t2\tWINDOW=money WINDOW=deposit
bank\t1\t2\t0\tWINDOW=muddy
bank\t2\t0\t0\tWINDOW=nothing
";

const SEED_DATA: &str = "bank\t1\triver shore\nbank\t2\tloan\n";

#[test]
fn test_full_bootstrap_then_ospd() {
    let feature_sets = FeatureSetTable::from_reader(FEATURE_DATA.as_bytes()).unwrap();
    let seeds = SeedRuleTable::from_reader(SEED_DATA.as_bytes()).unwrap();

    let model = Trainer::new().train(&feature_sets, &seeds).unwrap();
    let entry = model.get("bank").unwrap();
    assert!(entry.convergence().is_converged());

    let fs = feature_sets.get("bank").unwrap();
    let predictions = entry.decision_list().predict_all(fs);

    // Bootstrapping reaches every instance connected to a seed through
    // shared features; the isolated one stays undecided.
    assert_eq!(predictions[0], Some(Sense::One));
    assert_eq!(predictions[1], Some(Sense::One));
    assert_eq!(predictions[2], Some(Sense::One));
    assert_eq!(predictions[3], Some(Sense::Two));
    assert_eq!(predictions[4], Some(Sense::Two));
    assert_eq!(predictions[6], None);

    // Instance 5 shares WINDOW=muddy with the sense-1 seed even though it
    // sits in the sense-2 document.
    assert_eq!(predictions[5], Some(Sense::One));

    // OSPD: document 1 is a 2:1 split for sense 2 (ratio 2/3 >= 0.55), so
    // the dissenting instance 5 is overwritten. Document 2 has no decided
    // instance and is left untouched.
    let refined = OspdConfig::default().refine(fs, &predictions).unwrap();
    assert_eq!(refined[3], Some(Sense::Two));
    assert_eq!(refined[4], Some(Sense::Two));
    assert_eq!(refined[5], Some(Sense::Two));
    assert_eq!(refined[6], None);
    // Document 0 was already unanimous.
    assert_eq!(&refined[..3], &predictions[..3]);
}

#[test]
fn test_training_state_survives_model_serialization() {
    let feature_sets = FeatureSetTable::from_reader(FEATURE_DATA.as_bytes()).unwrap();
    let seeds = SeedRuleTable::from_reader(SEED_DATA.as_bytes()).unwrap();
    let model = Trainer::new().train(&feature_sets, &seeds).unwrap();

    let mut bytes = vec![];
    model.write(&mut bytes).unwrap();
    let restored = Model::read(bytes.as_slice()).unwrap();

    let fs = feature_sets.get("bank").unwrap();
    let before = model.get("bank").unwrap().decision_list().predict_all(fs);
    let after = restored.get("bank").unwrap().decision_list().predict_all(fs);
    assert_eq!(before, after);
    assert_eq!(
        model.get("bank").unwrap().labels(),
        restored.get("bank").unwrap().labels()
    );
}

#[test]
fn test_model_file_roundtrip() {
    let feature_sets = FeatureSetTable::from_reader(FEATURE_DATA.as_bytes()).unwrap();
    let seeds = SeedRuleTable::from_reader(SEED_DATA.as_bytes()).unwrap();
    let model = Trainer::new().train(&feature_sets, &seeds).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.model");
    model.write(std::fs::File::create(&path).unwrap()).unwrap();
    let restored = Model::read(std::fs::File::open(&path).unwrap()).unwrap();

    assert_eq!(model, restored);
}

#[test]
fn test_identical_inputs_give_identical_models() {
    let feature_sets = FeatureSetTable::from_reader(FEATURE_DATA.as_bytes()).unwrap();
    let seeds = SeedRuleTable::from_reader(SEED_DATA.as_bytes()).unwrap();

    let a = Trainer::new().train(&feature_sets, &seeds).unwrap();
    let b = Trainer::new().train(&feature_sets, &seeds).unwrap();

    let mut bytes_a = vec![];
    let mut bytes_b = vec![];
    a.write(&mut bytes_a).unwrap();
    b.write(&mut bytes_b).unwrap();
    assert_eq!(bytes_a, bytes_b);
}
