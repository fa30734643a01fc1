//! 生コーパスから評価までのパイプラインの結合テスト
//!
//! 生テキストの取り込み、擬似単語の生成、学習、全件予測、正解との
//! 照合までを通して検証します。

use crate::corpus::CorpusReader;
use crate::features::FeatureExtractor;
use crate::ospd::OspdConfig;
use crate::seed::SeedRuleTable;
use crate::synthetic::{self, PseudowordTable};
use crate::trainer::Trainer;

const RAW: &str = "\
<TEXT>
He parked the car near the garage. The car engine would not start.
The engine smelled of petrol.
</TEXT>
<TEXT>
Her speech at the conference was long. The closing speech drew applause.
</TEXT>
<TEXT>
The garage took the car.
</TEXT>
";

#[test]
fn test_raw_corpus_to_evaluation() {
    let reader = CorpusReader::new().unwrap();
    let corpus = reader.read(RAW.as_bytes()).unwrap();
    assert_eq!(corpus.len(), 3);

    let pseudowords = PseudowordTable::from_reader("carspeech\tcar\tspeech\n".as_bytes()).unwrap();
    let extractor = FeatureExtractor::new().window(4).filter_stopwords(true);
    let dataset = synthetic::generate(&corpus, &pseudowords, &extractor).unwrap();

    let fs = dataset.feature_sets().get("carspeech").unwrap();
    let gold = dataset.gold().get("carspeech").unwrap();
    assert_eq!(fs.len(), 5);
    assert_eq!(fs.len(), gold.len());

    let seeds = SeedRuleTable::from_reader(
        "carspeech\t1\tgarage engine\ncarspeech\t2\tconference applause\n".as_bytes(),
    )
    .unwrap();
    let model = Trainer::new().train(dataset.feature_sets(), &seeds).unwrap();
    let entry = model.get("carspeech").unwrap();

    let predictions = entry.decision_list().predict_all(fs);
    let refined = OspdConfig::default().refine(fs, &predictions).unwrap();

    // Every instance carries a seed keyword in its context here, so both
    // the raw and the refined predictions match the gold labels exactly.
    for (pred, gold) in refined.iter().zip(gold) {
        assert_eq!(pred.as_ref(), Some(gold));
    }
    let correct = predictions
        .iter()
        .zip(gold)
        .filter(|(p, g)| p.as_ref() == Some(g))
        .count();
    assert_eq!(correct, gold.len());
}
