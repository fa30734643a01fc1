//! モデルの精度を評価するユーティリティ
//!
//! このバイナリは、学習済みの決定リストモデルを素性集合に適用し、
//! 正解ラベルと比較して単語ごとの精度とカバレッジを計算します。
//! 手作業で注釈したサンプルCSVに対する評価モードも備えます。

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;

use yarowsky::ospd::DEFAULT_CONFIDENCE_THRESHOLD;
use yarowsky::utils::parse_csv_row;
use yarowsky::{FeatureSetTable, GoldTable, Model, OspdConfig, Sense};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "evaluate", about = "Evaluate the model accuracy")]
struct Args {
    /// Feature set file (in TSV).
    #[clap(short = 'f', long)]
    features: PathBuf,

    /// Trained model (in rkyv).
    #[clap(short = 'm', long)]
    model: PathBuf,

    /// Gold label file (in TSV).
    #[clap(short = 'g', long)]
    gold: Option<PathBuf>,

    /// Manually annotated sample file (in CSV).
    ///
    /// When given, the gold file is ignored and the predictions stored
    /// in the sample are compared against the manual labels.
    #[clap(long)]
    manual: Option<PathBuf>,

    /// Refine the predictions with the one-sense-per-discourse pass.
    #[clap(long)]
    ospd: bool,

    /// Document majority ratio required to overwrite a document.
    #[clap(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    threshold: f64,
}

/// 1単語分の評価集計
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    correct: usize,
    predicted: usize,
    total: usize,
}

impl Tally {
    fn add(&mut self, other: Tally) {
        self.correct += other.correct;
        self.predicted += other.predicted;
        self.total += other.total;
    }

    fn print(self, word: &str) {
        let accuracy = self.correct as f64 / self.total as f64;
        let coverage = self.predicted as f64 / self.total as f64;
        println!(
            "{word}: accuracy = {accuracy:.4} ({}/{}), coverage = {coverage:.4}",
            self.correct, self.total
        );
    }
}

/// 正解ラベルファイルに対して評価します
fn evaluate_gold(args: &Args) -> Result<(), Box<dyn Error>> {
    eprintln!("Loading the model...");
    let model = Model::read(File::open(&args.model)?)?;

    eprintln!("Loading the feature sets...");
    let feature_sets = FeatureSetTable::from_reader(File::open(&args.features)?)?;
    let gold_path = args
        .gold
        .as_ref()
        .ok_or("either --gold or --manual is required")?;
    let gold = GoldTable::from_reader(File::open(gold_path)?)?;

    let ospd = OspdConfig::new(args.threshold)?;
    let mut overall = Tally::default();
    for entry in model.entries() {
        let word = entry.word();
        let Some(fs) = feature_sets.get(word) else {
            eprintln!("{word}: no feature set, skipped");
            continue;
        };
        let Some(labels) = gold.get(word) else {
            eprintln!("{word}: no gold labels, skipped");
            continue;
        };
        if labels.len() != fs.len() {
            return Err(format!("{word}: gold labels do not align with the feature set").into());
        }

        let mut predictions = entry.decision_list().predict_all(fs);
        if args.ospd {
            predictions = ospd.refine(fs, &predictions)?;
        }

        let mut tally = Tally {
            total: labels.len(),
            ..Tally::default()
        };
        for (pred, gold) in predictions.iter().zip(labels) {
            if pred.is_some() {
                tally.predicted += 1;
            }
            if pred.as_ref() == Some(gold) {
                tally.correct += 1;
            }
        }
        tally.print(word);
        overall.add(tally);
    }
    if overall.total != 0 {
        overall.print("overall");
    }
    Ok(())
}

/// 手作業で注釈したサンプルCSVに対して評価します
///
/// サンプルの `predicted_sense` 列と `gold_label_manual` 列を比較
/// します。正解ラベルが空欄の行は集計から除外されます。
fn evaluate_manual(path: &PathBuf) -> Result<(), Box<dyn Error>> {
    let reader = BufReader::new(File::open(path)?);

    let mut order = vec![];
    let mut tallies: HashMap<String, Tally> = HashMap::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if i == 0 || line.trim().is_empty() {
            continue;
        }
        let fields = parse_csv_row(&line);
        let [word, _, _, _, _, predicted, annotated] = &fields[..] else {
            return Err(format!("a sample row must have seven fields: {line}").into());
        };
        let annotated = annotated.trim();
        if annotated.is_empty() {
            continue;
        }
        let annotated: Sense = annotated.parse()?;

        if !tallies.contains_key(word.as_str()) {
            order.push(word.clone());
        }
        let tally = tallies.entry(word.clone()).or_default();
        tally.total += 1;
        if !predicted.is_empty() {
            tally.predicted += 1;
            if predicted.parse::<Sense>().ok() == Some(annotated) {
                tally.correct += 1;
            }
        }
    }

    let mut overall = Tally::default();
    for word in &order {
        let tally = tallies[word];
        tally.print(word);
        overall.add(tally);
    }
    if overall.total != 0 {
        overall.print("overall");
    }
    Ok(())
}

/// メイン関数
///
/// 正解ラベルファイルまたは注釈済みサンプルに対してモデルを評価し、
/// 単語ごとの精度とカバレッジを出力します。
///
/// # 戻り値
///
/// 実行が成功した場合は `Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match &args.manual {
        Some(path) => evaluate_manual(path),
        None => evaluate_gold(&args),
    }
}
