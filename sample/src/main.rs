//! 手作業評価用のサンプルを抽出するユーティリティ
//!
//! このバイナリは、学習済みモデルの予測を付けたインスタンスを単語
//! ごとに無作為抽出し、注釈用の空欄列を持つCSVとして出力します。
//! 出力は evaluate の `--manual` モードの入力になります。

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use yarowsky::ospd::DEFAULT_CONFIDENCE_THRESHOLD;
use yarowsky::utils::quote_csv_cell;
use yarowsky::{FeatureSetTable, Model, OspdConfig};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "sample", about = "Sample instances for manual evaluation")]
struct Args {
    /// Feature set file (in TSV).
    #[clap(short = 'f', long)]
    features: PathBuf,

    /// Trained model (in rkyv).
    #[clap(short = 'm', long)]
    model: PathBuf,

    /// A file to which the sample is output (in CSV).
    #[clap(short = 'o', long)]
    sample_out: PathBuf,

    /// Number of instances sampled per word.
    #[clap(short = 'n', long, default_value = "100")]
    per_word: usize,

    /// Seed of the random number generator.
    #[clap(long)]
    seed: Option<u64>,

    /// Refine the predictions with the one-sense-per-discourse pass.
    #[clap(long)]
    ospd: bool,

    /// Document majority ratio required to overwrite a document.
    #[clap(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    threshold: f64,
}

/// メイン関数
///
/// 単語ごとに最大 `--per-word` 件のインスタンスを非復元抽出し、
/// 予測付きのCSVとして書き出します。
///
/// # 戻り値
///
/// 実行が成功した場合は `Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    eprintln!("Loading the model...");
    let model = Model::read(File::open(args.model)?)?;

    eprintln!("Loading the feature sets...");
    let feature_sets = FeatureSetTable::from_reader(File::open(args.features)?)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let ospd = OspdConfig::new(args.threshold)?;

    let mut wtr = BufWriter::new(File::create(args.sample_out)?);
    wtr.write_all(b"word,doc_id,sent_id,tok_id,features,predicted_sense,gold_label_manual\n")?;
    for entry in model.entries() {
        let word = entry.word();
        let Some(fs) = feature_sets.get(word) else {
            eprintln!("{word}: no feature set, skipped");
            continue;
        };

        let mut predictions = entry.decision_list().predict_all(fs);
        if args.ospd {
            predictions = ospd.refine(fs, &predictions)?;
        }

        let amount = args.per_word.min(fs.len());
        let mut picked = rand::seq::index::sample(&mut rng, fs.len(), amount).into_vec();
        picked.sort_unstable();
        for instance_id in picked {
            // The id came from the feature set, so the lookups succeed.
            let instance = fs
                .get(instance_id)
                .ok_or("a sampled instance disappeared")?;
            let predicted = predictions[instance_id].map_or(String::new(), |s| s.to_string());

            quote_csv_cell(&mut wtr, word.as_bytes())?;
            write!(
                wtr,
                ",{},{},{},",
                instance.doc_id(),
                instance.sent_id(),
                instance.tok_id()
            )?;
            quote_csv_cell(&mut wtr, instance.features().join(" ").as_bytes())?;
            wtr.write_all(b",")?;
            quote_csv_cell(&mut wtr, predicted.as_bytes())?;
            // The last column is left blank for the annotator.
            wtr.write_all(b",\n")?;
        }
        eprintln!("{word}: sampled {amount} of {} instances", fs.len());
    }
    Ok(())
}
