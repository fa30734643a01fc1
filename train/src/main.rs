//! 決定リストモデルを学習するユーティリティ
//!
//! このバイナリは、素性集合とシード規則を読み込み、ブートストラップ
//! 学習により単語ごとの決定リストを構築して、モデルをrkyv形式で
//! 保存します。

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use yarowsky::errors::YarowskyError;
use yarowsky::{FeatureSetTable, Model, SeedRuleTable, Trainer};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "train", about = "Train decision-list models")]
struct Args {
    /// Feature set file (in TSV).
    #[clap(short = 'f', long)]
    features: PathBuf,

    /// Seed rule file (in TSV).
    ///
    /// Each line has three tab-separated fields: the target word, a
    /// sense id, and space-separated keywords. The line order defines
    /// the matching priority of the senses.
    #[clap(short = 's', long)]
    seed_rules: PathBuf,

    /// A file to which the model is output (in rkyv).
    #[clap(short = 'o', long)]
    model_out: PathBuf,

    /// Maximum number of bootstrapping iterations.
    #[clap(long, default_value = "10")]
    max_iter: usize,
}

/// 学習処理中に発生する可能性のあるエラー
#[derive(Debug, Error)]
enum TrainError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 学習処理エラー
    #[error("Training process failed: {0}")]
    Yarowsky(#[from] YarowskyError),
}

/// メイン関数
///
/// 素性集合とシード規則を読み込み、単語ごとにブートストラップ学習を
/// 実行して、モデルを保存します。
///
/// # 戻り値
///
/// 実行が成功した場合は `Ok(())`、失敗した場合は対応する `TrainError`
fn main() -> Result<(), TrainError> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    eprintln!("Loading the feature sets...");
    let feature_sets = FeatureSetTable::from_reader(File::open(args.features)?)?;

    eprintln!("Loading the seed rules...");
    let seeds = SeedRuleTable::from_reader(File::open(args.seed_rules)?)?;

    eprintln!("Training...");
    let model = Trainer::new().max_iter(args.max_iter).train(&feature_sets, &seeds)?;
    for entry in model.entries() {
        let convergence = entry.convergence();
        let status = if convergence.is_converged() {
            "converged"
        } else {
            "budget exhausted"
        };
        eprintln!(
            "{}: {} labels, {} rules, {} after {} iterations",
            entry.word(),
            entry.labels().len(),
            entry.decision_list().len(),
            status,
            convergence.iterations(),
        );
    }

    eprintln!("Writing the model...");
    model.write(BufWriter::new(File::create(args.model_out)?))?;
    Ok(())
}
