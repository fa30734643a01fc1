//! 擬似単語データセットを生成するユーティリティ
//!
//! このバイナリは、生テキストのコーパスディレクトリを読み込み、
//! 擬似単語定義に従って元単語を置換し、素性集合と正解ラベルを
//! TSV形式で出力します。

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;

use yarowsky::corpus::{CorpusReader, TokenIndex};
use yarowsky::features::FeatureExtractor;
use yarowsky::synthetic::{self, PseudowordTable};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "synthesize", about = "Generate a pseudoword dataset")]
struct Args {
    /// Directory of raw corpus files.
    #[clap(short = 'c', long)]
    corpus_dir: PathBuf,

    /// Pseudoword definition file.
    ///
    /// Each line has three tab-separated fields: the pseudoword and its
    /// two source words.
    #[clap(short = 'p', long)]
    pseudowords: PathBuf,

    /// A file to which the feature sets are output (in TSV).
    #[clap(short = 'f', long)]
    features_out: PathBuf,

    /// A file to which the gold labels are output (in TSV).
    #[clap(short = 'g', long)]
    gold_out: PathBuf,

    /// Size of the context window on each side of the target.
    #[clap(short = 'w', long, default_value = "4")]
    window: usize,

    /// Keep stopwords in the extracted features.
    #[clap(long)]
    keep_stopwords: bool,
}

/// メイン関数
///
/// コーパスを取り込み、元単語の出現頻度を報告した後、擬似単語
/// データセットを生成して2つのTSVファイルに書き出します。
///
/// # 戻り値
///
/// 実行が成功した場合は `Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    eprintln!("Loading the pseudoword definitions...");
    let pseudowords = PseudowordTable::from_reader(File::open(args.pseudowords)?)?;

    eprintln!("Reading the corpus...");
    let reader = CorpusReader::new()?;
    let corpus = reader.read_dir(&args.corpus_dir)?;
    let index = TokenIndex::build(&corpus)?;
    eprintln!(
        "Read {} documents ({} tokens)",
        corpus.len(),
        index.num_tokens()
    );
    for spec in pseudowords.specs() {
        let n1 = index.count(spec.source(yarowsky::Sense::One));
        let n2 = index.count(spec.source(yarowsky::Sense::Two));
        eprintln!(
            "{}: {}={}, {}={}",
            spec.pseudoword(),
            spec.source(yarowsky::Sense::One),
            n1,
            spec.source(yarowsky::Sense::Two),
            n2,
        );
    }

    eprintln!("Generating the dataset...");
    let extractor = FeatureExtractor::new()
        .window(args.window)
        .filter_stopwords(!args.keep_stopwords);
    let dataset = synthetic::generate(&corpus, &pseudowords, &extractor)?;

    let (feature_sets, gold) = dataset.into_parts();
    feature_sets.write(BufWriter::new(File::create(args.features_out)?))?;
    gold.write(BufWriter::new(File::create(args.gold_out)?))?;

    for (word, fs) in feature_sets.iter() {
        eprintln!("{word}: {} instances", fs.len());
    }
    Ok(())
}
