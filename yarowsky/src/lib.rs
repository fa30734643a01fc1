//! # Yarowsky
//!
//! Yarowskyは、ブートストラップされた決定リストによる語義曖昧性解消
//! （WSD）の実装です。
//!
//! ## 概要
//!
//! このライブラリは、曖昧な単語の各出現に2値の語義ラベルを割り当てる
//! 半教師あり学習器を提供します。少数の手書きシードルールから始め、
//! 平滑化対数尤度比でランク付けされた決定リストを自己学習ループで
//! 育てていきます。
//!
//! ## 主な機能
//!
//! - **シードラベリング**: キーワードの部分文字列一致による初期ラベル付け
//! - **決定リスト学習**: 素性統計からのLLRランク付きルールリスト構築
//! - **自己学習ループ**: 新規ラベルがなくなるまでの固定点反復
//! - **一文書一語義（OSPD）**: 文書単位の多数決による予測の事後修正
//! - **合成擬似単語**: 正解既知の評価用データセット生成
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use yarowsky::{FeatureSetTable, OspdConfig, SeedRuleTable, Sense, Trainer};
//!
//! let feature_data = "\
//! bank\t0\t0\t2\tLEFT1=river WINDOW=fish
//! bank\t0\t1\t4\tWINDOW=fish WINDOW=boat
//! bank\t1\t0\t0\tRIGHT1=loan WINDOW=money
//! bank\t1\t1\t3\tWINDOW=money
//! ";
//! let seed_data = "bank\t1\triver shore\nbank\t2\tloan deposit\n";
//!
//! let feature_sets = FeatureSetTable::from_reader(feature_data.as_bytes())?;
//! let seeds = SeedRuleTable::from_reader(seed_data.as_bytes())?;
//!
//! let model = Trainer::new().train(&feature_sets, &seeds)?;
//! let entry = model.get("bank").unwrap();
//!
//! let fs = feature_sets.get("bank").unwrap();
//! let predictions = entry.decision_list().predict_all(fs);
//! assert_eq!(predictions[1], Some(Sense::One));
//!
//! let refined = OspdConfig::default().refine(fs, &predictions)?;
//! assert_eq!(refined[3], Some(Sense::Two));
//! # Ok(())
//! # }
//! ```

/// コーパスの内部表現と取り込み
pub mod corpus;

/// データセットの読み書き
pub mod dataset;

/// 決定リストの構築と適用
pub mod decision_list;

/// エラー型の定義
pub mod errors;

/// 文脈素性の抽出
pub mod features;

/// 対象単語の出現と素性集合の表現
pub mod instance;

/// 学習済みモデルの管理と永続化
pub mod model;

/// 一文書一語義（OSPD）による事後修正
pub mod ospd;

/// シードルールと初期ラベリング
pub mod seed;

/// 合成擬似単語コーパスの生成
pub mod synthetic;

/// ブートストラップ学習のオーケストレーション
pub mod trainer;

/// 内部ユーティリティ関数
pub mod utils;


// Re-exports
pub use corpus::{Corpus, CorpusReader, TokenIndex};
pub use dataset::{FeatureSetTable, GoldTable};
pub use decision_list::{DecisionList, DecisionRule, FeatureStats};
pub use features::FeatureExtractor;
pub use instance::{FeatureSet, Instance, LabelMap, PredictionVector, Sense};
pub use model::{Model, WordEntry};
pub use ospd::OspdConfig;
pub use seed::{SeedRuleSet, SeedRuleTable};
pub use trainer::{Convergence, Trainer, WordModel};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
