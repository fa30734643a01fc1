//! ブートストラップ学習のオーケストレーションを提供するモジュール
//!
//! このモジュールは、Yarowsky方式の自己学習ループを実装します。
//! シードラベリングから始め、素性統計の集計、決定リストの構築、
//! 未ラベルインスタンスへの適用を、新規ラベルが増えなくなるか
//! イテレーション上限に達するまで繰り返します。
//!
//! ループ内の3ステップ（統計 → 構築 → 適用）は、それぞれ直前の
//! ステップの出力に依存するため、この順序で逐次実行されます。
//! 一方、異なる対象単語の学習同士は共有可変状態を持たず独立です。
//!
//! # 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use yarowsky::{FeatureSet, Instance, SeedRuleTable, Sense, Trainer};
//!
//! let seed_config = "bank\t1\triver shore\nbank\t2\tloan deposit\n";
//! let seeds = SeedRuleTable::from_reader(seed_config.as_bytes())?;
//!
//! let mut fs = FeatureSet::new();
//! fs.push(Instance::new(0, 0, 2, vec![
//!     "LEFT1=river".to_string(),
//!     "WINDOW=fish".to_string(),
//! ]));
//! fs.push(Instance::new(0, 1, 4, vec![
//!     "WINDOW=fish".to_string(),
//!     "WINDOW=boat".to_string(),
//! ]));
//! fs.push(Instance::new(1, 0, 0, vec!["RIGHT1=loan".to_string()]));
//!
//! let trainer = Trainer::new().max_iter(10);
//! let model = trainer.train_word("bank", &fs, &seeds)?;
//!
//! // The second instance is reached through the shared WINDOW=fish feature.
//! assert_eq!(model.labels().get(&1), Some(&Sense::One));
//! assert!(model.convergence().is_converged());
//! # Ok(())
//! # }
//! ```

use tracing::warn;

use crate::decision_list::{DecisionList, FeatureStats};
use crate::dataset::FeatureSetTable;
use crate::errors::Result;
use crate::instance::{FeatureSet, LabelMap};
use crate::model::Model;
use crate::seed::SeedRuleTable;

/// ブートストラップのイテレーション上限のデフォルト値
pub const DEFAULT_MAX_ITER: usize = 10;

/// 1単語のブートストラップの終了状態
///
/// どちらの値も正常な結果です。上限到達は観測性のために報告されますが、
/// エラーとしては扱われません。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
pub enum Convergence {
    /// あるイテレーションで新規ラベルが0件となり収束した
    Converged {
        /// 実行されたイテレーション数
        iterations: usize,
    },
    /// 収束せずにイテレーション上限に達した
    ///
    /// 学習は最後に計算された決定リストでそのまま続行されます。
    BudgetExhausted {
        /// 実行されたイテレーション数（= 上限）
        iterations: usize,
    },
}

impl Convergence {
    /// 収束したかどうかを返します
    pub fn is_converged(self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// 実行されたイテレーション数を返します
    pub fn iterations(self) -> usize {
        match self {
            Self::Converged { iterations } | Self::BudgetExhausted { iterations } => iterations,
        }
    }
}

/// 1単語の学習結果
///
/// 最終的なラベル対応と決定リスト、および終了状態を保持します。
#[derive(Debug, Clone)]
pub struct WordModel {
    word: String,
    labels: LabelMap,
    decision_list: DecisionList,
    convergence: Convergence,
}

impl WordModel {
    /// 対象単語を返します
    pub fn word(&self) -> &str {
        &self.word
    }

    /// 最終的なラベル対応を返します
    ///
    /// どのルールにも一致しなかったインスタンスは永続的に未ラベルの
    /// ままです。これは期待された結果であり、エラーではありません。
    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// 最終的な決定リストを返します
    pub fn decision_list(&self) -> &DecisionList {
        &self.decision_list
    }

    /// 終了状態を返します
    pub fn convergence(&self) -> Convergence {
        self.convergence
    }

    pub(crate) fn new(
        word: String,
        labels: LabelMap,
        decision_list: DecisionList,
        convergence: Convergence,
    ) -> Self {
        Self {
            word,
            labels,
            decision_list,
            convergence,
        }
    }
}

/// ブートストラップ学習のトレーナー
///
/// シードラベリング、素性統計の集計、決定リストの構築、逐次適用の
/// ループを固定点まで駆動します。
#[derive(Debug, Clone)]
pub struct Trainer {
    max_iter: usize,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Trainer {
    /// デフォルト設定のトレーナーを作成します
    ///
    /// イテレーション上限は[`DEFAULT_MAX_ITER`]です。
    pub fn new() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
        }
    }

    /// イテレーション上限を設定します
    ///
    /// 上限は、ラベルの増加が止まらない場合でも停止を無条件に保証します。
    ///
    /// # 引数
    ///
    /// * `max_iter` - イテレーションの最大数
    pub const fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// 1単語のブートストラップ学習を実行します
    ///
    /// シードルールによる初期ラベリングの後、以下を上限回数まで
    /// 繰り返します。
    ///
    /// 1. 現在のラベルから素性統計を集計する
    /// 2. 統計から決定リストを構築する
    /// 3. 未ラベルのインスタンスに決定リストを適用し、新規ラベルを
    ///    確定する
    ///
    /// あるイテレーションの新規ラベルが0件になった時点で収束します。
    /// シードが1件も一致しない単語は、空のラベル対応と空の決定リストで
    /// 即座に収束します。これは縮退していますが正常な結果であり、警告
    /// として通知されます。
    ///
    /// # 引数
    ///
    /// * `word` - 対象単語
    /// * `feature_set` - 対象単語の素性集合
    /// * `seeds` - シードルールテーブル
    ///
    /// # 戻り値
    ///
    /// 最終的なラベル対応・決定リスト・終了状態を持つ学習結果
    ///
    /// # エラー
    ///
    /// 対象単語のシードルールが未定義の場合、
    /// [`YarowskyError::MissingSeedRule`](crate::errors::YarowskyError::MissingSeedRule)
    /// が返されます。
    pub fn train_word(
        &self,
        word: &str,
        feature_set: &FeatureSet,
        seeds: &SeedRuleTable,
    ) -> Result<WordModel> {
        let rules = seeds.get(word)?;

        let mut labels = rules.label(feature_set);
        if labels.is_empty() {
            warn!(
                word,
                num_instances = feature_set.len(),
                "seed rules matched no instance; returning an empty model"
            );
            return Ok(WordModel::new(
                word.to_string(),
                labels,
                DecisionList::default(),
                Convergence::Converged { iterations: 0 },
            ));
        }

        let mut decision_list = DecisionList::default();
        let mut convergence = Convergence::BudgetExhausted {
            iterations: self.max_iter,
        };
        for iteration in 0..self.max_iter {
            let stats = FeatureStats::aggregate(feature_set, &labels);
            decision_list = DecisionList::from_stats(&stats);
            let added = decision_list.extend_labels(feature_set, &mut labels);
            if added == 0 {
                convergence = Convergence::Converged {
                    iterations: iteration + 1,
                };
                break;
            }
        }

        if !convergence.is_converged() {
            warn!(
                word,
                max_iter = self.max_iter,
                num_labeled = labels.len(),
                num_instances = feature_set.len(),
                "did not converge within the iteration budget"
            );
        }

        Ok(WordModel::new(
            word.to_string(),
            labels,
            decision_list,
            convergence,
        ))
    }

    /// テーブル内のすべての対象単語を学習します
    ///
    /// 単語はテーブルの登録順に逐次学習されます。単語間に共有可変状態は
    /// なく、順序依存もありません。
    ///
    /// # 引数
    ///
    /// * `feature_sets` - 単語ごとの素性集合のテーブル
    /// * `seeds` - シードルールテーブル
    ///
    /// # 戻り値
    ///
    /// すべての単語の学習結果を登録順に保持するモデル
    ///
    /// # エラー
    ///
    /// いずれかの単語のシードルールが未定義の場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn train(&self, feature_sets: &FeatureSetTable, seeds: &SeedRuleTable) -> Result<Model> {
        let mut entries = vec![];
        for (word, feature_set) in feature_sets.iter() {
            entries.push(self.train_word(word, feature_set, seeds)?);
        }
        Model::from_word_models(entries)
    }
}
