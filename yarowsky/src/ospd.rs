//! 一文書一語義（OSPD）による予測の事後修正を提供するモジュール
//!
//! 「1つの単語は1つの文書内では通常1つの語義しか持たない」という
//! ヒューリスティクスに基づき、全件予測列を文書単位の多数決で
//! 修正します。合意率が閾値に満たない文書は、全インスタンスの予測を
//! 取り消す保守的な方針を取ります。
//!
//! この処理は学習用のラベル対応には一切触れません。取り消しが起こり
//! 得るのは、学習状態とは別に生成された予測列のコピーの上だけです。

use hashbrown::HashMap;

use crate::errors::{Result, YarowskyError};
use crate::instance::{FeatureSet, PredictionVector, Sense};

/// 合意率の閾値のデフォルト値
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.55;

/// OSPD修正の設定
///
/// 文書の予測を多数決語義で上書きするために必要な合意率の閾値を
/// 保持します。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OspdConfig {
    confidence_threshold: f64,
}

impl Default for OspdConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl OspdConfig {
    /// 指定された閾値で設定を作成します
    ///
    /// # 引数
    ///
    /// * `confidence_threshold` - 合意率の閾値
    ///
    /// # 戻り値
    ///
    /// 作成された設定
    ///
    /// # エラー
    ///
    /// 閾値が `0.0..=1.0` の範囲外、または非数の場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn new(confidence_threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(YarowskyError::invalid_argument(
                "confidence_threshold",
                format!("must be in the range [0, 1], but got {confidence_threshold}"),
            ));
        }
        Ok(Self {
            confidence_threshold,
        })
    }

    /// 合意率の閾値を返します
    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// 予測列を文書単位の多数決で修正します
    ///
    /// 文書ごとに非 `None` の予測を集め、次の方針で処理します。
    ///
    /// - 非 `None` の予測が1つもない文書はそのまま残します。
    /// - 多数決語義を求めます。同数の場合は小さい語義IDが勝ちます。
    /// - `合意率 = 多数決語義の件数 / 非Noneの件数` が閾値以上なら、
    ///   その文書の**全**インスタンス（`None` だったものや反対の語義
    ///   だったものも含む）を多数決語義で上書きします。
    /// - 閾値未満なら、その文書の全インスタンスを `None` に戻します。
    ///   文書全体の棄却は期待された動作であり、エラーではありません。
    ///
    /// 呼び出し元の予測列は変更されず、修正結果は新しい列として
    /// 返されます。この関数は入力の純粋関数であり、自身の出力に再度
    /// 適用しても結果は変化しません（冪等性）。
    ///
    /// # 引数
    ///
    /// * `feature_set` - 文書IDによるグルーピングを与える素性集合
    /// * `predictions` - 素性集合と整列した全件予測列
    ///
    /// # 戻り値
    ///
    /// 修正された新しい予測列
    ///
    /// # エラー
    ///
    /// 予測列の長さが素性集合と一致しない場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn refine(
        &self,
        feature_set: &FeatureSet,
        predictions: &[Option<Sense>],
    ) -> Result<PredictionVector> {
        if predictions.len() != feature_set.len() {
            return Err(YarowskyError::invalid_argument(
                "predictions",
                format!(
                    "must be aligned with the feature set: {} predictions vs {} instances",
                    predictions.len(),
                    feature_set.len()
                ),
            ));
        }

        let mut doc_groups: HashMap<u32, Vec<usize>> = HashMap::new();
        for (instance_id, instance) in feature_set.iter() {
            doc_groups
                .entry(instance.doc_id())
                .or_default()
                .push(instance_id);
        }

        let mut refined = predictions.to_vec();

        for instance_ids in doc_groups.values() {
            let mut count1 = 0usize;
            let mut count2 = 0usize;
            for &id in instance_ids {
                match predictions[id] {
                    Some(Sense::One) => count1 += 1,
                    Some(Sense::Two) => count2 += 1,
                    None => {}
                }
            }
            let tagged = count1 + count2;
            if tagged == 0 {
                continue;
            }

            // Ties go to the lower sense id.
            let (majority_sense, majority_count) = if count2 > count1 {
                (Sense::Two, count2)
            } else {
                (Sense::One, count1)
            };
            let agreement_ratio = majority_count as f64 / tagged as f64;

            if agreement_ratio >= self.confidence_threshold {
                for &id in instance_ids {
                    refined[id] = Some(majority_sense);
                }
            } else {
                for &id in instance_ids {
                    refined[id] = None;
                }
            }
        }
        Ok(refined)
    }
}
