//! 決定リストの構築と適用を提供するモジュール
//!
//! このモジュールは、ラベル済みインスタンスからの素性統計の集計、
//! 平滑化対数尤度比（LLR）によるルールのランク付け、および
//! 先頭一致方式での分類を実装します。
//!
//! 分類には2つの使用モードがあります。
//!
//! - **逐次モード** ([`DecisionList::extend_labels`]):
//!   未ラベルのインスタンスのみを分類し、新たな判定をラベル対応に
//!   追記します。ブートストラップループの内部で使用されます。
//! - **全件モード** ([`DecisionList::predict_all`]):
//!   ラベルの有無に関わらず全インスタンスを再評価し、新しい予測列を
//!   生成します。評価や人手レビューのサンプリングで使用されます。
//!
//! 両者は学習のダイナミクスを変えるため、別々の操作として公開されます。

use hashbrown::{HashMap, HashSet};
use rkyv::{Archive, Deserialize, Serialize};

use crate::instance::{FeatureSet, Instance, LabelMap, PredictionVector, Sense};

/// 素性統計の平滑化定数
pub const SMOOTHING: f64 = 0.1;

/// 素性ごとの語義別共起カウント
///
/// 現在のラベル対応から毎回完全に再計算される導出データであり、
/// イテレーションをまたいで保持されることはありません。
#[derive(Debug, Clone, Default)]
pub struct FeatureStats {
    // counts[feature] = [sense-1 count, sense-2 count]
    counts: HashMap<String, [u32; 2]>,
}

impl FeatureStats {
    /// ラベル済みインスタンスから素性統計を集計します
    ///
    /// ラベル済みの各インスタンスについて、その素性集合内のすべての素性の
    /// `count[feature][sense]` を1ずつ加算します。未ラベルのインスタンスは
    /// 何も寄与しません。1つのインスタンスは多数の素性のカウントに同時に
    /// 寄与します。素性は互いに排他ではなく、独立した証拠チャネルとして
    /// 扱われます。
    ///
    /// # 引数
    ///
    /// * `feature_set` - 対象単語の素性集合
    /// * `labels` - 現在のラベル対応
    ///
    /// # 戻り値
    ///
    /// 集計された素性統計
    pub fn aggregate(feature_set: &FeatureSet, labels: &LabelMap) -> Self {
        let mut counts: HashMap<String, [u32; 2]> = HashMap::new();
        for (instance_id, instance) in feature_set.iter() {
            let Some(sense) = labels.get(&instance_id) else {
                continue;
            };
            for feature in instance.features() {
                let entry = counts.entry_ref(feature.as_str()).or_insert([0, 0]);
                entry[usize::from(sense.as_u8() - 1)] += 1;
            }
        }
        Self { counts }
    }

    /// 指定された素性の語義別カウントを返します
    ///
    /// # 引数
    ///
    /// * `feature` - 素性タグ文字列
    /// * `sense` - 語義
    ///
    /// # 戻り値
    ///
    /// 観測回数（未観測の素性は0）
    pub fn count(&self, feature: &str, sense: Sense) -> u32 {
        self.counts
            .get(feature)
            .map_or(0, |c| c[usize::from(sense.as_u8() - 1)])
    }

    /// 観測された素性の種類数を返します
    pub fn num_features(&self) -> usize {
        self.counts.len()
    }
}

/// 決定リストの1つのルール
///
/// 素性と、その素性が支持する語義、および判別強度を保持します。
/// 強度は常に非負です。
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct DecisionRule {
    feature: String,
    sense: Sense,
    strength: f64,
}

impl DecisionRule {
    /// 素性タグ文字列を返します
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// 予測語義を返します
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// 判別強度（LLRの絶対値）を返します
    pub fn strength(&self) -> f64 {
        self.strength
    }
}

/// 強度降順にソートされたルールの列
///
/// 1つの素性は高々1つのルールにのみ現れます。同強度のルールは
/// 素性文字列の昇順で並びます。スコアが同点の場合の分類結果が
/// ルール順に依存するため、この第2ソートキーは再現性を保証するための
/// 必須の契約です。
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct DecisionList {
    rules: Vec<DecisionRule>,
}

impl DecisionList {
    /// 素性統計から決定リストを構築します
    ///
    /// 観測された各素性について加法平滑化（α = 0.1）を適用します。
    ///
    /// ```text
    /// p1 = (c1 + α) / (c1 + c2 + 2α)
    /// p2 = (c2 + α) / (c1 + c2 + 2α)
    /// score = ln(p1 / p2)
    /// ```
    ///
    /// 予測語義は `score > 0` なら第1語義、そうでなければ第2語義であり、
    /// 強度は `|score|` です。素性は観測された場合にのみ統計に現れるため、
    /// 分母は常に正であり、ゼロ除算やゼロの対数は構造上発生しません。
    ///
    /// # 引数
    ///
    /// * `stats` - 素性統計
    ///
    /// # 戻り値
    ///
    /// 強度降順（同強度は素性昇順）にソートされた決定リスト
    pub fn from_stats(stats: &FeatureStats) -> Self {
        let mut rules: Vec<DecisionRule> = stats
            .counts
            .iter()
            .map(|(feature, &[c1, c2])| {
                let c1 = f64::from(c1);
                let c2 = f64::from(c2);
                let denom = c1 + c2 + 2.0 * SMOOTHING;
                let p1 = (c1 + SMOOTHING) / denom;
                let p2 = (c2 + SMOOTHING) / denom;
                let score = (p1 / p2).ln();
                DecisionRule {
                    feature: feature.clone(),
                    sense: if score > 0.0 { Sense::One } else { Sense::Two },
                    strength: score.abs(),
                }
            })
            .collect();

        // The secondary key makes the order reproducible across runs even
        // though the stats are collected in a hash map.
        rules.sort_by(|a, b| {
            b.strength
                .total_cmp(&a.strength)
                .then_with(|| a.feature.cmp(&b.feature))
        });
        Self { rules }
    }

    /// ルール数を返します
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// リストが空かどうかを返します
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// ルールのスライスを強度降順で返します
    pub fn rules(&self) -> &[DecisionRule] {
        &self.rules
    }

    /// 1つのインスタンスを分類します
    ///
    /// ルールをリスト順に走査し、素性がインスタンスの素性集合に含まれる
    /// 最初のルールが出力を決定します。どのルールも一致しない場合は
    /// 「判定なし」として `None` を返します。
    ///
    /// # 引数
    ///
    /// * `instance` - 分類対象のインスタンス
    ///
    /// # 戻り値
    ///
    /// 予測語義、または判定なしの場合は `None`
    pub fn classify(&self, instance: &Instance) -> Option<Sense> {
        let features: HashSet<&str> = instance.features().iter().map(String::as_str).collect();
        self.rules
            .iter()
            .find(|rule| features.contains(rule.feature.as_str()))
            .map(|rule| rule.sense)
    }

    /// 逐次モード: 未ラベルのインスタンスのみを分類してラベルを追記します
    ///
    /// 現在のラベル対応に含まれないインスタンスのみを分類し、新たに判定
    /// できたものをラベル対応に追加します。既存のエントリは変更されません。
    ///
    /// # 引数
    ///
    /// * `feature_set` - 対象単語の素性集合
    /// * `labels` - 追記されるラベル対応
    ///
    /// # 戻り値
    ///
    /// 新たにラベル付けされたインスタンス数
    pub fn extend_labels(&self, feature_set: &FeatureSet, labels: &mut LabelMap) -> usize {
        let mut added = 0;
        for (instance_id, instance) in feature_set.iter() {
            if labels.contains_key(&instance_id) {
                continue;
            }
            if let Some(sense) = self.classify(instance) {
                labels.insert(instance_id, sense);
                added += 1;
            }
        }
        added
    }

    /// 全件モード: 全インスタンスを状態なしで再評価します
    ///
    /// ラベル対応とは独立に、すべてのインスタンスへルールを適用した
    /// 新しい予測列を生成します。この関数は純粋であり、学習状態を
    /// 一切変更しません。
    ///
    /// # 引数
    ///
    /// * `feature_set` - 対象単語の素性集合
    ///
    /// # 戻り値
    ///
    /// 素性集合と添字単位で整列した予測列
    pub fn predict_all(&self, feature_set: &FeatureSet) -> PredictionVector {
        feature_set
            .iter()
            .map(|(_, instance)| self.classify(instance))
            .collect()
    }
}
