//! 文脈窓からの素性抽出を提供するモジュール
//!
//! このモジュールは、対象単語の1つの出現から、直近の連語素性
//! （`LEFT1=`、`LEFT2=`、`RIGHT1=`、`RIGHT2=`）と文脈窓内の
//! bag-of-words素性（`WINDOW=`）を抽出します。
//!
//! 窓幅とストップワード除去は設定可能であり、実コーパス用と
//! 合成擬似単語用の抽出は同一の抽出器のパラメータ違いです。

use crate::corpus::Corpus;
use crate::errors::{Result, YarowskyError};
use crate::instance::{FeatureSet, Instance};
use crate::utils::FromU32;

/// デフォルトの片側窓幅
pub const DEFAULT_WINDOW: usize = 3;

/// bag-of-words素性から除外されるストップワード
pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "in", "of", "and", "to", "on", "for", "by", "with", "was", "is", "that",
    "this", "as", "it", "at", "from", "be", "been", "were", "are", "but", "or", "which", "who",
    "whom", "its", "into", "their", "his", "her", "s",
];

/// 文脈素性の抽出器
///
/// 片側の窓幅と、ストップワードを除去するかどうかを保持します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureExtractor {
    window: usize,
    filter_stopwords: bool,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    /// デフォルト設定の抽出器を作成します
    ///
    /// 窓幅は[`DEFAULT_WINDOW`]で、ストップワード除去は無効です。
    pub const fn new() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            filter_stopwords: false,
        }
    }

    /// 片側の窓幅を設定します
    ///
    /// # 引数
    ///
    /// * `window` - 片側の文脈幅
    pub const fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// ストップワード除去を設定します
    ///
    /// # 引数
    ///
    /// * `yes` - 除去を有効にするかどうか
    pub const fn filter_stopwords(mut self, yes: bool) -> Self {
        self.filter_stopwords = yes;
        self
    }

    fn keep(&self, token: &str) -> bool {
        !self.filter_stopwords || !STOPWORDS.contains(&token)
    }

    /// 文内の1つの出現から素性を抽出します
    ///
    /// 連語素性 `LEFT1=`/`LEFT2=`/`RIGHT1=`/`RIGHT2=` をこの順で、
    /// 続いて窓内の各トークンに対する `WINDOW=` 素性を文内順で
    /// 生成します。対象位置自身と、対象と同じ表層形のトークンは
    /// `WINDOW=` 素性から除外されます。ストップワード除去が有効な
    /// 場合、該当トークンはどの素性にもなりません。
    ///
    /// # 引数
    ///
    /// * `sentence` - トークン化済みの文
    /// * `tok_id` - 対象出現のトークンID
    ///
    /// # 戻り値
    ///
    /// 素性タグ文字列の列
    ///
    /// # エラー
    ///
    /// `tok_id` が文の範囲外の場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn extract(&self, sentence: &[String], tok_id: usize) -> Result<Vec<String>> {
        if tok_id >= sentence.len() {
            return Err(YarowskyError::invalid_argument(
                "tok_id",
                format!(
                    "must be within the sentence: {tok_id} vs {} tokens",
                    sentence.len()
                ),
            ));
        }
        let target = sentence[tok_id].as_str();
        let mut features = vec![];

        let collocations = [
            ("LEFT1", tok_id.checked_sub(1)),
            ("LEFT2", tok_id.checked_sub(2)),
            ("RIGHT1", tok_id.checked_add(1)),
            ("RIGHT2", tok_id.checked_add(2)),
        ];
        for (tag, pos) in collocations {
            let Some(token) = pos.and_then(|p| sentence.get(p)) else {
                continue;
            };
            if self.keep(token) {
                features.push(format!("{tag}={token}"));
            }
        }

        let start = tok_id.saturating_sub(self.window);
        let end = sentence.len().min(tok_id + self.window + 1);
        for (pos, token) in sentence.iter().enumerate().take(end).skip(start) {
            if pos == tok_id || token == target {
                continue;
            }
            if self.keep(token) {
                features.push(format!("WINDOW={token}"));
            }
        }
        Ok(features)
    }

    /// コーパス上の出現位置の列から素性集合を構築します
    ///
    /// インスタンスの順序は与えられた位置の順序そのままであり、
    /// これがインスタンスIDを定めます。
    ///
    /// # 引数
    ///
    /// * `corpus` - 対象のコーパス
    /// * `positions` - `(文書ID, 文ID, トークンID)` の列
    ///
    /// # 戻り値
    ///
    /// 構築された素性集合
    ///
    /// # エラー
    ///
    /// 位置がコーパスの範囲外の場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn feature_set_at(
        &self,
        corpus: &Corpus,
        positions: &[(u32, u32, u32)],
    ) -> Result<FeatureSet> {
        let mut feature_set = FeatureSet::new();
        for &(doc_id, sent_id, tok_id) in positions {
            let sentence = corpus.sentence(doc_id, sent_id).ok_or_else(|| {
                YarowskyError::invalid_argument(
                    "positions",
                    format!("no such sentence in the corpus: ({doc_id}, {sent_id})"),
                )
            })?;
            let features = self.extract(sentence, usize::from_u32(tok_id))?;
            feature_set.push(Instance::new(doc_id, sent_id, tok_id, features));
        }
        Ok(feature_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_collocations_and_window() {
        let sent = sentence(&["muddy", "river", "bank", "near", "town"]);
        let feats = FeatureExtractor::new().extract(&sent, 2).unwrap();

        assert_eq!(
            feats,
            [
                "LEFT1=river",
                "LEFT2=muddy",
                "RIGHT1=near",
                "RIGHT2=town",
                "WINDOW=muddy",
                "WINDOW=river",
                "WINDOW=near",
                "WINDOW=town",
            ]
        );
    }

    #[test]
    fn test_sentence_edges_drop_missing_collocations() {
        let sent = sentence(&["bank", "loan"]);
        let feats = FeatureExtractor::new().extract(&sent, 0).unwrap();
        assert_eq!(feats, ["RIGHT1=loan", "WINDOW=loan"]);
    }

    #[test]
    fn test_stopword_filtering() {
        let sent = sentence(&["the", "bank", "of", "england"]);
        let extractor = FeatureExtractor::new().filter_stopwords(true);
        let feats = extractor.extract(&sent, 1).unwrap();
        assert_eq!(feats, ["RIGHT2=england", "WINDOW=england"]);

        let unfiltered = FeatureExtractor::new().extract(&sent, 1).unwrap();
        assert_eq!(
            unfiltered,
            [
                "LEFT1=the",
                "RIGHT1=of",
                "RIGHT2=england",
                "WINDOW=the",
                "WINDOW=of",
                "WINDOW=england",
            ]
        );
    }

    #[test]
    fn test_target_surface_is_excluded_from_window() {
        let sent = sentence(&["bank", "to", "bank", "transfer"]);
        let feats = FeatureExtractor::new().window(4).extract(&sent, 0).unwrap();
        // The other occurrence of the target appears only as a collocation.
        assert_eq!(
            feats,
            ["RIGHT1=to", "RIGHT2=bank", "WINDOW=to", "WINDOW=transfer"]
        );
    }

    #[test]
    fn test_out_of_range_position_is_an_error() {
        let sent = sentence(&["bank"]);
        assert!(FeatureExtractor::new().extract(&sent, 1).is_err());
    }
}
