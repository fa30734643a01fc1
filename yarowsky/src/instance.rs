//! 対象単語の出現とその文脈素性の内部表現を提供するモジュール
//!
//! このモジュールは、曖昧な単語の1つの出現（インスタンス）と、
//! 1つの単語に属する出現の列（素性集合）を表すデータ構造を提供します。
//! 素性集合内の位置がそのままインスタンスIDとして学習全体で使用されます。

use std::fmt;
use std::str::FromStr;

use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::YarowskyError;

/// 語義ラベル
///
/// このライブラリでは語義は常に2つであり、第3の語義は扱いません。
/// 文字列表現は `"1"` と `"2"` です。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Archive, Serialize, Deserialize,
)]
pub enum Sense {
    /// 第1語義
    One,
    /// 第2語義
    Two,
}

impl Sense {
    /// 語義IDを数値として返します
    ///
    /// # 戻り値
    ///
    /// `1` または `2`
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl FromStr for Sense {
    type Err = YarowskyError;

    /// 文字列から語義をパースします
    ///
    /// # 引数
    ///
    /// * `s` - パース対象の文字列（`"1"` または `"2"`）
    ///
    /// # 戻り値
    ///
    /// パースに成功した場合は対応する語義
    ///
    /// # エラー
    ///
    /// `"1"`/`"2"` 以外の文字列が与えられた場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::One),
            "2" => Ok(Self::Two),
            _ => Err(YarowskyError::invalid_argument(
                "sense",
                format!("a sense id must be 1 or 2, but got {s}"),
            )),
        }
    }
}

/// 対象単語の1つの出現の表現
///
/// コーパス上の位置（文書ID・文ID・トークンID）と、
/// その出現の文脈から抽出された素性タグ文字列の列を保持します。
/// 素性の順序は抽出時の挿入順であり、表示目的でのみ意味を持ちます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    doc_id: u32,
    sent_id: u32,
    tok_id: u32,
    features: Vec<String>,
}

impl Instance {
    /// 新しいインスタンスを作成します
    ///
    /// # 引数
    ///
    /// * `doc_id` - 文書ID
    /// * `sent_id` - 文書内の文ID
    /// * `tok_id` - 文内のトークンID
    /// * `features` - 素性タグ文字列の列
    ///
    /// # 戻り値
    ///
    /// 作成されたインスタンス
    pub fn new(doc_id: u32, sent_id: u32, tok_id: u32, features: Vec<String>) -> Self {
        Self {
            doc_id,
            sent_id,
            tok_id,
            features,
        }
    }

    /// 文書IDを返します
    pub fn doc_id(&self) -> u32 {
        self.doc_id
    }

    /// 文IDを返します
    pub fn sent_id(&self) -> u32 {
        self.sent_id
    }

    /// トークンIDを返します
    pub fn tok_id(&self) -> u32 {
        self.tok_id
    }

    /// 素性タグ文字列のスライスを返します
    pub fn features(&self) -> &[String] {
        &self.features
    }
}

/// 1つの単語に属するインスタンスの列
///
/// 列内の位置がそのままインスタンスIDになります。
/// 素性抽出の完了後は変更されません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    instances: Vec<Instance>,
}

impl FeatureSet {
    /// 新しい空の素性集合を作成します
    pub fn new() -> Self {
        Self::default()
    }

    /// インスタンスを末尾に追加します
    ///
    /// 追加された位置が、そのインスタンスのIDになります。
    ///
    /// # 引数
    ///
    /// * `instance` - 追加するインスタンス
    pub fn push(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    /// インスタンス数を返します
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// 素性集合が空かどうかを返します
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// 指定されたIDのインスタンスを返します
    ///
    /// # 引数
    ///
    /// * `instance_id` - インスタンスID
    ///
    /// # 戻り値
    ///
    /// 存在する場合はインスタンスへの参照
    pub fn get(&self, instance_id: usize) -> Option<&Instance> {
        self.instances.get(instance_id)
    }

    /// インスタンスIDとインスタンスのペアを列挙するイテレータを返します
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Instance)> {
        self.instances.iter().enumerate()
    }
}

/// インスタンスIDから語義への疎な対応
///
/// ブートストラップ中に単調に増加し、エントリが削除されることはありません。
/// キーの不在は「未決定」を意味します。
pub type LabelMap = hashbrown::HashMap<usize, Sense>;

/// 素性集合と添字単位で整列した予測列
///
/// 各要素は語義、または「判定なし」を表す `None` です。
pub type PredictionVector = Vec<Option<Sense>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sense_roundtrip() {
        assert_eq!("1".parse::<Sense>().unwrap(), Sense::One);
        assert_eq!("2".parse::<Sense>().unwrap(), Sense::Two);
        assert_eq!(Sense::One.to_string(), "1");
        assert_eq!(Sense::Two.to_string(), "2");
        assert!("3".parse::<Sense>().is_err());
        assert!("".parse::<Sense>().is_err());
    }

    #[test]
    fn test_feature_set_ids_are_positions() {
        let mut fs = FeatureSet::new();
        fs.push(Instance::new(0, 0, 3, vec!["LEFT1=river".to_string()]));
        fs.push(Instance::new(1, 2, 0, vec!["RIGHT1=loan".to_string()]));

        assert_eq!(fs.len(), 2);
        assert_eq!(fs.get(0).unwrap().tok_id(), 3);
        assert_eq!(fs.get(1).unwrap().doc_id(), 1);
        assert!(fs.get(2).is_none());

        let ids: Vec<usize> = fs.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
