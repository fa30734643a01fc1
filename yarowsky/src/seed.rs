//! シードルールの定義と初期ラベリングを提供するモジュール
//!
//! このモジュールは、手書きのキーワードヒューリスティクスによる
//! 初期の疎なラベリングを実装します。キーワードは素性文字列の
//! **部分文字列**として照合されます。これは意図的に粗い発火方針であり、
//! ブートストラップを素早く始動させるため過剰包含を許容します。
//!
//! 語義の検査順序は設定データの記述順そのものです。暗黙の反復順序に
//! 依存する非決定性を避けるため、順序は明示的に保持されます。

use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

use crate::errors::{Result, YarowskyError};
use crate::instance::{FeatureSet, LabelMap, Sense};

/// 1つの単語に対するシードルールの集合
///
/// 語義とキーワード列のペアを優先順に保持します。
/// 各インスタンスに対して語義を先頭から検査し、最初にキーワードが
/// 一致した語義が採用されます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedRuleSet {
    // Priority order: senses are tested front to back.
    entries: Vec<(Sense, Vec<String>)>,
}

impl SeedRuleSet {
    /// 新しい空のルール集合を作成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 語義とそのキーワード列を優先順の末尾に追加します
    ///
    /// # 引数
    ///
    /// * `sense` - 語義
    /// * `keywords` - キーワードの列（記述順を保持）
    ///
    /// # 戻り値
    ///
    /// 追加成功時は `Ok(())`
    ///
    /// # エラー
    ///
    /// 同じ語義が既に登録されている場合、またはキーワードが空の場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn push_sense(&mut self, sense: Sense, keywords: Vec<String>) -> Result<()> {
        if keywords.is_empty() {
            return Err(YarowskyError::invalid_argument(
                "keywords",
                format!("sense {sense} must have at least one keyword"),
            ));
        }
        if self.entries.iter().any(|(s, _)| *s == sense) {
            return Err(YarowskyError::invalid_argument(
                "sense",
                format!("sense {sense} is already registered"),
            ));
        }
        self.entries.push((sense, keywords));
        Ok(())
    }

    /// 語義とキーワード列のペアを優先順に列挙するイテレータを返します
    pub fn iter(&self) -> impl Iterator<Item = (Sense, &[String])> {
        self.entries.iter().map(|(s, kws)| (*s, kws.as_slice()))
    }

    /// 素性集合に対して初期の疎なラベリングを行います
    ///
    /// 各インスタンスについて語義を優先順に検査し、語義内のキーワードを
    /// 記述順に検査します。キーワードがインスタンスのいずれかの素性文字列の
    /// 部分文字列として出現すれば一致とみなし、最初に一致した語義で
    /// そのインスタンスのラベルを確定します。以降の語義は検査しません。
    ///
    /// この関数は入力の純粋関数であり、副作用はありません。
    ///
    /// # 引数
    ///
    /// * `feature_set` - 対象単語の素性集合
    ///
    /// # 戻り値
    ///
    /// 一致したインスタンスのみを含む疎なラベル対応
    pub fn label(&self, feature_set: &FeatureSet) -> LabelMap {
        let mut labels = LabelMap::new();
        for (instance_id, instance) in feature_set.iter() {
            'senses: for (sense, keywords) in &self.entries {
                for keyword in keywords {
                    let hit = instance
                        .features()
                        .iter()
                        .any(|f| f.contains(keyword.as_str()));
                    if hit {
                        labels.insert(instance_id, *sense);
                        break 'senses;
                    }
                }
            }
        }
        labels
    }
}

/// 単語からシードルール集合への対応
///
/// モジュールレベルの大域テーブルは持たず、学習のエントリポイントに
/// 明示的に渡される設定データです。
#[derive(Debug, Clone, Default)]
pub struct SeedRuleTable {
    table: hashbrown::HashMap<String, SeedRuleSet>,
}

impl SeedRuleTable {
    /// 新しい空のテーブルを作成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 単語に対するルール集合を登録します
    ///
    /// # 引数
    ///
    /// * `word` - 対象単語
    /// * `rules` - シードルール集合
    ///
    /// # 戻り値
    ///
    /// 登録成功時は `Ok(())`
    ///
    /// # エラー
    ///
    /// 同じ単語が既に登録されている場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn insert(&mut self, word: &str, rules: SeedRuleSet) -> Result<()> {
        if self.table.contains_key(word) {
            return Err(YarowskyError::invalid_argument(
                "word",
                format!("seed rules for '{word}' are already registered"),
            ));
        }
        self.table.insert(word.to_string(), rules);
        Ok(())
    }

    /// 単語に対するルール集合を返します
    ///
    /// # 引数
    ///
    /// * `word` - 対象単語
    ///
    /// # 戻り値
    ///
    /// ルール集合への参照
    ///
    /// # エラー
    ///
    /// 単語が未登録の場合、[`YarowskyError::MissingSeedRule`]が返されます。
    /// 空のルール集合として黙って扱うことはありません。
    pub fn get(&self, word: &str) -> Result<&SeedRuleSet> {
        self.table
            .get(word)
            .ok_or_else(|| YarowskyError::MissingSeedRule(word.to_string()))
    }

    /// 登録されている単語数を返します
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// テーブルが空かどうかを返します
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// シードルール設定ファイルを読み込みます
    ///
    /// 1行が `単語 <TAB> 語義 <TAB> キーワード...` を表し、キーワードは
    /// 空白区切りです。同じ単語の行の出現順が、その単語の語義の優先順に
    /// なります。空行は無視されます。
    ///
    /// # 引数
    ///
    /// * `rdr` - 設定ファイルのリーダー
    ///
    /// # 戻り値
    ///
    /// 構築されたテーブル
    ///
    /// # エラー
    ///
    /// 行の形式が不正な場合、または同じ単語に同じ語義が重複して
    /// 記述されている場合、[`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut result = Self::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let mut spl = line.split('\t');
            let word = spl.next();
            let sense = spl.next();
            let keywords = spl.next();
            let rest = spl.next();
            let (Some(word), Some(sense), Some(keywords), None) = (word, sense, keywords, rest)
            else {
                return Err(YarowskyError::invalid_format(
                    "seed_rules",
                    format!("a line must have three tab-separated fields: {line}"),
                ));
            };

            let sense = Sense::from_str(sense)?;
            let keywords: Vec<String> = keywords.split_whitespace().map(String::from).collect();

            let rules = result.table.entry_ref(word).or_default();
            rules.push_sense(sense, keywords)?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;

    fn bank_rules() -> SeedRuleSet {
        let mut rules = SeedRuleSet::new();
        rules
            .push_sense(Sense::One, vec!["river".to_string()])
            .unwrap();
        rules
            .push_sense(Sense::Two, vec!["loan".to_string()])
            .unwrap();
        rules
    }

    #[test]
    fn test_seed_labeling_by_substring() {
        let mut fs = FeatureSet::new();
        fs.push(Instance::new(
            0,
            0,
            0,
            vec!["LEFT1=river".to_string(), "WINDOW=fish".to_string()],
        ));
        fs.push(Instance::new(0, 1, 0, vec!["RIGHT1=loan".to_string()]));
        fs.push(Instance::new(1, 0, 0, vec!["WINDOW=table".to_string()]));

        let labels = bank_rules().label(&fs);

        assert_eq!(labels.get(&0), Some(&Sense::One));
        assert_eq!(labels.get(&1), Some(&Sense::Two));
        assert_eq!(labels.get(&2), None);
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_seed_priority_order_wins() {
        // Both senses trigger on this instance; the first registered sense
        // must win regardless of keyword strength.
        let mut fs = FeatureSet::new();
        fs.push(Instance::new(
            0,
            0,
            0,
            vec!["WINDOW=river".to_string(), "WINDOW=loan".to_string()],
        ));

        let labels = bank_rules().label(&fs);
        assert_eq!(labels.get(&0), Some(&Sense::One));

        let mut reversed = SeedRuleSet::new();
        reversed
            .push_sense(Sense::Two, vec!["loan".to_string()])
            .unwrap();
        reversed
            .push_sense(Sense::One, vec!["river".to_string()])
            .unwrap();
        let labels = reversed.label(&fs);
        assert_eq!(labels.get(&0), Some(&Sense::Two));
    }

    #[test]
    fn test_missing_seed_rule_is_an_error() {
        let mut table = SeedRuleTable::new();
        table.insert("bank", bank_rules()).unwrap();

        assert!(table.get("bank").is_ok());
        assert!(matches!(
            table.get("plant"),
            Err(YarowskyError::MissingSeedRule(w)) if w == "plant"
        ));
    }

    #[test]
    fn test_from_reader_keeps_line_order_as_priority() {
        let config = "\
bank\t2\tloan deposit
bank\t1\triver shore
plant\t1\tchemical factory
plant\t2\tsoil roots
";
        let table = SeedRuleTable::from_reader(config.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);

        let bank: Vec<Sense> = table.get("bank").unwrap().iter().map(|(s, _)| s).collect();
        assert_eq!(bank, vec![Sense::Two, Sense::One]);

        let (_, kws) = table.get("plant").unwrap().iter().next().unwrap();
        assert_eq!(kws, ["chemical".to_string(), "factory".to_string()]);
    }

    #[test]
    fn test_from_reader_rejects_duplicate_sense() {
        let config = "bank\t1\tloan\nbank\t1\triver\n";
        assert!(SeedRuleTable::from_reader(config.as_bytes()).is_err());
    }
}
