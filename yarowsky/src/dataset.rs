//! データセットの読み書きを提供するモジュール
//!
//! このモジュールは、単語ごとの素性集合のテーブルと正解ラベルの
//! テーブル、およびそれらの行指向TSVフォーマットの読み書きを提供します。
//! `(単語, インスタンスID)` の同一性と語義の値は正確にラウンドトリップ
//! します。
//!
//! # フォーマット
//!
//! 素性集合ファイルは1行が1インスタンスを表します。
//!
//! ```text
//! 単語 <TAB> 文書ID <TAB> 文ID <TAB> トークンID <TAB> 素性...
//! ```
//!
//! 素性は空白区切りです。単語内の行の順序がインスタンスIDを定め、
//! 単語の初出順が学習対象の順序を定めます。
//!
//! 正解ラベルファイルは1行が `単語 <TAB> 語義` を表し、素性集合と
//! 同じインスタンス順で並びます。

use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::str::FromStr;

use hashbrown::HashMap;

use crate::errors::{Result, YarowskyError};
use crate::instance::{FeatureSet, Instance, Sense};

/// 単語ごとの素性集合の順序付きテーブル
///
/// 単語の初出順を保持します。この順序がそのまま学習対象の順序として
/// 使用されます。
#[derive(Debug, Clone, Default)]
pub struct FeatureSetTable {
    entries: Vec<(String, FeatureSet)>,
    index: HashMap<String, usize>,
}

impl FeatureSetTable {
    /// 新しい空のテーブルを作成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 単語の素性集合にインスタンスを追加します
    ///
    /// 未登録の単語は末尾に追加されます。
    ///
    /// # 引数
    ///
    /// * `word` - 対象単語
    /// * `instance` - 追加するインスタンス
    pub fn push(&mut self, word: &str, instance: Instance) {
        let pos = self.entry_pos(word);
        self.entries[pos].1.push(instance);
    }

    /// 単語を空の素性集合とともに登録します
    ///
    /// インスタンスが1つも見つからない単語でも学習対象に含めるために
    /// 使用します。既に登録済みの単語には何もしません。
    ///
    /// # 引数
    ///
    /// * `word` - 対象単語
    pub fn declare(&mut self, word: &str) {
        self.entry_pos(word);
    }

    fn entry_pos(&mut self, word: &str) -> usize {
        if let Some(&pos) = self.index.get(word) {
            return pos;
        }
        let pos = self.entries.len();
        self.entries.push((word.to_string(), FeatureSet::new()));
        self.index.insert(word.to_string(), pos);
        pos
    }

    /// 単語の素性集合を返します
    ///
    /// # 引数
    ///
    /// * `word` - 対象単語
    ///
    /// # 戻り値
    ///
    /// 登録されている場合は素性集合への参照
    pub fn get(&self, word: &str) -> Option<&FeatureSet> {
        self.index.get(word).map(|&pos| &self.entries[pos].1)
    }

    /// 登録されている単語数を返します
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// テーブルが空かどうかを返します
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 単語と素性集合のペアを初出順に列挙するイテレータを返します
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureSet)> {
        self.entries.iter().map(|(w, fs)| (w.as_str(), fs))
    }

    /// 単語を初出順に列挙するイテレータを返します
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(w, _)| w.as_str())
    }

    /// 素性集合ファイルを読み込みます
    ///
    /// # 引数
    ///
    /// * `rdr` - 素性集合ファイルのリーダー
    ///
    /// # 戻り値
    ///
    /// 構築されたテーブル
    ///
    /// # エラー
    ///
    /// 行の形式が不正な場合、[`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut result = Self::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            let [word, doc_id, sent_id, tok_id, features] = fields[..] else {
                return Err(YarowskyError::invalid_format(
                    "feature_sets",
                    format!("a line must have five tab-separated fields: {line}"),
                ));
            };
            let features = features.split_whitespace().map(String::from).collect();
            result.push(
                word,
                Instance::new(
                    doc_id.parse()?,
                    sent_id.parse()?,
                    tok_id.parse()?,
                    features,
                ),
            );
        }
        Ok(result)
    }

    /// テーブルを指定されたシンクに書き込みます
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    ///
    /// # 戻り値
    ///
    /// 書き込み成功時は `Ok(())`
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合、I/Oエラーが返されます。
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let mut wtr = BufWriter::new(wtr);
        for (word, feature_set) in self.iter() {
            for (_, instance) in feature_set.iter() {
                writeln!(
                    &mut wtr,
                    "{}\t{}\t{}\t{}\t{}",
                    word,
                    instance.doc_id(),
                    instance.sent_id(),
                    instance.tok_id(),
                    instance.features().join(" "),
                )?;
            }
        }
        Ok(())
    }
}

/// 単語ごとの正解ラベル列の順序付きテーブル
///
/// 各単語のラベル列は、その単語の素性集合とインスタンス順で整列します。
#[derive(Debug, Clone, Default)]
pub struct GoldTable {
    entries: Vec<(String, Vec<Sense>)>,
    index: HashMap<String, usize>,
}

impl GoldTable {
    /// 新しい空のテーブルを作成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 単語のラベル列に正解語義を追加します
    ///
    /// # 引数
    ///
    /// * `word` - 対象単語
    /// * `sense` - 正解語義
    pub fn push(&mut self, word: &str, sense: Sense) {
        let pos = if let Some(&pos) = self.index.get(word) {
            pos
        } else {
            let pos = self.entries.len();
            self.entries.push((word.to_string(), vec![]));
            self.index.insert(word.to_string(), pos);
            pos
        };
        self.entries[pos].1.push(sense);
    }

    /// 単語の正解ラベル列を返します
    ///
    /// # 引数
    ///
    /// * `word` - 対象単語
    ///
    /// # 戻り値
    ///
    /// 登録されている場合はラベル列のスライス
    pub fn get(&self, word: &str) -> Option<&[Sense]> {
        self.index.get(word).map(|&pos| self.entries[pos].1.as_slice())
    }

    /// 登録されている単語数を返します
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// テーブルが空かどうかを返します
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 正解ラベルファイルを読み込みます
    ///
    /// # 引数
    ///
    /// * `rdr` - 正解ラベルファイルのリーダー
    ///
    /// # 戻り値
    ///
    /// 構築されたテーブル
    ///
    /// # エラー
    ///
    /// 行の形式が不正な場合、[`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut result = Self::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let mut spl = line.split('\t');
            let word = spl.next();
            let sense = spl.next();
            let rest = spl.next();
            let (Some(word), Some(sense), None) = (word, sense, rest) else {
                return Err(YarowskyError::invalid_format(
                    "gold_labels",
                    format!("a line must have two tab-separated fields: {line}"),
                ));
            };
            result.push(word, Sense::from_str(sense)?);
        }
        Ok(result)
    }

    /// テーブルを指定されたシンクに書き込みます
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    ///
    /// # 戻り値
    ///
    /// 書き込み成功時は `Ok(())`
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合、I/Oエラーが返されます。
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let mut wtr = BufWriter::new(wtr);
        for (word, senses) in &self.entries {
            for sense in senses {
                writeln!(&mut wtr, "{word}\t{sense}")?;
            }
        }
        Ok(())
    }
}
