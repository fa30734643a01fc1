//! 合成擬似単語コーパスの生成を提供するモジュール
//!
//! このモジュールは、2つの実在単語を1つの擬似単語（例: `car` と
//! `speech` から `carspeech`）に置き換えることで、正解語義が既知の
//! 評価用データセットを生成します。第1の元単語の出現が第1語義、
//! 第2の元単語の出現が第2語義になります。
//!
//! 素性はコーパスの置換**後**に抽出されます。これにより、文脈窓に
//! 現れる他の出現も擬似単語として観測され、実際の曖昧性解消と同じ
//! 条件になります。

use hashbrown::HashMap;

use crate::corpus::Corpus;
use crate::dataset::{FeatureSetTable, GoldTable};
use crate::errors::{Result, YarowskyError};
use crate::features::FeatureExtractor;
use crate::instance::{Instance, Sense};

/// 1つの擬似単語の定義
///
/// 擬似単語と、その2つの語義に対応する元単語を保持します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudowordSpec {
    pseudoword: String,
    source1: String,
    source2: String,
}

impl PseudowordSpec {
    /// 新しい定義を作成します
    ///
    /// # 引数
    ///
    /// * `pseudoword` - 擬似単語
    /// * `source1` - 第1語義に対応する元単語
    /// * `source2` - 第2語義に対応する元単語
    ///
    /// # 戻り値
    ///
    /// 作成された定義
    ///
    /// # エラー
    ///
    /// 2つの元単語が同一の場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn new(pseudoword: &str, source1: &str, source2: &str) -> Result<Self> {
        if source1 == source2 {
            return Err(YarowskyError::invalid_argument(
                "source2",
                format!("the two source words must differ, but both are '{source1}'"),
            ));
        }
        Ok(Self {
            pseudoword: pseudoword.to_string(),
            source1: source1.to_string(),
            source2: source2.to_string(),
        })
    }

    /// 擬似単語を返します
    pub fn pseudoword(&self) -> &str {
        &self.pseudoword
    }

    /// 指定された語義に対応する元単語を返します
    pub fn source(&self, sense: Sense) -> &str {
        match sense {
            Sense::One => &self.source1,
            Sense::Two => &self.source2,
        }
    }
}

/// 擬似単語定義の順序付きテーブル
///
/// 定義の記述順が、生成されるデータセット内の学習対象の順序に
/// なります。
#[derive(Debug, Clone, Default)]
pub struct PseudowordTable {
    specs: Vec<PseudowordSpec>,
    // source word -> (spec position, sense)
    by_source: HashMap<String, (usize, Sense)>,
}

impl PseudowordTable {
    /// 新しい空のテーブルを作成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 定義を末尾に追加します
    ///
    /// # 引数
    ///
    /// * `spec` - 擬似単語の定義
    ///
    /// # 戻り値
    ///
    /// 追加成功時は `Ok(())`
    ///
    /// # エラー
    ///
    /// 元単語が他の定義と重複する場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn push(&mut self, spec: PseudowordSpec) -> Result<()> {
        let pos = self.specs.len();
        for sense in [Sense::One, Sense::Two] {
            let source = spec.source(sense);
            if self.by_source.contains_key(source) {
                return Err(YarowskyError::invalid_argument(
                    "spec",
                    format!("the source word '{source}' is used by more than one pseudoword"),
                ));
            }
            self.by_source.insert(source.to_string(), (pos, sense));
        }
        self.specs.push(spec);
        Ok(())
    }

    /// 定義のスライスを記述順に返します
    pub fn specs(&self) -> &[PseudowordSpec] {
        &self.specs
    }

    /// 定義数を返します
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// テーブルが空かどうかを返します
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// 擬似単語定義ファイルを読み込みます
    ///
    /// 1行が `擬似単語 <TAB> 元単語1 <TAB> 元単語2` を表します。
    /// 空行は無視されます。
    ///
    /// # 引数
    ///
    /// * `rdr` - 定義ファイルのリーダー
    ///
    /// # 戻り値
    ///
    /// 構築されたテーブル
    ///
    /// # エラー
    ///
    /// 行の形式が不正な場合、または元単語が重複する場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: std::io::Read,
    {
        use std::io::BufRead;

        let reader = std::io::BufReader::new(rdr);
        let mut result = Self::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut spl = line.split('\t');
            let pseudoword = spl.next();
            let source1 = spl.next();
            let source2 = spl.next();
            let rest = spl.next();
            let (Some(pseudoword), Some(source1), Some(source2), None) =
                (pseudoword, source1, source2, rest)
            else {
                return Err(YarowskyError::invalid_format(
                    "pseudowords",
                    format!("a line must have three tab-separated fields: {line}"),
                ));
            };
            result.push(PseudowordSpec::new(pseudoword, source1, source2)?)?;
        }
        Ok(result)
    }
}

/// 生成された合成データセット
///
/// 擬似単語ごとの素性集合と、それに整列した正解ラベルを保持します。
#[derive(Debug, Clone, Default)]
pub struct SyntheticDataset {
    feature_sets: FeatureSetTable,
    gold: GoldTable,
}

impl SyntheticDataset {
    /// 素性集合のテーブルを返します
    pub fn feature_sets(&self) -> &FeatureSetTable {
        &self.feature_sets
    }

    /// 正解ラベルのテーブルを返します
    pub fn gold(&self) -> &GoldTable {
        &self.gold
    }

    /// 2つのテーブルに分解します
    pub fn into_parts(self) -> (FeatureSetTable, GoldTable) {
        (self.feature_sets, self.gold)
    }
}

/// コーパスから合成データセットを生成します
///
/// コーパスを複製し、各元単語の出現をその擬似単語で置き換えた後、
/// 置換後のコーパスから素性を抽出します。インスタンスはコーパス順に
/// 並ぶため、生成結果は決定的です。定義されたすべての擬似単語は、
/// 出現が1件もなくてもデータセットの学習対象に含まれます。
///
/// # 引数
///
/// * `corpus` - 元のコーパス（変更されません）
/// * `pseudowords` - 擬似単語定義のテーブル
/// * `extractor` - 素性抽出器
///
/// # 戻り値
///
/// 生成されたデータセット
///
/// # エラー
///
/// 位置が `u32` で表現できない場合、
/// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
pub fn generate(
    corpus: &Corpus,
    pseudowords: &PseudowordTable,
    extractor: &FeatureExtractor,
) -> Result<SyntheticDataset> {
    let mut docs = corpus.docs().to_vec();
    let mut occurrences = vec![];

    for (doc_id, doc) in docs.iter_mut().enumerate() {
        let doc_id = u32::try_from(doc_id)?;
        for (sent_id, sent) in doc.iter_mut().enumerate() {
            let sent_id = u32::try_from(sent_id)?;
            for (tok_id, token) in sent.iter_mut().enumerate() {
                let Some(&(pos, sense)) = pseudowords.by_source.get(token.as_str()) else {
                    continue;
                };
                let tok_id = u32::try_from(tok_id)?;
                *token = pseudowords.specs[pos].pseudoword().to_string();
                occurrences.push((doc_id, sent_id, tok_id, pos, sense));
            }
        }
    }
    let replaced = Corpus::from_docs(docs);

    let mut dataset = SyntheticDataset::default();
    for spec in pseudowords.specs() {
        dataset.feature_sets.declare(spec.pseudoword());
    }
    for (doc_id, sent_id, tok_id, pos, sense) in occurrences {
        let word = pseudowords.specs[pos].pseudoword();
        // The sentence is known to exist: the position was just visited.
        let sentence = replaced.sentence(doc_id, sent_id).ok_or_else(|| {
            YarowskyError::invalid_argument("corpus", "a replaced sentence disappeared")
        })?;
        let features = extractor.extract(sentence, usize::try_from(tok_id)?)?;
        dataset
            .feature_sets
            .push(word, Instance::new(doc_id, sent_id, tok_id, features));
        dataset.gold.push(word, sense);
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;

    fn toy_corpus() -> Corpus {
        let to_doc = |sents: &[&[&str]]| -> Document {
            sents
                .iter()
                .map(|s| s.iter().map(|t| t.to_string()).collect())
                .collect()
        };
        Corpus::from_docs(vec![
            to_doc(&[
                &["he", "parked", "the", "car", "outside"],
                &["the", "car", "engine", "stalled"],
            ]),
            to_doc(&[&["her", "speech", "won", "the", "debate"]]),
        ])
    }

    fn pseudowords() -> PseudowordTable {
        PseudowordTable::from_reader("carspeech\tcar\tspeech\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_sources_are_replaced_and_gold_aligned() {
        let extractor = FeatureExtractor::new().window(4).filter_stopwords(true);
        let dataset = generate(&toy_corpus(), &pseudowords(), &extractor).unwrap();

        let fs = dataset.feature_sets().get("carspeech").unwrap();
        assert_eq!(fs.len(), 3);
        assert_eq!(dataset.gold().get("carspeech").unwrap().len(), 3);

        // Corpus order: two "car" occurrences, then the "speech" one.
        assert_eq!(
            dataset.gold().get("carspeech").unwrap(),
            [Sense::One, Sense::One, Sense::Two]
        );

        // Features come from the replaced corpus, so the original surface
        // never appears in them.
        for (_, instance) in fs.iter() {
            for feature in instance.features() {
                assert!(!feature.ends_with("=car"));
                assert!(!feature.ends_with("=speech"));
            }
        }
        assert!(fs
            .get(0)
            .unwrap()
            .features()
            .contains(&"LEFT2=parked".to_string()));
    }

    #[test]
    fn test_pseudoword_without_occurrences_is_declared() {
        let mut table = pseudowords();
        table
            .push(PseudowordSpec::new("hotelwar", "hotel", "war").unwrap())
            .unwrap();

        let extractor = FeatureExtractor::new();
        let dataset = generate(&toy_corpus(), &table, &extractor).unwrap();

        let words: Vec<&str> = dataset.feature_sets().words().collect();
        assert_eq!(words, vec!["carspeech", "hotelwar"]);
        assert!(dataset.feature_sets().get("hotelwar").unwrap().is_empty());
        assert!(dataset.gold().get("hotelwar").is_none());
    }

    #[test]
    fn test_duplicate_source_words_are_rejected() {
        let mut table = pseudowords();
        let err = table.push(PseudowordSpec::new("carwar", "car", "war").unwrap());
        assert!(err.is_err());

        assert!(PseudowordSpec::new("carcar", "car", "car").is_err());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let extractor = FeatureExtractor::new().window(4).filter_stopwords(true);
        let a = generate(&toy_corpus(), &pseudowords(), &extractor).unwrap();
        let b = generate(&toy_corpus(), &pseudowords(), &extractor).unwrap();

        let mut out_a = vec![];
        let mut out_b = vec![];
        a.feature_sets().write(&mut out_a).unwrap();
        b.feature_sets().write(&mut out_b).unwrap();
        assert_eq!(out_a, out_b);
    }
}
