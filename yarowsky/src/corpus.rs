//! コーパスの内部表現と取り込みを提供するモジュール
//!
//! このモジュールは、文書・文・トークンの3階層からなるトークン化済み
//! コーパスと、生のSGML風テキストからの構築、およびトークンから
//! 出現位置への索引を提供します。
//!
//! 取り込みでは `<TEXT ...>...</TEXT>` ブロックを1文書として抽出し、
//! 残存タグの除去と空白の正規化を行った後、文末記号で文に分割し、
//! 英字の連続を小文字化してトークンとします。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hashbrown::HashMap;
use regex::Regex;

use crate::errors::Result;
use crate::utils::FromU32;

/// トークン化済みの1文
pub type TokenizedSentence = Vec<String>;

/// 文の列からなる1文書
pub type Document = Vec<TokenizedSentence>;

/// トークン化済みコーパス
///
/// 文書の列を保持します。位置は `(文書ID, 文ID, トークンID)` の
/// 3つ組で表されます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    docs: Vec<Document>,
}

impl Corpus {
    /// 新しい空のコーパスを作成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 文書の列からコーパスを作成します
    ///
    /// # 引数
    ///
    /// * `docs` - 文書の列
    pub fn from_docs(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    /// 文書を末尾に追加します
    pub fn push_doc(&mut self, doc: Document) {
        self.docs.push(doc);
    }

    /// 文書数を返します
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// コーパスが空かどうかを返します
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// 文書のスライスを返します
    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    /// 指定された位置の文を返します
    ///
    /// # 引数
    ///
    /// * `doc_id` - 文書ID
    /// * `sent_id` - 文ID
    ///
    /// # 戻り値
    ///
    /// 存在する場合は文への参照
    pub fn sentence(&self, doc_id: u32, sent_id: u32) -> Option<&[String]> {
        self.docs
            .get(usize::from_u32(doc_id))?
            .get(usize::from_u32(sent_id))
            .map(Vec::as_slice)
    }

    /// 指定された位置の前後の文脈トークンを返します
    ///
    /// # 引数
    ///
    /// * `doc_id` - 文書ID
    /// * `sent_id` - 文ID
    /// * `tok_id` - トークンID
    /// * `window` - 片側の文脈幅
    ///
    /// # 戻り値
    ///
    /// 存在する場合は `(左文脈, 右文脈)` のスライスのペア
    pub fn context(
        &self,
        doc_id: u32,
        sent_id: u32,
        tok_id: usize,
        window: usize,
    ) -> Option<(&[String], &[String])> {
        let sentence = self.sentence(doc_id, sent_id)?;
        if tok_id >= sentence.len() {
            return None;
        }
        let start = tok_id.saturating_sub(window);
        let end = sentence.len().min(tok_id + window + 1);
        Some((&sentence[start..tok_id], &sentence[tok_id + 1..end]))
    }
}

/// 生テキストからのコーパスリーダー
///
/// 取り込みに使用する正規表現をコンパイル済みの状態で保持します。
pub struct CorpusReader {
    text_block: Regex,
    tag: Regex,
    spaces: Regex,
    sentence_end: Regex,
    token: Regex,
}

impl CorpusReader {
    /// 新しいリーダーを作成します
    ///
    /// # 戻り値
    ///
    /// 作成されたリーダー
    ///
    /// # エラー
    ///
    /// 正規表現のコンパイルに失敗した場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn new() -> Result<Self> {
        Ok(Self {
            text_block: Regex::new(r"(?is)<TEXT[^>]*>(.*?)</TEXT>")?,
            tag: Regex::new(r"<[^>]*>")?,
            spaces: Regex::new(r"\s+")?,
            sentence_end: Regex::new(r"[.!?]\s+")?,
            token: Regex::new(r"[a-zA-Z]+")?,
        })
    }

    /// 生テキストを読み込み、新しいコーパスを構築します
    ///
    /// # 引数
    ///
    /// * `rdr` - 生テキストのリーダー
    ///
    /// # 戻り値
    ///
    /// 構築されたコーパス
    ///
    /// # エラー
    ///
    /// 読み込みに失敗した場合、I/Oエラーが返されます。
    pub fn read<R>(&self, rdr: R) -> Result<Corpus>
    where
        R: Read,
    {
        let mut corpus = Corpus::new();
        self.append(rdr, &mut corpus)?;
        Ok(corpus)
    }

    /// 生テキストを読み込み、既存のコーパスに文書を追加します
    ///
    /// 非UTF-8のバイト列は損失を許容してデコードされます。
    ///
    /// # 引数
    ///
    /// * `rdr` - 生テキストのリーダー
    /// * `corpus` - 追加先のコーパス
    ///
    /// # 戻り値
    ///
    /// 追加成功時は `Ok(())`
    ///
    /// # エラー
    ///
    /// 読み込みに失敗した場合、I/Oエラーが返されます。
    pub fn append<R>(&self, mut rdr: R, corpus: &mut Corpus) -> Result<()>
    where
        R: Read,
    {
        let mut bytes = vec![];
        rdr.read_to_end(&mut bytes)?;
        let raw = String::from_utf8_lossy(&bytes);
        self.append_raw(&raw, corpus);
        Ok(())
    }

    /// ディレクトリ内の全ファイルを読み込み、コーパスを構築します
    ///
    /// 結果を決定的にするため、ファイルはパスの辞書順で処理されます。
    ///
    /// # 引数
    ///
    /// * `dir` - コーパスファイルのディレクトリ
    ///
    /// # 戻り値
    ///
    /// 構築されたコーパス
    ///
    /// # エラー
    ///
    /// ディレクトリまたはファイルの読み込みに失敗した場合、
    /// I/Oエラーが返されます。
    pub fn read_dir<P>(&self, dir: P) -> Result<Corpus>
    where
        P: AsRef<Path>,
    {
        let mut paths = vec![];
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut corpus = Corpus::new();
        for path in paths {
            self.append(File::open(path)?, &mut corpus)?;
        }
        Ok(corpus)
    }

    fn append_raw(&self, raw: &str, corpus: &mut Corpus) {
        for capture in self.text_block.captures_iter(raw) {
            let block = &capture[1];
            let cleaned = self.tag.replace_all(block, " ");
            let cleaned = cleaned.replace('|', " ");
            let cleaned = self.spaces.replace_all(&cleaned, " ");

            let mut doc = Document::new();
            for sent in self.sentence_end.split(cleaned.trim()) {
                let tokens: TokenizedSentence = self
                    .token
                    .find_iter(sent)
                    .map(|m| m.as_str().to_lowercase())
                    .collect();
                if !tokens.is_empty() {
                    doc.push(tokens);
                }
            }
            if !doc.is_empty() {
                corpus.push_doc(doc);
            }
        }
    }
}

/// トークンから出現位置への索引
///
/// 各トークンの `(文書ID, 文ID, トークンID)` の列をコーパス順で
/// 保持します。
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    index: HashMap<String, Vec<(u32, u32, u32)>>,
}

impl TokenIndex {
    /// コーパスから索引を構築します
    ///
    /// # 引数
    ///
    /// * `corpus` - 対象のコーパス
    ///
    /// # 戻り値
    ///
    /// 構築された索引
    ///
    /// # エラー
    ///
    /// 位置が `u32` で表現できない場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn build(corpus: &Corpus) -> Result<Self> {
        let mut index: HashMap<String, Vec<(u32, u32, u32)>> = HashMap::new();
        for (doc_id, doc) in corpus.docs().iter().enumerate() {
            let doc_id = u32::try_from(doc_id)?;
            for (sent_id, sent) in doc.iter().enumerate() {
                let sent_id = u32::try_from(sent_id)?;
                for (tok_id, token) in sent.iter().enumerate() {
                    let tok_id = u32::try_from(tok_id)?;
                    index
                        .entry_ref(token.as_str())
                        .or_default()
                        .push((doc_id, sent_id, tok_id));
                }
            }
        }
        Ok(Self { index })
    }

    /// トークンの出現位置の列を返します
    ///
    /// # 引数
    ///
    /// * `token` - 対象トークン
    ///
    /// # 戻り値
    ///
    /// 出現位置のスライス（未出現のトークンは空）
    pub fn positions(&self, token: &str) -> &[(u32, u32, u32)] {
        self.index.get(token).map_or(&[], Vec::as_slice)
    }

    /// トークンの出現回数を返します
    pub fn count(&self, token: &str) -> usize {
        self.positions(token).len()
    }

    /// 索引に含まれる異なりトークン数を返します
    pub fn num_tokens(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "\
<DOC>
<TEXT>
The river bank was muddy. Fish swam by!
</TEXT>
<TEXT par=\"2\">
The bank <b>issued</b> a loan | of millions. Done?
</TEXT>
</DOC>
";

    #[test]
    fn test_text_blocks_become_documents() {
        let reader = CorpusReader::new().unwrap();
        let corpus = reader.read(RAW.as_bytes()).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(
            corpus.sentence(0, 0).unwrap(),
            ["the", "river", "bank", "was", "muddy"]
        );
        assert_eq!(corpus.sentence(0, 1).unwrap(), ["fish", "swam", "by"]);
        // Tags and pipes are stripped before tokenization.
        assert_eq!(
            corpus.sentence(1, 0).unwrap(),
            ["the", "bank", "issued", "a", "loan", "of", "millions"]
        );
        assert_eq!(corpus.sentence(1, 1).unwrap(), ["done"]);
        assert_eq!(corpus.sentence(2, 0), None);
    }

    #[test]
    fn test_context_window_is_clamped_at_sentence_bounds() {
        let reader = CorpusReader::new().unwrap();
        let corpus = reader.read(RAW.as_bytes()).unwrap();

        let (left, right) = corpus.context(0, 0, 2, 2).unwrap();
        assert_eq!(left, ["the", "river"]);
        assert_eq!(right, ["was", "muddy"]);

        let (left, right) = corpus.context(0, 0, 0, 2).unwrap();
        assert!(left.is_empty());
        assert_eq!(right, ["river", "bank"]);

        assert!(corpus.context(0, 0, 99, 2).is_none());
    }

    #[test]
    fn test_token_index_positions_are_in_corpus_order() {
        let reader = CorpusReader::new().unwrap();
        let corpus = reader.read(RAW.as_bytes()).unwrap();
        let index = TokenIndex::build(&corpus).unwrap();

        assert_eq!(index.positions("bank"), [(0, 0, 2), (1, 0, 1)]);
        assert_eq!(index.count("the"), 2);
        assert_eq!(index.count("missing"), 0);
        assert!(index.num_tokens() > 0);
    }
}
