//! 学習済みモデルの管理と永続化を提供するモジュール
//!
//! このモジュールは、単語ごとの学習結果（ラベル対応と決定リスト）の
//! コレクションと、そのrkyvフォーマットでの読み書きを提供します。
//! ラベルはインスタンスID順にソートされた列として格納されるため、
//! 同一のモデルは常に同一のバイト列に直列化されます。

use std::io::{Read, Write};

use rkyv::{from_bytes, to_bytes, Archive, Deserialize, Serialize};

use crate::decision_list::DecisionList;
use crate::errors::Result;
use crate::instance::{LabelMap, Sense};
use crate::trainer::{Convergence, WordModel};
use crate::utils::FromU32;

/// 1単語分の学習済みエントリ
///
/// ラベル対応はインスタンスID昇順の列として保持されます。
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct WordEntry {
    word: String,
    labels: Vec<(u32, Sense)>,
    decision_list: DecisionList,
    convergence: Convergence,
}

impl WordEntry {
    /// 対象単語を返します
    pub fn word(&self) -> &str {
        &self.word
    }

    /// ラベルをインスタンスID昇順の列として返します
    pub fn labels(&self) -> &[(u32, Sense)] {
        &self.labels
    }

    /// ラベル対応を再構築して返します
    pub fn label_map(&self) -> LabelMap {
        self.labels
            .iter()
            .map(|&(id, sense)| (usize::from_u32(id), sense))
            .collect()
    }

    /// 決定リストを返します
    pub fn decision_list(&self) -> &DecisionList {
        &self.decision_list
    }

    /// 学習の終了状態を返します
    pub fn convergence(&self) -> Convergence {
        self.convergence
    }

    fn from_word_model(model: WordModel) -> Result<Self> {
        let mut labels = model
            .labels()
            .iter()
            .map(|(&id, &sense)| Ok((u32::try_from(id)?, sense)))
            .collect::<Result<Vec<_>>>()?;
        labels.sort_unstable_by_key(|&(id, _)| id);
        Ok(Self {
            word: model.word().to_string(),
            labels,
            decision_list: model.decision_list().clone(),
            convergence: model.convergence(),
        })
    }
}

/// 学習済みモデル
///
/// 単語ごとのエントリを学習順に保持します。
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct Model {
    entries: Vec<WordEntry>,
}

impl Model {
    /// 単語ごとの学習結果からモデルを構築します
    ///
    /// # 引数
    ///
    /// * `models` - 単語ごとの学習結果の列
    ///
    /// # 戻り値
    ///
    /// 構築されたモデル
    ///
    /// # エラー
    ///
    /// インスタンスIDが `u32` で表現できない場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn from_word_models(models: Vec<WordModel>) -> Result<Self> {
        let entries = models
            .into_iter()
            .map(WordEntry::from_word_model)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// エントリのスライスを学習順に返します
    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    /// 指定された単語のエントリを返します
    ///
    /// # 引数
    ///
    /// * `word` - 対象単語
    ///
    /// # 戻り値
    ///
    /// 存在する場合はエントリへの参照
    pub fn get(&self, word: &str) -> Option<&WordEntry> {
        self.entries.iter().find(|e| e.word == word)
    }

    /// モデルを指定されたシンクに書き込みます
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
    /// 直列化または書き込みに失敗した場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        let bytes = to_bytes::<rkyv::rancor::Error>(self)?;
        wtr.write_all(&bytes)?;
        Ok(())
    }

    /// モデルを指定されたソースから読み込みます
    ///
    /// # 引数
    ///
    /// * `rdr` - 読み込み元
    ///
    /// # 戻り値
    ///
    /// 読み込まれたモデル
    ///
    /// # エラー
    ///
    /// 読み込みまたはデシリアライズに失敗した場合、
    /// [`YarowskyError`](crate::errors::YarowskyError) が返されます。
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut bytes = vec![];
        rdr.read_to_end(&mut bytes)?;
        Ok(from_bytes::<Self, rkyv::rancor::Error>(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{FeatureSet, Instance};
    use crate::seed::SeedRuleTable;
    use crate::trainer::Trainer;

    fn trained_model() -> Model {
        let seeds =
            SeedRuleTable::from_reader("bank\t1\triver\nbank\t2\tloan\n".as_bytes()).unwrap();
        let mut fs = FeatureSet::new();
        fs.push(Instance::new(
            0,
            0,
            0,
            vec!["LEFT1=river".to_string(), "WINDOW=fish".to_string()],
        ));
        fs.push(Instance::new(0, 1, 0, vec!["WINDOW=fish".to_string()]));
        fs.push(Instance::new(1, 0, 0, vec!["RIGHT1=loan".to_string()]));

        let word_model = Trainer::new().train_word("bank", &fs, &seeds).unwrap();
        Model::from_word_models(vec![word_model]).unwrap()
    }

    #[test]
    fn test_labels_are_sorted_by_instance_id() {
        let model = trained_model();
        let entry = model.get("bank").unwrap();

        let ids: Vec<u32> = entry.labels().iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        let map = entry.label_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&0), entry.labels().first().map(|(_, s)| s));
    }

    #[test]
    fn test_model_roundtrip() {
        let model = trained_model();

        let mut bytes = vec![];
        model.write(&mut bytes).unwrap();
        let restored = Model::read(bytes.as_slice()).unwrap();

        assert_eq!(model, restored);
        assert!(restored.get("bank").is_some());
        assert!(restored.get("plant").is_none());
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let model = trained_model();
        let mut a = vec![];
        let mut b = vec![];
        model.write(&mut a).unwrap();
        model.write(&mut b).unwrap();
        assert_eq!(a, b);
    }
}
