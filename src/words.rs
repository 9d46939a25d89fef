// リモートのCSVから属性ごとの単語リストを読み込むモジュール

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};

/// カテゴリ名 → 単語リスト
pub type WordLists = BTreeMap<String, Vec<String>>;

const WORD_LIST_REPO: &str = "https://github.com/butterswords/xai-bias-word-lists/blob/main";

/// 単語リストの取得元
#[derive(Clone, Debug)]
pub struct WordListSource {
    pub category: String,
    pub url: String,
}

impl WordListSource {
    pub fn new(category: impl Into<String>, url: impl Into<String>) -> Self {
        WordListSource {
            category: category.into(),
            url: url.into(),
        }
    }

    /// GitHubから生のCSVを取得するためのURL
    pub fn raw_url(&self) -> String {
        format!("{}?raw=true", self.url)
    }

    /// 値を取り出す列の位置
    pub fn column(&self) -> usize {
        // professionのCSVだけ歴史的な経緯で3列目を使う
        if self.category == "profession" { 2 } else { 0 }
    }
}

/// チュートリアルで使う6つの単語リスト
pub fn default_sources() -> Vec<WordListSource> {
    [
        ("country", "Countries/combined-countries.csv"),
        ("profession", "Professions/soc_2018_direct_match_title_file.csv"),
        ("mFirst", "Names/1990-census-male-first.csv"),
        ("fFirst", "Names/1990-census-female-first.csv"),
        ("genderId", "SOGI/sogi.csv"),
        ("age", "Age/age.csv"),
    ]
    .into_iter()
    .map(|(category, file)| WordListSource::new(category, format!("{}/{}", WORD_LIST_REPO, file)))
    .collect()
}

/// すべての取得元から単語リストを読み込む
///
/// 1つでも取得や解析に失敗したらエラーを返す（部分的な結果は返さない）。
pub async fn source_words(http: &reqwest::Client, sources: &[WordListSource]) -> Result<WordLists> {
    let mut word_lists = WordLists::new();

    for source in sources {
        let url = source.raw_url();
        info!("⬇️ 単語リスト取得中: {} ({})", source.category, url);

        let response = http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("単語リスト {} の取得に失敗", source.category))?;

        if !response.status().is_success() {
            let status = response.status();
            bail!(
                "単語リスト取得エラー: {} - ステータス {}",
                source.category,
                status
            );
        }

        let body = response.bytes().await?;
        let words = parse_column(&body, source.column())
            .with_context(|| format!("単語リスト {} のCSV解析に失敗", source.category))?;

        debug!("{}: {}語", source.category, words.len());
        word_lists.insert(source.category.clone(), words);
    }

    info!("🗂️ 単語リスト読み込み完了: {}カテゴリ", word_lists.len());

    Ok(word_lists)
}

/// ヘッダー付きCSVから指定した列の値を順番に取り出す
pub fn parse_column(csv_data: &[u8], column: usize) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data);

    let header_count = reader.headers()?.len();
    if column >= header_count {
        bail!("列 {} がありません（列数: {}）", column, header_count);
    }

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        let value = record
            .get(column)
            .ok_or_else(|| anyhow!("{}行目に列 {} がありません", values.len() + 2, column))?;
        values.push(value.to_string());
    }

    Ok(values)
}
