// テンプレート内のプレースホルダーを単語リストからランダムに置換するモジュール

use anyhow::{Result, anyhow};
use rand::Rng;
use rand::seq::SliceRandom;
use regex::{NoExpand, Regex};

use crate::words::WordLists;

/// `<<category>>` 形式のプレースホルダー
pub fn placeholder(category: &str) -> String {
    format!("<<{}>>", category)
}

/// テンプレート内の各プレースホルダーを、対応するリストからランダムに選んだ単語で置換する
///
/// カテゴリごとに1回だけ抽選し、同じカテゴリの出現箇所はすべて同じ単語になる。
/// リストに無いカテゴリのプレースホルダーはそのまま残る。
/// 空のリストがあると、テンプレートで使われていなくてもエラーになる。
pub fn replace_words(text: &str, lists: &WordLists) -> Result<String> {
    replace_words_with_rng(text, lists, &mut rand::thread_rng())
}

pub fn replace_words_with_rng<R: Rng + ?Sized>(
    text: &str,
    lists: &WordLists,
    rng: &mut R,
) -> Result<String> {
    let mut updated = text.to_string();

    for (category, words) in lists {
        let word = words
            .choose(&mut *rng)
            .ok_or_else(|| anyhow!("カテゴリ「{}」の単語リストが空です (empty population)", category))?;

        let pattern = Regex::new(&regex::escape(&placeholder(category)))?;
        updated = pattern.replace_all(&updated, NoExpand(word.as_str())).into_owned();
    }

    Ok(updated)
}

/// 複数のテンプレートをそれぞれ埋める（順序と件数は入力と同じ）
pub fn fill_patterns<S: AsRef<str>>(patterns: &[S], words: &WordLists) -> Result<Vec<String>> {
    fill_patterns_with_rng(patterns, words, &mut rand::thread_rng())
}

pub fn fill_patterns_with_rng<S: AsRef<str>, R: Rng + ?Sized>(
    patterns: &[S],
    words: &WordLists,
    rng: &mut R,
) -> Result<Vec<String>> {
    patterns
        .iter()
        .map(|pattern| replace_words_with_rng(pattern.as_ref(), words, &mut *rng))
        .collect()
}
