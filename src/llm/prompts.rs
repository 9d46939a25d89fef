// システムプロンプトの設定

use std::convert::Infallible;
use std::str::FromStr;

/// 組み込みの数学チューター用システムプロンプト
pub const TUTOR_SYSTEM_PROMPT: &str = "You are a patient math tutor. The image shows a student's \
handwritten or typed math work. Check every step of the work for errors. If you find a mistake, \
describe where it is and what kind of mistake it is so the student can fix it themselves, but do \
not reveal the correct answer. If all of the math is correct, respond with exactly: \
Well done, you should be proud.";

/// システムプロンプトの指定
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SystemPrompt {
    /// 組み込みのチュータープロンプト
    Tutor,
    /// 呼び出し側が渡した文字列をそのまま使う
    Custom(String),
}

impl SystemPrompt {
    /// 実際に送信するプロンプト文字列
    pub fn resolve(&self) -> &str {
        match self {
            SystemPrompt::Tutor => TUTOR_SYSTEM_PROMPT,
            SystemPrompt::Custom(text) => text,
        }
    }
}

// "tutor" だけがプリセット扱い
impl FromStr for SystemPrompt {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "tutor" => SystemPrompt::Tutor,
            other => SystemPrompt::Custom(other.to_string()),
        })
    }
}
