// チャット補完APIのスキーマ定義

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

/// メッセージの役割
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// 画像パートのURL（data URIを含む）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// メッセージのコンテンツパート
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// PNGのバイト列をbase64でdata URIに埋め込む
    pub fn png(bytes: &[u8]) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:image/png;base64,{}", BASE64.encode(bytes)),
            },
        }
    }
}

/// チャットメッセージ
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

/// 送信する会話
///
/// システムメッセージは高々1つで必ず先頭、その後にユーザーメッセージが1つ続く。
/// この形以外は組み立てられない。空のシステムプロンプトは無いものとして扱う。
#[derive(Clone, Debug)]
pub struct Conversation {
    system: Option<ChatMessage>,
    user: ChatMessage,
}

impl Conversation {
    pub fn new(system: Option<&str>, user_parts: Vec<ContentPart>) -> Self {
        Conversation {
            system: system.filter(|text| !text.is_empty()).map(|text| ChatMessage {
                role: Role::System,
                content: vec![ContentPart::text(text)],
            }),
            user: ChatMessage {
                role: Role::User,
                content: user_parts,
            },
        }
    }

    pub fn messages(&self) -> Vec<&ChatMessage> {
        self.system.iter().chain(std::iter::once(&self.user)).collect()
    }
}

impl Serialize for Conversation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.messages())
    }
}

/// チャット補完リクエスト
#[derive(Clone, Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a Conversation,
    pub max_tokens: usize,
}

/// 応答メッセージ（contentはnullの場合がある）
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

/// チャットの選択肢
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

/// チャット補完レスポンス
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}
