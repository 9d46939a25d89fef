// LLMモジュール - ホストされた推論APIの呼び出しをまとめたモジュール

// サブモジュールをエクスポート
pub mod client;
pub mod prompts;
pub mod schemas;

pub use client::{InferenceClient, InferenceConfig};
pub use prompts::SystemPrompt;
