// bias-prompt-kit - LLMのバイアス検証チュートリアル用ヘルパー

pub mod llm;
pub mod template;
pub mod words;
