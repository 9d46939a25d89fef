// 推論APIクライアント

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use reqwest::header;

use super::schemas::{ChatCompletionRequest, ChatCompletionResponse, ContentPart, Conversation};

/// Hugging Face 推論ルーター（OpenAI互換）
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";

/// 1回の生成で出力する最大トークン数
pub const MAX_OUTPUT_TOKENS: usize = 500;

/// 推論クライアントの設定
#[derive(Clone, Debug)]
pub struct InferenceConfig {
    pub base_url: String,
    pub token: String,
    pub max_tokens: usize,
}

impl InferenceConfig {
    pub fn new(token: impl Into<String>) -> Self {
        InferenceConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            max_tokens: MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// チャット補完APIクライアント
///
/// 起動時に一度だけ作り、各呼び出し元へ参照で渡す。
pub struct InferenceClient {
    client: reqwest::Client,
    config: InferenceConfig,
}

impl InferenceClient {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .context("APIトークンに使用できない文字が含まれています")?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("HTTPクライアントの作成に失敗")?;

        Ok(InferenceClient { client, config })
    }

    /// テキストのみのプロンプトで生成する
    pub async fn generate(&self, model: &str, prompt: &str, system: Option<&str>) -> Result<String> {
        let conversation = Conversation::new(system, vec![ContentPart::text(prompt)]);
        self.chat_completion(model, &conversation).await
    }

    /// PNG画像を添えたプロンプトで生成する
    pub async fn generate_with_image(
        &self,
        model: &str,
        prompt: &str,
        image_path: &Path,
        system: Option<&str>,
    ) -> Result<String> {
        let bytes = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("画像ファイル {} の読み込みに失敗", image_path.display()))?;

        let conversation = Conversation::new(
            system,
            vec![ContentPart::text(prompt), ContentPart::png(&bytes)],
        );
        self.chat_completion(model, &conversation).await
    }

    async fn chat_completion(&self, model: &str, conversation: &Conversation) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let request_body = ChatCompletionRequest {
            model,
            messages: conversation,
            max_tokens: self.config.max_tokens,
        };

        debug!("➡️ チャット補完リクエスト: {} ({})", url, model);

        let response = self.client.post(&url).json(&request_body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!(
                "推論API エラー: ステータス {}, レスポンス: {}",
                status,
                error_text
            ));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("推論APIレスポンスの解析に失敗")?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("推論APIレスポンスに選択肢がありません"))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| anyhow!("推論APIレスポンスの本文が空です"))?;

        info!("✅ 生成完了: {} ({}文字)", model, content.chars().count());

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> InferenceClient {
        InferenceClient::new(InferenceConfig::new("test-token").with_base_url(server.uri()))
            .expect("Failed to create client")
    }

    fn completion(text: &str) -> serde_json::Value {
        json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]})
    }

    #[tokio::test]
    async fn generate_sends_system_then_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(json!({
                "model": "some/model",
                "max_tokens": 500,
                "messages": [
                    {"role": "system", "content": [{"type": "text", "text": "be kind"}]},
                    {"role": "user", "content": [{"type": "text", "text": "hello"}]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("hi there")))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .generate("some/model", "hello", Some("be kind"))
            .await
            .unwrap();

        assert_eq!(text, "hi there");
    }

    #[tokio::test]
    async fn generate_with_image_embeds_png() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": [
                        {"type": "text", "text": "what is this?"},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,cG5n"}}
                    ]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("a png")))
            .expect(1)
            .mount(&server)
            .await;

        let mut image = tempfile::NamedTempFile::new().unwrap();
        image.write_all(b"png").unwrap();

        let text = client_for(&server)
            .generate_with_image("some/model", "what is this?", image.path(), None)
            .await
            .unwrap();

        assert_eq!(text, "a png");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_system_prompt_sends_only_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).generate("m", "p", Some("")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body["messages"],
            json!([{"role": "user", "content": [{"type": "text", "text": "p"}]}])
        );
    }

    #[tokio::test]
    async fn missing_image_fails_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let result = client_for(&server)
            .generate_with_image("m", "p", &dir.path().join("missing.png"), None)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("m", "p", None).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("rate limited"));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let result = client_for(&server).generate("m", "p", None).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn null_content_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": null}}]})),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).generate("m", "p", None).await;

        assert!(result.is_err());
    }
}
