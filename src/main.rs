// bias-prompt-kit - 単語リストでプロンプトを組み立ててホストされたLLMを試すツール

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::prelude::*;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{info, warn};
use simple_logger::SimpleLogger;

use bias_prompt_kit::llm::{InferenceClient, InferenceConfig, SystemPrompt};
use bias_prompt_kit::llm::client::DEFAULT_BASE_URL;
use bias_prompt_kit::smoke_test::run_smoke_test;
use bias_prompt_kit::template::fill_patterns;
use bias_prompt_kit::words::{default_sources, source_words};

// コマンドライン引数の定義

#[derive(Parser, Debug)]
#[clap(
    name = "bias-prompt-kit",
    about = "単語リストでプロンプトを埋めてLLMのバイアスを試すツール",
    version
)]
struct Args {
    /// Hugging Face のAPIトークン
    #[clap(long, env = "hf_api", hide_env_values = true, global = true)]
    token: Option<String>,

    /// 推論APIのベースURL
    #[clap(long, env = "HF_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// デバッグログを出す
    #[clap(long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 単語リストを読み込んでJSONで表示
    Words {
        /// 特定のカテゴリだけ表示
        #[clap(long)]
        category: Option<String>,
    },

    /// テンプレートファイルの各行を単語リストで埋める
    Fill {
        /// 1行1テンプレートのファイル
        #[clap(long)]
        patterns: PathBuf,

        /// 繰り返し回数
        #[clap(long, default_value = "1")]
        count: usize,
    },

    /// プロンプトを1回送って生成結果を表示
    Generate {
        #[clap(long)]
        model: String,

        #[clap(long)]
        prompt: String,

        /// システムプロンプト（"tutor" で組み込みのチュータープロンプト）
        #[clap(long)]
        system: Option<SystemPrompt>,

        /// 添付するPNG画像
        #[clap(long)]
        image: Option<PathBuf>,
    },

    /// メタデータCSVの全画像に同じプロンプトを送る
    SmokeTest {
        /// 画像のあるディレクトリ
        #[clap(long)]
        folder: PathBuf,

        /// file_name 列を持つメタデータCSV
        #[clap(long)]
        metadata: PathBuf,

        #[clap(long)]
        model: String,

        #[clap(long)]
        utterance: String,

        /// "tutor" または任意のシステムプロンプト
        #[clap(long, default_value = "tutor")]
        system: SystemPrompt,

        /// 結果の保存先（省略時はタイムスタンプ付きのファイル名）
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

impl Args {
    fn inference_client(&self) -> Result<InferenceClient> {
        let token = self
            .token
            .clone()
            .ok_or_else(|| anyhow!("APIトークンがありません（--token または環境変数 hf_api）"))?;

        InferenceClient::new(InferenceConfig::new(token).with_base_url(&self.base_url))
    }
}

// メイン関数
#[tokio::main]
async fn main() -> Result<()> {
    // .envファイルを読み込み
    dotenv().ok();

    // コマンドライン引数を解析
    let args = Args::parse();

    // ロガー初期化
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("ロガーの初期化に失敗")?;

    match &args.command {
        Command::Words { category } => {
            let lists = source_words(&reqwest::Client::new(), &default_sources()).await?;

            let output = match category {
                Some(name) => {
                    let words = lists
                        .get(name)
                        .ok_or_else(|| anyhow!("カテゴリ「{}」はありません", name))?;
                    serde_json::to_string_pretty(words)?
                }
                None => serde_json::to_string_pretty(&lists)?,
            };
            println!("{}", output);
        }

        Command::Fill { patterns, count } => {
            let content = tokio::fs::read_to_string(patterns)
                .await
                .with_context(|| format!("テンプレートファイル {} の読み込みに失敗", patterns.display()))?;

            let templates: Vec<&str> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();

            if templates.is_empty() {
                warn!("⚠️ テンプレートが空です: {}", patterns.display());
                return Ok(());
            }

            let lists = source_words(&reqwest::Client::new(), &default_sources()).await?;

            for _ in 0..*count {
                for filled in fill_patterns(&templates, &lists)? {
                    println!("{}", filled);
                }
            }
        }

        Command::Generate {
            model,
            prompt,
            system,
            image,
        } => {
            let client = args.inference_client()?;
            let system = system.as_ref().map(SystemPrompt::resolve);

            let text = match image {
                Some(path) => client.generate_with_image(model, prompt, path, system).await?,
                None => client.generate(model, prompt, system).await?,
            };
            println!("{}", text);
        }

        Command::SmokeTest {
            folder,
            metadata,
            model,
            utterance,
            system,
            output,
        } => {
            let client = args.inference_client()?;

            let Some(table) =
                run_smoke_test(&client, folder, metadata, model, utterance, system).await?
            else {
                bail!("スモークテストを実行できませんでした");
            };

            let output = output.clone().unwrap_or_else(|| {
                PathBuf::from(format!(
                    "smoke_test_{}.csv",
                    Local::now().format("%Y%m%d_%H%M%S")
                ))
            });
            table.write_csv(&output)?;

            info!("💾 保存完了: {} ({}件)", output.display(), table.len());
        }
    }

    Ok(())
}
