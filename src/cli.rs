use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fastener-ocr")]
#[command(about = "締結部品の図面・仕様書OCRと技術仕様抽出ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像からテキストと技術仕様を抽出してJSONを出力
    Extract {
        /// 画像ファイル（--base64 指定時はbase64テキストのファイル、"-" で標準入力）
        #[arg(required = true)]
        input: PathBuf,

        /// 入力をbase64（data URL可）として扱う
        #[arg(long)]
        base64: bool,

        /// 認識言語（デフォルト: 設定ファイルの値）
        #[arg(short, long)]
        language: Option<String>,

        /// 画像補正を行わない
        #[arg(long)]
        no_enhance: bool,

        /// 技術仕様の抽出を行わない
        #[arg(long)]
        no_specs: bool,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 認識結果キャッシュを使用（画像と同じフォルダに保存）
        #[arg(long)]
        use_cache: bool,
    },

    /// OCRテキストから技術仕様を抽出
    Analyze {
        /// テキストファイル（省略時は --text または標準入力）
        input: Option<PathBuf>,

        /// 直接テキストを指定
        #[arg(short, long, conflicts_with = "input")]
        text: Option<String>,

        /// 出力形式 (json/text)
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// 対応言語を表示
    Languages,

    /// 設定を表示/編集
    Config {
        /// OCRコマンドを設定
        #[arg(long)]
        set_recognizer: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

/// analyze の出力形式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            _ => Err(format!("Unknown format: {}. Use json or text", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}
