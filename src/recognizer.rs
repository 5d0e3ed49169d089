//! 外部OCRエンジン連携モジュール
//!
//! 画像を一時ファイルに書き出し、設定されたOCRコマンドを
//! `<追加引数...> <画像パス> --lang <言語>` で呼び出す。
//! 標準出力の JSON 配列（text / confidence / polygon）を読み取り順の認識結果として返す。

use crate::config::Config;
use crate::error::{OcrError, Result};
use fastener_ocr_common::{parse_recognition_output, RecognizedSpan};
use image::{DynamicImage, ImageFormat};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::process::Command;

/// サポートする認識言語（コード, 表示名）
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("ch", "Chinese (Simplified)"),
    ("chinese_cht", "Chinese (Traditional)"),
    ("fr", "French"),
    ("german", "German"),
    ("japan", "Japanese"),
    ("korean", "Korean"),
    ("it", "Italian"),
    ("es", "Spanish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
];

/// 文字認識の共通インターフェース
pub trait TextRecognizer: Send + Sync {
    /// 画像内のテキストを読み取り順に返す
    fn recognize(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> impl Future<Output = Result<Vec<RecognizedSpan>>> + Send;
}

/// 外部コマンドによる文字認識
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.recognizer_command(),
            config.recognizer_args.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    async fn run(&self, image_path: &Path, language: &str) -> Result<String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(image_path)
            .args(["--lang", language])
            .kill_on_drop(true);

        tracing::debug!(program = %self.program, image = %image_path.display(), language, "OCRコマンド起動");

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| OcrError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| OcrError::Recognizer(format!("{} の起動に失敗: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognizer(format!(
                "{} failed (code {:?}): {}",
                self.program,
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl TextRecognizer for CommandRecognizer {
    async fn recognize(&self, image: &DynamicImage, language: &str) -> Result<Vec<RecognizedSpan>> {
        let image_path = write_temp_image(image)?;
        let result = self.run(&image_path, language).await;

        if let Err(e) = std::fs::remove_file(&image_path) {
            tracing::warn!(path = %image_path.display(), error = %e, "一時画像の削除に失敗");
        }

        let stdout = result?;
        let preview: String = stdout.chars().take(200).collect();
        tracing::trace!(%preview, "OCRコマンド出力");

        Ok(parse_recognition_output(&stdout)?)
    }
}

/// 言語コードがサポート対象か
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}

fn write_temp_image(image: &DynamicImage) -> Result<PathBuf> {
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "fastener-ocr-{}-{}.png",
        std::process::id(),
        seq
    ));

    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| OcrError::ImageDecode(format!("一時画像の書き出しに失敗: {}", e)))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn blank() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(8, 8))
    }

    #[test]
    fn test_supported_languages() {
        assert_eq!(SUPPORTED_LANGUAGES.len(), 13);
        assert!(is_supported_language("en"));
        assert!(is_supported_language("japan"));
        assert!(!is_supported_language("klingon"));
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            recognizer_command: "my-ocr".to_string(),
            recognizer_args: vec!["--det".to_string()],
            timeout_seconds: 30,
            ..Config::default()
        };
        let recognizer = CommandRecognizer::from_config(&config);
        assert_eq!(recognizer.args, vec!["--det".to_string()]);
        assert_eq!(recognizer.timeout, Duration::from_secs(30));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_recognizer_parses_output() {
        let script = r#"echo 'loaded'; echo '[{"text": "M8 x 25", "confidence": 0.9, "polygon": [[0,0],[9,0],[9,4],[0,4]]}]'"#;
        let recognizer = CommandRecognizer::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "ocr".to_string()],
            Duration::from_secs(10),
        );

        let spans = recognizer.recognize(&blank(), "en").await.unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "M8 x 25");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_recognizer_receives_image_and_language() {
        // $1 = 画像パス, $2 = --lang, $3 = 言語
        let script = r#"test -f "$1" && echo "[{\"text\": \"$3\"}]""#;
        let recognizer = CommandRecognizer::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "ocr".to_string()],
            Duration::from_secs(10),
        );

        let spans = recognizer.recognize(&blank(), "german").await.unwrap();
        assert_eq!(spans[0].text, "german");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_recognizer_failure_status() {
        let recognizer = CommandRecognizer::new(
            "sh",
            vec!["-c".to_string(), "echo broken >&2; exit 3".to_string(), "ocr".to_string()],
            Duration::from_secs(10),
        );

        let err = recognizer.recognize(&blank(), "en").await.unwrap_err();
        match err {
            OcrError::Recognizer(msg) => assert!(msg.contains("broken")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_recognizer_timeout() {
        let recognizer = CommandRecognizer::new(
            "sh",
            vec!["-c".to_string(), "sleep 5".to_string(), "ocr".to_string()],
            Duration::from_millis(200),
        );

        let err = recognizer.recognize(&blank(), "en").await.unwrap_err();
        assert!(matches!(err, OcrError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_command_recognizer_missing_program() {
        let recognizer = CommandRecognizer::new(
            "fastener-ocr-no-such-program",
            Vec::new(),
            Duration::from_secs(5),
        );

        let err = recognizer.recognize(&blank(), "en").await.unwrap_err();
        assert!(matches!(err, OcrError::Recognizer(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_recognizer_unparseable_output() {
        let recognizer = CommandRecognizer::new(
            "sh",
            vec!["-c".to_string(), "echo no json".to_string(), "ocr".to_string()],
            Duration::from_secs(10),
        );

        let err = recognizer.recognize(&blank(), "en").await.unwrap_err();
        assert!(matches!(err, OcrError::RecognizerParse(_)));
    }
}
