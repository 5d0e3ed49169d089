use crate::error::{OcrError, Result};
use fastener_ocr_common::SubstitutionTable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// OCRコマンドを上書きする環境変数
pub const RECOGNIZER_ENV: &str = "FASTENER_OCR_RECOGNIZER";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 外部OCRコマンド（画像パスと --lang を受け取り、JSON配列を標準出力に書く）
    pub recognizer_command: String,
    /// 画像パスの前に渡す追加引数
    pub recognizer_args: Vec<String>,
    pub language: String,
    pub enhance_image: bool,
    pub extract_technical_info: bool,
    pub timeout_seconds: u64,
    pub log_level: String,
    /// 正規化の置換表（省略時は組み込み表）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitutions: Option<SubstitutionTable>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| OcrError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("fastener-ocr").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            recognizer_command: "paddleocr-json".into(),
            recognizer_args: Vec::new(),
            language: "en".into(),
            enhance_image: true,
            extract_technical_info: true,
            timeout_seconds: 120,
            log_level: "info".into(),
            substitutions: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.recognizer_command.trim().is_empty() {
            return Err(OcrError::Config("recognizer_command が空です".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(OcrError::Config("timeout_seconds は1以上にしてください".into()));
        }
        if let Some(table) = &self.substitutions {
            table.validate()?;
        }
        Ok(())
    }

    /// OCRコマンド（環境変数を優先）
    pub fn recognizer_command(&self) -> String {
        match std::env::var(RECOGNIZER_ENV) {
            Ok(cmd) if !cmd.trim().is_empty() => cmd,
            _ => self.recognizer_command.clone(),
        }
    }

    /// 正規化の置換表
    pub fn substitution_table(&self) -> SubstitutionTable {
        self.substitutions.clone().unwrap_or_default()
    }

    pub fn set_recognizer(&mut self, command: String) -> Result<()> {
        self.recognizer_command = command;
        self.validate()?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.recognizer_command, "paddleocr-json");
        assert_eq!(config.language, "en");
        assert!(config.enhance_image);
        assert!(config.extract_technical_info);
        assert_eq!(config.timeout_seconds, 120);
        assert!(config.validate().is_ok());
        assert_eq!(config.substitution_table(), SubstitutionTable::legacy());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"language": "japan"}"#).unwrap();
        assert_eq!(config.language, "japan");
        assert_eq!(config.recognizer_command, "paddleocr-json");
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_substitutions_override() {
        let config: Config = serde_json::from_str(r#"{"substitutions": []}"#).unwrap();
        assert!(config.substitution_table().is_empty());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            timeout_seconds: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(OcrError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_substitution() {
        let config: Config = serde_json::from_str(r#"{"substitutions": [["", "x"]]}"#).unwrap();
        assert!(matches!(config.validate(), Err(OcrError::Config(_))));
    }

    #[test]
    fn test_default_config_omits_substitutions() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("substitutions"));
    }
}
