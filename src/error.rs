use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像が指定されていません。画像ファイルまたはbase64データを指定してください")]
    NoImageProvided,

    #[error("画像読み込みエラー: {0}")]
    ImageDecode(String),

    #[error("base64デコードエラー: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("OCRコマンド実行エラー: {0}")]
    Recognizer(String),

    #[error("OCR結果のパースに失敗: {0}")]
    RecognizerParse(String),

    #[error("OCRコマンドがタイムアウトしました（{0}秒）")]
    Timeout(u64),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<fastener_ocr_common::Error> for OcrError {
    fn from(err: fastener_ocr_common::Error) -> Self {
        match err {
            fastener_ocr_common::Error::Io(e) => OcrError::Io(e),
            fastener_ocr_common::Error::Json(e) => OcrError::JsonParse(e),
            fastener_ocr_common::Error::Parse(msg) => OcrError::RecognizerParse(msg),
            fastener_ocr_common::Error::Config(msg) => OcrError::Config(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;
