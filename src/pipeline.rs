//! OCRパイプライン
//!
//! 画像読み込み → 補正 → 文字認識 → テキスト結合 → 技術仕様抽出 を1画像分実行する。

use crate::cache::{cache_key, CacheFile};
use crate::config::Config;
use crate::enhancer::ImageEnhancer;
use crate::error::Result;
use crate::input::{load_image, ImageSource};
use crate::recognizer::TextRecognizer;
use fastener_ocr_common::{BoundingBox, RecognizedSpan, SpecExtractor, SpecificationRecord};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

/// 1画像分の処理結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// 空でない認識テキストをスペースで結合したもの
    pub text: String,
    /// 認識信頼度の平均（認識結果がなければ0.0）
    pub confidence: f64,
    pub bounding_boxes: Vec<BoundingBox>,
    pub technical_specs: Option<SpecificationRecord>,
    /// 処理時間（秒）
    pub processing_time: f64,
}

/// 処理オプション
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub language: String,
    pub enhance_image: bool,
    pub extract_technical_info: bool,
    /// 認識結果キャッシュの保存先（Noneでキャッシュしない）
    pub cache_dir: Option<PathBuf>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            enhance_image: true,
            extract_technical_info: true,
            cache_dir: None,
        }
    }
}

impl ExtractOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.language.clone(),
            enhance_image: config.enhance_image,
            extract_technical_info: config.extract_technical_info,
            cache_dir: None,
        }
    }
}

/// 認識結果の集約
#[derive(Debug, Clone, PartialEq)]
pub struct SpanSummary {
    pub text: String,
    pub confidence: f64,
    pub bounding_boxes: Vec<BoundingBox>,
}

pub struct OcrPipeline<E, R> {
    enhancer: E,
    recognizer: R,
    extractor: SpecExtractor,
}

impl<E: ImageEnhancer, R: TextRecognizer> OcrPipeline<E, R> {
    pub fn new(enhancer: E, recognizer: R, extractor: SpecExtractor) -> Self {
        Self {
            enhancer,
            recognizer,
            extractor,
        }
    }

    pub fn extractor(&self) -> &SpecExtractor {
        &self.extractor
    }

    /// 1画像を処理
    pub async fn process(&self, source: &ImageSource, options: &ExtractOptions) -> Result<OcrResult> {
        let start = Instant::now();

        let loaded = load_image(source)?;
        tracing::debug!(
            width = loaded.image.width(),
            height = loaded.image.height(),
            bytes = loaded.bytes.len(),
            "画像読み込み完了"
        );

        let spans = self.recognize_with_cache(loaded.image, &loaded.bytes, options).await?;
        let summary = summarize_spans(&spans);

        let technical_specs = if options.extract_technical_info && !summary.text.is_empty() {
            let record = self.extractor.extract_technical_specifications(&summary.text);
            tracing::debug!(
                categories = record.present_categories().len(),
                spec_confidence = record.confidence.unwrap_or(0.0),
                "技術仕様抽出完了"
            );
            Some(record)
        } else {
            None
        };

        let processing_time = start.elapsed().as_secs_f64();
        tracing::info!(
            text_length = summary.text.len(),
            confidence = summary.confidence,
            processing_time,
            "OCR処理完了"
        );

        Ok(OcrResult {
            text: summary.text,
            confidence: summary.confidence,
            bounding_boxes: summary.bounding_boxes,
            technical_specs,
            processing_time,
        })
    }

    async fn recognize_with_cache(
        &self,
        image: image::DynamicImage,
        bytes: &[u8],
        options: &ExtractOptions,
    ) -> Result<Vec<RecognizedSpan>> {
        let Some(cache_dir) = &options.cache_dir else {
            return self.recognize(image, options).await;
        };

        let key = cache_key(bytes, &options.language, options.enhance_image);
        let mut cache = CacheFile::load(cache_dir);
        if let Some(spans) = cache.get(&key) {
            tracing::info!(cache = %CacheFile::cache_path(cache_dir).display(), "キャッシュから認識結果を取得");
            return Ok(spans.to_vec());
        }

        let spans = self.recognize(image, options).await?;
        cache.insert(key, options.language.clone(), options.enhance_image, spans.clone());
        if let Err(e) = cache.save(cache_dir) {
            tracing::warn!(error = %e, "キャッシュの保存に失敗");
        }

        Ok(spans)
    }

    async fn recognize(
        &self,
        image: image::DynamicImage,
        options: &ExtractOptions,
    ) -> Result<Vec<RecognizedSpan>> {
        let image = if options.enhance_image {
            self.enhancer.enhance(image)
        } else {
            image
        };

        tracing::info!(language = %options.language, enhance_image = options.enhance_image, "OCR処理開始");
        self.recognizer.recognize(&image, &options.language).await
    }
}

/// 認識結果を集約
///
/// 空白のみのテキストは除外する。テキストは読み取り順にスペースで結合する。
pub fn summarize_spans(spans: &[RecognizedSpan]) -> SpanSummary {
    let kept: Vec<&RecognizedSpan> = spans.iter().filter(|s| !s.text.trim().is_empty()).collect();

    let text = kept.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ");
    let confidence = if kept.is_empty() {
        0.0
    } else {
        kept.iter().map(|s| s.confidence).sum::<f64>() / kept.len() as f64
    };
    let bounding_boxes = kept.iter().filter_map(|s| BoundingBox::from_span(s)).collect();

    SpanSummary {
        text,
        confidence,
        bounding_boxes,
    }
}
