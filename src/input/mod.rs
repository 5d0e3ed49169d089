//! 画像入力
//!
//! ファイルまたはbase64文字列（data URL可）から画像を読み込み、
//! EXIFの向きを補正してRGBに変換する。

mod exif;

use crate::error::{OcrError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::path::PathBuf;

/// 画像の入力元
#[derive(Debug, Clone)]
pub enum ImageSource {
    File(PathBuf),
    Base64(String),
}

/// 読み込み済み画像
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// RGB変換・向き補正済みの画像
    pub image: DynamicImage,
    /// 元のバイト列（キャッシュキー用）
    pub bytes: Vec<u8>,
}

/// 画像を読み込む
pub fn load_image(source: &ImageSource) -> Result<LoadedImage> {
    let bytes = match source {
        ImageSource::File(path) => {
            if !path.exists() {
                return Err(OcrError::FileNotFound(path.display().to_string()));
            }
            std::fs::read(path)?
        }
        ImageSource::Base64(data) => decode_base64_image(data)?,
    };

    let image = decode_image(&bytes)?;
    Ok(LoadedImage { image, bytes })
}

/// base64文字列をデコード
///
/// `data:image/...;base64,` の接頭辞と空白・改行は取り除く。
pub fn decode_base64_image(data: &str) -> Result<Vec<u8>> {
    let payload = strip_data_url(data)?;
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(OcrError::NoImageProvided);
    }

    Ok(STANDARD.decode(cleaned)?)
}

/// data URL の接頭辞を取り除く
pub fn strip_data_url(data: &str) -> Result<&str> {
    let trimmed = data.trim();
    if !trimmed.starts_with("data:image") {
        return Ok(trimmed);
    }

    trimmed
        .split(',')
        .nth(1)
        .ok_or_else(|| OcrError::ImageDecode("data URLにデータ部がありません".into()))
}

/// バイト列を画像にデコードし、向き補正とRGB変換を行う
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| OcrError::ImageDecode(e.to_string()))?;

    let oriented = match exif::read_orientation(bytes) {
        Some(orientation) => apply_orientation(image, orientation),
        None => image,
    };

    Ok(match oriented {
        DynamicImage::ImageRgb8(_) => oriented,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    })
}

/// EXIF Orientation に従って回転・反転する
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
