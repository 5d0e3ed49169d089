//! 画像補正
//!
//! OCR前に図面画像を補正する。補正は失敗しない（できない場合は入力をそのまま返す）。

use image::{imageops, DynamicImage, GrayImage, Luma};

/// 画像補正の共通インターフェース
pub trait ImageEnhancer: Send + Sync {
    /// 補正後の画像を返す
    fn enhance(&self, image: DynamicImage) -> DynamicImage;
}

/// 図面向けの補正
///
/// グレースケール化 → 軽いぼかしでノイズ除去 → ヒストグラムの両端を切り詰めてコントラストを伸長 → RGBに戻す
#[derive(Debug, Clone)]
pub struct DrawingEnhancer {
    /// ガウシアンぼかしのσ（0以下でスキップ）
    pub denoise_sigma: f32,
    /// コントラスト伸長時に両端から切り捨てる画素の割合（%）
    pub clip_percent: f32,
}

impl Default for DrawingEnhancer {
    fn default() -> Self {
        Self {
            denoise_sigma: 0.6,
            clip_percent: 1.0,
        }
    }
}

impl ImageEnhancer for DrawingEnhancer {
    fn enhance(&self, image: DynamicImage) -> DynamicImage {
        if image.width() == 0 || image.height() == 0 {
            tracing::warn!("画像サイズが0のため補正をスキップ");
            return image;
        }

        let gray = image.to_luma8();
        let denoised = if self.denoise_sigma > 0.0 {
            imageops::blur(&gray, self.denoise_sigma)
        } else {
            gray
        };
        let stretched = stretch_contrast(&denoised, self.clip_percent);

        DynamicImage::ImageLuma8(stretched).into_rgb8().into()
    }
}

/// 輝度の下位・上位 `clip_percent`% を切り捨て、残りを 0〜255 に線形伸長する
fn stretch_contrast(gray: &GrayImage, clip_percent: f32) -> GrayImage {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let clip = ((total as f64) * (clip_percent.clamp(0.0, 49.0) as f64) / 100.0) as u64;

    let low = percentile_index(histogram.iter(), clip);
    let high = 255 - percentile_index(histogram.iter().rev(), clip);

    if high <= low {
        return gray.clone();
    }

    let scale = 255.0 / (high - low) as f32;
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0];
        let stretched = (value.saturating_sub(low as u8) as f32 * scale).round();
        Luma([stretched.clamp(0.0, 255.0) as u8])
    })
}

/// 累積画素数が `clip` を超える最初のビン番号
fn percentile_index<'a>(bins: impl Iterator<Item = &'a u64>, clip: u64) -> usize {
    let mut cumulative = 0;
    for (index, count) in bins.enumerate() {
        cumulative += count;
        if cumulative > clip {
            return index;
        }
    }
    0
}
