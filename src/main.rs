use clap::Parser;
use fastener_ocr::{cache, cli, config, enhancer, error, input, logging, pipeline, recognizer};
use fastener_ocr_common::{format_specifications, SpecExtractor};
use cli::{Cli, Commands, OutputFormat};
use config::Config;
use error::{OcrError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    logging::init(&config.log_level, cli.verbose);

    match cli.command {
        Commands::Extract { input, base64, language, no_enhance, no_specs, output, use_cache } => {
            let source = if base64 {
                input::ImageSource::Base64(read_text_input(&input)?)
            } else {
                input::ImageSource::File(input.clone())
            };

            let language = language.unwrap_or_else(|| config.language.clone());
            if !recognizer::is_supported_language(&language) {
                tracing::warn!(%language, "サポート一覧にない言語です（OCRコマンドにそのまま渡します）");
            }

            let mut options = pipeline::ExtractOptions::from_config(&config);
            options.language = language;
            options.enhance_image &= !no_enhance;
            options.extract_technical_info &= !no_specs;
            if use_cache {
                options.cache_dir = Some(cache_folder_for(&input));
            }

            let pipeline = pipeline::OcrPipeline::new(
                enhancer::DrawingEnhancer::default(),
                recognizer::CommandRecognizer::from_config(&config),
                SpecExtractor::new().with_substitutions(config.substitution_table()),
            );

            tracing::debug!(
                substitutions = pipeline.extractor().substitutions().pairs().len(),
                "正規化置換表"
            );

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message("文字認識中...");
            spinner.enable_steady_tick(Duration::from_millis(120));

            let result = pipeline.process(&source, &options).await;
            spinner.finish_and_clear();
            let result = result?;

            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("✔ 結果を保存: {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Analyze { input, text, format } => {
            let text = match (input, text) {
                (_, Some(text)) => text,
                (Some(path), None) => read_text_input(&path)?,
                (None, None) => read_text_input(Path::new("-"))?,
            };

            let extractor = SpecExtractor::new().with_substitutions(config.substitution_table());
            let record = extractor.extract_technical_specifications(&text);

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
                OutputFormat::Text => println!("{}", format_specifications(&record)),
            }
        }

        Commands::Languages => {
            println!("対応言語:");
            for (code, name) in recognizer::SUPPORTED_LANGUAGES {
                println!("  {:<12} {}", code, name);
            }
        }

        Commands::Config { set_recognizer, show } => {
            let mut config = config;

            if let Some(command) = set_recognizer {
                config.set_recognizer(command)?;
                println!("✔ OCRコマンドを設定しました");
            }

            if show {
                println!("設定:");
                println!("  OCRコマンド: {}", config.recognizer_command());
                println!("  追加引数: {:?}", config.recognizer_args);
                println!("  言語: {}", config.language);
                println!("  画像補正: {}", if config.enhance_image { "有効" } else { "無効" });
                println!("  技術仕様抽出: {}", if config.extract_technical_info { "有効" } else { "無効" });
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  ログレベル: {}", config.log_level);
                println!(
                    "  置換表: {}",
                    if config.substitutions.is_some() { "カスタム" } else { "組み込み" }
                );
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = cache::CacheFile::cache_path(&target);

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                if cache_path.exists() {
                    let cache = cache::CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match cache::CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// テキスト入力を読む（"-" は標準入力）
fn read_text_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    if !path.exists() {
        return Err(OcrError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// キャッシュの保存先（入力ファイルのフォルダ、標準入力ならカレント）
fn cache_folder_for(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
