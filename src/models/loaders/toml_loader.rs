use crate::models::settings::GeneratorSettings;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载出卷设置
///
/// 文件中未出现的字段使用默认蓝图
pub async fn load_settings(toml_file_path: &Path) -> Result<GeneratorSettings> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取设置文件: {}", toml_file_path.display()))?;

    parse_settings(&content)
        .with_context(|| format!("无法解析设置文件: {}", toml_file_path.display()))
}

/// 加载出卷设置，文件不存在时使用默认蓝图
pub async fn load_settings_or_default(toml_file_path: &Path) -> Result<GeneratorSettings> {
    if !toml_file_path.exists() {
        tracing::warn!(
            "设置文件 {} 不存在，使用默认出卷设置",
            toml_file_path.display()
        );
        return Ok(GeneratorSettings::default());
    }

    let settings = load_settings(toml_file_path).await?;
    tracing::info!(
        "已加载出卷设置: {} / {} / 共 {} 题",
        settings.subject,
        settings.difficulty.code(),
        settings.total_question_count()
    );
    Ok(settings)
}

pub fn parse_settings(content: &str) -> Result<GeneratorSettings> {
    let settings: GeneratorSettings = toml::from_str(content)?;
    Ok(settings)
}
