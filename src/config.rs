use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次生成请求的超时时间（秒）
    pub generation_timeout_secs: u64,
    // --- 历史记录 ---
    /// 历史记录存放文件
    pub history_file: String,
    /// 历史记录最多保留的试卷数量
    pub history_max_entries: usize,
    // --- 导出 ---
    /// 导出目录
    pub export_dir: String,
    /// 多套试卷连续导出之间的等待时间（毫秒）
    pub export_delay_ms: u64,
    /// 无头浏览器可执行文件路径，为空时由 chromiumoxide 自动查找
    pub chrome_executable: Option<String>,
    // --- 输入 ---
    /// 出卷设置（TOML）
    pub settings_file: String,
    /// 源材料目录
    pub source_dir: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-pro".to_string(),
            generation_timeout_secs: 180,
            history_file: "paper_history.json".to_string(),
            history_max_entries: 20,
            export_dir: "exports".to_string(),
            export_delay_ms: 1500,
            chrome_executable: None,
            settings_file: "settings.toml".to_string(),
            source_dir: "sources".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            generation_timeout_secs: std::env::var("GENERATION_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generation_timeout_secs),
            history_file: std::env::var("HISTORY_FILE").unwrap_or(default.history_file),
            history_max_entries: std::env::var("HISTORY_MAX_ENTRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.history_max_entries),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(default.export_dir),
            export_delay_ms: std::env::var("EXPORT_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.export_delay_ms),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(default.chrome_executable),
            settings_file: std::env::var("SETTINGS_FILE").unwrap_or(default.settings_file),
            source_dir: std::env::var("SOURCE_DIR").unwrap_or(default.source_dir),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history_max_entries".to_string(),
                reason: "至少需要保留 1 份试卷".to_string(),
            });
        }
        if self.export_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export_delay_ms".to_string(),
                reason: "连续导出之间必须留有间隔".to_string(),
            });
        }
        if self.generation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generation_timeout_secs".to_string(),
                reason: "超时时间必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}
