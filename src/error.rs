use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 生成链路错误（请求构建、调用、解析）
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 编辑错误
    #[error("编辑错误: {0}")]
    Edit(#[from] EditError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 生成链路错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 缺少源文件或设置不合法，请求不会发出
    #[error("无法发起生成请求: {reason}")]
    Configuration { reason: String },

    /// 生成服务返回的数据不符合结构约定
    #[error("生成结果无法解析: {reason}")]
    MalformedResponse { reason: String },

    /// 凭证失效（"Requested entity was not found"），需要重新选择凭证
    #[error("凭证无效或不存在，请重新选择: {message}")]
    Credential { message: String },

    /// 生成服务的其他错误
    #[error("生成服务调用失败: {message}")]
    Provider { message: String },

    /// 超时
    #[error("生成请求超时 ({seconds} 秒)")]
    Timeout { seconds: u64 },

    /// 已有生成请求在进行中
    #[error("已有生成请求正在进行，请稍后再试")]
    Busy,
}

/// 编辑错误
#[derive(Debug, Error)]
pub enum EditError {
    /// 题目定位超出范围
    #[error(
        "题目位置 ({section_index}, {question_index}) 超出范围: 共 {section_count} 个分区, 该分区共 {question_count} 题"
    )]
    IndexOutOfRange {
        section_index: usize,
        question_index: usize,
        section_count: usize,
        question_count: usize,
    },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 渲染/导出失败，建议改用直接打印
    #[error("导出 {filename} 失败: {reason}（可改用直接打印）")]
    Failed { filename: String, reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 不支持的文件类型
    #[error("不支持的文件类型 {mime_type}: {name}（仅支持 PDF 与 JPG/PNG/WebP 图片）")]
    UnsupportedType { name: String, mime_type: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 缺少源文件等前置条件不满足
    pub fn configuration(reason: impl Into<String>) -> Self {
        AppError::Generation(GenerationError::Configuration {
            reason: reason.into(),
        })
    }

    /// 生成结果不符合结构约定
    pub fn malformed_response(reason: impl Into<String>) -> Self {
        AppError::Generation(GenerationError::MalformedResponse {
            reason: reason.into(),
        })
    }

    /// 导出失败
    pub fn export_failed(filename: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Export(ExportError::Failed {
            filename: filename.into(),
            reason: reason.to_string(),
        })
    }

    /// 读取文件失败
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 写入文件失败
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为凭证失效，调用方需要走重新选择凭证的流程
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            AppError::Generation(GenerationError::Credential { .. })
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::malformed_response(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_error_detection() {
        let err = AppError::Generation(GenerationError::Credential {
            message: "Requested entity was not found".to_string(),
        });
        assert!(err.is_credential_error());
        assert!(!AppError::configuration("no sources").is_credential_error());
    }

    #[test]
    fn test_export_error_suggests_direct_print() {
        let err = AppError::export_failed("Exam_Math_Student.pdf", "browser crashed");
        let message = err.to_string();
        assert!(message.contains("Exam_Math_Student.pdf"));
        assert!(message.contains("直接打印"));
    }

    #[test]
    fn test_serde_error_maps_to_malformed_response() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            AppError::Generation(GenerationError::MalformedResponse { .. })
        ));
    }
}
