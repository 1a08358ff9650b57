use base64::Engine;

/// 支持上传的源材料类型
pub const SUPPORTED_MIME_TYPES: [&str; 4] =
    ["application/pdf", "image/jpeg", "image/png", "image/webp"];

/// 已读入内存的源材料
///
/// 读入后不可变，随生成请求一起发出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub name: String,
}

impl SourceFile {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            name: name.into(),
        }
    }

    pub fn is_supported_type(mime_type: &str) -> bool {
        SUPPORTED_MIME_TYPES.contains(&mime_type)
    }
}

/// 编码为 `data:` URL
pub fn encode_data_url(mime_type: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(data)
    )
}
