//! LLM 服务 - 业务能力层
//!
//! 只负责"按请求生成试卷 JSON"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Gemini, Doubao 等）
//! - 源材料以 `data:` URL 形式随用户消息发送

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, GenerationError};
use crate::services::request_builder::GenerationRequest;

/// 凭证失效时生成服务返回的错误片段
pub const CREDENTIAL_NOT_FOUND: &str = "Requested entity was not found";

/// 内容生成能力
///
/// 输入：媒体 + 指令 + 结构约定；输出：符合约定的 JSON 对象
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> AppResult<JsonValue>;
}

/// 把生成服务的错误信息归类
///
/// 只有凭证失效需要单独处理，其余一律视为普通调用失败
pub fn classify_provider_error(message: impl Into<String>) -> AppError {
    let message = message.into();
    if message.contains(CREDENTIAL_NOT_FOUND) {
        AppError::Generation(GenerationError::Credential { message })
    } else {
        AppError::Generation(GenerationError::Provider { message })
    }
}

/// 解析模型返回的文本，容忍 ```json 代码块包裹
pub fn parse_json_content(content: &str) -> AppResult<JsonValue> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: JsonValue = serde_json::from_str(body)?;
    if !value.is_object() {
        return Err(AppError::malformed_response("返回内容不是 JSON 对象"));
    }
    Ok(value)
}

/// LLM 服务
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    fn build_messages(
        &self,
        request: &GenerationRequest,
    ) -> AppResult<Vec<ChatCompletionRequestMessage>> {
        let system_message = format!(
            "You are an expert examiner. Respond with a single JSON object that matches this JSON schema exactly:\n{}",
            request.schema
        );
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()
            .map_err(|e| classify_provider_error(e.to_string()))?;

        // 媒体在前，指令在后
        let mut content_parts: Vec<ChatCompletionRequestUserMessageContentPart> = request
            .media
            .iter()
            .map(|media| {
                ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: media.data_url(),
                            detail: Some(ImageDetail::High),
                        },
                    },
                )
            })
            .collect();
        content_parts.push(ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartText {
                text: request.instruction.clone(),
            },
        ));

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(|e| classify_provider_error(e.to_string()))?;

        Ok(vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ])
    }
}

#[async_trait]
impl ContentGenerator for LlmService {
    async fn generate(&self, request: &GenerationRequest) -> AppResult<JsonValue> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!(
            "包含 {} 个媒体, 指令长度: {} 字符",
            request.media.len(),
            request.instruction.len()
        );

        let messages = self.build_messages(request)?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.4)
            .build()
            .map_err(|e| classify_provider_error(e.to_string()))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            classify_provider_error(e.to_string())
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::malformed_response("LLM 返回内容为空"))?;

        parse_json_content(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneratorSettings, SourceFile};
    use crate::services::request_builder::build_request;

    #[test]
    fn test_classify_credential_error() {
        let err = classify_provider_error("404: Requested entity was not found.");
        assert!(err.is_credential_error());

        let err = classify_provider_error("500: internal error");
        assert!(matches!(
            err,
            AppError::Generation(GenerationError::Provider { .. })
        ));
    }

    #[test]
    fn test_parse_json_content_with_code_fence() {
        let value = parse_json_content("```json\n{\"title\": \"T\"}\n```").unwrap();
        assert_eq!(value["title"], "T");

        let value = parse_json_content("  {\"a\": 1} ").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_parse_json_content_rejects_non_object() {
        assert!(parse_json_content("[1, 2]").is_err());
        assert!(parse_json_content("Sorry, I cannot help").is_err());
    }

    #[test]
    fn test_build_messages_puts_media_before_instruction() {
        let service = LlmService::new(&Config::default());
        let request = build_request(
            &GeneratorSettings::default(),
            &[SourceFile::new(b"hi".to_vec(), "image/png", "a.png")],
        )
        .unwrap();

        let messages = service.build_messages(&request).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(request.media[0].data_url(), "data:image/png;base64,aGk=");
    }
}
