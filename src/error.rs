// src/error.rs

use reqwest::StatusCode;
use thiserror::Error;

/// 课时无法标记为完成的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionBlock {
    /// 课程中不存在该课时
    UnknownLesson,
    /// 课时内容被锁定 (无访问权限)
    Locked,
    /// 已经完成
    AlreadyCompleted,
    /// 测验/编程题尚未有通过的提交
    AssessmentNotPassed,
}

impl std::fmt::Display for CompletionBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            CompletionBlock::UnknownLesson => "课程中不存在该课时",
            CompletionBlock::Locked => "课时内容已锁定，请先购买或订阅课程",
            CompletionBlock::AlreadyCompleted => "课时已完成",
            CompletionBlock::AssessmentNotPassed => "需要先通过测验或提交通过的代码",
        };
        f.write_str(msg)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("认证失败 (Token 无效或已过期)，请重新登录")]
    Unauthorized,
    #[error("未提供 Access Token，请先执行 login")]
    TokenMissing,
    #[error("无权访问该资源: {0}")]
    AccessDenied(String),
    #[error("资源不存在: {0}")]
    NotFound(String),
    #[error("服务器返回错误 ({status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("网络中间件错误: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("临时文件持久化失败: {0}")]
    TempFilePersist(#[from] tempfile::PersistError),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("无法解析来自 '{url}' 的API响应: {source}")]
    ApiParseFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("来自 '{url}' 的API响应缺少数据")]
    EmptyResponse { url: String },
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("无法完成课时: {0}")]
    CompletionNotAllowed(CompletionBlock),
    #[error("课程进度为 {progress}%，完成全部课时后才能申请证书")]
    CertificateNotEligible { progress: u8 },
    #[error("测验状态错误: {0}")]
    QuizState(String),
    #[error("用户中断")]
    UserInterrupt,
    #[error("{0}")] // 只打印内部信息，不加任何前缀
    UserInputError(String),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// 会话级致命错误：需要清除本地认证状态
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}

pub type AppResult<T> = Result<T, AppError>;
