// src/client.rs

use crate::{
    config::{self, AppConfig},
    error::*,
};
use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;
use url::Url;

/// 路径参数编码时保留的字符
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// 后端统一的响应包装
#[derive(Deserialize, Debug)]
struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    message: Option<String>,
    data: Option<T>,
}

fn default_success() -> bool {
    true
}

#[derive(Deserialize, Debug, Default)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// 当前会话的 Access Token，可在运行期间被替换或清除
pub type SessionToken = Arc<TokioMutex<Option<String>>>;

#[derive(Clone)]
pub struct RobustClient {
    /// 读请求使用，带瞬时错误重试
    read_client: ClientWithMiddleware,
    /// 写请求使用，不做任何重试
    write_client: ClientWithMiddleware,
    config: Arc<AppConfig>,
    token: SessionToken,
    forget_persisted_token: bool,
}

impl RobustClient {
    pub fn new(config: Arc<AppConfig>, token: SessionToken) -> AppResult<Self> {
        let build_inner = || {
            reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .connect_timeout(config.connect_timeout)
                .timeout(config.timeout)
                .build()
        };

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_read_retries);
        let read_client = ClientBuilder::new(build_inner()?)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let write_client = ClientBuilder::new(build_inner()?).build();

        Ok(Self {
            read_client,
            write_client,
            config,
            token,
            forget_persisted_token: false,
        })
    }

    /// 收到 401 时同时清除配置文件中的 Token
    pub fn persist_logout(mut self, enabled: bool) -> Self {
        self.forget_persisted_token = enabled;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session_token(&self) -> SessionToken {
        self.token.clone()
    }

    pub async fn has_token(&self) -> bool {
        self.token.lock().await.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// 将 `{key}` 形式的路径模板展开为完整 URL
    pub fn endpoint(&self, template: &str, params: &[(&str, &str)]) -> AppResult<Url> {
        let mut path = template.to_string();
        for (key, val) in params {
            let encoded = utf8_percent_encode(val, PATH_SEGMENT).to_string();
            path = path.replace(&format!("{{{}}}", key), &encoded);
        }
        Ok(self.config.api_base_url.join(&path)?)
    }

    async fn authorize(&self, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        let guard = self.token.lock().await;
        match guard.as_deref() {
            Some(token) if !token.is_empty() => Ok(builder.bearer_auth(token)),
            _ => Err(AppError::TokenMissing),
        }
    }

    /// 401 视为会话失效：清除内存中的 Token，必要时清除本地配置
    async fn force_logout(&self) {
        warn!("收到 401，清除本地认证状态");
        *self.token.lock().await = None;
        if self.forget_persisted_token
            && let Err(e) = config::token::clear_token()
        {
            warn!("清除本地 Token 失败: {}", e);
        }
    }

    async fn check_status(&self, res: Response) -> AppResult<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let url = res.url().to_string();
        let text = res.text().await.unwrap_or_default();
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body
            .message
            .or(body.error)
            .unwrap_or_else(|| crate::utils::truncate_text(text.trim(), 120));
        debug!("请求 '{}' 失败: {} {}", url, status, message);

        match status {
            StatusCode::UNAUTHORIZED => {
                self.force_logout().await;
                Err(AppError::Unauthorized)
            }
            StatusCode::FORBIDDEN => Err(AppError::AccessDenied(message)),
            StatusCode::NOT_FOUND => Err(AppError::NotFound(message)),
            _ => Err(AppError::Api { status, message }),
        }
    }

    async fn send(&self, builder: RequestBuilder, auth: bool) -> AppResult<Response> {
        let builder = if auth { self.authorize(builder).await? } else { builder };
        let res = builder.send().await?;
        self.check_status(res).await
    }

    async fn decode<T: DeserializeOwned>(res: Response) -> AppResult<T> {
        let url = res.url().to_string();
        let bytes = res.bytes().await?;
        let envelope: ApiEnvelope<T> =
            serde_json::from_slice(&bytes).map_err(|source| AppError::ApiParseFailed {
                url: url.clone(),
                source,
            })?;
        if !envelope.success {
            return Err(AppError::Api {
                status: StatusCode::OK,
                message: envelope.message.unwrap_or_else(|| "请求未成功".to_string()),
            });
        }
        envelope.data.ok_or(AppError::EmptyResponse { url })
    }

    /// 不关心响应数据的写操作
    async fn expect_success(res: Response) -> AppResult<()> {
        let url = res.url().to_string();
        let bytes = res.bytes().await?;
        if bytes.is_empty() {
            return Ok(());
        }
        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_slice(&bytes)
            .map_err(|source| AppError::ApiParseFailed { url, source })?;
        if envelope.success {
            Ok(())
        } else {
            Err(AppError::Api {
                status: StatusCode::OK,
                message: envelope.message.unwrap_or_else(|| "请求未成功".to_string()),
            })
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        template: &str,
        params: &[(&str, &str)],
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = self.endpoint(template, params)?;
        debug!("GET {}", url);
        let res = self
            .send(self.read_client.get(url).query(query), true)
            .await?;
        Self::decode(res).await
    }

    /// 不附带认证信息的 GET (例如证书验证)
    pub async fn get_public_json<T: DeserializeOwned>(
        &self,
        template: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = self.endpoint(template, params)?;
        debug!("GET (public) {}", url);
        let res = self.send(self.read_client.get(url), false).await?;
        Self::decode(res).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        template: &str,
        params: &[(&str, &str)],
        body: &B,
    ) -> AppResult<T> {
        let url = self.endpoint(template, params)?;
        debug!("POST {}", url);
        let res = self.send(self.write_client.post(url).json(body), true).await?;
        Self::decode(res).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        template: &str,
        params: &[(&str, &str)],
        body: &B,
    ) -> AppResult<T> {
        let url = self.endpoint(template, params)?;
        debug!("PUT {}", url);
        let res = self.send(self.write_client.put(url).json(body), true).await?;
        Self::decode(res).await
    }

    pub async fn post_empty(&self, template: &str, params: &[(&str, &str)]) -> AppResult<()> {
        let url = self.endpoint(template, params)?;
        debug!("POST {}", url);
        let res = self.send(self.write_client.post(url), true).await?;
        Self::expect_success(res).await
    }

    pub async fn delete(&self, template: &str, params: &[(&str, &str)]) -> AppResult<()> {
        let url = self.endpoint(template, params)?;
        debug!("DELETE {}", url);
        let res = self.send(self.write_client.delete(url), true).await?;
        Self::expect_success(res).await
    }

    /// 原始响应，用于下载文件
    pub async fn get_raw(&self, template: &str, params: &[(&str, &str)]) -> AppResult<Response> {
        let url = self.endpoint(template, params)?;
        debug!("GET (raw) {}", url);
        self.send(self.read_client.get(url), true).await
    }
}
