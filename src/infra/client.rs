use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::error::{AppError, Result};
use crate::infra::config::AppConfig;
use crate::infra::utils::{error_detail, fallback_filename, filename_from_disposition};
use crate::models::augment::{AugmentRequest, AugmentResponse};
use crate::models::auth::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
    TokenResponse, UserProfile,
};
use crate::models::export::{ExportFormat, ExportPayload, ExportQuery, ExportedFile};
use crate::models::request::{DomainList, GenerationRequest};
use crate::models::result::{HistoryEntry, HistoryList};

/// 生成接口的响应外壳，只关心 data
#[derive(Debug, Deserialize)]
struct GenerateEnvelope {
    data: Value,
}

/// 远程合成数据服务的 HTTP 客户端，不做重试
#[derive(Debug, Clone)]
pub struct GeneratorClient {
    base_url: String,
    client: reqwest::Client,
}

impl GeneratorClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 把传输层错误翻译成带上下文的提示
    fn transport_error(e: reqwest::Error, url: &str, operation: &str) -> AppError {
        let reason = if e.is_timeout() {
            "timeout - request took too long".to_string()
        } else if e.is_connect() {
            format!("connection error - check that the generation service is reachable: {}", e)
        } else if e.is_decode() {
            format!("decode error - unexpected response format: {}", e)
        } else {
            e.to_string()
        };
        error!("{} 失败: url={}, reason={}", operation, url, reason);
        AppError::RemoteRequestFailed(format!("failed to {} at {}: {}", operation, url, reason))
    }

    /// 非 2xx 统一转换；带令牌的请求收到 401 视为会话过期
    async fn check_status(
        response: reqwest::Response,
        url: &str,
        authenticated: bool,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if authenticated && status == StatusCode::UNAUTHORIZED {
            info!("远程服务返回 401，会话已过期: url={}", url);
            return Err(AppError::SessionExpired);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            error_detail(&body)
        };
        error!("远程服务返回错误: url={}, status={}, detail={}", url, status.as_u16(), detail);
        Err(AppError::RemoteRequestFailed(format!("HTTP {}: {}", status.as_u16(), detail)))
    }

    async fn send(
        &self,
        request: RequestBuilder,
        url: &str,
        operation: &str,
        authenticated: bool,
    ) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Self::transport_error(e, url, operation))?;
        Self::check_status(response, url, authenticated).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
        operation: &str,
        authenticated: bool,
    ) -> Result<T> {
        let response = self.send(request, url, operation, authenticated).await?;
        let text = response
            .text()
            .await
            .map_err(|e| Self::transport_error(e, url, operation))?;
        serde_json::from_str(&text).map_err(|e| {
            AppError::MalformedResponse(format!("{} returned unexpected body: {}", operation, e))
        })
    }

    // --- 凭证相关：对网关而言只是透传 ---

    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<TokenResponse> {
        let url = self.url("/token");
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let req = self.client.post(&url).form(&form);
        self.send_json(req, &url, "log in", false).await
    }

    pub async fn register(&self, payload: &RegisterRequest) -> Result<UserProfile> {
        let url = self.url("/register");
        let req = self.client.post(&url).json(payload);
        self.send_json(req, &url, "register", false).await
    }

    pub async fn forgot_password(&self, payload: &ForgotPasswordRequest) -> Result<MessageResponse> {
        let url = self.url("/forgot-password");
        let req = self.client.post(&url).json(payload);
        self.send_json(req, &url, "request password reset", false).await
    }

    pub async fn reset_password(&self, payload: &ResetPasswordRequest) -> Result<MessageResponse> {
        let url = self.url("/reset-password");
        let req = self.client.post(&url).json(payload);
        self.send_json(req, &url, "reset password", false).await
    }

    pub async fn me(&self, token: &str) -> Result<UserProfile> {
        let url = self.url("/me");
        let req = self.client.get(&url).bearer_auth(token);
        self.send_json(req, &url, "fetch current user", true).await
    }

    // --- 生成与历史 ---

    pub async fn domains(&self, token: &str) -> Result<Vec<String>> {
        let url = self.url("/domains");
        let req = self.client.get(&url).bearer_auth(token);
        let list: DomainList = self.send_json(req, &url, "fetch domains", true).await?;
        Ok(list.domains)
    }

    /// 返回响应中的原始 `data`，由会话按模式归一化
    #[instrument(skip(self, token, request), fields(mode = ?request.mode()))]
    pub async fn generate(&self, token: &str, request: &GenerationRequest) -> Result<Value> {
        let url = self.url(request.endpoint());
        debug!("发送生成请求: url={}, constraints={}", url, request.constraints().len());
        let req = self.client.post(&url).bearer_auth(token).json(request);
        let envelope: GenerateEnvelope = self.send_json(req, &url, "generate data", true).await?;
        Ok(envelope.data)
    }

    pub async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>> {
        let url = self.url("/history");
        let req = self.client.get(&url).bearer_auth(token);
        let list: HistoryList = self.send_json(req, &url, "fetch history", true).await?;
        Ok(list.history)
    }

    pub async fn augment(&self, token: &str, request: &AugmentRequest) -> Result<AugmentResponse> {
        let url = self.url("/augment");
        let req = self.client.post(&url).bearer_auth(token).json(request);
        self.send_json(req, &url, "augment data", true).await
    }

    // --- 导出 ---

    async fn download(
        &self,
        req: RequestBuilder,
        url: &str,
        format: ExportFormat,
        domain: &str,
    ) -> Result<ExportedFile> {
        let response = self.send(req, url, "export data", true).await?;
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| fallback_filename(domain, format, chrono::Utc::now()));
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| format.mime_type().to_string());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::transport_error(e, url, "read export body"))?;
        info!("导出完成: file={}, bytes={}", filename, bytes.len());
        Ok(ExportedFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    /// 把当前数据 POST 给导出接口
    pub async fn export(
        &self,
        token: &str,
        format: ExportFormat,
        payload: &ExportPayload,
    ) -> Result<ExportedFile> {
        let url = self.url(&format!("/export/{}", format.path_segment()));
        let req = self.client.post(&url).bearer_auth(token).json(payload);
        self.download(req, &url, format, &payload.domain).await
    }

    /// 查询串形式的导出，由服务端按 domain/rows 重新生成
    pub async fn export_by_query(
        &self,
        token: &str,
        format: ExportFormat,
        query: &ExportQuery,
    ) -> Result<ExportedFile> {
        let url = self.url(&format!("/export/{}", format.path_segment()));
        let req = self.client.get(&url).bearer_auth(token).query(query);
        self.download(req, &url, format, &query.domain).await
    }
}
