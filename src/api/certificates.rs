// src/api/certificates.rs

use crate::{
    client::RobustClient,
    constants::api::certificates,
    error::{AppError, AppResult},
    models::{Certificate, CertificateVerification, api::IssueCertificateRequest},
    utils,
};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use reqwest::header::CONTENT_DISPOSITION;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

pub struct CertificateService {
    http_client: Arc<RobustClient>,
}

impl CertificateService {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self { http_client }
    }

    pub async fn issue(&self, course_id: &str) -> AppResult<Certificate> {
        info!("为课程 '{}' 申请证书", course_id);
        self.http_client
            .post_json(certificates::ISSUE, &[], &IssueCertificateRequest { course_id })
            .await
    }

    pub async fn mine(&self) -> AppResult<Vec<Certificate>> {
        self.http_client.get_json(certificates::MINE, &[], &[]).await
    }

    /// 公开接口，不附带 Token
    pub async fn verify(&self, token: &str) -> AppResult<CertificateVerification> {
        if token.trim().is_empty() {
            return Err(AppError::UserInputError("验证码不能为空".to_string()));
        }
        self.http_client
            .get_public_json(certificates::VERIFY, &[("token", token.trim())])
            .await
    }

    /// 下载证书 PDF 到指定目录，先写临时文件，完成后再改名
    pub async fn download(&self, certificate_id: &str, dir: &Path) -> AppResult<PathBuf> {
        let res = self
            .http_client
            .get_raw(certificates::DOWNLOAD, &[("id", certificate_id)])
            .await?;

        let filename = res
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(utils::filename_from_content_disposition)
            .unwrap_or_else(|| format!("certificate-{}.pdf", certificate_id));
        let target = dir.join(utils::sanitize_filename(&filename));
        debug!("证书将保存至 {}", target.display());

        fs::create_dir_all(dir)?;
        let pbar = match res.content_length() {
            Some(len) => {
                let pbar = ProgressBar::new(len);
                pbar.set_style(
                    ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                pbar
            }
            None => ProgressBar::new_spinner(),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        let mut stream = res.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            file.write_all(&chunk)?;
            pbar.inc(chunk.len() as u64);
        }
        pbar.finish_and_clear();
        file.persist(&target)?;

        info!("证书已保存: {}", target.display());
        Ok(target)
    }
}
