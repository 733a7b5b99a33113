// src/store/certificates.rs

use crate::models::{Certificate, CertificateVerification};
use std::{collections::HashMap, path::PathBuf};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CertificateState {
    /// 以课程 ID 为键，每门课程每位学员最多一张证书
    pub by_course: HashMap<String, Certificate>,
    pub verification: Option<CertificateVerification>,
    pub last_download: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CertificateEvent {
    Loaded(Vec<Certificate>),
    Issued(Certificate),
    Verified(CertificateVerification),
    Downloaded(PathBuf),
}

impl CertificateState {
    pub fn for_course(&self, course_id: &str) -> Option<&Certificate> {
        self.by_course.get(course_id)
    }

    /// 按颁发时间排序，最新的在前
    pub fn list(&self) -> Vec<&Certificate> {
        let mut list: Vec<&Certificate> = self.by_course.values().collect();
        list.sort_by(|a, b| b.issued_at.cmp(&a.issued_at).then_with(|| a.id.cmp(&b.id)));
        list
    }

    pub fn reduce(mut self, event: CertificateEvent) -> Self {
        match event {
            CertificateEvent::Loaded(list) => {
                self.by_course = list
                    .into_iter()
                    .map(|c| (c.course_id.clone(), c))
                    .collect();
            }
            CertificateEvent::Issued(cert) => {
                self.by_course.insert(cert.course_id.clone(), cert);
            }
            CertificateEvent::Verified(v) => self.verification = Some(v),
            CertificateEvent::Downloaded(path) => self.last_download = Some(path),
        }
        self
    }
}
