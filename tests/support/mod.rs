//! テスト用のスクリプト化バックエンド

#![allow(dead_code)]

use async_trait::async_trait;
use smart_fridge::api::Backend;
use smart_fridge::error::{FridgeError, Result};
use smart_fridge::upload::FileBlob;
use smart_fridge_common::{
    AnalyzeRequest, DetectRequest, DetectedItem, PlanRequest, PlannedItem, PresignRequest,
    ResultBundle, UploadTarget,
};
use smart_fridge_common::demo::demo_bundle;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn server_error() -> FridgeError {
    FridgeError::Status {
        status: 500,
        body: "internal error".into(),
    }
}

/// 呼び出しを記録し、設定どおりに応答するフェイク
#[derive(Default)]
pub struct FakeBackend {
    failing_files: HashSet<String>,
    failing_puts: HashSet<String>,
    put_delays: HashMap<String, Duration>,
    detections: Vec<DetectedItem>,
    detect_fails: bool,
    detect_delay: Duration,
    planned: Vec<PlannedItem>,
    plan_fails: bool,
    analyze_failures: AtomicUsize,
    analyze_delay: Duration,
    pub uploaded: Mutex<Vec<String>>,
    pub detect_requests: Mutex<Vec<DetectRequest>>,
    pub plan_requests: Mutex<Vec<PlanRequest>>,
    pub analyze_requests: Mutex<Vec<AnalyzeRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// このファイル名のアップロード先取得を失敗させる
    pub fn fail_file(mut self, file_name: &str) -> Self {
        self.failing_files.insert(file_name.to_string());
        self
    }

    /// このファイル名の転送（PUT）を失敗させる。アップロード先の取得は成功する
    pub fn fail_put(mut self, file_name: &str) -> Self {
        self.failing_puts.insert(file_name.to_string());
        self
    }

    /// このファイル名の転送を遅らせる
    pub fn delay_put(mut self, file_name: &str, delay: Duration) -> Self {
        self.put_delays.insert(file_name.to_string(), delay);
        self
    }

    pub fn with_detections(mut self, items: &[(&str, u32, f64)]) -> Self {
        self.detections = items
            .iter()
            .map(|(name, count, confidence)| DetectedItem {
                name: name.to_string(),
                count: *count,
                confidence: *confidence,
            })
            .collect();
        self
    }

    pub fn failing_detect(mut self) -> Self {
        self.detect_fails = true;
        self
    }

    pub fn delay_detect(mut self, delay: Duration) -> Self {
        self.detect_delay = delay;
        self
    }

    pub fn with_plan(mut self, items: Vec<PlannedItem>) -> Self {
        self.planned = items;
        self
    }

    pub fn failing_plan(mut self) -> Self {
        self.plan_fails = true;
        self
    }

    /// 最初の `count` 回の解析を失敗させる
    pub fn failing_analyze(self, count: usize) -> Self {
        self.analyze_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn delay_analyze(mut self, delay: Duration) -> Self {
        self.analyze_delay = delay;
        self
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_requests.lock().unwrap().len()
    }

    pub fn plan_calls(&self) -> usize {
        self.plan_requests.lock().unwrap().len()
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_requests.lock().unwrap().len()
    }

    pub fn network_calls(&self) -> usize {
        self.uploaded.lock().unwrap().len() + self.detect_calls() + self.plan_calls() + self.analyze_calls()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn presign(&self, request: &PresignRequest) -> Result<UploadTarget> {
        if self.failing_files.contains(&request.file_name) {
            return Err(server_error());
        }
        Ok(UploadTarget {
            upload_url: format!("https://storage.test/uploads/{}", request.file_name),
            key: format!("uploads/{}", request.file_name),
            expires_in: 3600,
        })
    }

    async fn put_object(&self, target: &UploadTarget, _content_type: &str, _bytes: &[u8]) -> Result<()> {
        let file_name = target.key.trim_start_matches("uploads/");
        if let Some(delay) = self.put_delays.get(file_name) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_puts.contains(file_name) {
            return Err(server_error());
        }
        self.uploaded.lock().unwrap().push(target.key.clone());
        Ok(())
    }

    async fn detect(&self, request: &DetectRequest) -> Result<Vec<DetectedItem>> {
        self.detect_requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.detect_delay).await;
        if self.detect_fails {
            return Err(server_error());
        }
        Ok(self.detections.clone())
    }

    async fn plan(&self, request: &PlanRequest) -> Result<Vec<PlannedItem>> {
        self.plan_requests.lock().unwrap().push(request.clone());
        if self.plan_fails {
            return Err(server_error());
        }
        Ok(self.planned.clone())
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<ResultBundle> {
        self.analyze_requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.analyze_delay).await;
        let remaining = self.analyze_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.analyze_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(server_error());
        }
        Ok(demo_bundle(&request.inventory))
    }

    async fn health(&self) -> Result<bool> {
        Ok(true)
    }
}

pub fn image(name: &str) -> FileBlob {
    FileBlob::new(name, "image/jpeg", vec![0xff, 0xd8, 0xff])
}

pub fn images(names: &[&str]) -> Vec<FileBlob> {
    names.iter().map(|name| image(name)).collect()
}
