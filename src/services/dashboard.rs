//! Dashboard service

use crate::db::repositories::DashboardRepository;
use crate::models::DashboardStats;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Admin overview statistics
pub struct DashboardService {
    repo: Arc<dyn DashboardRepository>,
}

impl DashboardService {
    pub fn new(repo: Arc<dyn DashboardRepository>) -> Self {
        Self { repo }
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        self.repo.stats().await.context("Failed to collect dashboard stats")
    }
}
