//! Per-capability request and token usage counters

use crate::api::TokenUsage;
use crate::registry::Category;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Counters for one capability category
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CategoryUsage {
    pub requests: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl CategoryUsage {
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

#[derive(Debug, Clone, Default)]
pub struct UsageMetrics {
    per_category: HashMap<Category, CategoryUsage>,
}

impl UsageMetrics {
    pub fn record_success(&mut self, category: Category, usage: Option<TokenUsage>) {
        let entry = self.per_category.entry(category).or_default();
        entry.requests += 1;
        entry.succeeded += 1;
        if let Some(usage) = usage {
            entry.prompt_tokens += usage.prompt_tokens as u64;
            entry.completion_tokens += usage.completion_tokens as u64;
        }
    }

    pub fn record_failure(&mut self, category: Category) {
        let entry = self.per_category.entry(category).or_default();
        entry.requests += 1;
        entry.failed += 1;
    }

    pub fn get(&self, category: Category) -> CategoryUsage {
        self.per_category.get(&category).copied().unwrap_or_default()
    }
}

/// Shareable usage tracker
#[derive(Clone, Default)]
pub struct UsageTracker {
    inner: Arc<Mutex<UsageMetrics>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, category: Category, usage: Option<TokenUsage>) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.record_success(category, usage);
        }
    }

    pub fn record_failure(&self, category: Category) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.record_failure(category);
        }
    }

    pub fn summary(&self) -> UsageSummary {
        let metrics = self.inner.lock().map(|m| m.clone()).unwrap_or_default();
        UsageSummary {
            categories: Category::all()
                .into_iter()
                .map(|c| (c, metrics.get(c)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageSummary {
    pub categories: Vec<(Category, CategoryUsage)>,
}

impl UsageSummary {
    pub fn total_requests(&self) -> u64 {
        self.categories.iter().map(|(_, u)| u.requests).sum()
    }

    pub fn total_tokens(&self) -> u64 {
        self.categories.iter().map(|(_, u)| u.total_tokens()).sum()
    }
}

impl std::fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Usage Summary ===")?;
        for (category, usage) in &self.categories {
            writeln!(
                f,
                "{:<6} {} requests ({} ok, {} failed), {} tokens",
                category.as_str(),
                usage.requests,
                usage.succeeded,
                usage.failed,
                usage.total_tokens()
            )?;
        }
        writeln!(f, "Total requests: {}", self.total_requests())?;
        writeln!(f, "Total tokens: {}", self.total_tokens())?;
        Ok(())
    }
}
