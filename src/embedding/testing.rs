//! Embedder test double.

use super::Embedder;
use crate::error::{GanjError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Returns a fixed vector for every input and fails on chosen calls.
pub(crate) struct StubEmbedder {
    vector: Vec<f32>,
    failing_calls: HashSet<usize>,
    fail_single: bool,
    single_calls: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
}

impl StubEmbedder {
    pub(crate) fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            failing_calls: HashSet::new(),
            fail_single: false,
            single_calls: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    /// Fail the batch call with this zero-based call number.
    pub(crate) fn failing_on(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    /// Fail every single-text `embed` call.
    pub(crate) fn failing_single(mut self) -> Self {
        self.fail_single = true;
        self
    }

    /// Number of single-text `embed` calls, including failed ones.
    pub(crate) fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    /// Sizes of all batch calls made so far, including failed ones.
    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_single {
            return Err(GanjError::OpenAI("stub embedding outage".to_string()));
        }
        Ok(self.vector.clone())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let call = {
            let mut sizes = self.batch_sizes.lock().unwrap();
            sizes.push(texts.len());
            sizes.len() - 1
        };
        if self.failing_calls.contains(&call) {
            return Err(GanjError::OpenAI(format!("stub failure on call {}", call)));
        }
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }
}
