//! In-memory provider used by tests and the CLI's `--offline` flag — no
//! network call is ever made.

use crate::provider::{CompileRequest, LlmError, LlmProvider, LlmResult};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Looks up a canned response by the lower-cased, trimmed restriction; falls
/// back to a minimal, permissive-shaped policy that simply echoes the
/// suggested action and the restriction as its description, so `--offline`
/// never hard-fails on an un-fixtured restriction.
pub struct FixtureProvider {
    fixtures: Mutex<HashMap<String, Value>>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self {
            fixtures: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_fixture(self, restriction: impl Into<String>, response: Value) -> Self {
        self.fixtures
            .lock()
            .expect("fixture lock poisoned")
            .insert(restriction.into().trim().to_lowercase(), response);
        self
    }
}

impl Default for FixtureProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmProvider for FixtureProvider {
    async fn compile_structured(&self, request: CompileRequest) -> LlmResult<Value> {
        let key = request.restriction.trim().to_lowercase();
        if let Some(fixture) = self.fixtures.lock().expect("fixture lock poisoned").get(&key) {
            return Ok(fixture.clone());
        }
        Ok(json!({
            "action": request.suggested_action.as_str(),
            "include": ["**"],
            "exclude": [],
            "description": request.restriction,
        }))
    }
}
