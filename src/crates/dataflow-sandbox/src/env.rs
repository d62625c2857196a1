//! [`LocalCodeRunner`]: the concrete `ExecutionEnvironment` wired from a
//! [`CommandCodeRunner`] and a [`CompletionProvider`], per SPEC_FULL.md
//! §4.10.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dataflow_graph::error::{GraphError, Result};
use dataflow_graph::exec_env::ExecutionEnvironment;
use dataflow_graph::value::Value;

use crate::command::{format_code_for_execution, parse_output, CommandCodeRunner, ShellCommandRunner, DEFAULT_TIMEOUT};
use crate::completion::{format_prompt, CompletionProvider, EchoCompletionProvider};

/// Combines a [`CommandCodeRunner`] and a [`CompletionProvider`] into the
/// single `ExecutionEnvironment` that `dataflow-graph` dispatches `Code` and
/// `Llm` blocks through — the real-adapter counterpart to the in-memory
/// stubs the core crate's own tests use.
pub struct LocalCodeRunner {
    command_runner: Arc<dyn CommandCodeRunner>,
    completion_provider: Arc<dyn CompletionProvider>,
    timeout: Duration,
}

impl LocalCodeRunner {
    /// Build a runner from explicit collaborators and a timeout.
    pub fn new(
        command_runner: Arc<dyn CommandCodeRunner>,
        completion_provider: Arc<dyn CompletionProvider>,
        timeout: Duration,
    ) -> Self {
        Self { command_runner, completion_provider, timeout }
    }

    /// Build the default runner: `python3 -c`, an [`EchoCompletionProvider`],
    /// and the 10-second default timeout.
    pub fn offline_default() -> Self {
        Self::new(Arc::new(ShellCommandRunner::python3()), Arc::new(EchoCompletionProvider), DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl ExecutionEnvironment for LocalCodeRunner {
    async fn execute_code(
        &self,
        source: &str,
        inputs: &HashMap<String, Value>,
        outputs: &[String],
    ) -> Result<HashMap<String, Value>> {
        let program = format_code_for_execution(source, inputs, outputs);
        let output = self
            .command_runner
            .run(&program, self.timeout)
            .await
            .map_err(|e| GraphError::execution_failed("code", e.to_string()))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            tracing::warn!(exit_code = code, %stderr, "code block process exited non-zero");
            return Err(GraphError::execution_failed("code", format!("process exited with status {code}: {stderr}")));
        }

        parse_output(&output.stdout).map_err(|e| GraphError::execution_failed("code", e.to_string()))
    }

    async fn complete(&self, prompt: &str, inputs: &HashMap<String, Value>) -> Result<String> {
        let formatted = format_prompt(prompt, inputs);
        self.completion_provider
            .complete(&formatted)
            .await
            .map_err(|e| GraphError::execution_failed("llm", e.to_string()))
    }
}
