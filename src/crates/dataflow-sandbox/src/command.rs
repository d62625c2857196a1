//! `CommandCodeRunner`: the pluggable process boundary a [`LocalCodeRunner`]
//! shells out through, plus [`format_code_for_execution`], which formats a
//! `Code` block's source into a self-contained program the way
//! `code_service.py`'s function of the same name did — bind inputs as
//! top-level names, run the user's source, then serialize the requested
//! output names as a single JSON object on stdout.

use std::collections::HashMap;
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tooling::async_utils::timeout::{with_timeout, TimeoutError};

use crate::error::{Result, SandboxError};

/// Default wall-clock budget for a single sandboxed execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs one already-formatted program and returns its raw process output.
///
/// This is the seam a real container-backed sandbox would implement instead
/// of [`ShellCommandRunner`]; `dataflow-graph` never depends on this trait
/// directly (see [`dataflow_graph::exec_env::ExecutionEnvironment`]), only
/// [`LocalCodeRunner`] does.
#[async_trait]
pub trait CommandCodeRunner: Send + Sync {
    /// Execute `program` and return the process's raw output, or an I/O
    /// error if the process could not even be spawned.
    async fn run(&self, program: &str, timeout: Duration) -> Result<Output>;
}

/// Shells out to a configured interpreter binary (`python3` by default),
/// passing the formatted program on `-c`, under a bounded timeout.
///
/// This is the engine's idea of an "isolated sandbox" without requiring an
/// actual container runtime to be present in this repo — a real deployment
/// swaps this out for a `CommandCodeRunner` that execs into a locked-down
/// container instead.
pub struct ShellCommandRunner {
    interpreter: String,
    arg: String,
}

impl ShellCommandRunner {
    /// Build a runner that invokes `interpreter -c <program>`.
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self { interpreter: interpreter.into(), arg: "-c".to_string() }
    }

    /// Build the default `python3 -c` runner.
    pub fn python3() -> Self {
        Self::new("python3")
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::python3()
    }
}

#[async_trait]
impl CommandCodeRunner for ShellCommandRunner {
    async fn run(&self, program: &str, timeout: Duration) -> Result<Output> {
        let child = Command::new(&self.interpreter).arg(&self.arg).arg(program).output();
        match with_timeout(timeout, child).await {
            Ok(output) => Ok(output),
            Err(TimeoutError::OperationFailed(e)) => Err(SandboxError::Spawn(e)),
            Err(TimeoutError::Timeout(d)) => Err(SandboxError::Timeout(d)),
        }
    }
}

/// Format a program that binds `inputs` as top-level names, runs `source`,
/// then prints a JSON object mapping each of `outputs` to its final value.
///
/// Mirrors `format_code_for_execution`: a missing output name is silently
/// omitted from the printed object rather than raising, since the sandbox is
/// a best-effort collaborator and `ExecutionFailed` is reserved for actual
/// process failure or a completely unparsable response.
pub fn format_code_for_execution(source: &str, inputs: &HashMap<String, Value>, outputs: &[String]) -> String {
    // `{:?}` on a `String` produces a double-quoted, backslash-escaped
    // literal that both Rust and Python accept as a string literal, so the
    // JSON payloads can be spliced straight into the generated program.
    let inputs_literal = format!("{:?}", serde_json::to_string(inputs).unwrap_or_else(|_| "{}".to_string()));
    let outputs_literal = format!("{:?}", serde_json::to_string(outputs).unwrap_or_else(|_| "[]".to_string()));

    format!(
        "import json\n\
         __inputs__ = json.loads({inputs_literal})\n\
         for __name__, __value__ in __inputs__.items():\n\
         \u{20}\u{20}\u{20}\u{20}globals()[__name__] = __value__\n\
         \n\
         {source}\n\
         \n\
         __outputs__ = {{}}\n\
         for __name__ in json.loads({outputs_literal}):\n\
         \u{20}\u{20}\u{20}\u{20}if __name__ in globals():\n\
         \u{20}\u{20}\u{20}\u{20}\u{20}\u{20}\u{20}\u{20}__outputs__[__name__] = globals()[__name__]\n\
         print(json.dumps(__outputs__))\n",
    )
}

/// Parse an interpreter's stdout as the output-name to value JSON object the
/// formatted program is expected to print as its final line.
pub fn parse_output(stdout: &[u8]) -> Result<HashMap<String, Value>> {
    let text = String::from_utf8_lossy(stdout);
    let last_line = text.lines().rev().find(|line| !line.trim().is_empty()).unwrap_or("");
    serde_json::from_str(last_line).map_err(|e| SandboxError::UnparsableOutput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_code_for_execution_embeds_inputs_and_requested_outputs() {
        let mut inputs = HashMap::new();
        inputs.insert("x".to_string(), json!(2));
        let program = format_code_for_execution("y = x + 1", &inputs, &["y".to_string()]);
        assert!(program.contains("y = x + 1"));
        assert!(program.contains("__outputs__"));
    }

    #[test]
    fn parse_output_reads_last_nonblank_line() {
        let stdout = b"warming up\n{\"y\": 3}\n".to_vec();
        let parsed = parse_output(&stdout).unwrap();
        assert_eq!(parsed.get("y"), Some(&json!(3)));
    }

    #[test]
    fn parse_output_rejects_garbage() {
        let stdout = b"not json at all".to_vec();
        assert!(parse_output(&stdout).is_err());
    }
}
