//! The `Code` block kind: dispatches a `source` input into the execution
//! environment's sandboxed runner and writes the sandbox's return value
//! into a `result` output.
//!
//! This replaces the original's single `code` port (which conflated the
//! text of the program with its computed result) with two ports, per the
//! redesign called for in the distillation's open question.

use std::collections::HashMap;

use super::{Block, BlockKind};
use crate::error::{GraphError, Result};
use crate::exec_env::ExecutionEnvironment;

/// Name of the fixed input port holding the block's source text.
pub const CODE_SOURCE_PORT: &str = "source";
/// Name of the fixed output port holding the sandbox's return value.
pub const CODE_RESULT_PORT: &str = "result";

pub(super) fn build(id: Option<String>, name: impl Into<String>, source_text: impl Into<String>) -> Block {
    let mut block = Block::new(id, name, BlockKind::Code, true, false);
    block
        .inputs
        .add_port(CODE_SOURCE_PORT)
        .expect("fresh hub")
        .cell_mut()
        .set(serde_json::Value::String(source_text.into()));
    block.outputs.add_port(CODE_RESULT_PORT).expect("fresh hub");
    block
}

pub(super) async fn run(block: &mut Block, exec_env: &dyn ExecutionEnvironment) -> Result<()> {
    let source = block
        .inputs
        .get(CODE_SOURCE_PORT)
        .and_then(|p| p.value())
        .map(value_as_text)
        .unwrap_or_default();

    let inputs: HashMap<String, serde_json::Value> = block
        .inputs
        .iter()
        .filter(|(name, _)| *name != CODE_SOURCE_PORT)
        .filter_map(|(name, port)| port.value().map(|v| (name.to_string(), v.clone())))
        .collect();

    let outputs_wanted = [CODE_RESULT_PORT.to_string()];

    let outcome = exec_env.execute_code(&source, &inputs, &outputs_wanted).await;

    match outcome {
        Ok(mut values) => match values.remove(CODE_RESULT_PORT) {
            Some(value) => {
                block.outputs.get_mut(CODE_RESULT_PORT).expect("fixed port").cell_mut().set(value);
                Ok(())
            }
            None => {
                fail(block, "sandbox did not return a 'result' value");
                Err(GraphError::execution_failed(block.name(), "sandbox did not return a 'result' value"))
            }
        },
        Err(err) => {
            fail(block, err.to_string());
            Err(GraphError::execution_failed(block.name(), err.to_string()))
        }
    }
}

fn fail(block: &mut Block, reason: impl std::fmt::Display) {
    tracing::warn!(block = %block.name(), %reason, "code block execution failed");
    if let Some(port) = block.outputs.get_mut(CODE_RESULT_PORT) {
        port.cell_mut().mark_unreliable();
    }
}

fn value_as_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
