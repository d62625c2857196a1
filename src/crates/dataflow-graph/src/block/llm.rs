//! The `LLMBlock` kind: formats a prompt template against its other inputs
//! and dispatches it to the execution environment's text-completion
//! collaborator, per the `llm_service.py` supplement.

use std::collections::HashMap;

use super::{Block, BlockKind};
use crate::error::{GraphError, Result};
use crate::exec_env::ExecutionEnvironment;

/// Name of the fixed input port holding the `{name}`-style prompt template.
pub const LLM_PROMPT_PORT: &str = "prompt_template";
/// Name of the fixed output port holding the completion text.
pub const LLM_RESPONSE_PORT: &str = "response";

pub(super) fn build(id: Option<String>, name: impl Into<String>, template: impl Into<String>) -> Block {
    let mut block = Block::new(id, name, BlockKind::Llm, true, false);
    block
        .inputs
        .add_port(LLM_PROMPT_PORT)
        .expect("fresh hub")
        .cell_mut()
        .set(serde_json::Value::String(template.into()));
    block.outputs.add_port(LLM_RESPONSE_PORT).expect("fresh hub");
    block
}

pub(super) async fn run(block: &mut Block, exec_env: &dyn ExecutionEnvironment) -> Result<()> {
    let template = block
        .inputs
        .get(LLM_PROMPT_PORT)
        .and_then(|p| p.value())
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let inputs: HashMap<String, serde_json::Value> = block
        .inputs
        .iter()
        .filter(|(name, _)| *name != LLM_PROMPT_PORT)
        .filter_map(|(name, port)| port.value().map(|v| (name.to_string(), v.clone())))
        .collect();

    match exec_env.complete(&template, &inputs).await {
        Ok(text) => {
            block
                .outputs
                .get_mut(LLM_RESPONSE_PORT)
                .expect("fixed port")
                .cell_mut()
                .set(serde_json::Value::String(text));
            Ok(())
        }
        Err(err) => {
            tracing::warn!(block = %block.name(), error = %err, "llm block completion failed");
            if let Some(port) = block.outputs.get_mut(LLM_RESPONSE_PORT) {
                port.cell_mut().mark_unreliable();
            }
            Err(GraphError::execution_failed(block.name(), err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct StubProvider;

    #[async_trait]
    impl ExecutionEnvironment for StubProvider {
        async fn execute_code(
            &self,
            _source: &str,
            _inputs: &HashMap<String, serde_json::Value>,
            _outputs: &[String],
        ) -> Result<HashMap<String, serde_json::Value>> {
            unimplemented!()
        }

        async fn complete(&self, prompt: &str, inputs: &HashMap<String, serde_json::Value>) -> Result<String> {
            let mut text = prompt.to_string();
            for (k, v) in inputs {
                text = text.replace(&format!("{{{k}}}"), &v.to_string());
            }
            Ok(text)
        }
    }

    #[tokio::test]
    async fn run_writes_completion_to_response() {
        let mut block = build(None, "l", "hello {name}");
        block.inputs_mut().add_port("name").unwrap().cell_mut().set(json!("world"));
        run(&mut block, &StubProvider).await.unwrap();
        let response = block.outputs().get(LLM_RESPONSE_PORT).unwrap().value().unwrap();
        assert!(response.as_str().unwrap().contains("world"));
    }
}
