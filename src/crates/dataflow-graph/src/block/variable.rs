//! The `Variable` block kind: seeds its output hub with constant values.

use super::{Block, BlockKind};
use crate::value::Value;

pub(super) fn build(id: Option<String>, name: impl Into<String>, values: Vec<(String, Value)>) -> Block {
    let mut block = Block::new(id, name, BlockKind::Variable, true, true);
    block.changes_affect_reliability = false;
    for (port_name, value) in values {
        let port = block.outputs.add_port(port_name).expect("fresh hub, name not yet taken");
        port.cell_mut().set(value);
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seeds_named_outputs() {
        let block = build(None, "B", vec![("x".into(), json!(1)), ("y".into(), json!("two"))]);
        assert_eq!(block.outputs().get("x").unwrap().value(), Some(&json!(1)));
        assert_eq!(block.outputs().get("y").unwrap().value(), Some(&json!("two")));
        assert!(!block.changes_affect_reliability());
    }
}
