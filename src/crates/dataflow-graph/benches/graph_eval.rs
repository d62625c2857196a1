use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dataflow_graph::error::Result;
use dataflow_graph::exec_env::ExecutionEnvironment;
use dataflow_graph::value::Value;
use dataflow_graph::{Block, Graph};

struct NoopExecEnv;

#[async_trait]
impl ExecutionEnvironment for NoopExecEnv {
    async fn execute_code(&self, _source: &str, _inputs: &HashMap<String, Value>, _outputs: &[String]) -> Result<HashMap<String, Value>> {
        Ok(HashMap::new())
    }

    async fn complete(&self, _prompt: &str, _inputs: &HashMap<String, Value>) -> Result<String> {
        Ok(String::new())
    }
}

/// A layered diamond: `width` independent chains of `depth` blocks each,
/// all funneled through one shared sink, so `get_block_evaluation_order`
/// has real fan-in/fan-out to resolve instead of a single straight line.
fn layered_diamond(width: usize, depth: usize) -> Graph {
    let mut graph = Graph::new("bench", Arc::new(NoopExecEnv));
    graph.add_block(Block::new_base(None, "sink")).unwrap();

    for lane in 0..width {
        let mut previous = format!("lane{lane}_0");
        graph.add_block(Block::new_base(None, &previous)).unwrap();
        for step in 1..depth {
            let name = format!("lane{lane}_{step}");
            graph.add_block(Block::new_base(None, &name)).unwrap();
            graph.connect_blocks(&previous, &name, Some("out"), Some("in"), true).unwrap();
            previous = name;
        }
        graph.connect_blocks(&previous, "sink", Some("out"), Some("in"), true).unwrap();
    }
    graph
}

fn evaluation_order_benchmark(c: &mut Criterion) {
    let graph = layered_diamond(8, 16);
    c.bench_function("evaluation order, 8 lanes x 16 deep", |b| {
        b.iter(|| graph.get_block_evaluation_order(black_box(None)).unwrap());
    });
}

fn run_all_blocks_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("run_all_blocks, 8 lanes x 16 deep", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut graph = layered_diamond(8, 16);
            graph.run_all_blocks().await.unwrap();
            black_box(&graph);
        });
    });
}

criterion_group!(benches, evaluation_order_benchmark, run_all_blocks_benchmark);
criterion_main!(benches);
