use criterion::{black_box, criterion_group, criterion_main, Criterion};
use khora_layout::archive::{BinaryInputArchive, BinaryOutputArchive, Persist};
use khora_layout::descriptor::{
    Descriptor, DescriptorBlock, DescriptorBlockIndex, DescriptorDb, DescriptorTypeOrder,
    ParameterType, UpdateFrequency,
};
use khora_layout::gfx::{ShaderStageFlags, ValueType};
use khora_layout::layout_graph::{LayoutGraph, LayoutNode, RenderPassKind, RenderPhase};
use khora_layout::pool::LayoutObjectPool;

const STAGES: usize = 8;
const PHASES_PER_STAGE: usize = 4;

fn populate(graph: &mut LayoutGraph, pool: &mut LayoutObjectPool) {
    for stage_index in 0..STAGES {
        let mut db = pool.create_descriptor_db();
        let key = DescriptorBlockIndex::new(
            UpdateFrequency::PerPass,
            ParameterType::Table,
            DescriptorTypeOrder::UniformBuffer,
            ShaderStageFlags::ALL,
        );
        let mut block = pool.create_descriptor_block();
        block
            .descriptors
            .insert("globals".to_string(), Descriptor::new(ValueType::Mat4));
        block.capacity = 1;
        block.count = 1;
        db.blocks.insert(key, block);

        let stage = graph.add_vertex(
            LayoutNode::RenderStage(RenderPassKind::SinglePass),
            format!("stage{stage_index}"),
            db,
            None,
        );

        for phase_index in 0..PHASES_PER_STAGE {
            let mut phase = pool.create_render_phase();
            phase.shaders.insert(format!("shader{phase_index}"));
            graph.add_vertex(
                LayoutNode::RenderPhase(phase),
                format!("phase{phase_index}"),
                pool.create_descriptor_db(),
                Some(stage),
            );
        }
    }
}

fn bench_layout_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("Layout Graph");

    group.bench_function("build (pooled rebuild)", |b| {
        let mut pool = LayoutObjectPool::new();
        let mut graph = pool.create_layout_graph();
        b.iter(|| {
            graph.clear();
            populate(&mut graph, &mut pool);
            black_box(&graph);
        });
    });

    let mut pool = LayoutObjectPool::new();
    let mut graph = pool.create_layout_graph();
    populate(&mut graph, &mut pool);

    group.bench_function("save", |b| {
        b.iter(|| {
            let mut out = BinaryOutputArchive::new();
            graph.save(&mut out);
            black_box(out.into_bytes());
        });
    });

    let mut out = BinaryOutputArchive::new();
    graph.save(&mut out);
    let bytes = out.into_bytes();

    group.bench_function("load", |b| {
        b.iter(|| {
            let mut input = BinaryInputArchive::new(&bytes);
            let loaded = LayoutGraph::load(&mut input).expect("load failed");
            black_box(loaded);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_layout_graph);
criterion_main!(benches);
