// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Recycling pools for the layout value types.
//!
//! Rebuilding the layout graphs every frame (or on hot reload) must not
//! churn the heap. The pools here keep released instances and hand them back
//! on the next acquisition; because maps, sets, and vectors keep their
//! capacity across `reset`/`clear`, a recycled instance reuses the heap
//! storage it grew in earlier frames.
//!
//! Issued instances are owned by the caller, so there is no stale-reference
//! hazard to police: an instance returns to its pool only through an
//! explicit `recycle_*` call, and the borrow checker rules out aliases.
//! Only heap-backed types are pooled — recycling plain-`Copy` values such as
//! [`Descriptor`](crate::descriptor::Descriptor) or the block indices would
//! buy nothing.

use crate::descriptor::{
    AccessType, DescriptorBlock, DescriptorBlockFlattened, DescriptorDb, DescriptorGroupBlock,
    DescriptorTypeOrder, ViewDimension,
};
use crate::gfx::{DescriptorSetId, DescriptorSetLayoutId, Format, ShaderStageFlags};
use crate::layout_graph::{LayoutGraph, RenderPhase};
use crate::pipeline_graph::PipelineLayoutGraph;
use crate::pipeline_layout::{
    DescriptorBlockData, DescriptorGroupBlockData, DescriptorGroupData,
    DescriptorGroupLayoutData, DescriptorSetData, DescriptorSetLayoutData, EffectData,
    PipelineLayoutData, RenderPhaseData, RenderStageData, ShaderBindingData, ShaderLayoutData,
    ShaderProgramData, TechniqueData,
};

/// Instances a pool keeps ready before its first release.
const RETENTION_HINT: usize = 16;

/// A free-list pool for one value type.
///
/// `acquire` pops a previously released instance, or default-constructs one
/// when the pool is dry; `release` returns an instance for reuse. The pool
/// never resets instances itself — the caller applies the type's `reset`
/// after acquisition (creation-time reset, so retained instances carry
/// their old contents only while idle).
#[derive(Debug)]
pub struct RecyclePool<T: Default> {
    free: Vec<T>,
}

impl<T: Default> RecyclePool<T> {
    /// Creates a pool with the default retention hint.
    pub fn new() -> Self {
        Self {
            free: Vec::with_capacity(RETENTION_HINT),
        }
    }

    /// Draws an instance: a recycled one if available, otherwise new.
    pub fn acquire(&mut self) -> T {
        self.free.pop().unwrap_or_default()
    }

    /// Returns an instance to the pool for later reuse.
    pub fn release(&mut self, value: T) {
        self.free.push(value);
    }

    /// Number of instances currently retained for reuse.
    pub fn retained(&self) -> usize {
        self.free.len()
    }

    /// Drops every retained instance.
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

impl<T: Default> Default for RecyclePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The aggregate pool over every heap-backed layout value type.
///
/// `create_*` draws a possibly-recycled instance and applies the type's
/// reset with the given arguments; `recycle_*` hands an instance back.
/// [`LayoutObjectPool::reset`] drops all retained storage — an explicit trim
/// between scenes; it does not (and cannot) touch instances still owned by
/// callers.
#[derive(Debug, Default)]
pub struct LayoutObjectPool {
    descriptor_blocks: RecyclePool<DescriptorBlock>,
    group_blocks: RecyclePool<DescriptorGroupBlock>,
    flattened_blocks: RecyclePool<DescriptorBlockFlattened>,
    descriptor_dbs: RecyclePool<DescriptorDb>,
    render_phases: RecyclePool<RenderPhase>,
    layout_graphs: RecyclePool<LayoutGraph>,
    block_data: RecyclePool<DescriptorBlockData>,
    set_layouts: RecyclePool<DescriptorSetLayoutData>,
    set_data: RecyclePool<DescriptorSetData>,
    group_block_data: RecyclePool<DescriptorGroupBlockData>,
    group_layouts: RecyclePool<DescriptorGroupLayoutData>,
    group_data: RecyclePool<DescriptorGroupData>,
    pipeline_layouts: RecyclePool<PipelineLayoutData>,
    shader_bindings: RecyclePool<ShaderBindingData>,
    shader_layouts: RecyclePool<ShaderLayoutData>,
    techniques: RecyclePool<TechniqueData>,
    effects: RecyclePool<EffectData>,
    shader_programs: RecyclePool<ShaderProgramData>,
    stage_data: RecyclePool<RenderStageData>,
    phase_data: RecyclePool<RenderPhaseData>,
    pipeline_graphs: RecyclePool<PipelineLayoutGraph>,
}

impl LayoutObjectPool {
    /// Creates an empty pool set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all retained instances in every pool.
    pub fn reset(&mut self) {
        self.descriptor_blocks.clear();
        self.group_blocks.clear();
        self.flattened_blocks.clear();
        self.descriptor_dbs.clear();
        self.render_phases.clear();
        self.layout_graphs.clear();
        self.block_data.clear();
        self.set_layouts.clear();
        self.set_data.clear();
        self.group_block_data.clear();
        self.group_layouts.clear();
        self.group_data.clear();
        self.pipeline_layouts.clear();
        self.shader_bindings.clear();
        self.shader_layouts.clear();
        self.techniques.clear();
        self.effects.clear();
        self.shader_programs.clear();
        self.stage_data.clear();
        self.phase_data.clear();
        self.pipeline_graphs.clear();
    }

    /// Draws an empty [`DescriptorBlock`].
    pub fn create_descriptor_block(&mut self) -> DescriptorBlock {
        let mut v = self.descriptor_blocks.acquire();
        v.reset();
        v
    }

    /// Returns a [`DescriptorBlock`] for reuse.
    pub fn recycle_descriptor_block(&mut self, value: DescriptorBlock) {
        self.descriptor_blocks.release(value);
    }

    /// Draws an empty [`DescriptorGroupBlock`].
    pub fn create_descriptor_group_block(&mut self) -> DescriptorGroupBlock {
        let mut v = self.group_blocks.acquire();
        v.reset();
        v
    }

    /// Returns a [`DescriptorGroupBlock`] for reuse.
    pub fn recycle_descriptor_group_block(&mut self, value: DescriptorGroupBlock) {
        self.group_blocks.release(value);
    }

    /// Draws an empty [`DescriptorBlockFlattened`].
    pub fn create_descriptor_block_flattened(&mut self) -> DescriptorBlockFlattened {
        let mut v = self.flattened_blocks.acquire();
        v.reset();
        v
    }

    /// Returns a [`DescriptorBlockFlattened`] for reuse.
    pub fn recycle_descriptor_block_flattened(&mut self, value: DescriptorBlockFlattened) {
        self.flattened_blocks.release(value);
    }

    /// Draws an empty [`DescriptorDb`].
    pub fn create_descriptor_db(&mut self) -> DescriptorDb {
        let mut v = self.descriptor_dbs.acquire();
        v.reset();
        v
    }

    /// Returns a [`DescriptorDb`] for reuse.
    pub fn recycle_descriptor_db(&mut self, value: DescriptorDb) {
        self.descriptor_dbs.release(value);
    }

    /// Draws an empty [`RenderPhase`].
    pub fn create_render_phase(&mut self) -> RenderPhase {
        let mut v = self.render_phases.acquire();
        v.reset();
        v
    }

    /// Returns a [`RenderPhase`] for reuse.
    pub fn recycle_render_phase(&mut self, value: RenderPhase) {
        self.render_phases.release(value);
    }

    /// Draws an empty [`LayoutGraph`].
    pub fn create_layout_graph(&mut self) -> LayoutGraph {
        let mut v = self.layout_graphs.acquire();
        v.clear();
        v
    }

    /// Returns a [`LayoutGraph`] for reuse.
    pub fn recycle_layout_graph(&mut self, value: LayoutGraph) {
        self.layout_graphs.release(value);
    }

    /// Draws a [`DescriptorBlockData`] re-keyed with the given fields.
    pub fn create_descriptor_block_data(
        &mut self,
        descriptor_type: DescriptorTypeOrder,
        visibility: ShaderStageFlags,
        capacity: u32,
    ) -> DescriptorBlockData {
        let mut v = self.block_data.acquire();
        v.reset(descriptor_type, visibility, capacity);
        v
    }

    /// Returns a [`DescriptorBlockData`] for reuse.
    pub fn recycle_descriptor_block_data(&mut self, value: DescriptorBlockData) {
        self.block_data.release(value);
    }

    /// Draws a [`DescriptorSetLayoutData`] with the given slot and capacity.
    pub fn create_descriptor_set_layout_data(
        &mut self,
        slot: u32,
        capacity: u32,
    ) -> DescriptorSetLayoutData {
        let mut v = self.set_layouts.acquire();
        v.reset(slot, capacity);
        v
    }

    /// Returns a [`DescriptorSetLayoutData`] for reuse.
    pub fn recycle_descriptor_set_layout_data(&mut self, value: DescriptorSetLayoutData) {
        self.set_layouts.release(value);
    }

    /// Draws a [`DescriptorSetData`] holding the given device handles.
    pub fn create_descriptor_set_data(
        &mut self,
        layout_id: Option<DescriptorSetLayoutId>,
        set_id: Option<DescriptorSetId>,
    ) -> DescriptorSetData {
        let mut v = self.set_data.acquire();
        v.reset(layout_id, set_id);
        v
    }

    /// Returns a [`DescriptorSetData`] for reuse.
    pub fn recycle_descriptor_set_data(&mut self, value: DescriptorSetData) {
        self.set_data.release(value);
    }

    /// Draws a [`DescriptorGroupBlockData`] re-keyed with the given fields.
    pub fn create_descriptor_group_block_data(
        &mut self,
        descriptor_type: DescriptorTypeOrder,
        visibility: ShaderStageFlags,
        access_type: AccessType,
        view_dimension: ViewDimension,
        format: Format,
        capacity: u32,
    ) -> DescriptorGroupBlockData {
        let mut v = self.group_block_data.acquire();
        v.reset(
            descriptor_type,
            visibility,
            access_type,
            view_dimension,
            format,
            capacity,
        );
        v
    }

    /// Returns a [`DescriptorGroupBlockData`] for reuse.
    pub fn recycle_descriptor_group_block_data(&mut self, value: DescriptorGroupBlockData) {
        self.group_block_data.release(value);
    }

    /// Draws a [`DescriptorGroupLayoutData`] with the given slot and capacity.
    pub fn create_descriptor_group_layout_data(
        &mut self,
        slot: u32,
        capacity: u32,
    ) -> DescriptorGroupLayoutData {
        let mut v = self.group_layouts.acquire();
        v.reset(slot, capacity);
        v
    }

    /// Returns a [`DescriptorGroupLayoutData`] for reuse.
    pub fn recycle_descriptor_group_layout_data(&mut self, value: DescriptorGroupLayoutData) {
        self.group_layouts.release(value);
    }

    /// Draws an empty [`DescriptorGroupData`].
    pub fn create_descriptor_group_data(&mut self) -> DescriptorGroupData {
        let mut v = self.group_data.acquire();
        v.reset();
        v
    }

    /// Returns a [`DescriptorGroupData`] for reuse.
    pub fn recycle_descriptor_group_data(&mut self, value: DescriptorGroupData) {
        self.group_data.release(value);
    }

    /// Draws an empty [`PipelineLayoutData`].
    pub fn create_pipeline_layout_data(&mut self) -> PipelineLayoutData {
        let mut v = self.pipeline_layouts.acquire();
        v.reset();
        v
    }

    /// Returns a [`PipelineLayoutData`] for reuse.
    pub fn recycle_pipeline_layout_data(&mut self, value: PipelineLayoutData) {
        self.pipeline_layouts.release(value);
    }

    /// Draws an empty [`ShaderBindingData`].
    pub fn create_shader_binding_data(&mut self) -> ShaderBindingData {
        let mut v = self.shader_bindings.acquire();
        v.reset();
        v
    }

    /// Returns a [`ShaderBindingData`] for reuse.
    pub fn recycle_shader_binding_data(&mut self, value: ShaderBindingData) {
        self.shader_bindings.release(value);
    }

    /// Draws an empty [`ShaderLayoutData`].
    pub fn create_shader_layout_data(&mut self) -> ShaderLayoutData {
        let mut v = self.shader_layouts.acquire();
        v.reset();
        v
    }

    /// Returns a [`ShaderLayoutData`] for reuse.
    pub fn recycle_shader_layout_data(&mut self, value: ShaderLayoutData) {
        self.shader_layouts.release(value);
    }

    /// Draws an empty [`TechniqueData`].
    pub fn create_technique_data(&mut self) -> TechniqueData {
        let mut v = self.techniques.acquire();
        v.reset();
        v
    }

    /// Returns a [`TechniqueData`] for reuse.
    pub fn recycle_technique_data(&mut self, value: TechniqueData) {
        self.techniques.release(value);
    }

    /// Draws an empty [`EffectData`].
    pub fn create_effect_data(&mut self) -> EffectData {
        let mut v = self.effects.acquire();
        v.reset();
        v
    }

    /// Returns an [`EffectData`] for reuse.
    pub fn recycle_effect_data(&mut self, value: EffectData) {
        self.effects.release(value);
    }

    /// Draws an empty [`ShaderProgramData`].
    pub fn create_shader_program_data(&mut self) -> ShaderProgramData {
        let mut v = self.shader_programs.acquire();
        v.reset();
        v
    }

    /// Returns a [`ShaderProgramData`] for reuse.
    pub fn recycle_shader_program_data(&mut self, value: ShaderProgramData) {
        self.shader_programs.release(value);
    }

    /// Draws an empty [`RenderStageData`].
    pub fn create_render_stage_data(&mut self) -> RenderStageData {
        let mut v = self.stage_data.acquire();
        v.reset();
        v
    }

    /// Returns a [`RenderStageData`] for reuse.
    pub fn recycle_render_stage_data(&mut self, value: RenderStageData) {
        self.stage_data.release(value);
    }

    /// Draws an empty [`RenderPhaseData`].
    pub fn create_render_phase_data(&mut self) -> RenderPhaseData {
        let mut v = self.phase_data.acquire();
        v.reset();
        v
    }

    /// Returns a [`RenderPhaseData`] for reuse.
    pub fn recycle_render_phase_data(&mut self, value: RenderPhaseData) {
        self.phase_data.release(value);
    }

    /// Draws an empty [`PipelineLayoutGraph`].
    pub fn create_pipeline_layout_graph(&mut self) -> PipelineLayoutGraph {
        let mut v = self.pipeline_graphs.acquire();
        v.clear();
        v
    }

    /// Returns a [`PipelineLayoutGraph`] for reuse.
    pub fn recycle_pipeline_layout_graph(&mut self, value: PipelineLayoutGraph) {
        self.pipeline_graphs.release(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::ValueType;
    use crate::pipeline_layout::DescriptorData;

    #[test]
    fn test_recycled_instance_reuses_backing_storage() {
        let mut pool = LayoutObjectPool::new();

        // Grow a block's descriptor vector, remember where its heap lives.
        let mut block = pool.create_descriptor_block_data(
            DescriptorTypeOrder::SamplerTexture,
            ShaderStageFlags::FRAGMENT,
            8,
        );
        for i in 0..8 {
            block
                .descriptors
                .push(DescriptorData::new(i, ValueType::Sampler2D, 1));
        }
        let storage = block.descriptors.as_ptr();

        pool.recycle_descriptor_block_data(block);

        // The next acquisition returns the same instance, reset but with
        // its heap storage intact — no reallocation.
        let reused = pool.create_descriptor_block_data(
            DescriptorTypeOrder::UniformBuffer,
            ShaderStageFlags::VERTEX,
            4,
        );
        assert_eq!(reused.descriptors.as_ptr(), storage);
        assert!(reused.descriptors.is_empty());
        assert_eq!(reused.capacity, 4);
        assert_eq!(reused.offset, 0);
    }

    #[test]
    fn test_acquire_beyond_retained_constructs_new() {
        let mut pool: RecyclePool<RenderPhase> = RecyclePool::new();
        assert_eq!(pool.retained(), 0);

        let a = pool.acquire(); // dry pool: freshly constructed
        pool.release(a);
        assert_eq!(pool.retained(), 1);

        let _first = pool.acquire();
        let second = pool.acquire(); // beyond the retained set again
        assert!(second.shaders.is_empty());
        assert_eq!(pool.retained(), 0);
    }

    #[test]
    fn test_create_applies_reset_to_recycled_instance() {
        let mut pool = LayoutObjectPool::new();

        let mut phase = pool.create_render_phase();
        phase.shaders.insert("std".to_string());
        pool.recycle_render_phase(phase);

        // Stale contents must not leak into the next acquisition.
        let fresh = pool.create_render_phase();
        assert!(fresh.shaders.is_empty());
    }

    #[test]
    fn test_pool_reset_drops_retained_storage() {
        let mut pool = LayoutObjectPool::new();
        let db = pool.create_descriptor_db();
        pool.recycle_descriptor_db(db);
        assert_eq!(pool.descriptor_dbs.retained(), 1);

        pool.reset();
        assert_eq!(pool.descriptor_dbs.retained(), 0);
    }

    #[test]
    fn test_graph_recycling_keeps_capacity() {
        let mut pool = LayoutObjectPool::new();
        let mut g = pool.create_layout_graph();
        let db = pool.create_descriptor_db();
        g.add_vertex(
            crate::layout_graph::LayoutNode::RenderStage(
                crate::layout_graph::RenderPassKind::SinglePass,
            ),
            "Opaque",
            db,
            None,
        );
        pool.recycle_layout_graph(g);

        let reused = pool.create_layout_graph();
        assert_eq!(crate::graph::Graph::num_vertices(&reused), 0);
    }
}
