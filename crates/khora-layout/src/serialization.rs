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

//! [`Persist`] implementations for every layout value type and both graphs.
//!
//! Each implementation writes its fields in declaration order and reads them
//! back identically. Sequences serialize as `[count][elements…]`, maps as
//! `[count][(key, value)…]` in the map's own (key) order, sets as
//! `[count][elements…]`.
//!
//! Device-handle fields are skipped on save and left at their reset default
//! (`None`) on load: an archived graph describes layout shape, never
//! device-side objects.
//!
//! Graph archives start with a `num_vertices`/`num_edges`/`num_stages`/
//! `num_phases` header. The three trailing counts are diagnostic: `load`
//! reads them back in the same position but does not validate them against
//! the payload that follows. Loading appends to the destination graph via
//! `add_vertex` in save order, so vertex indices are reproduced exactly; a
//! failed load may leave the destination partially populated.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::archive::{InputArchive, OutputArchive, Persist};
use crate::descriptor::{
    Descriptor, DescriptorBlock, DescriptorBlockFlattened, DescriptorBlockIndex, DescriptorDb,
    DescriptorGroupBlock, DescriptorGroupBlockIndex,
};
use crate::error::ArchiveError;
use crate::gfx::{
    DescriptorSetLayoutBinding, DescriptorSetLayoutInfo, ShaderStageFlags, Uniform, UniformBlock,
};
use crate::graph::{AddressableGraph, Graph, VertexId};
use crate::layout_graph::{LayoutGraph, LayoutNode, RenderPassKind, RenderPhase};
use crate::pipeline_graph::{PipelineLayoutGraph, PipelineNode};
use crate::pipeline_layout::{
    DescriptorBlockData, DescriptorData, DescriptorGroupBlockData, DescriptorGroupData,
    DescriptorGroupLayoutData, DescriptorSetData, DescriptorSetLayoutData, EffectData,
    PipelineLayoutData, RenderPhaseData, RenderStageData, ShaderBindingData, ShaderLayoutData,
    ShaderProgramData, TechniqueData, UniformBlockData, UniformData,
};

/// Payload tag of a render-stage vertex.
const TAG_RENDER_STAGE: u32 = 0;
/// Payload tag of a render-phase vertex.
const TAG_RENDER_PHASE: u32 = 1;
/// Wire encoding of "this vertex has no parent".
const NO_PARENT: u32 = u32::MAX;

fn save_seq<A: OutputArchive + ?Sized, T: Persist>(archive: &mut A, items: &[T]) {
    archive.write_u32(items.len() as u32);
    for item in items {
        item.save(archive);
    }
}

fn load_seq<A: InputArchive + ?Sized, T: Persist>(archive: &mut A) -> Result<Vec<T>, ArchiveError> {
    let count = archive.read_u32()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(T::load(archive)?);
    }
    Ok(items)
}

fn save_map<A: OutputArchive + ?Sized, K: Persist, V: Persist>(
    archive: &mut A,
    map: &BTreeMap<K, V>,
) {
    archive.write_u32(map.len() as u32);
    for (key, value) in map {
        key.save(archive);
        value.save(archive);
    }
}

fn load_map<A: InputArchive + ?Sized, K: Persist + Ord, V: Persist>(
    archive: &mut A,
) -> Result<BTreeMap<K, V>, ArchiveError> {
    let count = archive.read_u32()?;
    let mut map = BTreeMap::new();
    for _ in 0..count {
        let key = K::load(archive)?;
        let value = V::load(archive)?;
        map.insert(key, value);
    }
    Ok(map)
}

fn save_set<A: OutputArchive + ?Sized, T: Persist>(archive: &mut A, set: &BTreeSet<T>) {
    archive.write_u32(set.len() as u32);
    for item in set {
        item.save(archive);
    }
}

fn load_set<A: InputArchive + ?Sized, T: Persist + Ord>(
    archive: &mut A,
) -> Result<BTreeSet<T>, ArchiveError> {
    let count = archive.read_u32()?;
    let mut set = BTreeSet::new();
    for _ in 0..count {
        set.insert(T::load(archive)?);
    }
    Ok(set)
}

impl Persist for ShaderStageFlags {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.bits());
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(ShaderStageFlags::from_bits(archive.read_u32()?))
    }
}

impl Persist for Uniform {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_string(&self.name);
        self.value_type.save(archive);
        archive.write_u32(self.count);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            name: archive.read_string()?,
            value_type: Persist::load(archive)?,
            count: archive.read_u32()?,
        })
    }
}

impl Persist for UniformBlock {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.set);
        archive.write_u32(self.binding);
        archive.write_string(&self.name);
        save_seq(archive, &self.members);
        archive.write_u32(self.count);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            set: archive.read_u32()?,
            binding: archive.read_u32()?,
            name: archive.read_string()?,
            members: load_seq(archive)?,
            count: archive.read_u32()?,
        })
    }
}

impl Persist for DescriptorSetLayoutBinding {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.binding);
        self.descriptor_type.save(archive);
        archive.write_u32(self.count);
        self.visibility.save(archive);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            binding: archive.read_u32()?,
            descriptor_type: Persist::load(archive)?,
            count: archive.read_u32()?,
            visibility: Persist::load(archive)?,
        })
    }
}

impl Persist for DescriptorSetLayoutInfo {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_seq(archive, &self.bindings);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            bindings: load_seq(archive)?,
        })
    }
}

impl Persist for Descriptor {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        self.value_type.save(archive);
        archive.write_u32(self.count);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            value_type: Persist::load(archive)?,
            count: archive.read_u32()?,
        })
    }
}

impl Persist for DescriptorBlockIndex {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        self.update_frequency.save(archive);
        self.parameter_type.save(archive);
        self.descriptor_type.save(archive);
        self.visibility.save(archive);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            update_frequency: Persist::load(archive)?,
            parameter_type: Persist::load(archive)?,
            descriptor_type: Persist::load(archive)?,
            visibility: Persist::load(archive)?,
        })
    }
}

impl Persist for DescriptorGroupBlockIndex {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        self.update_frequency.save(archive);
        self.parameter_type.save(archive);
        self.descriptor_type.save(archive);
        self.visibility.save(archive);
        self.access_type.save(archive);
        self.view_dimension.save(archive);
        self.format.save(archive);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            update_frequency: Persist::load(archive)?,
            parameter_type: Persist::load(archive)?,
            descriptor_type: Persist::load(archive)?,
            visibility: Persist::load(archive)?,
            access_type: Persist::load(archive)?,
            view_dimension: Persist::load(archive)?,
            format: Persist::load(archive)?,
        })
    }
}

impl Persist for DescriptorBlock {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_map(archive, &self.descriptors);
        save_map(archive, &self.uniform_blocks);
        archive.write_u32(self.capacity);
        archive.write_u32(self.count);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            descriptors: load_map(archive)?,
            uniform_blocks: load_map(archive)?,
            capacity: archive.read_u32()?,
            count: archive.read_u32()?,
        })
    }
}

impl Persist for DescriptorGroupBlock {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_map(archive, &self.descriptors);
        save_map(archive, &self.uniform_blocks);
        archive.write_u32(self.capacity);
        archive.write_u32(self.count);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            descriptors: load_map(archive)?,
            uniform_blocks: load_map(archive)?,
            capacity: archive.read_u32()?,
            count: archive.read_u32()?,
        })
    }
}

impl Persist for DescriptorBlockFlattened {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_seq(archive, &self.descriptor_names);
        save_seq(archive, &self.uniform_block_names);
        save_seq(archive, &self.descriptors);
        save_seq(archive, &self.uniform_blocks);
        archive.write_u32(self.capacity);
        archive.write_u32(self.count);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            descriptor_names: load_seq(archive)?,
            uniform_block_names: load_seq(archive)?,
            descriptors: load_seq(archive)?,
            uniform_blocks: load_seq(archive)?,
            capacity: archive.read_u32()?,
            count: archive.read_u32()?,
        })
    }
}

impl Persist for DescriptorDb {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_map(archive, &self.blocks);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            blocks: load_map(archive)?,
        })
    }
}

impl Persist for RenderPhase {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_set(archive, &self.shaders);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            shaders: load_set(archive)?,
        })
    }
}

impl Persist for UniformData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.uniform_id);
        self.value_type.save(archive);
        archive.write_u32(self.offset);
        archive.write_u32(self.size);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            uniform_id: archive.read_u32()?,
            value_type: Persist::load(archive)?,
            offset: archive.read_u32()?,
            size: archive.read_u32()?,
        })
    }
}

impl Persist for UniformBlockData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.buffer_size);
        save_seq(archive, &self.uniforms);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            buffer_size: archive.read_u32()?,
            uniforms: load_seq(archive)?,
        })
    }
}

impl Persist for DescriptorData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.descriptor_id);
        self.value_type.save(archive);
        archive.write_u32(self.count);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            descriptor_id: archive.read_u32()?,
            value_type: Persist::load(archive)?,
            count: archive.read_u32()?,
        })
    }
}

impl Persist for DescriptorBlockData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        self.descriptor_type.save(archive);
        self.visibility.save(archive);
        archive.write_u32(self.offset);
        archive.write_u32(self.capacity);
        save_seq(archive, &self.descriptors);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            descriptor_type: Persist::load(archive)?,
            visibility: Persist::load(archive)?,
            offset: archive.read_u32()?,
            capacity: archive.read_u32()?,
            descriptors: load_seq(archive)?,
        })
    }
}

impl Persist for DescriptorSetLayoutData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.slot);
        archive.write_u32(self.capacity);
        archive.write_u32(self.uniform_block_capacity);
        archive.write_u32(self.sampler_texture_capacity);
        save_seq(archive, &self.descriptor_blocks);
        save_map(archive, &self.uniform_blocks);
        save_map(archive, &self.binding_map);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            slot: archive.read_u32()?,
            capacity: archive.read_u32()?,
            uniform_block_capacity: archive.read_u32()?,
            sampler_texture_capacity: archive.read_u32()?,
            descriptor_blocks: load_seq(archive)?,
            uniform_blocks: load_map(archive)?,
            binding_map: load_map(archive)?,
        })
    }
}

impl Persist for DescriptorSetData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        self.layout_data.save(archive);
        self.layout_info.save(archive);
        // layout_id, set_id: device handles, skipped.
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            layout_data: Persist::load(archive)?,
            layout_info: Persist::load(archive)?,
            layout_id: None,
            set_id: None,
        })
    }
}

impl Persist for DescriptorGroupBlockData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        self.descriptor_type.save(archive);
        self.visibility.save(archive);
        self.access_type.save(archive);
        self.view_dimension.save(archive);
        self.format.save(archive);
        archive.write_u32(self.offset);
        archive.write_u32(self.capacity);
        save_seq(archive, &self.descriptors);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            descriptor_type: Persist::load(archive)?,
            visibility: Persist::load(archive)?,
            access_type: Persist::load(archive)?,
            view_dimension: Persist::load(archive)?,
            format: Persist::load(archive)?,
            offset: archive.read_u32()?,
            capacity: archive.read_u32()?,
            descriptors: load_seq(archive)?,
        })
    }
}

impl Persist for DescriptorGroupLayoutData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.slot);
        archive.write_u32(self.capacity);
        archive.write_u32(self.uniform_block_capacity);
        archive.write_u32(self.sampler_texture_capacity);
        save_seq(archive, &self.descriptor_group_blocks);
        save_map(archive, &self.uniform_blocks);
        save_map(archive, &self.binding_map);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            slot: archive.read_u32()?,
            capacity: archive.read_u32()?,
            uniform_block_capacity: archive.read_u32()?,
            sampler_texture_capacity: archive.read_u32()?,
            descriptor_group_blocks: load_seq(archive)?,
            uniform_blocks: load_map(archive)?,
            binding_map: load_map(archive)?,
        })
    }
}

impl Persist for DescriptorGroupData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        self.layout_data.save(archive);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            layout_data: Persist::load(archive)?,
        })
    }
}

impl Persist for PipelineLayoutData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_map(archive, &self.descriptor_sets);
        save_map(archive, &self.descriptor_groups);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            descriptor_sets: load_map(archive)?,
            descriptor_groups: load_map(archive)?,
        })
    }
}

impl Persist for ShaderBindingData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_map(archive, &self.descriptor_bindings);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            descriptor_bindings: load_map(archive)?,
        })
    }
}

impl Persist for ShaderLayoutData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_map(archive, &self.layout_data);
        save_map(archive, &self.binding_data);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            layout_data: load_map(archive)?,
            binding_data: load_map(archive)?,
        })
    }
}

impl Persist for TechniqueData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_seq(archive, &self.passes);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            passes: load_seq(archive)?,
        })
    }
}

impl Persist for EffectData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_map(archive, &self.techniques);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            techniques: load_map(archive)?,
        })
    }
}

impl Persist for ShaderProgramData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        self.layout.save(archive);
        // pipeline_layout_id: device handle, skipped.
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            layout: Persist::load(archive)?,
            pipeline_layout_id: None,
        })
    }
}

impl Persist for RenderStageData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        save_map(archive, &self.descriptor_visibility);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            descriptor_visibility: load_map(archive)?,
        })
    }
}

impl Persist for RenderPhaseData {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_string(&self.root_signature);
        save_seq(archive, &self.shader_programs);
        save_map(archive, &self.shader_index);
        // pipeline_layout_id: device handle, skipped.
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        Ok(Self {
            root_signature: archive.read_string()?,
            shader_programs: load_seq(archive)?,
            shader_index: load_map(archive)?,
            pipeline_layout_id: None,
        })
    }
}

fn encode_parent(parent: Option<VertexId>) -> u32 {
    match parent {
        Some(p) => p.0,
        None => NO_PARENT,
    }
}

fn decode_parent(raw: u32) -> Option<VertexId> {
    if raw == NO_PARENT {
        None
    } else {
        Some(VertexId(raw))
    }
}

impl LayoutGraph {
    /// Reads a graph archive, appending its vertices to `self`.
    ///
    /// `add_vertex` runs in save order, so the loaded vertices reproduce
    /// their archived indices exactly when `self` starts empty. On error
    /// the graph keeps whatever was appended before the failure.
    pub fn load_into<A: InputArchive + ?Sized>(
        &mut self,
        archive: &mut A,
    ) -> Result<(), ArchiveError> {
        let num_vertices = archive.read_u32()?;
        let _num_edges = archive.read_u32()?;
        let _num_stages = archive.read_u32()?;
        let _num_phases = archive.read_u32()?;
        for _ in 0..num_vertices {
            let tag = archive.read_u32()?;
            let parent = decode_parent(archive.read_u32()?);
            let name = archive.read_string()?;
            let descriptors = DescriptorDb::load(archive)?;
            let node = match tag {
                TAG_RENDER_STAGE => LayoutNode::RenderStage(RenderPassKind::load(archive)?),
                TAG_RENDER_PHASE => LayoutNode::RenderPhase(RenderPhase::load(archive)?),
                value => {
                    return Err(ArchiveError::InvalidEnumValue {
                        type_name: "LayoutNode",
                        value,
                    })
                }
            };
            self.add_vertex(node, name, descriptors, parent);
        }
        debug!(
            "loaded layout graph: {} vertices, {} edges",
            self.num_vertices(),
            self.num_edges()
        );
        Ok(())
    }
}

impl Persist for LayoutGraph {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.num_vertices() as u32);
        archive.write_u32(self.num_edges() as u32);
        let mut num_stages = 0u32;
        let mut num_phases = 0u32;
        for v in self.vertices() {
            match self.node(v) {
                LayoutNode::RenderStage(_) => num_stages += 1,
                LayoutNode::RenderPhase(_) => num_phases += 1,
            }
        }
        archive.write_u32(num_stages);
        archive.write_u32(num_phases);

        for v in self.vertices() {
            match self.node(v) {
                LayoutNode::RenderStage(_) => archive.write_u32(TAG_RENDER_STAGE),
                LayoutNode::RenderPhase(_) => archive.write_u32(TAG_RENDER_PHASE),
            }
            archive.write_u32(encode_parent(self.parent_of(v)));
            archive.write_string(self.vertex_name(v));
            self.descriptor_db(v).save(archive);
            match self.node(v) {
                LayoutNode::RenderStage(kind) => kind.save(archive),
                LayoutNode::RenderPhase(phase) => phase.save(archive),
            }
        }
        debug!(
            "saved layout graph: {} vertices, {} stages, {} phases",
            self.num_vertices(),
            num_stages,
            num_phases
        );
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        let mut graph = LayoutGraph::new();
        graph.load_into(archive)?;
        Ok(graph)
    }
}

impl PipelineLayoutGraph {
    /// Reads a graph archive, appending its vertices and merging its
    /// graph-wide members into `self`.
    ///
    /// `add_vertex` runs in save order, so the loaded vertices reproduce
    /// their archived indices exactly when `self` starts empty. On error
    /// the graph keeps whatever was appended before the failure.
    pub fn load_into<A: InputArchive + ?Sized>(
        &mut self,
        archive: &mut A,
    ) -> Result<(), ArchiveError> {
        let num_vertices = archive.read_u32()?;
        let _num_edges = archive.read_u32()?;
        let _num_stages = archive.read_u32()?;
        let _num_phases = archive.read_u32()?;
        for _ in 0..num_vertices {
            let tag = archive.read_u32()?;
            let parent = decode_parent(archive.read_u32()?);
            let name = archive.read_string()?;
            let update_frequency = Persist::load(archive)?;
            let layout = PipelineLayoutData::load(archive)?;
            let node = match tag {
                TAG_RENDER_STAGE => PipelineNode::RenderStage(RenderStageData::load(archive)?),
                TAG_RENDER_PHASE => PipelineNode::RenderPhase(RenderPhaseData::load(archive)?),
                value => {
                    return Err(ArchiveError::InvalidEnumValue {
                        type_name: "PipelineNode",
                        value,
                    })
                }
            };
            self.add_vertex(node, name, update_frequency, layout, parent);
        }

        self.value_names.append(&mut load_seq(archive)?);
        self.attribute_index.extend(load_map::<A, String, u32>(archive)?);
        self.constant_index.extend(load_map::<A, String, u32>(archive)?);
        self.shader_layout_index
            .extend(load_map::<A, String, u32>(archive)?);
        self.effects.extend(load_map::<A, String, EffectData>(archive)?);
        // constant_macros is not part of the archive.
        debug!(
            "loaded pipeline layout graph: {} vertices, {} effects",
            self.num_vertices(),
            self.effects.len()
        );
        Ok(())
    }
}

impl Persist for PipelineLayoutGraph {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(self.num_vertices() as u32);
        archive.write_u32(self.num_edges() as u32);
        let mut num_stages = 0u32;
        let mut num_phases = 0u32;
        for v in self.vertices() {
            match self.node(v) {
                PipelineNode::RenderStage(_) => num_stages += 1,
                PipelineNode::RenderPhase(_) => num_phases += 1,
            }
        }
        archive.write_u32(num_stages);
        archive.write_u32(num_phases);

        for v in self.vertices() {
            match self.node(v) {
                PipelineNode::RenderStage(_) => archive.write_u32(TAG_RENDER_STAGE),
                PipelineNode::RenderPhase(_) => archive.write_u32(TAG_RENDER_PHASE),
            }
            archive.write_u32(encode_parent(self.parent_of(v)));
            archive.write_string(self.vertex_name(v));
            self.update_frequency(v).save(archive);
            self.layout(v).save(archive);
            match self.node(v) {
                PipelineNode::RenderStage(data) => data.save(archive),
                PipelineNode::RenderPhase(data) => data.save(archive),
            }
        }

        save_seq(archive, &self.value_names);
        save_map(archive, &self.attribute_index);
        save_map(archive, &self.constant_index);
        save_map(archive, &self.shader_layout_index);
        save_map(archive, &self.effects);
        // constant_macros is not part of the archive.
        debug!(
            "saved pipeline layout graph: {} vertices, {} stages, {} phases",
            self.num_vertices(),
            num_stages,
            num_phases
        );
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        let mut graph = PipelineLayoutGraph::new();
        graph.load_into(archive)?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{BinaryInputArchive, BinaryOutputArchive};
    use crate::descriptor::{
        DescriptorTypeOrder, ParameterType, UpdateFrequency, ViewDimension,
    };
    use crate::gfx::{DescriptorSetLayoutId, PipelineLayoutId, ValueType};

    fn round_trip<T: Persist>(value: &T) -> T {
        let mut out = BinaryOutputArchive::new();
        value.save(&mut out);
        let bytes = out.into_bytes();
        let mut input = BinaryInputArchive::new(&bytes);
        let loaded = T::load(&mut input).expect("load failed");
        assert_eq!(input.remaining(), 0, "trailing bytes after load");
        loaded
    }

    #[test]
    fn test_descriptor_block_round_trip() {
        let mut block = DescriptorBlock::default();
        block
            .descriptors
            .insert("albedo".to_string(), Descriptor::new(ValueType::Sampler2D));
        block.descriptors.insert(
            "shadow_map".to_string(),
            Descriptor {
                value_type: ValueType::Sampler2DArray,
                count: 4,
            },
        );
        block.uniform_blocks.insert(
            "camera".to_string(),
            UniformBlock {
                set: 0,
                binding: 1,
                name: "camera".to_string(),
                members: vec![Uniform {
                    name: "view_proj".to_string(),
                    value_type: ValueType::Mat4,
                    count: 1,
                }],
                count: 1,
            },
        );
        block.capacity = 5;
        block.count = 3;

        assert_eq!(round_trip(&block), block);
    }

    #[test]
    fn test_empty_collections_round_trip() {
        assert_eq!(round_trip(&DescriptorDb::default()), DescriptorDb::default());
        assert_eq!(
            round_trip(&PipelineLayoutData::default()),
            PipelineLayoutData::default()
        );
        assert_eq!(
            round_trip(&DescriptorBlockFlattened::default()),
            DescriptorBlockFlattened::default()
        );
    }

    #[test]
    fn test_group_block_index_round_trip_is_structural() {
        let index = DescriptorGroupBlockIndex::new(
            UpdateFrequency::PerPhase,
            ParameterType::Table,
            DescriptorTypeOrder::StorageImage,
            ShaderStageFlags::COMPUTE,
            crate::descriptor::AccessType::ReadWrite,
            ViewDimension::Tex2DArray,
            crate::gfx::Format::Rgba16F,
        );
        assert_eq!(round_trip(&index), index);
    }

    #[test]
    fn test_device_handles_are_skipped() {
        let mut set_data = DescriptorSetData::default();
        set_data.layout_data.slot = 2;
        set_data.layout_id = Some(DescriptorSetLayoutId(11));
        set_data.set_id = Some(crate::gfx::DescriptorSetId(12));

        let loaded = round_trip(&set_data);
        assert_eq!(loaded.layout_data.slot, 2);
        assert_eq!(loaded.layout_id, None);
        assert_eq!(loaded.set_id, None);

        let mut phase = RenderPhaseData::default();
        phase.root_signature = "fwd".to_string();
        phase.pipeline_layout_id = Some(PipelineLayoutId(7));
        let loaded = round_trip(&phase);
        assert_eq!(loaded.root_signature, "fwd");
        assert_eq!(loaded.pipeline_layout_id, None);
    }

    #[test]
    fn test_group_block_and_flattened_round_trip() {
        let mut group = DescriptorGroupBlock::default();
        group
            .descriptors
            .insert("materials".to_string(), Descriptor::new(ValueType::Sampler2DArray));
        group.capacity = 16;
        group.count = 1;
        assert_eq!(round_trip(&group), group);

        let mut flat = DescriptorBlockFlattened::default();
        flat.descriptor_names.push("albedo".to_string());
        flat.descriptors.push(Descriptor::new(ValueType::Sampler2D));
        flat.uniform_block_names.push("camera".to_string());
        flat.uniform_blocks.push(UniformBlock::default());
        flat.capacity = 1;
        flat.count = 1;
        assert_eq!(round_trip(&flat), flat);
    }

    #[test]
    fn test_invalid_enum_value_is_rejected() {
        let mut out = BinaryOutputArchive::new();
        out.write_u32(99);
        let bytes = out.into_bytes();
        let mut input = BinaryInputArchive::new(&bytes);
        assert_eq!(
            UpdateFrequency::load(&mut input),
            Err(ArchiveError::InvalidEnumValue {
                type_name: "UpdateFrequency",
                value: 99,
            })
        );
    }

    #[test]
    fn test_unknown_vertex_tag_is_rejected() {
        let mut out = BinaryOutputArchive::new();
        out.write_u32(1); // num_vertices
        out.write_u32(0); // num_edges
        out.write_u32(0); // num_stages
        out.write_u32(0); // num_phases
        out.write_u32(7); // unknown payload tag
        out.write_u32(NO_PARENT);
        out.write_string("bad");
        out.write_u32(0); // empty descriptor db
        let bytes = out.into_bytes();

        let mut input = BinaryInputArchive::new(&bytes);
        let mut graph = LayoutGraph::new();
        assert_eq!(
            graph.load_into(&mut input),
            Err(ArchiveError::InvalidEnumValue {
                type_name: "LayoutNode",
                value: 7,
            })
        );
    }

    #[test]
    fn test_set_layout_data_round_trip() {
        let mut layout = DescriptorSetLayoutData::new(1, 6);
        layout.uniform_block_capacity = 2;
        layout.sampler_texture_capacity = 4;
        let mut block = DescriptorBlockData::new(
            DescriptorTypeOrder::SamplerTexture,
            ShaderStageFlags::FRAGMENT,
            4,
        );
        block.offset = 2;
        block
            .descriptors
            .push(DescriptorData::new(3, ValueType::Sampler2D, 4));
        layout.descriptor_blocks.push(block);
        layout.uniform_blocks.insert(0, UniformBlock::default());
        layout.binding_map.insert(3, 2);

        assert_eq!(round_trip(&layout), layout);
    }
}
