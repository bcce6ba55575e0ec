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

//! The resolved pipeline-layout value types.
//!
//! Where [`descriptor`](crate::descriptor) describes resources by name,
//! these types describe them by slot: packed descriptor blocks with offsets,
//! binding maps, per-update-frequency set layouts, and the per-shader
//! lookup data frame rendering consumes.
//!
//! Offsets are caller-maintained. Within one set layout the invariant is
//! `blocks[k].offset == blocks[0..k].map(capacity).sum()` — a packed,
//! order-dependent binding layout that the resolution pass establishes and
//! this crate never recomputes.
//!
//! Device handles (`*_id` fields) are stored here but owned by the device
//! layer; they are skipped by serialization and reset to `None`.

use std::collections::BTreeMap;

use crate::descriptor::{
    AccessType, DescriptorTypeOrder, UpdateFrequency, ViewDimension,
};
use crate::gfx::{
    DescriptorSetId, DescriptorSetLayoutId, DescriptorSetLayoutInfo, Format, PipelineLayoutId,
    ShaderStageFlags, UniformBlock, ValueType,
};

/// Sentinel slot for a set layout that has not been assigned one.
pub const INVALID_SLOT: u32 = u32::MAX;

/// Sentinel id for a uniform that has not been assigned one.
pub const INVALID_ID: u32 = u32::MAX;

/// One resolved uniform within a uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformData {
    /// Numeric id of the uniform, [`INVALID_ID`] when unassigned.
    pub uniform_id: u32,
    /// The uniform's shader-side type.
    pub value_type: ValueType,
    /// Byte offset within the block.
    pub offset: u32,
    /// Byte size of the uniform.
    pub size: u32,
}

impl UniformData {
    /// Creates a uniform entry with zero size.
    pub fn new(uniform_id: u32, value_type: ValueType, offset: u32) -> Self {
        Self {
            uniform_id,
            value_type,
            offset,
            size: 0,
        }
    }

    /// Re-keys the entry and restores zero size.
    pub fn reset(&mut self, uniform_id: u32, value_type: ValueType, offset: u32) {
        self.uniform_id = uniform_id;
        self.value_type = value_type;
        self.offset = offset;
        self.size = 0;
    }
}

impl Default for UniformData {
    fn default() -> Self {
        Self::new(INVALID_ID, ValueType::Unknown, 0)
    }
}

/// The resolved shape of one uniform buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UniformBlockData {
    /// Total byte size of the buffer.
    pub buffer_size: u32,
    /// The buffer's uniforms, in layout order.
    pub uniforms: Vec<UniformData>,
}

impl UniformBlockData {
    /// Restores the canonical empty state, keeping allocation.
    pub fn reset(&mut self) {
        self.buffer_size = 0;
        self.uniforms.clear();
    }
}

/// One resolved descriptor within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorData {
    /// Numeric id of the descriptor.
    pub descriptor_id: u32,
    /// The descriptor's shader-side type.
    pub value_type: ValueType,
    /// Number of descriptors in the slot.
    pub count: u32,
}

impl DescriptorData {
    /// Creates a descriptor entry.
    pub fn new(descriptor_id: u32, value_type: ValueType, count: u32) -> Self {
        Self {
            descriptor_id,
            value_type,
            count,
        }
    }

    /// Re-keys the entry.
    pub fn reset(&mut self, descriptor_id: u32, value_type: ValueType, count: u32) {
        self.descriptor_id = descriptor_id;
        self.value_type = value_type;
        self.count = count;
    }
}

impl Default for DescriptorData {
    fn default() -> Self {
        Self::new(0, ValueType::Unknown, 1)
    }
}

/// A packed block of resolved descriptors within a set layout.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DescriptorBlockData {
    /// The block's position in the set's packing order.
    pub descriptor_type: DescriptorTypeOrder,
    /// Shader stages that can access the block.
    pub visibility: ShaderStageFlags,
    /// First binding slot of the block: the capacity sum of all preceding
    /// blocks in the same set. Caller-maintained.
    pub offset: u32,
    /// Number of binding slots the block spans.
    pub capacity: u32,
    /// The block's descriptors, in slot order.
    pub descriptors: Vec<DescriptorData>,
}

impl DescriptorBlockData {
    /// Creates a block with the given key fields and capacity.
    pub fn new(
        descriptor_type: DescriptorTypeOrder,
        visibility: ShaderStageFlags,
        capacity: u32,
    ) -> Self {
        Self {
            descriptor_type,
            visibility,
            offset: 0,
            capacity,
            descriptors: Vec::new(),
        }
    }

    /// Re-keys the block, clearing offset and descriptors.
    pub fn reset(
        &mut self,
        descriptor_type: DescriptorTypeOrder,
        visibility: ShaderStageFlags,
        capacity: u32,
    ) {
        self.descriptor_type = descriptor_type;
        self.visibility = visibility;
        self.offset = 0;
        self.capacity = capacity;
        self.descriptors.clear();
    }
}

/// The resolved layout of one descriptor set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSetLayoutData {
    /// The set index the layout binds at, [`INVALID_SLOT`] when unassigned.
    pub slot: u32,
    /// Total binding slots across all blocks.
    pub capacity: u32,
    /// Binding slots taken by uniform-buffer blocks.
    pub uniform_block_capacity: u32,
    /// Binding slots taken by sampler-texture blocks.
    pub sampler_texture_capacity: u32,
    /// The set's blocks, in packing order.
    pub descriptor_blocks: Vec<DescriptorBlockData>,
    /// Uniform blocks by descriptor id.
    pub uniform_blocks: BTreeMap<u32, UniformBlock>,
    /// Logical binding id to physical slot index.
    pub binding_map: BTreeMap<u32, u32>,
}

impl DescriptorSetLayoutData {
    /// Creates a set layout with the given slot and capacity.
    pub fn new(slot: u32, capacity: u32) -> Self {
        Self {
            slot,
            capacity,
            uniform_block_capacity: 0,
            sampler_texture_capacity: 0,
            descriptor_blocks: Vec::new(),
            uniform_blocks: BTreeMap::new(),
            binding_map: BTreeMap::new(),
        }
    }

    /// Re-keys the layout and empties its collections.
    pub fn reset(&mut self, slot: u32, capacity: u32) {
        self.slot = slot;
        self.capacity = capacity;
        self.uniform_block_capacity = 0;
        self.sampler_texture_capacity = 0;
        self.descriptor_blocks.clear();
        self.uniform_blocks.clear();
        self.binding_map.clear();
    }
}

impl Default for DescriptorSetLayoutData {
    fn default() -> Self {
        Self::new(INVALID_SLOT, 0)
    }
}

/// One descriptor set of a pipeline layout: the resolved layout, the device
/// construction info built from it, and the device objects bound to it.
///
/// `layout_id` and `set_id` are externally owned; they are stored for the
/// frame renderer's convenience and excluded from serialization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DescriptorSetData {
    /// The resolved layout.
    pub layout_data: DescriptorSetLayoutData,
    /// Construction info assembled for the device layer.
    pub layout_info: DescriptorSetLayoutInfo,
    /// Device descriptor-set layout, if one has been created.
    pub layout_id: Option<DescriptorSetLayoutId>,
    /// Device descriptor set, if one has been created.
    pub set_id: Option<DescriptorSetId>,
}

impl DescriptorSetData {
    /// Resets the layout data and installs the given device handles.
    pub fn reset(
        &mut self,
        layout_id: Option<DescriptorSetLayoutId>,
        set_id: Option<DescriptorSetId>,
    ) {
        self.layout_data.reset(INVALID_SLOT, 0);
        self.layout_info.reset();
        self.layout_id = layout_id;
        self.set_id = set_id;
    }
}

/// A packed block of resolved descriptors within a group layout.
///
/// The group flavour extends [`DescriptorBlockData`] with the access
/// pattern, view dimensionality, and format that grouped (bindless-style)
/// bindings discriminate on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DescriptorGroupBlockData {
    /// The block's position in the group's packing order.
    pub descriptor_type: DescriptorTypeOrder,
    /// Shader stages that can access the block.
    pub visibility: ShaderStageFlags,
    /// How shaders access the block's resources.
    pub access_type: AccessType,
    /// Dimensionality of the block's views.
    pub view_dimension: ViewDimension,
    /// Format of the block's views.
    pub format: Format,
    /// First binding slot of the block. Caller-maintained.
    pub offset: u32,
    /// Number of binding slots the block spans.
    pub capacity: u32,
    /// The block's descriptors, in slot order.
    pub descriptors: Vec<DescriptorData>,
}

impl DescriptorGroupBlockData {
    /// Creates a group block with the given key fields and capacity.
    pub fn new(
        descriptor_type: DescriptorTypeOrder,
        visibility: ShaderStageFlags,
        access_type: AccessType,
        view_dimension: ViewDimension,
        format: Format,
        capacity: u32,
    ) -> Self {
        Self {
            descriptor_type,
            visibility,
            access_type,
            view_dimension,
            format,
            offset: 0,
            capacity,
            descriptors: Vec::new(),
        }
    }

    /// Re-keys the block, clearing offset and descriptors.
    pub fn reset(
        &mut self,
        descriptor_type: DescriptorTypeOrder,
        visibility: ShaderStageFlags,
        access_type: AccessType,
        view_dimension: ViewDimension,
        format: Format,
        capacity: u32,
    ) {
        self.descriptor_type = descriptor_type;
        self.visibility = visibility;
        self.access_type = access_type;
        self.view_dimension = view_dimension;
        self.format = format;
        self.offset = 0;
        self.capacity = capacity;
        self.descriptors.clear();
    }
}

/// The resolved layout of one descriptor group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorGroupLayoutData {
    /// The set index the group binds at, [`INVALID_SLOT`] when unassigned.
    pub slot: u32,
    /// Total binding slots across all blocks.
    pub capacity: u32,
    /// Binding slots taken by uniform-buffer blocks.
    pub uniform_block_capacity: u32,
    /// Binding slots taken by sampler-texture blocks.
    pub sampler_texture_capacity: u32,
    /// The group's blocks, in packing order.
    pub descriptor_group_blocks: Vec<DescriptorGroupBlockData>,
    /// Uniform blocks by descriptor id.
    pub uniform_blocks: BTreeMap<u32, UniformBlock>,
    /// Logical binding id to physical slot index.
    pub binding_map: BTreeMap<u32, u32>,
}

impl DescriptorGroupLayoutData {
    /// Creates a group layout with the given slot and capacity.
    pub fn new(slot: u32, capacity: u32) -> Self {
        Self {
            slot,
            capacity,
            uniform_block_capacity: 0,
            sampler_texture_capacity: 0,
            descriptor_group_blocks: Vec::new(),
            uniform_blocks: BTreeMap::new(),
            binding_map: BTreeMap::new(),
        }
    }

    /// Re-keys the layout and empties its collections.
    pub fn reset(&mut self, slot: u32, capacity: u32) {
        self.slot = slot;
        self.capacity = capacity;
        self.uniform_block_capacity = 0;
        self.sampler_texture_capacity = 0;
        self.descriptor_group_blocks.clear();
        self.uniform_blocks.clear();
        self.binding_map.clear();
    }
}

impl Default for DescriptorGroupLayoutData {
    fn default() -> Self {
        Self::new(INVALID_SLOT, 0)
    }
}

/// One descriptor group of a pipeline layout.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DescriptorGroupData {
    /// The resolved group layout.
    pub layout_data: DescriptorGroupLayoutData,
}

impl DescriptorGroupData {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.layout_data.reset(INVALID_SLOT, 0);
    }
}

/// A resolved pipeline layout: one descriptor set and one descriptor group
/// per populated update frequency.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineLayoutData {
    /// Descriptor sets by update frequency.
    pub descriptor_sets: BTreeMap<UpdateFrequency, DescriptorSetData>,
    /// Descriptor groups by update frequency.
    pub descriptor_groups: BTreeMap<UpdateFrequency, DescriptorGroupData>,
}

impl PipelineLayoutData {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.descriptor_sets.clear();
        self.descriptor_groups.clear();
    }
}

/// Per-shader binding remap: logical descriptor id to physical slot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShaderBindingData {
    /// Descriptor id to slot index.
    pub descriptor_bindings: BTreeMap<u32, u32>,
}

impl ShaderBindingData {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.descriptor_bindings.clear();
    }
}

/// Per-shader layout view: set layouts and binding remaps by frequency.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShaderLayoutData {
    /// Set layouts by update frequency.
    pub layout_data: BTreeMap<UpdateFrequency, DescriptorSetLayoutData>,
    /// Binding remaps by update frequency.
    pub binding_data: BTreeMap<UpdateFrequency, ShaderBindingData>,
}

impl ShaderLayoutData {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.layout_data.clear();
        self.binding_data.clear();
    }
}

/// The layout views of one technique, one entry per pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TechniqueData {
    /// Per-pass shader layouts.
    pub passes: Vec<ShaderLayoutData>,
}

impl TechniqueData {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.passes.clear();
    }
}

/// The layout views of one effect, by technique name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EffectData {
    /// Techniques by name.
    pub techniques: BTreeMap<String, TechniqueData>,
}

impl EffectData {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.techniques.clear();
    }
}

/// One shader program's fully resolved layout.
///
/// `pipeline_layout_id` is externally owned and excluded from serialization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShaderProgramData {
    /// The program's pipeline layout.
    pub layout: PipelineLayoutData,
    /// Device pipeline layout, if one has been created.
    pub pipeline_layout_id: Option<PipelineLayoutId>,
}

impl ShaderProgramData {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.layout.reset();
        self.pipeline_layout_id = None;
    }
}

/// Resolved payload of a render-stage vertex: per-descriptor visibility.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderStageData {
    /// Stage-flag visibility by descriptor id.
    pub descriptor_visibility: BTreeMap<u32, ShaderStageFlags>,
}

impl RenderStageData {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.descriptor_visibility.clear();
    }
}

/// Resolved payload of a render-phase vertex.
///
/// `pipeline_layout_id` is externally owned and excluded from serialization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderPhaseData {
    /// Label of the phase's root signature.
    pub root_signature: String,
    /// The phase's shader programs, in registration order.
    pub shader_programs: Vec<ShaderProgramData>,
    /// Shader name to index into `shader_programs`.
    pub shader_index: BTreeMap<String, u32>,
    /// Device pipeline layout, if one has been created.
    pub pipeline_layout_id: Option<PipelineLayoutId>,
}

impl RenderPhaseData {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.root_signature.clear();
        self.shader_programs.clear();
        self.shader_index.clear();
        self.pipeline_layout_id = None;
    }
}
