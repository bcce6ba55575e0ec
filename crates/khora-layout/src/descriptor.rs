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

//! The semantic descriptor model.
//!
//! This is the unresolved side of the layout description: raw descriptor
//! counts and uniform-block shapes, grouped into blocks keyed by a
//! composite index (update frequency, parameter kind, descriptor-type
//! ordering, stage visibility). A reflection front end fills one
//! [`DescriptorDb`] per stage/phase vertex; a later pass resolves the
//! databases into the packed layouts of
//! [`pipeline_layout`](crate::pipeline_layout).
//!
//! Block keys compare structurally — two indices with equal components are
//! the same block, regardless of where they were built. The ordering is
//! frequency-major (field declaration order), which groups blocks of one
//! update tier together when iterating a database.

use std::collections::BTreeMap;

use crate::archive::archive_enum;
use crate::gfx::{Format, ShaderStageFlags, UniformBlock, ValueType};

archive_enum! {
    /// How often a descriptor set's contents are expected to change.
    pub enum UpdateFrequency {
        /// Rebound for every instance.
        #[default]
        PerInstance = 0,
        /// Rebound for every batch.
        PerBatch = 1,
        /// Rebound for every render phase.
        PerPhase = 2,
        /// Rebound for every render pass.
        PerPass = 3,
    }
}

archive_enum! {
    /// The parameter-passing kind of a shader resource.
    pub enum ParameterType {
        /// Inline constants.
        #[default]
        Constants = 0,
        /// Constant-buffer view.
        Cbv = 1,
        /// Unordered-access view.
        Uav = 2,
        /// Shader-resource view.
        Srv = 3,
        /// A descriptor table.
        Table = 4,
        /// A static-sampler view.
        Ssv = 5,
    }
}

archive_enum! {
    /// Canonical ordering of descriptor kinds within a set.
    ///
    /// Blocks are laid out contiguously in this order, so the enum doubles
    /// as the packing order of a resolved descriptor set.
    pub enum DescriptorTypeOrder {
        /// Uniform buffers.
        #[default]
        UniformBuffer = 0,
        /// Uniform buffers with dynamic offsets.
        DynamicUniformBuffer = 1,
        /// Combined sampler-textures.
        SamplerTexture = 2,
        /// Standalone samplers.
        Sampler = 3,
        /// Sampled textures.
        Texture = 4,
        /// Storage buffers.
        StorageBuffer = 5,
        /// Storage buffers with dynamic offsets.
        DynamicStorageBuffer = 6,
        /// Storage images.
        StorageImage = 7,
        /// Subpass input attachments.
        InputAttachment = 8,
    }
}

archive_enum! {
    /// How a shader accesses a bound resource.
    pub enum AccessType {
        /// Read-only access.
        #[default]
        Read = 0,
        /// Read-write access.
        ReadWrite = 1,
        /// Write-only access.
        Write = 2,
    }
}

archive_enum! {
    /// The dimensionality of a resource view.
    pub enum ViewDimension {
        /// Unknown or not applicable.
        Unknown = 0,
        /// A buffer view.
        Buffer = 1,
        /// A 1D texture view.
        Tex1D = 2,
        /// A 1D-array texture view.
        Tex1DArray = 3,
        /// A 2D texture view.
        #[default]
        Tex2D = 4,
        /// A 2D-array texture view.
        Tex2DArray = 5,
        /// A 3D texture view.
        Tex3D = 6,
        /// A cube texture view.
        TexCube = 7,
        /// A cube-array texture view.
        TexCubeArray = 8,
    }
}

/// A single shader-visible resource binding: a typed slot with a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// The resource's shader-side type.
    pub value_type: ValueType,
    /// Number of descriptors in the slot; `1` for non-arrays.
    pub count: u32,
}

impl Descriptor {
    /// Creates a descriptor of the given type with count `1`.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            count: 1,
        }
    }

    /// Re-types the descriptor and restores the default count.
    pub fn reset(&mut self, value_type: ValueType) {
        self.value_type = value_type;
        self.count = 1;
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new(ValueType::Unknown)
    }
}

/// The composite key of a descriptor block.
///
/// Two keys are the same block exactly when all four components are equal;
/// ordering is frequency-major in field declaration order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorBlockIndex {
    /// Scheduling tier of the block's set.
    pub update_frequency: UpdateFrequency,
    /// Parameter-passing kind.
    pub parameter_type: ParameterType,
    /// Position of the block in the set's packing order.
    pub descriptor_type: DescriptorTypeOrder,
    /// Shader stages that can access the block.
    pub visibility: ShaderStageFlags,
}

impl DescriptorBlockIndex {
    /// Creates a block key from its four components.
    pub fn new(
        update_frequency: UpdateFrequency,
        parameter_type: ParameterType,
        descriptor_type: DescriptorTypeOrder,
        visibility: ShaderStageFlags,
    ) -> Self {
        Self {
            update_frequency,
            parameter_type,
            descriptor_type,
            visibility,
        }
    }
}

/// The composite key of a descriptor *group* block.
///
/// Extends [`DescriptorBlockIndex`] with the access pattern, view
/// dimensionality, and view format that bindless-style grouping
/// discriminates on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorGroupBlockIndex {
    /// Scheduling tier of the block's set.
    pub update_frequency: UpdateFrequency,
    /// Parameter-passing kind.
    pub parameter_type: ParameterType,
    /// Position of the block in the set's packing order.
    pub descriptor_type: DescriptorTypeOrder,
    /// Shader stages that can access the block.
    pub visibility: ShaderStageFlags,
    /// How shaders access the grouped resources.
    pub access_type: AccessType,
    /// Dimensionality of the grouped views.
    pub view_dimension: ViewDimension,
    /// Format of the grouped views.
    pub format: Format,
}

impl DescriptorGroupBlockIndex {
    /// Creates a group-block key from its seven components.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        update_frequency: UpdateFrequency,
        parameter_type: ParameterType,
        descriptor_type: DescriptorTypeOrder,
        visibility: ShaderStageFlags,
        access_type: AccessType,
        view_dimension: ViewDimension,
        format: Format,
    ) -> Self {
        Self {
            update_frequency,
            parameter_type,
            descriptor_type,
            visibility,
            access_type,
            view_dimension,
            format,
        }
    }
}

/// Descriptors sharing one block key, laid out contiguously.
///
/// `capacity` is the running sum of descriptor counts added to the block and
/// `count` advances alongside it; both are maintained by the population
/// routine, never recomputed here.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DescriptorBlock {
    /// Descriptors in the block, by shader name.
    pub descriptors: BTreeMap<String, Descriptor>,
    /// Uniform blocks in the block, by shader name.
    pub uniform_blocks: BTreeMap<String, UniformBlock>,
    /// Running sum of descriptor counts.
    pub capacity: u32,
    /// Number of descriptors added.
    pub count: u32,
}

impl DescriptorBlock {
    /// Restores the canonical empty state, keeping allocation.
    pub fn reset(&mut self) {
        self.descriptors.clear();
        self.uniform_blocks.clear();
        self.capacity = 0;
        self.count = 0;
    }
}

/// Descriptors sharing one group-block key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DescriptorGroupBlock {
    /// Descriptors in the block, by shader name.
    pub descriptors: BTreeMap<String, Descriptor>,
    /// Uniform blocks in the block, by shader name.
    pub uniform_blocks: BTreeMap<String, UniformBlock>,
    /// Running sum of descriptor counts.
    pub capacity: u32,
    /// Number of descriptors added.
    pub count: u32,
}

impl DescriptorGroupBlock {
    /// Restores the canonical empty state, keeping allocation.
    pub fn reset(&mut self) {
        self.descriptors.clear();
        self.uniform_blocks.clear();
        self.capacity = 0;
        self.count = 0;
    }
}

/// A descriptor block flattened into parallel name/value vectors.
///
/// The bridge-friendly shape handed across language or thread boundaries by
/// the population layer: names and values at matching indices.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DescriptorBlockFlattened {
    /// Descriptor names, parallel to `descriptors`.
    pub descriptor_names: Vec<String>,
    /// Uniform-block names, parallel to `uniform_blocks`.
    pub uniform_block_names: Vec<String>,
    /// Descriptors, parallel to `descriptor_names`.
    pub descriptors: Vec<Descriptor>,
    /// Uniform blocks, parallel to `uniform_block_names`.
    pub uniform_blocks: Vec<UniformBlock>,
    /// Running sum of descriptor counts.
    pub capacity: u32,
    /// Number of descriptors added.
    pub count: u32,
}

impl DescriptorBlockFlattened {
    /// Restores the canonical empty state, keeping allocation.
    pub fn reset(&mut self) {
        self.descriptor_names.clear();
        self.uniform_block_names.clear();
        self.descriptors.clear();
        self.uniform_blocks.clear();
        self.capacity = 0;
        self.count = 0;
    }
}

/// The per-vertex descriptor database of the stage/phase hierarchy.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DescriptorDb {
    /// Blocks by structural key, in key order.
    pub blocks: BTreeMap<DescriptorBlockIndex, DescriptorBlock>,
}

impl DescriptorDb {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.blocks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_index_compares_structurally() {
        let a = DescriptorBlockIndex::new(
            UpdateFrequency::PerPass,
            ParameterType::Table,
            DescriptorTypeOrder::SamplerTexture,
            ShaderStageFlags::FRAGMENT,
        );
        let b = DescriptorBlockIndex::new(
            UpdateFrequency::PerPass,
            ParameterType::Table,
            DescriptorTypeOrder::SamplerTexture,
            ShaderStageFlags::FRAGMENT,
        );
        assert_eq!(a, b);

        let mut db = DescriptorDb::default();
        db.blocks.insert(a, DescriptorBlock::default());
        // Inserting under the structurally equal key replaces, not duplicates.
        db.blocks.insert(b, DescriptorBlock::default());
        assert_eq!(db.blocks.len(), 1);
    }

    #[test]
    fn test_block_index_ordering_is_frequency_major() {
        let per_batch = DescriptorBlockIndex::new(
            UpdateFrequency::PerBatch,
            ParameterType::Table,
            DescriptorTypeOrder::InputAttachment,
            ShaderStageFlags::ALL,
        );
        let per_pass = DescriptorBlockIndex::new(
            UpdateFrequency::PerPass,
            ParameterType::Constants,
            DescriptorTypeOrder::UniformBuffer,
            ShaderStageFlags::NONE,
        );
        assert!(per_batch < per_pass);
    }

    #[test]
    fn test_capacity_is_caller_maintained() {
        let mut block = DescriptorBlock::default();
        block
            .descriptors
            .insert("albedo".to_string(), Descriptor::new(ValueType::Sampler2D));
        // Inserting a descriptor does not move the counters; the population
        // routine advances them.
        assert_eq!(block.capacity, 0);
        assert_eq!(block.count, 0);

        block.capacity += 1;
        block.count += 1;
        block.reset();
        assert_eq!(block.capacity, 0);
        assert!(block.descriptors.is_empty());
    }

    #[test]
    fn test_descriptor_reset_restores_count() {
        let mut d = Descriptor::new(ValueType::Sampler2D);
        d.count = 8;
        d.reset(ValueType::Texture2D);
        assert_eq!(d.value_type, ValueType::Texture2D);
        assert_eq!(d.count, 1);
    }
}
