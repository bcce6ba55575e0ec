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

//! Value types shared with the graphics device layer.
//!
//! The device layer is an external collaborator: it consumes the
//! construction info assembled here ([`DescriptorSetLayoutInfo`]) and hands
//! back opaque ids for the objects it creates. This crate stores those ids
//! ([`DescriptorSetId`], [`DescriptorSetLayoutId`], [`PipelineLayoutId`])
//! but never allocates or frees the objects behind them, and never writes
//! the ids into an archive.

mod enums;
mod flags;

pub use enums::{DescriptorType, Format, ValueType};
pub use flags::ShaderStageFlags;

/// An opaque handle to a device-created descriptor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorSetId(pub usize);

/// An opaque handle to a device-created descriptor-set layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorSetLayoutId(pub usize);

/// An opaque handle to a device-created pipeline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineLayoutId(pub usize);

/// One member of a uniform block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Uniform {
    /// The member's name in shader source.
    pub name: String,
    /// The member's shader-side type.
    pub value_type: ValueType,
    /// Array length; `1` for non-arrays.
    pub count: u32,
}

/// The reflected shape of a shader uniform block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    /// The descriptor set the block is declared in.
    pub set: u32,
    /// The binding index within the set.
    pub binding: u32,
    /// The block's name in shader source.
    pub name: String,
    /// The block's members, in declaration order.
    pub members: Vec<Uniform>,
    /// Array length of the block binding; `1` for non-arrays.
    pub count: u32,
}

/// One binding of a descriptor-set-layout construction info.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorSetLayoutBinding {
    /// The binding index.
    pub binding: u32,
    /// The device-level kind of the bound resource.
    pub descriptor_type: DescriptorType,
    /// Number of descriptors in the binding; `1` for non-arrays.
    pub count: u32,
    /// Shader stages that can access the binding.
    pub visibility: ShaderStageFlags,
}

/// Construction info for a device descriptor-set layout.
///
/// Assembled by the layout-resolution pass and handed to the device layer,
/// which turns it into a [`DescriptorSetLayoutId`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DescriptorSetLayoutInfo {
    /// The layout's bindings, in binding order.
    pub bindings: Vec<DescriptorSetLayoutBinding>,
}

impl DescriptorSetLayoutInfo {
    /// Restores the canonical empty state, keeping allocation.
    pub fn reset(&mut self) {
        self.bindings.clear();
    }
}
