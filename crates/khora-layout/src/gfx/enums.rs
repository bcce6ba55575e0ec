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

//! Device-facing enumerations used by the descriptor model.
//!
//! Discriminants are wire format — they are written verbatim into archives,
//! so variants must never be renumbered, only appended.

use crate::archive::archive_enum;

archive_enum! {
    /// The shader-side type of a uniform, sampler, texture, or image.
    pub enum ValueType {
        /// Unknown or not yet resolved.
        #[default]
        Unknown = 0,
        /// `bool`.
        Bool = 1,
        /// `int`.
        Int = 2,
        /// `ivec2`.
        Int2 = 3,
        /// `ivec3`.
        Int3 = 4,
        /// `ivec4`.
        Int4 = 5,
        /// `uint`.
        Uint = 6,
        /// `uvec2`.
        Uint2 = 7,
        /// `uvec3`.
        Uint3 = 8,
        /// `uvec4`.
        Uint4 = 9,
        /// `float`.
        Float = 10,
        /// `vec2`.
        Float2 = 11,
        /// `vec3`.
        Float3 = 12,
        /// `vec4`.
        Float4 = 13,
        /// `mat2`.
        Mat2 = 14,
        /// `mat3`.
        Mat3 = 15,
        /// `mat4`.
        Mat4 = 16,
        /// A standalone sampler.
        Sampler = 17,
        /// A combined 2D sampler-texture.
        Sampler2D = 18,
        /// A combined 2D-array sampler-texture.
        Sampler2DArray = 19,
        /// A combined 3D sampler-texture.
        Sampler3D = 20,
        /// A combined cube sampler-texture.
        SamplerCube = 21,
        /// A sampled 2D texture.
        Texture2D = 22,
        /// A sampled 2D-array texture.
        Texture2DArray = 23,
        /// A sampled 3D texture.
        Texture3D = 24,
        /// A sampled cube texture.
        TextureCube = 25,
        /// A 2D storage image.
        Image2D = 26,
        /// A 3D storage image.
        Image3D = 27,
        /// A subpass input attachment.
        SubpassInput = 28,
    }
}

archive_enum! {
    /// The memory format of a texture or image view.
    pub enum Format {
        /// Unknown or format-agnostic.
        #[default]
        Unknown = 0,
        /// 8-bit single-channel unsigned normalized.
        R8 = 1,
        /// 8-bit two-channel unsigned normalized.
        Rg8 = 2,
        /// 8-bit four-channel unsigned normalized.
        Rgba8 = 3,
        /// 8-bit four-channel sRGB.
        Srgb8A8 = 4,
        /// 16-bit single-channel float.
        R16F = 5,
        /// 16-bit two-channel float.
        Rg16F = 6,
        /// 16-bit four-channel float.
        Rgba16F = 7,
        /// 32-bit single-channel float.
        R32F = 8,
        /// 32-bit two-channel float.
        Rg32F = 9,
        /// 32-bit four-channel float.
        Rgba32F = 10,
        /// 32-bit single-channel unsigned integer.
        R32Ui = 11,
        /// Depth-only.
        Depth = 12,
        /// Combined depth-stencil.
        DepthStencil = 13,
    }
}

archive_enum! {
    /// The device-level kind of a descriptor-set-layout binding.
    pub enum DescriptorType {
        /// Unknown or not yet resolved.
        #[default]
        Unknown = 0,
        /// A uniform buffer.
        UniformBuffer = 1,
        /// A uniform buffer with a dynamic offset.
        DynamicUniformBuffer = 2,
        /// A storage buffer.
        StorageBuffer = 3,
        /// A storage buffer with a dynamic offset.
        DynamicStorageBuffer = 4,
        /// A standalone sampler.
        Sampler = 5,
        /// A combined sampler-texture.
        SamplerTexture = 6,
        /// A sampled texture.
        Texture = 7,
        /// A storage image.
        StorageImage = 8,
        /// A subpass input attachment.
        InputAttachment = 9,
    }
}
