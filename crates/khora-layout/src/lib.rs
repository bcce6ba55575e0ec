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

//! # Khora Layout
//!
//! The build-time resource-layout graph of the render pipeline.
//!
//! This crate models how shader-visible resources (uniform blocks, textures,
//! samplers, storage buffers) are grouped into descriptor sets across render
//! stages and render phases, and how that description round-trips through a
//! compact binary archive for reuse between runs.
//!
//! Two concrete graphs share one property-graph abstraction:
//!
//! - [`LayoutGraph`](layout_graph::LayoutGraph) — the semantic
//!   stage/phase hierarchy, carrying a [`DescriptorDb`](descriptor::DescriptorDb)
//!   per vertex.
//! - [`PipelineLayoutGraph`](pipeline_graph::PipelineLayoutGraph) — the fully
//!   resolved pipeline-layout data (descriptor-set slots, binding maps,
//!   per-stage shader bindings) consumed directly by frame rendering.
//!
//! The crate stores opaque handles to device objects (descriptor sets,
//! descriptor-set layouts, pipeline layouts) but never creates or destroys
//! them; the graphics device layer owns their lifetimes. Serialization skips
//! those handles entirely: an archived graph describes layout shape only.
//!
//! All graphs, pools, and codecs here are plain single-owner data — no
//! internal synchronization. Mutation goes through `&mut`, so the
//! one-writer-per-graph discipline is enforced by the borrow checker.

#![warn(missing_docs)]

pub mod archive;
pub mod descriptor;
pub mod error;
pub mod gfx;
pub mod graph;
pub mod layout_graph;
pub mod pipeline_graph;
pub mod pipeline_layout;
pub mod pool;
pub mod serialization;

pub use archive::{BinaryInputArchive, BinaryOutputArchive, InputArchive, OutputArchive, Persist};
pub use error::{ArchiveError, GraphError};
pub use graph::{AddressableGraph, Edge, Graph, VertexId, PATH_SEPARATOR};
pub use layout_graph::LayoutGraph;
pub use pipeline_graph::PipelineLayoutGraph;
pub use pool::LayoutObjectPool;
