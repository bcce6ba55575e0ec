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

//! The resolved pipeline-layout graph.
//!
//! The [`PipelineLayoutGraph`] mirrors the stage/phase hierarchy of a
//! [`LayoutGraph`](crate::layout_graph::LayoutGraph) but carries the fully
//! resolved data frame rendering needs: a [`PipelineLayoutData`] and an
//! [`UpdateFrequency`] per vertex, visibility maps on stages, and shader
//! program tables on phases. Beyond the per-vertex components it owns
//! graph-wide lookup state — value names, attribute/constant/shader-layout
//! indices, and per-effect layout data.

use std::collections::BTreeMap;

use crate::descriptor::UpdateFrequency;
use crate::error::GraphError;
use crate::graph::{AddressableGraph, Edge, Graph, VertexId, VertexRecord};
use crate::pipeline_layout::{EffectData, PipelineLayoutData, RenderPhaseData, RenderStageData};

/// The polymorphic payload of a [`PipelineLayoutGraph`] vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineNode {
    /// Resolved data of a render stage.
    RenderStage(RenderStageData),
    /// Resolved data of a render phase.
    RenderPhase(RenderPhaseData),
}

impl PipelineNode {
    /// The payload's type name, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            PipelineNode::RenderStage(_) => "RenderStage",
            PipelineNode::RenderPhase(_) => "RenderPhase",
        }
    }
}

impl Default for PipelineNode {
    fn default() -> Self {
        PipelineNode::RenderStage(RenderStageData::default())
    }
}

/// Per-payload dispatch over a [`PipelineLayoutGraph`] vertex.
pub trait PipelineNodeVisitor {
    /// The value produced by a visit.
    type Output;

    /// Called for a render-stage vertex.
    fn render_stage(&mut self, data: &RenderStageData) -> Self::Output;

    /// Called for a render-phase vertex.
    fn render_phase(&mut self, data: &RenderPhaseData) -> Self::Output;
}

/// The fully resolved pipeline-layout graph.
///
/// Storage is struct-of-arrays: vertex records and the `names`,
/// `update_frequencies`, and `layouts` component arrays always have
/// identical length and share indexing by [`VertexId`].
#[derive(Debug, Default, Clone)]
pub struct PipelineLayoutGraph {
    vertices: Vec<VertexRecord<PipelineNode>>,
    names: Vec<String>,
    update_frequencies: Vec<UpdateFrequency>,
    layouts: Vec<PipelineLayoutData>,
    /// Names of all registered shader values, by value id.
    pub value_names: Vec<String>,
    /// Vertex-attribute name to attribute id.
    pub attribute_index: BTreeMap<String, u32>,
    /// Constant name to constant id.
    pub constant_index: BTreeMap<String, u32>,
    /// Shader name to shader-layout id.
    pub shader_layout_index: BTreeMap<String, u32>,
    /// Per-effect layout data, by effect name.
    pub effects: BTreeMap<String, EffectData>,
    /// Preprocessor macros shared by all constants. Not serialized.
    pub constant_macros: String,
}

impl PipelineLayoutGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the graph: members, component arrays, and vertices together.
    /// Allocation is kept for reuse.
    pub fn clear(&mut self) {
        self.value_names.clear();
        self.attribute_index.clear();
        self.constant_index.clear();
        self.shader_layout_index.clear();
        self.effects.clear();
        self.constant_macros.clear();
        self.names.clear();
        self.update_frequencies.clear();
        self.layouts.clear();
        self.vertices.clear();
    }

    /// Appends a vertex with its components and returns its id.
    ///
    /// When `parent` is given, the edge `parent -> new vertex` is added
    /// atomically with the vertex.
    pub fn add_vertex(
        &mut self,
        node: PipelineNode,
        name: impl Into<String>,
        update_frequency: UpdateFrequency,
        layout: PipelineLayoutData,
        parent: Option<VertexId>,
    ) -> VertexId {
        let v = VertexId(self.vertices.len() as u32);
        self.vertices.push(VertexRecord::new(node));
        self.names.push(name.into());
        self.update_frequencies.push(update_frequency);
        self.layouts.push(layout);

        if let Some(u) = parent {
            self.add_edge(u, v);
        }
        v
    }

    /// Adds a directed edge `u -> v` and returns its descriptor.
    ///
    /// Never fails: duplicate edges are legal and counted separately, and
    /// no cycle check is performed.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> Edge {
        self.vertices[u.index()].out_edges.push(v);
        self.vertices[v.index()].in_edges.push(u);
        Edge {
            source: u,
            target: v,
        }
    }

    /// The payload of vertex `v`.
    pub fn node(&self, v: VertexId) -> &PipelineNode {
        &self.vertices[v.index()].payload
    }

    /// The payload of vertex `v`, mutably.
    pub fn node_mut(&mut self, v: VertexId) -> &mut PipelineNode {
        &mut self.vertices[v.index()].payload
    }

    /// The render-stage payload of `v` — a checked downcast.
    pub fn render_stage(&self, v: VertexId) -> Result<&RenderStageData, GraphError> {
        match self.node(v) {
            PipelineNode::RenderStage(data) => Ok(data),
            other => Err(GraphError::PayloadMismatch {
                expected: "RenderStage",
                found: other.type_name(),
            }),
        }
    }

    /// The render-stage payload of `v`, mutably — a checked downcast.
    pub fn render_stage_mut(&mut self, v: VertexId) -> Result<&mut RenderStageData, GraphError> {
        let type_name = self.node(v).type_name();
        match self.node_mut(v) {
            PipelineNode::RenderStage(data) => Ok(data),
            _ => Err(GraphError::PayloadMismatch {
                expected: "RenderStage",
                found: type_name,
            }),
        }
    }

    /// The render-phase payload of `v` — a checked downcast.
    pub fn render_phase(&self, v: VertexId) -> Result<&RenderPhaseData, GraphError> {
        match self.node(v) {
            PipelineNode::RenderPhase(data) => Ok(data),
            other => Err(GraphError::PayloadMismatch {
                expected: "RenderPhase",
                found: other.type_name(),
            }),
        }
    }

    /// The render-phase payload of `v`, mutably — a checked downcast.
    pub fn render_phase_mut(&mut self, v: VertexId) -> Result<&mut RenderPhaseData, GraphError> {
        let type_name = self.node(v).type_name();
        match self.node_mut(v) {
            PipelineNode::RenderPhase(data) => Ok(data),
            _ => Err(GraphError::PayloadMismatch {
                expected: "RenderPhase",
                found: type_name,
            }),
        }
    }

    /// Dispatches to the visitor callback matching `v`'s payload.
    pub fn visit_vertex<V: PipelineNodeVisitor>(&self, visitor: &mut V, v: VertexId) -> V::Output {
        match self.node(v) {
            PipelineNode::RenderStage(data) => visitor.render_stage(data),
            PipelineNode::RenderPhase(data) => visitor.render_phase(data),
        }
    }

    /// The update frequency of vertex `v`.
    pub fn update_frequency(&self, v: VertexId) -> UpdateFrequency {
        self.update_frequencies[v.index()]
    }

    /// Sets the update frequency of vertex `v`.
    pub fn set_update_frequency(&mut self, v: VertexId, update_frequency: UpdateFrequency) {
        self.update_frequencies[v.index()] = update_frequency;
    }

    /// The pipeline layout of vertex `v`.
    pub fn layout(&self, v: VertexId) -> &PipelineLayoutData {
        &self.layouts[v.index()]
    }

    /// The pipeline layout of vertex `v`, mutably.
    pub fn layout_mut(&mut self, v: VertexId) -> &mut PipelineLayoutData {
        &mut self.layouts[v.index()]
    }
}

impl Graph for PipelineLayoutGraph {
    fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    fn out_edges(&self, v: VertexId) -> &[VertexId] {
        &self.vertices[v.index()].out_edges
    }

    fn in_edges(&self, v: VertexId) -> &[VertexId] {
        &self.vertices[v.index()].in_edges
    }
}

impl AddressableGraph for PipelineLayoutGraph {
    fn vertex_name(&self, v: VertexId) -> &str {
        &self.names[v.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::ShaderStageFlags;

    #[test]
    fn test_components_stay_in_lockstep() {
        let mut g = PipelineLayoutGraph::new();
        let stage = g.add_vertex(
            PipelineNode::RenderStage(RenderStageData::default()),
            "Opaque",
            UpdateFrequency::PerPass,
            PipelineLayoutData::default(),
            None,
        );
        let phase = g.add_vertex(
            PipelineNode::RenderPhase(RenderPhaseData::default()),
            "Forward",
            UpdateFrequency::PerPhase,
            PipelineLayoutData::default(),
            Some(stage),
        );

        assert_eq!(g.num_vertices(), 2);
        assert_eq!(g.names.len(), 2);
        assert_eq!(g.update_frequencies.len(), 2);
        assert_eq!(g.layouts.len(), 2);
        assert_eq!(g.update_frequency(stage), UpdateFrequency::PerPass);
        assert_eq!(g.update_frequency(phase), UpdateFrequency::PerPhase);
        assert_eq!(g.parent_of(phase), Some(stage));
        assert_eq!(g.vertex_path(phase), "Opaque/Forward");
    }

    #[test]
    fn test_clear_empties_members_and_components() {
        let mut g = PipelineLayoutGraph::new();
        g.add_vertex(
            PipelineNode::RenderStage(RenderStageData::default()),
            "s",
            UpdateFrequency::PerPass,
            PipelineLayoutData::default(),
            None,
        );
        g.value_names.push("albedo".to_string());
        g.attribute_index.insert("a_position".to_string(), 0);
        g.constant_index.insert("fog".to_string(), 1);
        g.shader_layout_index.insert("std".to_string(), 0);
        g.effects.insert("builtin".to_string(), EffectData::default());
        g.constant_macros = "USE_FOG 1".to_string();

        g.clear();
        assert_eq!(g.num_vertices(), 0);
        assert!(g.value_names.is_empty());
        assert!(g.attribute_index.is_empty());
        assert!(g.constant_index.is_empty());
        assert!(g.shader_layout_index.is_empty());
        assert!(g.effects.is_empty());
        assert!(g.constant_macros.is_empty());
    }

    #[test]
    fn test_checked_downcasts_and_mutation() {
        let mut g = PipelineLayoutGraph::new();
        let stage = g.add_vertex(
            PipelineNode::RenderStage(RenderStageData::default()),
            "s",
            UpdateFrequency::PerPass,
            PipelineLayoutData::default(),
            None,
        );
        let phase = g.add_vertex(
            PipelineNode::RenderPhase(RenderPhaseData::default()),
            "p",
            UpdateFrequency::PerPhase,
            PipelineLayoutData::default(),
            Some(stage),
        );

        g.render_stage_mut(stage)
            .unwrap()
            .descriptor_visibility
            .insert(0, ShaderStageFlags::FRAGMENT);
        assert_eq!(
            g.render_stage(stage).unwrap().descriptor_visibility.len(),
            1
        );

        assert!(g.render_phase(stage).is_err());
        assert!(g.render_stage(phase).is_err());

        g.render_phase_mut(phase).unwrap().root_signature = "fwd".to_string();
        assert_eq!(g.render_phase(phase).unwrap().root_signature, "fwd");
    }

    #[test]
    fn test_set_update_frequency() {
        let mut g = PipelineLayoutGraph::new();
        let v = g.add_vertex(
            PipelineNode::RenderStage(RenderStageData::default()),
            "s",
            UpdateFrequency::PerInstance,
            PipelineLayoutData::default(),
            None,
        );
        g.set_update_frequency(v, UpdateFrequency::PerBatch);
        assert_eq!(g.update_frequency(v), UpdateFrequency::PerBatch);
    }
}
