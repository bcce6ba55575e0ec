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

//! The semantic stage/phase hierarchy graph.
//!
//! A [`LayoutGraph`] describes *what* the pipeline binds, before any slot
//! assignment: render stages at the top, render phases beneath them, and a
//! [`DescriptorDb`] on every vertex collecting the resources visible there.
//! The reflection front end builds it; the resolution pass consumes it to
//! produce a [`PipelineLayoutGraph`](crate::pipeline_graph::PipelineLayoutGraph).

use std::collections::BTreeSet;

use crate::archive::archive_enum;
use crate::descriptor::DescriptorDb;
use crate::error::GraphError;
use crate::graph::{AddressableGraph, Edge, Graph, VertexId, VertexRecord};

archive_enum! {
    /// How a render stage maps onto device render passes.
    pub enum RenderPassKind {
        /// The stage is one self-contained render pass.
        #[default]
        SinglePass = 0,
        /// The stage spans a full multi-subpass render pass.
        FullPass = 1,
        /// The stage is a subpass of an enclosing pass.
        Subpass = 2,
    }
}

/// A render phase: a shader-selection grouping within a stage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderPhase {
    /// Names of the shaders participating in the phase.
    pub shaders: BTreeSet<String>,
}

impl RenderPhase {
    /// Restores the canonical empty state.
    pub fn reset(&mut self) {
        self.shaders.clear();
    }
}

/// The polymorphic payload of a [`LayoutGraph`] vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    /// A coarse pass grouping.
    RenderStage(RenderPassKind),
    /// A shader-selection grouping within a stage.
    RenderPhase(RenderPhase),
}

impl LayoutNode {
    /// The payload's type name, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            LayoutNode::RenderStage(_) => "RenderStage",
            LayoutNode::RenderPhase(_) => "RenderPhase",
        }
    }
}

impl Default for LayoutNode {
    fn default() -> Self {
        LayoutNode::RenderStage(RenderPassKind::default())
    }
}

/// Per-payload dispatch over a [`LayoutGraph`] vertex.
pub trait LayoutNodeVisitor {
    /// The value produced by a visit.
    type Output;

    /// Called for a render-stage vertex.
    fn render_stage(&mut self, pass_kind: RenderPassKind) -> Self::Output;

    /// Called for a render-phase vertex.
    fn render_phase(&mut self, phase: &RenderPhase) -> Self::Output;
}

/// The semantic render-stage/render-phase hierarchy.
///
/// Vertex storage is struct-of-arrays: the vertex records and every
/// per-vertex component (`names`, `descriptors`) always have identical
/// length and are indexed by the same [`VertexId`] — the central invariant
/// every mutation preserves.
#[derive(Debug, Default, Clone)]
pub struct LayoutGraph {
    vertices: Vec<VertexRecord<LayoutNode>>,
    names: Vec<String>,
    descriptors: Vec<DescriptorDb>,
}

impl LayoutGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the graph: vertices and all component arrays together.
    /// Allocation is kept for reuse.
    pub fn clear(&mut self) {
        self.names.clear();
        self.descriptors.clear();
        self.vertices.clear();
    }

    /// Appends a vertex with its components and returns its id.
    ///
    /// When `parent` is given, the edge `parent -> new vertex` is added
    /// atomically with the vertex, making it a child in the hierarchy.
    pub fn add_vertex(
        &mut self,
        node: LayoutNode,
        name: impl Into<String>,
        descriptors: DescriptorDb,
        parent: Option<VertexId>,
    ) -> VertexId {
        let v = VertexId(self.vertices.len() as u32);
        self.vertices.push(VertexRecord::new(node));
        self.names.push(name.into());
        self.descriptors.push(descriptors);

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
    pub fn node(&self, v: VertexId) -> &LayoutNode {
        &self.vertices[v.index()].payload
    }

    /// The payload of vertex `v`, mutably.
    pub fn node_mut(&mut self, v: VertexId) -> &mut LayoutNode {
        &mut self.vertices[v.index()].payload
    }

    /// The render-stage payload of `v` — a checked downcast.
    pub fn render_stage(&self, v: VertexId) -> Result<RenderPassKind, GraphError> {
        match self.node(v) {
            LayoutNode::RenderStage(kind) => Ok(*kind),
            other => Err(GraphError::PayloadMismatch {
                expected: "RenderStage",
                found: other.type_name(),
            }),
        }
    }

    /// The render-phase payload of `v` — a checked downcast.
    pub fn render_phase(&self, v: VertexId) -> Result<&RenderPhase, GraphError> {
        match self.node(v) {
            LayoutNode::RenderPhase(phase) => Ok(phase),
            other => Err(GraphError::PayloadMismatch {
                expected: "RenderPhase",
                found: other.type_name(),
            }),
        }
    }

    /// The render-phase payload of `v`, mutably — a checked downcast.
    pub fn render_phase_mut(&mut self, v: VertexId) -> Result<&mut RenderPhase, GraphError> {
        // Checked in two steps to keep the error path borrow-free.
        let type_name = self.node(v).type_name();
        match self.node_mut(v) {
            LayoutNode::RenderPhase(phase) => Ok(phase),
            _ => Err(GraphError::PayloadMismatch {
                expected: "RenderPhase",
                found: type_name,
            }),
        }
    }

    /// Dispatches to the visitor callback matching `v`'s payload.
    pub fn visit_vertex<V: LayoutNodeVisitor>(&self, visitor: &mut V, v: VertexId) -> V::Output {
        match self.node(v) {
            LayoutNode::RenderStage(kind) => visitor.render_stage(*kind),
            LayoutNode::RenderPhase(phase) => visitor.render_phase(phase),
        }
    }

    /// The descriptor database of vertex `v`.
    pub fn descriptor_db(&self, v: VertexId) -> &DescriptorDb {
        &self.descriptors[v.index()]
    }

    /// The descriptor database of vertex `v`, mutably.
    pub fn descriptor_db_mut(&mut self, v: VertexId) -> &mut DescriptorDb {
        &mut self.descriptors[v.index()]
    }
}

impl Graph for LayoutGraph {
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

impl AddressableGraph for LayoutGraph {
    fn vertex_name(&self, v: VertexId) -> &str {
        &self.names[v.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, DescriptorBlock, DescriptorBlockIndex};
    use crate::gfx::ValueType;

    fn phase(shaders: &[&str]) -> LayoutNode {
        LayoutNode::RenderPhase(RenderPhase {
            shaders: shaders.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_component_arrays_stay_in_lockstep() {
        let mut g = LayoutGraph::new();
        for i in 0..4 {
            g.add_vertex(
                LayoutNode::RenderStage(RenderPassKind::SinglePass),
                format!("stage{i}"),
                DescriptorDb::default(),
                None,
            );
            assert_eq!(g.num_vertices(), i + 1);
            assert_eq!(g.names.len(), i + 1);
            assert_eq!(g.descriptors.len(), i + 1);
        }

        g.clear();
        assert_eq!(g.num_vertices(), 0);
        assert_eq!(g.names.len(), 0);
        assert_eq!(g.descriptors.len(), 0);
    }

    #[test]
    fn test_vertex_ids_are_dense_and_monotonic() {
        let mut g = LayoutGraph::new();
        let a = g.add_vertex(
            LayoutNode::RenderStage(RenderPassKind::FullPass),
            "a",
            DescriptorDb::default(),
            None,
        );
        let b = g.add_vertex(phase(&["std"]), "b", DescriptorDb::default(), Some(a));
        assert_eq!(a, VertexId(0));
        assert_eq!(b, VertexId(1));

        // After clear, ids restart from zero.
        g.clear();
        let c = g.add_vertex(
            LayoutNode::RenderStage(RenderPassKind::FullPass),
            "c",
            DescriptorDb::default(),
            None,
        );
        assert_eq!(c, VertexId(0));
    }

    #[test]
    fn test_add_vertex_with_parent_adds_edge_atomically() {
        let mut g = LayoutGraph::new();
        let stage = g.add_vertex(
            LayoutNode::RenderStage(RenderPassKind::SinglePass),
            "Opaque",
            DescriptorDb::default(),
            None,
        );
        let fwd = g.add_vertex(phase(&["std"]), "Forward", DescriptorDb::default(), Some(stage));

        assert_eq!(g.num_vertices(), 2);
        assert_eq!(g.num_edges(), 1);
        assert!(g.contains_edge(stage, fwd));
        assert_eq!(g.parent_of(fwd), Some(stage));
        assert_eq!(g.parent_of(stage), None);
        assert_eq!(g.vertex_path(fwd), "Opaque/Forward");
        assert_eq!(g.locate("Opaque/Forward"), Some(fwd));
    }

    #[test]
    fn test_checked_downcasts() {
        let mut g = LayoutGraph::new();
        let stage = g.add_vertex(
            LayoutNode::RenderStage(RenderPassKind::Subpass),
            "s",
            DescriptorDb::default(),
            None,
        );
        let ph = g.add_vertex(phase(&["fwd"]), "p", DescriptorDb::default(), Some(stage));

        assert_eq!(g.render_stage(stage), Ok(RenderPassKind::Subpass));
        assert!(g.render_phase(ph).is_ok());
        assert_eq!(
            g.render_stage(ph),
            Err(GraphError::PayloadMismatch {
                expected: "RenderStage",
                found: "RenderPhase",
            })
        );
        assert_eq!(
            g.render_phase(stage),
            Err(GraphError::PayloadMismatch {
                expected: "RenderPhase",
                found: "RenderStage",
            })
        );

        g.render_phase_mut(ph)
            .unwrap()
            .shaders
            .insert("extra".to_string());
        assert_eq!(g.render_phase(ph).unwrap().shaders.len(), 2);
    }

    #[test]
    fn test_visitor_dispatch() {
        struct Describe;
        impl LayoutNodeVisitor for Describe {
            type Output = String;
            fn render_stage(&mut self, kind: RenderPassKind) -> String {
                format!("stage:{kind:?}")
            }
            fn render_phase(&mut self, phase: &RenderPhase) -> String {
                format!("phase:{}", phase.shaders.len())
            }
        }

        let mut g = LayoutGraph::new();
        let s = g.add_vertex(
            LayoutNode::RenderStage(RenderPassKind::FullPass),
            "s",
            DescriptorDb::default(),
            None,
        );
        let p = g.add_vertex(phase(&["a", "b"]), "p", DescriptorDb::default(), Some(s));

        let mut visitor = Describe;
        assert_eq!(g.visit_vertex(&mut visitor, s), "stage:FullPass");
        assert_eq!(g.visit_vertex(&mut visitor, p), "phase:2");
    }

    #[test]
    fn test_descriptor_db_component_access() {
        let mut g = LayoutGraph::new();
        let v = g.add_vertex(
            LayoutNode::RenderStage(RenderPassKind::SinglePass),
            "s",
            DescriptorDb::default(),
            None,
        );

        let key = DescriptorBlockIndex::default();
        let mut block = DescriptorBlock::default();
        block
            .descriptors
            .insert("camera_ubo".to_string(), Descriptor::new(ValueType::Mat4));
        g.descriptor_db_mut(v).blocks.insert(key, block);

        assert_eq!(g.descriptor_db(v).blocks.len(), 1);
    }
}
