//! JSON export in the shape expected by the ELK-based layout and renderer.
//!
//! Ids are written as decimal strings and every edge endpoint as a
//! `[nodeId, portId]` pair. A collapsed node carries `_children`/`_edges`
//! instead of `children`/`edges`.

use crate::error::GraphError;
use crate::graph::Graph;
use crate::ids::{EdgeId, NodeId, PortId};
use crate::model::{Direction, Endpoint, NodeBody, Side};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct NodeView<'g> {
    id: String,
    #[serde(rename = "hwMeta")]
    hw_meta: NodeMeta<'g>,
    properties: NodeProperties,
    ports: Vec<PortView<'g>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<NodeView<'g>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edges: Option<Vec<EdgeView<'g>>>,
    #[serde(rename = "_children", skip_serializing_if = "Option::is_none")]
    hidden_children: Option<Vec<NodeView<'g>>>,
    #[serde(rename = "_edges", skip_serializing_if = "Option::is_none")]
    hidden_edges: Option<Vec<EdgeView<'g>>>,
}

#[derive(Serialize)]
struct NodeMeta<'g> {
    name: &'g str,
    cls: &'static str,
    #[serde(rename = "maxId")]
    max_id: u32,
}

#[derive(Serialize)]
struct NodeProperties {
    #[serde(rename = "org.eclipse.elk.portConstraints")]
    port_constraints: &'static str,
    #[serde(rename = "org.eclipse.elk.layered.mergeEdges")]
    merge_edges: u8,
}

impl Default for NodeProperties {
    fn default() -> Self {
        Self {
            port_constraints: "FIXED_ORDER",
            merge_edges: 1,
        }
    }
}

#[derive(Serialize)]
struct PortView<'g> {
    id: String,
    #[serde(rename = "hwMeta")]
    hw_meta: NameMeta<'g>,
    direction: Direction,
    properties: PortProperties,
    children: Vec<PortView<'g>>,
}

#[derive(Serialize)]
struct PortProperties {
    side: Side,
    index: u32,
}

#[derive(Serialize)]
struct NameMeta<'g> {
    name: &'g str,
}

#[derive(Serialize)]
struct EdgeView<'g> {
    id: String,
    sources: Vec<[String; 2]>,
    targets: Vec<[String; 2]>,
    #[serde(rename = "hwMeta")]
    hw_meta: NameMeta<'g>,
}

fn endpoint_pairs(endpoints: &[Endpoint]) -> Vec<[String; 2]> {
    endpoints
        .iter()
        .map(|ep| [ep.node.to_string(), ep.port.to_string()])
        .collect()
}

fn port_view(graph: &Graph, id: PortId) -> Result<PortView<'_>, GraphError> {
    let port = graph.port(id)?;
    let children = port
        .children
        .iter()
        .map(|&child| port_view(graph, child))
        .collect::<Result<_, _>>()?;
    Ok(PortView {
        id: id.to_string(),
        hw_meta: NameMeta { name: &port.name },
        direction: port.direction,
        properties: PortProperties {
            side: port.side,
            index: port.index,
        },
        children,
    })
}

fn edge_view(graph: &Graph, id: EdgeId) -> Result<EdgeView<'_>, GraphError> {
    let edge = graph.edge(id)?;
    Ok(EdgeView {
        id: id.to_string(),
        sources: endpoint_pairs(&edge.sources),
        targets: endpoint_pairs(&edge.targets),
        hw_meta: NameMeta { name: &edge.name },
    })
}

fn node_view(graph: &Graph, id: NodeId) -> Result<NodeView<'_>, GraphError> {
    let node = graph.node(id)?;
    let ports = node
        .ports
        .iter()
        .map(|&p| port_view(graph, p))
        .collect::<Result<_, _>>()?;
    let children = node
        .body
        .children()
        .iter()
        .map(|&c| node_view(graph, c))
        .collect::<Result<Vec<_>, _>>()?;
    let edges = node
        .body
        .edges()
        .iter()
        .map(|&e| edge_view(graph, e))
        .collect::<Result<Vec<_>, _>>()?;
    let mut view = NodeView {
        id: id.to_string(),
        hw_meta: NodeMeta {
            name: &node.name,
            cls: node.class.as_str(),
            max_id: node.max_id,
        },
        properties: NodeProperties::default(),
        ports,
        children: None,
        edges: None,
        hidden_children: None,
        hidden_edges: None,
    };
    match node.body {
        NodeBody::Expanded { .. } => {
            view.children = Some(children);
            view.edges = Some(edges);
        }
        NodeBody::Collapsed { .. } => {
            view.hidden_children = Some(children);
            view.hidden_edges = Some(edges);
        }
    }
    Ok(view)
}

/// Converts the subtree rooted at `root` into a JSON value.
pub fn to_json_value(graph: &Graph, root: NodeId) -> Result<Value, GraphError> {
    Ok(serde_json::to_value(node_view(graph, root)?)?)
}

/// Serializes the subtree rooted at `root` into a JSON string.
pub fn to_json_string(graph: &Graph, root: NodeId, pretty: bool) -> Result<String, GraphError> {
    let view = node_view(graph, root)?;
    let text = if pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    Ok(text)
}
