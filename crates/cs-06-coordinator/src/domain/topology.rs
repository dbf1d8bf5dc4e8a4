//! Network topology

use cs_05_node::Node;

/// Connect every node to every other node.
pub fn connect_complete(nodes: &mut [Node]) {
    let ids: Vec<_> = nodes.iter().map(Node::id).collect();
    for node in nodes.iter_mut() {
        for &peer in &ids {
            node.add_neighbor(peer);
        }
    }
}
