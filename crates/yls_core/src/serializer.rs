use crate::document::{Document, Node};

pub fn serialize(doc: &Document) -> Vec<u8> {
    let mut out = Vec::with_capacity(doc.layout().file_len);
    write_node(doc.root(), &mut out);
    out
}

/// Encoded bytes of a single subtree.
pub fn serialize_node(node: &Node) -> Vec<u8> {
    let mut out = Vec::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut Vec<u8>) {
    match node {
        Node::Scalar(scalar) => out.extend_from_slice(scalar.text().as_bytes()),
        Node::Opaque(opaque) => out.extend_from_slice(opaque.bytes()),
        Node::Sequence(container) | Node::Mapping(container) => {
            let framing = container.framing();
            out.extend_from_slice(&framing.open);
            for (i, child) in container.children().iter().enumerate() {
                if i > 0 {
                    out.extend_from_slice(&framing.separator);
                }
                write_node(&child.node, out);
            }
            out.extend_from_slice(&framing.close);
        }
    }
}
