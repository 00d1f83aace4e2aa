//!
//! The element tree: parsing, lazy access, mutation and re-serialization.
//!
//! Nodes live in an arena indexed by [`NodeId`]; relationships are indices
//! rather than owned references, so parents and children can point at each
//! other without reference cycles.  Parsing records framing only - a leaf's
//! payload stays inside its byte window until a typed accessor asks for it.
//!

use std::io::{self, Read, Seek, Write};

use tracing::{debug, warn};

use super::element::{decode_value, encode_value, ElementData, FloatData};
use super::errors::{ElementError, ReadError, WriteError};
use super::ids::{cluster_child, element_kind, segment_child, ElementId, ElementKind};
use super::sources::SegmentSource;
use super::tools::{self, Vint, UNKNOWN_SIZE};

///
/// Index of a node in its [`EbmlTree`].  Ids stay valid for the lifetime of
/// the tree, including across detach and re-attach.
///
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    id: ElementId,
    /// Ids from the outermost ancestor down to this node.  Empty for the root.
    id_chain: Vec<ElementId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Window over this element's payload bytes.  Present on every leaf, and
    /// on containers whose subtree is untouched since parsing.
    source: Option<SegmentSource>,
    data: Option<ElementData>,
    changed: bool,
    cached_length: Option<u64>,
}

///
/// A parsed EBML document held as a mutable tree.
///
/// The tree is created by [`parse`](EbmlTree::parse) (or empty, via
/// [`new`](EbmlTree::new)), queried by id path, mutated through typed setters
/// and [`add`](EbmlTree::add)/[`remove`](EbmlTree::remove), and written back
/// out with [`copy_to`](EbmlTree::copy_to).  A tree that was never mutated
/// serializes as a byte-for-byte copy of its input.
///
#[derive(Debug)]
pub struct EbmlTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl EbmlTree {
    /// Creates an empty tree holding only the synthetic root container.
    pub fn new() -> Self {
        let mut tree = EbmlTree { nodes: Vec::new(), root: NodeId(0) };
        tree.root = tree.push_node(ElementId::ROOT, None, None);
        tree
    }

    ///
    /// Parses a complete EBML document from a seekable source.
    ///
    pub fn parse<R: Read + Seek + 'static>(source: R) -> Result<Self, ReadError> {
        Self::from_window(SegmentSource::new(source)?)
    }

    /// Parses a complete EBML document from an existing byte window.
    pub fn from_window(window: SegmentSource) -> Result<Self, ReadError> {
        let mut tree = EbmlTree { nodes: Vec::new(), root: NodeId(0) };
        tree.root = tree.push_node(ElementId::ROOT, None, Some(window));
        tree.parse_children(tree.root)?;
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn id(&self, node: NodeId) -> ElementId {
        self.nodes[node.0].id
    }

    pub fn kind(&self, node: NodeId) -> ElementKind {
        element_kind(self.nodes[node.0].id)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Children of `node`, in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Ids from the outermost ancestor down to `node` itself.
    pub fn id_chain(&self, node: NodeId) -> &[ElementId] {
        &self.nodes[node.0].id_chain
    }

    ///
    /// Content length of `node` in bytes: the value its size field declares.
    /// For a container this is the sum of each child's framed size (id field,
    /// size field and content); the id and size field of `node` itself are
    /// not included.
    ///
    pub fn length(&self, node: NodeId) -> u64 {
        self.content_length(node)
    }

    // ------------------------------------------------------------------
    // parsing

    fn push_node(&mut self, id: ElementId, parent: Option<NodeId>, source: Option<SegmentSource>) -> NodeId {
        let id_chain = match parent {
            Some(p) => {
                let mut chain = self.nodes[p.0].id_chain.clone();
                chain.push(id);
                chain
            }
            None if id == ElementId::ROOT => Vec::new(),
            None => vec![id],
        };
        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            id_chain,
            parent,
            children: Vec::new(),
            source,
            data: None,
            changed: false,
            cached_length: None,
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(node_id);
        }
        node_id
    }

    ///
    /// Parses the children of `parent` out of its payload window.
    ///
    /// A declared child size that cannot fit in the window (zero, larger than
    /// the remaining bytes, or an unknown-size marker inference could not
    /// resolve) stops the loop: the children parsed so far are kept and the
    /// unparseable tail is dropped.  A malformed id or size field is fatal.
    ///
    fn parse_children(&mut self, parent: NodeId) -> Result<(), ReadError> {
        let mut window = match &self.nodes[parent.0].source {
            Some(source) => source.clone(),
            None => return Ok(()),
        };
        window.set_position(0);

        while window.remaining() > 0 {
            let child_start = window.position();
            let id = ElementId(tools::read_id(&mut window)?);
            let mut size = tools::read_size(&mut window)?;

            if size == UNKNOWN_SIZE {
                size = match id {
                    ElementId::SEGMENT => find_segment_length(&mut window)?,
                    ElementId::CLUSTER => find_cluster_length(&mut window)?,
                    _ => return Err(ReadError::UnknownSizeNotAllowed { id, position: child_start }),
                };
                debug!(%id, size, position = child_start, "inferred extent of unknown-size element");
            }

            if size == 0 || size == UNKNOWN_SIZE || size > window.remaining() {
                warn!(
                    %id,
                    size,
                    remaining = window.remaining(),
                    position = child_start,
                    "child size does not fit its parent, dropping unparseable tail"
                );
                break;
            }

            let child_window = window.slice(size);
            let child = self.push_node(id, Some(parent), Some(child_window));
            debug!(%id, size, position = child_start, "parsed child");

            if element_kind(id) == ElementKind::Container {
                self.parse_children(child)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // queries

    /// All nodes below `node` in pre-order, not including `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(node, &mut out);
        out
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[node.0].children {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    ///
    /// All elements whose id chain ends with `path`, in document order.
    ///
    /// A single-id path finds every element with that id at any depth; a
    /// longer path narrows the match to elements reached through those
    /// ancestors.
    ///
    pub fn get_elements(&self, path: &[ElementId]) -> Vec<NodeId> {
        if path.is_empty() {
            return Vec::new();
        }
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.nodes[node.0].id_chain.ends_with(path))
            .collect()
    }

    /// First element matching `path` in document order, if any.
    pub fn get_element(&self, path: &[ElementId]) -> Option<NodeId> {
        self.get_elements(path).into_iter().next()
    }

    // ------------------------------------------------------------------
    // typed access

    fn expect_kind(&self, node: NodeId, requested: ElementKind) -> Result<(), ElementError> {
        let id = self.nodes[node.0].id;
        let actual = element_kind(id);
        if actual == requested {
            Ok(())
        } else {
            Err(ElementError::WrongType { id, requested, actual })
        }
    }

    fn ensure_decoded(&mut self, node: NodeId) -> Result<(), ElementError> {
        if self.nodes[node.0].data.is_some() {
            return Ok(());
        }
        let kind = element_kind(self.nodes[node.0].id);
        let bytes = match &self.nodes[node.0].source {
            Some(source) => source.read_all()?,
            None => Vec::new(),
        };
        self.nodes[node.0].data = Some(decode_value(kind, &bytes)?);
        Ok(())
    }

    pub fn uint(&mut self, node: NodeId) -> Result<u64, ElementError> {
        self.expect_kind(node, ElementKind::Uint)?;
        self.ensure_decoded(node)?;
        match self.nodes[node.0].data {
            Some(ElementData::Uint(value)) => Ok(value),
            _ => Err(self.type_mismatch(node, ElementKind::Uint)),
        }
    }

    pub fn int(&mut self, node: NodeId) -> Result<i64, ElementError> {
        self.expect_kind(node, ElementKind::Int)?;
        self.ensure_decoded(node)?;
        match self.nodes[node.0].data {
            Some(ElementData::Int(value)) => Ok(value),
            _ => Err(self.type_mismatch(node, ElementKind::Int)),
        }
    }

    pub fn float(&mut self, node: NodeId) -> Result<f64, ElementError> {
        self.expect_kind(node, ElementKind::Float)?;
        self.ensure_decoded(node)?;
        match self.nodes[node.0].data {
            Some(ElementData::Float(float)) => Ok(float.value),
            _ => Err(self.type_mismatch(node, ElementKind::Float)),
        }
    }

    pub fn string(&mut self, node: NodeId) -> Result<String, ElementError> {
        self.expect_kind(node, ElementKind::Utf8)?;
        self.ensure_decoded(node)?;
        match &self.nodes[node.0].data {
            Some(ElementData::Utf8(text)) => Ok(text.clone()),
            _ => Err(self.type_mismatch(node, ElementKind::Utf8)),
        }
    }

    pub fn binary(&mut self, node: NodeId) -> Result<Vec<u8>, ElementError> {
        self.expect_kind(node, ElementKind::Binary)?;
        self.ensure_decoded(node)?;
        match &self.nodes[node.0].data {
            Some(ElementData::Binary(bytes)) => Ok(bytes.clone()),
            _ => Err(self.type_mismatch(node, ElementKind::Binary)),
        }
    }

    /// Nanosecond offset from the Matroska epoch.
    pub fn date(&mut self, node: NodeId) -> Result<i64, ElementError> {
        self.expect_kind(node, ElementKind::Date)?;
        self.ensure_decoded(node)?;
        match self.nodes[node.0].data {
            Some(ElementData::Date(value)) => Ok(value),
            _ => Err(self.type_mismatch(node, ElementKind::Date)),
        }
    }

    fn type_mismatch(&self, node: NodeId, requested: ElementKind) -> ElementError {
        let id = self.nodes[node.0].id;
        ElementError::WrongType { id, requested, actual: element_kind(id) }
    }

    ///
    /// Track number of a SimpleBlock, read straight out of the block header
    /// without decoding the payload.  Only valid for track numbers below 128,
    /// which covers WebM in practice.
    ///
    pub fn simple_block_track(&self, node: NodeId) -> Result<u64, ElementError> {
        self.expect_kind(node, ElementKind::SimpleBlock)?;
        let byte = self.leaf_source(node)?.read_byte(0)?;
        Ok((byte & 0x7F) as u64)
    }

    /// Cluster-relative timecode of a SimpleBlock (block header bytes 1-2).
    pub fn simple_block_timecode(&self, node: NodeId) -> Result<i16, ElementError> {
        self.expect_kind(node, ElementKind::SimpleBlock)?;
        let bytes = self.leaf_source(node)?.read_exact_at(1, 2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn leaf_source(&self, node: NodeId) -> Result<&SegmentSource, ElementError> {
        self.nodes[node.0].source.as_ref().ok_or_else(|| {
            ElementError::ReadError {
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "element has no backing data"),
            }
        })
    }

    // ------------------------------------------------------------------
    // mutation

    ///
    /// Replaces a leaf's value.  The new payload is encoded immediately into
    /// an in-memory window, and every ancestor container is marked stale so
    /// its size field is recomputed on the next write.  Setting a value equal
    /// to the current one leaves the element (and its original bytes) alone.
    ///
    /// Fails with [`ElementError::WrongType`] if `data` does not match the
    /// kind the element's id maps to.
    ///
    pub fn set_value(&mut self, node: NodeId, data: ElementData) -> Result<(), ElementError> {
        let id = self.nodes[node.0].id;
        let kind = element_kind(id);
        if kind != data.kind() {
            return Err(ElementError::WrongType { id, requested: data.kind(), actual: kind });
        }
        if self.ensure_decoded(node).is_ok() && self.nodes[node.0].data.as_ref() == Some(&data) {
            return Ok(());
        }
        let bytes = encode_value(&data);
        let entry = &mut self.nodes[node.0];
        entry.data = Some(data);
        entry.source = Some(SegmentSource::from_bytes(bytes));
        entry.changed = true;
        if let Some(parent) = self.nodes[node.0].parent {
            self.refresh_from(parent);
        }
        Ok(())
    }

    pub fn set_uint(&mut self, node: NodeId, value: u64) -> Result<(), ElementError> {
        self.set_value(node, ElementData::Uint(value))
    }

    pub fn set_int(&mut self, node: NodeId, value: i64) -> Result<(), ElementError> {
        self.set_value(node, ElementData::Int(value))
    }

    pub fn set_float(&mut self, node: NodeId, value: impl Into<FloatData>) -> Result<(), ElementError> {
        self.set_value(node, ElementData::Float(value.into()))
    }

    pub fn set_string(&mut self, node: NodeId, value: &str) -> Result<(), ElementError> {
        self.set_value(node, ElementData::Utf8(value.to_string()))
    }

    pub fn set_binary(&mut self, node: NodeId, value: Vec<u8>) -> Result<(), ElementError> {
        self.set_value(node, ElementData::Binary(value))
    }

    pub fn set_date(&mut self, node: NodeId, value: i64) -> Result<(), ElementError> {
        self.set_value(node, ElementData::Date(value))
    }

    /// Creates a detached container element.
    pub fn new_container(&mut self, id: ElementId) -> Result<NodeId, ElementError> {
        let kind = element_kind(id);
        if kind != ElementKind::Container {
            return Err(ElementError::WrongType { id, requested: ElementKind::Container, actual: kind });
        }
        let node = self.push_node(id, None, None);
        self.nodes[node.0].changed = true;
        Ok(node)
    }

    /// Creates a detached leaf element holding `data`, already encoded.
    pub fn new_leaf(&mut self, id: ElementId, data: ElementData) -> Result<NodeId, ElementError> {
        let kind = element_kind(id);
        if kind != data.kind() {
            return Err(ElementError::WrongType { id, requested: data.kind(), actual: kind });
        }
        let bytes = encode_value(&data);
        let node = self.push_node(id, None, Some(SegmentSource::from_bytes(bytes)));
        self.nodes[node.0].data = Some(data);
        self.nodes[node.0].changed = true;
        Ok(node)
    }

    ///
    /// Creates a leaf holding `data` and attaches it as the last child of
    /// `parent` in one step.
    ///
    pub fn add_leaf(&mut self, parent: NodeId, id: ElementId, data: ElementData) -> Result<NodeId, ElementError> {
        let leaf = self.new_leaf(id, data)?;
        if self.add(parent, leaf) {
            Ok(leaf)
        } else {
            let parent_id = self.nodes[parent.0].id;
            Err(ElementError::WrongType {
                id: parent_id,
                requested: ElementKind::Container,
                actual: element_kind(parent_id),
            })
        }
    }

    pub fn add_uint(&mut self, parent: NodeId, id: ElementId, value: u64) -> Result<NodeId, ElementError> {
        self.add_leaf(parent, id, ElementData::Uint(value))
    }

    pub fn add_int(&mut self, parent: NodeId, id: ElementId, value: i64) -> Result<NodeId, ElementError> {
        self.add_leaf(parent, id, ElementData::Int(value))
    }

    pub fn add_float(
        &mut self,
        parent: NodeId,
        id: ElementId,
        value: impl Into<FloatData>,
    ) -> Result<NodeId, ElementError> {
        self.add_leaf(parent, id, ElementData::Float(value.into()))
    }

    pub fn add_string(&mut self, parent: NodeId, id: ElementId, value: &str) -> Result<NodeId, ElementError> {
        self.add_leaf(parent, id, ElementData::Utf8(value.to_string()))
    }

    pub fn add_binary(&mut self, parent: NodeId, id: ElementId, value: Vec<u8>) -> Result<NodeId, ElementError> {
        self.add_leaf(parent, id, ElementData::Binary(value))
    }

    pub fn add_date(&mut self, parent: NodeId, id: ElementId, value: i64) -> Result<NodeId, ElementError> {
        self.add_leaf(parent, id, ElementData::Date(value))
    }

    /// Creates a container and attaches it as the last child of `parent`.
    pub fn add_container(&mut self, parent: NodeId, id: ElementId) -> Result<NodeId, ElementError> {
        let container = self.new_container(id)?;
        if self.add(parent, container) {
            Ok(container)
        } else {
            let parent_id = self.nodes[parent.0].id;
            Err(ElementError::WrongType {
                id: parent_id,
                requested: ElementKind::Container,
                actual: element_kind(parent_id),
            })
        }
    }

    ///
    /// Attaches a detached element as the last child of `parent`.
    ///
    /// Returns `false` without changing anything if `parent` is not a
    /// container, or if `child` is the root or currently attached anywhere
    /// (detach it with [`remove`](EbmlTree::remove) first).
    ///
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> bool {
        if element_kind(self.nodes[parent.0].id) != ElementKind::Container {
            return false;
        }
        if child == self.root || parent == child || self.nodes[child.0].parent.is_some() {
            return false;
        }
        // a detached node may still sit above `parent` in its own subtree
        let mut ancestor = self.nodes[parent.0].parent;
        while let Some(node) = ancestor {
            if node == child {
                return false;
            }
            ancestor = self.nodes[node.0].parent;
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        let prefix = self.nodes[parent.0].id_chain.clone();
        self.rebuild_chains(child, &prefix);
        self.refresh_from(parent);
        true
    }

    ///
    /// Detaches `child` from `parent`.  The node stays in the arena and can
    /// be re-attached elsewhere.  Returns `false` if `child` is not currently
    /// a child of `parent`.
    ///
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.nodes[child.0].parent != Some(parent) {
            return false;
        }
        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
        self.rebuild_chains(child, &[]);
        self.refresh_from(parent);
        true
    }

    fn rebuild_chains(&mut self, node: NodeId, prefix: &[ElementId]) {
        let mut chain = prefix.to_vec();
        chain.push(self.nodes[node.0].id);
        let children = self.nodes[node.0].children.clone();
        self.nodes[node.0].id_chain = chain.clone();
        for child in children {
            self.rebuild_chains(child, &chain);
        }
    }

    ///
    /// Marks `start` and every ancestor above it stale: their byte windows
    /// no longer describe their content, so their cached lengths are
    /// recomputed (children are already current when this runs) and their
    /// content is re-emitted from children on the next write.
    ///
    fn refresh_from(&mut self, start: NodeId) {
        let mut current = Some(start);
        while let Some(node) = current {
            {
                let entry = &mut self.nodes[node.0];
                entry.changed = true;
                entry.source = None;
            }
            let content: u64 = self.nodes[node.0]
                .children
                .iter()
                .map(|&child| self.full_length(child))
                .sum();
            self.nodes[node.0].cached_length = Some(content);
            current = self.nodes[node.0].parent;
        }
    }

    // ------------------------------------------------------------------
    // lengths and serialization

    fn content_length(&self, node: NodeId) -> u64 {
        let entry = &self.nodes[node.0];
        if let Some(source) = &entry.source {
            return source.len();
        }
        if let Some(length) = entry.cached_length {
            return length;
        }
        entry.children.iter().map(|&child| self.full_length(child)).sum()
    }

    fn full_length(&self, node: NodeId) -> u64 {
        let content = self.content_length(node);
        let id = self.nodes[node.0].id;
        if id == ElementId::ROOT {
            return content;
        }
        tools::id_size(id.0) + size_field_length(content) + content
    }

    ///
    /// Writes the whole document to `dest`, returning the number of bytes
    /// written.  An untouched tree is streamed straight out of its original
    /// windows, byte for byte.
    ///
    pub fn copy_to<W: Write + ?Sized>(&self, dest: &mut W) -> Result<u64, WriteError> {
        let root = &self.nodes[self.root.0];
        if !root.changed {
            if let Some(source) = &root.source {
                return Ok(source.clone().copy_to(dest)?);
            }
        }
        let mut written = 0;
        for &child in &root.children {
            written += self.copy_element_to(child, dest)?;
        }
        Ok(written)
    }

    ///
    /// Writes a single element (id, size and content) to `dest`.  Elements
    /// still backed by a window are copied raw; stale containers are
    /// re-emitted from their children with freshly encoded size fields.
    ///
    pub fn copy_element_to<W: Write + ?Sized>(&self, node: NodeId, dest: &mut W) -> Result<u64, WriteError> {
        let id = self.nodes[node.0].id;
        let id_bytes = tools::id_bytes(id.0);
        let content = self.content_length(node);
        let size_bytes = content.as_vint().map_err(|e| WriteError::SizeError(e.to_string()))?;

        dest.write_all(&id_bytes)?;
        dest.write_all(&size_bytes)?;
        let mut written = (id_bytes.len() + size_bytes.len()) as u64;

        if let Some(source) = &self.nodes[node.0].source {
            written += source.clone().copy_to(dest)?;
        } else {
            for &child in &self.nodes[node.0].children {
                written += self.copy_element_to(child, dest)?;
            }
        }
        Ok(written)
    }
}

impl Default for EbmlTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Content lengths too large for a vint only fail on the write path; length
/// arithmetic treats them as the maximum field width.
fn size_field_length(content: u64) -> u64 {
    tools::vint_size(content).unwrap_or(8) as u64
}

///
/// Infers the extent of an unknown-size Segment by scanning forward from the
/// current position until a tag that cannot be a direct Segment child (or
/// unreadable data) is found.  The window position is restored before
/// returning.
///
/// Data that happens to look like a Segment child tag right after the real
/// end of the Segment is misattributed to it; the format gives a linear scan
/// no way to tell the difference.
///
fn find_segment_length(window: &mut SegmentSource) -> Result<u64, ReadError> {
    let start = window.position();
    loop {
        let checkpoint = window.position();
        let id = match tools::read_id(window) {
            Ok(id) => ElementId(id),
            Err(_) => {
                window.set_position(checkpoint);
                break;
            }
        };
        if !segment_child(id) {
            window.set_position(checkpoint);
            break;
        }
        let size = match tools::read_size(window) {
            Ok(size) => size,
            Err(_) => {
                window.set_position(checkpoint);
                break;
            }
        };
        let size = if size == UNKNOWN_SIZE {
            if id == ElementId::CLUSTER {
                find_cluster_length(window)?
            } else {
                window.set_position(checkpoint);
                break;
            }
        } else {
            size
        };
        window.set_position(window.position() + size);
    }
    let length = window.position() - start;
    window.set_position(start);
    Ok(length)
}

///
/// Companion to [`find_segment_length`] for unknown-size Clusters, scanning
/// for tags that can be direct Cluster children.
///
fn find_cluster_length(window: &mut SegmentSource) -> Result<u64, ReadError> {
    let start = window.position();
    loop {
        let checkpoint = window.position();
        let id = match tools::read_id(window) {
            Ok(id) => ElementId(id),
            Err(_) => {
                window.set_position(checkpoint);
                break;
            }
        };
        if !cluster_child(id) {
            window.set_position(checkpoint);
            break;
        }
        let size = match tools::read_size(window) {
            Ok(size) => size,
            Err(_) => {
                window.set_position(checkpoint);
                break;
            }
        };
        if size == UNKNOWN_SIZE {
            window.set_position(checkpoint);
            break;
        }
        window.set_position(window.position() + size);
    }
    let length = window.position() - start;
    window.set_position(start);
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    // EBML > DocType("webm"), Segment > Info > TimecodeScale(1_000_000)
    fn tiny_doc() -> Vec<u8> {
        let mut doc = vec![
            0x1A, 0x45, 0xDF, 0xA3, 0x87, // EBML, size 7
            0x42, 0x82, 0x84, b'w', b'e', b'b', b'm', // DocType "webm"
        ];
        doc.extend_from_slice(&[
            0x18, 0x53, 0x80, 0x67, 0x8C, // Segment, size 12
            0x15, 0x49, 0xA9, 0x66, 0x87, // Info, size 7
            0x2A, 0xD7, 0xB1, 0x83, 0x0F, 0x42, 0x40, // TimecodeScale 1_000_000
        ]);
        doc
    }

    #[test]
    fn parses_nested_structure() {
        let mut tree = EbmlTree::parse(io::Cursor::new(tiny_doc())).unwrap();
        let root = tree.root();
        assert_eq!(2, tree.children(root).len());

        let doc_type = tree.get_element(&[ElementId::EBML, ElementId::DOC_TYPE]).unwrap();
        assert_eq!("webm", tree.string(doc_type).unwrap());

        let scale = tree.get_element(&[ElementId::TIMECODE_SCALE]).unwrap();
        assert_eq!(1_000_000, tree.uint(scale).unwrap());
        assert_eq!(
            &[ElementId::SEGMENT, ElementId::INFO, ElementId::TIMECODE_SCALE],
            tree.id_chain(scale)
        );
    }

    #[test]
    fn lengths_report_declared_content_size() {
        let tree = EbmlTree::parse(io::Cursor::new(tiny_doc())).unwrap();
        let segment = tree.get_element(&[ElementId::SEGMENT]).unwrap();
        assert_eq!(12, tree.length(segment));
        let scale = tree.get_element(&[ElementId::TIMECODE_SCALE]).unwrap();
        assert_eq!(3, tree.length(scale));
        assert_eq!(tiny_doc().len() as u64, tree.length(tree.root()));
    }

    #[test]
    fn typed_access_rejects_wrong_kind() {
        let mut tree = EbmlTree::parse(io::Cursor::new(tiny_doc())).unwrap();
        let scale = tree.get_element(&[ElementId::TIMECODE_SCALE]).unwrap();
        assert!(matches!(
            tree.string(scale),
            Err(ElementError::WrongType { requested: ElementKind::Utf8, actual: ElementKind::Uint, .. })
        ));
        let info = tree.get_element(&[ElementId::INFO]).unwrap();
        assert!(tree.uint(info).is_err());
    }

    #[test]
    fn set_value_enforces_catalog_kind() {
        let mut tree = EbmlTree::parse(io::Cursor::new(tiny_doc())).unwrap();
        let scale = tree.get_element(&[ElementId::TIMECODE_SCALE]).unwrap();
        assert!(tree.set_string(scale, "nope").is_err());
        tree.set_uint(scale, 500_000).unwrap();
        assert_eq!(500_000, tree.uint(scale).unwrap());
    }

    #[test]
    fn mutation_updates_ancestor_lengths() {
        let mut tree = EbmlTree::parse(io::Cursor::new(tiny_doc())).unwrap();
        let segment = tree.get_element(&[ElementId::SEGMENT]).unwrap();
        let before = tree.length(segment);

        let scale = tree.get_element(&[ElementId::TIMECODE_SCALE]).unwrap();
        // 1_000_000 takes three payload bytes, 5 takes one
        tree.set_uint(scale, 5).unwrap();
        assert_eq!(before - 2, tree.length(segment));
    }

    #[test]
    fn add_rejects_attached_nodes_and_non_containers() {
        let mut tree = EbmlTree::parse(io::Cursor::new(tiny_doc())).unwrap();
        let info = tree.get_element(&[ElementId::INFO]).unwrap();
        let scale = tree.get_element(&[ElementId::TIMECODE_SCALE]).unwrap();

        assert!(!tree.add(info, scale)); // still attached
        assert!(!tree.add(scale, info)); // leaf parent

        let title = tree.new_leaf(ElementId::TITLE, ElementData::Utf8("t".into())).unwrap();
        assert!(!tree.add(scale, title));
        assert!(tree.add(info, title));
        assert_eq!(
            &[ElementId::SEGMENT, ElementId::INFO, ElementId::TITLE],
            tree.id_chain(title)
        );

        // a detached container cannot be attached inside its own subtree
        let group = tree.new_container(ElementId::BLOCK_GROUP).unwrap();
        let additions = tree.new_container(ElementId::BLOCK_ADDITIONS).unwrap();
        assert!(tree.add(group, additions));
        assert!(!tree.add(additions, group));
    }

    #[test]
    fn remove_then_add_moves_a_subtree() {
        let mut tree = EbmlTree::parse(io::Cursor::new(tiny_doc())).unwrap();
        let segment = tree.get_element(&[ElementId::SEGMENT]).unwrap();
        let info = tree.get_element(&[ElementId::INFO]).unwrap();
        let scale = tree.get_element(&[ElementId::TIMECODE_SCALE]).unwrap();

        assert!(tree.remove(info, scale));
        assert!(!tree.remove(info, scale));
        assert_eq!(None, tree.parent(scale));
        assert_eq!(&[ElementId::TIMECODE_SCALE], tree.id_chain(scale));
        assert!(tree.get_element(&[ElementId::TIMECODE_SCALE]).is_none());

        assert!(tree.add(segment, scale));
        assert_eq!(
            &[ElementId::SEGMENT, ElementId::TIMECODE_SCALE],
            tree.id_chain(scale)
        );
    }

    #[test]
    fn simple_block_header_peeks() {
        let mut tree = EbmlTree::new();
        let block = tree
            .new_leaf(
                ElementId::SIMPLE_BLOCK,
                ElementData::SimpleBlock(vec![0x81, 0x01, 0x40, 0x80, 0xAA, 0xBB]),
            )
            .unwrap();
        assert_eq!(1, tree.simple_block_track(block).unwrap());
        assert_eq!(0x0140, tree.simple_block_timecode(block).unwrap());
        assert!(tree.simple_block_track(tree.root()).is_err());
    }
}
