use std::io::Cursor;

use webm_tree::errors::ReadError;
use webm_tree::{EbmlTree, ElementId};

fn elem(id: &[u8], payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() < 127);
    let mut out = id.to_vec();
    out.push(0x80 | payload.len() as u8);
    out.extend_from_slice(payload);
    out
}

fn container(id: &[u8], children: &[Vec<u8>]) -> Vec<u8> {
    elem(id, &children.concat())
}

#[test]
fn unknown_size_cluster_ends_at_first_non_member_tag() {
    let timecode = elem(&[0xE7], &[0x03, 0xE8]);
    let block = elem(&[0xA3], &[0x81, 0x00, 0x10, 0x80, 9, 9]);
    let cues = container(&[0x1C, 0x53, 0xBB, 0x6B], &[]);

    let mut cluster = vec![0x1F, 0x43, 0xB6, 0x75, 0xFF];
    cluster.extend_from_slice(&timecode);
    cluster.extend_from_slice(&block);

    // Cues is not a valid Cluster child, so inference must stop right there
    let doc = container(
        &[0x18, 0x53, 0x80, 0x67],
        &[cluster, cues.clone()],
    );

    let mut tree = EbmlTree::parse(Cursor::new(doc)).unwrap();
    let cluster = tree.get_element(&[ElementId::CLUSTER]).unwrap();
    let children: Vec<_> = tree.children(cluster).iter().map(|&c| tree.id(c)).collect();
    assert_eq!(vec![ElementId::TIMECODE, ElementId::SIMPLE_BLOCK], children);

    // probing consumed nothing: the sibling after the cluster parsed normally
    let segment = tree.get_element(&[ElementId::SEGMENT]).unwrap();
    assert_eq!(ElementId::CUES, tree.id(*tree.children(segment).last().unwrap()));

    // the inferred extent covers the members exactly
    assert_eq!((timecode.len() + block.len()) as u64, tree.length(cluster));
    let timecode = tree.get_element(&[ElementId::CLUSTER, ElementId::TIMECODE]).unwrap();
    assert_eq!(1000, tree.uint(timecode).unwrap());
}

#[test]
fn unknown_size_segment_ends_at_buffer_or_foreign_tag() {
    let ebml = container(&[0x1A, 0x45, 0xDF, 0xA3], &[elem(&[0x42, 0x82], b"webm")]);
    let info = container(
        &[0x15, 0x49, 0xA9, 0x66],
        &[elem(&[0x2A, 0xD7, 0xB1], &[0x0F, 0x42, 0x40])],
    );
    let cluster = container(&[0x1F, 0x43, 0xB6, 0x75], &[elem(&[0xE7], &[0x00])]);

    let mut doc = ebml.clone();
    doc.extend_from_slice(&[0x18, 0x53, 0x80, 0x67, 0xFF]);
    doc.extend_from_slice(&info);
    doc.extend_from_slice(&cluster);
    // an EBML header tag cannot be a Segment child; a second document follows
    doc.extend_from_slice(&ebml);

    let tree = EbmlTree::parse(Cursor::new(doc)).unwrap();
    let root = tree.root();
    assert_eq!(3, tree.children(root).len());

    let segment = tree.get_element(&[ElementId::SEGMENT]).unwrap();
    let children: Vec<_> = tree.children(segment).iter().map(|&c| tree.id(c)).collect();
    assert_eq!(vec![ElementId::INFO, ElementId::CLUSTER], children);
    assert_eq!(2, tree.get_elements(&[ElementId::EBML]).len());
}

#[test]
fn nested_unknown_size_cluster_inside_unknown_size_segment() {
    let info = container(
        &[0x15, 0x49, 0xA9, 0x66],
        &[elem(&[0x2A, 0xD7, 0xB1], &[0x0F, 0x42, 0x40])],
    );
    let timecode = elem(&[0xE7], &[0x01]);

    let mut doc = vec![0x18, 0x53, 0x80, 0x67, 0xFF]; // Segment, unknown size
    doc.extend_from_slice(&info);
    doc.extend_from_slice(&[0x1F, 0x43, 0xB6, 0x75, 0xFF]); // Cluster, unknown size
    doc.extend_from_slice(&timecode);

    let tree = EbmlTree::parse(Cursor::new(doc)).unwrap();
    let segment = tree.get_element(&[ElementId::SEGMENT]).unwrap();
    let children: Vec<_> = tree.children(segment).iter().map(|&c| tree.id(c)).collect();
    assert_eq!(vec![ElementId::INFO, ElementId::CLUSTER], children);

    let cluster = tree.get_element(&[ElementId::CLUSTER]).unwrap();
    assert_eq!(1, tree.children(cluster).len());
}

#[test]
fn oversized_fourth_child_keeps_the_first_three() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&elem(&[0x2A, 0xD7, 0xB1], &[0x01]));
    payload.extend_from_slice(&elem(&[0x7B, 0xA9], b"t"));
    payload.extend_from_slice(&elem(&[0x4D, 0x80], b"mux"));
    // fourth child claims 16 payload bytes with only 2 left in the container
    payload.extend_from_slice(&[0x57, 0x41, 0x90, 0x00, 0x00]);
    let doc = elem(&[0x15, 0x49, 0xA9, 0x66], &payload);

    let tree = EbmlTree::parse(Cursor::new(doc)).unwrap();
    let info = tree.get_element(&[ElementId::INFO]).unwrap();
    let children: Vec<_> = tree.children(info).iter().map(|&c| tree.id(c)).collect();
    assert_eq!(
        vec![ElementId::TIMECODE_SCALE, ElementId::TITLE, ElementId::MUXING_APP],
        children
    );
}

#[test]
fn zero_size_child_stops_the_parse_loop() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&elem(&[0x2A, 0xD7, 0xB1], &[0x01]));
    payload.extend_from_slice(&[0x7B, 0xA9, 0x80]); // Title, declared size 0
    payload.extend_from_slice(&elem(&[0x4D, 0x80], b"mux"));
    let doc = elem(&[0x15, 0x49, 0xA9, 0x66], &payload);

    let tree = EbmlTree::parse(Cursor::new(doc)).unwrap();
    let info = tree.get_element(&[ElementId::INFO]).unwrap();
    let children: Vec<_> = tree.children(info).iter().map(|&c| tree.id(c)).collect();
    assert_eq!(vec![ElementId::TIMECODE_SCALE], children);
}

#[test]
fn unknown_size_is_fatal_outside_segment_and_cluster() {
    let mut doc = vec![0x15, 0x49, 0xA9, 0x66, 0xFF]; // Info, unknown size
    doc.extend_from_slice(&elem(&[0x2A, 0xD7, 0xB1], &[0x01]));

    let err = EbmlTree::parse(Cursor::new(doc)).unwrap_err();
    assert!(matches!(
        err,
        ReadError::UnknownSizeNotAllowed { id: ElementId::INFO, .. }
    ));
}

#[test]
fn truncated_header_is_fatal() {
    // Segment id followed by nothing at all
    let doc = vec![0x18, 0x53, 0x80, 0x67];
    let err = EbmlTree::parse(Cursor::new(doc)).unwrap_err();
    assert!(matches!(err, ReadError::UnexpectedEof { .. }));
}
