//!
//! This crate provides a mutable element-tree model over EBML encoded data
//! (the WebM/Matroska container family).
//!
//! A file is parsed into a tree of elements backed by non-copying byte
//! windows over the original source.  Leaf payloads are decoded lazily on
//! first access, elements can be looked up by id path and mutated through
//! typed setters, and the whole document (or any single element) can be
//! written back out.  An untouched tree serializes byte-for-byte identical
//! to its input; after a mutation only the changed element and its ancestor
//! containers are re-encoded, everything else is still streamed from the
//! original windows.
//!
//! ```no_run
//! use std::fs::File;
//! use webm_tree::WebmFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut file = WebmFile::parse(File::open("video.webm")?)?;
//! if file.fix_duration()? {
//!     let mut out = File::create("fixed.webm")?;
//!     file.copy_to(&mut out)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! For structures [`WebmFile`] has no accessor for, drop down to the tree:
//!
//! ```no_run
//! use std::fs::File;
//! use webm_tree::{EbmlTree, ElementId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = EbmlTree::parse(File::open("video.webm")?)?;
//! for cluster in tree.get_elements(&[ElementId::SEGMENT, ElementId::CLUSTER]) {
//!     println!("cluster of {} bytes", tree.length(cluster));
//! }
//! # Ok(())
//! # }
//! ```
//!

pub mod errors;
pub mod tools;

mod element;
mod ids;
mod sources;
mod tree;
mod webm;

pub use element::{ElementData, FloatData};
pub use ids::{element_kind, ElementId, ElementKind};
pub use sources::{SegmentSource, SourceStream};
pub use tree::{EbmlTree, NodeId};
pub use webm::{TrackType, WebmFile};
