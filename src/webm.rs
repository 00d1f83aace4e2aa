//!
//! WebM metadata convenience layer over [`EbmlTree`].
//!
//! Everything here is expressible through the tree's query and mutation API;
//! this module just knows the paths.
//!

use std::io::{Read, Seek, Write};

use super::element::ElementData;
use super::errors::{ElementError, ReadError, WriteError};
use super::ids::ElementId;
use super::sources::SegmentSource;
use super::tree::{EbmlTree, NodeId};

///
/// Kind of a track, from the TrackType element of its TrackEntry.
///
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TrackType {
    Video,
    Audio,
    Complex,
    Logo,
    Subtitle,
    Buttons,
    Control,
}

impl TrackType {
    pub fn from_raw(value: u64) -> Option<TrackType> {
        match value {
            1 => Some(TrackType::Video),
            2 => Some(TrackType::Audio),
            3 => Some(TrackType::Complex),
            0x10 => Some(TrackType::Logo),
            0x11 => Some(TrackType::Subtitle),
            0x12 => Some(TrackType::Buttons),
            0x20 => Some(TrackType::Control),
            _ => None,
        }
    }
}

const INFO_PATH: [ElementId; 2] = [ElementId::SEGMENT, ElementId::INFO];
const TRACK_PATH: [ElementId; 3] = [ElementId::SEGMENT, ElementId::TRACKS, ElementId::TRACK_ENTRY];

///
/// A parsed WebM file with typed accessors for the metadata fields tools
/// usually care about.
///
/// Getters take `&mut self` because the underlying leaves decode lazily.
/// Values live in the first Segment, as in every WebM file found in the wild.
///
#[derive(Debug)]
pub struct WebmFile {
    tree: EbmlTree,
}

impl WebmFile {
    pub fn parse<R: Read + Seek + 'static>(source: R) -> Result<Self, ReadError> {
        Ok(WebmFile { tree: EbmlTree::parse(source)? })
    }

    pub fn from_window(window: SegmentSource) -> Result<Self, ReadError> {
        Ok(WebmFile { tree: EbmlTree::from_window(window)? })
    }

    pub fn from_tree(tree: EbmlTree) -> Self {
        WebmFile { tree }
    }

    pub fn tree(&self) -> &EbmlTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut EbmlTree {
        &mut self.tree
    }

    pub fn copy_to<W: Write + ?Sized>(&self, dest: &mut W) -> Result<u64, WriteError> {
        self.tree.copy_to(dest)
    }

    /// DocType from the EBML header ("webm" or "matroska").
    pub fn doc_type(&mut self) -> Result<Option<String>, ElementError> {
        self.string_at(&[ElementId::EBML, ElementId::DOC_TYPE])
    }

    /// TimecodeScale in nanoseconds per timecode unit.
    pub fn timecode_scale(&mut self) -> Result<Option<u64>, ElementError> {
        self.uint_at(&[ElementId::SEGMENT, ElementId::INFO, ElementId::TIMECODE_SCALE])
    }

    pub fn set_timecode_scale(&mut self, value: u64) -> Result<bool, ElementError> {
        self.set_or_insert(&INFO_PATH, ElementId::TIMECODE_SCALE, ElementData::Uint(value))
    }

    pub fn title(&mut self) -> Result<Option<String>, ElementError> {
        self.string_at(&[ElementId::SEGMENT, ElementId::INFO, ElementId::TITLE])
    }

    pub fn set_title(&mut self, value: &str) -> Result<bool, ElementError> {
        self.set_or_insert(&INFO_PATH, ElementId::TITLE, ElementData::Utf8(value.to_string()))
    }

    pub fn muxing_app(&mut self) -> Result<Option<String>, ElementError> {
        self.string_at(&[ElementId::SEGMENT, ElementId::INFO, ElementId::MUXING_APP])
    }

    pub fn writing_app(&mut self) -> Result<Option<String>, ElementError> {
        self.string_at(&[ElementId::SEGMENT, ElementId::INFO, ElementId::WRITING_APP])
    }

    /// Segment duration in timecode units, as stored.
    pub fn duration(&mut self) -> Result<Option<f64>, ElementError> {
        self.float_at(&[ElementId::SEGMENT, ElementId::INFO, ElementId::DURATION])
    }

    pub fn set_duration(&mut self, value: f64) -> Result<bool, ElementError> {
        self.set_or_insert(&INFO_PATH, ElementId::DURATION, ElementData::Float(value.into()))
    }

    ///
    /// Duration reconstructed from Cluster timecodes and the last SimpleBlock
    /// of each Cluster, in timecode units.  Streams recorded without a
    /// Duration element (live captures, cut-off recordings) can be repaired
    /// from this.
    ///
    pub fn duration_estimate(&mut self) -> Result<f64, ElementError> {
        let mut duration = 0.0;
        for cluster in self.tree.get_elements(&[ElementId::SEGMENT, ElementId::CLUSTER]) {
            if let Some(timecode) = self.child_by_id(cluster, ElementId::TIMECODE) {
                duration = self.tree.uint(timecode)? as f64;
            }
            let last_block = self
                .tree
                .children(cluster)
                .iter()
                .copied()
                .filter(|&c| self.tree.id(c) == ElementId::SIMPLE_BLOCK)
                .last();
            if let Some(block) = last_block {
                duration += self.tree.simple_block_timecode(block)? as f64;
            }
        }
        Ok(duration)
    }

    ///
    /// Writes [`duration_estimate`](WebmFile::duration_estimate) into the
    /// Info block if no Duration element is present.  Returns whether a
    /// duration was written.
    ///
    pub fn fix_duration(&mut self) -> Result<bool, ElementError> {
        if self.duration()?.is_some() {
            return Ok(false);
        }
        let estimate = self.duration_estimate()?;
        self.set_duration(estimate)
    }

    /// TrackEntry nodes of the first Tracks block, in document order.
    pub fn tracks(&self) -> Vec<NodeId> {
        self.tree.get_elements(&TRACK_PATH)
    }

    pub fn track_type(&mut self, track: NodeId) -> Result<Option<TrackType>, ElementError> {
        match self.child_by_id(track, ElementId::TRACK_TYPE) {
            Some(node) => Ok(TrackType::from_raw(self.tree.uint(node)?)),
            None => Ok(None),
        }
    }

    pub fn track_codec_id(&mut self, track: NodeId) -> Result<Option<String>, ElementError> {
        match self.child_by_id(track, ElementId::CODEC_ID) {
            Some(node) => Ok(Some(self.tree.string(node)?)),
            None => Ok(None),
        }
    }

    pub fn has_video(&mut self) -> Result<bool, ElementError> {
        Ok(self.first_track_of(TrackType::Video)?.is_some())
    }

    pub fn has_audio(&mut self) -> Result<bool, ElementError> {
        Ok(self.first_track_of(TrackType::Audio)?.is_some())
    }

    pub fn video_codec_id(&mut self) -> Result<Option<String>, ElementError> {
        match self.first_track_of(TrackType::Video)? {
            Some(track) => self.track_codec_id(track),
            None => Ok(None),
        }
    }

    pub fn audio_codec_id(&mut self) -> Result<Option<String>, ElementError> {
        match self.first_track_of(TrackType::Audio)? {
            Some(track) => self.track_codec_id(track),
            None => Ok(None),
        }
    }

    pub fn video_pixel_width(&mut self) -> Result<Option<u64>, ElementError> {
        self.uint_at(&track_detail(ElementId::VIDEO, ElementId::PIXEL_WIDTH))
    }

    pub fn video_pixel_height(&mut self) -> Result<Option<u64>, ElementError> {
        self.uint_at(&track_detail(ElementId::VIDEO, ElementId::PIXEL_HEIGHT))
    }

    pub fn audio_channels(&mut self) -> Result<Option<u64>, ElementError> {
        self.uint_at(&track_detail(ElementId::AUDIO, ElementId::CHANNELS))
    }

    pub fn audio_sampling_frequency(&mut self) -> Result<Option<f64>, ElementError> {
        self.float_at(&track_detail(ElementId::AUDIO, ElementId::SAMPLING_FREQUENCY))
    }

    pub fn audio_bit_depth(&mut self) -> Result<Option<u64>, ElementError> {
        self.uint_at(&track_detail(ElementId::AUDIO, ElementId::BIT_DEPTH))
    }

    // ------------------------------------------------------------------

    fn first_track_of(&mut self, kind: TrackType) -> Result<Option<NodeId>, ElementError> {
        for track in self.tracks() {
            if self.track_type(track)? == Some(kind) {
                return Ok(Some(track));
            }
        }
        Ok(None)
    }

    fn child_by_id(&self, parent: NodeId, id: ElementId) -> Option<NodeId> {
        self.tree.children(parent).iter().copied().find(|&c| self.tree.id(c) == id)
    }

    fn uint_at(&mut self, path: &[ElementId]) -> Result<Option<u64>, ElementError> {
        match self.tree.get_element(path) {
            Some(node) => Ok(Some(self.tree.uint(node)?)),
            None => Ok(None),
        }
    }

    fn float_at(&mut self, path: &[ElementId]) -> Result<Option<f64>, ElementError> {
        match self.tree.get_element(path) {
            Some(node) => Ok(Some(self.tree.float(node)?)),
            None => Ok(None),
        }
    }

    fn string_at(&mut self, path: &[ElementId]) -> Result<Option<String>, ElementError> {
        match self.tree.get_element(path) {
            Some(node) => Ok(Some(self.tree.string(node)?)),
            None => Ok(None),
        }
    }

    ///
    /// Sets the value of `container_path`'s child `id`, creating the element
    /// when missing.  Returns `false` when the containing block itself does
    /// not exist.
    ///
    fn set_or_insert(
        &mut self,
        container_path: &[ElementId],
        id: ElementId,
        data: ElementData,
    ) -> Result<bool, ElementError> {
        let mut leaf_path = container_path.to_vec();
        leaf_path.push(id);
        if let Some(node) = self.tree.get_element(&leaf_path) {
            self.tree.set_value(node, data)?;
            return Ok(true);
        }
        let container = match self.tree.get_element(container_path) {
            Some(node) => node,
            None => return Ok(false),
        };
        let leaf = self.tree.new_leaf(id, data)?;
        Ok(self.tree.add(container, leaf))
    }
}

fn track_detail(group: ElementId, field: ElementId) -> [ElementId; 5] {
    [ElementId::SEGMENT, ElementId::TRACKS, ElementId::TRACK_ENTRY, group, field]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> WebmFile {
        let mut tree = EbmlTree::new();
        let root = tree.root();

        let ebml = tree.add_container(root, ElementId::EBML).unwrap();
        tree.add_string(ebml, ElementId::DOC_TYPE, "webm").unwrap();

        let segment = tree.add_container(root, ElementId::SEGMENT).unwrap();
        let info = tree.add_container(segment, ElementId::INFO).unwrap();
        tree.add_uint(info, ElementId::TIMECODE_SCALE, 1_000_000).unwrap();
        tree.add_string(info, ElementId::MUXING_APP, "webm-tree").unwrap();

        let tracks = tree.add_container(segment, ElementId::TRACKS).unwrap();

        let video = tree.add_container(tracks, ElementId::TRACK_ENTRY).unwrap();
        tree.add_uint(video, ElementId::TRACK_NUMBER, 1).unwrap();
        tree.add_uint(video, ElementId::TRACK_TYPE, 1).unwrap();
        tree.add_string(video, ElementId::CODEC_ID, "V_VP8").unwrap();
        let video_details = tree.add_container(video, ElementId::VIDEO).unwrap();
        tree.add_uint(video_details, ElementId::PIXEL_WIDTH, 640).unwrap();
        tree.add_uint(video_details, ElementId::PIXEL_HEIGHT, 360).unwrap();

        let audio = tree.add_container(tracks, ElementId::TRACK_ENTRY).unwrap();
        tree.add_uint(audio, ElementId::TRACK_NUMBER, 2).unwrap();
        tree.add_uint(audio, ElementId::TRACK_TYPE, 2).unwrap();
        tree.add_string(audio, ElementId::CODEC_ID, "A_OPUS").unwrap();
        let audio_details = tree.add_container(audio, ElementId::AUDIO).unwrap();
        tree.add_uint(audio_details, ElementId::CHANNELS, 2).unwrap();
        tree.add_float(audio_details, ElementId::SAMPLING_FREQUENCY, 48_000.0f64).unwrap();

        let cluster = tree.add_container(segment, ElementId::CLUSTER).unwrap();
        tree.add_uint(cluster, ElementId::TIMECODE, 1000).unwrap();
        tree.add_leaf(
            cluster,
            ElementId::SIMPLE_BLOCK,
            ElementData::SimpleBlock(vec![0x81, 0x00, 0x50, 0x80]),
        )
        .unwrap();

        // round-trip through bytes so the file under test is a parsed one
        let mut bytes = Vec::new();
        tree.copy_to(&mut bytes).unwrap();
        WebmFile::parse(std::io::Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn metadata_getters() {
        let mut file = sample_file();
        assert_eq!(Some("webm".to_string()), file.doc_type().unwrap());
        assert_eq!(Some(1_000_000), file.timecode_scale().unwrap());
        assert_eq!(Some("webm-tree".to_string()), file.muxing_app().unwrap());
        assert_eq!(None, file.writing_app().unwrap());
        assert_eq!(None, file.title().unwrap());
    }

    #[test]
    fn track_introspection() {
        let mut file = sample_file();
        assert!(file.has_video().unwrap());
        assert!(file.has_audio().unwrap());
        assert_eq!(2, file.tracks().len());
        assert_eq!(Some("V_VP8".to_string()), file.video_codec_id().unwrap());
        assert_eq!(Some("A_OPUS".to_string()), file.audio_codec_id().unwrap());
        assert_eq!(Some(640), file.video_pixel_width().unwrap());
        assert_eq!(Some(360), file.video_pixel_height().unwrap());
        assert_eq!(Some(2), file.audio_channels().unwrap());
        assert_eq!(Some(48_000.0), file.audio_sampling_frequency().unwrap());
        assert_eq!(None, file.audio_bit_depth().unwrap());
    }

    #[test]
    fn fix_duration_estimates_from_clusters() {
        let mut file = sample_file();
        assert_eq!(None, file.duration().unwrap());
        // last cluster timecode 1000 plus last block offset 0x50
        assert_eq!(1080.0, file.duration_estimate().unwrap());
        assert!(file.fix_duration().unwrap());
        assert_eq!(Some(1080.0), file.duration().unwrap());
        assert!(!file.fix_duration().unwrap());
    }

    #[test]
    fn setters_create_or_replace() {
        let mut file = sample_file();
        assert!(file.set_title("recording").unwrap());
        assert_eq!(Some("recording".to_string()), file.title().unwrap());
        assert!(file.set_title("renamed").unwrap());
        assert_eq!(Some("renamed".to_string()), file.title().unwrap());
        assert!(file.set_timecode_scale(500_000).unwrap());
        assert_eq!(Some(500_000), file.timecode_scale().unwrap());

        // edits survive a serialize/parse cycle
        let mut bytes = Vec::new();
        file.copy_to(&mut bytes).unwrap();
        let mut reread = WebmFile::parse(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(Some("renamed".to_string()), reread.title().unwrap());
    }
}
