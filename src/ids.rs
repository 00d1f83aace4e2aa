//!
//! The WebM/Matroska element id catalog.
//!
//! Ids are kept in their marked form (the form [`crate::tools`] reads them in,
//! leading length bits included), so the EBML header id is `0x1A45DFA3`.
//! Ids missing from the catalog are treated as opaque binary elements -
//! unknown ids are valid and common in the format.
//!

use std::fmt;

///
/// An EBML element id in its marked (on-disk leading byte) form.
///
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ElementId(pub u64);

///
/// The decoded representation an element id maps to.
///
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ElementKind {
    Container,
    Uint,
    Int,
    Float,
    Utf8,
    Binary,
    Date,
    SimpleBlock,
}

macro_rules! element_catalog {
    ($($name:ident = $id:expr => $kind:ident),* $(,)?) => {
        impl ElementId {
            $(pub const $name: ElementId = ElementId($id);)*
        }

        ///
        /// Maps an element id to the kind used to decode it.  Unmapped ids
        /// fall back to [`ElementKind::Binary`].
        ///
        pub fn element_kind(id: ElementId) -> ElementKind {
            match id {
                $(ElementId::$name => ElementKind::$kind,)*
                _ => ElementKind::Binary,
            }
        }

        impl ElementId {
            /// Catalog name of this id, if it is a known one.
            pub fn name(&self) -> Option<&'static str> {
                match *self {
                    $(ElementId::$name => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

element_catalog! {
    // Synthetic id for the document root; never serialized.
    ROOT = 0x0 => Container,

    // EBML header
    EBML = 0x1A45DFA3 => Container,
    EBML_VERSION = 0x4286 => Uint,
    EBML_READ_VERSION = 0x42F7 => Uint,
    EBML_MAX_ID_LENGTH = 0x42F2 => Uint,
    EBML_MAX_SIZE_LENGTH = 0x42F3 => Uint,
    DOC_TYPE = 0x4282 => Utf8,
    DOC_TYPE_VERSION = 0x4287 => Uint,
    DOC_TYPE_READ_VERSION = 0x4285 => Uint,

    // Global elements
    VOID = 0xEC => Binary,
    CRC32 = 0xBF => Binary,

    // EBML signatures
    SIGNATURE_SLOT = 0x1B538667 => Container,
    SIGNATURE_ALGO = 0x7E8A => Uint,
    SIGNATURE_HASH = 0x7E9A => Uint,
    SIGNATURE_PUBLIC_KEY = 0x7EA5 => Binary,
    SIGNATURE = 0x7EB5 => Binary,
    SIGNATURE_ELEMENTS = 0x7E5B => Container,
    SIGNATURE_ELEMENT_LIST = 0x7E7B => Container,
    SIGNED_ELEMENT = 0x6532 => Binary,

    // Segment
    SEGMENT = 0x18538067 => Container,

    // Seeking
    SEEK_HEAD = 0x114D9B74 => Container,
    SEEK = 0x4DBB => Container,
    SEEK_ID = 0x53AB => Binary,
    SEEK_POSITION = 0x53AC => Uint,

    // Segment info
    INFO = 0x1549A966 => Container,
    SEGMENT_UID = 0x73A4 => Binary,
    SEGMENT_FILENAME = 0x7384 => Utf8,
    PREV_UID = 0x3CB923 => Binary,
    PREV_FILENAME = 0x3C83AB => Utf8,
    NEXT_UID = 0x3EB923 => Binary,
    NEXT_FILENAME = 0x3E83BB => Utf8,
    SEGMENT_FAMILY = 0x4444 => Binary,
    CHAPTER_TRANSLATE = 0x6924 => Container,
    CHAPTER_TRANSLATE_EDITION_UID = 0x69FC => Uint,
    CHAPTER_TRANSLATE_CODEC = 0x69BF => Uint,
    CHAPTER_TRANSLATE_ID = 0x69A5 => Binary,
    TIMECODE_SCALE = 0x2AD7B1 => Uint,
    DURATION = 0x4489 => Float,
    DATE_UTC = 0x4461 => Date,
    TITLE = 0x7BA9 => Utf8,
    MUXING_APP = 0x4D80 => Utf8,
    WRITING_APP = 0x5741 => Utf8,

    // Cluster
    CLUSTER = 0x1F43B675 => Container,
    TIMECODE = 0xE7 => Uint,
    SILENT_TRACKS = 0x5854 => Container,
    SILENT_TRACK_NUMBER = 0x58D7 => Uint,
    POSITION = 0xA7 => Uint,
    PREV_SIZE = 0xAB => Uint,
    SIMPLE_BLOCK = 0xA3 => SimpleBlock,
    BLOCK_GROUP = 0xA0 => Container,
    BLOCK = 0xA1 => Binary,
    BLOCK_VIRTUAL = 0xA2 => Binary,
    BLOCK_ADDITIONS = 0x75A1 => Container,
    BLOCK_MORE = 0xA6 => Container,
    BLOCK_ADD_ID = 0xEE => Uint,
    BLOCK_ADDITIONAL = 0xA5 => Binary,
    BLOCK_DURATION = 0x9B => Uint,
    REFERENCE_PRIORITY = 0xFA => Uint,
    REFERENCE_BLOCK = 0xFB => Int,
    REFERENCE_VIRTUAL = 0xFD => Int,
    CODEC_STATE = 0xA4 => Binary,
    DISCARD_PADDING = 0x75A2 => Int,
    SLICES = 0x8E => Container,
    TIME_SLICE = 0xE8 => Container,
    LACE_NUMBER = 0xCC => Uint,
    FRAME_NUMBER = 0xCD => Uint,
    BLOCK_ADDITION_ID = 0xCB => Uint,
    DELAY = 0xCE => Uint,
    SLICE_DURATION = 0xCF => Uint,
    REFERENCE_FRAME = 0xC8 => Container,
    REFERENCE_OFFSET = 0xC9 => Uint,
    REFERENCE_TIMECODE = 0xCA => Uint,
    ENCRYPTED_BLOCK = 0xAF => Binary,

    // Tracks
    TRACKS = 0x1654AE6B => Container,
    TRACK_ENTRY = 0xAE => Container,
    TRACK_NUMBER = 0xD7 => Uint,
    TRACK_UID = 0x73C5 => Uint,
    TRACK_TYPE = 0x83 => Uint,
    FLAG_ENABLED = 0xB9 => Uint,
    FLAG_DEFAULT = 0x88 => Uint,
    FLAG_FORCED = 0x55AA => Uint,
    FLAG_LACING = 0x9C => Uint,
    MIN_CACHE = 0x6DE7 => Uint,
    MAX_CACHE = 0x6DF8 => Uint,
    DEFAULT_DURATION = 0x23E383 => Uint,
    DEFAULT_DECODED_FIELD_DURATION = 0x234E7A => Uint,
    TRACK_TIMECODE_SCALE = 0x23314F => Float,
    TRACK_OFFSET = 0x537F => Int,
    MAX_BLOCK_ADDITION_ID = 0x55EE => Uint,
    NAME = 0x536E => Utf8,
    LANGUAGE = 0x22B59C => Utf8,
    CODEC_ID = 0x86 => Utf8,
    CODEC_PRIVATE = 0x63A2 => Binary,
    CODEC_NAME = 0x258688 => Utf8,
    ATTACHMENT_LINK = 0x7446 => Uint,
    CODEC_SETTINGS = 0x3A9697 => Utf8,
    CODEC_INFO_URL = 0x3B4040 => Utf8,
    CODEC_DOWNLOAD_URL = 0x26B240 => Utf8,
    CODEC_DECODE_ALL = 0xAA => Uint,
    TRACK_OVERLAY = 0x6FAB => Uint,
    CODEC_DELAY = 0x56AA => Uint,
    SEEK_PRE_ROLL = 0x56BB => Uint,
    TRACK_TRANSLATE = 0x6624 => Container,
    TRACK_TRANSLATE_EDITION_UID = 0x66FC => Uint,
    TRACK_TRANSLATE_CODEC = 0x66BF => Uint,
    TRACK_TRANSLATE_TRACK_ID = 0x66A5 => Binary,

    // Video
    VIDEO = 0xE0 => Container,
    FLAG_INTERLACED = 0x9A => Uint,
    STEREO_MODE = 0x53B8 => Uint,
    ALPHA_MODE = 0x53C0 => Uint,
    OLD_STEREO_MODE = 0x53B9 => Uint,
    PIXEL_WIDTH = 0xB0 => Uint,
    PIXEL_HEIGHT = 0xBA => Uint,
    PIXEL_CROP_BOTTOM = 0x54AA => Uint,
    PIXEL_CROP_TOP = 0x54BB => Uint,
    PIXEL_CROP_LEFT = 0x54CC => Uint,
    PIXEL_CROP_RIGHT = 0x54DD => Uint,
    DISPLAY_WIDTH = 0x54B0 => Uint,
    DISPLAY_HEIGHT = 0x54BA => Uint,
    DISPLAY_UNIT = 0x54B2 => Uint,
    ASPECT_RATIO_TYPE = 0x54B3 => Uint,
    COLOUR_SPACE = 0x2EB524 => Binary,
    GAMMA_VALUE = 0x2FB523 => Float,
    FRAME_RATE = 0x2383E3 => Float,

    // Audio
    AUDIO = 0xE1 => Container,
    SAMPLING_FREQUENCY = 0xB5 => Float,
    OUTPUT_SAMPLING_FREQUENCY = 0x78B5 => Float,
    CHANNELS = 0x9F => Uint,
    CHANNEL_POSITIONS = 0x7D7B => Binary,
    BIT_DEPTH = 0x6264 => Uint,

    // Track operations
    TRACK_OPERATION = 0xE2 => Container,
    TRACK_COMBINE_PLANES = 0xE3 => Container,
    TRACK_PLANE = 0xE4 => Container,
    TRACK_PLANE_UID = 0xE5 => Uint,
    TRACK_PLANE_TYPE = 0xE6 => Uint,
    TRACK_JOIN_BLOCKS = 0xE9 => Container,
    TRACK_JOIN_UID = 0xED => Uint,
    TRICK_TRACK_UID = 0xC0 => Uint,
    TRICK_TRACK_SEGMENT_UID = 0xC1 => Binary,
    TRICK_TRACK_FLAG = 0xC6 => Uint,
    TRICK_MASTER_TRACK_UID = 0xC7 => Uint,
    TRICK_MASTER_TRACK_SEGMENT_UID = 0xC4 => Binary,

    // Content encoding
    CONTENT_ENCODINGS = 0x6D80 => Container,
    CONTENT_ENCODING = 0x6240 => Container,
    CONTENT_ENCODING_ORDER = 0x5031 => Uint,
    CONTENT_ENCODING_SCOPE = 0x5032 => Uint,
    CONTENT_ENCODING_TYPE = 0x5033 => Uint,
    CONTENT_COMPRESSION = 0x5034 => Container,
    CONTENT_COMP_ALGO = 0x4254 => Uint,
    CONTENT_COMP_SETTINGS = 0x4255 => Binary,
    CONTENT_ENCRYPTION = 0x5035 => Container,
    CONTENT_ENC_ALGO = 0x47E1 => Uint,
    CONTENT_ENC_KEY_ID = 0x47E2 => Binary,
    CONTENT_SIGNATURE = 0x47E3 => Binary,
    CONTENT_SIG_KEY_ID = 0x47E4 => Binary,
    CONTENT_SIG_ALGO = 0x47E5 => Uint,
    CONTENT_SIG_HASH_ALGO = 0x47E6 => Uint,

    // Cueing data
    CUES = 0x1C53BB6B => Container,
    CUE_POINT = 0xBB => Container,
    CUE_TIME = 0xB3 => Uint,
    CUE_TRACK_POSITIONS = 0xB7 => Container,
    CUE_TRACK = 0xF7 => Uint,
    CUE_CLUSTER_POSITION = 0xF1 => Uint,
    CUE_RELATIVE_POSITION = 0xF0 => Uint,
    CUE_DURATION = 0xB2 => Uint,
    CUE_BLOCK_NUMBER = 0x5378 => Uint,
    CUE_CODEC_STATE = 0xEA => Uint,
    CUE_REFERENCE = 0xDB => Container,
    CUE_REF_TIME = 0x96 => Uint,
    CUE_REF_CLUSTER = 0x97 => Uint,
    CUE_REF_NUMBER = 0x535F => Uint,
    CUE_REF_CODEC_STATE = 0xEB => Uint,

    // Attachments
    ATTACHMENTS = 0x1941A469 => Container,
    ATTACHED_FILE = 0x61A7 => Container,
    FILE_DESCRIPTION = 0x467E => Utf8,
    FILE_NAME = 0x466E => Utf8,
    FILE_MIME_TYPE = 0x4660 => Utf8,
    FILE_DATA = 0x465C => Binary,
    FILE_UID = 0x46AE => Uint,
    FILE_REFERRAL = 0x4675 => Binary,
    FILE_USED_START_TIME = 0x4661 => Uint,
    FILE_USED_END_TIME = 0x4662 => Uint,

    // Chapters
    CHAPTERS = 0x1043A770 => Container,
    EDITION_ENTRY = 0x45B9 => Container,
    EDITION_UID = 0x45BC => Uint,
    EDITION_FLAG_HIDDEN = 0x45BD => Uint,
    EDITION_FLAG_DEFAULT = 0x45DB => Uint,
    EDITION_FLAG_ORDERED = 0x45DD => Uint,
    CHAPTER_ATOM = 0xB6 => Container,
    CHAPTER_UID = 0x73C4 => Uint,
    CHAPTER_STRING_UID = 0x5654 => Utf8,
    CHAPTER_TIME_START = 0x91 => Uint,
    CHAPTER_TIME_END = 0x92 => Uint,
    CHAPTER_FLAG_HIDDEN = 0x98 => Uint,
    CHAPTER_FLAG_ENABLED = 0x4598 => Uint,
    CHAPTER_SEGMENT_UID = 0x6E67 => Binary,
    CHAPTER_SEGMENT_EDITION_UID = 0x6EBC => Uint,
    CHAPTER_PHYSICAL_EQUIV = 0x63C3 => Uint,
    CHAPTER_TRACK = 0x8F => Container,
    CHAPTER_TRACK_NUMBER = 0x89 => Uint,
    CHAPTER_DISPLAY = 0x80 => Container,
    CHAP_STRING = 0x85 => Utf8,
    CHAP_LANGUAGE = 0x437C => Utf8,
    CHAP_COUNTRY = 0x437E => Utf8,
    CHAP_PROCESS = 0x6944 => Container,
    CHAP_PROCESS_CODEC_ID = 0x6955 => Uint,
    CHAP_PROCESS_PRIVATE = 0x450D => Binary,
    CHAP_PROCESS_COMMAND = 0x6911 => Container,
    CHAP_PROCESS_TIME = 0x6922 => Uint,
    CHAP_PROCESS_DATA = 0x6933 => Binary,

    // Tagging
    TAGS = 0x1254C367 => Container,
    TAG = 0x7373 => Container,
    TARGETS = 0x63C0 => Container,
    TARGET_TYPE_VALUE = 0x68CA => Uint,
    TARGET_TYPE = 0x63CA => Utf8,
    TAG_TRACK_UID = 0x63C5 => Uint,
    TAG_EDITION_UID = 0x63C9 => Uint,
    TAG_CHAPTER_UID = 0x63C4 => Uint,
    TAG_ATTACHMENT_UID = 0x63C6 => Uint,
    SIMPLE_TAG = 0x67C8 => Container,
    TAG_NAME = 0x45A3 => Utf8,
    TAG_LANGUAGE = 0x447A => Utf8,
    TAG_DEFAULT = 0x4484 => Uint,
    TAG_STRING = 0x4487 => Utf8,
    TAG_BINARY = 0x4485 => Binary,
}

///
/// The ids that may appear as a direct child of a Segment.  Used as the
/// stopping rule when inferring the extent of an unknown-size Segment.
///
pub fn segment_child(id: ElementId) -> bool {
    matches!(
        id,
        ElementId::SEEK_HEAD
            | ElementId::INFO
            | ElementId::TRACKS
            | ElementId::CHAPTERS
            | ElementId::CLUSTER
            | ElementId::CUES
            | ElementId::ATTACHMENTS
            | ElementId::TAGS
    )
}

///
/// The ids that may appear as a direct child of a Cluster.  Used as the
/// stopping rule when inferring the extent of an unknown-size Cluster.
///
pub fn cluster_child(id: ElementId) -> bool {
    matches!(
        id,
        ElementId::TIMECODE
            | ElementId::POSITION
            | ElementId::PREV_SIZE
            | ElementId::SIMPLE_BLOCK
            | ElementId::BLOCK_GROUP
    )
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:X}", self.0),
        }
    }
}
