//! PDF object types
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

// ============================================================================
// Interned Name Implementation
// ============================================================================

/// Interned PDF Name with shared storage
///
/// Link resolution compares the same handful of names (`Subtype`, `Link`,
/// `Dest`, `S`, `GoTo`, ...) over and over. Names use `Arc<str>` for cheap
/// cloning, and the common ones are pre-interned.
#[derive(Debug, Clone, Eq)]
pub struct Name(Arc<str>);

impl Name {
    /// Create a new name, potentially sharing storage with existing names
    pub fn new(s: &str) -> Self {
        if let Some(interned) = Self::get_interned(s) {
            return interned;
        }
        Self(Arc::from(s))
    }

    /// Create from owned String
    pub fn from_string(s: String) -> Self {
        if let Some(interned) = Self::get_interned(&s) {
            return interned;
        }
        Self(Arc::from(s))
    }

    /// Get the name string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn get_interned(s: &str) -> Option<Self> {
        COMMON_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, arc)| Self(Arc::clone(arc)))
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.as_ref() == other.0.as_ref()
    }
}

impl std::hash::Hash for Name {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state);
    }
}

// Hash and Eq agree with `str`, so dictionaries can be queried with `&str`.
impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

// ============================================================================
// Pre-interned Common PDF Names
// ============================================================================

static COMMON_NAMES: LazyLock<Vec<(&'static str, Arc<str>)>> = LazyLock::new(|| {
    [
        // Document structure
        "Type", "Subtype", "Root", "Pages", "Page", "Kids", "Parent", "Count",
        // Page boxes
        "MediaBox", "CropBox", "Rotate", "UserUnit", "Annots",
        // Annotations
        "Annot", "Link", "Rect", "Dest", "A", "AA", "U", "D",
        // Actions
        "S", "GoTo", "GoToR", "Launch", "URI", "Base", "Named", "N",
        "FirstPage", "LastPage", "PrevPage", "NextPage",
        // Destinations
        "Dests", "Names", "Limits", "XYZ", "Fit", "FitH", "FitV", "FitR", "FitB", "FitBH",
        "FitBV",
        // File specifications
        "Filespec", "FS", "URL", "F", "UF", "Unix", "DOS", "Mac", "EF", "EmbeddedFile",
        "Length",
    ]
    .into_iter()
    .map(|name| (name, Arc::from(name)))
    .collect()
});

/// PDF string object (raw bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfString(Vec<u8>);

impl PdfString {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Encode a PDF text string: ASCII as is, anything else as UTF-16BE
    /// with a byte order mark.
    pub fn from_text(text: &str) -> Self {
        if text.is_ascii() {
            return Self(text.as_bytes().to_vec());
        }
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Self(bytes)
    }

    /// Raw bytes as text, replacing invalid UTF-8 sequences.
    pub fn to_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Decode as a PDF text string.
    ///
    /// Handles UTF-16BE and UTF-8 byte order marks; other strings are read
    /// as UTF-8 when valid and as PDFDocEncoding otherwise.
    pub fn to_text(&self) -> String {
        let bytes = self.0.as_slice();
        if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            return String::from_utf16_lossy(&units);
        }
        if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
            return String::from_utf8_lossy(rest).into_owned();
        }
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_owned(),
            Err(_) => bytes.iter().map(|&b| pdf_doc_char(b)).collect(),
        }
    }
}

impl From<&str> for PdfString {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// PDFDocEncoding; the 0x80..=0x9F block differs from Latin-1.
fn pdf_doc_char(b: u8) -> char {
    const HIGH: [char; 32] = [
        '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}',
        '\u{2044}', '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}',
        '\u{201D}', '\u{2018}', '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}',
        '\u{0141}', '\u{0152}', '\u{0160}', '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}',
        '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
    ];
    match b {
        0x80..=0x9F => HIGH[(b - 0x80) as usize],
        0xA0 => '\u{20AC}',
        _ => b as char,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef {
    pub num: i32,
    pub generation: i32,
}
impl ObjRef {
    pub fn new(num: i32, generation: i32) -> Self {
        Self { num, generation }
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.num, self.generation)
    }
}

pub type Dict = HashMap<Name, Object>;
pub type Array = Vec<Object>;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Object {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    String(PdfString),
    Name(Name),
    Array(Array),
    Dict(Dict),
    Stream {
        dict: Dict,
        data: Vec<u8>,
    },
    Ref(ObjRef),
}

/// Shared null returned by lookups that find nothing.
pub static NULL: Object = Object::Null;

impl Object {
    pub fn name(s: &str) -> Self {
        Object::Name(Name::new(s))
    }
    pub fn string(s: &str) -> Self {
        Object::String(PdfString::from(s))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }
    pub fn is_ref(&self) -> bool {
        matches!(self, Object::Ref(_))
    }
    pub fn is_stream(&self) -> bool {
        matches!(self, Object::Stream { .. })
    }
    pub fn as_int(&self) -> Option<i64> {
        if let Object::Int(i) = self {
            Some(*i)
        } else {
            None
        }
    }
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(r) => Some(*r),
            Object::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
    pub fn as_name(&self) -> Option<&Name> {
        if let Object::Name(n) = self {
            Some(n)
        } else {
            None
        }
    }
    /// True when this is the name `/name`.
    pub fn is_name(&self, name: &str) -> bool {
        self.as_name().is_some_and(|n| n.as_str() == name)
    }
    pub fn as_string(&self) -> Option<&PdfString> {
        if let Object::String(s) = self {
            Some(s)
        } else {
            None
        }
    }
    pub fn as_array(&self) -> Option<&Array> {
        if let Object::Array(a) = self {
            Some(a)
        } else {
            None
        }
    }
    /// Dictionary of a dict or stream object
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dict(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }
    pub fn as_ref(&self) -> Option<ObjRef> {
        if let Object::Ref(r) = self {
            Some(*r)
        } else {
            None
        }
    }

    /// Direct dictionary lookup without following references
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.as_dict().and_then(|d| d.get(key))
    }
}

impl From<ObjRef> for Object {
    fn from(r: ObjRef) -> Self {
        Object::Ref(r)
    }
}
