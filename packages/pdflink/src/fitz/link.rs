//! Link - Hyperlink handling for documents
//!
//! Provides the navigation target model (`LinkDest`) and the page link list
//! produced from link annotations.

use crate::fitz::geometry::Rect;
use crate::pdf::link_uri::parse_link_uri;
use serde::Serialize;

/// Link destination type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LinkDestType {
    /// Fit page to window
    Fit,
    /// Fit page bounding box to window
    FitB,
    /// Fit page width to window
    FitH,
    /// Fit page bounding box width to window
    FitBH,
    /// Fit page height to window
    FitV,
    /// Fit page bounding box height to window
    FitBV,
    /// Fit rectangle to window
    FitR,
    /// Specific x, y, zoom destination
    XYZ,
}

impl LinkDestType {
    /// Map a PDF destination type name (`/XYZ`, `/FitH`, ...) to a type.
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        match name {
            "XYZ" => Some(Self::XYZ),
            "Fit" => Some(Self::Fit),
            "FitH" => Some(Self::FitH),
            "FitV" => Some(Self::FitV),
            "FitR" => Some(Self::FitR),
            "FitB" => Some(Self::FitB),
            "FitBH" => Some(Self::FitBH),
            "FitBV" => Some(Self::FitBV),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fit => "Fit",
            Self::FitB => "FitB",
            Self::FitH => "FitH",
            Self::FitBH => "FitBH",
            Self::FitV => "FitV",
            Self::FitBV => "FitBV",
            Self::FitR => "FitR",
            Self::XYZ => "XYZ",
        }
    }
}

/// Location within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub chapter: i32,
    pub page: i32,
}

impl Location {
    pub fn new(chapter: i32, page: i32) -> Self {
        Self { chapter, page }
    }
}

/// Link destination specification
///
/// Only the fields the destination type uses carry meaning: `XYZ` uses
/// `x`, `y` and `zoom`; `FitR` uses `x`, `y`, `w` and `h`; `FitH`/`FitBH`
/// use `y`; `FitV`/`FitBV` use `x`; `Fit`/`FitB` use none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkDest {
    /// Location in document
    pub location: Location,
    /// Destination type
    pub dest_type: LinkDestType,
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
    /// Zoom level in percent
    pub zoom: f32,
}

impl LinkDest {
    /// Create a destination of the given type with all coordinates zeroed
    pub fn new(chapter: i32, page: i32, dest_type: LinkDestType) -> Self {
        Self {
            location: Location::new(chapter, page),
            dest_type,
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            zoom: 0.0,
        }
    }

    /// Create an XYZ destination
    pub fn xyz(chapter: i32, page: i32, x: f32, y: f32, zoom: f32) -> Self {
        Self {
            x,
            y,
            zoom,
            ..Self::new(chapter, page, LinkDestType::XYZ)
        }
    }

    /// Create a FitR destination
    pub fn fit_r(chapter: i32, page: i32, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            ..Self::new(chapter, page, LinkDestType::FitR)
        }
    }

    /// Compare only the fields meaningful for the destination type.
    pub fn same_target(&self, other: &LinkDest) -> bool {
        if self.location != other.location || self.dest_type != other.dest_type {
            return false;
        }
        match self.dest_type {
            LinkDestType::Fit | LinkDestType::FitB => true,
            LinkDestType::FitH | LinkDestType::FitBH => same_f32(self.y, other.y),
            LinkDestType::FitV | LinkDestType::FitBV => same_f32(self.x, other.x),
            LinkDestType::XYZ => {
                same_f32(self.x, other.x)
                    && same_f32(self.y, other.y)
                    && same_f32(self.zoom, other.zoom)
            }
            LinkDestType::FitR => {
                same_f32(self.x, other.x)
                    && same_f32(self.y, other.y)
                    && same_f32(self.w, other.w)
                    && same_f32(self.h, other.h)
            }
        }
    }
}

impl Default for LinkDest {
    fn default() -> Self {
        Self::xyz(0, 0, 0.0, 0.0, 0.0)
    }
}

fn same_f32(a: f32, b: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Check whether `uri` starts with a URI scheme (`alpha *(alnum / "+" / "-" / ".") ":"`).
///
/// Schemes shorter than three characters are rejected so that DOS drive
/// letters (`C:`) are not mistaken for schemes.
pub fn is_external_link(uri: &str) -> bool {
    let Some((scheme, _)) = uri.split_once(':') else {
        return false;
    };
    if scheme.len() < 3 || !scheme.as_bytes()[0].is_ascii_alphabetic() {
        return false;
    }
    scheme[1..]
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

/// An interactive link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    /// Hotspot rectangle (clickable area)
    pub rect: Rect,
    /// URI or internal destination
    pub uri: String,
}

impl Link {
    /// Create a new link
    pub fn new(rect: Rect, uri: impl Into<String>) -> Self {
        Self {
            rect,
            uri: uri.into(),
        }
    }

    /// Check if this is an external link (starts with a URI scheme)
    pub fn is_external(&self) -> bool {
        is_external_link(&self.uri)
    }

    /// Get the scheme of the URI if it's external
    pub fn scheme(&self) -> Option<&str> {
        if !self.is_external() {
            return None;
        }
        self.uri.split_once(':').map(|(scheme, _)| scheme)
    }

    /// Check if link points into the current document
    pub fn is_page_link(&self) -> bool {
        self.uri.starts_with('#')
    }

    /// Decode the navigation target of an internal link
    pub fn dest(&self) -> Option<LinkDest> {
        if !self.is_page_link() {
            return None;
        }
        Some(parse_link_uri(&self.uri))
    }

    /// Zero-based target page of an internal `#page=` link
    pub fn page_number(&self) -> Option<i32> {
        if !self.uri.starts_with("#page=") {
            return None;
        }
        self.dest().map(|d| d.location.page)
    }
}

/// Ordered list of the links on a page, in annotation order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkList {
    links: Vec<Link>,
}

impl LinkList {
    /// Create a new empty link list
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Add a link to the end of the list
    pub fn push(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Get all links as a slice
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Iterate over the links in order
    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.links.iter()
    }

    /// Get number of links
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Check if list is empty
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Get the first link
    pub fn first(&self) -> Option<&Link> {
        self.links.first()
    }

    /// Get a link by index
    pub fn get(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }

    /// Find the first link whose hotspot contains the point
    pub fn link_at_point(&self, x: f32, y: f32) -> Option<&Link> {
        self.links.iter().find(|link| link.rect.contains(x, y))
    }
}

impl IntoIterator for LinkList {
    type Item = Link;
    type IntoIter = std::vec::IntoIter<Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkList {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
