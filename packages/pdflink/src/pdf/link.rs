//! Link destinations and link annotations
//!
//! [`LinkResolver`] turns the destination and action objects found in a
//! document into navigation URIs, and collects the links on a page.
//! Action handling lives in [`crate::pdf::action`], file specifications in
//! [`crate::pdf::file_spec`].

use crate::config::LinkOptions;
use crate::fitz::error::{Error, Result};
use crate::fitz::geometry::{Matrix, Point, Rect};
use crate::fitz::link::{Link, LinkDest, LinkDestType, LinkList};
use crate::pdf::link_uri::format_link_uri;
use crate::pdf::object::{NULL, Object};
use crate::pdf::store::TransformProvider;
use tracing::{debug, warn};

/// A resolved destination.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    /// A bare destination name, for documents without a destination catalog
    Named(String),
    /// A position in this document
    Dest(LinkDest),
}

impl LinkTarget {
    /// URI for the target; names are passed through unchanged
    pub fn to_uri(&self) -> String {
        match self {
            LinkTarget::Named(name) => name.clone(),
            LinkTarget::Dest(dest) => format_link_uri(dest),
        }
    }
}

/// Resolves destinations, actions and link annotations of one document.
pub struct LinkResolver<'a, D: TransformProvider + ?Sized> {
    pub(crate) doc: &'a D,
    pub(crate) options: LinkOptions,
}

impl<'a, D: TransformProvider + ?Sized> LinkResolver<'a, D> {
    pub fn new(doc: &'a D) -> Self {
        Self::with_options(doc, LinkOptions::default())
    }

    pub fn with_options(doc: &'a D, options: LinkOptions) -> Self {
        Self { doc, options }
    }

    pub fn doc(&self) -> &'a D {
        self.doc
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    /// Follow a destination through named-destination lookups and
    /// `<< /D ... >>` dictionaries.
    ///
    /// Returns the destination array, a bare name or string when the
    /// document has no destination catalog, or a reference to an object of
    /// some other kind. `None` means the destination cannot be resolved,
    /// including when more than [`LinkOptions::dest_depth`] hops are needed.
    pub fn resolve_dest<'o>(&'o self, dest: &'o Object) -> Result<Option<&'o Object>> {
        self.resolve_dest_rec(dest, 0)
    }

    fn resolve_dest_rec<'o>(&'o self, dest: &'o Object, depth: usize) -> Result<Option<&'o Object>> {
        if depth > self.options.dest_depth() {
            debug!(depth, "destination chain too long");
            return Ok(None);
        }

        let target = self.doc.resolve(dest)?;
        match target {
            Object::Name(_) | Object::String(_) => {
                if !self.doc.has_dest_catalog()? {
                    return Ok(Some(target));
                }
                match self.doc.lookup_dest(target)? {
                    Some(found) => self.resolve_dest_rec(found, depth + 1),
                    None => Ok(None),
                }
            }
            Object::Array(_) => Ok(Some(target)),
            Object::Dict(_) | Object::Stream { .. } => {
                self.resolve_dest_rec(self.doc.dict_get_raw(target, "D")?, depth + 1)
            }
            _ if dest.is_ref() => Ok(Some(dest)),
            _ => Ok(None),
        }
    }

    /// Resolve a destination and decode it into a target.
    ///
    /// Unresolvable destinations are logged and yield `None`.
    pub fn resolve_link_dest(&self, dest: &Object) -> Result<Option<LinkTarget>> {
        let Some(resolved) = self.resolve_dest(dest)? else {
            warn!("undefined link destination");
            return Ok(None);
        };

        match resolved {
            Object::Name(name) => Ok(Some(LinkTarget::Named(name.as_str().to_owned()))),
            Object::String(s) => Ok(Some(LinkTarget::Named(s.to_lossy()))),
            _ => self.decode_dest(resolved).map(|d| Some(LinkTarget::Dest(d))),
        }
    }

    /// Resolve a destination straight to its URI
    pub fn parse_link_dest(&self, dest: &Object) -> Result<Option<String>> {
        Ok(self.resolve_link_dest(dest)?.map(|target| target.to_uri()))
    }

    /// Decode an explicit destination `[page /Type args...]`.
    ///
    /// The page may be an index or a page reference and is clamped to the
    /// document. Missing or non-numeric arguments read as 0, an unknown
    /// type as `XYZ`. Coordinates are mapped to device space with the
    /// page's transform.
    pub fn decode_dest(&self, dest: &Object) -> Result<LinkDest> {
        let doc = self.doc;
        let first = doc
            .resolve(dest)?
            .as_array()
            .and_then(|items| items.first())
            .unwrap_or(&NULL);

        let (pageno, pageobj) = match doc.resolve(first)? {
            Object::Int(n) => {
                let n = i32::try_from(*n).unwrap_or(if *n < 0 { i32::MIN } else { i32::MAX });
                (n, doc.lookup_page_obj(n)?.unwrap_or(Object::Null))
            }
            _ => (doc.lookup_page_number(first)?.unwrap_or(-1), first.clone()),
        };
        let page = clamp_page(pageno, doc.page_count());

        let dest_type = doc
            .array_get(dest, 1)?
            .as_name()
            .and_then(|n| LinkDestType::from_pdf_name(n.as_str()))
            .unwrap_or(LinkDestType::XYZ);

        let mut args = [0.0f32; 4];
        for (i, arg) in args.iter_mut().enumerate() {
            *arg = doc.array_get(dest, i + 2)?.as_real().unwrap_or(0.0) as f32;
        }
        let [a1, a2, a3, a4] = args;

        let ctm = doc.page_ctm(&pageobj)?;
        let mut out = LinkDest::new(0, page, dest_type);
        match dest_type {
            LinkDestType::Fit | LinkDestType::FitB => {}
            LinkDestType::FitH | LinkDestType::FitBH => {
                out.y = Point::new(0.0, a1).transform(&ctm).y;
            }
            LinkDestType::FitV | LinkDestType::FitBV => {
                out.x = Point::new(a1, 0.0).transform(&ctm).x;
            }
            LinkDestType::XYZ => {
                let p = Point::new(a1, a2).transform(&ctm);
                out.x = p.x;
                out.y = p.y;
                out.zoom = a3 * 100.0;
            }
            LinkDestType::FitR => {
                let r = Rect::from_corners(Point::new(a1, a2), Point::new(a3, a4)).transform(&ctm);
                out.x = r.x0;
                out.y = r.y0;
                out.w = r.width();
                out.h = r.height();
            }
        }
        debug!(page, kind = dest_type.as_str(), "decoded destination");
        Ok(out)
    }

    /// Build the link for one annotation.
    ///
    /// Returns `None` for annotations that are not links, have no `Rect`,
    /// or lead nowhere.
    pub fn load_link(&self, annot: &Object, pagenum: i32, page_ctm: &Matrix) -> Result<Option<Link>> {
        let doc = self.doc;
        if !doc.dict_get(annot, "Subtype")?.is_name("Link") {
            return Ok(None);
        }
        let rect = doc.dict_get(annot, "Rect")?;
        if rect.is_null() {
            return Ok(None);
        }
        let bbox = doc.to_rect(rect)?.transform(page_ctm);

        let dest = doc.dict_get_raw(annot, "Dest")?;
        let uri = if dest.is_null() {
            let mut action = doc.dict_get(annot, "A")?;
            if action.is_null() {
                // additional actions: button up, then down
                let aa = doc.dict_get(annot, "AA")?;
                action = doc.dict_geta(aa, "U", "D")?;
            }
            self.parse_link_action(action, pagenum)?
        } else {
            self.parse_link_dest(dest)?
        };

        Ok(uri.map(|uri| Link::new(bbox, uri)))
    }

    /// Collect the links of an `Annots` array, in order.
    ///
    /// A broken annotation is skipped with a warning. A `TryLater` error
    /// aborts the whole collection so no partial list is returned.
    pub fn load_link_annots(&self, annots: &Object, pagenum: i32, page_ctm: &Matrix) -> Result<LinkList> {
        let mut links = LinkList::new();
        let Some(items) = self.doc.resolve(annots)?.as_array() else {
            return Ok(links);
        };

        for (index, annot) in items.iter().enumerate() {
            match self.load_link(annot, pagenum, page_ctm) {
                Ok(Some(link)) => links.push(link),
                Ok(None) => {}
                Err(e) if e.is_try_later() => return Err(e),
                Err(e) => warn!(index, error = %e, "ignoring broken link annotation"),
            }
        }
        Ok(links)
    }

    /// Collect the links on the page at `page_index`
    pub fn load_page_links(&self, page_index: i32) -> Result<LinkList> {
        let Some(page) = self.doc.lookup_page_obj(page_index)? else {
            return Err(Error::argument(format!(
                "page {page_index} out of range (document has {} pages)",
                self.doc.page_count()
            )));
        };
        let ctm = self.doc.page_ctm(&page)?;
        let annots = self.doc.dict_get_raw(&page, "Annots")?;
        self.load_link_annots(annots, page_index, &ctm)
    }
}

/// Clamp a page number into the document; an empty document gives page 0.
fn clamp_page(page: i32, count: i32) -> i32 {
    if page < 0 {
        0
    } else if page > count - 1 {
        (count - 1).max(0)
    } else {
        page
    }
}
