//! In-memory object store
//!
//! Documents are described in a qpdf-style JSON form:
//!
//! ```json
//! {
//!   "objects": {
//!     "obj:1 0 R": { "/Type": "/Catalog", "/Pages": "2 0 R" },
//!     "obj:4 0 R": { "stream": { "dict": { "/Subtype": "/text/plain" }, "data": "aGk=" } }
//!   },
//!   "trailer": { "/Root": "1 0 R" }
//! }
//! ```
//!
//! Names are written `"/Name"`, references `"N G R"`, text strings
//! `"u:text"` and binary strings `"b:hex"`. Stream data is base64.

use crate::fitz::error::{Error, Result};
use crate::fitz::geometry::Matrix;
use crate::pdf::object::{Dict, Name, NULL, ObjRef, Object, PdfString};
use crate::pdf::page;
use crate::pdf::store::{ObjectStore, ObjectStoreMut, TransformProvider};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Deepest page tree accepted when indexing pages
const MAX_PAGE_TREE_DEPTH: usize = 64;

#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonDocument {
    #[serde(default)]
    objects: BTreeMap<String, Value>,
    #[serde(default)]
    trailer: Value,
}

#[derive(Debug)]
struct Journal {
    label: String,
    depth: usize,
    next_num: i32,
    undo: Vec<(ObjRef, Option<Object>)>,
}

/// A document held entirely in memory.
///
/// Besides plain storage it can simulate the conditions a progressively
/// loaded or broken file produces: objects can be marked pending (loading
/// them fails with `TryLater`) or damaged (loading fails with a format
/// error), and page transforms can be overridden per page.
#[derive(Debug)]
pub struct MemoryStore {
    objects: HashMap<ObjRef, Object>,
    trailer: Object,
    pages: Vec<ObjRef>,
    pending: HashSet<ObjRef>,
    damaged: HashSet<ObjRef>,
    page_ctms: HashMap<i32, Matrix>,
    next_num: i32,
    object_limit: Option<usize>,
    journal: Option<Journal>,
    history: Vec<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Object::Dict(Dict::new()))
    }
}

impl MemoryStore {
    /// Create a store with the given trailer and no objects
    pub fn new(trailer: Object) -> Self {
        Self {
            objects: HashMap::new(),
            trailer,
            pages: Vec::new(),
            pending: HashSet::new(),
            damaged: HashSet::new(),
            page_ctms: HashMap::new(),
            next_num: 1,
            object_limit: None,
            journal: None,
            history: Vec::new(),
        }
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Build a store from an already parsed JSON document
    pub fn from_value(value: Value) -> Result<Self> {
        let doc: JsonDocument = serde_json::from_value(value)?;

        let trailer = match doc.trailer {
            Value::Null => Object::Dict(Dict::new()),
            ref v => object_from_json(v)?,
        };
        if trailer.as_dict().is_none() {
            return Err(Error::format("trailer is not a dictionary"));
        }

        let mut store = Self::new(trailer);
        for (key, value) in &doc.objects {
            let r = key
                .strip_prefix("obj:")
                .and_then(parse_ref)
                .ok_or_else(|| Error::syntax(format!("bad object key '{key}'")))?;
            store.objects.insert(r, object_from_json(value)?);
            store.next_num = store.next_num.max(r.num + 1);
        }
        store.rebuild_page_tree()?;
        debug!(
            objects = store.objects.len(),
            pages = store.pages.len(),
            "loaded document"
        );
        Ok(store)
    }

    /// Serialize back to the JSON form
    pub fn to_json(&self) -> Result<String> {
        let doc = JsonDocument {
            objects: self
                .objects
                .iter()
                .map(|(r, obj)| (format!("obj:{r}"), object_to_json(obj)))
                .collect(),
            trailer: object_to_json(&self.trailer),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Cap the number of objects; adding beyond it fails with a limit error
    #[must_use]
    pub fn with_object_limit(mut self, limit: usize) -> Self {
        self.object_limit = Some(limit);
        self
    }

    /// Make loads of `r` fail with `TryLater` until [`MemoryStore::mark_loaded`]
    pub fn mark_pending(&mut self, r: ObjRef) {
        self.pending.insert(r);
    }

    pub fn mark_loaded(&mut self, r: ObjRef) {
        self.pending.remove(&r);
    }

    /// Make loads of `r` fail with a format error
    pub fn mark_damaged(&mut self, r: ObjRef) {
        self.damaged.insert(r);
    }

    /// Use a fixed transform for the page at `index`
    pub fn set_page_ctm(&mut self, index: i32, ctm: Matrix) {
        self.page_ctms.insert(index, ctm);
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Labels of the committed operations, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Page object references in page order
    pub fn pages(&self) -> &[ObjRef] {
        &self.pages
    }

    /// Re-index the page tree under `Root/Pages`.
    ///
    /// Cycles and excessively deep trees are cut off with a warning.
    pub fn rebuild_page_tree(&mut self) -> Result<()> {
        let mut pages = Vec::new();
        let mut visited = HashSet::new();
        let root = self.catalog()?;
        let tree = self.dict_get_raw(root, "Pages")?;
        self.collect_pages(tree, 0, &mut visited, &mut pages)?;
        self.pages = pages;
        Ok(())
    }

    fn collect_pages(
        &self,
        node: &Object,
        depth: usize,
        visited: &mut HashSet<ObjRef>,
        out: &mut Vec<ObjRef>,
    ) -> Result<()> {
        if depth > MAX_PAGE_TREE_DEPTH {
            warn!("page tree too deep");
            return Ok(());
        }
        let Object::Ref(r) = node else {
            return Ok(());
        };
        if !visited.insert(*r) {
            warn!(object = %r, "cycle in page tree");
            return Ok(());
        }

        let dict = self.resolve(node)?;
        let is_leaf = self.dict_get(dict, "Type")?.is_name("Page");
        match self.dict_get(dict, "Kids")?.as_array() {
            Some(kids) if !is_leaf => {
                for kid in kids {
                    self.collect_pages(kid, depth + 1, visited, out)?;
                }
            }
            _ => {
                if dict.as_dict().is_some() {
                    out.push(*r);
                }
            }
        }
        Ok(())
    }

    fn record(&mut self, r: ObjRef, previous: Option<Object>) {
        if let Some(journal) = self.journal.as_mut() {
            journal.undo.push((r, previous));
        }
    }
}

impl ObjectStore for MemoryStore {
    fn load_object(&self, r: ObjRef) -> Result<&Object> {
        if self.pending.contains(&r) {
            return Err(Error::try_later(format!("object {r}")));
        }
        if self.damaged.contains(&r) {
            return Err(Error::format(format!("object {r} is damaged")));
        }
        Ok(self.objects.get(&r).unwrap_or(&NULL))
    }

    fn trailer(&self) -> &Object {
        &self.trailer
    }

    fn page_count(&self) -> i32 {
        i32::try_from(self.pages.len()).unwrap_or(i32::MAX)
    }

    fn lookup_page_obj(&self, index: i32) -> Result<Option<Object>> {
        let Ok(index) = usize::try_from(index) else {
            return Ok(None);
        };
        Ok(self.pages.get(index).copied().map(Object::Ref))
    }

    fn lookup_page_number(&self, page: &Object) -> Result<Option<i32>> {
        let Some(r) = page.as_ref() else {
            return Ok(None);
        };
        Ok(self
            .pages
            .iter()
            .position(|p| *p == r)
            .and_then(|i| i32::try_from(i).ok()))
    }
}

impl TransformProvider for MemoryStore {
    fn page_ctm(&self, page: &Object) -> Result<Matrix> {
        if let Some(index) = self.lookup_page_number(page)? {
            if let Some(ctm) = self.page_ctms.get(&index) {
                return Ok(*ctm);
            }
        }
        page::page_transform(self, page)
    }
}

impl ObjectStoreMut for MemoryStore {
    fn add_object(&mut self, obj: Object) -> Result<ObjRef> {
        if let Some(limit) = self.object_limit {
            if self.objects.len() >= limit {
                return Err(Error::limit(format!("object table full ({limit} objects)")));
            }
        }
        let r = ObjRef::new(self.next_num, 0);
        self.next_num += 1;
        self.objects.insert(r, obj);
        self.record(r, None);
        Ok(r)
    }

    fn update_object(&mut self, r: ObjRef, obj: Object) -> Result<()> {
        let previous = self.objects.insert(r, obj);
        self.record(r, previous);
        Ok(())
    }

    fn delete_object(&mut self, r: ObjRef) -> Result<()> {
        let previous = self.objects.remove(&r);
        self.record(r, previous);
        Ok(())
    }

    fn begin_operation(&mut self, label: &str) {
        match self.journal.as_mut() {
            Some(journal) => journal.depth += 1,
            None => {
                self.journal = Some(Journal {
                    label: label.to_owned(),
                    depth: 0,
                    next_num: self.next_num,
                    undo: Vec::new(),
                });
            }
        }
    }

    fn end_operation(&mut self) {
        let Some(journal) = self.journal.as_mut() else {
            warn!("end_operation without begin_operation");
            return;
        };
        if journal.depth > 0 {
            journal.depth -= 1;
            return;
        }
        if let Some(journal) = self.journal.take() {
            debug!(label = %journal.label, changes = journal.undo.len(), "operation committed");
            self.history.push(journal.label);
        }
    }

    // Nested operations are undone together with the outermost one.
    fn abandon_operation(&mut self) {
        let Some(journal) = self.journal.as_mut() else {
            warn!("abandon_operation without begin_operation");
            return;
        };
        if journal.depth > 0 {
            journal.depth -= 1;
            return;
        }
        if let Some(journal) = self.journal.take() {
            debug!(label = %journal.label, changes = journal.undo.len(), "operation abandoned");
            for (r, previous) in journal.undo.into_iter().rev() {
                match previous {
                    Some(obj) => self.objects.insert(r, obj),
                    None => self.objects.remove(&r),
                };
            }
            self.next_num = journal.next_num;
        }
    }
}

/// Parse `"N G R"`
fn parse_ref(s: &str) -> Option<ObjRef> {
    let mut parts = s.split_whitespace();
    let num = parts.next()?.parse().ok()?;
    let generation = parts.next()?.parse().ok()?;
    if parts.next()? != "R" || parts.next().is_some() {
        return None;
    }
    Some(ObjRef::new(num, generation))
}

fn object_from_json(value: &Value) -> Result<Object> {
    Ok(match value {
        Value::Null => Object::Null,
        Value::Bool(b) => Object::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Object::Int(i),
            None => Object::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => string_from_json(s)?,
        Value::Array(items) => Object::Array(
            items
                .iter()
                .map(object_from_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(map) => match map.get("stream") {
            Some(Value::Object(stream)) if map.len() == 1 => {
                let dict = match stream.get("dict") {
                    Some(Value::Object(d)) => dict_from_json(d)?,
                    None => Dict::new(),
                    Some(_) => return Err(Error::syntax("stream dict is not an object")),
                };
                let data = match stream.get("data") {
                    Some(Value::String(s)) => BASE64
                        .decode(s)
                        .map_err(|e| Error::syntax(format!("bad stream data: {e}")))?,
                    None => Vec::new(),
                    Some(_) => return Err(Error::syntax("stream data is not a string")),
                };
                Object::Stream { dict, data }
            }
            _ => Object::Dict(dict_from_json(map)?),
        },
    })
}

fn dict_from_json(map: &serde_json::Map<String, Value>) -> Result<Dict> {
    map.iter()
        .map(|(key, value)| {
            let name = key
                .strip_prefix('/')
                .ok_or_else(|| Error::syntax(format!("dictionary key '{key}' is not a name")))?;
            Ok((Name::new(name), object_from_json(value)?))
        })
        .collect()
}

fn string_from_json(s: &str) -> Result<Object> {
    if let Some(name) = s.strip_prefix('/') {
        return Ok(Object::Name(Name::new(name)));
    }
    if let Some(text) = s.strip_prefix("u:") {
        return Ok(Object::String(PdfString::from(text)));
    }
    if let Some(hex) = s.strip_prefix("b:") {
        return decode_hex(hex)
            .map(|bytes| Object::String(PdfString::new(bytes)))
            .ok_or_else(|| Error::syntax(format!("bad hex string '{hex}'")));
    }
    parse_ref(s)
        .map(Object::Ref)
        .ok_or_else(|| Error::syntax(format!("unrecognized value '{s}'")))
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

fn object_to_json(obj: &Object) -> Value {
    match obj {
        Object::Null => Value::Null,
        Object::Bool(b) => Value::Bool(*b),
        Object::Int(i) => Value::from(*i),
        Object::Real(r) => Value::from(*r),
        Object::String(s) => Value::String(match s.as_str() {
            Some(text) => format!("u:{text}"),
            None => {
                let hex: String = s.as_bytes().iter().map(|b| format!("{b:02x}")).collect();
                format!("b:{hex}")
            }
        }),
        Object::Name(n) => Value::String(format!("/{}", n.as_str())),
        Object::Array(items) => Value::Array(items.iter().map(object_to_json).collect()),
        Object::Dict(dict) => Value::Object(dict_to_json(dict)),
        Object::Stream { dict, data } => {
            let mut stream = serde_json::Map::new();
            stream.insert("dict".into(), Value::Object(dict_to_json(dict)));
            stream.insert("data".into(), Value::String(BASE64.encode(data)));
            let mut wrapper = serde_json::Map::new();
            wrapper.insert("stream".into(), Value::Object(stream));
            Value::Object(wrapper)
        }
        Object::Ref(r) => Value::String(r.to_string()),
    }
}

fn dict_to_json(dict: &Dict) -> serde_json::Map<String, Value> {
    dict.iter()
        .map(|(k, v)| (format!("/{}", k.as_str()), object_to_json(v)))
        .collect()
}
