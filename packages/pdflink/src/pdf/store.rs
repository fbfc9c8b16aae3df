//! Object store access
//!
//! The link code never owns a document. It reads through [`ObjectStore`],
//! asks [`TransformProvider`] for page transforms, and writes (embedded
//! files only) through [`ObjectStoreMut`] inside an [`Operation`].

use crate::fitz::error::Result;
use crate::fitz::geometry::{Matrix, Point, Rect};
use crate::pdf::object::{NULL, ObjRef, Object};
use crate::pdf::page;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Longest chain of references followed by [`ObjectStore::resolve`].
const MAX_INDIRECTIONS: usize = 10;

/// Deepest name tree accepted.
const MAX_NAME_TREE_DEPTH: usize = 32;

/// Read access to a document's objects.
///
/// Implementors supply object loading and the page index; everything else
/// is provided on top. Lookups follow the usual PDF conventions: a missing
/// key or out-of-range index reads as null, and references are resolved
/// transparently by the `dict_*` and `array_*` helpers.
pub trait ObjectStore {
    /// Load an indirect object.
    ///
    /// Objects that do not exist load as null. Objects whose data is not
    /// available yet fail with [`Error::TryLater`](crate::fitz::error::Error::TryLater).
    fn load_object(&self, r: ObjRef) -> Result<&Object>;

    /// The trailer dictionary
    fn trailer(&self) -> &Object;

    /// Number of pages in the document
    fn page_count(&self) -> i32;

    /// Page object for a zero-based page index, if there is one
    fn lookup_page_obj(&self, index: i32) -> Result<Option<Object>>;

    /// Zero-based page index of a page object, if it is a page of this document
    fn lookup_page_number(&self, page: &Object) -> Result<Option<i32>>;

    /// Follow references until a direct object is reached.
    ///
    /// Chains longer than ten hops resolve to null with a warning.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        let mut current = obj;
        let mut hops = 0;
        while let Object::Ref(r) = current {
            if hops == MAX_INDIRECTIONS {
                warn!(object = %r, "too many indirections (possible indirection cycle)");
                return Ok(&NULL);
            }
            current = self.load_object(*r)?;
            hops += 1;
        }
        Ok(current)
    }

    /// Dictionary entry as stored, without resolving it
    fn dict_get_raw<'a>(&'a self, obj: &'a Object, key: &str) -> Result<&'a Object> {
        Ok(self.resolve(obj)?.get(key).unwrap_or(&NULL))
    }

    /// Resolved dictionary entry
    fn dict_get<'a>(&'a self, obj: &'a Object, key: &str) -> Result<&'a Object> {
        self.resolve(self.dict_get_raw(obj, key)?)
    }

    /// Resolved entry under `key`, or under `abbrev` when `key` is absent
    fn dict_geta<'a>(&'a self, obj: &'a Object, key: &str, abbrev: &str) -> Result<&'a Object> {
        let value = self.dict_get(obj, key)?;
        if value.is_null() {
            self.dict_get(obj, abbrev)
        } else {
            Ok(value)
        }
    }

    /// Resolved entry at a `/`-separated key path such as `Root/URI/Base`
    fn dict_getp<'a>(&'a self, obj: &'a Object, path: &str) -> Result<&'a Object> {
        let mut current = self.resolve(obj)?;
        for key in path.split('/') {
            current = self.dict_get(current, key)?;
        }
        Ok(current)
    }

    /// Resolved array element
    fn array_get<'a>(&'a self, obj: &'a Object, index: usize) -> Result<&'a Object> {
        match self.resolve(obj)?.as_array().and_then(|a| a.get(index)) {
            Some(item) => self.resolve(item),
            None => Ok(&NULL),
        }
    }

    /// Read a `[x0 y0 x1 y1]` array as a normalized rectangle.
    ///
    /// Non-arrays read as the empty rectangle; non-numeric corners as 0.
    fn to_rect(&self, obj: &Object) -> Result<Rect> {
        if self.resolve(obj)?.as_array().is_none() {
            return Ok(Rect::EMPTY);
        }
        let mut v = [0.0f32; 4];
        for (i, slot) in v.iter_mut().enumerate() {
            *slot = self.array_get(obj, i)?.as_real().unwrap_or(0.0) as f32;
        }
        Ok(Rect::from_corners(
            Point::new(v[0], v[1]),
            Point::new(v[2], v[3]),
        ))
    }

    /// The document catalog (`/Root`)
    fn catalog(&self) -> Result<&Object> {
        self.dict_get(self.trailer(), "Root")
    }

    /// True when the document carries a named-destination catalog, either
    /// the `Dests` dictionary or the `Names/Dests` name tree.
    fn has_dest_catalog(&self) -> Result<bool> {
        let root = self.catalog()?;
        Ok(self.dict_get(root, "Dests")?.as_dict().is_some()
            || self.dict_getp(root, "Names/Dests")?.as_dict().is_some())
    }

    /// Look up a named destination.
    ///
    /// The `Dests` dictionary is consulted first and the `Names/Dests` name
    /// tree second. The entry is returned as stored: it may be an array, a
    /// `<< /D [...] >>` dictionary or another name.
    fn lookup_dest<'a>(&'a self, needle: &Object) -> Result<Option<&'a Object>> {
        let Some(key) = string_key(needle) else {
            return Ok(None);
        };
        let root = self.catalog()?;

        if let Some(dests) = self.dict_get(root, "Dests")?.as_dict() {
            let key = String::from_utf8_lossy(key);
            return Ok(dests.get(&*key).filter(|entry| !entry.is_null()));
        }

        let tree = self.dict_getp(root, "Names/Dests")?;
        if tree.as_dict().is_some() {
            return find_in_name_tree(self, tree, key, 0);
        }

        Ok(None)
    }

    /// All `(key, value)` pairs of a name tree in tree order.
    ///
    /// Values are returned as stored (possibly references).
    fn name_tree_entries<'a>(&'a self, tree: &'a Object) -> Result<Vec<(&'a Object, &'a Object)>> {
        let mut out = Vec::new();
        collect_name_tree(self, tree, 0, &mut out)?;
        Ok(out)
    }
}

/// Name or string bytes used as a name tree key
fn string_key(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::Name(n) => Some(n.as_str().as_bytes()),
        Object::String(s) => Some(s.as_bytes()),
        _ => None,
    }
}

fn find_in_name_tree<'a, S: ObjectStore + ?Sized>(
    store: &'a S,
    node: &'a Object,
    key: &[u8],
    depth: usize,
) -> Result<Option<&'a Object>> {
    if depth > MAX_NAME_TREE_DEPTH {
        warn!("name tree too deep");
        return Ok(None);
    }
    let node = store.resolve(node)?;

    if let Some(names) = store.dict_get(node, "Names")?.as_array() {
        for pair in names.chunks_exact(2) {
            if string_key(store.resolve(&pair[0])?) == Some(key) {
                return Ok(Some(&pair[1]));
            }
        }
    }

    if let Some(kids) = store.dict_get(node, "Kids")?.as_array() {
        for kid in kids {
            let kid = store.resolve(kid)?;
            let limits = store.dict_get(kid, "Limits")?;
            if limits.as_array().is_some() {
                let lo = string_key(store.array_get(limits, 0)?);
                let hi = string_key(store.array_get(limits, 1)?);
                if let (Some(lo), Some(hi)) = (lo, hi) {
                    if key < lo || key > hi {
                        continue;
                    }
                }
            }
            if let Some(found) = find_in_name_tree(store, kid, key, depth + 1)? {
                return Ok(Some(found));
            }
        }
    }

    Ok(None)
}

fn collect_name_tree<'a, S: ObjectStore + ?Sized>(
    store: &'a S,
    node: &'a Object,
    depth: usize,
    out: &mut Vec<(&'a Object, &'a Object)>,
) -> Result<()> {
    if depth > MAX_NAME_TREE_DEPTH {
        warn!("name tree too deep");
        return Ok(());
    }
    let node = store.resolve(node)?;
    if let Some(names) = store.dict_get(node, "Names")?.as_array() {
        for pair in names.chunks_exact(2) {
            out.push((store.resolve(&pair[0])?, &pair[1]));
        }
    }
    if let Some(kids) = store.dict_get(node, "Kids")?.as_array() {
        for kid in kids {
            collect_name_tree(store, kid, depth + 1, out)?;
        }
    }
    Ok(())
}

/// Page content-to-device transforms.
///
/// The provided implementation derives the transform from the page's
/// boxes, rotation and user unit.
pub trait TransformProvider: ObjectStore {
    fn page_ctm(&self, page: &Object) -> Result<Matrix> {
        page::page_transform(self, page)
    }
}

/// Write access to a document's objects.
///
/// Changes are grouped into named operations. Abandoning an operation
/// undoes every change made since the matching `begin_operation`.
pub trait ObjectStoreMut: ObjectStore {
    /// Add a new indirect object and return its reference
    fn add_object(&mut self, obj: Object) -> Result<ObjRef>;

    /// Replace an indirect object
    fn update_object(&mut self, r: ObjRef, obj: Object) -> Result<()>;

    /// Remove an indirect object
    fn delete_object(&mut self, r: ObjRef) -> Result<()>;

    fn begin_operation(&mut self, label: &str);

    fn end_operation(&mut self);

    fn abandon_operation(&mut self);
}

/// Scope guard for a named, undoable operation.
///
/// Dropping the guard without calling [`Operation::commit`] abandons the
/// operation, so an early `?` return rolls back partial changes.
pub struct Operation<'a, S: ObjectStoreMut + ?Sized> {
    store: &'a mut S,
    committed: bool,
}

impl<'a, S: ObjectStoreMut + ?Sized> Operation<'a, S> {
    pub fn begin(store: &'a mut S, label: &str) -> Self {
        store.begin_operation(label);
        Self {
            store,
            committed: false,
        }
    }

    /// Keep the changes and close the operation
    pub fn commit(mut self) {
        self.committed = true;
        self.store.end_operation();
    }
}

impl<S: ObjectStoreMut + ?Sized> Deref for Operation<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: ObjectStoreMut + ?Sized> DerefMut for Operation<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: ObjectStoreMut + ?Sized> Drop for Operation<'_, S> {
    fn drop(&mut self) {
        if !self.committed {
            self.store.abandon_operation();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::memory::MemoryStore;

    fn store(json: &str) -> MemoryStore {
        MemoryStore::from_json(json).unwrap()
    }

    #[test]
    fn test_resolve_follows_chain() {
        let doc = store(
            r#"{
                "objects": {
                    "obj:1 0 R": "2 0 R",
                    "obj:2 0 R": 42
                },
                "trailer": {}
            }"#,
        );
        let r = Object::Ref(ObjRef::new(1, 0));
        assert_eq!(doc.resolve(&r).unwrap(), &Object::Int(42));
    }

    #[test]
    fn test_resolve_cycle_is_null() {
        let doc = store(
            r#"{
                "objects": {
                    "obj:1 0 R": "2 0 R",
                    "obj:2 0 R": "1 0 R"
                },
                "trailer": {}
            }"#,
        );
        let r = Object::Ref(ObjRef::new(1, 0));
        assert!(doc.resolve(&r).unwrap().is_null());
    }

    #[test]
    fn test_missing_object_is_null() {
        let doc = store(r#"{ "objects": {}, "trailer": {} }"#);
        let r = Object::Ref(ObjRef::new(99, 0));
        assert!(doc.resolve(&r).unwrap().is_null());
    }

    #[test]
    fn test_dict_helpers() {
        let doc = store(
            r#"{
                "objects": {
                    "obj:1 0 R": { "/URI": "3 0 R" },
                    "obj:3 0 R": { "/Base": "u:https://example.com/" }
                },
                "trailer": { "/Root": "1 0 R" }
            }"#,
        );
        let base = doc.dict_getp(doc.trailer(), "Root/URI/Base").unwrap();
        assert_eq!(base.as_string().unwrap().to_text(), "https://example.com/");
        assert!(doc.dict_getp(doc.trailer(), "Root/Missing/Base").unwrap().is_null());

        let root = doc.catalog().unwrap();
        assert!(doc.dict_get_raw(root, "URI").unwrap().is_ref());
        assert!(doc.dict_get(root, "URI").unwrap().as_dict().is_some());
    }

    #[test]
    fn test_dict_geta_prefers_full_key() {
        let doc = store(r#"{ "objects": {}, "trailer": {} }"#);
        let both = Object::Dict(
            [
                ("UF".into(), Object::string("long.txt")),
                ("F".into(), Object::string("short.txt")),
            ]
            .into_iter()
            .collect(),
        );
        let got = doc.dict_geta(&both, "UF", "F").unwrap();
        assert_eq!(got.as_string().unwrap().to_text(), "long.txt");

        let abbrev_only = Object::Dict([("F".into(), Object::string("short.txt"))].into_iter().collect());
        let got = doc.dict_geta(&abbrev_only, "UF", "F").unwrap();
        assert_eq!(got.as_string().unwrap().to_text(), "short.txt");
    }

    #[test]
    fn test_to_rect_normalizes() {
        let doc = store(r#"{ "objects": {}, "trailer": {} }"#);
        let arr = Object::Array(vec![
            Object::Int(50),
            Object::Real(80.0),
            Object::Int(10),
            Object::Int(20),
        ]);
        assert_eq!(doc.to_rect(&arr).unwrap(), Rect::new(10.0, 20.0, 50.0, 80.0));
        assert!(doc.to_rect(&Object::Null).unwrap().is_empty());
    }

    #[test]
    fn test_lookup_dest_in_dests_dict() {
        let doc = store(
            r#"{
                "objects": {
                    "obj:1 0 R": { "/Dests": { "/intro": ["3 0 R", "/Fit"] } }
                },
                "trailer": { "/Root": "1 0 R" }
            }"#,
        );
        assert!(doc.has_dest_catalog().unwrap());
        let found = doc.lookup_dest(&Object::name("intro")).unwrap().unwrap();
        assert!(found.as_array().is_some());
        let found = doc.lookup_dest(&Object::string("intro")).unwrap();
        assert!(found.is_some());
        assert!(doc.lookup_dest(&Object::name("outro")).unwrap().is_none());
        assert!(doc.lookup_dest(&Object::Int(1)).unwrap().is_none());
    }

    #[test]
    fn test_lookup_dest_in_name_tree() {
        let doc = store(
            r#"{
                "objects": {
                    "obj:1 0 R": { "/Names": { "/Dests": "2 0 R" } },
                    "obj:2 0 R": { "/Kids": ["3 0 R", "4 0 R"] },
                    "obj:3 0 R": {
                        "/Limits": ["u:alpha", "u:beta"],
                        "/Names": ["u:alpha", [1, "/Fit"], "u:beta", [2, "/Fit"]]
                    },
                    "obj:4 0 R": {
                        "/Limits": ["u:gamma", "u:zeta"],
                        "/Names": ["u:gamma", [3, "/Fit"], "u:zeta", "5 0 R"]
                    },
                    "obj:5 0 R": { "/D": [4, "/Fit"] }
                },
                "trailer": { "/Root": "1 0 R" }
            }"#,
        );
        let beta = doc.lookup_dest(&Object::string("beta")).unwrap().unwrap();
        assert_eq!(beta.as_array().unwrap()[0], Object::Int(2));
        let zeta = doc.lookup_dest(&Object::name("zeta")).unwrap().unwrap();
        assert!(zeta.is_ref());
        assert!(doc.lookup_dest(&Object::string("delta")).unwrap().is_none());

        let tree = doc.dict_getp(doc.trailer(), "Root/Names/Dests").unwrap();
        let keys: Vec<_> = doc
            .name_tree_entries(tree)
            .unwrap()
            .into_iter()
            .map(|(k, _)| k.as_string().unwrap().to_text())
            .collect();
        assert_eq!(keys, ["alpha", "beta", "gamma", "zeta"]);
    }

    #[test]
    fn test_no_dest_catalog() {
        let doc = store(
            r#"{
                "objects": { "obj:1 0 R": { "/Type": "/Catalog" } },
                "trailer": { "/Root": "1 0 R" }
            }"#,
        );
        assert!(!doc.has_dest_catalog().unwrap());
        assert!(doc.lookup_dest(&Object::name("x")).unwrap().is_none());
    }

    #[test]
    fn test_operation_guard_abandons_on_drop() {
        let mut doc = store(r#"{ "objects": {}, "trailer": {} }"#);
        {
            let mut op = Operation::begin(&mut doc, "scratch");
            op.add_object(Object::Int(1)).unwrap();
        }
        assert_eq!(doc.object_count(), 0);
        assert!(doc.history().is_empty());

        let mut op = Operation::begin(&mut doc, "keep");
        let r = op.add_object(Object::Int(7)).unwrap();
        op.commit();
        assert_eq!(doc.resolve(&Object::Ref(r)).unwrap(), &Object::Int(7));
        assert_eq!(doc.history(), ["keep"]);
    }
}
