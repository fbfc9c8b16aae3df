//! Link actions: GoTo, URI, Launch, GoToR and Named

use crate::fitz::error::Result;
use crate::fitz::link::is_external_link;
use crate::pdf::link::LinkResolver;
use crate::pdf::object::Object;
use crate::pdf::store::TransformProvider;
use tracing::debug;

impl<D: TransformProvider + ?Sized> LinkResolver<'_, D> {
    /// Turn an action dictionary into a URI.
    ///
    /// `pagenum` is the zero-based page the action is triggered from, or a
    /// negative number when unknown; `PrevPage`/`NextPage` need it.
    /// Unknown action kinds and named actions yield `None`.
    pub fn parse_link_action(&self, action: &Object, pagenum: i32) -> Result<Option<String>> {
        let doc = self.doc;
        if doc.resolve(action)?.is_null() {
            return Ok(None);
        }

        let kind = doc.dict_get(action, "S")?;
        let Some(kind) = kind.as_name() else {
            return Ok(None);
        };

        match kind.as_str() {
            "GoTo" => self.parse_link_dest(doc.dict_get_raw(action, "D")?),
            "URI" => {
                let uri = match doc.dict_get(action, "URI")?.as_string() {
                    Some(s) => s.to_text(),
                    None => String::new(),
                };
                if is_external_link(&uri) {
                    return Ok(Some(uri));
                }
                let base = match doc.dict_getp(doc.trailer(), "Root/URI/Base")?.as_string() {
                    Some(s) => s.to_text(),
                    None => "file://".to_owned(),
                };
                Ok(Some(base + &uri))
            }
            "Launch" => self.parse_file_spec(doc.dict_get_raw(action, "F")?, None),
            "GoToR" => {
                let dest = doc.dict_get(action, "D")?;
                self.parse_file_spec(doc.dict_get_raw(action, "F")?, Some(dest))
            }
            "Named" => {
                let target = doc.dict_get(action, "N")?;
                let Some(target) = target.as_name() else {
                    return Ok(None);
                };
                Ok(self
                    .named_page(target.as_str(), pagenum)
                    .map(|page| format!("#page={}", i64::from(page) + 1)))
            }
            other => {
                debug!(kind = other, "unsupported link action");
                Ok(None)
            }
        }
    }

    /// Target page of a named navigation action
    fn named_page(&self, name: &str, pagenum: i32) -> Option<i32> {
        let last = self.doc.page_count() - 1;
        match name {
            "FirstPage" => Some(0),
            "LastPage" => Some(last),
            "PrevPage" if pagenum >= 0 => Some(if pagenum > 0 { pagenum - 1 } else { pagenum }),
            "NextPage" if pagenum >= 0 => Some(if pagenum < last { pagenum + 1 } else { pagenum }),
            _ => None,
        }
    }
}
