//! File specifications and embedded files

use crate::config::PlatformProfile;
use crate::fitz::error::{Error, Result};
use crate::pdf::link::LinkResolver;
use crate::pdf::object::{Dict, NULL, Name, ObjRef, Object, PdfString};
use crate::pdf::store::{ObjectStore, ObjectStoreMut, Operation, TransformProvider};
use tracing::{debug, warn};

/// Longest ASCII file name written to the `F` entry of a new file specification
const MAX_ASCII_NAME: usize = 1023;

impl<D: TransformProvider + ?Sized> LinkResolver<'_, D> {
    /// Build a `file://` URI from a file specification.
    ///
    /// The path comes from the platform key (`Unix` or `DOS`), then `UF`,
    /// then `F`. A destination adds a fragment: `#page=N` for an explicit
    /// destination, `#name` for a named one.
    pub fn parse_file_spec(&self, file_spec: &Object, dest: Option<&Object>) -> Result<Option<String>> {
        let doc = self.doc;
        let spec = doc.resolve(file_spec)?;

        let filename = match spec {
            Object::String(_) => spec,
            Object::Dict(_) => {
                let native = doc.dict_get(spec, self.options.platform.native_file_key())?;
                if native.is_null() {
                    doc.dict_geta(spec, "UF", "F")?
                } else {
                    native
                }
            }
            _ => &NULL,
        };
        let Some(filename) = filename.as_string() else {
            warn!("cannot parse file specification");
            return Ok(None);
        };

        let fragment = match dest {
            Some(dest) => self.fragment(dest)?,
            None => String::new(),
        };
        let path = filename.to_text();

        if self.options.platform == PlatformProfile::Windows
            && !doc.dict_get(spec, "FS")?.is_name("URL")
        {
            if let Some(uri) = dos_drive_uri(&path, &fragment) {
                return Ok(Some(uri));
            }
        }
        Ok(Some(format!("file://{path}{fragment}")))
    }

    /// Fragment naming a destination in another document
    fn fragment(&self, dest: &Object) -> Result<String> {
        let doc = self.doc;
        Ok(match doc.resolve(dest)? {
            Object::Array(_) => {
                let page = match doc.array_get(dest, 0)? {
                    Object::Real(r) => r.round() as i64,
                    other => other.as_int().unwrap_or(0),
                };
                format!("#page={}", page.saturating_add(1))
            }
            Object::Name(name) => format!("#{}", name.as_str()),
            Object::String(s) => format!("#{}", s.to_lossy()),
            _ => String::new(),
        })
    }
}

/// `/C/dir/file` as `file://C:/dir/file`
fn dos_drive_uri(path: &str, fragment: &str) -> Option<String> {
    let bytes = path.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b'/' {
        let drive = char::from(bytes[1]);
        return Some(format!("file://{drive}:{}{fragment}", &path[2..]));
    }
    None
}

/// Keys of a file specification, most preferred first
const FILE_KEYS: [&str; 5] = ["UF", "F", "Unix", "DOS", "Mac"];

/// Display name of a file specification; empty if it has none
pub fn embedded_file_name<S: ObjectStore + ?Sized>(store: &S, fs: &Object) -> Result<String> {
    for key in FILE_KEYS {
        let value = store.dict_get(fs, key)?;
        if !value.is_null() {
            return Ok(value.as_string().map(PdfString::to_text).unwrap_or_default());
        }
    }
    Ok(String::new())
}

/// The embedded file stream of a file specification, or null
pub fn embedded_file_stream<'a, S: ObjectStore + ?Sized>(store: &'a S, fs: &'a Object) -> Result<&'a Object> {
    let ef = store.dict_get(fs, "EF")?;
    for key in FILE_KEYS {
        let file = store.dict_get(ef, key)?;
        if !file.is_null() {
            return Ok(file);
        }
    }
    Ok(&NULL)
}

/// MIME type of an embedded file, `application/octet-stream` if unknown
pub fn embedded_file_type<S: ObjectStore + ?Sized>(store: &S, fs: &Object) -> Result<String> {
    let file = embedded_file_stream(store, fs)?;
    Ok(match store.dict_get(file, "Subtype")?.as_name() {
        Some(subtype) => subtype.as_str().to_owned(),
        None => "application/octet-stream".to_owned(),
    })
}

pub fn is_embedded_file<S: ObjectStore + ?Sized>(store: &S, fs: &Object) -> Result<bool> {
    Ok(embedded_file_stream(store, fs)?.is_stream())
}

/// Contents of an embedded file
pub fn load_embedded_file<S: ObjectStore + ?Sized>(store: &S, fs: &Object) -> Result<Vec<u8>> {
    match embedded_file_stream(store, fs)? {
        Object::Stream { data, .. } => Ok(data.clone()),
        _ => Err(Error::format("file specification has no embedded file stream")),
    }
}

/// Entries of the document's `EmbeddedFiles` name tree, as `(name, file spec)`
pub fn embedded_files<S: ObjectStore + ?Sized>(store: &S) -> Result<Vec<(String, &Object)>> {
    let tree = store.dict_getp(store.trailer(), "Root/Names/EmbeddedFiles")?;
    let entries = store.name_tree_entries(tree)?;
    let mut files = Vec::with_capacity(entries.len());
    for (key, fs) in entries {
        let name = key.as_string().map(PdfString::to_text).unwrap_or_default();
        files.push((name, store.resolve(fs)?));
    }
    Ok(files)
}

/// Guess a MIME type from a file name's extension.
pub fn guess_mime_type_from_file_name(filename: &str) -> &'static str {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return "application/octet-stream";
    };
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "tar" => "application/x-tar",

        // Text
        "txt" => "text/plain",
        "rtf" => "application/rtf",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",

        // Office
        "doc" => "application/msword",
        "ppt" => "application/vnd.ms-powerpoint",
        "xls" => "application/vnd.ms-excel",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "odt" => "application/vnd.oasis.opendocument.text",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",

        // Image
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",

        // Sound
        "flac" => "audio/flac",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",

        // Movie
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mp4" => "video/mp4",
        "webm" => "video/webm",

        _ => "application/octet-stream",
    }
}

/// Store `contents` as an embedded file and return its new file specification.
///
/// The MIME type is guessed from `filename` when not given. Both objects
/// are created inside one `"Embed file"` operation; if either fails,
/// neither is left behind.
pub fn add_embedded_file<S: ObjectStoreMut + ?Sized>(
    store: &mut S,
    filename: &str,
    mime: Option<&str>,
    contents: &[u8],
) -> Result<ObjRef> {
    let ascii_name: String = filename
        .chars()
        .take(MAX_ASCII_NAME)
        .map(|c| if (' '..='~').contains(&c) { c } else { '_' })
        .collect();
    let mime = mime.unwrap_or_else(|| guess_mime_type_from_file_name(filename));

    let mut op = Operation::begin(store, "Embed file");

    let mut file_dict = Dict::new();
    file_dict.insert(Name::new("Type"), Object::name("EmbeddedFile"));
    file_dict.insert(Name::new("Subtype"), Object::name(mime));
    file_dict.insert(Name::new("Length"), Object::Int(contents.len() as i64));
    let file = op.add_object(Object::Stream {
        dict: file_dict,
        data: contents.to_vec(),
    })?;

    let mut ef = Dict::new();
    ef.insert(Name::new("F"), Object::Ref(file));

    let mut spec = Dict::new();
    spec.insert(Name::new("Type"), Object::name("Filespec"));
    spec.insert(Name::new("F"), Object::String(PdfString::from_text(&ascii_name)));
    spec.insert(Name::new("UF"), Object::String(PdfString::from_text(filename)));
    spec.insert(Name::new("EF"), Object::Dict(ef));
    let filespec = op.add_object(Object::Dict(spec))?;

    op.commit();
    debug!(filename, mime, %filespec, "embedded file");
    Ok(filespec)
}
