use anyhow::{Context, Result, bail};
use pdflink::config::LinkOptions;
use pdflink::fitz::link::is_external_link;
use pdflink::pdf::file_spec::{embedded_file_type, embedded_files, load_embedded_file};
use pdflink::pdf::link::{LinkResolver, LinkTarget};
use pdflink::pdf::link_uri::{format_link_uri, parse_link_uri};
use pdflink::pdf::memory::MemoryStore;
use pdflink::pdf::object::Object;
use pdflink::pdf::store::ObjectStore;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Load a document in its JSON form
pub fn load_document(path: &Path) -> Result<MemoryStore> {
    let data = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    MemoryStore::from_json(&data).with_context(|| format!("cannot load {}", path.display()))
}

/// Print one line per link: page, hotspot and URI, tab separated.
///
/// `page` is one-based; all pages are listed when it is `None`.
pub fn links<W: Write>(
    out: &mut W,
    doc: &MemoryStore,
    options: LinkOptions,
    page: Option<u32>,
) -> Result<()> {
    let resolver = LinkResolver::with_options(doc, options);
    let pages = match page {
        Some(page) => {
            let index = i32::try_from(page).context("page number too large")? - 1;
            index..index + 1
        }
        None => 0..doc.page_count(),
    };

    for index in pages {
        let links = resolver
            .load_page_links(index)
            .with_context(|| format!("cannot load links of page {}", index + 1))?;
        for link in &links {
            let r = link.rect;
            writeln!(out, "{}\t{},{},{},{}\t{}", index + 1, r.x0, r.y0, r.x1, r.y1, link.uri)?;
        }
    }
    Ok(())
}

/// Resolve a named destination and print its URI, or the decoded
/// destination as JSON.
pub fn decode<W: Write>(
    out: &mut W,
    doc: &MemoryStore,
    options: LinkOptions,
    name: &str,
    json: bool,
) -> Result<()> {
    let resolver = LinkResolver::with_options(doc, options);
    let Some(target) = resolver.resolve_link_dest(&Object::string(name))? else {
        bail!("undefined destination '{name}'");
    };

    match target {
        LinkTarget::Dest(dest) if json => writeln!(out, "{}", serde_json::to_string(&dest)?)?,
        target => writeln!(out, "{}", target.to_uri())?,
    }
    Ok(())
}

/// Rewrite navigation URIs in canonical form; external URIs pass through.
pub fn normalize<W: Write>(out: &mut W, uris: &[String]) -> Result<()> {
    for uri in uris {
        if is_external_link(uri) {
            writeln!(out, "{uri}")?;
        } else {
            writeln!(out, "{}", format_link_uri(&parse_link_uri(uri)))?;
        }
    }
    Ok(())
}

/// List embedded files, optionally extracting them into `extract`.
pub fn files<W: Write>(out: &mut W, doc: &MemoryStore, extract: Option<&Path>) -> Result<()> {
    if let Some(dir) = extract {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }

    for (name, fs_obj) in embedded_files(doc)? {
        let mime = embedded_file_type(doc, fs_obj)?;
        let data = match load_embedded_file(doc, fs_obj) {
            Ok(data) => data,
            Err(e) => {
                warn!(name = %name, error = %e, "skipping embedded file");
                continue;
            }
        };
        writeln!(out, "{name}\t{mime}\t{}", data.len())?;

        if let Some(dir) = extract {
            // never write outside the target directory
            let Some(file_name) = Path::new(&name).file_name() else {
                warn!(name = %name, "embedded file has no usable name");
                continue;
            };
            let target = dir.join(file_name);
            fs::write(&target, &data).with_context(|| format!("cannot write {}", target.display()))?;
            info!(path = %target.display(), "extracted");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdflink::config::PlatformProfile;

    const LINKS: &str = include_str!("../packages/pdflink/tests/fixtures/links.json");

    fn doc() -> MemoryStore {
        MemoryStore::from_json(LINKS).unwrap()
    }

    fn posix() -> LinkOptions {
        LinkOptions::for_platform(PlatformProfile::Posix)
    }

    fn run(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_links_single_page() {
        let doc = doc();
        let text = run(|out| links(out, &doc, posix(), Some(2)));
        assert_eq!(text, "2\t20,10,60,110\t#page=3\n");
    }

    #[test]
    fn test_links_all_pages() {
        let doc = doc();
        let text = run(|out| links(out, &doc, posix(), None));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "1\t72,72,200,92\t#page=2&view=Fit");
        assert!(lines[6].starts_with("2\t"));
    }

    #[test]
    fn test_links_page_out_of_range() {
        let doc = doc();
        let mut out = Vec::new();
        assert!(links(&mut out, &doc, posix(), Some(9)).is_err());
    }

    #[test]
    fn test_decode() {
        let doc = doc();
        let text = run(|out| decode(out, &doc, posix(), "chapter2", false));
        assert_eq!(text, "#page=3&view=FitH,92\n");

        let mut out = Vec::new();
        let err = decode(&mut out, &doc, posix(), "loop1", false).unwrap_err();
        assert_eq!(err.to_string(), "undefined destination 'loop1'");
    }

    #[test]
    fn test_decode_json() {
        let doc = doc();
        let text = run(|out| decode(out, &doc, posix(), "appendix", true));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["location"]["page"], 2);
        assert_eq!(value["dest_type"], "Fit");
    }

    #[test]
    fn test_normalize() {
        let uris = vec![
            "#page=3&view=fith,92.000".to_owned(),
            "#page=0".to_owned(),
            "https://example.com/#page=2".to_owned(),
        ];
        let text = run(|out| normalize(out, &uris));
        insta::assert_snapshot!(text.trim_end().replace('\n', " | "), @"#page=3&view=FitH,92 | #page=1 | https://example.com/#page=2");
    }

    #[test]
    fn test_files_listing() {
        let doc = doc();
        let text = run(|out| files(out, &doc, None));
        assert_eq!(text, "notes.txt\ttext/plain\t5\n");
    }
}
