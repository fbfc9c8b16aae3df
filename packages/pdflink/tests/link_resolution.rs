//! Link resolution tests against a complete JSON document
//!
//! The fixture has three pages. The first carries one annotation of every
//! interesting kind, the second is rotated, the third is empty.

use pdflink::config::{LinkOptions, PlatformProfile};
use pdflink::fitz::error::Error;
use pdflink::fitz::geometry::{Matrix, Rect};
use pdflink::fitz::link::LinkList;
use pdflink::pdf::link::{LinkResolver, LinkTarget};
use pdflink::pdf::memory::MemoryStore;
use pdflink::pdf::object::{ObjRef, Object};

const LINKS: &str = include_str!("fixtures/links.json");

fn load() -> MemoryStore {
    MemoryStore::from_json(LINKS).expect("fixture parses")
}

fn posix(doc: &MemoryStore) -> LinkResolver<'_, MemoryStore> {
    LinkResolver::with_options(doc, LinkOptions::for_platform(PlatformProfile::Posix))
}

fn uris(links: &LinkList) -> String {
    links
        .iter()
        .map(|link| link.uri.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}

mod page_links {
    use super::*;

    #[test]
    fn test_fixture_structure() {
        let doc = load();
        assert_eq!(doc.pages().len(), 3);
        assert_eq!(doc.pages()[1], ObjRef::new(4, 0));
    }

    #[test]
    fn test_first_page_links_in_annotation_order() {
        let doc = load();
        let links = posix(&doc).load_page_links(0).unwrap();
        insta::assert_snapshot!(
            uris(&links),
            @"#page=2&view=Fit | #page=3&view=FitH,92 | https://example.org/manual/guide.html | #page=3 | #page=1&view=Fit | file:///home/user/report.pdf#page=3"
        );
    }

    #[test]
    fn test_hotspots_in_device_space() {
        let doc = load();
        let links = posix(&doc).load_page_links(0).unwrap();
        assert_eq!(links.first().unwrap().rect, Rect::new(72.0, 72.0, 200.0, 92.0));
        assert_eq!(links.get(1).unwrap().rect, Rect::new(72.0, 172.0, 200.0, 192.0));

        let hit = links.link_at_point(100.0, 180.0).unwrap();
        assert_eq!(hit.uri, "#page=3&view=FitH,92");
        assert!(links.link_at_point(500.0, 20.0).is_none());
    }

    #[test]
    fn test_link_kinds() {
        let doc = load();
        let links = posix(&doc).load_page_links(0).unwrap();

        let external: Vec<_> = links.iter().filter(|l| l.is_external()).collect();
        assert_eq!(external.len(), 2);
        assert_eq!(external[0].scheme(), Some("https"));
        assert_eq!(external[1].scheme(), Some("file"));

        let pages: Vec<_> = links.iter().filter_map(|l| l.page_number()).collect();
        assert_eq!(pages, vec![1, 2, 2, 0]);
    }

    #[test]
    fn test_rotated_page() {
        let doc = load();
        let links = posix(&doc).load_page_links(1).unwrap();
        assert_eq!(links.len(), 1);

        let link = links.first().unwrap();
        assert_eq!(link.uri, "#page=3");
        assert_eq!(link.rect, Rect::new(20.0, 10.0, 60.0, 110.0));
    }

    #[test]
    fn test_page_without_annotations() {
        let doc = load();
        assert!(posix(&doc).load_page_links(2).unwrap().is_empty());
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = load();
        let resolver = posix(&doc);
        assert!(matches!(resolver.load_page_links(3), Err(Error::Argument(_))));
        assert!(matches!(resolver.load_page_links(-1), Err(Error::Argument(_))));
    }
}

mod broken_documents {
    use super::*;

    #[test]
    fn test_damaged_annotation_is_skipped() {
        let mut doc = load();
        doc.mark_damaged(ObjRef::new(16, 0));
        let links = posix(&doc).load_page_links(0).unwrap();
        insta::assert_snapshot!(
            uris(&links),
            @"#page=2&view=Fit | #page=3&view=FitH,92 | https://example.org/manual/guide.html | #page=3 | file:///home/user/report.pdf#page=3"
        );
    }

    #[test]
    fn test_pending_annotation_aborts_page() {
        let mut doc = load();
        doc.mark_pending(ObjRef::new(12, 0));
        let err = posix(&doc).load_page_links(0).unwrap_err();
        assert!(err.is_try_later());

        doc.mark_loaded(ObjRef::new(12, 0));
        assert_eq!(posix(&doc).load_page_links(0).unwrap().len(), 6);
    }

    #[test]
    fn test_pending_destination_tree_aborts_page() {
        let mut doc = load();
        doc.mark_pending(ObjRef::new(21, 0));
        assert!(posix(&doc).load_page_links(0).unwrap_err().is_try_later());
    }

    #[test]
    fn test_annots_not_an_array() {
        let doc = load();
        let resolver = posix(&doc);
        let links = resolver
            .load_link_annots(&Object::name("Annots"), 0, &Matrix::IDENTITY)
            .unwrap();
        assert!(links.is_empty());
    }
}

mod named_destinations {
    use super::*;

    #[test]
    fn test_name_tree_lookup() {
        let doc = load();
        let resolver = posix(&doc);
        let dest = |name: &str| resolver.parse_link_dest(&Object::string(name)).unwrap();

        assert_eq!(dest("intro").as_deref(), Some("#page=1&zoom=150,72,72"));
        assert_eq!(dest("appendix").as_deref(), Some("#page=3&view=Fit"));
        assert_eq!(dest("chapter2").as_deref(), Some("#page=3&view=FitH,92"));
    }

    #[test]
    fn test_name_tree_misses() {
        let doc = load();
        let resolver = posix(&doc);
        // outside every Limits range
        assert_eq!(resolver.parse_link_dest(&Object::string("zebra")).unwrap(), None);
        // inside a range but absent
        assert_eq!(resolver.parse_link_dest(&Object::string("bibliography")).unwrap(), None);
    }

    #[test]
    fn test_cycle_resolves_to_nothing() {
        let doc = load();
        let resolver = posix(&doc);
        assert_eq!(resolver.resolve_link_dest(&Object::string("loop1")).unwrap(), None);
    }

    #[test]
    fn test_decoded_target() {
        let doc = load();
        let target = posix(&doc)
            .resolve_link_dest(&Object::string("intro"))
            .unwrap()
            .unwrap();
        let LinkTarget::Dest(dest) = target else {
            panic!("expected an explicit destination, got {target:?}");
        };
        assert_eq!((dest.location.page, dest.x, dest.y, dest.zoom), (0, 72.0, 72.0, 150.0));
    }
}

mod platforms {
    use super::*;

    #[test]
    fn test_remote_link_on_windows() {
        let doc = load();
        let resolver =
            LinkResolver::with_options(&doc, LinkOptions::for_platform(PlatformProfile::Windows));
        let links = resolver.load_page_links(0).unwrap();
        assert_eq!(
            links.iter().last().map(|l| l.uri.as_str()),
            Some("file://C:/Reports/report.pdf#page=3")
        );
    }

    #[test]
    fn test_options_from_json() {
        let doc = load();
        let options = LinkOptions::from_json(r#"{ "platform": "dos" }"#).unwrap();
        let links = LinkResolver::with_options(&doc, options).load_page_links(0).unwrap();
        assert!(links.iter().any(|l| l.uri.starts_with("file://C:/")));
    }
}
