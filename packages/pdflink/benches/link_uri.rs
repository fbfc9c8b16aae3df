use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pdflink::fitz::link::{LinkDest, LinkDestType};
use pdflink::pdf::link::LinkResolver;
use pdflink::pdf::link_uri::{format_link_uri, parse_link_uri};
use pdflink::pdf::memory::MemoryStore;
use pdflink::pdf::object::Object;

const LINKS: &str = include_str!("../tests/fixtures/links.json");

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");

    let page = LinkDest::new(0, 41, LinkDestType::XYZ);
    group.bench_function("page", |b| b.iter(|| format_link_uri(black_box(&page))));

    let xyz = LinkDest::xyz(0, 41, 72.0, 540.25, 125.0);
    group.bench_function("xyz", |b| b.iter(|| format_link_uri(black_box(&xyz))));

    let rect = LinkDest::fit_r(0, 3, 72.0, 90.5, 200.0, 100.0);
    group.bench_function("viewrect", |b| b.iter(|| format_link_uri(black_box(&rect))));

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("page", |b| b.iter(|| parse_link_uri(black_box("#page=42"))));
    group.bench_function("zoom", |b| {
        b.iter(|| parse_link_uri(black_box("#page=42&zoom=125,72,540.25")))
    });
    group.bench_function("view", |b| {
        b.iter(|| parse_link_uri(black_box("#page=7&view=FitBH,612")))
    });
    group.bench_function("viewrect", |b| {
        b.iter(|| parse_link_uri(black_box("#page=4&viewrect=72,90.5,200,100")))
    });

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let doc = MemoryStore::from_json(LINKS).expect("fixture parses");
    let resolver = LinkResolver::new(&doc);
    let name = Object::string("intro");

    c.bench_function("resolve/name_tree", |b| {
        b.iter(|| resolver.parse_link_dest(black_box(&name)))
    });
    c.bench_function("resolve/page_links", |b| {
        b.iter(|| resolver.load_page_links(black_box(0)))
    });
}

criterion_group!(benches, bench_format, bench_parse, bench_resolve);
criterion_main!(benches);
