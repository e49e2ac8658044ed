use criterion::{criterion_group, criterion_main, Criterion};
use iconforge::codegen::{render_icon_module, DEFAULT_HEADER};
use iconforge::codepoints::{CodepointBase, CodepointTable};
use iconforge::font_import::import_outline;
use iconforge::iconlist::parse_icon_list;
use iconforge::svg_outline::parse_svg;
use std::hint::black_box;

const CHEVRON_SVG: &str = include_str!("../resources/testdata/chevron-double-up.svg");

fn bench_import_outline(c: &mut Criterion) {
    c.bench_function("parse_svg", |b| {
        b.iter(|| black_box(parse_svg(black_box(CHEVRON_SVG))))
    })
    .bench_function("import_outline", |b| {
        let svg = parse_svg(CHEVRON_SVG).unwrap();
        b.iter(|| black_box(import_outline(black_box(&svg), 1000, -200)))
    });
}

fn bench_render(c: &mut Criterion) {
    c.bench_function("render_icon_module", |b| {
        let list: String = (0..500).map(|i| format!("icon-number-{i}\n")).collect();
        let icons = parse_icon_list(&list).unwrap();
        let table = CodepointTable::assign(&icons, CodepointBase::PRIVATE_USE).unwrap();
        b.iter(|| black_box(render_icon_module(black_box(&table), DEFAULT_HEADER)))
    });
}

criterion_group!(benches, bench_import_outline, bench_render);
criterion_main!(benches);
