extern crate criterion;

use criterion::{criterion_group, criterion_main, Criterion};

use sheetgrab_lib::collect;
use sheetgrab_lib::source::document::HtmlDocument;
use sheetgrab_lib::source::loader::StaticLoader;
use sheetgrab_lib::style::rule::CssRuleEntry;
use sheetgrab_lib::style::sheet::OwnedStyleSheet;
use sheetgrab_lib::ExtractorConfig;
use url::Url;

fn bench_many_rules(c: &mut Criterion) {
    let rules: Vec<CssRuleEntry> = (0..100_000)
        .map(|i| {
            if i % 2 == 0 {
                CssRuleEntry::text(format!(".c{}{{color:red}}", i))
            } else {
                CssRuleEntry::declared(format!(".c{}", i), "color:blue")
            }
        })
        .collect();
    let sheets = vec![OwnedStyleSheet::inline(rules)];

    c.bench_function("collect_many_rules", |b| b.iter(|| collect(&sheets)));
}

fn bench_many_style_elements(c: &mut Criterion) {
    let mut big_html = String::with_capacity(1_000_000);
    big_html.push_str("<html><head>");
    for i in 0..5_000 {
        big_html.push_str(&format!("<style>.s{} {{ margin: {}px }}</style>", i, i));
    }
    big_html.push_str("</head><body></body></html>");

    let url = Url::parse("https://example.com/").unwrap();
    let loader = StaticLoader::new();
    let config = ExtractorConfig::default();

    c.bench_function("load_and_collect_style_elements", |b| {
        b.iter(|| {
            let document = HtmlDocument::from_html(&big_html, &url, &loader, &config);
            collect(&document)
        })
    });
}

criterion_group!(benches, bench_many_rules, bench_many_style_elements);
criterion_main!(benches);
