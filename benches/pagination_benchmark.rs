use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tui_ideas_app::internal::controller::ListController;
use tui_ideas_app::internal::location::MemoryLocation;
use tui_ideas_app::internal::prefs::{MemoryPreferenceStore, Preferences};
use tui_ideas_app::internal::query::ListQuery;
use tui_ideas_app::utils::datetime::format_published_at;

fn bench_query_parsing(c: &mut Criterion) {
    let prefs = Preferences {
        page_size: Some(20),
        sort: Some("published_at".to_string()),
    };

    c.bench_function("from_search full", |b| {
        b.iter(|| {
            ListQuery::from_search(
                black_box("?page=123&pageSize=50&sort=-published_at"),
                &prefs,
            )
        })
    });

    c.bench_function("from_search fallback chain", |b| {
        b.iter(|| ListQuery::from_search(black_box("?page=abc&pageSize=999&sort=bogus"), &prefs))
    });
}

fn bench_page_window(c: &mut Criterion) {
    let mut controller = ListController::new(
        Box::new(MemoryLocation::new("?page=500")),
        Box::new(MemoryPreferenceStore::default()),
    );
    let seq = controller.begin_fetch();
    controller.complete_fetch(seq, vec![], 1_000_000);

    c.bench_function("page_window mid-range", |b| {
        b.iter(|| black_box(&controller).page_window())
    });
}

fn bench_date_formatting(c: &mut Criterion) {
    c.bench_function("format_published_at", |b| {
        b.iter(|| format_published_at(black_box("2023-01-05 10:00:00")))
    });
}

criterion_group!(
    benches,
    bench_query_parsing,
    bench_page_window,
    bench_date_formatting
);
criterion_main!(benches);
