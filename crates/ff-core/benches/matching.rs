use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ff_core::{ElementDescriptor, FilterDispatcher, PatternIndex, SettingsStore, Toggles};

fn synthetic_payload(len: usize) -> Vec<u8> {
    let filler = b"\x0a\x12https://i.ytimg.com/vi/xyz/hqdefault.webp\x1a\x04\x08\x01metadata.eml";
    filler.iter().copied().cycle().take(len).collect()
}

fn bench_pattern_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_index");
    let payload = synthetic_payload(16 * 1024);
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for count in [8usize, 128, 1024] {
        let patterns: Vec<String> = (0..count).map(|i| format!("keyword phrase {i:05}")).collect();
        let index = PatternIndex::build(&patterns);
        group.bench_with_input(BenchmarkId::new("miss", count), &index, |b, index| {
            b.iter(|| index.matches(black_box(&payload)))
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let settings = SettingsStore::new(Toggles::all());
    settings.set_keyword_phrases("mr beast\nunboxing\nreaction video");
    let dispatcher = FilterDispatcher::with_default_policies(Arc::new(settings));
    let payload = synthetic_payload(4 * 1024);

    let elements = [
        ElementDescriptor {
            path: "home_video_with_context.eml|c4|thumbnail.eml",
            identifier: None,
            context: "",
            payload: &payload,
        },
        ElementDescriptor {
            path: "reel_channel_bar.eml|c1|shorts_video_action_button.eml",
            identifier: None,
            context: "",
            payload: b"reel_like_button",
        },
        ElementDescriptor {
            path: "section_list.eml|item.eml",
            identifier: Some("rich_item"),
            context: "",
            payload: &payload,
        },
    ];

    c.bench_function("dispatch_mixed", |b| {
        b.iter(|| {
            elements
                .iter()
                .filter(|e| dispatcher.is_filtered(black_box(e)))
                .count()
        })
    });
}

criterion_group!(benches, bench_pattern_index, bench_dispatch);
criterion_main!(benches);
