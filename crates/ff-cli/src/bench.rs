use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use ff_core::{ElementDescriptor, FilterDispatcher, Settings, SettingsStore, Toggles};

use crate::load_settings;

const DEFAULT_SEED: u32 = 0x5eed_1234;
const DEFAULT_PHRASES: &str = "mr beast\nunboxing\nreaction video\nfull movie";

struct BenchElement {
    path: String,
    identifier: Option<String>,
    context: String,
    payload: Vec<u8>,
}

impl BenchElement {
    fn descriptor(&self) -> ElementDescriptor<'_> {
        ElementDescriptor {
            path: &self.path,
            identifier: self.identifier.as_deref(),
            context: &self.context,
            payload: &self.payload,
        }
    }
}

struct BenchResult {
    op_count: usize,
    total_ms: f64,
    avg_us: f64,
    p50_us: f64,
    p95_us: f64,
    p99_us: f64,
    filtered_pct: f64,
}

pub fn run(config: Option<&str>, iterations: usize, threads: usize) -> Result<(), String> {
    println!("============================================================");
    println!("feedfilter Benchmark");
    println!("============================================================");

    let settings = match config {
        Some(_) => load_settings(config)?,
        None => {
            let store = SettingsStore::new(Toggles::all());
            store.set_keyword_phrases(DEFAULT_PHRASES);
            store
        }
    };
    let settings = Arc::new(settings);
    let dispatcher = FilterDispatcher::with_default_policies(settings.clone());

    let elements = generate_elements(1000, DEFAULT_SEED);
    let threads = threads.max(1);

    println!("Warmup...");
    for element in &elements {
        dispatcher.is_filtered(&element.descriptor());
    }

    println!("------------------------------------------------------------");
    println!(
        "Benchmark: {} elements, {} iterations, {} thread(s)",
        elements.len(),
        iterations,
        threads
    );
    println!("------------------------------------------------------------");

    let wall = Instant::now();
    let results = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                let dispatcher = &dispatcher;
                let elements = &elements;
                let settings = &settings;
                scope.spawn(move || {
                    // Worker 0 republishes the phrase list halfway to exercise the rebuild path.
                    let reload_at = (worker == 0).then_some(iterations / 2);
                    run_worker(dispatcher, settings, elements, iterations, reload_at)
                })
            })
            .collect();
        join_workers(handles.into_iter().map(|h| h.join()))
    })?;
    let wall_ms = wall.elapsed().as_secs_f64() * 1000.0;

    for (worker, result) in results.iter().enumerate() {
        println!("{}", format_result(&format!("Worker {worker}"), result));
    }

    let total_ops: usize = results.iter().map(|r| r.op_count).sum();
    println!("============================================================");
    println!("Summary");
    println!("============================================================");
    println!("Wall time:   {:.2}ms", wall_ms);
    println!(
        "Throughput:  {} decisions/sec",
        if wall_ms > 0.0 { (total_ops as f64 / (wall_ms / 1000.0)) as u64 } else { 0 }
    );

    Ok(())
}

fn run_worker(
    dispatcher: &FilterDispatcher,
    settings: &SettingsStore,
    elements: &[BenchElement],
    iterations: usize,
    reload_at: Option<usize>,
) -> BenchResult {
    let mut latencies = Vec::with_capacity(iterations);
    let mut filtered = 0usize;
    let start = Instant::now();

    for i in 0..iterations {
        if reload_at == Some(i) {
            let phrases = settings.keyword_phrases();
            settings.set_keyword_phrases(&phrases);
        }
        let element = &elements[i % elements.len()];
        let op_start = Instant::now();
        if dispatcher.is_filtered(&element.descriptor()) {
            filtered += 1;
        }
        latencies.push(op_start.elapsed().as_secs_f64() * 1_000_000.0);
    }

    let total_ms = start.elapsed().as_secs_f64() * 1000.0;
    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let avg_us = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<f64>() / latencies.len() as f64
    };

    BenchResult {
        op_count: iterations,
        total_ms,
        avg_us,
        p50_us: percentile(&latencies, 0.50),
        p95_us: percentile(&latencies, 0.95),
        p99_us: percentile(&latencies, 0.99),
        filtered_pct: if iterations > 0 {
            filtered as f64 * 100.0 / iterations as f64
        } else {
            0.0
        },
    }
}

/// Collect worker results, failing if any worker panicked.
fn join_workers<T>(joined: impl Iterator<Item = std::thread::Result<T>>) -> Result<Vec<T>, String> {
    joined
        .enumerate()
        .map(|(worker, result)| result.map_err(|_| format!("Worker {worker} panicked")))
        .collect()
}

fn format_result(name: &str, result: &BenchResult) -> String {
    format!(
        "{}:\n  Ops: {}\n  Total: {:.2} ms\n  Avg: {:.2} us\n  P50: {:.2} us\n  P95: {:.2} us\n  P99: {:.2} us\n  Filtered: {:.1}%",
        name,
        result.op_count,
        result.total_ms,
        result.avg_us,
        result.p50_us,
        result.p95_us,
        result.p99_us,
        result.filtered_pct,
    )
}

fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let idx = ((values.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}

fn create_rng(seed: u32) -> impl FnMut() -> f64 {
    let mut state = seed;
    move || {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        (state as f64) / (u32::MAX as f64)
    }
}

fn pick<'a>(items: &[&'a str], rand: &mut impl FnMut() -> f64) -> &'a str {
    let idx = (rand() * items.len() as f64).floor() as usize;
    items[idx.min(items.len() - 1)]
}

fn generate_elements(count: usize, seed: u32) -> Vec<BenchElement> {
    const ROOTS: &[&str] = &[
        "home_video_with_context.eml",
        "search_video_with_context.eml",
        "compact_video.eml",
        "reel_channel_bar.eml",
        "section_list.eml",
        "comment_thread.eml",
        "rich_grid_row.eml",
    ];
    const CHILDREN: &[&str] = &[
        "thumbnail.eml",
        "metadata.eml",
        "shorts_video_action_button.eml",
        "sponsor_button",
        "reel_sound_metadata",
        "comment.eml",
        "video_card.eml",
        "avatar.eml",
    ];
    const IDENTIFIERS: &[&str] = &["", "shelf_header.eml", "inline_shorts", "rich_item", "suggested_action"];
    const PAYLOAD_MARKERS: &[&str] = &[
        "reel_like_button",
        "reel_share_button",
        "/frame0.jpg",
        "/hqdefault.jpg",
        "MR BEAST",
        "weekly vlog",
        "Full Movie",
    ];

    let mut rand = create_rng(seed);
    (0..count)
        .map(|_| {
            let path = format!(
                "{}|{}|{}",
                pick(ROOTS, &mut rand),
                pick(CHILDREN, &mut rand),
                pick(CHILDREN, &mut rand)
            );
            let identifier = Some(pick(IDENTIFIERS, &mut rand).to_string());
            let context = if rand() < 0.5 {
                "horizontalCollectionSwipeProtector=null".to_string()
            } else {
                String::new()
            };

            let mut payload = Vec::with_capacity(2048);
            payload.extend_from_slice(b"\x0a\x17https://i.ytimg.com/vi/");
            while payload.len() < 1536 {
                payload.extend_from_slice(b"\x12\x04\x08\x01\x1a\x0ccodec=vp9;");
            }
            payload.extend_from_slice(pick(PAYLOAD_MARKERS, &mut rand).as_bytes());

            BenchElement {
                path,
                identifier,
                context,
                payload,
            }
        })
        .collect()
}
