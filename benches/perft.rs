/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tabla::{analyze_position, perft, Position};

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.sample_size(20);

    let position = Position::STANDARD;

    for depth in 1..=4u32 {
        // Correctness guard: benchmarking a broken generator helps nobody.
        let nodes = perft(&position, depth);
        if depth == 1 {
            assert_eq!(nodes, 36);
        } else if depth == 2 {
            assert_eq!(nodes, 1_244);
        }

        group.throughput(Throughput::Elements(nodes));
        group.bench_with_input(BenchmarkId::new("start", depth), &depth, |b, &depth| {
            b.iter(|| perft(black_box(&position), black_box(depth)));
        });
    }

    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    group.sample_size(10);

    let position = Position::STANDARD;

    for depth in [3u32, 4] {
        group.bench_with_input(BenchmarkId::new("start", depth), &depth, |b, &depth| {
            b.iter(|| analyze_position(black_box(&position), black_box(depth)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_analysis);
criterion_main!(benches);
