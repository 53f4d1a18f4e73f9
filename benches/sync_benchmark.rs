/*!
 * Synchronization Benchmarks
 *
 * MsQueue against crossbeam's SegQueue, BoundedRwLock read/write
 * throughput, and end-to-end server speedup across worker counts
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam_queue::SegQueue;
use feed_server::{BoundedRwLock, MemorySink, MsQueue, Request, Server, ServerConfig};
use std::io::Cursor;
use std::sync::Arc;
use std::thread;

const OPS_PER_THREAD: usize = 10_000;

fn bench_queue_mpmc(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_mpmc");

    for threads in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("ms_queue", threads), &threads, |b, &threads| {
            b.iter(|| {
                let queue = Arc::new(MsQueue::new());
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let queue = queue.clone();
                        thread::spawn(move || {
                            for i in 0..OPS_PER_THREAD {
                                queue.enqueue(i);
                                black_box(queue.dequeue());
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("seg_queue", threads), &threads, |b, &threads| {
            b.iter(|| {
                let queue = Arc::new(SegQueue::new());
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let queue = queue.clone();
                        thread::spawn(move || {
                            for i in 0..OPS_PER_THREAD {
                                queue.push(i);
                                black_box(queue.pop());
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_rwlock_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("rwlock_mix");

    // Percentage of operations that write
    for write_pct in [0usize, 10, 50] {
        group.bench_with_input(
            BenchmarkId::from_parameter(write_pct),
            &write_pct,
            |b, &write_pct| {
                b.iter(|| {
                    let lock = Arc::new(BoundedRwLock::new(0u64));
                    let handles: Vec<_> = (0..4)
                        .map(|_| {
                            let lock = lock.clone();
                            thread::spawn(move || {
                                for i in 0..OPS_PER_THREAD / 10 {
                                    if i % 100 < write_pct {
                                        *lock.write() += 1;
                                    } else {
                                        black_box(*lock.read());
                                    }
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

fn workload(size: i64) -> String {
    let mut out = String::new();
    for i in 0..size {
        let request = if i % 10 == 9 {
            Request::feed(i)
        } else {
            Request::add(i, "benchmark post", ((i * 7919) % size) as f64)
        };
        out.push_str(&request.encode().unwrap());
        out.push('\n');
    }
    out.push_str(&Request::done(size).encode().unwrap());
    out.push('\n');
    out
}

fn bench_server_speedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("server_workers");
    group.sample_size(10);
    let input = workload(2_000);

    for workers in [0usize, 1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            b.iter(|| {
                let server = Server::new(ServerConfig::parallel(workers));
                let sink = MemorySink::new();
                server.run(Cursor::new(input.as_str()), &sink).unwrap();
                black_box(sink.len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_queue_mpmc, bench_rwlock_mix, bench_server_speedup);

criterion_main!(benches);
