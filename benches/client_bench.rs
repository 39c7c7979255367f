//! Benchmarks for StrataKV client operations over the loopback service

use criterion::{criterion_group, criterion_main, Criterion};

use stratakv::transport::{LoopbackService, LoopbackTransport};
use stratakv::{Client, Condition, Config};

fn client_benchmarks(c: &mut Criterion) {
    let service = LoopbackService::new();
    let mut client = Client::with_transport(
        Box::new(LoopbackTransport::new(service)),
        Config::default(),
    );

    client.create_table("bench").unwrap();
    let table = client.open_table("bench").unwrap();
    let value = vec![0xABu8; 1024];

    c.bench_function("blind_write_1k", |b| {
        b.iter(|| client.write(table, 1, &value, Condition::Unconditional).unwrap())
    });

    client.write(table, 2, &value, Condition::Unconditional).unwrap();
    c.bench_function("read_1k", |b| {
        b.iter(|| client.read(table, 2, Condition::RequireExists).unwrap())
    });

    c.bench_function("versioned_update_1k", |b| {
        let mut version = client.write(table, 3, &value, Condition::Unconditional).unwrap();
        b.iter(|| {
            version = client
                .update(table, 3, &value, Condition::RequireVersion(version))
                .unwrap();
        })
    });
}

criterion_group!(benches, client_benchmarks);
criterion_main!(benches);
