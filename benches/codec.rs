//! Encode/decode throughput benchmarks.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use docwire::{Document, FlagMap, Insert, Message, Query, Reply};

fn raw_doc(payload_len: usize) -> Document {
    let total = 4 + payload_len + 1;
    let mut bytes = Vec::with_capacity(total);
    bytes.extend_from_slice(&(total as i32).to_le_bytes());
    bytes.resize(total - 1, 0x61);
    bytes.push(0);
    Document::from_encoded(bytes).unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let query = Message::new(Query::new("bench.collection", raw_doc(64)));
    c.bench_function("encode_query_64b_doc", |b| {
        b.iter(|| black_box(&query).encode().unwrap());
    });

    let insert = Message::new(Insert::new(
        "bench.collection",
        (0..16).map(|_| raw_doc(256)).collect(),
    ));
    c.bench_function("encode_insert_16x256b", |b| {
        b.iter(|| black_box(&insert).encode().unwrap());
    });
}

fn bench_decode(c: &mut Criterion) {
    let reply = Message::new(Reply::new(
        FlagMap::new(),
        42,
        0,
        (0..16).map(|_| raw_doc(256)).collect(),
    ));
    let bytes = reply.encode().unwrap();
    c.bench_function("decode_reply_16x256b", |b| {
        b.iter(|| Message::decode(black_box(&bytes)).unwrap());
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
