//! Parser hot-path benchmark.

use std::hint::black_box;
use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};

fn parser_benches(c: &mut Criterion) {
    let get = &b"GET /index.html?q=search&page=2 HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\nUser-Agent: bench\r\n\r\n"[..];
    let post = &b"POST /message HTTP/1.1\r\nHost: example.com\r\nContent-Length: 11\r\n\r\nhello world"[..];

    c.bench_function("parse_get", |b| {
        b.iter(|| minihttp::parser::parse(&mut Cursor::new(black_box(get))).unwrap());
    });

    c.bench_function("parse_post", |b| {
        b.iter(|| minihttp::parser::parse(&mut Cursor::new(black_box(post))).unwrap());
    });
}

criterion_group!(parser, parser_benches);
criterion_main!(parser);
