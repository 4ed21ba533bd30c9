//! Micro-benchmark for the allocate/retain/release hot path, mirroring the
//! teacher crate's own `vm_execution` benchmark shape.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ember_core::boxing::{box_i64, unbox_i64};
use ember_core::composite::tuple_of;
use ember_core::refcount::release;

fn bench_box_unbox(c: &mut Criterion) {
    c.bench_function("box_unbox_i64", |b| {
        b.iter(|| {
            let p = box_i64(black_box(42));
            let v = unsafe { unbox_i64(p) };
            unsafe { release(p) };
            black_box(v)
        })
    });
}

fn bench_tuple_build_and_release(c: &mut Criterion) {
    c.bench_function("tuple_build_and_release", |b| {
        b.iter(|| {
            let a = box_i64(1);
            let bx = box_i64(2);
            let t = tuple_of(&[a, bx]);
            unsafe { release(t) };
        })
    });
}

criterion_group!(benches, bench_box_unbox, bench_tuple_build_and_release);
criterion_main!(benches);
