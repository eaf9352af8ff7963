// Copyright 2022 houseme
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use snowflake_clock::{DEFAULT_EPOCH, Snowflake, decode};

fn bench_next_id(c: &mut Criterion) {
    let sf = Snowflake::new().expect("Could not create Snowflake");
    c.bench_function("next_id", |b| {
        b.iter(|| sf.next_id());
    });
}

fn bench_decode(c: &mut Criterion) {
    let sf = Snowflake::new().expect("Could not create Snowflake");
    let id = sf.next_id().expect("Could not generate id");
    c.bench_function("decode", |b| {
        b.iter(|| decode(black_box(id), DEFAULT_EPOCH));
    });
}

criterion_group!(snowflake_perf, bench_next_id, bench_decode);
criterion_main!(snowflake_perf);
