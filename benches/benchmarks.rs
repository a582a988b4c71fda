use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use canister::{create_store, mutation, state, Bindings, BoundStore, Mapping, StoreOptions};

struct CounterRefs {
    count: canister::StateRef<i64>,
    set_count: canister::MutationRef<i64>,
}

impl Bindings for CounterRefs {
    fn mapping(&self) -> Mapping {
        Mapping::new()
            .entry("count", &self.count)
            .entry("SET_COUNT", &self.set_count)
    }
}

fn counter_store() -> BoundStore<CounterRefs> {
    create_store(StoreOptions {
        setup: || {
            let count = state(0i64);
            let set_count = mutation({
                let count = count.clone();
                move |value: i64| count.set(value)
            });
            CounterRefs { count, set_count }
        },
    })
    .unwrap()
}

fn standalone_state_read(c: &mut Criterion) {
    let count = state(42i64);

    c.bench_function("standalone_state_read", |b| {
        b.iter(|| {
            black_box(count.get());
        });
    });
}

fn standalone_state_write(c: &mut Criterion) {
    let count = state(0i64);

    c.bench_function("standalone_state_write", |b| {
        let mut i = 0;
        b.iter(|| {
            count.set(black_box(i));
            i += 1;
        });
    });
}

fn bound_state_read(c: &mut Criterion) {
    let app = counter_store();

    c.bench_function("bound_state_read", |b| {
        b.iter(|| {
            black_box(app.refs().count.get());
        });
    });
}

fn bound_commit(c: &mut Criterion) {
    let app = counter_store();

    c.bench_function("bound_commit", |b| {
        let mut i = 0;
        b.iter(|| {
            app.refs().set_count.call(black_box(i));
            i += 1;
        });
    });
}

criterion_group!(
    benches,
    standalone_state_read,
    standalone_state_write,
    bound_state_read,
    bound_commit,
);
criterion_main!(benches);
