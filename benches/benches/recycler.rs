// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::convert::Infallible;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::Point;
use understory_recycler::{
    BoundaryPolicy, CountChange, ItemHost, ItemSizing, ItemView, RecyclerList, RecyclerParams,
    ViewHandle, ViewParent,
};

#[derive(Default)]
struct Row {
    size: f64,
}

impl ViewHandle for Row {
    fn size(&self) -> f64 {
        self.size
    }

    fn set_offset_and_size(&mut self, offset: f64, size: f64) {
        black_box(offset);
        self.size = size;
    }

    fn set_enabled(&mut self, _enabled: bool) {}

    fn set_parent(&mut self, _parent: ViewParent) {}
}

struct Rows;

impl ItemHost for Rows {
    type View = Row;
    type Error = Infallible;

    fn create_item(&mut self, _item_index: usize) -> Row {
        Row::default()
    }

    fn bind_item(&mut self, view: &mut ItemView<Row>) -> ItemSizing {
        black_box(view.item_index());
        ItemSizing::Known
    }
}

fn list(looping: bool) -> RecyclerList<Rows> {
    let params = RecyclerParams::default()
        .with_default_item_size(24.0)
        .with_looping(looping);
    let mut list = RecyclerList::new(Rows, params).expect("valid params");
    list.reset(100_000, CountChange::default()).expect("reset");
    list.set_viewport_size(800.0).expect("viewport");
    list
}

fn bench_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("recycler/scroll");

    group.bench_function("drag_by_fling_frames", |b| {
        let mut list = list(false);
        let mut direction = -1.0;
        b.iter(|| {
            let applied = list
                .drag_by(direction * 37.0, BoundaryPolicy::Disallow)
                .expect("drag");
            if applied == 0.0 {
                direction = -direction;
            }
            black_box(list.first_visible_item())
        });
    });

    group.bench_function("drag_by_looping", |b| {
        let mut list = list(true);
        b.iter(|| {
            list.drag_by(-37.0, BoundaryPolicy::Allow).expect("drag");
            black_box(list.first_visible_item())
        });
    });

    group.bench_function("pointer_drag_then_fling", |b| {
        let mut list = list(true);
        let mut time = 0.0;
        b.iter(|| {
            list.begin_drag(Point::new(0.0, 400.0), time).expect("begin");
            for step in 1..=8 {
                time += 0.016;
                let y = 400.0 - 30.0 * f64::from(step);
                list.drag_to(Point::new(0.0, y), time).expect("drag");
            }
            list.end_drag(time).expect("end");
            for _ in 0..30 {
                time += 0.016;
                list.tick(0.016).expect("tick");
            }
            black_box(list.first_visible_item())
        });
    });

    group.bench_function("scroll_to_item_far", |b| {
        let mut list = list(false);
        let mut target = 0_usize;
        b.iter(|| {
            target = (target + 33_331) % 100_000;
            list.scroll_to_item(target, 0.5, 0.5).expect("scroll");
            black_box(list.first_visible_item())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_scroll);
criterion_main!(benches);
