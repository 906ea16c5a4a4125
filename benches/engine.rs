use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pedigree_rs_renderer::config::{Config, LayoutConfig};
use pedigree_rs_renderer::editing::{self, RelativeKind};
use pedigree_rs_renderer::layout::{LayoutSlot, LayoutTable, Side};
use pedigree_rs_renderer::render::{render_svg, RenderOptions};
use pedigree_rs_renderer::session::PedigreeSession;
use pedigree_rs_renderer::surface::NullSurface;
use std::hint::black_box;

fn widened_table(extra_per_side: usize) -> LayoutTable {
    let mut table = LayoutTable::starter(LayoutConfig::default());
    for index in 0..extra_per_side {
        table.unshift(2, LayoutSlot::individual(&format!("left {index}"), 0.0, 320.0));
        table.push(2, LayoutSlot::individual(&format!("right {index}"), 0.0, 320.0));
    }
    table
}

fn session_with_generations(sibling_pairs: usize) -> PedigreeSession {
    let mut session = PedigreeSession::new(LayoutConfig::default());
    let mut surface = NullSurface;
    session.select_node("proband");
    session.update_palette(RelativeKind::MaleSpouse, 1);
    session.submit_palette(&mut surface);
    for _ in 0..sibling_pairs {
        session.select_node("father");
        session.update_palette(RelativeKind::Brother, 1);
        session.update_palette(RelativeKind::Sister, 1);
        session.submit_palette(&mut surface);

        session.select_node("proband");
        session.update_palette(RelativeKind::Daughter, 1);
        session.submit_palette(&mut surface);
    }
    session
}

fn bench_recalculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("recalculate_level");
    for width in [8usize, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, width| {
            let table = widened_table(*width);
            b.iter(|| {
                let mut table = table.clone();
                black_box(table.recalculate_level(2, "left 0", Side::Left))
            });
        });
    }
    group.finish();
}

fn bench_editing_storm(c: &mut Criterion) {
    let mut group = c.benchmark_group("editing_storm");
    for rounds in [4usize, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(rounds), &rounds, |b, rounds| {
            b.iter(|| black_box(session_with_generations(*rounds)));
        });
    }
    group.finish();
}

fn bench_deletion_cascade(c: &mut Criterion) {
    let session = session_with_generations(16);
    c.bench_function("deletion_cascade", |b| {
        b.iter(|| black_box(editing::deletion_plan(&session.graph, "father's father")));
    });
}

fn bench_render(c: &mut Criterion) {
    let config = Config::default();
    let options = RenderOptions::default();
    let small = PedigreeSession::new(LayoutConfig::default());
    let large = session_with_generations(16);
    c.bench_function("render_svg_starter", |b| {
        b.iter(|| black_box(render_svg(&small.graph, &config, &options)));
    });
    c.bench_function("render_svg_wide", |b| {
        b.iter(|| black_box(render_svg(&large.graph, &config, &options)));
    });
}

criterion_group!(
    benches,
    bench_recalculation,
    bench_editing_storm,
    bench_deletion_cascade,
    bench_render
);
criterion_main!(benches);
