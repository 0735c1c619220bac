use crust_grid::{GridLayout, Grid, ResultTable, TableQuery};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn envelope(rows: usize) -> ResultTable {
    ResultTable::from_rows((0..rows).map(|idx| {
        let depth = 4.0 + (idx % 51) as f64 * 0.1;
        let flux = 17.0 + (idx / 51 % 3) as f64;
        [idx as f64, 6.0e7 + idx as f64, flux, depth]
    }))
    .unwrap()
}

fn query_bench(c: &mut Criterion) {
    let table = envelope(50_000);
    let grid = Grid::new(GridLayout::Envelope, table.clone()).unwrap();

    c.bench_function("filter_eq_flux", |b| {
        b.iter(|| black_box(TableQuery::new(&table).eq(2, 18.0).rows().unwrap().len()));
    });

    c.bench_function("temperature_flux_at_depth", |b| {
        b.iter(|| black_box(grid.temperature_flux_at(black_box(4.0)).unwrap()));
    });
}

criterion_group!(benches, query_bench);
criterion_main!(benches);
