use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chisel::eval::chess::{diff, evaluate};
use chisel::games::chess::Chessboard;
use chisel::search::{go, go_with, MoveOrderKind, SearchConfig};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

pub fn search_startpos_bench(c: &mut Criterion) {
    c.bench_function("search 20000 startpos", |b| {
        let mut pos = Chessboard::default();
        b.iter(|| go(&mut pos, black_box(20_000)));
    });
}

pub fn search_kiwipete_bench(c: &mut Criterion) {
    c.bench_function("search 20000 kiwipete", |b| {
        let mut pos = Chessboard::from_fen(KIWIPETE).unwrap();
        b.iter(|| go(&mut pos, black_box(20_000)));
    });
    c.bench_function("search 20000 kiwipete unordered", |b| {
        let mut pos = Chessboard::from_fen(KIWIPETE).unwrap();
        let config = SearchConfig {
            move_order: MoveOrderKind::Unordered,
            ..Default::default()
        };
        b.iter(|| go_with(&mut pos, black_box(20_000), &config));
    });
}

pub fn eval_bench(c: &mut Criterion) {
    let pos = Chessboard::from_fen(KIWIPETE).unwrap();
    c.bench_function("evaluate kiwipete", |b| {
        b.iter(|| evaluate(black_box(&pos)));
    });
    c.bench_function("diff all moves kiwipete", |b| {
        let moves = pos.legal_moves();
        b.iter(|| {
            moves
                .iter()
                .map(|mov| diff(black_box(&pos), mov).mg)
                .sum::<i32>()
        });
    });
}

criterion_group!(
    benches,
    search_startpos_bench,
    search_kiwipete_bench,
    eval_bench
);
criterion_main!(benches);
