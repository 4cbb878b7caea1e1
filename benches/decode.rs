use barscan::decoder::qr::decode_matrix;
use barscan::models::BitMatrix;
use barscan::utils::binarization::otsu_binarize;
use barscan::{BoundingRect, PointI, ScanOptions, Scanner, decode, normalize_polygon, synth};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

const QR_V1: [&str; 21] = [
    "#######.....#.#######",
    "#.....#..#....#.....#",
    "#.###.#...##..#.###.#",
    "#.###.#...#...#.###.#",
    "#.###.#..####.#.###.#",
    "#.....#.#.#...#.....#",
    "#######.#.#.#.#######",
    ".........#...........",
    "#..#.##.######.#.....",
    "###.#..##..#.#.#.##..",
    "#..#.####.##..###...#",
    "..#.#..#....#####....",
    "..#...##.#.#.###.##..",
    "........#.#..####.##.",
    "#######...###.#.####.",
    "#.....#.#.....##....#",
    "#.###.#..##.###..#.##",
    "#.###.#.#.#..####..##",
    "#.###.#..###.###.#..#",
    "#.....#..####..##..#.",
    "#######.###..#.###...",
];

fn bench_decode_blank(c: &mut Criterion) {
    let image = synth::blank(640, 480);
    c.bench_function("decode_640x480_blank", |b| b.iter(|| decode(black_box(&image))));
}

fn bench_decode_code128(c: &mut Criterion) {
    let mut image = synth::blank(1920, 1080);
    let modules = synth::code128_modules("I002-00165498").unwrap();
    synth::paint_modules(&mut image, &modules, BoundingRect::new(1200, 800, 477, 73));
    c.bench_function("decode_1920x1080_code128", |b| b.iter(|| decode(black_box(&image))));

    let sparse = Scanner::with_options(ScanOptions {
        line_step: 4,
        qr: false,
        ..ScanOptions::default()
    });
    c.bench_function("decode_1920x1080_code128_step4", |b| {
        b.iter(|| sparse.decode(black_box(&image)))
    });
}

fn bench_decode_qr(c: &mut Criterion) {
    let matrix = BitMatrix::from_ascii(&QR_V1);
    let mut image = synth::blank(640, 480);
    synth::paint_matrix(&mut image, 200, 120, &matrix, 8);
    c.bench_function("decode_640x480_qr_v1", |b| b.iter(|| decode(black_box(&image))));
    c.bench_function("decode_matrix_v1", |b| b.iter(|| decode_matrix(black_box(&matrix))));
}

fn bench_otsu(c: &mut Criterion) {
    let gray = image::GrayImage::from_fn(1920, 1080, |x, y| image::Luma([((x ^ y) & 0xff) as u8]));
    c.bench_function("otsu_binarize_1920x1080", |b| b.iter(|| otsu_binarize(black_box(&gray))));
}

fn bench_normalize(c: &mut Criterion) {
    // A 73-line linear track: two edges of points
    let mut outline: Vec<PointI> = (0..73).map(|y| PointI::new(1498 + (y % 2), 869 + y)).collect();
    outline.extend((0..73).rev().map(|y| PointI::new(1975 - (y % 3), 869 + y)));
    c.bench_function("normalize_polygon_146", |b| {
        b.iter(|| normalize_polygon(black_box(&outline)))
    });
}

criterion_group!(
    benches,
    bench_decode_blank,
    bench_decode_code128,
    bench_decode_qr,
    bench_otsu,
    bench_normalize
);
criterion_main!(benches);
