//! End-to-end scenarios: synthetic images go through load, decode, render
//! and display, and the report lines and decoded boxes are checked.

use std::path::PathBuf;

use barscan::models::BitMatrix;
use barscan::render::Renderer;
use barscan::{
    BoundingRect, Config, Error, PixelBuffer, RenderStyle, SymbolType, Viewer, decode, synth,
};

/// Remembers what it was asked to show instead of opening a window
#[derive(Default)]
struct RecordingViewer {
    shown: Vec<(String, PixelBuffer)>,
}

impl Viewer for RecordingViewer {
    fn show(&mut self, title: &str, image: &PixelBuffer) -> barscan::Result<()> {
        self.shown.push((title.to_string(), image.clone()));
        Ok(())
    }
}

/// Version 1-M QR symbol holding 4376471154038
const QR_4376471154038: [&str; 21] = [
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

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("barscan-it-{}-{name}", std::process::id()))
}

fn save(buffer: &PixelBuffer, name: &str) -> PathBuf {
    let path = scratch(name);
    buffer.save(&path).expect("write test image");
    path
}

fn scenario_a() -> PixelBuffer {
    let mut buffer = synth::blank(2000, 1000);
    let modules = synth::code128_modules("I002-00165498").expect("encodable");
    synth::paint_modules(&mut buffer, &modules, BoundingRect::new(1498, 869, 477, 73));
    buffer
}

fn run(path: PathBuf) -> (barscan::Result<Vec<barscan::DecodedSymbol>>, String, RecordingViewer) {
    let config = Config::new(path);
    let renderer = Renderer::with_font(RenderStyle::default(), None);
    let mut viewer = RecordingViewer::default();
    let mut report = Vec::new();
    let result = barscan::pipeline::run_with(&config, &renderer, &mut viewer, &mut report);
    (result, String::from_utf8(report).expect("report is UTF-8"), viewer)
}

#[test]
fn test_single_code128() {
    let symbols = decode(&scenario_a());
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].payload, b"I002-00165498");
    assert_eq!(symbols[0].symbol_type, SymbolType::Code128);
    assert_eq!(symbols[0].rect, BoundingRect::new(1498, 869, 477, 73));

    let path = save(&scenario_a(), "a.png");
    let (result, report, viewer) = run(path.clone());
    std::fs::remove_file(&path).ok();

    assert_eq!(result.expect("run succeeds").len(), 1);
    assert_eq!(report, "[INFO] Found CODE128 barcode: I002-00165498\n");
    assert_eq!(viewer.shown.len(), 1);
    let (title, shown) = &viewer.shown[0];
    assert_eq!(title, "Decoded results");
    // Outer half of the rectangle stroke, outside the outline
    assert_eq!(shown.get_pixel(1496, 900).0, [255, 0, 0]);
    assert_eq!(shown.get_pixel(1498, 900).0, [0, 0, 255]);
}

#[test]
fn test_blank_image() {
    let blank = synth::blank(320, 240);
    assert!(decode(&blank).is_empty());

    let path = save(&blank, "b.png");
    let (result, report, viewer) = run(path.clone());
    std::fs::remove_file(&path).ok();

    assert!(result.expect("run succeeds").is_empty());
    assert!(report.is_empty());
    assert_eq!(viewer.shown.len(), 1);
    assert_eq!(viewer.shown[0].1, blank);
}

#[test]
fn test_qr_and_code128_together() {
    let mut buffer = synth::blank(640, 480);
    synth::paint_matrix(&mut buffer, 60, 60, &BitMatrix::from_ascii(&QR_4376471154038), 6);
    let modules = synth::code128_modules("SKU-7781").expect("encodable");
    synth::paint_modules(&mut buffer, &modules, BoundingRect::new(80, 340, 360, 60));

    let path = save(&buffer, "c.png");
    let (result, report, _) = run(path.clone());
    std::fs::remove_file(&path).ok();

    let symbols = result.expect("run succeeds");
    assert_eq!(symbols.len(), 2);
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.contains(&"[INFO] Found CODE128 barcode: SKU-7781"));
    assert!(lines.contains(&"[INFO] Found QRCODE barcode: 4376471154038"));
}

#[test]
fn test_ean13_and_upca() {
    let mut buffer = synth::blank(600, 300);
    let ean = synth::ean13_modules("4006381333931").expect("encodable");
    synth::paint_modules(&mut buffer, &ean, BoundingRect::new(40, 40, 189, 80));
    let upc = synth::ean13_modules("003600029145").expect("encodable");
    synth::paint_modules(&mut buffer, &upc, BoundingRect::new(320, 160, 189, 80));

    let mut found: Vec<(SymbolType, String)> = decode(&buffer)
        .into_iter()
        .map(|s| (s.symbol_type, s.text().expect("digits").to_string()))
        .collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            (SymbolType::Ean13, "4006381333931".to_string()),
            (SymbolType::UpcA, "036000291452".to_string()),
        ]
    );
}

#[test]
fn test_decode_is_idempotent() {
    let buffer = scenario_a();
    let key = |b: &PixelBuffer| {
        decode(b)
            .into_iter()
            .map(|s| (s.payload, s.symbol_type, s.rect))
            .collect::<Vec<_>>()
    };
    assert_eq!(key(&buffer), key(&buffer));
}

#[test]
fn test_upside_down_code128() {
    let buffer = image::imageops::rotate180(&scenario_a());
    let symbols = decode(&buffer);
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].payload, b"I002-00165498");
    assert_eq!(symbols[0].rect, BoundingRect::new(2000 - 1 - 1975, 1000 - 1 - 942, 477, 73));
}

#[test]
fn test_missing_image() {
    let path = scratch("nowhere.png");
    let (result, report, viewer) = run(path.clone());
    match result {
        Err(Error::ImageUnavailable { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected ImageUnavailable, got {other:?}"),
    }
    assert!(report.is_empty());
    assert!(viewer.shown.is_empty());
}
