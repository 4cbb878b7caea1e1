//! Scanline reading for 1D symbologies
//!
//! Every row and every column is thresholded into runs of dark and light
//! pixels and handed to each enabled [`LineReader`], first as read and then
//! reversed. Hits that agree on consecutive lines are merged into tracks;
//! a track's left and right edges become the symbol outline.

pub(crate) mod code128;
pub(crate) mod ean13;

use image::GrayImage;
use log::debug;

use super::ScanOptions;
use crate::models::{BoundingRect, DecodedSymbol, PointI, SymbolType};

/// Lines flatter than this many grey levels are skipped
const MIN_CONTRAST: u8 = 32;

/// Largest gap, in scan steps, bridged when extending a track
const MAX_TRACK_GAP: usize = 8;

/// A maximal stretch of same-coloured pixels along a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run {
    pub start: usize,
    pub len: usize,
    pub dark: bool,
}

impl Run {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A symbol read on one line, covering pixels `start..end` of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineHit {
    pub symbol_type: SymbolType,
    pub payload: Vec<u8>,
    pub start: usize,
    pub end: usize,
}

/// Reads one symbology from the runs of a single line
pub(crate) trait LineReader {
    /// Append every symbol found in `runs` to `hits`
    fn read(&self, runs: &[Run], hits: &mut Vec<LineHit>);
}

/// Threshold a line at the midpoint of its range and split it into runs
///
/// Returns `None` for lines with too little contrast to hold a symbol.
pub(crate) fn runs(line: &[u8]) -> Option<Vec<Run>> {
    let min = *line.iter().min()?;
    let max = *line.iter().max()?;
    if max - min < MIN_CONTRAST {
        return None;
    }
    let threshold = (u16::from(min) + u16::from(max)).div_ceil(2);

    let mut out = Vec::new();
    let mut current = Run {
        start: 0,
        len: 0,
        dark: u16::from(line[0]) < threshold,
    };
    for (i, &v) in line.iter().enumerate() {
        let dark = u16::from(v) < threshold;
        if dark == current.dark {
            current.len += 1;
        } else {
            out.push(current);
            current = Run { start: i, len: 1, dark };
        }
    }
    out.push(current);
    Some(out)
}

/// How far `counts` is from `pattern`, as a fraction of the total width
///
/// Widths are compared after scaling the pattern to the same total. Any
/// element off by more than `max_individual` modules rejects the match with
/// `f32::INFINITY`.
pub(crate) fn pattern_variance(counts: &[usize], pattern: &[u8], max_individual: f32) -> f32 {
    let total: usize = counts.iter().sum();
    let modules: usize = pattern.iter().map(|&p| usize::from(p)).sum();
    if total < modules || modules == 0 {
        return f32::INFINITY;
    }
    let unit = total as f32 / modules as f32;
    let limit = max_individual * unit;

    let mut variance = 0.0;
    for (&count, &expected) in counts.iter().zip(pattern) {
        let deviation = (count as f32 - f32::from(expected) * unit).abs();
        if deviation > limit {
            return f32::INFINITY;
        }
        variance += deviation;
    }
    variance / total as f32
}

pub(crate) fn widths<const N: usize>(runs: &[Run]) -> [usize; N] {
    let mut out = [0; N];
    for (slot, run) in out.iter_mut().zip(runs) {
        *slot = run.len;
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Rows,
    Columns,
}

#[derive(Debug)]
struct Track {
    orientation: Orientation,
    symbol_type: SymbolType,
    payload: Vec<u8>,
    last_line: usize,
    last_span: (usize, usize),
    starts: Vec<PointI>,
    ends: Vec<PointI>,
}

impl Track {
    /// A hit continues this track when it has the same content, overlaps
    /// the last span, and comes within `max_gap` lines of it
    fn accepts(
        &self,
        orientation: Orientation,
        line: usize,
        hit: &LineHit,
        max_gap: usize,
    ) -> bool {
        self.orientation == orientation
            && self.symbol_type == hit.symbol_type
            && self.payload == hit.payload
            && line - self.last_line <= max_gap
            && hit.start < self.last_span.1
            && self.last_span.0 < hit.end
    }

    fn push(&mut self, line: usize, hit: &LineHit) {
        let (first, last) = (hit.start as i32, (hit.end - 1) as i32);
        let line_i = line as i32;
        let (start, end) = match self.orientation {
            Orientation::Rows => (PointI::new(first, line_i), PointI::new(last, line_i)),
            Orientation::Columns => (PointI::new(line_i, first), PointI::new(line_i, last)),
        };
        self.starts.push(start);
        self.ends.push(end);
        self.last_line = line;
        self.last_span = (hit.start, hit.end);
    }

    fn into_symbol(self) -> DecodedSymbol {
        let mut polygon = self.starts;
        polygon.extend(self.ends.into_iter().rev());
        DecodedSymbol::new(self.symbol_type, self.payload, polygon)
    }
}

/// Scan every line of `gray` in both orientations with `readers`
pub(crate) fn scan(
    gray: &GrayImage,
    readers: &[&dyn LineReader],
    options: &ScanOptions,
) -> Vec<DecodedSymbol> {
    if readers.is_empty() {
        return Vec::new();
    }
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    let step = options.line_step.max(1);
    let mut tracks: Vec<Track> = Vec::new();
    let mut line = Vec::with_capacity(width.max(height));

    for orientation in [Orientation::Rows, Orientation::Columns] {
        let (count, length) = match orientation {
            Orientation::Rows => (height, width),
            Orientation::Columns => (width, height),
        };
        for index in (0..count).step_by(step) {
            line.clear();
            match orientation {
                Orientation::Rows => {
                    line.extend((0..width).map(|x| gray.get_pixel(x as u32, index as u32).0[0]))
                }
                Orientation::Columns => {
                    line.extend((0..height).map(|y| gray.get_pixel(index as u32, y as u32).0[0]))
                }
            }
            for hit in read_line(&line, length, readers) {
                match tracks
                    .iter_mut()
                    .rev()
                    .find(|t| t.accepts(orientation, index, &hit, MAX_TRACK_GAP * step))
                {
                    Some(track) if track.last_line == index => {}
                    Some(track) => track.push(index, &hit),
                    None => {
                        let mut track = Track {
                            orientation,
                            symbol_type: hit.symbol_type,
                            payload: hit.payload.clone(),
                            last_line: index,
                            last_span: (hit.start, hit.end),
                            starts: Vec::new(),
                            ends: Vec::new(),
                        };
                        track.push(index, &hit);
                        tracks.push(track);
                    }
                }
            }
        }
    }

    let min_hits = options.min_line_hits.max(1);
    let symbols: Vec<DecodedSymbol> = tracks
        .into_iter()
        .filter(|t| t.starts.len() >= min_hits)
        .map(Track::into_symbol)
        .collect();
    debug!("linear scan kept {} track(s)", symbols.len());
    coalesce(symbols)
}

/// Decode one line forwards and backwards; spans are in forward coordinates
fn read_line(line: &[u8], length: usize, readers: &[&dyn LineReader]) -> Vec<LineHit> {
    let Some(forward) = runs(line) else {
        return Vec::new();
    };
    let mut hits = Vec::new();
    for reader in readers {
        reader.read(&forward, &mut hits);
    }

    let reversed: Vec<Run> = forward
        .iter()
        .rev()
        .map(|r| Run {
            start: length - r.end(),
            len: r.len,
            dark: r.dark,
        })
        .collect();
    let mut backward = Vec::new();
    for reader in readers {
        reader.read(&reversed, &mut backward);
    }
    hits.extend(backward.into_iter().map(|h| LineHit {
        start: length - h.end,
        end: length - h.start,
        ..h
    }));
    hits
}

/// Merge symbols with the same content whose boxes overlap
///
/// A tilted symbol can be read by both rows and columns; it is still one
/// symbol. Two printed symbols with identical type and payload become one
/// record when they touch or sit within `MAX_TRACK_GAP` scan steps of each
/// other along the scan direction, since tracking already joins their
/// lines. Symbols carrying the same data further apart stay separate.
fn coalesce(symbols: Vec<DecodedSymbol>) -> Vec<DecodedSymbol> {
    let mut out: Vec<DecodedSymbol> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let existing = out.iter_mut().find(|s| {
            s.symbol_type == symbol.symbol_type
                && s.payload == symbol.payload
                && overlaps(&s.rect, &symbol.rect)
        });
        match existing {
            Some(s) => {
                s.polygon.extend(symbol.polygon);
                s.rect = BoundingRect::enclosing(&s.polygon);
            }
            None => out.push(symbol),
        }
    }
    out
}

fn overlaps(a: &BoundingRect, b: &BoundingRect) -> bool {
    a.left <= b.right() && b.left <= a.right() && a.top <= b.bottom() && b.top <= a.bottom()
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::Run;

    /// Runs for an ideal symbol: `quiet` light modules, then alternating
    /// dark and light elements, then `quiet` light modules again
    pub(crate) fn runs_from_modules(modules: &[u8], unit: usize, quiet: usize) -> Vec<Run> {
        let mut runs = vec![Run {
            start: 0,
            len: quiet * unit,
            dark: false,
        }];
        let mut pos = quiet * unit;
        for (i, &m) in modules.iter().enumerate() {
            let len = usize::from(m) * unit;
            runs.push(Run {
                start: pos,
                len,
                dark: i % 2 == 0,
            });
            pos += len;
        }
        runs.push(Run {
            start: pos,
            len: quiet * unit,
            dark: false,
        });
        runs
    }
}
