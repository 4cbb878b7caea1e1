//! CODE128 line reader
//!
//! Each symbol character is three bars and three spaces spanning eleven
//! modules. A symbol is a start character (A, B or C), data characters, a
//! modulo-103 check character and the stop character followed by a two
//! module termination bar.

use super::{LineHit, LineReader, Run, pattern_variance, widths};
use crate::models::SymbolType;

/// Bar/space module widths for every symbol value; 106 is the stop character
pub(crate) const PATTERNS: [[u8; 6]; 107] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2], [1, 3, 1, 2, 2, 2], [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3], [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1], [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1], [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2], [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1], [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3], [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1], [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1], [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1], [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1], [3, 1, 1, 1, 2, 3], [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2], [1, 2, 1, 1, 2, 4], [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4], [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1], [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1], [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2], [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1], [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1], [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1], [4, 1, 1, 1, 3, 1], [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4], [2, 1, 1, 2, 3, 2], [2, 3, 3, 1, 1, 1],];

const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 106;

const SHIFT: u8 = 98;
const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const FNC1: u8 = 102;

/// ASCII group separator, the conventional expansion of a non-leading FNC1
const GS: u8 = 0x1d;

const MAX_AVG_VARIANCE: f32 = 0.25;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;
/// Light modules required on either side of the symbol
const QUIET_MODULES: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

/// Reads CODE128 symbols from a line's runs
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Code128Reader;

impl LineReader for Code128Reader {
    fn read(&self, runs: &[Run], hits: &mut Vec<LineHit>) {
        let mut i = 1;
        while i + 6 <= runs.len() {
            match read_symbol(runs, i) {
                Some((hit, next)) => {
                    hits.push(hit);
                    i = next;
                }
                None => i += 1,
            }
        }
    }
}

/// Closest pattern among `candidates`, if it is close enough
fn best_match(counts: &[usize; 6], candidates: impl Iterator<Item = u8>) -> Option<u8> {
    let mut best = None;
    let mut best_variance = MAX_AVG_VARIANCE;
    for value in candidates {
        let pattern = &PATTERNS[usize::from(value)];
        let variance = pattern_variance(counts, pattern, MAX_INDIVIDUAL_VARIANCE);
        if variance < best_variance {
            best_variance = variance;
            best = Some(value);
        }
    }
    best
}

/// Try a symbol whose start character begins at run `i`
///
/// Returns the hit and the index of the first run after it.
fn read_symbol(runs: &[Run], i: usize) -> Option<(LineHit, usize)> {
    let first = runs.get(i)?;
    if !first.dark {
        return None;
    }
    let counts: [usize; 6] = widths(runs.get(i..i + 6)?);
    let start = best_match(&counts, START_A..=START_C)?;
    let module = counts.iter().sum::<usize>() as f32 / 11.0;
    let quiet = runs.get(i.checked_sub(1)?)?;
    if (quiet.len as f32) < QUIET_MODULES * module {
        return None;
    }

    let mut values = vec![start];
    let mut j = i + 6;
    let end = loop {
        let counts: [usize; 6] = widths(runs.get(j..j + 6)?);
        let value = best_match(&counts, (0..=FNC1).chain([STOP]))?;
        if value == STOP {
            let bar = runs.get(j + 6)?;
            if !bar.dark {
                return None;
            }
            if let Some(after) = runs.get(j + 7) {
                if (after.len as f32) < QUIET_MODULES * module {
                    return None;
                }
            }
            break bar.end();
        }
        values.push(value);
        j += 6;
    };

    let (&check, body) = values.split_last()?;
    if body.len() < 2 || checksum(body) != check {
        return None;
    }
    let payload = decode_values(body)?;
    Some((
        LineHit {
            symbol_type: SymbolType::Code128,
            payload,
            start: first.start,
            end,
        },
        j + 7,
    ))
}

/// Start value plus position-weighted data values, modulo 103
fn checksum(body: &[u8]) -> u8 {
    let sum = body
        .iter()
        .enumerate()
        .map(|(pos, &v)| u32::from(v) * (pos as u32).max(1))
        .sum::<u32>();
    (sum % 103) as u8
}

/// Translate a start value and data values into payload bytes
fn decode_values(body: &[u8]) -> Option<Vec<u8>> {
    let (&start, data) = body.split_first()?;
    let mut set = match start {
        START_A => CodeSet::A,
        START_B => CodeSet::B,
        START_C => CodeSet::C,
        _ => return None,
    };
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut shifted = false;
    let mut fnc4 = false;

    for (pos, &value) in data.iter().enumerate() {
        let active = match (shifted, set) {
            (true, CodeSet::A) => CodeSet::B,
            (true, CodeSet::B) => CodeSet::A,
            (_, current) => current,
        };
        shifted = false;

        if value == FNC1 {
            if pos > 0 {
                out.push(GS);
            }
            continue;
        }

        match active {
            CodeSet::C => match value {
                0..=99 => {
                    out.push(b'0' + value / 10);
                    out.push(b'0' + value % 10);
                }
                CODE_B => set = CodeSet::B,
                CODE_A => set = CodeSet::A,
                _ => return None,
            },
            CodeSet::A | CodeSet::B => match value {
                0..=95 => {
                    let base = match active {
                        CodeSet::A if value >= 64 => value - 64,
                        _ => value + 32,
                    };
                    out.push(if fnc4 { base | 0x80 } else { base });
                    fnc4 = false;
                }
                // FNC3 and FNC2 carry no data
                96 | 97 => {}
                SHIFT => shifted = true,
                CODE_C => set = CodeSet::C,
                CODE_B if active == CodeSet::A => set = CodeSet::B,
                CODE_A if active == CodeSet::B => set = CodeSet::A,
                // The set's own code is FNC4
                CODE_A | CODE_B => fnc4 = true,
                _ => return None,
            },
        }
    }
    Some(out)
}

/// Module widths of a whole symbol, starting with its first bar
///
/// Digit strings of even length use code set C; anything else printable
/// ASCII uses set B. Other input is not encodable here.
pub(crate) fn encode(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let all_digit_pairs =
        !bytes.is_empty() && bytes.len() % 2 == 0 && bytes.iter().all(u8::is_ascii_digit);
    let mut values = if all_digit_pairs {
        let mut v = vec![START_C];
        v.extend(bytes.chunks(2).map(|pair| (pair[0] - b'0') * 10 + (pair[1] - b'0')));
        v
    } else if !bytes.is_empty() && bytes.iter().all(|b| (32..128).contains(b)) {
        let mut v = vec![START_B];
        v.extend(bytes.iter().map(|b| b - 32));
        v
    } else {
        return None;
    };
    values.push(checksum(&values));

    let mut modules: Vec<u8> = values
        .iter()
        .flat_map(|&v| PATTERNS[usize::from(v)])
        .collect();
    modules.extend_from_slice(&PATTERNS[usize::from(STOP)]);
    modules.push(2);
    Some(modules)
}
