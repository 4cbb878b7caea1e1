//! EAN-13 and UPC-A line reader
//!
//! Layout: 1:1:1 start guard, six left digits, a 1:1:1:1:1 centre guard,
//! six right digits and a 1:1:1 end guard. Each digit spans seven modules in
//! four elements. Left digits use odd (L) or even (G) parity and the parity
//! sequence encodes the leading, thirteenth digit.

use super::{LineHit, LineReader, Run, pattern_variance, widths};
use crate::models::SymbolType;

/// L-code (odd parity) widths, space first; R-codes share them bar first
const L_PATTERNS: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

/// G-code (even parity) widths: the L widths mirrored
const G_PATTERNS: [[u8; 4]; 10] = [
    [1, 1, 2, 3],
    [1, 2, 2, 2],
    [2, 2, 1, 2],
    [1, 1, 4, 1],
    [2, 3, 1, 1],
    [1, 3, 2, 1],
    [4, 1, 1, 1],
    [2, 1, 3, 1],
    [3, 1, 2, 1],
    [2, 1, 1, 3],
];

/// Parity of the six left digits for each leading digit, first digit in
/// the high bit, 1 = G
const FIRST_DIGIT_PARITY: [u8; 10] = [0x00, 0x0b, 0x0d, 0x0e, 0x13, 0x19, 0x1c, 0x15, 0x16, 0x1a];

const MAX_AVG_VARIANCE: f32 = 0.48;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;
const GUARD_MAX_VARIANCE: f32 = 0.3;
const GUARD_MAX_INDIVIDUAL: f32 = 0.5;
/// Light modules required before the start guard
const QUIET_MODULES: f32 = 3.0;

/// Runs from the first bar of the start guard to the last bar of the end guard
const SYMBOL_RUNS: usize = 3 + 6 * 4 + 5 + 6 * 4 + 3;

/// Reads EAN-13 symbols, reporting UPC-A for a leading zero
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Ean13Reader;

impl LineReader for Ean13Reader {
    fn read(&self, runs: &[Run], hits: &mut Vec<LineHit>) {
        let mut i = 1;
        while i + SYMBOL_RUNS <= runs.len() {
            match read_symbol(runs, i) {
                Some(hit) => {
                    hits.push(hit);
                    i += SYMBOL_RUNS;
                }
                None => i += 1,
            }
        }
    }
}

fn is_guard(runs: &[Run]) -> bool {
    let counts: Vec<usize> = runs.iter().map(|r| r.len).collect();
    let ones = [1u8; 5];
    pattern_variance(&counts, &ones[..counts.len()], GUARD_MAX_INDIVIDUAL) < GUARD_MAX_VARIANCE
}

/// Best digit for four element widths; the flag is true for G parity
fn match_digit(counts: &[usize; 4], with_g: bool) -> Option<(u8, bool)> {
    let mut best = None;
    let mut best_variance = MAX_AVG_VARIANCE;
    let tables: &[(&[[u8; 4]; 10], bool)] = if with_g {
        &[(&L_PATTERNS, false), (&G_PATTERNS, true)]
    } else {
        &[(&L_PATTERNS, false)]
    };
    for &(table, parity) in tables {
        for (digit, pattern) in table.iter().enumerate() {
            let variance = pattern_variance(counts, pattern, MAX_INDIVIDUAL_VARIANCE);
            if variance < best_variance {
                best_variance = variance;
                best = Some((digit as u8, parity));
            }
        }
    }
    best
}

fn read_symbol(runs: &[Run], i: usize) -> Option<LineHit> {
    let runs_here = runs.get(i..i + SYMBOL_RUNS)?;
    if !runs_here[0].dark || !is_guard(&runs_here[..3]) {
        return None;
    }
    let module = runs_here[..3].iter().map(|r| r.len).sum::<usize>() as f32 / 3.0;
    let quiet = runs.get(i.checked_sub(1)?)?;
    if (quiet.len as f32) < QUIET_MODULES * module {
        return None;
    }

    let mut digits = [0u8; 13];
    let mut parity = 0u8;
    let mut j = 3;
    for slot in &mut digits[1..7] {
        let (digit, g) = match_digit(&widths(&runs_here[j..j + 4]), true)?;
        *slot = digit;
        parity = (parity << 1) | u8::from(g);
        j += 4;
    }
    if !is_guard(&runs_here[j..j + 5]) {
        return None;
    }
    j += 5;
    for slot in &mut digits[7..] {
        let (digit, _) = match_digit(&widths(&runs_here[j..j + 4]), false)?;
        *slot = digit;
        j += 4;
    }
    if !is_guard(&runs_here[j..j + 3]) {
        return None;
    }

    digits[0] = FIRST_DIGIT_PARITY.iter().position(|&p| p == parity)? as u8;
    if check_digit(&digits[..12]) != digits[12] {
        return None;
    }

    let (symbol_type, shown) = if digits[0] == 0 {
        (SymbolType::UpcA, &digits[1..])
    } else {
        (SymbolType::Ean13, &digits[..])
    };
    Some(LineHit {
        symbol_type,
        payload: shown.iter().map(|d| b'0' + d).collect(),
        start: runs_here[0].start,
        end: runs_here[SYMBOL_RUNS - 1].end(),
    })
}

/// Mod-10 check digit over the first twelve digits, weights 1, 3, 1, ...
fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Module widths of a whole symbol, starting with the first guard bar
///
/// Twelve digits get their check digit appended; thirteen are painted as
/// given, check digit included, so a wrong one can be produced on purpose.
pub(crate) fn encode(text: &str) -> Option<Vec<u8>> {
    let mut digits: Vec<u8> = text
        .bytes()
        .map(|b| b.is_ascii_digit().then(|| b - b'0'))
        .collect::<Option<_>>()?;
    match digits.len() {
        12 => digits.push(check_digit(&digits)),
        13 => {}
        _ => return None,
    }

    let parity = FIRST_DIGIT_PARITY[usize::from(digits[0])];
    let mut modules = vec![1, 1, 1];
    for (k, &d) in digits[1..7].iter().enumerate() {
        let table = if (parity >> (5 - k)) & 1 == 1 { &G_PATTERNS } else { &L_PATTERNS };
        modules.extend_from_slice(&table[usize::from(d)]);
    }
    modules.extend_from_slice(&[1, 1, 1, 1, 1]);
    for &d in &digits[7..] {
        modules.extend_from_slice(&L_PATTERNS[usize::from(d)]);
    }
    modules.extend_from_slice(&[1, 1, 1]);
    Some(modules)
}

#[cfg(test)]
mod tests {
    use super::super::code128;
    use super::super::tests_support::runs_from_modules;
    use super::*;

    fn read(modules: &[u8], unit: usize) -> Vec<LineHit> {
        let runs = runs_from_modules(modules, unit, 9);
        let mut hits = Vec::new();
        Ean13Reader.read(&runs, &mut hits);
        hits
    }

    #[test]
    fn test_g_is_mirrored_l() {
        for (l, g) in L_PATTERNS.iter().zip(&G_PATTERNS) {
            let mut mirrored = *l;
            mirrored.reverse();
            assert_eq!(&mirrored, g);
        }
    }

    #[test]
    fn test_reads_ean13() {
        let modules = encode("4006381333931").unwrap();
        assert_eq!(modules.iter().map(|&m| usize::from(m)).sum::<usize>(), 95);

        let hits = read(&modules, 2);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol_type, SymbolType::Ean13);
        assert_eq!(hits[0].payload, b"4006381333931");
        assert_eq!((hits[0].start, hits[0].end), (18, 18 + 190));
    }

    #[test]
    fn test_leading_zero_is_upca() {
        let hits = read(&encode("003600029145").unwrap(), 3);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol_type, SymbolType::UpcA);
        assert_eq!(hits[0].payload, b"036000291452");
    }

    #[test]
    fn test_rejects_wrong_check_digit() {
        assert!(read(&encode("4006381333932").unwrap(), 2).is_empty());
    }

    #[test]
    fn test_check_digit() {
        assert_eq!(check_digit(&[4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3]), 1);
        assert_eq!(check_digit(&[0, 0, 3, 6, 0, 0, 0, 2, 9, 1, 4, 5]), 2);
    }

    #[test]
    fn test_ignores_code128() {
        for text in ["I002-00165498", "HELLO-128", "0123456789"] {
            let modules = code128::encode(text).unwrap();
            assert!(read(&modules, 2).is_empty(), "{text}");
        }
    }
}
