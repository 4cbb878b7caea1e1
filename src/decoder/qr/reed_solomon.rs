//! Reed-Solomon error correction over GF(256), primitive polynomial 0x11d
//!
//! Blocks are stored highest-degree coefficient first, data followed by
//! ECC codewords. The generator's roots are alpha^0 .. alpha^(ecc-1).

const PRIMITIVE: u16 = 0x11d;

const fn build_exp() -> [u8; 512] {
    let mut exp = [0u8; 512];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    while i < 512 {
        exp[i] = exp[i - 255];
        i += 1;
    }
    exp
}

const fn build_log() -> [u8; 256] {
    let exp = build_exp();
    let mut log = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        log[exp[i] as usize] = i as u8;
        i += 1;
    }
    log
}

static EXP: [u8; 512] = build_exp();
static LOG: [u8; 256] = build_log();

fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        0
    } else {
        EXP[usize::from(LOG[usize::from(a)]) + usize::from(LOG[usize::from(b)])]
    }
}

fn div(a: u8, b: u8) -> u8 {
    debug_assert!(b != 0, "division by zero in GF(256)");
    if a == 0 {
        0
    } else {
        EXP[usize::from(LOG[usize::from(a)]) + 255 - usize::from(LOG[usize::from(b)])]
    }
}

/// alpha raised to `e`, for any non-negative `e`
fn alpha_pow(e: usize) -> u8 {
    EXP[e % 255]
}

fn pow(x: u8, e: usize) -> u8 {
    match (x, e) {
        (_, 0) => 1,
        (0, _) => 0,
        _ => EXP[usize::from(LOG[usize::from(x)]) * e % 255],
    }
}

/// Evaluate a polynomial stored lowest-degree first
fn eval_low_first(poly: &[u8], x: u8) -> u8 {
    poly.iter().rev().fold(0, |acc, &c| mul(acc, x) ^ c)
}

fn syndromes(block: &[u8], ecc_len: usize) -> Vec<u8> {
    (0..ecc_len)
        .map(|i| {
            let x = alpha_pow(i);
            block.iter().fold(0, |acc, &c| mul(acc, x) ^ c)
        })
        .collect()
}

/// Error locator polynomial, lowest-degree first, by Berlekamp-Massey
fn error_locator(syndromes: &[u8]) -> Vec<u8> {
    let mut locator = vec![1u8];
    let mut previous = vec![1u8];
    let mut errors = 0usize;
    let mut shift = 1usize;
    let mut last_discrepancy = 1u8;

    for n in 0..syndromes.len() {
        let mut discrepancy = syndromes[n];
        for i in 1..=errors.min(locator.len() - 1) {
            discrepancy ^= mul(locator[i], syndromes[n - i]);
        }
        if discrepancy == 0 {
            shift += 1;
            continue;
        }

        let coef = div(discrepancy, last_discrepancy);
        let snapshot = locator.clone();
        if locator.len() < previous.len() + shift {
            locator.resize(previous.len() + shift, 0);
        }
        for (i, &p) in previous.iter().enumerate() {
            locator[i + shift] ^= mul(coef, p);
        }

        if 2 * errors <= n {
            errors = n + 1 - errors;
            previous = snapshot;
            last_discrepancy = discrepancy;
            shift = 1;
        } else {
            shift += 1;
        }
    }
    locator.resize(errors + 1, 0);
    locator
}

/// Correct `block` in place; returns the number of corrected codewords
///
/// `None` means the block holds more errors than `ecc_len / 2` and was left
/// in an unspecified state.
pub(crate) fn correct(block: &mut [u8], ecc_len: usize) -> Option<usize> {
    let n = block.len();
    if ecc_len == 0 || ecc_len >= n || n > 255 {
        return None;
    }
    let syn = syndromes(block, ecc_len);
    if syn.iter().all(|&s| s == 0) {
        return Some(0);
    }

    let locator = error_locator(&syn);
    let count = locator.len() - 1;
    if count == 0 || count * 2 > ecc_len {
        return None;
    }

    // Chien search: position p holds the coefficient of x^(n-1-p)
    let positions: Vec<usize> = (0..n)
        .filter(|&p| eval_low_first(&locator, alpha_pow(255 - (n - 1 - p))) == 0)
        .collect();
    if positions.len() != count {
        return None;
    }

    // Forney: e = X * omega(X^-1) / locator'(X^-1)
    let mut omega = vec![0u8; ecc_len];
    for (i, &s) in syn.iter().enumerate() {
        for (j, &l) in locator.iter().enumerate().take(ecc_len - i) {
            omega[i + j] ^= mul(s, l);
        }
    }
    for &p in &positions {
        let x = alpha_pow(n - 1 - p);
        let x_inv = div(1, x);
        let numerator = mul(x, eval_low_first(&omega, x_inv));
        let denominator = (1..locator.len())
            .step_by(2)
            .fold(0, |acc, i| acc ^ mul(locator[i], pow(x_inv, i - 1)));
        if denominator == 0 {
            return None;
        }
        block[p] ^= div(numerator, denominator);
    }

    syndromes(block, ecc_len).iter().all(|&s| s == 0).then_some(count)
}
