//! Segment parsing of corrected QR data codewords
//!
//! Every segment is converted to UTF-8 as it is read: Kanji through
//! Shift_JIS, byte segments through the charset of the active ECI.

use std::borrow::Cow;

use encoding_rs::{
    BIG5, EUC_KR, Encoding, GB18030, SHIFT_JIS, UTF_8, UTF_16BE, WINDOWS_1250, WINDOWS_1251,
    WINDOWS_1252, WINDOWS_1256,
};
use log::debug;

const ALPHANUMERIC: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";
const GS: u8 = 0x1d;

/// Decoded content of a symbol
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Payload {
    /// Text of all segments, UTF-8 encoded
    pub bytes: Vec<u8>,
    /// Last ECI designator seen
    pub eci: Option<u32>,
    /// Set when an FNC1 header marks GS1 or industry data
    pub fnc1: bool,
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    fn read(&mut self, bits: usize) -> Option<u32> {
        if bits > 32 || bits > self.remaining() {
            return None;
        }
        let mut value = 0u32;
        for _ in 0..bits {
            let bit = (self.data[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | u32::from(bit);
            self.pos += 1;
        }
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Terminator,
    Numeric,
    Alphanumeric,
    StructuredAppend,
    Byte,
    Fnc1First,
    Eci,
    Kanji,
    Fnc1Second,
}

impl Mode {
    fn from_bits(bits: u32) -> Option<Self> {
        Some(match bits {
            0b0000 => Mode::Terminator,
            0b0001 => Mode::Numeric,
            0b0010 => Mode::Alphanumeric,
            0b0011 => Mode::StructuredAppend,
            0b0100 => Mode::Byte,
            0b0101 => Mode::Fnc1First,
            0b0111 => Mode::Eci,
            0b1000 => Mode::Kanji,
            0b1001 => Mode::Fnc1Second,
            _ => return None,
        })
    }

    /// Width of the character count field
    fn count_bits(self, version: u8) -> usize {
        let group = match version {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match self {
            Mode::Numeric => [10, 12, 14][group],
            Mode::Alphanumeric => [9, 11, 13][group],
            Mode::Byte => [8, 16, 16][group],
            Mode::Kanji => [8, 10, 12][group],
            _ => 0,
        }
    }
}

/// How byte segments are turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
    /// No usable ECI: UTF-8 when valid, else strict Shift_JIS, else ISO-8859-1
    Guess,
    /// ISO-8859-1, one char per byte
    Latin1,
    Encoded(&'static Encoding),
}

impl Charset {
    fn from_eci(designator: u32) -> Self {
        let encoding = match designator {
            1 | 3 | 27 | 170 => return Charset::Latin1,
            // ISO-8859-2 to ISO-8859-16; there is no part 12
            4..=13 | 15..=18 => {
                Encoding::for_label(format!("iso-8859-{}", designator - 2).as_bytes())
            }
            20 => Some(SHIFT_JIS),
            21 => Some(WINDOWS_1250),
            22 => Some(WINDOWS_1251),
            23 => Some(WINDOWS_1252),
            24 => Some(WINDOWS_1256),
            25 => Some(UTF_16BE),
            26 => Some(UTF_8),
            28 => Some(BIG5),
            29 => Some(GB18030),
            30 => Some(EUC_KR),
            _ => None,
        };
        match encoding {
            Some(encoding) => Charset::Encoded(encoding),
            None => {
                debug!("ECI {designator} has no known charset, guessing");
                Charset::Guess
            }
        }
    }

    fn decode<'a>(self, raw: &'a [u8]) -> Cow<'a, str> {
        match self {
            Charset::Guess => {
                if let Ok(text) = std::str::from_utf8(raw) {
                    Cow::Borrowed(text)
                } else if let Some(text) =
                    SHIFT_JIS.decode_without_bom_handling_and_without_replacement(raw)
                {
                    text
                } else {
                    Charset::Latin1.decode(raw)
                }
            }
            Charset::Latin1 => Cow::Owned(raw.iter().map(|&b| char::from(b)).collect()),
            Charset::Encoded(encoding) => encoding.decode_without_bom_handling(raw).0,
        }
    }
}

/// Parse data codewords until a terminator or the end of the stream
pub(crate) fn parse(data: &[u8], version: u8) -> Option<Payload> {
    let mut reader = BitReader::new(data);
    let mut payload = Payload::default();
    let mut charset = Charset::Guess;

    while reader.remaining() >= 4 {
        let mode = Mode::from_bits(reader.read(4)?)?;
        match mode {
            Mode::Terminator => break,
            Mode::StructuredAppend => {
                // Sequence indicator and parity
                let header = reader.read(16)?;
                debug!(
                    "structured append part {} of {}",
                    (header >> 12) + 1,
                    ((header >> 8) & 0xf) + 1
                );
            }
            Mode::Fnc1First => payload.fnc1 = true,
            Mode::Fnc1Second => {
                reader.read(8)?;
                payload.fnc1 = true;
            }
            Mode::Eci => {
                let designator = read_eci(&mut reader)?;
                charset = Charset::from_eci(designator);
                payload.eci = Some(designator);
            }
            Mode::Numeric | Mode::Alphanumeric | Mode::Byte | Mode::Kanji => {
                let count = reader.read(mode.count_bits(version))? as usize;
                match mode {
                    Mode::Numeric => numeric(&mut reader, count, &mut payload.bytes)?,
                    Mode::Alphanumeric => {
                        alphanumeric(&mut reader, count, payload.fnc1, &mut payload.bytes)?
                    }
                    Mode::Byte => {
                        let raw = (0..count)
                            .map(|_| reader.read(8).map(|b| b as u8))
                            .collect::<Option<Vec<u8>>>()?;
                        payload.bytes.extend_from_slice(charset.decode(&raw).as_bytes());
                    }
                    _ => kanji(&mut reader, count, &mut payload.bytes)?,
                }
            }
        }
    }
    Some(payload)
}

fn read_eci(reader: &mut BitReader<'_>) -> Option<u32> {
    let first = reader.read(8)?;
    if first & 0x80 == 0 {
        Some(first & 0x7f)
    } else if first & 0xc0 == 0x80 {
        Some(((first & 0x3f) << 8) | reader.read(8)?)
    } else if first & 0xe0 == 0xc0 {
        Some(((first & 0x1f) << 16) | reader.read(16)?)
    } else {
        None
    }
}

fn numeric(reader: &mut BitReader<'_>, mut count: usize, out: &mut Vec<u8>) -> Option<()> {
    while count > 0 {
        let (digits, bits, limit) = match count {
            1 => (1, 4, 10),
            2 => (2, 7, 100),
            _ => (3, 10, 1000),
        };
        let value = reader.read(bits)?;
        if value >= limit {
            return None;
        }
        let text = format!("{value:0digits$}");
        out.extend_from_slice(text.as_bytes());
        count -= digits;
    }
    Some(())
}

fn alphanumeric(
    reader: &mut BitReader<'_>,
    mut count: usize,
    fnc1: bool,
    out: &mut Vec<u8>,
) -> Option<()> {
    let start = out.len();
    while count >= 2 {
        let value = reader.read(11)? as usize;
        if value >= 45 * 45 {
            return None;
        }
        out.push(ALPHANUMERIC[value / 45]);
        out.push(ALPHANUMERIC[value % 45]);
        count -= 2;
    }
    if count == 1 {
        let value = reader.read(6)? as usize;
        out.push(*ALPHANUMERIC.get(value)?);
    }

    if fnc1 {
        // In FNC1 mode "%" stands for GS and "%%" for a literal percent
        let segment = out.split_off(start);
        let mut iter = segment.into_iter().peekable();
        while let Some(c) = iter.next() {
            if c == b'%' {
                if iter.peek() == Some(&b'%') {
                    iter.next();
                    out.push(b'%');
                } else {
                    out.push(GS);
                }
            } else {
                out.push(c);
            }
        }
    }
    Some(())
}

/// Kanji characters are 13-bit Shift_JIS offsets
fn kanji(reader: &mut BitReader<'_>, count: usize, out: &mut Vec<u8>) -> Option<()> {
    let mut sjis_bytes = Vec::with_capacity(count * 2);
    for _ in 0..count {
        let value = reader.read(13)?;
        let assembled = ((value / 0xc0) << 8) | (value % 0xc0);
        let sjis = if assembled < 0x1f00 {
            assembled + 0x8140
        } else {
            assembled + 0xc140
        };
        sjis_bytes.push((sjis >> 8) as u8);
        sjis_bytes.push(sjis as u8);
    }
    let (text, malformed) = SHIFT_JIS.decode_without_bom_handling(&sjis_bytes);
    if malformed {
        debug!("Kanji segment has characters outside Shift_JIS");
    }
    out.extend_from_slice(text.as_bytes());
    Some(())
}
