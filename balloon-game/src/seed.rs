//! Share codes with a 64-word list.
//! Code format: <MODE>-<WORD><NN>, e.g., RN-HELIUM42, FX-CONFETI07
//!
//! Only 6400 seeds per mode have a code. [`canonical_share_code`] maps any
//! other seed onto one of them; sessions play the canonical seed so that the
//! code they report always replays them.

use crate::config::TierBinding;

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// Word list for share codes
pub const WORD_LIST: [&str; 64] = [
    "BALLOON", "POP", "PUMP", "BURST", "FLOAT", "HELIUM", "RIBBON", "STRING", "CONFETI", "PARTY",
    "CIRCUS", "FAIR", "CLOWN", "TICKET", "PRIZE", "BANK", "CASH", "COIN", "TOKEN", "SCORE", "RISK",
    "GAMBLE", "DARE", "BRAVE", "CALM", "STEADY", "TIMID", "GREEDY", "ORACLE", "LUCKY", "CRIMSON",
    "AZURE", "EMERALD", "GOLD", "VIOLET", "ORANGE", "SKY", "CLOUD", "BREEZE", "GUST", "LATEX",
    "MYLAR", "KNOT", "NEEDLE", "PIN", "SQUEAK", "STRETCH", "SWELL", "BLOAT", "PUFF", "INFLATE",
    "AIR", "BUBBLE", "DRIFT", "SOAR", "ROUND", "SEED", "SHARE", "REPLAY", "STREAK", "TIER",
    "CHANCE", "ODDS", "BONUS",
];

const fn mode_tag(binding: TierBinding) -> &'static str {
    match binding {
        TierBinding::Randomized => "RN",
        TierBinding::Fixed => "FX",
    }
}

fn mode_from_tag(tag: &str) -> Option<TierBinding> {
    match tag.to_ascii_uppercase().as_str() {
        "RN" => Some(TierBinding::Randomized),
        "FX" => Some(TierBinding::Fixed),
        _ => None,
    }
}

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & 0x01FF, ((packed >> 9) & 0x7F) as u8)
}

fn compose_seed(binding: TierBinding, word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    // Domain-separated FNV input
    let mut buf = [0u8; 10];
    buf[..6].copy_from_slice(b"BALON-");
    buf[6] = match binding {
        TierBinding::Randomized => b'R',
        TierBinding::Fixed => b'F',
    };
    buf[7] = (packed & 0xFF) as u8;
    buf[8] = (packed >> 8) as u8;
    buf[9] = 0x5A;
    let h = fnv1a64(&buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

fn format_code(binding: TierBinding, word_index: u16, nn: u8) -> String {
    let mode = mode_tag(binding);
    let word = WORD_LIST[usize::from(word_index) % WORD_LIST.len()];
    format!("{mode}-{word}{nn:02}")
}

/// Word index and number for a seed that is already code-composed under `binding`.
fn composed_parts(binding: TierBinding, seed: u64) -> Option<(u16, u8)> {
    let (wi, nn) = unpack((seed & 0xFFFF) as u16);
    (usize::from(wi) < WORD_LIST.len() && nn < 100 && compose_seed(binding, wi, nn) == seed)
        .then_some((wi, nn))
}

/// Word index and number selected by arbitrary entropy.
fn entropy_parts(entropy: u64) -> (u16, u8) {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    (wi, nn)
}

/// Share code for `seed`: the seed itself when it is code-composed, otherwise
/// the code its bits select. `decode_to_seed(&share.code)` always yields `share.seed`.
#[must_use]
pub fn canonical_share_code(binding: TierBinding, seed: u64) -> ShareCode {
    let (wi, nn) = composed_parts(binding, seed).unwrap_or_else(|| entropy_parts(seed));
    ShareCode {
        binding,
        seed: compose_seed(binding, wi, nn),
        code: format_code(binding, wi, nn),
    }
}

/// Render a seed as a share code; see [`canonical_share_code`].
#[must_use]
pub fn encode_friendly(binding: TierBinding, seed: u64) -> String {
    canonical_share_code(binding, seed).code
}

/// Decode a share code back into its binding mode and session seed.
#[must_use]
pub fn decode_to_seed(code: &str) -> Option<(TierBinding, u64)> {
    let s = code.trim();
    let (m, rest) = s.split_once('-')?;
    let binding = mode_from_tag(m)?;
    if rest.len() < 3 || !rest.is_ascii() {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some((binding, compose_seed(binding, wi, nn)))
}

#[must_use]
pub fn generate_code_from_entropy(binding: TierBinding, entropy: u64) -> String {
    let (wi, nn) = entropy_parts(entropy);
    format_code(binding, wi, nn)
}

/// A decoded share code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareCode {
    pub binding: TierBinding,
    pub seed: u64,
    /// Canonical upper-case spelling.
    pub code: String,
}

/// Parse a share code into its binding mode, seed and canonical spelling.
#[must_use]
pub fn parse_share_code(code: &str) -> Option<ShareCode> {
    decode_to_seed(code).map(|(binding, seed)| ShareCode {
        binding,
        seed,
        code: encode_friendly(binding, seed),
    })
}
