use anyhow::{Context, Result, bail};
use balloon_game::seed::WORD_LIST;
use balloon_game::{ShareCode, TierBinding, encode_friendly, parse_share_code};
use regex::Regex;
use std::collections::HashMap;

const SHARE_CODE_PATTERN: &str = r"^(RN|FX)-[A-Z]+\d{2}$";
const DEFAULT_SEED: u64 = 1337;

/// Detailed seed metadata used for logic and playability analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
    pub source_binding: Option<TierBinding>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: None,
            source_binding: None,
        }
    }

    #[must_use]
    pub fn from_share_code(share: ShareCode) -> Self {
        Self {
            seed: share.seed,
            code: Some(share.code),
            source_binding: Some(share.binding),
        }
    }

    /// Share-code seeds only replay under the binding their code names.
    #[must_use]
    pub fn matches_binding(&self, binding: TierBinding) -> bool {
        self.source_binding.is_none_or(|source| source == binding)
    }

    #[must_use]
    pub fn share_code_for(&self, binding: TierBinding) -> String {
        if let (Some(code), Some(source)) = (&self.code, self.source_binding)
            && source == binding
        {
            return code.clone();
        }
        encode_friendly(binding, self.seed)
    }
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports literal integers, share codes, and the special keywords
/// `all` / `available` which expand to every share-code seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let share_code = Regex::new(SHARE_CODE_PATTERN).context("share code pattern")?;
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("available") {
            request_all = true;
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        let upper = token.to_ascii_uppercase();
        if share_code.is_match(&upper)
            && let Some(share) = parse_share_code(&upper)
        {
            pending.push(SeedInfo::from_share_code(share));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(generate_all_share_code_seeds()?);
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<(u64, u8), usize> = HashMap::new();

    for info in pending {
        let key = (info.seed, binding_tag(info.source_binding));
        if let Some(entry) = index.get(&key).and_then(|&slot| deduped.get_mut(slot)) {
            if entry.code.is_none() && info.code.is_some() {
                *entry = info;
            }
        } else {
            index.insert(key, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }

    Ok(deduped)
}

fn generate_all_share_code_seeds() -> Result<Vec<SeedInfo>> {
    let mut seeds = Vec::with_capacity(WORD_LIST.len() * 100 * 2);

    for word in WORD_LIST {
        for suffix in 0..100 {
            for prefix in ["RN", "FX"] {
                let code = format!("{prefix}-{word}{suffix:02}");
                let share = parse_share_code(&code)
                    .with_context(|| format!("failed to parse share code: {code}"))?;
                seeds.push(SeedInfo::from_share_code(share));
            }
        }
    }

    Ok(seeds)
}

const fn binding_tag(binding: Option<TierBinding>) -> u8 {
    match binding {
        Some(TierBinding::Randomized) => 1,
        Some(TierBinding::Fixed) => 2,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numeric_and_share_code() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "fx-helium42"])).unwrap();
        assert!(seeds.iter().any(|s| s.seed == 42 && s.code.is_none()));
        assert!(seeds.iter().any(|s| s.seed == 7 && s.code.is_none()));
        assert!(seeds.iter().any(|s| {
            s.code.as_deref() == Some("FX-HELIUM42")
                && s.source_binding == Some(TierBinding::Fixed)
        }));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(resolve_seed_inputs(&tokens(&["RN-HELIUM4"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["CL-HELIUM42"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["balloon"])).is_err());
    }

    #[test]
    fn defaults_and_dedups() {
        assert_eq!(
            resolve_seed_inputs(&[]).unwrap(),
            vec![SeedInfo::from_numeric(DEFAULT_SEED)]
        );
        let seeds = resolve_seed_inputs(&tokens(&["5", "5", "RN-POP01", "rn-pop01"])).unwrap();
        assert_eq!(seeds.len(), 2);
    }

    #[test]
    fn share_code_for_prefers_the_source_code() {
        let seeds = resolve_seed_inputs(&tokens(&["RN-HELIUM42"])).unwrap();
        let info = &seeds[0];
        assert_eq!(info.share_code_for(TierBinding::Randomized), "RN-HELIUM42");
        assert!(info.share_code_for(TierBinding::Fixed).starts_with("FX-"));
        assert!(info.matches_binding(TierBinding::Randomized));
        assert!(!info.matches_binding(TierBinding::Fixed));
        assert!(SeedInfo::from_numeric(3).matches_binding(TierBinding::Fixed));
    }

    #[test]
    fn expands_all_share_codes() {
        let seeds = resolve_seed_inputs(&tokens(&["all"])).unwrap();
        assert_eq!(seeds.len(), WORD_LIST.len() * 100 * 2);
        assert!(seeds.iter().all(|s| s.code.is_some()));
    }
}
