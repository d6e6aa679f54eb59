//! Session plan generation: tier binding and balloon order.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, TierBinding, VisualAttribute};
use crate::rng::RandomSource;

/// One attribute bound to one tier for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub attribute: VisualAttribute,
    /// Index into the configured tier list.
    pub tier_index: usize,
}

/// Bijective attribute ↔ tier mapping plus the ordered balloon sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    bindings: Vec<Binding>,
    /// Indices into `bindings`, one per balloon, in play order.
    sequence: Vec<usize>,
}

impl SessionPlan {
    /// Build a plan for the given configuration.
    pub fn from_config<R: RandomSource>(cfg: &GameConfig, rng: &mut R) -> Self {
        build_plan(
            &cfg.palette,
            cfg.tiers.len(),
            cfg.balloon_count,
            cfg.binding,
            rng,
        )
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    #[must_use]
    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    /// Total number of balloons in the session.
    #[must_use]
    pub fn balloon_count(&self) -> u32 {
        u32::try_from(self.sequence.len()).unwrap_or(u32::MAX)
    }

    /// Binding for the balloon at a one-based round index.
    #[must_use]
    pub fn binding_at(&self, index: u32) -> Option<&Binding> {
        let slot = usize::try_from(index.checked_sub(1)?).ok()?;
        let binding_idx = *self.sequence.get(slot)?;
        self.bindings.get(binding_idx)
    }

    #[must_use]
    pub fn binding_for_tier(&self, tier_index: usize) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.tier_index == tier_index)
    }

    #[must_use]
    pub fn binding_for_attribute(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.attribute.name == name)
    }

    /// How many balloons of each binding appear, in binding order.
    #[must_use]
    pub fn occurrences(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.bindings.len()];
        for &idx in &self.sequence {
            if let Some(count) = counts.get_mut(idx) {
                *count += 1;
            }
        }
        counts
    }

    /// Attribute names in play order.
    #[must_use]
    pub fn sequence_names(&self) -> Vec<&str> {
        self.sequence
            .iter()
            .filter_map(|&idx| self.bindings.get(idx))
            .map(|b| b.attribute.name.as_str())
            .collect()
    }
}

/// Build the binding and play order for one session.
///
/// Every chosen attribute appears at least `balloon_count / tier_count` times;
/// the remainder is drawn with replacement, then the whole sequence is shuffled.
pub fn build_plan<R: RandomSource>(
    palette: &[VisualAttribute],
    tier_count: usize,
    balloon_count: u32,
    binding: TierBinding,
    rng: &mut R,
) -> SessionPlan {
    let bindings = bind_attributes(palette, tier_count, binding, rng);
    let sequence = build_sequence(bindings.len(), balloon_count, rng);
    let plan = SessionPlan { bindings, sequence };
    log::debug!(
        "attribute binding: {:?}",
        plan.bindings
            .iter()
            .map(|b| (b.attribute.name.as_str(), b.tier_index))
            .collect::<Vec<_>>()
    );
    log::debug!("balloon sequence: {:?}", plan.sequence_names());
    plan
}

fn bind_attributes<R: RandomSource>(
    palette: &[VisualAttribute],
    tier_count: usize,
    binding: TierBinding,
    rng: &mut R,
) -> Vec<Binding> {
    let count = tier_count.min(palette.len());
    let mut colors: Vec<usize> = (0..palette.len()).collect();
    let mut tiers: Vec<usize> = (0..count).collect();
    if binding == TierBinding::Randomized {
        rng.shuffle(&mut colors);
        rng.shuffle(&mut tiers);
    }
    colors
        .into_iter()
        .take(count)
        .zip(tiers)
        .map(|(color, tier_index)| Binding {
            attribute: palette[color].clone(),
            tier_index,
        })
        .collect()
}

fn build_sequence<R: RandomSource>(
    attribute_count: usize,
    balloon_count: u32,
    rng: &mut R,
) -> Vec<usize> {
    let Ok(n) = u32::try_from(attribute_count) else {
        return Vec::new();
    };
    if n == 0 {
        return Vec::new();
    }
    let base = balloon_count / n;
    let remainder = balloon_count % n;

    let mut sequence = Vec::with_capacity(usize::try_from(balloon_count).unwrap_or(0));
    for idx in 0..attribute_count {
        for _ in 0..base {
            sequence.push(idx);
        }
    }
    for _ in 0..remainder {
        let pick = rng.uniform_int(0, n - 1);
        sequence.push(pick as usize);
    }
    rng.shuffle(&mut sequence);
    sequence
}
