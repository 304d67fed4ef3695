use crate::types::{LevelSource, QualityLevel, StartupOptions, StartupTarget};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StartupReason {
    /// Lowest level that still meets the target height.
    MeetsTarget,
    /// Nothing meets the target; best available level chosen instead.
    BestBelowTarget,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StartupDecision {
    pub level_index: usize,
    pub height: u32,
    pub bitrate: u64,
    pub target_height: u32,
    pub reason: StartupReason,
}

/// Compute the minimum starting height.
///
/// Hero media uses the fixed floor. Everything else uses the configured or
/// measured element height, never below `min_target_height`.
pub fn target_height(
    opts: &StartupOptions,
    hero_like: bool,
    target: StartupTarget,
    measured_height: Option<u32>,
) -> u32 {
    if hero_like {
        return opts.hero_floor_height;
    }

    let wanted = match target {
        StartupTarget::Height(height) => height,
        StartupTarget::MatchElement => measured_height.unwrap_or(0),
    };
    wanted.max(opts.min_target_height)
}

/// Pick the starting level for `target_height`.
///
/// Levels above `max_start_height` are ignored unless every level is above
/// it. Among the rest, the lowest level at or above the target wins; when all
/// are below the target, the highest one is used. Returns `None` for an empty
/// level list.
pub fn select_start_level<L: LevelSource + ?Sized>(
    levels: &L,
    target_height: u32,
    opts: &StartupOptions,
) -> Option<StartupDecision> {
    let all: Vec<QualityLevel> = (0..levels.level_count())
        .filter_map(|position| levels.level_at(position))
        .collect();

    let capped: Vec<QualityLevel> = match opts.max_start_height {
        Some(cap) => all.iter().copied().filter(|l| l.height <= cap).collect(),
        None => Vec::new(),
    };
    let mut candidates = if capped.is_empty() { all } else { capped };

    // Ascending height; equal heights keep the cheaper rendition first.
    candidates.sort_by_key(|l| (l.height, l.bitrate));

    let (chosen, reason) = match candidates.iter().find(|l| l.height >= target_height) {
        Some(level) => (*level, StartupReason::MeetsTarget),
        None => (*candidates.last()?, StartupReason::BestBelowTarget),
    };

    tracing::debug!(
        target_height,
        chosen_index = chosen.index,
        chosen_height = chosen.height,
        chosen_bitrate = chosen.bitrate,
        candidates = candidates.len(),
        ?reason,
        "startup level selected"
    );

    Some(StartupDecision {
        level_index: chosen.index,
        height: chosen.height,
        bitrate: chosen.bitrate,
        target_height,
        reason,
    })
}
