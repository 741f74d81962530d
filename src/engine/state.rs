use std::collections::HashMap;

use super::{
    CompletedRep, EngineConfig, PeakKind, Phase, PhasePeak, RepPosition, RepQuality, Transition,
    Trigger,
};

/// Phase, dwell, confirmation and peak bookkeeping for one analyzer.
///
/// The current phase owns at most one in-flight peak. It moves into the rep
/// record when the phase is left, and the record is flushed as a whole when
/// a rep completes.
#[derive(Debug, Clone)]
pub struct PhaseEngine<P: Phase, A> {
    config: EngineConfig,
    phase: P,
    frames_in_phase: u32,
    /// Target of the sustained rule currently matching, and for how many frames.
    pending: Option<(P, u32)>,
    rep_count: u32,
    last_quality: Option<RepQuality>,
    in_flight: Option<PhasePeak<A>>,
    record: HashMap<P, PhasePeak<A>>,
}

impl<P: Phase, A> PhaseEngine<P, A> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            phase: P::start(),
            frames_in_phase: 0,
            pending: None,
            rep_count: 0,
            last_quality: None,
            in_flight: None,
            record: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> P {
        self.phase
    }

    pub fn frames_in_phase(&self) -> u32 {
        self.frames_in_phase
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn last_quality(&self) -> Option<&RepQuality> {
        self.last_quality.as_ref()
    }

    /// True once the current phase has been held for the minimum dwell.
    pub fn can_transition(&self) -> bool {
        self.frames_in_phase >= self.config.min_dwell_frames
    }

    /// Count one more frame in the current phase and check the table.
    ///
    /// Returns the phase to move to, if any. The caller performs the move with
    /// [`transition_to`](Self::transition_to) so it can do its own bookkeeping
    /// around it. Matches that arrive before the dwell is satisfied are
    /// dropped for events and keep counting for sustained rules.
    pub fn evaluate<C>(&mut self, table: &[Transition<P, C>], ctx: &C) -> Option<P> {
        self.frames_in_phase = self.frames_in_phase.saturating_add(1);

        let Some(rule) = table
            .iter()
            .find(|rule| rule.from == self.phase && (rule.when)(ctx))
        else {
            self.pending = None;
            return None;
        };

        match rule.trigger {
            Trigger::Event => {
                self.pending = None;
                self.can_transition().then_some(rule.to)
            }
            Trigger::Sustained => {
                let held = match self.pending {
                    Some((target, frames)) if target == rule.to => frames + 1,
                    _ => 1,
                };
                self.pending = Some((rule.to, held));
                (held >= self.config.confirm_frames && self.can_transition()).then_some(rule.to)
            }
        }
    }

    /// Finalize the in-flight peak and enter `next`.
    pub fn transition_to(&mut self, next: P) {
        if let Some(peak) = self.in_flight.take() {
            self.record.insert(self.phase, peak);
        }
        self.phase = next;
        self.frames_in_phase = 0;
        self.pending = None;
    }

    /// Offer a candidate for the current phase. Returns whether it was kept.
    pub fn offer_peak(&mut self, candidate: PhasePeak<A>) -> bool {
        let keep = match (&self.in_flight, self.phase.peak_kind()) {
            (None, _) => true,
            (Some(best), PeakKind::Extremal) => candidate.score > best.score,
            (Some(_), PeakKind::Timing) => false,
        };
        if keep {
            self.in_flight = Some(candidate);
        }
        keep
    }

    /// Overwrite the peak for `phase`. For the current phase this replaces the
    /// in-flight candidate; otherwise it replaces the recorded one.
    pub fn store_peak(&mut self, phase: P, peak: PhasePeak<A>) {
        if phase == self.phase {
            self.in_flight = Some(peak);
        } else {
            self.record.insert(phase, peak);
        }
    }

    pub fn peak(&self, phase: P) -> Option<&PhasePeak<A>> {
        if phase == self.phase {
            self.in_flight.as_ref().or_else(|| self.record.get(&phase))
        } else {
            self.record.get(&phase)
        }
    }

    /// Number of phases holding a peak right now.
    pub fn peak_count(&self) -> usize {
        let in_flight_is_new = self.in_flight.is_some() && !self.record.contains_key(&self.phase);
        self.record.len() + usize::from(in_flight_is_new)
    }

    /// Close the current rep.
    ///
    /// Scores it with `quality` over the analyzer's rep-long `metrics`,
    /// flushes every stored peak into cycle-ordered positions and leaves the
    /// record empty for the next rep.
    pub fn complete_rep<M>(&mut self, metrics: &M, quality: fn(&M) -> RepQuality) -> CompletedRep<A> {
        self.rep_count += 1;
        let quality = quality(metrics);
        self.last_quality = Some(quality.clone());

        let mut in_flight = self.in_flight.take();
        let positions = P::CYCLE
            .iter()
            .filter_map(|phase| {
                let current = if *phase == self.phase { in_flight.take() } else { None };
                let recorded = self.record.remove(phase);
                current
                    .or(recorded)
                    .map(|peak| RepPosition::from_peak(phase.as_str(), peak))
            })
            .collect();
        self.record.clear();

        CompletedRep {
            rep_number: self.rep_count,
            positions,
            quality,
        }
    }

    pub fn reset(&mut self) {
        self.phase = P::start();
        self.frames_in_phase = 0;
        self.pending = None;
        self.rep_count = 0;
        self.last_quality = None;
        self.in_flight = None;
        self.record.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::QualityBuilder;
    use crate::skeleton::Skeleton;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Toggle {
        Up,
        Down,
    }

    impl Phase for Toggle {
        const CYCLE: &'static [Self] = &[Toggle::Up, Toggle::Down];

        fn as_str(&self) -> &'static str {
            match self {
                Toggle::Up => "up",
                Toggle::Down => "down",
            }
        }

        fn peak_kind(&self) -> PeakKind {
            match self {
                Toggle::Up => PeakKind::Extremal,
                Toggle::Down => PeakKind::Timing,
            }
        }
    }

    struct Level(f64);

    fn negative(level: &Level) -> bool {
        level.0 < 0.0
    }

    fn positive(level: &Level) -> bool {
        level.0 > 0.0
    }

    const TABLE: [Transition<Toggle, Level>; 2] = [
        Transition::sustained(Toggle::Up, Toggle::Down, negative),
        Transition::sustained(Toggle::Down, Toggle::Up, positive),
    ];

    fn peak(score: f64) -> PhasePeak<f64> {
        PhasePeak::new(Arc::new(Skeleton::empty(score)), score, score)
    }

    fn fixed_quality(_: &()) -> RepQuality {
        QualityBuilder::new().finish()
    }

    fn step(engine: &mut PhaseEngine<Toggle, f64>, level: f64) -> Option<Toggle> {
        let next = engine.evaluate(&TABLE, &Level(level));
        if let Some(next) = next {
            engine.transition_to(next);
        }
        next
    }

    #[test]
    fn single_qualifying_frame_is_ignored() {
        let mut engine = PhaseEngine::<Toggle, f64>::new(EngineConfig::default());
        for level in [1.0, 1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0] {
            assert_eq!(step(&mut engine, level), None);
        }
        assert_eq!(engine.phase(), Toggle::Up);

        assert_eq!(step(&mut engine, -1.0), None);
        assert_eq!(step(&mut engine, -1.0), Some(Toggle::Down));
    }

    #[test]
    fn dwell_blocks_immediate_bounce() {
        let mut engine = PhaseEngine::<Toggle, f64>::new(EngineConfig {
            min_dwell_frames: 2,
            confirm_frames: 1,
        });
        assert_eq!(step(&mut engine, 1.0), None);
        assert_eq!(step(&mut engine, -1.0), Some(Toggle::Down));

        // Confirmed on the first frame back in Down, but dwell is only 1.
        assert_eq!(step(&mut engine, 1.0), None);
        assert_eq!(step(&mut engine, 1.0), Some(Toggle::Up));
    }

    #[test]
    fn extremal_keeps_best_and_timing_keeps_first() {
        let mut engine = PhaseEngine::<Toggle, f64>::new(EngineConfig::default());
        assert!(engine.offer_peak(peak(3.0)));
        assert!(engine.offer_peak(peak(5.0)));
        assert!(!engine.offer_peak(peak(4.0)));
        assert_eq!(engine.peak(Toggle::Up).map(|p| p.score), Some(5.0));

        engine.transition_to(Toggle::Down);
        assert!(engine.offer_peak(peak(1.0)));
        assert!(!engine.offer_peak(peak(9.0)));
        assert_eq!(engine.peak(Toggle::Down).map(|p| p.score), Some(1.0));
        assert_eq!(engine.peak(Toggle::Up).map(|p| p.score), Some(5.0));
        assert_eq!(engine.peak_count(), 2);
    }

    #[test]
    fn store_peak_is_last_write_wins() {
        let mut engine = PhaseEngine::<Toggle, f64>::new(EngineConfig::default());
        engine.store_peak(Toggle::Down, peak(2.0));
        engine.store_peak(Toggle::Down, peak(1.0));
        assert_eq!(engine.peak(Toggle::Down).map(|p| p.score), Some(1.0));
    }

    #[test]
    fn complete_rep_flushes_in_cycle_order() {
        let mut engine = PhaseEngine::<Toggle, f64>::new(EngineConfig::default());
        engine.offer_peak(peak(5.0));
        engine.transition_to(Toggle::Down);
        engine.offer_peak(peak(1.0));
        engine.transition_to(Toggle::Up);

        let rep = engine.complete_rep(&(), fixed_quality);
        assert_eq!(rep.rep_number, 1);
        assert_eq!(rep.position_names(), vec!["up", "down"]);
        assert_eq!(engine.peak_count(), 0);
        assert_eq!(engine.rep_count(), 1);
        assert!(engine.last_quality().is_some());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut engine = PhaseEngine::<Toggle, f64>::new(EngineConfig::default());
        engine.offer_peak(peak(5.0));
        engine.transition_to(Toggle::Down);
        engine.complete_rep(&(), fixed_quality);

        engine.reset();
        engine.reset();
        assert_eq!(engine.phase(), Toggle::Up);
        assert_eq!(engine.rep_count(), 0);
        assert_eq!(engine.frames_in_phase(), 0);
        assert!(engine.last_quality().is_none());
        assert_eq!(engine.peak_count(), 0);
    }
}
