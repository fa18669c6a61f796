mod common;

mod tests {
    use live_beacon::animation::{ease_in_out, progress};
    use live_beacon::color::WARM_WHITE;
    use live_beacon::{AnimationEngine, AnimationPhase, ChannelStatus, Duration, Rgb};

    use super::common::fast_timings;

    use AnimationPhase::{Idle, RampDown, RampUp, SteadyPulse};
    use ChannelStatus::{Live, Offline, Unknown};

    const PHASES: [AnimationPhase; 4] = [Idle, RampUp, SteadyPulse, RampDown];

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn engine() -> AnimationEngine {
        AnimationEngine::new(fast_timings(), WARM_WHITE)
    }

    /// Engine driven into `phase`, with the phase clock partly advanced
    fn engine_in(phase: AnimationPhase) -> AnimationEngine {
        let mut engine = engine();
        match phase {
            Idle => {}
            RampUp => {
                engine.observe(Live);
                engine.advance(ms(50));
            }
            SteadyPulse => {
                engine.observe(Live);
                engine.advance(ms(200));
                engine.advance(ms(30));
            }
            RampDown => {
                engine.observe(Live);
                engine.advance(ms(200));
                engine.observe(Offline);
                engine.advance(ms(20));
            }
        }
        assert_eq!(engine.phase(), phase);
        engine
    }

    #[test]
    fn test_starts_idle_and_dark() {
        let engine = engine();
        assert_eq!(engine.phase(), Idle);
        assert_eq!(engine.clock(), ms(0));

        let mut leds = [WARM_WHITE; 3];
        engine.render(&mut leds);
        assert_eq!(leds, [Rgb::default(); 3]);
    }

    #[test]
    fn test_transition_table() {
        let table = [
            (Idle, Unknown, Idle),
            (Idle, Offline, Idle),
            (Idle, Live, RampUp),
            (RampUp, Unknown, RampUp),
            (RampUp, Live, RampUp),
            (RampUp, Offline, RampDown),
            (SteadyPulse, Unknown, SteadyPulse),
            (SteadyPulse, Live, SteadyPulse),
            (SteadyPulse, Offline, RampDown),
            (RampDown, Unknown, RampDown),
            (RampDown, Offline, RampDown),
            (RampDown, Live, RampUp),
        ];

        for (from, status, to) in table {
            let mut engine = engine_in(from);
            let fired = engine.observe(status);
            assert_eq!(engine.phase(), to, "{from:?} + {status:?}");
            if from == to {
                assert_eq!(fired, None, "{from:?} + {status:?}");
            } else {
                assert_eq!(fired, Some(to), "{from:?} + {status:?}");
                assert_eq!(engine.clock(), ms(0));
            }
        }
    }

    #[test]
    fn test_folding_status_sequence() {
        let mut engine = engine();
        let sequence = [Unknown, Offline, Live, Unknown, Live, Offline, Unknown, Live];
        let mut expected = Idle;
        for status in sequence {
            expected = match (expected, status) {
                (Idle | RampDown, Live) => RampUp,
                (RampUp | SteadyPulse, Offline) => RampDown,
                (phase, _) => phase,
            };
            engine.observe(status);
            assert_eq!(engine.phase(), expected);
        }
        assert_eq!(engine.phase(), RampUp);
    }

    #[test]
    fn test_unknown_never_changes_phase() {
        for phase in PHASES {
            let mut engine = engine_in(phase);
            let clock = engine.clock();
            for _ in 0..5 {
                assert_eq!(engine.observe(Unknown), None);
            }
            assert_eq!(engine.phase(), phase);
            assert_eq!(engine.clock(), clock);
        }
    }

    #[test]
    fn test_repeated_status_is_idempotent() {
        let cases = [(Idle, Offline), (RampUp, Live), (SteadyPulse, Live), (RampDown, Offline)];
        for (phase, status) in cases {
            let mut engine = engine_in(phase);
            let clock = engine.clock();
            let entry = engine.entry();
            for _ in 0..3 {
                assert_eq!(engine.observe(status), None);
            }
            assert_eq!(engine.phase(), phase);
            assert_eq!(engine.clock(), clock);
            assert_eq!(engine.entry(), entry);
        }
    }

    #[test]
    fn test_ramp_up_completes_into_pulse() {
        let mut engine = engine();
        engine.observe(Live);
        assert_eq!(engine.advance(ms(199)), None);
        assert_eq!(engine.phase(), RampUp);

        assert_eq!(engine.advance(ms(1)), Some(SteadyPulse));
        assert_eq!(engine.clock(), ms(0));
        assert!((engine.intensity() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ramp_down_completes_into_idle() {
        let mut engine = engine_in(SteadyPulse);
        engine.observe(Offline);
        assert_eq!(engine.advance(ms(99)), None);
        assert_eq!(engine.advance(ms(1)), Some(Idle));
        assert_eq!(engine.clock(), ms(0));
        assert_eq!(engine.intensity(), 0.0);
    }

    #[test]
    fn test_steady_pulse_has_no_timeout() {
        let mut engine = engine_in(SteadyPulse);
        for _ in 0..1000 {
            assert_eq!(engine.advance(ms(10)), None);
        }
        assert_eq!(engine.phase(), SteadyPulse);
        assert_eq!(engine.clock(), ms(30 + 10_000));
    }

    #[test]
    fn test_ramp_up_is_monotonic_and_reaches_full() {
        let mut engine = engine();
        engine.observe(Live);

        let mut previous = engine.intensity_at(ms(0));
        assert_eq!(previous, 0.0);
        for clock in 1..=200 {
            let current = engine.intensity_at(ms(clock));
            assert!(current >= previous, "dropped at {clock}ms");
            previous = current;
        }
        assert_eq!(engine.intensity_at(ms(200)), 1.0);
    }

    #[test]
    fn test_ramp_down_is_monotonic_and_reaches_dark() {
        let mut engine = engine_in(SteadyPulse);
        engine.observe(Offline);

        let mut previous = engine.intensity_at(ms(0));
        for clock in 1..=100 {
            let current = engine.intensity_at(ms(clock));
            assert!(current <= previous, "rose at {clock}ms");
            previous = current;
        }
        assert_eq!(engine.intensity_at(ms(100)), 0.0);
    }

    #[test]
    fn test_interrupted_ramp_up_reverses_smoothly() {
        let mut engine = engine();
        engine.observe(Live);
        engine.advance(ms(70));
        let before = engine.intensity();
        assert!(before > 0.0 && before < 1.0);

        assert_eq!(engine.observe(Offline), Some(RampDown));
        assert_eq!(engine.entry().start_intensity, before);
        assert_eq!(engine.intensity(), before);

        // Shallow ramp still ends dark on time
        assert_eq!(engine.intensity_at(ms(100)), 0.0);
        assert!(engine.intensity_at(ms(50)) < before);
    }

    #[test]
    fn test_reignition_during_ramp_down_reverses_smoothly() {
        let mut engine = engine_in(SteadyPulse);
        engine.observe(Offline);
        engine.advance(ms(40));
        let before = engine.intensity();
        assert!(before > 0.0 && before < 1.0);

        assert_eq!(engine.observe(Live), Some(RampUp));
        assert_eq!(engine.intensity(), before);
        assert_eq!(engine.intensity_at(ms(200)), 1.0);

        let mut previous = before;
        for clock in (0..=200).step_by(5) {
            let current = engine.intensity_at(ms(clock));
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_pulse_never_drops_below_floor() {
        let engine = engine_in(SteadyPulse);
        let floor = fast_timings().pulse_floor;
        let mut lowest: f32 = 1.0;
        for clock in (0..5_000).step_by(3) {
            let intensity = engine.intensity_at(ms(clock));
            assert!(intensity >= floor, "{intensity} at {clock}ms");
            assert!(intensity <= 1.0);
            lowest = lowest.min(intensity);
        }
        // It does breathe
        assert!(lowest < 0.55);
    }

    #[test]
    fn test_pulse_renders_lit_pixels() {
        let engine = engine_in(SteadyPulse);
        let mut leds = [Rgb::default(); 2];
        engine.render(&mut leds);
        assert_eq!(leds[0], leds[1]);
        assert!(leds[0].r > 0);
    }

    #[test]
    fn test_pulse_starts_at_full_color() {
        let mut engine = engine();
        engine.observe(Live);
        engine.advance(ms(200));

        let mut leds = [Rgb::default(); 2];
        engine.render(&mut leds);
        assert_eq!(leds, [WARM_WHITE; 2]);
    }

    #[test]
    fn test_scenario_boot_waits_for_confirmed_live() {
        let mut engine = engine();
        assert_eq!(engine.observe(Unknown), None);
        engine.advance(ms(10));
        assert_eq!(engine.observe(Unknown), None);
        engine.advance(ms(10));
        assert_eq!(engine.phase(), Idle);

        assert_eq!(engine.observe(Live), Some(RampUp));
        assert_eq!(engine.clock(), ms(0));
        assert_eq!(engine.intensity(), 0.0);
    }

    #[test]
    fn test_scenario_ramp_up_just_before_deadline() {
        let mut engine = engine();
        engine.observe(Live);
        engine.advance(ms(199));

        assert_eq!(engine.observe(Live), None);
        assert_eq!(engine.phase(), RampUp);

        assert_eq!(engine.advance(ms(10)), Some(SteadyPulse));
        assert_eq!(engine.clock(), ms(0));
    }

    #[test]
    fn test_scenario_pulse_then_offline_captures_intensity() {
        let mut engine = engine_in(SteadyPulse);
        engine.advance(ms(70));

        assert_eq!(engine.observe(Live), None);
        assert_eq!(engine.observe(Live), None);
        let pulse = engine.intensity();
        assert!(pulse < 1.0);

        assert_eq!(engine.observe(Offline), Some(RampDown));
        assert_eq!(engine.clock(), ms(0));
        assert_eq!(engine.entry().start_intensity, pulse);
        assert_eq!(engine.intensity(), pulse);
    }

    #[test]
    fn test_curve_helpers() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(progress(ms(5), ms(0)), 1.0);
        assert_eq!(progress(ms(150), ms(100)), 1.0);
        assert!((progress(ms(25), ms(100)) - 0.25).abs() < 1e-6);
    }
}
