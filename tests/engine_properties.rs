//! Property checks over generated sequences
//!
//! Drives the engine through every mode on deterministic pseudo-random
//! inputs and checks the invariant, the variant function and completion
//! behaviour at every step.

use loopcheck::r#loop::verifier;
use loopcheck::testing::{
    assert_final_accumulator, assert_invariant_preserved, assert_variant_decreasing,
    FaultyRule, NaiveMaxRule, Scenario, SequenceGenerator,
};
use loopcheck::{LoopCheckError, LoopEngine, LoopMode, LoopPhase, LoopStateSnapshot, Sequence};

const THRESHOLDS: [i64; 4] = [-5, 0, 3, 11];

fn run_to_completion(engine: &mut LoopEngine) -> Vec<LoopStateSnapshot> {
    let mut trace = vec![engine.snapshot().unwrap()];
    while !engine.is_completed() {
        trace.push(engine.step().unwrap());
    }
    trace
}

#[test]
fn test_invariant_and_variant_hold_on_generated_inputs() {
    for (seed, sequence) in SequenceGenerator::new(2024, 12).take(60).enumerate() {
        for mode in LoopMode::ALL {
            for threshold in THRESHOLDS {
                let mut engine = LoopEngine::new();
                engine.initialize(sequence.clone(), mode, threshold);
                let trace = run_to_completion(&mut engine);

                assert_eq!(trace.len(), sequence.len() + 1, "seed {seed}");
                assert_invariant_preserved(&trace);
                assert_variant_decreasing(&trace);
            }
        }
    }
}

#[test]
fn test_engine_agrees_with_independent_fold() {
    for sequence in SequenceGenerator::new(77, 10).take(40) {
        for mode in LoopMode::ALL {
            for threshold in THRESHOLDS {
                let mut engine = LoopEngine::new();
                engine.initialize(sequence.clone(), mode, threshold);
                for snapshot in run_to_completion(&mut engine) {
                    let expected = verifier::expected_accumulator(
                        &sequence,
                        snapshot.position,
                        mode,
                        threshold,
                    );
                    assert_eq!(Some(snapshot.accumulator), expected);
                    assert!(verifier::check(
                        &sequence,
                        snapshot.position,
                        snapshot.accumulator,
                        mode,
                        threshold
                    ));
                }
            }
        }
    }
}

#[test]
fn test_final_results_match_direct_computation() {
    for sequence in SequenceGenerator::new(5, 15).take(40) {
        let values = sequence.as_slice();

        let mut engine = LoopEngine::new();
        engine.initialize(sequence.clone(), LoopMode::PrefixSum, 0);
        let trace = run_to_completion(&mut engine);
        assert_final_accumulator(&trace, values.iter().sum());

        let mut engine = LoopEngine::new();
        engine.initialize(sequence.clone(), LoopMode::CountAboveThreshold, 2);
        let trace = run_to_completion(&mut engine);
        let above: Vec<i64> = values.iter().copied().filter(|&v| v > 2).collect();
        assert_final_accumulator(&trace, above.len() as i64);
        assert_eq!(trace.last().unwrap().auxiliary, above);

        let mut engine = LoopEngine::new();
        engine.initialize(sequence.clone(), LoopMode::PrefixMax, 0);
        let trace = run_to_completion(&mut engine);
        let max = values.iter().copied().max().unwrap_or(i64::MIN);
        assert_final_accumulator(&trace, max);
    }
}

#[test]
fn test_step_after_completion_is_idempotent() {
    for sequence in SequenceGenerator::new(9, 6).take(20) {
        let mut engine = LoopEngine::new();
        engine.initialize(sequence.clone(), LoopMode::PrefixMax, 0);
        let done = run_to_completion(&mut engine).pop().unwrap();

        for _ in 0..3 {
            let again = engine.step().unwrap();
            assert_eq!(again.position, done.position);
            assert_eq!(again.accumulator, done.accumulator);
            assert_eq!(again.step_count, done.step_count);
            assert_eq!(engine.phase(), LoopPhase::Completed);
        }
    }
}

#[test]
fn test_canonical_scenarios() {
    for scenario in Scenario::all() {
        let mut engine = LoopEngine::new();
        engine.initialize(scenario.sequence.clone(), scenario.mode, scenario.threshold);
        let trace = run_to_completion(&mut engine);

        assert_invariant_preserved(&trace);
        assert_variant_decreasing(&trace);
        assert_final_accumulator(&trace, scenario.final_accumulator);
        assert_eq!(
            trace.last().unwrap().auxiliary,
            scenario.auxiliary,
            "{}",
            scenario.name
        );
    }
}

#[test]
fn test_naive_max_rule_is_observationally_correct() {
    for sequence in SequenceGenerator::new(31, 8).take(30) {
        let mut engine = LoopEngine::new().with_rule(NaiveMaxRule);
        engine.initialize(sequence, LoopMode::PrefixMax, 0);
        let trace = run_to_completion(&mut engine);
        assert_invariant_preserved(&trace);
    }
}

#[test]
fn test_faulty_rule_caught_on_all_negative_input() {
    let mut engine = LoopEngine::new().with_rule(FaultyRule::at_index(1));
    engine.initialize(Sequence::new(vec![-4, -9]), LoopMode::PrefixMax, 0);
    engine.step().unwrap();

    let err = engine.step().unwrap_err();
    assert!(err.is_engine_fault());
    assert!(matches!(
        err,
        LoopCheckError::InvariantViolation {
            mode: LoopMode::PrefixMax,
            position: 2,
            accumulator: -3,
            expected: Some(-4),
            ..
        }
    ));
    assert!(engine.is_contaminated());
}
