//! Pipelines on realistic logic

use mixsyn_net::{equivalent, Network, Signal};
use mixsyn_synth::passes::{AigDecompose, Dce, MigResynthesis, Strash};
use mixsyn_synth::{pipeline_for, Engine, Objective, Pass};

/// Ripple-carry adder with a sum-of-products carry
fn adder(bits: usize) -> Network {
    let mut ntk = Network::new("adder");
    let mut carry = Signal::new(ntk.add_input("cin"));
    for i in 0..bits {
        let a = Signal::new(ntk.add_input(format!("a{}", i)));
        let b = Signal::new(ntk.add_input(format!("b{}", i)));
        let ab = ntk.add_xor(a, b);
        let sum = ntk.add_xor(ab, carry);
        let t0 = ntk.add_and(a, b);
        let t1 = ntk.add_and(a, carry);
        let t2 = ntk.add_and(b, carry);
        let t = ntk.add_or(t0, t1);
        carry = ntk.add_or(t, t2);
        ntk.add_output(format!("s{}", i), sum);
    }
    ntk.add_output("cout", carry);
    ntk
}

/// Counter with feedback through latches
fn counter(bits: usize) -> Network {
    let mut ntk = Network::new("counter");
    let en = Signal::new(ntk.add_input("en"));
    let latches: Vec<_> = (0..bits)
        .map(|i| ntk.add_latch(format!("q{}", i), Some(false)))
        .collect();

    let mut carry = en;
    let mut next = Vec::new();
    for &q in &latches {
        let q = Signal::new(q);
        next.push(ntk.add_xor(q, carry));
        carry = ntk.add_and(q, carry);
    }
    for (&q, &data) in latches.iter().zip(&next) {
        ntk.set_latch_data(q, data).unwrap();
    }
    ntk.add_output("wrap", carry);
    ntk
}

#[test]
fn test_every_pipeline_preserves_function() {
    for ntk in [adder(6), counter(5)] {
        for engine in [Engine::Aig, Engine::Mig] {
            for objective in [Objective::Balanced, Objective::Area, Objective::Depth] {
                let pipeline = pipeline_for(engine, objective);
                let optimized = pipeline.run(&ntk);
                assert!(
                    equivalent(&ntk, &optimized, 16).unwrap(),
                    "{} changed the function of {}",
                    pipeline.name(),
                    ntk.name
                );
                assert_eq!(optimized.num_latches(), ntk.num_latches());
            }
        }
    }
}

#[test]
fn test_pipelines_are_pure() {
    let ntk = adder(4);
    let before = ntk.clone();
    for engine in [Engine::Aig, Engine::Mig] {
        let pipeline = pipeline_for(engine, Objective::Balanced);
        let first = pipeline.run(&ntk);
        let second = pipeline.run(&ntk);
        assert_eq!(first, second);
    }
    assert_eq!(ntk, before);
}

#[test]
fn test_mig_depth_shortens_carry_chain() {
    let ntk = adder(8);
    let optimized = pipeline_for(Engine::Mig, Objective::Depth).run(&ntk);
    assert!(optimized.depth() < ntk.depth());
    assert!(optimized.num_majs() > 0);
}

#[test]
fn test_aig_pipeline_leaves_no_majority_gates() {
    let mut ntk = adder(4);
    MigResynthesis::new().run(&mut ntk);
    assert!(ntk.num_majs() > 0);

    let optimized = pipeline_for(Engine::Aig, Objective::Area).run(&ntk);
    assert_eq!(optimized.num_majs(), 0);
    assert!(equivalent(&adder(4), &optimized, 16).unwrap());
}

#[test]
fn test_decompose_then_cleanup_round_trip() {
    let original = adder(3);
    let mut ntk = original.clone();
    let resyn = MigResynthesis::new().run(&mut ntk);
    let decompose = AigDecompose::new().run(&mut ntk);
    Strash::new().run(&mut ntk);
    Dce::new().run(&mut ntk);

    assert_eq!(resyn.pass_name, "mig_resyn");
    assert_eq!(decompose.pass_name, "aig_decompose");
    assert_eq!(ntk.num_majs(), 0);
    assert!(equivalent(&original, &ntk, 16).unwrap());
}
