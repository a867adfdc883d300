//! Property-based tests for experiment validation

use super::error::ValidationError;
use super::validator::{validate_experiment, ValidationOptions};
use crate::manifest::*;
use proptest::prelude::*;

fn arb_valid_experiment() -> impl Strategy<Value = Experiment> {
    (
        1usize..128,   // batch_size
        1e-5f64..1.0,  // learning rate
        1usize..20,    // run_for_epochs
        0.0f64..0.99,  // dropout
        0.01f64..=1.0, // lr_decay
        1usize..8,     // patience
    )
        .prop_map(|(batch_size, lr, epochs, dropout, lr_decay, patience)| {
            let mut exp: Experiment = serde_yaml::from_str(
                "model: !DefaultTranslator\n  src_reader: !PlainTextReader {}\n  trg_reader: !PlainTextReader {}\ntrain: !SimpleTrainingRegimen {src_file: a, trg_file: b}\n",
            )
            .unwrap();
            exp.exp_global.dropout = dropout;
            let r = exp.train.simple_mut();
            r.batcher = Batcher::SrcBatcher(BatchSize { batch_size });
            r.trainer = Trainer::SimpleSgdTrainer(SimpleSgdTrainer {
                e0: lr,
                ..Default::default()
            });
            r.run_for_epochs = Some(epochs);
            r.lr_decay = lr_decay;
            r.patience = patience;
            exp.apply_shared_defaults();
            exp
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_experiment_passes(exp in arb_valid_experiment()) {
        prop_assert!(validate_experiment(&exp, &ValidationOptions::default()).is_ok());
    }

    #[test]
    fn prop_zero_epochs_fails(exp in arb_valid_experiment()) {
        let mut exp = exp;
        exp.train.simple_mut().run_for_epochs = Some(0);
        let rejected = matches!(
            validate_experiment(&exp, &ValidationOptions::default()),
            Err(ValidationError::InvalidRange { .. })
        );
        prop_assert!(rejected);
    }

    #[test]
    fn prop_nonpositive_lr_fails(exp in arb_valid_experiment(), lr in -1.0f64..=0.0) {
        let mut exp = exp;
        exp.train.simple_mut().trainer = Trainer::SimpleSgdTrainer(SimpleSgdTrainer {
            e0: lr,
            ..Default::default()
        });
        prop_assert!(validate_experiment(&exp, &ValidationOptions::default()).is_err());
    }
}
