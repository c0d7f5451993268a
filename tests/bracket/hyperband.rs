use sync_hyperband::prelude::*;

/// Hand out every slot of the current rung, then report them in shuffled order.
fn report_rung_shuffled(bracket: &mut HyperbandBracket, rng: &mut fastrand::Rng, next_id: &mut TrialId) -> Vec<bool> {
    let mut jobs = Vec::new();
    while let Some(slot) = bracket.next_free_slot() {
        let trial_id = slot.trial_id.unwrap_or_else(|| {
            *next_id += 1;
            *next_id - 1
        });
        jobs.push((slot, trial_id));
    }
    rng.shuffle(&mut jobs);
    jobs.into_iter()
        .map(|(slot, trial_id)| {
            #[allow(clippy::cast_precision_loss)]
            let metric = trial_id as f64;
            bracket.on_result(&slot.with_result(trial_id, metric)).unwrap()
        })
        .collect()
}

#[test]
fn out_of_order_results_promote_once() {
    let mut rng = fastrand::Rng::with_seed(7);
    let mut bracket =
        HyperbandBracket::new(&[(9, 1), (3, 3), (1, 9)], Direction::Minimize).unwrap();
    let mut next_id = 0;

    let completions = report_rung_shuffled(&mut bracket, &mut rng, &mut next_id);
    // Only the last result completes the rung, regardless of arrival order.
    assert_eq!(completions.iter().filter(|&&c| c).count(), 1);
    assert!(*completions.last().unwrap());
    assert_eq!(bracket.current_rung(), 1);
    assert_eq!(bracket.top_list_for_previous_rung().unwrap(), vec![0, 1, 2]);

    report_rung_shuffled(&mut bracket, &mut rng, &mut next_id);
    assert_eq!(bracket.trial_id_for_slot(2, 0).unwrap(), Some(0));

    report_rung_shuffled(&mut bracket, &mut rng, &mut next_id);
    assert!(bracket.is_bracket_complete());
    assert_eq!(next_id, 9);
}

#[test]
fn maximize_promotes_highest() {
    let mut bracket = HyperbandBracket::new(&[(4, 1), (2, 2)], Direction::Maximize).unwrap();
    let mut rng = fastrand::Rng::with_seed(1);
    let mut next_id = 0;
    report_rung_shuffled(&mut bracket, &mut rng, &mut next_id);
    assert_eq!(bracket.trial_id_for_slot(1, 0).unwrap(), Some(3));
    assert_eq!(bracket.trial_id_for_slot(1, 1).unwrap(), Some(2));
}

#[test]
fn pending_slots_count_down() {
    let mut bracket = HyperbandBracket::new(&[(3, 1), (1, 3)], Direction::Minimize).unwrap();
    assert_eq!(bracket.num_pending_slots(), 3);
    let a = bracket.next_free_slot().unwrap();
    let b = bracket.next_free_slot().unwrap();
    // Handing out a slot does not score it.
    assert_eq!(bracket.num_pending_slots(), 3);
    bracket.on_result(&b.with_result(1, 0.2)).unwrap();
    assert_eq!(bracket.num_pending_slots(), 2);
    bracket.on_result(&a.with_result(0, 0.1)).unwrap();
    assert_eq!(bracket.num_pending_slots(), 1);
    assert!(!bracket.is_rung_complete());
}

#[test]
fn results_after_completion_are_rejected() {
    let mut bracket = HyperbandBracket::new(&[(1, 1)], Direction::Minimize).unwrap();
    let slot = bracket.next_free_slot().unwrap();
    assert!(bracket.on_result(&slot.with_result(0, 1.0)).unwrap());
    assert!(bracket.is_bracket_complete());
    assert_eq!(
        bracket.on_result(&slot.with_result(0, 1.0)),
        Err(Error::BracketComplete { num_rungs: 1 })
    );
}

#[test]
fn stale_result_for_previous_rung_is_rejected() {
    let mut bracket = HyperbandBracket::new(&[(1, 1), (1, 2)], Direction::Minimize).unwrap();
    let slot = bracket.next_free_slot().unwrap();
    bracket.on_result(&slot.with_result(0, 1.0)).unwrap();
    assert_eq!(
        bracket.on_result(&slot.with_result(0, 0.5)),
        Err(Error::ResultForWrongRung {
            expected: 1,
            got: 0
        })
    );
}

#[test]
fn rung_larger_than_previous_is_rejected_up_front() {
    assert_eq!(
        HyperbandBracket::new(&[(1, 1), (2, 2)], Direction::Minimize).unwrap_err(),
        Error::IncreasingRungSize {
            rung_index: 1,
            size: 2,
            previous: 1
        }
    );

    // Equal sizes are fine: the whole rung is promoted.
    let mut bracket = HyperbandBracket::new(&[(2, 1), (2, 2)], Direction::Minimize).unwrap();
    for (trial_id, metric) in [(0, 0.5), (1, 0.25)] {
        let slot = bracket.next_free_slot().unwrap();
        bracket.on_result(&slot.with_result(trial_id, metric)).unwrap();
    }
    assert_eq!(bracket.current_rung(), 1);
    assert_eq!(bracket.num_pending_slots(), 2);
    assert_eq!(bracket.trial_id_for_slot(1, 0).unwrap(), Some(1));
}
