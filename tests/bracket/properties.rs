use sync_hyperband::prelude::*;

fn schedules() -> Vec<Vec<(usize, u64)>> {
    vec![
        vec![(1, 1)],
        vec![(3, 1), (2, 3), (1, 9)],
        vec![(8, 1), (4, 2), (2, 4), (1, 8)],
        vec![(27, 1), (9, 3), (3, 9), (1, 27)],
        vec![(5, 3), (5, 9)],
    ]
}

fn brackets(rungs: &[(usize, u64)]) -> Vec<Box<dyn Bracket>> {
    vec![
        Box::new(HyperbandBracket::new(rungs, Direction::Minimize).unwrap()),
        Box::new(DehbBracket::new(rungs, Direction::Minimize, true).unwrap()),
        Box::new(DehbBracket::new(rungs, Direction::Maximize, false).unwrap()),
    ]
}

fn rung_sizes(bracket: &dyn Bracket) -> Vec<usize> {
    (0..bracket.num_rungs())
        .map(|r| bracket.rung(r).unwrap().size())
        .collect()
}

/// Drive a bracket to completion, advancing externally promoted ones.
fn run_to_completion(bracket: &mut dyn Bracket, mut on_step: impl FnMut(&dyn Bracket)) {
    let mut next_trial = 1000;
    while !bracket.is_bracket_complete() {
        while let Some(slot) = bracket.next_free_slot() {
            let trial_id = slot.trial_id.unwrap_or_else(|| {
                next_trial += 1;
                next_trial
            });
            #[allow(clippy::cast_precision_loss)]
            let metric = ((trial_id * 7919) % 101) as f64;
            let complete = bracket.on_result(&slot.with_result(trial_id, metric)).unwrap();
            on_step(&*bracket);
            if complete && bracket.promotion() == Promotion::External {
                bracket.advance().unwrap();
            }
        }
    }
}

#[test]
fn rung_sizes_never_change() {
    for rungs in schedules() {
        let expected: Vec<usize> = rungs.iter().map(|&(s, _)| s).collect();
        for mut bracket in brackets(&rungs) {
            assert_eq!(rung_sizes(bracket.as_ref()), expected);
            run_to_completion(bracket.as_mut(), |b| assert_eq!(rung_sizes(b), expected));
            assert_eq!(rung_sizes(bracket.as_ref()), expected);
        }
    }
}

#[test]
fn pre_initialized_ids_are_contiguous() {
    let bracket = DehbBracket::new(&[(3, 1), (2, 3), (1, 9)], Direction::Minimize, true).unwrap();
    let expected: [&[u64]; 3] = [&[0, 1, 2], &[3, 4], &[5]];
    for (rung_index, ids) in expected.iter().enumerate() {
        for (slot_index, &id) in ids.iter().enumerate() {
            assert_eq!(
                bracket.trial_id_for_slot(rung_index, slot_index).unwrap(),
                Some(id)
            );
        }
    }
}

#[test]
fn result_overwrites_existing_trial() {
    let mut bracket = DehbBracket::new(&[(8, 1), (1, 2)], Direction::Minimize, true).unwrap();
    assert_eq!(bracket.trial_id_for_slot(0, 7).unwrap(), Some(7));

    bracket.on_result(&result(0, 7, 42, 1.5)).unwrap();
    assert_eq!(bracket.rung(0).unwrap().slots()[7], (Some(42), Some(1.5)));
    assert_eq!(bracket.trial_id_for_slot(0, 7).unwrap(), Some(42));
}

fn result(rung_index: usize, slot_index: usize, trial_id: TrialId, metric: f64) -> SlotInRung {
    SlotInRung {
        rung_index,
        level: 1,
        slot_index,
        trial_id: Some(trial_id),
        metric: Some(metric),
    }
}

fn four_entry_bracket(direction: Direction) -> DehbBracket {
    let mut bracket = DehbBracket::new(&[(4, 1), (2, 2)], direction, false).unwrap();
    for (slot_index, metric) in [3.0, 1.0, 2.0, 5.0].into_iter().enumerate() {
        let result = SlotInRung {
            rung_index: 0,
            level: 1,
            slot_index,
            trial_id: Some(slot_index as u64),
            metric: Some(metric),
        };
        bracket.on_result(&result).unwrap();
    }
    bracket.advance().unwrap();
    bracket
}

#[test]
fn top_list_minimize() {
    let bracket = four_entry_bracket(Direction::Minimize);
    assert_eq!(bracket.top_list_for_previous_rung().unwrap(), vec![1, 2]);
}

#[test]
fn top_list_maximize() {
    let bracket = four_entry_bracket(Direction::Maximize);
    assert_eq!(bracket.top_list_for_previous_rung().unwrap(), vec![3, 0]);
}

#[test]
fn base_rung_has_no_previous_rung() {
    for rungs in schedules() {
        for bracket in brackets(&rungs) {
            assert_eq!(
                bracket.top_list_for_previous_rung(),
                Err(Error::NoPreviousRung)
            );
        }
    }
}

#[test]
fn top_list_length_matches_current_rung() {
    let mut bracket = DehbBracket::new(&[(8, 1), (4, 2)], Direction::Minimize, true).unwrap();
    while let Some(slot) = bracket.next_free_slot() {
        let id = slot.trial_id.unwrap();
        #[allow(clippy::cast_precision_loss)]
        let metric = 10.0 - id as f64;
        bracket.on_result(&slot.with_result(id, metric)).unwrap();
    }
    bracket.advance().unwrap();
    let top = bracket.top_list_for_previous_rung().unwrap();
    assert_eq!(top.len(), bracket.size_of_current_rung());
    assert_eq!(top, vec![7, 6, 5, 4]);

    // Holds at every rung of every bracket.
    for rungs in schedules() {
        for mut bracket in brackets(&rungs) {
            run_to_completion(bracket.as_mut(), |b| {
                if b.current_rung() > 0 && !b.is_bracket_complete() {
                    assert_eq!(
                        b.top_list_for_previous_rung().unwrap().len(),
                        b.size_of_current_rung()
                    );
                }
            });
        }
    }
}

#[test]
fn ranking_is_deterministic() {
    let entries: Vec<(Option<TrialId>, Option<f64>)> = (0..50)
        .map(|i: u64| (Some(i), Some(((i * 37) % 11) as f64)))
        .collect();
    for direction in [Direction::Minimize, Direction::Maximize] {
        let first = top_list(&entries, 20, direction).unwrap();
        for _ in 0..20 {
            assert_eq!(top_list(&entries, 20, direction).unwrap(), first);
        }
    }
}

#[test]
fn index_errors() {
    let bracket = HyperbandBracket::new(&[(3, 1), (1, 3)], Direction::Minimize).unwrap();
    assert_eq!(
        bracket.trial_id_for_slot(2, 0),
        Err(Error::RungIndexOutOfRange {
            index: 2,
            num_rungs: 2
        })
    );
    assert_eq!(
        bracket.trial_id_for_slot(1, 1),
        Err(Error::SlotIndexOutOfRange {
            rung_index: 1,
            index: 1,
            size: 1
        })
    );
}

#[test]
fn growing_rung_sizes() {
    let rungs = [(1, 1), (2, 2)];
    assert_eq!(
        HyperbandBracket::new(&rungs, Direction::Minimize).unwrap_err(),
        Error::IncreasingRungSize {
            rung_index: 1,
            size: 2,
            previous: 1
        }
    );

    // DEHB accepts the ladder; the caller learns about it from the top list.
    let mut bracket = DehbBracket::new(&rungs, Direction::Minimize, true).unwrap();
    assert!(bracket.on_result(&result(0, 0, 0, 0.5)).unwrap());
    bracket.advance().unwrap();
    assert_eq!(bracket.size_of_current_rung(), 2);
    assert_eq!(
        bracket.top_list_for_previous_rung(),
        Err(Error::NotEnoughEntries {
            requested: 2,
            available: 1
        })
    );
}

#[test]
fn non_finite_metrics_in_top_list() {
    let entries = vec![
        (Some(0), Some(f64::NAN)),
        (Some(1), Some(f64::INFINITY)),
        (Some(2), Some(0.0)),
        (Some(3), Some(f64::NEG_INFINITY)),
        (Some(4), Some(f64::NAN)),
    ];
    assert_eq!(
        top_list(&entries, 5, Direction::Minimize).unwrap(),
        vec![3, 2, 1, 0, 4]
    );
    assert_eq!(
        top_list(&entries, 5, Direction::Maximize).unwrap(),
        vec![1, 2, 3, 0, 4]
    );
}
