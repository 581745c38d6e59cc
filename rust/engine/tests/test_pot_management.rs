use flophouse_engine::engine::Engine;
use flophouse_engine::events::EngineEvent;
use flophouse_engine::rng::{SeedPolicy, SeedSchedule};
use flophouse_engine::rules::PlayerAction;
use flophouse_engine::table::{SeatConfig, TableConfig, TableRules, TableStatus};

fn table(stacks: &[u32]) -> Engine {
    let config = TableConfig {
        seats: stacks
            .iter()
            .map(|&stack| SeatConfig {
                stack,
                is_cpu: false,
            })
            .collect(),
        rules: TableRules::new(5, 10),
        seed: SeedPolicy::Seeded(SeedSchedule::new(9, 101)),
    };
    Engine::new(config).expect("valid config")
}

fn hand_results(events: &[EngineEvent]) -> Vec<flophouse_engine::events::SeatResult> {
    events
        .iter()
        .find_map(|e| match e {
            EngineEvent::HandEnded { results, .. } => Some(results.clone()),
            _ => None,
        })
        .expect("hand ended")
}

#[test]
fn three_way_all_in_settles_every_layer() {
    // Button 0 (100), small blind 1 (300), big blind 2 (900).
    let mut engine = table(&[100, 300, 900]);
    engine.begin_hand().expect("hand starts");
    assert_eq!(engine.state().button, 0);

    engine
        .apply_action(0, PlayerAction::Raise { amount: 90 })
        .expect("button jam");
    engine
        .apply_action(1, PlayerAction::Raise { amount: 200 })
        .expect("small blind jam over");
    let events = engine.apply_action(2, PlayerAction::Call).expect("cover call");

    assert_eq!(engine.status(), TableStatus::HandOver);
    let state = engine.state();
    assert_eq!(state.pot, 0);
    assert_eq!(state.community.len(), 5);

    // Commitments land at 100/300/300: a 300-chip main pot everyone can
    // win plus a 400-chip side pot between seats 1 and 2.
    let results = hand_results(&events);
    let total_won: u64 = results.iter().map(|r| u64::from(r.won)).sum();
    assert_eq!(total_won, 700);
    // Seat 0 is only eligible for the main pot.
    assert!(results[0].won == 0 || results[0].won == 300 || results[0].won == 100 || results[0].won == 150);
    // The covering caller kept 600 behind no matter what.
    assert!(results[2].stack >= 600);
    // Conservation: stacks absorb the whole purse.
    let stacks: u64 = state.seats.iter().map(|s| u64::from(s.stack)).sum();
    assert_eq!(stacks, 1_300);
}

#[test]
fn uncalled_raise_returns_to_the_raiser() {
    // Heads-up; big blind shoves, button folds. The shove's excess over
    // the called amount must come straight back.
    let mut engine = table(&[500, 500]);
    engine.begin_hand().expect("hand starts");

    engine.apply_action(0, PlayerAction::Call).expect("limp");
    // With the limp matched the big blind owes nothing, so its aggressive
    // option is a bet.
    engine
        .apply_action(1, PlayerAction::Bet { amount: 490 })
        .expect("shove option");
    let events = engine.apply_action(0, PlayerAction::Fold).expect("fold");

    let results = hand_results(&events);
    // Winner nets exactly the limp it picked up.
    assert_eq!(results[1].net, 10);
    assert_eq!(results[1].stack, 510);
    assert_eq!(results[0].stack, 490);
    assert_eq!(engine.state().pot, 0);
}

#[test]
fn short_all_in_raise_is_a_degenerate_call() {
    // Seat 2 jams for less than a full raise; the bet level must not
    // move and the action must not reopen for the earlier callers.
    let mut engine = table(&[1_000, 1_000, 60]);
    engine.begin_hand().expect("hand starts");
    // Button 0 opens to 50 total.
    engine
        .apply_action(0, PlayerAction::Raise { amount: 40 })
        .expect("open");
    assert_eq!(engine.state().bet_to_call, 50);
    // Small blind calls 45 more.
    engine.apply_action(1, PlayerAction::Call).expect("flat");
    // Big blind has 50 behind: raise-by 10 is short of the 40 minimum but
    // legal as an all-in.
    let events = engine
        .apply_action(2, PlayerAction::Raise { amount: 10 })
        .expect("short jam");

    // Nobody owes another action: the flop comes straight out and the
    // betting reopens fresh between the two full stacks.
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::Dealt {
            street: flophouse_engine::table::Street::Flop,
            ..
        }
    )));
    assert!(engine.state().seats[2].all_in);
    assert_eq!(engine.street(), Some(flophouse_engine::table::Street::Flop));
    assert_eq!(engine.current_actor(), Some(1));
}

#[test]
fn chip_conservation_holds_through_a_scripted_hand() {
    let mut engine = table(&[400, 400, 400]);
    let start: u64 = 1_200;
    engine.begin_hand().expect("hand starts");
    assert_eq!(engine.state().chips_in_play(), start);

    engine
        .apply_action(0, PlayerAction::Raise { amount: 20 })
        .expect("open");
    assert_eq!(engine.state().chips_in_play(), start);
    engine.apply_action(1, PlayerAction::Call).expect("call");
    assert_eq!(engine.state().chips_in_play(), start);
    engine.apply_action(2, PlayerAction::Fold).expect("fold");
    assert_eq!(engine.state().chips_in_play(), start);

    // Flop: check, bet, call.
    let actor = engine.current_actor().expect("postflop actor");
    engine.apply_action(actor, PlayerAction::Check).expect("check");
    let actor = engine.current_actor().expect("next actor");
    engine
        .apply_action(actor, PlayerAction::Bet { amount: 60 })
        .expect("bet");
    assert_eq!(engine.state().chips_in_play(), start);
    let actor = engine.current_actor().expect("caller");
    engine.apply_action(actor, PlayerAction::Call).expect("call");
    assert_eq!(engine.state().chips_in_play(), start);

    // Turn and river check down.
    while engine.status() == TableStatus::InHand {
        let actor = engine.current_actor().expect("actor");
        engine.apply_action(actor, PlayerAction::Check).expect("check");
    }
    assert_eq!(engine.state().chips_in_play(), start);
    assert_eq!(engine.state().pot, 0);
}

#[test]
fn rejected_actions_leave_state_untouched() {
    let mut engine = table(&[400, 400, 400]);
    engine.begin_hand().expect("hand starts");
    let before = engine.view();

    // Not this seat's turn.
    assert!(engine.apply_action(2, PlayerAction::Fold).is_err());
    // Under-raise from the actor.
    assert!(engine
        .apply_action(0, PlayerAction::Raise { amount: 3 })
        .is_err());
    // Bet while the blinds are live.
    assert!(engine
        .apply_action(0, PlayerAction::Bet { amount: 50 })
        .is_err());

    assert_eq!(engine.view(), before);
}
