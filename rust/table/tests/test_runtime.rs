use std::time::Duration;

use flophouse_ai::RiskProfile;
use flophouse_engine::errors::{ActionError, EngineError};
use flophouse_engine::events::EngineEvent;
use flophouse_engine::rng::{SeedPolicy, SeedSchedule};
use flophouse_engine::rules::PlayerAction;
use flophouse_engine::table::{SeatConfig, TableConfig, TableRules};
use flophouse_table::runtime::RuntimeError;
use flophouse_table::{TableNotice, TableRegistry, TimingProfile};
use tokio::time::timeout;

fn config(stacks: &[u32], cpu: bool, base: u32) -> TableConfig {
    TableConfig {
        seats: stacks
            .iter()
            .map(|&stack| SeatConfig { stack, is_cpu: cpu })
            .collect(),
        rules: TableRules::new(5, 10),
        seed: SeedPolicy::Seeded(SeedSchedule::new(base, 7_919)),
    }
}

fn manual_sim_timing() -> TimingProfile {
    TimingProfile {
        auto_begin: false,
        ..TimingProfile::simulation()
    }
}

/// Patient profile for human-driven tests: nothing times out under test.
fn patient_timing() -> TimingProfile {
    TimingProfile {
        auto_begin: false,
        human_action_timeout: Duration::from_secs(60),
        street_timeout: Duration::from_secs(60),
        hand_timeout: Duration::from_secs(60),
        ..TimingProfile::simulation()
    }
}

async fn next_notice(
    sub: &mut flophouse_table::NoticeSubscription,
) -> TableNotice {
    timeout(Duration::from_secs(5), sub.receiver.recv())
        .await
        .expect("notice within deadline")
        .expect("bus open")
}

#[tokio::test]
async fn cpu_table_plays_a_hand_to_completion() {
    let registry = TableRegistry::new();
    let id = registry
        .open(
            config(&[500, 500, 500], true, 21),
            manual_sim_timing(),
            RiskProfile::Standard,
        )
        .expect("table opens");
    let mut sub = registry.subscribe(&id);
    let handle = registry.handle(&id).expect("handle");

    handle.begin_hand().await.expect("hand begins");

    let mut saw_started = false;
    let mut saw_ended = false;
    let record = loop {
        match next_notice(&mut sub).await {
            TableNotice::Engine {
                event: EngineEvent::HandStarted { .. },
                ..
            } => saw_started = true,
            TableNotice::Engine {
                event: EngineEvent::HandEnded { .. },
                ..
            } => {
                assert!(saw_started, "hand ended before it started");
                saw_ended = true;
            }
            TableNotice::HandRecorded { record, .. } => {
                assert!(saw_ended, "record published before the hand ended");
                break record;
            }
            TableNotice::Error { message, .. } => panic!("table error: {message}"),
            _ => {}
        }
    };

    // The runtime stamps the record before publishing.
    assert!(record.ts.is_some());
    assert_eq!(record.hand_id, 1);
    assert!(!record.actions.is_empty());

    registry.close_all().await;
}

#[tokio::test]
async fn auto_deal_keeps_hands_coming() {
    let registry = TableRegistry::new();
    // Subscribe before the actor starts dealing on its own.
    let id = registry
        .open(
            config(&[20_000, 20_000], true, 5),
            TimingProfile::simulation(),
            RiskProfile::Standard,
        )
        .expect("table opens");
    let mut sub = registry.subscribe(&id);

    let mut hands_seen = std::collections::HashSet::new();
    while hands_seen.len() < 3 {
        if let TableNotice::Engine {
            event: EngineEvent::HandEnded { hand_id, .. },
            ..
        } = next_notice(&mut sub).await
        {
            hands_seen.insert(hand_id);
        }
    }

    registry.close_all().await;
}

#[tokio::test]
async fn snapshots_mask_other_seats_hole_cards() {
    let registry = TableRegistry::new();
    let id = registry
        .open(
            config(&[500, 500], false, 9),
            patient_timing(),
            RiskProfile::Standard,
        )
        .expect("table opens");
    let handle = registry.handle(&id).expect("handle");
    handle.begin_hand().await.expect("hand begins");

    let public = handle.snapshot(None).await.expect("snapshot");
    assert!(public.seats.iter().all(|s| s.hole.is_none()));

    let own = handle.snapshot(Some(1)).await.expect("snapshot");
    assert!(own.seats[1].hole.is_some());
    assert!(own.seats[0].hole.is_none());

    registry.close_all().await;
}

#[tokio::test]
async fn handle_act_validates_like_the_engine() {
    let registry = TableRegistry::new();
    let id = registry
        .open(
            config(&[500, 500], false, 13),
            patient_timing(),
            RiskProfile::Standard,
        )
        .expect("table opens");
    let handle = registry.handle(&id).expect("handle");
    handle.begin_hand().await.expect("hand begins");

    // Heads-up: seat 0 is the button and acts first. Seat 1 is rejected.
    let err = handle.act(1, PlayerAction::Fold).await.unwrap_err();
    match err {
        RuntimeError::Engine(EngineError::Rejected(ActionError::NotYourTurn {
            seat: 1,
            expected: 0,
        })) => {}
        other => panic!("unexpected error: {other:?}"),
    }

    handle.act(0, PlayerAction::Call).await.expect("limp");
    let view = handle.snapshot(None).await.expect("snapshot");
    assert_eq!(view.to_act, Some(1));

    registry.close_all().await;
}

#[tokio::test]
async fn human_timeouts_check_or_fold_the_hand_down() {
    let registry = TableRegistry::new();
    // Humans who never act: the 200ms timeout plays for them.
    let id = registry
        .open(
            config(&[500, 500], false, 17),
            manual_sim_timing(),
            RiskProfile::Standard,
        )
        .expect("table opens");
    let mut sub = registry.subscribe(&id);
    let handle = registry.handle(&id).expect("handle");
    handle.begin_hand().await.expect("hand begins");

    loop {
        if let TableNotice::Engine {
            event: EngineEvent::HandEnded { .. },
            ..
        } = next_notice(&mut sub).await
        {
            break;
        }
    }

    registry.close_all().await;
}

#[tokio::test]
async fn set_auto_flips_a_seat_to_cpu_control() {
    let registry = TableRegistry::new();
    let id = registry
        .open(
            config(&[500, 500], false, 19),
            patient_timing(),
            RiskProfile::Standard,
        )
        .expect("table opens");
    let mut sub = registry.subscribe(&id);
    let handle = registry.handle(&id).expect("handle");
    handle.begin_hand().await.expect("hand begins");

    // Nobody acted yet; hand the acting seat to the CPU.
    handle.set_auto(0, true).await.expect("set auto");

    let acted = loop {
        if let TableNotice::Engine {
            event: EngineEvent::ActionApplied { seat, .. },
            ..
        } = next_notice(&mut sub).await
        {
            break seat;
        }
    };
    assert_eq!(acted, 0);

    registry.close_all().await;
}

#[tokio::test]
async fn closing_a_table_broadcasts_and_unregisters() {
    let registry = TableRegistry::new();
    let id = registry
        .open(
            config(&[500, 500], false, 23),
            patient_timing(),
            RiskProfile::Standard,
        )
        .expect("table opens");
    let mut sub = registry.subscribe(&id);

    assert!(registry.close(&id).await);
    let closed = loop {
        match next_notice(&mut sub).await {
            TableNotice::Closed { table_id, .. } => break table_id,
            _ => {}
        }
    };
    assert_eq!(closed, id);
    assert!(registry.handle(&id).is_none());
    assert!(registry.active_tables().is_empty());
    assert!(!registry.close(&id).await);
}
