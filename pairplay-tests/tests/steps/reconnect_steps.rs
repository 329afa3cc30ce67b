use cucumber::{given, then, when};
use pairplay_core::{CloseDecision, Message, RoomCode, RoomMembership, ReconnectState};
use pairplay_tests::PairPlayWorld;
use std::time::Duration;

// ===== Given Steps =====

#[given("the default reconnect policy")]
async fn default_policy(world: &mut PairPlayWorld) {
    world.reconnect = ReconnectState::default();
}

#[given(expr = "a connected session remembering room {string} as {string}")]
async fn connected_session(world: &mut PairPlayWorld, code: String, name: String) {
    world.reconnect.begin_connect();
    world.reconnect.on_open();
    world
        .reconnect
        .remember_room(RoomMembership::new(RoomCode::new(code), name));
}

// ===== When Steps =====

#[when(expr = "the link closes with code {int}")]
async fn link_closes(world: &mut PairPlayWorld, code: u16) {
    let decision = world.reconnect.on_close(Some(code));
    world.decisions.push(decision);
}

#[when(expr = "the link fails {int} times in a row")]
async fn link_fails(world: &mut PairPlayWorld, times: u32) {
    for _ in 0..times {
        let decision = world.reconnect.on_close(None);
        world.decisions.push(decision);
    }
}

#[when("the link opens again")]
async fn link_opens(world: &mut PairPlayWorld) {
    world.rejoin = world.reconnect.on_open();
}

#[when("the user disconnects")]
async fn user_disconnects(world: &mut PairPlayWorld) {
    world.reconnect.mark_intentional();
}

#[when("the user connects again")]
async fn user_connects_again(world: &mut PairPlayWorld) {
    world.decisions.clear();
    world.reconnect.begin_connect();
}

// ===== Then Steps =====

#[then(expr = "attempt {int} waits {int} ms")]
async fn attempt_waits(world: &mut PairPlayWorld, attempt: u32, millis: u64) {
    assert_eq!(
        world.reconnect.policy().delay_for(attempt),
        Duration::from_millis(millis)
    );
}

#[then(expr = "a retry is scheduled as attempt {int} after {int} ms")]
async fn retry_scheduled(world: &mut PairPlayWorld, attempt: u32, millis: u64) {
    assert_eq!(
        world.decisions.last(),
        Some(&CloseDecision::Retry {
            attempt,
            delay: Duration::from_millis(millis),
        })
    );
}

#[then("no retry is scheduled")]
async fn no_retry(world: &mut PairPlayWorld) {
    assert_eq!(world.decisions.last(), Some(&CloseDecision::Stay));
}

#[then(expr = "the rejoin frame for room {string} as {string} is sent")]
async fn rejoin_sent(world: &mut PairPlayWorld, code: String, name: String) {
    assert_eq!(
        world.rejoin,
        Some(Message::RoomRejoin {
            room_code: RoomCode::new(code),
            player_name: name,
            avatar: None,
        })
    );
}

#[then(expr = "the attempt counter is {int}")]
async fn attempt_counter(world: &mut PairPlayWorld, count: u32) {
    assert_eq!(world.reconnect.attempt_count(), count);
}

#[then(expr = "{int} retries were scheduled")]
async fn retries_scheduled(world: &mut PairPlayWorld, count: usize) {
    let retries: Vec<u32> = world
        .decisions
        .iter()
        .filter_map(|d| match d {
            CloseDecision::Retry { attempt, .. } => Some(*attempt),
            _ => None,
        })
        .collect();
    assert_eq!(retries.len(), count);
    assert_eq!(retries, (1..=count as u32).collect::<Vec<_>>());
}

#[then("the session gave up exactly once")]
async fn gave_up_once(world: &mut PairPlayWorld) {
    let give_ups = world
        .decisions
        .iter()
        .filter(|d| **d == CloseDecision::GiveUp)
        .count();
    assert_eq!(give_ups, 1);
    assert!(world.reconnect.is_exhausted());
}

#[then("the remembered room is forgotten")]
async fn room_forgotten(world: &mut PairPlayWorld) {
    assert!(world.reconnect.membership().is_none());
}
