use cucumber::{given, then, when};
use pairplay_core::{Dispatch, Message, PlayerId, PlayerInfo, RoomCode, RoomEvent};
use pairplay_tests::PairPlayWorld;

fn last_room_event(world: &PairPlayWorld) -> &RoomEvent {
    match world.last_dispatch() {
        Some(Dispatch::Room(event)) => event,
        other => panic!("Expected a room event, got {:?}", other),
    }
}

// ===== Given Steps =====

#[given(expr = "{string} is in room {string} as {string} with partner {string} as {string}")]
async fn in_room_with_partner(
    world: &mut PairPlayWorld,
    name: String,
    code: String,
    player_id: String,
    partner: String,
    partner_id: String,
) {
    world.rooms.create_room(name.clone(), None);
    world.receive(Message::RoomCreated {
        room_code: RoomCode::new(code),
        player_id: PlayerId::new(player_id.clone()),
        players: Some(vec![
            PlayerInfo::new(player_id, name),
            PlayerInfo::new(partner_id, partner),
        ]),
    });
}

// ===== When Steps =====

#[when(expr = "{string} creates a room")]
async fn creates_room(world: &mut PairPlayWorld, name: String) {
    world.rooms.create_room(name, None);
}

#[when(expr = "{string} joins room {string}")]
async fn joins_room(world: &mut PairPlayWorld, name: String, code: String) {
    world.rooms.join_room(RoomCode::new(code), name, None);
}

#[when(expr = "the relay confirms room {string} for player {string}")]
async fn relay_confirms_room(world: &mut PairPlayWorld, code: String, player_id: String) {
    world.receive(Message::RoomCreated {
        room_code: RoomCode::new(code),
        player_id: PlayerId::new(player_id),
        players: None,
    });
}

#[when(expr = "the relay acknowledges joining room {string} as player {string}")]
async fn relay_acknowledges_join(world: &mut PairPlayWorld, code: String, player_id: String) {
    world.receive(Message::RoomJoinedAck {
        room_code: RoomCode::new(code),
        player_id: PlayerId::new(player_id),
    });
}

#[when(expr = "the relay reports player {string} left room {string}")]
async fn relay_reports_player_left(world: &mut PairPlayWorld, player_id: String, code: String) {
    world.receive(Message::RoomPlayerLeft {
        player_id: PlayerId::new(player_id),
        player_name: None,
        reason: Some("leave".to_string()),
        room_code: Some(RoomCode::new(code)),
        players: None,
    });
}

#[when(expr = "the relay starts a {string} game with seed {int}")]
async fn relay_starts_game(world: &mut PairPlayWorld, game: String, seed: u64) {
    world.receive(Message::GameStart {
        game,
        age: 7,
        total_questions: 5,
        seed: Some(seed),
    });
}

#[when("the local player leaves")]
async fn local_player_leaves(world: &mut PairPlayWorld) {
    let frame = world.rooms.leave();
    assert_eq!(frame, Message::RoomLeave);
}

#[when("the connection is lost for good")]
async fn connection_lost(world: &mut PairPlayWorld) {
    let dispatch = world.rooms.on_connection_lost();
    world.dispatches.push(dispatch);
}

// ===== Then Steps =====

#[then(expr = "the session is in room {string}")]
async fn session_in_room(world: &mut PairPlayWorld, code: String) {
    assert_eq!(
        world.rooms.session().room_code(),
        Some(&RoomCode::new(code))
    );
}

#[then("the session is not in a room")]
async fn session_not_in_room(world: &mut PairPlayWorld) {
    assert!(!world.rooms.session().in_room());
}

#[then("the local player is host")]
async fn local_player_is_host(world: &mut PairPlayWorld) {
    assert!(world.rooms.session().is_host());
}

#[then("the local player is not host")]
async fn local_player_is_not_host(world: &mut PairPlayWorld) {
    assert!(!world.rooms.session().is_host());
}

#[then("the last room event is a creation")]
async fn last_event_is_creation(world: &mut PairPlayWorld) {
    assert!(matches!(last_room_event(world), RoomEvent::Created { .. }));
}

#[then(expr = "the roster has {int} player(s)")]
async fn roster_size(world: &mut PairPlayWorld, count: usize) {
    assert_eq!(world.rooms.session().roster().len(), count);
}

#[then(expr = "the last room event says {string} left")]
async fn last_event_says_left(world: &mut PairPlayWorld, name: String) {
    match last_room_event(world) {
        RoomEvent::PlayerLeft {
            player_name, local, ..
        } => {
            assert_eq!(player_name.as_deref(), Some(name.as_str()));
            assert!(!local);
        }
        other => panic!("Expected PlayerLeft, got {:?}", other),
    }
}

#[then("the last room event is a local departure")]
async fn last_event_is_local_departure(world: &mut PairPlayWorld) {
    assert!(matches!(
        last_room_event(world),
        RoomEvent::PlayerLeft { local: true, .. }
    ));
}

#[then("no dispatch was produced")]
async fn no_dispatch(world: &mut PairPlayWorld) {
    assert!(world.dispatches.is_empty());
}

#[then("there is no room to rejoin")]
async fn no_room_to_rejoin(world: &mut PairPlayWorld) {
    assert!(world.rooms.membership().is_none());
}
