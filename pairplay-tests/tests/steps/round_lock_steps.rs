use cucumber::{given, then, when};
use pairplay_core::{
    generate_questions, ActionSyncAdapter, GameAction, GameUpdate, MathQuiz, PlayerId,
    RemoteApply, SyncError, SyncableGame,
};
use pairplay_tests::PairPlayWorld;

const QUIZ_AGE: u8 = 6;
const QUIZ_LENGTH: u32 = 5;

fn correct_answer(world: &PairPlayWorld, round: u32) -> i64 {
    generate_questions(world.quiz_seed, QUIZ_AGE, QUIZ_LENGTH)[round as usize].answer()
}

fn answer_update(player_id: &str, round: u32, answer: i64) -> GameUpdate {
    let action = GameAction::new("answer", round).with_field("answer", answer);
    GameUpdate::echo_of(&action, PlayerId::new(player_id))
}

// ===== Given Steps =====

#[given(expr = "a math quiz for player {string} with seed {int}")]
async fn math_quiz(world: &mut PairPlayWorld, player_id: String, seed: u64) {
    world.quiz_seed = seed;
    world.quiz = Some(ActionSyncAdapter::new(MathQuiz::new(
        PlayerId::new(player_id),
        seed,
        QUIZ_AGE,
        QUIZ_LENGTH,
    )));
}

// ===== When Steps =====

#[when("the local player answers correctly")]
async fn answers_correctly(world: &mut PairPlayWorld) {
    let round = world.quiz().game().current_round();
    let answer = correct_answer(world, round);
    world.last_sync = Some(world.quiz().on_local_action(answer));
}

#[when(expr = "the relay echoes the answer from {string}")]
async fn relay_echoes(world: &mut PairPlayWorld, player_id: String) {
    let action = match &world.last_sync {
        Some(Ok(action)) => action.clone(),
        other => panic!("No answer was sent: {:?}", other),
    };
    let update = GameUpdate::echo_of(&action, PlayerId::new(player_id));
    world.last_apply = Some(world.quiz().on_remote_action(&update));
}

#[when(expr = "the relay reports {string} answered correctly in round {int}")]
async fn relay_reports_correct(world: &mut PairPlayWorld, player_id: String, round: u32) {
    let answer = correct_answer(world, round);
    let update = answer_update(&player_id, round, answer);
    world.last_apply = Some(world.quiz().on_remote_action(&update));
}

#[when(expr = "the relay reports {string} answered wrongly in round {int}")]
async fn relay_reports_wrong(world: &mut PairPlayWorld, player_id: String, round: u32) {
    let answer = correct_answer(world, round) + 1;
    let update = answer_update(&player_id, round, answer);
    world.last_apply = Some(world.quiz().on_remote_action(&update));
}

// ===== Then Steps =====

#[then(expr = "the answer action is for round {int}")]
async fn action_for_round(world: &mut PairPlayWorld, round: u32) {
    match &world.last_sync {
        Some(Ok(action)) => assert_eq!(action.round, round),
        other => panic!("Expected an action, got {:?}", other),
    }
}

#[then(expr = "the answer is refused because round {int} is locked")]
async fn answer_refused(world: &mut PairPlayWorld, round: u32) {
    assert_eq!(
        world.last_sync,
        Some(Err(SyncError::RoundLocked { round }))
    );
}

#[then("the round was resolved")]
async fn round_resolved(world: &mut PairPlayWorld) {
    assert_eq!(world.last_apply, Some(RemoteApply::Applied { resolved: true }));
    assert!(!world.quiz().lock().is_locked());
}

#[then("the round was not resolved")]
async fn round_not_resolved(world: &mut PairPlayWorld) {
    assert_eq!(world.last_apply, Some(RemoteApply::Applied { resolved: false }));
}

#[then(expr = "the quiz is at round {int}")]
async fn quiz_round(world: &mut PairPlayWorld, round: u32) {
    assert_eq!(world.quiz().game().current_round(), round);
}

#[then(expr = "{string} has {int} point(s)")]
async fn player_points(world: &mut PairPlayWorld, player_id: String, points: u32) {
    assert_eq!(
        world.quiz().game().scores().get(&PlayerId::new(player_id)),
        Some(&points)
    );
}

#[then("the update was stale")]
async fn update_stale(world: &mut PairPlayWorld) {
    assert_eq!(world.last_apply, Some(RemoteApply::Stale));
}

#[then("a desync was detected")]
async fn desync_detected(world: &mut PairPlayWorld) {
    assert!(matches!(world.last_apply, Some(RemoteApply::Desync { .. })));
    assert_eq!(world.quiz().desync_count(), 1);
}

#[then("the local player can answer again")]
async fn can_answer_again(world: &mut PairPlayWorld) {
    let round = world.quiz().game().current_round();
    let answer = correct_answer(world, round);
    assert!(world.quiz().on_local_action(answer).is_ok());
}
