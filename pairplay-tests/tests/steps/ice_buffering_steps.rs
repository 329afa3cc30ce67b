use cucumber::{given, then, when};
use pairplay_core::Message;
use pairplay_p2p::NegotiationPhase;
use pairplay_tests::PairPlayWorld;
use serde_json::json;

async fn deliver(world: &mut PairPlayWorld, frame: serde_json::Value) {
    let message = Message::decode(&frame.to_string()).expect("relay frame should decode");
    world
        .negotiator
        .handle_signal(&message)
        .await
        .expect("signal should be accepted");
}

// ===== Given Steps =====

#[given("an idle call negotiator")]
async fn idle_negotiator(world: &mut PairPlayWorld) {
    assert_eq!(world.negotiator.phase(), NegotiationPhase::Idle);
    assert!(!world.negotiator.has_peer_connection());
}

// ===== When Steps =====

#[when(expr = "the relay delivers candidate {string}")]
async fn deliver_candidate(world: &mut PairPlayWorld, candidate: String) {
    let frame = json!({
        "type": "rtc:ice",
        "data": { "candidate": candidate, "sdpMid": "0", "sdpMLineIndex": 0 }
    });
    deliver(world, frame).await;
}

#[when("the relay delivers an offer")]
async fn deliver_offer(world: &mut PairPlayWorld) {
    let frame = json!({
        "type": "rtc:offer",
        "data": { "type": "offer", "sdp": "v=0 remote-offer" }
    });
    deliver(world, frame).await;
}

#[when("the relay delivers an answer")]
async fn deliver_answer(world: &mut PairPlayWorld) {
    let frame = json!({
        "type": "rtc:answer",
        "data": { "type": "answer", "sdp": "v=0 remote-answer" }
    });
    deliver(world, frame).await;
}

#[when("the local player starts a call")]
async fn start_call(world: &mut PairPlayWorld) {
    world
        .negotiator
        .start_call()
        .await
        .expect("call should start without media");
}

#[when("the call is torn down")]
async fn tear_down(world: &mut PairPlayWorld) {
    world.negotiator.teardown();
}

// ===== Then Steps =====

#[then(expr = "{int} candidate(s) is/are pending")]
async fn candidates_pending(world: &mut PairPlayWorld, count: usize) {
    assert_eq!(world.negotiator.pending_candidates(), count);
}

#[then("no candidate was applied yet")]
async fn none_applied(world: &mut PairPlayWorld) {
    assert!(world.peer_log.applied_candidates().is_empty());
}

#[then(expr = "candidates {string} were applied in order")]
async fn applied_in_order(world: &mut PairPlayWorld, expected: String) {
    let expected: Vec<String> = expected.split(',').map(|c| c.trim().to_string()).collect();
    assert_eq!(world.peer_log.applied_candidates(), expected);
}

#[then("an answer was sent")]
async fn answer_sent(world: &mut PairPlayWorld) {
    assert_eq!(world.outbox.tags(), vec!["rtc:answer"]);
}

#[then("an offer was sent")]
async fn offer_sent(world: &mut PairPlayWorld) {
    assert_eq!(world.outbox.tags(), vec!["rtc:offer"]);
    assert_eq!(world.negotiator.phase(), NegotiationPhase::Negotiating);
}
