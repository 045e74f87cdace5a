//! State machine tests for the playback coordinator.

use super::*;
use crate::model::MediaLocator;
use crate::sim::{CommandLog, PlayerCommand, SimBackend, SimClock};
use proptest::prelude::*;

// ===== Test Helpers =====

const DELAY: Duration = Duration::from_millis(100);

fn item(id: &str) -> FeedItem {
    FeedItem::new(
        ItemId::new(id).unwrap(),
        MediaLocator::new(format!("mem://{id}")).unwrap(),
    )
}

fn failing_item(id: &str) -> FeedItem {
    FeedItem::new(
        ItemId::new(id).unwrap(),
        MediaLocator::new(format!("fail:{id}")).unwrap(),
    )
}

fn id(raw: &str) -> ItemId {
    ItemId::new(raw).unwrap()
}

struct Harness {
    clock: SimClock,
    log: CommandLog,
    coordinator: PlaybackCoordinator<SimBackend>,
}

impl Harness {
    fn new() -> Self {
        Self::with_host(HostState::Foreground)
    }

    fn with_host(host: HostState) -> Self {
        let clock = SimClock::new();
        let backend = SimBackend::new(clock.clone(), DELAY);
        let log = backend.log();
        Self {
            clock,
            log,
            coordinator: PlaybackCoordinator::with_host_state(backend, host),
        }
    }

    /// Advance virtual time and deliver every completion that became ready.
    fn advance(&mut self, delta: Duration) -> Vec<CompletionOutcome> {
        self.clock.advance(delta);
        let ready = self.coordinator.backend_mut().poll_completions();
        ready
            .into_iter()
            .map(|(ticket, result)| self.coordinator.on_prepare_complete(ticket, result))
            .collect()
    }

    fn live_handles(&self) -> usize {
        self.coordinator.backend().live_handles()
    }
}

// ===== Idle / Loading =====

#[test]
fn starts_idle_without_handle() {
    let harness = Harness::new();
    assert_eq!(harness.coordinator.state(), CoordinatorState::Idle);
    assert!(harness.coordinator.handle().is_none());
    assert!(harness.coordinator.bound_item().is_none());
}

#[test]
fn focus_moves_idle_to_loading() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));

    assert_eq!(harness.coordinator.state(), CoordinatorState::Loading);
    assert_eq!(harness.coordinator.bound_item(), Some(&id("a")));
    assert!(
        harness.coordinator.handle().is_none(),
        "handle is not exposed while loading"
    );
    assert!(harness.coordinator.pending_ticket().is_some());
}

#[test]
fn prepare_success_in_foreground_plays() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    let outcomes = harness.advance(DELAY);

    assert_eq!(outcomes, vec![CompletionOutcome::Bound(CoordinatorState::Playing)]);
    assert_eq!(harness.coordinator.state(), CoordinatorState::Playing);
    assert!(harness.coordinator.handle().unwrap().is_playing());
}

#[test]
fn prepare_success_in_background_stays_paused() {
    let mut harness = Harness::with_host(HostState::Background);
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.advance(DELAY);

    assert_eq!(harness.coordinator.state(), CoordinatorState::ReadyPaused);
    assert!(!harness.coordinator.handle().unwrap().is_playing());
}

#[test]
fn prepare_failure_returns_to_idle_and_surfaces_error() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&failing_item("a")));
    let outcomes = harness.advance(DELAY);

    assert!(matches!(
        outcomes.as_slice(),
        [CompletionOutcome::Failed(PlaybackError::PrepareFailed { item, .. })] if item.as_str() == "a"
    ));
    assert_eq!(harness.coordinator.state(), CoordinatorState::Idle);
    assert!(harness.coordinator.last_error().is_some());
    assert_eq!(harness.live_handles(), 0, "failed handle must be released");
}

#[test]
fn resending_same_focus_after_failure_retries() {
    let mut harness = Harness::new();
    let broken = failing_item("a");
    harness.coordinator.on_focus_changed(Some(&broken));
    harness.advance(DELAY);
    assert_eq!(harness.coordinator.state(), CoordinatorState::Idle);

    harness.coordinator.on_focus_changed(Some(&broken));
    assert_eq!(harness.coordinator.state(), CoordinatorState::Loading);
    assert!(harness.coordinator.last_error().is_none(), "new prepare clears error");
}

#[test]
fn same_focus_while_bound_is_noop() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    let ticket = harness.coordinator.pending_ticket();
    harness.coordinator.on_focus_changed(Some(&item("a")));

    assert_eq!(harness.coordinator.pending_ticket(), ticket);
    let loads = harness
        .log
        .snapshot()
        .into_iter()
        .filter(|c| matches!(c, PlayerCommand::Load { .. }))
        .count();
    assert_eq!(loads, 1);
}

// ===== Last call wins =====

#[test]
fn stale_completion_is_discarded() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    let stale = harness.coordinator.pending_ticket().unwrap();
    harness.coordinator.on_focus_changed(Some(&item("b")));

    let outcome = harness.coordinator.on_prepare_complete(stale, Ok(()));
    assert_eq!(outcome, CompletionOutcome::Stale);
    assert_eq!(harness.coordinator.state(), CoordinatorState::Loading);
    assert_eq!(harness.coordinator.bound_item(), Some(&id("b")));
}

#[test]
fn superseded_prepare_releases_its_handle_before_next_load() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.coordinator.on_focus_changed(Some(&item("b")));

    let commands = harness.log.snapshot();
    assert_eq!(
        commands,
        vec![
            PlayerCommand::Load {
                item: "a".to_string(),
                media: "mem://a".to_string(),
                start_ms: 0
            },
            PlayerCommand::Release {
                item: "a".to_string(),
                position_ms: 0
            },
            PlayerCommand::Load {
                item: "b".to_string(),
                media: "mem://b".to_string(),
                start_ms: 0
            },
        ]
    );
    assert_eq!(harness.live_handles(), 1);
}

#[test]
fn rapid_focus_changes_only_bind_final_target() {
    let mut harness = Harness::new();
    for name in ["a", "b", "c", "d"] {
        harness.coordinator.on_focus_changed(Some(&item(name)));
        harness.clock.advance(Duration::from_millis(10));
    }
    let outcomes = harness.advance(DELAY);

    let bound = outcomes
        .iter()
        .filter(|o| matches!(o, CompletionOutcome::Bound(_)))
        .count();
    assert_eq!(bound, 1);
    assert_eq!(harness.coordinator.state(), CoordinatorState::Playing);
    assert_eq!(harness.coordinator.bound_item(), Some(&id("d")));
    assert_eq!(harness.live_handles(), 1);
}

// ===== Focus change while loaded =====

#[test]
fn switching_focus_captures_outgoing_position() {
    // items=[A,B,C]; A plays, focus jumps to C.
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.advance(DELAY);
    assert_eq!(harness.coordinator.state(), CoordinatorState::Playing);

    harness.clock.advance(Duration::from_millis(1_500));
    harness.coordinator.on_focus_changed(Some(&item("c")));
    assert_eq!(harness.coordinator.state(), CoordinatorState::Loading);
    assert_eq!(
        harness.coordinator.resume_offset(&id("a")),
        Some(Duration::from_millis(1_500))
    );

    harness.advance(DELAY);
    assert_eq!(harness.coordinator.state(), CoordinatorState::Playing);
    assert_eq!(harness.coordinator.bound_item(), Some(&id("c")));
}

#[test]
fn refocusing_resumes_from_captured_position() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.advance(DELAY);
    harness.clock.advance(Duration::from_millis(700));
    harness.coordinator.on_focus_changed(Some(&item("b")));
    harness.log.drain();

    harness.coordinator.on_focus_changed(Some(&item("a")));
    let commands = harness.log.drain();
    assert!(commands.contains(&PlayerCommand::Load {
        item: "a".to_string(),
        media: "mem://a".to_string(),
        start_ms: 700
    }));
}

#[test]
fn item_resume_offset_seeds_first_load() {
    let mut harness = Harness::new();
    let seeded = item("a").with_resume_offset(Duration::from_secs(3));
    harness.coordinator.on_focus_changed(Some(&seeded));

    assert_eq!(
        harness.log.snapshot()[0],
        PlayerCommand::Load {
            item: "a".to_string(),
            media: "mem://a".to_string(),
            start_ms: 3_000
        }
    );
}

#[test]
fn null_focus_releases_and_goes_idle() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.advance(DELAY);
    harness.clock.advance(Duration::from_millis(200));
    harness.coordinator.on_focus_changed(None);

    assert_eq!(harness.coordinator.state(), CoordinatorState::Idle);
    assert_eq!(harness.live_handles(), 0);
    assert_eq!(
        harness.coordinator.resume_offset(&id("a")),
        Some(Duration::from_millis(200))
    );
}

// ===== Host lifecycle =====

#[test]
fn background_pauses_and_foreground_resumes_same_resource() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("b")));
    harness.advance(DELAY);
    harness.clock.advance(Duration::from_millis(400));

    harness.coordinator.on_host_lifecycle(HostEvent::Backgrounded);
    assert_eq!(harness.coordinator.state(), CoordinatorState::ReadyPaused);
    assert_eq!(harness.coordinator.bound_item(), Some(&id("b")));

    harness.clock.advance(Duration::from_secs(10));
    assert_eq!(
        harness.coordinator.position(),
        Some(Duration::from_millis(400)),
        "position is retained while paused"
    );

    harness.coordinator.on_host_lifecycle(HostEvent::Foregrounded);
    assert_eq!(harness.coordinator.state(), CoordinatorState::Playing);
    assert_eq!(harness.live_handles(), 1);

    let tail: Vec<_> = harness.log.snapshot().into_iter().rev().take(2).collect();
    assert_eq!(
        tail,
        vec![
            PlayerCommand::Play {
                item: "b".to_string(),
                position_ms: 400
            },
            PlayerCommand::Pause {
                item: "b".to_string(),
                position_ms: 400
            },
        ]
    );
}

#[test]
fn background_while_loading_binds_paused() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.coordinator.on_host_lifecycle(HostEvent::Backgrounded);
    harness.advance(DELAY);
    assert_eq!(harness.coordinator.state(), CoordinatorState::ReadyPaused);
}

#[test]
fn focus_change_from_ready_paused_loads_new_item() {
    let mut harness = Harness::with_host(HostState::Background);
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.advance(DELAY);
    harness.coordinator.on_focus_changed(Some(&item("b")));

    assert_eq!(harness.coordinator.state(), CoordinatorState::Loading);
    assert_eq!(harness.live_handles(), 1);
}

#[test]
fn repeated_background_is_noop() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.advance(DELAY);
    harness.coordinator.on_host_lifecycle(HostEvent::Backgrounded);
    let before = harness.log.snapshot().len();
    harness.coordinator.on_host_lifecycle(HostEvent::Backgrounded);
    assert_eq!(harness.log.snapshot().len(), before);
    assert_eq!(harness.coordinator.state(), CoordinatorState::ReadyPaused);
}

#[test]
fn destroyed_event_disposes() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.advance(DELAY);
    harness.coordinator.on_host_lifecycle(HostEvent::Destroyed);
    assert_eq!(harness.coordinator.state(), CoordinatorState::Released);
    assert_eq!(harness.live_handles(), 0);
}

// ===== Dispose =====

#[test]
fn dispose_is_idempotent() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.advance(DELAY);
    harness.coordinator.dispose();
    let commands = harness.log.snapshot().len();
    harness.coordinator.dispose();

    assert_eq!(harness.coordinator.state(), CoordinatorState::Released);
    assert_eq!(harness.log.snapshot().len(), commands);
}

#[test]
fn focus_after_dispose_has_no_effect() {
    let mut harness = Harness::new();
    harness.coordinator.dispose();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.coordinator.on_host_lifecycle(HostEvent::Foregrounded);

    assert_eq!(harness.coordinator.state(), CoordinatorState::Released);
    assert!(harness.log.snapshot().is_empty());
}

#[test]
fn dispose_during_loading_releases_and_discards_completion() {
    let mut harness = Harness::new();
    harness.coordinator.on_focus_changed(Some(&item("a")));
    harness.coordinator.dispose();
    assert_eq!(harness.live_handles(), 0);

    let outcomes = harness.advance(DELAY);
    assert_eq!(outcomes, vec![CompletionOutcome::Stale]);
    assert_eq!(harness.coordinator.state(), CoordinatorState::Released);
}

#[test]
fn drop_releases_bound_resource() {
    let clock = SimClock::new();
    let backend = SimBackend::new(clock, Duration::ZERO);
    let log = backend.log();
    {
        let mut coordinator = PlaybackCoordinator::new(backend);
        coordinator.on_focus_changed(Some(&item("a")));
    }
    assert!(matches!(
        log.snapshot().last(),
        Some(PlayerCommand::Release { item, .. }) if item == "a"
    ));
}

// ===== Properties =====

#[derive(Debug, Clone)]
enum Step {
    Focus(Option<usize>),
    Host(bool),
    Advance(u64),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        prop::option::of(0usize..4).prop_map(Step::Focus),
        any::<bool>().prop_map(Step::Host),
        (0u64..150).prop_map(Step::Advance),
    ]
}

proptest! {
    /// Never more than one live resource, and a loaded resource always
    /// belongs to the most recent focus.
    #[test]
    fn prop_single_resource_bound_to_latest_focus(steps in prop::collection::vec(arb_step(), 1..40)) {
        let items: Vec<FeedItem> = ["a", "b", "c", "d"].iter().map(|n| item(n)).collect();
        let mut harness = Harness::new();
        let mut latest: Option<ItemId> = None;

        for step in steps {
            match step {
                Step::Focus(index) => {
                    let focus = index.map(|i| &items[i]);
                    latest = focus.map(|item| item.id().clone());
                    harness.coordinator.on_focus_changed(focus);
                }
                Step::Host(foreground) => harness.coordinator.on_host_lifecycle(if foreground {
                    HostEvent::Foregrounded
                } else {
                    HostEvent::Backgrounded
                }),
                Step::Advance(ms) => {
                    harness.advance(Duration::from_millis(ms));
                }
            }

            prop_assert!(harness.live_handles() <= 1);
            if let Some(bound) = harness.coordinator.bound_item() {
                prop_assert_eq!(Some(bound), latest.as_ref());
            }
            if harness.coordinator.state() == CoordinatorState::Idle {
                prop_assert_eq!(harness.live_handles(), 0);
            }
        }

        harness.coordinator.dispose();
        prop_assert_eq!(harness.live_handles(), 0);
    }
}
