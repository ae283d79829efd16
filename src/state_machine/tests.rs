//! 状态机的全面测试
//! Comprehensive tests for the state machine
use super::*;
use crate::error::{ConfigError, Error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration without smoothing, so every sample lands in the window unchanged.
fn unsmoothed_config() -> Config {
    let mut config = Config::default();
    config.smoothing.alpha = 0.0;
    config
}

fn machine() -> StateMachine {
    StateMachine::new(unsmoothed_config()).unwrap()
}

fn feed(machine: &mut StateMachine, load: f64, times: usize) -> Vec<Transition> {
    (0..times)
        .filter_map(|_| machine.update(&ChannelLoad::from_fraction(load)))
        .collect()
}

/// 测试默认构造和初始状态
#[test]
fn test_initial_state() {
    let machine: StateMachine = StateMachine::default();
    assert_eq!(machine.state().kind(), StateKind::Relaxed);
    assert_eq!(machine.transmission_interval(), Duration::from_millis(100));
    assert!((machine.message_rate() - 10.0).abs() < 1e-9);
    assert_eq!(machine.snapshot().tick, 0);
    assert_eq!(machine.window().capacity(), 10);
    assert!(machine.window().is_empty());
    assert_eq!(machine.sampling_period(), Duration::from_millis(100));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = Config::default();
    config.thresholds.active_to_relaxed = 0.9;
    let result = StateMachine::new(config);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_unbounded_observation_window_is_rejected() {
    let mut config = Config::default();
    config.sampling.observation_window = Duration::MAX;
    let result = StateMachine::new(config);
    assert!(matches!(
        result,
        Err(Error::InvalidConfig(ConfigError::ObservationWindowTooLong { .. }))
    ));
}

/// 测试空闲信道保持 Relaxed
#[test]
fn test_quiet_channel_stays_relaxed() {
    let mut machine = machine();
    let interval = machine.transmission_interval();
    let capacity = machine.window().capacity();

    let transitions = feed(&mut machine, 0.1, capacity);

    assert!(transitions.is_empty());
    assert_eq!(machine.state().kind(), StateKind::Relaxed);
    assert_eq!(machine.transmission_interval(), interval);
    assert_eq!(machine.window().len(), capacity);
}

/// 测试负载上升时进入 Active 的最低级
#[test]
fn test_ramp_enters_active_at_lowest_rung() {
    let mut machine = machine();

    for load in [0.10, 0.20, 0.30] {
        assert_eq!(machine.update(&ChannelLoad::from_fraction(load)), None);
        assert_eq!(machine.state().kind(), StateKind::Relaxed);
    }

    let transition = machine.update(&ChannelLoad::from_fraction(0.35)).unwrap();
    assert_eq!(transition.from, StateKind::Relaxed);
    assert_eq!(transition.to, StateKind::Active);
    assert!((transition.max_channel_load - 0.35).abs() < 1e-9);
    assert!((transition.min_channel_load - 0.10).abs() < 1e-9);
    assert_eq!(machine.state().substate(), Some(0));
    assert_eq!(machine.transmission_interval(), Duration::from_millis(200));
}

#[test]
fn test_active_escalates_to_restrictive() {
    let mut machine = machine();
    feed(&mut machine, 0.35, 1);
    assert_eq!(machine.state().substate(), Some(0));

    let transition = machine.update(&ChannelLoad::from_fraction(0.7)).unwrap();
    assert_eq!(transition.from, StateKind::Active);
    assert_eq!(transition.to, StateKind::Restrictive);
    assert_eq!(machine.state().kind(), StateKind::Restrictive);
    assert_eq!(machine.state().substate(), None);
    assert_eq!(machine.transmission_interval(), Duration::from_secs(1));
}

/// 测试从 Restrictive 回到 Active 时位于最高级
#[test]
fn test_restrictive_returns_to_highest_rung() {
    let mut machine = machine();
    feed(&mut machine, 0.35, 1);
    feed(&mut machine, 0.7, 1);
    assert_eq!(machine.state().kind(), StateKind::Restrictive);

    // The 0.7 sample stays in the window for nine more ticks.
    for _ in 0..9 {
        assert_eq!(machine.update(&ChannelLoad::from_fraction(0.45)), None);
        assert_eq!(machine.state().kind(), StateKind::Restrictive);
    }

    let transition = machine.update(&ChannelLoad::from_fraction(0.45)).unwrap();
    assert_eq!(transition.from, StateKind::Restrictive);
    assert_eq!(transition.to, StateKind::Active);
    assert_eq!(machine.state().substate(), Some(4));
    assert_eq!(machine.transmission_interval(), Duration::from_millis(500));
}

#[test]
fn test_active_relaxes_once_window_clears() {
    let mut machine = machine();
    feed(&mut machine, 0.35, 1);

    for _ in 0..9 {
        assert_eq!(machine.update(&ChannelLoad::from_fraction(0.2)), None);
        assert_eq!(machine.state().kind(), StateKind::Active);
    }

    let transition = machine.update(&ChannelLoad::from_fraction(0.2)).unwrap();
    assert_eq!(transition.to, StateKind::Relaxed);
    assert_eq!(machine.transmission_interval(), Duration::from_millis(100));
}

#[test]
fn test_sustained_load_climbs_the_ladder() {
    let mut machine = machine();
    feed(&mut machine, 0.35, 1);

    for expected in 1..=4 {
        assert_eq!(machine.update(&ChannelLoad::from_fraction(0.5)), None);
        assert_eq!(machine.state().substate(), Some(expected));
    }
    feed(&mut machine, 0.5, 5);
    assert_eq!(machine.state().substate(), Some(4));
    assert_eq!(machine.state().kind(), StateKind::Active);
}

/// 测试离开 Active 后再次进入时从最低级开始
#[test]
fn test_reentering_active_starts_at_lowest_rung() {
    let mut machine = machine();
    feed(&mut machine, 0.35, 1);
    feed(&mut machine, 0.5, 3);
    assert_eq!(machine.state().substate(), Some(3));

    // The 0.5 samples keep the window above 0.25 until they are evicted.
    let transitions = feed(&mut machine, 0.2, 10);
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].to, StateKind::Relaxed);
    assert_eq!(machine.state().kind(), StateKind::Relaxed);

    let transition = machine.update(&ChannelLoad::from_fraction(0.35)).unwrap();
    assert_eq!(transition.from, StateKind::Relaxed);
    assert_eq!(transition.to, StateKind::Active);
    assert_eq!(machine.state().substate(), Some(0));
    assert_eq!(machine.transmission_interval(), Duration::from_millis(200));
}

/// 测试滞回：负载在阈值附近波动时不会来回切换
#[test]
fn test_hysteresis_prevents_chatter() {
    let mut machine = machine();

    let mut transitions = Vec::new();
    for i in 0..200 {
        let load = if i % 2 == 0 { 0.28 } else { 0.32 };
        if let Some(transition) = machine.update(&ChannelLoad::from_fraction(load)) {
            transitions.push(transition);
        }
        if i >= 1 {
            assert_eq!(machine.state().kind(), StateKind::Active, "tick {}", i);
        }
    }

    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].to, StateKind::Active);
}

#[test]
fn test_smoothing_filters_single_spike() {
    // Default smoothing halves a spike: 0.1 -> 0.45 yields 0.275, below the threshold.
    let mut machine = StateMachine::new(Config::default()).unwrap();
    feed(&mut machine, 0.1, 5);
    assert_eq!(machine.update(&ChannelLoad::from_fraction(0.45)), None);
    assert_eq!(machine.state().kind(), StateKind::Relaxed);
    assert!((machine.smoothed_channel_load() - 0.275).abs() < 1e-9);
}

/// Substate moves by at most one rung per update and the window stays bounded.
#[test]
fn test_random_loads_respect_bounds() {
    let mut rng = StdRng::seed_from_u64(0x0dcc);
    let mut machine = machine();
    let capacity = machine.window().capacity();

    for _ in 0..5_000 {
        let before = machine.state().substate();
        let load = rng.random_range(0.0..1.0);
        let transition = machine.update(&ChannelLoad::from_fraction(load));
        let after = machine.state().substate();

        if transition.is_none() {
            if let (Some(before), Some(after)) = (before, after) {
                assert!(before.abs_diff(after) <= 1, "{} -> {}", before, after);
            }
        }
        assert!(machine.window().len() <= capacity);
        assert!(machine.min_channel_load() <= machine.max_channel_load());
    }
}

#[test]
fn test_reads_are_idempotent() {
    let mut machine = machine();
    feed(&mut machine, 0.35, 1);
    feed(&mut machine, 0.5, 2);

    let reader = machine.reader();
    let first = (
        machine.transmission_interval(),
        machine.message_rate(),
        *machine.state(),
        reader.snapshot(),
    );
    for _ in 0..10 {
        assert_eq!(machine.transmission_interval(), first.0);
        assert_eq!(machine.message_rate(), first.1);
        assert_eq!(*machine.state(), first.2);
        assert_eq!(reader.snapshot(), first.3);
    }
}

#[test]
fn test_reader_follows_published_snapshots() {
    let mut machine = machine();
    let reader = machine.reader();
    assert_eq!(reader.state().kind(), StateKind::Relaxed);
    assert_eq!(reader.snapshot().tick, 0);

    feed(&mut machine, 0.35, 1);
    let snapshot = reader.snapshot();
    assert_eq!(snapshot, machine.snapshot());
    assert_eq!(snapshot.tick, 1);
    assert_eq!(reader.state().kind(), StateKind::Active);
    assert_eq!(reader.transmission_interval(), Duration::from_millis(200));
    assert!((reader.message_rate() - 5.0).abs() < 1e-9);
}

/// 测试并发读者只会看到完整的快照
#[test]
fn test_concurrent_readers_never_see_torn_snapshots() {
    let mut machine = machine();
    let mut history = vec![machine.snapshot()];
    let mut rng = StdRng::seed_from_u64(42);
    let loads: Vec<f64> = (0..2_000).map(|_| rng.random_range(0.0..1.0)).collect();

    let observed = std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = machine.reader();
                scope.spawn(move || {
                    let mut seen = Vec::new();
                    for _ in 0..2_000 {
                        seen.push(reader.snapshot());
                    }
                    seen
                })
            })
            .collect();

        for load in &loads {
            machine.update(&ChannelLoad::from_fraction(*load));
            history.push(machine.snapshot());
        }

        readers
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    for snapshot in observed {
        let tick = snapshot.tick as usize;
        assert_eq!(snapshot, history[tick], "torn snapshot at tick {}", tick);
    }
}

#[derive(Debug, Default)]
struct RecordingSmoothing {
    calls: usize,
    last: f64,
}

impl ChannelLoadSmoothing for RecordingSmoothing {
    fn update(&mut self, load: &ChannelLoad) -> f64 {
        self.calls += 1;
        self.last = load.fraction() / 2.0;
        self.last
    }

    fn channel_load(&self) -> f64 {
        self.last
    }
}

#[test]
fn test_custom_smoothing_drives_window() {
    let mut machine =
        StateMachine::with_smoothing(Config::default(), RecordingSmoothing::default()).unwrap();

    machine.update(&ChannelLoad::from_fraction(0.8));
    assert_eq!(machine.smoothing.calls, 1);
    assert!((machine.max_channel_load() - 0.4).abs() < 1e-9);
    assert_eq!(machine.window().latest(), Some(0.4));
    assert_eq!(machine.state().kind(), StateKind::Active);
}
