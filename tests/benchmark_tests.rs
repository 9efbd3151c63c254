//! Performance benchmarks for the task scheduler and protocol

use client::game::GameContext;
use client::scheduler::TaskScheduler;
use client::tasks::{Attack, JoinRoom, MoveTo, WorldUpdate};
use shared::Entity;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tokio::sync::mpsc;

/// Benchmarks same-kind submissions collapsing into one slot
#[test]
fn benchmark_superseding_submissions() {
    let scheduler = TaskScheduler::new();

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        scheduler
            .submit(MoveTo::new((i % 800) as f32, 100.0))
            .unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Superseding submit: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert_eq!(scheduler.pending_len(), 1);
    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks submission contention from several producer threads
#[test]
fn benchmark_contended_submissions() {
    let scheduler = Arc::new(TaskScheduler::new());
    let threads = 8;
    let per_thread = 10_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                for i in 0..per_thread {
                    if t % 2 == 0 {
                        scheduler.submit(MoveTo::new(i as f32 % 800.0, 1.0)).unwrap();
                    } else {
                        scheduler.submit(Attack::new(i as u32)).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Contended submit: {} threads × {} tasks in {:?}",
        threads, per_thread, duration
    );

    assert_eq!(scheduler.pending_len(), 2);
    assert_eq!(scheduler.stats().submitted, (threads * per_thread) as u64);
    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks full update ticks with every slot occupied
#[test]
fn benchmark_drain_ticks() {
    let scheduler = TaskScheduler::new();
    let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();
    let mut game = GameContext::new(outbound_tx);

    let entities: Vec<Entity> = (0..50)
        .map(|i| Entity::new(i, (i as f32) * 10.0, 100.0))
        .collect();

    let iterations = 10_000;
    let start = Instant::now();

    for tick in 0..iterations {
        // Offline, so the actions fail; failures are part of the cost
        scheduler.submit(MoveTo::new(10.0, 10.0)).unwrap();
        scheduler.submit(Attack::new(3)).unwrap();
        scheduler.submit(JoinRoom::new(1)).unwrap();
        scheduler
            .submit(WorldUpdate::new(tick, entities.clone()))
            .unwrap();

        let report = scheduler.drain_and_execute(&mut game);
        assert_eq!(report.executed, 4);
        game.take_notices();
    }

    let duration = start.elapsed();
    println!(
        "Drain: {} ticks in {:?} ({:.2} μs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks network packet serialization performance
#[test]
fn benchmark_packet_serialization() {
    use bincode::{deserialize, serialize};
    use shared::Packet;

    let packet = Packet::WorldState {
        tick: 12345,
        entities: (0..50)
            .map(|i| Entity::new(i, (i as f32) * 10.0, 100.0))
            .collect(),
    };

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let serialized = serialize(&packet).unwrap();
        let _deserialized: Packet = deserialize(&serialized).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Packet serialization: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}
