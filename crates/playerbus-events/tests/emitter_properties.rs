use playerbus_events::{Emitter, SubscriptionHandle};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

#[test]
fn login_scenario_calls_f_then_g_with_the_same_payload() {
    let bus: Emitter<Value> = Emitter::new();
    let log: Log = Arc::default();

    let l = log.clone();
    bus.on("login", move |data| push(&l, format!("f {data}"))).unwrap();
    let l = log.clone();
    bus.on("login", move |data| push(&l, format!("g {data}"))).unwrap();

    bus.emit("login", &json!({ "user": "a" })).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![r#"f {"user":"a"}"#, r#"g {"user":"a"}"#]
    );
}

#[test]
fn n_subscribers_each_run_once_in_order() {
    let bus: Emitter<u32> = Emitter::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for i in 0..50 {
        let order = order.clone();
        bus.on("t", move |data| {
            assert_eq!(*data, 9);
            order.lock().unwrap().push(i);
        })
        .unwrap();
    }

    let emission = bus.emit("t", &9).unwrap();
    assert_eq!(emission.delivered, 50);
    assert_eq!(*order.lock().unwrap(), (0..50).collect::<Vec<_>>());
}

#[test]
fn off_then_emit_skips_callback() {
    let bus: Emitter<i32> = Emitter::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let handle = bus
        .on("t", move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    assert!(bus.off(&handle));
    assert!(!bus.off(&handle));
    bus.emit("t", &1).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn on_during_emit_waits_for_next_emission() {
    let bus: Arc<Emitter<u32>> = Arc::new(Emitter::new());
    let late_hits = Arc::new(AtomicUsize::new(0));

    let weak = Arc::downgrade(&bus);
    let late = late_hits.clone();
    bus.on("t", move |_| {
        if let Some(bus) = weak.upgrade() {
            let late = late.clone();
            bus.on("t", move |_| {
                late.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
    })
    .unwrap();

    let first = bus.emit("t", &0).unwrap();
    assert_eq!(first.delivered, 1);
    assert_eq!(late_hits.load(Ordering::SeqCst), 0);
    assert_eq!(bus.subscriber_count("t"), 2);

    bus.emit("t", &0).unwrap();
    assert_eq!(late_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn off_during_emit_does_not_disturb_current_emission() {
    let bus: Arc<Emitter<u32>> = Arc::new(Emitter::new());
    let log: Log = Arc::default();
    let victim: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::default();

    let weak = Arc::downgrade(&bus);
    let target = victim.clone();
    let l = log.clone();
    bus.on("t", move |_| {
        push(&l, "remover");
        if let (Some(bus), Some(handle)) = (weak.upgrade(), target.lock().unwrap().take()) {
            assert!(bus.off(&handle));
        }
    })
    .unwrap();
    let l = log.clone();
    let handle = bus.on("t", move |_| push(&l, "victim")).unwrap();
    let l = log.clone();
    bus.on("t", move |_| push(&l, "tail")).unwrap();
    *victim.lock().unwrap() = Some(handle);

    let first = bus.emit("t", &0).unwrap();
    assert_eq!(first.delivered, 3);
    assert_eq!(*log.lock().unwrap(), vec!["remover", "victim", "tail"]);

    log.lock().unwrap().clear();
    bus.emit("t", &0).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["remover", "tail"]);
}

#[test]
fn nested_emit_from_callback_is_allowed() {
    let bus: Arc<Emitter<u32>> = Arc::new(Emitter::new());
    let log: Log = Arc::default();

    let weak = Arc::downgrade(&bus);
    let l = log.clone();
    bus.on("outer", move |n| {
        push(&l, format!("outer {n}"));
        if let Some(bus) = weak.upgrade() {
            bus.emit("inner", &(n + 1)).unwrap();
        }
    })
    .unwrap();
    let l = log.clone();
    bus.on("inner", move |n| push(&l, format!("inner {n}"))).unwrap();

    bus.emit("outer", &1).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["outer 1", "inner 2"]);
}

#[test]
fn throwing_subscriber_does_not_block_later_ones() {
    let bus: Emitter<&'static str> = Emitter::new();
    let log: Log = Arc::default();

    let l = log.clone();
    bus.on("t", move |_| push(&l, "before")).unwrap();
    bus.on("t", |_| panic!("broken consumer")).unwrap();
    bus.try_on("t", |_| anyhow::bail!("also broken")).unwrap();
    let l = log.clone();
    bus.on("t", move |_| push(&l, "after")).unwrap();

    let emission = bus.emit("t", &"x").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
    assert_eq!(emission.delivered, 2);
    assert_eq!(emission.failures.len(), 2);
    assert!(emission.failures[0].reason.is_panic());
    assert!(!emission.failures[1].reason.is_panic());
}

#[test]
fn independent_buses_do_not_share_subscriptions() {
    let a: Emitter<u8> = Emitter::new();
    let b: Emitter<u8> = Emitter::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    a.on("x", move |_| {
        h.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    let emission = b.emit("x", &0).unwrap();
    assert_eq!(emission.attempted(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(!b.has_subscribers("x"));
}

#[test]
fn concurrent_subscribe_and_emit_is_consistent() {
    let bus: Arc<Emitter<usize>> = Arc::new(Emitter::new());
    let total = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let bus = bus.clone();
            let total = total.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    let total = total.clone();
                    let handle = bus
                        .on("tick", move |n| {
                            total.fetch_add(*n, Ordering::SeqCst);
                        })
                        .unwrap();
                    bus.emit("tick", &0).unwrap();
                    assert!(bus.off(&handle));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(bus.subscriber_count("tick"), 0);
    assert!(bus.topics().is_empty());
    assert_eq!(total.load(Ordering::SeqCst), 0);
}
