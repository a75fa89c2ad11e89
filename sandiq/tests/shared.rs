use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use sandiq::prelude::*;

struct Counter {
    hits: Mutex<u32>,
}

#[derive(Autowire)]
struct Clock;

#[test]
fn shared_container_hands_out_one_singleton() {
    let mut container = Container::builder().discover().build();
    container.set(
        "counter",
        Definition::factory(|_| {
            Ok(Value::object(Arc::new(Counter {
                hits: Mutex::new(0),
            })))
        }),
    );
    let shared = container.into_shared();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                let counter: Arc<Counter> = shared.lock().get_as("counter").unwrap();
                *counter.hits.lock() += 1;
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let counter: Arc<Counter> = shared.lock().get_as("counter").unwrap();
    assert_eq!(*counter.hits.lock(), 8);
}

#[test]
fn settings_from_builder() {
    let settings = Settings {
        max_depth: 1,
        ..Settings::default()
    };
    let container = Container::builder().settings(settings.clone()).build();
    assert_eq!(container.settings(), &settings);
}

#[test]
fn discovered_type_resolves_once() {
    let mut container = Container::builder().discover().build();

    let a: Arc<Clock> = container.resolve().unwrap();
    let b: Arc<Clock> = container.resolve().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(container.is_resolved(Identifier::of::<Clock>()));
}
