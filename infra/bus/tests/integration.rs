mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use herald_bus::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        let mut event = TestEvent::new(1);

        assert_eq!(bus.publish(&mut event).unwrap(), 0);
        assert!(!event.is_canceled());
        assert_eq!(bus.event_types(), 0);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let seen = log();

        for tag in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |e: &mut TestEvent| seen.borrow_mut().push((tag, e.value)));
        }

        assert_eq!(bus.publish(&mut TestEvent::new(5)).unwrap(), 3);
        assert_eq!(snapshot(&seen), vec![("first", 5), ("second", 5), ("third", 5)]);
    }

    #[test]
    fn test_predicate_false_skips_handler() {
        let bus = EventBus::new();
        let seen = log();

        let even = Rc::clone(&seen);
        bus.subscribe_filtered(
            move |e: &mut TestEvent| even.borrow_mut().push(e.value),
            |e: &TestEvent| e.value % 2 == 0,
        );

        for value in 0..5 {
            bus.publish(&mut TestEvent::new(value)).unwrap();
        }

        assert_eq!(snapshot(&seen), vec![0, 2, 4]);
    }

    #[test]
    fn test_cancel_is_visible_to_later_handlers_and_producer() {
        let bus = EventBus::new();
        let late = Rc::new(Cell::new(false));

        bus.subscribe(|e: &mut TestEvent| e.cancel());
        let flag = Rc::clone(&late);
        bus.subscribe_filtered(move |_: &mut TestEvent| flag.set(true), |e: &TestEvent| {
            !e.is_canceled()
        });

        let mut event = TestEvent::new(0);
        assert_eq!(bus.publish(&mut event).unwrap(), 1);
        assert!(event.is_canceled(), "producer should observe the cancel flag");
        assert!(!late.get(), "handler filtered on !canceled must not run");
    }

    #[test]
    fn test_handlers_without_cancel_filter_still_run() {
        let bus = EventBus::new();
        let observed = log();

        bus.subscribe(|e: &mut TestEvent| e.cancel());
        let sink = Rc::clone(&observed);
        bus.subscribe(move |e: &mut TestEvent| sink.borrow_mut().push(e.is_canceled()));

        bus.publish(&mut TestEvent::new(0)).unwrap();
        assert_eq!(snapshot(&observed), vec![true]);
    }

    #[test]
    fn test_multiple_event_types_are_isolated() {
        let bus = EventBus::new();
        let tests = Rc::new(Cell::new(0));
        let others = Rc::new(Cell::new(0));

        let t = Rc::clone(&tests);
        bus.subscribe(move |_: &mut TestEvent| t.set(t.get() + 1));
        let o = Rc::clone(&others);
        bus.subscribe(move |_: &mut OtherEvent| o.set(o.get() + 1));

        bus.publish(&mut OtherEvent::new(13)).unwrap();
        bus.publish(&mut OtherEvent::new(14)).unwrap();

        assert_eq!(tests.get(), 0);
        assert_eq!(others.get(), 2);
        assert_eq!(bus.event_types(), 2);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let subscription = bus.subscribe(move |_: &mut TestEvent| h.set(h.get() + 1));
        let keep = Rc::clone(&hits);
        bus.subscribe(move |_: &mut TestEvent| keep.set(keep.get() + 10));

        assert!(subscription.is_active());
        subscription.unsubscribe();
        subscription.unsubscribe();
        assert!(!subscription.is_active());
        assert_eq!(bus.subscriber_count::<TestEvent>(), 1);

        bus.publish(&mut TestEvent::new(0)).unwrap();
        assert_eq!(hits.get(), 10);
    }

    #[test]
    fn test_unsubscribe_mid_pass_skips_later_handler() {
        let bus = EventBus::new();
        let seen = log();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&victim);
        let first = Rc::clone(&seen);
        bus.subscribe(move |_: &mut TestEvent| {
            first.borrow_mut().push("first");
            if let Some(subscription) = slot.borrow().as_ref() {
                subscription.unsubscribe();
            }
        });
        let second = Rc::clone(&seen);
        let handle = bus.subscribe(move |_: &mut TestEvent| second.borrow_mut().push("second"));
        *victim.borrow_mut() = Some(handle);

        assert_eq!(bus.publish(&mut TestEvent::new(0)).unwrap(), 1);
        assert_eq!(snapshot(&seen), vec!["first"]);
        assert_eq!(bus.subscriber_count::<TestEvent>(), 1);
    }

    #[test]
    fn test_handler_can_unsubscribe_itself() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let own: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&own);
        let h = Rc::clone(&hits);
        let handle = bus.subscribe(move |_: &mut TestEvent| {
            h.set(h.get() + 1);
            if let Some(subscription) = slot.borrow().as_ref() {
                subscription.unsubscribe();
            }
        });
        *own.borrow_mut() = Some(handle);

        bus.publish(&mut TestEvent::new(0)).unwrap();
        bus.publish(&mut TestEvent::new(1)).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_subscribe_mid_pass_runs_from_next_publish() {
        let bus = EventBus::new();
        let late_hits = Rc::new(Cell::new(0));
        let armed = Rc::new(Cell::new(true));

        let inner_bus = bus.clone();
        let counter = Rc::clone(&late_hits);
        let once = Rc::clone(&armed);
        bus.subscribe(move |_: &mut TestEvent| {
            if once.replace(false) {
                let counter = Rc::clone(&counter);
                inner_bus.subscribe(move |_: &mut TestEvent| counter.set(counter.get() + 1));
            }
        });

        assert_eq!(bus.publish(&mut TestEvent::new(0)).unwrap(), 1);
        assert_eq!(late_hits.get(), 0);

        assert_eq!(bus.publish(&mut TestEvent::new(1)).unwrap(), 2);
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_reentrant_publish_from_handler() {
        let bus = EventBus::new();
        let seen = log();

        let inner_bus = bus.clone();
        bus.subscribe(move |e: &mut TestEvent| {
            inner_bus.publish(&mut OtherEvent::new(e.value * 2)).unwrap();
        });
        let sink = Rc::clone(&seen);
        bus.subscribe(move |e: &mut OtherEvent| sink.borrow_mut().push(e.value));

        bus.publish(&mut TestEvent::new(21)).unwrap();
        assert_eq!(snapshot(&seen), vec![42]);
    }

    #[test]
    fn test_failing_handler_aborts_pass() {
        let bus = EventBus::new();
        let seen = log();

        let before = Rc::clone(&seen);
        bus.subscribe(move |_: &mut TestEvent| before.borrow_mut().push("before"));
        bus.try_subscribe(|e: &mut TestEvent| {
            if e.value < 0 { Err(format!("negative value {}", e.value).into()) } else { Ok(()) }
        });
        let after = Rc::clone(&seen);
        bus.subscribe(move |_: &mut TestEvent| after.borrow_mut().push("after"));

        let err = bus.publish(&mut TestEvent::new(-1)).unwrap_err();
        assert!(matches!(err, EventBusError::Handler { .. }));
        assert!(err.to_string().contains("negative value -1"));
        assert_eq!(snapshot(&seen), vec!["before"]);

        assert_eq!(bus.publish(&mut TestEvent::new(1)).unwrap(), 3);
        assert_eq!(snapshot(&seen), vec!["before", "before", "after"]);
    }

    #[test]
    fn test_error_context_can_be_extended() {
        let bus = EventBus::new();
        bus.try_subscribe(|_: &mut TestEvent| Err("boom".into()));

        let err = bus.publish(&mut TestEvent::new(0)).context("saving game").unwrap_err();
        assert!(err.to_string().starts_with("Handler failed (saving game)"));
    }

    #[test]
    fn test_panicking_handler_leaves_bus_usable() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        bus.subscribe(|e: &mut TestEvent| assert!(e.value >= 0, "negative value"));
        let h = Rc::clone(&hits);
        bus.subscribe(move |_: &mut TestEvent| h.set(h.get() + 1));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            bus.publish(&mut TestEvent::new(-1))
        }));
        assert!(result.is_err());
        assert_eq!(hits.get(), 0);

        bus.publish(&mut TestEvent::new(1)).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = EventBus::new();
        let subscription = bus.subscribe(|_: &mut TestEvent| {});
        assert_eq!(subscription.event_name(), std::any::type_name::<TestEvent>());

        drop(bus);

        assert!(!subscription.is_active());
        subscription.unsubscribe();
    }

    #[test]
    fn test_shutdown_makes_subscriptions_inert() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let subscription = bus.subscribe(move |_: &mut TestEvent| h.set(h.get() + 1));
        bus.subscribe(|_: &mut OtherEvent| {});

        assert_eq!(bus.shutdown(), 2, "expected both event collections to be closed");
        assert!(!subscription.is_active());
        subscription.unsubscribe();

        assert_eq!(bus.publish(&mut TestEvent::new(0)).unwrap(), 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(bus.event_types(), 0);
    }

    #[test]
    fn test_clones_share_registry() {
        let bus = EventBus::new();
        let other = bus.clone();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        other.subscribe(move |_: &mut TestEvent| h.set(h.get() + 1));

        bus.publish(&mut TestEvent::new(0)).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.subscriber_count::<TestEvent>(), 1);
    }

    #[test]
    fn test_subscription_ids_are_distinct() {
        let bus = EventBus::new();
        let a = bus.subscribe(|_: &mut TestEvent| {});
        let b = bus.subscribe(|_: &mut OtherEvent| {});
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_listener_object_serves_several_event_types() {
        #[derive(Default)]
        struct Listener {
            tests: Cell<i64>,
            others: Cell<i64>,
        }

        impl EventHandler<TestEvent> for Listener {
            fn on(&self, event: &mut TestEvent) {
                self.tests.set(self.tests.get() + event.value);
            }
        }

        impl EventHandler<OtherEvent> for Listener {
            fn on(&self, event: &mut OtherEvent) {
                self.others.set(self.others.get() + event.value);
                event.cancel();
            }
        }

        let bus = EventBus::new();
        let listener = Rc::new(Listener::default());
        bus.subscribe_handler::<TestEvent, _>(Rc::clone(&listener));
        let others = bus.subscribe_handler::<OtherEvent, _>(Rc::clone(&listener));

        bus.publish(&mut TestEvent::new(3)).unwrap();
        let mut other = OtherEvent::new(4);
        bus.publish(&mut other).unwrap();

        assert_eq!(listener.tests.get(), 3);
        assert_eq!(listener.others.get(), 4);
        assert!(other.is_canceled());

        others.unsubscribe();
        bus.publish(&mut OtherEvent::new(100)).unwrap();
        assert_eq!(listener.others.get(), 4);
    }

    #[test]
    fn test_source_restricted_subscription() {
        let bus = EventBus::new();
        let player1 = Player::new(1, "Player1");
        let player2 = Player::new(2, "Player2");
        let seen = log();

        let sink = Rc::clone(&seen);
        bus.subscribe_from(player1.id, move |e: &mut PlayerChatEvent| {
            sink.borrow_mut().push(e.message.clone());
        });

        bus.publish(&mut PlayerChatEvent::new(&player1, "from one")).unwrap();
        bus.publish(&mut PlayerChatEvent::new(&player2, "from two")).unwrap();

        assert_eq!(snapshot(&seen), vec!["from one".to_owned()]);
    }
}
