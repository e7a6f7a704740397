//! Counter demo: batched increments, a clamping refinement, and a list
//! selection, driven by a `Host`.
//!
//! Run with `RUST_LOG=reactive_element=trace` to watch the scheduling.

use reactive_element::prelude::*;
use tracing_subscriber::EnvFilter;

fn increment(el: &Element) {
    el.request_update_with(|s| patch! { "count" => s.int("count").unwrap_or(0) + 1 });
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut host = Host::new();

    let counter = host
        .builder("counter")
        .field("count", 0)
        .field("max", 5)
        .refine_with(|s, changed| {
            if !changed.any_of(&["count", "max"]) {
                return None;
            }
            let max = s.int("max")?;
            let count = s.int("count")?;
            (count > max).then(|| patch! { "count" => max })
        })
        .on_render(|cx| {
            println!("{} rendered {} (changed {})", cx.element_name(), cx.state(), cx.changed());
            Ok(())
        })
        .build()
        .unwrap_or_else(|err| panic!("counter: {err}"));
    let counter_id = host.insert(counter.clone());
    host.run_until_idle();

    // Three increments in one turn render once.
    for _ in 0..3 {
        increment(&counter);
    }
    host.run_until_idle();

    // Past the maximum the refinement clamps.
    for _ in 0..10 {
        increment(&counter);
    }
    host.run_until_idle();

    let list = host
        .builder("list")
        .behavior(ItemSelection::new())
        .field("itemCount", 4)
        .field("selectionWraps", true)
        .build()
        .unwrap_or_else(|err| panic!("list: {err}"));
    host.insert(list.clone());
    host.run_until_idle();

    // Arrow-key presses: user-initiated, so the moves are announced.
    for _ in 0..5 {
        list.raising_change_events(ItemSelection::select_next);
        host.run_until_idle();
    }
    // A programmatic move is applied silently.
    ItemSelection::select_first(&list);
    host.run_until_idle();

    for envelope in host.drain_events() {
        if let Some(changed) = envelope.downcast_ref::<SelectedIndexChanged>() {
            println!("selection moved to {}", changed.selected_index);
        }
    }
    for event in host.lifecycle_events() {
        println!("{event:?}");
    }

    host.remove(counter_id);
    increment(&counter);
    host.run_until_idle();
    println!("after remove: {}", counter.state());
}
