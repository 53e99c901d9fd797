mod common;

use assert2::check;
use common::{Recorder, payload, recorder};
use rstest::rstest;
use rustdoc_implementors::render::NO_IMPLEMENTORS;
use rustdoc_implementors::{
    DisplayModel, HtmlRenderer, Implementor, ImplementorList, ImplementorSink, Payload, Registry,
    StagingPolicy,
};
use std::sync::Arc;

fn registrar() -> Arc<ImplementorList<HtmlRenderer>> {
    Arc::new(ImplementorList::new(HtmlRenderer::new()))
}

fn htmls(model: &DisplayModel, krate: &str) -> Vec<String> {
    model
        .get(krate)
        .unwrap_or_else(|| panic!("{} missing from display model", krate))
        .iter()
        .map(|i| i.html().to_string())
        .collect()
}

/// Publish everything first, then install.
fn publish_then_install(policy: StagingPolicy, payloads: &[Payload]) -> DisplayModel {
    let registry = Registry::new(policy);
    for p in payloads {
        registry.publish(p.clone());
    }
    let list = registrar();
    registry.install(list.clone()).unwrap();
    list.snapshot()
}

/// Install first, then publish everything.
fn install_then_publish(policy: StagingPolicy, payloads: &[Payload]) -> DisplayModel {
    let registry = Registry::new(policy);
    let list = registrar();
    registry.install(list.clone()).unwrap();
    for p in payloads {
        registry.publish(p.clone());
    }
    list.snapshot()
}

#[rstest]
fn ready_publish_delivers_synchronously_once(recorder: Arc<Recorder>) {
    let registry = Registry::new(StagingPolicy::Queue);
    registry.install(recorder.clone()).unwrap();

    registry.publish(payload("libA", &["x"]));

    check!(recorder.accepted() == vec![payload("libA", &["x"])]);
}

#[rstest]
#[case::single(vec![payload("libA", &["x", "y"])])]
#[case::empty_list(vec![payload("libA", &[])])]
#[case::distinct_crates(vec![payload("libA", &["a"]), payload("libB", &["b"])])]
#[case::same_crate_twice(vec![payload("libA", &["old"]), payload("libA", &["new", "newer"])])]
#[case::multi_crate_payload(vec![
    payload("libA", &["a"]).with(common::krate("libB"), ["b1", "b2"]),
    payload("libC", &[]),
])]
fn install_order_does_not_change_outcome(#[case] payloads: Vec<Payload>) {
    let staged = publish_then_install(StagingPolicy::Queue, &payloads);
    let direct = install_then_publish(StagingPolicy::Queue, &payloads);
    check!(staged == direct);
}

#[test]
fn install_between_publishes_matches_direct_delivery() {
    let payloads = [
        payload("libA", &["a"]),
        payload("libB", &["b"]),
        payload("libA", &["a2"]),
    ];

    let registry = Registry::new(StagingPolicy::Queue);
    registry.publish(payloads[0].clone());
    let list = registrar();
    registry.install(list.clone()).unwrap();
    registry.publish(payloads[1].clone());
    registry.publish(payloads[2].clone());

    check!(list.snapshot() == install_then_publish(StagingPolicy::Queue, &payloads));
    check!(htmls(&list.snapshot(), "libA") == ["a2"]);
}

#[test]
fn accepting_same_payload_twice_equals_once() {
    let p = payload("libA", &["x", "y"]);

    let once = registrar();
    once.accept(p.clone());

    let twice = registrar();
    twice.accept(p.clone());
    twice.accept(p);

    check!(once.snapshot() == twice.snapshot());
    check!(twice.renderer().passes() == 1);
    check!(twice.snapshot().implementor_count() == 2);
}

#[test]
fn implementor_order_is_preserved() {
    let list = registrar();
    let registry = Registry::new(StagingPolicy::Queue);
    registry.publish(payload("libA", &["zeta", "alpha", "mu", "beta"]));
    registry.install(list.clone()).unwrap();

    check!(htmls(&list.snapshot(), "libA") == ["zeta", "alpha", "mu", "beta"]);

    let html = list.renderer().html();
    let positions: Vec<_> = ["zeta", "alpha", "mu", "beta"]
        .iter()
        .map(|s| html.find(&format!(">{}<", s)).unwrap())
        .collect();
    check!(positions.is_sorted());
}

#[test]
fn empty_list_is_present_not_absent() {
    let model = install_then_publish(StagingPolicy::Queue, &[payload("libA", &[])]);
    check!(model.contains("libA"));
    check!(model.get("libA") == Some(&[][..]));
    check!(!model.contains("libB"));
}

/// Scenario A: installing with nothing staged renders nothing.
#[test]
fn scenario_a_install_with_empty_buffer_is_noop() {
    let registry = Registry::new(StagingPolicy::Queue);
    let list = registrar();
    registry.install(list.clone()).unwrap();

    check!(registry.is_ready());
    check!(list.snapshot().is_empty());
    check!(list.renderer().passes() == 0);
    check!(list.renderer().html().is_empty());
}

/// Scenario B: publish, then install.
#[test]
fn scenario_b_publish_then_install() {
    let registry = Registry::new(StagingPolicy::Queue);
    registry.publish(payload("libA", &["x", "y"]));
    check!(!registry.is_ready());

    let list = registrar();
    registry.install(list.clone()).unwrap();

    let model = list.snapshot();
    check!(model.len() == 1);
    check!(htmls(&model, "libA") == ["x", "y"]);
    check!(list.renderer().passes() == 1);
}

/// Scenario C: install, then publish an empty list.
#[test]
fn scenario_c_install_then_publish_empty() {
    let registry = Registry::new(StagingPolicy::Queue);
    let list = registrar();
    registry.install(list.clone()).unwrap();

    registry.publish(payload("libA", &[]));

    check!(list.snapshot().get("libA") == Some(&[][..]));
    let html = list.renderer().html();
    check!(html.contains("data-crate=\"libA\""));
    check!(html.contains(NO_IMPLEMENTORS));
}

/// Scenario D: two publishes with different crates before install.
/// The default policy keeps both.
#[test]
fn scenario_d_queue_keeps_both_payloads() {
    let model = publish_then_install(
        StagingPolicy::Queue,
        &[payload("libA", &["a"]), payload("libB", &["b"])],
    );

    check!(model.len() == 2);
    check!(htmls(&model, "libA") == ["a"]);
    check!(htmls(&model, "libB") == ["b"]);
}

/// Scenario D under the legacy single-slot policy: only the second survives.
#[test]
fn scenario_d_latest_only_drops_first_payload() {
    let model = publish_then_install(
        StagingPolicy::LatestOnly,
        &[payload("libA", &["a"]), payload("libB", &["b"])],
    );

    check!(model.len() == 1);
    check!(!model.contains("libA"));
    check!(htmls(&model, "libB") == ["b"]);
}

#[test]
fn staged_payloads_drain_in_one_render_pass() {
    let registry = Registry::new(StagingPolicy::Queue);
    registry.publish(payload("libA", &["a"]));
    registry.publish(payload("libB", &["b"]));
    registry.publish(payload("libC", &["c"]));

    let list = registrar();
    registry.install(list.clone()).unwrap();

    check!(list.renderer().passes() == 1);
    check!(list.snapshot().len() == 3);
}

#[test]
fn concurrent_publishers_all_delivered() {
    let registry = Arc::new(Registry::new(StagingPolicy::Queue));
    let list = registrar();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                let name = format!("lib{}", i);
                let implementor = format!("impl for {}", i);
                registry.publish(payload(&name, &[implementor.as_str()]));
            })
        })
        .collect();

    registry.install(list.clone()).unwrap();
    for handle in handles {
        handle.join().unwrap();
    }

    let model = list.snapshot();
    check!(model.len() == 8);
    for i in 0..8 {
        let expected = vec![Implementor::from(format!("impl for {}", i))];
        check!(model.get(&format!("lib{}", i)) == Some(expected.as_slice()));
    }
}
