use hidkey_engine::{
    Engine, Error,
    test_support::{Recorder, sleep_until_ms, test_config, test_config_with_mappings},
};
use tokio::time::Instant;

/// Feed `(ms, code)` samples at their virtual times, then let the engine settle.
async fn replay(timeout_ms: u64, mappings: &[(&str, &str)], script: &[(u64, &str)]) -> Recorder {
    let cfg = test_config_with_mappings(timeout_ms, mappings);
    let start = Instant::now();
    let handle = Engine::spawn(&cfg, Recorder::new());
    for (at, code) in script {
        sleep_until_ms(start, *at).await;
        handle.send(code).unwrap();
    }
    handle.finish().await.unwrap()
}

fn pairs(items: &[(u64, &str)]) -> Vec<(u64, String)> {
    items.iter().map(|(t, v)| (*t, v.to_string())).collect()
}

#[tokio::test(start_paused = true)]
async fn short_press_with_repeat_is_single() {
    let rec = replay(100, &[], &[(0, "0A"), (50, "0A")]).await;

    assert_eq!(rec.timeline("raw"), pairs(&[(0, "0A")]));
    assert_eq!(
        rec.timeline("raw-action"),
        pairs(&[(0, "0A.down"), (50, "0A.repeat"), (150, "0A.up")])
    );
    // The window opens at the inferred release and lasts twice the timeout.
    assert_eq!(rec.timeline("raw-single-short"), pairs(&[(350, "0A")]));
    assert_eq!(rec.timeline("raw-dsl"), pairs(&[(350, "0A.single")]));
    assert!(rec.values_of("raw-double").is_empty());
    assert!(rec.values_of("raw-long").is_empty());
    assert!(rec.values_of("raw-repcnt").is_empty());
}

#[tokio::test(start_paused = true)]
async fn two_taps_inside_window_are_double() {
    let rec = replay(100, &[], &[(0, "0A"), (150, "0A")]).await;

    assert_eq!(
        rec.timeline("raw-action"),
        pairs(&[
            (0, "0A.down"),
            (100, "0A.up"),
            (150, "0A.down"),
            (250, "0A.up")
        ])
    );
    assert_eq!(rec.timeline("raw-double"), pairs(&[(250, "0A")]));
    assert_eq!(rec.timeline("raw-dsl"), pairs(&[(250, "0A.double")]));
    assert!(rec.values_of("raw-single-short").is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_press_after_release_is_double() {
    let rec = replay(100, &[], &[(0, "0A"), (50, "0A"), (200, "0A")]).await;

    assert_eq!(
        rec.timeline("raw-action"),
        pairs(&[
            (0, "0A.down"),
            (50, "0A.repeat"),
            (150, "0A.up"),
            (200, "0A.down"),
            (300, "0A.up")
        ])
    );
    assert_eq!(rec.timeline("raw-double"), pairs(&[(300, "0A")]));
    assert!(rec.values_of("raw-single-short").is_empty());
}

#[tokio::test(start_paused = true)]
async fn taps_further_apart_than_window_are_two_singles() {
    let rec = replay(100, &[], &[(0, "0A"), (400, "0A")]).await;
    assert_eq!(
        rec.timeline("raw-single-short"),
        pairs(&[(300, "0A"), (700, "0A")])
    );
    assert!(rec.values_of("raw-double").is_empty());
}

#[tokio::test(start_paused = true)]
async fn three_rapid_samples_are_one_long() {
    let rec = replay(
        100,
        &[],
        &[(0, "0A"), (20, "0A"), (40, "0A"), (60, "0A"), (80, "0A")],
    )
    .await;

    assert_eq!(rec.timeline("raw-long"), pairs(&[(40, "0A")]));
    assert_eq!(rec.timeline("raw-dsl"), pairs(&[(40, "0A.long")]));
    assert_eq!(
        rec.timeline("raw-repcnt"),
        pairs(&[(40, "0A.2"), (60, "0A.3"), (80, "0A.4")])
    );
    assert_eq!(rec.times_of("raw-action").last(), Some(&180));
    assert!(rec.values_of("raw-single-short").is_empty());
    assert!(rec.values_of("raw-double").is_empty());
}

#[tokio::test(start_paused = true)]
async fn new_code_releases_previous_before_down() {
    let rec = replay(100, &[], &[(0, "0A"), (30, "0B")]).await;

    let actions: Vec<String> = rec.values_of("raw-action");
    assert_eq!(actions, ["0A.down", "0A.up", "0B.down", "0B.up"]);
    assert_eq!(rec.times_of("raw-action"), [0, 30, 30, 130]);
    // Each code keeps its own window.
    assert_eq!(
        rec.timeline("raw-single-short"),
        pairs(&[(230, "0A"), (330, "0B")])
    );
}

#[tokio::test(start_paused = true)]
async fn pending_windows_of_other_codes_survive() {
    let rec = replay(100, &[], &[(0, "01"), (10, "02"), (20, "03")]).await;
    assert_eq!(
        rec.timeline("raw-single-short"),
        pairs(&[(210, "01"), (220, "02"), (320, "03")])
    );
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_reports_down_and_repeat_only() {
    let rec = replay(
        0,
        &[],
        &[(0, "0A"), (10, "0A"), (20, "0A"), (30, "0A"), (40, "0B")],
    )
    .await;

    assert_eq!(
        rec.values_of("raw-action"),
        ["0A.down", "0A.repeat", "0A.repeat", "0A.repeat", "0B.down"]
    );
    assert_eq!(rec.values_of("raw-repcnt"), ["0A.2", "0A.3"]);
    for id in ["raw-single-short", "raw-double", "raw-long", "raw-dsl"] {
        assert!(rec.values_of(id).is_empty(), "{id} should be silent");
    }
}

#[tokio::test(start_paused = true)]
async fn mapped_codes_update_named_channels() {
    let rec = replay(100, &[("0a", "Play")], &[(0, "0A"), (500, "0B")]).await;

    assert_eq!(rec.values_of("key"), ["Play"]);
    assert_eq!(rec.values_of("key-action"), ["Play.down", "Play.up"]);
    assert_eq!(rec.values_of("key-single-short"), ["Play"]);
    assert_eq!(rec.values_of("key-dsl"), ["Play.single"]);
    // The unmapped code only reaches raw channels.
    assert_eq!(rec.values_of("raw"), ["0A", "0B"]);
    assert_eq!(rec.values_of("raw-single-short"), ["0A", "0B"]);
}

#[tokio::test(start_paused = true)]
async fn malformed_samples_are_ignored() {
    let rec = replay(100, &[], &[(0, ""), (0, "zz"), (0, "0x0A"), (10, "0a")]).await;
    assert_eq!(rec.timeline("raw"), pairs(&[(10, "0A")]));
    assert_eq!(rec.updates.first().map(|(t, _)| *t), Some(10));
}

#[tokio::test(start_paused = true)]
async fn report_bytes_render_as_hex() {
    let cfg = test_config(100);
    let handle = Engine::spawn(&cfg, Recorder::new());
    handle.send_report(&[0x01, 0x0a]).unwrap();
    handle.send_report(&[]).unwrap();
    let rec = handle.finish().await.unwrap();
    assert_eq!(rec.values_of("raw"), ["010A"]);
    assert_eq!(rec.values_of("raw-single-short"), ["010A"]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_timers() {
    let cfg = test_config(100);
    let handle = Engine::spawn(&cfg, Recorder::new());
    let sender = handle.sender();
    sender.send("0A").unwrap();
    tokio::task::yield_now().await;
    let rec = handle.shutdown().await.unwrap();

    assert_eq!(rec.values_of("raw-action"), ["0A.down"]);
    assert!(matches!(sender.send("0A"), Err(Error::Closed)));
}
