use handoff::demo::run;

use handoff_core::config::HandoffConfig;

use tempfile::TempDir;

/// **VALUE**: Runs the whole demo against a config loaded from disk.
///
/// **WHY THIS MATTERS**: This is the only place the host wiring (config, loopback broadcast,
/// TCP radio, broadcaster, responder) is exercised together.
///
/// **BUG THIS CATCHES**: Would catch the demo ignoring the loaded config, a responder built
/// with a different MIME type than the broadcaster, or proceed firing more than once.
#[tokio::test]
async fn given_saved_config_when_demo_runs_then_pairs_once() {
    // GIVEN: A config saved to and loaded from a temp directory
    let dir = TempDir::new().expect("temp dir");
    let mut config = HandoffConfig::default();
    config.listener.service_name = "DemoRenderer".to_string();
    config.broadcast.mime_type = "application/vnd.example.handoff".to_string();
    config.save(dir.path()).expect("saves");
    let config = HandoffConfig::load(dir.path()).expect("loads");

    // WHEN: Running one handoff
    let report = run(&config).await.expect("handoff completes");

    // THEN: One tap, one poll, one proceed, over a loopback address
    assert_eq!(report.proceeds, 1);
    assert_eq!(report.polls, 1);
    let address = report.address.expect("listener address advertised");
    assert!(address.starts_with("127.0.0.1:"));
}
