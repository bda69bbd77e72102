//! Scenario tests for the connection orchestrator.
//!
//! Each test drives the orchestrator with scripted events and asserts on the
//! exact command sequence the gateway observed. The single-threaded runtime
//! keeps interleavings deterministic.

use std::sync::Arc;

use tether_app::{Orchestrator, Route};
use tether_core::{
    ChatConnectionState, CredentialSecret, DialogId, LifecycleState, MediaSessionId,
    OrchestratorError, Session, TransportConfig, UserId,
};
use tether_harness::{Command, FixedNavigator, RecordingUi, ScriptedGateway};

type TestOrchestrator = Orchestrator<ScriptedGateway, RecordingUi, FixedNavigator>;

struct Fixture {
    orchestrator: Arc<TestOrchestrator>,
    gateway: ScriptedGateway,
    ui: RecordingUi,
    navigator: FixedNavigator,
}

fn transport_config() -> TransportConfig {
    TransportConfig {
        app_id: "100".into(),
        auth_key: "auth-key".into(),
        auth_secret: "auth-secret".into(),
        account_key: "account-key".into(),
        api_endpoint: None,
        chat_endpoint: None,
    }
}

fn session() -> Session {
    Session::new(UserId(7), CredentialSecret::new("hunter2"))
}

fn fixture(gateway: ScriptedGateway) -> Fixture {
    let ui = RecordingUi::new();
    let navigator = FixedNavigator::new(Route::DialogList);
    let orchestrator =
        Arc::new(Orchestrator::new(gateway.clone(), ui.clone(), navigator.clone()));
    Fixture { orchestrator, gateway, ui, navigator }
}

/// Initialize the transport and get the outcome listener running.
async fn start(fx: &Fixture) {
    fx.orchestrator.start(&transport_config()).await.expect("transport init");
    tokio::spawn(Arc::clone(&fx.orchestrator).run_outcome_listener());
    // Let the listener register before any connect can resolve.
    tokio::task::yield_now().await;
}

/// Fixture that is started, logged in, and online.
async fn online_fixture(gateway: ScriptedGateway) -> Fixture {
    let fx = fixture(gateway);
    start(&fx).await;
    fx.orchestrator.set_session(session());
    fx.orchestrator.store().set_network_reachable(true);
    fx
}

#[tokio::test]
async fn concurrent_triggers_issue_one_connect() {
    let fx = online_fixture(ScriptedGateway::manual()).await;

    let first = tokio::spawn({
        let orchestrator = Arc::clone(&fx.orchestrator);
        async move { orchestrator.reconcile().await }
    });
    let second = tokio::spawn({
        let orchestrator = Arc::clone(&fx.orchestrator);
        async move { orchestrator.reconcile().await }
    });
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }

    // Both passes are parked on the outcome; only one connect went out.
    assert_eq!(fx.gateway.connect_count(), 1);

    fx.gateway.resolve_connect(true);
    first.await.expect("task").expect("first pass");
    second.await.expect("task").expect("second pass");

    assert_eq!(fx.gateway.connect_count(), 1);
    assert_eq!(fx.orchestrator.store().snapshot().chat, ChatConnectionState::Connected);
}

#[tokio::test]
async fn unreachable_network_blocks_all_commands() {
    let fx = fixture(ScriptedGateway::auto_succeed());
    start(&fx).await;
    fx.orchestrator.set_session(session());
    // Network stays unreachable.

    fx.orchestrator.reconcile().await.expect("pass is a no-op");

    assert_eq!(fx.gateway.commands(), vec![Command::Initialize]);
}

#[tokio::test]
async fn missing_session_makes_every_event_a_noop() {
    let fx = fixture(ScriptedGateway::auto_succeed());
    start(&fx).await;
    fx.orchestrator.store().set_network_reachable(true);

    fx.orchestrator.reconcile().await.expect("pass is a no-op");
    fx.orchestrator.handle_lifecycle(LifecycleState::Active).await;
    fx.orchestrator.handle_lifecycle(LifecycleState::Background).await;

    assert_eq!(fx.gateway.commands(), vec![Command::Initialize]);
    let snapshot = fx.orchestrator.store().snapshot();
    assert!(!snapshot.connect_pending);
    assert_eq!(snapshot.chat, ChatConnectionState::Disconnected);
    assert_eq!(fx.ui.dialog_list_refreshes(), 0);
}

#[tokio::test]
async fn live_call_is_recorded_with_connected_chat() {
    let fx = online_fixture(ScriptedGateway::auto_succeed()).await;
    fx.gateway.set_active_call(Some(MediaSessionId(9)));

    fx.orchestrator.reconcile().await.expect("pass succeeds");

    let snapshot = fx.orchestrator.store().snapshot();
    assert!(snapshot.media_active);
    assert_eq!(snapshot.chat, ChatConnectionState::Connected);
}

#[tokio::test]
async fn background_preserves_live_media_session() {
    let fx = online_fixture(ScriptedGateway::auto_succeed()).await;
    fx.gateway.set_active_call(Some(MediaSessionId(9)));
    fx.orchestrator.reconcile().await.expect("pass succeeds");
    let commands_before = fx.gateway.commands().len();

    fx.orchestrator.handle_lifecycle(LifecycleState::Background).await;

    // An active call keeps the transport alive: nothing was issued.
    assert_eq!(fx.gateway.commands().len(), commands_before);
    let snapshot = fx.orchestrator.store().snapshot();
    assert_eq!(snapshot.chat, ChatConnectionState::Connected);
    assert!(snapshot.media_active);
}

#[tokio::test]
async fn background_disconnects_idle_chat() {
    let fx = online_fixture(ScriptedGateway::auto_succeed()).await;
    fx.orchestrator.reconcile().await.expect("pass succeeds");

    fx.orchestrator.handle_lifecycle(LifecycleState::Inactive).await;

    let commands = fx.gateway.commands();
    // Disconnect and release travel together, in that order.
    assert_eq!(
        &commands[commands.len() - 2..],
        &[Command::Disconnect, Command::ReleaseMedia(None)]
    );
    assert_eq!(fx.orchestrator.store().snapshot().chat, ChatConnectionState::Disconnected);
}

#[tokio::test]
async fn network_restore_runs_one_full_pass() {
    let fx = fixture(ScriptedGateway::auto_succeed());
    start(&fx).await;
    fx.orchestrator.set_session(session());

    fx.orchestrator.handle_connectivity(true).await;

    assert_eq!(
        fx.gateway.commands(),
        vec![
            Command::Initialize,
            Command::Connect(UserId(7)),
            Command::InitMedia,
            Command::ConfigureStreamManagement,
            Command::EnableCarbons,
            Command::SetAutoReconnect(true),
        ]
    );
    assert_eq!(fx.ui.dialog_list_refreshes(), 1);
}

#[tokio::test]
async fn foreground_skips_connect_when_already_connected() {
    let fx = online_fixture(ScriptedGateway::auto_succeed()).await;
    fx.gateway.set_connected(true);

    fx.orchestrator.handle_lifecycle(LifecycleState::Active).await;

    let commands = fx.gateway.commands();
    assert_eq!(fx.gateway.connect_count(), 0);
    assert!(commands.contains(&Command::InitMedia));
    assert_eq!(fx.ui.dialog_list_refreshes(), 1);
    assert!(fx.ui.message_refreshes().is_empty());
    assert_eq!(fx.orchestrator.store().snapshot().chat, ChatConnectionState::Connected);
}

#[tokio::test]
async fn failed_connect_aborts_the_pass() {
    let fx = online_fixture(ScriptedGateway::auto_fail()).await;

    let err = fx.orchestrator.reconcile().await.expect_err("connect fails");
    assert!(matches!(err, OrchestratorError::ConnectFailed(_)));

    let commands = fx.gateway.commands();
    assert!(!commands.contains(&Command::InitMedia));
    assert!(!commands.contains(&Command::ConfigureStreamManagement));
    assert_eq!(fx.ui.dialog_list_refreshes(), 0);

    // The guard is clear, so the next trigger starts a fresh attempt.
    let snapshot = fx.orchestrator.store().snapshot();
    assert!(!snapshot.connect_pending);
    assert_eq!(snapshot.chat, ChatConnectionState::Disconnected);

    let _ = fx.orchestrator.reconcile().await;
    assert_eq!(fx.gateway.connect_count(), 2);
}

#[tokio::test]
async fn rejected_connect_wakes_racing_passes() {
    let fx = online_fixture(ScriptedGateway::auto_succeed()).await;
    fx.gateway.fail_connects();

    let first = tokio::spawn({
        let orchestrator = Arc::clone(&fx.orchestrator);
        async move { orchestrator.reconcile().await }
    });
    let second = tokio::spawn({
        let orchestrator = Arc::clone(&fx.orchestrator);
        async move { orchestrator.reconcile().await }
    });
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }

    // A command that was never issued produces no gateway outcome; both the
    // guard holder and the pass waiting on it must still resolve.
    assert!(first.is_finished());
    assert!(second.is_finished());
    let err = first.await.expect("task").expect_err("rejected connect");
    assert!(matches!(err, OrchestratorError::ConnectFailed(_)));
    let err = second.await.expect("task").expect_err("waiting pass fails too");
    assert!(matches!(err, OrchestratorError::ConnectFailed(_)));

    let snapshot = fx.orchestrator.store().snapshot();
    assert!(!snapshot.connect_pending);
    assert_eq!(snapshot.chat, ChatConnectionState::Disconnected);
}

#[tokio::test]
async fn startup_failure_blocks_later_passes() {
    let fx = fixture(ScriptedGateway::auto_succeed());
    fx.gateway.fail_initialize();

    let err = fx.orchestrator.start(&transport_config()).await.expect_err("init fails");
    assert!(matches!(err, OrchestratorError::Init(_)));

    fx.orchestrator.set_session(session());
    fx.orchestrator.store().set_network_reachable(true);
    fx.orchestrator.reconcile().await.expect("pass refuses to run");

    assert!(fx.gateway.commands().is_empty());
}

#[tokio::test]
async fn settings_failure_keeps_the_connection() {
    let fx = online_fixture(ScriptedGateway::auto_succeed()).await;
    fx.gateway.fail_settings();

    fx.orchestrator.reconcile().await.expect("settings failures are swallowed");

    let snapshot = fx.orchestrator.store().snapshot();
    assert_eq!(snapshot.chat, ChatConnectionState::Connected);
    // The refresh fan-out still happens.
    assert_eq!(fx.ui.dialog_list_refreshes(), 1);
}

#[tokio::test]
async fn open_message_thread_gets_refreshed() {
    let fx = online_fixture(ScriptedGateway::auto_succeed()).await;
    fx.navigator.set_route(Route::Messages { dialog_id: DialogId::new("dlg-1") });

    fx.orchestrator.reconcile().await.expect("pass succeeds");

    assert_eq!(fx.ui.dialog_list_refreshes(), 1);
    assert_eq!(fx.ui.message_refreshes(), vec![DialogId::new("dlg-1")]);
}

#[tokio::test]
async fn network_loss_does_not_force_disconnect() {
    let fx = online_fixture(ScriptedGateway::auto_succeed()).await;
    fx.orchestrator.reconcile().await.expect("pass succeeds");
    let commands_before = fx.gateway.commands().len();

    fx.orchestrator.handle_connectivity(false).await;

    // Recovery is the transport's own auto-reconnect, not ours.
    assert_eq!(fx.gateway.commands().len(), commands_before);
    let snapshot = fx.orchestrator.store().snapshot();
    assert!(!snapshot.network_reachable);
    assert_eq!(snapshot.chat, ChatConnectionState::Connected);
}

#[tokio::test]
async fn logout_silences_all_triggers() {
    let fx = online_fixture(ScriptedGateway::auto_succeed()).await;
    fx.orchestrator.reconcile().await.expect("pass succeeds");
    fx.orchestrator.clear_session();
    let commands_before = fx.gateway.commands().len();

    fx.orchestrator.handle_lifecycle(LifecycleState::Active).await;
    fx.orchestrator.handle_connectivity(true).await;

    assert_eq!(fx.gateway.commands().len(), commands_before);
}
