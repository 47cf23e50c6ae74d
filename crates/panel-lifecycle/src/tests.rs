//! Coordinator tests against a full temporary store layout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use panel_catalog::AccountCatalog;
use panel_config::PathsConfig;
use panel_core::{CreateRequest, Protocol, RandomNamer, TrialNamer};

use crate::coordinator::LifecycleCoordinator;
use crate::error::LifecycleError;
use crate::identity::{IdentityService, MemoryIdentity};
use crate::reload::ReloadTrigger;

const XRAY_SAMPLE: &str = "\
{
\"inbounds\": [
{ \"clients\": [
#trojanws
] },
{ \"clients\": [
#trojangrpc
] },
{ \"clients\": [
#vless
] },
{ \"clients\": [
#vlessgrpc
] },
{ \"clients\": [
#vmess
] },
{ \"clients\": [
#vmessgrpc
] }
]
}
";

struct CountingReload {
    count: AtomicUsize,
}

#[async_trait]
impl ReloadTrigger for CountingReload {
    async fn reload(&self) -> Result<(), LifecycleError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingIdentity;

#[async_trait]
impl IdentityService for FailingIdentity {
    async fn exists(&self, _username: &str) -> Result<bool, LifecycleError> {
        Ok(false)
    }

    async fn create(&self, _u: &str, _p: &str, _e: &str) -> Result<(), LifecycleError> {
        Err(LifecycleError::Identity("useradd exited with 1".into()))
    }

    async fn remove(&self, _username: &str) -> Result<(), LifecycleError> {
        Ok(())
    }
}

/// Namer that hands out a fixed sequence of candidates.
struct QueueNamer {
    names: parking_lot::Mutex<Vec<String>>,
}

impl QueueNamer {
    fn new<I: IntoIterator<Item = &'static str>>(names: I) -> Self {
        QueueNamer {
            names: parking_lot::Mutex::new(names.into_iter().map(String::from).collect()),
        }
    }
}

impl TrialNamer for QueueNamer {
    fn next_candidate(&self, _protocol: Protocol, _widened: bool) -> String {
        self.names.lock().remove(0)
    }

    fn trial_password(&self) -> String {
        "ssh1234".to_string()
    }
}

struct TestEnv {
    _dir: TempDir,
    paths: PathsConfig,
    identity: Arc<MemoryIdentity>,
    reload: Arc<CountingReload>,
    coordinator: LifecycleCoordinator,
}

async fn env() -> TestEnv {
    env_with_namer(Arc::new(RandomNamer)).await
}

async fn env_with_namer(namer: Arc<dyn TrialNamer>) -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let paths = test_paths(dir.path());
    tokio::fs::create_dir_all(paths.xray_config.parent().unwrap())
        .await
        .unwrap();
    tokio::fs::write(&paths.xray_config, XRAY_SAMPLE).await.unwrap();

    let catalog = AccountCatalog::connect("sqlite::memory:").await.unwrap();
    let identity = Arc::new(MemoryIdentity::new());
    let reload = Arc::new(CountingReload {
        count: AtomicUsize::new(0),
    });
    let coordinator = LifecycleCoordinator::new(
        paths.clone(),
        catalog,
        identity.clone(),
        reload.clone(),
        namer,
    );
    TestEnv {
        _dir: dir,
        paths,
        identity,
        reload,
        coordinator,
    }
}

fn test_paths(root: &std::path::Path) -> PathsConfig {
    PathsConfig {
        xray_config: root.join("xray/config.json"),
        etc_root: root.join("etc"),
        limit_root: root.join("limit"),
        html_dir: root.join("html"),
        domain_file: root.join("xray/domain"),
        city_file: root.join("xray/city"),
        ns_domain_file: root.join("nsdomain"),
        pubkey_file: root.join("server.pub"),
    }
}

fn trojan_request() -> CreateRequest {
    CreateRequest {
        username: "alice".into(),
        password: None,
        expired_days: 30,
        quota_gb: 10,
        ip_limit: 2,
        bug_host: None,
    }
}

async fn config_text(env: &TestEnv) -> String {
    tokio::fs::read_to_string(&env.paths.xray_config).await.unwrap()
}

#[tokio::test]
async fn create_trojan_provisions_every_store() {
    let env = env().await;
    let created = env
        .coordinator
        .create(Protocol::Trojan, trojan_request())
        .await
        .unwrap();

    let uuid = created.uuid.clone().expect("uuid credential");
    assert!(created.password.is_none());

    // Two config blocks (ws + grpc) sharing one UUID.
    let config = config_text(&env).await;
    assert!(config.contains(&format!("#! alice {}", created.expire_date)));
    assert!(config.contains(&format!("#!# alice {}", created.expire_date)));
    assert_eq!(config.matches(&uuid).count(), 2);

    // Ledger line.
    let ledger = tokio::fs::read_to_string(env.paths.ledger_file(Protocol::Trojan))
        .await
        .unwrap();
    assert_eq!(
        ledger,
        format!("### alice {} {} 10 2\n", created.expire_date, uuid)
    );

    // Limit files.
    let ip = tokio::fs::read_to_string(env.paths.ip_limit_file(Protocol::Trojan, "alice"))
        .await
        .unwrap();
    assert_eq!(ip, "2");
    let quota = tokio::fs::read_to_string(env.paths.quota_file(Protocol::Trojan, "alice"))
        .await
        .unwrap();
    assert_eq!(quota, "10737418240");

    // Catalog row.
    let row = env
        .coordinator
        .catalog()
        .lookup("alice", Protocol::Trojan)
        .await
        .unwrap()
        .expect("catalog row");
    assert_eq!(row.service_type, "trojan");
    assert_eq!(row.uuid.as_deref(), Some(uuid.as_str()));

    // Card.
    assert!(env.paths.card_file(Protocol::Trojan, "alice").exists());
    assert!(created.links.is_some());
}

#[tokio::test]
async fn second_create_rejected_without_residue() {
    let env = env().await;
    env.coordinator
        .create(Protocol::Trojan, trojan_request())
        .await
        .unwrap();
    let before = config_text(&env).await;

    // Same username on a different protocol and with a different expiry is
    // still rejected: uniqueness is global.
    let mut req = trojan_request();
    req.expired_days = 90;
    let err = env.coordinator.create(Protocol::Vless, req).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Duplicate(_)));

    assert_eq!(config_text(&env).await, before);
    assert!(!env.paths.ip_limit_file(Protocol::Vless, "alice").exists());
    assert_eq!(env.coordinator.catalog().list(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_restores_pre_create_state() {
    let env = env().await;
    env.coordinator
        .create(Protocol::Trojan, trojan_request())
        .await
        .unwrap();
    env.coordinator.delete(Protocol::Trojan, "alice").await.unwrap();

    assert_eq!(config_text(&env).await, XRAY_SAMPLE);
    let ledger = tokio::fs::read_to_string(env.paths.ledger_file(Protocol::Trojan))
        .await
        .unwrap();
    assert_eq!(ledger, "");
    assert!(!env.paths.ip_limit_file(Protocol::Trojan, "alice").exists());
    assert!(!env.paths.quota_file(Protocol::Trojan, "alice").exists());
    assert!(!env.paths.card_file(Protocol::Trojan, "alice").exists());
    assert!(!env.coordinator.catalog().exists("alice").await.unwrap());

    // Deleting again reports not found.
    let err = env
        .coordinator
        .delete(Protocol::Trojan, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn interleaved_accounts_delete_cleanly() {
    let env = env().await;
    for name in ["u1", "u2", "u3"] {
        let mut req = trojan_request();
        req.username = name.into();
        env.coordinator.create(Protocol::Vmess, req).await.unwrap();
    }
    for name in ["u2", "u3", "u1"] {
        env.coordinator.delete(Protocol::Vmess, name).await.unwrap();
    }
    assert_eq!(config_text(&env).await, XRAY_SAMPLE);
}

#[tokio::test]
async fn invalid_username_touches_nothing() {
    let env = env().await;
    let mut req = trojan_request();
    req.username = "bad user!".into();

    let err = env.coordinator.create(Protocol::Trojan, req).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));
    assert_eq!(config_text(&env).await, XRAY_SAMPLE);
    assert!(env.coordinator.catalog().list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_anchor_is_fatal_and_compensated() {
    let env = env().await;
    // Drift: the grpc sentinel is gone from the daemon config.
    let drifted = XRAY_SAMPLE.replace("#trojangrpc\n", "");
    tokio::fs::write(&env.paths.xray_config, &drifted).await.unwrap();

    let err = env
        .coordinator
        .create(Protocol::Trojan, trojan_request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Patch(panel_xray::PatchError::AnchorNotFound { .. })
    ));
    // The ws insert that succeeded before the failure was compensated.
    assert_eq!(config_text(&env).await, drifted);
    assert!(!env.coordinator.catalog().exists("alice").await.unwrap());
}

#[tokio::test]
async fn ssh_create_and_delete() {
    let env = env().await;
    let req = CreateRequest {
        username: "bob".into(),
        password: Some("s3cret".into()),
        expired_days: 30,
        quota_gb: 0,
        ip_limit: 1,
        bug_host: None,
    };
    let created = env.coordinator.create(Protocol::Ssh, req).await.unwrap();
    assert_eq!(created.password.as_deref(), Some("s3cret"));
    assert!(created.uuid.is_none());
    assert!(created.links.is_none());
    assert!(env.identity.contains("bob"));

    let ledger = tokio::fs::read_to_string(env.paths.ledger_file(Protocol::Ssh))
        .await
        .unwrap();
    assert_eq!(
        ledger,
        format!("### bob s3cret 1 {}\n", created.expire_date)
    );
    // ssh accounts never enter the daemon config.
    assert_eq!(config_text(&env).await, XRAY_SAMPLE);

    env.coordinator.delete(Protocol::Ssh, "bob").await.unwrap();
    assert!(!env.identity.contains("bob"));
    assert!(!env.coordinator.catalog().exists("bob").await.unwrap());
}

#[tokio::test]
async fn ssh_identity_failure_leaves_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let paths = test_paths(dir.path());
    tokio::fs::create_dir_all(paths.xray_config.parent().unwrap())
        .await
        .unwrap();
    tokio::fs::write(&paths.xray_config, XRAY_SAMPLE).await.unwrap();

    let catalog = AccountCatalog::connect("sqlite::memory:").await.unwrap();
    let coordinator = LifecycleCoordinator::new(
        paths.clone(),
        catalog.clone(),
        Arc::new(FailingIdentity),
        Arc::new(crate::reload::NoopReload),
        Arc::new(RandomNamer),
    );

    let req = CreateRequest {
        username: "bob".into(),
        password: Some("pw".into()),
        expired_days: 30,
        quota_gb: 0,
        ip_limit: 1,
        bug_host: None,
    };
    let err = coordinator.create(Protocol::Ssh, req).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Identity(_)));
    assert!(!paths.ledger_file(Protocol::Ssh).exists());
    assert!(!paths.ip_limit_file(Protocol::Ssh, "bob").exists());
    assert!(!catalog.exists("bob").await.unwrap());
}

#[tokio::test]
async fn midway_failure_unwinds_earlier_stores() {
    let env = env().await;
    // Make the ledger append fail after the config and limit writes have
    // succeeded: the ledger path exists as a directory.
    let ledger_path = env.paths.ledger_file(Protocol::Trojan);
    tokio::fs::create_dir_all(&ledger_path).await.unwrap();

    let err = env
        .coordinator
        .create(Protocol::Trojan, trojan_request())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Store(_)));

    assert_eq!(config_text(&env).await, XRAY_SAMPLE);
    assert!(!env.paths.ip_limit_file(Protocol::Trojan, "alice").exists());
    assert!(!env.paths.quota_file(Protocol::Trojan, "alice").exists());
    assert!(!env.coordinator.catalog().exists("alice").await.unwrap());
}

#[tokio::test]
async fn trial_retries_collisions_then_succeeds() {
    let namer = Arc::new(QueueNamer::new(["Trial-111", "Trial-2222"]));
    let env = env_with_namer(namer).await;

    // First candidate is already taken in the catalog.
    let taken = panel_core::Account::resolve(
        Protocol::Trojan,
        &CreateRequest {
            username: "Trial-111".into(),
            password: None,
            expired_days: 1,
            quota_gb: 1,
            ip_limit: 3,
            bug_host: None,
        },
        panel_core::Credential::new_uuid(),
    );
    env.coordinator.catalog().insert(&taken).await.unwrap();

    let created = env.coordinator.create_trial(Protocol::Trojan).await.unwrap();
    assert_eq!(created.username, "Trial-2222");
    assert!(created.trial);
    assert_eq!(created.quota_gb, 1);
    assert_eq!(created.ip_limit, 3);

    let expected_expire = (chrono::Local::now() + chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    assert_eq!(created.expire_date, expected_expire);
}

#[tokio::test]
async fn trial_exhaustion_reports_attempt_count() {
    let namer = Arc::new(QueueNamer::new([
        "Trial-7", "Trial-7", "Trial-7", "Trial-7", "Trial-7",
    ]));
    let env = env_with_namer(namer).await;

    let taken = panel_core::Account::resolve(
        Protocol::Trojan,
        &CreateRequest {
            username: "Trial-7".into(),
            password: None,
            expired_days: 1,
            quota_gb: 1,
            ip_limit: 3,
            bug_host: None,
        },
        panel_core::Credential::new_uuid(),
    );
    env.coordinator.catalog().insert(&taken).await.unwrap();

    let err = env.coordinator.create_trial(Protocol::Trojan).await.unwrap_err();
    assert!(matches!(err, LifecycleError::TrialExhausted(5)));
}

#[tokio::test]
async fn ssh_trial_uses_generated_password() {
    let namer = Arc::new(QueueNamer::new(["Trial-SSH-321"]));
    let env = env_with_namer(namer).await;

    let created = env.coordinator.create_trial(Protocol::Ssh).await.unwrap();
    assert_eq!(created.username, "Trial-SSH-321");
    assert_eq!(created.password.as_deref(), Some("ssh1234"));
    assert_eq!(created.ip_limit, 2);
    assert!(env.identity.contains("Trial-SSH-321"));
}

#[tokio::test]
async fn reload_fires_after_create_and_delete() {
    let env = env().await;
    env.coordinator
        .create(Protocol::Vless, trojan_request())
        .await
        .unwrap();
    env.coordinator.delete(Protocol::Vless, "alice").await.unwrap();
    assert_eq!(env.reload.count.load(Ordering::SeqCst), 2);
}
