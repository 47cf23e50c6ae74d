//! The lifecycle coordinator.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use panel_catalog::AccountCatalog;
use panel_config::PathsConfig;
use panel_core::defaults::TRIAL_NAME_ATTEMPTS;
use panel_core::{
    validate_request, Account, CreateRequest, Credential, Protocol, TrialNamer, TrialPolicy,
};
use panel_store::{FlatLedger, LimitStore};
use panel_xray::{PatchError, XrayStore};

use crate::cards::CardWriter;
use crate::error::LifecycleError;
use crate::identity::IdentityService;
use crate::info::ServerInfo;
use crate::links::{build_links, AccountLinks};
use crate::locks::NameLocks;
use crate::reload::ReloadTrigger;
use crate::saga::Saga;

/// Result of a successful create, with everything the caller needs to hand
/// the account to its user.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedAccount {
    pub username: String,
    pub protocol: Protocol,
    pub password: Option<String>,
    pub uuid: Option<String>,
    pub quota_gb: u64,
    pub ip_limit: u32,
    pub expire_date: String,
    pub links: Option<AccountLinks>,
    pub config_url: String,
    pub trial: bool,
}

/// Orchestrates create and delete across the five stores.
///
/// Steps run in a strict order; each completed step registers its
/// compensation with a [`Saga`], which unwinds on a later failure. All
/// operations for one username are serialized by [`NameLocks`].
pub struct LifecycleCoordinator {
    paths: PathsConfig,
    xray: Arc<XrayStore>,
    limits: LimitStore,
    ledger: Arc<FlatLedger>,
    cards: CardWriter,
    catalog: AccountCatalog,
    identity: Arc<dyn IdentityService>,
    reload: Arc<dyn ReloadTrigger>,
    namer: Arc<dyn TrialNamer>,
    locks: NameLocks,
}

impl LifecycleCoordinator {
    pub fn new(
        paths: PathsConfig,
        catalog: AccountCatalog,
        identity: Arc<dyn IdentityService>,
        reload: Arc<dyn ReloadTrigger>,
        namer: Arc<dyn TrialNamer>,
    ) -> Self {
        LifecycleCoordinator {
            xray: Arc::new(XrayStore::new(paths.xray_config.clone())),
            limits: LimitStore::new(paths.clone()),
            ledger: Arc::new(FlatLedger::new(paths.clone())),
            cards: CardWriter::new(paths.html_dir.clone()),
            paths,
            catalog,
            identity,
            reload,
            namer,
            locks: NameLocks::new(),
        }
    }

    /// Create an account from caller-supplied parameters.
    pub async fn create(
        &self,
        protocol: Protocol,
        req: CreateRequest,
    ) -> Result<CreatedAccount, LifecycleError> {
        validate_request(protocol, &req)?;
        let _guard = self.locks.acquire(&req.username).await;
        if self.is_taken(&req.username).await? {
            return Err(LifecycleError::Duplicate(req.username));
        }
        let credential = match protocol {
            Protocol::Ssh => Credential::Password(req.password.clone().unwrap_or_default()),
            _ => Credential::new_uuid(),
        };
        let account = Account::resolve(protocol, &req, credential);
        self.provision(account, false).await
    }

    /// Create a trial account with a system-chosen username and fixed
    /// policy limits.
    pub async fn create_trial(&self, protocol: Protocol) -> Result<CreatedAccount, LifecycleError> {
        let policy = TrialPolicy::for_protocol(protocol);
        for attempt in 0..TRIAL_NAME_ATTEMPTS {
            let candidate = self.namer.next_candidate(protocol, attempt > 0);
            let _guard = self.locks.acquire(&candidate).await;
            if self.is_taken(&candidate).await? {
                continue;
            }
            let password = protocol.is_ssh().then(|| self.namer.trial_password());
            let credential = match &password {
                Some(p) => Credential::Password(p.clone()),
                None => Credential::new_uuid(),
            };
            let req = CreateRequest {
                username: candidate,
                password,
                expired_days: policy.days,
                quota_gb: policy.quota_gb,
                ip_limit: policy.ip_limit,
                bug_host: None,
            };
            let account = Account::resolve(protocol, &req, credential);
            return self.provision(account, true).await;
        }
        Err(LifecycleError::TrialExhausted(TRIAL_NAME_ATTEMPTS))
    }

    /// Delete an account's footprint from every store.
    ///
    /// The catalog row is the existence gate; every subsequent removal
    /// tolerates an entry that is already gone.
    pub async fn delete(&self, protocol: Protocol, username: &str) -> Result<(), LifecycleError> {
        let _guard = self.locks.acquire(username).await;
        let row = self
            .catalog
            .lookup(username, protocol)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(username.to_string()))?;

        if protocol.is_ssh() {
            self.identity.remove(username).await?;
        } else {
            for &transport in protocol.transports() {
                match self
                    .xray
                    .delete(protocol, transport, username, &row.expire_date)
                    .await
                {
                    Ok(()) => {}
                    Err(PatchError::BlockNotFound { .. }) => {
                        warn!(username, %transport, "config block already absent");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        self.limits.remove(protocol, username).await?;
        self.ledger.remove(protocol, username).await?;
        self.cards.remove(protocol, username).await?;
        self.catalog.delete(username, protocol).await?;
        info!(username, protocol = %protocol, "account deleted");
        self.fire_reload().await;
        Ok(())
    }

    /// Uniqueness probe across the identity store, the daemon config text
    /// and the catalog. Any hit means the name is taken.
    async fn is_taken(&self, username: &str) -> Result<bool, LifecycleError> {
        if self.identity.exists(username).await? {
            return Ok(true);
        }
        if self.xray.contains_user(username).await? {
            return Ok(true);
        }
        if self.catalog.exists(username).await? {
            return Ok(true);
        }
        Ok(false)
    }

    async fn provision(
        &self,
        account: Account,
        trial: bool,
    ) -> Result<CreatedAccount, LifecycleError> {
        let mut saga = Saga::new();
        match self.apply_create(&account, trial, &mut saga).await {
            Ok(created) => {
                saga.commit();
                info!(
                    username = %account.username,
                    protocol = %account.protocol,
                    expire = %account.expire_date,
                    trial,
                    "account created"
                );
                self.fire_reload().await;
                Ok(created)
            }
            Err(e) => {
                saga.unwind(&e).await;
                Err(e)
            }
        }
    }

    async fn apply_create(
        &self,
        account: &Account,
        trial: bool,
        saga: &mut Saga,
    ) -> Result<CreatedAccount, LifecycleError> {
        let protocol = account.protocol;

        if protocol.is_ssh() {
            self.identity
                .create(
                    &account.username,
                    account.credential.secret(),
                    &account.expire_date,
                )
                .await?;
            let identity = Arc::clone(&self.identity);
            let username = account.username.clone();
            saga.push("identity create", async move {
                identity.remove(&username).await
            });
        } else {
            for &transport in protocol.transports() {
                self.xray
                    .insert(
                        protocol,
                        transport,
                        &account.username,
                        &account.expire_date,
                        account.credential.secret(),
                    )
                    .await?;
                let xray = Arc::clone(&self.xray);
                let username = account.username.clone();
                let expire = account.expire_date.clone();
                saga.push("config block insert", async move {
                    match xray.delete(protocol, transport, &username, &expire).await {
                        Ok(()) | Err(PatchError::BlockNotFound { .. }) => Ok(()),
                        Err(e) => Err(e.into()),
                    }
                });
            }
        }

        self.limits.write(account).await?;
        {
            let limits = self.limits.clone();
            let username = account.username.clone();
            saga.push("limit files", async move {
                limits.remove(protocol, &username).await.map_err(Into::into)
            });
        }

        self.ledger.append(account).await?;
        {
            let ledger = Arc::clone(&self.ledger);
            let username = account.username.clone();
            saga.push("ledger append", async move {
                ledger
                    .remove(protocol, &username)
                    .await
                    .map(|_| ())
                    .map_err(Into::into)
            });
        }

        let server = ServerInfo::load(&self.paths).await;
        let links = build_links(
            protocol,
            &account.username,
            account.credential.secret(),
            &server.domain,
            &account.bug_host,
        );
        self.cards.write(account, &server, links.as_ref()).await?;
        {
            let cards = self.cards.clone();
            let username = account.username.clone();
            saga.push("card write", async move {
                cards.remove(protocol, &username).await
            });
        }

        self.catalog.insert(account).await?;
        {
            let catalog = self.catalog.clone();
            let username = account.username.clone();
            saga.push("catalog insert", async move {
                catalog
                    .delete(&username, protocol)
                    .await
                    .map(|_| ())
                    .map_err(Into::into)
            });
        }

        let (password, uuid) = match &account.credential {
            Credential::Password(p) => (Some(p.clone()), None),
            Credential::Uuid(u) => (None, Some(u.clone())),
        };
        Ok(CreatedAccount {
            username: account.username.clone(),
            protocol,
            password,
            uuid,
            quota_gb: account.quota_gb,
            ip_limit: account.ip_limit,
            expire_date: account.expire_date.clone(),
            links,
            config_url: format!(
                "https://{}:81/{}-{}.txt",
                server.domain,
                protocol.as_str(),
                account.username
            ),
            trial,
        })
    }

    /// Reload failure never rolls back committed store mutations.
    async fn fire_reload(&self) {
        if let Err(e) = self.reload.reload().await {
            warn!(error = %e, "daemon reload failed; store mutations remain committed");
        }
    }

    /// The catalog handle, for read-side queries.
    pub fn catalog(&self) -> &AccountCatalog {
        &self.catalog
    }

    /// The filesystem layout in use.
    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("xray", &self.xray.path())
            .finish_non_exhaustive()
    }
}
