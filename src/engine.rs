//! Policy engine seam.
//!
//! The gate never decides anything on its own: every (role, object, action)
//! question goes through a [`PolicyEngine`]. [`CasbinEngine`] is the
//! production implementation backed by a shared `casbin::Enforcer`.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use casbin::{Adapter, CoreApi, DefaultModel, Enforcer, FileAdapter, MemoryAdapter, MgmtApi};
use policy_gate_core::GateError;
use tokio::sync::RwLock;
use tracing::debug;

/// Answers "may `role` perform `action` on `object`?".
pub trait PolicyEngine: Send + Sync + 'static {
    fn enforce(
        &self,
        role: &str,
        object: &str,
        action: &str,
    ) -> impl Future<Output = Result<bool, GateError>> + Send;
}

/// Where the casbin model definition comes from.
#[derive(Debug, Clone)]
pub enum ModelSource {
    File(PathBuf),
    Text(String),
}

impl ModelSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn text(model: impl Into<String>) -> Self {
        Self::Text(model.into())
    }

    async fn load(self) -> Result<DefaultModel, GateError> {
        let model = match self {
            ModelSource::File(path) => DefaultModel::from_file(path).await?,
            ModelSource::Text(text) => DefaultModel::from_str(&text).await?,
        };
        Ok(model)
    }
}

type EnforcerFuture = Pin<Box<dyn Future<Output = casbin::Result<Enforcer>> + Send>>;

/// A caller-supplied casbin adapter, kept until the model is loaded.
pub struct AdapterFactory(Box<dyn FnOnce(DefaultModel) -> EnforcerFuture + Send>);

impl AdapterFactory {
    pub fn new<A>(adapter: A) -> Self
    where
        A: Adapter + 'static,
    {
        Self(Box::new(move |model| {
            Box::pin(async move { Enforcer::new(model, adapter).await })
        }))
    }

    async fn into_enforcer(self, model: DefaultModel) -> casbin::Result<Enforcer> {
        (self.0)(model).await
    }
}

impl std::fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterFactory").finish_non_exhaustive()
    }
}

/// Where the casbin policy rules come from.
#[derive(Debug)]
pub enum PolicySource {
    /// A policy CSV file read through `casbin::FileAdapter`.
    File(PathBuf),
    /// Any casbin storage adapter.
    Adapter(AdapterFactory),
    /// Rules held in memory, each starting with its policy type
    /// (`["p", "admin", "/users/1", "DELETE"]`, `["g", "alice", "admin"]`).
    Rules(Vec<Vec<String>>),
}

impl PolicySource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn adapter<A>(adapter: A) -> Self
    where
        A: Adapter + 'static,
    {
        Self::Adapter(AdapterFactory::new(adapter))
    }
}

/// Casbin-backed policy engine, cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct CasbinEngine {
    enforcer: Arc<RwLock<Enforcer>>,
}

impl std::fmt::Debug for CasbinEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasbinEngine").finish_non_exhaustive()
    }
}

impl CasbinEngine {
    /// Loads the model and policy into a new enforcer.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` when the model or policy cannot be loaded
    /// and `GateError::Config` for malformed in-memory rules.
    pub async fn new(model: ModelSource, policy: PolicySource) -> Result<Self, GateError> {
        let model = model.load().await?;

        let enforcer = match policy {
            PolicySource::File(path) => {
                debug!(policy.path = %path.display(), "Loading casbin policy file");
                Enforcer::new(model, FileAdapter::new(path.to_string_lossy().into_owned())).await?
            }
            PolicySource::Adapter(factory) => factory.into_enforcer(model).await?,
            PolicySource::Rules(rules) => {
                let mut enforcer = Enforcer::new(model, MemoryAdapter::default()).await?;
                load_rules(&mut enforcer, rules).await?;
                enforcer
            }
        };

        Ok(Self::from_enforcer(enforcer))
    }

    pub fn from_enforcer(enforcer: Enforcer) -> Self {
        Self {
            enforcer: Arc::new(RwLock::new(enforcer)),
        }
    }

    /// Shared handle to the underlying enforcer, for runtime policy management.
    pub fn enforcer(&self) -> Arc<RwLock<Enforcer>> {
        Arc::clone(&self.enforcer)
    }
}

impl PolicyEngine for CasbinEngine {
    async fn enforce(&self, role: &str, object: &str, action: &str) -> Result<bool, GateError> {
        let enforcer = self.enforcer.read().await;
        Ok(enforcer.enforce((role, object, action))?)
    }
}

async fn load_rules(enforcer: &mut Enforcer, rules: Vec<Vec<String>>) -> Result<(), GateError> {
    let mut by_type: BTreeMap<String, Vec<Vec<String>>> = BTreeMap::new();

    for mut rule in rules {
        if rule.len() < 2 {
            return Err(GateError::config(format!(
                "policy rule needs a type and at least one field: {:?}",
                rule
            )));
        }
        let ptype = rule.remove(0).trim().to_string();
        let fields = rule.into_iter().map(|f| f.trim().to_string()).collect();
        by_type.entry(ptype).or_default().push(fields);
    }

    for (ptype, rules) in by_type {
        let count = rules.len();
        if ptype.starts_with('g') {
            enforcer.add_named_grouping_policies(&ptype, rules).await?;
        } else if ptype.starts_with('p') {
            enforcer.add_named_policies(&ptype, rules).await?;
        } else {
            return Err(GateError::config(format!("unknown policy type: {}", ptype)));
        }
        debug!(policy.ptype = %ptype, policy.count = count, "Loaded in-memory rules");
    }

    enforcer.build_role_links()?;
    Ok(())
}
