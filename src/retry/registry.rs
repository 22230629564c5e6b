//! Retry policy slots consulted by the dispatcher.

use std::sync::{Arc, OnceLock, RwLock};

use crate::types::RequestOptions;

use super::RetryPolicy;

/// Builds a policy for a specific call, keyed by its options.
pub type PolicyFactory = Arc<dyn Fn(&RequestOptions) -> RetryPolicy + Send + Sync>;

/// Four optional slots: explicit policy and policy factory, independently for
/// the synchronous and asynchronous execution paths.
///
/// An explicit policy wins over a factory; with neither set, the dispatcher
/// falls back to a built-in default. Client-factory construction installs
/// defaults only into empty slots, so a customization installed first persists
/// across later factory constructions in the same process. `reset` empties
/// every slot for test isolation.
#[derive(Default)]
pub struct RetryPolicyRegistry {
    sync_policy: RwLock<Option<Arc<RetryPolicy>>>,
    sync_factory: RwLock<Option<PolicyFactory>>,
    async_policy: RwLock<Option<Arc<RetryPolicy>>>,
    async_factory: RwLock<Option<PolicyFactory>>,
}

impl RetryPolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by factories not given their own.
    pub fn shared() -> Arc<RetryPolicyRegistry> {
        static SHARED: OnceLock<Arc<RetryPolicyRegistry>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(RetryPolicyRegistry::new()))
            .clone()
    }

    pub fn sync_policy(&self) -> Option<Arc<RetryPolicy>> {
        self.sync_policy.read().unwrap().clone()
    }

    pub fn async_policy(&self) -> Option<Arc<RetryPolicy>> {
        self.async_policy.read().unwrap().clone()
    }

    pub fn sync_factory(&self) -> Option<PolicyFactory> {
        self.sync_factory.read().unwrap().clone()
    }

    pub fn async_factory(&self) -> Option<PolicyFactory> {
        self.async_factory.read().unwrap().clone()
    }

    /// Install an explicit policy for the synchronous path, replacing any
    /// previous assignment.
    pub fn set_sync_policy(&self, policy: RetryPolicy) {
        *self.sync_policy.write().unwrap() = Some(Arc::new(policy));
    }

    pub fn set_async_policy(&self, policy: RetryPolicy) {
        *self.async_policy.write().unwrap() = Some(Arc::new(policy));
    }

    pub fn set_sync_factory(&self, factory: PolicyFactory) {
        *self.sync_factory.write().unwrap() = Some(factory);
    }

    pub fn set_async_factory(&self, factory: PolicyFactory) {
        *self.async_factory.write().unwrap() = Some(factory);
    }

    /// Install `policy` for the synchronous path only if neither an explicit
    /// policy nor a factory has been assigned. First writer wins.
    pub fn install_sync_default(&self, policy: RetryPolicy) {
        let mut slot = self.sync_policy.write().unwrap();
        if slot.is_none() && self.sync_factory.read().unwrap().is_none() {
            *slot = Some(Arc::new(policy));
        }
    }

    /// First-writer-wins installation for the asynchronous path.
    pub fn install_async_default(&self, policy: RetryPolicy) {
        let mut slot = self.async_policy.write().unwrap();
        if slot.is_none() && self.async_factory.read().unwrap().is_none() {
            *slot = Some(Arc::new(policy));
        }
    }

    /// Empty every slot.
    pub fn reset(&self) {
        *self.sync_policy.write().unwrap() = None;
        *self.sync_factory.write().unwrap() = None;
        *self.async_policy.write().unwrap() = None;
        *self.async_factory.write().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_empty_slots() {
        let registry = RetryPolicyRegistry::new();
        assert!(registry.sync_policy().is_none());

        registry.install_sync_default(RetryPolicy::default());
        registry.install_async_default(RetryPolicy::default());

        assert!(registry.sync_policy().is_some());
        assert!(registry.async_policy().is_some());
    }

    #[test]
    fn default_installation_does_not_overwrite_existing_policy() {
        let registry = RetryPolicyRegistry::new();
        let custom = RetryPolicy::default().with_rate_limit_retries(9);
        registry.set_sync_policy(custom.clone());

        registry.install_sync_default(RetryPolicy::default());

        assert_eq!(*registry.sync_policy().unwrap(), custom);
    }

    #[test]
    fn default_installation_defers_to_factory() {
        let registry = RetryPolicyRegistry::new();
        registry.set_async_factory(Arc::new(|_| RetryPolicy::no_delay()));

        registry.install_async_default(RetryPolicy::default());

        assert!(registry.async_policy().is_none());
        assert!(registry.async_factory().is_some());
    }

    #[test]
    fn explicit_assignment_overwrites() {
        let registry = RetryPolicyRegistry::new();
        registry.set_sync_policy(RetryPolicy::default());
        let custom = RetryPolicy::default().with_transient_retries(7);
        registry.set_sync_policy(custom.clone());

        assert_eq!(*registry.sync_policy().unwrap(), custom);
    }

    #[test]
    fn reset_empties_all_slots() {
        let registry = RetryPolicyRegistry::new();
        registry.set_sync_policy(RetryPolicy::default());
        registry.set_async_policy(RetryPolicy::default());
        registry.set_sync_factory(Arc::new(|_| RetryPolicy::default()));
        registry.set_async_factory(Arc::new(|_| RetryPolicy::default()));

        registry.reset();

        assert!(registry.sync_policy().is_none());
        assert!(registry.async_policy().is_none());
        assert!(registry.sync_factory().is_none());
        assert!(registry.async_factory().is_none());
    }

    #[test]
    fn sync_and_async_slots_are_independent() {
        let registry = RetryPolicyRegistry::new();
        registry.set_sync_policy(RetryPolicy::default().with_rate_limit_retries(1));

        assert!(registry.sync_policy().is_some());
        assert!(registry.async_policy().is_none());
    }
}
