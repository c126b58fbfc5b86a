use crate::domain::credentials::CredentialSet;
use std::sync::RwLock;
use tokio::sync::{Mutex, MutexGuard};

/// Process-wide hand-off point for the credentials of the outbound call in flight.
///
/// Publishing waits for the previous holder to finish, so at most one order's
/// credentials are visible at a time and they stay in place until the guard is
/// dropped. Code that cannot receive credentials as a parameter (for example a
/// request-signing hook) reads them through [`CredentialSlot::current`].
#[derive(Debug, Default)]
pub struct CredentialSlot {
    section: Mutex<()>,
    current: RwLock<Option<CredentialSet>>,
}

impl CredentialSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the critical section and makes `credentials` the active set.
    pub async fn publish(&self, credentials: CredentialSet) -> ActiveCredentials<'_> {
        let section = self.section.lock().await;
        self.replace(Some(credentials.clone()));
        ActiveCredentials {
            slot: self,
            credentials,
            _section: section,
        }
    }

    /// The set published by the current holder, if any.
    pub fn current(&self) -> Option<CredentialSet> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace(&self, value: Option<CredentialSet>) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}

/// Guard for one publish-to-completion critical section.
///
/// The slot is cleared before the section is released.
#[derive(Debug)]
pub struct ActiveCredentials<'a> {
    slot: &'a CredentialSlot,
    credentials: CredentialSet,
    _section: MutexGuard<'a, ()>,
}

impl ActiveCredentials<'_> {
    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }
}

impl Drop for ActiveCredentials<'_> {
    fn drop(&mut self) {
        self.slot.replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn set(mid: &str) -> CredentialSet {
        CredentialSet::new(mid, "crc", "api").unwrap()
    }

    #[tokio::test]
    async fn test_publish_then_clear() {
        let slot = CredentialSlot::new();
        assert!(slot.current().is_none());

        {
            let active = slot.publish(set("111")).await;
            assert_eq!(active.credentials().merchant_id(), "111");
            assert_eq!(slot.current().unwrap().merchant_id(), "111");
        }

        assert!(slot.current().is_none());
    }

    #[tokio::test]
    async fn test_second_publisher_waits_for_first() {
        let slot = Arc::new(CredentialSlot::new());
        let first = slot.publish(set("111")).await;

        let contender = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move {
                let active = slot.publish(set("222")).await;
                active.credentials().merchant_id().to_string()
            })
        };

        // The contender cannot overwrite the slot while the first section is open.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(slot.current().unwrap().merchant_id(), "111");
        assert!(!contender.is_finished());

        drop(first);
        assert_eq!(contender.await.unwrap(), "222");
        assert!(slot.current().is_none());
    }
}
