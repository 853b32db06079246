//! Per-identifier install locks
//!
//! Two installs of the same identifier never run at once. Installs that run
//! concurrently (stub batches) can still depend on each other in a loop, so
//! before blocking on a lock the waiter checks whether the holder is itself
//! waiting, directly or through its dependencies, on something the waiter
//! holds. That would never resolve and is reported as a cycle instead.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

#[derive(Default)]
struct LockState {
    locks: HashMap<String, Arc<AsyncMutex<()>>>,

    /// Blocked installs: the chain of identifiers held by the waiter and the
    /// identifier it waits for
    waits: Vec<(u64, Vec<String>, String)>,
    next_wait: u64,
}

impl LockState {
    /// Follow what `target`'s holder waits on until it either reaches
    /// something in `held` or runs out
    fn closes_cycle(&self, held: &[String], target: &str) -> bool {
        let mut frontier = vec![target.to_string()];
        let mut visited = Vec::new();

        while let Some(id) = frontier.pop() {
            if held.contains(&id) {
                return true;
            }
            if visited.contains(&id) {
                continue;
            }
            for (_, chain, awaited) in &self.waits {
                if chain.contains(&id) {
                    frontier.push(awaited.clone());
                }
            }
            visited.push(id);
        }
        false
    }
}

/// Lock map shared by every install of one resolver
#[derive(Default)]
pub struct InstallLocks {
    state: Mutex<LockState>,
}

/// Held install lock; released on drop
pub struct InstallGuard {
    _guard: OwnedMutexGuard<()>,
}

struct WaitEntry<'a> {
    locks: &'a InstallLocks,
    ticket: u64,
}

impl Drop for WaitEntry<'_> {
    fn drop(&mut self) {
        let mut state = self.locks.state.lock().unwrap_or_else(|e| e.into_inner());
        state.waits.retain(|(ticket, _, _)| *ticket != self.ticket);
    }
}

impl InstallLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `id` on behalf of an install holding `held`
    pub async fn acquire(&self, id: &str, held: &[String]) -> Result<InstallGuard> {
        let (lock, wait) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let lock = state.locks.entry(id.to_string()).or_default().clone();

            if let Ok(guard) = lock.clone().try_lock_owned() {
                return Ok(InstallGuard { _guard: guard });
            }

            if state.closes_cycle(held, id) {
                let mut chain = held.to_vec();
                chain.push(id.to_string());
                return Err(Error::DependencyCycle {
                    chain: chain.join(" -> "),
                });
            }

            let ticket = state.next_wait;
            state.next_wait += 1;
            state.waits.push((ticket, held.to_vec(), id.to_string()));
            (lock, WaitEntry {
                locks: self,
                ticket,
            })
        };

        debug!("Waiting for install of {} to finish", id);
        let guard = lock.lock_owned().await;
        drop(wait);
        Ok(InstallGuard { _guard: guard })
    }
}
