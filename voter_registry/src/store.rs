//! The authoritative in-memory collection of voters.
//!
//! Every mutation is an async unit of work that completes after a simulated
//! latency (see [StoreSettings]). The store does not serialize concurrent
//! calls: two overlapping `update`s of the same record resolve as
//! last-writer-wins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::{debug, info};
use tokio::sync::RwLock;

use crate::config::{IdGenerator, RecordId, StoreSettings, Voter, VoterPatch};

pub struct VoterStore {
    settings: StoreSettings,
    ids: IdGenerator,
    voters: RwLock<Vec<Voter>>,
    in_flight: AtomicUsize,
}

// Marks the store busy for as long as it is alive.
struct BusyGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> BusyGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> BusyGuard<'a> {
        counter.fetch_add(1, Ordering::SeqCst);
        BusyGuard { counter }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl VoterStore {
    pub fn new(settings: StoreSettings) -> VoterStore {
        VoterStore::with_voters(settings, Vec::new())
    }

    /// Creates a store seeded with the given records (typically a mock
    /// dataset). Each of them receives a fresh id.
    pub fn with_voters(settings: StoreSettings, seed: Vec<Voter>) -> VoterStore {
        let ids = IdGenerator::new();
        let voters: Vec<Voter> = seed
            .into_iter()
            .map(|v| Voter {
                id: ids.next_id(),
                ..v
            })
            .collect();
        info!("VoterStore: seeded with {} voters", voters.len());
        VoterStore {
            settings,
            ids,
            voters: RwLock::new(voters),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// The id sequence of this store. Pass it to the CSV decoder so that
    /// imported records get ids that do not collide with existing ones.
    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    pub fn settings(&self) -> StoreSettings {
        self.settings
    }

    /// True while at least one operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// A copy of the current collection, in insertion order.
    pub async fn snapshot(&self) -> Vec<Voter> {
        self.voters.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.voters.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.voters.read().await.is_empty()
    }

    pub async fn get(&self, id: RecordId) -> Option<Voter> {
        self.voters.read().await.iter().find(|v| v.id == id).cloned()
    }

    /// Creates a record from the supplied fields and appends it.
    pub async fn add(&self, patch: &VoterPatch) -> Voter {
        let _busy = BusyGuard::new(&self.in_flight);
        pause(self.settings.mutation_latency).await;
        let voter = patch.to_voter(self.ids.next_id());
        self.voters.write().await.push(voter.clone());
        info!("add: voter {} ({:?})", voter.id, voter.voter_id);
        voter
    }

    /// Merges the supplied fields over the record with this id.
    ///
    /// Returns the updated record, or `None` if no record has this id. In
    /// that case nothing is changed.
    pub async fn update(&self, id: RecordId, patch: &VoterPatch) -> Option<Voter> {
        let _busy = BusyGuard::new(&self.in_flight);
        pause(self.settings.mutation_latency).await;
        let mut voters = self.voters.write().await;
        match voters.iter_mut().find(|v| v.id == id) {
            Some(voter) => {
                patch.apply_to(voter);
                info!("update: voter {}", id);
                Some(voter.clone())
            }
            None => {
                debug!("update: no voter with id {}, ignoring", id);
                None
            }
        }
    }

    /// Removes the record with this id. Returns false if there was none.
    pub async fn delete(&self, id: RecordId) -> bool {
        let _busy = BusyGuard::new(&self.in_flight);
        pause(self.settings.mutation_latency).await;
        let mut voters = self.voters.write().await;
        let before = voters.len();
        voters.retain(|v| v.id != id);
        let removed = voters.len() < before;
        if removed {
            info!("delete: voter {}", id);
        } else {
            debug!("delete: no voter with id {}, ignoring", id);
        }
        removed
    }

    /// Appends records that already carry their ids (usually decoded with
    /// [VoterStore::ids]), in order, and hands them back.
    pub async fn bulk_import(&self, batch: Vec<Voter>) -> Vec<Voter> {
        let _busy = BusyGuard::new(&self.in_flight);
        pause(self.settings.import_latency).await;
        let mut voters = self.voters.write().await;
        voters.extend(batch.iter().cloned());
        info!(
            "bulk_import: imported {} voters, {} in store",
            batch.len(),
            voters.len()
        );
        batch
    }
}

async fn pause(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}
