//! Priority queue for tracking vault health (min-heap by health)

use crate::health::VaultHealth;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;
use vault_engine::VaultId;

/// Health-based priority queue (min-heap: lowest health first)
pub struct HealthQueue {
    /// Priority queue (using Reverse for min-heap)
    queue: PriorityQueue<VaultId, Reverse<i128>>,
    /// Snapshots by vault id
    map: HashMap<VaultId, VaultHealth>,
}

impl HealthQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Push or replace a vault's snapshot
    pub fn push(&mut self, vault_health: VaultHealth) {
        let id = vault_health.id;
        let health = vault_health.health;
        self.map.insert(id, vault_health);
        self.queue.push(id, Reverse(health));
    }

    /// Peek at vault with lowest health without removing
    pub fn peek(&self) -> Option<&VaultHealth> {
        let (id, _priority) = self.queue.peek()?;
        self.map.get(id)
    }

    /// Replace a snapshot; returns false if the vault was not queued
    pub fn update(&mut self, vault_health: VaultHealth) -> bool {
        let id = vault_health.id;
        if !self.map.contains_key(&id) {
            return false;
        }
        self.queue.change_priority(&id, Reverse(vault_health.health));
        self.map.insert(id, vault_health);
        true
    }

    pub fn remove(&mut self, id: &VaultId) -> Option<VaultHealth> {
        self.queue.remove(id);
        self.map.remove(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Vaults below the minimum ratio, worst first
    pub fn get_liquidatable(&self) -> Vec<VaultHealth> {
        self.sorted(|vh| vh.needs_liquidation())
    }

    /// Safe vaults within `buffer` points of the minimum, worst first
    pub fn get_at_risk(&self, buffer: i128) -> Vec<VaultHealth> {
        self.sorted(|vh| vh.at_risk(buffer))
    }

    /// Drop every snapshot and reload from `snapshots`
    pub fn refresh(&mut self, snapshots: impl IntoIterator<Item = VaultHealth>) {
        self.clear();
        for vh in snapshots {
            self.push(vh);
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.map.clear();
    }

    fn sorted(&self, keep: impl Fn(&VaultHealth) -> bool) -> Vec<VaultHealth> {
        let mut out: Vec<VaultHealth> = self.map.values().filter(|vh| keep(vh)).cloned().collect();
        out.sort_by_key(|vh| (vh.health, vh.id));
        out
    }
}

impl Default for HealthQueue {
    fn default() -> Self {
        Self::new()
    }
}
