//! The canonical graph store.
//!
//! The store is seeded once from the bulk snapshot and thereafter grown
//! exclusively by applying deltas. Every non-redundant change publishes a
//! new [`Snapshot`] to all subscribers; a fully redundant delta publishes
//! nothing, so consumers are never woken for a no-op.

use crate::reconcile::{admit_link, admit_node};
use crate::snapshot::Snapshot;
use lattice_core::{DeltaEvent, GraphData};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Capacity of the subscriber fan-out channel. Publishes are rare (one per
/// admitted delta), so a small buffer is plenty before slow subscribers lag.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Owns the canonical graph and multicasts snapshots to consumers.
///
/// `seed` and `apply` must not be called reentrantly; the engine drives
/// them from a single task, and shared access goes through one lock.
#[derive(Debug)]
pub struct GraphStore {
    current: Option<Snapshot>,
    updates: broadcast::Sender<Snapshot>,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Creates an empty, unseeded store.
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        Self {
            current: None,
            updates,
        }
    }

    /// The latest published snapshot, or `None` before the seed.
    pub fn current(&self) -> Option<Snapshot> {
        self.current.clone()
    }

    /// True once the bulk snapshot has been installed.
    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Subscribes to future publishes. Late subscribers receive only
    /// snapshots published after this call; the past is available through
    /// [`GraphStore::current`]. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    /// Installs the first graph and notifies subscribers exactly once.
    ///
    /// A second seed is ignored: the graph is append-only and replacing it
    /// wholesale could shrink the published view.
    pub fn seed(&mut self, data: GraphData) {
        if self.current.is_some() {
            warn!("ignoring second seed; store is already loaded");
            return;
        }

        let snapshot = Snapshot::from_data(data);
        debug!(
            nodes = snapshot.node_count(),
            links = snapshot.link_count(),
            "seeded graph store"
        );
        self.publish(snapshot);
    }

    /// Applies one delta. Returns true and notifies subscribers iff the
    /// reconciler admitted something; a fully redundant delta leaves the
    /// store untouched and fires no notification.
    ///
    /// Deltas arriving before the seed are dropped: without the baseline a
    /// candidate cannot be classified, and admitting it would shadow the
    /// snapshot entry once the bulk load lands.
    pub fn apply(&mut self, delta: DeltaEvent) -> bool {
        let Some(current) = &self.current else {
            warn!("dropping delta received before the bulk snapshot");
            return false;
        };

        let node = delta.node.filter(|candidate| {
            let admitted = admit_node(current.nodes(), candidate).is_absent();
            if !admitted {
                if let Some(existing) = current.node(&candidate.id) {
                    if existing.as_ref() != candidate {
                        // First write wins; the differing re-delivery is dropped.
                        debug!(id = %candidate.id, "dropping re-delivered node with changed fields");
                    }
                }
            }
            admitted
        });

        let link = delta.link.filter(|candidate| {
            admit_link(current.links(), candidate).is_absent()
        });

        if node.is_none() && link.is_none() {
            return false;
        }

        let next = current.with_appended(node, link);
        self.publish(next);
        true
    }

    fn publish(&mut self, snapshot: Snapshot) {
        self.current = Some(snapshot.clone());
        // No receivers is fine; current() still serves late consumers.
        let _ = self.updates.send(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::{Link, Node};

    fn seed_data() -> GraphData {
        GraphData::new(vec![Node::new("!a:x", "A")], vec![])
    }

    fn delta(node: Option<Node>, link: Option<Link>) -> DeltaEvent {
        DeltaEvent { node, link }
    }

    /// Drains every pending notification and returns how many there were.
    fn drain(rx: &mut broadcast::Receiver<Snapshot>) -> usize {
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    #[test]
    fn test_seed_notifies_once() {
        let mut store = GraphStore::new();
        let mut rx = store.subscribe();

        store.seed(seed_data());

        assert!(store.is_loaded());
        assert_eq!(drain(&mut rx), 1);
    }

    #[test]
    fn test_second_seed_ignored() {
        let mut store = GraphStore::new();
        store.seed(seed_data());
        let mut rx = store.subscribe();

        store.seed(GraphData::new(vec![Node::new("!z:x", "Z")], vec![]));

        assert_eq!(drain(&mut rx), 0);
        assert!(store.current().unwrap().contains_node("!a:x"));
        assert!(!store.current().unwrap().contains_node("!z:x"));
    }

    #[test]
    fn test_apply_new_node_and_link() {
        // Seed A; a delta brings node B and link A->B.
        let mut store = GraphStore::new();
        store.seed(seed_data());
        let mut rx = store.subscribe();

        let applied = store.apply(delta(
            Some(Node::new("!b:x", "B")),
            Some(Link::new("!a:x", "!b:x")),
        ));

        assert!(applied);
        let snapshot = store.current().unwrap();
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.link_count(), 1);
        assert_eq!(drain(&mut rx), 1);
    }

    #[test]
    fn test_redundant_delta_suppressed() {
        // Re-delivering the seeded node changes nothing and fires nothing.
        let mut store = GraphStore::new();
        store.seed(seed_data());
        let mut rx = store.subscribe();

        let applied = store.apply(delta(Some(Node::new("!a:x", "A")), None));

        assert!(!applied);
        assert_eq!(store.current().unwrap().node_count(), 1);
        assert_eq!(drain(&mut rx), 0);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut store = GraphStore::new();
        store.seed(seed_data());

        let once = delta(
            Some(Node::new("!b:x", "B")),
            Some(Link::new("!a:x", "!b:x")),
        );
        assert!(store.apply(once.clone()));
        assert!(!store.apply(once));

        let snapshot = store.current().unwrap();
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.link_count(), 1);
    }

    #[test]
    fn test_partial_delta_admits_only_the_new_half() {
        // Node is known, link is not: one publish, link appended, node dropped.
        let mut store = GraphStore::new();
        store.seed(GraphData::new(
            vec![Node::new("!a:x", "A"), Node::new("!b:x", "B")],
            vec![],
        ));
        let mut rx = store.subscribe();

        let applied = store.apply(delta(
            Some(Node::new("!b:x", "B")),
            Some(Link::new("!a:x", "!b:x")),
        ));

        assert!(applied);
        let snapshot = store.current().unwrap();
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.link_count(), 1);
        assert_eq!(drain(&mut rx), 1);
    }

    #[test]
    fn test_append_only_across_sequence() {
        let mut store = GraphStore::new();
        store.seed(seed_data());

        let deltas = vec![
            delta(Some(Node::new("!b:x", "B")), None),
            delta(None, Some(Link::new("!a:x", "!b:x"))),
            delta(Some(Node::new("!a:x", "A")), None), // duplicate
            delta(Some(Node::new("!c:x", "C")), Some(Link::new("!a:x", "!b:x"))),
        ];

        let mut node_count = store.current().unwrap().node_count();
        let mut link_count = store.current().unwrap().link_count();

        for delta in deltas {
            store.apply(delta);
            let snapshot = store.current().unwrap();
            assert!(snapshot.node_count() >= node_count);
            assert!(snapshot.link_count() >= link_count);
            node_count = snapshot.node_count();
            link_count = snapshot.link_count();
        }

        assert_eq!(node_count, 3);
        assert_eq!(link_count, 1);
    }

    #[test]
    fn test_disjoint_deltas_commute() {
        let first = delta(Some(Node::new("!b:x", "B")), None);
        let second = delta(
            Some(Node::new("!c:x", "C")),
            Some(Link::new("!c:x", "!c:x")),
        );

        let mut forward = GraphStore::new();
        forward.seed(seed_data());
        forward.apply(first.clone());
        forward.apply(second.clone());

        let mut reverse = GraphStore::new();
        reverse.seed(seed_data());
        reverse.apply(second);
        reverse.apply(first);

        let a = forward.current().unwrap();
        let b = reverse.current().unwrap();
        assert_eq!(a.node_count(), b.node_count());
        assert_eq!(a.link_count(), b.link_count());
        for node in a.nodes() {
            assert!(b.contains_node(&node.id));
        }
        for link in a.links() {
            assert!(b.contains_link(link.source.id(), link.target.id()));
        }
    }

    #[test]
    fn test_delta_before_seed_dropped() {
        let mut store = GraphStore::new();
        let mut rx = store.subscribe();

        let applied = store.apply(delta(Some(Node::new("!a:x", "A")), None));

        assert!(!applied);
        assert!(!store.is_loaded());
        assert_eq!(drain(&mut rx), 0);
    }

    #[test]
    fn test_nested_link_endpoints_deduped_against_seed() {
        // The push feed re-delivers a known link with node-like endpoints.
        let mut store = GraphStore::new();
        store.seed(GraphData::new(
            vec![Node::new("!a:x", "A"), Node::new("!b:x", "B")],
            vec![Link::new("!a:x", "!b:x")],
        ));
        let mut rx = store.subscribe();

        let nested: Link = serde_json::from_str(
            r#"{"source": {"id": "!a:x", "name": "A"}, "target": {"id": "!b:x"}}"#,
        )
        .unwrap();
        let applied = store.apply(delta(None, Some(nested)));

        assert!(!applied);
        assert_eq!(store.current().unwrap().link_count(), 1);
        assert_eq!(drain(&mut rx), 0);
    }

    #[test]
    fn test_late_subscriber_gets_only_future_publishes() {
        let mut store = GraphStore::new();
        store.seed(seed_data());
        store.apply(delta(Some(Node::new("!b:x", "B")), None));

        // Joined after two publishes: sees neither, but current() is there.
        let mut rx = store.subscribe();
        assert_eq!(drain(&mut rx), 0);
        assert_eq!(store.current().unwrap().node_count(), 2);

        store.apply(delta(Some(Node::new("!c:x", "C")), None));
        assert_eq!(drain(&mut rx), 1);
    }

    #[test]
    fn test_snapshot_isolated_from_later_growth() {
        let mut store = GraphStore::new();
        store.seed(seed_data());
        let held = store.current().unwrap();

        store.apply(delta(Some(Node::new("!b:x", "B")), None));

        assert_eq!(held.node_count(), 1);
        assert_eq!(store.current().unwrap().node_count(), 2);
    }
}
