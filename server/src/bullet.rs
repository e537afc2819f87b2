//! Bullets: short-lived BULLET bodies that report the first thing they hit.
//!
//! Hits reach the world over a channel. The bullet's collision handler sends one when the
//! discrete pass finds the bullet inside another body; the world sends one when the
//! bullet's swept move is blocked. Either way the bullet vetoes any push-out and the
//! world despawns it after the pass.

use std::sync::mpsc::Sender;

use shared::{BodyKind, CollisionHandler, Contact, ContactResponse, NodeId};

/// A bullet reported hitting `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BulletHit {
    pub bullet: NodeId,
    pub target: NodeId,
}

/// Bookkeeping for a live bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bullet {
    pub node: NodeId,
    /// Never hits this node (usually whoever fired it).
    pub owner: Option<NodeId>,
    pub ticks_left: u32,
}

pub struct BulletHandler {
    owner: Option<NodeId>,
    hits: Sender<BulletHit>,
    spent: bool,
}

impl BulletHandler {
    pub fn new(owner: Option<NodeId>, hits: Sender<BulletHit>) -> Self {
        Self {
            owner,
            hits,
            spent: false,
        }
    }
}

impl CollisionHandler for BulletHandler {
    fn on_collide(&mut self, contact: &Contact) -> ContactResponse {
        if self.spent || contact.other_kind == BodyKind::Bullet || Some(contact.other) == self.owner
        {
            return ContactResponse::Ignore;
        }

        self.spent = true;
        // The world may already be gone during teardown; nothing to report to then.
        let _ = self.hits.send(BulletHit {
            bullet: contact.node,
            target: contact.other,
        });
        ContactResponse::Ignore
    }
}
