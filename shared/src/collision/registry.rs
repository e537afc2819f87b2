/*!
Per-tick body registry and the discrete overlap pass.

The registry is rebuilt from the live transform tree every tick, so a body leaves the
simulation as soon as its node is removed; there is nothing to deregister. It keeps two
views: the node list in traversal order (driving the pairwise pass, which re-reads live
positions because earlier pairs may already have pushed a body) and a frozen snapshot of
world boxes (serving swept traces).

The pairwise pass is O(n^2). That is the complexity ceiling at the intended scale.
*/

use crate::collision::aabb::Aabb;
use crate::collision::body::{Contact, ContactKind};
use crate::collision::narrow_phase::{penetration, remove_inward};
use crate::collision::settings::PhysicsSettings;
use crate::collision::types::{BodyKind, CollisionEvent, ContactResponse, Obstacle};
use crate::math::{Vec3, normalize_or_zero, with_length};
use crate::scene::{NodeId, Scene};

/// Snapshot of every body under a scene root.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    obstacles: Vec<Obstacle>,
}

impl Registry {
    /// Walk the subtree under `root` in pre-order and record each node carrying a body.
    pub fn collect(scene: &Scene, root: NodeId) -> Self {
        let mut obstacles = Vec::new();
        scene.traverse(root, |id, node| {
            if let Some(body) = &node.body {
                obstacles.push(Obstacle {
                    node: id,
                    kind: body.kind,
                    bounds: body.world_bounds(node.position),
                    velocity: body.velocity,
                });
            }
        });
        Self { obstacles }
    }

    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.node == node)
    }

    /// Refresh the snapshot entry of `node` from the scene, e.g. after it moved.
    pub fn refresh(&mut self, scene: &Scene, node: NodeId) {
        let Some(entry) = self.obstacles.iter_mut().find(|o| o.node == node) else {
            return;
        };
        if let Some((position, body)) = scene
            .get(node)
            .and_then(|live| live.body.as_ref().map(|body| (live.position, body)))
        {
            entry.bounds = body.world_bounds(position);
            entry.velocity = body.velocity;
        }
    }

    /// Run the pairwise discrete pass over the registered bodies and return the collision
    /// events it produced, two per resolved contact.
    pub fn resolve_discrete(
        &self,
        scene: &mut Scene,
        settings: &PhysicsSettings,
    ) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        for (i, a) in self.obstacles.iter().enumerate() {
            for b in &self.obstacles[i + 1..] {
                resolve_pair(scene, a.node, b.node, settings, &mut events);
            }
        }
        events
    }
}

/// Live state of one side of a pair.
#[derive(Clone, Copy)]
struct Side {
    node: NodeId,
    kind: BodyKind,
    position: Vec3,
}

fn live_side(scene: &Scene, node: NodeId) -> Option<(Side, Aabb)> {
    let live = scene.get(node)?;
    let body = live.body.as_ref()?;
    let side = Side {
        node,
        kind: body.kind,
        position: live.position,
    };
    Some((side, body.world_bounds(live.position)))
}

fn notify(scene: &mut Scene, this: Side, other: Side, kind: ContactKind) -> ContactResponse {
    let contact = Contact {
        node: this.node,
        other: other.node,
        other_kind: other.kind,
        kind,
    };
    match scene.get_mut(this.node).and_then(|n| n.body.as_mut()) {
        Some(body) => body.handler.on_collide(&contact),
        None => ContactResponse::Resolve,
    }
}

fn resolve_pair(
    scene: &mut Scene,
    a: NodeId,
    b: NodeId,
    settings: &PhysicsSettings,
    events: &mut Vec<CollisionEvent>,
) {
    // Either node may have been removed by an earlier pair's handler side effects.
    let (Some((sa, box_a)), Some((sb, box_b))) = (live_side(scene, a), live_side(scene, b)) else {
        return;
    };

    use BodyKind::{Bullet, Static};
    if (sa.kind == Static && sb.kind == Static) || (sa.kind == Bullet && sb.kind == Bullet) {
        return;
    }

    if sa.kind == Bullet || sb.kind == Bullet {
        let (bullet, target, target_box) = if sa.kind == Bullet {
            (sa, sb, box_b)
        } else {
            (sb, sa, box_a)
        };
        if target_box.contains_point(bullet.position)
            && notify(scene, bullet, target, ContactKind::Point) == ContactResponse::Ignore
        {
            return;
        }
    }

    if !box_a.overlaps(&box_b) {
        return;
    }

    // Both sides hear about the contact even if the first one vetoes.
    let response_a = notify(scene, sa, sb, ContactKind::Overlap);
    let response_b = notify(scene, sb, sa, ContactKind::Overlap);
    if response_a == ContactResponse::Ignore || response_b == ContactResponse::Ignore {
        return;
    }

    events.push(CollisionEvent {
        node: sa.node,
        other: sb.node,
    });
    events.push(CollisionEvent {
        node: sb.node,
        other: sa.node,
    });

    let Some(pen) = penetration(&box_a, &box_b) else {
        return;
    };
    log::trace!("separating {:?} and {:?} by {pen:?}", sa.node, sb.node);

    if sa.kind == Static {
        push_out(scene, sb.node, -pen * settings.overclip);
    } else if sb.kind == Static {
        push_out(scene, sa.node, pen * settings.overclip);
    } else {
        let mut half = pen * 0.5;
        if half.norm() < settings.min_dynamic_separation {
            half = with_length(half, settings.min_dynamic_separation);
        }
        translate(scene, sa.node, half);
        translate(scene, sb.node, -half);
    }
}

/// Move a body out of static geometry and stop it moving back in.
fn push_out(scene: &mut Scene, node: NodeId, offset: Vec3) {
    let Some(live) = scene.get_mut(node) else {
        return;
    };
    live.position += offset;
    if let Some(body) = live.body.as_mut() {
        body.velocity = remove_inward(body.velocity, normalize_or_zero(offset));
    }
}

fn translate(scene: &mut Scene, node: NodeId, offset: Vec3) {
    if let Some(live) = scene.get_mut(node) {
        live.position += offset;
    }
}
