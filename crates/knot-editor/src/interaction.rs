//! Selection and drag state machine.
//!
//! `transition` is pure: it takes the current state, a gesture and the live
//! overlays, and returns the next state, what to do with the overlays, and
//! which overlays to commit. Only a release that ends a drag commits.
//!
//! | State | Gesture | Next |
//! |-------|---------|------|
//! | any | Press (hit) | Interacting, not dragging |
//! | any | Press (miss) | Selection {} |
//! | Interacting | Move | past threshold: dragging, overlays = translate(delta) |
//! | Interacting | Release | Selection(nodes), commit if dragging, overlays cleared |
//! | Interacting | Cancel | Selection(nodes), overlays cleared |

use knot_core::{Matrix, NodeId, Overlays, Point};
use smallvec::{SmallVec, smallvec};

pub type NodeSet = SmallVec<[NodeId; 2]>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    /// Pointer travel, in CSS pixels, before a press becomes a drag.
    pub drag_threshold: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Selection {
        nodes: NodeSet,
    },
    Interacting {
        origin: Point,
        nodes: NodeSet,
        is_dragging: bool,
    },
}

impl Interaction {
    /// Nodes currently selected. Empty when idle.
    pub fn selected(&self) -> &[NodeId] {
        match self {
            Interaction::Idle => &[],
            Interaction::Selection { nodes } | Interaction::Interacting { nodes, .. } => nodes,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            Interaction::Interacting {
                is_dragging: true,
                ..
            }
        )
    }
}

/// Input reduced to what the state machine needs. Presses carry the result
/// of the hit test run by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Press { at: Point, hit: Option<NodeId> },
    Move { at: Point },
    Release,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayChange {
    Unchanged,
    Replace(Overlays),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Interaction,
    pub overlays: OverlayChange,
    /// `(node, overlay)` pairs to fold into the document.
    pub commits: Vec<(NodeId, Matrix)>,
}

impl Transition {
    fn to(state: Interaction, overlays: OverlayChange) -> Self {
        Self {
            state,
            overlays,
            commits: Vec::new(),
        }
    }

    fn stay(state: &Interaction) -> Self {
        Self::to(state.clone(), OverlayChange::Unchanged)
    }
}

pub fn transition(
    state: &Interaction,
    gesture: &Gesture,
    overlays: &Overlays,
    config: &InteractionConfig,
) -> Transition {
    match (state, *gesture) {
        (_, Gesture::Press { at, hit }) => {
            // A press while interacting means the release was lost.
            let change = if matches!(state, Interaction::Interacting { .. }) && !overlays.is_empty() {
                OverlayChange::Clear
            } else {
                OverlayChange::Unchanged
            };
            let next = match hit {
                Some(id) => Interaction::Interacting {
                    origin: at,
                    nodes: smallvec![id],
                    is_dragging: false,
                },
                None => Interaction::Selection {
                    nodes: NodeSet::new(),
                },
            };
            Transition::to(next, change)
        }

        (
            Interaction::Interacting {
                origin,
                nodes,
                is_dragging,
            },
            Gesture::Move { at },
        ) => {
            let delta = at - *origin;
            let dragging = *is_dragging || delta.length() > config.drag_threshold;
            if !dragging {
                return Transition::stay(state);
            }
            let translate = Matrix::from_translation(delta.dx, delta.dy);
            let live = nodes.iter().map(|id| (*id, translate)).collect();
            Transition::to(
                Interaction::Interacting {
                    origin: *origin,
                    nodes: nodes.clone(),
                    is_dragging: true,
                },
                OverlayChange::Replace(live),
            )
        }

        (
            Interaction::Interacting {
                nodes, is_dragging, ..
            },
            Gesture::Release,
        ) => {
            let commits = if *is_dragging {
                nodes
                    .iter()
                    .filter_map(|id| overlays.get(id).map(|m| (*id, *m)))
                    .collect()
            } else {
                Vec::new()
            };
            Transition {
                state: Interaction::Selection {
                    nodes: nodes.clone(),
                },
                overlays: OverlayChange::Clear,
                commits,
            }
        }

        (Interaction::Interacting { nodes, .. }, Gesture::Cancel) => Transition::to(
            Interaction::Selection {
                nodes: nodes.clone(),
            },
            OverlayChange::Clear,
        ),

        (_, Gesture::Move { .. } | Gesture::Release | Gesture::Cancel) => Transition::stay(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn step(state: &Interaction, gesture: Gesture, overlays: &Overlays) -> Transition {
        transition(state, &gesture, overlays, &InteractionConfig::default())
    }

    fn pressed(node: &str) -> Interaction {
        Interaction::Interacting {
            origin: Point::new(10.0, 10.0),
            nodes: smallvec![id(node)],
            is_dragging: false,
        }
    }

    #[test]
    fn press_on_node_starts_interacting() {
        let t = step(
            &Interaction::Idle,
            Gesture::Press {
                at: Point::new(3.0, 4.0),
                hit: Some(id("i_a")),
            },
            &Overlays::new(),
        );
        assert_eq!(
            t.state,
            Interaction::Interacting {
                origin: Point::new(3.0, 4.0),
                nodes: smallvec![id("i_a")],
                is_dragging: false,
            }
        );
        assert_eq!(t.state.selected(), &[id("i_a")]);
        assert_eq!(t.overlays, OverlayChange::Unchanged);
    }

    #[test]
    fn press_on_background_clears_selection() {
        let prev = Interaction::Selection {
            nodes: smallvec![id("i_old")],
        };
        let t = step(
            &prev,
            Gesture::Press {
                at: Point::ORIGIN,
                hit: None,
            },
            &Overlays::new(),
        );
        assert_eq!(t.state, Interaction::Selection { nodes: NodeSet::new() });
    }

    #[test]
    fn small_move_stays_below_threshold() {
        let state = pressed("i_b");
        let t = step(&state, Gesture::Move { at: Point::new(13.0, 14.0) }, &Overlays::new());
        assert_eq!(t.state, state);
        assert_eq!(t.overlays, OverlayChange::Unchanged);
    }

    #[test]
    fn crossing_threshold_sets_overlay_on_same_move() {
        let t = step(
            &pressed("i_c"),
            Gesture::Move {
                at: Point::new(16.0, 10.0),
            },
            &Overlays::new(),
        );
        assert!(t.state.is_dragging());
        let OverlayChange::Replace(live) = t.overlays else {
            panic!("expected overlays, got {:?}", t.overlays);
        };
        assert_eq!(live[&id("i_c")], Matrix::from_translation(6.0, 0.0));
    }

    #[test]
    fn overlay_is_recomputed_from_origin() {
        let dragging = Interaction::Interacting {
            origin: Point::new(10.0, 10.0),
            nodes: smallvec![id("i_d")],
            is_dragging: true,
        };
        // Once dragging, even a move back near the origin keeps translating.
        let t = step(&dragging, Gesture::Move { at: Point::new(11.0, 9.0) }, &Overlays::new());
        let OverlayChange::Replace(live) = t.overlays else {
            panic!("expected overlays");
        };
        assert_eq!(live[&id("i_d")], Matrix::from_translation(1.0, -1.0));
    }

    #[test]
    fn release_after_drag_commits() {
        let dragging = Interaction::Interacting {
            origin: Point::ORIGIN,
            nodes: smallvec![id("i_e")],
            is_dragging: true,
        };
        let mut overlays = Overlays::new();
        overlays.insert(id("i_e"), Matrix::from_translation(20.0, 0.0));
        let t = step(&dragging, Gesture::Release, &overlays);
        assert_eq!(t.commits, vec![(id("i_e"), Matrix::from_translation(20.0, 0.0))]);
        assert_eq!(t.overlays, OverlayChange::Clear);
        assert_eq!(t.state, Interaction::Selection { nodes: smallvec![id("i_e")] });
    }

    #[test]
    fn release_without_drag_only_selects() {
        let t = step(&pressed("i_f"), Gesture::Release, &Overlays::new());
        assert!(t.commits.is_empty());
        assert_eq!(t.state, Interaction::Selection { nodes: smallvec![id("i_f")] });
    }

    #[test]
    fn cancel_discards_overlays() {
        let mut overlays = Overlays::new();
        overlays.insert(id("i_g"), Matrix::from_translation(9.0, 9.0));
        let t = step(&pressed("i_g"), Gesture::Cancel, &overlays);
        assert!(t.commits.is_empty());
        assert_eq!(t.overlays, OverlayChange::Clear);
        assert_eq!(t.state, Interaction::Selection { nodes: smallvec![id("i_g")] });
    }

    #[test]
    fn gestures_outside_interaction_are_ignored() {
        let idle = Interaction::Idle;
        for g in [
            Gesture::Move { at: Point::new(100.0, 100.0) },
            Gesture::Release,
            Gesture::Cancel,
        ] {
            let t = step(&idle, g, &Overlays::new());
            assert_eq!(t.state, Interaction::Idle);
            assert_eq!(t.overlays, OverlayChange::Unchanged);
            assert!(t.commits.is_empty());
        }
    }

    #[test]
    fn press_during_drag_drops_stale_overlays() {
        let mut overlays = Overlays::new();
        overlays.insert(id("i_h"), Matrix::from_translation(1.0, 1.0));
        let t = step(
            &pressed("i_h"),
            Gesture::Press {
                at: Point::ORIGIN,
                hit: None,
            },
            &overlays,
        );
        assert_eq!(t.overlays, OverlayChange::Clear);
    }
}
