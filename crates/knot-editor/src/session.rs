//! Wires input, the interaction state machine, the document and a renderer.
//!
//! The session is the only place where the state machine's output has side
//! effects: overlays are stored here and commits are written into the
//! document.

use crate::input::InputEvent;
use crate::interaction::{Gesture, Interaction, InteractionConfig, OverlayChange, transition};
use knot_core::{Document, EvalError, NodeId, Overlays, Point, evaluate};
use knot_render::{Renderer, Surface};
use log::debug;

pub struct EditorSession<S: Surface> {
    doc: Document,
    renderer: Renderer<S>,
    interaction: Interaction,
    overlays: Overlays,
    config: InteractionConfig,
}

impl<S: Surface> EditorSession<S> {
    pub fn new(doc: Document, renderer: Renderer<S>) -> Self {
        Self {
            doc,
            renderer,
            interaction: Interaction::default(),
            overlays: Overlays::new(),
            config: InteractionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: InteractionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Direct edits bypass the state machine; live overlays are kept.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn renderer(&self) -> &Renderer<S> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<S> {
        &mut self.renderer
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn selection(&self) -> &[NodeId] {
        self.interaction.selected()
    }

    /// Feed one input event. Returns whether anything visible changed.
    ///
    /// Presses evaluate the document to hit-test, so a broken graph surfaces
    /// here as an error and leaves the session untouched.
    pub fn handle(&mut self, event: &InputEvent) -> Result<bool, EvalError> {
        let gesture = match event {
            InputEvent::PointerDown { x, y } => {
                let results = evaluate(&self.doc)?;
                let hit = self.renderer.hit_test(&self.doc, &results, *x, *y);
                Gesture::Press {
                    at: Point::new(*x, *y),
                    hit,
                }
            }
            InputEvent::PointerMove { x, y } => Gesture::Move {
                at: Point::new(*x, *y),
            },
            InputEvent::PointerUp { .. } => Gesture::Release,
            InputEvent::Key { .. } if event.is_cancel() => Gesture::Cancel,
            InputEvent::Key { .. } => return Ok(false),
        };

        let t = transition(&self.interaction, &gesture, &self.overlays, &self.config);
        let mut changed = t.state != self.interaction;
        match t.overlays {
            OverlayChange::Unchanged => {}
            OverlayChange::Replace(live) => {
                changed |= live != self.overlays;
                self.overlays = live;
            }
            OverlayChange::Clear => {
                changed |= !self.overlays.is_empty();
                self.overlays.clear();
            }
        }
        for (id, overlay) in &t.commits {
            changed |= self.doc.apply_transform(*id, overlay);
        }
        if t.state != self.interaction {
            debug!("interaction: {:?} -> {:?}", self.interaction, t.state);
        }
        self.interaction = t.state;
        Ok(changed)
    }

    /// Evaluate and paint one frame with live overlays and the selection box.
    pub fn draw(&mut self) -> Result<(), EvalError> {
        let results = evaluate(&self.doc)?;
        self.renderer.draw(
            &self.doc,
            &results,
            Some(&self.overlays),
            self.interaction.selected(),
        );
        Ok(())
    }
}
