use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::a11y::auditor::{AnimationInspector, AnimationState};
use crate::kernel::host::AnimatedElementCounter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    Running,
    Paused,
}

/// Handle to one animated element owned by the rendering layer.
pub trait AnimatedElement: Send + Sync {
    /// Active animation name, `None` when the element is not animating.
    fn animation_name(&self) -> Option<String>;

    fn set_play_state(&self, state: PlayState);

    /// Remove the animation and its hardware-acceleration hints.
    fn clear_animation(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(u64);

/// Bookkeeping for the animated elements of one surface.
///
/// Calls into elements always run on a snapshot, never under the lock.
#[derive(Default)]
pub struct AnimationRegistry {
    next_id: AtomicU64,
    elements: Mutex<BTreeMap<ElementId, Arc<dyn AnimatedElement>>>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, element: Arc<dyn AnimatedElement>) -> ElementId {
        let id = ElementId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.elements.lock().insert(id, element);
        id
    }

    /// Stop the element's animation and forget it. False if unknown.
    pub fn cleanup(&self, id: ElementId) -> bool {
        let removed = self.elements.lock().remove(&id);
        match removed {
            Some(element) => {
                element.clear_animation();
                true
            }
            None => false,
        }
    }

    pub fn cleanup_all(&self) -> usize {
        let drained: Vec<_> = std::mem::take(&mut *self.elements.lock())
            .into_values()
            .collect();
        for element in &drained {
            element.clear_animation();
        }
        debug!("Cleaned up {} animated elements", drained.len());
        drained.len()
    }

    /// Direct play-state toggle, independent of any monitor decision.
    pub fn pause_all(&self) -> usize {
        self.set_play_state(PlayState::Paused)
    }

    pub fn resume_all(&self) -> usize {
        self.set_play_state(PlayState::Running)
    }

    fn set_play_state(&self, state: PlayState) -> usize {
        let snapshot = self.snapshot();
        for (_, element) in &snapshot {
            element.set_play_state(state);
        }
        snapshot.len()
    }

    fn snapshot(&self) -> Vec<(ElementId, Arc<dyn AnimatedElement>)> {
        self.elements
            .lock()
            .iter()
            .map(|(id, element)| (*id, Arc::clone(element)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.elements.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.lock().is_empty()
    }
}

impl AnimatedElementCounter for AnimationRegistry {
    fn count(&self) -> usize {
        self.len()
    }
}

impl AnimationInspector for AnimationRegistry {
    fn animated_elements(&self) -> Vec<AnimationState> {
        self.snapshot()
            .into_iter()
            .map(|(id, element)| AnimationState {
                element: id,
                animation_name: element.animation_name(),
            })
            .collect()
    }
}

impl fmt::Debug for AnimationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRegistry")
            .field("elements", &self.len())
            .finish()
    }
}
