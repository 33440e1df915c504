//! Single-slot holder for the overlay currently shown on the map.
//!
//! A render reserves a [`RenderTicket`] before it starts. Installing swaps
//! the new overlay in and drops the slot's reference to the previous one in
//! the same critical section, so at most one overlay is installed at any
//! time. A ticket that was superseded by a later `begin()` is refused, which
//! keeps a slow render from replacing a newer one.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use hazard_common::GeoBounds;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::raster::RasterImage;

/// Generation reserved by a render before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// An installed overlay.
#[derive(Debug)]
pub struct Overlay {
    generation: u64,
    image: RasterImage,
    installed_at: Instant,
}

impl Overlay {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    pub fn bounds(&self) -> &GeoBounds {
        self.image.bounds()
    }

    pub fn installed_at(&self) -> Instant {
        self.installed_at
    }

    /// Placement data for the map display.
    pub fn metadata(&self) -> OverlayMetadata {
        OverlayMetadata::for_image(&self.image, self.generation)
    }
}

/// Serializable placement sidecar for an overlay image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayMetadata {
    pub generation: u64,
    pub bounds: GeoBounds,
    /// `[[south, west], [north, east]]`
    pub corners: [[f64; 2]; 2],
    pub width: usize,
    pub height: usize,
}

impl OverlayMetadata {
    /// Placement of `image` when shown as overlay `generation`.
    pub fn for_image(image: &RasterImage, generation: u64) -> Self {
        Self {
            generation,
            bounds: *image.bounds(),
            corners: image.bounds().corners(),
            width: image.width(),
            height: image.height(),
        }
    }
}

#[derive(Debug, Default)]
struct SlotState {
    current: Option<Arc<Overlay>>,
    latest_ticket: u64,
}

/// Holds at most one installed overlay.
#[derive(Debug, Default)]
pub struct OverlaySlot {
    state: Mutex<SlotState>,
}

impl OverlaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // The state stays consistent even if a holder panicked mid-swap
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserve the next generation for a render about to start.
    ///
    /// Any ticket handed out earlier becomes stale.
    pub fn begin(&self) -> RenderTicket {
        let mut state = self.lock();
        state.latest_ticket += 1;
        RenderTicket(state.latest_ticket)
    }

    /// Install `image` rendered under `ticket`.
    ///
    /// Returns `None` (and drops `image`) if a newer render has begun since
    /// the ticket was issued.
    pub fn install_ticket(&self, ticket: RenderTicket, image: RasterImage) -> Option<Arc<Overlay>> {
        let mut state = self.lock();
        if ticket.0 < state.latest_ticket {
            warn!(
                ticket = ticket.0,
                latest = state.latest_ticket,
                "Discarding superseded overlay render"
            );
            return None;
        }

        let overlay = Arc::new(Overlay {
            generation: ticket.0,
            image,
            installed_at: Instant::now(),
        });
        let previous = state.current.replace(Arc::clone(&overlay));
        drop(state);

        if let Some(previous) = previous {
            debug!(
                released = previous.generation,
                installed = overlay.generation,
                "Replaced overlay"
            );
        }
        Some(overlay)
    }

    /// Whether `ticket` is still the most recently issued one.
    pub fn is_latest(&self, ticket: RenderTicket) -> bool {
        self.lock().latest_ticket == ticket.0
    }

    /// Reserve a ticket and install `image` immediately.
    pub fn install(&self, image: RasterImage) -> Arc<Overlay> {
        let mut state = self.lock();
        state.latest_ticket += 1;
        let overlay = Arc::new(Overlay {
            generation: state.latest_ticket,
            image,
            installed_at: Instant::now(),
        });
        state.current = Some(Arc::clone(&overlay));
        overlay
    }

    /// The installed overlay, if any.
    pub fn current(&self) -> Option<Arc<Overlay>> {
        self.lock().current.clone()
    }

    /// Remove the installed overlay and return it.
    pub fn clear(&self) -> Option<Arc<Overlay>> {
        self.lock().current.take()
    }

    /// Generation of the installed overlay, 0 when empty.
    pub fn generation(&self) -> u64 {
        self.lock().current.as_ref().map_or(0, |o| o.generation)
    }
}
