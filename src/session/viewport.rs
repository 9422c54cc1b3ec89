use geo::Rect;
use serde::{Deserialize, Serialize};

/// A panel's visible bounding box in display coordinates.
pub type Viewport = Rect<f64>;

/// The four dashboard panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelId {
    Primary,
    Fine,
    Combined,
    Micro,
}

impl PanelId {
    pub const ALL: [PanelId; 4] = [PanelId::Primary, PanelId::Fine, PanelId::Combined, PanelId::Micro];

    #[inline]
    fn slot(self) -> usize {
        match self {
            PanelId::Primary => 0,
            PanelId::Fine => 1,
            PanelId::Combined => 2,
            PanelId::Micro => 3,
        }
    }
}

/// Expand a bounding box by `margin` (fraction of each extent) per side, or
/// by the absolute `degenerate_pad` when the box has zero width or height.
pub fn expand_bounds(rect: Rect<f64>, margin: f64, degenerate_pad: f64) -> Rect<f64> {
    let (dx, dy) = (rect.width(), rect.height());
    if dx == 0.0 || dy == 0.0 {
        Rect::new(
            (rect.min().x - degenerate_pad, rect.min().y - degenerate_pad),
            (rect.max().x + degenerate_pad, rect.max().y + degenerate_pad),
        )
    } else {
        Rect::new(
            (rect.min().x - margin * dx, rect.min().y - margin * dy),
            (rect.max().x + margin * dx, rect.max().y + margin * dy),
        )
    }
}

/// Per-panel viewports with two synchronization modes: one-shot copy (the
/// "match zoom" button) and opt-in continuous linking. The modes are mutually
/// exclusive per panel; entering or leaving a link group never moves bounds,
/// only subsequent pans propagate.
#[derive(Debug, Clone)]
pub struct ViewportSync {
    bounds: [Viewport; 4],
    group: [Option<u32>; 4],
    next_group: u32,
}

impl Default for ViewportSync {
    fn default() -> Self {
        Self {
            bounds: [Rect::new((0.0, 0.0), (1.0, 1.0)); 4],
            group: [None; 4],
            next_group: 0,
        }
    }
}

impl ViewportSync {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn bounds(&self, panel: PanelId) -> Viewport {
        self.bounds[panel.slot()]
    }

    /// Snapshot `source`'s bounds onto each target. One-shot: later pans on
    /// any panel do not propagate. Targets leave any link group they were in.
    pub fn copy_once(&mut self, source: PanelId, targets: &[PanelId]) {
        let snapshot = self.bounds(source);
        for &target in targets {
            self.group[target.slot()] = None;
            self.bounds[target.slot()] = snapshot;
        }
    }

    /// Put `source` and `targets` into one shared link group. Bounds are left
    /// untouched so switching modes causes no visual jump.
    pub fn link(&mut self, source: PanelId, targets: &[PanelId]) {
        let tag = match self.group[source.slot()] {
            Some(tag) => tag,
            None => {
                let tag = self.next_group;
                self.next_group += 1;
                self.group[source.slot()] = Some(tag);
                tag
            }
        };
        for &target in targets {
            self.group[target.slot()] = Some(tag);
        }
    }

    /// Remove a panel from its link group, keeping its current bounds.
    pub fn unlink(&mut self, panel: PanelId) {
        self.group[panel.slot()] = None;
    }

    pub fn is_linked(&self, a: PanelId, b: PanelId) -> bool {
        a != b && self.group[a.slot()].is_some() && self.group[a.slot()] == self.group[b.slot()]
    }

    /// Apply a pan/zoom to one panel; linked panels follow.
    pub fn set_bounds(&mut self, panel: PanelId, rect: Viewport) {
        self.bounds[panel.slot()] = rect;
        if let Some(tag) = self.group[panel.slot()] {
            for other in PanelId::ALL {
                if self.group[other.slot()] == Some(tag) {
                    self.bounds[other.slot()] = rect;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(a: f64, b: f64, c: f64, d: f64) -> Rect<f64> {
        Rect::new((a, b), (c, d))
    }

    #[test]
    fn copy_once_is_a_snapshot() {
        let mut sync = ViewportSync::new();
        sync.set_bounds(PanelId::Primary, rect(0., 0., 100., 100.));
        sync.copy_once(PanelId::Primary, &[PanelId::Fine, PanelId::Combined]);
        assert_eq!(sync.bounds(PanelId::Fine), rect(0., 0., 100., 100.));
        assert_eq!(sync.bounds(PanelId::Combined), rect(0., 0., 100., 100.));

        // Panning the source afterwards leaves the targets alone.
        sync.set_bounds(PanelId::Primary, rect(50., 50., 150., 150.));
        assert_eq!(sync.bounds(PanelId::Fine), rect(0., 0., 100., 100.));
    }

    #[test]
    fn linked_panels_follow_pans() {
        let mut sync = ViewportSync::new();
        sync.link(PanelId::Primary, &[PanelId::Micro]);
        assert!(sync.is_linked(PanelId::Primary, PanelId::Micro));

        sync.set_bounds(PanelId::Micro, rect(1., 2., 3., 4.));
        assert_eq!(sync.bounds(PanelId::Primary), rect(1., 2., 3., 4.));
        assert_eq!(sync.bounds(PanelId::Fine), rect(0., 0., 1., 1.));
    }

    #[test]
    fn linking_does_not_move_bounds() {
        let mut sync = ViewportSync::new();
        sync.set_bounds(PanelId::Primary, rect(0., 0., 10., 10.));
        sync.set_bounds(PanelId::Fine, rect(5., 5., 6., 6.));
        sync.link(PanelId::Primary, &[PanelId::Fine]);
        assert_eq!(sync.bounds(PanelId::Fine), rect(5., 5., 6., 6.));
    }

    #[test]
    fn copy_once_breaks_a_link() {
        let mut sync = ViewportSync::new();
        sync.link(PanelId::Primary, &[PanelId::Fine]);
        sync.copy_once(PanelId::Combined, &[PanelId::Fine]);
        assert!(!sync.is_linked(PanelId::Primary, PanelId::Fine));
        sync.set_bounds(PanelId::Primary, rect(9., 9., 10., 10.));
        assert_ne!(sync.bounds(PanelId::Fine), rect(9., 9., 10., 10.));
    }

    #[test]
    fn expand_adds_fractional_margin() {
        let out = expand_bounds(rect(0., 0., 100., 200.), 0.05, 1000.0);
        assert_eq!(out, rect(-5., -10., 105., 210.));
    }

    #[test]
    fn degenerate_box_gets_absolute_pad() {
        let out = expand_bounds(rect(10., 10., 10., 50.), 0.05, 1000.0);
        assert_eq!(out, rect(-990., -990., 1010., 1050.));
    }
}
