//! Popup placement: anchor above-left of the pointer, then fall back
//! horizontally and vertically when the measured box leaves the viewport.

use crate::popup::extract::PopupEntry;

/// Viewport metrics, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Document scroll offsets.
    pub scroll_x: f32,
    pub scroll_y: f32,
    /// Root font size (px per rem).
    pub rem_px: f32,
}

/// Pointer position at hover time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub client_x: f32,
    pub client_y: f32,
    pub page_x: f32,
    pub page_y: f32,
}

impl Pointer {
    /// Pointer position from viewport coordinates plus the current scroll offsets.
    pub fn at(client_x: f32, client_y: f32, viewport: &Viewport) -> Self {
        Self {
            client_x,
            client_y,
            page_x: client_x + viewport.scroll_x,
            page_y: client_y + viewport.scroll_y,
        }
    }
}

/// Absolute-positioning properties of the popup container. `None` = unset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopupStyle {
    pub top: Option<f32>,
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub width: Option<f32>,
    pub max_height: Option<f32>,
}

/// Bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Scroll geometry of the popup's content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentMetrics {
    pub scroll_height: f32,
    pub client_height: f32,
    /// Offset of each entry from the top of the content, in entry order.
    pub entry_offsets: Vec<f32>,
}

/// Layout collaborator: lays the attached popup out with `style` and reports
/// what it measured.
pub trait PopupLayout {
    fn bounding_rect(&mut self, style: &PopupStyle, entries: &[PopupEntry]) -> Rect;
    fn content_metrics(&mut self, style: &PopupStyle, entries: &[PopupEntry]) -> ContentMetrics;
}

/// Final placement of a popup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub style: PopupStyle,
    /// Internal scroll offset of the popup content.
    pub scroll_top: f32,
}

/// Compute where the popup goes. `destination` is the index of the entry
/// that has to be visible after scrolling.
pub fn place<L: PopupLayout>(
    layout: &mut L,
    viewport: &Viewport,
    pointer: &Pointer,
    entries: &[PopupEntry],
    destination: Option<usize>,
) -> Placement {
    let margins = 2.0 * viewport.rem_px;

    // Provisional anchor: bottom edge at the pointer, right edge at the page edge
    let mut style = PopupStyle {
        right: Some(0.0),
        bottom: Some(viewport.height - pointer.page_y),
        ..Default::default()
    };
    let rect = layout.bounding_rect(&style, entries);

    if rect.left < pointer.client_x {
        let half = (viewport.width / 2.0).round();
        style.width = Some(half.max(viewport.width - pointer.client_x - margins));
    } else {
        style.right = None;
        style.left = Some(pointer.page_x);
    }

    let rect = layout.bounding_rect(&style, entries);

    if rect.top < 0.0 {
        style.top = Some(viewport.scroll_y);
        style.bottom = None;
        let two_thirds = (viewport.height * 2.0 / 3.0).round();
        style.max_height = Some((pointer.client_y - margins - 10.0).max(two_thirds));
    }

    let metrics = layout.content_metrics(&style, entries);
    let mut scroll_top = (metrics.scroll_height - metrics.client_height).max(0.0);
    if let Some(offset) = destination.and_then(|i| metrics.entry_offsets.get(i)) {
        if *offset < scroll_top {
            scroll_top = *offset;
        }
    }

    Placement { style, scroll_top }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Fixed-size box laid out the way absolute positioning would place it.
    pub(crate) struct BoxLayout {
        pub viewport: Viewport,
        /// Natural size before width/max-height constraints.
        pub width: f32,
        pub height: f32,
        pub entry_height: f32,
        pub calls: usize,
    }

    impl BoxLayout {
        pub(crate) fn new(viewport: Viewport, width: f32, height: f32) -> Self {
            Self { viewport, width, height, entry_height: 100.0, calls: 0 }
        }

        fn size(&self, style: &PopupStyle, entries: usize) -> (f32, f32) {
            let w = style.width.unwrap_or(self.width);
            let natural = self.height.max(entries as f32 * self.entry_height);
            let h = style.max_height.map_or(natural, |m| natural.min(m));
            (w, h)
        }
    }

    impl PopupLayout for BoxLayout {
        fn bounding_rect(&mut self, style: &PopupStyle, entries: &[PopupEntry]) -> Rect {
            self.calls += 1;
            let vp = self.viewport;
            let (w, h) = self.size(style, entries.len());
            let left = match (style.left, style.right) {
                (Some(l), _) => l - vp.scroll_x,
                (None, Some(r)) => vp.width - r - w,
                (None, None) => 0.0,
            };
            let top = match (style.top, style.bottom) {
                (Some(t), _) => t - vp.scroll_y,
                (None, Some(b)) => vp.height - b - h - vp.scroll_y,
                (None, None) => 0.0,
            };
            Rect { left, top, width: w, height: h }
        }

        fn content_metrics(&mut self, style: &PopupStyle, entries: &[PopupEntry]) -> ContentMetrics {
            let (_, h) = self.size(style, entries.len());
            ContentMetrics {
                scroll_height: entries.len() as f32 * self.entry_height,
                client_height: h,
                entry_offsets: (0..entries.len()).map(|i| i as f32 * self.entry_height).collect(),
            }
        }
    }

    pub(crate) fn viewport() -> Viewport {
        Viewport { width: 1200.0, height: 900.0, scroll_x: 0.0, scroll_y: 2000.0, rem_px: 16.0 }
    }

    fn entries(n: usize) -> Vec<PopupEntry> {
        (0..n)
            .map(|i| PopupEntry {
                comment_id: format!("comment-{}", i + 1),
                ordinal: i + 1,
                node: crate::dom::DomNode::text("x"),
            })
            .collect()
    }

    #[test]
    fn pointer_left_of_box_switches_to_left_anchor() {
        let vp = viewport();
        let mut layout = BoxLayout::new(vp, 300.0, 200.0);
        let pointer = Pointer::at(100.0, 500.0, &vp);
        let placement = place(&mut layout, &vp, &pointer, &entries(2), Some(1));

        // provisional left = 900 > pointer.x = 100, so switch to left anchoring
        assert_eq!(placement.style.right, None);
        assert_eq!(placement.style.left, Some(100.0));
        assert_eq!(placement.style.width, None);
        assert_eq!(placement.style.bottom, Some(900.0 - 2500.0));
        assert_eq!(layout.calls, 2);
    }

    #[test]
    fn pointer_right_of_box_clamps_width() {
        let vp = viewport();
        let mut layout = BoxLayout::new(vp, 300.0, 200.0);
        let pointer = Pointer::at(1000.0, 500.0, &vp);
        let placement = place(&mut layout, &vp, &pointer, &entries(2), None);

        assert_eq!(placement.style.right, Some(0.0));
        assert_eq!(placement.style.left, None);
        // max(600, 1200 - 1000 - 32)
        assert_eq!(placement.style.width, Some(600.0));

        let pointer = Pointer::at(300.0, 500.0, &vp);
        let mut layout = BoxLayout::new(vp, 1000.0, 200.0);
        let placement = place(&mut layout, &vp, &pointer, &entries(2), None);
        // max(600, 1200 - 300 - 32)
        assert_eq!(placement.style.width, Some(868.0));
    }

    #[test]
    fn box_above_viewport_reanchors_to_scroll_top() {
        let vp = viewport();
        // taller than the space above the pointer
        let mut layout = BoxLayout::new(vp, 300.0, 800.0);
        let pointer = Pointer::at(1000.0, 300.0, &vp);
        let placement = place(&mut layout, &vp, &pointer, &entries(8), Some(7));

        assert_eq!(placement.style.top, Some(vp.scroll_y));
        assert_eq!(placement.style.bottom, None);
        // max(300 - 32 - 10, 600)
        assert_eq!(placement.style.max_height, Some(600.0));
    }

    #[test]
    fn box_that_fits_keeps_bottom_anchor() {
        let vp = viewport();
        let mut layout = BoxLayout::new(vp, 300.0, 200.0);
        let pointer = Pointer::at(1000.0, 600.0, &vp);
        let placement = place(&mut layout, &vp, &pointer, &entries(2), None);
        assert_eq!(placement.style.top, None);
        assert_eq!(placement.style.bottom, Some(900.0 - 2600.0));
        assert_eq!(placement.style.max_height, None);
    }

    #[test]
    fn scrolls_to_bottom_then_back_to_destination() {
        let vp = viewport();
        let mut layout = BoxLayout::new(vp, 300.0, 800.0);
        let pointer = Pointer::at(1000.0, 300.0, &vp);
        let list = entries(10);

        // content 1000, visible 600 → bottom is 400; destination 7 at 700 stays below
        let at_bottom = place(&mut layout, &vp, &pointer, &list, Some(7));
        assert_eq!(at_bottom.scroll_top, 400.0);

        // destination 2 at 200 is above the bottom scroll position
        let scrolled_up = place(&mut layout, &vp, &pointer, &list, Some(2));
        assert_eq!(scrolled_up.scroll_top, 200.0);
    }
}
