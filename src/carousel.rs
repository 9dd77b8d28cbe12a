//! Windowed carousel state.

use std::time::Duration;

use serde::Serialize;

/// Delay between automatic advances.
pub const AUTOPLAY_INTERVAL: Duration = Duration::from_millis(5000);

/// Viewport widths below this show a single item.
pub const MOBILE_MAX_WIDTH: u32 = 640;
/// Viewport widths below this (and at least [`MOBILE_MAX_WIDTH`]) show two items.
pub const TABLET_MAX_WIDTH: u32 = 1024;

/// Viewport width classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

impl Breakpoint {
    pub fn from_width(width: u32) -> Self {
        if width < MOBILE_MAX_WIDTH {
            Breakpoint::Mobile
        } else if width < TABLET_MAX_WIDTH {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }

    pub fn visible_count(self) -> usize {
        match self {
            Breakpoint::Mobile => 1,
            Breakpoint::Tablet => 2,
            Breakpoint::Desktop => 3,
        }
    }
}

/// What a host needs to draw the carousel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselView<'a, T> {
    pub items: Vec<&'a T>,
    /// Width of one item, in percent of the track
    pub item_width_percent: f64,
    /// Horizontal translation of the track, in percent
    pub offset_percent: f64,
    pub show_controls: bool,
    pub dot_count: usize,
    pub active_dot: usize,
}

#[derive(Debug, Clone)]
pub struct Carousel<T> {
    items: Vec<T>,
    visible_count: usize,
    current_index: usize,
    hovered: bool,
    generation: u64,
}

impl<T> Default for Carousel<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Carousel<T> {
    /// Create a carousel laid out for the widest breakpoint.
    ///
    /// Hosts should call [`Carousel::resize`] with the real viewport width
    /// before the first [`Carousel::view`], or use [`Carousel::with_viewport`].
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            visible_count: Breakpoint::Desktop.visible_count(),
            current_index: 0,
            hovered: false,
            generation: 0,
        }
    }

    /// Create a carousel already sized for `viewport_width`.
    pub fn with_viewport(items: Vec<T>, viewport_width: u32) -> Self {
        let mut carousel = Self::new(items);
        carousel.resize(viewport_width);
        carousel
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Bumped every time the item set is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Recompute the visible count for a viewport width.
    ///
    /// A wider window can leave the index past the last start; it is clamped.
    pub fn resize(&mut self, viewport_width: u32) -> Breakpoint {
        let breakpoint = Breakpoint::from_width(viewport_width);
        self.visible_count = breakpoint.visible_count();
        self.current_index = self.current_index.min(self.last_start());
        breakpoint
    }

    /// Highest index a full window can start at.
    fn last_start(&self) -> usize {
        self.items.len().saturating_sub(self.visible_count)
    }

    pub fn advance(&mut self) {
        if self.current_index + self.visible_count >= self.items.len() {
            self.current_index = 0;
        } else {
            self.current_index += 1;
        }
    }

    pub fn retreat(&mut self) {
        if self.current_index == 0 {
            self.current_index = self.last_start();
        } else {
            self.current_index -= 1;
        }
    }

    /// Jump to a window start. Indices past the last dot are clamped to it.
    pub fn go_to(&mut self, index: usize) {
        self.current_index = index.min(self.last_start());
    }

    /// Returns true if the flag changed.
    pub fn set_hovered(&mut self, hovered: bool) -> bool {
        let changed = self.hovered != hovered;
        self.hovered = hovered;
        changed
    }

    /// Replace the item set, keeping the index in range.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.generation += 1;
        if self.current_index >= self.items.len() {
            self.current_index = self.last_start();
        }
    }

    /// One autoplay step. Returns whether the carousel moved.
    pub fn tick(&mut self) -> bool {
        if self.hovered || self.items.is_empty() {
            return false;
        }
        self.advance();
        true
    }

    pub fn show_controls(&self) -> bool {
        self.items.len() > self.visible_count
    }

    pub fn dot_count(&self) -> usize {
        if self.show_controls() {
            self.items.len() - self.visible_count + 1
        } else {
            0
        }
    }

    pub fn item_width_percent(&self) -> f64 {
        100.0 / self.visible_count as f64
    }

    pub fn offset_percent(&self) -> f64 {
        self.current_index as f64 * self.item_width_percent()
    }

    /// Snapshot for rendering, `None` when there is nothing to show.
    pub fn view(&self) -> Option<CarouselView<'_, T>> {
        if self.items.is_empty() {
            return None;
        }

        let len = self.items.len();
        let items = (0..self.visible_count.min(len))
            .map(|offset| &self.items[(self.current_index + offset) % len])
            .collect();

        Some(CarouselView {
            items,
            item_width_percent: self.item_width_percent(),
            offset_percent: self.offset_percent(),
            show_controls: self.show_controls(),
            dot_count: self.dot_count(),
            active_dot: self.current_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(len: usize, width: u32) -> Carousel<usize> {
        Carousel::with_viewport((0..len).collect(), width)
    }

    #[test]
    fn test_breakpoints() {
        assert_eq!(Breakpoint::from_width(0).visible_count(), 1);
        assert_eq!(Breakpoint::from_width(639).visible_count(), 1);
        assert_eq!(Breakpoint::from_width(640).visible_count(), 2);
        assert_eq!(Breakpoint::from_width(1023).visible_count(), 2);
        assert_eq!(Breakpoint::from_width(1024).visible_count(), 3);
        assert_eq!(Breakpoint::from_width(u32::MAX).visible_count(), 3);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut carousel = build(5, 1280);
        for width in [320, 800, 1440] {
            let first = carousel.resize(width);
            let count = carousel.visible_count();
            assert_eq!(carousel.resize(width), first);
            assert_eq!(carousel.visible_count(), count);
            assert!((1..=3).contains(&count));
        }
    }

    #[test]
    fn test_advance_wraps() {
        let mut carousel = build(5, 1280);
        let seen: Vec<usize> = (0..4)
            .map(|_| {
                carousel.advance();
                carousel.current_index()
            })
            .collect();
        assert_eq!(seen, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_advance_cycles_for_every_width() {
        for len in 1..8 {
            for width in [320, 800, 1280] {
                let mut carousel = build(len, width);
                let period = carousel.dot_count().max(1);
                for _ in 0..period {
                    carousel.advance();
                }
                assert_eq!(carousel.current_index(), 0, "len={len} width={width}");
            }
        }
    }

    #[test]
    fn test_retreat_undoes_advance() {
        let mut carousel = build(6, 800);
        for start in 0..carousel.dot_count() - 1 {
            carousel.go_to(start);
            carousel.advance();
            carousel.retreat();
            assert_eq!(carousel.current_index(), start);
        }
    }

    #[test]
    fn test_retreat_from_start_jumps_to_last_window() {
        let mut carousel = build(6, 1280);
        carousel.retreat();
        assert_eq!(carousel.current_index(), 3);

        let mut short = build(2, 1280);
        short.retreat();
        assert_eq!(short.current_index(), 0);
    }

    #[test]
    fn test_go_to_clamps() {
        let mut carousel = build(6, 1280);
        carousel.go_to(2);
        assert_eq!(carousel.current_index(), 2);
        carousel.go_to(40);
        assert_eq!(carousel.current_index(), 3);
    }

    #[test]
    fn test_empty_renders_nothing() {
        let mut carousel: Carousel<usize> = Carousel::default();
        assert!(carousel.view().is_none());
        assert!(!carousel.show_controls());
        assert_eq!(carousel.dot_count(), 0);
        assert!(!carousel.tick());
        carousel.retreat();
        carousel.go_to(3);
        assert_eq!(carousel.current_index(), 0);
    }

    #[test]
    fn test_controls_and_dots() {
        let carousel = build(3, 1280);
        assert!(!carousel.show_controls());
        assert_eq!(carousel.dot_count(), 0);

        let carousel = build(7, 800);
        assert!(carousel.show_controls());
        assert_eq!(carousel.dot_count(), 6);
    }

    #[test]
    fn test_view_geometry() {
        let mut carousel = build(5, 800);
        carousel.go_to(2);
        let view = carousel.view().unwrap();
        assert_eq!(view.items, vec![&2, &3]);
        assert_eq!(view.item_width_percent, 50.0);
        assert_eq!(view.offset_percent, 100.0);
        assert_eq!(view.active_dot, 2);
    }

    #[test]
    fn test_widening_clamps_index() {
        let mut carousel = build(4, 320);
        carousel.go_to(3);
        carousel.resize(1280);
        assert_eq!(carousel.current_index(), 1);

        let view = carousel.view().unwrap();
        assert_eq!(view.items, vec![&1, &2, &3]);
        assert_eq!(view.dot_count, 2);
        assert_eq!(view.active_dot, 1);
        assert!((view.offset_percent - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_active_dot_stays_within_dots() {
        for len in 1..8 {
            for start in [320, 800, 1280] {
                for target in [320, 800, 1280] {
                    for index in 0..len {
                        let mut carousel = build(len, start);
                        carousel.go_to(index);
                        carousel.resize(target);

                        let view = carousel.view().unwrap();
                        if view.show_controls {
                            assert!(
                                view.active_dot < view.dot_count,
                                "len={len} {start}->{target} index={index}"
                            );
                        } else {
                            assert_eq!(view.active_dot, 0);
                        }
                        assert_eq!(view.items.len(), carousel.visible_count().min(len));
                        assert_eq!(view.items[0], &carousel.current_index());
                    }
                }
            }
        }
    }

    #[test]
    fn test_with_viewport_sizes_on_mount() {
        let carousel = Carousel::with_viewport(vec!['a', 'b', 'c'], 500);
        assert_eq!(carousel.visible_count(), 1);
        assert_eq!(Carousel::new(vec!['a']).visible_count(), 3);
    }

    #[test]
    fn test_hover_pauses_tick() {
        let mut carousel = build(5, 320);
        assert!(carousel.set_hovered(true));
        assert!(!carousel.set_hovered(true));
        assert!(!carousel.tick());
        assert_eq!(carousel.current_index(), 0);

        carousel.set_hovered(false);
        assert!(carousel.tick());
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn test_set_items_bumps_generation_and_clamps() {
        let mut carousel = build(8, 1280);
        carousel.go_to(5);
        carousel.set_items(vec![10, 11, 12, 13]);
        assert_eq!(carousel.generation(), 1);
        assert_eq!(carousel.current_index(), 1);

        carousel.set_items(Vec::new());
        assert_eq!(carousel.current_index(), 0);
        assert!(carousel.view().is_none());
    }
}
