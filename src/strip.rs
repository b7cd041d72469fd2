//! Long-strip geometry.
//!
//! In long-strip mode the current page is derived from scroll position, not
//! driven by navigation. The functions here are pure so the mapping can be
//! tested without a rendering surface: the render layer reports page tops and
//! viewport metrics, and we answer "which page owns the viewport midpoint"
//! and "where should the position slider sit".

/// Resolution of the strip position slider.
pub const STRIP_SLIDER_MAX: f32 = 1000.0;

/// Page whose vertical extent contains the viewport's midpoint.
///
/// `page_tops` holds the top offset of each page in content coordinates, in
/// ascending order; a page's bottom edge is the next page's top (the last
/// page ends at `content_height`). Returns 0 for an empty strip.
pub fn page_index_for_scroll_offset(
    page_tops: &[f32],
    content_height: f32,
    scroll_offset: f32,
    viewport_height: f32,
) -> usize {
    if page_tops.is_empty() {
        return 0;
    }
    let midpoint = scroll_offset + viewport_height / 2.0;
    for (i, top) in page_tops.iter().enumerate() {
        let bottom = page_tops.get(i + 1).copied().unwrap_or(content_height);
        if bottom > midpoint && bottom > *top {
            return i;
        }
    }
    page_tops.len() - 1
}

/// Linear slider-to-scroll mapping over the scrollable distance
/// (`content_height - viewport_height`).
pub fn scroll_offset_for_slider(value: f32, scrollable_distance: f32) -> f32 {
    if scrollable_distance <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    let ratio = (value / STRIP_SLIDER_MAX).clamp(0.0, 1.0);
    ratio * scrollable_distance
}

/// Inverse of [`scroll_offset_for_slider`]. The caller must flag updates
/// produced here so they do not re-trigger a scroll jump.
pub fn slider_value_for_scroll(scroll_offset: f32, scrollable_distance: f32) -> f32 {
    if scrollable_distance <= 0.0 || !scroll_offset.is_finite() {
        return 0.0;
    }
    let ratio = (scroll_offset / scrollable_distance).clamp(0.0, 1.0);
    ratio * STRIP_SLIDER_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    // Four pages of height 1000 stacked in a 4000px strip.
    const TOPS: [f32; 4] = [0.0, 1000.0, 2000.0, 3000.0];
    const CONTENT: f32 = 4000.0;
    const VIEWPORT: f32 = 800.0;

    #[test]
    fn midpoint_selects_the_containing_page() {
        assert_eq!(page_index_for_scroll_offset(&TOPS, CONTENT, 0.0, VIEWPORT), 0);
        // Midpoint at 1400 lands inside page 1.
        assert_eq!(
            page_index_for_scroll_offset(&TOPS, CONTENT, 1000.0, VIEWPORT),
            1
        );
        // Scrolled to the very bottom the last page wins.
        assert_eq!(
            page_index_for_scroll_offset(&TOPS, CONTENT, CONTENT - VIEWPORT, VIEWPORT),
            3
        );
    }

    #[test]
    fn derived_page_is_monotonic_in_scroll_offset() {
        let mut previous = 0;
        let max_scroll = CONTENT - VIEWPORT;
        let mut offset = 0.0;
        while offset <= max_scroll {
            let page = page_index_for_scroll_offset(&TOPS, CONTENT, offset, VIEWPORT);
            assert!(
                page >= previous,
                "page index regressed from {previous} to {page} at offset {offset}"
            );
            previous = page;
            offset += 37.0;
        }
    }

    #[test]
    fn empty_strip_maps_to_page_zero() {
        assert_eq!(page_index_for_scroll_offset(&[], CONTENT, 500.0, VIEWPORT), 0);
    }

    #[test]
    fn slider_mapping_round_trips() {
        let scrollable = CONTENT - VIEWPORT;
        for value in [0.0, 125.0, 500.0, STRIP_SLIDER_MAX] {
            let offset = scroll_offset_for_slider(value, scrollable);
            let back = slider_value_for_scroll(offset, scrollable);
            assert!(
                (back - value).abs() < 1e-3,
                "slider {value} -> offset {offset} -> slider {back}"
            );
        }
    }

    #[test]
    fn degenerate_scrollable_distance_pins_everything_to_zero() {
        assert_eq!(scroll_offset_for_slider(700.0, 0.0), 0.0);
        assert_eq!(slider_value_for_scroll(700.0, -5.0), 0.0);
    }
}
