//! Page layout cursor

use std::fmt;

use crate::config::LayoutConfig;

/// Tolerance for float comparisons of vertical positions.
const EPSILON_MM: f32 = 1e-3;

/// Which half of the page is being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Half {
    /// Upper half-invoice.
    Top,

    /// Lower half-invoice.
    Bottom,
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Half::Top => f.write_str("top"),
            Half::Bottom => f.write_str("bottom"),
        }
    }
}

/// Tracks the current page, half and vertical offset while an invoice is laid out.
///
/// Positions are absolute page coordinates (millimetres from the top edge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayoutCursor {
    page: usize,
    half: Half,
    y: f32,
    half_height: f32,
    margin: f32,
}

impl PageLayoutCursor {
    /// Cursor at the top of the first half of the first page.
    pub fn new(layout: &LayoutConfig) -> Self {
        let mut cursor = Self {
            page: 0,
            half: Half::Top,
            y: 0.0,
            half_height: layout.half_height_mm(),
            margin: layout.margin_mm,
        };

        cursor.y = cursor.top();
        cursor
    }

    /// Zero-based page index.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Current half.
    pub fn half(&self) -> Half {
        self.half
    }

    /// Current vertical offset.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Top edge of the current half (inside the margin).
    pub fn top(&self) -> f32 {
        self.origin() + self.margin
    }

    /// Bottom edge of the current half (inside the margin).
    pub fn bottom(&self) -> f32 {
        self.origin() + self.half_height - self.margin
    }

    /// Space left between the cursor and the bottom edge.
    pub fn remaining(&self) -> f32 {
        self.bottom() - self.y
    }

    /// Returns true if a block of `height` plus a `reserved` block still fits below the cursor.
    pub fn fits(&self, height: f32, reserved: f32) -> bool {
        height + reserved <= self.remaining() + EPSILON_MM
    }

    /// Move down by `height`.
    pub fn advance(&mut self, height: f32) {
        self.y += height;
    }

    /// Move to the next half: the bottom of this page, or the top of a new page.
    ///
    /// Returns true if a new page was started.
    pub fn next_half(&mut self) -> bool {
        let new_page = match self.half {
            Half::Top => {
                self.half = Half::Bottom;
                false
            }
            Half::Bottom => {
                self.half = Half::Top;
                self.page += 1;
                true
            }
        };

        self.y = self.top();

        new_page
    }

    fn origin(&self) -> f32 {
        match self.half {
            Half::Top => 0.0,
            Half::Bottom => self.half_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inside_top_margin() {
        let cursor = PageLayoutCursor::new(&LayoutConfig::default());

        assert_eq!(cursor.page(), 0);
        assert_eq!(cursor.half(), Half::Top);
        assert!((cursor.y() - 8.0).abs() < EPSILON_MM);
        assert!((cursor.bottom() - 140.5).abs() < EPSILON_MM);
    }

    #[test]
    fn halves_alternate_and_pages_advance() {
        let mut cursor = PageLayoutCursor::new(&LayoutConfig::default());

        assert!(!cursor.next_half());
        assert_eq!((cursor.page(), cursor.half()), (0, Half::Bottom));
        assert!((cursor.y() - 156.5).abs() < EPSILON_MM);

        assert!(cursor.next_half());
        assert_eq!((cursor.page(), cursor.half()), (1, Half::Top));
        assert!((cursor.y() - 8.0).abs() < EPSILON_MM);
    }

    #[test]
    fn fits_accounts_for_reserved_space() {
        let mut cursor = PageLayoutCursor::new(&LayoutConfig::default());

        cursor.advance(100.0);

        // 140.5 - 108 = 32.5 remaining
        assert!(cursor.fits(6.0, 26.5));
        assert!(!cursor.fits(6.0, 27.0));
    }
}
