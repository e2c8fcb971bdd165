//! Item table column allocation.
//!
//! Six columns, each with a minimum width and a flex share of whatever table
//! width is left over once the minimums are placed.

/// One item table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Product description.
    Product,

    /// Specification summary.
    Specification,

    /// Unit count.
    Quantity,

    /// Unit price.
    Price,

    /// Tax rate.
    Tax,

    /// Tax-inclusive amount.
    Amount,
}

impl Column {
    /// All columns, left to right.
    pub const ALL: [Column; 6] = [
        Column::Product,
        Column::Specification,
        Column::Quantity,
        Column::Price,
        Column::Tax,
        Column::Amount,
    ];

    /// Header label.
    pub fn label(self) -> &'static str {
        match self {
            Column::Product => "Product",
            Column::Specification => "Specification",
            Column::Quantity => "Qty",
            Column::Price => "Price",
            Column::Tax => "Tax",
            Column::Amount => "Amount",
        }
    }

    /// Minimum width in millimetres.
    pub fn min_width(self) -> f32 {
        match self {
            Column::Product => 42.0,
            Column::Specification => 36.0,
            Column::Quantity => 12.0,
            Column::Price => 26.0,
            Column::Tax => 12.0,
            Column::Amount => 30.0,
        }
    }

    /// Share of the leftover width.
    pub fn flex(self) -> f32 {
        match self {
            Column::Product => 3.0,
            Column::Specification => 2.0,
            Column::Quantity | Column::Tax => 0.0,
            Column::Price | Column::Amount => 1.0,
        }
    }

    /// Returns true for numeric columns, which are right aligned.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Column::Product | Column::Specification)
    }
}

/// Horizontal extent of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpan {
    /// Column.
    pub column: Column,

    /// Left edge.
    pub x: f32,

    /// Width.
    pub width: f32,
}

impl ColumnSpan {
    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Column x-offsets for one table header draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    spans: [ColumnSpan; 6],
}

impl ColumnLayout {
    /// Allocate widths across `table_width` starting at `left`.
    ///
    /// Every column gets at least its minimum width. If the table is narrower than
    /// the sum of minimums, columns keep their minimums and overrun the right edge.
    pub fn allocate(left: f32, table_width: f32) -> Self {
        let min_total: f32 = Column::ALL.iter().map(|column| column.min_width()).sum();
        let flex_total: f32 = Column::ALL.iter().map(|column| column.flex()).sum();
        let leftover = (table_width - min_total).max(0.0);

        let mut x = left;
        let spans = Column::ALL.map(|column| {
            let share = if flex_total > 0.0 {
                leftover * column.flex() / flex_total
            } else {
                0.0
            };
            let span = ColumnSpan {
                column,
                x,
                width: column.min_width() + share,
            };

            x += span.width;
            span
        });

        Self { spans }
    }

    /// Spans, left to right.
    pub fn spans(&self) -> &[ColumnSpan; 6] {
        &self.spans
    }

    /// Span of a given column.
    pub fn span(&self, column: Column) -> ColumnSpan {
        self.spans
            .iter()
            .copied()
            .find(|span| span.column == column)
            .unwrap_or(ColumnSpan {
                column,
                x: 0.0,
                width: 0.0,
            })
    }

    /// Left edge of the table.
    pub fn left(&self) -> f32 {
        self.spans.first().map_or(0.0, |span| span.x)
    }

    /// Right edge of the table.
    pub fn right(&self) -> f32 {
        self.spans.last().map_or(0.0, ColumnSpan::right)
    }
}
