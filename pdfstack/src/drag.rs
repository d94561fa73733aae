//! Pointer-driven reordering of the file list.
//!
//! A gesture goes `drag_start` → any number of `drag_over` → `drag_end`.
//! While it runs only the visual order changes; the list itself is
//! rewritten once, when the gesture ends.

use crate::error::{PdfStackError, Result};
use crate::file_list::OrderedFileList;

/// Geometry of the rendered rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    /// Height of every row.
    pub row_height: f64,
    /// Vertical space between rows.
    pub gap: f64,
}

impl Default for RowLayout {
    fn default() -> Self {
        Self {
            row_height: 48.0,
            gap: 8.0,
        }
    }
}

impl RowLayout {
    fn pitch(&self) -> f64 {
        self.row_height + self.gap
    }
}

/// One laid-out row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// File name shown in the row.
    pub name: String,
    /// Distance from the top of the list.
    pub top: f64,
    /// Row height.
    pub height: f64,
}

impl Row {
    fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A row is being dragged.
    Dragging {
        /// Name of the row being dragged.
        item: String,
    },
}

/// Tracks one drag gesture at a time over the rows of an [`OrderedFileList`].
#[derive(Debug, Default)]
pub struct DragReorderController {
    state: DragState,
    layout: RowLayout,
    visual_order: Vec<String>,
}

impl DragReorderController {
    /// Create a controller with the given row geometry.
    pub fn new(layout: RowLayout) -> Self {
        Self {
            state: DragState::Idle,
            layout,
            visual_order: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Whether a gesture is running.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Order shown on screen during the current gesture.
    pub fn visual_order(&self) -> &[String] {
        &self.visual_order
    }

    /// Lay out the rows of the current visual order, top to bottom.
    pub fn rows(&self) -> Vec<Row> {
        self.visual_order
            .iter()
            .enumerate()
            .map(|(index, name)| Row {
                name: name.clone(),
                top: index as f64 * self.layout.pitch(),
                height: self.layout.row_height,
            })
            .collect()
    }

    /// Begin dragging the row named `name`.
    ///
    /// # Errors
    ///
    /// Fails if a gesture is already running or `name` is not in `list`.
    pub fn drag_start(&mut self, list: &OrderedFileList, name: &str) -> Result<()> {
        if let DragState::Dragging { item } = &self.state {
            return Err(PdfStackError::invalid_drag(format!(
                "'{item}' is already being dragged"
            )));
        }

        if list.position(name).is_none() {
            return Err(PdfStackError::not_in_selection(name));
        }

        self.visual_order = list.names();
        self.state = DragState::Dragging {
            item: name.to_string(),
        };
        tracing::trace!(item = name, "drag started");
        Ok(())
    }

    /// Move the dragged row according to the pointer position.
    ///
    /// The row lands immediately before the nearest sibling whose
    /// midpoint is below the pointer, or at the end if there is none.
    pub fn drag_over(&mut self, pointer_y: f64) -> Result<()> {
        let DragState::Dragging { item } = &self.state else {
            return Err(PdfStackError::invalid_drag("no drag in progress"));
        };

        let after = self
            .rows()
            .into_iter()
            .filter(|row| &row.name != item)
            .map(|row| (pointer_y - row.midpoint(), row.name))
            .filter(|(offset, _)| *offset < 0.0)
            .fold(None::<(f64, String)>, |closest, (offset, name)| match closest {
                Some((best, _)) if offset <= best => closest,
                _ => Some((offset, name)),
            })
            .map(|(_, name)| name);

        let item = item.clone();
        self.visual_order.retain(|name| *name != item);

        let index = after
            .and_then(|sibling| self.visual_order.iter().position(|name| *name == sibling))
            .unwrap_or(self.visual_order.len());
        self.visual_order.insert(index, item);

        Ok(())
    }

    /// Finish the gesture and commit the visual order to `list`.
    pub fn drag_end(&mut self, list: &mut OrderedFileList) -> Result<()> {
        let DragState::Dragging { item } = std::mem::take(&mut self.state) else {
            return Err(PdfStackError::invalid_drag("no drag in progress"));
        };

        let order = std::mem::take(&mut self.visual_order);
        tracing::debug!(item = %item, order = ?order, "drag finished");
        list.reorder(&order)
    }

    /// Run a whole gesture that moves `name` to `index`.
    ///
    /// Indexes past the end move the file to the end.
    pub fn move_item(&mut self, list: &mut OrderedFileList, name: &str, index: usize) -> Result<()> {
        self.drag_start(list, name)?;

        let rows = self.rows();
        let quarter = self.layout.row_height / 4.0;
        let pointer_y = match rows.iter().filter(|row| row.name != name).nth(index) {
            Some(target) => target.midpoint() - quarter,
            None => rows.last().map_or(0.0, |row| row.top + row.height) + quarter,
        };

        self.drag_over(pointer_y)?;
        self.drag_end(list)
    }
}
