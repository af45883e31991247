// ABOUTME: The Canvas trait - primitives the host canvas exposes.
// ABOUTME: Implementations run on the canvas's own execution context only.

use super::catalog::ComponentCatalog;
use super::model::{CanvasObject, Guid, Param, ParamRef, Point, ScriptBody};
use crate::error::CanvasError;

/// The host canvas as a mutable graph of objects and wires.
///
/// Methods are synchronous: they are only ever called from the thread that
/// owns the canvas, via [`super::CanvasHandle`].
pub trait Canvas: Send {
    /// Look up an object.
    fn find(&self, guid: Guid) -> Option<&CanvasObject>;

    /// All objects, in insertion order.
    fn list_objects(&self) -> Vec<&CanvasObject>;

    /// Add an object. Its guid must be unused.
    fn add(&mut self, object: CanvasObject) -> Guid;

    /// Remove an object and every wire touching it.
    fn remove(&mut self, guid: Guid) -> Result<CanvasObject, CanvasError>;

    /// Move an object's pivot.
    fn move_to(&mut self, guid: Guid, pivot: Point) -> Result<(), CanvasError>;

    /// Wire an output parameter into an input parameter. Wiring an existing
    /// pair again is a no-op.
    fn connect(&mut self, source: ParamRef, target: ParamRef) -> Result<(), CanvasError>;

    /// Remove a wire. Returns whether one existed.
    fn disconnect(&mut self, source: ParamRef, target: ParamRef) -> Result<bool, CanvasError>;

    fn set_locked(&mut self, guid: Guid, locked: bool) -> Result<(), CanvasError>;

    fn set_preview(&mut self, guid: Guid, preview: bool) -> Result<(), CanvasError>;

    /// Replace a script component's body and, when given, its parameters.
    fn set_script(
        &mut self,
        guid: Guid,
        script: ScriptBody,
        params: Option<(Vec<Param>, Vec<Param>)>,
    ) -> Result<(), CanvasError>;

    /// Open an undo record; everything until the next record undoes together.
    fn record_undo(&mut self, label: &str);

    /// Schedule a redraw of the canvas.
    fn redraw(&mut self);

    /// Component templates this canvas can instantiate.
    fn catalog(&self) -> &ComponentCatalog;
}
