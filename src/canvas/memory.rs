// ABOUTME: In-memory Canvas implementation with an inspectable journal.
// ABOUTME: Used by tests and by the CLI when no host canvas is attached.

use std::sync::{Arc, Mutex, MutexGuard};

use super::catalog::ComponentCatalog;
use super::model::{CanvasObject, Guid, Param, ParamRef, Point, ScriptBody};
use super::Canvas;
use crate::error::CanvasError;

#[derive(Debug, Default)]
struct JournalState {
    undo_labels: Vec<String>,
    redraws: usize,
}

/// Shared view of the undo records and redraws a MemoryCanvas has seen.
///
/// Clone it before handing the canvas to a [`super::CanvasHandle`].
#[derive(Debug, Clone, Default)]
pub struct CanvasJournal {
    state: Arc<Mutex<JournalState>>,
}

impl CanvasJournal {
    fn lock(&self) -> MutexGuard<'_, JournalState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn undo_labels(&self) -> Vec<String> {
        self.lock().undo_labels.clone()
    }

    pub fn redraw_count(&self) -> usize {
        self.lock().redraws
    }
}

/// A canvas held entirely in memory.
#[derive(Debug)]
pub struct MemoryCanvas {
    objects: Vec<CanvasObject>,
    catalog: ComponentCatalog,
    journal: CanvasJournal,
}

impl Default for MemoryCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCanvas {
    /// An empty canvas with the standard component catalog.
    pub fn new() -> Self {
        Self::with_catalog(ComponentCatalog::standard())
    }

    pub fn with_catalog(catalog: ComponentCatalog) -> Self {
        Self {
            objects: Vec::new(),
            catalog,
            journal: CanvasJournal::default(),
        }
    }

    pub fn journal(&self) -> CanvasJournal {
        self.journal.clone()
    }

    /// Instantiate a catalog component. Returns None for unknown names.
    pub fn add_component(&mut self, name: &str, pivot: Point) -> Option<Guid> {
        let object = self.catalog.get(name)?.instantiate(Guid::new(), pivot);
        Some(self.add(object))
    }

    fn get_mut(&mut self, guid: Guid) -> Result<&mut CanvasObject, CanvasError> {
        self.objects
            .iter_mut()
            .find(|o| o.guid == guid)
            .ok_or(CanvasError::NotFound(guid))
    }

    fn check_output(&self, source: ParamRef) -> Result<(), CanvasError> {
        let object = self.find(source.guid).ok_or(CanvasError::NotFound(source.guid))?;
        if source.index >= object.outputs.len() {
            return Err(CanvasError::ParamOutOfRange {
                guid: source.guid,
                index: source.index,
            });
        }
        Ok(())
    }

    fn input_mut(&mut self, target: ParamRef) -> Result<&mut Param, CanvasError> {
        let object = self.get_mut(target.guid)?;
        object
            .inputs
            .get_mut(target.index)
            .ok_or(CanvasError::ParamOutOfRange {
                guid: target.guid,
                index: target.index,
            })
    }
}

impl Canvas for MemoryCanvas {
    fn find(&self, guid: Guid) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.guid == guid)
    }

    fn list_objects(&self) -> Vec<&CanvasObject> {
        self.objects.iter().collect()
    }

    fn add(&mut self, object: CanvasObject) -> Guid {
        let guid = object.guid;
        match self.objects.iter_mut().find(|o| o.guid == guid) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
        guid
    }

    fn remove(&mut self, guid: Guid) -> Result<CanvasObject, CanvasError> {
        let pos = self
            .objects
            .iter()
            .position(|o| o.guid == guid)
            .ok_or(CanvasError::NotFound(guid))?;
        let removed = self.objects.remove(pos);

        for object in &mut self.objects {
            for input in &mut object.inputs {
                input.sources.retain(|s| s.guid != guid);
            }
        }
        Ok(removed)
    }

    fn move_to(&mut self, guid: Guid, pivot: Point) -> Result<(), CanvasError> {
        self.get_mut(guid)?.pivot = pivot;
        Ok(())
    }

    fn connect(&mut self, source: ParamRef, target: ParamRef) -> Result<(), CanvasError> {
        self.check_output(source)?;
        let input = self.input_mut(target)?;
        if !input.sources.contains(&source) {
            input.sources.push(source);
        }
        Ok(())
    }

    fn disconnect(&mut self, source: ParamRef, target: ParamRef) -> Result<bool, CanvasError> {
        let input = self.input_mut(target)?;
        let before = input.sources.len();
        input.sources.retain(|s| *s != source);
        Ok(input.sources.len() != before)
    }

    fn set_locked(&mut self, guid: Guid, locked: bool) -> Result<(), CanvasError> {
        self.get_mut(guid)?.locked = locked;
        Ok(())
    }

    fn set_preview(&mut self, guid: Guid, preview: bool) -> Result<(), CanvasError> {
        self.get_mut(guid)?.preview = preview;
        Ok(())
    }

    fn set_script(
        &mut self,
        guid: Guid,
        script: ScriptBody,
        params: Option<(Vec<Param>, Vec<Param>)>,
    ) -> Result<(), CanvasError> {
        let object = self.get_mut(guid)?;
        if object.script.is_none() {
            return Err(CanvasError::NotScript(guid));
        }
        object.script = Some(script);

        let Some((inputs, outputs)) = params else {
            return Ok(());
        };

        // Keep wires on inputs whose name survives the edit.
        let old_inputs = std::mem::take(&mut object.inputs);
        object.inputs = inputs
            .into_iter()
            .map(|mut param| {
                if let Some(old) = old_inputs.iter().find(|o| o.name == param.name) {
                    param.sources = old.sources.clone();
                }
                param
            })
            .collect();
        object.outputs = outputs;
        let output_count = object.outputs.len();

        // Drop downstream wires that pointed at outputs which no longer exist.
        for other in &mut self.objects {
            for input in &mut other.inputs {
                input
                    .sources
                    .retain(|s| s.guid != guid || s.index < output_count);
            }
        }
        Ok(())
    }

    fn record_undo(&mut self, label: &str) {
        self.journal.lock().undo_labels.push(label.to_string());
    }

    fn redraw(&mut self) {
        self.journal.lock().redraws += 1;
    }

    fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_with_pair() -> (MemoryCanvas, Guid, Guid) {
        let mut canvas = MemoryCanvas::new();
        let slider = canvas.add_component("Number Slider", Point::default()).unwrap();
        let add = canvas.add_component("Addition", Point::new(200.0, 0.0)).unwrap();
        (canvas, slider, add)
    }

    #[test]
    fn test_connect_is_idempotent() {
        let (mut canvas, slider, add) = canvas_with_pair();
        let source = ParamRef::new(slider, 0);
        let target = ParamRef::new(add, 1);

        canvas.connect(source, target).unwrap();
        canvas.connect(source, target).unwrap();

        assert_eq!(canvas.find(add).unwrap().inputs[1].sources, vec![source]);
    }

    #[test]
    fn test_connect_out_of_range() {
        let (mut canvas, slider, add) = canvas_with_pair();
        let result = canvas.connect(ParamRef::new(slider, 3), ParamRef::new(add, 0));
        assert!(matches!(result, Err(CanvasError::ParamOutOfRange { index: 3, .. })));
    }

    #[test]
    fn test_remove_strips_wires() {
        let (mut canvas, slider, add) = canvas_with_pair();
        canvas
            .connect(ParamRef::new(slider, 0), ParamRef::new(add, 0))
            .unwrap();

        canvas.remove(slider).unwrap();

        assert!(canvas.find(slider).is_none());
        assert!(canvas.find(add).unwrap().inputs[0].sources.is_empty());
        assert!(matches!(canvas.remove(slider), Err(CanvasError::NotFound(_))));
    }

    #[test]
    fn test_set_script_rejects_plain_components() {
        let (mut canvas, _, add) = canvas_with_pair();
        let body = ScriptBody {
            language: "python".into(),
            code: "a = 1".into(),
        };
        assert!(matches!(
            canvas.set_script(add, body, None),
            Err(CanvasError::NotScript(_))
        ));
    }

    #[test]
    fn test_set_script_prunes_dangling_outputs() {
        let mut canvas = MemoryCanvas::new();
        let script = canvas
            .add_component("Python 3 Script", Point::default())
            .unwrap();
        let panel = canvas.add_component("Panel", Point::default()).unwrap();
        canvas
            .connect(ParamRef::new(script, 0), ParamRef::new(panel, 0))
            .unwrap();

        let body = ScriptBody {
            language: "python".into(),
            code: "pass".into(),
        };
        canvas
            .set_script(script, body, Some((vec![Param::new("x", "x")], vec![])))
            .unwrap();

        assert!(canvas.find(panel).unwrap().inputs[0].sources.is_empty());
        assert_eq!(canvas.find(script).unwrap().script.as_ref().unwrap().code, "pass");
    }
}
