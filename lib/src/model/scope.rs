use luminal::prelude::*;

use crate::FitError;

/// Read access to tensors left in the graph after `execute`.
///
/// Every tracked tensor is removed from the graph when the scope is dropped,
/// so retrieved and kept tensors never outlive the step that produced them,
/// even when reading one of them fails half way.
pub struct TensorScope<'g> {
  cx: &'g mut Graph,
  ids: Vec<NodeIndex>,
}

impl<'g> TensorScope<'g> {
  pub fn new(cx: &'g mut Graph, ids: impl IntoIterator<Item = NodeIndex>) -> Self {
    Self {
      cx,
      ids: ids.into_iter().collect(),
    }
  }

  pub fn read(&self, id: NodeIndex, name: &str) -> Result<&[f32], FitError> {
    self
      .cx
      .tensors
      .get(&(id, 0 /* assuming single output */))
      .and_then(|tensor| tensor.downcast_ref::<Vec<f32>>())
      .map(Vec::as_slice)
      .ok_or_else(|| FitError::MissingTensor(name.to_string()))
  }

  pub fn scalar(&self, id: NodeIndex, name: &str) -> Result<f32, FitError> {
    self
      .read(id, name)?
      .first()
      .copied()
      .ok_or_else(|| FitError::MissingTensor(name.to_string()))
  }
}

impl Drop for TensorScope<'_> {
  fn drop(&mut self) {
    for id in &self.ids {
      self.cx.tensors.remove(&(*id, 0));
    }
  }
}
