use crate::device::{DeviceError, GraphicsDevice, MeshUpload};
use lumen_assets::{ContentHash, MeshData, Vertex};
use lumen_common::MeshHandle;
use std::collections::BTreeMap;

/// Content-addressed mesh uploads.
///
/// Holds the canonical handle for each distinct mesh; geometry chunks share
/// the handle instead of owning the buffers.
#[derive(Debug, Clone, Default)]
pub struct MeshCache {
    entries: BTreeMap<ContentHash, MeshHandle>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing handle for identical content, otherwise uploads.
    pub fn get_or_upload<D, V>(
        &mut self,
        device: &mut D,
        mesh: &MeshData<V>,
    ) -> Result<MeshHandle, DeviceError>
    where
        D: GraphicsDevice + ?Sized,
        V: Vertex,
    {
        let hash = mesh.content_hash();
        if let Some(&handle) = self.entries.get(&hash) {
            tracing::trace!(%hash, mesh = handle.0, "mesh cache hit");
            return Ok(handle);
        }
        let handle = device.upload_mesh(MeshUpload::from(mesh))?;
        tracing::debug!(
            %hash,
            mesh = handle.0,
            vertices = mesh.vertex_count(),
            indices = mesh.index_count(),
            "uploaded mesh"
        );
        self.entries.insert(hash, handle);
        Ok(handle)
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
