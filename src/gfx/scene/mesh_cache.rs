//! Name-keyed mesh storage
//!
//! Scene files refer to meshes by file name, and the same file is often used
//! by several nodes. [`MeshCache`] loads each name once through a
//! [`MeshLoader`] and hands out [`MeshId`] handles for the loaded geometry.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{SceneError, SceneResult};

use super::vertex::Vertex3D;

/// Handle to a mesh stored in a [`MeshCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub(crate) usize);

impl MeshId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// CPU-side triangle geometry loaded from a mesh file
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Name the mesh was requested under (usually the file name)
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    /// Diffuse texture file name, stripped of any directory components
    pub diffuse_texture: Option<String>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Assembles interleaved vertices from flat position, normal and texcoord arrays
    ///
    /// Normals are computed from the faces when `normals` does not hold one
    /// normal per position. Missing texture coordinates become zero.
    pub fn from_arrays(
        name: impl Into<String>,
        positions: &[f32],
        normals: &[f32],
        tex_coords: &[f32],
        indices: Vec<u32>,
    ) -> Self {
        let vertex_count = positions.len() / 3;

        let computed;
        let normals = if !normals.is_empty() && normals.len() == positions.len() {
            normals
        } else {
            computed = calculate_face_normals(positions, &indices);
            &computed[..]
        };
        let has_tex_coords = tex_coords.len() == vertex_count * 2;

        let vertices = (0..vertex_count)
            .map(|i| Vertex3D {
                position: [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]],
                normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                tex_coords: if has_tex_coords {
                    [tex_coords[i * 2], tex_coords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                },
            })
            .collect();

        Self {
            name: name.into(),
            vertices,
            indices,
            diffuse_texture: None,
        }
    }
}

/// Averages the face normals of every triangle touching each vertex
pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut normals = vec![0.0; positions.len()];
    let mut counts = vec![0u32; vertex_count];

    let vertex = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

    for triangle in indices.chunks_exact(3) {
        let i0 = triangle[0] as usize;
        let i1 = triangle[1] as usize;
        let i2 = triangle[2] as usize;
        if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
            continue;
        }

        let (v0, v1, v2) = (vertex(i0), vertex(i1), vertex(i2));
        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for &vertex_idx in &[i0, i1, i2] {
            normals[vertex_idx * 3] += face_normal[0];
            normals[vertex_idx * 3 + 1] += face_normal[1];
            normals[vertex_idx * 3 + 2] += face_normal[2];
            counts[vertex_idx] += 1;
        }
    }

    for i in 0..vertex_count {
        if counts[i] == 0 {
            continue;
        }
        let n = &mut normals[i * 3..i * 3 + 3];
        let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if length > 0.0 {
            n[0] /= length;
            n[1] /= length;
            n[2] /= length;
        }
    }

    normals
}

/// Source of mesh geometry, keyed by the name used in scene descriptions
pub trait MeshLoader {
    fn load(&self, name: &str) -> SceneResult<MeshData>;
}

/// Loads Wavefront OBJ files (and their MTL companions) from a model directory
#[derive(Debug, Clone)]
pub struct ObjMeshLoader {
    model_dir: PathBuf,
}

impl ObjMeshLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }
}

impl MeshLoader for ObjMeshLoader {
    fn load(&self, name: &str) -> SceneResult<MeshData> {
        let path = self.model_dir.join(name);
        log::info!("Loading model {}", path.display());

        let (models, materials) = tobj::load_obj(
            &path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| SceneError::Obj {
            name: name.to_string(),
            source,
        })?;

        let materials = materials.unwrap_or_else(|err| {
            log::debug!("No materials for {}: {}", name, err);
            Vec::new()
        });

        // All shapes in the file are merged into one mesh
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut tex_coords = Vec::new();
        let mut indices = Vec::new();
        let mut normals_complete = true;

        for model in &models {
            let mesh = &model.mesh;
            let base = (positions.len() / 3) as u32;
            let count = mesh.positions.len() / 3;

            positions.extend_from_slice(&mesh.positions);
            if mesh.normals.len() == mesh.positions.len() {
                normals.extend_from_slice(&mesh.normals);
            } else {
                normals_complete = false;
            }
            if mesh.texcoords.len() == count * 2 {
                tex_coords.extend_from_slice(&mesh.texcoords);
            } else {
                tex_coords.extend(std::iter::repeat(0.0).take(count * 2));
            }
            indices.extend(mesh.indices.iter().map(|i| i + base));
        }

        if indices.is_empty() {
            return Err(SceneError::EmptyMesh(name.to_string()));
        }
        if !normals_complete {
            normals.clear();
        }

        let mut data = MeshData::from_arrays(name, &positions, &normals, &tex_coords, indices);
        data.diffuse_texture = materials
            .first()
            .and_then(|m| m.diffuse_texture.as_deref())
            .filter(|t| !t.is_empty())
            .map(texture_file_name);

        log::info!(
            "Loaded {} ({} triangles{})",
            name,
            data.triangle_count(),
            data.diffuse_texture
                .as_deref()
                .map(|t| format!(", texture {t}"))
                .unwrap_or_default()
        );
        Ok(data)
    }
}

/// Strips directory components (either separator) from an MTL texture reference
pub fn texture_file_name(raw: &str) -> String {
    match raw.rfind(['/', '\\']) {
        Some(pos) => raw[pos + 1..].to_string(),
        None => raw.to_string(),
    }
}

/// Loaded meshes, indexed by [`MeshId`] and by name
#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: Vec<MeshData>,
    by_name: HashMap<String, MeshId>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached mesh for `name`, loading it on first request
    ///
    /// Failed loads are not remembered, so a later request tries again.
    pub fn get_or_load(&mut self, name: &str, loader: &dyn MeshLoader) -> SceneResult<MeshId> {
        if let Some(&id) = self.by_name.get(name) {
            log::debug!("Mesh cache hit: {}", name);
            return Ok(id);
        }

        let data = loader.load(name)?;
        Ok(self.insert(name, data))
    }

    /// Stores already-built geometry under `name`, replacing nothing
    ///
    /// If `name` is already cached the existing id is returned and `data` is dropped.
    pub fn insert(&mut self, name: &str, data: MeshData) -> MeshId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = MeshId(self.meshes.len());
        self.meshes.push(data);
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0)
    }

    pub fn id_of(&self, name: &str) -> Option<MeshId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &MeshData)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| (MeshId(i), mesh))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    /// In-memory loader that counts calls and fails for names starting with "missing"
    #[derive(Default)]
    pub(crate) struct FakeLoader {
        pub calls: RefCell<Vec<String>>,
    }

    impl MeshLoader for FakeLoader {
        fn load(&self, name: &str) -> SceneResult<MeshData> {
            self.calls.borrow_mut().push(name.to_string());
            if name.starts_with("missing") {
                return Err(SceneError::EmptyMesh(name.to_string()));
            }
            Ok(MeshData::from_arrays(
                name,
                &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                &[],
                &[],
                vec![0, 1, 2],
            ))
        }
    }

    #[test]
    fn same_name_is_loaded_once() {
        let loader = FakeLoader::default();
        let mut cache = MeshCache::new();

        let a = cache.get_or_load("sofa.obj", &loader).unwrap();
        let b = cache.get_or_load("sofa.obj", &loader).unwrap();
        let c = cache.get_or_load("lamp.obj", &loader).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.len(), 2);
        assert_eq!(*loader.calls.borrow(), vec!["sofa.obj", "lamp.obj"]);
        assert_eq!(cache.get(a).unwrap().name, "sofa.obj");
        assert_eq!(cache.id_of("lamp.obj"), Some(c));
    }

    #[test]
    fn failed_loads_are_retried() {
        let loader = FakeLoader::default();
        let mut cache = MeshCache::new();

        assert!(cache.get_or_load("missing.obj", &loader).is_err());
        assert!(cache.get_or_load("missing.obj", &loader).is_err());

        assert!(cache.is_empty());
        assert_eq!(loader.calls.borrow().len(), 2);
    }

    #[test]
    fn face_normals_are_computed_when_absent() {
        let mesh = MeshData::from_arrays(
            "tri",
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[],
            &[],
            vec![0, 1, 2],
        );

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        for v in &mesh.vertices {
            assert_relative_eq!(v.normal[0], 0.0);
            assert_relative_eq!(v.normal[1], 0.0);
            assert_relative_eq!(v.normal[2], 1.0);
            assert_eq!(v.tex_coords, [0.0, 0.0]);
        }
    }

    #[test]
    fn texture_names_lose_their_directories() {
        assert_eq!(texture_file_name("wood.png"), "wood.png");
        assert_eq!(texture_file_name("textures/wood.png"), "wood.png");
        assert_eq!(texture_file_name("C:\\assets\\maps\\wood.png"), "wood.png");
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("roomview-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), contents).unwrap();
        dir
    }

    #[test]
    fn obj_loader_reads_geometry_and_texture() {
        let dir = write_temp(
            "quad.mtl",
            "newmtl wood\nKd 0.8 0.8 0.8\nmap_Kd textures/wood.png\n",
        );
        write_temp(
            "quad.obj",
            "mtllib quad.mtl\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             usemtl wood\n\
             f 1/1 2/2 3/3 4/4\n",
        );

        let loader = ObjMeshLoader::new(&dir);
        let mesh = loader.load("quad.obj").unwrap();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.diffuse_texture.as_deref(), Some("wood.png"));
        assert_relative_eq!(mesh.vertices[0].normal[2], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn obj_loader_reports_missing_files() {
        let loader = ObjMeshLoader::new(std::env::temp_dir().join("roomview-does-not-exist"));
        let err = loader.load("nothing.obj").unwrap_err();
        assert!(matches!(err, SceneError::Obj { .. }));
    }
}
