//! The lit scene: a spotlight with its shadow map and the meshes it shines on.

use std::path::PathBuf;

use anyhow::Result;

use super::mesh::Mesh;
use super::program::{ShaderPrograms, binding_key};
use super::shadow::{ShadowCaster, SpotlightConfig};
use super::RenderCtx;

#[derive(Debug, Clone)]
pub struct MeshEntry {
    pub path: PathBuf,
    pub casts_shadow: bool,
}

impl MeshEntry {
    pub fn new(path: impl Into<PathBuf>, casts_shadow: bool) -> Self {
        Self {
            path: path.into(),
            casts_shadow,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub spotlight: SpotlightConfig,
    /// Loaded and drawn in this order.
    pub meshes: Vec<MeshEntry>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spotlight: SpotlightConfig::default(),
            meshes: vec![
                MeshEntry::new("assets/cube.obj", true),
                MeshEntry::new("assets/plane.obj", false),
            ],
        }
    }
}

pub struct Scene {
    light: ShadowCaster,
    meshes: Vec<Mesh>,
}

impl Scene {
    /// Builds the light and loads every mesh. Any load failure is returned.
    pub fn new(ctx: &RenderCtx<'_>, programs: &ShaderPrograms, config: &SceneConfig) -> Result<Self> {
        let light = ShadowCaster::new(ctx, &config.spotlight);
        let meshes = config
            .meshes
            .iter()
            .map(|entry| Mesh::load(ctx, programs, &entry.path, entry.casts_shadow))
            .collect::<Result<Vec<_>>>()?;

        log::info!("scene loaded with {} mesh(es)", meshes.len());
        Ok(Self::from_parts(light, meshes))
    }

    pub fn from_parts(light: ShadowCaster, meshes: Vec<Mesh>) -> Self {
        Self { light, meshes }
    }

    pub fn light(&self) -> &ShadowCaster {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut ShadowCaster {
        &mut self.light
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut Vec<Mesh> {
        &mut self.meshes
    }

    /// Pushes the light uniforms and refreshes the bind groups that reference
    /// the shadow map. Call once per frame after the light moved.
    pub fn prepare(&self, ctx: &RenderCtx<'_>, programs: &mut ShaderPrograms) {
        self.light
            .push_uniforms(&mut programs.shadow, &mut programs.mesh);

        programs.shadow.prepare_bindings(ctx.device, 0, &[]);

        let shadow_map = self.light.texture_view();
        let key = binding_key(&[self.light.target().generation(), shadow_map.is_some() as u64]);
        programs.prepare_mesh_bindings(ctx.device, key, shadow_map);
    }

    /// Renders the depth of every shadow caster from the light.
    pub fn draw_shadow_map(&self, encoder: &mut wgpu::CommandEncoder, programs: &ShaderPrograms) {
        let Some(mut pass) = self.light.begin_capture(encoder) else {
            return;
        };
        if programs.shadow.bind(&mut pass) {
            for mesh in self.meshes.iter().filter(|m| m.casts_shadow()) {
                mesh.draw(&mut pass);
            }
        }
        self.light.end_capture(pass);
    }

    /// Shades every mesh in load order into the pass opened by the caller.
    pub fn draw_meshes(
        &mut self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        programs: &ShaderPrograms,
    ) {
        if !programs.mesh.bind(pass) {
            return;
        }
        for mesh in &mut self.meshes {
            mesh.bind_material_properties(queue, pass);
            mesh.draw(pass);
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        log::info!("cleaning up scene");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_lights_the_cube_but_not_the_ground() {
        let config = SceneConfig::default();
        let casters: Vec<_> = config
            .meshes
            .iter()
            .map(|m| (m.path.to_string_lossy().into_owned(), m.casts_shadow))
            .collect();
        assert_eq!(
            casters,
            vec![
                ("assets/cube.obj".to_string(), true),
                ("assets/plane.obj".to_string(), false),
            ]
        );
    }
}
