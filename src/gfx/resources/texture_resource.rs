//! Texture resource management for wgpu
//!
//! Depth buffers for the main pass and diffuse textures for meshes.

use std::path::Path;

use crate::error::{SceneError, SceneResult};

/// GPU texture resource containing texture, view, and sampler
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the viewer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };

        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads RGBA8 pixels as a repeating, linearly filtered texture
    ///
    /// Pixels are stored without sRGB decoding to match the non-sRGB surface.
    pub fn create_from_rgba_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// 1x1 white texture bound for meshes without a diffuse map
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::create_from_rgba_data(device, queue, &[255, 255, 255, 255], 1, 1, "White Texture")
    }

    /// Loads an image file into a GPU texture
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> SceneResult<Self> {
        let image = load_rgba_image(path)?;
        let (width, height) = image.dimensions();
        Ok(Self::create_from_rgba_data(
            device,
            queue,
            &image,
            width,
            height,
            &path.display().to_string(),
        ))
    }
}

/// Decodes an image and flips it vertically so row 0 is the bottom, matching
/// OBJ texture coordinates
pub fn load_rgba_image(path: &Path) -> SceneResult<image::RgbaImage> {
    let image = image::open(path).map_err(|source| SceneError::Texture {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.flipv().to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_are_flipped_vertically() {
        let dir = std::env::temp_dir().join(format!("roomview-tex-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stripe.png");

        // red top row, blue bottom row
        let mut source = image::RgbaImage::new(1, 2);
        source.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        source.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        source.save(&path).unwrap();

        let loaded = load_rgba_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (1, 2));
        assert_eq!(loaded.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(loaded.get_pixel(0, 1).0, [255, 0, 0, 255]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_textures_are_reported() {
        let err = load_rgba_image(Path::new("/no/such/texture.png")).unwrap_err();
        assert!(matches!(err, SceneError::Texture { .. }));
    }
}
