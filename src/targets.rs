use crate::error::RenderError;
use crate::gpu::Gpu;

/// Offscreen render target: framebuffer plus its color attachment.
pub struct OffscreenTarget<G: Gpu> {
    pub framebuffer: G::Framebuffer,
    pub texture: G::Texture,
}

impl<G: Gpu> OffscreenTarget<G> {
    pub fn new(gpu: &mut G, width: u32, height: u32) -> Result<Self, RenderError> {
        let texture = gpu.create_texture(width, height)?;
        let framebuffer = gpu.create_framebuffer(&texture)?;
        Ok(Self { framebuffer, texture })
    }
}

/// Two offscreen targets whose roles alternate.
///
/// Semantics:
/// - `current()` is where this frame's feedback pass writes
/// - `previous()` holds last frame's output and is only ever read
/// - `swap()` once the frame has been presented
pub struct PingPong<T> {
    targets: [T; 2],
    current: usize,
    size: (u32, u32),
}

impl<T> PingPong<T> {
    pub fn new(a: T, b: T, size: (u32, u32)) -> Self {
        Self {
            targets: [a, b],
            current: 0,
            size,
        }
    }

    pub fn current(&self) -> &T {
        &self.targets[self.current]
    }

    pub fn previous(&self) -> &T {
        &self.targets[1 - self.current]
    }

    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl<G: Gpu> PingPong<OffscreenTarget<G>> {
    pub fn create(gpu: &mut G, width: u32, height: u32) -> Result<Self, RenderError> {
        let a = OffscreenTarget::new(gpu, width, height)?;
        let b = OffscreenTarget::new(gpu, width, height)?;
        let pair = Self::new(a, b, (width, height));
        pair.clear(gpu);
        Ok(pair)
    }

    /// Resizes both attachments when `size` differs. Returns whether it did.
    /// Fresh storage is cleared so the next feedback pass never samples garbage.
    ///
    /// On failure the recorded size is left alone, so the next call retries
    /// both attachments.
    pub fn resize(&mut self, gpu: &mut G, width: u32, height: u32) -> Result<bool, RenderError> {
        if self.size == (width, height) {
            return Ok(false);
        }
        for t in &self.targets {
            gpu.resize_texture(&t.texture, width, height)?;
        }
        self.size = (width, height);
        self.clear(gpu);
        Ok(true)
    }

    fn clear(&self, gpu: &mut G) {
        for t in &self.targets {
            gpu.bind_framebuffer(Some(&t.framebuffer));
            gpu.viewport(self.size.0, self.size.1);
            gpu.clear([0.0, 0.0, 0.0, 0.0]);
        }
        gpu.bind_framebuffer(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_alternate_and_never_alias() {
        let mut p = PingPong::new("a", "b", (4, 4));
        assert_eq!((*p.current(), *p.previous()), ("a", "b"));
        p.swap();
        assert_eq!((*p.current(), *p.previous()), ("b", "a"));
        for _ in 0..5 {
            assert_ne!(p.current(), p.previous());
            p.swap();
        }
    }

    #[test]
    fn double_swap_restores_roles() {
        let mut p = PingPong::new(1, 2, (1, 1));
        p.swap();
        p.swap();
        assert_eq!((*p.current(), *p.previous()), (1, 2));
        assert_eq!(p.size(), (1, 1));
    }
}
