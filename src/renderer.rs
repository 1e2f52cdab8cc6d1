//! Draw submission interface.
//!
//! The simulation never draws anything itself. Render passes submit sprites,
//! shadows, decals and text to a [`Renderer`], which is responsible for
//! sorting by depth, converting world coordinates through the camera and
//! putting pixels on screen. [`DrawList`] is a renderer that simply records
//! the submissions; the headless binary and the tests use it.

/// Coordinate space of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coords {
    /// Camera-relative screen pixels.
    Screen,
    /// World units, converted by the renderer.
    World,
}

/// RGBA colour with channels in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

pub trait Renderer {
    /// Sprite frame anchored at `(x, y)`, lifted by `z`.
    #[allow(clippy::too_many_arguments)]
    fn draw_sprite(
        &mut self,
        coords: Coords,
        sprite: &str,
        frame: &str,
        x: f32,
        y: f32,
        z: f32,
        flip_x: bool,
    );

    /// Shadow sprite on the ground at `(x, y)`.
    fn draw_shadow(&mut self, coords: Coords, sprite: &str, x: f32, y: f32);

    /// Decal stretched along a segment.
    #[allow(clippy::too_many_arguments)]
    fn draw_decal(
        &mut self,
        coords: Coords,
        decal: &str,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        alpha: f32,
    );

    #[allow(clippy::too_many_arguments)]
    fn draw_text(&mut self, coords: Coords, text: &str, font: &str, x: f32, y: f32, z: f32, alpha: f32);

    /// Width of `text` set in `font`, in pixels. Fixed 8 pixel advance unless
    /// the renderer knows its fonts.
    fn text_width(&self, text: &str, _font: &str) -> f32 {
        text.chars().count() as f32 * 8.0
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_rect_outline(
        &mut self,
        coords: Coords,
        x: f32,
        y: f32,
        z: f32,
        width: f32,
        height: f32,
        color: Color,
    );
}

/// A recorded submission.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        coords: Coords,
        sprite: String,
        frame: String,
        x: f32,
        y: f32,
        z: f32,
        flip_x: bool,
    },
    Shadow {
        coords: Coords,
        sprite: String,
        x: f32,
        y: f32,
    },
    Decal {
        coords: Coords,
        decal: String,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        alpha: f32,
    },
    Text {
        coords: Coords,
        text: String,
        font: String,
        x: f32,
        y: f32,
        z: f32,
        alpha: f32,
    },
    RectOutline {
        coords: Coords,
        x: f32,
        y: f32,
        z: f32,
        width: f32,
        height: f32,
        color: Color,
    },
}

/// Renderer that stores every submission in order.
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn sprites(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { .. }))
    }

    pub fn decals(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Decal { .. }))
    }
}

impl Renderer for DrawList {
    fn draw_sprite(
        &mut self,
        coords: Coords,
        sprite: &str,
        frame: &str,
        x: f32,
        y: f32,
        z: f32,
        flip_x: bool,
    ) {
        self.commands.push(DrawCommand::Sprite {
            coords,
            sprite: sprite.to_string(),
            frame: frame.to_string(),
            x,
            y,
            z,
            flip_x,
        });
    }

    fn draw_shadow(&mut self, coords: Coords, sprite: &str, x: f32, y: f32) {
        self.commands.push(DrawCommand::Shadow {
            coords,
            sprite: sprite.to_string(),
            x,
            y,
        });
    }

    fn draw_decal(
        &mut self,
        coords: Coords,
        decal: &str,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        alpha: f32,
    ) {
        self.commands.push(DrawCommand::Decal {
            coords,
            decal: decal.to_string(),
            x1,
            y1,
            x2,
            y2,
            alpha,
        });
    }

    fn draw_text(&mut self, coords: Coords, text: &str, font: &str, x: f32, y: f32, z: f32, alpha: f32) {
        self.commands.push(DrawCommand::Text {
            coords,
            text: text.to_string(),
            font: font.to_string(),
            x,
            y,
            z,
            alpha,
        });
    }

    fn draw_rect_outline(
        &mut self,
        coords: Coords,
        x: f32,
        y: f32,
        z: f32,
        width: f32,
        height: f32,
        color: Color,
    ) {
        self.commands.push(DrawCommand::RectOutline {
            coords,
            x,
            y,
            z,
            width,
            height,
            color,
        });
    }
}
