// Renderer seam - The host's 2D canvas draws a precomputed frame
use crate::domain::frame::WatchFrame;

pub trait Renderer: Send {
    fn draw(&mut self, frame: &WatchFrame);
}
