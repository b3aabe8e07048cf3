use crate::assets::Content;
use crate::core::time::Clock;
use crate::input::Input;

/// The per-frame collaborator borrows handed to
/// [`World::update`](crate::ecs::World::update) and friends: content
/// lookups, sampled input and the frame clock. Built fresh each frame;
/// nothing in it is retained across frames.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub content: &'a Content,
    pub input: &'a Input,
    pub clock: &'a Clock,
}

impl<'a> Frame<'a> {
    pub fn new(content: &'a Content, input: &'a Input, clock: &'a Clock) -> Self {
        Self {
            content,
            input,
            clock,
        }
    }
}
